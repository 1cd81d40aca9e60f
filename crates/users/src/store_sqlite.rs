//! SQLite-backed user store using sqlx.

use std::{
    collections::BTreeSet,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use {
    async_trait::async_trait,
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
    tracing::debug,
};

use crate::{Error, Result, store::UserStore, user::User};

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    permissions: String,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(r: UserRow) -> Result<Self> {
        let permissions: BTreeSet<String> = serde_json::from_str(&r.permissions)?;
        let mut user = User::new(r.id).with_permissions(permissions);
        user.name = r.name;
        Ok(user)
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// SQLite-backed persistence for users and permissions.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Open (creating if missing) the database file at `path` and make sure
    /// the schema exists.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::init(&pool).await?;
        debug!(path = %path.display(), "opened user database");
        Ok(Self { pool })
    }

    /// Create a store using an existing pool. Call [`SqliteUserStore::init`]
    /// first if the schema may be missing.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the users table schema.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS users (
                id          TEXT    PRIMARY KEY,
                name        TEXT,
                permissions TEXT    NOT NULL DEFAULT '[]',
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, permissions FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn create_user(&self, user: User) -> Result<User> {
        let permissions = serde_json::to_string(user.permissions())?;
        let ts = now();
        sqlx::query(
            r#"INSERT INTO users (id, name, permissions, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(id) DO NOTHING"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&permissions)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::user_not_found(&user.id))
    }

    async fn update_user(&self, user: User) -> Result<User> {
        let permissions = serde_json::to_string(user.permissions())?;
        let result =
            sqlx::query("UPDATE users SET name = ?, permissions = ?, updated_at = ? WHERE id = ?")
                .bind(&user.name)
                .bind(&permissions)
                .bind(now())
                .bind(&user.id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::user_not_found(user.id));
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows =
            sqlx::query_as::<_, UserRow>("SELECT id, name, permissions FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}
