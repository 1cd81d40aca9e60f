mod config_commands;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    graceless_channels::ChatUser,
    graceless_config::{GracelessConfig, Severity, validate},
    graceless_console::ConsoleTransport,
    graceless_router::RouterBuilder,
    graceless_users::{SqliteUserStore, UserStore},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "graceless", about = "graceless: a chat bot command router", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ./graceless.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite user database. Without one the bot runs in safemode.
    #[arg(long, global = true, env = "GRACELESS_DB")]
    db: Option<PathBuf>,

    /// Comma-separated user IDs that pass every permission check.
    #[arg(long, global = true, env = "GRACELESS_ROOT_USERS", value_delimiter = ',')]
    root_users: Option<Vec<String>>,

    /// Command prefix.
    #[arg(long, global = true, env = "GRACELESS_PREFIX")]
    prefix: Option<String>,

    /// Start in safemode even with a database.
    #[arg(long, global = true, default_value_t = false)]
    safemode: bool,

    /// Enable the (unsandboxed) Go snippet engine.
    #[arg(long, global = true, default_value_t = false)]
    with_go_engine: bool,

    /// Enable the embedded JavaScript snippet engine.
    #[arg(long, global = true, default_value_t = false)]
    with_js_engine: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot on the console (default when no subcommand is given).
    Run {
        /// User ID the console speaks as.
        #[arg(long = "as", default_value = "local")]
        user: String,
    },
    /// Configuration checks.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Logs go to stderr so they never interleave with console replies.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load the config file and layer CLI flags on top.
fn load_config(cli: &Cli) -> anyhow::Result<GracelessConfig> {
    let mut config = match &cli.config {
        Some(path) => graceless_config::load_config(path)?,
        None => graceless_config::discover_and_load(),
    };

    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }
    if let Some(root_users) = &cli.root_users {
        config.bot.root_users = root_users
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
    }
    if let Some(prefix) = &cli.prefix {
        config.bot.prefix = prefix.clone();
    }
    if cli.safemode {
        config.bot.safemode = true;
    }
    if cli.with_go_engine {
        config.engines.go = true;
    }
    if cli.with_js_engine {
        config.engines.js = true;
    }
    Ok(config)
}

async fn run(config: GracelessConfig, console_user: String) -> anyhow::Result<()> {
    let result = validate(&config);
    for d in &result.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
        }
    }
    if result.has_errors() {
        anyhow::bail!("invalid configuration, see errors above");
    }

    let store: Option<Arc<dyn UserStore>> = match &config.database.path {
        Some(path) => {
            let store = SqliteUserStore::open(path)
                .await
                .with_context(|| format!("opening user database {}", path.display()))?;
            Some(Arc::new(store))
        },
        None => None,
    };

    let cancel = CancellationToken::new();
    let (errors, mut errors_rx) = graceless_common::error_channel();

    // Every reported error is logged; none of them stop the bot.
    let supervisor = tokio::spawn(async move {
        while let Some(err) = errors_rx.recv().await {
            error!(error = %err, "error reported");
        }
    });

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
                cancel.cancel();
            }
        }
    });

    let transport = Arc::new(
        ConsoleTransport::stdio(ChatUser::new(console_user)).context("starting console input")?,
    );
    let mut builder = RouterBuilder::new(config)
        .transport(transport)
        .cancellation(cancel);
    if let Some(store) = store {
        builder = builder.store(store);
    }
    let router = Arc::new(builder.build()?);

    router.start(errors).await;
    supervisor.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();
    init_telemetry(&cli);

    let config = load_config(&cli)?;
    match cli.command.take() {
        None => {
            info!(version = env!("CARGO_PKG_VERSION"), "graceless starting");
            run(config, "local".into()).await
        },
        Some(Commands::Run { user }) => {
            info!(version = env!("CARGO_PKG_VERSION"), "graceless starting");
            run(config, user).await
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, &config, cli.config.as_deref())
        },
    }
}
