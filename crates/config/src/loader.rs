use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::GracelessConfig};

const CONFIG_FILENAMES: &[&str] = &[
    "graceless.toml",
    "graceless.yaml",
    "graceless.yml",
    "graceless.json",
];

/// Load config from `path`, picking the format from its extension.
pub fn load_config(path: &Path) -> anyhow::Result<GracelessConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "toml" => Ok(toml::from_str(&raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&raw)?),
        "json" => Ok(serde_json::from_str(&raw)?),
        ext => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Load the first config file found in `./`, then the user config dir.
/// Falls back to defaults when none exists or it fails to parse.
pub fn discover_and_load() -> GracelessConfig {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(
        directories::ProjectDirs::from("", "", "graceless").map(|d| d.config_dir().to_path_buf()),
    );

    let Some(path) = find_config_file(&dirs) else {
        debug!("no config file found, using defaults");
        return GracelessConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        GracelessConfig::default()
    })
}

fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graceless.toml");
        std::fs::write(
            &path,
            r#"
[bot]
prefix = "!"
root_users = ["U1", "U2"]

[database]
path = "/var/lib/graceless/users.db"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.prefix, "!");
        assert_eq!(cfg.bot.root_users.len(), 2);
        assert!(!cfg.effective_safemode());
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graceless.yaml");
        std::fs::write(&path, "bot:\n  ignore_users: [\"keeper\"]\nintro:\n  enabled: false\n")
            .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.ignore_users, vec!["keeper".to_string()]);
        assert!(!cfg.intro.enabled);
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graceless.json");
        std::fs::write(&path, r#"{"engines": {"sed": false}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(!cfg.engines.sed);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graceless.ini");
        std::fs::write(&path, "prefix=!").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn discovery_prefers_earlier_dirs_then_toml() {
        let local = tempfile::tempdir().unwrap();
        let global = tempfile::tempdir().unwrap();
        std::fs::write(global.path().join("graceless.toml"), "").unwrap();
        let dirs = [local.path().to_path_buf(), global.path().to_path_buf()];
        assert_eq!(
            find_config_file(&dirs),
            Some(global.path().join("graceless.toml"))
        );

        std::fs::write(local.path().join("graceless.json"), "{}").unwrap();
        std::fs::write(local.path().join("graceless.yaml"), "").unwrap();
        assert_eq!(
            find_config_file(&dirs),
            Some(local.path().join("graceless.yaml"))
        );
    }
}
