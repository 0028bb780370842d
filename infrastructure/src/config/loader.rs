//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["workbench.toml", ".workbench.toml"];

/// Keys accepted from `POSTGRES_*` / `MYSQL_*` variables
const CONNECTION_KEYS: [&str; 5] = ["host", "port", "database", "user", "password"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment (`WORKBENCH_*`, `POSTGRES_*`, `MYSQL_*`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./workbench.toml` or `./.workbench.toml`
    /// 4. Global: `~/.config/workbench-mcp/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load only default configuration plus the environment (for --no-config)
    pub fn load_defaults() -> Result<FileConfig, Box<figment::Error>> {
        Self::with_env(Figment::new().merge(Serialized::defaults(FileConfig::default())))
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Self::with_env(figment)
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(
                Env::prefixed("POSTGRES_")
                    .only(&CONNECTION_KEYS)
                    .map(|key| format!("database.postgres.{}", key).into()),
            )
            .merge(
                Env::prefixed("MYSQL_")
                    .only(&CONNECTION_KEYS)
                    .map(|key| format!("database.mysql.{}", key).into()),
            )
            .merge(Env::prefixed("WORKBENCH_").split("__"))
    }

    /// Get the global config file path
    ///
    /// `$XDG_CONFIG_HOME/workbench-mcp/config.toml`, falling back to
    /// `~/.config/workbench-mcp/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("workbench-mcp").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used, highest priority first
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];
        lines.push("  [  ENV] WORKBENCH_*, POSTGRES_*, MYSQL_*".to_string());

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{:>5}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./workbench.toml or ./.workbench.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use workbench_application::SqlEngineKind;

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("workbench-mcp"));
    }

    #[test]
    fn test_project_file_and_explicit_path_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "workbench.toml",
                r#"
[process]
timeout_ms = 1000
[http]
max_requests = 20
"#,
            )?;
            jail.create_file("override.toml", "[process]\ntimeout_ms = 2000\n")?;

            let explicit = PathBuf::from("override.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| *e)?;
            assert_eq!(config.process.timeout_ms, 2000);
            assert_eq!(config.http.max_requests, 20);
            assert_eq!(config.http.timeout_ms, 30_000);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("workbench.toml", "[database.postgres]\nhost = \"file-host\"\n")?;
            jail.set_env("POSTGRES_HOST", "env-host");
            jail.set_env("POSTGRES_PASSWORD", "1234");
            jail.set_env("MYSQL_DATABASE", "shop");
            jail.set_env("WORKBENCH_PROCESS__TIMEOUT_MS", "750");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            let pg = config.database.postgres.resolve(SqlEngineKind::Postgres);
            assert_eq!(pg.host, "env-host");
            assert_eq!(pg.password, "1234");
            assert_eq!(pg.port, 5432);
            assert_eq!(
                config.database.mysql.resolve(SqlEngineKind::Mysql).database,
                "shop"
            );
            assert_eq!(config.process.timeout_ms, 750);
            Ok(())
        });
    }

    #[test]
    fn test_load_defaults_ignores_files() {
        Jail::expect_with(|jail| {
            jail.create_file("workbench.toml", "[process]\ntimeout_ms = 1\n")?;
            let config = ConfigLoader::load_defaults().map_err(|e| *e)?;
            assert_eq!(config.process.timeout_ms, 30_000);
            Ok(())
        });
    }

    #[test]
    fn test_describe_sources() {
        let lines = ConfigLoader::describe_sources(None);
        assert!(lines[0].starts_with("Configuration sources"));
        assert!(lines.iter().any(|l| l.contains("Default")));
    }
}
