use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime settings, merged from built-in defaults, the user config, a local
/// `stashpeek.toml`, `STASHPEEK_*` environment variables and finally an
/// explicit `--config` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub git_binary: String,
    pub repo_path: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub tick_rate_ms: u64,
}

impl Settings {
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(get_user_config_path().as_deref(), Path::new("stashpeek.toml"), explicit)
    }

    fn load_from(user: Option<&Path>, local: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("git_binary", "git")?
            .set_default("log_level", "info")?
            .set_default("tick_rate_ms", 250)?;

        if let Some(user) = user {
            builder = builder.add_source(File::from(user).required(false));
        }
        builder = builder
            .add_source(File::from(local).required(false))
            .add_source(Environment::with_prefix("STASHPEEK"));
        if let Some(explicit) = explicit {
            builder = builder.add_source(File::from(explicit).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Repository to operate on; `~` is expanded. Defaults to the current
    /// directory.
    pub fn repo_dir(&self) -> PathBuf {
        match &self.repo_path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => PathBuf::from("."),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return PathBuf::from(shellexpand::tilde(dir).into_owned());
        }
        match dirs::data_local_dir() {
            Some(mut path) => {
                path.push("stashpeek");
                path.push("logs");
                path
            }
            None => PathBuf::from("logs"),
        }
    }
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("stashpeek");
    path.push("stashpeek.toml");
    Some(path)
}
