use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

const TMP_SUFFIX: &str = "tmp";
const CONFIG_FILE_NAME: &str = "config.json";

/// Handles persistence of a [`Config`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Per-user location, e.g. `~/.config/revenue-forecast/config.json`.
    pub fn default_location() -> Self {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("revenue-forecast").join(CONFIG_FILE_NAME))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory holding the configuration file; relative input paths resolve against it.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Reads the file, or returns defaults when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config = if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        if let Err(err) = write_atomic(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }

    /// Writes a default configuration; refuses to overwrite unless `force`.
    pub fn init(&self, force: bool) -> Result<Config, ConfigError> {
        if self.exists() && !force {
            return Err(ConfigError::Invalid(format!(
                "{} already exists (use --force to overwrite)",
                self.config_path.display()
            )));
        }
        let config = Config::default();
        self.save(&config)?;
        Ok(config)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
