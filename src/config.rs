use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::service::ocr::{
    azure::{AzureOcr, AzureOcrConfig},
    vision::{VisionOcr, VisionOcrConfig},
    OcrService,
};

pub trait Config: Serialize + DeserializeOwned + Default {
    /// Path of the configuration file, relative to the configuration directory.
    fn path() -> &'static str;

    /// The platform configuration directory for this program.
    fn default_dir() -> Result<PathBuf> {
        let mut config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find suitable config directory"))?;
        config_dir.push(env!("CARGO_PKG_NAME"));
        Ok(config_dir)
    }

    /// Loads a configuration file, or creates a default configuration struct if the file does not exist.
    fn load() -> Result<Self> {
        Self::load_in(&Self::default_dir()?)
    }

    fn load_in(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::path());

        if !config_path.exists() {
            log::debug!(
                "No configuration file at `{}`, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let file = File::open(&config_path).with_context(|| {
            format!(
                "Could not open configuration file: `{}`",
                config_path.display()
            )
        })?;

        let config = serde_json::from_reader(file).with_context(|| {
            format!(
                "Could not read configuration file: `{}`",
                config_path.display(),
            )
        })?;

        Ok(config)
    }

    fn save(&self) -> Result<()> {
        self.save_in(&Self::default_dir()?)
    }

    fn save_in(&self, dir: &Path) -> Result<()> {
        let config_path = dir.join(Self::path());

        let mut config_dir = config_path.clone();
        config_dir.pop();
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Could not create configuration directory: `{}`",
                config_dir.display()
            )
        })?;

        let file = File::create(&config_path).with_context(|| {
            format!(
                "Could not write to configuration file: `{}`",
                config_path.display()
            )
        })?;

        serde_json::to_writer_pretty(file, self).with_context(|| {
            format!(
                "Could not serialise configuration file: `{}`",
                config_path.display()
            )
        })?;

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ocr_service: OcrServiceList,
    /// Upper bound for a single request, connection included.
    pub timeout_secs: u64,
}

impl Config for AppConfig {
    fn path() -> &'static str {
        "config.json"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr_service: OcrServiceList::Azure,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings supplied at call time (command line, environment) that win over the files.
#[derive(Debug, Default, Clone)]
pub struct ServiceOverrides {
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OcrServiceList {
    Azure,
    Vision,
}

impl OcrServiceList {
    /// Loads the selected service's configuration from `dir`, applies `overrides` and builds the service.
    ///
    /// Returns the service together with the effective configuration so the caller can persist it.
    pub fn create_service(
        self,
        dir: &Path,
        overrides: &ServiceOverrides,
        timeout: Duration,
    ) -> Result<(Box<dyn OcrService>, ServiceConfig)> {
        Ok(match self {
            Self::Azure => {
                let mut config = AzureOcrConfig::load_in(dir)
                    .context("AzureOcr: Failed to load configuration file")?;
                config.apply(overrides);
                let service = AzureOcr::new(config.clone(), timeout)?;
                (Box::new(service), ServiceConfig::Azure(config))
            }
            Self::Vision => {
                let mut config = VisionOcrConfig::load_in(dir)
                    .context("VisionOcr: Failed to load configuration file")?;
                config.apply(overrides);
                let service = VisionOcr::new(config.clone(), timeout)?;
                (Box::new(service), ServiceConfig::Vision(config))
            }
        })
    }
}

/// The effective configuration of whichever service was built.
#[derive(Debug, Clone)]
pub enum ServiceConfig {
    Azure(AzureOcrConfig),
    Vision(VisionOcrConfig),
}

impl ServiceConfig {
    pub fn save_in(&self, dir: &Path) -> Result<()> {
        match self {
            Self::Azure(config) => config.save_in(dir),
            Self::Vision(config) => config.save_in(dir),
        }
    }
}
