use crate::DEFAULT_EXTENSIONS;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub extensions: Vec<String>,
    pub keep_log_files: usize,
    pub accept_raw_names: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            keep_log_files: 20,
            accept_raw_names: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub tags_path: PathBuf,
    pub undo_path: PathBuf,
    pub log_dir: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "photo-renamer", "photo-renamer")
        .context("could not determine the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        tags_path: config_dir.join("tags.toml"),
        undo_path: config_dir.join("undo-last.json"),
        log_dir: proj.data_local_dir().join("logs"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "failed to read the configuration file at {}",
            paths.config_path.display()
        )
    })?;

    let config =
        toml::from_str::<AppConfig>(&raw).context("failed to parse the configuration file")?;
    Ok(config)
}
