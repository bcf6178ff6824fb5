// src/config.rs

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const DEFAULT_POSCAR_TITLE: &str = "Created by atomco";

// --- WriteOptions ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
  /// Title line written at the top of POSCAR/CONTCAR files
  #[serde(default = "default_title")]
  pub poscar_title: String,

  /// Step used in XYZ output when the system carries none
  #[serde(default = "default_frame_index")]
  pub default_frame_index: i64,
}

fn default_title() -> String {
  DEFAULT_POSCAR_TITLE.to_string()
}

fn default_frame_index() -> i64 {
  1
}

impl Default for WriteOptions {
  fn default() -> Self {
    Self {
      poscar_title: default_title(),
      default_frame_index: default_frame_index(),
    }
  }
}

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
  #[serde(default = "default_log_level")]
  pub log_level: String,

  #[serde(default)]
  pub write: WriteOptions,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
      write: WriteOptions::default(),
    }
  }
}

impl Config {
  /// Loads config from the OS location (e.g., ~/.config/atomco/settings.json).
  /// Never fails: problems are reported in the returned message.
  pub fn load() -> (Self, String) {
    Self::load_from(&Self::get_path())
  }

  pub fn load_from(path: &Path) -> (Self, String) {
    if !path.exists() {
      return (Self::default(), "No config found. Using defaults.".to_string());
    }
    match Self::read_json(path) {
      Ok(cfg) => (cfg, format!("Config loaded from {:?}", path)),
      Err(msg) => (Self::default(), msg),
    }
  }

  fn read_json(path: &Path) -> Result<Self, String> {
    let file = File::open(path).map_err(|e| format!("Error opening config: {}", e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("Error parsing config: {}", e))
  }

  pub fn save(&self) -> String {
    self.save_to(&Self::get_path())
  }

  pub fn save_to(&self, path: &Path) -> String {
    match self.write_json(path) {
      Ok(()) => format!("Config saved to {:?}", path),
      Err(msg) => msg,
    }
  }

  fn write_json(&self, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| format!("Could not create config dir: {}", e))?;
    }
    let file = File::create(path).map_err(|e| format!("Could not create config file: {}", e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| format!("Failed to save config: {}", e))
  }

  pub fn get_path() -> PathBuf {
    match ProjectDirs::from("org", "atomco", "atomco") {
      Some(proj) => proj.config_dir().join("settings.json"),
      None => PathBuf::from("settings.json"),
    }
  }
}
