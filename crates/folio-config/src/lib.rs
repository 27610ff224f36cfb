//! Configuration for the folio driver binary.
//!
//! Parses `folio.toml`: `[log]` (level + file), `[protocol]` (legacy wire
//! toggle) and `[book]` (demo document defaults). Missing files and parse
//! errors fall back to defaults; unknown fields are ignored so the file can
//! grow without breaking older binaries.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_level")]
    pub level: String,
    #[serde(default = "LogConfig::default_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            file: Self::default_file(),
        }
    }
}

impl LogConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_file() -> String {
        "folio.log".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct ProtocolConfig {
    /// Emit the legacy fixed-field header and fixed-width lines.
    #[serde(default)]
    pub legacy: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookConfig {
    #[serde(default = "BookConfig::default_pages")]
    pub pages: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Chars per display line in the demo layout.
    #[serde(default = "BookConfig::default_columns")]
    pub columns: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            pages: Self::default_pages(),
            title: String::new(),
            author: String::new(),
            columns: Self::default_columns(),
        }
    }
}

impl BookConfig {
    fn default_pages() -> usize {
        16
    }
    fn default_columns() -> u32 {
        53
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub book: BookConfig,
}

/// Best-effort config path: working directory first, then the platform
/// config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("folio.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("folio").join("folio.toml");
    }
    PathBuf::from("folio.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<Config>(&content) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let cfg = load_from(Some(PathBuf::from("__no_such_folio__.toml"))).unwrap();
        assert_eq!(cfg.book.pages, 16);
        assert_eq!(cfg.book.columns, 53);
        assert_eq!(cfg.log.level, "info");
        assert!(!cfg.protocol.legacy);
    }

    #[test]
    fn parses_all_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[log]\nlevel = \"debug\"\n[protocol]\nlegacy = true\n[book]\npages = 4\ntitle = \"demo\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.log.level, "debug");
        assert!(cfg.protocol.legacy);
        assert_eq!(cfg.book.pages, 4);
        assert_eq!(cfg.book.title, "demo");
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.book.columns, 53);
    }

    #[test]
    fn bad_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not [valid toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.book.pages, 16);
    }
}
