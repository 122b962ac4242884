#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the postal scale reader.
//!
//! Every section is optional; an empty file yields the defaults below.
//!
//! ```toml
//! [device]
//! vendor_id = 0x0922
//! read_timeout_ms = 1000
//!
//! [poll]
//! mode = "grams"
//! interval_ms = 1000
//!
//! [logging]
//! file = "postscale.log"
//! level = "info"
//! rotation = "daily"
//! ```
use serde::Deserialize;

/// Vendor id shared by all Dymo scales.
pub const DEFAULT_VENDOR_ID: u16 = 0x0922;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Device {
    /// USB vendor id to enumerate; exactly one matching device must be attached
    pub vendor_id: u16,
    /// Upper bound on one blocking transport read (ms)
    pub read_timeout_ms: u64,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            read_timeout_ms: 1000,
        }
    }
}

/// Which stage of a reading the poller prints.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Packet bytes as received
    Raw,
    /// Decoded report fields
    Parsed,
    /// Classified weight in grams
    #[default]
    Grams,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Raw => "raw",
            OutputMode::Parsed => "parsed",
            OutputMode::Grams => "grams",
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub mode: OutputMode,
    /// Time between the starts of consecutive reads (ms)
    pub interval_ms: u64,
    /// Stop after this many reads; poll forever when absent
    pub count: Option<u64>,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            mode: OutputMode::Grams,
            interval_ms: 1000,
            count: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub poll: Poll,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file, then validate it.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

const MAX_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if self.device.vendor_id == 0 {
            eyre::bail!("device.vendor_id must be non-zero");
        }
        if self.device.read_timeout_ms == 0 {
            eyre::bail!("device.read_timeout_ms must be >= 1");
        }

        // Poll
        if self.poll.interval_ms == 0 {
            eyre::bail!("poll.interval_ms must be >= 1");
        }
        if self.poll.interval_ms > MAX_INTERVAL_MS {
            eyre::bail!("poll.interval_ms is unreasonably large (>24h)");
        }
        if self.poll.count == Some(0) {
            eyre::bail!("poll.count must be >= 1 when set");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rotation:?}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.device.vendor_id, DEFAULT_VENDOR_ID);
        assert_eq!(cfg.device.read_timeout_ms, 1000);
        assert_eq!(cfg.poll.mode, OutputMode::Grams);
        assert_eq!(cfg.poll.interval_ms, 1000);
        assert!(cfg.poll.count.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn hex_vendor_id_parses() {
        let cfg = load_toml("[device]\nvendor_id = 0x1446\n").unwrap();
        assert_eq!(cfg.device.vendor_id, 0x1446);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        assert!(load_toml("[poll]\nmode = \"ounces\"\n").is_err());
    }
}
