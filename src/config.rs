//! TOML-based configuration system.
//!
//! Every tunable of the behavior layer lives here: breakpoints, scroll
//! offsets, timer delays, user-facing labels. Defaults match the values
//! the behaviors originally hardcoded, so a missing or partial config
//! file changes nothing observable.
//!
//! ## Config file search order
//!
//! 1. `SITEWIRE_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`~/.config/sitewire/config.toml`)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub nav: NavConfig,
    pub scroll: ScrollConfig,
    pub form: FormConfig,
}

/// Site identity, used by the startup banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: String,
}

/// Navigation menu and anchor scrolling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Viewport width (px) at or below which a nav link click closes the menu.
    pub mobile_breakpoint: f64,
    /// Fixed header height (px) subtracted from anchor scroll targets.
    pub header_offset: f64,
}

/// Scroll-driven highlight and section announcer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Lookback margin (px) for the nav link highlight window.
    pub highlight_lookback: f64,
    /// Offset (px) added to the scroll position when probing the current section.
    pub announce_offset: f64,
    /// Debounce delay (ms) before the announcer re-evaluates sections.
    pub announce_debounce_ms: u64,
}

/// Contact form simulation and status message lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Simulated network latency (ms) between submit and the success message.
    pub submit_latency_ms: u64,
    /// How long (ms) a status message stays fully visible.
    pub message_visible_ms: u64,
    /// Fade-out duration (ms) before the message node is removed.
    pub message_fade_ms: u64,
    /// Submit control label at rest.
    pub submit_label: String,
    /// Submit control label while the simulated send is in flight.
    pub sending_label: String,
    /// Status message shown when the simulated send completes.
    pub success_message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls — match the original hardcoded values exactly
// ─────────────────────────────────────────────────────────────────────────────

// Config derives Default since all fields implement Default.
// (Other structs have custom defaults with non-zero values.)

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Sitewire".to_string(),
            tagline: "Site behaviors ready".to_string(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 968.0,
            header_offset: 80.0,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            highlight_lookback: 100.0,
            announce_offset: 150.0,
            announce_debounce_ms: 100,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_latency_ms: 1500,
            message_visible_ms: 5000,
            message_fade_ms: 500,
            submit_label: "Send Message".to_string(),
            sending_label: "Sending...".to_string(),
            success_message: "Thank you for your message! We will get back to you soon."
                .to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading and saving
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from a TOML file. Never panics — returns defaults
    /// if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        info!(path = %path.display(), "Configuration loaded");
                        config
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                        Config::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                    Config::default()
                }
            },
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    /// Saves configuration to the platform config directory.
    /// Creates the directory if it doesn't exist.
    pub fn save(&self) -> io::Result<()> {
        let path = save_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&path, content)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("SITEWIRE_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform-specific save path for the config file.
fn save_path() -> PathBuf {
    platform_config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("Sitewire"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("sitewire"))
    }
}
