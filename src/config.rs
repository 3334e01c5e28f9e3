//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-mouse`, `--log-file`, etc.)
//! 2. `$TERM_WIDGETS_CONFIG` environment variable (path to config file)
//! 3. Project-local `.term-widgets.toml` in the current working directory
//! 4. Global `~/.config/term-widgets/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable mouse support.
    pub mouse: Option<bool>,
    /// Show hidden directories in the selector's directory tree.
    pub show_hidden: Option<bool>,
}

/// File list column settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FileListConfig {
    /// Fixed width of the name column; derived from the terminal width when unset.
    pub name_width: Option<u16>,
    pub size_width: Option<u16>,
    pub modified_width: Option<u16>,
    /// Initial sort column: 0 = name, 1 = size, 2 = modified.
    pub sort_column: Option<usize>,
    pub sort_ascending: Option<bool>,
}

/// File selector settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SelectorConfigFile {
    /// Glob used when the caller does not pass one.
    pub default_filter: Option<String>,
    /// Initial width of the directory tree pane.
    pub tree_width: Option<u16>,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Rescan the listed directory when it changes on disk.
    pub enabled: Option<bool>,
    /// Debounce interval in milliseconds.
    pub debounce_ms: Option<u64>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"debug"` or `"term_widgets=trace"`.
    pub level: Option<String>,
    /// Log file path. Logging is off when unset.
    pub file: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub file_list: FileListConfig,
    pub selector: SelectorConfigFile,
    pub watcher: WatcherConfig,
    pub logging: LoggingConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Default glob for the file selector.
pub const DEFAULT_FILTER: &str = "*";
/// Default width of the size column.
pub const DEFAULT_SIZE_WIDTH: u16 = 15;
/// Default width of the last-modified column.
pub const DEFAULT_MODIFIED_WIDTH: u16 = 30;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path, which is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TERM_WIDGETS_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".term-widgets.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("term-widgets").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr,
/// since logging is configured from this file and is not running yet).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: other.general.mouse.or(self.general.mouse),
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
            },
            file_list: FileListConfig {
                name_width: other.file_list.name_width.or(self.file_list.name_width),
                size_width: other.file_list.size_width.or(self.file_list.size_width),
                modified_width: other
                    .file_list
                    .modified_width
                    .or(self.file_list.modified_width),
                sort_column: other.file_list.sort_column.or(self.file_list.sort_column),
                sort_ascending: other
                    .file_list
                    .sort_ascending
                    .or(self.file_list.sort_ascending),
            },
            selector: SelectorConfigFile {
                default_filter: other
                    .selector
                    .default_filter
                    .clone()
                    .or(self.selector.default_filter),
                tree_width: other.selector.tree_width.or(self.selector.tree_width),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
            },
            logging: LoggingConfig {
                level: other.logging.level.clone().or(self.logging.level),
                file: other.logging.file.clone().or(self.logging.file),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that the highest-priority candidate is merged last.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Whether hidden directories appear in the directory tree.
    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    /// Fixed name column width, if configured.
    pub fn name_width(&self) -> Option<u16> {
        self.file_list.name_width
    }

    pub fn size_width(&self) -> u16 {
        self.file_list.size_width.unwrap_or(DEFAULT_SIZE_WIDTH)
    }

    pub fn modified_width(&self) -> u16 {
        self.file_list
            .modified_width
            .unwrap_or(DEFAULT_MODIFIED_WIDTH)
    }

    /// Initial sort column, clamped to the three built-in columns.
    pub fn sort_column(&self) -> usize {
        self.file_list.sort_column.unwrap_or(0).min(2)
    }

    pub fn sort_ascending(&self) -> bool {
        self.file_list.sort_ascending.unwrap_or(true)
    }

    /// Glob used when the selector is opened without an explicit filter.
    pub fn default_filter(&self) -> &str {
        self.selector
            .default_filter
            .as_deref()
            .unwrap_or(DEFAULT_FILTER)
    }

    pub fn tree_width(&self) -> Option<u16> {
        self.selector.tree_width
    }

    /// Whether the watcher is enabled.
    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    /// Watcher debounce interval in milliseconds.
    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    /// Log filter directive.
    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("info")
    }

    /// Log file path; `None` disables logging.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging.file.as_ref().map(PathBuf::from)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
