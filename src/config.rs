//! Persistent default flags.
//!
//! Defaults live in plain rc files holding command-line flags, one or more
//! per line, with `#` comments. The effective set is
//! `global ∪ local ∪ cli`: switches accumulate and valued options take the
//! right-most source that sets them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Autosave delay used when no `--autosave-ms` is given.
pub const DEFAULT_AUTOSAVE_MS: u64 = 300;

const APP_DIR: &str = "mdpad";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Which panes are on screen.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Split,
    #[value(name = "editor")]
    EditorOnly,
    #[value(name = "preview")]
    PreviewOnly,
}

impl LayoutMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::EditorOnly => "editor",
            Self::PreviewOnly => "preview",
        }
    }

    /// The next mode in the `Ctrl+E` cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Split => Self::EditorOnly,
            Self::EditorOnly => Self::PreviewOnly,
            Self::PreviewOnly => Self::Split,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "split" => Some(Self::Split),
            "editor" => Some(Self::EditorOnly),
            "preview" => Some(Self::PreviewOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub theme: Option<ThemeMode>,
    pub layout: Option<LayoutMode>,
    pub autosave_ms: Option<u64>,
    pub store: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub no_autosave: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            theme: other.theme.or(self.theme),
            layout: other.layout.or(self.layout),
            autosave_ms: other.autosave_ms.or(self.autosave_ms),
            store: other.store.clone().or_else(|| self.store.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            no_autosave: self.no_autosave || other.no_autosave,
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms.unwrap_or(DEFAULT_AUTOSAVE_MS))
    }

    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn global_config_path() -> PathBuf {
    platform_dir(Kind::Config).map_or_else(local_override_path, |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mdpadrc")
}

/// Where the document snapshot is kept unless `--store` says otherwise.
pub fn default_store_path() -> PathBuf {
    platform_dir(Kind::Data).map_or_else(
        || PathBuf::from(".mdpad-store.json"),
        |dir| dir.join("store.json"),
    )
}

#[derive(Clone, Copy)]
enum Kind {
    Config,
    Data,
}

fn platform_dir(kind: Kind) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let var = match kind {
            Kind::Config => "APPDATA",
            Kind::Data => "LOCALAPPDATA",
        };
        if let Some(base) = std::env::var_os(var) {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }

    #[cfg(target_os = "macos")]
    {
        let _ = kind;
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let (xdg, fallback) = match kind {
            Kind::Config => ("XDG_CONFIG_HOME", [".config", ""]),
            Kind::Data => ("XDG_DATA_HOME", [".local", "share"]),
        };
        if let Some(base) = std::env::var_os(xdg) {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            for part in fallback.iter().filter(|part| !part.is_empty()) {
                dir.push(part);
            }
            return Some(dir.join(APP_DIR));
        }
    }

    None
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mdpad defaults (saved with --save)".to_string()];
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(layout) = flags.layout {
        lines.push(format!("--layout {}", layout.as_str()));
    }
    if let Some(ms) = flags.autosave_ms {
        lines.push(format!("--autosave-ms {ms}"));
    }
    if flags.no_autosave {
        lines.push("--no-autosave".to_string());
    }
    for (flag, value) in [
        ("--store", &flags.store),
        ("--log-file", &flags.log_file),
        ("--export-dir", &flags.export_dir),
    ] {
        if let Some(path) = value {
            lines.push(format!("{flag} {}", path.display()));
        }
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list, ignoring everything else.
///
/// Both `--flag value` and `--flag=value` are accepted. Unparseable values
/// leave the option unset.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--no-autosave" {
            flags.no_autosave = true;
            i += 1;
            continue;
        }

        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if !matches!(
            name,
            "--theme" | "--layout" | "--autosave-ms" | "--store" | "--log-file" | "--export-dir"
        ) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            match name {
                "--theme" => flags.theme = ThemeMode::parse(value),
                "--layout" => flags.layout = LayoutMode::parse(value),
                "--autosave-ms" => flags.autosave_ms = value.parse().ok(),
                "--store" => flags.store = Some(PathBuf::from(value)),
                "--log-file" => flags.log_file = Some(PathBuf::from(value)),
                _ => flags.export_dir = Some(PathBuf::from(value)),
            }
        }
        i += 1;
    }
    flags
}
