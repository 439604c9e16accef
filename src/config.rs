use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::{IndentConfig, IndentStyle};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub draft_key: Option<String>,
    pub name: Option<String>,
    pub indent: Option<IndentStyle>,
    pub indent_width: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub no_autoload: bool,
    pub store_dir: Option<PathBuf>,
    pub preview_path: Option<PathBuf>,
    pub no_open: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: valued options from `other` win, booleans
    /// are OR-ed.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            draft_key: other.draft_key.clone().or_else(|| self.draft_key.clone()),
            name: other.name.clone().or_else(|| self.name.clone()),
            indent: other.indent.or(self.indent),
            indent_width: other.indent_width.or(self.indent_width),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            no_autoload: self.no_autoload || other.no_autoload,
            store_dir: other.store_dir.clone().or_else(|| self.store_dir.clone()),
            preview_path: other
                .preview_path
                .clone()
                .or_else(|| self.preview_path.clone()),
            no_open: self.no_open || other.no_open,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Effective indentation settings.
    pub fn indent_config(&self) -> IndentConfig {
        let defaults = IndentConfig::default();
        IndentConfig::new(
            self.indent.unwrap_or(defaults.style),
            self.indent_width.unwrap_or(defaults.width),
        )
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("tagpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("tagpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("tagpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("tagpad").join("config");
        }
    }

    PathBuf::from(".tagpadrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".tagpadrc")
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
        .flat_map(split_flag_line)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# tagpad defaults (saved with --save)".to_string());
    if let Some(key) = &flags.draft_key {
        lines.push(format!("--draft-key {}", quote(key)));
    }
    if let Some(name) = &flags.name {
        lines.push(format!("--name {}", quote(name)));
    }
    if let Some(style) = flags.indent {
        let style_str = match style {
            IndentStyle::Tab => "tab",
            IndentStyle::Spaces => "spaces",
        };
        lines.push(format!("--indent {style_str}"));
    }
    if let Some(width) = flags.indent_width {
        lines.push(format!("--indent-width {width}"));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if flags.no_autoload {
        lines.push("--no-autoload".to_string());
    }
    if let Some(dir) = &flags.store_dir {
        lines.push(format!("--store-dir {}", quote(&dir.display().to_string())));
    }
    if let Some(preview) = &flags.preview_path {
        lines.push(format!(
            "--preview-path {}",
            quote(&preview.display().to_string())
        ));
    }
    if flags.no_open {
        lines.push("--no-open".to_string());
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", quote(&log.display().to_string())));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
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

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--draft-key"
                | "--name"
                | "--indent"
                | "--indent-width"
                | "--debounce-ms"
                | "--store-dir"
                | "--preview-path"
                | "--log-file"
        );
        let value = if takes_value {
            match inline {
                Some(value) => Some(value),
                None => {
                    let next = tokens.get(i + 1).map(String::as_str);
                    if next.is_some() {
                        i += 1;
                    }
                    next
                }
            }
        } else {
            None
        };

        match (name, value) {
            ("--no-autoload", _) => flags.no_autoload = true,
            ("--no-open", _) => flags.no_open = true,
            ("--draft-key", Some(v)) if !v.is_empty() => flags.draft_key = Some(v.to_string()),
            ("--name", Some(v)) => flags.name = Some(v.to_string()),
            ("--indent", Some(v)) => flags.indent = parse_indent(v),
            ("--indent-width", Some(v)) => flags.indent_width = v.parse().ok(),
            ("--debounce-ms", Some(v)) => flags.debounce_ms = v.parse().ok(),
            ("--store-dir", Some(v)) => flags.store_dir = Some(PathBuf::from(v)),
            ("--preview-path", Some(v)) => flags.preview_path = Some(PathBuf::from(v)),
            ("--log-file", Some(v)) => flags.log_file = Some(PathBuf::from(v)),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_indent(s: &str) -> Option<IndentStyle> {
    match s {
        "tab" => Some(IndentStyle::Tab),
        "spaces" => Some(IndentStyle::Spaces),
        _ => None,
    }
}

/// Split a config line on whitespace, keeping double-quoted runs together.
/// Inside quotes, `\"` and `\\` stand for a literal quote and backslash.
fn split_flag_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes && matches!(chars.peek(), Some('"' | '\\')) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    tokens
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"') {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
