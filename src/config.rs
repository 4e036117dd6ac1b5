use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::EditDefaults;
use crate::export::{ExportFormat, ExportSize};

const APP_DIR: &str = "icon-factory";
const LOCAL_FILE: &str = ".iconfactoryrc";

/// Flags that can be persisted in a config file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub color: Option<String>,
    pub size: Option<f64>,
    pub stroke_width: Option<f64>,
    pub export_format: Option<ExportFormat>,
    pub export_size: Option<ExportSize>,
    pub library: Option<PathBuf>,
    pub no_root_fill: bool,
    pub perf: bool,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            color: other.color.clone().or_else(|| self.color.clone()),
            size: other.size.or(self.size),
            stroke_width: other.stroke_width.or(self.stroke_width),
            export_format: other.export_format.or(self.export_format),
            export_size: other.export_size.or(self.export_size),
            library: other.library.clone().or_else(|| self.library.clone()),
            no_root_fill: self.no_root_fill || other.no_root_fill,
            perf: self.perf || other.perf,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// Working values for a new edit session.
    pub fn edit_defaults(&self) -> EditDefaults {
        let base = EditDefaults::default();
        EditDefaults {
            color: self.color.clone().unwrap_or(base.color),
            size: self.size.unwrap_or(base.size),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
            root_fill_fallback: !self.no_root_fill,
        }
    }

    /// Library file location, defaulting next to the global config.
    pub fn library_path(&self) -> PathBuf {
        self.library.clone().unwrap_or_else(default_library_path)
    }
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join(APP_DIR));
        }
    }

    #[cfg(target_os = "macos")]
    {
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
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join(APP_DIR));
        }
    }

    None
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(local_override_path, |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

pub fn default_library_path() -> PathBuf {
    config_dir().map_or_else(
        || PathBuf::from("icon-library.json"),
        |dir| dir.join("library.json"),
    )
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
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Split one config line into tokens. A value flag takes the rest of its
/// line as the value, so colors like `rgb(0, 0, 0)` and paths with spaces
/// survive a save and load.
fn line_tokens(line: &str) -> Vec<String> {
    match line.split_once(char::is_whitespace) {
        Some((name, value)) if is_value_flag(name) => {
            vec![name.to_string(), value.trim().to_string()]
        }
        _ => line.split_whitespace().map(ToOwned::to_owned).collect(),
    }
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# icon-factory defaults (saved with --save)".to_string()];
    if let Some(color) = &flags.color {
        lines.push(format!("--color {color}"));
    }
    if let Some(size) = flags.size {
        lines.push(format!("--size {size}"));
    }
    if let Some(width) = flags.stroke_width {
        lines.push(format!("--stroke-width {width}"));
    }
    if let Some(format) = flags.export_format {
        lines.push(format!("--export-format {format}"));
    }
    if let Some(size) = flags.export_size {
        lines.push(format!("--export-size {size}"));
    }
    if let Some(path) = &flags.library {
        lines.push(format!("--library {}", path.display()));
    }
    if flags.no_root_fill {
        lines.push("--no-root-fill".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
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

/// Pick the persisted flags out of a token list. Unknown tokens and values
/// that do not parse are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-root-fill" => flags.no_root_fill = true,
            "--perf" => flags.perf = true,
            _ => {
                let (name, inline) = match token.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (token, None),
                };
                if is_value_flag(name) {
                    let value = match inline {
                        Some(value) => Some(value),
                        None => {
                            let next = tokens.get(i + 1).map(String::as_str);
                            if next.is_some() {
                                i += 1;
                            }
                            next
                        }
                    };
                    if let Some(value) = value {
                        apply_value(&mut flags, name, value);
                    }
                }
            }
        }
        i += 1;
    }
    flags
}

fn is_value_flag(name: &str) -> bool {
    matches!(
        name,
        "--color"
            | "--size"
            | "--stroke-width"
            | "--export-format"
            | "--export-size"
            | "--library"
            | "--debug-log"
    )
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--color" => flags.color = Some(value.to_string()),
        "--size" => flags.size = parse_number(value).filter(|s| *s > 0.0),
        "--stroke-width" => flags.stroke_width = parse_number(value).filter(|w| *w >= 0.0),
        "--export-format" => flags.export_format = ExportFormat::parse(value),
        "--export-size" => {
            flags.export_size = value.parse::<u32>().ok().and_then(|s| ExportSize::try_from(s).ok());
        }
        "--library" => flags.library = Some(PathBuf::from(value)),
        "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "icon-factory",
            "edit",
            "--color",
            "#ff0000",
            "--size=48",
            "--export-format",
            "png",
            "--export-size=64",
            "--no-root-fill",
            "--debug-log=debug.log",
            "icon.svg",
        ]));
        assert_eq!(flags.color.as_deref(), Some("#ff0000"));
        assert_eq!(flags.size, Some(48.0));
        assert_eq!(flags.export_format, Some(ExportFormat::Png));
        assert_eq!(flags.export_size.map(ExportSize::get), Some(64));
        assert!(flags.no_root_fill);
        assert_eq!(flags.debug_log, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn test_parse_flag_tokens_skips_bad_values() {
        let flags = parse_flag_tokens(&tokens(&[
            "--size",
            "-3",
            "--export-size",
            "50",
            "--export-format=gif",
            "--stroke-width",
            "abc",
        ]));
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            color: Some("blue".into()),
            size: Some(24.0),
            perf: true,
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            color: Some("red".into()),
            no_root_fill: true,
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.color.as_deref(), Some("red"));
        assert_eq!(merged.size, Some(24.0));
        assert!(merged.perf);
        assert!(merged.no_root_fill);
    }

    #[test]
    fn test_edit_defaults_from_flags() {
        let defaults = ConfigFlags {
            stroke_width: Some(1.5),
            no_root_fill: true,
            ..ConfigFlags::default()
        }
        .edit_defaults();
        assert_eq!(defaults.color, "#000000");
        assert_eq!(defaults.size, 32.0);
        assert_eq!(defaults.stroke_width, 1.5);
        assert!(!defaults.root_fill_fallback);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".iconfactoryrc");
        let flags = ConfigFlags {
            color: Some("#00ff00".into()),
            size: Some(48.0),
            stroke_width: Some(2.5),
            export_format: Some(ExportFormat::Jpg),
            export_size: Some(ExportSize::try_from(128).unwrap()),
            library: Some(PathBuf::from("lib.json")),
            no_root_fill: true,
            perf: true,
            debug_log: Some(PathBuf::from("debug.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_config_values_with_spaces_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".iconfactoryrc");
        let flags = ConfigFlags {
            color: Some("rgb(0, 0, 0)".into()),
            library: Some(PathBuf::from("/path with space/lib.json")),
            debug_log: Some(PathBuf::from("logs dir/debug.log")),
            perf: true,
            ..ConfigFlags::default()
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);
    }

    #[test]
    fn test_config_line_keeps_boolean_flags_together() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".iconfactoryrc");
        fs::write(&path, "--perf --no-root-fill\n--size=24\n").unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert!(loaded.perf);
        assert!(loaded.no_root_fill);
        assert_eq!(loaded.size, Some(24.0));
    }
}
