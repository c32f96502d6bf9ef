/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
}

/// All deadlines and rate limits, in milliseconds of session clock.
#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub move_cooldown_ms: u64,
    pub danger_duration_ms: u64,
    pub level_time_ms: u64,
    pub dew_respawn_interval_ms: u64,
    pub dew_pulse_ms: u64,
    pub shade_linger_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    /// Distinct folded tiles Mimosa needs before the level can finish.
    pub required_shades: usize,
    /// Moisture units Moss can carry at once.
    pub moisture_cap: u32,
    /// Generator floor: every level gets at least this many Sun tiles.
    pub min_sun_tiles: usize,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_move_cooldown")]
    move_cooldown_ms: u64,
    #[serde(default = "default_danger_duration")]
    danger_duration_ms: u64,
    #[serde(default = "default_level_time")]
    level_time_ms: u64,
    #[serde(default = "default_dew_respawn")]
    dew_respawn_interval_ms: u64,
    #[serde(default = "default_dew_pulse")]
    dew_pulse_ms: u64,
    #[serde(default = "default_shade_linger")]
    shade_linger_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_required_shades")]
    required_shades: usize,
    #[serde(default = "default_moisture_cap")]
    moisture_cap: u32,
    #[serde(default = "default_min_sun")]
    min_sun_tiles: usize,
}

// ── Defaults ──

fn default_move_cooldown() -> u64 { 110 }
fn default_danger_duration() -> u64 { 7000 }
fn default_level_time() -> u64 { 120_000 }   // two minutes per level
fn default_dew_respawn() -> u64 { 30_000 }
fn default_dew_pulse() -> u64 { 2200 }
fn default_shade_linger() -> u64 { 3500 }

fn default_required_shades() -> usize { 5 }
fn default_moisture_cap() -> u32 { 5 }
fn default_min_sun() -> usize { 5 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            move_cooldown_ms: default_move_cooldown(),
            danger_duration_ms: default_danger_duration(),
            level_time_ms: default_level_time(),
            dew_respawn_interval_ms: default_dew_respawn(),
            dew_pulse_ms: default_dew_pulse(),
            shade_linger_ms: default_shade_linger(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            required_shades: default_required_shades(),
            moisture_cap: default_moisture_cap(),
            min_sun_tiles: default_min_sun(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        GameConfig::from_toml(load_toml(&candidate_dirs()))
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                move_cooldown_ms: toml_cfg.timing.move_cooldown_ms,
                danger_duration_ms: toml_cfg.timing.danger_duration_ms,
                level_time_ms: toml_cfg.timing.level_time_ms,
                dew_respawn_interval_ms: toml_cfg.timing.dew_respawn_interval_ms,
                dew_pulse_ms: toml_cfg.timing.dew_pulse_ms,
                shade_linger_ms: toml_cfg.timing.shade_linger_ms,
            },
            rules: RulesConfig {
                required_shades: toml_cfg.rules.required_shades,
                moisture_cap: toml_cfg.rules.moisture_cap,
                min_sun_tiles: toml_cfg.rules.min_sun_tiles,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: TomlConfig = toml::from_str("[timing]\nmove_cooldown_ms = 80\n").unwrap();
        let cfg = GameConfig::from_toml(cfg);
        assert_eq!(cfg.timing.move_cooldown_ms, 80);
        assert_eq!(cfg.timing.danger_duration_ms, 7000);
        assert_eq!(cfg.rules.required_shades, 5);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg = GameConfig::from_toml(toml::from_str("").unwrap());
        assert_eq!(cfg.timing.level_time_ms, 120_000);
        assert_eq!(cfg.rules.moisture_cap, 5);
        assert_eq!(cfg.rules.min_sun_tiles, 5);
    }
}
