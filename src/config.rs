use std::path::Path;

use tracing::warn;

use crate::ai::mcts::MctsConfig;
use crate::error::ConfigError;
use crate::game::Player;

/// Who moves first in an interactive game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Starter {
    Human,
    #[default]
    Computer,
}

impl Starter {
    /// The computer plays Red, the human plays Yellow.
    pub fn player(self) -> Player {
        match self {
            Starter::Human => Player::Yellow,
            Starter::Computer => Player::Red,
        }
    }
}

/// Settings for the interactive game.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub first: Starter,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            first: Starter::Computer,
        }
    }
}

/// Settings for the headless `arena` binary.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Number of games per match.
    pub games: usize,
    /// Per-move budget for MCTS agents in the arena.
    pub time_budget_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            games: 10,
            time_budget_ms: 200,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: MctsConfig,
    pub game: GameConfig,
    pub arena: ArenaConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.search.exploration_constant;
        if !c.is_finite() || c < 0.0 {
            return Err(ConfigError::Validation(
                "search.exploration_constant must be finite and >= 0".into(),
            ));
        }
        if self.search.iteration_limit == Some(0) {
            return Err(ConfigError::Validation(
                "search.iteration_limit must be >= 1 when set".into(),
            ));
        }
        if self.search.max_nodes == 0 {
            return Err(ConfigError::Validation(
                "search.max_nodes must be > 0".into(),
            ));
        }
        if self.arena.games == 0 {
            return Err(ConfigError::Validation(
                "arena.games must be > 0".into(),
            ));
        }
        if self.arena.time_budget_ms == 0 {
            return Err(ConfigError::Validation(
                "arena.time_budget_ms must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mcts::FinalSelection;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[search]
time_budget_ms = 1500
final_selection = "robust"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search.time_budget_ms, 1500);
        assert_eq!(config.search.final_selection, FinalSelection::Robust);
        // Other fields should be defaults
        assert!((config.search.exploration_constant - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(config.game.first, Starter::Computer);
        assert_eq!(config.arena.games, 10);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_starter_maps_to_player() {
        assert_eq!(Starter::Computer.player(), Player::Red);
        assert_eq!(Starter::Human.player(), Player::Yellow);
        let config: AppConfig = toml::from_str("[game]\nfirst = \"human\"\n").unwrap();
        assert_eq!(config.game.first, Starter::Human);
    }

    #[test]
    fn test_validation_rejects_negative_exploration() {
        let mut config = AppConfig::default();
        config.search.exploration_constant = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan_exploration() {
        let mut config = AppConfig::default();
        config.search.exploration_constant = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_allows_zero_move_budget() {
        let mut config = AppConfig::default();
        config.search.time_budget_ms = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_iteration_limit() {
        let mut config = AppConfig::default();
        config.search.iteration_limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_max_nodes() {
        let mut config = AppConfig::default();
        config.search.max_nodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_games() {
        let mut config = AppConfig::default();
        config.arena.games = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_arena_budget() {
        let mut config = AppConfig::default();
        config.arena.time_budget_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.search.time_budget_ms, 5_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[arena]
games = 4
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.arena.games, 4);
        // Others are defaults
        assert_eq!(config.search.time_budget_ms, 5_000);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[arena]\ngames = 0\n").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = AppConfig::load(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config, AppConfig::default());
    }
}
