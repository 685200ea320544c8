use crate::error::ConfigError;
use crate::games::GameKind;
use chromaspan_core::PALETTE_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

pub const MAX_TRIALS: usize = 500;
pub const MAX_DURATION_MS: u64 = 60_000;
pub const MIN_DISPLAY_MS: u64 = 50;

/// Per-game timing and budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Trials per session. Block-based drills treat it as a cap.
    pub trial_count: usize,
    /// How long each presented item stays visible.
    pub display_ms: u64,
    /// Blank after each presented item.
    pub gap_ms: u64,
    /// Blank between the last item and the response window.
    pub retention_ms: u64,
    /// Response window; `None` waits indefinitely.
    pub response_timeout_ms: Option<u64>,
    pub feedback_ms: u64,
    pub inter_trial_ms: u64,
    pub initial_span: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            trial_count: 20,
            display_ms: 500,
            gap_ms: 250,
            retention_ms: 500,
            response_timeout_ms: None,
            feedback_ms: 1500,
            inter_trial_ms: 0,
            initial_span: 1,
        }
    }
}

impl GameConfig {
    /// Brings every field into its valid range, warning about each change.
    pub fn clamped(self) -> Self {
        let out = Self {
            trial_count: self.trial_count.clamp(1, MAX_TRIALS),
            display_ms: self.display_ms.clamp(MIN_DISPLAY_MS, MAX_DURATION_MS),
            gap_ms: self.gap_ms.min(MAX_DURATION_MS),
            retention_ms: self.retention_ms.min(MAX_DURATION_MS),
            response_timeout_ms: self
                .response_timeout_ms
                .map(|ms| ms.clamp(MIN_DISPLAY_MS, MAX_DURATION_MS)),
            feedback_ms: self.feedback_ms.min(MAX_DURATION_MS),
            inter_trial_ms: self.inter_trial_ms.min(MAX_DURATION_MS),
            initial_span: self.initial_span.clamp(1, PALETTE_SIZE),
        };
        if out != self {
            warn!(?self, clamped = ?out, "game config out of range, clamped");
        }
        out
    }

    /// Applies file overrides on top of these values, then clamps.
    pub fn with_overrides(mut self, overrides: &GameOverrides) -> Self {
        if let Some(v) = overrides.trial_count {
            self.trial_count = non_negative(v) as usize;
        }
        if let Some(v) = overrides.display_ms {
            self.display_ms = non_negative(v);
        }
        if let Some(v) = overrides.gap_ms {
            self.gap_ms = non_negative(v);
        }
        if let Some(v) = overrides.retention_ms {
            self.retention_ms = non_negative(v);
        }
        if let Some(v) = overrides.response_timeout_ms {
            // Zero or negative disables the timeout.
            self.response_timeout_ms = (v > 0).then_some(v as u64);
        }
        if let Some(v) = overrides.feedback_ms {
            self.feedback_ms = non_negative(v);
        }
        if let Some(v) = overrides.inter_trial_ms {
            self.inter_trial_ms = non_negative(v);
        }
        if let Some(v) = overrides.initial_span {
            self.initial_span = non_negative(v) as usize;
        }
        self.clamped()
    }
}

fn non_negative(v: i64) -> u64 {
    v.max(0) as u64
}

/// Optional per-game values read from the config file. Signed so that
/// out-of-range input is clamped instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverrides {
    pub trial_count: Option<i64>,
    pub display_ms: Option<i64>,
    pub gap_ms: Option<i64>,
    pub retention_ms: Option<i64>,
    pub response_timeout_ms: Option<i64>,
    pub feedback_ms: Option<i64>,
    pub inter_trial_ms: Option<i64>,
    pub initial_span: Option<i64>,
}

/// JSON object of overrides keyed by game slug:
///
/// ```json
/// { "early-span": { "trial_count": 10, "display_ms": 400 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ConfigFile {
    games: BTreeMap<String, GameOverrides>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for slug in file.unknown_games() {
            warn!(game = slug, path = %path.display(), "config names an unknown game, ignored");
        }
        Ok(file)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn overrides(&self, kind: GameKind) -> Option<&GameOverrides> {
        self.games.get(kind.slug())
    }

    /// Defaults for `kind` with this file's overrides applied.
    pub fn config_for(&self, kind: GameKind) -> GameConfig {
        let base = kind.default_config();
        match self.overrides(kind) {
            Some(overrides) => base.with_overrides(overrides),
            None => base,
        }
    }

    pub fn unknown_games(&self) -> Vec<&str> {
        self.games
            .keys()
            .filter(|slug| slug.parse::<GameKind>().is_err())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn clamps_out_of_range_values() {
        let config = GameConfig {
            trial_count: 0,
            display_ms: 1,
            initial_span: 99,
            response_timeout_ms: Some(10_000_000),
            ..GameConfig::default()
        }
        .clamped();
        assert_eq!(config.trial_count, 1);
        assert_eq!(config.display_ms, MIN_DISPLAY_MS);
        assert_eq!(config.initial_span, PALETTE_SIZE);
        assert_eq!(config.response_timeout_ms, Some(MAX_DURATION_MS));
    }

    #[test]
    fn defaults_are_already_in_range() {
        for kind in GameKind::ALL {
            let config = kind.default_config();
            assert_eq!(config.clone().clamped(), config, "{kind:?}");
        }
    }

    #[test]
    fn overrides_merge_and_clamp() {
        let file = ConfigFile::parse(
            r#"{
                "early-span": { "trial_count": 5, "initial_span": -3, "gap_ms": 0 },
                "early-match": { "response_timeout_ms": 0 },
                "not-a-game": { "trial_count": 1 }
            }"#,
        )
        .expect("valid json");

        let span = file.config_for(GameKind::EarlySpan);
        assert_eq!(span.trial_count, 5);
        assert_eq!(span.initial_span, 1);
        assert_eq!(span.gap_ms, 0);
        assert_eq!(span.display_ms, GameKind::EarlySpan.default_config().display_ms);

        assert_eq!(file.config_for(GameKind::EarlyMatch).response_timeout_ms, None);
        assert_eq!(
            file.config_for(GameKind::NBack),
            GameKind::NBack.default_config()
        );
        assert_eq!(file.unknown_games(), vec!["not-a-game"]);
    }

    #[test]
    fn load_reports_path_on_errors() {
        let missing = Path::new("/definitely/not/here.json");
        let err = ConfigFile::load(missing).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("here.json"));

        let mut bad = tempfile::NamedTempFile::new().expect("temp file");
        write!(bad, "{{ not json").expect("write");
        let err = ConfigFile::load(bad.path()).expect_err("bad json");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_a_file() {
        let mut good = tempfile::NamedTempFile::new().expect("temp file");
        write!(good, r#"{{ "n-back": {{ "trial_count": 12 }} }}"#).expect("write");
        let file = ConfigFile::load(good.path()).expect("valid file");
        assert_eq!(file.config_for(GameKind::NBack).trial_count, 12);
    }
}
