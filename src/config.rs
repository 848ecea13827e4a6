use crate::error::{TilawahError, TilawahResult};
use crate::session::PolicyKind;
use crate::utils::fuzzy::WordMetric;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that points at an alternate config file
pub const CONFIG_ENV: &str = "TILAWAH_CONFIG";

/// Scoring thresholds, all on the 0-100 scale unless noted
///
/// Defaults reproduce the behavior recitation results have been
/// compared against, so changing them changes pass/fail outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Verse matcher keeps candidates strictly above this
    pub match_floor: f64,
    /// Added to similarity when the keyword booster fires
    pub keyword_boost: f64,
    /// Shared keywords needed for the boost
    pub keyword_min_matches: usize,
    /// Matcher result limit
    pub max_candidates: usize,
    /// Both normalized texts must be longer than this (chars) for the
    /// containment fast path
    pub fast_path_min_len: usize,
    /// A word is correct strictly above this
    pub word_correct: f64,
    /// A verse is correct at or above this accuracy
    pub verse_correct: f64,
    /// Sequential policy detects the next verse at or above this accuracy
    pub detection: f64,
    /// Best-match policy tracks a verse strictly above this
    pub best_match_floor: f64,
    /// Best-match policy lets the next verse in sequence replace a stored
    /// result strictly above this
    pub progression: f64,
    /// Transcripts shorter than this (chars) are not evaluated
    pub min_evaluation_chars: usize,
    /// Discovery transcripts shorter than this (chars) are not evaluated
    pub discovery_min_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            match_floor: 30.0,
            keyword_boost: 10.0,
            keyword_min_matches: 3,
            max_candidates: 3,
            fast_path_min_len: 10,
            word_correct: 80.0,
            verse_correct: 90.0,
            detection: 70.0,
            best_match_floor: 30.0,
            progression: 35.0,
            min_evaluation_chars: 3,
            discovery_min_chars: 4,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Corpus JSON (`{"ayahs": [...]}`)
    pub corpus_path: String,
    pub log_level: String,

    // Session
    pub policy: PolicyKind,
    pub verses_per_session: usize,
    pub word_metric: WordMetric,

    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: dirs::data_dir()
                .unwrap_or_default()
                .join("tilawah/quran.json")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
            policy: PolicyKind::Sequential,
            verses_per_session: 10,
            word_metric: WordMetric::Positional,
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load config from file, or fall back to defaults
    pub fn load() -> TilawahResult<Self> {
        let config_path = config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Graceful degradation: keep the broken file around for debugging
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = config_path.with_extension("json.corrupt");
                let _ = std::fs::rename(&config_path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> TilawahResult<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Reject settings the matcher cannot work with
    pub fn validate(&self) -> TilawahResult<()> {
        if self.verses_per_session == 0 {
            return Err(TilawahError::Config(
                "verses_per_session must be at least 1".to_string(),
            ));
        }
        if self.thresholds.max_candidates == 0 {
            return Err(TilawahError::Config(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        let t = &self.thresholds;
        for (name, value) in [
            ("match_floor", t.match_floor),
            ("keyword_boost", t.keyword_boost),
            ("word_correct", t.word_correct),
            ("verse_correct", t.verse_correct),
            ("detection", t.detection),
            ("best_match_floor", t.best_match_floor),
            ("progression", t.progression),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(TilawahError::Config(format!(
                    "{} must be within 0-100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Config file location: `$TILAWAH_CONFIG`, else `<config dir>/tilawah/config.json`
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilawah")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.policy, PolicyKind::Sequential);
        assert_eq!(config.verses_per_session, 10);
        assert_eq!(config.word_metric, WordMetric::Positional);
        assert!(config.corpus_path.ends_with("quran.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.match_floor, 30.0);
        assert_eq!(t.keyword_boost, 10.0);
        assert_eq!(t.keyword_min_matches, 3);
        assert_eq!(t.max_candidates, 3);
        assert_eq!(t.word_correct, 80.0);
        assert_eq!(t.verse_correct, 90.0);
        assert_eq!(t.detection, 70.0);
        assert_eq!(t.progression, 35.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.policy, restored.policy);
        assert_eq!(config.thresholds, restored.thresholds);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"policy":"best-match","thresholds":{"detection":80.0}}"#;
        let config: Config = serde_json::from_str(json).expect("partial config");
        assert_eq!(config.policy, PolicyKind::BestMatch);
        assert_eq!(config.thresholds.detection, 80.0);
        assert_eq!(config.thresholds.match_floor, 30.0);
        assert_eq!(config.verses_per_session, 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.verses_per_session = 0;
        assert!(matches!(config.validate(), Err(TilawahError::Config(_))));

        let mut config = Config::default();
        config.thresholds.detection = 120.0;
        assert!(matches!(config.validate(), Err(TilawahError::Config(_))));

        let mut config = Config::default();
        config.thresholds.keyword_boost = -5.0;
        let err = config.validate().expect_err("negative boost");
        assert!(err.to_string().contains("keyword_boost"));
    }
}
