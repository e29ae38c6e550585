//! Search files for the command-line driver.
//!
//! A search file bundles everything one search needs: the activity
//! configuration and dates, the raw routing API response, an optional
//! translation table and the picks to apply.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::api::ConnectionsResponse;
use crate::domain::Direction;
use crate::engine::{
    ActivityConfig, ActivityDates, CompatibilityEngine, ConfigError, EngineSnapshot,
    SelectionError,
};
use crate::format::Translations;

/// Errors from loading or running a search file.
#[derive(Debug, thiserror::Error)]
pub enum SearchFileError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid search
    #[error("invalid search file: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration or dates are unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pick names no candidate
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Candidate indices to select, per side.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pick {
    pub to: Option<usize>,
    pub from: Option<usize>,
}

/// One search, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFile {
    pub config: ActivityConfig,
    pub dates: ActivityDates,

    #[serde(default)]
    pub connections: ConnectionsResponse,

    /// Overrides for the built-in English strings.
    #[serde(default)]
    pub translations: Translations,

    #[serde(default)]
    pub pick: Pick,

    /// Select the API's recommended pair before applying `pick`.
    #[serde(default)]
    pub pick_recommended: bool,
}

impl SearchFile {
    /// Read a search file from disk.
    pub fn load(path: &Path) -> Result<Self, SearchFileError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SearchFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, SearchFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the engine, apply the picks and return the resulting state.
    pub fn run(self) -> Result<EngineSnapshot, SearchFileError> {
        let mut engine = CompatibilityEngine::from_response(
            &self.connections,
            self.config,
            self.dates,
            self.translations,
        )?;
        info!(
            to = engine.candidates(Direction::ToActivity).len(),
            from = engine.candidates(Direction::FromActivity).len(),
            "Loaded candidates"
        );

        if self.pick_recommended {
            engine.select_recommended()?;
        }
        if let Some(to) = self.pick.to {
            engine.select_to(Some(to))?;
        }
        if let Some(from) = self.pick.from {
            engine.select_from(Some(from))?;
        }

        Ok(engine.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SelectionPhase;
    use tempfile::tempdir;

    const SEARCH: &str = r#"{
        "config": {
            "earliestStartTime": "09:00",
            "latestStartTime": "10:00",
            "earliestEndTime": "16:00",
            "latestEndTime": "18:00",
            "durationMinutes": 420,
            "timezone": "Europe/Vienna"
        },
        "dates": {"start": "2024-01-15"},
        "connections": {
            "to": [{
                "id": "t1",
                "legs": [{
                    "type": "RIDE",
                    "departure": "2024-01-15T07:10:00Z",
                    "arrival": "2024-01-15T07:55:00Z"
                }]
            }],
            "from": [{
                "id": "f1",
                "legs": [{
                    "type": "RIDE",
                    "departure": "2024-01-15T15:30:00Z",
                    "arrival": "2024-01-15T16:15:00Z"
                }]
            }]
        },
        "pickRecommended": true
    }"#;

    #[test]
    fn load_and_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, SEARCH).unwrap();

        let snapshot = SearchFile::load(&path).unwrap().run().unwrap();

        assert_eq!(snapshot.phase, SelectionPhase::Both);
        // 08:55 arrival is before the 09:00 earliest start.
        let times = &snapshot.activity_times;
        assert_eq!(times.start().map(|t| t.to_string()), Some("09:00".into()));
        assert_eq!(times.end().map(|t| t.to_string()), Some("16:30".into()));
        assert_eq!(times.duration(), "7:30h");
        assert!(!times.warning_duration());
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let err = SearchFile::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SearchFileError::Io { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let json = SEARCH.replace("\"durationMinutes\": 420", "\"durationMinutes\": 0");
        let err = SearchFile::from_json(&json).unwrap().run().unwrap_err();
        assert!(matches!(
            err,
            SearchFileError::Config(ConfigError::NonPositiveDuration(0))
        ));
    }

    #[test]
    fn unknown_pick_is_rejected() {
        let json = SEARCH.replace("\"pickRecommended\": true", "\"pick\": {\"to\": 4}");
        let err = SearchFile::from_json(&json).unwrap().run().unwrap_err();
        assert_eq!(err.to_string(), "no connection to the activity at index 4");
    }
}
