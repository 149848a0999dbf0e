//! Editor preferences
//!
//! Persistent timeline-editing settings:
//! - Snapping behaviour
//! - Trim handle size
//! - Undo history depth
//! - Default timebases for new sequences

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tl_core::{Rational, SnapSettings, TlResult, rational};

use crate::Sequence;

/// Timeline editor preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Snapping targets and threshold
    pub snapping: SnapSettings,
    /// Width of the trim zone at each block edge (pixels)
    pub trim_handle_px: f64,
    /// Maximum undo history size
    pub max_undo_history: usize,
    /// Frame duration for new sequences
    pub video_timebase: Rational,
    /// Sample duration for new sequences
    pub audio_timebase: Rational,
    /// Push edits that change nothing onto the undo stack anyway
    pub push_noop_commands: bool,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            snapping: SnapSettings::default(),
            trim_handle_px: 8.0,
            max_undo_history: 500,
            video_timebase: rational(1, 30),
            audio_timebase: rational(1, 48000),
            push_noop_commands: false,
        }
    }
}

impl EditorPreferences {
    /// Empty sequence on the preferred timebases
    pub fn new_sequence(&self, name: &str) -> Sequence {
        Sequence::with_timebases(name, self.video_timebase, self.audio_timebase)
    }

    /// Load preferences from standard location
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load preferences from specified path, falling back to defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable preferences {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save preferences to standard location
    pub fn save(&self) -> TlResult<()> {
        self.save_to(Self::default_path())
    }

    /// Save preferences to specified path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> TlResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Get default preferences file path
    pub fn default_path() -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .map(|h| h.join("Library/Application Support/Timeline Editor"))
                .unwrap_or_else(|| PathBuf::from("."))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("Timeline Editor"))
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            dirs::config_dir()
                .map(|d| d.join("timeline-editor"))
                .unwrap_or_else(|| PathBuf::from("."))
        };
        base.join("editor.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = EditorPreferences::default();
        assert!(prefs.snapping.enabled);
        assert_eq!(prefs.max_undo_history, 500);
        assert_eq!(prefs.video_timebase, rational(1, 30));
        assert!(!prefs.push_noop_commands);
    }

    #[test]
    fn test_new_sequence_uses_timebases() {
        let prefs = EditorPreferences {
            video_timebase: rational(1, 25),
            audio_timebase: rational(1, 44100),
            ..Default::default()
        };
        let seq = prefs.new_sequence("Cut");
        assert_eq!(seq.name, "Cut");
        assert_eq!(seq.video_timebase, rational(1, 25));
        assert_eq!(seq.audio_timebase, rational(1, 44100));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("editor.json");

        let mut prefs = EditorPreferences::default();
        prefs.snapping.threshold_px = 4.0;
        prefs.max_undo_history = 32;
        prefs.save_to(&path).unwrap();

        assert_eq!(EditorPreferences::load_from(&path), prefs);
    }

    #[test]
    fn test_partial_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{ "trim_handle_px": 12.0 }"#).unwrap();
        let prefs = EditorPreferences::load_from(&partial);
        assert_eq!(prefs.trim_handle_px, 12.0);
        assert_eq!(prefs.max_undo_history, 500);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(EditorPreferences::load_from(&broken), EditorPreferences::default());
        assert_eq!(
            EditorPreferences::load_from(dir.path().join("missing.json")),
            EditorPreferences::default()
        );
    }
}
