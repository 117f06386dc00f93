//! Runner settings loaded from `.testrunner.json`.

use crate::compare::CompareMode;
use crate::error::SettingsError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The name of the settings file, looked up in the working directory.
pub const SETTINGS_FILENAME: &str = ".testrunner.json";

/// Executable used when no settings provide one.
pub const DEFAULT_EXECUTABLE: &str = "proj1.exe";

/// Contents of the settings file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Program under test, run through the shell.
    #[serde(default)]
    pub executable: Option<String>,

    /// Timeout per test in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Output comparison policy.
    #[serde(default)]
    pub compare: Option<CompareMode>,
}

impl Settings {
    pub fn executable(&self) -> &str {
        self.executable.as_deref().unwrap_or(DEFAULT_EXECUTABLE)
    }

    /// The configured timeout. Zero is not a usable timeout and reads as unset.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// Load settings from `path`.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_full_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(
            &path,
            r#"{ "executable": "./a.out", "timeout": 5, "compare": "diff" }"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.executable(), "./a.out");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(settings.compare, Some(CompareMode::Diff));
    }

    #[test]
    fn empty_object_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "{}").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.executable(), DEFAULT_EXECUTABLE);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{ "executable": "prog", "colour": true }"#).unwrap();

        assert_eq!(load_settings(&path).unwrap().executable(), "prog");
    }

    #[test]
    fn zero_timeout_reads_as_unset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{ "timeout": 0 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.timeout, Some(0));
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = load_settings(&dir.path().join(SETTINGS_FILENAME));

        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "{ executable: ").unwrap();

        assert!(matches!(load_settings(&path), Err(SettingsError::Json { .. })));
    }
}
