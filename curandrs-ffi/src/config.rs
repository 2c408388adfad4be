use serde::Deserialize;

use crate::logging::LogLevel;

/// Options accepted by `curandrs_on_load` as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Initial verbosity, 0 (quiet) to 6 (debug trace).
    pub log_level: i32,
    /// Install the stderr logger when the process has none.
    pub install_logger: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warning as i32,
            install_logger: true,
        }
    }
}

impl LoadOptions {
    /// Parse options; an empty document means defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_raw(self.log_level)
    }
}
