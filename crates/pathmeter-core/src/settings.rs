use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::WaypointMatch;

/// Settings for path measurements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// How the next waypoint is located in the path when computing the remaining
    /// distance.
    pub waypoint_match: WaypointMatch,
    /// Distance from the path under which a point counts as being along the path, in
    /// world units.
    pub proximity_radius: f64,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            waypoint_match: WaypointMatch::Exact,
            proximity_radius: 5.0,
        }
    }
}

impl PathSettings {
    /// Load the settings from a file, or store the default settings if the file does not
    /// exist. Settings that fail to parse are replaced by the defaults for this run, the
    /// file is left untouched.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let Some(contents) = Self::read_or_insert(path.as_ref())? else {
            return Ok(Self::default());
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                log::error!("Failed to parse path settings: {}", err);
                Ok(Self::default())
            }
        }
    }

    /// Like [`PathSettings::load_or_insert`], but a file that fails to parse is an error
    /// instead of falling back to the defaults. Use this before writing the settings back.
    pub fn load_or_insert_strict(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let Some(contents) = Self::read_or_insert(path)? else {
            return Ok(Self::default());
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse path settings in {}", path.display()))
    }

    /// Read the settings file. If it does not exist, write the defaults and return `None`.
    fn read_or_insert(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                fs::write(path, serde_json::to_string_pretty(&settings)?).with_context(|| {
                    format!("Failed to write path settings to {}", path.display())
                })?;
                log::info!("Wrote default path settings to {}", path.display());
                Ok(None)
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read path settings from {}", path.display())),
        }
    }

    /// Check that every value can be stored and loaded back. JSON has no representation
    /// for non-finite floats, they would be written as `null`.
    pub fn validate(&self) -> Result<()> {
        if let WaypointMatch::Within { tolerance } = self.waypoint_match {
            if !tolerance.is_finite() || tolerance < 0.0 {
                bail!("Waypoint tolerance must be finite and not negative, got {}", tolerance);
            }
        }
        if !self.proximity_radius.is_finite() || self.proximity_radius < 0.0 {
            bail!(
                "Proximity radius must be finite and not negative, got {}",
                self.proximity_radius
            );
        }
        Ok(())
    }

    /// Store the settings in the given file.
    pub async fn store(&self, path: impl AsRef<Path>) {
        let contents = match serde_json::to_string_pretty(self) {
            Ok(contents) => contents,
            Err(err) => {
                log::error!("Failed to serialize path settings: {}", err);
                return;
            }
        };
        if let Err(err) = tokio::fs::write(path, contents).await {
            log::error!("Failed to write path settings: {}", err);
        }
    }
}
