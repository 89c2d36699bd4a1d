//! Settings, read from a kebab-case YAML document. Every key is optional.
//!
//! ```yaml
//! audio-extension: mp3
//! seek-bar:
//!   left-inset: 100
//!   width-fraction: 0.5
//!   band-top: 22
//!   band-height: 10
//! overlay:
//!   fill: "rgba(255, 196, 0, 0.45)"
//!   z-index: 1000
//! insert:
//!   start: 0
//! ```

use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;
use tracing::info;

use crate::error::AudiomarkError;
use crate::playback::{Binder, EmpiricalSeekBar, OverlayRenderer, OverlayStyle, OverlaySurface};

/// Raw settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
struct RawSettings {
    audio_extension: Option<String>,
    seek_bar: Option<EmpiricalSeekBar>,
    overlay: Option<OverlayStyle>,
    insert: Option<RawInsert>,
}

#[derive(Deserialize, Debug, Default)]
struct RawInsert {
    start: Option<u32>,
    end: Option<u32>,
}

/// Time range written by the picker when it inserts a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertRange {
    pub start: u32,
    pub end: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Extension (no dot, lowercase) of files offered by the picker
    pub audio_extension: String,
    pub seek_bar: EmpiricalSeekBar,
    pub overlay: OverlayStyle,
    pub insert: InsertRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_extension: "mp3".to_string(),
            seek_bar: EmpiricalSeekBar::default(),
            overlay: OverlayStyle::default(),
            insert: InsertRange::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self, AudiomarkError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawSettings = serde_yaml::from_str(content)
            .map_err(|e| AudiomarkError::SettingsError(e.to_string()))?;

        let audio_extension = match raw.audio_extension {
            Some(ext) => {
                let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
                if ext.is_empty() {
                    return Err(AudiomarkError::SettingsError(
                        "audio-extension must not be empty".to_string(),
                    ));
                }
                ext
            }
            None => "mp3".to_string(),
        };

        let seek_bar = raw.seek_bar.unwrap_or_default();
        if !(seek_bar.width_fraction > 0.0 && seek_bar.width_fraction <= 1.0) {
            return Err(AudiomarkError::SettingsError(format!(
                "seek-bar width-fraction must be in (0, 1], got {}",
                seek_bar.width_fraction
            )));
        }
        if !(seek_bar.band_height > 0.0) {
            return Err(AudiomarkError::SettingsError(format!(
                "seek-bar band-height must be positive, got {}",
                seek_bar.band_height
            )));
        }

        let raw_insert = raw.insert.unwrap_or_default();
        let insert = InsertRange {
            start: raw_insert.start.unwrap_or(0),
            end: raw_insert.end,
        };
        if let Some(end) = insert.end {
            if end <= insert.start {
                return Err(AudiomarkError::SettingsError(format!(
                    "insert end ({}) must be after start ({})",
                    end, insert.start
                )));
            }
        }

        Ok(Self {
            audio_extension,
            seek_bar,
            overlay: raw.overlay.unwrap_or_default(),
            insert,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AudiomarkError> {
        let content = fs::read_to_string(path).map_err(|e| AudiomarkError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_yaml(&content)?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn overlay_renderer(&self, surface: Rc<dyn OverlaySurface>) -> OverlayRenderer {
        OverlayRenderer::new(Rc::new(self.seek_bar.clone()), surface, self.overlay.clone())
    }

    pub fn binder(&self, surface: Rc<dyn OverlaySurface>) -> Binder {
        Binder::new(self.overlay_renderer(surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let settings = Settings::from_yaml(
            r#"
audio-extension: .OGG
seek-bar:
  left-inset: 80
overlay:
  z-index: 7
insert:
  start: 12
  end: 20
"#,
        )
        .unwrap();

        assert_eq!(settings.audio_extension, "ogg");
        assert_eq!(settings.seek_bar.left_inset, 80.0);
        assert_eq!(settings.seek_bar.width_fraction, EmpiricalSeekBar::default().width_fraction);
        assert_eq!(settings.overlay.z_index, 7);
        assert_eq!(settings.overlay.fill, OverlayStyle::default().fill);
        assert_eq!(settings.insert, InsertRange { start: 12, end: Some(20) });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for yaml in [
            "audio-extension: ''",
            "seek-bar:\n  width-fraction: 0",
            "seek-bar:\n  width-fraction: 1.5",
            "seek-bar:\n  band-height: -1",
            "insert:\n  start: 10\n  end: 10",
            "seek-bar: [1, 2]",
        ] {
            let result = Settings::from_yaml(yaml);
            assert!(
                matches!(result, Err(AudiomarkError::SettingsError(_))),
                "expected settings error for {:?}",
                yaml
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Settings::load(Path::new("/nonexistent/audiomark/settings.yaml"));
        assert!(matches!(result, Err(AudiomarkError::Read { .. })));
    }
}
