//! Spacing constants used to turn a grid into drawable geometry.
//!
//! Options live in an optional YAML file; every field can be omitted and a
//! missing file means all defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sizes in drawing units (pixels for an SVG consumer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawingOptions {
    /// Width of each column
    pub column_width: f64,
    /// Gap between columns
    pub column_padding: f64,
    /// Fan-out step between concentric borders
    pub overlap_padding: f64,
    /// Radius of a member marker
    pub member_radius: f64,
    /// Padding between a marker and the border around it
    pub member_padding: f64,
    /// Height reserved for a category label
    pub text_height: f64,
    /// Width of one display column of label text
    pub char_width: f64,
    /// Draw two visible complements with adjacent spans as one shape.
    pub merge_complements: bool,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            column_width: 50.0,
            column_padding: 10.0,
            overlap_padding: 10.0,
            member_radius: 20.0,
            member_padding: 5.0,
            text_height: 20.0,
            char_width: 12.0,
            merge_complements: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse options file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid option '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl DrawingOptions {
    /// Load options from a file path.
    ///
    /// Returns the defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(OptionsError::Io(e)),
        }
    }

    /// Parse options from YAML text. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self, OptionsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: DrawingOptions = serde_yaml::from_str(content)?;
        Ok(options)
    }

    /// Reject sizes that would collapse or invert the geometry.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let positive = [
            ("column_width", self.column_width),
            ("member_radius", self.member_radius),
            ("text_height", self.text_height),
            ("char_width", self.char_width),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(OptionsError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        let non_negative = [
            ("column_padding", self.column_padding),
            ("overlap_padding", self.overlap_padding),
            ("member_padding", self.member_padding),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(OptionsError::Invalid {
                    field,
                    reason: format!("must not be negative, got {value}"),
                });
            }
        }

        Ok(())
    }

    /// Vertical room taken by one enclosing category label.
    pub fn band_height(&self) -> f64 {
        self.text_height + self.overlap_padding
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.member_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.yml");

        let options = DrawingOptions::load(&path).unwrap();
        assert_eq!(options, DrawingOptions::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("options.yml");

        std::fs::write(&path, "column_width: 80\nmerge_complements: false\n").unwrap();

        let options = DrawingOptions::load(&path).unwrap();
        assert_eq!(options.column_width, 80.0);
        assert!(!options.merge_complements);
        assert_eq!(options.member_radius, 20.0);
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("options.yml");

        std::fs::write(&path, "").unwrap();

        assert_eq!(DrawingOptions::load(&path).unwrap(), DrawingOptions::default());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let err = DrawingOptions::parse("font: serif\n").unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));
    }

    #[test]
    fn test_derived_sizes() {
        let options = DrawingOptions::default();
        assert_eq!(options.band_height(), 30.0);
        assert_eq!(options.diameter(), 40.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_radius() {
        let options = DrawingOptions {
            member_radius: 0.0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, OptionsError::Invalid { field: "member_radius", .. }));
    }

    #[test]
    fn test_validate_rejects_negative_padding() {
        let options = DrawingOptions {
            overlap_padding: -1.0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, OptionsError::Invalid { field: "overlap_padding", .. }));
    }

    #[test]
    fn test_zero_padding_is_allowed() {
        let options = DrawingOptions {
            column_padding: 0.0,
            member_padding: 0.0,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }
}
