//! Session configuration.

use crate::color::Color;
use crate::curve::CurveStyle;
use crate::history::RedoPolicy;
use crate::ids::IdPolicy;
use crate::smoothing::SmoothingOptions;
use serde::{Deserialize, Serialize};

/// Default stroke width for new sessions.
pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;

/// Settings for a drawing session.
///
/// Every field has a default, so partial JSON documents deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub stroke_width: f64,
    pub stroke_color: Color,
    pub stroke_style: CurveStyle,
    /// Ignore pointer input, undo, redo and reset.
    pub readonly: bool,
    pub id_policy: IdPolicy,
    pub redo_policy: RedoPolicy,
    pub smoothing: SmoothingOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: Color::black(),
            stroke_style: CurveStyle::Fill,
            readonly: false,
            id_policy: IdPolicy::Monotonic,
            redo_policy: RedoPolicy::Truncate,
            smoothing: SmoothingOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_stroke_color(mut self, color: Color) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn with_stroke_style(mut self, style: CurveStyle) -> Self {
        self.stroke_style = style;
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_id_policy(mut self, policy: IdPolicy) -> Self {
        self.id_policy = policy;
        self
    }

    pub fn with_redo_policy(mut self, policy: RedoPolicy) -> Self {
        self.redo_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "stroke_width": 8.5, "redo_policy": "preserve" }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.stroke_width, 8.5);
        assert_eq!(config.redo_policy, RedoPolicy::Preserve);
        assert_eq!(config.stroke_style, CurveStyle::Fill);
        assert_eq!(config.smoothing, SmoothingOptions::default());
    }

    #[test]
    fn test_empty_json() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }
}
