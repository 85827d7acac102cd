//! Output aspect ratio for generated clips.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aspect ratio accepted by the video generation service.
///
/// The service only renders a small closed set of frame shapes, so this is an
/// enum rather than a free `W:H` pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum AspectRatio {
    /// Widescreen (16:9)
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// Vertical video for Shorts/Reels (9:16)
    #[serde(rename = "9:16")]
    Portrait,
    /// Square (1:1)
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Every ratio the service accepts, in display order.
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains(':') {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| AspectRatioParseError::Unsupported(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Unsupported aspect ratio: {0}, expected one of 16:9, 9:16, 1:1")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_landscape() {
        assert_eq!(AspectRatio::default(), AspectRatio::Landscape);
        assert_eq!(AspectRatio::default().to_string(), "16:9");
    }

    #[test]
    fn test_parse() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert_eq!(" 1:1 ".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        assert_eq!(
            "4:5".parse::<AspectRatio>(),
            Err(AspectRatioParseError::Unsupported("4:5".to_string()))
        );
        assert!(matches!(
            "wide".parse::<AspectRatio>(),
            Err(AspectRatioParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serde_uses_ratio_string() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");

        let parsed: AspectRatio = serde_json::from_str("\"1:1\"").unwrap();
        assert_eq!(parsed, AspectRatio::Square);
    }
}
