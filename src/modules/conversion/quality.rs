use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Rungs of the encoding ladder, declared lowest to highest so the
/// derived ordering matches resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Quality {
    #[serde(rename = "240p")]
    Q240,
    #[serde(rename = "480p")]
    Q480,
    #[serde(rename = "720p")]
    Q720,
    #[serde(rename = "1080p")]
    Q1080,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Q240, Quality::Q480, Quality::Q720, Quality::Q1080];

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "240p" => Some(Quality::Q240),
            "480p" => Some(Quality::Q480),
            "720p" => Some(Quality::Q720),
            "1080p" => Some(Quality::Q1080),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Q240 => "240p",
            Quality::Q480 => "480p",
            Quality::Q720 => "720p",
            Quality::Q1080 => "1080p",
        }
    }

    /// Target frame height. Width follows the source aspect ratio.
    pub fn height(&self) -> u32 {
        match self {
            Quality::Q240 => 240,
            Quality::Q480 => 480,
            Quality::Q720 => 720,
            Quality::Q1080 => 1080,
        }
    }

    /// Video bitrate cap handed to the encoder.
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            Quality::Q240 => "400k",
            Quality::Q480 => "1000k",
            Quality::Q720 => "2500k",
            Quality::Q1080 => "5000k",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_label() {
        for quality in Quality::ALL {
            assert_eq!(Quality::parse(quality.as_str()), Some(quality));
        }
    }

    #[test]
    fn rejects_unknown_labels() {
        assert_eq!(Quality::parse("333p"), None);
        assert_eq!(Quality::parse("4k"), None);
        assert_eq!(Quality::parse(""), None);
        assert_eq!(Quality::parse("720P"), None);
    }

    #[test]
    fn orders_by_resolution_not_label_text() {
        // Lexicographically "1080p" < "240p"; the ladder must not care.
        let mut qualities = vec![Quality::Q480, Quality::Q1080, Quality::Q240, Quality::Q720];
        qualities.sort();
        assert_eq!(
            qualities,
            vec![Quality::Q240, Quality::Q480, Quality::Q720, Quality::Q1080]
        );
    }

    #[test]
    fn serializes_as_its_label() {
        assert_eq!(serde_json::to_string(&Quality::Q1080).unwrap(), "\"1080p\"");

        let mut progress = std::collections::BTreeMap::new();
        progress.insert(Quality::Q240, 40u8);
        progress.insert(Quality::Q720, 10u8);
        assert_eq!(
            serde_json::to_string(&progress).unwrap(),
            "{\"240p\":40,\"720p\":10}"
        );
    }
}
