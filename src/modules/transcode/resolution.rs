use crate::common::error::{AppError, AppResult};
use crate::infrastructure::media::Dimensions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Rendition sizes this service knows how to produce, ordered smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum ResolutionLabel {
    #[serde(rename = "144p")]
    P144,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

/// Used when a request names no resolutions at all.
pub const DEFAULT_RESOLUTION: ResolutionLabel = ResolutionLabel::P720;

static CATALOG: [(ResolutionLabel, &str, Dimensions); 6] = [
    (ResolutionLabel::P144, "144p", Dimensions::new(256, 144)),
    (ResolutionLabel::P240, "240p", Dimensions::new(426, 240)),
    (ResolutionLabel::P360, "360p", Dimensions::new(640, 360)),
    (ResolutionLabel::P480, "480p", Dimensions::new(854, 480)),
    (ResolutionLabel::P720, "720p", Dimensions::new(1280, 720)),
    (ResolutionLabel::P1080, "1080p", Dimensions::new(1920, 1080)),
];

impl ResolutionLabel {
    pub const ALL: [ResolutionLabel; 6] = [
        ResolutionLabel::P144,
        ResolutionLabel::P240,
        ResolutionLabel::P360,
        ResolutionLabel::P480,
        ResolutionLabel::P720,
        ResolutionLabel::P1080,
    ];

    fn entry(&self) -> &'static (ResolutionLabel, &'static str, Dimensions) {
        // The catalog is indexed by declaration order.
        &CATALOG[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    pub fn dimensions(&self) -> Dimensions {
        self.entry().2
    }
}

impl fmt::Display for ResolutionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CATALOG
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(label, _, _)| *label)
            .ok_or_else(|| AppError::UnknownResolution(wanted.to_string()))
    }
}

/// Catalog lookup by label text.
pub fn dimensions_of(label: &str) -> AppResult<Dimensions> {
    label.parse::<ResolutionLabel>().map(|l| l.dimensions())
}

/// Validates a requested label list. Duplicates collapse; an empty list
/// falls back to [`DEFAULT_RESOLUTION`].
pub fn parse_labels<S: AsRef<str>>(labels: &[S]) -> AppResult<BTreeSet<ResolutionLabel>> {
    if labels.is_empty() {
        return Ok(BTreeSet::from([DEFAULT_RESOLUTION]));
    }
    labels.iter().map(|l| l.as_ref().parse::<ResolutionLabel>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_table_is_fixed() {
        let expected = [
            ("144p", 256, 144),
            ("240p", 426, 240),
            ("360p", 640, 360),
            ("480p", 854, 480),
            ("720p", 1280, 720),
            ("1080p", 1920, 1080),
        ];
        for (label, w, h) in expected {
            assert_eq!(dimensions_of(label).unwrap(), Dimensions::new(w, h), "{label}");
        }
    }

    #[test]
    fn catalog_order_matches_enum() {
        for label in ResolutionLabel::ALL {
            assert_eq!(label.entry().0, label);
            assert_eq!(label.as_str().parse::<ResolutionLabel>().unwrap(), label);
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = dimensions_of("4k").unwrap_err();
        assert!(matches!(err, AppError::UnknownResolution(ref l) if l == "4k"));
    }

    #[test]
    fn parse_labels_defaults_and_dedups() {
        let empty: [&str; 0] = [];
        assert_eq!(parse_labels(&empty).unwrap(), BTreeSet::from([ResolutionLabel::P720]));

        let parsed = parse_labels(&["720p", "144p", "720P"]).unwrap();
        assert_eq!(parsed, BTreeSet::from([ResolutionLabel::P144, ResolutionLabel::P720]));

        assert!(parse_labels(&["144p", "999p"]).is_err());
    }

    #[test]
    fn serializes_as_label_text() {
        assert_eq!(serde_json::to_string(&ResolutionLabel::P1080).unwrap(), "\"1080p\"");
        let parsed: ResolutionLabel = serde_json::from_str("\"240p\"").unwrap();
        assert_eq!(parsed, ResolutionLabel::P240);
    }
}
