//! Source catalog - maps a position and content kind to an asset path
//!
//! Lookups never fail: a position with no explicit entry for a kind
//! resolves to that kind's fallback asset.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of content currently in the foreground
///
/// Exactly one kind is active at any time; the sequencer owns the current
/// value. This replaces any notion of independent "is playing X" flags, so
/// invalid combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Neutral bumper shown between news positions
    Banner,
    /// First-tier advertisement
    Ad1,
    /// Second-tier advertisement (optional, see `ad_tiers` config)
    Ad2,
    /// Position-tied news clip
    News,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Banner => write!(f, "banner"),
            ContentKind::Ad1 => write!(f, "ad1"),
            ContentKind::Ad2 => write!(f, "ad2"),
            ContentKind::News => write!(f, "news"),
        }
    }
}

/// One content tier: explicit entries keyed by `Position::key()` plus a
/// fallback asset for unmapped positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTier {
    pub entries: HashMap<String, String>,
    pub fallback: String,
}

impl SourceTier {
    fn resolve(&self, position: &Position) -> &str {
        self.entries
            .get(&position.key())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// The full position-to-source lookup table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCatalog {
    pub news: SourceTier,
    pub ad1: SourceTier,
    pub ad2: SourceTier,
    /// Single neutral bumper clip; the banner ignores position
    pub banner: String,
}

impl SourceCatalog {
    /// Resolve the asset path for a position and content kind
    pub fn source_for(&self, position: &Position, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Banner => &self.banner,
            ContentKind::Ad1 => self.ad1.resolve(position),
            ContentKind::Ad2 => self.ad2.resolve(position),
            ContentKind::News => self.news.resolve(position),
        }
    }

    /// True when the position has an explicit entry for the kind
    pub fn has_entry(&self, position: &Position, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Banner => true,
            ContentKind::Ad1 => self.ad1.entries.contains_key(&position.key()),
            ContentKind::Ad2 => self.ad2.entries.contains_key(&position.key()),
            ContentKind::News => self.news.entries.contains_key(&position.key()),
        }
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        let news = [
            ("collective_progressive", "/videos/left_progressive.mp4"),
            ("collective_authoritative", "/videos/left_conservative.mp4"),
            ("neutral_progressive", "/videos/neutral.mp4"),
            ("neutral_authoritative", "/videos/neutral.mp4"),
            ("neoliberal_progressive", "/videos/right_progressive.mp4"),
            ("neoliberal_authoritative", "/videos/right_conservative.mp4"),
        ];
        let ads = [
            ("collective_progressive", "/ads/left_progressive_ad.mp4"),
            ("collective_authoritative", "/ads/left_conservative_ad.mp4"),
            ("neutral_progressive", "/ads/neutral_ad.mp4"),
            ("neutral_authoritative", "/ads/neutral_ad.mp4"),
            ("neoliberal_progressive", "/ads/right_progressive_ad.mp4"),
            ("neoliberal_authoritative", "/ads/right_conservative_ad.mp4"),
        ];

        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>()
        };

        Self {
            news: SourceTier {
                entries: to_map(&news),
                fallback: "/videos/placeholder.mp4".into(),
            },
            ad1: SourceTier {
                entries: to_map(&ads),
                fallback: "/ads/generic_ad.mp4".into(),
            },
            ad2: SourceTier {
                entries: HashMap::new(),
                fallback: "/ads/generic_ad.mp4".into(),
            },
            banner: "/videos/banner.mp4".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_entry_resolves() {
        let catalog = SourceCatalog::default();
        let pos = Position::new("collective", "progressive");

        assert_eq!(
            catalog.source_for(&pos, ContentKind::News),
            "/videos/left_progressive.mp4"
        );
        assert_eq!(
            catalog.source_for(&pos, ContentKind::Ad1),
            "/ads/left_progressive_ad.mp4"
        );
    }

    #[test]
    fn test_fallback_iff_unmapped() {
        let catalog = SourceCatalog::default();

        // Mapped position: never the fallback
        let mapped = Position::new("neoliberal", "authoritative");
        assert!(catalog.has_entry(&mapped, ContentKind::News));
        assert_ne!(
            catalog.source_for(&mapped, ContentKind::News),
            "/videos/placeholder.mp4"
        );

        // Unmapped position: always the fallback
        let unmapped = Position::new("centrist", "progressive");
        assert!(!catalog.has_entry(&unmapped, ContentKind::News));
        assert_eq!(
            catalog.source_for(&unmapped, ContentKind::News),
            "/videos/placeholder.mp4"
        );
        assert_eq!(
            catalog.source_for(&unmapped, ContentKind::Ad1),
            "/ads/generic_ad.mp4"
        );
    }

    #[test]
    fn test_banner_ignores_position() {
        let catalog = SourceCatalog::default();
        let a = Position::new("collective", "progressive");
        let b = Position::new("anything", "at-all");

        assert_eq!(
            catalog.source_for(&a, ContentKind::Banner),
            catalog.source_for(&b, ContentKind::Banner)
        );
    }
}
