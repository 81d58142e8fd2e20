//! Font and spacing presets for different output contexts.

use serde::Serialize;

/// A named set of font sizes and spacing constants.
///
/// Values are fixed per preset, not computed. In left-to-right layouts
/// `nodesep` controls vertical spacing between nodes in the same rank and
/// `ranksep` the horizontal spacing between ranks — the opposite of
/// top-to-bottom layouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPreset {
    /// Preset name (`paper`, `poster`, `presentation`).
    pub name: &'static str,
    /// Title font size in points.
    pub title_fontsize: u32,
    /// Node label font size in points.
    pub node_fontsize: u32,
    /// Edge label font size in points.
    pub edge_fontsize: u32,
    /// Spacing between nodes in the same rank, in inches.
    pub nodesep: f64,
    /// Spacing between ranks, in inches.
    pub ranksep: f64,
}

impl LayoutPreset {
    /// Compact sizing for figures embedded in the paper.
    #[must_use]
    pub fn paper() -> Self {
        Self {
            name: "paper",
            title_fontsize: 32,
            node_fontsize: 14,
            edge_fontsize: 14,
            nodesep: 1.0,
            ranksep: 1.5,
        }
    }

    /// Large type and generous spacing for the poster.
    #[must_use]
    pub fn poster() -> Self {
        Self {
            name: "poster",
            title_fontsize: 48,
            node_fontsize: 20,
            edge_fontsize: 20,
            nodesep: 1.8,
            ranksep: 2.5,
        }
    }

    /// Intermediate sizing for slides.
    #[must_use]
    pub fn presentation() -> Self {
        Self {
            name: "presentation",
            title_fontsize: 40,
            node_fontsize: 16,
            edge_fontsize: 16,
            nodesep: 1.2,
            ranksep: 1.7,
        }
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "paper" => Some(Self::paper()),
            "poster" => Some(Self::poster()),
            "presentation" => Some(Self::presentation()),
            _ => None,
        }
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        Self::paper()
    }
}
