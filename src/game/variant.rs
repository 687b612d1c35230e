use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Supported rule sets. Each one fixes the number range, the board shape
/// and the win patterns that can end a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum GameType {
    /// 5x5 card, numbers 1-75, free centre.
    #[serde(rename = "75-ball")]
    #[strum(serialize = "75-ball")]
    Classic75,
    /// Strip of 9 columns holding 1-3 numbers each, numbers 1-90.
    #[serde(rename = "90-ball")]
    #[strum(serialize = "90-ball")]
    Strip90,
    /// 3x3 card, numbers 1-30.
    #[serde(rename = "30-ball")]
    #[strum(serialize = "30-ball")]
    Speed30,
    /// 75-ball card shape played for shapes rather than lines.
    #[serde(rename = "pattern")]
    #[strum(serialize = "pattern")]
    Pattern,
}

/// Named marking configurations, declared in evaluation priority order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WinPattern {
    Row,
    Column,
    Diagonal,
    FourCorners,
    FullHouse,
}

/// Geometry the pattern evaluator sees for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLayout {
    /// Square grid read row-major from the board sequence.
    Grid { size: usize, free_center: bool },
    /// No geometry; only "every cell" style patterns apply.
    Strip,
}

impl GameType {
    /// Highest callable number; the range always starts at 1.
    pub fn max_number(&self) -> u8 {
        match self {
            GameType::Classic75 | GameType::Pattern => 75,
            GameType::Strip90 => 90,
            GameType::Speed30 => 30,
        }
    }

    pub fn layout(&self) -> BoardLayout {
        match self {
            GameType::Classic75 | GameType::Pattern => BoardLayout::Grid {
                size: 5,
                free_center: true,
            },
            GameType::Speed30 => BoardLayout::Grid {
                size: 3,
                free_center: false,
            },
            GameType::Strip90 => BoardLayout::Strip,
        }
    }

    /// Patterns this variant can be won with, in priority order.
    pub fn supported_patterns(&self) -> Vec<WinPattern> {
        match self {
            GameType::Classic75 => WinPattern::iter().collect(),
            GameType::Speed30 => vec![
                WinPattern::Row,
                WinPattern::Column,
                WinPattern::Diagonal,
                WinPattern::FullHouse,
            ],
            GameType::Pattern => vec![
                WinPattern::Diagonal,
                WinPattern::FourCorners,
                WinPattern::FullHouse,
            ],
            GameType::Strip90 => vec![WinPattern::FullHouse],
        }
    }

    /// Restricts a requested pattern set to what this variant supports,
    /// sorted into priority order with duplicates dropped.
    pub fn effective_patterns(&self, requested: &[WinPattern]) -> Vec<WinPattern> {
        self.supported_patterns()
            .into_iter()
            .filter(|pattern| requested.contains(pattern))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wire_names() {
        assert_eq!(GameType::Classic75.to_string(), "75-ball");
        assert_eq!(GameType::from_str("30-ball").unwrap(), GameType::Speed30);
        assert_eq!(WinPattern::FourCorners.to_string(), "four-corners");
        assert_eq!(WinPattern::from_str("full-house").unwrap(), WinPattern::FullHouse);

        let json = serde_json::to_string(&GameType::Strip90).unwrap();
        assert_eq!(json, "\"90-ball\"");
        let pattern: WinPattern = serde_json::from_str("\"row\"").unwrap();
        assert_eq!(pattern, WinPattern::Row);
    }

    #[test]
    fn test_effective_patterns_keep_priority_order() {
        let requested = vec![
            WinPattern::FullHouse,
            WinPattern::Row,
            WinPattern::FourCorners,
            WinPattern::Row,
        ];

        assert_eq!(
            GameType::Classic75.effective_patterns(&requested),
            vec![WinPattern::Row, WinPattern::FourCorners, WinPattern::FullHouse]
        );
        assert_eq!(
            GameType::Strip90.effective_patterns(&requested),
            vec![WinPattern::FullHouse]
        );
        assert!(GameType::Pattern
            .effective_patterns(&[WinPattern::Row])
            .is_empty());
    }
}
