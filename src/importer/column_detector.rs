// ==========================================
// Meat Production Analytics - column detector
// ==========================================
// Header row -> column index per logical field.
// - every header cell is tested once against the rules in order
// - the first rule with a matching keyword takes that cell
// - fields no cell matched keep their positional default
// - an empty header yields the defaults unchanged
// Misdetection is not an error here; value coercion catches it later.
// ==========================================

use crate::i18n::Messages;
use serde::Serialize;

/// One logical column: its name, default position and header keywords.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub default_index: usize,
    /// Lower-case substrings, any language
    pub keywords: &'static [&'static str],
}

impl ColumnSpec {
    pub fn matches(&self, normalized_header: &str) -> bool {
        self.keywords.iter().any(|k| normalized_header.contains(k))
    }
}

/// Resolved positions, indexed like the `ColumnSpec` slice that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    names: Vec<&'static str>,
    indices: Vec<usize>,
    detected: Vec<bool>,
}

impl ColumnLayout {
    fn defaults(specs: &[ColumnSpec]) -> Self {
        Self {
            names: specs.iter().map(|s| s.name).collect(),
            indices: specs.iter().map(|s| s.default_index).collect(),
            detected: vec![false; specs.len()],
        }
    }

    /// Column index of the field in `slot`.
    pub fn index(&self, slot: usize) -> usize {
        self.indices[slot]
    }

    /// Fields that fell back to their positional default, with that position.
    pub fn defaulted(&self) -> Vec<(&'static str, usize)> {
        self.names
            .iter()
            .zip(&self.indices)
            .zip(&self.detected)
            .filter(|(_, detected)| !**detected)
            .map(|((name, idx), _)| (*name, *idx))
            .collect()
    }

    pub fn defaulted_names(&self) -> Vec<String> {
        self.defaulted().into_iter().map(|(n, _)| n.to_string()).collect()
    }

    /// One diagnostic line per defaulted field (1-based column numbers).
    pub fn defaulted_warnings(&self, messages: &Messages) -> Vec<String> {
        self.defaulted()
            .into_iter()
            .map(|(name, idx)| {
                messages.format(
                    "columns.defaulted",
                    &[("field", name), ("column", &(idx + 1).to_string())],
                )
            })
            .collect()
    }
}

pub struct ColumnDetector {
    specs: &'static [ColumnSpec],
}

impl ColumnDetector {
    pub const fn new(specs: &'static [ColumnSpec]) -> Self {
        Self { specs }
    }

    /// Resolve a header row. Cells are lower-cased and trimmed here, so raw
    /// header text may be passed in.
    pub fn detect<S: AsRef<str>>(&self, header: &[S]) -> ColumnLayout {
        let mut layout = ColumnLayout::defaults(self.specs);
        if header.is_empty() {
            return layout;
        }

        for (col, cell) in header.iter().enumerate() {
            let normalized = cell.as_ref().trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if let Some(slot) = self.specs.iter().position(|s| s.matches(&normalized)) {
                layout.indices[slot] = col;
                layout.detected[slot] = true;
            }
        }

        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ColumnSpec] = &[
        ColumnSpec { name: "date", default_index: 0, keywords: &["date", "fecha"] },
        ColumnSpec { name: "cows", default_index: 1, keywords: &["cow", "vaca"] },
        ColumnSpec { name: "bulls", default_index: 2, keywords: &["bull", "toro"] },
    ];
    const DETECTOR: ColumnDetector = ColumnDetector::new(SPECS);

    #[test]
    fn test_reordered_header() {
        let layout = DETECTOR.detect(&["Toros", "Fecha", "Vacas"]);
        assert_eq!(layout.index(0), 1);
        assert_eq!(layout.index(1), 2);
        assert_eq!(layout.index(2), 0);
        assert!(layout.defaulted().is_empty());
    }

    #[test]
    fn test_empty_header_keeps_defaults() {
        let empty: [&str; 0] = [];
        let layout = DETECTOR.detect(&empty);
        assert_eq!((layout.index(0), layout.index(1), layout.index(2)), (0, 1, 2));
        assert_eq!(layout.defaulted().len(), 3);
    }

    #[test]
    fn test_unmatched_field_keeps_default() {
        let layout = DETECTOR.detect(&["", "", "", "Cows"]);
        assert_eq!(layout.index(0), 0);
        assert_eq!(layout.index(1), 3);
        assert_eq!(layout.defaulted_names(), vec!["date".to_string(), "bulls".to_string()]);
    }

    #[test]
    fn test_first_rule_wins_a_cell() {
        // "date of cow" matches both rules; date is tested first
        let layout = DETECTOR.detect(&["x", "date of cow"]);
        assert_eq!(layout.index(0), 1);
        assert_eq!(layout.index(1), 1);
        assert_eq!(layout.defaulted_names(), vec!["cows".to_string(), "bulls".to_string()]);
    }

    #[test]
    fn test_defaulted_warnings_are_one_based() {
        let layout = DETECTOR.detect(&["fecha"]);
        let warnings = layout.defaulted_warnings(&Messages::default());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("\"cows\""));
        assert!(warnings[0].contains("column 2"));
    }
}
