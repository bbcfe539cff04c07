//! Fast deterministic validation of bundled reference diagrams.

use crate::batch::{parse_knot_list, KnotEntry};
use crate::dictionary::KnotDictionary;
use crate::error::WidthError;
use crate::gauss::GaussCode;
use crate::search::{SearchConfig, Width, WidthSearcher};

const REFERENCE_KNOTS: &str = include_str!("../data/reference_knots.txt");

// ============================================================================
// Public API
// ============================================================================

/// Returns the bundled reference diagrams.
pub fn reference_knots() -> Vec<KnotEntry> {
    parse_knot_list(REFERENCE_KNOTS)
}

/// Validates every bundled reference diagram against its recorded width:
/// two 13-crossing closed 4-braids of width 28 and a 16-crossing closed 5-braid of width 32.
///
/// # Errors
/// Returns an error message naming the first diagram that fails.
pub fn validate_reference_knots(cfg: &SearchConfig) -> Result<(), String> {
    let searcher = WidthSearcher::new(cfg);
    for entry in reference_knots() {
        validate_with(&entry, &searcher)?;
    }
    Ok(())
}

/// Validates one diagram against its expected width.
///
/// A width of 28 must also come with a witness that colors the diagram when re-run.
///
/// # Errors
/// Returns an error message if the entry has no expectation, is rejected, or decides
/// the wrong width.
pub fn validate_entry(entry: &KnotEntry, cfg: &SearchConfig) -> Result<(), String> {
    validate_with(entry, &WidthSearcher::new(cfg))
}

fn validate_with(entry: &KnotEntry, searcher: &WidthSearcher) -> Result<(), String> {
    let name = &entry.name;
    if let Some(defect) = &entry.defect {
        return Err(format!("{name}: {defect}"));
    }
    let expected = entry
        .expected
        .ok_or_else(|| format!("{name}: no expected width recorded"))?;
    let dictionary = build_dictionary(&entry.code).map_err(|e| format!("{name}: {e}"))?;
    let decision = searcher.decide(&dictionary);

    if decision.width != expected {
        return Err(format!(
            "{name}: expected width {expected}, but decided {}",
            decision.width
        ));
    }
    if expected == Width::TwentyEight {
        match decision.witness {
            None => return Err(format!("{name}: width 28 decided without a witness")),
            Some(witness) if !witness.recheck(&dictionary) => {
                return Err(format!("{name}: witness {witness:?} does not color the diagram"));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn build_dictionary(raw: &str) -> Result<KnotDictionary, WidthError> {
    let code = GaussCode::parse(raw)?;
    Ok(KnotDictionary::from_gauss_code(&code)?)
}

// ============================================================================
// Tests
// ============================================================================
