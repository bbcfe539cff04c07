//! Gauss code parsing.
//!
//! A Gauss code lists the crossings met while walking once around the diagram.
//! Two spellings are accepted and may be mixed:
//!
//! - signed integers: `3` (or `+3`) is an over-pass of crossing 3, `-3` the under-pass;
//! - tagged visits: `O3` / `U3`, optionally followed by the crossing handedness `+`/`-`
//!   (extended Gauss code, e.g. `O1-U2-O3-U1-O2-U3-`).
//!
//! Whitespace, commas, quotes, and brackets separate tokens, so spreadsheet cells such as
//! `"[1, -2, 3, -1, 2, -3]"` parse directly.

use crate::error::MalformedCodeError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Diagrams with fewer crossings are always the unknot.
pub const MIN_CROSSINGS: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// Whether a visit passes over or under the other strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Over-pass.
    Over,
    /// Under-pass.
    Under,
}

/// Crossing sign as written in extended Gauss code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    /// Right-handed (`+`).
    Positive,
    /// Left-handed (`-`).
    Negative,
}

impl Handedness {
    fn symbol(self) -> char {
        match self {
            Handedness::Positive => '+',
            Handedness::Negative => '-',
        }
    }
}

/// One visit to a crossing during the traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    /// Index of the visit in traversal order.
    pub position: usize,
    /// Crossing label (always `>= 1`).
    pub label: u32,
    /// Over or under at this visit.
    pub pass: Pass,
    /// Handedness, when the code spells it out.
    pub handedness: Option<Handedness>,
}

/// Both visits of a single crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrossingVisits {
    /// Crossing label.
    pub label: u32,
    /// Position of the over-pass visit.
    pub over: usize,
    /// Position of the under-pass visit.
    pub under: usize,
    /// Handedness, when either visit spells it out.
    pub handedness: Option<Handedness>,
}

/// A validated Gauss code: every label is visited exactly twice, once over and once under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussCode {
    visits: Vec<Visit>,
}

// ============================================================================
// Construction
// ============================================================================

impl GaussCode {
    /// Parses a Gauss code from text.
    ///
    /// # Errors
    /// Returns [`MalformedCodeError`] for unreadable tokens, a zero label, a label that does
    /// not occur exactly twice, a crossing without one over and one under visit, or a
    /// diagram with fewer than [`MIN_CROSSINGS`] crossings.
    pub fn parse(text: &str) -> Result<Self, MalformedCodeError> {
        Self::from_visits(tokenize(text)?)
    }

    /// Builds a Gauss code from signed integers (positive = over, negative = under).
    ///
    /// # Errors
    /// Same conditions as [`GaussCode::parse`].
    pub fn from_signed(code: &[i64]) -> Result<Self, MalformedCodeError> {
        let mut visits = Vec::with_capacity(code.len());
        for (position, &value) in code.iter().enumerate() {
            if value == 0 {
                return Err(MalformedCodeError::ZeroLabel { position });
            }
            let label = u32::try_from(value.unsigned_abs()).map_err(|_| {
                MalformedCodeError::InvalidToken {
                    position,
                    token: value.to_string(),
                }
            })?;
            let pass = if value > 0 { Pass::Over } else { Pass::Under };
            visits.push(Visit {
                position,
                label,
                pass,
                handedness: None,
            });
        }
        Self::from_visits(visits)
    }

    fn from_visits(visits: Vec<Visit>) -> Result<Self, MalformedCodeError> {
        if visits.is_empty() {
            return Err(MalformedCodeError::Empty);
        }

        let mut by_label: BTreeMap<u32, Vec<&Visit>> = BTreeMap::new();
        for visit in &visits {
            by_label.entry(visit.label).or_default().push(visit);
        }

        for (&label, pair) in &by_label {
            if pair.len() != 2 {
                return Err(MalformedCodeError::LabelMultiplicity {
                    label,
                    count: pair.len(),
                });
            }
        }
        for (&label, pair) in &by_label {
            if pair[0].pass == pair[1].pass {
                return Err(MalformedCodeError::AmbiguousPass { label });
            }
            if let (Some(a), Some(b)) = (pair[0].handedness, pair[1].handedness) {
                if a != b {
                    return Err(MalformedCodeError::HandednessMismatch { label });
                }
            }
        }

        if by_label.len() < MIN_CROSSINGS {
            return Err(MalformedCodeError::TooFewCrossings {
                found: by_label.len(),
                minimum: MIN_CROSSINGS,
            });
        }

        Ok(Self { visits })
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl GaussCode {
    /// Returns the visits in traversal order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns the number of visits (twice the crossing count).
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Always `false`; a validated code has at least [`MIN_CROSSINGS`] crossings.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Returns the number of distinct crossings.
    pub fn crossing_count(&self) -> usize {
        self.visits.len() / 2
    }

    /// Returns the over/under visit positions of every crossing, ordered by label.
    pub fn crossings(&self) -> Vec<CrossingVisits> {
        let mut by_label: BTreeMap<u32, CrossingVisits> = BTreeMap::new();
        for visit in &self.visits {
            let entry = by_label.entry(visit.label).or_insert(CrossingVisits {
                label: visit.label,
                over: 0,
                under: 0,
                handedness: None,
            });
            match visit.pass {
                Pass::Over => entry.over = visit.position,
                Pass::Under => entry.under = visit.position,
            }
            entry.handedness = entry.handedness.or(visit.handedness);
        }
        by_label.into_values().collect()
    }

    /// Returns the code as signed integers (positive = over).
    pub fn to_signed(&self) -> Vec<i64> {
        self.visits
            .iter()
            .map(|v| match v.pass {
                Pass::Over => i64::from(v.label),
                Pass::Under => -i64::from(v.label),
            })
            .collect()
    }
}

impl fmt::Display for GaussCode {
    /// Renders signed integers, or extended `O`/`U` notation when handedness is known.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extended = self.visits.iter().any(|v| v.handedness.is_some());
        for (i, v) in self.visits.iter().enumerate() {
            if extended {
                let tag = match v.pass {
                    Pass::Over => 'O',
                    Pass::Under => 'U',
                };
                write!(f, "{tag}{}", v.label)?;
                if let Some(h) = v.handedness {
                    write!(f, "{}", h.symbol())?;
                }
            } else {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match v.pass {
                    Pass::Over => write!(f, "{}", v.label)?,
                    Pass::Under => write!(f, "-{}", v.label)?,
                }
            }
        }
        Ok(())
    }
}

impl FromStr for GaussCode {
    type Err = MalformedCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[inline]
fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b',' | b'[' | b']' | b'(' | b')' | b'{' | b'}' | b'"' | b'\'')
}

#[inline]
fn starts_token(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'O' | b'o' | b'U' | b'u')
}

/// End of the unreadable run starting at `start`, for error reporting.
fn token_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start + 1;
    while end < bytes.len() && !is_separator(bytes[end]) {
        end += 1;
    }
    end
}

fn tokenize(text: &str) -> Result<Vec<Visit>, MalformedCodeError> {
    let bytes = text.as_bytes();
    let mut visits = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if is_separator(bytes[i]) {
            i += 1;
            continue;
        }

        let start = i;
        let position = visits.len();
        let invalid = |end: usize| MalformedCodeError::InvalidToken {
            position,
            token: text[start..end].to_string(),
        };

        let tag = match bytes[i] {
            b'O' | b'o' => Some(Pass::Over),
            b'U' | b'u' => Some(Pass::Under),
            _ => None,
        };
        let mut negative = false;
        match (tag, bytes[i]) {
            (Some(_), _) => i += 1,
            (None, b'+') => i += 1,
            (None, b'-') => {
                negative = true;
                i += 1;
            }
            _ => {}
        }

        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if digits_start == i {
            return Err(invalid(token_end(bytes, start)));
        }
        let label: u32 = text[digits_start..i]
            .parse()
            .map_err(|_| invalid(i))?;
        if label == 0 {
            return Err(MalformedCodeError::ZeroLabel { position });
        }

        let mut handedness = None;
        if tag.is_some() && i < bytes.len() {
            match bytes[i] {
                b'+' => {
                    handedness = Some(Handedness::Positive);
                    i += 1;
                }
                b'-' => {
                    handedness = Some(Handedness::Negative);
                    i += 1;
                }
                _ => {}
            }
        }

        if i < bytes.len() && !is_separator(bytes[i]) && !starts_token(bytes[i]) {
            return Err(invalid(token_end(bytes, start)));
        }

        let pass = tag.unwrap_or(if negative { Pass::Under } else { Pass::Over });
        visits.push(Visit {
            position,
            label,
            pass,
            handedness,
        });
    }

    Ok(visits)
}

// ============================================================================
// Tests
// ============================================================================
