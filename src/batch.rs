//! Knot lists: reading them, deciding every knot, and writing the reports.
//!
//! A knot list holds one diagram per line:
//!
//! ```text
//! # comment
//! trefoil | 1, -2, 3, -1, 2, -3
//! braid_4_13 | 28 | 1, 2, -3, 4, ...
//! 1, -2, 3, -1, 4, -3, 2, -4
//! ```
//!
//! A bare code is named `knot-<line>`. The optional middle field is the expected width.
//! A malformed row becomes a rejected knot; it never stops the rest of the list.

use crate::error::{KnotEntryError, KnotListError, WidthError};
use crate::search::{SearchConfig, Width, WidthDecision, WidthSearcher};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// Knot list
// ============================================================================

/// One diagram read from a knot list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnotEntry {
    /// Display name.
    pub name: String,
    /// Expected width, when the list records one.
    pub expected: Option<Width>,
    /// The Gauss code as written.
    pub code: String,
    /// 1-based line number.
    pub line: usize,
    /// Why the row itself is unusable, if it is.
    pub defect: Option<KnotEntryError>,
}

impl KnotEntry {
    /// Creates an entry for a code given outside any list.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: None,
            code: code.into(),
            line: 0,
            defect: None,
        }
    }
}

/// Parses a knot list.
///
/// Codes are not parsed here; a malformed code is reported when its knot is decided. A row
/// with a bad expected width or too many fields is kept with its `defect` set.
pub fn parse_knot_list(text: &str) -> Vec<KnotEntry> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split('|').map(str::trim).collect();
        let mut defect = None;
        let (name, expected, code) = match fields.as_slice() {
            [code] => (format!("knot-{line}"), None, (*code).to_string()),
            [name, code] => ((*name).to_string(), None, (*code).to_string()),
            [name, width, code] => {
                let expected = width.parse::<u32>().ok().and_then(Width::from_value);
                if expected.is_none() {
                    defect = Some(KnotEntryError::InvalidWidth {
                        line,
                        value: (*width).to_string(),
                    });
                }
                ((*name).to_string(), expected, (*code).to_string())
            }
            [name, rest @ ..] => {
                defect = Some(KnotEntryError::TooManyFields { line });
                ((*name).to_string(), None, rest.join(" | "))
            }
            [] => continue,
        };

        entries.push(KnotEntry {
            name,
            expected,
            code,
            line,
            defect,
        });
    }
    entries
}

/// Loads a knot list from a file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn load_knot_list(path: impl AsRef<Path>) -> Result<Vec<KnotEntry>, KnotListError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_knot_list(&text))
}

// ============================================================================
// Reports
// ============================================================================

/// The outcome for one knot of a batch.
#[derive(Clone, Debug)]
pub struct KnotReport {
    /// Display name.
    pub name: String,
    /// The Gauss code as written.
    pub code: String,
    /// Expected width, when the list recorded one.
    pub expected: Option<Width>,
    /// The decision, or why the knot was rejected.
    pub result: Result<WidthDecision, WidthError>,
}

impl KnotReport {
    /// Returns the decided width, if the knot was accepted.
    pub fn width(&self) -> Option<Width> {
        self.result.as_ref().ok().map(|d| d.width)
    }

    /// Returns whether the decided width differs from the expected one.
    ///
    /// Rejected knots with an expectation count as mismatches.
    pub fn is_mismatch(&self) -> bool {
        self.expected.is_some_and(|e| self.width() != Some(e))
    }
}

/// Per-width tallies of a finished batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Knots decided 28.
    pub twenty_eight: usize,
    /// Knots decided 32.
    pub thirty_two: usize,
    /// Knots rejected as malformed or inconsistent.
    pub rejected: usize,
    /// Knots whose width differs from the recorded expectation.
    pub mismatched: usize,
}

impl BatchSummary {
    /// Tallies a set of reports.
    pub fn of(reports: &[KnotReport]) -> Self {
        let mut summary = Self::default();
        for r in reports {
            match r.width() {
                Some(Width::TwentyEight) => summary.twenty_eight += 1,
                Some(Width::ThirtyTwo) => summary.thirty_two += 1,
                None => summary.rejected += 1,
            }
            if r.is_mismatch() {
                summary.mismatched += 1;
            }
        }
        summary
    }
}

/// Decides every knot in order. A rejected knot is reported and the batch continues.
///
/// All knots share one [`WidthSearcher`], and with it one worker pool.
pub fn run_batch(entries: &[KnotEntry], cfg: &SearchConfig) -> Vec<KnotReport> {
    let searcher = WidthSearcher::new(cfg);
    let reports: Vec<KnotReport> = entries
        .iter()
        .map(|entry| {
            let result = match &entry.defect {
                Some(defect) => Err(WidthError::from(defect.clone())),
                None => searcher.compute(&entry.code),
            };
            match &result {
                Ok(decision) => {
                    if entry.expected.is_some_and(|e| e != decision.width) {
                        warn!(knot = %entry.name, width = %decision.width, expected = ?entry.expected, "width differs from expectation");
                    }
                }
                Err(err) => warn!(knot = %entry.name, line = entry.line, %err, "knot rejected"),
            }
            KnotReport {
                name: entry.name.clone(),
                code: entry.code.clone(),
                expected: entry.expected,
                result,
            }
        })
        .collect();

    let summary = BatchSummary::of(&reports);
    info!(
        knots = reports.len(),
        twenty_eight = summary.twenty_eight,
        thirty_two = summary.thirty_two,
        rejected = summary.rejected,
        mismatched = summary.mismatched,
        "batch finished"
    );
    reports
}

/// Writes reports as `name | width | code` lines, or `name | error: ... | code`.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_reports<W: Write>(mut w: W, reports: &[KnotReport]) -> io::Result<()> {
    for r in reports {
        match &r.result {
            Ok(decision) => writeln!(w, "{} | {} | {}", r.name, decision.width, r.code)?,
            Err(err) => writeln!(w, "{} | error: {err} | {}", r.name, r.code)?,
        }
    }
    w.flush()
}

/// Saves reports to a file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn save_reports(path: impl AsRef<Path>, reports: &[KnotReport]) -> io::Result<()> {
    let f = File::create(path)?;
    write_reports(BufWriter::new(f), reports)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedCodeError;

    const LIST: &str = "\
# two knots and a broken one
trefoil | 1, -2, 3, -1, 2, -3
unknot | [1, -1]

figure_eight | 28 | 1, -2, 3, -1, 4, -3, 2, -4   # trailing comment
O1-U2-O3-U1-O2-U3-
";

    #[test]
    fn parses_names_expectations_and_bare_codes() {
        let entries = parse_knot_list(LIST);
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].name, "trefoil");
        assert_eq!(entries[0].code, "1, -2, 3, -1, 2, -3");
        assert_eq!(entries[0].expected, None);
        assert_eq!(entries[0].line, 2);

        assert_eq!(entries[2].name, "figure_eight");
        assert_eq!(entries[2].expected, Some(Width::TwentyEight));
        assert_eq!(entries[2].code, "1, -2, 3, -1, 4, -3, 2, -4");

        assert_eq!(entries[3].name, "knot-6");
        assert_eq!(entries[3].code, "O1-U2-O3-U1-O2-U3-");
    }

    #[test]
    fn bad_rows_are_kept_with_their_defect() {
        let entries = parse_knot_list("k | 30 | 1, -2, 3, -1, 2, -3");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "k");
        assert_eq!(entries[0].expected, None);
        assert_eq!(
            entries[0].defect,
            Some(KnotEntryError::InvalidWidth {
                line: 1,
                value: "30".to_string()
            })
        );

        let entries = parse_knot_list("\na | b | c | d");
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[0].code, "b | c | d");
        assert_eq!(entries[0].defect, Some(KnotEntryError::TooManyFields { line: 2 }));

        assert!(parse_knot_list(LIST).iter().all(|e| e.defect.is_none()));
    }

    #[test]
    fn bad_row_does_not_stop_the_list() {
        let list = "\
trefoil | 28 | 1, -2, 3, -1, 2, -3
typo | 30 | 1, -2, 3, -1, 2, -3
figure_eight | 28 | 1, -2, 3, -1, 4, -3, 2, -4
";
        let reports = run_batch(&parse_knot_list(list), &SearchConfig::sequential());
        assert_eq!(reports.len(), 3);

        assert_eq!(reports[0].width(), Some(Width::TwentyEight));
        assert!(matches!(
            reports[1].result,
            Err(WidthError::InvalidEntry(KnotEntryError::InvalidWidth { line: 2, .. }))
        ));
        assert_eq!(reports[2].width(), Some(Width::TwentyEight));

        let summary = BatchSummary::of(&reports);
        assert_eq!(
            summary,
            BatchSummary {
                twenty_eight: 2,
                thirty_two: 0,
                rejected: 1,
                mismatched: 0
            }
        );

        let reports = run_batch(&parse_knot_list("a | b | c | d"), &SearchConfig::sequential());
        assert!(matches!(
            reports[0].result,
            Err(WidthError::InvalidEntry(KnotEntryError::TooManyFields { line: 1 }))
        ));
    }

    #[test]
    fn single_entries_carry_no_expectation() {
        let entry = KnotEntry::new("trefoil", "1, -2, 3, -1, 2, -3");
        assert_eq!(entry.expected, None);
        assert_eq!(entry.defect, None);
        let reports = run_batch(&[entry], &SearchConfig { workers: 2 });
        assert_eq!(reports[0].width(), Some(Width::TwentyEight));
    }

    #[test]
    fn bad_knot_does_not_stop_the_batch() {
        let entries = parse_knot_list(LIST);
        let reports = run_batch(&entries, &SearchConfig::sequential());
        assert_eq!(reports.len(), 4);

        assert_eq!(reports[0].width(), Some(Width::TwentyEight));
        assert!(matches!(
            reports[1].result,
            Err(WidthError::MalformedCode(MalformedCodeError::TooFewCrossings { .. }))
        ));
        assert_eq!(reports[2].width(), Some(Width::TwentyEight));
        assert_eq!(reports[3].width(), Some(Width::TwentyEight));

        let summary = BatchSummary::of(&reports);
        assert_eq!(
            summary,
            BatchSummary {
                twenty_eight: 3,
                thirty_two: 0,
                rejected: 1,
                mismatched: 0
            }
        );
    }

    #[test]
    fn mismatch_is_flagged() {
        let entries = parse_knot_list("k | 32 | 1, -2, 3, -1, 2, -3");
        let reports = run_batch(&entries, &SearchConfig::sequential());
        assert!(reports[0].is_mismatch());
        assert_eq!(BatchSummary::of(&reports).mismatched, 1);
    }

    #[test]
    fn reports_are_written_one_per_line() {
        let entries = parse_knot_list(LIST);
        let reports = run_batch(&entries[..2], &SearchConfig::sequential());
        let mut out = Vec::new();
        write_reports(&mut out, &reports).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "trefoil | 28 | 1, -2, 3, -1, 2, -3");
        assert!(lines[1].starts_with("unknot | error: malformed Gauss code: "));
        assert!(lines[1].ends_with(" | [1, -1]"));
    }

    #[test]
    fn saved_reports_match_written_reports() {
        let entries = parse_knot_list("trefoil | 1, -2, 3, -1, 2, -3");
        let reports = run_batch(&entries, &SearchConfig::sequential());
        let path = std::env::temp_dir().join(format!("gabai_width_reports_{}.txt", std::process::id()));
        save_reports(&path, &reports).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(text, "trefoil | 28 | 1, -2, 3, -1, 2, -3\n");
    }

    #[test]
    fn missing_list_is_an_io_error() {
        let err = load_knot_list("/nonexistent/knots.txt").unwrap_err();
        assert!(matches!(err, KnotListError::Io(_)));
    }
}
