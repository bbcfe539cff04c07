//! Seed search deciding whether a diagram has width 28 or 32.
//!
//! Every 3-subset of strands is tried as a seed set. A set that colors the whole diagram
//! decides 28 at once. A set that stops with a multi-colored crossing is verified by
//! re-running it with each strand it left uncolored as a fourth seed; a full coloring there
//! also decides 28. When every triple has been rejected the width is 32.
//!
//! A [`WidthSearcher`] owns the worker pool, so a batch of knots shares one set of threads.

use crate::coloring::{run_trial, Coloring, Outcome};
use crate::dictionary::KnotDictionary;
use crate::error::Result;
use crate::gauss::GaussCode;
use itertools::Itertools;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, warn};

// ============================================================================
// Configuration
// ============================================================================

/// Search configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Worker threads. `0` or `1` runs on the calling thread in lexicographic order.
    pub workers: usize,
}

impl SearchConfig {
    /// A configuration that searches on the calling thread.
    pub const fn sequential() -> Self {
        Self { workers: 1 }
    }

    /// Returns whether the search runs on the calling thread.
    #[inline]
    pub fn is_sequential(&self) -> bool {
        self.workers <= 1
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(1);
        Self { workers }
    }
}

// ============================================================================
// Decision types
// ============================================================================

/// The two possible widths of a prime bridge-4 diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    /// Some seed set of at most four strands colors the diagram.
    TwentyEight,
    /// No seed triple (or verified extension) colors the diagram.
    ThirtyTwo,
}

impl Width {
    /// Returns the numeric width.
    #[inline]
    pub const fn value(self) -> u32 {
        match self {
            Width::TwentyEight => 28,
            Width::ThirtyTwo => 32,
        }
    }

    /// Maps 28 and 32 back to a width.
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            28 => Some(Width::TwentyEight),
            32 => Some(Width::ThirtyTwo),
            _ => None,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// The seed set that produced a full coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Witness {
    /// Three seeds colored every strand.
    Direct {
        /// The seed triple, ascending.
        seeds: [usize; 3],
    },
    /// A conflicting triple colored every strand once a fourth seed was added.
    Verified {
        /// The base triple, ascending.
        seeds: [usize; 3],
        /// The added strand; never one of `seeds`.
        fourth: usize,
    },
}

impl Witness {
    /// Returns every seed strand in seeding order.
    pub fn strands(&self) -> Vec<usize> {
        match *self {
            Witness::Direct { seeds } => seeds.to_vec(),
            Witness::Verified { seeds, fourth } => vec![seeds[0], seeds[1], seeds[2], fourth],
        }
    }

    /// Re-runs the witnessed trial and returns whether it still colors the diagram.
    pub fn recheck(&self, dictionary: &KnotDictionary) -> bool {
        let strands = self.strands();
        if strands.iter().any(|&s| s >= dictionary.strand_count()) || !strands.iter().all_unique() {
            return false;
        }
        run_trial(dictionary, &strands).outcome.is_fully_colored()
    }
}

/// Trial counts for one search.
///
/// In parallel mode the counts include trials that were in flight when the witness was
/// found, so they vary from run to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Three-seed trials run.
    pub triples: usize,
    /// Four-seed verification trials run.
    pub extensions: usize,
}

/// Result of a width search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidthDecision {
    /// The decided width.
    pub width: Width,
    /// Seed set behind a 28; `None` for 32.
    pub witness: Option<Witness>,
    /// Work done.
    pub stats: SearchStats,
}

// ============================================================================
// Enumeration
// ============================================================================

/// Enumerates all 3-subsets of `0..strand_count` in lexicographic order.
pub fn seed_triples(strand_count: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..strand_count)
        .tuple_combinations()
        .map(|(a, b, c)| [a, b, c])
}

/// Number of seed triples for `strand_count` strands.
pub fn seed_triple_count(strand_count: usize) -> usize {
    if strand_count < 3 {
        return 0;
    }
    strand_count * (strand_count - 1) * (strand_count - 2) / 6
}

#[derive(Default)]
struct TrialCounters {
    triples: AtomicUsize,
    extensions: AtomicUsize,
}

impl TrialCounters {
    fn snapshot(&self) -> SearchStats {
        SearchStats {
            triples: self.triples.load(Ordering::Relaxed),
            extensions: self.extensions.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// Trials
// ============================================================================

/// Runs one seed triple, verifying it with fourth seeds if it conflicts.
fn evaluate_triple(
    dictionary: &KnotDictionary,
    seeds: [usize; 3],
    cancel: &AtomicBool,
    counters: &TrialCounters,
) -> Option<Witness> {
    counters.triples.fetch_add(1, Ordering::Relaxed);
    let trial = run_trial(dictionary, &seeds);
    match trial.outcome {
        Outcome::FullyColored => Some(Witness::Direct { seeds }),
        Outcome::StuckPartial { .. } => None,
        Outcome::Conflict {
            multicolored,
            uncolored,
        } => {
            debug!(?seeds, multicolored, uncolored, "conflict, verifying with a fourth seed");
            verify_with_fourth_seed(dictionary, seeds, &trial.coloring, cancel, counters)
        }
    }
}

/// Tries the strands the base trial left uncolored as a fourth seed.
///
/// Seeding any strand of a Wirtinger arc colors the whole arc, so only the lowest uncolored
/// strand of each arc is tried.
fn verify_with_fourth_seed(
    dictionary: &KnotDictionary,
    seeds: [usize; 3],
    base: &Coloring,
    cancel: &AtomicBool,
    counters: &TrialCounters,
) -> Option<Witness> {
    let mut tried_arcs = vec![false; dictionary.arcs().len()];
    for fourth in base.uncolored_strands() {
        if std::mem::replace(&mut tried_arcs[dictionary.arc_of(fourth)], true) {
            continue;
        }
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        counters.extensions.fetch_add(1, Ordering::Relaxed);
        let trial = run_trial(dictionary, &[seeds[0], seeds[1], seeds[2], fourth]);
        if trial.outcome.is_fully_colored() {
            return Some(Witness::Verified { seeds, fourth });
        }
    }
    None
}

// ============================================================================
// Search drivers
// ============================================================================

/// Decides widths under one [`SearchConfig`], reusing its worker pool across knots.
#[derive(Debug)]
pub struct WidthSearcher {
    pool: Option<ThreadPool>,
}

impl WidthSearcher {
    /// Creates a searcher. A parallel configuration gets a pool of `workers` threads; if
    /// the pool cannot be built the searcher runs on the calling thread.
    pub fn new(cfg: &SearchConfig) -> Self {
        if cfg.is_sequential() {
            return Self { pool: None };
        }
        match ThreadPoolBuilder::new().num_threads(cfg.workers).build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(err) => {
                warn!(%err, workers = cfg.workers, "thread pool unavailable, searching sequentially");
                Self { pool: None }
            }
        }
    }

    /// Returns whether searches run on a worker pool.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Decides the width of a diagram.
    pub fn decide(&self, dictionary: &KnotDictionary) -> WidthDecision {
        let n = dictionary.strand_count();
        let counters = TrialCounters::default();

        let witness = match &self.pool {
            Some(pool) if n >= 3 => pool.install(|| search_parallel(dictionary, &counters)),
            _ => search_sequential(dictionary, &counters),
        };

        let width = if witness.is_some() {
            Width::TwentyEight
        } else {
            Width::ThirtyTwo
        };
        let stats = counters.snapshot();
        info!(
            strands = n,
            crossings = dictionary.crossing_count(),
            %width,
            ?witness,
            triples = stats.triples,
            extensions = stats.extensions,
            "width decided"
        );

        WidthDecision {
            width,
            witness,
            stats,
        }
    }

    /// Parses a Gauss code, builds its dictionary, and decides its width.
    ///
    /// # Errors
    /// Returns [`crate::error::WidthError`] if the code is malformed or inconsistent.
    pub fn compute(&self, raw: &str) -> Result<WidthDecision> {
        let code = GaussCode::parse(raw)?;
        self.compute_code(&code)
    }

    /// Builds the dictionary of a parsed code and decides its width.
    ///
    /// # Errors
    /// Returns [`crate::error::WidthError`] if the code does not yield a consistent dictionary.
    pub fn compute_code(&self, code: &GaussCode) -> Result<WidthDecision> {
        let dictionary = KnotDictionary::from_gauss_code(code)?;
        Ok(self.decide(&dictionary))
    }
}

/// Decides the width of a diagram with a one-off [`WidthSearcher`].
pub fn decide_width(dictionary: &KnotDictionary, cfg: &SearchConfig) -> WidthDecision {
    WidthSearcher::new(cfg).decide(dictionary)
}

fn search_sequential(dictionary: &KnotDictionary, counters: &TrialCounters) -> Option<Witness> {
    let never = AtomicBool::new(false);
    seed_triples(dictionary.strand_count())
        .find_map(|seeds| evaluate_triple(dictionary, seeds, &never, counters))
}

fn search_parallel(dictionary: &KnotDictionary, counters: &TrialCounters) -> Option<Witness> {
    let n = dictionary.strand_count();
    let found_flag = AtomicBool::new(false);

    (0..n)
        .into_par_iter()
        .flat_map_iter(|a| {
            ((a + 1)..n)
                .tuple_combinations()
                .map(move |(b, c)| [a, b, c])
        })
        .find_map_any(|seeds| {
            if found_flag.load(Ordering::Relaxed) {
                return None;
            }
            let witness = evaluate_triple(dictionary, seeds, &found_flag, counters)?;
            if found_flag
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                debug!(?witness, "witness claimed");
            }
            Some(witness)
        })
}

/// Parses a Gauss code, builds its dictionary, and decides its width.
///
/// # Errors
/// Returns [`crate::error::WidthError`] if the code is malformed or inconsistent.
pub fn compute_width(raw: &str, cfg: &SearchConfig) -> Result<WidthDecision> {
    WidthSearcher::new(cfg).compute(raw)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Crossing;
    use crate::error::{MalformedCodeError, WidthError};
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    const TREFOIL: &str = "1, -2, 3, -1, 2, -3";
    const FIGURE_EIGHT: &str = "1, -2, 3, -1, 4, -3, 2, -4";
    const BRAID_4_13A: &str = "1, 2, -3, 4, 9, -10, 11, 13, -2, 3, -5, 7, -8, -12, -13, -1, -4, 6, -7, 8, 12, 5, -6, -9, 10, -11";
    const BRAID_4_13B: &str = "-4, -6, 7, 8, -9, -10, 13, -1, 2, -3, -5, -2, 3, 5, 6, -7, 10, 11, -12, -13, 1, 4, -8, 9, -11, 12";
    const BRAID_4_13A_KINKED: &str = "1, 2, -3, 4, 9, -10, 11, 13, -14, 14, -2, 3, -5, 7, -8, -12, -13, -1, -4, 6, -7, 8, 12, 5, -6, -9, 10, -11";
    const BRAID_5_16: &str = "-7, 9, -10, 12, 13, -15, 3, -4, -8, 11, 15, -1, 2, -3, 4, 6, -9, 10, -12, -14, 1, -2, 5, 7, -16, -5, -6, 8, -11, -13, 14, 16";

    fn dictionary(text: &str) -> KnotDictionary {
        KnotDictionary::from_gauss_code(&GaussCode::parse(text).unwrap()).unwrap()
    }

    /// Five strands where only the triple {0, 1, 2} colors everything without a conflict.
    fn single_triple_crossings(relabel: &[usize]) -> Vec<Crossing> {
        let p = |s: usize| relabel[s];
        vec![
            Crossing::new(1, (p(2), p(2)), (p(2), p(3))),
            Crossing::new(2, (p(0), p(0)), (p(3), p(4))),
            Crossing::new(3, (p(1), p(1)), (p(4), p(3))),
        ]
    }

    #[test]
    fn width_values_and_display() {
        assert_eq!(Width::TwentyEight.value(), 28);
        assert_eq!(Width::ThirtyTwo.to_string(), "32");
        assert_eq!(Width::from_value(28), Some(Width::TwentyEight));
        assert_eq!(Width::from_value(30), None);
    }

    #[test]
    fn search_config_default_is_valid() {
        let cfg = SearchConfig::default();
        assert!(cfg.workers >= 1);
        assert!(SearchConfig::sequential().is_sequential());
        assert!(SearchConfig { workers: 0 }.is_sequential());
    }

    #[test]
    fn seed_triples_are_lexicographic_and_complete() {
        let triples: Vec<_> = seed_triples(5).collect();
        assert_eq!(triples.len(), 10);
        assert_eq!(triples.len(), seed_triple_count(5));
        assert_eq!(triples.first(), Some(&[0, 1, 2]));
        assert_eq!(triples.last(), Some(&[2, 3, 4]));
        assert!(triples.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seed_triples(2).count(), 0);
        assert_eq!(seed_triple_count(32), 4960);
    }

    #[test]
    fn small_knots_decide_directly() {
        for text in [TREFOIL, FIGURE_EIGHT] {
            let decision = compute_width(text, &SearchConfig::sequential()).unwrap();
            assert_eq!(decision.width, Width::TwentyEight);
            assert_eq!(decision.witness, Some(Witness::Direct { seeds: [0, 1, 2] }));
            assert_eq!(decision.stats, SearchStats { triples: 1, extensions: 0 });
        }
    }

    #[test]
    fn thirteen_crossing_diagrams_need_a_fourth_seed() {
        let cfg = SearchConfig::sequential();
        for (text, expected, stats) in [
            (
                BRAID_4_13A,
                Witness::Verified { seeds: [0, 1, 5], fourth: 13 },
                SearchStats { triples: 4, extensions: 36 },
            ),
            (
                BRAID_4_13B,
                Witness::Verified { seeds: [0, 1, 11], fourth: 19 },
                SearchStats { triples: 10, extensions: 29 },
            ),
        ] {
            let d = dictionary(text);
            let decision = decide_width(&d, &cfg);
            assert_eq!(decision.width, Width::TwentyEight);
            assert_eq!(decision.witness, Some(expected));
            assert_eq!(decision.stats, stats);
            assert!(expected.recheck(&d));
        }
    }

    /// Lexicographic search trying every uncolored strand as a fourth seed.
    fn search_without_arc_pruning(d: &KnotDictionary) -> Option<Witness> {
        seed_triples(d.strand_count()).find_map(|seeds| {
            let trial = run_trial(d, &seeds);
            match trial.outcome {
                Outcome::FullyColored => Some(Witness::Direct { seeds }),
                Outcome::StuckPartial { .. } => None,
                Outcome::Conflict { .. } => trial.coloring.uncolored_strands().find_map(|fourth| {
                    run_trial(d, &[seeds[0], seeds[1], seeds[2], fourth])
                        .outcome
                        .is_fully_colored()
                        .then_some(Witness::Verified { seeds, fourth })
                }),
            }
        })
    }

    #[test]
    fn one_fourth_seed_per_arc_finds_the_same_witness() {
        for text in [TREFOIL, BRAID_4_13A, BRAID_4_13B, BRAID_4_13A_KINKED] {
            let d = dictionary(text);
            assert_eq!(
                decide_width(&d, &SearchConfig::sequential()).witness,
                search_without_arc_pruning(&d),
                "{text}"
            );
        }
    }

    #[test]
    fn kinked_diagrams_keep_their_width() {
        let cfg = SearchConfig::sequential();
        for (kinked, plain) in [
            (BRAID_4_13A_KINKED.to_string(), BRAID_4_13A),
            (format!("{BRAID_4_13A}, 14, -14"), BRAID_4_13A),
            (format!("{BRAID_5_16}, -17, 17"), BRAID_5_16),
        ] {
            let kinked = compute_width(&kinked, &cfg).unwrap();
            let plain = compute_width(plain, &cfg).unwrap();
            assert_eq!(kinked.width, plain.width);
        }
        assert_eq!(
            compute_width(BRAID_4_13A_KINKED, &cfg).unwrap().witness,
            Some(Witness::Verified { seeds: [0, 1, 5], fourth: 15 })
        );
    }

    #[test]
    fn searcher_reuses_its_pool_across_knots() {
        let searcher = WidthSearcher::new(&SearchConfig { workers: 3 });
        assert!(searcher.is_parallel());
        assert!(!WidthSearcher::new(&SearchConfig::sequential()).is_parallel());
        for (text, width) in [
            (TREFOIL, Width::TwentyEight),
            (BRAID_4_13B, Width::TwentyEight),
            (FIGURE_EIGHT, Width::TwentyEight),
        ] {
            let decision = searcher.compute(text).unwrap();
            assert_eq!(decision.width, width);
            assert!(decision.witness.unwrap().recheck(&dictionary(text)));
        }
    }

    #[test]
    fn exhausted_search_reports_thirty_two() {
        let d = dictionary(BRAID_5_16);
        let decision = decide_width(&d, &SearchConfig::sequential());
        assert_eq!(decision.width, Width::ThirtyTwo);
        assert_eq!(decision.witness, None);
        assert_eq!(
            decision.stats,
            SearchStats {
                triples: seed_triple_count(d.strand_count()),
                extensions: 11_774
            }
        );
    }

    #[test]
    fn fourth_seed_is_never_a_base_seed() {
        for text in [BRAID_4_13A, BRAID_4_13B] {
            let d = dictionary(text);
            let decision = decide_width(&d, &SearchConfig { workers: 4 });
            if let Some(Witness::Verified { seeds, fourth }) = decision.witness {
                assert!(!seeds.contains(&fourth));
            }
            assert!(decision.witness.unwrap().recheck(&d));
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        for text in [TREFOIL, BRAID_4_13A, BRAID_4_13B, BRAID_5_16] {
            let d = dictionary(text);
            let sequential = decide_width(&d, &SearchConfig::sequential());
            let parallel = decide_width(&d, &SearchConfig { workers: 4 });
            assert_eq!(sequential.width, parallel.width, "{text}");
            if let Some(w) = parallel.witness {
                assert!(w.recheck(&d));
            }
        }
    }

    #[test]
    fn search_is_idempotent() {
        let d = dictionary(BRAID_4_13A);
        let cfg = SearchConfig::sequential();
        assert_eq!(decide_width(&d, &cfg), decide_width(&d, &cfg));
    }

    #[test]
    fn unique_direct_triple_is_found() {
        let identity: Vec<usize> = (0..5).collect();
        let d = KnotDictionary::from_crossings(5, single_triple_crossings(&identity)).unwrap();

        let direct: Vec<_> = seed_triples(5)
            .filter(|seeds| run_trial(&d, seeds).outcome.is_fully_colored())
            .collect();
        assert_eq!(direct, vec![[0, 1, 2]]);

        let decision = decide_width(&d, &SearchConfig::sequential());
        assert_eq!(decision.witness, Some(Witness::Direct { seeds: [0, 1, 2] }));
        assert_eq!(decision.stats.triples, 1);
    }

    #[test]
    fn unique_direct_triple_survives_relabeling() {
        for relabel in (0..5).permutations(5) {
            let d = KnotDictionary::from_crossings(5, single_triple_crossings(&relabel)).unwrap();
            let mut image = [relabel[0], relabel[1], relabel[2]];
            image.sort_unstable();
            assert!(run_trial(&d, &image).outcome.is_fully_colored());

            for cfg in [SearchConfig::sequential(), SearchConfig { workers: 3 }] {
                let decision = decide_width(&d, &cfg);
                assert_eq!(decision.width, Width::TwentyEight, "relabel {relabel:?}");
                assert!(decision.witness.unwrap().recheck(&d));
            }
        }
    }

    #[test]
    fn relabeled_crossing_order_keeps_the_width() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let base = dictionary(BRAID_4_13A);
        for _ in 0..3 {
            let mut crossings = base.crossings().to_vec();
            crossings.shuffle(&mut rng);
            let d = KnotDictionary::from_crossings(base.strand_count(), crossings).unwrap();
            assert_eq!(
                decide_width(&d, &SearchConfig::sequential()).width,
                Width::TwentyEight
            );
        }
    }

    #[test]
    fn fewer_than_three_strands_is_thirty_two() {
        let d = KnotDictionary::from_crossings(2, Vec::new()).unwrap();
        for cfg in [SearchConfig::sequential(), SearchConfig { workers: 2 }] {
            let decision = decide_width(&d, &cfg);
            assert_eq!(decision.width, Width::ThirtyTwo);
            assert_eq!(decision.stats, SearchStats::default());
        }
    }

    #[test]
    fn malformed_codes_are_rejected_before_searching() {
        let err = compute_width("[1, -1]", &SearchConfig::sequential()).unwrap_err();
        assert_eq!(
            err,
            WidthError::MalformedCode(MalformedCodeError::TooFewCrossings {
                found: 1,
                minimum: 3
            })
        );

        // A kinked trefoil is a valid traversal, not a rejected one.
        let decision = compute_width("1, -1, 2, -3, 4, -2, 3, -4", &SearchConfig::sequential()).unwrap();
        assert_eq!(decision.width, Width::TwentyEight);
    }

    #[test]
    fn witness_recheck_rejects_bad_seeds() {
        let d = dictionary(TREFOIL);
        assert!(!Witness::Direct { seeds: [0, 1, 9] }.recheck(&d));
        assert!(!Witness::Verified { seeds: [0, 1, 2], fourth: 1 }.recheck(&d));
        assert!(Witness::Direct { seeds: [0, 2, 4] }.recheck(&d));
    }
}
