//! Wirtinger coloring propagation.
//!
//! A coloring assigns opaque colors to strands. Starting from distinctly colored seed
//! strands, forced moves are applied at crossings until none is left:
//!
//! - **over-pass continuity**: both over strand-ends of a crossing belong to the same arc,
//!   so if one is colored the other receives its color;
//! - **under-pass move**: once the over-pass is colored, a colored under strand-end passes
//!   its color to the uncolored one on the other side.
//!
//! Moves never recolor a strand. A relation whose two strand-ends end up with different
//! colors is a *multi-colored crossing*; it is counted when the fixed point is classified.
//!
//! The set of colored strands is the least fixed point of a monotone closure, so it does
//! not depend on the order crossings are scanned in. Along every chain of active relations
//! colors spread contiguously from the seeds, so the number of multi-colored relations is
//! order-independent as well.

use crate::dictionary::{Crossing, KnotDictionary};

// ============================================================================
// Color / Coloring
// ============================================================================

/// An opaque color. Only equality is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    /// Creates a color with the given identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the identifier.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A partial strand coloring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coloring {
    colors: Vec<Option<Color>>,
    colored: usize,
}

impl Coloring {
    /// Creates a coloring with every strand uncolored.
    pub fn uncolored(strand_count: usize) -> Self {
        Self {
            colors: vec![None; strand_count],
            colored: 0,
        }
    }

    /// Creates a coloring where seed `k` receives `Color::new(k)`.
    ///
    /// A repeated seed keeps the color of its first occurrence.
    ///
    /// # Panics
    /// Panics if a seed is out of range.
    pub fn seeded(strand_count: usize, seeds: &[usize]) -> Self {
        let mut coloring = Self::uncolored(strand_count);
        for (k, &s) in seeds.iter().enumerate() {
            coloring.force(s, Color::new(k as u32));
        }
        coloring
    }

    /// Returns the colored strands in ascending order.
    pub fn colored_strands(&self) -> impl Iterator<Item = usize> + '_ {
        self.colors
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.is_some().then_some(s))
    }

    /// Returns the number of strands.
    #[inline]
    pub fn strand_count(&self) -> usize {
        self.colors.len()
    }

    /// Returns the color of `strand`, if any.
    #[inline]
    pub fn color(&self, strand: usize) -> Option<Color> {
        self.colors[strand]
    }

    /// Returns whether `strand` is colored.
    #[inline]
    pub fn is_colored(&self, strand: usize) -> bool {
        self.colors[strand].is_some()
    }

    /// Returns the number of colored strands.
    #[inline]
    pub fn colored_count(&self) -> usize {
        self.colored
    }

    /// Returns whether every strand is colored.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.colored == self.colors.len()
    }

    /// Returns the uncolored strands in ascending order.
    pub fn uncolored_strands(&self) -> impl Iterator<Item = usize> + '_ {
        self.colors
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.is_none().then_some(s))
    }

    /// Returns one flag per strand, `true` where colored.
    pub fn colored_mask(&self) -> Vec<bool> {
        self.colors.iter().map(Option::is_some).collect()
    }

    /// Colors `strand` if it is still uncolored. Returns whether anything changed.
    #[inline]
    fn force(&mut self, strand: usize, color: Color) -> bool {
        if self.colors[strand].is_some() {
            return false;
        }
        self.colors[strand] = Some(color);
        self.colored += 1;
        true
    }

    /// Copies a color across a relation when exactly one side is colored.
    /// Returns the strand that was colored.
    #[inline]
    fn transfer(&mut self, a: usize, b: usize) -> Option<usize> {
        match (self.colors[a], self.colors[b]) {
            (Some(c), None) => self.force(b, c).then_some(b),
            (None, Some(c)) => self.force(a, c).then_some(a),
            _ => None,
        }
    }

    /// Returns whether both strands are colored and their colors differ.
    #[inline]
    fn disagree(&self, a: usize, b: usize) -> bool {
        matches!((self.colors[a], self.colors[b]), (Some(x), Some(y)) if x != y)
    }
}

// ============================================================================
// Forcing rule
// ============================================================================

/// Returns the color of the crossing's over-pass, if either over strand-end is colored.
#[inline]
pub fn over_color(crossing: &Crossing, coloring: &Coloring) -> Option<Color> {
    coloring
        .color(crossing.over.incoming)
        .or_else(|| coloring.color(crossing.over.outgoing))
}

/// Applies every forced move available at one crossing. Returns whether anything changed.
#[inline]
pub fn apply_forcing_rule(crossing: &Crossing, coloring: &mut Coloring) -> bool {
    let mut changed = false;
    force_at(crossing, coloring, |_| changed = true);
    changed
}

/// Applies the forced moves at one crossing, reporting each newly colored strand.
#[inline]
fn force_at(crossing: &Crossing, coloring: &mut Coloring, mut on_forced: impl FnMut(usize)) {
    if let Some(s) = coloring.transfer(crossing.over.incoming, crossing.over.outgoing) {
        on_forced(s);
    }
    if over_color(crossing, coloring).is_some() {
        if let Some(s) = coloring.transfer(crossing.under.incoming, crossing.under.outgoing) {
            on_forced(s);
        }
    }
}

/// Counts the multi-colored relations at one crossing (0, 1, or 2).
#[inline]
pub fn multicolored_relations(crossing: &Crossing, coloring: &Coloring) -> usize {
    let mut count = 0;
    if coloring.disagree(crossing.over.incoming, crossing.over.outgoing) {
        count += 1;
    }
    if over_color(crossing, coloring).is_some()
        && coloring.disagree(crossing.under.incoming, crossing.under.outgoing)
    {
        count += 1;
    }
    count
}

/// Counts multi-colored relations over the whole diagram.
///
/// A crossing whose over-pass and under-pass both disagree counts twice.
pub fn count_multicolored_crossings(dictionary: &KnotDictionary, coloring: &Coloring) -> usize {
    dictionary
        .crossings()
        .iter()
        .map(|c| multicolored_relations(c, coloring))
        .sum()
}

// ============================================================================
// Engine
// ============================================================================

/// Terminal state of a propagation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every strand is colored.
    FullyColored,
    /// Fixed point with strands left uncolored and no multi-colored crossing.
    StuckPartial {
        /// Strands left uncolored.
        uncolored: usize,
    },
    /// Fixed point with strands left uncolored and at least one multi-colored crossing.
    Conflict {
        /// Multi-colored relations at the fixed point.
        multicolored: usize,
        /// Strands left uncolored.
        uncolored: usize,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::FullyColored`].
    #[inline]
    pub fn is_fully_colored(self) -> bool {
        self == Outcome::FullyColored
    }
}

/// A finished trial: its terminal state and the coloring it reached.
#[derive(Clone, Debug)]
pub struct Trial {
    /// Terminal state.
    pub outcome: Outcome,
    /// Coloring at the fixed point.
    pub coloring: Coloring,
}

/// Propagates forced moves to a fixed point, then classifies.
///
/// Newly colored strands go on a worklist, and only the crossings incident to a strand
/// are revisited when it is colored. A crossing can only gain a move when one of its
/// strand-ends gains a color, so nothing is missed.
pub fn propagate(dictionary: &KnotDictionary, coloring: &mut Coloring) -> Outcome {
    let crossings = dictionary.crossings();
    let mut pending: Vec<usize> = coloring.colored_strands().collect();
    while let Some(strand) = pending.pop() {
        for &i in dictionary.incident_crossings(strand) {
            force_at(&crossings[i], coloring, |s| pending.push(s));
        }
    }
    classify(dictionary, coloring)
}

/// Propagates forced moves by repeated full passes in the given crossing order, then
/// classifies.
///
/// `order` holds indices into [`KnotDictionary::crossings`]; any permutation reaches the
/// same colored set and terminal state as [`propagate`].
pub fn propagate_in_order(
    dictionary: &KnotDictionary,
    coloring: &mut Coloring,
    order: &[usize],
) -> Outcome {
    debug_assert_eq!(order.len(), dictionary.crossing_count());
    let crossings = dictionary.crossings();
    loop {
        let mut changed = false;
        for &i in order {
            changed |= apply_forcing_rule(&crossings[i], coloring);
        }
        if !changed {
            break;
        }
    }
    classify(dictionary, coloring)
}

/// Classifies a coloring that has reached its fixed point.
pub fn classify(dictionary: &KnotDictionary, coloring: &Coloring) -> Outcome {
    if coloring.is_complete() {
        return Outcome::FullyColored;
    }
    let uncolored = coloring.strand_count() - coloring.colored_count();
    match count_multicolored_crossings(dictionary, coloring) {
        0 => Outcome::StuckPartial { uncolored },
        multicolored => Outcome::Conflict {
            multicolored,
            uncolored,
        },
    }
}

/// Seeds a fresh coloring with distinct colors and propagates it to a fixed point.
pub fn run_trial(dictionary: &KnotDictionary, seeds: &[usize]) -> Trial {
    let mut coloring = Coloring::seeded(dictionary.strand_count(), seeds);
    let outcome = propagate(dictionary, &mut coloring);
    Trial { outcome, coloring }
}

// ============================================================================
// Tests
// ============================================================================
