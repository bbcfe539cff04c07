//! Knot dictionary: the strand/crossing structure the coloring engine walks.
//!
//! Strand `i` is the piece of the diagram between visit `i` and visit `i + 1` of the
//! Gauss code (cyclically), so a diagram with `c` crossings has `2c` strands. A crossing
//! whose over-visit sits at position `p` and under-visit at `q` meets four strand-ends:
//!
//! ```text
//!   over:  p-1 -> p      (same over-arc on both sides)
//!   under: q-1 -> q      (the arc breaks here)
//! ```
//!
//! When the two visits of a crossing are adjacent (a kink), one strand is both the
//! outgoing over-end and the incoming under-end; the crossing still has four strand-ends.
//!
//! Strands joined through over-passes form the Wirtinger arcs of the diagram. Coloring one
//! strand of an arc always colors the whole arc, so seeds are only distinguishable up to arcs.

use crate::error::InconsistentDictionaryError;
use crate::gauss::{GaussCode, Handedness};
use std::collections::BTreeSet;

// ============================================================================
// Crossing
// ============================================================================

/// The two strand-ends one pass contributes to a crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StrandEnds {
    /// Strand arriving at the crossing.
    pub incoming: usize,
    /// Strand leaving the crossing.
    pub outgoing: usize,
}

/// A crossing with its over and under strand-ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    /// Crossing label from the Gauss code.
    pub label: u32,
    /// Strand-ends of the over-pass.
    pub over: StrandEnds,
    /// Strand-ends of the under-pass.
    pub under: StrandEnds,
    /// Handedness, when the code spells it out.
    pub handedness: Option<Handedness>,
}

impl Crossing {
    /// Creates a crossing from `(incoming, outgoing)` pairs for the over and under pass.
    pub fn new(label: u32, over: (usize, usize), under: (usize, usize)) -> Self {
        Self {
            label,
            over: StrandEnds {
                incoming: over.0,
                outgoing: over.1,
            },
            under: StrandEnds {
                incoming: under.0,
                outgoing: under.1,
            },
            handedness: None,
        }
    }

    /// Returns the four strand-ends: over in/out, then under in/out.
    #[inline]
    pub fn strand_ends(&self) -> [usize; 4] {
        [
            self.over.incoming,
            self.over.outgoing,
            self.under.incoming,
            self.under.outgoing,
        ]
    }
}

// ============================================================================
// KnotDictionary
// ============================================================================

/// Immutable per-knot structure shared by every coloring trial.
#[derive(Clone, Debug)]
pub struct KnotDictionary {
    strand_count: usize,
    crossings: Vec<Crossing>,
    /// `incident[s]` holds indices of crossings with a strand-end on `s`, ascending.
    incident: Vec<Vec<usize>>,
    arc_of: Vec<usize>,
    arcs: Vec<Vec<usize>>,
}

impl KnotDictionary {
    /// Builds the dictionary for a parsed Gauss code.
    ///
    /// Kinks are accepted: adjacent visits of one crossing share a strand between the
    /// over-pass and the under-pass.
    ///
    /// # Errors
    /// Returns an error only if a crossing's under-pass would not separate two strands,
    /// which a validated code cannot produce.
    pub fn from_gauss_code(code: &GaussCode) -> Result<Self, InconsistentDictionaryError> {
        let n = code.len();
        let crossings = code
            .crossings()
            .into_iter()
            .map(|visits| {
                let mut crossing = Crossing::new(
                    visits.label,
                    ((visits.over + n - 1) % n, visits.over),
                    ((visits.under + n - 1) % n, visits.under),
                );
                crossing.handedness = visits.handedness;
                crossing
            })
            .collect();

        Self::from_crossings(n, crossings)
    }

    /// Assembles a dictionary from explicit crossing records.
    ///
    /// This is how synthetic diagrams are built. The over-pass may touch a single strand
    /// (`incoming == outgoing`), which models a whole Wirtinger arc as one strand.
    ///
    /// # Errors
    /// Returns an error for a strand index `>= strand_count`, a repeated label, or a
    /// crossing whose under-pass does not separate two different strands.
    pub fn from_crossings(
        strand_count: usize,
        crossings: Vec<Crossing>,
    ) -> Result<Self, InconsistentDictionaryError> {
        let mut labels = BTreeSet::new();
        for c in &crossings {
            if !labels.insert(c.label) {
                return Err(InconsistentDictionaryError::DuplicateLabel { label: c.label });
            }
            if let Some(&strand) = c.strand_ends().iter().find(|&&s| s >= strand_count) {
                return Err(InconsistentDictionaryError::StrandOutOfRange {
                    label: c.label,
                    strand,
                    strand_count,
                });
            }
            if c.under.incoming == c.under.outgoing {
                return Err(InconsistentDictionaryError::DegenerateCrossing { label: c.label });
            }
        }

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); strand_count];
        for (i, c) in crossings.iter().enumerate() {
            for s in c.strand_ends() {
                if incident[s].last() != Some(&i) {
                    incident[s].push(i);
                }
            }
        }

        let (arc_of, arcs) = wirtinger_arcs(strand_count, &crossings);

        Ok(Self {
            strand_count,
            crossings,
            incident,
            arc_of,
            arcs,
        })
    }

    /// Returns the number of strands.
    #[inline]
    pub fn strand_count(&self) -> usize {
        self.strand_count
    }

    /// Returns the number of crossings.
    #[inline]
    pub fn crossing_count(&self) -> usize {
        self.crossings.len()
    }

    /// Returns all crossings, ordered by label for Gauss-code diagrams.
    #[inline]
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    /// Looks up a crossing by label.
    pub fn crossing(&self, label: u32) -> Option<&Crossing> {
        self.crossings.iter().find(|c| c.label == label)
    }

    /// Returns indices into [`KnotDictionary::crossings`] of every crossing that has a
    /// strand-end on `strand`.
    #[inline]
    pub fn incident_crossings(&self, strand: usize) -> &[usize] {
        &self.incident[strand]
    }

    /// Returns the Wirtinger arcs, each as its strands in ascending order.
    #[inline]
    pub fn arcs(&self) -> &[Vec<usize>] {
        &self.arcs
    }

    /// Returns the index into [`KnotDictionary::arcs`] of the arc containing `strand`.
    #[inline]
    pub fn arc_of(&self, strand: usize) -> usize {
        self.arc_of[strand]
    }
}

/// Groups strands joined through over-passes. Arcs are ordered by their lowest strand.
fn wirtinger_arcs(strand_count: usize, crossings: &[Crossing]) -> (Vec<usize>, Vec<Vec<usize>>) {
    let mut parent: Vec<usize> = (0..strand_count).collect();
    for c in crossings {
        let a = find_root(&mut parent, c.over.incoming);
        let b = find_root(&mut parent, c.over.outgoing);
        if a != b {
            parent[a.max(b)] = a.min(b);
        }
    }

    let mut arc_of = vec![usize::MAX; strand_count];
    let mut arcs: Vec<Vec<usize>> = Vec::new();
    let mut arc_of_root = vec![usize::MAX; strand_count];
    for s in 0..strand_count {
        let root = find_root(&mut parent, s);
        if arc_of_root[root] == usize::MAX {
            arc_of_root[root] = arcs.len();
            arcs.push(Vec::new());
        }
        arc_of[s] = arc_of_root[root];
        arcs[arc_of_root[root]].push(s);
    }
    (arc_of, arcs)
}

fn find_root(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

// ============================================================================
// Tests
// ============================================================================
