//! # Gabai Width
//!
//! Decides whether a prime, bridge-4 knot diagram has Gabai width 28 or 32.
//!
//! The decision comes from Wirtinger colorings: seed a few strands with distinct colors,
//! propagate forced moves across crossings, and see whether the whole diagram fills in.
//!
//! This crate provides:
//! - A Gauss code parser accepting signed (`1, -2, ...`) and tagged (`O1-U2-...`) codes.
//! - An immutable **knot dictionary**: strand-ends per crossing and the Wirtinger arcs.
//! - A reentrant **coloring engine** that runs forced moves to a fixed point.
//! - A seed search over every strand triple, with fourth-seed verification and a
//!   rayon-parallel first-success mode.
//!
//! ## Quick Start
//!
//! ```
//! use gabai_width::search::{compute_width, SearchConfig, Width};
//!
//! let decision = compute_width("1, -2, 3, -1, 2, -3", &SearchConfig::sequential()).unwrap();
//! assert_eq!(decision.width, Width::TwentyEight);
//! assert_eq!(decision.width.value(), 28);
//! ```
//!
//! ## Validating Reference Diagrams
//!
//! ```
//! use gabai_width::search::SearchConfig;
//! use gabai_width::validate::validate_reference_knots;
//!
//! validate_reference_knots(&SearchConfig::default()).expect("bundled diagrams should validate");
//! ```
//!
//! ## Running Single Trials
//!
//! ```
//! use gabai_width::coloring::{run_trial, Outcome};
//! use gabai_width::dictionary::KnotDictionary;
//! use gabai_width::gauss::GaussCode;
//!
//! let code: GaussCode = "1, -2, 3, -1, 2, -3".parse().unwrap();
//! let dictionary = KnotDictionary::from_gauss_code(&code).unwrap();
//! assert_eq!(dictionary.strand_count(), 6);
//!
//! let trial = run_trial(&dictionary, &[0]);
//! assert_eq!(trial.outcome, Outcome::StuckPartial { uncolored: 4 });
//! ```
//!
//! ## Modules
//!
//! - [`gauss`]: Gauss code parsing and rendering.
//! - [`dictionary`]: Per-knot crossing structure and strand model.
//! - [`coloring`]: Forced-move propagation and terminal classification.
//! - [`search`]: Seed triple enumeration and the width decision.
//! - [`batch`]: Knot lists and per-knot reports.
//! - [`validate`]: Deterministic validation of bundled diagrams.
//! - [`error`]: Rejection reasons.
//!
//! ## Performance Notes
//!
//! - The search runs `C(n, 3)` trials for `n` strands, plus fourth-seed trials for every
//!   conflicting triple. Each trial is linear in the crossing count per pass.
//! - Parallel mode stops scheduling work as soon as any worker finds a witness.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)] // Strand indices a, b, c
#![allow(clippy::doc_markdown)]
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod batch;
pub mod coloring;
pub mod dictionary;
pub mod error;
pub mod gauss;
pub mod search;
pub mod validate;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::batch::{load_knot_list, run_batch, KnotEntry, KnotReport};
    pub use crate::coloring::{run_trial, Coloring, Outcome};
    pub use crate::dictionary::{Crossing, KnotDictionary};
    pub use crate::error::{
        InconsistentDictionaryError, KnotEntryError, MalformedCodeError, WidthError,
    };
    pub use crate::gauss::GaussCode;
    pub use crate::search::{
        compute_width, decide_width, SearchConfig, Width, WidthDecision, WidthSearcher, Witness,
    };
    pub use crate::validate::validate_reference_knots;
}
