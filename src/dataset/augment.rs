//! Label-aware triplet permutations.
//!
//! Every permutation first reads the row as `(anchor, closer, farther)` and then places
//! the texts, so the derived label is correct whichever slot held the closer text.
//! The two `echo_*` variants repeat the anchor as a candidate: an identical text is
//! always the closer one.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::types::{Label, TripletExample};

/// A single relabelling permutation.
pub type Permutation = fn(&TripletExample) -> TripletExample;

/// All variants derived per row, identity first.
pub const PERMUTATIONS: [Permutation; crate::constants::AUGMENT_VARIANTS] =
    [identity, swap_bc, swap_ab, rotate, echo_c, echo_b];

/// `(anchor, closer, farther)` → `B`.
pub fn identity(row: &TripletExample) -> TripletExample {
    let (anchor, closer, farther) = row.roles();
    TripletExample::new(anchor, closer, farther, Label::B)
}

/// `(anchor, farther, closer)` → `C`.
pub fn swap_bc(row: &TripletExample) -> TripletExample {
    let (anchor, closer, farther) = row.roles();
    TripletExample::new(anchor, farther, closer, Label::C)
}

/// `(closer, anchor, farther)` → `B`.
pub fn swap_ab(row: &TripletExample) -> TripletExample {
    let (anchor, closer, farther) = row.roles();
    TripletExample::new(closer, anchor, farther, Label::B)
}

/// `(closer, farther, anchor)` → `C`.
pub fn rotate(row: &TripletExample) -> TripletExample {
    let (anchor, closer, farther) = row.roles();
    TripletExample::new(closer, farther, anchor, Label::C)
}

/// `(farther, anchor, farther)` → `C`.
pub fn echo_c(row: &TripletExample) -> TripletExample {
    let (anchor, _, farther) = row.roles();
    TripletExample::new(farther, anchor, farther, Label::C)
}

/// `(farther, farther, anchor)` → `B`.
pub fn echo_b(row: &TripletExample) -> TripletExample {
    let (anchor, _, farther) = row.roles();
    TripletExample::new(farther, farther, anchor, Label::B)
}

/// Expands `rows` with every [`PERMUTATIONS`] variant, drops exact duplicates, and
/// shuffles the result.
///
/// The output holds at most `6 * rows.len()` examples and always contains every input row.
pub fn augment<R: Rng + ?Sized>(rows: &[TripletExample], rng: &mut R) -> Vec<TripletExample> {
    let mut seen = HashSet::with_capacity(rows.len() * PERMUTATIONS.len());
    let mut augmented = Vec::with_capacity(rows.len() * PERMUTATIONS.len());

    // identity (B rows) or swap_bc (C rows) reproduces each input row exactly.
    for permutation in PERMUTATIONS {
        for row in rows {
            let derived = permutation(row);
            if seen.insert(derived.clone()) {
                augmented.push(derived);
            }
        }
    }

    augmented.shuffle(rng);

    debug!(
        input_rows = rows.len(),
        output_rows = augmented.len(),
        "Augmented triplet dataset"
    );

    augmented
}
