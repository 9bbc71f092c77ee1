//! rostermatch-matcher — Roster-to-author matching.
//! Names are normalized, expanded into the spellings arXiv listings use,
//! and tested for exact membership against every paper's author list.

pub mod normalise;
pub mod permute;
pub mod cross_match;

pub use cross_match::{cross_match, MatchMapping, MatchedPaper};
pub use normalise::{normalize_name, normalize_names};
pub use permute::permutations;
