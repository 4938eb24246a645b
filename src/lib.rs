#![doc = include_str!("../README.md")]
// #![deny(
//     clippy::all,
//     clippy::pedantic,
//     clippy::nursery,
//     future_incompatible
// )]
// #![allow(clippy::cast_possible_truncation)]
// #![allow(clippy::cast_precision_loss)]

pub mod compound;
pub mod dense;
pub mod error;
pub mod index;
pub mod ledger;
pub mod matrices;
pub mod offset;
pub mod options;
pub mod params;
pub mod pscore;
pub mod sequence;
pub mod sparse;
pub mod structure;

pub use compound::{CompoundKind, FoldCompound};
pub use error::{FoldError, FoldResult};
pub use index::TriIndex;
pub use matrices::{MatrixKind, MfeMatrices, PfMatrices};
pub use options::{AllocationPlan, FoldOptions};
pub use params::{ExpParams, ModelDetails, Params};
