//! Word wall service layer.
//! - `normalizer` turns raw input into tally keys.
//! - `wall` records words and messages and reads them back.
//! - `storage` hides the backing store behind one trait with atomic operations.

pub mod errors;
pub mod normalizer;
pub mod storage;
pub mod tally;
pub mod wall;
#[cfg(test)]
pub mod test_support;

pub use errors::{RecordError, Rejection};
pub use normalizer::{normalize, TallyKey};
pub use tally::{RankedEntry, TallyTable, WallStats};
pub use wall::WallService;
