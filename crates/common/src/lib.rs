//! Pieces shared by every crate in the workspace: logging setup and the
//! small wire types that are not owned by any one layer.

pub mod types;
pub mod utils;
