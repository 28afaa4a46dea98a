//! The interactive command dispatch state machine: a hierarchical command tree
//! built from a snapshot of the catalog, driven one input line at a time.

pub mod seat_list;
pub mod tree;

pub use tree::{CliState, CommandTree, DispatchOutcome, Location};
