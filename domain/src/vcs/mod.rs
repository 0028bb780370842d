//! Version-control domain logic: blame parsing and commit classification

pub mod blame;
pub mod commit;

pub use blame::{BlameLine, parse_blame};
pub use commit::{ChangeRecord, ChangeStatus, CommitSuggestion, classify};
