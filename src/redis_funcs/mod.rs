use std::io::Write;

use clap::ValueEnum;

use crate::error::Result;
use crate::records::RecordSet;
use crate::store::HashStore;

pub mod hash_ops;
pub mod pattern_ops;

pub use hash_ops::{delete_keys, get_keys, push_keys};
pub use pattern_ops::{delete_keys_by_pattern, get_keys_by_pattern};

/// Marker printed by `get` for a missing hash field.
pub const MISSING_VALUE: &str = "NA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Add,
    Get,
    Delete,
    GetPattern,
    DeletePattern,
}

impl Operation {
    /// Pattern operations take a glob instead of a keys file.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Operation::GetPattern | Operation::DeletePattern)
    }
}

/// What an operation runs against.
pub enum Target<'a> {
    Records(&'a RecordSet),
    Pattern(&'a str),
}

/// Counts reported at the end of an operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Records in the file, or keys matched by the pattern.
    pub considered: usize,
    /// Fields inserted, values found, or keys deleted.
    pub affected: i64,
}

pub fn dispatch<S: HashStore, W: Write>(
    operation: Operation,
    target: Target,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    match (operation, target) {
        (Operation::Add, Target::Records(records)) => push_keys(records, store, out),
        (Operation::Get, Target::Records(records)) => get_keys(records, store, out),
        (Operation::Delete, Target::Records(records)) => delete_keys(records, store, out),
        (Operation::GetPattern, Target::Pattern(pattern)) => {
            get_keys_by_pattern(pattern, store, out)
        }
        (Operation::DeletePattern, Target::Pattern(pattern)) => {
            delete_keys_by_pattern(pattern, store, out)
        }
        (operation, _) => Err(crate::error::LoaderError::Usage(format!(
            "operation {:?} does not match its input",
            operation
        ))),
    }
}
