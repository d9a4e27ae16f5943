//! Migrate operations accepted by the dispatcher.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A migrate operation.
///
/// `Up` is the default when no operation is named.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create the head table and run the install script
    Install,
    /// Apply pending migrations
    #[default]
    Up,
    /// Run the drop script
    Drop,
    /// Drop, install, then apply every migration
    Reset,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 4] = [
        Operation::Install,
        Operation::Up,
        Operation::Drop,
        Operation::Reset,
    ];

    /// The operation's CLI / config name.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Up => "up",
            Operation::Drop => "drop",
            Operation::Reset => "reset",
        }
    }

    /// Resolve an operation name, treating an empty name as `up`.
    pub fn from_name(name: &str) -> CoreResult<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(Operation::default());
        }
        trimmed.parse()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "operation_test.rs"]
mod tests;
