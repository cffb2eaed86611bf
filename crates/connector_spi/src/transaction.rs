//! Transaction handles and isolation negotiation.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use crate::errors::{ConnectorError, Result};

/// Isolation levels a transaction may request, ordered weakest to
/// strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "read uncommitted",
            IsolationLevel::ReadCommitted => "read committed",
            IsolationLevel::RepeatableRead => "repeatable read",
            IsolationLevel::Serializable => "serializable",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IsolationLevel {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "read uncommitted" => IsolationLevel::ReadUncommitted,
            "read committed" => IsolationLevel::ReadCommitted,
            "repeatable read" => IsolationLevel::RepeatableRead,
            "serializable" => IsolationLevel::Serializable,
            other => {
                return Err(ConnectorError::InvalidConfiguration(format!(
                    "unknown isolation level: {other}"
                )))
            }
        })
    }
}

/// Errors unless a connector supporting at most `supported` can honor a
/// transaction requesting `requested`.
///
/// A connector honors any request at or below its own level; a strictly
/// stronger request is rejected before any work is scheduled.
pub fn check_connector_supports(
    supported: IsolationLevel,
    requested: IsolationLevel,
) -> Result<()> {
    if requested > supported {
        return Err(ConnectorError::UnsupportedIsolationLevel {
            requested,
            supported,
        });
    }
    Ok(())
}

/// Opaque marker for an active transaction.
///
/// Handles carry no per-transaction state; connectors hand back a shared
/// instance and downcast through `as_any` when the engine passes one in.
pub trait ConnectorTransactionHandle: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}
