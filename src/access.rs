//! Access classes and per-operation options
//!
//! Player data lives in separate partitions. Not every operation is available on
//! every partition, and asking for an unsupported combination is a programming
//! error: it is rejected here, before a request is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition of player data an operation addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    /// Readable and writable by the player
    #[default]
    Default,
    /// Server-only partition
    Private,
    /// Readable by the player, writable by the server
    Protected,
    /// Readable by any player, writable by the owner
    Public,
}

impl AccessClass {
    /// Path segment appended to the player data route
    pub(crate) fn path_segment(&self) -> Option<&'static str> {
        match self {
            AccessClass::Default => None,
            AccessClass::Private => Some("private"),
            AccessClass::Protected => Some("protected"),
            AccessClass::Public => Some("public"),
        }
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessClass::Default => "default",
            AccessClass::Private => "private",
            AccessClass::Protected => "protected",
            AccessClass::Public => "public",
        };
        write!(f, "{name}")
    }
}

/// Data operations, for access class validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Save one or more items
    Save,
    /// Delete one item
    Delete,
    /// Delete every item
    DeleteAll,
    /// List keys
    ListKeys,
    /// Load selected items
    Load,
    /// Load every item
    LoadAll,
    /// Query player data
    PlayerQuery,
    /// Query custom data
    CustomQuery,
}

impl OperationKind {
    /// Access classes this operation accepts
    pub fn supported(&self) -> &'static [AccessClass] {
        use AccessClass::*;
        match self {
            OperationKind::Save | OperationKind::Delete | OperationKind::DeleteAll => {
                &[Default, Public]
            }
            OperationKind::ListKeys | OperationKind::Load | OperationKind::LoadAll => {
                &[Default, Protected, Public]
            }
            OperationKind::PlayerQuery => &[Public],
            OperationKind::CustomQuery => &[Default],
        }
    }

    /// Whether the operation reads without modifying
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            OperationKind::ListKeys | OperationKind::Load | OperationKind::LoadAll
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Save => "save",
            OperationKind::Delete => "delete",
            OperationKind::DeleteAll => "delete all",
            OperationKind::ListKeys => "list keys",
            OperationKind::Load => "load",
            OperationKind::LoadAll => "load all",
            OperationKind::PlayerQuery => "player query",
            OperationKind::CustomQuery => "custom query",
        };
        write!(f, "{name}")
    }
}

/// API misuse detected before any request is built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessClassError {
    /// The operation does not exist for this access class
    #[error("access class '{access_class}' is not supported for {operation}")]
    Unsupported {
        /// Requested access class
        access_class: AccessClass,
        /// Attempted operation
        operation: OperationKind,
    },

    /// A player id was supplied where only the signed-in player can be addressed
    #[error("a player id can only be supplied when reading public data, not for {operation} on '{access_class}'")]
    PlayerIdNotAllowed {
        /// Requested access class
        access_class: AccessClass,
        /// Attempted operation
        operation: OperationKind,
    },
}

/// Options accepted by every player data operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataOptions {
    /// Partition to address
    pub access_class: AccessClass,
    /// Expected write lock (delete only)
    pub write_lock: Option<String>,
    /// Other player whose public data to read
    pub player_id: Option<String>,
}

impl DataOptions {
    /// Signed-in player's public partition
    pub fn public() -> Self {
        Self {
            access_class: AccessClass::Public,
            ..Self::default()
        }
    }

    /// Signed-in player's protected partition
    pub fn protected() -> Self {
        Self {
            access_class: AccessClass::Protected,
            ..Self::default()
        }
    }

    /// Public partition of another player
    pub fn public_for(player_id: impl Into<String>) -> Self {
        Self {
            access_class: AccessClass::Public,
            player_id: Some(player_id.into()),
            ..Self::default()
        }
    }

    /// Guard a delete with the lock the caller last observed
    pub fn with_write_lock(mut self, write_lock: impl Into<String>) -> Self {
        self.write_lock = Some(write_lock.into());
        self
    }

    /// Check the options against the support matrix for `operation`
    pub fn validate(&self, operation: OperationKind) -> Result<(), AccessClassError> {
        if !operation.supported().contains(&self.access_class) {
            return Err(AccessClassError::Unsupported {
                access_class: self.access_class,
                operation,
            });
        }

        if self.player_id.is_some()
            && !(operation.is_read() && self.access_class == AccessClass::Public)
        {
            return Err(AccessClassError::PlayerIdNotAllowed {
                access_class: self.access_class,
                operation,
            });
        }

        Ok(())
    }
}
