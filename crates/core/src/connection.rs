// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only snapshot of a repository connection.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Name of a repository connection.
    pub struct ConnectionName;
}

/// The slice of a repository connection's configuration the kernel needs:
/// its identity and how many documents it is budgeted to work on at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    name: ConnectionName,
    max_connections: u32,
}

impl ConnectionSnapshot {
    pub fn new(name: impl Into<ConnectionName>, max_connections: u32) -> Self {
        Self {
            name: name.into(),
            max_connections,
        }
    }

    pub fn name(&self) -> &ConnectionName {
        &self.name
    }

    /// Configured concurrency budget. Load ratings divide in-flight counts
    /// by this, so a busier budget tolerates more simultaneous work before
    /// its bins look loaded.
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
