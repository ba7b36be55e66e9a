// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only snapshot of the job a batch belongs to.

use crate::connection::ConnectionName;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a crawl job.
    pub struct JobId;
}

/// Snapshot of a job's descriptor, taken by the producer at batch-creation
/// time.
///
/// The snapshot may go stale relative to live job state (the job can pause
/// or abort while its batches sit on a queue); that is tolerated, and the
/// workers re-check liveness against the store before processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    id: JobId,
    connection_name: ConnectionName,
}

impl JobSnapshot {
    pub fn new(id: impl Into<JobId>, connection_name: impl Into<ConnectionName>) -> Self {
        Self {
            id: id.into(),
            connection_name: connection_name.into(),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Name of the repository connection this job crawls through.
    pub fn connection_name(&self) -> &ConnectionName {
        &self.connection_name
    }
}
