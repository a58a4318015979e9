use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::*;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Completed,
    Failed,
}

/// Snapshot of one finished analysis, as handed to an [`AuditSink`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub request_id: Uuid,
    pub stage: String,
    pub status: AuditStatus,
    pub duration_ms: u64,
    /// Serialized result, or the error message on failure.
    pub payload: Value,
}

/// Where analysis snapshots go once a request finishes.
///
/// Sinks must not fail the request; anything that goes wrong while
/// recording is theirs to log.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits each snapshot as a structured `info` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            request_id = %event.request_id,
            stage = %event.stage,
            status = ?event.status,
            duration_ms = event.duration_ms,
            payload = %event.payload,
            "analysis recorded"
        );
    }
}

/// Keeps snapshots in memory, mostly for inspection in tests and tools.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
