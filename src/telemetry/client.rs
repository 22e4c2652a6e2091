// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry request envelope and hand-off to a transport.
//!
//! Delivery (batching cadence, retries, backoff) belongs to the
//! [`Transport`] implementation. The client only numbers and stamps
//! requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::payload::TelemetryPayload;
use crate::error::TransportError;

/// Telemetry intake API version.
pub const API_VERSION: &str = "v1";

/// Random identifier fixed for the lifetime of a client.
///
/// The intake groups requests from the same process by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RuntimeId(Uuid);

impl RuntimeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RuntimeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One telemetry request as delivered to the intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRequest {
    pub api_version: &'static str,
    pub request_type: &'static str,
    pub tracer_time: i64,
    pub runtime_id: RuntimeId,
    pub seq_id: u64,
    pub payload: Value,
}

/// Delivers telemetry requests to a backend.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: &TelemetryRequest) -> Result<(), TransportError>;
}

/// Wraps payloads into numbered requests and forwards them.
pub struct TelemetryClient<T: Transport> {
    transport: T,
    runtime_id: RuntimeId,
    seq_id: AtomicU64,
}

impl<T: Transport> TelemetryClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_runtime_id(transport, RuntimeId::new())
    }

    pub fn with_runtime_id(transport: T, runtime_id: RuntimeId) -> Self {
        Self {
            transport,
            runtime_id,
            seq_id: AtomicU64::new(0),
        }
    }

    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the envelope for a payload. Each call takes the next sequence number.
    pub fn request(&self, payload: &TelemetryPayload) -> TelemetryRequest {
        TelemetryRequest {
            api_version: API_VERSION,
            request_type: payload.request_type(),
            tracer_time: chrono::Utc::now().timestamp(),
            runtime_id: self.runtime_id,
            seq_id: self.seq_id.fetch_add(1, Ordering::Relaxed) + 1,
            payload: payload.to_dict(),
        }
    }

    /// Send a payload. Ownership of the payload ends here.
    pub fn send(&self, payload: TelemetryPayload) -> Result<(), TransportError> {
        let request = self.request(&payload);
        debug!(
            request_type = request.request_type,
            seq_id = request.seq_id,
            "Sending telemetry"
        );

        self.transport.send(&request).map_err(|err| {
            warn!(
                request_type = request.request_type,
                seq_id = request.seq_id,
                error = %err,
                retryable = err.is_retryable(),
                "Telemetry delivery failed"
            );
            err
        })
    }
}
