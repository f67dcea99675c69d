// Copyright 2026, The Moblink Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use chrono::{DateTime, Utc};
use log::*;
use serde_derive::Serialize;

const LOG_TARGET: &str = "moblink::diagnostics";

/// Noteworthy link conditions recorded for offline analysis. These are fire-and-forget and
/// never surface as user-facing errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiagnosticEvent {
    /// Packets are leaving the device without anything coming back.
    DataStallSuspected { sent_since_last_recv: u64 },
    /// The stall persisted and the radio is being restarted to recover the link.
    RadioReset { no_recv_poll_count: u32 },
    /// Packet registration detached while the tracker was in the failed state.
    DetachedWhileFailed,
}

/// A [`DiagnosticEvent`] stamped with the time it was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub at: DateTime<Utc>,
    pub event: DiagnosticEvent,
}

impl DiagnosticRecord {
    pub fn new(event: DiagnosticEvent) -> Self {
        Self { at: Utc::now(), event }
    }
}

/// Sink for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: DiagnosticRecord);
}

/// Default sink that forwards diagnostic records to the log.
#[derive(Debug, Clone, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn record(&self, record: DiagnosticRecord) {
        info!(target: LOG_TARGET, "[{}] {:?}", record.at, record.event);
    }
}
