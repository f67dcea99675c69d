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

//! # moblink
//!
//! An in-process orchestrator for a mobile-network packet-data session. The tracker actor owns
//! the connection state machine and coordinates radio state, registration state, roaming policy,
//! retry backoff and traffic-activity monitoring over an abstract radio boundary.
//!
//! The tracker is driven entirely by [`RadioEvent`]s published by the platform radio layer and by
//! requests sent through a [`TrackerRequester`]. All state lives on a single actor task; timers
//! and asynchronous radio completions are processed on the same loop, so no locking is required.

#[macro_use]
mod macros;

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod radio;
pub mod retry;
pub mod tracker;
pub mod types;

pub use config::{DataSettings, TrackerConfig};
pub use error::{FailCause, TrackerError};
pub use radio::{LinkSettings, RadioEvent, RadioHandle};
pub use tracker::{DataConnectionTracker, TrackerEvent, TrackerRequester};
pub use types::{ChangeReason, ConnectionState, DataActivity, SlotId};

#[cfg(test)]
pub(crate) mod test_utils;
