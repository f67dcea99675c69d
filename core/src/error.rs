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

use thiserror::Error;

/// Errors crossing the tracker's external handle boundary. Recoverable conditions inside the
/// state machine (no free slot, stale completions, disallowed setup) never surface here.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to send request to the tracker actor. Channel closed.")]
    ActorDisconnected,
    #[error("The tracker actor was dropped before sending a reply")]
    ActorResponseCancelled,
    #[error("Failed to send command to the radio. Channel closed.")]
    RadioDisconnected,
    #[error("Timeout while waiting for the data connection to come up")]
    ConnectWaitTimeout,
    #[error("Tracker event stream closed unexpectedly")]
    EventStreamClosed,
}

/// Failure cause reported by the radio for a data-call setup attempt.
///
/// The split between permanent and transient causes drives the retry decision: a permanent
/// cause is surfaced immediately with no retry scheduled, a transient cause goes through the
/// retry schedule.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FailCause {
    #[error("Operator determined barring")]
    OperatorBarred,
    #[error("Insufficient network resources")]
    InsufficientResources,
    #[error("Missing or unknown attachment profile")]
    UnknownDataProfile,
    #[error("User authentication failed")]
    UserAuthenticationFailed,
    #[error("Activation rejected by the network")]
    ActivationRejected,
    #[error("Requested service option not supported")]
    ServiceOptionNotSupported,
    #[error("Requested service option not subscribed")]
    ServiceOptionNotSubscribed,
    #[error("Network failure")]
    NetworkFailure,
    #[error("Radio busy")]
    RadioBusy,
    #[error("Data call setup timed out")]
    SetupTimeout,
    #[error("Unspecified failure")]
    Unknown,
}

impl FailCause {
    /// True for causes that cannot be cured by retrying: the subscription, the profile or the
    /// operator has to change first.
    pub fn is_permanent(&self) -> bool {
        use FailCause::*;
        matches!(
            self,
            OperatorBarred |
                UnknownDataProfile |
                UserAuthenticationFailed |
                ActivationRejected |
                ServiceOptionNotSupported |
                ServiceOptionNotSubscribed
        )
    }
}
