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

use std::fmt;

/// Lifecycle state of the packet-data session. Owned exclusively by the tracker actor; at most
/// one value holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session and no setup in progress.
    Idle,
    /// A slot has been claimed and the setup request is being issued to the radio.
    Initing,
    /// The setup request is in flight, waiting for the radio to complete the dial.
    Connecting,
    /// Waiting to try the next candidate attachment profile.
    Scanning,
    /// The data call is up and activity polling is running.
    Connected,
    /// A deactivate request is in flight.
    Disconnecting,
    /// The last setup attempt failed. A reconnect alarm may be pending.
    Failed,
}

impl ConnectionState {
    is_fn!(is_idle, ConnectionState::Idle);

    is_fn!(is_connected, ConnectionState::Connected);

    is_fn!(is_failed, ConnectionState::Failed);

    /// A new setup attempt may only begin from these states.
    pub fn can_start_setup(&self) -> bool {
        matches!(self, ConnectionState::Idle | ConnectionState::Scanning)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Traffic classification of the link, derived from packet-counter deltas between activity
/// polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataActivity {
    /// No packets moved in either direction.
    None,
    /// Packets were received only.
    In,
    /// Packets were sent only.
    Out,
    /// Packets moved in both directions.
    InOut,
    /// No traffic, and the radio has reported the physical channel released.
    Dormant,
}

impl fmt::Display for DataActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Why a connectivity transition happened. Carried as correlation data on setup and teardown
/// requests and echoed in the resulting notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    DataEnabled,
    DataDisabled,
    RoamingOn,
    RoamingOff,
    RadioOn,
    RadioOff,
    RecordsLoaded,
    DataDetached,
    VoiceCallStarted,
    VoiceCallEnded,
    LostConnection,
    ProvisioningDone,
    Shutdown,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Identifier of a data-connection slot within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn setup_is_only_allowed_from_idle_or_scanning() {
        assert!(ConnectionState::Idle.can_start_setup());
        assert!(ConnectionState::Scanning.can_start_setup());
        assert!(!ConnectionState::Initing.can_start_setup());
        assert!(!ConnectionState::Connecting.can_start_setup());
        assert!(!ConnectionState::Connected.can_start_setup());
        assert!(!ConnectionState::Disconnecting.can_start_setup());
        assert!(!ConnectionState::Failed.can_start_setup());
    }
}
