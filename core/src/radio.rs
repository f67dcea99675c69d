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

//! The abstract radio boundary.
//!
//! The platform radio layer is modeled as an actor reachable through a [`RadioHandle`]: commands
//! go down an mpsc channel, completions and unsolicited notifications come back as
//! [`RadioEvent`]s on a broadcast channel consumed by the tracker actor. Synchronous state
//! queries (registration, roaming, record load state, packet counters) are answered by injected
//! provider traits.

use std::{fmt, net::IpAddr};

use async_trait::async_trait;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::{
    error::{FailCause, TrackerError},
    types::{ChangeReason, SlotId},
};

/// Power/availability state of the baseband radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    /// The radio has not been brought up or has crashed.
    Unavailable,
    /// The radio is available but powered down.
    Off,
    /// The radio is powered and ready.
    On,
}

impl RadioState {
    is_fn!(is_on, RadioState::On);
}

/// Packet-data registration state reported by the service-state layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    InService,
    OutOfService,
    Searching,
    Denied,
}

impl RegistrationState {
    is_fn!(is_in_service, RegistrationState::InService);
}

/// The radio's own view of the packet-data call, carried in
/// [`RadioEvent::DataStateChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCallState {
    /// The physical link is up and passing traffic.
    Active,
    /// The session is held but the traffic channel has been released.
    Dormant,
    /// The radio no longer has the call.
    Inactive,
}

/// Progress of an over-the-air provisioning session. Data calls are blocked while one is in
/// progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaStatus {
    Started,
    Committed,
    Aborted,
}

/// Network attachment parameters returned by the radio when a data call comes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    pub interface_name: String,
    pub ip_address: IpAddr,
    pub gateway: IpAddr,
    pub dns_servers: Vec<IpAddr>,
}

/// Commands accepted by the radio actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCommand {
    SetupDataCall { slot: SlotId, reason: ChangeReason },
    DeactivateDataCall { slot: SlotId, reason: ChangeReason },
    SetRadioPower(bool),
}

pub type RadioEventRx = broadcast::Receiver<RadioEvent>;
pub type RadioEventTx = broadcast::Sender<RadioEvent>;

/// Events published by the radio layer. Command completions and unsolicited environment
/// changes arrive on the same stream and are handled one at a time by the tracker actor, so
/// no handler ever observes a half-applied transition.
#[derive(Debug, Clone)]
pub enum RadioEvent {
    RadioAvailable,
    RadioOffOrUnavailable,
    RecordsLoaded,
    DataStateChanged(DataCallState),
    VoiceCallStarted,
    VoiceCallEnded,
    RoamingOn,
    RoamingOff,
    RegistrationDetached,
    OtaProvisioning(OtaStatus),
    ScreenOn,
    ScreenOff,
    NetworkConnectivityChanged {
        wifi_connected: bool,
    },
    /// Completion of [`RadioCommand::SetupDataCall`].
    SetupDataCallDone {
        slot: SlotId,
        result: Result<LinkSettings, FailCause>,
        reason: ChangeReason,
    },
    /// Completion of [`RadioCommand::DeactivateDataCall`].
    DeactivateDataCallDone {
        slot: SlotId,
        reason: ChangeReason,
    },
}

impl fmt::Display for RadioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Requester handle for the radio actor.
#[derive(Debug, Clone)]
pub struct RadioHandle {
    command_tx: mpsc::Sender<RadioCommand>,
    event_tx: RadioEventTx,
}

impl RadioHandle {
    pub fn new(command_tx: mpsc::Sender<RadioCommand>, event_tx: RadioEventTx) -> Self {
        Self { command_tx, event_tx }
    }

    pub fn subscribe_events(&self) -> RadioEventRx {
        self.event_tx.subscribe()
    }

    /// Ask the radio to bring up a data call on `slot`. Completion arrives as
    /// [`RadioEvent::SetupDataCallDone`] carrying the same `reason`.
    pub async fn setup_data_call(&self, slot: SlotId, reason: ChangeReason) -> Result<(), TrackerError> {
        self.send(RadioCommand::SetupDataCall { slot, reason }).await
    }

    /// Ask the radio to tear down the data call on `slot`. Completion arrives as
    /// [`RadioEvent::DeactivateDataCallDone`].
    pub async fn deactivate_data_call(&self, slot: SlotId, reason: ChangeReason) -> Result<(), TrackerError> {
        self.send(RadioCommand::DeactivateDataCall { slot, reason }).await
    }

    pub async fn set_radio_power(&self, on: bool) -> Result<(), TrackerError> {
        self.send(RadioCommand::SetRadioPower(on)).await
    }

    async fn send(&self, command: RadioCommand) -> Result<(), TrackerError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| TrackerError::RadioDisconnected)
    }
}

/// Snapshot queries answered synchronously by the platform service-state layer.
pub trait ServiceStateProvider: Send + Sync {
    fn registration_state(&self) -> RegistrationState;

    fn is_roaming(&self) -> bool;

    /// Whether this radio technology can carry voice and data at the same time.
    fn concurrent_voice_and_data(&self) -> bool;

    fn radio_state(&self) -> RadioState;

    /// The power state the platform wants the radio in.
    fn desired_radio_power(&self) -> bool;

    /// True when running against a simulated radio; the tracker then fakes the data call
    /// instead of dialing.
    fn simulated_mode(&self) -> bool;
}

/// Access to the subscriber identity records.
pub trait RecordsProvider: Send + Sync {
    fn records_loaded(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Packet counters unavailable: {0}")]
    Unavailable(String),
}

/// Source of interface packet counters sampled by the activity monitor. Sampling failures are
/// tolerated; the monitor treats them as a zero-delta poll.
#[async_trait]
pub trait LinkStatsProvider: Send + Sync {
    async fn tx_packets(&self) -> Result<u64, StatsError>;

    async fn rx_packets(&self) -> Result<u64, StatsError>;
}
