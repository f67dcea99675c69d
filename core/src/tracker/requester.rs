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

use log::*;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time,
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    error::{FailCause, TrackerError},
    radio::LinkSettings,
    types::{ChangeReason, ConnectionState, DataActivity},
};

const LOG_TARGET: &str = "moblink::tracker::requester";

pub type TrackerEventRx = broadcast::Receiver<TrackerEvent>;
pub type TrackerEventTx = broadcast::Sender<TrackerEvent>;

/// Notifications published by the tracker whenever connectivity or link activity changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The data call is up.
    DataConnected(ChangeReason),
    /// The data call is down.
    DataDisconnected(ChangeReason),
    /// Setup failed and no retry is scheduled.
    DataSetupFailed(FailCause),
    /// The call is held but data cannot flow right now (e.g. a voice call on a
    /// non-concurrent radio).
    DataSuspended(ChangeReason),
    /// Data flow resumed after a suspension.
    DataResumed(ChangeReason),
    /// The traffic classification of the link changed.
    DataActivityChanged(DataActivity),
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TrackerEvent::*;
        match self {
            DataConnected(reason) => write!(f, "DataConnected({})", reason),
            DataDisconnected(reason) => write!(f, "DataDisconnected({})", reason),
            DataSetupFailed(cause) => write!(f, "DataSetupFailed({})", cause),
            DataSuspended(reason) => write!(f, "DataSuspended({})", reason),
            DataResumed(reason) => write!(f, "DataResumed({})", reason),
            DataActivityChanged(activity) => write!(f, "DataActivityChanged({})", activity),
        }
    }
}

/// Requests accepted by the tracker actor.
#[derive(Debug)]
pub enum TrackerRequest {
    GetConnectionState(oneshot::Sender<ConnectionState>),
    GetDataActivity(oneshot::Sender<DataActivity>),
    GetLinkSettings(oneshot::Sender<Option<LinkSettings>>),
    GetRetryCount(oneshot::Sender<usize>),
    SetDataEnabled(bool),
    SetRoamingAllowed(bool),
}

/// Clonable handle to the tracker actor.
#[derive(Debug, Clone)]
pub struct TrackerRequester {
    sender: mpsc::Sender<TrackerRequest>,
    event_tx: TrackerEventTx,
}

impl TrackerRequester {
    pub fn new(sender: mpsc::Sender<TrackerRequest>, event_tx: TrackerEventTx) -> Self {
        Self { sender, event_tx }
    }

    pub fn subscribe_events(&self) -> TrackerEventRx {
        self.event_tx.subscribe()
    }

    /// The event subscription as a `Stream`.
    pub fn event_stream(&self) -> BroadcastStream<TrackerEvent> {
        BroadcastStream::new(self.event_tx.subscribe())
    }

    pub async fn connection_state(&self) -> Result<ConnectionState, TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TrackerRequest::GetConnectionState(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrackerError::ActorResponseCancelled)
    }

    pub async fn data_activity(&self) -> Result<DataActivity, TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TrackerRequest::GetDataActivity(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrackerError::ActorResponseCancelled)
    }

    /// The attachment parameters of the active data call, or `None` when no call is up.
    pub async fn link_settings(&self) -> Result<Option<LinkSettings>, TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TrackerRequest::GetLinkSettings(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrackerError::ActorResponseCancelled)
    }

    pub async fn retry_count(&self) -> Result<usize, TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TrackerRequest::GetRetryCount(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrackerError::ActorResponseCancelled)
    }

    /// Flip the master data switch. Enabling attempts a setup, disabling tears the call down.
    pub async fn set_data_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
        self.send(TrackerRequest::SetDataEnabled(enabled)).await
    }

    /// Allow or forbid data while roaming.
    pub async fn set_roaming_allowed(&self, allowed: bool) -> Result<(), TrackerError> {
        self.send(TrackerRequest::SetRoamingAllowed(allowed)).await
    }

    /// Wait until the data call is up. Useful for tests and startup sequencing; steady-state
    /// consumers should subscribe to events instead.
    pub async fn wait_until_connected(&self, timeout: Duration) -> Result<(), TrackerError> {
        let mut events = self.subscribe_events();
        if self.connection_state().await?.is_connected() {
            return Ok(());
        }
        let deadline = time::Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(time::Instant::now())
                .ok_or(TrackerError::ConnectWaitTimeout)?;
            match time::timeout(remaining, events.recv()).await {
                Ok(Ok(TrackerEvent::DataConnected(_))) => return Ok(()),
                Ok(Ok(event)) => {
                    debug!(
                        target: LOG_TARGET,
                        "Received event while waiting for the data call: {}", event
                    );
                },
                Ok(Err(broadcast::error::RecvError::Lagged(n))) => {
                    warn!(target: LOG_TARGET, "Lagging behind on {} tracker event(s)", n);
                    // The connected event may have been among the missed ones
                    if self.connection_state().await?.is_connected() {
                        return Ok(());
                    }
                },
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    return Err(TrackerError::EventStreamClosed);
                },
                Err(_) => return Err(TrackerError::ConnectWaitTimeout),
            }
        }
    }

    async fn send(&self, request: TrackerRequest) -> Result<(), TrackerError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| TrackerError::ActorDisconnected)
    }
}
