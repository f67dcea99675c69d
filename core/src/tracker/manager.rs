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

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
};

use futures::future;
use log::*;
use moblink_shutdown::ShutdownSignal;
use tokio::{
    sync::{broadcast, mpsc},
    task,
    task::JoinHandle,
    time,
    time::Instant,
};

use super::{
    activity::{ActivityMonitor, HangState},
    pool::{DataConnectionPool, SlotStatus},
    requester::{TrackerEvent, TrackerEventTx, TrackerRequest},
};
use crate::{
    config::TrackerConfig,
    diagnostics::{DiagnosticEvent, DiagnosticRecord, DiagnosticSink},
    error::FailCause,
    radio::{
        DataCallState,
        LinkSettings,
        LinkStatsProvider,
        OtaStatus,
        RadioEvent,
        RadioEventRx,
        RadioHandle,
        RecordsProvider,
        ServiceStateProvider,
    },
    retry::RetryPolicy,
    types::{ChangeReason, ConnectionState, SlotId},
};

const LOG_TARGET: &str = "moblink::tracker::manager";

/// # Data Connection Tracker
///
/// The tracker actor is the single authority over the packet-data session. It decides when a
/// setup attempt is worthwhile, drives the connection pool, applies the retry schedule on
/// transient failures, runs the link-activity monitor while connected, and reacts to every
/// environment change the radio layer reports (roaming, registration, voice calls, screen
/// state, provisioning).
///
/// It emits [`TrackerEvent`]s that keep client components in the loop with the state of the
/// data link.
pub struct DataConnectionTracker {
    pub config: TrackerConfig,
    pub request_rx: mpsc::Receiver<TrackerRequest>,
    pub event_tx: TrackerEventTx,
    pub radio: RadioHandle,
    pub service_state: Arc<dyn ServiceStateProvider>,
    pub records: Arc<dyn RecordsProvider>,
    pub link_stats: Arc<dyn LinkStatsProvider>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub shutdown_signal: ShutdownSignal,
}

impl DataConnectionTracker {
    pub fn create(self) -> DataConnectionTrackerActor {
        // Subscribe before the actor task starts so early radio events are not missed
        let radio_events = self.radio.subscribe_events();
        let retry = RetryPolicy::from_configured_profile(self.config.settings.retry_profile.as_deref());

        DataConnectionTrackerActor {
            state: ConnectionState::Idle,
            pool: DataConnectionPool::new(self.config.pool_capacity),
            retry,
            activity: ActivityMonitor::new(),
            data_enabled: self.config.settings.data_enabled,
            roaming_allowed: self.config.settings.roaming_data_allowed,
            voice_call_active: false,
            screen_on: true,
            wifi_connected: false,
            provisioning_in_progress: false,
            pending_radio_restart: false,
            pending_reconnect: None,
            poll_at: None,
            radio_restart_at: None,
            config: self.config,
            request_rx: self.request_rx,
            event_tx: self.event_tx,
            radio: self.radio,
            service_state: self.service_state,
            records: self.records,
            link_stats: self.link_stats,
            diagnostics: self.diagnostics,
            radio_events: Some(radio_events),
            shutdown_signal: Some(self.shutdown_signal),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        task::spawn(self.create().run())
    }
}

#[derive(Debug)]
struct PendingReconnect {
    fire_at: Instant,
    reason: ChangeReason,
}

pub struct DataConnectionTrackerActor {
    config: TrackerConfig,
    state: ConnectionState,
    request_rx: mpsc::Receiver<TrackerRequest>,
    event_tx: TrackerEventTx,
    radio: RadioHandle,
    service_state: Arc<dyn ServiceStateProvider>,
    records: Arc<dyn RecordsProvider>,
    link_stats: Arc<dyn LinkStatsProvider>,
    diagnostics: Arc<dyn DiagnosticSink>,
    pool: DataConnectionPool,
    retry: RetryPolicy,
    activity: ActivityMonitor,
    data_enabled: bool,
    roaming_allowed: bool,
    voice_call_active: bool,
    screen_on: bool,
    wifi_connected: bool,
    provisioning_in_progress: bool,
    pending_radio_restart: bool,
    pending_reconnect: Option<PendingReconnect>,
    poll_at: Option<Instant>,
    radio_restart_at: Option<Instant>,
    radio_events: Option<RadioEventRx>,
    shutdown_signal: Option<ShutdownSignal>,
}

impl DataConnectionTrackerActor {
    pub async fn run(mut self) {
        info!(target: LOG_TARGET, "DataConnectionTracker started");
        let mut shutdown_signal = self
            .shutdown_signal
            .take()
            .expect("DataConnectionTracker initialized without a shutdown_signal");

        let mut radio_events = self
            .radio_events
            .take()
            .expect("DataConnectionTracker initialized without a radio event subscription");

        loop {
            tokio::select! {
                Some(request) = self.request_rx.recv() => {
                    self.handle_request(request).await;
                },

                event = radio_events.recv() => match event {
                    Ok(event) => self.handle_radio_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(target: LOG_TARGET, "Lagging behind on {} radio event(s)", n);
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        info!(target: LOG_TARGET, "Radio event stream closed. Shutting down.");
                        break;
                    },
                },

                _ = wakeup(self.pending_reconnect.as_ref().map(|p| p.fire_at)) => {
                    self.on_reconnect_alarm().await;
                },

                _ = wakeup(self.poll_at) => {
                    self.on_poll_tick().await;
                },

                _ = wakeup(self.radio_restart_at) => {
                    self.on_radio_restart_timer().await;
                },

                _ = &mut shutdown_signal => {
                    info!(target: LOG_TARGET, "DataConnectionTracker is shutting down because it received the shutdown signal");
                    self.clean_up(true, ChangeReason::Shutdown).await;
                    break;
                }
            }
        }
    }

    async fn handle_request(&mut self, request: TrackerRequest) {
        use TrackerRequest::*;
        trace!(target: LOG_TARGET, "Request: {:?}", request);
        match request {
            GetConnectionState(reply) => {
                let _ = reply.send(self.state);
            },
            GetDataActivity(reply) => {
                let _ = reply.send(self.activity.activity());
            },
            GetLinkSettings(reply) => {
                let _ = reply.send(self.pool.active().and_then(|slot| slot.link().cloned()));
            },
            GetRetryCount(reply) => {
                let _ = reply.send(self.retry.retry_count());
            },
            SetDataEnabled(enabled) => self.on_set_data_enabled(enabled).await,
            SetRoamingAllowed(allowed) => self.on_set_roaming_allowed(allowed).await,
        }
    }

    async fn handle_radio_event(&mut self, event: RadioEvent) {
        use RadioEvent::*;
        debug!(target: LOG_TARGET, "Radio event: {}", event);
        match event {
            RadioAvailable => self.on_radio_available().await,
            RadioOffOrUnavailable => self.on_radio_off_or_unavailable().await,
            RecordsLoaded => {
                self.evaluate_and_try_setup(ChangeReason::RecordsLoaded).await;
            },
            DataStateChanged(call_state) => self.on_data_state_changed(call_state).await,
            VoiceCallStarted => self.on_voice_call_started(),
            VoiceCallEnded => self.on_voice_call_ended().await,
            RoamingOn => self.on_roaming_on().await,
            RoamingOff => {
                self.evaluate_and_try_setup(ChangeReason::RoamingOff).await;
            },
            RegistrationDetached => self.on_registration_detached().await,
            OtaProvisioning(status) => self.on_ota_provisioning(status).await,
            ScreenOn => self.on_screen_state_changed(true),
            ScreenOff => self.on_screen_state_changed(false),
            NetworkConnectivityChanged { wifi_connected } => {
                if self.wifi_connected != wifi_connected {
                    debug!(target: LOG_TARGET, "Wifi connectivity changed: {}", wifi_connected);
                    self.wifi_connected = wifi_connected;
                }
            },
            SetupDataCallDone { slot, result, reason } => self.on_setup_complete(slot, result, reason).await,
            DeactivateDataCallDone { slot, reason } => self.on_disconnect_done(slot, reason).await,
        }
    }

    /// Check every condition gating a setup attempt and dial if they all hold. A failing
    /// condition is a normal outcome, not an error; it only gets logged.
    async fn evaluate_and_try_setup(&mut self, reason: ChangeReason) -> bool {
        if !self.state.can_start_setup() {
            debug!(
                target: LOG_TARGET,
                "Setup not attempted ({}): connection state is {}", reason, self.state
            );
            return false;
        }

        let registered = self.service_state.registration_state().is_in_service();
        let radio_ready = self.service_state.radio_state().is_on() || self.records.records_loaded();
        let voice_ok = self.service_state.concurrent_voice_and_data() || !self.voice_call_active;
        let roaming_ok = !self.service_state.is_roaming() || self.roaming_allowed;
        let desired_power = self.service_state.desired_radio_power();

        let allowed = registered &&
            radio_ready &&
            voice_ok &&
            self.data_enabled &&
            roaming_ok &&
            desired_power &&
            !self.pending_radio_restart &&
            !self.provisioning_in_progress;

        if !allowed {
            debug!(
                target: LOG_TARGET,
                "Data call not allowed ({}). registered={} radio_ready={} voice_ok={} data_enabled={} roaming_ok={} \
                 desired_power={} pending_radio_restart={} provisioning={}",
                reason,
                registered,
                radio_ready,
                voice_ok,
                self.data_enabled,
                roaming_ok,
                desired_power,
                self.pending_radio_restart,
                self.provisioning_in_progress
            );
            return false;
        }

        self.try_setup(reason).await
    }

    /// Claim a free slot and issue the asynchronous setup request. Returns false without
    /// raising an error when no slot is free.
    async fn try_setup(&mut self, reason: ChangeReason) -> bool {
        let slot = match self.pool.find_free() {
            Some(slot) => slot,
            None => {
                debug!(
                    target: LOG_TARGET,
                    "No free data-connection slot for setup ({})", reason
                );
                return false;
            },
        };

        self.pool.set_activating(slot);
        self.set_state(ConnectionState::Initing);
        debug!(target: LOG_TARGET, "Setting up data call on slot {} ({})", slot, reason);
        match self.radio.setup_data_call(slot, reason).await {
            Ok(_) => {
                self.set_state(ConnectionState::Connecting);
                true
            },
            Err(err) => {
                error!(target: LOG_TARGET, "Failed to send setup request to the radio: {}", err);
                self.pool.clear(slot);
                self.set_state(ConnectionState::Idle);
                false
            },
        }
    }

    async fn on_setup_complete(&mut self, slot: SlotId, result: Result<LinkSettings, FailCause>, reason: ChangeReason) {
        let slot_activating = self
            .pool
            .get(slot)
            .map(|s| s.status() == SlotStatus::Activating)
            .unwrap_or(false);
        if self.state != ConnectionState::Connecting || !slot_activating {
            debug!(
                target: LOG_TARGET,
                "Ignoring stale setup completion for slot {} in state {}", slot, self.state
            );
            return;
        }

        match result {
            Ok(link) => {
                debug!(
                    target: LOG_TARGET,
                    "Data call up on slot {} ({}, interface {})", slot, reason, link.interface_name
                );
                self.pool.set_active(slot, link);
                self.set_state(ConnectionState::Connected);
                self.retry.reset_retry_count();
                self.cancel_pending_reconnect();
                self.start_activity_poll();
                self.publish_event(TrackerEvent::DataConnected(reason));
            },
            Err(cause) if cause.is_permanent() => {
                warn!(target: LOG_TARGET, "Data call setup failed permanently: {}", cause);
                self.pool.clear(slot);
                self.set_state(ConnectionState::Failed);
                self.publish_event(TrackerEvent::DataSetupFailed(cause));
            },
            Err(cause) => {
                self.pool.clear(slot);
                self.set_state(ConnectionState::Failed);
                if self.retry.retries_exhausted() {
                    warn!(
                        target: LOG_TARGET,
                        "Data call setup failed ({}) and the retry schedule is exhausted", cause
                    );
                    self.publish_event(TrackerEvent::DataSetupFailed(cause));
                    return;
                }
                let delay = self.retry.retry_timer();
                self.retry.increase_retry_count();
                debug!(
                    target: LOG_TARGET,
                    "Data call setup failed ({}). Retry {} scheduled in {:?}",
                    cause,
                    self.retry.retry_count(),
                    delay
                );
                self.pending_reconnect = Some(PendingReconnect {
                    fire_at: Instant::now() + delay,
                    reason,
                });
            },
        }
    }

    async fn on_reconnect_alarm(&mut self) {
        let pending = match self.pending_reconnect.take() {
            Some(pending) => pending,
            None => return,
        };
        debug!(target: LOG_TARGET, "Reconnect alarm fired ({})", pending.reason);
        if self.state.is_failed() {
            self.set_state(ConnectionState::Idle);
        }
        self.evaluate_and_try_setup(pending.reason).await;
    }

    /// Tear the session down. With `tear_down` an asynchronous deactivate is issued and
    /// completion arrives via [`RadioEvent::DeactivateDataCallDone`]; without it the slot is
    /// cleared locally (the connection is already gone). Calling this while idle is a no-op.
    async fn clean_up(&mut self, tear_down: bool, reason: ChangeReason) {
        self.cancel_pending_reconnect();
        self.stop_activity_poll();

        let in_use = self.pool.in_use();
        match in_use {
            Some(slot) if tear_down => {
                debug!(target: LOG_TARGET, "Tearing down data call on slot {} ({})", slot, reason);
                self.set_state(ConnectionState::Disconnecting);
                if let Err(err) = self.radio.deactivate_data_call(slot, reason).await {
                    error!(
                        target: LOG_TARGET,
                        "Failed to send deactivate request to the radio: {}", err
                    );
                    // The radio is gone; drop the connection locally
                    self.pool.clear(slot);
                    self.set_state(ConnectionState::Idle);
                    self.publish_event(TrackerEvent::DataDisconnected(reason));
                }
            },
            Some(slot) => {
                debug!(
                    target: LOG_TARGET,
                    "Clearing data call on slot {} without a deactivate request ({})", slot, reason
                );
                self.pool.clear(slot);
                self.set_state(ConnectionState::Idle);
                self.publish_event(TrackerEvent::DataDisconnected(reason));
            },
            None => {
                if self.state.is_idle() {
                    debug!(target: LOG_TARGET, "Nothing to clean up ({})", reason);
                } else {
                    self.set_state(ConnectionState::Idle);
                    self.publish_event(TrackerEvent::DataDisconnected(reason));
                }
            },
        }
    }

    async fn on_disconnect_done(&mut self, slot: SlotId, reason: ChangeReason) {
        if self.state != ConnectionState::Disconnecting {
            debug!(
                target: LOG_TARGET,
                "Ignoring stale disconnect completion for slot {} in state {}", slot, self.state
            );
            return;
        }
        debug!(target: LOG_TARGET, "Data call on slot {} disconnected ({})", slot, reason);
        self.pool.clear(slot);
        self.set_state(ConnectionState::Idle);
        self.publish_event(TrackerEvent::DataDisconnected(reason));

        if self.pending_radio_restart {
            debug!(
                target: LOG_TARGET,
                "Scheduling radio power-off in {:?}", self.config.radio_restart_delay
            );
            self.radio_restart_at = Some(Instant::now() + self.config.radio_restart_delay);
            return;
        }

        // A teardown for radio-off must not redial; the radio is going away
        if reason != ChangeReason::RadioOff && reason != ChangeReason::Shutdown {
            self.evaluate_and_try_setup(reason).await;
        }
    }

    async fn on_radio_available(&mut self) {
        if self.service_state.simulated_mode() {
            self.resimulate();
        } else if !self.state.is_idle() {
            // Whatever call we had did not survive the radio coming back
            debug!(
                target: LOG_TARGET,
                "Radio available with stale connection state {}. Cleaning up.", self.state
            );
            self.clean_up(true, ChangeReason::RadioOn).await;
        }
        self.evaluate_and_try_setup(ChangeReason::RadioOn).await;
    }

    async fn on_radio_off_or_unavailable(&mut self) {
        self.retry.reset_retry_count();
        // The connection is already gone with the radio; nothing to deactivate
        self.clean_up(false, ChangeReason::RadioOff).await;
    }

    async fn on_registration_detached(&mut self) {
        if self.state.is_connected() {
            // The physical link may come back; keep watching it and tell the subscribers
            self.start_activity_poll();
            self.publish_event(TrackerEvent::DataSuspended(ChangeReason::DataDetached));
        } else {
            if self.state.is_failed() {
                self.clean_up(false, ChangeReason::DataDetached).await;
                self.retry.reset_retry_count();
                self.diag(DiagnosticEvent::DetachedWhileFailed);
            }
            self.evaluate_and_try_setup(ChangeReason::DataDetached).await;
        }
    }

    fn on_voice_call_started(&mut self) {
        self.voice_call_active = true;
        if self.state.is_connected() && !self.service_state.concurrent_voice_and_data() {
            // Data cannot flow for the duration of the call
            self.stop_activity_poll();
            self.publish_event(TrackerEvent::DataSuspended(ChangeReason::VoiceCallStarted));
        }
    }

    async fn on_voice_call_ended(&mut self) {
        self.voice_call_active = false;
        if self.state.is_connected() {
            if !self.service_state.concurrent_voice_and_data() {
                self.start_activity_poll();
                self.publish_event(TrackerEvent::DataResumed(ChangeReason::VoiceCallEnded));
            }
        } else {
            self.retry.reset_retry_count();
            self.evaluate_and_try_setup(ChangeReason::VoiceCallEnded).await;
        }
    }

    async fn on_roaming_on(&mut self) {
        if self.roaming_allowed {
            self.evaluate_and_try_setup(ChangeReason::RoamingOn).await;
        } else {
            debug!(target: LOG_TARGET, "Roaming started and roaming data is not permitted");
            self.clean_up(true, ChangeReason::RoamingOn).await;
        }
    }

    async fn on_data_state_changed(&mut self, call_state: DataCallState) {
        if !self.state.is_connected() {
            debug!(
                target: LOG_TARGET,
                "Ignoring data call state {:?} while {}", call_state, self.state
            );
            return;
        }
        match call_state {
            DataCallState::Dormant => {
                if self.activity.set_dormant() {
                    self.publish_event(TrackerEvent::DataActivityChanged(self.activity.activity()));
                }
            },
            DataCallState::Active => {
                if self.activity.resume_from_dormancy() {
                    self.publish_event(TrackerEvent::DataActivityChanged(self.activity.activity()));
                }
            },
            DataCallState::Inactive => {
                // The radio dropped the call underneath us
                warn!(target: LOG_TARGET, "Data call lost");
                self.clean_up(false, ChangeReason::LostConnection).await;
                self.evaluate_and_try_setup(ChangeReason::LostConnection).await;
            },
        }
    }

    async fn on_ota_provisioning(&mut self, status: OtaStatus) {
        match status {
            OtaStatus::Started => {
                debug!(
                    target: LOG_TARGET,
                    "OTA provisioning started. Data calls are blocked until it completes."
                );
                self.provisioning_in_progress = true;
            },
            OtaStatus::Committed | OtaStatus::Aborted => {
                if self.provisioning_in_progress {
                    self.provisioning_in_progress = false;
                    self.evaluate_and_try_setup(ChangeReason::ProvisioningDone).await;
                }
            },
        }
    }

    fn on_screen_state_changed(&mut self, screen_on: bool) {
        if self.screen_on == screen_on {
            return;
        }
        self.screen_on = screen_on;
        if self.activity.is_enabled() {
            // Re-arm the poll timer at the new cadence
            self.poll_at = Some(Instant::now() + self.current_poll_interval());
        }
    }

    async fn on_set_data_enabled(&mut self, enabled: bool) {
        if self.data_enabled == enabled {
            return;
        }
        self.data_enabled = enabled;
        if enabled {
            self.evaluate_and_try_setup(ChangeReason::DataEnabled).await;
        } else {
            self.clean_up(true, ChangeReason::DataDisabled).await;
        }
    }

    async fn on_set_roaming_allowed(&mut self, allowed: bool) {
        if self.roaming_allowed == allowed {
            return;
        }
        self.roaming_allowed = allowed;
        if self.service_state.is_roaming() {
            // Same consequences as roaming starting under the new policy
            self.on_roaming_on().await;
        }
    }

    /// Recovery of last resort for a hung link: tear the call down and power-cycle the radio.
    /// The power-off executes at most once, after the teardown completes.
    async fn restart_radio(&mut self) {
        warn!(target: LOG_TARGET, "Data link hang detected. Restarting the radio.");
        self.diag(DiagnosticEvent::RadioReset {
            no_recv_poll_count: self.activity.no_recv_poll_count(),
        });
        self.retry.reset_retry_count();
        self.pending_radio_restart = true;
        self.clean_up(true, ChangeReason::RadioOff).await;
    }

    async fn on_radio_restart_timer(&mut self) {
        self.radio_restart_at = None;
        if !self.pending_radio_restart {
            return;
        }
        self.pending_radio_restart = false;
        info!(target: LOG_TARGET, "Powering the radio off to recover the data link");
        if let Err(err) = self.radio.set_radio_power(false).await {
            error!(target: LOG_TARGET, "Failed to send radio power request: {}", err);
        }
    }

    fn start_activity_poll(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        if self.activity.is_enabled() && self.poll_at.is_some() {
            return;
        }
        self.activity.start();
        self.poll_at = Some(Instant::now() + self.current_poll_interval());
        debug!(target: LOG_TARGET, "Activity polling started");
    }

    fn stop_activity_poll(&mut self) {
        if self.activity.is_enabled() {
            debug!(target: LOG_TARGET, "Activity polling stopped");
        }
        self.activity.stop();
        self.poll_at = None;
    }

    async fn on_poll_tick(&mut self) {
        self.poll_at = None;
        if !self.activity.is_enabled() || !self.state.is_connected() {
            return;
        }

        let voice_idle = !self.voice_call_active;
        let threshold = self.config.hang_sent_threshold;
        let limit = self.config.no_recv_poll_limit;
        let tx = self.link_stats.tx_packets().await;
        let rx = self.link_stats.rx_packets().await;
        let outcome = match (tx, rx) {
            (Ok(tx), Ok(rx)) => self.activity.on_sample(tx, rx, voice_idle, threshold, limit),
            (Err(err), _) | (_, Err(err)) => {
                debug!(target: LOG_TARGET, "Failed to sample packet counters: {}", err);
                self.activity.on_sample_error(voice_idle, threshold, limit)
            },
        };

        if let Some(activity) = outcome.changed {
            self.publish_event(TrackerEvent::DataActivityChanged(activity));
        }

        match outcome.hang {
            HangState::Clear => {
                self.poll_at = Some(Instant::now() + self.current_poll_interval());
            },
            HangState::Suspected { first } => {
                if first {
                    warn!(
                        target: LOG_TARGET,
                        "{} packet(s) sent without a single one received",
                        self.activity.sent_since_last_recv()
                    );
                    self.diag(DiagnosticEvent::DataStallSuspected {
                        sent_since_last_recv: self.activity.sent_since_last_recv(),
                    });
                }
                self.poll_at = Some(Instant::now() + self.config.hang_poll_interval);
            },
            HangState::LimitReached => {
                self.stop_activity_poll();
                self.restart_radio().await;
            },
        }
    }

    fn current_poll_interval(&self) -> time::Duration {
        if self.screen_on {
            self.config.poll_interval
        } else {
            self.config.poll_interval_screen_off
        }
    }

    /// Fake the data call instead of dialing; there is no real radio to complete it.
    fn resimulate(&mut self) {
        if self.state.is_connected() {
            return;
        }
        match self.pool.find_free() {
            Some(slot) => {
                debug!(target: LOG_TARGET, "Simulated radio: faking a data call on slot {}", slot);
                self.pool.set_activating(slot);
                self.pool.set_active(slot, simulated_link_settings());
                self.set_state(ConnectionState::Connected);
                self.start_activity_poll();
                self.publish_event(TrackerEvent::DataConnected(ChangeReason::RadioOn));
            },
            None => {
                debug!(target: LOG_TARGET, "Simulated radio: no free slot");
            },
        }
    }

    fn cancel_pending_reconnect(&mut self) {
        if let Some(pending) = self.pending_reconnect.take() {
            debug!(
                target: LOG_TARGET,
                "Cancelled pending reconnect ({})", pending.reason
            );
        }
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next {
            debug!(
                target: LOG_TARGET,
                "Connection state transitioning from {} to {}", self.state, next
            );
            self.state = next;
        }
    }

    fn publish_event(&mut self, event: TrackerEvent) {
        // A send operation can only fail if there are no subscribers, so it is safe to ignore
        // the error
        let _ = self.event_tx.send(event);
    }

    fn diag(&self, event: DiagnosticEvent) {
        self.diagnostics.record(DiagnosticRecord::new(event));
    }
}

/// Resolves at `deadline`, or never when there is no deadline. Lets the actor treat optional
/// timers as always-present select branches.
async fn wakeup(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

// TEST-NET-1 addresses, only handed out by the simulated radio path
fn simulated_link_settings() -> LinkSettings {
    LinkSettings {
        interface_name: "rmnet0".to_string(),
        ip_address: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2)),
        gateway: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
        dns_servers: vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53))],
    }
}
