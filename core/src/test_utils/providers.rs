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
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    diagnostics::{DiagnosticEvent, DiagnosticRecord, DiagnosticSink},
    radio::{
        LinkSettings,
        LinkStatsProvider,
        RadioState,
        RecordsProvider,
        RegistrationState,
        ServiceStateProvider,
        StatsError,
    },
};

pub fn test_link_settings() -> LinkSettings {
    LinkSettings {
        interface_name: "rmnet0".to_string(),
        ip_address: IpAddr::V4(Ipv4Addr::new(10, 32, 4, 17)),
        gateway: IpAddr::V4(Ipv4Addr::new(10, 32, 4, 1)),
        dns_servers: vec![
            IpAddr::V4(Ipv4Addr::new(10, 32, 0, 10)),
            IpAddr::V4(Ipv4Addr::new(10, 32, 0, 11)),
        ],
    }
}

#[derive(Debug, Default)]
struct ServiceStateInner {
    out_of_service: AtomicBool,
    roaming: AtomicBool,
    no_concurrent_voice_and_data: AtomicBool,
    radio_off: AtomicBool,
    power_down_desired: AtomicBool,
    simulated: AtomicBool,
}

/// Mutable service-state stub. Defaults to a registered, non-roaming, powered radio that
/// supports concurrent voice and data.
#[derive(Debug, Clone, Default)]
pub struct MockServiceState(Arc<ServiceStateInner>);

impl MockServiceState {
    pub fn set_in_service(&self, in_service: bool) {
        self.0.out_of_service.store(!in_service, Ordering::SeqCst);
    }

    pub fn set_roaming(&self, roaming: bool) {
        self.0.roaming.store(roaming, Ordering::SeqCst);
    }

    pub fn set_concurrent_voice_and_data(&self, concurrent: bool) {
        self.0.no_concurrent_voice_and_data.store(!concurrent, Ordering::SeqCst);
    }

    pub fn set_radio_on(&self, on: bool) {
        self.0.radio_off.store(!on, Ordering::SeqCst);
    }

    pub fn set_desired_radio_power(&self, on: bool) {
        self.0.power_down_desired.store(!on, Ordering::SeqCst);
    }

    pub fn set_simulated_mode(&self, simulated: bool) {
        self.0.simulated.store(simulated, Ordering::SeqCst);
    }
}

impl ServiceStateProvider for MockServiceState {
    fn registration_state(&self) -> RegistrationState {
        if self.0.out_of_service.load(Ordering::SeqCst) {
            RegistrationState::OutOfService
        } else {
            RegistrationState::InService
        }
    }

    fn is_roaming(&self) -> bool {
        self.0.roaming.load(Ordering::SeqCst)
    }

    fn concurrent_voice_and_data(&self) -> bool {
        !self.0.no_concurrent_voice_and_data.load(Ordering::SeqCst)
    }

    fn radio_state(&self) -> RadioState {
        if self.0.radio_off.load(Ordering::SeqCst) {
            RadioState::Off
        } else {
            RadioState::On
        }
    }

    fn desired_radio_power(&self) -> bool {
        !self.0.power_down_desired.load(Ordering::SeqCst)
    }

    fn simulated_mode(&self) -> bool {
        self.0.simulated.load(Ordering::SeqCst)
    }
}

/// Records stub; loaded by default.
#[derive(Debug, Clone)]
pub struct MockRecords(Arc<AtomicBool>);

impl Default for MockRecords {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl MockRecords {
    pub fn set_loaded(&self, loaded: bool) {
        self.0.store(loaded, Ordering::SeqCst);
    }
}

impl RecordsProvider for MockRecords {
    fn records_loaded(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct LinkStatsInner {
    tx: AtomicU64,
    rx: AtomicU64,
    tx_step: AtomicU64,
    rx_step: AtomicU64,
    failing: AtomicBool,
}

/// Packet-counter stub. Counters advance by the configured step on every sample, so a test can
/// model steady traffic in either direction without a feeder task.
#[derive(Debug, Clone, Default)]
pub struct MockLinkStats(Arc<LinkStatsInner>);

impl MockLinkStats {
    pub fn set_tx_step(&self, step: u64) {
        self.0.tx_step.store(step, Ordering::SeqCst);
    }

    pub fn set_rx_step(&self, step: u64) {
        self.0.rx_step.store(step, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkStatsProvider for MockLinkStats {
    async fn tx_packets(&self) -> Result<u64, StatsError> {
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(StatsError::Unavailable("mock failure".to_string()));
        }
        let step = self.0.tx_step.load(Ordering::SeqCst);
        Ok(self.0.tx.fetch_add(step, Ordering::SeqCst) + step)
    }

    async fn rx_packets(&self) -> Result<u64, StatsError> {
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(StatsError::Unavailable("mock failure".to_string()));
        }
        let step = self.0.rx_step.load(Ordering::SeqCst);
        Ok(self.0.rx.fetch_add(step, Ordering::SeqCst) + step)
    }
}

/// Sink that keeps every diagnostic event for later assertions.
#[derive(Debug, Clone, Default)]
pub struct CollectDiagnostics(Arc<Mutex<Vec<DiagnosticEvent>>>);

impl CollectDiagnostics {
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectDiagnostics {
    fn record(&self, record: DiagnosticRecord) {
        self.0.lock().unwrap().push(record.event);
    }
}
