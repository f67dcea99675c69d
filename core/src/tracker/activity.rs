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

use crate::types::DataActivity;

/// Hang verdict of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::tracker) enum HangState {
    /// Traffic is flowing (or absent) normally.
    Clear,
    /// Packets keep leaving with nothing coming back. `first` marks the tick on which the
    /// suspicion began.
    Suspected { first: bool },
    /// The no-ack limit was reached; the link needs a radio restart to recover.
    LimitReached,
}

/// What a poll tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::tracker) struct SampleOutcome {
    /// Set when the activity classification changed this tick.
    pub changed: Option<DataActivity>,
    pub hang: HangState,
}

/// Classifies link traffic from periodic packet-counter samples and tracks the
/// "sent without ack" condition that justifies a radio restart.
///
/// The monitor is pure state; the tracker actor owns the poll timer, samples the counters and
/// feeds them in. The first sample after `start` only establishes the counter baseline.
#[derive(Debug, Clone)]
pub(in crate::tracker) struct ActivityMonitor {
    enabled: bool,
    activity: DataActivity,
    have_baseline: bool,
    prev_tx: u64,
    prev_rx: u64,
    sent_since_last_recv: u64,
    no_recv_poll_count: u32,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self {
            enabled: false,
            activity: DataActivity::None,
            have_baseline: false,
            prev_tx: 0,
            prev_rx: 0,
            sent_since_last_recv: 0,
            no_recv_poll_count: 0,
        }
    }

    /// Begin a polling run, resetting all counters. Calling `start` while already running has
    /// no effect.
    pub fn start(&mut self) {
        if self.enabled {
            return;
        }
        self.activity = DataActivity::None;
        self.have_baseline = false;
        self.prev_tx = 0;
        self.prev_rx = 0;
        self.sent_since_last_recv = 0;
        self.no_recv_poll_count = 0;
        self.enabled = true;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn activity(&self) -> DataActivity {
        self.activity
    }

    pub fn sent_since_last_recv(&self) -> u64 {
        self.sent_since_last_recv
    }

    pub fn no_recv_poll_count(&self) -> u32 {
        self.no_recv_poll_count
    }

    /// The radio released the traffic channel while the session is held.
    /// Returns true if the classification changed.
    pub fn set_dormant(&mut self) -> bool {
        if self.activity == DataActivity::Dormant {
            return false;
        }
        self.activity = DataActivity::Dormant;
        true
    }

    /// The traffic channel came back. Returns true if the classification changed.
    pub fn resume_from_dormancy(&mut self) -> bool {
        if self.activity != DataActivity::Dormant {
            return false;
        }
        self.activity = DataActivity::None;
        true
    }

    /// Feed one sample of cumulative tx/rx packet counters.
    pub fn on_sample(
        &mut self,
        tx_packets: u64,
        rx_packets: u64,
        voice_idle: bool,
        hang_threshold: u64,
        no_recv_limit: u32,
    ) -> SampleOutcome {
        if !self.have_baseline {
            self.prev_tx = tx_packets;
            self.prev_rx = rx_packets;
            self.have_baseline = true;
            return SampleOutcome {
                changed: None,
                hang: HangState::Clear,
            };
        }
        let sent = tx_packets.saturating_sub(self.prev_tx);
        let received = rx_packets.saturating_sub(self.prev_rx);
        self.prev_tx = tx_packets;
        self.prev_rx = rx_packets;
        self.apply_deltas(sent, received, voice_idle, hang_threshold, no_recv_limit)
    }

    /// The counters could not be sampled; the tick counts as seeing no traffic.
    pub fn on_sample_error(&mut self, voice_idle: bool, hang_threshold: u64, no_recv_limit: u32) -> SampleOutcome {
        self.apply_deltas(0, 0, voice_idle, hang_threshold, no_recv_limit)
    }

    fn apply_deltas(
        &mut self,
        sent: u64,
        received: u64,
        voice_idle: bool,
        hang_threshold: u64,
        no_recv_limit: u32,
    ) -> SampleOutcome {
        let new_activity = match (sent > 0, received > 0) {
            (true, true) => DataActivity::InOut,
            (true, false) => DataActivity::Out,
            (false, true) => DataActivity::In,
            (false, false) => {
                if self.activity == DataActivity::Dormant {
                    DataActivity::Dormant
                } else {
                    DataActivity::None
                }
            },
        };

        if received > 0 {
            self.sent_since_last_recv = 0;
        } else if sent > 0 {
            if voice_idle {
                self.sent_since_last_recv += sent;
            } else {
                // An active voice call explains the silence
                self.sent_since_last_recv = 0;
            }
        }

        let changed = if new_activity == self.activity {
            None
        } else {
            self.activity = new_activity;
            Some(new_activity)
        };

        let hang = if hang_threshold > 0 && self.sent_since_last_recv >= hang_threshold {
            let first = self.no_recv_poll_count == 0;
            if self.no_recv_poll_count < no_recv_limit {
                self.no_recv_poll_count += 1;
                HangState::Suspected { first }
            } else {
                HangState::LimitReached
            }
        } else {
            self.no_recv_poll_count = 0;
            HangState::Clear
        };

        SampleOutcome { changed, hang }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const THRESHOLD: u64 = 10;
    const LIMIT: u32 = 24;

    fn started() -> ActivityMonitor {
        let mut monitor = ActivityMonitor::new();
        monitor.start();
        // Baseline sample
        let outcome = monitor.on_sample(0, 0, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, None);
        assert_eq!(outcome.hang, HangState::Clear);
        monitor
    }

    #[test]
    fn classifies_traffic_directions() {
        let mut monitor = started();

        let outcome = monitor.on_sample(5, 5, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::InOut));

        let outcome = monitor.on_sample(10, 5, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::Out));

        let outcome = monitor.on_sample(10, 10, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::In));

        let outcome = monitor.on_sample(10, 10, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::None));
        assert_eq!(monitor.activity(), DataActivity::None);

        // No change stays quiet
        let outcome = monitor.on_sample(10, 10, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, None);
        assert_eq!(monitor.activity(), DataActivity::None);
    }

    #[test]
    fn idle_ticks_preserve_dormancy() {
        let mut monitor = started();
        assert!(monitor.set_dormant());
        assert!(!monitor.set_dormant());

        let outcome = monitor.on_sample(0, 0, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, None);
        assert_eq!(monitor.activity(), DataActivity::Dormant);

        assert!(monitor.resume_from_dormancy());
        assert_eq!(monitor.activity(), DataActivity::None);
        assert!(!monitor.resume_from_dormancy());
    }

    #[test]
    fn traffic_ends_dormancy() {
        let mut monitor = started();
        monitor.set_dormant();
        let outcome = monitor.on_sample(0, 5, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::In));
    }

    #[test]
    fn unacked_sends_accumulate_only_while_voice_idle() {
        let mut monitor = started();

        monitor.on_sample(4, 0, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.sent_since_last_recv(), 4);
        monitor.on_sample(7, 0, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.sent_since_last_recv(), 7);

        // A voice call explains the silence
        monitor.on_sample(12, 0, false, THRESHOLD, LIMIT);
        assert_eq!(monitor.sent_since_last_recv(), 0);

        monitor.on_sample(16, 0, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.sent_since_last_recv(), 4);
        // Any received packet clears the count
        monitor.on_sample(16, 1, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.sent_since_last_recv(), 0);
    }

    #[test]
    fn hang_suspicion_progresses_to_the_limit() {
        let mut monitor = started();
        let mut tx = 0;

        tx += 20;
        let outcome = monitor.on_sample(tx, 0, true, THRESHOLD, 2);
        assert_eq!(outcome.hang, HangState::Suspected { first: true });
        assert_eq!(monitor.no_recv_poll_count(), 1);

        tx += 20;
        let outcome = monitor.on_sample(tx, 0, true, THRESHOLD, 2);
        assert_eq!(outcome.hang, HangState::Suspected { first: false });
        assert_eq!(monitor.no_recv_poll_count(), 2);

        tx += 20;
        let outcome = monitor.on_sample(tx, 0, true, THRESHOLD, 2);
        assert_eq!(outcome.hang, HangState::LimitReached);
    }

    #[test]
    fn received_traffic_clears_hang_suspicion() {
        let mut monitor = started();
        monitor.on_sample(20, 0, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.no_recv_poll_count(), 1);

        let outcome = monitor.on_sample(20, 1, true, THRESHOLD, LIMIT);
        assert_eq!(outcome.hang, HangState::Clear);
        assert_eq!(monitor.no_recv_poll_count(), 0);
        assert_eq!(monitor.sent_since_last_recv(), 0);
    }

    #[test]
    fn sample_errors_count_as_zero_deltas() {
        let mut monitor = started();
        monitor.on_sample(5, 0, true, THRESHOLD, LIMIT);
        assert_eq!(monitor.activity(), DataActivity::Out);

        let outcome = monitor.on_sample_error(true, THRESHOLD, LIMIT);
        assert_eq!(outcome.changed, Some(DataActivity::None));
        // The unacked count is untouched by an idle tick
        assert_eq!(monitor.sent_since_last_recv(), 5);
    }

    #[test]
    fn start_resets_counters_and_is_idempotent() {
        let mut monitor = started();
        monitor.on_sample(50, 0, true, THRESHOLD, LIMIT);
        assert!(monitor.sent_since_last_recv() > 0);

        // Already running; nothing is reset
        monitor.start();
        assert_eq!(monitor.sent_since_last_recv(), 50);

        monitor.stop();
        assert!(!monitor.is_enabled());
        monitor.start();
        assert!(monitor.is_enabled());
        assert_eq!(monitor.sent_since_last_recv(), 0);
        assert_eq!(monitor.no_recv_poll_count(), 0);
        assert_eq!(monitor.activity(), DataActivity::None);
    }
}
