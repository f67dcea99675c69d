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

use std::time::Duration;

use serde_derive::Deserialize;

/// Persisted data settings, read once at tracker construction. Typically deserialized from the
/// device's stored configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Master data switch.
    pub data_enabled: bool,
    /// Whether data calls are permitted while roaming.
    pub roaming_data_allowed: bool,
    /// Retry profile string (see [`crate::retry::RetryPolicy`]); `None` selects the built-in
    /// schedule.
    pub retry_profile: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            data_enabled: true,
            roaming_data_allowed: false,
            retry_profile: None,
        }
    }
}

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Persisted data settings.
    pub settings: DataSettings,
    /// Number of data-connection slots created at startup.
    pub pool_capacity: usize,
    /// Interval between activity polls while the screen is on.
    pub poll_interval: Duration,
    /// Interval between activity polls while the screen is off.
    pub poll_interval_screen_off: Duration,
    /// Slowed poll interval once a hang is suspected.
    pub hang_poll_interval: Duration,
    /// Packets sent without a single packet received before a hang is suspected.
    pub hang_sent_threshold: u64,
    /// Consecutive hang-suspicious polls tolerated before the radio is restarted.
    pub no_recv_poll_limit: u32,
    /// Delay between the teardown completing and the radio power-off during a restart.
    pub radio_restart_delay: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            settings: DataSettings::default(),
            pool_capacity: 1,
            poll_interval: Duration::from_secs(5),
            poll_interval_screen_off: Duration::from_secs(600),
            hang_poll_interval: Duration::from_secs(15),
            hang_sent_threshold: 10,
            no_recv_poll_limit: 24,
            radio_restart_delay: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn data_settings_deserialize_with_defaults() {
        let settings: DataSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.data_enabled);
        assert!(!settings.roaming_data_allowed);
        assert!(settings.retry_profile.is_none());

        let settings: DataSettings = serde_json::from_str(
            r#"{"data_enabled": false, "roaming_data_allowed": true, "retry_profile": "1000,2000"}"#,
        )
        .unwrap();
        assert!(!settings.data_enabled);
        assert!(settings.roaming_data_allowed);
        assert_eq!(settings.retry_profile.as_deref(), Some("1000,2000"));
    }
}
