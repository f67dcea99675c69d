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

use log::*;
use rand::Rng;
use thiserror::Error;

const LOG_TARGET: &str = "moblink::retry";

/// Profile applied when no retry profile is configured.
pub const DEFAULT_RETRY_PROFILE: &str = "default_randomization=2000,5000,10000,20000,40000,80000:10000,160000:10000";

// Linear schedule used if even the built-in profile fails to parse.
const FALLBACK_RETRY_COUNT: usize = 20;
const FALLBACK_INITIAL_DELAY: Duration = Duration::from_secs(45);
const FALLBACK_DELAY_INCREMENT: Duration = Duration::ZERO;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryConfigError {
    #[error("Retry profile contains no delay entries")]
    EmptySchedule,
    #[error("Invalid delay entry '{0}'")]
    InvalidDelay(String),
    #[error("Invalid option '{0}'")]
    InvalidOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RetryEntry {
    delay: Duration,
    randomization: Duration,
}

/// Computes the backoff delay sequence for data-call reconnection attempts.
///
/// A profile string configures the schedule:
///
/// ```text
/// [max_retries=<n|infinite>,][default_randomization=<ms>,]<delay_ms>[:<randomization_ms>],...
/// ```
///
/// Each delay entry is the wait before the attempt with the matching retry count; counts beyond
/// the schedule clamp to the last entry. A per-entry randomization (or the default one) adds a
/// uniformly random extension to the delay so a cell full of devices does not redial in
/// lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    schedule: Vec<RetryEntry>,
    max_retries: Option<usize>,
    retry_count: usize,
}

impl RetryPolicy {
    /// Parse a retry profile string. The caller is expected to fall back to
    /// [`RetryPolicy::default_profile`] on error.
    pub fn from_profile(profile: &str) -> Result<Self, RetryConfigError> {
        let mut default_randomization = Duration::ZERO;
        let mut max_retries = None;
        let mut schedule = Vec::new();

        if profile.trim().is_empty() {
            return Err(RetryConfigError::EmptySchedule);
        }

        for token in profile.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(RetryConfigError::InvalidDelay(token.to_string()));
            }
            if let Some((name, value)) = token.split_once('=') {
                let value = value.trim();
                match name.trim() {
                    "max_retries" => {
                        if value.eq_ignore_ascii_case("infinite") {
                            max_retries = None;
                        } else {
                            let count = value
                                .parse::<usize>()
                                .map_err(|_| RetryConfigError::InvalidOption(token.to_string()))?;
                            max_retries = Some(count);
                        }
                    },
                    "default_randomization" => {
                        let ms = value
                            .parse::<u64>()
                            .map_err(|_| RetryConfigError::InvalidOption(token.to_string()))?;
                        default_randomization = Duration::from_millis(ms);
                    },
                    _ => return Err(RetryConfigError::InvalidOption(token.to_string())),
                }
            } else {
                let (delay, randomization) = match token.split_once(':') {
                    Some((delay, randomization)) => (delay, Some(randomization)),
                    None => (token, None),
                };
                let delay = delay
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| RetryConfigError::InvalidDelay(token.to_string()))
                    .map(Duration::from_millis)?;
                let randomization = match randomization {
                    Some(r) => r
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| RetryConfigError::InvalidDelay(token.to_string()))
                        .map(Duration::from_millis)?,
                    None => default_randomization,
                };
                schedule.push(RetryEntry { delay, randomization });
            }
        }

        if schedule.is_empty() {
            return Err(RetryConfigError::EmptySchedule);
        }
        Ok(Self {
            schedule,
            max_retries,
            retry_count: 0,
        })
    }

    /// Resolve the policy for an optionally configured profile, falling back to the built-in
    /// schedule when the profile is absent or malformed. Malformed input is never an error for
    /// the caller.
    pub fn from_configured_profile(profile: Option<&str>) -> Self {
        match profile {
            Some(profile) => match Self::from_profile(profile) {
                Ok(policy) => policy,
                Err(err) => {
                    warn!(
                        target: LOG_TARGET,
                        "Configured retry profile is invalid ({}). Using the built-in schedule.", err
                    );
                    Self::default_profile()
                },
            },
            None => Self::default_profile(),
        }
    }

    /// The built-in schedule, used when no profile is configured or the configured one is
    /// malformed. Cascades to a linear schedule if [`DEFAULT_RETRY_PROFILE`] itself fails to
    /// parse.
    pub fn default_profile() -> Self {
        match Self::from_profile(DEFAULT_RETRY_PROFILE) {
            Ok(policy) => policy,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    "Built-in retry profile is invalid ({}). Using the linear fallback.", err
                );
                Self::linear(FALLBACK_RETRY_COUNT, FALLBACK_INITIAL_DELAY, FALLBACK_DELAY_INCREMENT)
            },
        }
    }

    /// Fixed-count schedule of `initial`, `initial + increment`, `initial + 2 * increment`, ...
    /// with no randomization.
    pub fn linear(count: usize, initial: Duration, increment: Duration) -> Self {
        let count = count.max(1);
        let schedule = (0..count)
            .map(|i| RetryEntry {
                delay: initial + increment * i as u32,
                randomization: Duration::ZERO,
            })
            .collect();
        Self {
            schedule,
            max_retries: Some(count),
            retry_count: 0,
        }
    }

    /// Delay before the next setup attempt for the current retry count, clamped to the last
    /// schedule entry, plus the entry's randomization.
    pub fn retry_timer(&self) -> Duration {
        let entry = &self.schedule[self.retry_count.min(self.schedule.len() - 1)];
        entry.delay + jitter(entry.randomization)
    }

    pub fn increase_retry_count(&mut self) {
        self.retry_count += 1;
    }

    pub fn reset_retry_count(&mut self) {
        self.retry_count = 0;
    }

    pub fn retry_count(&self) -> usize {
        self.retry_count
    }

    /// True once the configured `max_retries` has been used up. Schedules without the option
    /// never exhaust.
    pub fn retries_exhausted(&self) -> bool {
        match self.max_retries {
            Some(max) => self.retry_count >= max,
            None => false,
        }
    }
}

fn jitter(randomization: Duration) -> Duration {
    if randomization.is_zero() {
        return Duration::ZERO;
    }
    let ms = rand::thread_rng().gen_range(0..=randomization.as_millis() as u64);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_plain_delay_list() {
        let mut policy = RetryPolicy::from_profile("1000,2000,4000").unwrap();
        assert_eq!(policy.retry_timer(), Duration::from_secs(1));
        policy.increase_retry_count();
        assert_eq!(policy.retry_timer(), Duration::from_secs(2));
        policy.increase_retry_count();
        assert_eq!(policy.retry_timer(), Duration::from_secs(4));
        assert!(!policy.retries_exhausted());
    }

    #[test]
    fn clamps_to_last_entry_beyond_schedule_length() {
        let mut policy = RetryPolicy::from_profile("1000,2000").unwrap();
        for _ in 0..10 {
            policy.increase_retry_count();
        }
        assert_eq!(policy.retry_count(), 10);
        assert_eq!(policy.retry_timer(), Duration::from_secs(2));
    }

    #[test]
    fn timer_is_non_decreasing_over_consecutive_failures() {
        let mut policy = RetryPolicy::from_profile("0,1000,2000,2000,8000").unwrap();
        let mut last = policy.retry_timer();
        for _ in 0..8 {
            policy.increase_retry_count();
            let timer = policy.retry_timer();
            assert!(timer >= last);
            last = timer;
        }
    }

    #[test]
    fn reset_returns_to_the_first_entry() {
        let mut policy = RetryPolicy::from_profile("1000,60000").unwrap();
        policy.increase_retry_count();
        policy.increase_retry_count();
        assert_eq!(policy.retry_timer(), Duration::from_secs(60));
        policy.reset_retry_count();
        assert_eq!(policy.retry_count(), 0);
        assert_eq!(policy.retry_timer(), Duration::from_secs(1));
    }

    #[test]
    fn honors_max_retries_option() {
        let mut policy = RetryPolicy::from_profile("max_retries=2,5000").unwrap();
        assert!(!policy.retries_exhausted());
        policy.increase_retry_count();
        assert!(!policy.retries_exhausted());
        policy.increase_retry_count();
        assert!(policy.retries_exhausted());

        let policy = RetryPolicy::from_profile("max_retries=infinite,5000").unwrap();
        assert!(!policy.retries_exhausted());
    }

    #[test]
    fn per_entry_randomization_extends_the_delay() {
        let policy = RetryPolicy::from_profile("1000:2000").unwrap();
        for _ in 0..50 {
            let timer = policy.retry_timer();
            assert!(timer >= Duration::from_millis(1000));
            assert!(timer <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn default_randomization_applies_to_unannotated_entries() {
        let policy = RetryPolicy::from_profile("default_randomization=500,1000,2000:0").unwrap();
        for _ in 0..50 {
            let timer = policy.retry_timer();
            assert!(timer >= Duration::from_millis(1000));
            assert!(timer <= Duration::from_millis(1500));
        }
        let mut policy = policy;
        policy.increase_retry_count();
        // The explicit :0 overrides the default randomization
        assert_eq!(policy.retry_timer(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_malformed_profiles() {
        assert_eq!(RetryPolicy::from_profile("").unwrap_err(), RetryConfigError::EmptySchedule);
        assert_eq!(
            RetryPolicy::from_profile("max_retries=2").unwrap_err(),
            RetryConfigError::EmptySchedule
        );
        assert!(matches!(
            RetryPolicy::from_profile("abc").unwrap_err(),
            RetryConfigError::InvalidDelay(_)
        ));
        assert!(matches!(
            RetryPolicy::from_profile("1000,,2000").unwrap_err(),
            RetryConfigError::InvalidDelay(_)
        ));
        assert!(matches!(
            RetryPolicy::from_profile("1000:abc").unwrap_err(),
            RetryConfigError::InvalidDelay(_)
        ));
        assert!(matches!(
            RetryPolicy::from_profile("max_retries=many,1000").unwrap_err(),
            RetryConfigError::InvalidOption(_)
        ));
        assert!(matches!(
            RetryPolicy::from_profile("unknown_option=1,1000").unwrap_err(),
            RetryConfigError::InvalidOption(_)
        ));
    }

    #[test]
    fn malformed_configured_profile_falls_back_to_the_default_schedule() {
        let policy = RetryPolicy::from_configured_profile(Some("not,a,schedule"));
        // First entry of the built-in schedule: 5000ms with 2000ms default randomization
        let timer = policy.retry_timer();
        assert!(timer >= Duration::from_millis(5000));
        assert!(timer <= Duration::from_millis(7000));

        let policy = RetryPolicy::from_configured_profile(Some("1000,2000"));
        assert_eq!(policy.retry_timer(), Duration::from_secs(1));

        let policy = RetryPolicy::from_configured_profile(None);
        let timer = policy.retry_timer();
        assert!(timer >= Duration::from_millis(5000));
        assert!(timer <= Duration::from_millis(7000));
    }

    #[test]
    fn built_in_default_profile_parses() {
        let policy = RetryPolicy::default_profile();
        // default_randomization=2000 applies to the first entry
        let timer = policy.retry_timer();
        assert!(timer >= Duration::from_millis(5000));
        assert!(timer <= Duration::from_millis(7000));
        assert!(!policy.retries_exhausted());
    }

    #[test]
    fn linear_fallback_schedule() {
        let mut policy = RetryPolicy::linear(3, Duration::from_secs(45), Duration::from_secs(15));
        assert_eq!(policy.retry_timer(), Duration::from_secs(45));
        policy.increase_retry_count();
        assert_eq!(policy.retry_timer(), Duration::from_secs(60));
        policy.increase_retry_count();
        assert_eq!(policy.retry_timer(), Duration::from_secs(75));
        policy.increase_retry_count();
        assert!(policy.retries_exhausted());
        // Clamped at the last entry
        assert_eq!(policy.retry_timer(), Duration::from_secs(75));
    }
}
