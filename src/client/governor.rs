//! Adaptive rate governor
//!
//! Tracks the remote service's self-reported quota and per-request cost and
//! decides how long the next request must wait before it is sent.
//!
//! # Delay Policy
//!
//! | Condition | Delay |
//! |-----------|-------|
//! | remaining ≤ 25% of max | max seconds / 2 |
//! | remaining ≤ 50% of max | max seconds / 4 |
//! | remaining ≤ 75% of max | max seconds / 8 |
//! | remaining > 75% of max | none |
//! | last response was HTTP 429 | 5 minutes (replaces the ladder) |
//! | last cost > 120% of previous average | 30 seconds (maximum with the above) |
//!
//! Any non-zero delay gets up to 25% random jitter on top.

use rand::Rng;
use std::time::Duration;

/// Delay applied after the service answered 429 Too Many Requests
pub const RATE_LIMITED_DELAY: Duration = Duration::from_secs(5 * 60);

/// Delay applied after a request cost significantly more than average
pub const COST_SPIKE_DELAY: Duration = Duration::from_secs(30);

/// Cost ratio over the running average that counts as a spike
const COST_SPIKE_RATIO: f64 = 1.2;

/// Upper bound of the random jitter, as a fraction of the delay
const JITTER_RATIO: f64 = 0.25;

/// Snapshot of the rate-limit budget as last reported by the service
#[derive(Debug, Clone, PartialEq)]
pub struct RateState {
    /// Quota ceiling for this run
    pub max_quota: u32,

    /// Quota remaining, never above `max_quota`
    pub remaining_quota: f64,

    /// Running mean of observed per-request costs
    pub average_cost: f64,

    /// Number of completed requests observed
    pub request_count: u64,
}

impl RateState {
    /// Creates a state assuming a full budget
    pub fn new(max_quota: u32) -> Self {
        Self {
            max_quota,
            remaining_quota: f64::from(max_quota),
            average_cost: 0.0,
            request_count: 0,
        }
    }

    /// Fraction of the quota still available, in `0.0..=1.0`
    pub fn remaining_fraction(&self) -> f64 {
        if self.max_quota == 0 {
            return 0.0;
        }
        self.remaining_quota / f64::from(self.max_quota)
    }
}

/// Owns the rate state and turns it into admission delays
///
/// Every outbound request must be bracketed by one [`RateGovernor::admit`]
/// before it is sent and either one [`RateGovernor::observe`] or one
/// [`RateGovernor::record_no_signal`] after it completes.
#[derive(Debug, Clone)]
pub struct RateGovernor {
    state: RateState,

    /// Last observed response was HTTP 429
    rate_limited: bool,

    /// Last observed cost was a spike over the previous average
    cost_spike: bool,

    admitted: u64,
    no_signal: u64,
}

impl RateGovernor {
    /// Creates a governor for a service with the given quota ceiling
    pub fn new(max_quota: u32) -> Self {
        Self {
            state: RateState::new(max_quota),
            rate_limited: false,
            cost_spike: false,
            admitted: 0,
            no_signal: 0,
        }
    }

    /// Current rate state
    pub fn state(&self) -> &RateState {
        &self.state
    }

    /// Number of requests admitted so far
    pub fn admitted_count(&self) -> u64 {
        self.admitted
    }

    /// Number of completed requests observed so far
    pub fn observed_count(&self) -> u64 {
        self.state.request_count
    }

    /// Number of admitted requests that produced no response to observe
    pub fn no_signal_count(&self) -> u64 {
        self.no_signal
    }

    /// Records the rate-limit metadata of a completed response
    ///
    /// Malformed headers never fail: an unreadable remaining quota assumes half
    /// the budget is gone, and an unreadable or non-positive cost falls back to
    /// the running average.
    ///
    /// # Arguments
    ///
    /// * `remaining` - Raw remaining-quota header value, if present
    /// * `cost` - Raw request-cost header value, if present
    /// * `status` - HTTP status code of the response
    pub fn observe(&mut self, remaining: Option<&str>, cost: Option<&str>, status: u16) {
        let max = f64::from(self.state.max_quota);

        let remaining = match parse_metric(remaining) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    "Unreadable remaining-quota header {:?}, assuming 50% of {} consumed",
                    remaining,
                    self.state.max_quota
                );
                max / 2.0
            }
        };
        self.state.remaining_quota = remaining.clamp(0.0, max);

        let previous_average = self.state.average_cost;
        let observed_cost = parse_metric(cost).filter(|c| *c > 0.0);
        if observed_cost.is_none() {
            tracing::warn!(
                "Unusable request-cost header {:?}, using average cost {:.3}",
                cost,
                previous_average
            );
        }

        // A missing cost counts as the average, which leaves the mean unchanged.
        // The mean is seeded by the first valid cost, not by a fallback.
        self.state.request_count += 1;
        match observed_cost {
            Some(value) if previous_average <= 0.0 => self.state.average_cost = value,
            Some(value) => {
                self.state.average_cost +=
                    (value - self.state.average_cost) / self.state.request_count as f64;
            }
            None => {}
        }

        self.cost_spike = observed_cost
            .is_some_and(|c| previous_average > 0.0 && c > previous_average * COST_SPIKE_RATIO);
        if self.cost_spike {
            tracing::warn!(
                "Request cost {:.3} is a spike over average {:.3}",
                observed_cost.unwrap_or_default(),
                previous_average
            );
        }

        self.rate_limited = status == 429;
        if self.rate_limited {
            tracing::warn!(
                "Rate limit exceeded (HTTP 429), {:.1} quota remaining",
                self.state.remaining_quota
            );
        }

        tracing::debug!(
            "Rate state: remaining {:.1}/{}, average cost {:.3}, {} requests",
            self.state.remaining_quota,
            self.state.max_quota,
            self.state.average_cost,
            self.state.request_count
        );
    }

    /// Records that an admitted request ended without a response
    ///
    /// Transport failures carry no rate-limit metadata, so the budget model is
    /// left untouched.
    pub fn record_no_signal(&mut self) {
        self.no_signal += 1;
        tracing::debug!("Request produced no response, rate state left unchanged");
    }

    /// Delay selected by the quota ladder alone
    pub fn ladder_delay(&self) -> Duration {
        let fraction = self.state.remaining_fraction();
        let max = f64::from(self.state.max_quota);

        if fraction <= 0.25 {
            Duration::from_secs_f64(max / 2.0)
        } else if fraction <= 0.5 {
            Duration::from_secs_f64(max / 4.0)
        } else if fraction <= 0.75 {
            Duration::from_secs_f64(max / 8.0)
        } else {
            Duration::ZERO
        }
    }

    /// Delay the next request must wait, before jitter
    pub fn planned_delay(&self) -> Duration {
        let base = if self.rate_limited {
            RATE_LIMITED_DELAY
        } else {
            self.ladder_delay()
        };

        if self.cost_spike {
            base.max(COST_SPIKE_DELAY)
        } else {
            base
        }
    }

    /// Admits the next request, sleeping for the planned delay plus jitter
    ///
    /// The 429 and cost-spike signals only apply to the request cycle that
    /// follows the response that produced them, so they are cleared here.
    ///
    /// # Returns
    ///
    /// The total time slept
    pub async fn admit(&mut self) -> Duration {
        let delay = self.planned_delay();
        self.rate_limited = false;
        self.cost_spike = false;
        self.admitted += 1;

        if delay.is_zero() {
            return Duration::ZERO;
        }

        let total = delay + jitter_for(delay);
        let fraction = self.state.remaining_fraction();
        if fraction <= 0.5 {
            tracing::warn!(
                "Rate limit low ({:.0}% remaining), delaying request for {:.1}s",
                fraction * 100.0,
                total.as_secs_f64()
            );
        } else {
            tracing::info!(
                "Delaying request for {:.1}s ({:.0}% of quota remaining)",
                total.as_secs_f64(),
                fraction * 100.0
            );
        }

        tokio::time::sleep(total).await;
        total
    }
}

/// Random jitter of up to 25% of `delay`
pub fn jitter_for(delay: Duration) -> Duration {
    let max_jitter_ms = (delay.as_millis() as f64 * JITTER_RATIO) as u64;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
}

fn parse_metric(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
