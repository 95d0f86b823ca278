//! Core request throttle implementation.

use std::collections::HashMap;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::key::ThrottleKey;

/// Target prefixes that mark a public channel when none are configured.
pub const DEFAULT_CHANTYPES: &str = "#&";

/// Whether `target` starts with one of `chantypes`.
pub fn is_channel_target(target: &str, chantypes: &str) -> bool {
    target.chars().next().is_some_and(|c| chantypes.contains(c))
}

/// Observed state of a single throttle bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleState {
    /// No unexpired entry; the next request is permitted.
    Open,
    /// An unexpired entry exists.
    Cooling {
        /// Seconds until the bucket opens again
        remaining_secs: f64,
    },
}

/// A throttle controlling the rate of automated responses.
///
/// Each bucket is identified by a [`ThrottleKey`] and holds a single absolute
/// expiry timestamp. Expiry is lazy: there is no timer, buckets are compared
/// against the caller's "now" on each [`permit`](Self::permit) and swept on
/// each [`record`](Self::record).
///
/// The throttle is not internally synchronized. Callers that share it across
/// tasks wrap it in a mutex and hold the lock across the permit/record pair,
/// or use [`try_acquire`](Self::try_acquire).
#[derive(Debug)]
pub struct RequestThrottle<C: Clock = SystemClock> {
    /// Expiry timestamps (seconds since the epoch) indexed by bucket key
    cache: HashMap<ThrottleKey, f64>,
    /// When set, targets that are not channels are never permitted
    limit_private: bool,
    /// Leading characters that mark a target as a channel
    chantypes: String,
    clock: C,
}

impl RequestThrottle<SystemClock> {
    /// Create a new throttle reading wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for RequestThrottle<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RequestThrottle<C> {
    /// Create a new throttle driven by the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            cache: HashMap::new(),
            limit_private: false,
            chantypes: DEFAULT_CHANTYPES.to_string(),
            clock,
        }
    }

    /// Set the private-target flag.
    ///
    /// Note that a set flag does not exempt private targets from throttling,
    /// it refuses them outright.
    pub fn with_limit_private(mut self, limit_private: bool) -> Self {
        self.limit_private = limit_private;
        self
    }

    /// Set the characters that mark a target as a channel.
    pub fn with_chantypes(mut self, chantypes: &str) -> Self {
        self.chantypes = chantypes.to_string();
        self
    }

    /// Whether private targets are refused.
    pub fn limit_private(&self) -> bool {
        self.limit_private
    }

    /// Whether `target` names a channel rather than a private query.
    pub fn is_channel(&self, target: &str) -> bool {
        is_channel_target(target, &self.chantypes)
    }

    /// Permit the request according to the throttle conditions.
    ///
    /// Returns `false` when the bucket is still cooling down.
    pub fn permit(&self, channel: &str, parts: &[&str]) -> bool {
        self.permit_at(channel, parts, self.clock.now())
    }

    /// [`permit`](Self::permit) evaluated at an explicit time.
    pub fn permit_at(&self, channel: &str, parts: &[&str], now: f64) -> bool {
        if self.limit_private && !self.is_channel(channel) {
            debug!(target_name = %channel, "Refusing request to private target");
            return false;
        }

        let key = ThrottleKey::new(channel, parts);
        let permit = match self.cache.get(&key) {
            Some(&expiry) => expiry <= now,
            None => true,
        };

        if permit {
            debug!(key = %key, "Permitting request");
        } else {
            debug!(key = %key, "Not permitting request");
        }
        permit
    }

    /// Start a cooldown of `timeout_secs` for the bucket.
    ///
    /// Any previous expiry for the bucket is overwritten, then every entry
    /// that expired before now is dropped.
    pub fn record(&mut self, channel: &str, timeout_secs: f64, parts: &[&str]) {
        let now = self.clock.now();
        self.record_at(channel, timeout_secs, parts, now);
    }

    /// [`record`](Self::record) evaluated at an explicit time.
    pub fn record_at(&mut self, channel: &str, timeout_secs: f64, parts: &[&str], now: f64) {
        let key = ThrottleKey::new(channel, parts);
        let expiry = now + timeout_secs;

        trace!(key = %key, expiry = expiry, "Recording throttle");
        self.cache.insert(key, expiry);

        let before = self.cache.len();
        self.cache.retain(|_, &mut expiry| expiry >= now);
        let swept = before - self.cache.len();
        if swept > 0 {
            debug!(swept = swept, remaining = self.cache.len(), "Swept expired throttles");
        }
    }

    /// Permit and record in one step.
    ///
    /// Returns `true` and starts the cooldown if the bucket was open,
    /// otherwise leaves the table untouched and returns `false`.
    pub fn try_acquire(&mut self, channel: &str, timeout_secs: f64, parts: &[&str]) -> bool {
        let now = self.clock.now();
        if !self.permit_at(channel, parts, now) {
            return false;
        }
        self.record_at(channel, timeout_secs, parts, now);
        true
    }

    /// State of the bucket at an explicit time.
    pub fn state_at(&self, channel: &str, parts: &[&str], now: f64) -> ThrottleState {
        match self.expiry(channel, parts) {
            Some(expiry) if expiry > now => ThrottleState::Cooling {
                remaining_secs: expiry - now,
            },
            _ => ThrottleState::Open,
        }
    }

    /// State of the bucket now.
    pub fn state(&self, channel: &str, parts: &[&str]) -> ThrottleState {
        self.state_at(channel, parts, self.clock.now())
    }

    /// Stored expiry for the bucket, expired or not.
    pub fn expiry(&self, channel: &str, parts: &[&str]) -> Option<f64> {
        self.cache.get(&ThrottleKey::new(channel, parts)).copied()
    }

    /// Get the number of stored entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
