//! The channel responder.
//!
//! Decides, per inbound channel message, whether to answer with the
//! configured reply. Configuration and the nick ignore list are resolved here
//! and handed to the throttle on each call.

use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::config::{RecordPolicy, SquawkerConfig};
use crate::error::Result;
use crate::irc::{Privmsg, Reply};
use crate::throttle::{is_channel_target, Clock, RequestThrottle, SystemClock};

/// Answers channel activity with a canned, throttled reply.
///
/// The throttle is held behind a mutex and locked once per message, so the
/// permit check and the cooldown record for one message are atomic.
pub struct Squawker<C: Clock = SystemClock> {
    config: SquawkerConfig,
    /// Compiled `ignored_nicks` patterns keyed by their source
    patterns: HashMap<String, Regex>,
    throttle: Mutex<RequestThrottle<C>>,
}

impl Squawker<SystemClock> {
    /// Create a responder reading wall-clock time.
    pub fn new(config: SquawkerConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Squawker<C> {
    /// Create a responder driven by the given clock.
    pub fn with_clock(config: SquawkerConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let patterns = config.compile_patterns()?;
        let throttle = RequestThrottle::with_clock(clock).with_limit_private(config.limit_private);

        Ok(Self {
            config,
            patterns,
            throttle: Mutex::new(throttle),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SquawkerConfig {
        &self.config
    }

    /// Number of cooldowns currently tracked.
    pub fn tracked(&self) -> usize {
        self.throttle.lock().len()
    }

    /// Handle one inbound message, returning the reply to send, if any.
    #[instrument(skip(self, msg), fields(channel = %msg.target, nick = %msg.nick))]
    pub fn handle(&self, network: &str, msg: &Privmsg) -> Option<Reply> {
        if !is_channel_target(&msg.target, self.config.chantypes(network)) {
            debug!("Ignoring message to non-channel target");
            return None;
        }

        let channel = msg.target.as_str();
        let settings = self.config.resolve(network, channel);
        if !settings.enabled {
            info!(
                network = %network,
                channel = %channel,
                "Squawker is disabled for network/channel"
            );
            return None;
        }

        let ignored = settings
            .ignored_nicks
            .as_ref()
            .and_then(|pattern| self.patterns.get(pattern))
            .is_some_and(|re| re.is_match(&msg.nick));
        if ignored {
            debug!("Nick matches ignore list");
        }

        let parts = [settings.text.as_str()];
        let reply = {
            let mut throttle = self.throttle.lock();
            match settings.record {
                RecordPolicy::OnReply => {
                    !ignored && throttle.try_acquire(channel, settings.throttle, &parts)
                }
                RecordPolicy::Always => {
                    let permitted = throttle.permit(channel, &parts);
                    throttle.record(channel, settings.throttle, &parts);
                    permitted && !ignored
                }
            }
        };

        reply.then(|| Reply {
            target: channel.to_string(),
            text: settings.text,
        })
    }
}
