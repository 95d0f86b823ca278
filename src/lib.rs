//! Squawker - Rate-limited automated channel responder
//!
//! This crate watches channel messages and answers with a canned reply,
//! throttled per (channel, reply text) so that a channel hears the reply at
//! most once per cooldown window.

pub mod config;
pub mod error;
pub mod irc;
pub mod responder;
pub mod runner;
pub mod throttle;
