//! Demo of the pub/sub registry.
//!
//! Replays the registry's usage patterns from the command line:
//! closures, compound arguments, handlers sharing owned state, handlers
//! bound to methods, and several handlers under one key followed by an
//! unsubscribe.

pub mod cli;
pub mod scenarios;
