//! Command-line interface definition using clap.

use clap::{Parser, ValueEnum};
use pubsub_registry::KeyPolicy;

/// PubSub demo - walks through the registry's usage patterns
#[derive(Parser, Debug)]
#[command(name = "pubsub-demo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Scenario to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub scenario: Scenario,

    /// What subscribing to an already registered key does
    #[arg(short, long, value_enum, default_value = "accumulate", env = "PUBSUB_KEY_POLICY")]
    pub key_policy: KeyPolicyArg,
}

/// Demo scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Closure handler receiving a plain integer
    Closure,
    /// Handler reading a compound argument
    Object,
    /// Handler forwarding to shared, owned state
    Captured,
    /// Handler bound to a method of a shared object
    Method,
    /// Heap-allocated object moved into the publish by value
    Moved,
    /// One handler type registered under several keys, then unsubscribed
    Functor,
    /// Every scenario in order
    All,
}

impl Scenario {
    /// Scenarios that `All` expands to.
    pub const EACH: [Scenario; 6] = [
        Scenario::Closure,
        Scenario::Object,
        Scenario::Captured,
        Scenario::Method,
        Scenario::Moved,
        Scenario::Functor,
    ];

    /// Returns the concrete scenarios this selection covers.
    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Scenario::All => Self::EACH.to_vec(),
            single => vec![single],
        }
    }
}

/// CLI mirror of [`KeyPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyPolicyArg {
    /// Keep every handler
    Accumulate,
    /// Keep only the latest handler
    Replace,
}

impl From<KeyPolicyArg> for KeyPolicy {
    fn from(arg: KeyPolicyArg) -> Self {
        match arg {
            KeyPolicyArg::Accumulate => KeyPolicy::Accumulate,
            KeyPolicyArg::Replace => KeyPolicy::Replace,
        }
    }
}

impl Cli {
    /// Get the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
