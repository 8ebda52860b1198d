//! Usage scenarios replayed by the demo.
//!
//! Every scenario writes the lines its handlers produce into a shared
//! [`Transcript`] so the caller decides where they go.

use std::sync::{Arc, Mutex, PoisonError};

use pubsub_registry::{EventRegistry, Handler, PublishError, RegistryConfig};
use thiserror::Error;
use tracing::info;

use crate::cli::Scenario;

/// Errors produced while running a scenario.
#[derive(Error, Debug)]
pub enum DemoError {
    /// A publish reported failing handlers.
    #[error("publishing key {key} failed: {source}")]
    Publish {
        key: i32,
        #[source]
        source: PublishError,
    },
}

/// Result type for demo operations.
pub type Result<T> = std::result::Result<T, DemoError>;

/// Lines written by handlers, in invocation order.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic in another writer never leaves a half-pushed line behind, so a
    /// poisoned log is still used.
    fn lines(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, line: String) {
        self.lines().push(line);
    }

    /// Takes every line recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines())
    }
}

/// Listener object whose method is used as a handler.
#[derive(Debug, Clone)]
pub struct Listener {
    name: &'static str,
    transcript: Transcript,
}

impl Listener {
    pub fn new(name: &'static str, transcript: &Transcript) -> Self {
        Self {
            name,
            transcript: transcript.clone(),
        }
    }

    pub fn callback(&self, event: i32, arg: i32) {
        self.transcript
            .push(format!("{} got event {} with argument {}", self.name, event, arg));
    }

    /// Converts the listener into an owned handler.
    pub fn into_handler(self) -> impl Fn(&i32, &i32) + Send + Sync + 'static {
        move |event: &i32, arg: &i32| self.callback(*event, *arg)
    }
}

/// Publishes and maps handler failures to [`DemoError`].
fn publish<A>(registry: &EventRegistry<i32, A>, key: i32, args: A) -> Result<usize> {
    registry
        .publish(key, args)
        .map_err(|source| DemoError::Publish { key, source })
}

/// Runs one concrete scenario against a fresh registry.
pub fn run(scenario: Scenario, config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    info!(?scenario, "running scenario");
    match scenario {
        Scenario::Closure => closure(config, transcript),
        Scenario::Object => object(config, transcript),
        Scenario::Captured => captured(config, transcript),
        Scenario::Method => method(config, transcript),
        Scenario::Moved => moved(config, transcript),
        Scenario::Functor => functor(config, transcript),
        Scenario::All => Scenario::EACH
            .iter()
            .try_for_each(|s| run(*s, config, transcript)),
    }
}

fn closure(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    let registry: EventRegistry<i32, i32> = EventRegistry::with_config(config.clone());
    let out = transcript.clone();
    registry.subscribe(1, move |_, arg| out.push(format!("The argument {}", arg)));
    publish(&registry, 1, 1)?;
    Ok(())
}

fn object(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    // The argument itself is a listener; every handler gets `&Listener`.
    let registry: EventRegistry<i32, Listener> = EventRegistry::with_config(config.clone());
    registry.subscribe(2, |event, listener| listener.callback(*event, 2));
    publish(&registry, 2, Listener::new("argument", transcript))?;
    Ok(())
}

fn captured(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    let shared = Arc::new(Listener::new("shared", transcript));
    let registry: EventRegistry<i32, i32> = EventRegistry::with_config(config.clone());

    let listener = shared.clone();
    registry.subscribe(3, move |event, arg| listener.callback(*event, *arg));
    publish(&registry, 3, 3)?;
    Ok(())
}

fn method(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    let listener = Arc::new(Listener::new("bound", transcript));
    let registry: EventRegistry<i32, i32> = EventRegistry::with_config(config.clone());

    let handler: Handler<i32, i32> =
        Arc::new(move |event: &i32, arg: &i32| listener.callback(*event, *arg));
    registry.subscribe_handler(4, handler);
    publish(&registry, 4, 4)?;
    Ok(())
}

fn moved(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    // A heap-allocated listener is moved out of its box into the publish; the
    // registry owns it for the duration of the fan-out and drops it after.
    let registry: EventRegistry<i32, Listener> = EventRegistry::with_config(config.clone());
    registry.subscribe(5, |event, listener| listener.callback(*event, 5));

    let boxed = Box::new(Listener::new("moved", transcript));
    publish(&registry, 5, *boxed)?;
    Ok(())
}

fn functor(config: &RegistryConfig, transcript: &Transcript) -> Result<()> {
    let registry: EventRegistry<i32, i32> = EventRegistry::with_config(config.clone());
    for name in ["first", "second", "third"] {
        registry.subscribe(6, Listener::new(name, transcript).into_handler());
    }
    registry.subscribe(7, Listener::new("other", transcript).into_handler());

    publish(&registry, 6, 6)?;
    publish(&registry, 7, 7)?;

    let removed = registry.unsubscribe(&6);
    transcript.push(format!("unsubscribed {} handlers from event 6", removed));
    publish(&registry, 6, 6)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubsub_registry::KeyPolicy;

    fn run_one(scenario: Scenario, config: RegistryConfig) -> Vec<String> {
        let transcript = Transcript::new();
        run(scenario, &config, &transcript).unwrap();
        transcript.take()
    }

    #[test]
    fn test_closure() {
        assert_eq!(
            run_one(Scenario::Closure, RegistryConfig::default()),
            vec!["The argument 1"]
        );
    }

    #[test]
    fn test_object() {
        assert_eq!(
            run_one(Scenario::Object, RegistryConfig::default()),
            vec!["argument got event 2 with argument 2"]
        );
    }

    #[test]
    fn test_captured_and_method() {
        assert_eq!(
            run_one(Scenario::Captured, RegistryConfig::default()),
            vec!["shared got event 3 with argument 3"]
        );
        assert_eq!(
            run_one(Scenario::Method, RegistryConfig::default()),
            vec!["bound got event 4 with argument 4"]
        );
    }

    #[test]
    fn test_moved_argument() {
        assert_eq!(
            run_one(Scenario::Moved, RegistryConfig::default()),
            vec!["moved got event 5 with argument 5"]
        );
    }

    #[test]
    fn test_transcript_survives_poisoned_lock() {
        let transcript = Transcript::new();
        transcript.push("before".to_string());

        let writer = transcript.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = writer.0.lock().unwrap();
            panic!("writer died holding the transcript");
        })
        .join();
        assert!(outcome.is_err());
        assert!(transcript.0.is_poisoned());

        transcript.push("after".to_string());
        assert_eq!(transcript.take(), vec!["before", "after"]);
        assert!(transcript.take().is_empty());
    }

    #[test]
    fn test_functor_accumulate() {
        assert_eq!(
            run_one(Scenario::Functor, RegistryConfig::default()),
            vec![
                "first got event 6 with argument 6",
                "second got event 6 with argument 6",
                "third got event 6 with argument 6",
                "other got event 7 with argument 7",
                "unsubscribed 3 handlers from event 6",
            ]
        );
    }

    #[test]
    fn test_functor_replace() {
        let config = RegistryConfig::new().with_key_policy(KeyPolicy::Replace);
        assert_eq!(
            run_one(Scenario::Functor, config),
            vec![
                "third got event 6 with argument 6",
                "other got event 7 with argument 7",
                "unsubscribed 1 handlers from event 6",
            ]
        );
    }

    #[test]
    fn test_all_runs_every_scenario() {
        let lines = run_one(Scenario::All, RegistryConfig::default());
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "The argument 1");
    }
}
