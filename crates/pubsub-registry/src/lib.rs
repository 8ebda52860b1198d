//! Synchronous, in-process publish/subscribe registry.
//!
//! Handlers are registered against a key and invoked, in registration
//! order, whenever that key is published:
//! - `EventRegistry` - thread-safe, handlers are `Send + Sync`
//! - `LocalEventRegistry` - single-threaded, handlers may hold `Rc` state
//! - `RegistryConfig` - duplicate-key and handler-failure policies
//!
//! Every handler of one publish receives the same `&A`, and the handler list
//! is snapshotted before dispatch, so handlers may mutate the registry they
//! are called from without disturbing the publish in progress.
//!
//! # Example
//!
//! ```
//! use pubsub_registry::{EventRegistry, FailurePolicy, RegistryConfig};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Topic {
//!     Saved,
//! }
//!
//! let config = RegistryConfig::new().with_failure_policy(FailurePolicy::Isolate);
//! let registry: EventRegistry<Topic, (String, u64)> = EventRegistry::with_config(config);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! for id in ["audit", "cache"] {
//!     let seen = seen.clone();
//!     registry.subscribe(Topic::Saved, move |_, (path, size)| {
//!         seen.lock().unwrap().push(format!("{id}: {path} ({size} bytes)"));
//!     });
//! }
//!
//! registry.publish(Topic::Saved, ("notes.txt".into(), 12)).unwrap();
//! assert_eq!(seen.lock().unwrap().len(), 2);
//! ```

pub mod config;
mod dispatch;
pub mod error;
pub mod local;
pub mod registry;
mod table;

pub use config::{FailurePolicy, KeyPolicy, RegistryConfig};
pub use error::{HandlerFailure, PublishError, Result};
pub use local::{LocalEventRegistry, LocalHandler};
pub use registry::{EventRegistry, Handler};
