//! Fan-out of one publish over a handler snapshot.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::config::FailurePolicy;
use crate::error::{HandlerFailure, PublishError, Result};

/// Invokes `call` on each handler of `snapshot`, in order.
///
/// Under [`FailurePolicy::Isolate`] every handler runs even if an earlier
/// one panicked, and the panics are returned together once the snapshot is
/// exhausted. Under [`FailurePolicy::Propagate`] the first panic unwinds
/// straight through this function.
///
/// Returns the number of handlers invoked.
pub(crate) fn dispatch<H, F>(snapshot: &[H], policy: FailurePolicy, mut call: F) -> Result<usize>
where
    F: FnMut(&H),
{
    match policy {
        FailurePolicy::Propagate => {
            snapshot.iter().for_each(&mut call);
            Ok(snapshot.len())
        }
        FailurePolicy::Isolate => {
            let mut failures = Vec::new();

            for (index, handler) in snapshot.iter().enumerate() {
                // Handlers only see shared references to the arguments, and the
                // registry state is not borrowed while they run.
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| call(handler))) {
                    let failure = HandlerFailure::from_panic(index, payload.as_ref());
                    warn!(index, error = %failure.message, "event handler panicked");
                    failures.push(failure);
                }
            }

            if failures.is_empty() {
                Ok(snapshot.len())
            } else {
                Err(PublishError::HandlersFailed {
                    invoked: snapshot.len(),
                    failures,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_in_order() {
        let mut seen = Vec::new();
        let invoked = dispatch(&[1, 2, 3], FailurePolicy::Isolate, |h| seen.push(*h)).unwrap();

        assert_eq!(invoked, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_dispatch_empty_snapshot() {
        let empty: [u8; 0] = [];
        assert_eq!(dispatch(&empty, FailurePolicy::Isolate, |_| {}).unwrap(), 0);
        assert_eq!(dispatch(&empty, FailurePolicy::Propagate, |_| {}).unwrap(), 0);
    }

    #[test]
    fn test_isolate_continues_after_panic() {
        let mut seen = Vec::new();
        let result = dispatch(&[1, 2, 3], FailurePolicy::Isolate, |h| {
            if *h == 2 {
                panic!("handler two failed");
            }
            seen.push(*h);
        });

        assert_eq!(seen, vec![1, 3]);
        let err = result.unwrap_err();
        assert_eq!(
            err,
            PublishError::HandlersFailed {
                invoked: 3,
                failures: vec![HandlerFailure {
                    index: 1,
                    message: "handler two failed".to_string(),
                }],
            }
        );
    }

    #[test]
    fn test_propagate_stops_at_panic() {
        let mut seen = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = dispatch(&[1, 2, 3], FailurePolicy::Propagate, |h| {
                if *h == 2 {
                    panic!("stop here");
                }
                seen.push(*h);
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(seen, vec![1]);
    }
}
