//! Ordered registry of teardown actions.
//!
//! Resources register a named close action as they are constructed; at
//! shutdown [`Closer::close_all`] runs the actions in reverse
//! registration order (LIFO), so dependents release before the things
//! they depend on. A failing action is logged and reported but never
//! stops the remaining ones.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};

type CloseFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type CloseFn = Box<dyn FnOnce() -> CloseFuture + Send>;

/// Aggregate of every close action that failed.
#[derive(Debug)]
pub struct CloseError {
    failures: Vec<(String, String)>,
}

impl std::error::Error for CloseError {}

impl CloseError {
    /// Names of the actions that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.failures.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} close action(s) failed:", self.failures.len())?;
        for (name, reason) in &self.failures {
            write!(f, " [{name}: {reason}]")?;
        }
        Ok(())
    }
}

/// Ordered teardown registry.
#[derive(Default)]
pub struct Closer {
    entries: Mutex<Vec<(String, CloseFn)>>,
}

impl Closer {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named close action.
    pub fn add<F, Fut>(&self, name: impl Into<String>, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        self.entries
            .lock()
            .expect("closer registry poisoned")
            .push((name, Box::new(move || Box::pin(action()))));
    }

    /// Run every registered action in reverse registration order.
    ///
    /// Each action gets `per_close_timeout` of its own budget; the
    /// caller is expected to invoke this from a fresh shutdown scope
    /// that does not inherit the run loop's cancellation.
    ///
    /// # Errors
    ///
    /// Returns a [`CloseError`] aggregating every action that returned
    /// an error or timed out. All actions run regardless.
    pub async fn close_all(&self, per_close_timeout: Duration) -> Result<(), CloseError> {
        let entries: Vec<(String, CloseFn)> = {
            let mut guard = self.entries.lock().expect("closer registry poisoned");
            guard.drain(..).rev().collect()
        };

        let mut failures = Vec::new();
        for (name, action) in entries {
            match tokio::time::timeout(per_close_timeout, action()).await {
                Ok(Ok(())) => info!(closer = %name, "closed"),
                Ok(Err(e)) => {
                    error!(closer = %name, error = %e, "close failed");
                    failures.push((name, e.to_string()));
                }
                Err(_) => {
                    error!(closer = %name, "close timed out");
                    failures.push((name, format!("timed out after {per_close_timeout:?}")));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CloseError { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn closes_in_reverse_registration_order() {
        let closer = Closer::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["pool", "producer", "consumer"] {
            let log = Arc::clone(&log);
            closer.add(name, move || async move {
                log.lock().unwrap().push(name);
                Ok(())
            });
        }

        closer.close_all(Duration::from_secs(1)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["consumer", "producer", "pool"]);
    }

    #[tokio::test]
    async fn failing_action_does_not_stop_the_rest() {
        let closer = Closer::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let log = Arc::clone(&log);
            closer.add("first", move || async move {
                log.lock().unwrap().push("first");
                Ok(())
            });
        }
        closer.add("broken", || async { Err(anyhow::anyhow!("disk on fire")) });
        {
            let log = Arc::clone(&log);
            closer.add("last", move || async move {
                log.lock().unwrap().push("last");
                Ok(())
            });
        }

        let err = closer.close_all(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err.failed(), vec!["broken"]);
        assert_eq!(*log.lock().unwrap(), vec!["last", "first"]);
    }

    #[tokio::test]
    async fn hung_action_is_timed_out() {
        let closer = Closer::new();
        closer.add("stuck", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        let err = closer.close_all(Duration::from_millis(20)).await.unwrap_err();
        assert_eq!(err.failed(), vec!["stuck"]);
    }
}
