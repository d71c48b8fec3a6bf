use tokio::{sync::Mutex, time::Instant};

use std::{future::Future, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Executed,
    Skipped,
}

/// Coalesces rapid refresh requests.
///
/// The lock doubles as the in-flight guard: a caller arriving while an operation runs waits
/// for it and then, unless forced, finds the window fresh and skips. Only successful runs
/// restart the window, so a failed refresh can be retried immediately.
pub struct Debouncer {
    window: Duration,
    last_completed: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_completed: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn invoke_on_expire<F, Fut, E>(
        &self,
        force_update: bool,
        operation: F,
    ) -> Result<Invocation, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let mut last_completed = self.last_completed.lock().await;
        if !force_update {
            if let Some(completed_at) = *last_completed {
                if completed_at.elapsed() < self.window {
                    return Ok(Invocation::Skipped);
                }
            }
        }
        operation().await?;
        *last_completed = Some(Instant::now());
        Ok(Invocation::Executed)
    }
}
