use tracing::instrument;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use super::{error::NetworkError, NetworkProvider};
use crate::config::ConfigError;

/// Ordered same-capability providers with a failover cursor.
///
/// A request starts at the current provider and moves forward on transport failures only.
/// The list never wraps within one request: running off the end resets the cursor to the
/// first provider and surfaces `AllProvidersFailed` carrying the last error.
pub struct MultiProvider<P: ?Sized> {
    providers: Vec<Arc<P>>,
    cursor: AtomicUsize,
}

impl<P: NetworkProvider + ?Sized> MultiProvider<P> {
    pub fn new(providers: Vec<Arc<P>>) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        Ok(Self {
            providers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn providers(&self) -> &[Arc<P>] {
        &self.providers
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Arc<P> {
        Arc::clone(&self.providers[self.cursor().min(self.providers.len() - 1)])
    }

    pub fn current_host(&self) -> String {
        self.current().base_url().to_string()
    }

    #[instrument(
        name = "multi_provider.perform_request",
        skip_all,
        fields(n_providers = self.providers.len(), host, attempts),
        err
    )]
    pub async fn perform_request<T, F, Fut>(&self, op: F) -> Result<T, NetworkError>
    where
        F: Fn(Arc<P>) -> Fut,
        Fut: Future<Output = Result<T, NetworkError>>,
    {
        let n_providers = self.providers.len();
        let mut index = self.cursor().min(n_providers - 1);
        let mut attempts = 0;
        loop {
            let provider = Arc::clone(&self.providers[index]);
            attempts += 1;
            let span = tracing::Span::current();
            span.record("host", provider.base_url());
            span.record("attempts", attempts);

            match op(Arc::clone(&provider)).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    let next = index + 1;
                    if next < n_providers {
                        tracing::warn!(
                            host = provider.base_url(),
                            next_host = self.providers[next].base_url(),
                            error = %e,
                            "provider failed, switching"
                        );
                        // Leave the cursor alone if a concurrent request already moved it.
                        let _ = self.cursor.compare_exchange(
                            index,
                            next,
                            Ordering::SeqCst,
                            Ordering::SeqCst,
                        );
                        index = next;
                        continue;
                    }
                    let _ = self
                        .cursor
                        .compare_exchange(index, 0, Ordering::SeqCst, Ordering::SeqCst);
                    let e = NetworkError::AllProvidersFailed {
                        attempts,
                        last: Box::new(e),
                    };
                    tracing::error!(error = %e, "every provider failed");
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
