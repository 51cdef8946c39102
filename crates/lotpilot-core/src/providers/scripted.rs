use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use crate::provider::{CompletionProvider, CompletionRequest, ProviderError, ProviderId};

/// Test provider that replays a scripted sequence of outcomes.
///
/// Replaces implicit randomness with an injected outcome strategy: each call
/// pops the next scripted result; once the script is exhausted the last
/// outcome repeats. The call counter makes retry behavior observable.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<Value, ProviderError>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<Value, ProviderError>>) -> Self {
        assert!(
            !outcomes.is_empty(),
            "scripted provider needs at least one outcome"
        );
        Self {
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider that always answers with `value`.
    pub fn always(value: Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    /// Provider that always fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of `complete` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests recorded in call order.
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Scripted
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send + 'a>> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);

        let outcome = {
            let outcomes = self
                .outcomes
                .lock()
                .expect("outcome script should not be poisoned");
            outcomes[index.min(outcomes.len() - 1)].clone()
        };

        Box::pin(async move { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_script_then_repeats_last_outcome() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::overloaded("busy")),
            Ok(json!({ "ok": true })),
        ]);

        let request =
            CompletionRequest::new("interpret_command", "prompt", json!({ "transcript": "hi" }));

        assert!(provider.complete(request.clone()).await.is_err());
        assert!(provider.complete(request.clone()).await.is_ok());
        assert!(provider.complete(request).await.is_ok());
        assert_eq!(provider.calls(), 3);
    }
}
