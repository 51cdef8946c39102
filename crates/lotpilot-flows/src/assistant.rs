//! Flow orchestrator.
//!
//! `Assistant` composes the resilience pieces around exactly one provider
//! invocation per logical operation: admission gate, retry controller, and
//! the per-flow normalizers. Every call constructs its own retry state;
//! nothing persists across invocations, so concurrent calls need no
//! coordination.

use std::sync::Arc;

use serde_json::Value;

use lotpilot_core::{
    run_with_retry, AdmissionGate, AdmissionPolicy, CompletionProvider, CompletionRequest,
    ProviderId, RetryOutcome, RetryPolicy,
};

use crate::interpret::{self, InterpretRequest};
use crate::predict::{self, PredictRequest};
use crate::recommend::{self, RecommendRequest};
use crate::reply::FlowReply;
use lotpilot_core::{AvailabilityForecast, CommandInterpretation, RecommendationSet};

/// The parking assistant's flow orchestrator.
pub struct Assistant {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    admission: AdmissionGate,
}

impl Assistant {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            admission: AdmissionGate::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.admission = AdmissionGate::new(policy);
        self
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Interpret one transcribed voice command.
    pub async fn interpret(&self, request: InterpretRequest) -> FlowReply<CommandInterpretation> {
        interpret::run(self, request).await
    }

    /// Produce personalized parking recommendations.
    pub async fn recommend(&self, request: RecommendRequest) -> FlowReply<RecommendationSet> {
        recommend::run(self, request).await
    }

    /// Predict availability for one parking spot.
    pub async fn predict(&self, request: PredictRequest) -> FlowReply<AvailabilityForecast> {
        predict::run(self, request).await
    }

    /// Shared invocation path: admission gate, then one retried provider
    /// call. Fatal and exhausted outcomes collapse to `None` so every flow
    /// applies its documented fallback instead of propagating an error.
    pub(crate) async fn invoke_model(&self, request: CompletionRequest) -> ModelInvocation {
        self.admission.admit().await;

        let template = request.template;
        let provider = Arc::clone(&self.provider);
        let outcome = run_with_retry(&self.retry, move |attempt| {
            let request = request.clone();
            let provider = Arc::clone(&provider);
            async move {
                tracing::debug!(template, attempt, provider = %provider.id(), "invoking provider");
                provider.complete(request).await
            }
        })
        .await;

        let attempts = outcome.attempts();
        match outcome {
            RetryOutcome::Success { value, .. } => ModelInvocation {
                output: Some(value),
                attempts,
                warnings: Vec::new(),
            },
            RetryOutcome::Fatal { error, .. } => {
                tracing::warn!(template, code = error.code(), "provider call failed; using fallback");
                ModelInvocation {
                    output: None,
                    attempts,
                    warnings: vec![format!("assistant service error: {error}")],
                }
            }
            RetryOutcome::Exhausted { last_error, .. } => {
                tracing::warn!(
                    template,
                    code = last_error.code(),
                    attempts,
                    "provider retries exhausted; using fallback"
                );
                ModelInvocation {
                    output: None,
                    attempts,
                    warnings: vec![format!(
                        "assistant service unavailable after {attempts} attempts: {last_error}"
                    )],
                }
            }
        }
    }
}

/// Raw result of the shared invocation path.
pub(crate) struct ModelInvocation {
    pub output: Option<Value>,
    pub attempts: u32,
    pub warnings: Vec<String>,
}
