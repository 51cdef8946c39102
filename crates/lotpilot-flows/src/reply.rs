use lotpilot_core::ProviderId;

/// Typed result of one flow invocation.
///
/// A reply always carries a schema-valid `result`; when the live pipeline
/// could not produce one, `fallback` is set and the result is the flow's
/// documented substitute. No flow ever surfaces an error to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReply<T> {
    pub result: T,
    pub provider: ProviderId,
    /// Provider attempts spent, including the successful one. Zero when a
    /// local short-circuit answered without any external call.
    pub attempts: u32,
    pub fallback: bool,
    pub warnings: Vec<String>,
}

impl<T> FlowReply<T> {
    pub fn live(result: T, provider: ProviderId, attempts: u32) -> Self {
        Self {
            result,
            provider,
            attempts,
            fallback: false,
            warnings: Vec::new(),
        }
    }

    pub fn fallback(result: T, provider: ProviderId, attempts: u32) -> Self {
        Self {
            result,
            provider,
            attempts,
            fallback: true,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
