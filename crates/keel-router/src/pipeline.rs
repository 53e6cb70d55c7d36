//! Declarative capability chaining.
//!
//! A pipeline is a sequence of capability calls where each step's output
//! becomes the next step's input, with an optional transform applied in
//! between. Execution halts at the first failed step; the report records
//! which steps ran and where the chain broke.

use serde_json::Value;

use crate::router::CapabilityRouter;

/// Transform applied to the flowing data before a step's capability call.
pub type StepTransform = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// One pipeline step: a capability name plus an optional input transform.
pub struct PipelineStep {
    /// The capability to call.
    pub capability: String,
    /// Transform applied to the incoming data before the call.
    pub transform: Option<StepTransform>,
}

impl PipelineStep {
    /// A plain step with no transform.
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            transform: None,
        }
    }

    /// Attach an input transform.
    #[must_use]
    pub fn with_transform(
        mut self,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }
}

impl From<&str> for PipelineStep {
    fn from(capability: &str) -> Self {
        Self::new(capability)
    }
}

impl From<String> for PipelineStep {
    fn from(capability: String) -> Self {
        Self::new(capability)
    }
}

impl std::fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStep")
            .field("capability", &self.capability)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// The result of a pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Final output when every step succeeded.
    pub output: Option<Value>,
    /// Failure message from the step that broke the chain.
    pub error: Option<String>,
    /// The capability of the failed step.
    pub failed_step: Option<String>,
    /// Capabilities that were called, in order, including a failed one.
    pub executed_steps: Vec<String>,
}

impl PipelineReport {
    /// Whether every step succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Execute a pipeline of capability calls sequentially.
pub async fn run_pipeline(
    router: &CapabilityRouter,
    steps: &[PipelineStep],
    input: Value,
) -> PipelineReport {
    let mut data = input;
    let mut executed_steps = Vec::new();

    for step in steps {
        let staged = match &step.transform {
            Some(transform) => transform(data),
            None => data,
        };

        let outcome = router.call(&step.capability, staged).await;
        executed_steps.push(step.capability.clone());

        match outcome.result {
            Ok(value) => data = value,
            Err(error) => {
                return PipelineReport {
                    output: None,
                    error: Some(error),
                    failed_step: Some(step.capability.clone()),
                    executed_steps,
                };
            },
        }
    }

    PipelineReport {
        output: Some(data),
        error: None,
        failed_step: None,
        executed_steps,
    }
}

/// Result of validating a pipeline against a router without executing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineValidation {
    /// Whether every step's capability is registered.
    pub valid: bool,
    /// Capabilities with no registered handler, in step order.
    pub missing_capabilities: Vec<String>,
}

/// Check that every capability in a pipeline exists in the routing table.
#[must_use]
pub fn validate_pipeline(router: &CapabilityRouter, steps: &[PipelineStep]) -> PipelineValidation {
    let missing_capabilities: Vec<String> = steps
        .iter()
        .filter(|step| !router.has_capability(&step.capability))
        .map(|step| step.capability.clone())
        .collect();

    PipelineValidation {
        valid: missing_capabilities.is_empty(),
        missing_capabilities,
    }
}

/// A reusable pipeline built from a step definition.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Build a pipeline from step definitions.
    #[must_use]
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }

    /// The step definitions.
    #[must_use]
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Execute against a router.
    pub async fn run(&self, router: &CapabilityRouter, input: Value) -> PipelineReport {
        run_pipeline(router, &self.steps, input).await
    }

    /// Validate against a router without executing.
    #[must_use]
    pub fn validate(&self, router: &CapabilityRouter) -> PipelineValidation {
        validate_pipeline(router, &self.steps)
    }
}
