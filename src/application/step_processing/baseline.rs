//! Unenhanced step processing: no context, no intent detection.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::security::{ContentSanitizer, PatternClassifier};
use crate::ports::AIProvider;

use super::{
    call_model, handler_for, ProcessedStep, StepProcessingError, StepProcessor, StepRequest,
    StepTurn,
};

pub struct BaselineStepProcessor {
    ai: Arc<dyn AIProvider>,
    patterns: PatternClassifier,
    sanitizer: ContentSanitizer,
}

impl BaselineStepProcessor {
    pub fn new(ai: Arc<dyn AIProvider>) -> Self {
        Self {
            ai,
            patterns: PatternClassifier::default(),
            sanitizer: ContentSanitizer::new(),
        }
    }
}

#[async_trait]
impl StepProcessor for BaselineStepProcessor {
    async fn process(&self, request: &StepRequest) -> Result<ProcessedStep, StepProcessingError> {
        let step = request.step()?;
        let handler = handler_for(step.kind());

        // User input still never reaches the model unsanitized.
        let input = if request.is_sentinel() {
            request.input.clone()
        } else {
            let verdict = self.patterns.classify(&request.input);
            self.sanitizer.sanitize(&request.input, &verdict)
        };
        let turn = StepTurn {
            workflow: &request.workflow,
            step,
            input: &input,
            sentinel: request.is_sentinel(),
        };

        if let Some(outcome) = handler.shortcut(&turn) {
            return Ok(ProcessedStep::from_outcome(outcome));
        }

        let output = call_model(
            self.ai.as_ref(),
            request,
            step,
            handler.instructions(&turn),
            &input,
        )
        .await?;

        Ok(ProcessedStep::from_outcome(handler.interpret(&turn, &output)))
    }
}
