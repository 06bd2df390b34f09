//! Language-model backed Evaluator

use super::{prompts, schema, AnalystInput, Evaluator};
use crate::error::{BrandscopeError, Result};
use crate::services::LanguageModel;
use crate::types::{AnalysisResult, EvaluationVerdict};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct LlmEvaluator {
    model: Arc<dyn LanguageModel>,
}

impl LlmEvaluator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    fn name(&self) -> &str {
        "llm-evaluator"
    }

    async fn evaluate(
        &self,
        analysis: &AnalysisResult,
        input: &AnalystInput,
        brand_context: &str,
    ) -> Result<EvaluationVerdict> {
        let text = self
            .model
            .complete(
                &prompts::evaluator_system(),
                &prompts::evaluator_prompt(analysis, input, brand_context),
            )
            .await
            .map_err(BrandscopeError::into_agent_failure)?;

        let verdict = schema::validate_verdict(&text)?;
        debug!("Evaluator verdict: approved={}", verdict.approved());
        Ok(verdict)
    }
}
