//! Language-model backed Analyst
//!
//! Runs a bounded tool-use conversation: the model may call the brand
//! retrieval tool for up to `max_tool_rounds` turns, after which tool use is
//! switched off and the model has to answer.

use super::{prompts, schema, Analyst, AnalystInput};
use crate::error::{BrandscopeError, Result};
use crate::knowledge::RetrievalTool;
use crate::services::{
    ContentBlock, LanguageModel, Message, ModelRequest, ToolChoice, ToolDefinition,
};
use crate::types::{AnalysisResult, RevisionContext};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of tool-use turns per analysis
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

pub struct LlmAnalyst {
    model: Arc<dyn LanguageModel>,
    max_tool_rounds: usize,
}

impl LlmAnalyst {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    fn tool_definition(retrieval: &RetrievalTool<'_>) -> ToolDefinition {
        ToolDefinition {
            name: RetrievalTool::NAME.to_string(),
            description: retrieval.description().to_string(),
            input_schema: retrieval.input_schema(),
        }
    }

    /// Execute one tool call and wrap the outcome as a tool result block
    async fn run_tool(
        &self,
        id: &str,
        name: &str,
        input: &Value,
        retrieval: &RetrievalTool<'_>,
    ) -> ContentBlock {
        let outcome = if name != RetrievalTool::NAME {
            Err(format!("unknown tool '{}'", name))
        } else {
            match input.get("query").and_then(Value::as_str) {
                Some(query) if !query.trim().is_empty() => {
                    retrieval.search(query).await.map_err(|e| {
                        warn!("Brand context search failed: {}", e);
                        format!("brand context search failed: {}", e)
                    })
                }
                _ => Err("missing required string field 'query'".to_string()),
            }
        };

        match outcome {
            Ok(content) => ContentBlock::ToolResult {
                tool_use_id: id.to_string(),
                content,
                is_error: false,
            },
            Err(content) => ContentBlock::ToolResult {
                tool_use_id: id.to_string(),
                content,
                is_error: true,
            },
        }
    }
}

#[async_trait]
impl Analyst for LlmAnalyst {
    fn name(&self) -> &str {
        "llm-analyst"
    }

    async fn analyze(
        &self,
        input: &AnalystInput,
        revisions: &RevisionContext,
        retrieval: &RetrievalTool<'_>,
    ) -> Result<AnalysisResult> {
        let system = prompts::analyst_system();
        let tools = vec![Self::tool_definition(retrieval)];
        let mut messages = vec![Message::user(prompts::analyst_prompt(input, revisions))];

        for round in 0..=self.max_tool_rounds {
            let final_round = round == self.max_tool_rounds;
            let request = ModelRequest {
                system: Some(system.clone()),
                messages: messages.clone(),
                tools: tools.clone(),
                tool_choice: Some(if final_round {
                    ToolChoice::None
                } else {
                    ToolChoice::Auto
                }),
            };

            let response = self
                .model
                .send(request)
                .await
                .map_err(BrandscopeError::into_agent_failure)?;

            if final_round || !response.wants_tools() {
                debug!("Analyst answered after {} tool rounds", round);
                return schema::validate_analysis(&response.text(), input.request_draft);
            }

            let calls: Vec<(String, String, Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            info!("Analyst tool round {}: {} call(s)", round + 1, calls.len());

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, call_input) in &calls {
                results.push(self.run_tool(id, name, call_input, retrieval).await);
            }

            let echoed: Vec<ContentBlock> = response
                .content
                .into_iter()
                .filter(|b| !matches!(b, ContentBlock::Unsupported))
                .collect();
            messages.push(Message::assistant(echoed));
            messages.push(Message::tool_results(results));
        }

        Err(BrandscopeError::AgentUnavailable(
            "analyst produced no answer".to_string(),
        ))
    }
}
