//! External reasoning services
//!
//! Provides the language model client used by the production agents.

pub mod llm;

pub use llm::{
    ContentBlock, LanguageModel, LlmService, Message, ModelRequest, ModelResponse, Role,
    ToolChoice, ToolDefinition,
};
