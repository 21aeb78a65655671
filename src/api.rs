use std::collections::HashMap;

use crate::{
    analyze,
    error::{StkvalError, StkvalResult},
    llm, serve,
};

pub type Analysis = analyze::Analysis;
pub type AnalyzeOptions = analyze::AnalyzeOptions;
pub type ChatCompletionEvent = llm::ChatCompletionEvent;
pub type ChatCompletionOptions = llm::ChatCompletionOptions;
pub type ChatCompletionStream = llm::ChatCompletionStream;
pub type ChatMessage = llm::ChatMessage;
pub type Role = llm::Role;
pub type SheetCell = crate::sheet::Cell;
pub type SheetRow = crate::sheet::Row;

pub static LLM_SUPPORTED_PROTOCOLS: [&str; 2] = ["openai", "gemini"];
pub static LLM_SUPPORTED_TYPES: [&str; 1] = ["chat"];

/// Run the valuation pipeline for one ticker
pub async fn analyze(ticker: &str, options: &AnalyzeOptions) -> StkvalResult<Analysis> {
    analyze::run(ticker, options).await
}

/// Serve the web UI and JSON API
pub async fn serve(port: u16, options: AnalyzeOptions) -> StkvalResult<()> {
    serve::run(port, options).await
}

pub async fn llm_config(
    r#type: &str,
    protocol: &str,
    options: &HashMap<String, String>,
) -> StkvalResult<()> {
    match r#type {
        "chat" => llm::config_chat(protocol, options).await,
        _ => Err(StkvalError::Invalid(
            "INVALID_LLM_TYPE",
            format!("Invalid LLM type '{}'", r#type),
        )),
    }
}

pub async fn llm_chat_completion_stream(
    prompt: &str,
    system: Option<&str>,
    options: &ChatCompletionOptions,
) -> StkvalResult<ChatCompletionStream> {
    let cfg = llm::Config::load()?;

    let mut messages: Vec<ChatMessage> = vec![];
    if let Some(system) = system {
        messages.push(ChatMessage {
            role: Role::System,
            content: system.to_string(),
            reasoning: None,
        });
    }
    messages.push(ChatMessage {
        role: Role::User,
        content: prompt.to_string(),
        reasoning: None,
    });

    llm::chat_completion_stream(&cfg, &messages, options).await
}
