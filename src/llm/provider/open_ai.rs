use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    error::*,
    llm::{ChatCompletionEvent, ChatCompletionStream, provider::*},
    utils::net::join_url,
};

pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl ChatProvider for OpenAiProvider {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> StkvalResult<ChatMessage> {
        collect_stream(self.chat_completion_stream(messages, options).await?).await
    }

    async fn chat_completion_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> StkvalResult<ChatCompletionStream> {
        let request_url = join_url(&self.base_url, "/chat/completions")?;

        let messages_json_value = messages
            .iter()
            .map(chat_message_to_json_value)
            .collect::<Vec<_>>();

        let request_body = json!({
            "model": self.model,
            "messages": messages_json_value,
            "temperature": options.temperature,
            "stream": true,
        });

        let client = reqwest::Client::builder().build()?;

        let response = client
            .post(request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(spawn_sse_forwarder(response, extract_delta))
        } else {
            Err(StkvalError::HttpStatusError(format!(
                "{} {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )))
        }
    }
}

fn extract_delta(json: &Value) -> Option<ChatCompletionEvent> {
    let delta = &json["choices"][0]["delta"];

    if let Some(content) = delta["content"].as_str() {
        Some(ChatCompletionEvent::Content(content.to_string()))
    } else {
        delta["reasoning_content"]
            .as_str()
            .map(|reasoning| ChatCompletionEvent::ReasoningContent(reasoning.to_string()))
    }
}

#[derive(strum::Display)]
enum OpenAiRole {
    #[strum(serialize = "user")]
    User,

    #[strum(serialize = "assistant")]
    Assistant,

    #[strum(serialize = "system")]
    System,
}

impl From<Role> for OpenAiRole {
    fn from(val: Role) -> Self {
        match val {
            Role::User => OpenAiRole::User,
            Role::Bot => OpenAiRole::Assistant,
            Role::System => OpenAiRole::System,
        }
    }
}

impl Serialize for OpenAiRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

fn chat_message_to_json_value(chat_message: &ChatMessage) -> Value {
    json!({
        "role": Into::<OpenAiRole>::into(chat_message.role).to_string(),
        "content": chat_message.content
    })
}
