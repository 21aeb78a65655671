use serde_json::{Value, json};

use crate::{
    error::*,
    llm::{ChatCompletionEvent, ChatCompletionStream, provider::*},
    utils::net::join_url,
};

pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl ChatProvider for GeminiProvider {
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
        let request_url = join_url(
            &self.base_url,
            &format!("/models/{}:streamGenerateContent", self.model),
        )?;

        // system messages go into systemInstruction, the rest into contents
        let mut contents: Vec<Value> = vec![];
        let mut system_parts: Vec<Value> = vec![];
        for message in messages {
            match message.role {
                Role::System => {
                    system_parts.push(json!({ "text": message.content }));
                }
                Role::User => {
                    contents.push(json!({ "role": "user", "parts": [{ "text": message.content }] }));
                }
                Role::Bot => {
                    contents
                        .push(json!({ "role": "model", "parts": [{ "text": message.content }] }));
                }
            }
        }

        let mut request_body = json!({
            "contents": contents,
            "generationConfig": { "temperature": options.temperature },
        });
        if !system_parts.is_empty() {
            request_body["systemInstruction"] = json!({ "parts": system_parts });
        }

        let client = reqwest::Client::builder().build()?;

        let response = client
            .post(request_url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", self.api_key.clone())
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
    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|text| ChatCompletionEvent::Content(text.to_string()))
}
