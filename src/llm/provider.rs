use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    CHANNEL_BUFFER_DEFAULT,
    error::StkvalResult,
    llm::{ChatCompletionEvent, ChatCompletionOptions, ChatCompletionStream, ChatMessage, Role},
};

pub mod gemini;
pub mod open_ai;

pub trait ChatProvider {
    fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> impl std::future::Future<Output = StkvalResult<ChatMessage>> + Send;

    fn chat_completion_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> impl std::future::Future<Output = StkvalResult<ChatCompletionStream>> + Send;
}

/// Forward a server-sent-event response as [`ChatCompletionEvent`]s,
/// letting the provider extract its own delta payload from each data line.
pub(crate) fn spawn_sse_forwarder(
    response: reqwest::Response,
    extract: fn(&Value) -> Option<ChatCompletionEvent>,
) -> ChatCompletionStream {
    let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_DEFAULT);

    tokio::spawn(async move {
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    let chunk_str = String::from_utf8_lossy(&chunk);

                    for line in chunk_str.lines() {
                        if let Some(data) = line.strip_prefix("data: ") {
                            if data == "[DONE]" {
                                break;
                            }

                            match serde_json::from_str::<Value>(data) {
                                Ok(json) => {
                                    if let Some(event) = extract(&json) {
                                        let _ = sender.send(event).await;
                                    }
                                }
                                Err(err) => {
                                    let _ = sender
                                        .send(ChatCompletionEvent::Error(err.into()))
                                        .await;
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    let _ = sender.send(ChatCompletionEvent::Error(err.into())).await;
                }
            }
        }
    });

    ChatCompletionStream::new(receiver)
}

/// Drain a completion stream into a single bot message
pub(crate) async fn collect_stream(
    mut stream: ChatCompletionStream,
) -> StkvalResult<ChatMessage> {
    let mut content = String::new();
    let mut reasoning_content = String::new();

    while let Some(event) = stream.next().await {
        match event {
            ChatCompletionEvent::Content(delta) => {
                content.push_str(&delta);
            }
            ChatCompletionEvent::ReasoningContent(delta) => {
                reasoning_content.push_str(&delta);
            }
            ChatCompletionEvent::Error(err) => {
                return Err(err);
            }
        }
    }

    Ok(ChatMessage {
        role: Role::Bot,
        content,
        reasoning: if reasoning_content.is_empty() {
            None
        } else {
            Some(reasoning_content)
        },
    })
}
