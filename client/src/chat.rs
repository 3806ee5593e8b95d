//! Chat stream buffer
//!
//! Accumulates incrementally-delivered response fragments into a
//! growing transcript. Each send appends a user turn and an empty
//! assistant placeholder; fragments concatenate onto the placeholder
//! in arrival order. Only the in-flight assistant turn is ever
//! mutated, and a terminal stream failure replaces it wholesale with
//! a fixed apology.

use crate::ai::NutritionAi;
use crate::error::ClientError;
use nutriai_shared::{ChatMessage, ChatRole, CoreError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shown in place of a partially-streamed answer when the stream fails
pub const STREAM_FAILURE_APOLOGY: &str = "Sorry, something went wrong. Could you try again?";

/// Append-only transcript with a two-phase streaming tail
#[derive(Debug, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    streaming: bool,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while an assistant response is outstanding; new sends are
    /// refused for the duration.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Final text of the most recent assistant turn
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.text.as_str())
    }

    /// Open a new exchange: append the user turn and an empty
    /// assistant placeholder, in that order.
    pub fn begin_exchange(&mut self, user_text: &str) -> Result<(), CoreError> {
        if self.streaming {
            return Err(CoreError::Stream(
                "A response is still streaming".to_string(),
            ));
        }
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: user_text.to_string(),
        });
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text: String::new(),
        });
        self.streaming = true;
        Ok(())
    }

    /// Concatenate a fragment onto the in-flight assistant turn
    pub fn push_fragment(&mut self, fragment: &str) {
        if !self.streaming {
            warn!("Fragment received with no stream outstanding, dropping");
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            last.text.push_str(fragment);
        }
    }

    /// Freeze the in-flight turn after a normal stream end
    pub fn complete(&mut self) {
        self.streaming = false;
    }

    /// Terminal stream failure: discard whatever was accumulated and
    /// show the fixed apology instead. Re-enables sending.
    pub fn fail(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Assistant {
                last.text = STREAM_FAILURE_APOLOGY.to_string();
            }
        }
        self.streaming = false;
    }
}

/// Drives a transcript against the provider's streaming chat endpoint
///
/// Conversation continuity is held by the provider across calls; this
/// session only owns the transcript.
pub struct ChatSession {
    provider: Arc<dyn NutritionAi>,
    transcript: ChatTranscript,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn NutritionAi>) -> Self {
        Self {
            provider,
            transcript: ChatTranscript::new(),
        }
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Send a message and drain the response stream to completion
    ///
    /// Fragments apply strictly in arrival order. Any terminal stream
    /// error lands as the fixed apology; the error is also returned so
    /// the caller can log it.
    pub async fn send(&mut self, text: &str) -> Result<(), ClientError> {
        self.transcript.begin_exchange(text)?;

        let mut rx = match self.provider.send_chat_message(text).await {
            Ok(rx) => rx,
            Err(e) => {
                self.transcript.fail();
                return Err(e.into());
            }
        };

        while let Some(item) = rx.recv().await {
            match item {
                Ok(fragment) => self.transcript.push_fragment(&fragment),
                Err(e) => {
                    debug!(error = %e, "Chat stream failed mid-response");
                    self.transcript.fail();
                    return Err(e.into());
                }
            }
        }

        self.transcript.complete();
        Ok(())
    }
}
