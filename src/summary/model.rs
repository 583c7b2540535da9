use anyhow::{anyhow, Context};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::operation::converse::ConverseOutput as ConverseResponse;
use aws_sdk_bedrockruntime::types::{ContentBlock, ConversationRole, Message, SystemContentBlock};

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_ID: &str = "us.amazon.nova-pro-v1:0";

/// A hosted chat model that answers one user turn under a system instruction.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn converse(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

pub struct BedrockSummarizer {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockSummarizer {
    pub fn new(sdk_config: &SdkConfig, model_id: &str) -> Self {
        BedrockSummarizer {
            client: aws_sdk_bedrockruntime::Client::new(sdk_config),
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl SummaryModel for BedrockSummarizer {
    async fn converse(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(user_message.to_owned()))
            .build()
            .context("invalid user message")?;

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system_prompt.to_owned()))
            .messages(message)
            .send()
            .await
            .map_err(|err| Error::from_sdk("Converse", err))?;

        first_text(&response)
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("model {} returned no text", self.model_id).into())
    }
}

/// Text of the first content block of the reply.
fn first_text(response: &ConverseResponse) -> Option<&str> {
    response
        .output()?
        .as_message()
        .ok()?
        .content()
        .first()?
        .as_text()
        .ok()
        .map(String::as_str)
}
