use super::prompt::analysis_instruction;
use super::response::{parse_diagnosis, text_at};
use super::{AnalysisService, RemoteSettings, send_json};
use crate::error::Result;
use crate::image::ImageFile;
use crate::providers::{Provider, ProviderConfig};
use crate::types::DiagnosisResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

const MAX_TOKENS: u32 = 2000;

/// OpenAI chat-completions vision adapter
pub struct OpenAiService {
    settings: RemoteSettings,
    client: Client,
}

impl OpenAiService {
    /// Fails with `MissingCredential` when no API key is configured
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            settings: RemoteSettings::resolve(Provider::OpenAI, config)?,
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Chat-completions body with the instruction and the image as a data URI
    pub fn request_body(&self, file: &ImageFile) -> Value {
        json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": analysis_instruction() },
                        {
                            "type": "image_url",
                            "image_url": { "url": file.to_data_uri() }
                        }
                    ]
                }
            ]
        })
    }
}

#[async_trait]
impl AnalysisService for OpenAiService {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult> {
        let request = self
            .client
            .post(self.settings.endpoint.clone())
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(file));

        // { "choices": [ { "message": { "content": "{...}" } } ] }
        let envelope = send_json(Provider::OpenAI, request).await?;
        let content = text_at(Provider::OpenAI, &envelope, "/choices/0/message/content")?;
        let payload = parse_diagnosis(Provider::OpenAI, content)?;

        Ok(DiagnosisResult::from_payload(file, payload))
    }
}
