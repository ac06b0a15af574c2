use super::prompt::analysis_instruction;
use super::response::parse_diagnosis;
use super::{AnalysisService, RemoteSettings, send_json};
use crate::error::{AnalysisError, Result};
use crate::image::{ImageFile, MediaType};
use crate::providers::{Provider, ProviderConfig};
use crate::types::DiagnosisResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

const MAX_TOKENS: u32 = 2000;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages-API vision adapter
pub struct ClaudeService {
    settings: RemoteSettings,
    client: Client,
}

impl ClaudeService {
    /// Fails with `MissingCredential` when no API key is configured
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            settings: RemoteSettings::resolve(Provider::Claude, config)?,
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Messages body: base64 source block first, then the instruction
    pub fn request_body(&self, file: &ImageFile) -> Value {
        // PDFs go in a document block, images in an image block
        let block_type = match file.media_type() {
            MediaType::Pdf => "document",
            MediaType::Png | MediaType::Jpeg => "image",
        };

        json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": block_type,
                            "source": {
                                "type": "base64",
                                "media_type": file.media_type().mime(),
                                "data": file.to_base64()
                            }
                        },
                        { "type": "text", "text": analysis_instruction() }
                    ]
                }
            ]
        })
    }
}

/// Text of the first `text` block in a messages response
fn first_text_block(envelope: &Value) -> Option<&str> {
    envelope
        .get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
        .get("text")?
        .as_str()
}

#[async_trait]
impl AnalysisService for ClaudeService {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult> {
        let request = self
            .client
            .post(self.settings.endpoint.clone())
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(file));

        let envelope = send_json(Provider::Claude, request).await?;
        let text = first_text_block(&envelope).ok_or_else(|| {
            AnalysisError::malformed(Provider::Claude, "response has no text content block")
        })?;
        let payload = parse_diagnosis(Provider::Claude, text)?;

        Ok(DiagnosisResult::from_payload(file, payload))
    }
}
