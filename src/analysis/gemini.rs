use super::prompt::analysis_instruction;
use super::response::{parse_diagnosis, text_at};
use super::{AnalysisService, RemoteSettings, send_json};
use crate::error::{AnalysisError, Result};
use crate::image::ImageFile;
use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};
use crate::types::DiagnosisResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Represents the Gemini vision provider
pub struct GeminiService {
    settings: RemoteSettings,
    client: Client,
}

impl GeminiService {
    /// Fails with `MissingCredential` when no API key is configured
    ///
    /// The endpoint is the models collection URL; the model name and the
    /// `:generateContent` method are appended per request.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            settings: RemoteSettings::resolve(Provider::Gemini, config)?,
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Full `generateContent` URL, without the API key
    pub fn method_url(&self) -> Result<url::Url> {
        let base = self.settings.endpoint.as_str().trim_end_matches('/');
        let raw = format!("{base}/{}:generateContent", self.settings.model);
        url::Url::parse(&raw).map_err(|e| {
            AnalysisError::malformed(Provider::Gemini, format!("invalid request URL {raw}: {e}"))
        })
    }

    pub fn request_body(&self, file: &ImageFile) -> Value {
        json!({
            "contents": [
                {
                    "parts": [
                        { "text": analysis_instruction() },
                        {
                            "inline_data": {
                                "mime_type": file.media_type().mime(),
                                "data": file.to_base64()
                            }
                        }
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": 2048,
                "temperature": 0.7
            }
        })
    }
}

#[async_trait]
impl AnalysisService for GeminiService {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult> {
        let url = self.method_url()?;
        log_debug!("Gemini request to {}", url);

        let request = self
            .client
            .post(url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&self.request_body(file));

        // {
        //   "candidates": [
        //     { "content": { "parts": [ { "text": "..." } ] } }
        //   ]
        // }
        let envelope = send_json(Provider::Gemini, request).await?;
        let text = text_at(Provider::Gemini, &envelope, "/candidates/0/content/parts/0/text")?;
        let payload = parse_diagnosis(Provider::Gemini, text)?;

        Ok(DiagnosisResult::from_payload(file, payload))
    }
}
