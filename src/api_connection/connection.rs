use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use std::error::Error;
use std::fmt;
use tracing::debug;

use super::endpoints::{GenerateContentRequest, GenerateContentResponse, JsonSchema};
use super::{ImageData, ImageGenerator, TextGenerator};
use crate::config::AppConfig;

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    NoImageData(String),
    InvalidImageData(base64::DecodeError),
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(checked) => {
                write!(f, "API key is missing (checked: {})", checked)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::NoImageData(model) => {
                write!(f, "Model {} returned no inline image data", model)
            }
            ApiConnectionError::InvalidImageData(err) => {
                write!(f, "Inline image data is not valid base64: {}", err)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            ApiConnectionError::InvalidImageData(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// Hosted Gemini models behind the `generateContent` REST endpoint.
///
/// Built once from [`AppConfig`] and shared by the recipe generator and the
/// image resolver. A provider without a key still constructs; every call then
/// fails with [`ApiConnectionError::MissingApiKey`].
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: Client,
    api_key: Option<String>,
    api_base: String,
    text_model: String,
    image_model: String,
}

impl GeminiProvider {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    pub fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn api_key(&self) -> Result<&str, ApiConnectionError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ApiConnectionError::MissingApiKey(AppConfig::API_KEY_VARS.join(", ")))
    }

    pub async fn call_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        let api_key = self.api_key()?;
        let url = self.endpoint_for_model(model);
        debug!(%url, "calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str::<GenerateContentResponse>(&body)?)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate_json(
        &self,
        prompt: &str,
        schema: &JsonSchema,
    ) -> Result<Option<String>, ApiConnectionError> {
        let request = GenerateContentRequest::structured(prompt, schema.clone());
        let response = self.call_generate_content(&self.text_model, &request).await?;
        Ok(response.text())
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[async_trait]
impl ImageGenerator for GeminiProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageData, ApiConnectionError> {
        let request = GenerateContentRequest::user_prompt(prompt);
        let response = self.call_generate_content(&self.image_model, &request).await?;
        let inline = response
            .inline_image()
            .ok_or_else(|| ApiConnectionError::NoImageData(self.image_model.clone()))?;
        let bytes = BASE64
            .decode(inline.data.as_bytes())
            .map_err(ApiConnectionError::InvalidImageData)?;
        Ok(ImageData {
            bytes,
            mime_type: inline.mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::endpoints::SchemaType;

    fn provider(api_key: Option<&str>) -> GeminiProvider {
        let mut config = AppConfig::default();
        config.api_key = api_key.map(str::to_string);
        config.api_base = "https://example.test/v1beta/".to_string();
        GeminiProvider::from_config(&config)
    }

    #[test]
    fn endpoint_prefixes_models_path_once() {
        let provider = provider(Some("k"));
        assert_eq!(
            provider.endpoint_for_model("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider.endpoint_for_model(" models/gemini-2.5-flash "),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn configured_only_with_key() {
        assert!(provider(Some("k")).is_configured());
        assert!(!provider(None).is_configured());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let provider = provider(None);
        let schema = JsonSchema::of(SchemaType::String);
        let result = provider.generate_json("hello", &schema).await;
        assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
        if let Err(ApiConnectionError::MissingApiKey(checked)) = result {
            assert!(checked.contains("GEMINI_API_KEY"));
        }
    }
}
