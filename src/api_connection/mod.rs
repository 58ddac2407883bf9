//! Hosted-model plumbing: wire types, the Gemini client and an offline fake.
//!
//! The recipe generator and the image resolver only see the two traits below,
//! so either can be handed a [`FakeProvider`] in tests.

pub mod connection;
pub mod endpoints;
pub mod fake;

pub use connection::{ApiConnectionError, GeminiProvider};
pub use fake::FakeProvider;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;

use endpoints::JsonSchema;

/// Decoded image returned by a hosted image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    pub fn to_data_uri(&self) -> String {
        let mime = if self.mime_type.is_empty() {
            "image/png"
        } else {
            self.mime_type.as_str()
        };
        format!("data:{};base64,{}", mime, BASE64.encode(&self.bytes))
    }
}

/// Text model that answers with JSON constrained by a schema.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// One call, no retry. `Ok(None)` means the provider answered without text.
    async fn generate_json(
        &self,
        prompt: &str,
        schema: &JsonSchema,
    ) -> Result<Option<String>, ApiConnectionError>;

    fn provider_name(&self) -> &'static str;
}

/// Image model used by the primary image path.
#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    /// Whether credentials exist; the resolver skips the primary path otherwise.
    fn is_configured(&self) -> bool;

    async fn generate_image(&self, prompt: &str) -> Result<ImageData, ApiConnectionError>;
}
