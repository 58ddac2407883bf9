//! Fake provider for tests and offline runs.
//!
//! Text replies are matched by prompt substring (case-insensitive) with an
//! optional default; image behaviour is scripted. Every call is counted so
//! tests can assert which paths were taken.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::endpoints::JsonSchema;
use super::{ApiConnectionError, ImageData, ImageGenerator, TextGenerator};

/// Two canned recipes used by `NOURISH_PROVIDER=fake`.
pub const SAMPLE_RECIPES_JSON: &str = r#"[
  {
    "id": "sample-spinach-omelette",
    "title": "Spinach Omelette",
    "description": "A fluffy omelette folded over wilted spinach.",
    "timeToCook": 15,
    "calories": 320,
    "protein": 21,
    "carbs": 4,
    "fats": 24,
    "ingredients": ["3 eggs", "1 handful spinach", "1 knob butter", "salt and pepper"],
    "toolsNeeded": ["Stove"],
    "steps": ["Whisk the eggs with salt and pepper.", "Wilt the spinach in butter.", "Pour in the eggs, cook gently and fold."],
    "imagePrompt": "overhead shot of a golden omelette with spinach on a white plate",
    "priceEstimate": "3-5 €"
  },
  {
    "id": "sample-tomato-pasta",
    "title": "Garlic Tomato Pasta",
    "description": "Quick pasta tossed in a garlicky fresh tomato sauce.",
    "timeToCook": 20,
    "calories": 540,
    "protein": 16,
    "carbs": 82,
    "fats": 14,
    "ingredients": ["200 g pasta", "3 tomatoes", "2 cloves garlic", "2 tbsp olive oil"],
    "toolsNeeded": ["Stove"],
    "steps": ["Boil the pasta.", "Soften garlic in olive oil, add chopped tomatoes.", "Toss pasta with the sauce."],
    "imagePrompt": "close-up of spaghetti in bright tomato sauce with basil",
    "priceEstimate": "4-6 €"
  }
]"#;

/// What the fake image model does on each call.
#[derive(Debug, Clone)]
pub enum FakeImageBehaviour {
    /// No credentials: the resolver must not call the image model at all.
    Unconfigured,
    AlwaysFail,
    Succeed(ImageData),
    /// Fail the first `n` calls, then succeed.
    FailTimes(usize, ImageData),
}

#[derive(Debug)]
pub struct FakeProvider {
    responses: Vec<(String, String)>,
    default_response: Option<String>,
    missing_credentials: bool,
    text_error_status: Option<reqwest::StatusCode>,
    image: FakeImageBehaviour,
    prompts: Mutex<Vec<String>>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            default_response: None,
            missing_credentials: false,
            text_error_status: None,
            image: FakeImageBehaviour::Unconfigured,
            prompts: Mutex::new(Vec::new()),
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
        }
    }

    /// Canned recipes for every prompt and no image credentials.
    pub fn offline() -> Self {
        Self::new().with_default_response(SAMPLE_RECIPES_JSON)
    }

    pub fn with_response(mut self, prompt_contains: &str, response: &str) -> Self {
        self.responses
            .push((prompt_contains.to_lowercase(), response.to_string()));
        self
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Behave like a provider whose API key was never configured.
    pub fn without_credentials(mut self) -> Self {
        self.missing_credentials = true;
        self.image = FakeImageBehaviour::Unconfigured;
        self
    }

    /// Every text call fails with this HTTP status.
    pub fn with_text_error(mut self, status: reqwest::StatusCode) -> Self {
        self.text_error_status = Some(status);
        self
    }

    pub fn with_image_behaviour(mut self, behaviour: FakeImageBehaviour) -> Self {
        self.image = behaviour;
        self
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, text and image alike.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, prompt: &str) {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
    }
}

#[async_trait]
impl TextGenerator for FakeProvider {
    async fn generate_json(
        &self,
        prompt: &str,
        _schema: &JsonSchema,
    ) -> Result<Option<String>, ApiConnectionError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.record(prompt);

        if self.missing_credentials {
            return Err(ApiConnectionError::MissingApiKey("fake".to_string()));
        }
        if let Some(status) = self.text_error_status {
            return Err(ApiConnectionError::ApiError {
                status,
                error_body: "fake provider failure".to_string(),
            });
        }

        let prompt_lower = prompt.to_lowercase();
        let matched = self
            .responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(pattern))
            .map(|(_, response)| response.clone());
        Ok(matched.or_else(|| self.default_response.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl ImageGenerator for FakeProvider {
    fn is_configured(&self) -> bool {
        !self.missing_credentials && !matches!(self.image, FakeImageBehaviour::Unconfigured)
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageData, ApiConnectionError> {
        let call = self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.record(prompt);

        match &self.image {
            FakeImageBehaviour::Unconfigured => {
                Err(ApiConnectionError::MissingApiKey("fake".to_string()))
            }
            FakeImageBehaviour::AlwaysFail => {
                Err(ApiConnectionError::NoImageData("fake-image".to_string()))
            }
            FakeImageBehaviour::Succeed(image) => Ok(image.clone()),
            FakeImageBehaviour::FailTimes(failures, image) => {
                if call < *failures {
                    Err(ApiConnectionError::ApiError {
                        status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                        error_body: "quota".to_string(),
                    })
                } else {
                    Ok(image.clone())
                }
            }
        }
    }
}
