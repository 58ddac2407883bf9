use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::api_connection::ImageGenerator;
use crate::config::AppConfig;

pub const FALLBACK_ENDPOINT: &str = "https://image.pollinations.ai/prompt/";
pub const STYLE_SUFFIX: &str = "photorealistic food photography 4k";
/// Seeds are drawn from `0..FALLBACK_SEED_RANGE`.
pub const FALLBACK_SEED_RANGE: u32 = 1000;

/// Fallback image URL for a prompt. The seed makes the service render a fresh
/// image instead of a cached one.
pub fn fallback_image_url(image_prompt: &str, seed: u32) -> Option<String> {
    let styled = format!("{} {}", image_prompt.trim(), STYLE_SUFFIX);
    let url = format!(
        "{}{}?nologo=true&private=true&seed={}&width=1024&height=1024&model=flux",
        FALLBACK_ENDPOINT,
        urlencoding::encode(styled.trim()),
        seed
    );
    match Url::parse(&url) {
        Ok(_) => Some(url),
        Err(err) => {
            warn!("Fallback image URL is invalid: {}", err);
            None
        }
    }
}

/// Finds an image for a recipe. Never fails: primary model first (only with
/// credentials), then the public fallback service.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    primary: Option<Arc<dyn ImageGenerator>>,
    attempts: usize,
    backoff_unit: Duration,
}

impl ImageResolver {
    pub fn new(primary: Option<Arc<dyn ImageGenerator>>, attempts: usize, backoff_unit: Duration) -> Self {
        Self {
            primary,
            attempts,
            backoff_unit,
        }
    }

    pub fn from_config(primary: Arc<dyn ImageGenerator>, config: &AppConfig) -> Self {
        Self::new(Some(primary), config.image_attempts, config.image_backoff_unit)
    }

    pub fn fallback_only() -> Self {
        Self::new(None, 0, Duration::ZERO)
    }

    /// `Some(uri)` is a data URI or fallback URL; `None` means no image at all.
    pub async fn resolve(&self, image_prompt: &str) -> Option<String> {
        if let Some(data_uri) = self.try_primary(image_prompt).await {
            return Some(data_uri);
        }

        info!("Using fallback image generator");
        let seed = rand::thread_rng().gen_range(0..FALLBACK_SEED_RANGE);
        fallback_image_url(image_prompt, seed)
    }

    async fn try_primary(&self, image_prompt: &str) -> Option<String> {
        let primary = self.primary.as_ref().filter(|p| p.is_configured())?;

        for attempt in 1..=self.attempts {
            if attempt > 1 {
                // Linear backoff: attempt index times the unit.
                tokio::time::sleep(self.backoff_unit * attempt as u32).await;
            }
            match primary.generate_image(image_prompt).await {
                Ok(image) => {
                    debug!(attempt, bytes = image.bytes.len(), "Primary image generated");
                    return Some(image.to_data_uri());
                }
                Err(err) => {
                    warn!("Image generation attempt {} failed: {}", attempt, err);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::fake::FakeImageBehaviour;
    use crate::api_connection::{FakeProvider, ImageData};

    fn seed_of(url: &str) -> u32 {
        let parsed = Url::parse(url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == "seed")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap()
    }

    #[test]
    fn fallback_url_has_fixed_shape() {
        let url = fallback_image_url("golden omelette, spinach & feta", 42).unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/golden%20omelette%2C%20spinach%20%26%20feta%20photorealistic%20food%20photography%204k?nologo=true&private=true&seed=42&width=1024&height=1024&model=flux"
        );
    }

    #[tokio::test]
    async fn without_credentials_never_calls_primary() {
        let fake = Arc::new(FakeProvider::new().without_credentials());
        let resolver = ImageResolver::new(Some(fake.clone()), 2, Duration::from_millis(1));

        let url = resolver.resolve("crispy tofu").await.unwrap();

        assert_eq!(fake.image_calls(), 0);
        assert!(url.starts_with(FALLBACK_ENDPOINT));
        assert!(url.contains("crispy%20tofu"));
        assert!(seed_of(&url) < FALLBACK_SEED_RANGE);
    }

    #[tokio::test]
    async fn fallback_only_resolver_returns_url() {
        let url = ImageResolver::fallback_only().resolve("soup").await.unwrap();
        assert!(url.contains("/prompt/soup%20photorealistic"));
    }

    #[tokio::test]
    async fn primary_failing_every_attempt_still_yields_fallback() {
        let fake = Arc::new(FakeProvider::new().with_image_behaviour(FakeImageBehaviour::AlwaysFail));
        let resolver = ImageResolver::new(Some(fake.clone()), 2, Duration::from_millis(1));

        let url = resolver.resolve("tacos").await;

        assert_eq!(fake.image_calls(), 2);
        assert!(url.unwrap().starts_with(FALLBACK_ENDPOINT));
    }

    #[tokio::test]
    async fn retry_recovers_and_returns_data_uri() {
        let image = ImageData {
            bytes: b"png".to_vec(),
            mime_type: "image/png".to_string(),
        };
        let fake = Arc::new(
            FakeProvider::new().with_image_behaviour(FakeImageBehaviour::FailTimes(1, image)),
        );
        let resolver = ImageResolver::new(Some(fake.clone()), 2, Duration::from_millis(1));

        let uri = resolver.resolve("ramen").await.unwrap();

        assert_eq!(fake.image_calls(), 2);
        assert_eq!(uri, "data:image/png;base64,cG5n");
    }

    #[tokio::test]
    async fn first_success_stops_retrying() {
        let image = ImageData {
            bytes: vec![7],
            mime_type: "image/webp".to_string(),
        };
        let fake = Arc::new(FakeProvider::new().with_image_behaviour(FakeImageBehaviour::Succeed(image)));
        let resolver = ImageResolver::new(Some(fake.clone()), 2, Duration::from_millis(1));

        let uri = resolver.resolve("salad").await.unwrap();

        assert_eq!(fake.image_calls(), 1);
        assert!(uri.starts_with("data:image/webp;base64,"));
    }
}
