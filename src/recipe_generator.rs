use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api_connection::endpoints::{JsonSchema, SchemaType};
use crate::api_connection::{ApiConnectionError, TextGenerator};
use crate::i18n;
use crate::preferences::{Language, Preferences};
use crate::recipe::{parse_recipe_batch, Recipe};

/// Why a generation request produced no recipes.
#[derive(Debug)]
pub enum GenerationFailure {
    /// No API credentials are configured. The message is shown as is.
    Configuration(String),
    /// The provider call failed, or produced nothing usable.
    Generation(String),
    /// The reply did not match the declared schema.
    MalformedResponse(String),
}

impl GenerationFailure {
    /// Message for the preference screen banner. Only configuration problems
    /// get a specific message; everything else gets the generic retry hint.
    pub fn user_message(&self, language: Language) -> String {
        match self {
            GenerationFailure::Configuration(message) => message.clone(),
            GenerationFailure::Generation(_) | GenerationFailure::MalformedResponse(_) => {
                i18n::strings(language).generic_error.to_string()
            }
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerationFailure::Configuration(_))
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::Configuration(message) => write!(f, "Configuration error: {}", message),
            GenerationFailure::Generation(message) => write!(f, "Generation error: {}", message),
            GenerationFailure::MalformedResponse(message) => {
                write!(f, "Malformed model response: {}", message)
            }
        }
    }
}

impl Error for GenerationFailure {}

impl From<ApiConnectionError> for GenerationFailure {
    fn from(err: ApiConnectionError) -> Self {
        match err {
            ApiConnectionError::MissingApiKey(checked) => GenerationFailure::Configuration(format!(
                "API key is missing. Set one of {} in the environment or in a .env file.",
                checked
            )),
            ApiConnectionError::SerializationError(err) => {
                GenerationFailure::MalformedResponse(err.to_string())
            }
            other => GenerationFailure::Generation(other.to_string()),
        }
    }
}

pub const IMAGE_PROMPT_EXAMPLE: &str =
    "overhead shot of golden crispy tofu with broccoli, photorealistic food photography, 4k";

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Fr => "Generate all text, titles, descriptions, and steps in French.",
        Language::En => "Generate all text in English.",
    }
}

/// Natural-language instruction embedding every preference field.
pub fn build_recipe_prompt(prefs: &Preferences) -> String {
    let tools = if prefs.tools().is_empty() {
        "none specified".to_string()
    } else {
        prefs.tools().join(", ")
    };

    format!(
        "{language}
Create {count} distinct recipes.
User Name: {name}.
Available Ingredients (must prioritize these): {ingredients}.
Available Tools: {tools}.
Dietary Restriction: {diet}.
Time Limit: {time} minutes.
Portions: {portions}.

CRITICAL: Provide an estimated price range for the ingredients needed to make this dish in France (EUR), based on average prices at supermarkets like Carrefour, Lidl, or Auchan. Format as \"10-15 €\".

Return a list of detailed recipes.
Include a specific, descriptive 'imagePrompt' that describes the visual appearance of the final dish for an AI image generator (e.g., \"{example}\").",
        language = language_instruction(prefs.language()),
        count = prefs.number_of_dishes(),
        name = prefs.name(),
        ingredients = prefs.ingredients().join(", "),
        tools = tools,
        diet = prefs.diet(),
        time = prefs.time_available(),
        portions = prefs.portions(),
        example = IMAGE_PROMPT_EXAMPLE,
    )
}

pub const REQUIRED_RECIPE_FIELDS: &[&str] = &[
    "id",
    "title",
    "description",
    "timeToCook",
    "calories",
    "protein",
    "steps",
    "imagePrompt",
    "priceEstimate",
];

/// Output schema: an array of recipe objects.
pub fn recipe_list_schema() -> JsonSchema {
    let string = || JsonSchema::of(SchemaType::String);
    let number = || JsonSchema::of(SchemaType::Number);
    let strings = || JsonSchema::array_of(JsonSchema::of(SchemaType::String));

    let mut properties = BTreeMap::new();
    properties.insert("id".to_string(), string());
    properties.insert("title".to_string(), string());
    properties.insert("description".to_string(), string());
    properties.insert(
        "timeToCook".to_string(),
        number().described("Total time in minutes"),
    );
    properties.insert("calories".to_string(), number());
    properties.insert("protein".to_string(), number().described("In grams"));
    properties.insert("carbs".to_string(), number().described("In grams"));
    properties.insert("fats".to_string(), number().described("In grams"));
    properties.insert("ingredients".to_string(), strings());
    properties.insert("toolsNeeded".to_string(), strings());
    properties.insert("steps".to_string(), strings());
    properties.insert("imagePrompt".to_string(), string());
    properties.insert(
        "priceEstimate".to_string(),
        string().described("Estimated price range in Euros (e.g. 12-15 €)"),
    );

    JsonSchema::array_of(JsonSchema::object(properties, REQUIRED_RECIPE_FIELDS))
}

/// Turns preferences into recipes with exactly one provider call.
#[derive(Debug, Clone)]
pub struct RecipeGenerator {
    provider: Arc<dyn TextGenerator>,
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self { provider }
    }

    /// `Ok(vec![])` when the provider answered without any text.
    pub async fn generate(&self, prefs: &Preferences) -> Result<Vec<Recipe>, GenerationFailure> {
        let prompt = build_recipe_prompt(prefs);
        info!(
            provider = self.provider.provider_name(),
            dishes = prefs.number_of_dishes(),
            "Requesting recipes"
        );
        debug!("Recipe prompt:\n{}", prompt);

        let reply = match self.provider.generate_json(&prompt, &recipe_list_schema()).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("Recipe generation failed: {}", err);
                return Err(err.into());
            }
        };

        let Some(content) = reply else {
            info!("Provider returned no text");
            return Ok(Vec::new());
        };
        debug!("Raw model reply:\n{}", content);

        let recipes = parse_recipe_batch(&content).map_err(|err| {
            error!("Could not parse model reply: {}", err);
            GenerationFailure::MalformedResponse(err.to_string())
        })?;
        info!(count = recipes.len(), "Recipes generated");
        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::FakeProvider;
    use crate::preferences::PreferenceForm;
    use crate::recipe::tests::recipe_json;
    use serde_json::json;

    fn prefs(language: Language) -> Preferences {
        let mut form = PreferenceForm::new("Ana", language);
        form.add_ingredient("Eggs");
        form.add_ingredient("Spinach");
        form.toggle_tool("Stove").unwrap();
        form.set_diet("Vegetarian").unwrap();
        form.set_time_available(20).unwrap();
        form.set_number_of_dishes(1).unwrap();
        form.submit().unwrap()
    }

    #[test]
    fn prompt_embeds_every_preference() {
        let prompt = build_recipe_prompt(&prefs(Language::En));
        assert!(prompt.starts_with("Generate all text in English."));
        assert!(prompt.contains("Create 1 distinct recipes."));
        assert!(prompt.contains("User Name: Ana."));
        assert!(prompt.contains("Available Ingredients (must prioritize these): Eggs, Spinach."));
        assert!(prompt.contains("Available Tools: Stove."));
        assert!(prompt.contains("Dietary Restriction: Vegetarian."));
        assert!(prompt.contains("Time Limit: 20 minutes."));
        assert!(prompt.contains("Portions: 2."));
        assert!(prompt.contains("Carrefour, Lidl, or Auchan"));
        assert!(prompt.contains("\"10-15 €\""));
        assert!(prompt.contains("'imagePrompt'"));
    }

    #[test]
    fn french_prompt_asks_for_french_text() {
        let prompt = build_recipe_prompt(&prefs(Language::Fr));
        assert!(prompt.starts_with("Generate all text, titles, descriptions, and steps in French."));
    }

    #[test]
    fn schema_declares_required_and_optional_fields() {
        let schema = recipe_list_schema();
        assert_eq!(schema.schema_type, SchemaType::Array);
        let item = schema.items.as_deref().unwrap();
        let required = item.required.as_ref().unwrap();
        assert_eq!(required.len(), 9);
        for optional in ["carbs", "fats", "ingredients", "toolsNeeded"] {
            assert!(!required.iter().any(|f| f == optional));
            assert!(item.properties.as_ref().unwrap().contains_key(optional));
        }
        let steps = &item.properties.as_ref().unwrap()["steps"];
        assert_eq!(steps.schema_type, SchemaType::Array);
    }

    #[tokio::test]
    async fn one_call_yields_parsed_recipes() {
        let fake = Arc::new(
            FakeProvider::new()
                .with_default_response(&json!([recipe_json("r1", "Spinach Omelette")]).to_string()),
        );
        let generator = RecipeGenerator::new(fake.clone());
        let recipes = generator.generate(&prefs(Language::En)).await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Spinach Omelette");
        assert_eq!(fake.text_calls(), 1);
    }

    #[tokio::test]
    async fn empty_reply_is_empty_list() {
        let generator = RecipeGenerator::new(Arc::new(FakeProvider::new()));
        assert!(generator.generate(&prefs(Language::En)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_is_configuration_error() {
        let generator = RecipeGenerator::new(Arc::new(FakeProvider::new().without_credentials()));
        let err = generator.generate(&prefs(Language::En)).await.unwrap_err();
        assert!(err.is_configuration());
        let message = err.user_message(Language::En);
        assert!(message.contains("API key is missing"));
        assert_ne!(message, i18n::strings(Language::En).generic_error);
    }

    #[tokio::test]
    async fn provider_failure_is_generation_error_without_retry() {
        let fake = Arc::new(
            FakeProvider::new().with_text_error(reqwest::StatusCode::SERVICE_UNAVAILABLE),
        );
        let generator = RecipeGenerator::new(fake.clone());
        let err = generator.generate(&prefs(Language::En)).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::Generation(_)));
        assert_eq!(err.user_message(Language::En), i18n::strings(Language::En).generic_error);
        assert_eq!(fake.text_calls(), 1);
    }

    #[tokio::test]
    async fn unparseable_reply_is_malformed_response() {
        let generator = RecipeGenerator::new(Arc::new(
            FakeProvider::new().with_default_response("here are some recipes!"),
        ));
        let err = generator.generate(&prefs(Language::Fr)).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedResponse(_)));
        assert_eq!(err.user_message(Language::Fr), i18n::strings(Language::Fr).generic_error);
    }
}
