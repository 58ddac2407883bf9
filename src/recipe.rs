use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use tracing::warn;

/// One generated dish. Only [`parse_recipe_batch`] produces these from model
/// output, and nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Minutes.
    pub time_to_cook: f64,
    pub calories: f64,
    /// Grams, like `carbs` and `fats`.
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tools_needed: Vec<String>,
    pub steps: Vec<String>,
    pub image_prompt: String,
    /// "low-high currency", e.g. `10-15 €`.
    pub price_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeRejection {
    EmptyField(&'static str),
    InvalidNumber(&'static str),
}

impl fmt::Display for RecipeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeRejection::EmptyField(field) => write!(f, "field '{}' is empty", field),
            RecipeRejection::InvalidNumber(field) => {
                write!(f, "field '{}' is negative or not finite", field)
            }
        }
    }
}

#[derive(Debug)]
pub enum RecipeParseError {
    /// Not JSON, or JSON that does not match the declared schema.
    InvalidJson(serde_json::Error),
    /// Every record was rejected by validation.
    NoValidRecipes { rejected: usize },
}

impl fmt::Display for RecipeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeParseError::InvalidJson(err) => {
                write!(f, "Model reply does not match the recipe schema: {}", err)
            }
            RecipeParseError::NoValidRecipes { rejected } => write!(
                f,
                "All {} recipes in the model reply were incomplete",
                rejected
            ),
        }
    }
}

impl Error for RecipeParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecipeParseError::InvalidJson(err) => Some(err),
            RecipeParseError::NoValidRecipes { .. } => None,
        }
    }
}

impl From<serde_json::Error> for RecipeParseError {
    fn from(err: serde_json::Error) -> Self {
        RecipeParseError::InvalidJson(err)
    }
}

impl Recipe {
    /// Trims text fields and drops blank list entries.
    fn normalized(mut self) -> Self {
        fn clean(items: Vec<String>) -> Vec<String> {
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }

        self.id = self.id.trim().to_string();
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.image_prompt = self.image_prompt.trim().to_string();
        self.price_estimate = self.price_estimate.trim().to_string();
        self.ingredients = clean(self.ingredients);
        self.tools_needed = clean(self.tools_needed);
        self.steps = clean(self.steps);
        self
    }

    /// Checks the fields every rendered recipe relies on.
    pub fn validate(&self) -> Result<(), RecipeRejection> {
        let text_fields = [
            ("title", &self.title),
            ("description", &self.description),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(RecipeRejection::EmptyField(name));
            }
        }
        if self.steps.is_empty() {
            return Err(RecipeRejection::EmptyField("steps"));
        }
        if self.ingredients.is_empty() {
            return Err(RecipeRejection::EmptyField("ingredients"));
        }

        let numbers = [
            ("timeToCook", self.time_to_cook),
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
        ];
        for (name, value) in numbers {
            if !value.is_finite() || value < 0.0 {
                return Err(RecipeRejection::InvalidNumber(name));
            }
        }
        Ok(())
    }
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    // Drop a language tag such as `json` on the opening fence line.
    let inner = match inner.find('\n') {
        Some(newline)
            if inner[..newline]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric()) =>
        {
            &inner[newline + 1..]
        }
        _ => inner.strip_prefix("json").unwrap_or(inner),
    };
    inner.trim()
}

/// Strict parse of a model reply into displayable recipes.
///
/// The reply must be a JSON array matching the recipe schema; a type mismatch
/// or missing required field fails the whole batch. Records that parse but fail
/// [`Recipe::validate`] are dropped. Missing or repeated ids are rewritten so
/// ids are unique within the batch.
pub fn parse_recipe_batch(content: &str) -> Result<Vec<Recipe>, RecipeParseError> {
    let raw: Vec<Recipe> = serde_json::from_str(strip_code_fences(content))?;
    let total = raw.len();

    let mut seen_ids = HashSet::new();
    let mut recipes = Vec::with_capacity(total);
    for (index, recipe) in raw.into_iter().enumerate() {
        let mut recipe = recipe.normalized();
        if let Err(rejection) = recipe.validate() {
            warn!(
                "Dropping recipe #{} ('{}') from model reply: {}",
                index + 1,
                recipe.title,
                rejection
            );
            continue;
        }
        if recipe.id.is_empty() {
            recipe.id = format!("recipe-{}", index + 1);
        }
        if !seen_ids.insert(recipe.id.clone()) {
            let base = std::mem::take(&mut recipe.id);
            let mut suffix = index + 1;
            loop {
                let candidate = format!("{}-{}", base, suffix);
                if seen_ids.insert(candidate.clone()) {
                    recipe.id = candidate;
                    break;
                }
                suffix += 1;
            }
        }
        recipes.push(recipe);
    }

    if recipes.is_empty() && total > 0 {
        return Err(RecipeParseError::NoValidRecipes { rejected: total });
    }
    Ok(recipes)
}
