use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub const DIET_OPTIONS: &[&str] = &[
    "Anything",
    "High Protein",
    "Vegetarian",
    "Vegan",
    "Keto",
    "Paleo",
    "Low Carb",
    "Gluten Free",
];

pub const TOOL_OPTIONS: &[&str] = &[
    "Stove",
    "Oven",
    "Air Fryer",
    "Microwave",
    "Blender",
    "Slow Cooker",
    "Grill",
    "Toaster",
];

/// Quick-add suggestions offered by the preference form.
pub const COMMON_INGREDIENTS: &[&str] = &[
    "Eggs", "Chicken", "Rice", "Pasta", "Tomatoes", "Onions", "Milk", "Cheese", "Potatoes",
    "Spinach", "Bread", "Butter", "Garlic", "Olive Oil",
];

pub const MIN_TIME_MINUTES: u32 = 10;
pub const MAX_TIME_MINUTES: u32 = 120;
pub const TIME_STEP_MINUTES: u32 = 5;
pub const MAX_DISHES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Fr,
            Language::Fr => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(PreferenceError::UnknownLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    EmptyName,
    NoIngredients,
    UnknownTool(String),
    UnknownDiet(String),
    UnknownLanguage(String),
    TimeOutOfRange(u32),
    TimeOffStep(u32),
    NoPortions,
    DishCountOutOfRange(u32),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::EmptyName => write!(f, "Name must not be empty"),
            PreferenceError::NoIngredients => write!(f, "Add at least one ingredient"),
            PreferenceError::UnknownTool(tool) => {
                write!(f, "Unknown tool '{}' (expected one of: {})", tool, TOOL_OPTIONS.join(", "))
            }
            PreferenceError::UnknownDiet(diet) => {
                write!(f, "Unknown diet '{}' (expected one of: {})", diet, DIET_OPTIONS.join(", "))
            }
            PreferenceError::UnknownLanguage(code) => {
                write!(f, "Unknown language '{}' (expected en or fr)", code)
            }
            PreferenceError::TimeOutOfRange(minutes) => write!(
                f,
                "Time available must be between {} and {} minutes, got {}",
                MIN_TIME_MINUTES, MAX_TIME_MINUTES, minutes
            ),
            PreferenceError::TimeOffStep(minutes) => write!(
                f,
                "Time available must be a multiple of {} minutes, got {}",
                TIME_STEP_MINUTES, minutes
            ),
            PreferenceError::NoPortions => write!(f, "Portions must be at least 1"),
            PreferenceError::DishCountOutOfRange(count) => write!(
                f,
                "Number of dishes must be between 1 and {}, got {}",
                MAX_DISHES, count
            ),
        }
    }
}

impl Error for PreferenceError {}

/// A submitted, validated request. Only [`PreferenceForm::submit`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    name: String,
    ingredients: Vec<String>,
    tools: Vec<String>,
    diet: String,
    time_available: u32,
    portions: u32,
    number_of_dishes: u32,
    language: Language,
}

impl Preferences {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn diet(&self) -> &str {
        &self.diet
    }

    pub fn time_available(&self) -> u32 {
        self.time_available
    }

    pub fn portions(&self) -> u32 {
        self.portions
    }

    pub fn number_of_dishes(&self) -> u32 {
        self.number_of_dishes
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Reopens the form pre-filled with these values.
    pub fn to_form(&self) -> PreferenceForm {
        PreferenceForm {
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            tools: self.tools.clone(),
            diet: self.diet.clone(),
            time_available: self.time_available,
            portions: self.portions,
            number_of_dishes: self.number_of_dishes,
            language: self.language,
        }
    }
}

/// Mutable collector behind the preference screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceForm {
    name: String,
    ingredients: Vec<String>,
    tools: Vec<String>,
    diet: String,
    time_available: u32,
    portions: u32,
    number_of_dishes: u32,
    language: Language,
}

impl PreferenceForm {
    pub fn new(name: &str, language: Language) -> Self {
        Self {
            name: name.trim().to_string(),
            ingredients: Vec::new(),
            tools: Vec::new(),
            diet: DIET_OPTIONS[0].to_string(),
            time_available: 30,
            portions: 2,
            number_of_dishes: 3,
            language,
        }
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn diet(&self) -> &str {
        &self.diet
    }

    pub fn time_available(&self) -> u32 {
        self.time_available
    }

    pub fn portions(&self) -> u32 {
        self.portions
    }

    pub fn number_of_dishes(&self) -> u32 {
        self.number_of_dishes
    }

    /// Adds a trimmed ingredient; blanks and duplicates are ignored.
    /// Returns whether the list changed.
    pub fn add_ingredient(&mut self, ingredient: &str) -> bool {
        let trimmed = ingredient.trim();
        if trimmed.is_empty() || self.ingredients.iter().any(|i| i == trimmed) {
            return false;
        }
        self.ingredients.push(trimmed.to_string());
        true
    }

    pub fn remove_ingredient(&mut self, ingredient: &str) {
        let trimmed = ingredient.trim();
        self.ingredients.retain(|i| i != trimmed);
    }

    pub fn toggle_ingredient(&mut self, ingredient: &str) {
        if self.ingredients.iter().any(|i| i == ingredient.trim()) {
            self.remove_ingredient(ingredient);
        } else {
            self.add_ingredient(ingredient);
        }
    }

    /// Toggles a tool from [`TOOL_OPTIONS`], matched case-insensitively.
    pub fn toggle_tool(&mut self, tool: &str) -> Result<(), PreferenceError> {
        let canonical = canonical_option(TOOL_OPTIONS, tool)
            .ok_or_else(|| PreferenceError::UnknownTool(tool.trim().to_string()))?;
        if let Some(pos) = self.tools.iter().position(|t| t == canonical) {
            self.tools.remove(pos);
        } else {
            self.tools.push(canonical.to_string());
        }
        Ok(())
    }

    pub fn set_diet(&mut self, diet: &str) -> Result<(), PreferenceError> {
        let canonical = canonical_option(DIET_OPTIONS, diet)
            .ok_or_else(|| PreferenceError::UnknownDiet(diet.trim().to_string()))?;
        self.diet = canonical.to_string();
        Ok(())
    }

    pub fn set_time_available(&mut self, minutes: u32) -> Result<(), PreferenceError> {
        if !(MIN_TIME_MINUTES..=MAX_TIME_MINUTES).contains(&minutes) {
            return Err(PreferenceError::TimeOutOfRange(minutes));
        }
        if minutes % TIME_STEP_MINUTES != 0 {
            return Err(PreferenceError::TimeOffStep(minutes));
        }
        self.time_available = minutes;
        Ok(())
    }

    pub fn set_portions(&mut self, portions: u32) -> Result<(), PreferenceError> {
        if portions == 0 {
            return Err(PreferenceError::NoPortions);
        }
        self.portions = portions;
        Ok(())
    }

    pub fn increment_portions(&mut self) {
        self.portions += 1;
    }

    /// Never goes below one portion.
    pub fn decrement_portions(&mut self) {
        self.portions = self.portions.saturating_sub(1).max(1);
    }

    pub fn set_number_of_dishes(&mut self, count: u32) -> Result<(), PreferenceError> {
        if !(1..=MAX_DISHES).contains(&count) {
            return Err(PreferenceError::DishCountOutOfRange(count));
        }
        self.number_of_dishes = count;
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Freezes the form into [`Preferences`].
    pub fn submit(&self) -> Result<Preferences, PreferenceError> {
        if self.name.is_empty() {
            return Err(PreferenceError::EmptyName);
        }
        if self.ingredients.is_empty() {
            return Err(PreferenceError::NoIngredients);
        }
        Ok(Preferences {
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            tools: self.tools.clone(),
            diet: self.diet.clone(),
            time_available: self.time_available,
            portions: self.portions,
            number_of_dishes: self.number_of_dishes,
            language: self.language,
        })
    }
}

fn canonical_option(options: &'static [&'static str], value: &str) -> Option<&'static str> {
    let wanted = value.trim();
    options
        .iter()
        .copied()
        .find(|option| option.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_initial_state() {
        let form = PreferenceForm::new("  Ana ", Language::En);
        assert_eq!(form.submit(), Err(PreferenceError::NoIngredients));

        let mut form = form;
        form.add_ingredient("Eggs");
        let prefs = form.submit().unwrap();
        assert_eq!(prefs.name(), "Ana");
        assert_eq!(prefs.diet(), "Anything");
        assert_eq!(prefs.time_available(), 30);
        assert_eq!(prefs.portions(), 2);
        assert_eq!(prefs.number_of_dishes(), 3);
        assert!(prefs.tools().is_empty());
    }

    #[test]
    fn ingredients_are_trimmed_distinct_and_ordered() {
        let mut form = PreferenceForm::new("Ana", Language::En);
        assert!(form.add_ingredient(" Spinach "));
        assert!(form.add_ingredient("Eggs"));
        assert!(!form.add_ingredient("Spinach"));
        assert!(!form.add_ingredient("   "));
        assert_eq!(form.ingredients(), ["Spinach", "Eggs"]);

        form.toggle_ingredient("Spinach");
        form.toggle_ingredient("Rice");
        assert_eq!(form.ingredients(), ["Eggs", "Rice"]);
    }

    #[test]
    fn tools_must_come_from_catalog() {
        let mut form = PreferenceForm::new("Ana", Language::En);
        form.toggle_tool("air fryer").unwrap();
        form.toggle_tool("Stove").unwrap();
        assert_eq!(form.tools(), ["Air Fryer", "Stove"]);
        form.toggle_tool("AIR FRYER").unwrap();
        assert_eq!(form.tools(), ["Stove"]);
        assert_eq!(
            form.toggle_tool("Sous Vide"),
            Err(PreferenceError::UnknownTool("Sous Vide".to_string()))
        );
    }

    #[test]
    fn numeric_bounds_are_enforced() {
        let mut form = PreferenceForm::new("Ana", Language::En);
        assert_eq!(form.set_time_available(5), Err(PreferenceError::TimeOutOfRange(5)));
        assert_eq!(form.set_time_available(125), Err(PreferenceError::TimeOutOfRange(125)));
        assert!(form.set_time_available(10).is_ok());
        assert!(form.set_time_available(120).is_ok());
        assert_eq!(form.set_time_available(37), Err(PreferenceError::TimeOffStep(37)));
        assert_eq!(form.time_available(), 120);
        assert!(form.set_time_available(45).is_ok());

        assert_eq!(form.set_portions(0), Err(PreferenceError::NoPortions));
        form.set_portions(1).unwrap();
        form.decrement_portions();
        form.add_ingredient("Eggs");
        assert_eq!(form.submit().unwrap().portions(), 1);

        assert_eq!(
            form.set_number_of_dishes(0),
            Err(PreferenceError::DishCountOutOfRange(0))
        );
        assert_eq!(
            form.set_number_of_dishes(7),
            Err(PreferenceError::DishCountOutOfRange(7))
        );
        assert!(form.set_number_of_dishes(6).is_ok());
    }

    #[test]
    fn diet_is_canonicalized() {
        let mut form = PreferenceForm::new("Ana", Language::Fr);
        form.set_diet("vegetarian").unwrap();
        form.add_ingredient("Eggs");
        let prefs = form.submit().unwrap();
        assert_eq!(prefs.diet(), "Vegetarian");
        assert_eq!(prefs.language(), Language::Fr);
        assert!(form.set_diet("Carnivore").is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut form = PreferenceForm::new("   ", Language::En);
        form.add_ingredient("Eggs");
        assert_eq!(form.submit(), Err(PreferenceError::EmptyName));
    }

    #[test]
    fn language_parses_and_toggles() {
        assert_eq!("FR".parse::<Language>().unwrap(), Language::Fr);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::En.toggled(), Language::Fr);
        assert_eq!(Language::Fr.toggled().code(), "en");
    }

    #[test]
    fn submitted_preferences_round_trip_into_form() {
        let mut form = PreferenceForm::new("Ana", Language::En);
        form.add_ingredient("Eggs");
        form.toggle_tool("Oven").unwrap();
        let prefs = form.submit().unwrap();
        assert_eq!(prefs.to_form(), form);
    }
}
