//! Screen state machine.
//!
//! All transitions go through [`ViewState::apply`]; the session feeds it
//! events one at a time, so no other code mutates screen state.

use std::collections::HashMap;
use tracing::debug;

use crate::preferences::Preferences;
use crate::recipe::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Intro,
    NameInput,
    Preferences,
    Generating,
    Results,
    Favorites,
    RecipeDetail,
}

/// Where a resolved image stands for one recipe id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState<'a> {
    Loading,
    Unavailable,
    Ready(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    IntroElapsed,
    NameSubmitted(String),
    PreferencesSubmitted(Preferences),
    GenerationSucceeded { batch: u64, recipes: Vec<Recipe> },
    GenerationFailed { batch: u64, message: String },
    ImageResolved {
        batch: u64,
        recipe_id: String,
        image: Option<String>,
    },
    ShowResults,
    ShowFavorites,
    OpenRecipe(Recipe),
    Back,
    ModifyPreferences,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    screen: Screen,
    user_name: String,
    recipes: Vec<Recipe>,
    selected: Option<Recipe>,
    detail_origin: Screen,
    images: HashMap<String, Option<String>>,
    loading: bool,
    error: Option<String>,
    last_preferences: Option<Preferences>,
    batch: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Intro,
            user_name: String::new(),
            recipes: Vec::new(),
            selected: None,
            detail_origin: Screen::Results,
            images: HashMap::new(),
            loading: false,
            error: None,
            last_preferences: None,
            batch: 0,
        }
    }

    /// Starts on the name screen, for when the intro was already shown.
    pub fn skipping_intro() -> Self {
        let mut state = Self::new();
        state.apply(AppEvent::IntroElapsed);
        state
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_preferences(&self) -> Option<&Preferences> {
        self.last_preferences.as_ref()
    }

    /// Generation counter; events tagged with an older batch are stale.
    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn image_state(&self, recipe_id: &str) -> ImageState<'_> {
        match self.images.get(recipe_id) {
            None => ImageState::Loading,
            Some(None) => ImageState::Unavailable,
            Some(Some(uri)) => ImageState::Ready(uri),
        }
    }

    /// True once every current recipe has an image outcome.
    pub fn images_settled(&self) -> bool {
        self.recipes.iter().all(|r| self.images.contains_key(&r.id))
    }

    /// Applies one event. Returns false when the event does not apply to the
    /// current screen or is stale; the state is then unchanged.
    pub fn apply(&mut self, event: AppEvent) -> bool {
        let applied = match event {
            AppEvent::IntroElapsed => self.transition_from(&[Screen::Intro], Screen::NameInput),
            AppEvent::NameSubmitted(name) => {
                let name = name.trim();
                if self.screen != Screen::NameInput || name.is_empty() {
                    false
                } else {
                    self.user_name = name.to_string();
                    self.screen = Screen::Preferences;
                    true
                }
            }
            AppEvent::PreferencesSubmitted(prefs) => {
                if self.screen != Screen::Preferences {
                    false
                } else {
                    self.batch += 1;
                    self.loading = true;
                    self.error = None;
                    self.last_preferences = Some(prefs);
                    self.screen = Screen::Generating;
                    true
                }
            }
            AppEvent::GenerationSucceeded { batch, recipes } => {
                if batch != self.batch || !self.loading {
                    false
                } else {
                    self.loading = false;
                    self.recipes = recipes;
                    self.images.clear();
                    self.selected = None;
                    self.screen = Screen::Results;
                    true
                }
            }
            AppEvent::GenerationFailed { batch, message } => {
                if batch != self.batch || !self.loading {
                    false
                } else {
                    self.loading = false;
                    self.recipes.clear();
                    self.images.clear();
                    self.selected = None;
                    self.error = Some(message);
                    self.screen = Screen::Preferences;
                    true
                }
            }
            AppEvent::ImageResolved {
                batch,
                recipe_id,
                image,
            } => {
                if batch != self.batch || !self.recipes.iter().any(|r| r.id == recipe_id) {
                    false
                } else {
                    self.images.insert(recipe_id, image);
                    true
                }
            }
            AppEvent::ShowResults => {
                // Nothing to show until a generation has succeeded.
                if self.recipes.is_empty() {
                    false
                } else {
                    self.transition_from(&[Screen::Favorites, Screen::RecipeDetail], Screen::Results)
                }
            }
            AppEvent::ShowFavorites => {
                if matches!(self.screen, Screen::Intro | Screen::NameInput) {
                    false
                } else {
                    self.screen = Screen::Favorites;
                    true
                }
            }
            AppEvent::OpenRecipe(recipe) => {
                if !matches!(self.screen, Screen::Results | Screen::Favorites) {
                    false
                } else {
                    self.detail_origin = self.screen;
                    self.selected = Some(recipe);
                    self.screen = Screen::RecipeDetail;
                    true
                }
            }
            AppEvent::Back => self.back(),
            AppEvent::ModifyPreferences => {
                if matches!(
                    self.screen,
                    Screen::Intro | Screen::NameInput | Screen::Preferences
                ) {
                    false
                } else {
                    self.restart();
                    true
                }
            }
        };

        if applied {
            debug!(screen = ?self.screen, batch = self.batch, "View state updated");
        }
        applied
    }

    fn transition_from(&mut self, from: &[Screen], to: Screen) -> bool {
        if from.contains(&self.screen) {
            self.screen = to;
            true
        } else {
            false
        }
    }

    fn back(&mut self) -> bool {
        match self.screen {
            Screen::RecipeDetail => {
                self.selected = None;
                self.screen = self.detail_origin;
                true
            }
            Screen::Favorites => {
                if self.recipes.is_empty() && !self.loading {
                    self.screen = Screen::Preferences;
                } else if self.loading {
                    self.screen = Screen::Generating;
                } else {
                    self.screen = Screen::Results;
                }
                true
            }
            _ => false,
        }
    }

    /// Back to the form: drops the current batch so late events are ignored.
    fn restart(&mut self) {
        self.batch += 1;
        self.loading = false;
        self.recipes.clear();
        self.images.clear();
        self.selected = None;
        self.screen = Screen::Preferences;
    }
}
