//! Ties the services, the view state and local storage together.
//!
//! Every state change is an [`AppEvent`] applied by [`Session`]; background
//! image tasks only ever send events into its queue, so updates are applied
//! one at a time in arrival order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api_connection::{FakeProvider, GeminiProvider, TextGenerator};
use crate::config::{AppConfig, ProviderKind};
use crate::favorites::Favorites;
use crate::i18n::strings;
use crate::image_resolver::ImageResolver;
use crate::preferences::{Language, PreferenceError, PreferenceForm, Preferences};
use crate::recipe::Recipe;
use crate::recipe_generator::{GenerationFailure, RecipeGenerator};
use crate::render;
use crate::store::{LocalPreferenceStore, Theme};
use crate::view_state::{AppEvent, Screen, ViewState};

pub const NO_RECIPES_MESSAGE: &str = "No recipes generated. Please try different ingredients.";

/// The two request components, built once per process.
#[derive(Debug, Clone)]
pub struct Services {
    pub generator: RecipeGenerator,
    pub images: Arc<ImageResolver>,
}

impl Services {
    pub fn new(text: Arc<dyn TextGenerator>, images: ImageResolver) -> Self {
        Self {
            generator: RecipeGenerator::new(text),
            images: Arc::new(images),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.provider {
            ProviderKind::Gemini => {
                let gemini = Arc::new(GeminiProvider::from_config(config));
                if !config.has_credentials() {
                    warn!(
                        "No API key found (checked {}); recipe generation will fail",
                        AppConfig::API_KEY_VARS.join(", ")
                    );
                }
                Self::new(gemini.clone(), ImageResolver::from_config(gemini, config))
            }
            ProviderKind::Fake => {
                info!("Using offline fake provider");
                let fake = Arc::new(FakeProvider::offline());
                Self::new(fake.clone(), ImageResolver::from_config(fake, config))
            }
        }
    }
}

pub struct Session {
    services: Services,
    store: LocalPreferenceStore,
    view: ViewState,
    favorites: Favorites,
    language: Language,
    theme: Theme,
    draft: Option<PreferenceForm>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.view.screen())
            .field("language", &self.language)
            .field("theme", &self.theme)
            .field("favorites", &self.favorites.len())
            .finish()
    }
}

impl Session {
    /// Reads theme, language and favorites from `store`. With `skip_intro`
    /// the session opens on the name screen.
    pub fn new(services: Services, store: LocalPreferenceStore, skip_intro: bool) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let favorites = Favorites::from_recipes(store.load_favorites());
        let language = store.load_language();
        let theme = store.load_theme();
        debug!(?language, ?theme, favorites = favorites.len(), "Loaded local preferences");

        let view = if skip_intro {
            ViewState::skipping_intro()
        } else {
            ViewState::new()
        };

        Self {
            services,
            store,
            view,
            favorites,
            language,
            theme,
            draft: None,
            events_tx,
            events_rx,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn dispatch(&mut self, event: AppEvent) -> bool {
        self.view.apply(event)
    }

    /// Sends `IntroElapsed` after `delay`.
    pub fn start_intro_timer(&self, delay: Duration) {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::IntroElapsed);
        });
    }

    pub fn submit_name(&mut self, name: &str) -> bool {
        self.dispatch(AppEvent::NameSubmitted(name.to_string()))
    }

    /// The form for the preference screen, pre-filled with the last submission.
    pub fn preference_form(&self) -> PreferenceForm {
        if let Some(draft) = &self.draft {
            return draft.clone();
        }
        match self.view.last_preferences() {
            Some(prefs) => {
                let mut form = prefs.to_form();
                form.set_language(self.language);
                form
            }
            None => PreferenceForm::new(self.view.user_name(), self.language),
        }
    }

    /// The form being edited on the preference screen.
    pub fn draft_mut(&mut self) -> &mut PreferenceForm {
        let form = self.preference_form();
        self.draft.get_or_insert(form)
    }

    /// Submits the draft form. Form errors leave the screen unchanged.
    pub async fn submit_draft(&mut self) -> Result<Result<usize, GenerationFailure>, PreferenceError> {
        let mut form = self.preference_form();
        form.set_language(self.language);
        let prefs = form.submit()?;
        self.draft = None;
        Ok(self.submit_preferences(prefs).await)
    }

    /// Runs one generation. On success the results screen is shown at once
    /// and one image task per recipe is started; on failure the view returns
    /// to the form with the banner message set.
    pub async fn submit_preferences(
        &mut self,
        prefs: Preferences,
    ) -> Result<usize, GenerationFailure> {
        if !self.dispatch(AppEvent::PreferencesSubmitted(prefs.clone())) {
            return Err(GenerationFailure::Generation(format!(
                "cannot submit preferences from the {:?} screen",
                self.view.screen()
            )));
        }
        let batch = self.view.batch();

        let outcome = match self.services.generator.generate(&prefs).await {
            Ok(recipes) if recipes.is_empty() => {
                Err(GenerationFailure::Generation(NO_RECIPES_MESSAGE.to_string()))
            }
            other => other,
        };

        match outcome {
            Ok(recipes) => {
                let count = recipes.len();
                self.dispatch(AppEvent::GenerationSucceeded {
                    batch,
                    recipes: recipes.clone(),
                });
                self.spawn_image_tasks(batch, &recipes);
                Ok(count)
            }
            Err(failure) => {
                warn!("{}", failure);
                self.dispatch(AppEvent::GenerationFailed {
                    batch,
                    message: failure.user_message(self.language),
                });
                Err(failure)
            }
        }
    }

    fn spawn_image_tasks(&self, batch: u64, recipes: &[Recipe]) {
        for recipe in recipes {
            let tx = self.events_tx.clone();
            let resolver = Arc::clone(&self.services.images);
            let recipe_id = recipe.id.clone();
            let prompt = if recipe.image_prompt.is_empty() {
                recipe.title.clone()
            } else {
                recipe.image_prompt.clone()
            };

            tokio::spawn(async move {
                let image = resolver.resolve(&prompt).await;
                if tx
                    .send(AppEvent::ImageResolved {
                        batch,
                        recipe_id,
                        image,
                    })
                    .is_err()
                {
                    debug!("Session gone before image arrived");
                }
            });
        }
    }

    /// Applies every event already queued. Returns how many changed state.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.view.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next queued event and applies it.
    pub async fn next_event(&mut self) -> Option<(AppEvent, bool)> {
        let event = self.events_rx.recv().await?;
        let applied = self.view.apply(event.clone());
        Some((event, applied))
    }

    /// Applies events until every current recipe has an image outcome or the
    /// timeout passes. Returns whether all images settled.
    pub async fn wait_for_images(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.view.images_settled() {
            match tokio::time::timeout_at(deadline, self.events_rx.recv()).await {
                Ok(Some(event)) => {
                    self.view.apply(event);
                }
                Ok(None) | Err(_) => break,
            }
        }
        self.view.images_settled()
    }

    /// Recipes listed on the current screen, for index-based selection.
    pub fn visible_recipes(&self) -> &[Recipe] {
        match self.view.screen() {
            Screen::Favorites => self.favorites.recipes(),
            _ => self.view.recipes(),
        }
    }

    pub fn open_recipe(&mut self, recipe: Recipe) -> bool {
        self.dispatch(AppEvent::OpenRecipe(recipe))
    }

    /// Toggles and persists. Returns whether the recipe is now a favorite.
    pub fn toggle_favorite(&mut self, recipe: &Recipe) -> bool {
        let now_favorite = self.favorites.toggle(recipe);
        self.store.save_favorites(self.favorites.recipes());
        now_favorite
    }

    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggled();
        self.store.save_language(self.language);
        self.language
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.store.save_theme(self.theme);
        self.theme
    }

    /// Text for the current screen in the current language.
    pub fn render(&self) -> String {
        let t = strings(self.language);
        match self.view.screen() {
            Screen::Intro => "Nourish\n".to_string(),
            Screen::NameInput => format!("{}\n{}:\n", t.who_cooking, t.enter_name),
            Screen::Preferences => {
                let mut out = String::new();
                if let Some(error) = self.view.error() {
                    out.push_str(&format!("! {}\n\n", error));
                }
                out.push_str(&format!("{}, {}?\n", t.fridge_question, self.view.user_name()));
                out.push_str(&render::preference_form(&self.preference_form(), self.language));
                out
            }
            Screen::Generating => format!("{}\n{}\n", t.generating, t.generating_sub),
            Screen::Results => render::results_screen(&self.view, &self.favorites, self.language),
            Screen::Favorites => {
                render::favorites_screen(&self.view, &self.favorites, self.language)
            }
            Screen::RecipeDetail => match self.view.selected() {
                Some(recipe) => render::detail_screen(
                    recipe,
                    self.view.image_state(&recipe.id),
                    self.favorites.contains(&recipe.id),
                    self.language,
                ),
                None => String::new(),
            },
        }
    }
}
