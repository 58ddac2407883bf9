use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::preferences::{Language, PreferenceError, PreferenceForm};
use crate::view_state::Screen;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe suggestions from what is in your fridge", long_about = None)]
pub struct Cli {
    /// Directory for theme, language and favorites
    #[arg(long, global = true, env = "NOURISH_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Start at the name prompt instead of the splash screen
    #[arg(long, global = true)]
    pub skip_intro: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session (default)
    Run,
    /// Generate recipes once and print them
    Generate(GenerateArgs),
    /// List saved favorites
    Favorites,
    /// Show or toggle theme and language
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub name: String,

    /// Repeat for each ingredient
    #[arg(short, long = "ingredient", required = true)]
    pub ingredients: Vec<String>,

    #[arg(short, long = "tool")]
    pub tools: Vec<String>,

    #[arg(long, default_value = "Anything")]
    pub diet: String,

    /// Minutes available
    #[arg(long, default_value_t = 30)]
    pub time: u32,

    #[arg(long, default_value_t = 2)]
    pub portions: u32,

    #[arg(long, default_value_t = 3)]
    pub dishes: u32,

    /// en or fr; defaults to the stored language
    #[arg(long)]
    pub language: Option<Language>,

    /// Wait for every image before printing
    #[arg(long)]
    pub wait_images: bool,
}

impl GenerateArgs {
    pub fn to_form(&self, stored_language: Language) -> Result<PreferenceForm, PreferenceError> {
        let mut form = PreferenceForm::new(&self.name, self.language.unwrap_or(stored_language));
        for ingredient in &self.ingredients {
            form.add_ingredient(ingredient);
        }
        for tool in &self.tools {
            form.toggle_tool(tool)?;
        }
        form.set_diet(&self.diet)?;
        form.set_time_available(self.time)?;
        form.set_portions(self.portions)?;
        form.set_number_of_dishes(self.dishes)?;
        Ok(form)
    }
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[arg(long)]
    pub toggle_theme: bool,

    #[arg(long)]
    pub toggle_language: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// One line typed into the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Open(usize),
    Favorite(usize),
    /// Bare `fav` on the detail screen.
    FavoriteSelected,
    Favorites,
    Results,
    Back,
    Modify,
    Language,
    Theme,
    Quit,
    Help,
    AddIngredient(String),
    RemoveIngredient(String),
    Tool(String),
    Diet(String),
    Time(u32),
    Portions(u32),
    MorePortions,
    FewerPortions,
    Dishes(u32),
    Submit,
    /// Anything else; on the name screen this is the name.
    Text(String),
}

impl Input {
    /// On the name screen every line except `quit` is a name.
    pub fn parse_on(screen: Screen, line: &str) -> Self {
        match (screen, Self::parse(line)) {
            (_, Input::Quit) => Input::Quit,
            (Screen::NameInput, _) => Input::Text(line.trim().to_string()),
            (_, input) => input,
        }
    }

    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let number = rest.parse::<u32>().ok();
        let text = || Input::Text(line.to_string());

        match (word.to_ascii_lowercase().as_str(), rest.is_empty()) {
            ("open", false) => rest.parse().map_or_else(|_| text(), Input::Open),
            ("fav", false) => rest.parse().map_or_else(|_| text(), Input::Favorite),
            ("fav", true) => Input::FavoriteSelected,
            ("favorites", true) | ("favs", true) => Input::Favorites,
            ("results", true) => Input::Results,
            ("back", true) => Input::Back,
            ("modify", true) => Input::Modify,
            ("lang", true) => Input::Language,
            ("theme", true) => Input::Theme,
            ("quit", true) | ("exit", true) => Input::Quit,
            ("help", true) | ("?", true) => Input::Help,
            ("add", false) => Input::AddIngredient(rest.to_string()),
            ("remove", false) => Input::RemoveIngredient(rest.to_string()),
            ("tool", false) => Input::Tool(rest.to_string()),
            ("diet", false) => Input::Diet(rest.to_string()),
            ("time", false) => number.map_or_else(text, Input::Time),
            ("portions", false) => match rest {
                "+" => Input::MorePortions,
                "-" => Input::FewerPortions,
                _ => number.map_or_else(text, Input::Portions),
            },
            ("dishes", false) => number.map_or_else(text, Input::Dishes),
            ("go", true) | ("generate", true) => Input::Submit,
            _ => Input::Text(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Name screen:     type your name
Preferences:     add <ingredient> | remove <ingredient> | tool <tool> | diet <diet>
                 time <minutes> | portions <n|+|-> | dishes <n> | go
Lists:           open <n> | fav <n> | favorites | results | modify
Recipe:          fav
Anywhere:        back | lang | theme | help | quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("open 2"), Input::Open(2));
        assert_eq!(Input::parse(" FAV 1 "), Input::Favorite(1));
        assert_eq!(Input::parse("add  Goat cheese"), Input::AddIngredient("Goat cheese".into()));
        assert_eq!(Input::parse("time 45"), Input::Time(45));
        assert_eq!(Input::parse("portions +"), Input::MorePortions);
        assert_eq!(Input::parse("portions -"), Input::FewerPortions);
        assert_eq!(Input::parse("portions 4"), Input::Portions(4));
        assert_eq!(Input::parse("go"), Input::Submit);
        assert_eq!(Input::parse("quit"), Input::Quit);
    }

    #[test]
    fn unknown_or_incomplete_lines_are_text() {
        assert_eq!(Input::parse("open"), Input::Text("open".into()));
        assert_eq!(Input::parse("open two"), Input::Text("open two".into()));
        assert_eq!(Input::parse("Ana"), Input::Text("Ana".into()));
        assert_eq!(Input::parse("back please"), Input::Text("back please".into()));
    }

    #[test]
    fn name_screen_takes_command_words_as_names() {
        for name in ["Back", "Theme", "help", "lang"] {
            assert_eq!(Input::parse_on(Screen::NameInput, name), Input::Text(name.into()));
        }
        assert_eq!(Input::parse_on(Screen::NameInput, "quit"), Input::Quit);
        assert_eq!(Input::parse_on(Screen::Results, "back"), Input::Back);
    }

    #[test]
    fn generate_args_build_a_valid_form() {
        let cli = Cli::parse_from([
            "nourish", "generate", "--name", "Ana", "-i", "Eggs", "-i", "Spinach", "--tool", "stove",
            "--time", "20", "--dishes", "1",
        ]);
        let Some(Command::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        let prefs = args.to_form(Language::Fr).unwrap().submit().unwrap();
        assert_eq!(prefs.ingredients(), ["Eggs", "Spinach"]);
        assert_eq!(prefs.number_of_dishes(), 1);
        assert_eq!(prefs.language(), Language::Fr);
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        let cli = Cli::parse_from(["nourish", "generate", "--name", "Ana", "-i", "Eggs", "--time", "500"]);
        let Some(Command::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.to_form(Language::En).is_err());
    }
}
