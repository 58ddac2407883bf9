use anyhow::{bail, Context, Result};
use nourish::cli::{parse_args, Command, GenerateArgs, Input, SettingsArgs, HELP};
use nourish::config::AppConfig;
use nourish::render;
use nourish::session::{Services, Session};
use nourish::store::LocalPreferenceStore;
use nourish::view_state::{AppEvent, Screen};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const IMAGE_WAIT_TIMEOUT: Duration = Duration::from_secs(120);

enum Flow {
    Redraw,
    Message(String),
    Quit,
}

async fn handle_input(session: &mut Session, input: Input) -> Flow {
    let screen = session.view().screen();
    match input {
        Input::Quit => Flow::Quit,
        Input::Help => Flow::Message(HELP.to_string()),
        Input::Language => {
            let language = session.toggle_language();
            info!("Language set to {}", language);
            Flow::Redraw
        }
        Input::Theme => Flow::Message(format!("theme: {}", session.toggle_theme().as_str())),
        Input::Back => redraw_if(session.dispatch(AppEvent::Back)),
        Input::Favorites => redraw_if(session.dispatch(AppEvent::ShowFavorites)),
        Input::Results => redraw_if(session.dispatch(AppEvent::ShowResults)),
        Input::Modify => redraw_if(session.dispatch(AppEvent::ModifyPreferences)),
        Input::Open(index) => match nth_visible(session, index) {
            Some(recipe) => redraw_if(session.open_recipe(recipe)),
            None => Flow::Message(format!("No recipe #{}", index)),
        },
        Input::Favorite(index) => match nth_visible(session, index) {
            Some(recipe) => {
                session.toggle_favorite(&recipe);
                Flow::Redraw
            }
            None => Flow::Message(format!("No recipe #{}", index)),
        },
        Input::FavoriteSelected => match session.view().selected().cloned() {
            Some(recipe) => {
                session.toggle_favorite(&recipe);
                Flow::Redraw
            }
            None => Flow::Message(HELP.to_string()),
        },
        Input::Text(name) if screen == Screen::NameInput => redraw_if(session.submit_name(&name)),
        input if screen == Screen::Preferences => edit_form(session, input).await,
        _ => Flow::Message(HELP.to_string()),
    }
}

async fn edit_form(session: &mut Session, input: Input) -> Flow {
    let form = session.draft_mut();
    let edited = match input {
        Input::AddIngredient(ingredient) => {
            form.add_ingredient(&ingredient);
            Ok(())
        }
        Input::RemoveIngredient(ingredient) => {
            form.remove_ingredient(&ingredient);
            Ok(())
        }
        Input::Tool(tool) => form.toggle_tool(&tool),
        Input::Diet(diet) => form.set_diet(&diet),
        Input::Time(minutes) => form.set_time_available(minutes),
        Input::Portions(portions) => form.set_portions(portions),
        Input::MorePortions => {
            form.increment_portions();
            Ok(())
        }
        Input::FewerPortions => {
            form.decrement_portions();
            Ok(())
        }
        Input::Dishes(count) => form.set_number_of_dishes(count),
        Input::Submit => {
            println!("{}", render_generating(session));
            return match session.submit_draft().await {
                Ok(Ok(count)) => {
                    debug!("Showing {} recipes", count);
                    Flow::Redraw
                }
                // The banner on the form carries the message.
                Ok(Err(_)) => Flow::Redraw,
                Err(err) => Flow::Message(err.to_string()),
            };
        }
        _ => return Flow::Message(HELP.to_string()),
    };
    match edited {
        Ok(()) => Flow::Redraw,
        Err(err) => Flow::Message(err.to_string()),
    }
}

fn render_generating(session: &Session) -> String {
    let t = nourish::i18n::strings(session.language());
    format!("{}\n{}", t.generating, t.generating_sub)
}

fn nth_visible(session: &Session, index: usize) -> Option<nourish::recipe::Recipe> {
    index
        .checked_sub(1)
        .and_then(|i| session.visible_recipes().get(i))
        .cloned()
}

fn redraw_if(applied: bool) -> Flow {
    if applied {
        Flow::Redraw
    } else {
        Flow::Message("Not available on this screen. Type 'help' for commands.".to_string())
    }
}

async fn run_interactive(mut session: Session, config: &AppConfig) -> Result<()> {
    if session.view().screen() == Screen::Intro {
        session.start_intro_timer(config.intro_delay);
    }
    print!("{}", session.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let input = Input::parse_on(session.view().screen(), &line);
                match handle_input(&mut session, input).await {
                    Flow::Quit => break,
                    Flow::Redraw => print!("\n{}", session.render()),
                    Flow::Message(message) => println!("{}", message),
                }
            }
            Some((event, applied)) = session.next_event() => {
                let redraw = applied
                    && match event {
                        AppEvent::IntroElapsed => true,
                        AppEvent::ImageResolved { .. } => matches!(
                            session.view().screen(),
                            Screen::Results | Screen::Favorites | Screen::RecipeDetail
                        ),
                        _ => false,
                    };
                if redraw {
                    print!("\n{}", session.render());
                }
            }
        }
    }
    Ok(())
}

async fn run_generate(mut session: Session, args: GenerateArgs) -> Result<()> {
    let prefs = args
        .to_form(session.language())
        .and_then(|form| form.submit())
        .context("Invalid preferences")?;

    session.submit_name(&args.name);
    if let Err(failure) = session.submit_preferences(prefs).await {
        bail!("{}", failure.user_message(session.language()));
    }

    if args.wait_images {
        if !session.wait_for_images(IMAGE_WAIT_TIMEOUT).await {
            info!("Some images were still loading after {:?}", IMAGE_WAIT_TIMEOUT);
        }
    } else {
        session.pump();
    }
    print!("{}", session.render());
    Ok(())
}

fn run_settings(mut session: Session, args: SettingsArgs, store_persistent: bool) {
    if args.toggle_theme {
        session.toggle_theme();
    }
    if args.toggle_language {
        session.toggle_language();
    }
    println!("theme: {}", session.theme().as_str());
    println!("language: {}", session.language());
    if !store_persistent {
        println!("(local storage unavailable, changes are not saved)");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nourish=info")),
        )
        .init();

    let cli_args = parse_args();
    let mut config = AppConfig::from_env();
    if cli_args.store_dir.is_some() {
        config.store_dir = cli_args.store_dir.clone();
    }
    debug!(provider = ?config.provider, store = ?config.store_dir, "Starting");

    let store = LocalPreferenceStore::open(config.store_dir.clone());
    let store_persistent = store.is_persistent();
    let command = cli_args.command.unwrap_or(Command::Run);
    let skip_intro = cli_args.skip_intro || !matches!(command, Command::Run);
    let session = Session::new(Services::from_config(&config), store, skip_intro);

    match command {
        Command::Run => run_interactive(session, &config).await?,
        Command::Generate(args) => run_generate(session, args).await?,
        Command::Favorites => print!(
            "{}",
            render::favorites_screen(session.view(), session.favorites(), session.language())
        ),
        Command::Settings(args) => run_settings(session, args, store_persistent),
    }
    Ok(())
}
