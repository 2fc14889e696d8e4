//! Academy TUI - a terminal client for the academy platform.
//!
//! Sign in, reset a password, browse and download free material, and (for
//! admins) manage user roles from the keyboard.

mod app;
mod ui;

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use academy_core::auth::{AccessGuard, Guarded};
use academy_core::cache::CacheManager;
use academy_core::forms::Credentials;
use academy_core::{ApiClient, Config, SessionStore};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState, Screen, ScreenNavigator};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const USAGE: &str = "\
Usage: academy [OPTION]

  (none)               open the terminal client
  --admin              open on the Manage Users screen
  --reset <link|token> open the password reset form
  --login [email]      sign in from the command line and exit
  --whoami [--json]    print the saved session and exit
  --logout             clear the saved session and exit
  --help               show this message";

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    WhoAmI { json: bool },
    Login { email: Option<String> },
    Logout,
    Open,
    OpenAdmin,
    OpenReset(String),
}

/// Parse the arguments after the program name. Errors are printed above the usage.
fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Command::Open);
    };
    let command = match first.as_str() {
        "--help" | "-h" => Command::Help,
        "--whoami" => match rest {
            [] => Command::WhoAmI { json: false },
            [flag] if flag == "--json" => Command::WhoAmI { json: true },
            [other] => return Err(format!("Unknown option for --whoami: {}", other)),
            [_, other, ..] => return Err(format!("Unexpected argument: {}", other)),
        },
        "--login" => match rest {
            [] => Command::Login { email: None },
            [email] if !email.starts_with('-') => Command::Login {
                email: Some(email.clone()),
            },
            [other] => return Err(format!("Unexpected argument for --login: {}", other)),
            [_, other, ..] => return Err(format!("Unexpected argument: {}", other)),
        },
        "--logout" => Command::Logout,
        "--admin" => Command::OpenAdmin,
        "--reset" => match rest.first() {
            Some(token) if !token.starts_with('-') => Command::OpenReset(token.clone()),
            _ => return Err("--reset needs a reset link or token".to_string()),
        },
        other => return Err(format!("Unknown option: {}", other)),
    };

    // Only --whoami and --login take anything after the option
    let extra = match command {
        Command::Help | Command::Logout | Command::OpenAdmin => rest.first(),
        Command::OpenReset(_) => rest.get(1),
        _ => None,
    };
    match extra {
        Some(arg) => Err(format!("Unexpected argument: {}", arg)),
        None => Ok(command),
    }
}

/// Log to a daily file so output never lands on the alternate screen.
/// RUST_LOG controls the level (e.g. RUST_LOG=academy_core=debug).
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config.data_dir().ok()?.join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        log_dir,
        "academy.log",
    ));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

fn build_store(config: &Config) -> Result<Arc<SessionStore>> {
    let api = ApiClient::new(config.api_url()).context("Failed to build HTTP client")?;
    let storage = config.session_storage()?;
    Ok(Arc::new(SessionStore::new(api, storage)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Reject bad arguments before anything is loaded or spawned
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {:#}", e);
        Config::default()
    });
    let _log_guard = init_tracing(&config);

    let store = build_store(&config)?;

    match &command {
        Command::WhoAmI { json } => return whoami(&store, *json),
        Command::Login { email } => return login(&store, config, email.clone()).await,
        Command::Logout => return logout(&store),
        _ => {}
    }

    info!(api_url = %store.api().base_url(), "Academy TUI starting");

    let cache = config
        .data_dir()
        .and_then(|dir| CacheManager::new(dir.join("cache")))
        .map_err(|e| warn!(error = %e, "Catalog cache unavailable"))
        .ok();

    let interactive = io::stdout().is_terminal();
    let mut app = App::new(config, store, cache, interactive);

    // Show the cached catalog behind the session restore
    app.load_from_cache();
    if app.is_catalog_stale() {
        app.refresh_catalog();
    }
    app.start_hydration();

    match command {
        Command::OpenAdmin => app.navigate(Screen::AdminUsers),
        Command::OpenReset(ref token) => app.open_reset(token),
        _ => {}
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Academy TUI shutting down");
    Ok(())
}

/// Print the persisted session and whether the admin screen would open
fn whoami(store: &SessionStore, json: bool) -> Result<()> {
    let session = store.hydrate();

    // No navigation from a plain command line
    let mut guard = AccessGuard::admin_only(ScreenNavigator::new(false));
    let admin = matches!(guard.check(&session), Guarded::Content(_));

    if json {
        let value = match session.user {
            Some(ref user) => serde_json::json!({
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "role": user.role,
                "admin": admin,
            }),
            None => serde_json::Value::Null,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let Some(user) = session.user.as_ref() else {
        println!("Not signed in");
        return Ok(());
    };
    println!("{} <{}>", user.display_name(), user.email);
    println!("Role: {}", user.role.display_name());
    println!("Manage Users: {}", if admin { "available" } else { "not available" });
    Ok(())
}

/// Sign in without the full-screen client; the password is read without echo
async fn login(store: &SessionStore, mut config: Config, email: Option<String>) -> Result<()> {
    store.hydrate();

    let email = match email.or_else(|| std::env::var("ACADEMY_EMAIL").ok()) {
        Some(email) => email,
        None => {
            eprint!("Email: ");
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let password = match std::env::var("ACADEMY_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let credentials = Credentials::new(email, password);
    match store.login(&credentials).await {
        Ok(session) => {
            let name = session.user.as_ref().map(|u| u.display_name().to_string());
            println!("Signed in as {}", name.unwrap_or_default());
            config.last_email = Some(credentials.email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message("Login failed. Please try again.")),
    }
}

fn logout(store: &SessionStore) -> Result<()> {
    store.hydrate();
    store.logout()?;
    println!("Signed out");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Session changes first so the frame reflects them
        app.sync_session();

        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_commands() {
        assert_eq!(parse_args(&[]), Ok(Command::Open));
        assert_eq!(parse_args(&args(&["-h"])), Ok(Command::Help));
        assert_eq!(parse_args(&args(&["--admin"])), Ok(Command::OpenAdmin));
        assert_eq!(parse_args(&args(&["--logout"])), Ok(Command::Logout));
        assert_eq!(
            parse_args(&args(&["--whoami", "--json"])),
            Ok(Command::WhoAmI { json: true })
        );
        assert_eq!(
            parse_args(&args(&["--login", "a@x.com"])),
            Ok(Command::Login {
                email: Some("a@x.com".to_string())
            })
        );
        assert_eq!(
            parse_args(&args(&["--reset", "https://academy.example/reset-password/abc"])),
            Ok(Command::OpenReset(
                "https://academy.example/reset-password/abc".to_string()
            ))
        );
    }

    #[test]
    fn test_reset_without_token_is_explained() {
        let err = parse_args(&args(&["--reset"])).unwrap_err();
        assert_eq!(err, "--reset needs a reset link or token");
        assert!(!err.contains("Unknown option"));

        let err = parse_args(&args(&["--reset", "--admin"])).unwrap_err();
        assert_eq!(err, "--reset needs a reset link or token");
    }

    #[test]
    fn test_unknown_and_extra_arguments_rejected() {
        assert_eq!(
            parse_args(&args(&["--bogus"])),
            Err("Unknown option: --bogus".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--admin", "now"])),
            Err("Unexpected argument: now".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--whoami", "--yaml"])),
            Err("Unknown option for --whoami: --yaml".to_string())
        );
        assert!(parse_args(&args(&["--reset", "abc", "def"])).is_err());
        assert_eq!(
            parse_args(&args(&["--login", "a@x.com", "extra"])),
            Err("Unexpected argument: extra".to_string())
        );
    }
}
