//! Terminal client for a Hack or Snooze style story site.
//!
//! Browse the front page, sign up or log in, submit and edit stories, and
//! keep favorites, all against the remote story API.
//!
//! # Configuration
//!
//! - `SNOOZE_API_URL` / `--api-url`: override the API deployment
//! - `SNOOZE_DATA_DIR`: where remembered credentials live (default `.`)
//! - `SNOOZE_LOG`: enable tracing to `snooze.log` (e.g. `snooze_core=debug`)

mod app;
mod events;
mod ui;

use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use snooze_api::ApiClient;
use snooze_core::{
    credentials_path, forget_credentials, SavedCredentials, Session, SessionError, User,
};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use app::{Action, App};
use events::{handle_event, EventResult};
use ui::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    init_tracing();

    let mut base_url = std::env::var("SNOOZE_API_URL").ok();
    if let Some(position) = args.iter().position(|a| a == "--api-url") {
        match args.get(position + 1) {
            Some(url) => base_url = Some(url.clone()),
            None => {
                eprintln!("Error: --api-url requires a value.");
                std::process::exit(1);
            }
        }
    }

    let mut client = ApiClient::new();
    if let Some(url) = base_url {
        client = client.with_base_url(url);
    }
    let mut session = Session::remote(client);

    // Restore a remembered session, if credentials are on disk and still valid.
    let creds_path = default_credentials_path();
    let mut startup_status: Option<String> = None;
    if let Ok(saved) = SavedCredentials::load_json(&creds_path).await {
        if let Err(err) = session
            .login_via_stored_credentials(&saved.token, &saved.username)
            .await
        {
            startup_status = Some(format!("Saved login rejected. {}", err.user_message()));
        }
    }

    if let Err(err) = session.refresh_stories().await {
        startup_status = Some(err.user_message());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    match startup_status {
        Some(message) => app.set_status(message),
        None => {
            if let Some(user) = app.session.current_user() {
                let message = format!("Welcome back, {}", user.username);
                app.set_status(message);
            }
        }
    }

    let result = run_app(&mut terminal, &mut app, &creds_path).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    creds_path: &Path,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll so the loop stays responsive to resizes
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;

            match handle_event(app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::Perform(action) => {
                    perform_action(app, action, creds_path).await;
                    app.clamp_cursor();
                }
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run one session operation and surface the outcome on the status line.
async fn perform_action(app: &mut App, action: Action, creds_path: &Path) {
    app.clear_status();

    let outcome: Result<String, SessionError> = match action {
        Action::Refresh => app
            .session
            .refresh_stories()
            .await
            .map(|()| "Stories refreshed".to_string()),

        Action::ToggleFavorite(id) => {
            if app.session.is_favorite(&id) {
                app.session
                    .remove_favorite(&id)
                    .await
                    .map(|()| "Removed favorite".to_string())
            } else {
                app.session
                    .add_favorite(&id)
                    .await
                    .map(|()| "Added favorite".to_string())
            }
        }

        Action::DeleteStory(id) => app
            .session
            .delete_story(&id)
            .await
            .map(|()| "Story deleted".to_string()),

        Action::Login { username, password } => {
            match app.session.login(&username, &password).await {
                Ok(user) => {
                    let user = user.clone();
                    remember(creds_path, &user).await;
                    Ok(format!("Logged in as {}", user.username))
                }
                Err(err) => Err(err),
            }
        }

        Action::Signup {
            username,
            password,
            name,
        } => match app.session.signup(&username, &password, &name).await {
            Ok(user) => {
                let user = user.clone();
                remember(creds_path, &user).await;
                Ok(format!("Welcome, {}", user.name))
            }
            Err(err) => Err(err),
        },

        Action::Submit(new_story) => app
            .session
            .add_story(new_story)
            .await
            .map(|story| format!("Submitted \"{}\"", story.title)),

        Action::Edit(id, update) => app
            .session
            .edit_story(&id, update)
            .await
            .map(|story| format!("Updated \"{}\"", story.title)),

        Action::Logout => {
            app.session.logout();
            if let Err(err) = forget_credentials(creds_path).await {
                warn!(error = %err, "failed to remove saved credentials");
            }
            Ok("Logged out".to_string())
        }
    };

    match outcome {
        Ok(message) => app.set_status(message),
        Err(err) => app.set_status(err.user_message()),
    }
}

/// Save credentials so the next start can restore the session.
async fn remember(path: &Path, user: &User) {
    let saved = SavedCredentials::new(user.username.as_str(), user.token.as_str());
    if let Err(err) = saved.save_json(path).await {
        warn!(error = %err, "failed to save credentials");
    }
}

fn default_credentials_path() -> PathBuf {
    let base = std::env::var("SNOOZE_DATA_DIR").unwrap_or_else(|_| ".".to_string());
    credentials_path(base)
}

/// Route tracing to a log file when SNOOZE_LOG is set; the alternate screen
/// owns stdout, so logs cannot go there.
fn init_tracing() {
    let Ok(filter) = std::env::var("SNOOZE_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create("snooze.log") else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}

fn print_help() {
    println!("snooze - terminal client for a Hack or Snooze style story site");
    println!();
    println!("USAGE:");
    println!("  snooze [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help         Show this help message");
    println!("  --api-url <URL>    API deployment to talk to");
    println!();
    println!("ENVIRONMENT:");
    println!("  SNOOZE_API_URL     Same as --api-url");
    println!("  SNOOZE_DATA_DIR    Directory for remembered credentials (default: .)");
    println!("  SNOOZE_LOG         Tracing filter; logs go to snooze.log");
    println!();
    println!("KEYS:");
    println!("  j/k      Move selection        1/2/3  All/favorites/my stories");
    println!("  f        Toggle favorite       r      Refresh");
    println!("  s        Submit a story        e/d    Edit/delete own story");
    println!("  l/n/o    Log in/sign up/out    q      Quit");
}
