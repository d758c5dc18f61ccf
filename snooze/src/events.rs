//! Event handling for the story TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{Action, App, View};

/// Result of handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// An async operation for the main loop to perform.
    Perform(Action),
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.show_help {
        return handle_help_key(app, key);
    }

    if app.form().is_some() {
        handle_form_key(app, key)
    } else {
        handle_browse_key(app, key)
    }
}

/// Keys while the help overlay is open
fn handle_help_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Keys while browsing a story list
fn handle_browse_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('q') => EventResult::Quit,

        KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.cursor_down();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor_up();
            EventResult::NeedsRedraw
        }

        // Feeds
        KeyCode::Char('1') => {
            app.set_view(View::Stories);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('2') => {
            app.set_view(View::Favorites);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('3') => {
            app.set_view(View::MyStories);
            EventResult::NeedsRedraw
        }

        KeyCode::Char('r') => EventResult::Perform(Action::Refresh),

        // Favorite toggling
        KeyCode::Char('f') => {
            if !app.session.is_logged_in() {
                app.set_status("Log in to favorite stories");
                return EventResult::NeedsRedraw;
            }
            match app.selected_story() {
                Some(story) => EventResult::Perform(Action::ToggleFavorite(story.id.clone())),
                None => EventResult::Continue,
            }
        }

        // Story submission and editing
        KeyCode::Char('s') => {
            if !app.session.is_logged_in() {
                app.set_status("Log in to submit stories");
                return EventResult::NeedsRedraw;
            }
            app.open_submit_form();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('e') => {
            if app.view != View::MyStories {
                app.set_status("Edit from the My Stories view (3)");
                return EventResult::NeedsRedraw;
            }
            app.open_edit_form();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('d') => {
            if app.view != View::MyStories {
                app.set_status("Delete from the My Stories view (3)");
                return EventResult::NeedsRedraw;
            }
            match app.selected_story() {
                Some(story) => EventResult::Perform(Action::DeleteStory(story.id.clone())),
                None => EventResult::Continue,
            }
        }

        // Account
        KeyCode::Char('l') => {
            app.open_login_form();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('n') => {
            app.open_signup_form();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('o') => {
            if app.session.is_logged_in() {
                EventResult::Perform(Action::Logout)
            } else {
                EventResult::Continue
            }
        }

        _ => EventResult::Continue,
    }
}

/// Keys while a form is open
fn handle_form_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.close_form();
            EventResult::NeedsRedraw
        }

        KeyCode::Enter => match app.submit_form() {
            Some(action) => EventResult::Perform(action),
            None => EventResult::NeedsRedraw,
        },

        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form_mut() {
                form.focus_next();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form_mut() {
                form.focus_prev();
            }
            EventResult::NeedsRedraw
        }

        KeyCode::Backspace => {
            if let Some(form) = app.form_mut() {
                form.backspace();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form_mut() {
                form.type_char(c);
            }
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}
