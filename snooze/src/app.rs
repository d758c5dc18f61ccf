//! Main application state and logic

use snooze_core::{NewStory, Session, Story, StoryId, StoryUpdate};

/// Which story feed is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// All known stories, newest first.
    #[default]
    Stories,
    /// The signed-in user's favorites.
    Favorites,
    /// Stories the signed-in user submitted.
    MyStories,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Stories => "All Stories",
            View::Favorites => "Favorites",
            View::MyStories => "My Stories",
        }
    }
}

/// What an open form is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Signup,
    Submit,
    Edit(StoryId),
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Login => "Log In",
            FormKind::Signup => "Sign Up",
            FormKind::Submit => "Submit Story",
            FormKind::Edit(_) => "Edit Story",
        }
    }
}

/// One editable form field.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Render as asterisks (passwords).
    pub masked: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn masked(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: true,
        }
    }

    fn prefilled(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
            masked: false,
        }
    }
}

/// An in-progress form: its purpose, fields, and focused field.
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focused: usize,
}

impl Form {
    fn login() -> Self {
        Self {
            kind: FormKind::Login,
            fields: vec![FormField::new("Username"), FormField::masked("Password")],
            focused: 0,
        }
    }

    fn signup() -> Self {
        Self {
            kind: FormKind::Signup,
            fields: vec![
                FormField::new("Username"),
                FormField::masked("Password"),
                FormField::new("Name"),
            ],
            focused: 0,
        }
    }

    fn submit() -> Self {
        Self {
            kind: FormKind::Submit,
            fields: vec![
                FormField::new("Title"),
                FormField::new("Author"),
                FormField::new("Url"),
            ],
            focused: 0,
        }
    }

    fn edit(story: &Story) -> Self {
        Self {
            kind: FormKind::Edit(story.id.clone()),
            fields: vec![
                FormField::prefilled("Title", &story.title),
                FormField::prefilled("Author", &story.author),
                FormField::prefilled("Url", &story.url),
            ],
            focused: 0,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    pub fn type_char(&mut self, c: char) {
        self.fields[self.focused].value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focused].value.pop();
    }

    fn value(&self, index: usize) -> String {
        self.fields[index].value.trim().to_string()
    }
}

/// Async work the event handler asks the main loop to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh,
    ToggleFavorite(StoryId),
    DeleteStory(StoryId),
    Login { username: String, password: String },
    Signup { username: String, password: String, name: String },
    Submit(NewStory),
    Edit(StoryId, StoryUpdate),
    Logout,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub view: View,
    pub cursor: usize,
    form: Option<Form>,
    status_message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            view: View::default(),
            cursor: 0,
            form: None,
            status_message: None,
            show_help: false,
            should_quit: false,
        }
    }

    /// The stories of the current view, in display order.
    pub fn visible_stories(&self) -> Vec<&Story> {
        let store = self.session.store();
        match self.view {
            View::Stories => store.front_page().collect(),
            View::Favorites => store.favorites().collect(),
            View::MyStories => store.own_stories().collect(),
        }
    }

    /// The story under the cursor, if any.
    pub fn selected_story(&self) -> Option<&Story> {
        self.visible_stories().get(self.cursor).copied()
    }

    /// Switch feeds, resetting the cursor.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.cursor = 0;
    }

    pub fn cursor_down(&mut self) {
        let len = self.visible_stories().len();
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor on the list after deletions or view data changes.
    pub fn clamp_cursor(&mut self) {
        let len = self.visible_stories().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut()
    }

    pub fn open_login_form(&mut self) {
        self.form = Some(Form::login());
    }

    pub fn open_signup_form(&mut self) {
        self.form = Some(Form::signup());
    }

    pub fn open_submit_form(&mut self) {
        self.form = Some(Form::submit());
    }

    /// Open the edit form prefilled with the selected own story.
    pub fn open_edit_form(&mut self) {
        match self.selected_story().map(Form::edit) {
            Some(form) => self.form = Some(form),
            None => self.set_status("No story selected"),
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Turn the open form into an action, validating required fields.
    ///
    /// The form closes on success and stays open (with a status hint) when
    /// something is missing or unchanged.
    pub fn submit_form(&mut self) -> Option<Action> {
        let form = self.form.take()?;

        if form.fields.iter().any(|f| f.value.trim().is_empty()) {
            self.set_status("All fields are required");
            self.form = Some(form);
            return None;
        }

        let action = match &form.kind {
            FormKind::Login => Action::Login {
                username: form.value(0),
                password: form.value(1),
            },
            FormKind::Signup => Action::Signup {
                username: form.value(0),
                password: form.value(1),
                name: form.value(2),
            },
            FormKind::Submit => Action::Submit(NewStory {
                title: form.value(0),
                author: form.value(1),
                url: form.value(2),
            }),
            FormKind::Edit(id) => match self.diff_edit(id, &form) {
                Some(update) => Action::Edit(id.clone(), update),
                None => {
                    self.set_status("Nothing to change");
                    self.form = Some(form);
                    return None;
                }
            },
        };

        Some(action)
    }

    /// Build an update carrying only the fields that differ from the store.
    fn diff_edit(&self, id: &StoryId, form: &Form) -> Option<StoryUpdate> {
        let current = self.session.store().get(id)?;
        let changed = |new: String, old: &str| (new != old).then_some(new);

        let update = StoryUpdate {
            title: changed(form.value(0), &current.title),
            author: changed(form.value(1), &current.author),
            url: changed(form.value(2), &current.url),
        };
        (!update.is_empty()).then_some(update)
    }

    // =========================================================================
    // Status line
    // =========================================================================

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snooze_core::testing::MockBackend;

    fn app_with_stories(count: usize) -> (App, MockBackend) {
        let backend = MockBackend::new();
        for n in 0..count {
            backend.seed_story(
                &format!("Story {n}"),
                "author",
                "https://example.com/s",
                "poster",
            );
        }
        (App::new(Session::new(backend.clone())), backend)
    }

    async fn refreshed_app(count: usize) -> App {
        let (mut app, _backend) = app_with_stories(count);
        app.session.refresh_stories().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_cursor_clamps_to_list() {
        let mut app = refreshed_app(3).await;

        app.cursor_up();
        assert_eq!(app.cursor, 0);

        for _ in 0..10 {
            app.cursor_down();
        }
        assert_eq!(app.cursor, 2);
    }

    #[tokio::test]
    async fn test_view_switch_resets_cursor() {
        let mut app = refreshed_app(3).await;
        app.cursor_down();
        assert_eq!(app.cursor, 1);

        app.set_view(View::Favorites);
        assert_eq!(app.cursor, 0);
        assert!(app.visible_stories().is_empty());
    }

    #[test]
    fn test_form_focus_wraps() {
        let mut form = Form::signup();
        assert_eq!(form.focused, 0);

        form.focus_next();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focused, 0);

        form.focus_prev();
        assert_eq!(form.focused, 2);
    }

    #[test]
    fn test_login_form_requires_all_fields() {
        let (mut app, _backend) = app_with_stories(0);
        app.open_login_form();
        app.form_mut().unwrap().type_char('u');

        assert!(app.submit_form().is_none());
        assert_eq!(app.status_message(), Some("All fields are required"));
        assert!(app.form().is_some());
    }

    #[test]
    fn test_login_form_builds_action_and_closes() {
        let (mut app, _backend) = app_with_stories(0);
        app.open_login_form();
        for c in "crab".chars() {
            app.form_mut().unwrap().type_char(c);
        }
        app.form_mut().unwrap().focus_next();
        for c in "pw".chars() {
            app.form_mut().unwrap().type_char(c);
        }

        let action = app.submit_form().expect("complete form");
        assert_eq!(
            action,
            Action::Login {
                username: "crab".to_string(),
                password: "pw".to_string(),
            }
        );
        assert!(app.form().is_none());
    }

    #[tokio::test]
    async fn test_edit_form_diffs_against_store() {
        let mut app = refreshed_app(1).await;
        app.open_edit_form();

        // Untouched form: nothing to send.
        assert!(app.submit_form().is_none());
        assert_eq!(app.status_message(), Some("Nothing to change"));

        // Change the title only; the action carries just that field.
        let form = app.form_mut().unwrap();
        form.fields[0].value = "Renamed".to_string();
        let action = app.submit_form().expect("changed form");
        match action {
            Action::Edit(id, update) => {
                assert_eq!(id, StoryId::from("story-0"));
                assert_eq!(update.title.as_deref(), Some("Renamed"));
                assert!(update.author.is_none());
                assert!(update.url.is_none());
            }
            other => panic!("expected edit action, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clamp_cursor_after_shrink() {
        let mut app = refreshed_app(2).await;
        app.cursor_down();
        assert_eq!(app.cursor, 1);

        // Simulate the list shrinking under the cursor.
        app.set_view(View::Favorites);
        app.clamp_cursor();
        assert_eq!(app.cursor, 0);
    }
}
