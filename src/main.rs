use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info, warn};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use uuid::Uuid;

use luzon::auth;
use luzon::cli::Cli;
use luzon::config::{self, Config};
use luzon::db::{
    self,
    feed::{ChangeEvent, ChangeFeed, ChangeOp, Subscription, Table},
    Database,
};
use luzon::errors::StorageError;
use luzon::financials::Month;
use luzon::logging;
use luzon::models::{Project, User};
use luzon::session::SessionStore;
use luzon::storage::AvatarStore;
use luzon::ui::{
    avatar::{handle_input as handle_avatar_input, render_avatar, AvatarAction, AvatarState},
    calendar::{handle_input as handle_calendar_input, render_calendar, CalendarAction, CalendarState},
    checklist::{handle_input as handle_checklist_input, render_checklist, ChecklistAction, ChecklistState},
    event_wizard::{handle_input as handle_event_wizard_input, render_event_wizard, EventWizardAction, EventWizardState},
    financials::{handle_input as handle_financials_input, render_financials, FinancialsAction, FinancialsState},
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    notes::{handle_input as handle_notes_input, render_notes, NotesAction, NotesState},
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction, ProjectWizardState,
    },
    projects::ProjectAction,
    share::{handle_input as handle_share_input, render_share, ShareAction, ShareState},
};

const TICK: Duration = Duration::from_millis(200);

// Represents the current screen in the app
enum AppScreen {
    Login,
    Calendar,
    ProjectWizard,
    EventWizard,
    Notes,
    Checklist,
    Financials,
    Share,
    Avatar,
}

// Main application state
struct AppState {
    db: Database,
    config: Config,
    session: SessionStore,
    feed: Option<ChangeFeed>,
    avatar_store: Option<AvatarStore>,
    /// Project from `--project`, applied once the calendar opens
    pending_project: Option<Uuid>,
    screen: AppScreen,
    login_state: Option<LoginState>,
    calendar_state: Option<CalendarState>,
    project_wizard_state: Option<ProjectWizardState>,
    event_wizard_state: Option<EventWizardState>,
    notes_state: Option<NotesState>,
    checklist_state: Option<ChecklistState>,
    financials_state: Option<FinancialsState>,
    share_state: Option<ShareState>,
    avatar_state: Option<AvatarState>,
}

impl AppState {
    fn new(db: Database, config: Config, session: SessionStore, feed: Option<ChangeFeed>, project: Option<Uuid>) -> Self {
        let avatar_store = AvatarStore::from_config(&config);
        Self {
            db,
            config,
            session,
            feed,
            avatar_store,
            pending_project: project,
            screen: AppScreen::Login,
            login_state: Some(LoginState::new()),
            calendar_state: None,
            project_wizard_state: None,
            event_wizard_state: None,
            notes_state: None,
            checklist_state: None,
            financials_state: None,
            share_state: None,
            avatar_state: None,
        }
    }

    fn current_user_id(&self) -> Option<Uuid> {
        self.calendar_state.as_ref().map(|c| c.user.id)
    }

    fn project(&self, id: Uuid) -> Option<Project> {
        self.calendar_state
            .as_ref()
            .and_then(|c| c.projects.project(id))
            .cloned()
    }

    fn back_to_calendar(&mut self) {
        self.project_wizard_state = None;
        self.event_wizard_state = None;
        self.notes_state = None;
        self.checklist_state = None;
        self.financials_state = None;
        self.share_state = None;
        self.avatar_state = None;
        self.screen = AppScreen::Calendar;
    }

    /// Leaves a failed screen, unless nobody is logged in yet
    fn back_to_calendar_if_open(&mut self) {
        if self.calendar_state.is_some() && !matches!(self.screen, AppScreen::Login) {
            self.back_to_calendar();
        }
    }

    /// Shows a failure on the calendar's status line
    fn notify(&mut self, message: impl Into<String>) {
        if let Some(calendar) = &mut self.calendar_state {
            calendar.status = Some(message.into());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    logging::init(&config.log_path())?;
    let session = SessionStore::new(config.session_path());

    if cli.logout {
        auth::logout(&session)?;
        println!("Logged out");
        return Ok(());
    }

    println!("Connecting to database...");
    let db = db::init(&config).await?;

    if cli.migrate {
        db.migrate().await?;
        println!("Migrations applied");
        return Ok(());
    }

    let feed = match ChangeFeed::spawn(config.database_url()).await {
        Ok(feed) => Some(feed),
        Err(e) => {
            warn!(error = %e, "live updates unavailable");
            None
        }
    };

    let user = match auth::restore(&db, &session).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "could not restore session");
            None
        }
    };

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(db, config, session, feed, cli.project);

    let result = match user {
        Some(user) => match open_calendar(&mut app_state, user).await {
            Ok(()) => run_app(&mut terminal, &mut app_state).await,
            Err(e) => Err(e),
        },
        None => run_app(&mut terminal, &mut app_state).await,
    };

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "exiting after error");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Login => {
                if let Some(state) = &mut app_state.login_state {
                    render_login(f, state);
                }
            }
            AppScreen::Calendar => {
                if let Some(state) = &mut app_state.calendar_state {
                    render_calendar(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::EventWizard => {
                if let Some(state) = &mut app_state.event_wizard_state {
                    render_event_wizard(f, state);
                }
            }
            AppScreen::Notes => {
                if let Some(state) = &mut app_state.notes_state {
                    render_notes(f, state);
                }
            }
            AppScreen::Checklist => {
                if let Some(state) = &mut app_state.checklist_state {
                    render_checklist(f, state);
                }
            }
            AppScreen::Financials => {
                if let Some(state) = &mut app_state.financials_state {
                    render_financials(f, state);
                }
            }
            AppScreen::Share => {
                if let Some(state) = &mut app_state.calendar_state {
                    render_calendar(f, state);
                }
                if let Some(state) = &app_state.share_state {
                    render_share(f, state);
                }
            }
            AppScreen::Avatar => {
                if let Some(state) = &mut app_state.calendar_state {
                    render_calendar(f, state);
                }
                if let Some(state) = &mut app_state.avatar_state {
                    render_avatar(f, state);
                }
            }
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key(app_state, key.code).await {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => {
                            error!(error = %e, "action failed");
                            app_state.notify("Something went wrong. Please try again.");
                            app_state.back_to_calendar_if_open();
                        }
                    }
                }
            }
        }

        if let Err(e) = apply_changes(app_state).await {
            warn!(error = %e, "could not apply remote changes");
        }
        save_notes(app_state, false).await;
    }

    Ok(())
}

async fn handle_key(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    match app_state.screen {
        AppScreen::Login => handle_login_screen(app_state, key).await,
        AppScreen::Calendar => handle_calendar_screen(app_state, key).await,
        AppScreen::ProjectWizard => handle_project_wizard_screen(app_state, key).await,
        AppScreen::EventWizard => handle_event_wizard_screen(app_state, key).await,
        AppScreen::Notes => handle_notes_screen(app_state, key).await,
        AppScreen::Checklist => handle_checklist_screen(app_state, key).await,
        AppScreen::Financials => handle_financials_screen(app_state, key).await,
        AppScreen::Share => handle_share_screen(app_state, key),
        AppScreen::Avatar => handle_avatar_screen(app_state, key).await,
    }
}

async fn open_calendar(app_state: &mut AppState, user: User) -> Result<()> {
    let users = app_state.db.load_users().await?;
    let projects = app_state.db.load_projects().await?;
    let events = app_state.db.load_events().await?;
    info!(user = %user.name, projects = projects.len(), events = events.len(), "calendar loaded");

    app_state.calendar_state = Some(CalendarState::new(
        user,
        users,
        projects,
        events,
        app_state.config.hours_weighting,
        app_state.pending_project.take(),
    ));
    app_state.login_state = None;
    app_state.back_to_calendar();
    Ok(())
}

async fn handle_login_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.login_state {
        Some(state) => handle_login_input(state, key)?,
        None => return Ok(false),
    };

    match action {
        Some(LoginAction::Exit) => return Ok(true),
        Some(LoginAction::Submit { name, password }) => {
            let result = auth::login(
                &app_state.db,
                &app_state.session,
                &name,
                &password,
                &app_state.config.app_password,
            )
            .await;

            match result {
                Ok(user) => {
                    if let Err(e) = open_calendar(app_state, user).await {
                        error!(error = %e, "failed to load calendar");
                        if let Some(state) = &mut app_state.login_state {
                            state.fail(luzon::errors::LoginError::Unavailable.to_string());
                        }
                    }
                }
                Err(e) => {
                    if let Some(state) = &mut app_state.login_state {
                        state.fail(e.to_string());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn reload_events(app_state: &mut AppState) -> Result<()> {
    let events = app_state.db.load_events().await?;
    if let Some(calendar) = &mut app_state.calendar_state {
        calendar.set_events(events);
    }
    Ok(())
}

async fn reload_projects(app_state: &mut AppState) -> Result<()> {
    let projects = app_state.db.load_projects().await?;
    if let Some(calendar) = &mut app_state.calendar_state {
        calendar.set_projects(projects);
    }
    Ok(())
}

async fn handle_calendar_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.calendar_state {
        Some(state) => handle_calendar_input(state, key)?,
        None => return Ok(false),
    };

    match action {
        Some(CalendarAction::Quit) => return Ok(true),
        Some(CalendarAction::Logout) => {
            auth::logout(&app_state.session)?;
            app_state.back_to_calendar();
            app_state.calendar_state = None;
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
        }
        Some(CalendarAction::Avatar) => {
            if let Some(calendar) = &app_state.calendar_state {
                app_state.avatar_state = Some(AvatarState::new(calendar.user.clone()));
                app_state.screen = AppScreen::Avatar;
            }
        }
        Some(CalendarAction::NewEvent(day)) => {
            if let Some(calendar) = &app_state.calendar_state {
                app_state.event_wizard_state = Some(EventWizardState::new(
                    day,
                    calendar.filter,
                    calendar.projects.projects(),
                    calendar.users.clone(),
                ));
                app_state.screen = AppScreen::EventWizard;
            }
        }
        Some(CalendarAction::EditEvent(id)) => {
            if let Some(calendar) = &app_state.calendar_state {
                if let Some(event) = calendar.events().iter().find(|e| e.id == id) {
                    app_state.event_wizard_state = Some(EventWizardState::from_existing(
                        event,
                        calendar.projects.projects(),
                        calendar.users.clone(),
                    ));
                    app_state.screen = AppScreen::EventWizard;
                }
            }
        }
        Some(CalendarAction::DeleteEvent(id)) => {
            app_state.db.delete_event(id).await?;
            reload_events(app_state).await?;
        }
        Some(CalendarAction::MoveEvent { id, start, end }) => {
            if let Err(e) = app_state.db.update_event_time(id, start, end).await {
                error!(error = %e, %id, "failed to move event");
                app_state.notify("Failed to move event");
                reload_events(app_state).await?;
            }
        }
        Some(CalendarAction::Project(action)) => handle_project_action(app_state, action).await?,
        None => {}
    }

    Ok(false)
}

async fn handle_project_action(app_state: &mut AppState, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::NewProject => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        ProjectAction::EditProject(id) => {
            if let Some(project) = app_state.project(id) {
                app_state.project_wizard_state = Some(ProjectWizardState::from_existing(&project));
                app_state.screen = AppScreen::ProjectWizard;
            }
        }
        ProjectAction::DeleteProject(id) => {
            app_state.db.delete_project(id).await?;
            reload_projects(app_state).await?;
            reload_events(app_state).await?;
        }
        ProjectAction::MoveStatus(id, status) => {
            if let Some(calendar) = &mut app_state.calendar_state {
                calendar.projects.set_status(id, status);
            }
            if let Err(e) = app_state.db.update_project_status(id, status).await {
                error!(error = %e, %id, "failed to update project status");
                app_state.notify("Failed to update project status");
                reload_projects(app_state).await?;
            }
        }
        ProjectAction::Share(id) => {
            if let Some(project) = app_state.project(id) {
                app_state.share_state = Some(ShareState::new(
                    project.id,
                    &project.title,
                    app_state.config.share_base_url.as_deref(),
                ));
                app_state.screen = AppScreen::Share;
            }
        }
        ProjectAction::Notes(id) => {
            if let Some(project) = app_state.project(id) {
                let note = app_state.db.get_project_note(id).await?;
                app_state.notes_state = Some(NotesState::new(&project, note));
                app_state.screen = AppScreen::Notes;
            }
        }
        ProjectAction::Checklist(id) => {
            if let Some(project) = app_state.project(id) {
                let items = app_state.db.load_checklist(id).await?;
                app_state.checklist_state = Some(ChecklistState::new(&project, items));
                app_state.screen = AppScreen::Checklist;
            }
        }
        ProjectAction::Financials(id) => {
            if let Some(project) = app_state.project(id) {
                let rows = app_state.db.load_financials(id).await?;
                app_state.financials_state = Some(FinancialsState::new(&project, rows, Month::current()));
                app_state.screen = AppScreen::Financials;
            }
        }
        // Handled by the sidebar itself
        ProjectAction::Close | ProjectAction::ToggleFilter(_) => {}
    }

    Ok(())
}

async fn handle_project_wizard_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.project_wizard_state {
        Some(state) => handle_project_wizard_input(state, key)?,
        None => return Ok(false),
    };

    match action {
        Some(ProjectWizardAction::Cancel) => app_state.back_to_calendar(),
        Some(ProjectWizardAction::Save(id, draft)) => {
            let Some(user_id) = app_state.current_user_id() else {
                return Ok(false);
            };
            let result = match id {
                Some(id) => app_state.db.update_project(id, &draft).await,
                None => app_state.db.create_project(&draft, user_id).await.map(|_| ()),
            };

            match result {
                Ok(()) => {
                    reload_projects(app_state).await?;
                    app_state.back_to_calendar();
                }
                Err(e) => {
                    error!(error = %e, "failed to save project");
                    if let Some(state) = &mut app_state.project_wizard_state {
                        state.error = Some("Failed to save project".to_string());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_event_wizard_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.event_wizard_state {
        Some(state) => handle_event_wizard_input(state, key)?,
        None => return Ok(false),
    };

    match action {
        Some(EventWizardAction::Cancel) => app_state.back_to_calendar(),
        Some(EventWizardAction::Save(id, draft)) => {
            let Some(user_id) = app_state.current_user_id() else {
                return Ok(false);
            };
            let result = match id {
                Some(id) => app_state.db.update_event(id, &draft).await,
                None => app_state.db.create_event(&draft, user_id).await.map(|_| ()),
            };

            match result {
                Ok(()) => {
                    reload_events(app_state).await?;
                    app_state.back_to_calendar();
                }
                Err(e) => {
                    error!(error = %e, "failed to save event");
                    if let Some(state) = &mut app_state.event_wizard_state {
                        state.fail();
                    }
                }
            }
        }
        Some(EventWizardAction::Delete(id)) => {
            app_state.db.delete_event(id).await?;
            reload_events(app_state).await?;
            app_state.back_to_calendar();
        }
        None => {}
    }

    Ok(false)
}

/// Writes the note once typing pauses, or right away when `force` is set
/// False only when a save was attempted and failed
async fn save_notes(app_state: &mut AppState, force: bool) -> bool {
    let Some(user_id) = app_state.current_user_id() else {
        return true;
    };
    let Some(state) = &mut app_state.notes_state else {
        return true;
    };
    if !(state.due_for_save(Instant::now()) || (force && state.is_dirty())) {
        return true;
    }

    match app_state
        .db
        .save_project_note(state.project_id, state.note_id, &state.content, user_id)
        .await
    {
        Ok(note) => {
            state.saved(note);
            true
        }
        Err(e) => {
            error!(error = %e, project = %state.project_id, "failed to save note");
            state.save_failed();
            false
        }
    }
}

async fn handle_notes_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.notes_state {
        Some(state) => handle_notes_input(state, key)?,
        None => return Ok(false),
    };

    if let Some(NotesAction::Close) = action {
        if save_notes(app_state, true).await {
            app_state.back_to_calendar();
        } else if app_state.notes_state.as_mut().map_or(true, |s| s.close_after_failure()) {
            warn!("closing notes with unsaved changes");
            app_state.back_to_calendar();
            app_state.notify("Note changes were not saved");
        }
    }

    Ok(false)
}

async fn handle_checklist_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let (project_id, action) = match &mut app_state.checklist_state {
        Some(state) => (state.project_id, handle_checklist_input(state, key)?),
        None => return Ok(false),
    };

    let result = match action {
        Some(ChecklistAction::Close) => {
            app_state.back_to_calendar();
            return Ok(false);
        }
        Some(ChecklistAction::Add { text, item_order }) => app_state
            .db
            .add_checklist_item(project_id, &text, item_order)
            .await
            .map(|_| ()),
        Some(ChecklistAction::SetCompleted(id, completed)) => {
            app_state.db.set_checklist_item_completed(id, completed).await
        }
        Some(ChecklistAction::Delete(id)) => app_state.db.delete_checklist_item(id).await,
        Some(ChecklistAction::Reorder(writes)) => app_state.db.reorder_checklist(&writes).await,
        None => return Ok(false),
    };

    if let Err(e) = &result {
        error!(error = %e, project = %project_id, "checklist update failed");
    }
    let items = app_state.db.load_checklist(project_id).await?;
    if let Some(state) = &mut app_state.checklist_state {
        state.error = result.err().map(|_| "Failed to update checklist".to_string());
        state.replace(items);
    }

    Ok(false)
}

async fn handle_financials_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let (project_id, action) = match &mut app_state.financials_state {
        Some(state) => (state.project_id, handle_financials_input(state, key)?),
        None => return Ok(false),
    };

    match action {
        Some(FinancialsAction::Close) => app_state.back_to_calendar(),
        Some(FinancialsAction::Save { month, income, expenses, notes }) => {
            let result = app_state
                .db
                .upsert_financials(project_id, &month.to_string(), income, expenses, notes.as_deref())
                .await;

            match result {
                Ok(()) => {
                    let rows = app_state.db.load_financials(project_id).await?;
                    if let Some(state) = &mut app_state.financials_state {
                        state.replace(rows);
                    }
                }
                Err(e) => {
                    error!(error = %e, project = %project_id, %month, "failed to save financials");
                    if let Some(state) = &mut app_state.financials_state {
                        state.save_failed();
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

fn handle_share_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.share_state {
        Some(state) => handle_share_input(state, key)?,
        None => return Ok(false),
    };

    if let Some(ShareAction::Close) = action {
        app_state.back_to_calendar();
    }

    Ok(false)
}

async fn handle_avatar_screen(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    let action = match &mut app_state.avatar_state {
        Some(state) => handle_avatar_input(state, key)?,
        None => return Ok(false),
    };

    match action {
        Some(AvatarAction::Close) => app_state.back_to_calendar(),
        Some(AvatarAction::Upload(path)) => {
            let Some(user_id) = app_state.current_user_id() else {
                return Ok(false);
            };

            let result = match &app_state.avatar_store {
                Some(store) => store.upload(user_id, &path).await.map_err(anyhow::Error::from),
                None => Err(StorageError::NotConfigured.into()),
            };
            let result = match result {
                Ok(url) => app_state.db.update_user_avatar(user_id, &url).await.map(|_| url),
                Err(e) => Err(e),
            };

            match result {
                Ok(url) => {
                    if let Some(calendar) = &mut app_state.calendar_state {
                        calendar.user.avatar_url = Some(url.clone());
                    }
                    if let Some(state) = &mut app_state.avatar_state {
                        state.uploaded(url);
                    }
                }
                Err(e) => {
                    error!(error = %e, %user_id, "avatar upload failed");
                    if let Some(state) = &mut app_state.avatar_state {
                        state.fail(e.to_string());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

/// Pulls whatever the change feed delivered and refreshes the affected views
async fn apply_changes(app_state: &mut AppState) -> Result<()> {
    let changes = match &mut app_state.feed {
        Some(feed) => feed.drain(),
        None => return Ok(()),
    };
    if changes.is_empty() || app_state.calendar_state.is_none() {
        return Ok(());
    }

    let mut events_changed = false;
    for change in changes {
        match change.table {
            Table::CalendarEvents | Table::EventAssignees => events_changed = true,
            Table::Projects => apply_project_change(app_state, &change).await?,
            Table::Users => apply_user_change(app_state, &change).await?,
            Table::ProjectNotes => {
                if let Some(project_id) = subscribed_project(app_state.notes_state.as_ref().map(|s| s.project_id), &change) {
                    let note = app_state.db.get_project_note(project_id).await?;
                    if let Some(state) = &mut app_state.notes_state {
                        state.apply_remote(note);
                    }
                }
            }
            Table::ProjectChecklistItems => {
                if let Some(project_id) =
                    subscribed_project(app_state.checklist_state.as_ref().map(|s| s.project_id), &change)
                {
                    let items = app_state.db.load_checklist(project_id).await?;
                    if let Some(state) = &mut app_state.checklist_state {
                        state.replace(items);
                    }
                }
            }
            Table::ProjectFinancials => {
                if let Some(project_id) =
                    subscribed_project(app_state.financials_state.as_ref().map(|s| s.project_id), &change)
                {
                    let rows = app_state.db.load_financials(project_id).await?;
                    if let Some(state) = &mut app_state.financials_state {
                        state.replace(rows);
                    }
                }
            }
        }
    }

    if events_changed {
        reload_events(app_state).await?;
    }
    Ok(())
}

/// The open screen's project when `change` belongs to it
fn subscribed_project(open: Option<Uuid>, change: &ChangeEvent) -> Option<Uuid> {
    open.filter(|id| Subscription::for_project(change.table, *id).matches(change))
}

async fn apply_project_change(app_state: &mut AppState, change: &ChangeEvent) -> Result<()> {
    let Some(id) = change.id else {
        return reload_projects(app_state).await;
    };
    let fresh = match change.op {
        ChangeOp::Delete => None,
        ChangeOp::Insert | ChangeOp::Update => app_state.db.get_project(id).await?,
    };
    if let Some(calendar) = &mut app_state.calendar_state {
        calendar.apply_project_change(change.op, id, fresh);
    }
    Ok(())
}

async fn apply_user_change(app_state: &mut AppState, change: &ChangeEvent) -> Result<()> {
    let Some(id) = change.id else {
        return Ok(());
    };
    let fresh = match change.op {
        ChangeOp::Delete => None,
        ChangeOp::Insert | ChangeOp::Update => app_state.db.get_user(id).await?,
    };
    if let Some(calendar) = &mut app_state.calendar_state {
        if let Some(user) = fresh.as_ref().filter(|u| u.id == calendar.user.id) {
            calendar.user = user.clone();
        }
        db::feed::patch_list(&mut calendar.users, change.op, id, fresh);
    }
    Ok(())
}
