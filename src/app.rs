// 🧭 App state - the caller side of the registry
//
// Holds what the screen needs between key presses: search box, sort
// column, selection, the add/edit form, the delete confirmation and
// notifications. Every registry call happens here, and every
// successful mutation recomputes the visible rows.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::entities::{RegistryError, Student, StudentRegistry, CLASS_OPTIONS, GRADE_OPTIONS};
use crate::query::{SearchMode, SortKey, SortState};

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

/// Transient messages, oldest first, dropped once older than `ttl`.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Notifications {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message.into());
    }

    fn push(&mut self, kind: NotificationKind, message: String) {
        self.items.push(Notification {
            kind,
            message,
            created_at: Instant::now(),
        });
    }

    /// Drop every notification older than the ttl at `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }
}

// ============================================================================
// ADD / EDIT FORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Class,
    Grade,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Class,
            FormField::Class => FormField::Grade,
            FormField::Grade => FormField::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Name => FormField::Grade,
            FormField::Class => FormField::Name,
            FormField::Grade => FormField::Class,
        }
    }
}

/// Modal form state. Class and grade are picked from fixed option lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentForm {
    pub mode: FormMode,
    /// Empty while adding; the registry assigns a timestamp id.
    pub id: String,
    pub name: String,
    pub class: String,
    pub grade: String,
    pub focus: FormField,
}

impl StudentForm {
    pub fn add() -> Self {
        StudentForm {
            mode: FormMode::Add,
            id: String::new(),
            name: String::new(),
            class: String::new(),
            grade: String::new(),
            focus: FormField::Name,
        }
    }

    pub fn edit(student: &Student) -> Self {
        StudentForm {
            mode: FormMode::Edit,
            id: student.id.clone(),
            name: student.name.clone(),
            class: student.class.clone(),
            grade: student.grade.clone(),
            focus: FormField::Name,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add New Student",
            FormMode::Edit => "Edit Student",
        }
    }

    pub fn input(&mut self, c: char) {
        if self.focus == FormField::Name {
            self.name.push(c);
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Class => self.class.clear(),
            FormField::Grade => self.grade.clear(),
        }
    }

    /// Step the focused option field through its list; no-op on `Name`.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Name => {}
            FormField::Class => self.class = step(&CLASS_OPTIONS, &self.class, forward),
            FormField::Grade => self.grade = step(&GRADE_OPTIONS, &self.grade, forward),
        }
    }

    pub fn to_student(&self) -> Student {
        Student {
            id: self.id.clone(),
            name: self.name.clone(),
            class: self.class.clone(),
            grade: self.grade.clone(),
        }
    }
}

/// Next (or previous) option after `current`, wrapping. Unknown or empty
/// values start from the first (or last) option.
fn step(options: &[&str], current: &str, forward: bool) -> String {
    let len = options.len();
    let index = match options.iter().position(|o| *o == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    options[index].to_string()
}

// ============================================================================
// APP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Moving around the table.
    Browse,
    /// Typing into the search box.
    Search,
    Form(StudentForm),
    /// Waiting for the user to confirm deleting this student.
    ConfirmDelete { id: String, name: String },
}

pub struct App {
    registry: StudentRegistry,
    pub query: String,
    pub search_mode: SearchMode,
    pub sort: SortState,
    /// Rows currently shown: search results, then sorted.
    pub visible: Vec<Student>,
    pub selected: Option<usize>,
    pub mode: Mode,
    pub notifications: Notifications,
}

impl App {
    pub fn new(registry: StudentRegistry, config: &Config) -> Self {
        let mut app = App {
            registry,
            query: String::new(),
            search_mode: config.default_search_mode,
            sort: SortState::default(),
            visible: Vec::new(),
            selected: None,
            mode: Mode::Browse,
            notifications: Notifications::new(config.notification_ttl()),
        };
        app.refresh();
        app
    }

    pub fn registry(&self) -> &StudentRegistry {
        &self.registry
    }

    /// Recompute the visible rows and keep the selection in range.
    pub fn refresh(&mut self) {
        let found = self.registry.search(&self.query, self.search_mode);
        self.visible = self.sort.apply(&found);

        self.selected = match (self.selected, self.visible.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
    }

    pub fn total_visible(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.selected.and_then(|i| self.visible.get(i))
    }

    // ------------------------------------------------------------------------
    // Search + sort
    // ------------------------------------------------------------------------

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refresh();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.refresh();
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search_mode = mode;
        self.refresh();
    }

    pub fn toggle_search_mode(&mut self) {
        self.set_search_mode(self.search_mode.toggle());
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.sort.toggle(key);
        self.refresh();
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        });
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    pub fn first(&mut self) {
        if !self.visible.is_empty() {
            self.selected = Some(0);
        }
    }

    pub fn last(&mut self) {
        if !self.visible.is_empty() {
            self.selected = Some(self.visible.len() - 1);
        }
    }

    // ------------------------------------------------------------------------
    // Add / edit
    // ------------------------------------------------------------------------

    pub fn open_add_form(&mut self) {
        self.mode = Mode::Form(StudentForm::add());
    }

    pub fn open_edit_form(&mut self) {
        if let Some(student) = self.selected_student() {
            self.mode = Mode::Form(StudentForm::edit(student));
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut StudentForm> {
        match &mut self.mode {
            Mode::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn close_form(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Send the open form to the registry. The form closes on success
    /// and stays open (with an error notification) on failure.
    /// Returns `None` when no form is open.
    pub fn submit_form(&mut self) -> Option<Result<Student, RegistryError>> {
        let Mode::Form(form) = &self.mode else {
            return None;
        };
        let candidate = form.to_student();
        let mode = form.mode;

        let result = match mode {
            FormMode::Add => self.registry.add(candidate),
            FormMode::Edit => self.registry.update(candidate),
        };

        match &result {
            Ok(student) => {
                let verb = match mode {
                    FormMode::Add => "added",
                    FormMode::Edit => "updated",
                };
                log::info!("student {} {} ({})", verb, student.id, student.name);
                self.notifications
                    .success(format!("Student {} successfully!", verb));
                self.mode = Mode::Browse;
                self.refresh();
                self.select_id(&student.id);
            }
            Err(e) => {
                log::warn!("form rejected: {}", e);
                self.notifications.error(e.to_string());
            }
        }

        Some(result)
    }

    // ------------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------------

    /// Ask for confirmation before deleting the selected student.
    pub fn request_delete(&mut self) {
        if let Some(student) = self.selected_student() {
            self.mode = Mode::ConfirmDelete {
                id: student.id.clone(),
                name: student.name.clone(),
            };
        }
    }

    pub fn confirmation_prompt(&self) -> Option<String> {
        match &self.mode {
            Mode::ConfirmDelete { name, .. } => Some(format!(
                "Are you sure you want to delete student {}?",
                name
            )),
            _ => None,
        }
    }

    /// Answer the pending confirmation. Declining leaves the registry alone.
    pub fn answer_delete(&mut self, confirmed: bool) -> Option<Result<Student, RegistryError>> {
        let Mode::ConfirmDelete { id, .. } = &self.mode else {
            return None;
        };
        let id = id.clone();
        self.mode = Mode::Browse;

        if !confirmed {
            log::debug!("delete of {} cancelled", id);
            return None;
        }

        Some(self.delete_student(&id))
    }

    /// Delete without asking. Callers normally go through `request_delete`.
    pub fn delete_student(&mut self, id: &str) -> Result<Student, RegistryError> {
        let result = self.registry.delete(id);

        match &result {
            Ok(student) => {
                log::info!("student deleted {} ({})", student.id, student.name);
                self.notifications.success("Student deleted successfully!");
                self.refresh();
            }
            Err(e) => {
                log::warn!("delete rejected: {}", e);
                self.notifications.error(e.to_string());
            }
        }

        result
    }

    fn select_id(&mut self, id: &str) {
        if let Some(i) = self.visible.iter().position(|s| s.id == id) {
            self.selected = Some(i);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
