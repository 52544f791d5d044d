// Student Registry - Core Library
// Exposes the registry and its callers for the CLI, the TUI and tests

pub mod entities;
pub mod query;
pub mod seed;
pub mod config;
pub mod app;

// Re-export commonly used types
pub use entities::{
    RegistryError, Student, StudentRegistry, ValidationError, CLASS_OPTIONS, GRADE_OPTIONS,
};
pub use query::{sort, SearchMode, SortDirection, SortKey, SortState};
pub use seed::{default_students, load_csv, registry_from};
pub use config::Config;
pub use app::{App, FormField, FormMode, Mode, Notification, NotificationKind, Notifications, StudentForm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
