// 🎓 Student Entity - identity + in-memory registry
//
// The registry owns the authoritative, ordered list of students.
// Every mutation goes through add / update / delete, which either
// complete or leave the list untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{SearchMode, SortDirection, SortKey};

/// Class labels offered by the add/edit form.
///
/// The registry does not validate against this list.
pub const CLASS_OPTIONS: [&str; 16] = [
    "1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th", "9th", "10th", "11th", "12th",
    "1st Year", "2nd Year", "3rd Year", "4th Year",
];

/// Grade labels offered by the add/edit form, best first.
pub const GRADE_OPTIONS: [&str; 8] = ["A+", "A", "B+", "B", "C", "D", "E", "F"];

// ============================================================================
// STUDENT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique within a registry. Empty means "generate one on add".
    #[serde(default)]
    pub id: String,

    pub name: String,

    pub class: String,

    pub grade: String,
}

impl Student {
    pub fn new(id: &str, name: &str, class: &str, grade: &str) -> Self {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            class: class.to_string(),
            grade: grade.to_string(),
        }
    }

    /// Candidate without an id; `StudentRegistry::add` assigns one.
    pub fn candidate(name: &str, class: &str, grade: &str) -> Self {
        Student::new("", name, class, grade)
    }

    /// Names of the required fields that are empty, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.class.is_empty() {
            missing.push("class");
        }
        if self.grade.is_empty() {
            missing.push("grade");
        }
        missing
    }

    /// Value of one column. `SortKey` names the columns for sorting and,
    /// through `SearchMode::field`, the column a search matches against.
    pub fn field(&self, key: SortKey) -> &str {
        match key {
            SortKey::Name => &self.name,
            SortKey::Class => &self.class,
            SortKey::Grade => &self.grade,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid student ID")]
    EmptyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A student with this ID already exists: {0}")]
    DuplicateId(String),

    #[error("Student not found: {0}")]
    NotFound(String),
}

fn validate(student: &Student) -> Result<(), ValidationError> {
    let missing = student.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

// ============================================================================
// STUDENT REGISTRY
// ============================================================================

/// Ordered, in-memory collection of students.
///
/// Insertion order is the display order until a caller sorts a copy.
#[derive(Debug, Clone, Default)]
pub struct StudentRegistry {
    students: Vec<Student>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        StudentRegistry::default()
    }

    /// Build a registry by adding each seed record in order.
    ///
    /// Seed records go through the same checks as `add`, so a bad seed
    /// (duplicate id, empty field) is rejected rather than stored.
    pub fn from_seed<I>(seed: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Student>,
    {
        let mut registry = StudentRegistry::new();
        for student in seed {
            registry.add(student)?;
        }
        Ok(registry)
    }

    /// Append a new student.
    pub fn add(&mut self, mut candidate: Student) -> Result<Student, RegistryError> {
        validate(&candidate)?;

        if candidate.id.is_empty() {
            candidate.id = self.next_id();
        } else if self.position(&candidate.id).is_some() {
            return Err(RegistryError::DuplicateId(candidate.id));
        }

        self.students.push(candidate.clone());
        Ok(candidate)
    }

    /// Replace the student with `record.id`, keeping its position.
    pub fn update(&mut self, record: Student) -> Result<Student, RegistryError> {
        validate(&record)?;

        let index = self
            .position(&record.id)
            .ok_or_else(|| RegistryError::NotFound(record.id.clone()))?;

        self.students[index] = record.clone();
        Ok(record)
    }

    /// Remove the student with `id` and hand it back.
    pub fn delete(&mut self, id: &str) -> Result<Student, RegistryError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        let index = self
            .position(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        Ok(self.students.remove(index))
    }

    /// Case-insensitive substring search on the field picked by `mode`.
    pub fn search(&self, query: &str, mode: SearchMode) -> Vec<Student> {
        let needle = query.to_lowercase();

        self.students
            .iter()
            .filter(|student| match mode.field() {
                Some(key) => student.field(key).to_lowercase().contains(&needle),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Convenience for `query::sort` over the whole registry.
    pub fn sorted(&self, key: SortKey, direction: SortDirection) -> Vec<Student> {
        crate::query::sort(&self.students, key, direction)
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All students in insertion order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.students.iter().position(|s| s.id == id)
    }

    /// Timestamp id (ms since epoch), bumped until it is free.
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
