// 🔎 Query helpers - search mode, sort key/direction, sort toggle
//
// Everything here is a pure function of its inputs. The sort toggle
// is state held by the caller (the table), never by the registry.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::Student;

// ============================================================================
// SEARCH MODE
// ============================================================================

/// Which field a search query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    ByName,
    ByClass,
    /// No field selected: every record matches.
    All,
}

impl SearchMode {
    /// Column the query is matched against; `None` matches every record.
    pub fn field(&self) -> Option<SortKey> {
        match self {
            SearchMode::ByName => Some(SortKey::Name),
            SearchMode::ByClass => Some(SortKey::Class),
            SearchMode::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::ByName => "Search by Name",
            SearchMode::ByClass => "Search by Class",
            SearchMode::All => "No filter",
        }
    }

    /// Name -> Class -> Name. `All` is only reachable through config.
    pub fn toggle(&self) -> Self {
        match self {
            SearchMode::ByName => SearchMode::ByClass,
            SearchMode::ByClass | SearchMode::All => SearchMode::ByName,
        }
    }
}

// ============================================================================
// SORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Class,
    Grade,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Class => "Class",
            SortKey::Grade => "Grade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Sort a copy of `students` on `key`, ignoring case.
///
/// `sort_by` is stable, and descending order reverses the comparison
/// rather than the output, so ties keep their input order either way.
pub fn sort(students: &[Student], key: SortKey, direction: SortDirection) -> Vec<Student> {
    let mut sorted = students.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_ignore_case(a.field(key), b.field(key));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Current column sort, as held by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    /// Same key flips the direction, a different key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        self.direction = if self.key == Some(key) && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.key = Some(key);
    }

    /// Sorted copy, or the input order when no column is selected.
    pub fn apply(&self, students: &[Student]) -> Vec<Student> {
        match self.key {
            Some(key) => sort(students, key, self.direction),
            None => students.to_vec(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(students: &[Student]) -> Vec<&str> {
        students.iter().map(|s| s.name.as_str()).collect()
    }

    fn roster() -> Vec<Student> {
        vec![
            Student::new("1", "carla", "2nd", "B"),
            Student::new("2", "Abe", "10th", "A+"),
            Student::new("3", "bea", "1st Year", "C"),
        ]
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let sorted = sort(&roster(), SortKey::Name, SortDirection::Asc);
        assert_eq!(names(&sorted), vec!["Abe", "bea", "carla"]);
    }

    #[test]
    fn test_sort_desc_reverses_distinct_keys() {
        let asc = sort(&roster(), SortKey::Name, SortDirection::Asc);
        let mut desc = sort(&roster(), SortKey::Name, SortDirection::Desc);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let students = vec![
            Student::new("1", "Ann", "5th", "B"),
            Student::new("2", "Bo", "5th", "A"),
            Student::new("3", "Cy", "4th", "B"),
            Student::new("4", "Di", "5th", "b"),
        ];

        let asc = sort(&students, SortKey::Grade, SortDirection::Asc);
        assert_eq!(names(&asc), vec!["Bo", "Ann", "Cy", "Di"]);

        let desc = sort(&students, SortKey::Grade, SortDirection::Desc);
        assert_eq!(names(&desc), vec!["Ann", "Cy", "Di", "Bo"]);

        let by_class = sort(&students, SortKey::Class, SortDirection::Desc);
        assert_eq!(names(&by_class), vec!["Ann", "Bo", "Di", "Cy"]);
    }

    #[test]
    fn test_sort_leaves_input_untouched() {
        let students = roster();
        let _ = sort(&students, SortKey::Class, SortDirection::Desc);
        assert_eq!(names(&students), vec!["carla", "Abe", "bea"]);
    }

    #[test]
    fn test_sort_state_toggle() {
        let mut state = SortState::default();
        assert_eq!(state.key, None);

        state.toggle(SortKey::Name);
        assert_eq!(state, SortState { key: Some(SortKey::Name), direction: SortDirection::Asc });

        state.toggle(SortKey::Name);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortKey::Name);
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle(SortKey::Name);
        state.toggle(SortKey::Grade);
        assert_eq!(state, SortState { key: Some(SortKey::Grade), direction: SortDirection::Asc });
    }

    #[test]
    fn test_sort_state_without_key_keeps_order() {
        let state = SortState::default();
        assert_eq!(names(&state.apply(&roster())), vec!["carla", "Abe", "bea"]);
    }

    #[test]
    fn test_search_mode_field() {
        let student = Student::new("1", "Ann", "5th", "A");

        assert_eq!(SearchMode::ByName.field().map(|k| student.field(k)), Some("Ann"));
        assert_eq!(SearchMode::ByClass.field().map(|k| student.field(k)), Some("5th"));
        assert_eq!(SearchMode::All.field(), None);
    }

    #[test]
    fn test_search_mode_toggle_and_serde() {
        assert_eq!(SearchMode::ByName.toggle(), SearchMode::ByClass);
        assert_eq!(SearchMode::ByClass.toggle(), SearchMode::ByName);
        assert_eq!(SearchMode::All.toggle(), SearchMode::ByName);

        let mode: SearchMode = serde_json::from_str("\"by_class\"").unwrap();
        assert_eq!(mode, SearchMode::ByClass);
    }
}
