// 🌱 Seed data - the dataset a registry starts from
//
// The built-in roster is used unless a CSV seed file is configured.
// Seed files are read once at startup and never written back.

use anyhow::{Context, Result};
use std::path::Path;

use crate::entities::{Student, StudentRegistry};

/// Built-in roster used when no seed file is configured.
pub fn default_students() -> Vec<Student> {
    vec![
        Student::new("1", "Aarav Sharma", "10th", "A+"),
        Student::new("2", "Emily Johnson", "8th", "B+"),
        Student::new("3", "Mohammed Al-Farsi", "12th", "A"),
        Student::new("4", "Sofia Rossi", "1st Year", "B"),
        Student::new("5", "Liam O'Connor", "5th", "C"),
        Student::new("6", "Yuki Tanaka", "3rd Year", "A"),
        Student::new("7", "Chloe Martin", "9th", "D"),
        Student::new("8", "Diego Hernandez", "2nd Year", "B+"),
        Student::new("9", "Amara Okafor", "11th", "A+"),
        Student::new("10", "Noah Williams", "7th", "E"),
        Student::new("11", "Priya Patel", "4th Year", "B"),
        Student::new("12", "Lucas Müller", "6th", "F"),
    ]
}

/// Read students from a CSV file with an `id,name,class,grade` header.
pub fn load_csv(csv_path: &Path) -> Result<Vec<Student>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open seed file {}", csv_path.display()))?;

    let mut students = Vec::new();

    for (row, result) in rdr.deserialize().enumerate() {
        let student: Student =
            result.with_context(|| format!("Failed to deserialize student on row {}", row + 1))?;
        students.push(student);
    }

    Ok(students)
}

/// Registry seeded from `csv_path`, or from the built-in roster.
pub fn registry_from(csv_path: Option<&Path>) -> Result<StudentRegistry> {
    let students = match csv_path {
        Some(path) => load_csv(path)?,
        None => default_students(),
    };

    let registry = StudentRegistry::from_seed(students).context("Invalid seed data")?;
    log::info!("seeded registry with {} students", registry.len());

    Ok(registry)
}
