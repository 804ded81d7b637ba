// src/models/student.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A roster entry. `(last_name, first_name)` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub last_name: String,
    pub first_name: String,
    pub joined_at: DateTime<Utc>,

    /// Sparse per-question answers. Holes are `null` on the wire.
    #[serde(default)]
    pub answers: Vec<Option<String>>,

    #[serde(default)]
    pub score: u32,
}

impl Student {
    pub fn new(name: &StudentName, joined_at: DateTime<Utc>) -> Self {
        Self {
            last_name: name.last_name.clone(),
            first_name: name.first_name.clone(),
            joined_at,
            answers: Vec::new(),
            score: 0,
        }
    }

    pub fn is(&self, name: &StudentName) -> bool {
        self.last_name == name.last_name && self.first_name == name.first_name
    }

    /// Records `letter` at `index`, padding the sparse vector as needed.
    pub fn record_answer(&mut self, index: usize, letter: impl Into<String>) {
        if self.answers.len() <= index {
            self.answers.resize(index + 1, None);
        }
        self.answers[index] = Some(letter.into());
    }

    pub fn answer_at(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }
}

/// Identity a student client remembers between sessions (`quiz_student_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentName {
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty."))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100, message = "First name must not be empty."))]
    pub first_name: String,
}

impl StudentName {
    /// Trims both parts; validation happens separately.
    pub fn new(last_name: &str, first_name: &str) -> Self {
        Self {
            last_name: last_name.trim().to_string(),
            first_name: first_name.trim().to_string(),
        }
    }
}

/// Appends `name` to the roster unless it is already present.
/// Returns `true` when a new entry was added.
pub fn join_roster(roster: &mut Vec<Student>, name: &StudentName, now: DateTime<Utc>) -> bool {
    if roster.iter().any(|s| s.is(name)) {
        return false;
    }
    roster.push(Student::new(name, now));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_answer_pads_with_holes() {
        let name = StudentName::new("Ivanov", "Ivan");
        let mut student = Student::new(&name, Utc::now());
        student.record_answer(2, "C");

        assert_eq!(student.answers, vec![None, None, Some("C".to_string())]);
        assert_eq!(student.answer_at(0), None);
        assert_eq!(student.answer_at(2), Some("C"));

        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["answers"], serde_json::json!([null, null, "C"]));
    }

    #[test]
    fn joining_twice_keeps_one_entry() {
        let name = StudentName::new(" Petrova ", "Anna");
        let mut roster = Vec::new();

        assert!(join_roster(&mut roster, &name, Utc::now()));
        assert!(!join_roster(&mut roster, &StudentName::new("Petrova", "Anna"), Utc::now()));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].last_name, "Petrova");
    }

    #[test]
    fn blank_names_fail_validation() {
        assert!(StudentName::new("  ", "Anna").validate().is_err());
        assert!(StudentName::new("Petrova", "Anna").validate().is_ok());
    }
}
