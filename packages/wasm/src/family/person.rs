//! Person records.
//!
//! A person is the vertex of the family graph. Each person has:
//! - A stable unique identifier (never reassigned)
//! - A required first name
//! - Optional last name, birth/death dates, gender and notes
//!
//! Dates are calendar dates kept as ISO `YYYY-MM-DD` strings; nothing in the
//! layout depends on their value.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable person identifier.
///
/// Opaque to the layout; the embedding application decides the format
/// (UUIDs in practice, `p1`, `p2`, ... when generated by [`FamilyGraph`]).
///
/// [`FamilyGraph`]: super::FamilyGraph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    /// Create a new PersonId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PersonId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Gender tag attached to a person.
///
/// Any tag other than `male` or `female` decodes as `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// A person in the family forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub death_date: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
}

impl Person {
    /// Create a person with only the required fields set.
    pub fn new(id: impl Into<PersonId>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: None,
            birth_date: None,
            death_date: None,
            gender: None,
            notes: None,
        }
    }

    /// Build a person from an editing draft.
    pub fn from_draft(id: PersonId, draft: PersonDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name.trim().to_owned(),
            last_name: non_blank(draft.last_name),
            birth_date: non_blank(draft.birth_date),
            death_date: non_blank(draft.death_date),
            gender: draft.gender,
            notes: non_blank(draft.notes),
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = non_blank(Some(last_name.into()));
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_birth_date(mut self, date: impl Into<String>) -> Self {
        self.birth_date = non_blank(Some(date.into()));
        self
    }

    pub fn with_death_date(mut self, date: impl Into<String>) -> Self {
        self.death_date = non_blank(Some(date.into()));
        self
    }

    /// Gender, treating a missing tag as `Unspecified`.
    #[inline]
    pub fn gender(&self) -> Gender {
        self.gender.unwrap_or_default()
    }

    /// First and last name joined by a single space.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Short life-span label for a person box, e.g. `b. 1901-02-03 – d. 1980-04-05`.
    pub fn lifespan(&self) -> Option<String> {
        match (&self.birth_date, &self.death_date) {
            (Some(birth), Some(death)) => Some(format!("b. {birth} – d. {death}")),
            (Some(birth), None) => Some(format!("b. {birth}")),
            (None, Some(death)) => Some(format!("d. {death}")),
            (None, None) => None,
        }
    }
}

/// Editable descriptive fields of a person, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonDraft {
    pub first_name: String,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub gender: Option<Gender>,
    pub notes: Option<String>,
}

impl PersonDraft {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Default::default()
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(Option::<String>::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_id() {
        let id = PersonId::new("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(format!("{}", id), "abc");
        assert_eq!(PersonId::from("abc"), id);
    }

    #[test]
    fn test_display_name() {
        let anna = Person::new("a", "Anna");
        assert_eq!(anna.display_name(), "Anna");

        let anna = anna.with_last_name("Jensen");
        assert_eq!(anna.display_name(), "Anna Jensen");
    }

    #[test]
    fn test_lifespan_labels() {
        let p = Person::new("a", "Anna");
        assert_eq!(p.lifespan(), None);

        let p = p.with_birth_date("1901-02-03");
        assert_eq!(p.lifespan().as_deref(), Some("b. 1901-02-03"));

        let p = p.with_death_date("1980-04-05");
        assert_eq!(
            p.lifespan().as_deref(),
            Some("b. 1901-02-03 – d. 1980-04-05")
        );
    }

    #[test]
    fn test_decode_camel_case_with_nulls() {
        let json = r#"{
            "id": "p1",
            "firstName": "Karen",
            "lastName": null,
            "birthDate": "1950-01-01",
            "deathDate": "",
            "gender": "female",
            "notes": "   ",
            "createdBy": "u1"
        }"#;
        let person: Person = serde_json::from_str(json).unwrap();

        assert_eq!(person.id, PersonId::from("p1"));
        assert_eq!(person.first_name, "Karen");
        assert_eq!(person.last_name, None);
        assert_eq!(person.birth_date.as_deref(), Some("1950-01-01"));
        assert_eq!(person.death_date, None);
        assert_eq!(person.gender(), Gender::Female);
        assert_eq!(person.notes, None);
    }

    #[test]
    fn test_unknown_gender_is_unspecified() {
        let json = r#"{"id": "p1", "firstName": "Kim", "gender": "other"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.gender, Some(Gender::Unspecified));

        let json = r#"{"id": "p2", "firstName": "Sam"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.gender, None);
        assert_eq!(person.gender(), Gender::Unspecified);
    }

    #[test]
    fn test_from_draft_trims_fields() {
        let draft = PersonDraft {
            first_name: "  Ole ".into(),
            last_name: Some(" ".into()),
            notes: Some(" farmer ".into()),
            ..Default::default()
        };
        let person = Person::from_draft(PersonId::from("p9"), draft);

        assert_eq!(person.first_name, "Ole");
        assert_eq!(person.last_name, None);
        assert_eq!(person.notes.as_deref(), Some("farmer"));
    }
}
