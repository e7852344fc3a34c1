//! The `{people, relationships}` payload handed to the layout.

use serde::{Deserialize, Serialize};

use super::error::{FamilyError, Result};
use super::person::Person;
use super::relationship::Relationship;

/// One atomic view of the family data.
///
/// Order matters: root selection, child order and standalone placement all
/// follow the order of these two lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilySnapshot {
    pub people: Vec<Person>,
    pub relationships: Vec<Relationship>,
}

impl FamilySnapshot {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        Self {
            people,
            relationships,
        }
    }

    /// Decode a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FamilyError::InvalidSnapshot(err.to_string()))
    }

    /// Encode the snapshot as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| FamilyError::InvalidSnapshot(err.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::PersonId;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "people": [
                {"id": "a", "firstName": "Anna"},
                {"id": "b", "firstName": "Bo", "lastName": "Holm"}
            ],
            "relationships": [
                {"id": "r1", "parentId": "a", "childId": "b"}
            ]
        }"#;
        let snapshot = FamilySnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.people.len(), 2);
        assert_eq!(snapshot.relationships.len(), 1);
        assert_eq!(snapshot.relationships[0].child_id, PersonId::from("b"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let snapshot = FamilySnapshot::from_json("{}").unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.relationships.is_empty());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = FamilySnapshot::from_json(r#"{"people": [{"id": "a"}]}"#).unwrap_err();
        assert!(matches!(err, FamilyError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_json_survives_encoding() {
        let snapshot = FamilySnapshot::new(
            vec![Person::new("a", "Anna")],
            vec![],
        );
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"firstName\":\"Anna\""));
        assert_eq!(FamilySnapshot::from_json(&json).unwrap(), snapshot);
    }
}
