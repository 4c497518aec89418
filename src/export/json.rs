//! JSON import/export of topic files.
//! A topic file holds one topic name and its concepts, without database ids.

use crate::database::db;
use crate::error::Result;
use crate::models::Topic;
use log::info;
use rusqlite::Connection;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Writes a topic to a JSON file at the given path.
pub fn export_json_to_path(topic: &Topic, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(topic)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!(
        "Topic '{}' exported to '{}' ({} concepts)",
        topic.name,
        path.display(),
        topic.concepts.len()
    );
    Ok(())
}

/// Reads a topic from a JSON file.
/// Fails if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<Topic> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let topic: Topic = serde_json::from_str(&contents)?;

    info!("Topic '{}' imported from '{}'", topic.name, path.display());
    Ok(topic)
}

/// Stores every concept of a topic file in the catalogue and returns their ids.
/// Concepts already in the catalogue keep their existing id.
pub fn import_json_into(path: &Path, conn: &Connection) -> Result<(Topic, Vec<i64>)> {
    let topic = import_json(path)?;
    let ids = topic
        .to_concepts()
        .iter()
        .map(|concept| db::add_concept(concept, conn))
        .collect::<Result<Vec<i64>>>()?;
    Ok((topic, ids))
}

/// Builds a topic from the catalogue and writes it out.
pub fn export_topic_from_db(name: &str, path: &Path, conn: &Connection) -> Result<Topic> {
    let concepts = db::get_concepts_for_topic(name, conn)?;
    let topic = Topic::from_concepts(name, &concepts);
    export_json_to_path(&topic, path)?;
    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Concept, TopicEntry};
    use std::fs;

    fn create_test_topic() -> Topic {
        Topic {
            name: "Physics".to_string(),
            concepts: vec![
                TopicEntry {
                    prompt: "Newton's second law".to_string(),
                    answer: "F = m * a".to_string(),
                    example: Some("2 kg at 3 m/s^2 needs 6 N".to_string()),
                },
                TopicEntry {
                    prompt: "Kinetic energy".to_string(),
                    answer: "E = m * v^2 / 2".to_string(),
                    example: None,
                },
            ],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("physics.json");

        export_json_to_path(&create_test_topic(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Newton's second law"));
        // missing examples are not written out
        assert_eq!(written.matches("example").count(), 1);
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "name": "Chemistry",
  "concepts": [
    {
      "prompt": "Formula of water",
      "answer": "H2O"
    }
  ]
}"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chemistry.json");
        fs::write(&path, json_content).unwrap();

        let topic = import_json(&path).unwrap();
        assert_eq!(topic.name, "Chemistry");
        assert_eq!(topic.concepts.len(), 1);
        assert_eq!(topic.concepts[0].answer, "H2O");
        assert!(topic.concepts[0].example.is_none());
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import_json(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(
            import_json(&path),
            Err(crate::error::ReviewError::Json(_))
        ));
    }

    #[test]
    fn test_import_into_catalogue_then_export_again() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.json");
        export_json_to_path(&create_test_topic(), &source).unwrap();

        let (topic, ids) = import_json_into(&source, &conn).unwrap();
        assert_eq!(ids.len(), 2);
        let (_, again) = import_json_into(&source, &conn).unwrap();
        assert_eq!(ids, again);

        let stored: Vec<Concept> = db::get_concepts_for_topic("Physics", &conn).unwrap();
        assert_eq!(stored.len(), topic.concepts.len());

        let target = dir.path().join("out.json");
        let exported = export_topic_from_db("Physics", &target, &conn).unwrap();
        assert_eq!(exported.concepts[0].prompt, "Newton's second law");
        assert_eq!(
            exported.concepts[0].example.as_deref(),
            Some("2 kg at 3 m/s^2 needs 6 N")
        );
    }
}
