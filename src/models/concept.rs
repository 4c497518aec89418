//! Concept is a single reviewable fact: a prompt, its answer and an optional worked example.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Database id. Zero for concepts that have not been stored yet.
    #[serde(default)]
    pub id: i64,
    pub topic: String,
    pub prompt: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Concept {
    pub fn new(topic: &str, prompt: &str, answer: &str) -> Self {
        Self {
            id: 0,
            topic: topic.to_string(),
            prompt: prompt.to_string(),
            answer: answer.to_string(),
            example: None,
        }
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_creation() {
        let concept = Concept::new("physics", "F = ?", "m * a");

        assert_eq!(concept.id, 0);
        assert_eq!(concept.topic, "physics");
        assert_eq!(concept.prompt, "F = ?");
        assert_eq!(concept.answer, "m * a");
        assert!(concept.example.is_none());
    }

    #[test]
    fn test_concept_example_is_omitted_from_json_when_missing() {
        let concept = Concept::new("physics", "F = ?", "m * a");
        let json = serde_json::to_string(&concept).unwrap();
        assert!(!json.contains("example"));

        let with_example = concept.with_example("2 kg * 3 m/s^2 = 6 N");
        let json = serde_json::to_string(&with_example).unwrap();
        assert!(json.contains("6 N"));
    }
}
