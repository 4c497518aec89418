//! Topic groups concepts under one subject tag. Used as the unit of JSON import/export.
use super::Concept;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub concepts: Vec<TopicEntry>,
}

/// A concept as it appears inside a topic file, without id or topic tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicEntry {
    pub prompt: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Topic {
    pub fn from_concepts(name: &str, concepts: &[Concept]) -> Self {
        Self {
            name: name.to_string(),
            concepts: concepts
                .iter()
                .filter(|c| c.topic == name)
                .map(|c| TopicEntry {
                    prompt: c.prompt.clone(),
                    answer: c.answer.clone(),
                    example: c.example.clone(),
                })
                .collect(),
        }
    }

    pub fn to_concepts(&self) -> Vec<Concept> {
        self.concepts
            .iter()
            .map(|entry| Concept {
                id: 0,
                topic: self.name.clone(),
                prompt: entry.prompt.clone(),
                answer: entry.answer.clone(),
                example: entry.example.clone(),
            })
            .collect()
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self {
            name: "General".to_string(),
            concepts: Vec::new(),
        }
    }
}
