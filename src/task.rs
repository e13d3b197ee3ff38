//! Task data structures exchanged with the task service.
//!
//! `Task` is the local representation of one to-do item as last fetched from
//! the server. Irregular wire shapes (four status spellings, string-or-record
//! categories, empty strings standing in for null) are normalised here so
//! the rest of the crate never has to check them again.

use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::*;

/// A to-do item as returned by `GET /tasks/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub priority_score: f64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Task {
    /// Priority tier, always derived from `priority_score`.
    pub fn priority(&self) -> Tier {
        Tier::from_score(self.priority_score)
    }

    /// Display name of the category, if any.
    pub fn category_name(&self) -> Option<String> {
        self.category.as_ref().map(Category::name)
    }
}

/// A task category. The service sends either a bare name or a full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Named(String),
    Structured {
        #[serde(default)]
        id: u64,
        name: String,
        #[serde(default, alias = "usageCount")]
        usage_count: u64,
    },
    /// Any other JSON shape, rendered verbatim.
    Other(serde_json::Value),
}

impl Category {
    /// The single accessor used wherever a category is displayed.
    pub fn name(&self) -> String {
        match self {
            Category::Named(name) => name.clone(),
            Category::Structured { name, .. } => name.clone(),
            Category::Other(value) => value.to_string(),
        }
    }
}

/// Body of `POST /tasks/` and of a full-edit `PATCH /tasks/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority_score: f64,
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Body of the status-only `PATCH /tasks/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusPatch {
    pub status: Status,
}

/// Body of `POST /contexts/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewContext {
    pub source: ContextSource,
    pub content: String,
}

/// A stored context entry as echoed back by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Response of `POST /suggestions/`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub priority_score: Option<f64>,
}

/// An unscored task (`null`) ranks as zero.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Treat `null` and `""` alike.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_from_raw_json() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "title": "Prepare slides",
            "description": "",
            "status": "completed",
            "priority_score": 0.9,
            "deadline": null,
            "category": {"id": 2, "name": "Work", "usage_count": 5}
        }))
        .unwrap();

        assert_eq!(task.id, 7);
        assert_eq!(task.description, None);
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.priority(), Tier::High);
        assert_eq!(task.deadline, None);
        assert_eq!(task.category_name().as_deref(), Some("Work"));
    }

    #[test]
    fn test_null_score_is_low() {
        let task: Task = serde_json::from_value(json!({"id": 4, "title": "x", "priority_score": null})).unwrap();
        assert_eq!(task.priority_score, 0.0);
        assert_eq!(task.priority(), Tier::Low);
    }

    #[test]
    fn test_missing_fields_default() {
        let task: Task = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(task.title, "");
        assert_eq!(task.status, Status::Open);
        assert_eq!(task.priority(), Tier::Low);
        assert!(task.category.is_none());
    }

    #[test]
    fn test_category_shapes() {
        let named: Category = serde_json::from_value(json!("Study")).unwrap();
        assert_eq!(named, Category::Named("Study".into()));

        let camel: Category =
            serde_json::from_value(json!({"id": 1, "name": "Home", "usageCount": 3})).unwrap();
        assert_eq!(
            camel,
            Category::Structured { id: 1, name: "Home".into(), usage_count: 3 }
        );

        let odd: Category = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(odd.name(), "42");

        let nameless: Category = serde_json::from_value(json!({"label": "x"})).unwrap();
        assert_eq!(nameless.name(), r#"{"label":"x"}"#);
    }

    #[test]
    fn test_payload_shapes() {
        let create = TaskPayload {
            title: "t".into(),
            description: String::new(),
            category: "Work".into(),
            priority_score: 0.5,
            deadline: None,
            status: Some(Status::Open),
        };
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({
                "title": "t",
                "description": "",
                "category": "Work",
                "priority_score": 0.5,
                "deadline": null,
                "status": "pending"
            })
        );

        let update = TaskPayload { status: None, ..create };
        assert!(serde_json::to_value(&update).unwrap().get("status").is_none());

        let patch = StatusPatch { status: Status::Done };
        assert_eq!(serde_json::to_value(patch).unwrap(), json!({"status": "done"}));
    }

    #[test]
    fn test_suggestion_treats_empty_as_absent() {
        let s: Suggestion = serde_json::from_value(json!({
            "title": "",
            "priority_score": 0.85,
            "category": "Work"
        }))
        .unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.priority_score, Some(0.85));
        assert_eq!(s.category, Some(Category::Named("Work".into())));
    }
}
