use serde_json::{Map, Value};

use crate::agent::error::AgentError;
use crate::agent::input_types::TaskKind;

/// JSON object returned to callers
pub type Payload = Map<String, Value>;

/// Outcome of one step of the live path. The agent boundary collapses the error side.
pub type AgentResult = Result<Payload, AgentError>;

/// Shape a field value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    TextList,
    Object,
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::TextList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            FieldKind::Object => value.is_object(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Number => "a number",
            FieldKind::TextList => "a list of strings",
            FieldKind::Object => "an object",
        }
    }
}

/// Required fields of a task's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub fields: &'static [(&'static str, FieldKind)],
}

const SITE_AUDIT_FIELDS: &[(&str, FieldKind)] = &[
    ("score", FieldKind::Number),
    ("summary", FieldKind::Text),
    ("improvements", FieldKind::TextList),
    ("quick_win", FieldKind::Text),
];

const IMAGE_ANALYSIS_FIELDS: &[(&str, FieldKind)] = &[
    ("type", FieldKind::Text),
    ("data", FieldKind::Object),
    ("insight", FieldKind::Text),
];

const COPY_GENERATION_FIELDS: &[(&str, FieldKind)] = &[
    ("headline", FieldKind::Text),
    ("subheadline", FieldKind::Text),
    ("benefits", FieldKind::TextList),
    ("cta", FieldKind::Text),
];

const UI_GENERATION_FIELDS: &[(&str, FieldKind)] = &[("html", FieldKind::Text)];

impl Schema {
    pub fn for_task(kind: TaskKind) -> Self {
        let fields = match kind {
            TaskKind::SiteAudit => SITE_AUDIT_FIELDS,
            TaskKind::ImageAnalysis => IMAGE_ANALYSIS_FIELDS,
            TaskKind::CopyGeneration => COPY_GENERATION_FIELDS,
            TaskKind::UiGeneration => UI_GENERATION_FIELDS,
        };
        Self { fields }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Check that every required field is present with the right shape.
    /// Extra fields are allowed.
    pub fn validate(&self, payload: &Payload) -> Result<(), AgentError> {
        for (name, kind) in self.fields {
            match payload.get(*name) {
                None => {
                    return Err(AgentError::Parse(format!("missing required field '{}'", name)))
                }
                Some(value) if !kind.matches(value) => {
                    return Err(AgentError::Parse(format!(
                        "field '{}' must be {}",
                        name,
                        kind.describe()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
