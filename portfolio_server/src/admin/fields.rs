//! Form fields: how each kind of stored value is shown as editable text
//! and parsed back.

use serde_json::Value;
use uuid::Uuid;

use crate::models::Collection;
use crate::services::upload_service::UploadKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    /// Integer; unparsable input becomes 0.
    Number,
    /// Array of strings edited as `a, b, c`.
    Csv,
    /// Array of strings edited one per line.
    Lines,
    Select(&'static [&'static str]),
    /// Id of a record in another collection.
    Reference(Collection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

/// A field holding the URL of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaFieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: UploadKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{label} is required")]
    Required { label: &'static str },
    #[error("{label}: '{value}' is not one of {}", .options.join(", "))]
    NotAnOption {
        label: &'static str,
        value: String,
        options: &'static [&'static str],
    },
    #[error("{label}: '{value}' is not a valid record id")]
    InvalidReference { label: &'static str, value: String },
}

/// Render a stored value as editable text.
pub fn format_value(kind: FieldKind, value: &Value) -> String {
    match (kind, value) {
        (_, Value::Null) => String::new(),
        (FieldKind::Csv, Value::Array(items)) => join_strings(items, ", "),
        (FieldKind::Lines, Value::Array(items)) => join_strings(items, "\n"),
        (_, Value::String(s)) => s.clone(),
        (_, other) => other.to_string(),
    }
}

fn join_strings(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parse editable text back into the stored shape.
///
/// Blank input is `null` (or an empty array for list fields) unless the
/// field is required.
pub fn parse_text(spec: &FieldSpec, text: &str) -> Result<Value, FieldError> {
    let trimmed = text.trim();
    let list = |separator: char| -> Vec<Value> {
        text.split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect()
    };

    let value = match spec.kind {
        FieldKind::Csv => Value::Array(list(',')),
        FieldKind::Lines => Value::Array(list('\n')),
        _ if trimmed.is_empty() => Value::Null,
        FieldKind::Text | FieldKind::TextArea => Value::String(trimmed.to_string()),
        FieldKind::Number => Value::from(trimmed.parse::<i64>().unwrap_or(0)),
        FieldKind::Select(options) => {
            if !options.iter().any(|o| *o == trimmed) {
                return Err(FieldError::NotAnOption {
                    label: spec.label,
                    value: trimmed.to_string(),
                    options,
                });
            }
            Value::String(trimmed.to_string())
        }
        FieldKind::Reference(_) => {
            let id = Uuid::parse_str(trimmed).map_err(|_| FieldError::InvalidReference {
                label: spec.label,
                value: trimmed.to_string(),
            })?;
            Value::String(id.to_string())
        }
    };

    let empty = match &value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if spec.required && empty {
        return Err(FieldError::Required { label: spec.label });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LEVELS: &[&str] = &["native", "fluent"];

    #[test]
    fn csv_round_trip_drops_blank_entries() {
        let spec = FieldSpec::new("tech_stack", "Tech stack", FieldKind::Csv);
        let stored = json!(["Rust", "PostgreSQL", "Axum"]);
        let text = format_value(spec.kind, &stored);
        assert_eq!(text, "Rust, PostgreSQL, Axum");
        assert_eq!(parse_text(&spec, &text).unwrap(), stored);
        assert_eq!(parse_text(&spec, " Rust ,, Axum ,").unwrap(), json!(["Rust", "Axum"]));
    }

    #[test]
    fn lines_round_trip() {
        let spec = FieldSpec::new("features", "Features", FieldKind::Lines);
        let stored = json!(["Fast search", "Offline mode, with sync"]);
        let text = format_value(spec.kind, &stored);
        assert_eq!(text, "Fast search\nOffline mode, with sync");
        assert_eq!(parse_text(&spec, &format!("{text}\n\n")).unwrap(), stored);
    }

    #[test]
    fn number_falls_back_to_zero() {
        let spec = FieldSpec::new("order", "Order", FieldKind::Number);
        assert_eq!(parse_text(&spec, "7").unwrap(), json!(7));
        assert_eq!(parse_text(&spec, "seven").unwrap(), json!(0));
        assert_eq!(format_value(spec.kind, &json!(3)), "3");
    }

    #[test]
    fn select_checks_options() {
        let spec = FieldSpec::new("level", "Level", FieldKind::Select(LEVELS)).required();
        assert_eq!(parse_text(&spec, "fluent").unwrap(), json!("fluent"));
        let err = parse_text(&spec, "expert").unwrap_err();
        assert_eq!(err.to_string(), "Level: 'expert' is not one of native, fluent");
        assert_eq!(parse_text(&spec, " ").unwrap_err(), FieldError::Required { label: "Level" });
    }

    #[test]
    fn required_and_optional_blanks() {
        let title = FieldSpec::new("title", "Title", FieldKind::Text).required();
        assert!(matches!(parse_text(&title, "  "), Err(FieldError::Required { .. })));
        let bio = FieldSpec::new("bio", "Bio", FieldKind::TextArea);
        assert_eq!(parse_text(&bio, "").unwrap(), Value::Null);
        assert_eq!(format_value(bio.kind, &Value::Null), "");
    }

    #[test]
    fn reference_must_be_an_id() {
        let spec = FieldSpec::new("provider_id", "Provider", FieldKind::Reference(Collection::Providers));
        let id = Uuid::new_v4();
        assert_eq!(parse_text(&spec, &id.to_string()).unwrap(), json!(id.to_string()));
        assert!(matches!(
            parse_text(&spec, "aws"),
            Err(FieldError::InvalidReference { .. })
        ));
    }
}
