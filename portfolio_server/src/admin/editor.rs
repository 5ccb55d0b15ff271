//! Configuration-driven entity editor: list, view, create, edit and
//! delete-with-confirmation for one collection.
//!
//! Failed submissions keep the editor in its current mode with `error`
//! set, so the user can retry or cancel.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::binding::EntityBinding;
use super::fields::{format_value, parse_text, FieldError, FieldSpec, MediaFieldSpec};
use crate::models::Collection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub collection: Collection,
    pub title: &'static str,
    /// Field shown as the record's name in the list view.
    pub summary_field: &'static str,
    pub fields: Vec<FieldSpec>,
    pub media: Vec<MediaFieldSpec>,
    /// Offer drag reordering instead of editing `order` by hand.
    pub reorderable: bool,
}

impl EditorConfig {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn media_field(&self, name: &str) -> Option<&MediaFieldSpec> {
        self.media.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    List,
    View,
    Edit,
    Create,
    ConfirmDelete,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("no record selected")]
    NothingSelected,
    #[error("cannot {action} while in {mode:?} mode")]
    WrongMode { action: &'static str, mode: EditorMode },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("{0}")]
    Backend(String),
}

pub struct EntityEditor<B> {
    config: EditorConfig,
    binding: B,
    records: Vec<Value>,
    selected: Option<Uuid>,
    mode: EditorMode,
    draft: BTreeMap<&'static str, String>,
    media: BTreeMap<&'static str, Option<String>>,
    error: Option<String>,
    busy: bool,
}

fn record_id(record: &Value) -> Option<Uuid> {
    record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

impl<B: EntityBinding> EntityEditor<B> {
    pub fn new(config: EditorConfig, binding: B) -> Self {
        Self {
            config,
            binding,
            records: Vec::new(),
            selected: None,
            mode: EditorMode::List,
            draft: BTreeMap::new(),
            media: BTreeMap::new(),
            error: None,
            busy: false,
        }
    }

    // ── State accessors ──

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn selected(&self) -> Option<&Value> {
        let id = self.selected?;
        self.records.iter().find(|r| record_id(r) == Some(id))
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn draft_value(&self, name: &str) -> Option<&str> {
        self.draft.get(name).map(String::as_str)
    }

    pub fn media_value(&self, name: &str) -> Option<&str> {
        self.media.get(name).and_then(|v| v.as_deref())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    /// Display name of a record in the list view.
    pub fn summary(&self, record: &Value) -> String {
        let kind = self
            .config
            .field(self.config.summary_field)
            .map(|f| f.kind)
            .unwrap_or(super::fields::FieldKind::Text);
        format_value(kind, record.get(self.config.summary_field).unwrap_or(&Value::Null))
    }

    // ── Transitions ──

    /// Replace the record list. A selection that vanished upstream is dropped.
    pub fn set_records(&mut self, records: Vec<Value>) {
        self.records = records;
        if let Some(id) = self.selected {
            if !self.records.iter().any(|r| record_id(r) == Some(id)) {
                self.selected = None;
                if self.mode != EditorMode::Create {
                    self.mode = EditorMode::List;
                }
            }
        }
    }

    /// Reload the records from the binding.
    pub async fn refresh(&mut self) -> Result<(), EditorError> {
        self.busy = true;
        let result = self.binding.list(self.config.collection).await;
        self.busy = false;
        match result {
            Ok(records) => {
                self.set_records(records);
                Ok(())
            }
            Err(e) => Err(self.fail(EditorError::Backend(e.to_string()))),
        }
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), EditorError> {
        if !self.records.iter().any(|r| record_id(r) == Some(id)) {
            return Err(EditorError::NothingSelected);
        }
        self.selected = Some(id);
        self.mode = EditorMode::View;
        self.error = None;
        Ok(())
    }

    pub fn begin_create(&mut self) {
        self.draft = self
            .config
            .fields
            .iter()
            .map(|f| (f.name, String::new()))
            .collect();
        self.media = self.config.media.iter().map(|m| (m.name, None)).collect();
        self.mode = EditorMode::Create;
        self.error = None;
    }

    pub fn begin_edit(&mut self) -> Result<(), EditorError> {
        let record = self.selected().cloned().ok_or(EditorError::NothingSelected)?;
        self.draft = self
            .config
            .fields
            .iter()
            .map(|f| {
                let value = record.get(f.name).unwrap_or(&Value::Null);
                (f.name, format_value(f.kind, value))
            })
            .collect();
        self.media = self
            .config
            .media
            .iter()
            .map(|m| {
                let url = record.get(m.name).and_then(Value::as_str).map(str::to_string);
                (m.name, url)
            })
            .collect();
        self.mode = EditorMode::Edit;
        self.error = None;
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, text: impl Into<String>) -> Result<(), EditorError> {
        let spec = self
            .config
            .field(name)
            .ok_or_else(|| EditorError::UnknownField(name.to_string()))?;
        self.draft.insert(spec.name, text.into());
        Ok(())
    }

    /// Bind an uploaded file's URL (or clear it) on a media field.
    pub fn bind_media(&mut self, name: &str, url: Option<String>) -> Result<(), EditorError> {
        let spec = self
            .config
            .media_field(name)
            .ok_or_else(|| EditorError::UnknownField(name.to_string()))?;
        self.media.insert(spec.name, url);
        Ok(())
    }

    /// Step back one level without saving.
    pub fn cancel(&mut self) {
        self.mode = match self.mode {
            EditorMode::Edit | EditorMode::ConfirmDelete => EditorMode::View,
            EditorMode::Create if self.selected.is_some() => EditorMode::View,
            EditorMode::Create | EditorMode::View | EditorMode::List => {
                self.selected = None;
                EditorMode::List
            }
        };
        self.error = None;
    }

    /// Validate the draft and create or update the record.
    ///
    /// On success the saved record is selected and the editor shows it.
    pub async fn submit(&mut self) -> Result<Uuid, EditorError> {
        let payload = match self.mode {
            EditorMode::Create | EditorMode::Edit => self.payload().map_err(|e| self.fail(e))?,
            mode => {
                return Err(EditorError::WrongMode {
                    action: "submit",
                    mode,
                })
            }
        };

        self.busy = true;
        let collection = self.config.collection;
        let result = match (self.mode, self.selected) {
            (EditorMode::Edit, Some(id)) => self.binding.update(collection, id, payload).await,
            (EditorMode::Edit, None) => {
                self.busy = false;
                return Err(self.fail(EditorError::NothingSelected));
            }
            _ => self.binding.create(collection, payload).await,
        };
        self.busy = false;

        let saved = result.map_err(|e| self.fail(EditorError::Backend(e.to_string())))?;
        let id = record_id(&saved)
            .ok_or_else(|| self.fail(EditorError::Backend("saved record has no id".into())))?;

        match self.records.iter_mut().find(|r| record_id(r) == Some(id)) {
            Some(existing) => *existing = saved,
            None => self.records.push(saved),
        }
        self.selected = Some(id);
        self.mode = EditorMode::View;
        self.error = None;
        tracing::debug!(collection = %collection, %id, "Editor saved record");
        Ok(id)
    }

    pub fn request_delete(&mut self) -> Result<(), EditorError> {
        if self.selected().is_none() {
            return Err(EditorError::NothingSelected);
        }
        self.mode = EditorMode::ConfirmDelete;
        self.error = None;
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        if self.mode == EditorMode::ConfirmDelete {
            self.mode = EditorMode::View;
        }
    }

    /// Delete the selected record. Only valid after `request_delete`.
    pub async fn confirm_delete(&mut self) -> Result<(), EditorError> {
        if self.mode != EditorMode::ConfirmDelete {
            return Err(EditorError::WrongMode {
                action: "delete",
                mode: self.mode,
            });
        }
        let id = self.selected.ok_or(EditorError::NothingSelected)?;

        self.busy = true;
        let result = self.binding.delete(self.config.collection, id).await;
        self.busy = false;
        result.map_err(|e| self.fail(EditorError::Backend(e.to_string())))?;

        self.records.retain(|r| record_id(r) != Some(id));
        self.selected = None;
        self.mode = EditorMode::List;
        self.error = None;
        Ok(())
    }

    fn payload(&self) -> Result<Value, EditorError> {
        let mut fields = Map::new();
        for spec in &self.config.fields {
            let text = self.draft.get(spec.name).map(String::as_str).unwrap_or_default();
            // Blank optional fields are left out so the record's defaults apply.
            match parse_text(spec, text)? {
                Value::Null => {}
                value => {
                    fields.insert(spec.name.to_string(), value);
                }
            }
        }
        for spec in &self.config.media {
            if let Some(url) = self.media.get(spec.name).cloned().flatten() {
                fields.insert(spec.name.to_string(), Value::String(url));
            }
        }
        Ok(Value::Object(fields))
    }

    fn fail(&mut self, error: EditorError) -> EditorError {
        self.error = Some(error.to_string());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::binding::LocalBinding;
    use crate::admin::configs::editor_config;
    use crate::services::ContentBackend;

    fn editor() -> EntityEditor<LocalBinding> {
        let backend = ContentBackend::in_memory();
        EntityEditor::new(
            editor_config(Collection::Projects),
            LocalBinding::new(backend),
        )
    }

    fn fill(editor: &mut EntityEditor<LocalBinding>, title: &str) {
        editor.set_field("title", title).unwrap();
        editor.set_field("description", "A project").unwrap();
        editor.set_field("status", "completed").unwrap();
        editor.set_field("tech_stack", "Rust, Axum").unwrap();
    }

    #[tokio::test]
    async fn create_selects_new_record_and_views_it() {
        let mut editor = editor();
        editor.begin_create();
        fill(&mut editor, "Portfolio");
        editor.bind_media("image_url", Some("/files/abc".into())).unwrap();

        let id = editor.submit().await.unwrap();
        assert_eq!(editor.mode(), EditorMode::View);
        assert_eq!(editor.selected_id(), Some(id));
        let record = editor.selected().unwrap();
        assert_eq!(record["tech_stack"], serde_json::json!(["Rust", "Axum"]));
        assert_eq!(record["image_url"], "/files/abc");
        assert_eq!(editor.summary(record), "Portfolio");
    }

    #[tokio::test]
    async fn missing_required_field_stays_in_mode_with_error() {
        let mut editor = editor();
        editor.begin_create();
        fill(&mut editor, "");

        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, EditorError::Field(FieldError::Required { label: "Title" })));
        assert_eq!(editor.mode(), EditorMode::Create);
        assert_eq!(editor.error(), Some("Title is required"));
        assert!(!editor.busy());
    }

    #[tokio::test]
    async fn edit_round_trips_through_form_text() {
        let mut editor = editor();
        editor.begin_create();
        fill(&mut editor, "Before");
        editor.submit().await.unwrap();

        editor.begin_edit().unwrap();
        assert_eq!(editor.draft_value("tech_stack"), Some("Rust, Axum"));
        editor.set_field("title", "After").unwrap();
        editor.submit().await.unwrap();

        assert_eq!(editor.mode(), EditorMode::View);
        assert_eq!(editor.selected().unwrap()["title"], "After");
        assert_eq!(editor.records().len(), 1);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut editor = editor();
        editor.begin_create();
        fill(&mut editor, "Doomed");
        editor.submit().await.unwrap();

        assert!(matches!(
            editor.confirm_delete().await,
            Err(EditorError::WrongMode { .. })
        ));

        editor.request_delete().unwrap();
        editor.cancel_delete();
        assert_eq!(editor.mode(), EditorMode::View);

        editor.request_delete().unwrap();
        editor.confirm_delete().await.unwrap();
        assert_eq!(editor.mode(), EditorMode::List);
        assert_eq!(editor.selected_id(), None);
        assert!(editor.records().is_empty());
    }

    #[tokio::test]
    async fn vanished_selection_returns_to_list() {
        let mut editor = editor();
        editor.begin_create();
        fill(&mut editor, "Gone soon");
        editor.submit().await.unwrap();

        editor.set_records(Vec::new());
        assert_eq!(editor.mode(), EditorMode::List);
        assert_eq!(editor.selected_id(), None);
    }

    #[tokio::test]
    async fn backend_rejection_is_reported_inline() {
        let backend = ContentBackend::in_memory();
        let mut editor = EntityEditor::new(
            editor_config(Collection::Certificates),
            LocalBinding::new(backend),
        );
        editor.begin_create();
        editor.set_field("title", "CKA").unwrap();
        editor.set_field("issue_date", "2023-05").unwrap();
        editor.set_field("provider_id", Uuid::new_v4().to_string()).unwrap();

        assert!(matches!(editor.submit().await, Err(EditorError::Backend(_))));
        assert_eq!(editor.mode(), EditorMode::Create);
        assert!(editor.error().unwrap().contains("does not exist"));
        assert!(editor.set_field("nope", "x").is_err());
    }
}
