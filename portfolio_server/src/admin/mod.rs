//! Admin console building blocks: declarative entity editors, project
//! reordering and media upload fields, bound either to the in-process
//! services or to the HTTP API through `AdminClient`.

pub mod binding;
pub mod client;
pub mod configs;
pub mod editor;
pub mod fields;
pub mod reorder;
pub mod upload;

pub use binding::{EntityBinding, LocalBinding};
pub use client::AdminClient;
pub use configs::editor_config;
pub use editor::{EditorConfig, EditorError, EditorMode, EntityEditor};
pub use fields::{FieldError, FieldKind, FieldSpec, MediaFieldSpec};
pub use reorder::{DraftState, ReorderDraft, ReorderTarget};
pub use upload::{PendingFile, UploadBackend, UploadField, UploadFieldError};
