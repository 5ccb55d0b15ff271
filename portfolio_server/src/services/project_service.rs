//! Project ordering. Projects are the only collection with bulk reorder.

use super::{ContentBackend, ContentError};
use crate::events::{ChangeKind, ContentEvent};
use crate::models::{Collection, OrderAssignment, ValidationError};

/// Replace every project's order in one atomic step.
///
/// The payload must name each existing project exactly once with orders
/// `1..=N`. Any violation rejects the whole batch and leaves stored orders
/// untouched.
pub async fn reorder_projects(
    backend: &ContentBackend,
    assignments: &[OrderAssignment],
) -> Result<(), ContentError> {
    if let Some(bad) = assignments.iter().find(|a| a.id.is_nil()) {
        crate::metrics::reorder("rejected");
        return Err(ValidationError::new("id", format!("nil project id at order {}", bad.order)).into());
    }
    if let Some(bad) = assignments.iter().find(|a| a.order < 1) {
        crate::metrics::reorder("rejected");
        return Err(ValidationError::new("order", format!("order {} for {} must be positive", bad.order, bad.id)).into());
    }

    let _guard = backend.write_guard().await;
    match backend.store.reorder(Collection::Projects, assignments).await {
        Ok(()) => {
            crate::metrics::reorder("applied");
            backend
                .events
                .publish(ContentEvent::collection(Collection::Projects, ChangeKind::Reordered));
            tracing::info!(count = assignments.len(), "Projects reordered");
            Ok(())
        }
        Err(e) => {
            crate::metrics::reorder("rejected");
            tracing::warn!(error = %e, "Project reorder rejected");
            Err(e.into())
        }
    }
}
