//! The bulk reorder contract: a full replace of every order in a collection.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::OrderAssignment;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("record {0} appears more than once in the reorder payload")]
    DuplicateId(Uuid),
    #[error("order {0} is assigned more than once")]
    DuplicateOrder(i32),
    #[error("record {0} does not exist")]
    UnknownId(Uuid),
    #[error("record {0} is missing from the reorder payload")]
    MissingId(Uuid),
    #[error("order {found} is outside the contiguous range 1..={expected}")]
    OutOfRange { found: i32, expected: usize },
}

/// Check a reorder payload against the full set of existing ids.
///
/// Ids must be unique and equal to `existing`; orders must be exactly
/// `1..=existing.len()`.
pub fn validate_reorder(existing: &[Uuid], payload: &[OrderAssignment]) -> Result<(), ReorderError> {
    let mut seen_ids = HashSet::with_capacity(payload.len());
    let mut seen_orders = HashSet::with_capacity(payload.len());

    for assignment in payload {
        if !seen_ids.insert(assignment.id) {
            return Err(ReorderError::DuplicateId(assignment.id));
        }
        if !seen_orders.insert(assignment.order) {
            return Err(ReorderError::DuplicateOrder(assignment.order));
        }
    }

    let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
    if let Some(unknown) = payload.iter().find(|a| !existing_set.contains(&a.id)) {
        return Err(ReorderError::UnknownId(unknown.id));
    }
    if let Some(missing) = existing.iter().find(|id| !seen_ids.contains(*id)) {
        return Err(ReorderError::MissingId(*missing));
    }

    let expected = existing.len();
    if let Some(bad) = payload
        .iter()
        .find(|a| a.order < 1 || a.order as usize > expected)
    {
        return Err(ReorderError::OutOfRange {
            found: bad.order,
            expected,
        });
    }

    Ok(())
}
