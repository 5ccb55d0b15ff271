//! Generic CRUD over every content collection.

use serde_json::Value;
use uuid::Uuid;

use super::{ContentBackend, ContentError};
use crate::events::{ChangeKind, ContentEvent};
use crate::models::{to_new_document, Collection, Entity, Record, ValidationError};

/// Run `$body` with `$ty` bound to the entity type stored in `$collection`.
macro_rules! with_entity {
    ($collection:expr, $ty:ident => $body:expr) => {{
        use $crate::models::*;
        match $collection {
            Collection::Experiences => {
                type $ty = Experience;
                $body
            }
            Collection::Projects => {
                type $ty = Project;
                $body
            }
            Collection::Languages => {
                type $ty = Language;
                $body
            }
            Collection::Technologies => {
                type $ty = Technology;
                $body
            }
            Collection::Providers => {
                type $ty = Provider;
                $body
            }
            Collection::Certificates => {
                type $ty = Certificate;
                $body
            }
            Collection::AboutCategories => {
                type $ty = AboutCategory;
                $body
            }
            Collection::AboutItems => {
                type $ty = AboutItem;
                $body
            }
        }
    }};
}
pub(crate) use with_entity;

/// List all records of `T`, in display order.
pub async fn list<T: Entity>(backend: &ContentBackend) -> Result<Vec<Record<T>>, ContentError> {
    let docs = backend.store.list(T::COLLECTION).await?;
    docs.into_iter()
        .map(|doc| Record::from_document(doc).map_err(ContentError::from))
        .collect()
}

pub async fn get<T: Entity>(backend: &ContentBackend, id: Uuid) -> Result<Record<T>, ContentError> {
    let doc = backend
        .store
        .get(T::COLLECTION, id)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("{} record {id} not found", T::COLLECTION)))?;
    Ok(Record::from_document(doc)?)
}

/// Create a record. An order of zero or less appends it at the end.
pub async fn create<T: Entity>(backend: &ContentBackend, mut fields: T) -> Result<Record<T>, ContentError> {
    fields.validate()?;
    let _guard = backend.write_guard().await;
    check_references(backend, &fields).await?;
    if fields.order() <= 0 {
        fields.set_order(next_order(backend, T::COLLECTION).await?);
    }

    let doc = backend
        .store
        .insert(T::COLLECTION, to_new_document(&fields)?)
        .await?;
    let record = Record::<T>::from_document(doc)?;

    crate::metrics::mutation(T::COLLECTION.as_str(), "create");
    backend
        .events
        .publish(ContentEvent::record(T::COLLECTION, ChangeKind::Created, record.id));
    tracing::info!(collection = %T::COLLECTION, id = %record.id, "Record created");

    Ok(record)
}

/// Replace a record's fields. An order of zero or less keeps the stored order.
pub async fn update<T: Entity>(
    backend: &ContentBackend,
    id: Uuid,
    mut fields: T,
) -> Result<Record<T>, ContentError> {
    fields.validate()?;
    let _guard = backend.write_guard().await;
    check_references(backend, &fields).await?;
    if fields.order() <= 0 {
        let existing = get::<T>(backend, id).await?;
        fields.set_order(existing.fields.order());
    }

    let doc = backend
        .store
        .replace(T::COLLECTION, id, to_new_document(&fields)?)
        .await?;
    let record = Record::<T>::from_document(doc)?;

    crate::metrics::mutation(T::COLLECTION.as_str(), "update");
    backend
        .events
        .publish(ContentEvent::record(T::COLLECTION, ChangeKind::Updated, id));
    tracing::info!(collection = %T::COLLECTION, id = %id, "Record updated");

    Ok(record)
}

/// Delete a record. Refuses while other records still reference it.
pub async fn delete<T: Entity>(backend: &ContentBackend, id: Uuid) -> Result<(), ContentError> {
    let _guard = backend.write_guard().await;
    if let Some((dependent, field)) = dependent_of(T::COLLECTION) {
        let key = id.to_string();
        let referencing = backend
            .store
            .list(dependent)
            .await?
            .iter()
            .filter(|doc| doc.data.get(field).and_then(Value::as_str) == Some(key.as_str()))
            .count();
        if referencing > 0 {
            return Err(ContentError::Conflict(format!(
                "{} record {id} is still referenced by {referencing} {dependent} record(s)",
                T::COLLECTION
            )));
        }
    }

    if !backend.store.remove(T::COLLECTION, id).await? {
        return Err(ContentError::NotFound(format!(
            "{} record {id} not found",
            T::COLLECTION
        )));
    }

    crate::metrics::mutation(T::COLLECTION.as_str(), "delete");
    backend
        .events
        .publish(ContentEvent::record(T::COLLECTION, ChangeKind::Deleted, id));
    tracing::info!(collection = %T::COLLECTION, id = %id, "Record deleted");

    Ok(())
}

/// Collections holding a foreign key into `collection`, with the key field.
fn dependent_of(collection: Collection) -> Option<(Collection, &'static str)> {
    match collection {
        Collection::Providers => Some((Collection::Certificates, "provider_id")),
        Collection::AboutCategories => Some((Collection::AboutItems, "category_id")),
        _ => None,
    }
}

async fn check_references<T: Entity>(backend: &ContentBackend, fields: &T) -> Result<(), ContentError> {
    for (collection, id) in fields.references() {
        if backend.store.get(collection, id).await?.is_none() {
            return Err(ValidationError::new(
                collection.as_str(),
                format!("referenced record {id} does not exist"),
            )
            .into());
        }
    }
    Ok(())
}

async fn next_order(backend: &ContentBackend, collection: Collection) -> Result<i32, ContentError> {
    let docs = backend.store.list(collection).await?;
    Ok(docs.iter().map(|d| d.order).max().unwrap_or(0) + 1)
}

// ── Untyped entry points (HTTP API, editor bindings) ──

pub async fn list_json(backend: &ContentBackend, collection: Collection) -> Result<Vec<Value>, ContentError> {
    with_entity!(collection, T => {
        list::<T>(backend)
            .await?
            .into_iter()
            .map(|r| serde_json::to_value(r).map_err(ContentError::from))
            .collect()
    })
}

pub async fn get_json(backend: &ContentBackend, collection: Collection, id: Uuid) -> Result<Value, ContentError> {
    with_entity!(collection, T => {
        Ok(serde_json::to_value(get::<T>(backend, id).await?)?)
    })
}

pub async fn create_json(
    backend: &ContentBackend,
    collection: Collection,
    body: Value,
) -> Result<Value, ContentError> {
    with_entity!(collection, T => {
        let fields: T = serde_json::from_value(body)?;
        Ok(serde_json::to_value(create(backend, fields).await?)?)
    })
}

pub async fn update_json(
    backend: &ContentBackend,
    collection: Collection,
    id: Uuid,
    body: Value,
) -> Result<Value, ContentError> {
    with_entity!(collection, T => {
        let fields: T = serde_json::from_value(body)?;
        Ok(serde_json::to_value(update(backend, id, fields).await?)?)
    })
}

pub async fn delete_json(backend: &ContentBackend, collection: Collection, id: Uuid) -> Result<(), ContentError> {
    with_entity!(collection, T => delete::<T>(backend, id).await)
}
