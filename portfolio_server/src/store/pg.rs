//! PostgreSQL content store (diesel-async over a deadpool pool).

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{validate_reorder, ContentStore, StoreError, StoreResult};
use crate::models::document::{DocumentRow, NewDocumentRow, NewSettingsRow, SettingsRow};
use crate::models::{Collection, Document, NewDocument, NewStoredFile, OrderAssignment, StoredFile};
use crate::schema::{content_documents, site_settings, stored_files};

pub type PgPool = Pool<AsyncPgConnection>;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build a pool for `database_url`. Connections are opened lazily.
    pub fn connect(database_url: &str, max_size: usize) -> StoreResult<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(max_size)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Create the content tables if they are missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut conn = self.conn().await?;
        crate::migration::run_migration(&mut conn).await
    }

    async fn conn(&self) -> StoreResult<Object<AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

fn into_documents(rows: Vec<DocumentRow>) -> StoreResult<Vec<Document>> {
    rows.into_iter()
        .map(|row| row.into_document().map_err(StoreError::Corrupt))
        .collect()
}

async fn load_collection(
    conn: &mut AsyncPgConnection,
    collection: Collection,
) -> StoreResult<Vec<Document>> {
    let rows = content_documents::table
        .filter(content_documents::collection.eq(collection.as_str()))
        .order((
            content_documents::sort_order.asc(),
            content_documents::create_date.asc(),
            content_documents::id.asc(),
        ))
        .load::<DocumentRow>(conn)
        .await?;
    into_documents(rows)
}

async fn find_document(
    conn: &mut AsyncPgConnection,
    collection: Collection,
    id: Uuid,
) -> StoreResult<Option<Document>> {
    let row = content_documents::table
        .filter(content_documents::id.eq(id))
        .filter(content_documents::collection.eq(collection.as_str()))
        .first::<DocumentRow>(conn)
        .await
        .optional()?;
    row.map(|r| r.into_document().map_err(StoreError::Corrupt))
        .transpose()
}

async fn insert_document(
    conn: &mut AsyncPgConnection,
    collection: Collection,
    doc: NewDocument,
) -> StoreResult<Document> {
    let row = NewDocumentRow {
        id: Uuid::new_v4(),
        collection: collection.as_str().to_string(),
        sort_order: doc.order,
        data: doc.data,
    };
    let result = diesel::insert_into(content_documents::table)
        .values(&row)
        .get_result::<DocumentRow>(conn)
        .await?;
    result.into_document().map_err(StoreError::Corrupt)
}

async fn replace_document(
    conn: &mut AsyncPgConnection,
    collection: Collection,
    id: Uuid,
    doc: NewDocument,
) -> StoreResult<Document> {
    let row = diesel::update(
        content_documents::table
            .filter(content_documents::id.eq(id))
            .filter(content_documents::collection.eq(collection.as_str())),
    )
    .set((
        content_documents::sort_order.eq(doc.order),
        content_documents::data.eq(doc.data),
        content_documents::write_date.eq(Utc::now()),
    ))
    .get_result::<DocumentRow>(conn)
    .await
    .optional()?
    .ok_or(StoreError::NotFound { collection, id })?;
    row.into_document().map_err(StoreError::Corrupt)
}

async fn apply_reorder(
    conn: &mut AsyncPgConnection,
    collection: Collection,
    assignments: Vec<OrderAssignment>,
) -> StoreResult<()> {
    let name = collection.as_str();
    conn.transaction::<_, StoreError, _>(|conn| {
        async move {
            // lock the collection's rows so the id set cannot move under us
            let existing: Vec<Uuid> = content_documents::table
                .filter(content_documents::collection.eq(name))
                .select(content_documents::id)
                .for_update()
                .load::<Uuid>(conn)
                .await?;

            validate_reorder(&existing, &assignments)?;

            let now = Utc::now();
            for assignment in &assignments {
                diesel::update(content_documents::table.find(assignment.id))
                    .set((
                        content_documents::sort_order.eq(assignment.order),
                        content_documents::write_date.eq(now),
                    ))
                    .execute(conn)
                    .await?;
            }
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

#[async_trait]
impl ContentStore for PgStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let mut conn = self.conn().await?;
        load_collection(&mut conn, collection).await
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Document>> {
        let mut conn = self.conn().await?;
        find_document(&mut conn, collection, id).await
    }

    async fn insert(&self, collection: Collection, doc: NewDocument) -> StoreResult<Document> {
        let mut conn = self.conn().await?;
        insert_document(&mut conn, collection, doc).await
    }

    async fn replace(&self, collection: Collection, id: Uuid, doc: NewDocument) -> StoreResult<Document> {
        let mut conn = self.conn().await?;
        replace_document(&mut conn, collection, id, doc).await
    }

    async fn remove(&self, collection: Collection, id: Uuid) -> StoreResult<bool> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let deleted = diesel::delete(
            content_documents::table
                .filter(content_documents::id.eq(id))
                .filter(content_documents::collection.eq(collection.as_str())),
        )
        .execute(conn)
        .await?;
        Ok(deleted > 0)
    }

    async fn reorder(&self, collection: Collection, assignments: &[OrderAssignment]) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        apply_reorder(&mut conn, collection, assignments.to_vec()).await
    }

    async fn count(&self, collection: Collection) -> StoreResult<i64> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let count = content_documents::table
            .filter(content_documents::collection.eq(collection.as_str()))
            .count()
            .get_result::<i64>(conn)
            .await?;
        Ok(count)
    }

    async fn clear(&self, collection: Collection) -> StoreResult<u64> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let deleted = diesel::delete(
            content_documents::table.filter(content_documents::collection.eq(collection.as_str())),
        )
        .execute(conn)
        .await?;
        Ok(deleted as u64)
    }

    async fn find_settings(&self, key: &str) -> StoreResult<Option<SettingsRow>> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let row = site_settings::table
            .find(key)
            .first::<SettingsRow>(conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn upsert_settings(&self, key: &str, data: serde_json::Value) -> StoreResult<SettingsRow> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let row = NewSettingsRow {
            key: key.to_string(),
            data: data.clone(),
        };
        let result = diesel::insert_into(site_settings::table)
            .values(&row)
            .on_conflict(site_settings::key)
            .do_update()
            .set((
                site_settings::data.eq(data),
                site_settings::write_date.eq(Utc::now()),
            ))
            .get_result::<SettingsRow>(conn)
            .await?;
        Ok(result)
    }

    async fn insert_file(&self, file: NewStoredFile) -> StoreResult<StoredFile> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let id = file.id;
        match diesel::insert_into(stored_files::table)
            .values(&file)
            .get_result::<StoredFile>(conn)
            .await
        {
            Ok(stored) => Ok(stored),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(
                StoreError::Conflict(format!("upload target {id} was already used")),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_file(&self, id: Uuid) -> StoreResult<Option<StoredFile>> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let file = stored_files::table
            .find(id)
            .first::<StoredFile>(conn)
            .await
            .optional()?;
        Ok(file)
    }

    async fn count_files(&self) -> StoreResult<i64> {
        let mut obj = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut obj;
        let count = stored_files::table
            .count()
            .get_result::<i64>(conn)
            .await?;
        Ok(count)
    }
}
