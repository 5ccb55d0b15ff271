//! Diesel table definitions for the portfolio content store.
//!
//! Tables: content_documents, site_settings, stored_files.
//! Every collection shares `content_documents`, discriminated by `collection`.

diesel::table! {
    content_documents (id) {
        id -> Uuid,
        collection -> Varchar,
        sort_order -> Int4,
        data -> Jsonb,
        create_date -> Timestamptz,
        write_date -> Timestamptz,
    }
}

diesel::table! {
    site_settings (key) {
        key -> Varchar,
        data -> Jsonb,
        create_date -> Timestamptz,
        write_date -> Timestamptz,
    }
}

diesel::table! {
    stored_files (id) {
        id -> Uuid,
        content_type -> Varchar,
        size_bytes -> Int8,
        sha256 -> Varchar,
        file_name -> Varchar,
        create_date -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(content_documents, site_settings, stored_files);
