use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::media;

#[derive(Debug, Clone, Serialize, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = media)]
pub struct MediaEntity {
    pub id: Uuid,
    pub publication_id: Uuid,
    pub media_type: String, // MIME type as uploaded, example: image/png
    pub url: String,        // storage locator returned by MediaStorage::write_object
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = media)]
pub struct InsertMediaEntity {
    pub publication_id: Uuid,
    pub media_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
