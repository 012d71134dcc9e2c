use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    errors::PublishingResult,
    value_objects::enums::{content_types::ContentType, publication_statuses::PublicationStatus},
};
use crate::infra::db::postgres::schema::publications;

#[derive(Debug, Clone, Serialize, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = publications)]
pub struct PublicationEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub content_type: String, // POST | REEL, see value_objects/enums/content_types.rs
    pub status: String,       // DRAFT | SCHEDULED | PUBLISHED
    pub publish_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PublicationEntity {
    pub fn content_type(&self) -> PublishingResult<ContentType> {
        self.content_type.parse()
    }

    pub fn status(&self) -> PublishingResult<PublicationStatus> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = publications)]
pub struct InsertPublicationEntity {
    pub client_id: Uuid,
    pub title: String,
    pub content_type: String,
    pub status: String,
    pub publish_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` columns are left untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = publications)]
pub struct UpdatePublicationEntity {
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
