use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::clients;

/// Client rows are owned by the account management side; this crate only reads them.
#[derive(Debug, Clone, Serialize, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = clients)]
pub struct ClientEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub plan: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl ClientEntity {
    pub fn is_active(&self) -> bool {
        self.status
    }
}
