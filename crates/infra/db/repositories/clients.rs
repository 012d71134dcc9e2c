use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{entities::clients::ClientEntity, repositories::clients::ClientRepository},
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::clients},
};

pub struct ClientPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ClientPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ClientRepository for ClientPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ClientEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<ClientEntity>> {
            let mut conn = db_pool.get()?;

            let result = clients::table
                .filter(clients::user_id.eq(user_id))
                .select(ClientEntity::as_select())
                .first::<ClientEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await?
    }
}
