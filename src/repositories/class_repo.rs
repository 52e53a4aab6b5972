//! Read-only class and section lookups.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::ClassStore;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Class, Section};
use crate::schema::{classes, sections};

#[derive(Clone)]
pub struct ClassRepository {
    pool: AsyncDbPool,
}

impl ClassRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassStore for ClassRepository {
    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        let mut conn = self.pool.get().await?;

        classes::table
            .select(Class::as_select())
            .order(classes::name.asc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn list_sections(&self) -> AppResult<Vec<Section>> {
        let mut conn = self.pool.get().await?;

        sections::table
            .select(Section::as_select())
            .order(sections::name.asc())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
