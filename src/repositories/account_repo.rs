//! Account lookups shared by every role.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::AccountStore;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::Account;

#[derive(Clone)]
pub struct AccountRepository {
    pool: AsyncDbPool,
}

impl AccountRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find_by_id(&self, account_id: i32) -> AppResult<Option<Account>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(id.eq(account_id))
            .select(Account::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }
}
