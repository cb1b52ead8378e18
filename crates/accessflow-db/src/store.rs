//! PostgreSQL implementation of the request store.

use accessflow_governance::{
    AccessRequest, RequestFilter, RequestId, RequestStatus, RequestStore, Result, StatusPatch,
    UpdateOutcome,
};
use sqlx::PgPool;

use crate::models::AccessRequestRow;
use crate::pool::DbPool;

/// Request store backed by the `access_requests` table.
///
/// The conditional status update is a single guarded `UPDATE`, so two
/// concurrent decisions on the same request cannot both succeed.
#[derive(Debug, Clone)]
pub struct PgRequestStore {
    pool: PgPool,
}

impl PgRequestStore {
    pub fn new(pool: &DbPool) -> Self {
        Self {
            pool: pool.inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl RequestStore for PgRequestStore {
    async fn insert(&self, request: &AccessRequest) -> Result<()> {
        AccessRequestRow::insert(&self.pool, request).await?;
        Ok(())
    }

    async fn get(&self, id: &RequestId) -> Result<Option<AccessRequest>> {
        let row = AccessRequestRow::find_by_id(&self.pool, id.as_str()).await?;
        Ok(row.map(AccessRequest::try_from).transpose()?)
    }

    async fn update_if_status(
        &self,
        id: &RequestId,
        expected: RequestStatus,
        patch: StatusPatch,
    ) -> Result<UpdateOutcome> {
        let updated =
            AccessRequestRow::update_if_status(&self.pool, id.as_str(), expected, &patch).await?;
        if let Some(row) = updated {
            return Ok(UpdateOutcome::Updated(AccessRequest::try_from(row)?));
        }

        // Guard did not match: tell a missing row apart from a status race.
        match AccessRequestRow::find_status(&self.pool, id.as_str()).await? {
            None => Ok(UpdateOutcome::NotFound),
            Some(current) => Ok(UpdateOutcome::StatusMismatch(current)),
        }
    }

    async fn scan(&self, filter: &RequestFilter) -> Result<Vec<AccessRequest>> {
        let rows = AccessRequestRow::scan(&self.pool, filter).await?;
        let requests = rows
            .into_iter()
            .map(AccessRequest::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(requests)
    }
}
