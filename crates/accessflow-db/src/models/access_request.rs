//! Access request row model.
//!
//! Maps the `access_requests` table to and from
//! [`accessflow_governance::AccessRequest`].

use std::collections::BTreeSet;

use accessflow_governance::{
    AccessRequest, Department, RequestFilter, RequestId, RequestStatus, RequestedItems,
    Requester, StatusPatch,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::error::DbError;

/// A row of `access_requests`.
#[derive(Debug, Clone, FromRow)]
pub struct AccessRequestRow {
    pub id: String,
    pub requester_email: String,
    pub requester_name: String,
    pub department: String,
    pub job_title: String,
    pub requested_items: Json<RequestedItems>,
    pub status: RequestStatus,
    pub approved_items: Option<Json<BTreeSet<String>>>,
    pub approver: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AccessRequestRow> for AccessRequest {
    type Error = DbError;

    fn try_from(row: AccessRequestRow) -> Result<Self, Self::Error> {
        let department: Department = row.department.parse().map_err(|message| DbError::InvalidRow {
            id: row.id.clone(),
            message,
        })?;

        Ok(AccessRequest {
            id: RequestId::from(row.id),
            requester: Requester {
                email: row.requester_email,
                full_name: row.requester_name,
                department,
                job_title: row.job_title,
            },
            requested_items: row.requested_items.0,
            status: row.status,
            approved_items: row.approved_items.map(|Json(items)| items),
            approver: row.approver,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Escape LIKE wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl AccessRequestRow {
    /// Insert a new request.
    pub async fn insert(pool: &PgPool, request: &AccessRequest) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO access_requests (
                id, requester_email, requester_name, department, job_title,
                requested_items, status, approved_items, approver, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(request.id.as_str())
        .bind(&request.requester.email)
        .bind(&request.requester.full_name)
        .bind(request.requester.department.as_str())
        .bind(&request.requester.job_title)
        .bind(Json(&request.requested_items))
        .bind(request.status)
        .bind(request.approved_items.as_ref().map(Json))
        .bind(request.approver.as_deref())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a request by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM access_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Current status of a request, if it exists.
    pub async fn find_status(pool: &PgPool, id: &str) -> Result<Option<RequestStatus>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT status FROM access_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Apply a status patch only while the row still has status `expected`.
    ///
    /// Returns `None` when no row matched the id and status guard.
    pub async fn update_if_status(
        pool: &PgPool,
        id: &str,
        expected: RequestStatus,
        patch: &StatusPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE access_requests
            SET status = $3,
                approved_items = $4,
                approver = $5,
                updated_at = $6
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(patch.status)
        .bind(patch.approved_items.as_ref().map(Json))
        .bind(&patch.approver)
        .bind(patch.updated_at)
        .fetch_optional(pool)
        .await
    }

    /// All rows matching the filter, unordered.
    pub async fn scan(pool: &PgPool, filter: &RequestFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM access_requests
            WHERE ($1::access_request_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR department = $2)
              AND ($3::text IS NULL OR LOWER(requester_email) = LOWER($3))
              AND ($4::text IS NULL
                   OR requester_name ILIKE $4
                   OR requester_email ILIKE $4
                   OR department ILIKE $4)
            "#,
        )
        .bind(filter.status)
        .bind(filter.department.map(|d| d.as_str()))
        .bind(filter.requester_email.as_deref())
        .bind(filter.search.as_deref().map(like_pattern))
        .fetch_all(pool)
        .await
    }
}
