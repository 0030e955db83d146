//! Public lead submission

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use ecutune_common::leads::{create_lead, LeadStatus, NewLead};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::AppState;

/// Acknowledgement returned to the visitor
#[derive(Debug, Serialize)]
pub struct LeadCreated {
    pub guid: Uuid,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// POST /api/leads
///
/// Returns 201 on success, 400 when the body is malformed, a field is
/// invalid or the vehicle is not in the catalog.
pub async fn submit_lead(
    State(state): State<AppState>,
    ApiJson(new_lead): ApiJson<NewLead>,
) -> ApiResult<(StatusCode, Json<LeadCreated>)> {
    let lead = create_lead(&state.db, &new_lead).await?;

    Ok((
        StatusCode::CREATED,
        Json(LeadCreated {
            guid: lead.guid,
            status: lead.status,
            created_at: lead.created_at,
        }),
    ))
}
