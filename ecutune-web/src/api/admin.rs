//! Admin API: lead review and catalog statistics

use axum::{
    extract::{Path, State},
    Json,
};
use ecutune_common::leads::{self, Lead, LeadStatus};
use ecutune_common::vehicles::{count_distinct, count_vehicles};
use ecutune_common::Level;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Query parameters for the lead listing
#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Optional status filter: new, contacted, closed
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

/// One page of leads
#[derive(Debug, Serialize)]
pub struct LeadPage {
    pub status: Option<LeadStatus>,
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub leads: Vec<Lead>,
}

fn parse_guid(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid lead ID: {}", raw)))
}

/// GET /api/admin/leads?page=&status=
pub async fn list_leads(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeadListQuery>,
) -> ApiResult<Json<LeadPage>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<LeadStatus>)
        .transpose()?;

    let total_results = leads::count_leads(&state.db, status).await?;
    let p = calculate_pagination(total_results, query.page);
    let page_leads = leads::list_leads(&state.db, status, PAGE_SIZE, p.offset).await?;

    Ok(Json(LeadPage {
        status,
        total_results,
        page: p.page,
        page_size: PAGE_SIZE,
        total_pages: p.total_pages,
        leads: page_leads,
    }))
}

/// GET /api/admin/leads/:guid
pub async fn get_lead(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Lead>> {
    let guid = parse_guid(&guid)?;
    Ok(Json(leads::get_lead(&state.db, guid).await?))
}

/// Body of PUT /api/admin/leads/:guid/status
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: LeadStatus,
}

/// PUT /api/admin/leads/:guid/status
pub async fn update_lead_status(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Lead>> {
    let guid = parse_guid(&guid)?;
    Ok(Json(
        leads::update_lead_status(&state.db, guid, update.status).await?,
    ))
}

/// Catalog size per level
#[derive(Debug, Serialize)]
pub struct VehicleStats {
    pub vehicles: i64,
    pub fuels: i64,
    pub brands: i64,
    pub models: i64,
}

/// GET /api/admin/vehicles/stats
pub async fn vehicle_stats(State(state): State<AppState>) -> ApiResult<Json<VehicleStats>> {
    Ok(Json(VehicleStats {
        vehicles: count_vehicles(&state.db).await?,
        fuels: count_distinct(&state.db, Level::Fuel).await?,
        brands: count_distinct(&state.db, Level::Brand).await?,
        models: count_distinct(&state.db, Level::Model).await?,
    }))
}
