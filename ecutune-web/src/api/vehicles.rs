//! Cascading vehicle lookups, one endpoint per level
//!
//! Each level requires every ancestor as a query parameter and answers with
//! the sorted distinct options under that filter.

use axum::{extract::State, Json};
use ecutune_common::vehicles::list_options;
use ecutune_common::{Level, VehicleFilter};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::AppState;

/// Ancestor choices as query parameters
#[derive(Debug, Default, Deserialize)]
pub struct CascadeQuery {
    pub fuel: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl CascadeQuery {
    fn filter(&self) -> VehicleFilter<'_> {
        VehicleFilter::new(
            self.fuel.as_deref(),
            self.brand.as_deref(),
            self.model.as_deref(),
        )
    }
}

/// Options for one level
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub level: Level,
    pub options: Vec<String>,
}

async fn options_for(state: &AppState, level: Level, query: &CascadeQuery) -> ApiResult<OptionsResponse> {
    let filter = query.filter();
    if let Some(missing) = filter.first_missing(level) {
        return Err(ApiError::BadRequest(format!(
            "{} is required to list {} options",
            missing, level
        )));
    }

    let options = list_options(&state.db, level, &filter).await?;
    Ok(OptionsResponse { level, options })
}

/// GET /api/vehicles/fuels
pub async fn list_fuels(State(state): State<AppState>) -> ApiResult<Json<OptionsResponse>> {
    Ok(Json(options_for(&state, Level::Fuel, &CascadeQuery::default()).await?))
}

/// GET /api/vehicles/brands?fuel=
pub async fn list_brands(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CascadeQuery>,
) -> ApiResult<Json<OptionsResponse>> {
    Ok(Json(options_for(&state, Level::Brand, &query).await?))
}

/// GET /api/vehicles/models?fuel=&brand=
pub async fn list_models(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CascadeQuery>,
) -> ApiResult<Json<OptionsResponse>> {
    Ok(Json(options_for(&state, Level::Model, &query).await?))
}

/// GET /api/vehicles/versions?fuel=&brand=&model=
pub async fn list_versions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CascadeQuery>,
) -> ApiResult<Json<OptionsResponse>> {
    Ok(Json(options_for(&state, Level::Version, &query).await?))
}
