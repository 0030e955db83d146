//! Selector endpoints: the whole four-dropdown state in one response
//!
//! The client owns the selection and sends it back with every call.

use axum::{extract::State, Json};
use ecutune_common::selector;
use ecutune_common::{Level, SelectorView, VehicleSelection};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

/// GET /api/selector?fuel=&brand=&model=&version=
///
/// Normalizes the selection and returns the options for every level.
pub async fn get_selector(
    State(state): State<AppState>,
    ApiQuery(selection): ApiQuery<VehicleSelection>,
) -> ApiResult<Json<SelectorView>> {
    let view = SelectorView::load(&state.db, &selection).await?;
    Ok(Json(view))
}

/// Body of POST /api/selector/choice
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    #[serde(default)]
    pub selection: VehicleSelection,
    pub level: Level,
    /// Empty clears the level and everything below it
    #[serde(default)]
    pub value: String,
}

/// POST /api/selector/choice
///
/// Applies one choice with reset-on-change and returns the new view.
pub async fn apply_choice(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChoiceRequest>,
) -> ApiResult<Json<SelectorView>> {
    debug!("Selector choice: {} = '{}'", request.level, request.value);
    let view =
        selector::apply_choice(&state.db, &request.selection, request.level, &request.value).await?;
    Ok(Json(view))
}
