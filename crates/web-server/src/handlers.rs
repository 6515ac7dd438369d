use crate::control::{self, ControlRecord, ControlState, ControlUpdate};
use crate::{error::AppError, AppState};
use analytics::{DailyPoint, MetricsResult};
use axum::{extract::State, Json};
use configuration::RiskLimits;
use core_types::TradeTable;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PresetList {
    pub presets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ControlSaved {
    pub status: &'static str,
    pub data: ControlRecord,
}

/// Runs filesystem work on tokio's blocking pool so it never stalls the reactor.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Every request reads its own copy of the newest log; nothing is cached.
fn latest_table(state: &AppState) -> Result<TradeTable, AppError> {
    journal::read_latest(&state.settings.paths.logs_dir())?.ok_or(AppError::NoLogs)
}

/// # GET /api/metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Json<MetricsResult>, AppError> {
    let metrics = blocking(move || {
        let table = latest_table(&state)?;
        Ok(state.engine.compute_metrics(&table)?)
    })
    .await?;
    Ok(Json(metrics))
}

/// # GET /api/daily
/// The per-day P&L and equity series for the dashboard chart.
pub async fn get_daily(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DailyPoint>>, AppError> {
    let series = blocking(move || {
        let table = latest_table(&state)?;
        Ok(state.engine.build_daily_series(&table)?)
    })
    .await?;
    Ok(Json(series))
}

/// # GET /api/limits
pub async fn get_limits(State(state): State<Arc<AppState>>) -> Json<RiskLimits> {
    Json(*state.engine.limits())
}

/// # GET /api/presets
pub async fn get_presets(State(state): State<Arc<AppState>>) -> Result<Json<PresetList>, AppError> {
    let presets = blocking(move || {
        control::list_presets(&state.settings.paths.presets_dir()).map_err(AppError::Presets)
    })
    .await?;
    Ok(Json(PresetList { presets }))
}

/// # GET /api/control
pub async fn get_control(State(state): State<Arc<AppState>>) -> Result<Json<ControlState>, AppError> {
    let current =
        blocking(move || Ok(control::load_control(&state.settings.paths.control_file()))).await?;
    Ok(Json(current))
}

/// # POST /api/control
pub async fn update_control(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ControlUpdate>,
) -> Result<Json<ControlSaved>, AppError> {
    let record = blocking(move || {
        Ok(control::save_control(&state.settings.paths.control_file(), update.into())?)
    })
    .await?;
    Ok(Json(ControlSaved {
        status: "saved",
        data: record,
    }))
}
