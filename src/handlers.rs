use crate::display::activity_view;
use crate::errors::AppError;
use crate::models::{
    ActivityId, ActivityType, ActivityView, ClearResponse, CreateActivityRequest, DeleteResponse,
    ListQuery, NewActivity, StatsQuery, StatsResponse, form_time,
};
use crate::state::AppState;
use crate::stats::{DateRange, build_stats};
use crate::store::{Command, CommandOutcome, RECENT_LIMIT};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let range = DateRange::last_week();
    let stats = {
        let store = state.store.lock().await;
        build_stats(store.activities(), range)
    };
    let page = render_index(&stats).map_err(AppError::internal)?;
    Ok(Html(page))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<ActivityView>> {
    let limit = query.limit.unwrap_or(RECENT_LIMIT);
    let store = state.store.lock().await;
    Json(store.recent(limit).iter().map(activity_view).collect())
}

pub async fn create_activity(
    State(state): State<AppState>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityView>), AppError> {
    let view = apply_add(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = ActivityId(id);
    let deleted = apply_delete(&state, id).await?;
    Ok(Json(DeleteResponse { id, deleted }))
}

/// Commands share the add path's validation; a malformed one is a 400.
pub async fn dispatch_command(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<CommandOutcome>, AppError> {
    let command: Command = serde_json::from_value(payload).map_err(|err| {
        warn!("rejected command: {err}");
        AppError::bad_request(err.to_string())
    })?;
    let outcome = state.mutate(move |store| store.dispatch(command)).await?;
    Ok(Json(outcome))
}

pub async fn clear_activities(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let cleared = state.mutate(|store| store.clear()).await?;
    Ok(Json(ClearResponse { cleared }))
}

/// Returns `null` until both ends of the range are filled in.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<Option<StatsResponse>> {
    let Some(range) = DateRange::parse(query.start.as_deref(), query.end.as_deref()) else {
        return Json(None);
    };

    let store = state.store.lock().await;
    Json(Some(build_stats(store.activities(), range)))
}

pub async fn add_form(
    State(state): State<AppState>,
    Form(payload): Form<CreateActivityRequest>,
) -> Result<Redirect, AppError> {
    apply_add(&state, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    apply_delete(&state, ActivityId(id)).await?;
    Ok(Redirect::to("/"))
}

async fn apply_add(state: &AppState, payload: CreateActivityRequest) -> Result<ActivityView, AppError> {
    let new = parse_new_activity(payload)?;
    let record = state
        .mutate(move |store| store.add(new.kind, new.occurred_at, new.notes))
        .await?;
    Ok(activity_view(&record))
}

async fn apply_delete(state: &AppState, id: ActivityId) -> Result<bool, AppError> {
    state
        .mutate(move |store| Ok(store.delete(id)?.is_some()))
        .await
}

fn parse_new_activity(payload: CreateActivityRequest) -> Result<NewActivity, AppError> {
    let Some(kind) = ActivityType::from_input(&payload.kind) else {
        return Err(AppError::bad_request("activity type is required"));
    };

    let Some(occurred_at) = form_time::parse(&payload.time) else {
        warn!("rejected activity with time {:?}", payload.time);
        return Err(AppError::bad_request("activity time must look like YYYY-MM-DDTHH:MM"));
    };

    Ok(NewActivity {
        kind,
        occurred_at,
        notes: payload.notes.unwrap_or_default(),
    })
}
