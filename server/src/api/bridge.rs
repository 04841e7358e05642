use crate::api::error::{recover, ApiError};
use crate::api::model::{
    DataResponse, IngestRequest, IngestResponse, LocationRecord, SessionEnded, SessionRequest,
    SessionStarted, TrackQuery,
};
use crate::store::{LocationFilter, LocationFix, LocationRow, TrackStore};
use crate::workflow::runner::Runner;
use chrono::{DateTime, Utc};
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use trackcore::telemetry::MetricsRecorder;
use trackcore::time::parse_utc;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{reject, Filter, Rejection, Reply};

type HandlerResult = Result<WithStatus<Json>, Rejection>;

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TrackStore>,
    pub runner: Arc<Runner>,
    pub metrics: Arc<MetricsRecorder>,
}

impl AppState {
    pub fn new(store: Arc<TrackStore>, runner: Runner) -> Self {
        Self {
            store,
            runner: Arc::new(runner),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }
}

/// Hosts the device-facing and dashboard-facing REST endpoints.
pub struct HttpBridge {
    state: AppState,
}

impl HttpBridge {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let state_filter = with_state(self.state.clone());

        let ingest_route = warp::path!("api" / "LocationData")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and_then(ingest_locations);

        let start_route = warp::path!("api" / "Session" / "start-session")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and_then(start_session);

        let end_route = warp::path!("api" / "Session" / "end-session")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and_then(end_session);

        let gps_data_route = warp::path!("api" / "gps-data")
            .and(warp::get())
            .and(warp::query::<TrackQuery>())
            .and(state_filter.clone())
            .and_then(gps_data);

        let report_route = warp::path!("api" / "gps-data" / "report")
            .and(warp::get())
            .and(warp::query::<TrackQuery>())
            .and(state_filter.clone())
            .and_then(gps_report);

        let session_points_route = warp::path!("api" / "sessions" / String / "points")
            .and(warp::get())
            .and(state_filter.clone())
            .and_then(session_points);

        let status_route = warp::path!("api" / "status")
            .and(warp::get())
            .and(state_filter)
            .map(|state: AppState| {
                warp::reply::with_status(
                    warp::reply::json(&state.metrics.snapshot()),
                    StatusCode::OK,
                )
            });

        let metrics = self.state.metrics.clone();
        ingest_route
            .or(start_route)
            .or(end_route)
            .or(gps_data_route)
            .or(report_route)
            .or(session_points_route)
            .or(status_route)
            .recover(move |err: Rejection| {
                let metrics = metrics.clone();
                async move { recover(err, &metrics) }
            })
    }

    pub fn publish_status(&self, message: &str) {
        info!("[HTTP] {}", message);
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn reply<T: serde::Serialize>(body: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn bad_request(message: impl Into<String>) -> Rejection {
    reject::custom(ApiError::BadRequest(message.into()))
}

fn internal(err: anyhow::Error) -> Rejection {
    reject::custom(ApiError::Internal(err))
}

fn required_device(device_id: Option<String>, message: &str) -> Result<String, Rejection> {
    device_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request(message))
}

/// A missing or blank timestamp means the time of the request.
fn timestamp_or_now(raw: Option<&str>) -> Result<DateTime<Utc>, Rejection> {
    match raw.filter(|value| !value.trim().is_empty()) {
        Some(value) => parse_utc(value)
            .ok_or_else(|| bad_request(format!("unparseable timestamp_utc {:?}", value))),
        None => Ok(Utc::now()),
    }
}

async fn ingest_locations(request: IngestRequest, state: AppState) -> HandlerResult {
    let started = Instant::now();
    let device_id = match request.device_id {
        Some(id) if !id.trim().is_empty() && !request.locations.is_empty() => id.trim().to_string(),
        _ => return Err(bad_request("Provide a device_id and at least one location.")),
    };

    let mut fixes = Vec::with_capacity(request.locations.len());
    for (index, location) in request.locations.iter().enumerate() {
        let timestamp_utc = parse_utc(&location.timestamp_utc).ok_or_else(|| {
            bad_request(format!(
                "location {} has an unparseable timestamp_utc {:?}",
                index, location.timestamp_utc
            ))
        })?;
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(bad_request(format!(
                "location {} is outside the valid latitude/longitude range",
                index
            )));
        }
        fixes.push(LocationFix {
            timestamp_utc,
            latitude: location.latitude,
            longitude: location.longitude,
            altitude: location.altitude,
        });
    }

    let inserted = state
        .store
        .insert_locations(&device_id, fixes)
        .map_err(internal)?;
    state.metrics.record_ingested(inserted);
    info!(
        "Inserted rows: {} Elapsed time: {} ms - Device: {}",
        inserted,
        started.elapsed().as_millis(),
        device_id
    );

    Ok(reply(&IngestResponse { inserted }, StatusCode::CREATED))
}

async fn start_session(request: SessionRequest, state: AppState) -> HandlerResult {
    let device_id = required_device(request.device_id, "Provide a device_id.")?;
    let start_utc = timestamp_or_now(request.timestamp_utc.as_deref())?;

    let session = state
        .store
        .start_session(&device_id, start_utc)
        .map_err(internal)?;
    info!("Session started. Device: {} Id: {}", device_id, session.id);

    Ok(reply(
        &SessionStarted {
            inserted: 1,
            id: session.id,
        },
        StatusCode::CREATED,
    ))
}

async fn end_session(request: SessionRequest, state: AppState) -> HandlerResult {
    let device_id = required_device(request.device_id, "Provide a device_id.")?;
    let end_utc = timestamp_or_now(request.timestamp_utc.as_deref())?;

    let updated = state
        .store
        .end_session(&device_id, end_utc)
        .map_err(internal)?;
    info!("Session ended. Device: {} Updated rows: {}", device_id, updated);

    if updated == 0 {
        return Err(reject::custom(ApiError::NotFound(
            "No open session found for the device.".into(),
        )));
    }
    Ok(reply(&SessionEnded { updated }, StatusCode::OK))
}

fn query_rows(query: &TrackQuery, store: &TrackStore) -> Result<Vec<LocationRow>, Rejection> {
    let filter = LocationFilter::from_params(
        query.device_id.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )
    .map_err(|err| bad_request(err.to_string()))?;
    store.query_locations(&filter).map_err(internal)
}

async fn gps_data(query: TrackQuery, state: AppState) -> HandlerResult {
    let rows = query_rows(&query, &state.store)?;
    info!("Found {} location records", rows.len());
    let records: Vec<LocationRecord> = rows.iter().map(LocationRecord::from).collect();
    Ok(reply(&DataResponse::ok(records), StatusCode::OK))
}

async fn gps_report(query: TrackQuery, state: AppState) -> HandlerResult {
    let runner = match query.min_distance {
        Some(min_distance) if !min_distance.is_finite() || min_distance < 0.0 => {
            return Err(bad_request("minDistance must be a non-negative number of metres"));
        }
        Some(min_distance) => state.runner.with_min_distance(min_distance),
        None => state.runner.as_ref().clone(),
    };

    let rows = query_rows(&query, &state.store)?;
    let points = rows.iter().map(LocationRow::to_point).collect();
    let report = runner.execute(points).map_err(internal)?;
    state.metrics.record_processed();

    Ok(reply(&DataResponse::ok(report), StatusCode::OK))
}

async fn session_points(session_id: String, state: AppState) -> HandlerResult {
    let session = state
        .store
        .session(&session_id)
        .map_err(internal)?
        .ok_or_else(|| reject::custom(ApiError::NotFound("Session not found.".into())))?;

    let filter = LocationFilter {
        device_id: Some(session.device_id.clone()),
        start: Some(session.start_utc),
        end: Some(session.end_utc.unwrap_or_else(Utc::now)),
    };
    let rows = state.store.query_locations(&filter).map_err(internal)?;
    let points = rows.iter().map(LocationRow::to_point).collect();
    let report = state.runner.execute(points).map_err(internal)?;
    state.metrics.record_processed();

    Ok(reply(&DataResponse::ok(report), StatusCode::OK))
}
