use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{
    net::TcpListener,
    sync::{broadcast, Mutex},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::info;

use crate::{
    catalog::{BuildingDefinition, BuildingKind},
    challenges::{ChallengeId, Overlays, CHALLENGES},
    engine::Intent,
    history::{self, HistoricDataPoint, Trend},
    indicators::{Indicator, IndicatorInfo},
    placement::{PlacementError, WorldPlacement},
    scenario::Scenario,
    session::{AppliedTransition, Session},
    state::GameState,
};

/// What subscribers of `/api/events` receive after every committed intent.
#[derive(Clone, Serialize)]
pub struct Frame<'a> {
    pub transition: &'a AppliedTransition,
    pub state: &'a GameState,
}

struct AppState {
    session: Mutex<Session>,
    broadcaster: broadcast::Sender<String>,
    scenario_name: String,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub host: String,
    pub port: u16,
}

pub fn router(scenario_name: impl Into<String>, session: Session) -> Router {
    let (tx, _) = broadcast::channel::<String>(256);
    let state = Arc::new(AppState {
        session: Mutex::new(session),
        broadcaster: tx,
        scenario_name: scenario_name.into(),
    });
    Router::new()
        .route("/api/state", get(current_state))
        .route("/api/indicators", get(indicators))
        .route("/api/history", get(history_points))
        .route("/api/catalog", get(catalog))
        .route("/api/challenges", get(challenges))
        .route("/api/intents", post(submit_intent))
        .route("/api/placements", post(submit_world_placement))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        host,
        port,
    } = config;

    let engine = scenario.build_engine()?;
    let router = router(scenario.name.clone(), Session::new(engine));

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        target: "vila_verde::web",
        scenario = %scenario.name,
        %addr,
        "web.listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!(target: "vila_verde::web", "web.shutdown");
}

#[derive(Serialize)]
struct StateEnvelope<'a> {
    scenario: &'a str,
    overlays: Overlays,
    state: &'a GameState,
}

async fn current_state(State(app): State<Arc<AppState>>) -> Response {
    let session = app.session.lock().await;
    Json(StateEnvelope {
        scenario: &app.scenario_name,
        overlays: session.overlays(),
        state: session.state(),
    })
    .into_response()
}

#[derive(Serialize)]
struct IndicatorView {
    indicator: Indicator,
    value: i32,
    trend: Trend,
    info: &'static IndicatorInfo,
}

#[derive(Serialize)]
struct IndicatorsResponse {
    turn: u32,
    indicators: Vec<IndicatorView>,
}

async fn indicators(State(app): State<Arc<AppState>>) -> Json<IndicatorsResponse> {
    let session = app.session.lock().await;
    let state = session.state();
    let indicators = Indicator::ALL
        .into_iter()
        .map(|indicator| IndicatorView {
            indicator,
            value: state.indicators.get(indicator),
            trend: history::trend(&state.history, indicator),
            info: indicator.info(),
        })
        .collect();
    Json(IndicatorsResponse {
        turn: state.current_turn,
        indicators,
    })
}

async fn history_points(State(app): State<Arc<AppState>>) -> Json<Vec<HistoricDataPoint>> {
    let session = app.session.lock().await;
    Json(session.state().history.clone())
}

#[derive(Serialize)]
struct CatalogEntry {
    #[serde(flatten)]
    definition: BuildingDefinition,
    available: bool,
}

async fn catalog(State(app): State<Arc<AppState>>) -> Json<Vec<CatalogEntry>> {
    let session = app.session.lock().await;
    let state = session.state();
    let entries = session
        .engine()
        .catalog()
        .definitions()
        .map(|definition| CatalogEntry {
            definition: definition.clone(),
            available: state.is_available(definition.kind),
        })
        .collect();
    Json(entries)
}

#[derive(Serialize)]
struct ChallengeView {
    id: ChallengeId,
    title: &'static str,
    description: &'static str,
    reward: &'static str,
    completed: bool,
}

#[derive(Serialize)]
struct ChallengesResponse {
    current: Option<ChallengeId>,
    selected_building_for_info: Option<BuildingKind>,
    challenges: Vec<ChallengeView>,
}

async fn challenges(State(app): State<Arc<AppState>>) -> Json<ChallengesResponse> {
    let session = app.session.lock().await;
    let state = session.state();
    let challenges = CHALLENGES
        .iter()
        .map(|challenge| ChallengeView {
            id: challenge.id,
            title: challenge.title,
            description: challenge.description,
            reward: challenge.reward,
            completed: state.is_completed(challenge.id),
        })
        .collect();
    Json(ChallengesResponse {
        current: state.current_challenge,
        selected_building_for_info: state.selected_building_for_info,
        challenges,
    })
}

#[derive(Serialize)]
struct RejectionBody {
    code: &'static str,
    message: String,
}

fn rejection_status(err: &PlacementError) -> StatusCode {
    match err {
        PlacementError::UnknownKind(_) | PlacementError::OutOfBounds { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PlacementError::CellOccupied { .. }
        | PlacementError::Locked(_)
        | PlacementError::InsufficientEnergy { .. } => StatusCode::CONFLICT,
    }
}

async fn submit_intent(State(app): State<Arc<AppState>>, Json(intent): Json<Intent>) -> Response {
    let mut session = app.session.lock().await;
    apply_and_broadcast(&app, &mut session, intent)
}

/// Places at a raw ground-plane hit, snapped to the engine's cell grid.
async fn submit_world_placement(
    State(app): State<Arc<AppState>>,
    Json(hit): Json<WorldPlacement>,
) -> Response {
    let mut session = app.session.lock().await;
    let intent = Intent::Place(hit.snap(session.engine().rules().cell_size));
    apply_and_broadcast(&app, &mut session, intent)
}

fn apply_and_broadcast(app: &AppState, session: &mut Session, intent: Intent) -> Response {
    match session.apply(intent) {
        Ok(applied) => {
            let applied = applied.clone();
            let frame = Frame {
                transition: &applied,
                state: session.state(),
            };
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = app.broadcaster.send(payload);
            }
            Json(applied).into_response()
        }
        Err(err) => {
            let body = RejectionBody {
                code: err.code(),
                message: err.to_string(),
            };
            (rejection_status(&err), Json(body)).into_response()
        }
    }
}

async fn stream_events(
    State(app): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_conflicts_map_to_409() {
        assert_eq!(
            rejection_status(&PlacementError::CellOccupied { x: 0, z: 0 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            rejection_status(&PlacementError::InsufficientEnergy {
                kind: BuildingKind::School,
                required: 2,
                available: 0,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn malformed_requests_map_to_422() {
        assert_eq!(
            rejection_status(&PlacementError::UnknownKind("tower".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            rejection_status(&PlacementError::OutOfBounds {
                x: 12,
                z: 0,
                limit: 10
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
