mod cache;
mod cli;
mod render;

use std::{env, io, process, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use tokio::{net::TcpListener, signal};

use raid_helper::{
    calendar_to_ics, AggregationPipeline, Config, EventClassifier, EventRecord, PeriodCalculator,
};

use cache::Cache;

const ACCESS_TOKEN_VAR: &str = "RAID_HELPER_ACCESS_TOKEN";
const LOG_VAR: &str = "RAID_HELPER_LOG";
const EVENTS_PATH: &str = "/events";
const CALENDAR_NAME: &str = "Raid Helper Calendar";
const FAILED_TO_LOAD: &str = "Failed to load events. Check access token and server IDs.";

struct Snapshot {
    events: Vec<EventRecord>,
    loaded_at: DateTime<Utc>,
}

struct AppState {
    pipeline: AggregationPipeline,
    classifier: EventClassifier,
    cache: Arc<Cache<String, Snapshot>>,
    cache_key: String,
}

type SharedState = Arc<AppState>;

impl AppState {
    fn new(config: &Config, cache: cache::Config) -> Self {
        let pipeline = AggregationPipeline::new(config);
        let classifier = EventClassifier::new(PeriodCalculator::new(
            pipeline.resolver().default_timezone(),
        ));

        Self {
            cache_key: config.source_ids.join(","),
            pipeline,
            classifier,
            cache: Cache::new(cache),
        }
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route(EVENTS_PATH, get(handle_events))
        .route("/refresh", post(handle_refresh))
        .fallback(|| async { Redirect::temporary(EVENTS_PATH) })
        .with_state(state)
}

#[tokio::main]
async fn main() -> io::Result<()> {
    setup_logging();

    let args = cli::parse(env::args().skip(1).collect());

    let Ok(access_token) = env::var(ACCESS_TOKEN_VAR) else {
        eprintln!("`{ACCESS_TOKEN_VAR}` environment variable is not set");
        process::exit(1);
    };

    let mut config = Config::new(access_token);
    config.timeout = args.timeout;
    config.default_timezone = args.timezone;
    if let Some(servers) = args.servers {
        config.source_ids = servers;
    }

    if config.source_ids.is_empty() {
        eprintln!("Please add at least one server ID");
        process::exit(1);
    }

    info!("Starting with {config:?}");

    let state = Arc::new(AppState::new(
        &config,
        cache::Config {
            enabled: args.enable_cache,
            ttl: args.cache_ttl,
        },
    ));

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn setup_logging() {
    if env::var(LOG_VAR).is_err() {
        env::set_var(LOG_VAR, "raid_helper=info,raid_helper_server=info");
    }

    pretty_env_logger::init_custom_env(LOG_VAR);
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Format {
    #[default]
    Json,
    Markdown,
    Ics,
}

#[derive(Deserialize)]
struct EventsQuery {
    #[serde(default)]
    format: Format,
}

async fn handle_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let Some(snapshot) = load_snapshot(&state).await else {
        return (StatusCode::BAD_GATEWAY, FAILED_TO_LOAD).into_response();
    };

    let classification = state.classifier.classify(&snapshot.events, Utc::now());

    match query.format {
        Format::Json => Json(render::EventsView::new(
            snapshot.loaded_at,
            &snapshot.events,
            classification,
        ))
        .into_response(),
        Format::Markdown => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render::markdown(&classification),
        )
            .into_response(),
        Format::Ics => (
            [(header::CONTENT_TYPE, "text/calendar")],
            calendar_to_ics(CALENDAR_NAME, &snapshot.events).to_string(),
        )
            .into_response(),
    }
}

async fn handle_refresh(State(state): State<SharedState>) -> StatusCode {
    state.cache.clear().await;
    info!("Cache cleared");
    StatusCode::NO_CONTENT
}

async fn load_snapshot(state: &SharedState) -> Option<Arc<Snapshot>> {
    if let Some(snapshot) = state.cache.get(&state.cache_key).await {
        return Some(snapshot);
    }

    let events = state.pipeline.refresh().await;
    if events.is_empty() {
        warn!("No events from any of {} servers", state.pipeline.source_ids().len());
        return None;
    }

    let snapshot = Snapshot {
        events,
        loaded_at: Utc::now(),
    };

    Some(
        Arc::clone(&state.cache)
            .insert(state.cache_key.clone(), snapshot)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::redirect::Policy;
    use serde_json::{json, Value};
    use tokio::time::Duration;

    use super::*;

    async fn upstream(State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> Response {
        hits.fetch_add(1, Ordering::SeqCst);

        match body["serverid"].as_str().unwrap_or_default() {
            "alpha" => Json(json!({
                "servername": "Alpha",
                "events": [{
                    "title": "Molten Core",
                    "unixtime": Utc::now().timestamp(),
                    "channelName": "raids",
                }]
            }))
            .into_response(),
            "empty" => Json(json!({ "servername": "Empty", "events": [] })).into_response(),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        }
    }

    struct Server {
        base: String,
        hits: Arc<AtomicUsize>,
        http: reqwest::Client,
    }

    impl Server {
        async fn start(servers: &[&str]) -> Self {
            let hits = Arc::new(AtomicUsize::new(0));
            let upstream_router = Router::new()
                .route("/api/events/", post(upstream))
                .with_state(Arc::clone(&hits));
            let upstream_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let upstream_addr = upstream_listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(upstream_listener, upstream_router).await.unwrap();
            });

            let mut config = Config::new("test-token");
            config.base_url = format!("http://{upstream_addr}/api/events/");
            config.timeout = Duration::from_secs(2);
            config.source_ids = servers.iter().map(|id| id.to_string()).collect();

            let state = Arc::new(AppState::new(
                &config,
                cache::Config {
                    enabled: true,
                    ttl: Duration::from_secs(3600),
                },
            ));
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router(state)).await.unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                hits,
                http: reqwest::Client::builder()
                    .redirect(Policy::none())
                    .build()
                    .unwrap(),
            }
        }

        async fn get(&self, path: &str) -> reqwest::Response {
            self.http
                .get(format!("{}{path}", self.base))
                .send()
                .await
                .unwrap()
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    fn content_type(response: &reqwest::Response) -> String {
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn failing_servers_answer_bad_gateway() {
        let server = Server::start(&["broken", "also-broken"]).await;
        let response = server.get("/events").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.text().await.unwrap(), FAILED_TO_LOAD);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn empty_results_are_not_cached() {
        let server = Server::start(&["empty"]).await;

        assert_eq!(server.get("/events").await.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(server.get("/events").await.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn refresh_forces_a_new_fetch() {
        let server = Server::start(&["alpha"]).await;

        assert_eq!(server.get("/events").await.status(), StatusCode::OK);
        assert_eq!(server.get("/events").await.status(), StatusCode::OK);
        assert_eq!(server.hits(), 1);

        let response = server
            .http
            .post(format!("{}/refresh", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert_eq!(server.get("/events").await.status(), StatusCode::OK);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn events_render_in_every_format() {
        let server = Server::start(&["alpha", "broken"]).await;

        let response = server.get("/events").await;
        assert_eq!(content_type(&response), "application/json");
        let body: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
        assert_eq!(body["servers"], json!(["Alpha"]));
        assert_eq!(body["this_period"][0]["events"][0]["title"], "Molten Core");

        let response = server.get("/events?format=markdown").await;
        assert_eq!(content_type(&response), "text/markdown; charset=utf-8");
        let page = response.text().await.unwrap();
        assert!(page.starts_with("## Yesterday to End of Week"));
        assert!(page.contains("#### Molten Core"));

        let response = server.get("/events?format=ics").await;
        assert_eq!(content_type(&response), "text/calendar");
        let calendar = response.text().await.unwrap();
        assert!(calendar.starts_with("BEGIN:VCALENDAR"));
        assert!(calendar.contains("SUMMARY:Molten Core"));

        assert_eq!(
            server.get("/events?format=pdf").await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn unknown_paths_redirect_to_events() {
        let server = Server::start(&["alpha"]).await;
        let response = server.get("/somewhere/else").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], EVENTS_PATH);
        assert_eq!(server.hits(), 0);
    }
}
