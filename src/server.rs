use std::{io, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use log::info;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::cache::EventCache;
use crate::ics::{to_ics, CalendarMeta};
use crate::render::render_page;
use crate::source::Source;

pub const CALENDAR_PATH: &str = "/calendar.ics";

pub struct AppState {
    pub source: Source,
    pub meta: CalendarMeta,
    /// Public address of the feed, shown on the listing page.
    pub feed_url: String,
    pub cache: Arc<EventCache>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route(CALENDAR_PATH, get(handle_calendar))
        .fallback(|| async { Redirect::permanent("/") })
        .with_state(state)
}

pub async fn serve(address: SocketAddr, state: Arc<AppState>) -> io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Listening at http://{address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let events = state.cache.events(&state.source).await;
    Html(render_page(&events, Utc::now().naive_utc(), &state.feed_url))
}

#[derive(Deserialize)]
struct CalendarQuery {
    #[serde(default)]
    json: bool,
}

async fn handle_calendar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Response {
    let events = state.cache.events(&state.source).await;

    if query.json {
        return Json(events.as_ref()).into_response();
    }

    (
        [("content-type", "text/calendar; charset=utf-8")],
        to_ics(&events, &state.meta, Utc::now().naive_utc()).to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use axum::{body::to_bytes, http::StatusCode};
    use tokio::time::Duration;

    use super::*;
    use crate::cache::Config;

    fn state(name: &str) -> Arc<AppState> {
        let mut path = env::temp_dir();
        path.push(format!("{name}_events_ical_server.yaml"));
        fs::write(
            &path,
            "events:\n  - id: 1\n    title: \"Bowling Night\"\n    date: \"2999-12-15\"\n    time: \"7:00 PM\"\n    location: \"Lucky Strike Lanes\"\n",
        )
        .unwrap();

        Arc::new(AppState {
            source: Source::File(path),
            meta: CalendarMeta::default(),
            feed_url: "https://example.org/calendar.ics".to_string(),
            cache: EventCache::new(Config {
                enabled: false,
                ttl: Duration::from_secs(60),
            }),
        })
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn serves_feed() {
        let response = handle_calendar(
            State(state("feed")),
            Query(CalendarQuery { json: false }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/calendar; charset=utf-8"
        );

        let body = body(response).await;
        assert!(body.starts_with("BEGIN:VCALENDAR"));
        assert!(body.contains("DTSTART:29991215T190000Z"));
        assert!(body.contains("DTEND:29991215T200000Z"));
    }

    #[tokio::test]
    async fn serves_json() {
        let response = handle_calendar(
            State(state("json")),
            Query(CalendarQuery { json: true }),
        )
        .await;

        let value: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["title"], "Bowling Night");
        assert_eq!(value[0]["schedule"]["kind"], "fixed_duration");
        assert_eq!(value[0]["schedule"]["start"], "7:00 PM");
        assert!(value[0].get("description").is_none());
    }

    #[tokio::test]
    async fn serves_page() {
        let Html(page) = handle_index(State(state("page"))).await;
        assert!(page.contains("Bowling Night"));
        assert!(page.contains("webcal://example.org/calendar.ics"));
    }
}
