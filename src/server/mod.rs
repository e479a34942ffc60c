use crate::core::models::{Call, Stats};
use crate::monitor::MonitorCache;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

pub const LISTEN_ADDR: &str = "0.0.0.0:8181";

#[derive(Clone)]
pub struct AppState {
    pub cache: MonitorCache,
}

pub fn router(cache: MonitorCache) -> Router {
    Router::new()
        .route("/monitor", get(get_monitor))
        .route("/monitor/stats", get(get_stats))
        .with_state(AppState { cache })
}

pub async fn serve(cache: MonitorCache) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await?;
    tracing::info!(addr = LISTEN_ADDR, "API listening");
    axum::serve(listener, router(cache)).await?;
    Ok(())
}

/// The current call list. Counts the hit, stamps the idle clock, and blocks
/// while a refresh is in flight so the response is always a committed
/// snapshot. There is no error path.
async fn get_monitor(State(state): State<AppState>) -> Json<Vec<Call>> {
    state.cache.record_access().await;
    Json(state.cache.read_snapshot().await)
}

/// Counters and uptime. Does not count as an access, so watching the stats
/// endpoint alone leaves the cache idle.
async fn get_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.cache.stats().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn make_call(num: &str) -> Call {
        Call {
            num: num.into(),
            date: "2024-01-01 12:00:00".into(),
            name: "ALICE".into(),
            call: "W1AW".into(),
            id: "3100001".into(),
            sec: "Site A".into(),
            slot: "2".into(),
            talkgroup: "TG 91".into(),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn monitor_returns_call_array() {
        let cache = MonitorCache::new();
        cache
            .commit_refresh(vec![make_call("1"), make_call("2")])
            .await;

        let (status, json) = get_json(router(cache.clone()), "/monitor").await;
        assert_eq!(status, StatusCode::OK);

        let calls = json.as_array().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0]["num"], "1");
        assert_eq!(calls[0]["name"], "ALICE");
        assert_eq!(calls[0]["talkgroup"], "TG 91");

        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn monitor_with_no_data_returns_empty_array() {
        let cache = MonitorCache::new();
        let (status, json) = get_json(router(cache), "/monitor").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn stats_has_fixed_wire_shape_and_no_access_stamp() {
        let cache = MonitorCache::new();
        cache.commit_refresh(vec![make_call("1")]).await;

        let (status, json) = get_json(router(cache.clone()), "/monitor/stats").await;
        assert_eq!(status, StatusCode::OK);

        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(json["stale_cache"], false);
        assert_eq!(json["hits"], 0);
        assert_eq!(json["refresh"], 1);
        assert!(json["uptime"].is_u64());

        assert_eq!(cache.stats().await.hits, 0);
    }

    #[tokio::test]
    async fn monitor_blocks_while_refresh_is_in_flight() {
        let cache = MonitorCache::new();
        cache.commit_refresh(vec![make_call("1")]).await;
        cache.begin_refresh().await;

        let app = router(cache.clone());
        let request = tokio::spawn(async move {
            app.oneshot(
                Request::builder()
                    .uri("/monitor")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!request.is_finished(), "handler returned a stale snapshot");

        cache.commit_refresh(vec![make_call("7")]).await;
        let response = request.await.unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["num"], "7");
    }
}
