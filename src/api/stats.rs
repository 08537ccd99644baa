use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

/// How many recent block intervals to average.
pub const STATS_WINDOW: usize = 10;

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.snapshot();
    let blocks = &snapshot.blocks;
    let height = blocks.len();

    let intervals: Vec<i64> = blocks
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).max(0))
        .collect();

    let last_interval = intervals.last().copied();

    // average over the trailing window, once it is full
    let avg_interval = (intervals.len() >= STATS_WINDOW).then(|| {
        let window = &intervals[intervals.len() - STATS_WINDOW..];
        window.iter().sum::<i64>() as f64 / STATS_WINDOW as f64
    });

    let total_nonces = blocks.iter().map(|b| b.nonce).sum::<u64>();

    HttpResponse::Ok().json(StatsResponse {
        height,
        difficulty: snapshot.difficulty,
        stats_window: STATS_WINDOW,
        last_interval_ms: last_interval,
        avg_interval_ms: avg_interval,
        total_nonces,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::Value;

    use crate::api::{AppState, init_routes};

    #[actix_web::test]
    async fn stats_on_short_chain() {
        let state = web::Data::new(AppState::default());
        state.with_chain(|chain| {
            chain.set_difficulty(1).unwrap();
            chain.append("a");
        });
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["height"], 2);
        assert_eq!(body["difficulty"], 1);
        assert!(body["last_interval_ms"].as_i64().unwrap() >= 0);
        assert_eq!(body["avg_interval_ms"], Value::Null);
        assert_eq!(
            body["total_nonces"].as_u64().unwrap(),
            state.snapshot().blocks[1].nonce
        );
    }
}
