use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, biometrics, grocery, meal_plans, meals, nutrition, saved_meals};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(nutrition::router())
                .merge(meals::router())
                .merge(saved_meals::router())
                .merge(meal_plans::router())
                .merge(grocery::router())
                .merge(biometrics::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::FromRef,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::ai::fake::{sample_meal, FakeAi};
    use crate::auth::JwtKeys;
    use crate::error::AI_FAILURE_MESSAGE;

    fn bearer(state: &AppState) -> String {
        let token = JwtKeys::from_ref(state).sign_access(Uuid::new_v4()).unwrap();
        format!("Bearer {token}")
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, auth: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_image(auth: &str) -> Request<Body> {
        let boundary = "XPLATEWISEBOUNDARY";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"plate.jpg\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(&[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/nutrition/analyze")
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::post("/api/v1/nutrition/rescale")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "meal": sample_meal() }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rescale_recomputes_totals() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let app = build_app(state);

        let req = post_json(
            "/api/v1/nutrition/rescale",
            &auth,
            json!({
                "meal": sample_meal(),
                "edits": [{ "index": 0, "weightGrams": 200.0 }]
            }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let v = body_json(res).await;
        assert_eq!(v["edited"], true);
        assert_eq!(v["meal"]["ingredients"][0]["weightGrams"], 200.0);
        assert_eq!(v["meal"]["ingredients"][0]["calories"], 260.0);
        assert_eq!(v["meal"]["ingredients"][1]["calories"], 250.0);
        assert_eq!(v["meal"]["totals"]["calories"], 510.0);
    }

    #[tokio::test]
    async fn rescale_rejects_bad_index() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(post_json(
                "/api/v1/nutrition/rescale",
                &auth,
                json!({
                    "meal": sample_meal(),
                    "edits": [{ "index": 9, "weightGrams": 50.0 }]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rescale_rejects_meal_without_ingredients() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let mut meal = sample_meal();
        meal.ingredients.clear();
        let res = build_app(state)
            .oneshot(post_json(
                "/api/v1/nutrition/rescale",
                &auth,
                json!({ "meal": meal }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn targets_use_mifflin_st_jeor() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(post_json(
                "/api/v1/nutrition/targets",
                &auth,
                json!({
                    "weightKg": 70.0,
                    "heightCm": 175.0,
                    "age": 30,
                    "sex": "male",
                    "activityLevel": "sedentary"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert_eq!(v["bmr"], 1648.75);
        assert_eq!(v["targetCalories"], v["tdee"]);
    }

    #[tokio::test]
    async fn analyze_returns_meal_and_photo() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(multipart_image(&auth))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let v = body_json(res).await;
        assert_eq!(v["meal"]["mealName"], "Chicken and rice");
        assert_eq!(v["meal"]["ingredients"].as_array().unwrap().len(), 2);
        assert!(v["photoKey"].as_str().unwrap().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn analyze_failure_maps_to_fixed_message() {
        let state = AppState::fake_with_ai(Arc::new(FakeAi {
            fail: true,
            ..Default::default()
        }));
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(multipart_image(&auth))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(res).await["error"], AI_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn suggest_recipe_needs_pantry_or_image() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let app = build_app(state);

        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/recipes/suggest",
                &auth,
                json!({ "pantryItems": ["  "] }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app
            .oneshot(post_json(
                "/api/v1/recipes/suggest",
                &auth,
                json!({ "pantryItems": ["rice", "chicken"] }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["title"], "Bowl with rice, chicken");
    }
}
