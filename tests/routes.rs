use actix_web::{App, http::StatusCode, http::header, test, web};
use serde_json::{Value, json};

use herbarium_admin::models::config::ServerConfig;
use herbarium_admin::resources::{ResourceRegistry, default_resources};
use herbarium_admin::routes::{configure, health};
use herbarium_admin::{build_executor, json_config};

// Nothing listens on the discard port, so any forwarded call fails fast.
const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:9";

fn server_config(base_path: &str) -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".to_string(),
        port: 0,
        base_path: base_path.to_string(),
        upstream_base_url: UNREACHABLE_UPSTREAM.to_string(),
        request_timeout_secs: 2,
        resources: default_resources(),
    }
}

macro_rules! proxy_app {
    ($config:expr) => {{
        let config = $config;
        let executor = build_executor(&config).unwrap();
        test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(executor))
                .app_data(web::Data::new(ResourceRegistry::new(config.resources.clone())))
                .service(
                    web::scope(&config.scope_path())
                        .service(health)
                        .configure(configure),
                ),
        )
        .await
    }};
}

#[actix_web::test]
async fn health_reports_up() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!("up"));
}

#[actix_web::test]
async fn unknown_resource_is_not_found() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::get()
        .uri("/api/recipes/search?pageIndex=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(404));
    assert_eq!(body["message"], json!("Unknown resource: recipes"));
}

#[actix_web::test]
async fn delete_without_token_is_unauthorized() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::delete().uri("/api/plants/12").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], json!(401));
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn private_search_without_token_is_unauthorized() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::get().uri("/api/users/search").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unreachable_upstream_is_a_network_error() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::get()
        .uri("/api/plants/search?pageIndex=1&pageSize=12")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(503));
}

#[actix_web::test]
async fn malformed_json_body_is_a_bad_request() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::post()
        .uri("/api/plants/create")
        .insert_header((header::AUTHORIZATION, "Bearer admin"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], json!(400));
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn invalid_id_is_rejected_before_forwarding() {
    let app = proxy_app!(server_config(""));

    let req = test::TestRequest::get()
        .uri("/api/plants/12%3Fadmin%3Dtrue")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn routes_live_under_the_configured_base_path() {
    let app = proxy_app!(server_config("/admin/"));

    let req = test::TestRequest::get().uri("/admin/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
