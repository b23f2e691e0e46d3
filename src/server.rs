use axum::{middleware, routing::get, routing::post, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{account, audit_trail, companies, leads};
use crate::middleware::auth::jwt_auth_middleware;
use crate::middleware::context::request_context_middleware;

pub fn app() -> Router {
    // Layers run outermost-last: authentication first, then tenant/actor
    // context, so company resolution is complete before any handler runs.
    let api = Router::new()
        .route("/api/leads", get(leads::list_leads).post(leads::create_lead))
        .route(
            "/api/leads/:id",
            get(leads::get_lead)
                .patch(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/api/audit", get(audit_trail::list_audit_entries))
        .route("/api/account/company", post(account::associate_company))
        .route(
            "/api/root/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/api/root/companies/:id",
            get(companies::show_company).delete(companies::deactivate_company),
        )
        .layer(middleware::from_fn(request_context_middleware))
        .layer(middleware::from_fn(jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve() {
    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("LEADBOX_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Leadbox API server listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Leadbox API",
            "version": version,
            "description": "Multi-tenant CRM backend with company-scoped data access and audit trail",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "leads": "/api/leads[/:id] (protected)",
                "audit": "/api/audit (protected)",
                "account": "/api/account/company (protected)",
                "root": "/api/root/companies[/:id] (restricted, requires root access)",
            },
            "tenancy": {
                "header": "X-Company-Id",
                "note": "carries the company slug; unknown or malformed values resolve to no company",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::Db::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
