//! # Browser Renderer
//!
//! axum routes over the loaded catalog and the in-memory quote sheet.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /                                  quoted items (HTML)         │
//! │  GET    /api/items                         quoted items + totals       │
//! │  GET    /api/master                        master data + load report   │
//! │  GET    /products/{sku}/quote              product quote (HTML)        │
//! │  GET    /api/products/{sku}/quote          product quote (JSON)        │
//! │  GET    /api/products/{sku}/quote/export   product quote workbook      │
//! │  GET    /quote-sheet                       quote sheet (HTML)          │
//! │  GET    /api/quote-sheet                   quote sheet + totals        │
//! │  POST   /api/quote-sheet/lines             price a product, add line   │
//! │  DELETE /api/quote-sheet/lines/{line_id}   remove a line               │
//! │  DELETE /api/quote-sheet                   start over                  │
//! │  GET    /api/quote-sheet/export            quote sheet workbook        │
//! │  GET    /health                            "OK"                        │
//! │                                                                         │
//! │  Product quote routes take the QuoteRequest fields as query params:    │
//! │    ?qty=250&margin_pct=0.2&mode=markup&sheet=P-PANEL=2440x1220x1.5mm   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use hwquote_catalog::{DanglingReference, SkippedRecord};
use hwquote_core::master::MasterDataSet;
use hwquote_core::{ProductQuote, QuoteHeader, QuoteLine, QuoteSheet, QuoteSheetTotals};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::AppResult;
use crate::export::{product_quote_workbook, quote_sheet_workbook, Workbook};
use crate::quoting::{quote_product, QuoteRequest};
use crate::render::{html, ItemsReport};
use crate::state::AppState;

// =============================================================================
// Router
// =============================================================================

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(items_page))
        .route("/api/items", get(items))
        .route("/api/master", get(master))
        .route("/products/{sku}/quote", get(product_quote_page))
        .route("/api/products/{sku}/quote", get(product_quote))
        .route("/api/products/{sku}/quote/export", get(product_quote_export))
        .route("/quote-sheet", get(quote_sheet_page))
        .route("/api/quote-sheet", get(quote_sheet).delete(clear_quote_sheet))
        .route("/api/quote-sheet/lines", post(add_quote_line))
        .route("/api/quote-sheet/lines/{line_id}", delete(remove_quote_line))
        .route("/api/quote-sheet/export", get(quote_sheet_export))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.server.bind_address();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    info!(%addr, "Browser renderer listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

// =============================================================================
// Items & Master Data
// =============================================================================

async fn items_page(State(state): State<AppState>) -> Html<String> {
    let report = ItemsReport::from(state.catalog.as_ref());
    Html(html::items_page(&report, state.currency()))
}

async fn items(State(state): State<AppState>) -> Json<ItemsReport> {
    Json(ItemsReport::from(state.catalog.as_ref()))
}

/// Master data plus what the loader had to skip or could not resolve.
#[derive(Debug, Serialize)]
struct MasterResponse<'a> {
    #[serde(flatten)]
    master: &'a MasterDataSet,
    skipped: &'a [SkippedRecord],
    dangling_references: Vec<DanglingReference>,
}

async fn master(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let catalog = state.catalog.as_ref();
    let body = serde_json::to_value(MasterResponse {
        master: catalog.master(),
        skipped: catalog.skipped(),
        dangling_references: catalog.dangling_references(),
    })?;
    Ok(Json(body))
}

// =============================================================================
// Product Quotes
// =============================================================================

async fn product_quote(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Query(request): Query<QuoteRequest>,
) -> AppResult<Json<ProductQuote>> {
    let quote = quote_product(&state.catalog, &sku, &request)?;
    Ok(Json(quote))
}

async fn product_quote_page(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Query(request): Query<QuoteRequest>,
) -> AppResult<Html<String>> {
    let quote = quote_product(&state.catalog, &sku, &request)?;
    Ok(Html(html::product_quote_page(&quote, state.currency())))
}

async fn product_quote_export(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Query(request): Query<QuoteRequest>,
) -> AppResult<impl IntoResponse> {
    let quote = quote_product(&state.catalog, &sku, &request)?;
    let header = state.quote_sheet.with_sheet(|sheet| sheet.header.clone());
    let workbook = product_quote_workbook(&quote, &header)?;
    Ok(attachment(workbook))
}

fn attachment(workbook: Workbook) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{}\"", workbook.file_name);
    ([(header::CONTENT_DISPOSITION, disposition)], Json(workbook))
}

// =============================================================================
// Quote Sheet
// =============================================================================

/// The quote sheet with its totals.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSheetResponse {
    pub header: QuoteHeader,
    pub lines: Vec<QuoteLine>,
    pub totals: QuoteSheetTotals,
}

impl From<&QuoteSheet> for QuoteSheetResponse {
    fn from(sheet: &QuoteSheet) -> Self {
        QuoteSheetResponse {
            header: sheet.header.clone(),
            lines: sheet.lines.clone(),
            totals: QuoteSheetTotals::from(sheet),
        }
    }
}

/// Body of `POST /api/quote-sheet/lines`.
#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub sku: String,
    #[serde(flatten)]
    pub options: QuoteRequest,
}

async fn quote_sheet(State(state): State<AppState>) -> Json<QuoteSheetResponse> {
    Json(state.quote_sheet.with_sheet(|sheet| QuoteSheetResponse::from(sheet)))
}

async fn quote_sheet_page(State(state): State<AppState>) -> Html<String> {
    Html(state.quote_sheet.with_sheet(html::quote_sheet_page))
}

async fn add_quote_line(
    State(state): State<AppState>,
    Json(request): Json<AddLineRequest>,
) -> AppResult<(StatusCode, Json<QuoteSheetResponse>)> {
    let quote = quote_product(&state.catalog, &request.sku, &request.options)?;

    let response = state.quote_sheet.with_sheet_mut(|sheet| {
        let line_id = sheet.add_line(&quote)?.line_id;
        info!(sku = %quote.sku, line_id, qty = quote.params.qty, "Quote line added");
        AppResult::Ok(QuoteSheetResponse::from(&*sheet))
    })?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn remove_quote_line(
    State(state): State<AppState>,
    Path(line_id): Path<u32>,
) -> AppResult<Json<QuoteSheetResponse>> {
    let response = state.quote_sheet.with_sheet_mut(|sheet| {
        let removed = sheet.remove_line(line_id)?;
        info!(line_id, sku = %removed.sku, "Quote line removed");
        AppResult::Ok(QuoteSheetResponse::from(&*sheet))
    })?;

    Ok(Json(response))
}

async fn clear_quote_sheet(State(state): State<AppState>) -> Json<QuoteSheetResponse> {
    state.quote_sheet.reset();
    info!("Quote sheet cleared");
    Json(state.quote_sheet.with_sheet(|sheet| QuoteSheetResponse::from(sheet)))
}

async fn quote_sheet_export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let workbook = state.quote_sheet.with_sheet(quote_sheet_workbook)?;
    Ok(attachment(workbook))
}

async fn health_handler() -> &'static str {
    debug!("Health check");
    "OK"
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use hwquote_catalog::{load_from_str, LoadMode};
    use serde_json::json;
    use tower::ServiceExt;

    const DATA: &str = r#"{
        "settings": { "currency": "USD", "freight_cost_per_order": 25 },
        "purchased_items": [ { "item_code": "SCR", "name": "M4 screw", "unit_cost": 0.1 } ],
        "packaging_rules": { "per_unit": [ { "item_code": "BAG", "unit_cost": 0.2 } ] },
        "products": [ { "sku": "KIT", "name": "Screw kit",
                        "bom_lines": [ { "type": "purchased", "code": "SCR", "qty_per_unit": 4 },
                                       { "type": "packaging", "code": "BAG" } ] } ],
        "items": [ { "id": "BRK-001", "name": "L Bracket", "category": "Brackets", "material": "SPCC",
                     "unit_material_cost": 10, "unit_labor_cost": 5,
                     "overhead_pct": 0.1, "profit_pct": 0.2, "tax_pct": 0.13, "quantity": 2 } ]
    }"#;

    fn app() -> Router {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        router(AppState::new(catalog, AppConfig::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_items_json_and_html() {
        let app = app();

        let (status, body) = get_json(&app, "/api/items").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["quote_total"], "44.748");
        assert_eq!(body["totals"]["quote_total"], "44.748");

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("<td>L Bracket</td>"));
    }

    #[tokio::test]
    async fn test_master_data() {
        let (status, body) = get_json(&app(), "/api/master").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"][0]["sku"], "KIT");
        assert_eq!(body["dangling_references"], json!([]));
    }

    #[tokio::test]
    async fn test_product_quote_query() {
        let app = app();

        let (status, body) = get_json(&app, "/api/products/KIT/quote?qty=10&shipping=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["purchased_total"], "4");
        assert_eq!(body["summary"]["packaging_total"], "2");

        let (status, body) = get_json(&app, "/api/products/NOPE/quote").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = get_json(&app, "/api/products/KIT/quote?margin_pct=1.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_product_quote_export() {
        let request = Request::builder()
            .uri("/api/products/KIT/quote/export")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Q-2024-001.json\""
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let workbook: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(workbook["sheets"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_quote_sheet_flow() {
        let app = app();

        let (status, body) =
            send_json(&app, "POST", "/api/quote-sheet/lines", json!({ "sku": "KIT", "qty": 10 })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["lines"][0]["line_id"], 1);

        let (status, body) =
            send_json(&app, "POST", "/api/quote-sheet/lines", json!({ "sku": "KIT", "qty": 20 })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["totals"]["line_count"], 2);
        assert_eq!(body["totals"]["total_qty"], 30);
        assert_eq!(body["totals"]["order_shipping"], "25");

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/quote-sheet/lines/1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["lines"][0]["line_id"], 2);

        let (status, body) = get_json(&app, "/api/quote-sheet").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["header"]["customer"], "ACME");
        assert_eq!(body["totals"]["line_count"], 1);

        let (status, body) = get_json(&app, "/api/quote-sheet/export").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sheets"][1]["name"], "Quote_Lines");

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/quote-sheet")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get_json(&app, "/api/quote-sheet").await;
        assert_eq!(body["totals"]["line_count"], 0);
        assert_eq!(body["header"]["quote_no"], "Q-2024-001");
    }

    #[tokio::test]
    async fn test_remove_unknown_line() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/quote-sheet/lines/7")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_add_line_for_unknown_product() {
        let (status, body) =
            send_json(&app(), "POST", "/api/quote-sheet/lines", json!({ "sku": "NOPE" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
