use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shopscout_core::{
    accounts::{Account, FeedbackEntry},
    payments::{CreditPackage, PaymentIntent, PaymentReceipt, PaymentService},
    search::{FilteredView, SearchResponse, SiteRepresentatives},
};
use shopscout_search::FilterMode;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz() -> &'static str {
    "ok"
}

// ===================== Users =====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUser {
    user_id: String,
    username: Option<String>,
}

async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterUser>,
) -> ApiResult<Json<Account>> {
    let user_id = required("userId", &payload.user_id)?;
    let account = state.ledger.register(
        user_id,
        payload.username.as_deref().map(str::trim).filter(|u| !u.is_empty()),
        state.free_credits,
    )?;
    Ok(Json(account))
}

async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.ledger.account(&user_id)?))
}

// ===================== Search =====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    user_id: String,
    /// Defaults to the user id (one conversation per user)
    conversation_id: Option<String>,
    query: String,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let user_id = required("userId", &payload.user_id)?;
    let conversation_id = payload
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(user_id);
    let response = state
        .search_service
        .search(user_id, conversation_id, &payload.query)
        .await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
struct ViewQuery {
    mode: Option<String>,
}

async fn session_results(
    Path(conversation_id): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<FilteredView>> {
    let mode = query
        .mode
        .as_deref()
        .map(FilterMode::parse_lenient)
        .unwrap_or_default();
    Ok(Json(state.search_service.view(&conversation_id, mode)?))
}

async fn session_per_site(
    Path(conversation_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SiteRepresentatives>> {
    Ok(Json(state.search_service.representatives(&conversation_id)?))
}

async fn end_session(
    Path(conversation_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.search_service.end_session(&conversation_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ===================== Feedback =====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest {
    user_id: String,
    username: Option<String>,
    message: String,
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedbackRequest>,
) -> ApiResult<(StatusCode, Json<FeedbackEntry>)> {
    let user_id = required("userId", &payload.user_id)?;
    let entry = state
        .feedback_service
        .submit(user_id, payload.username.as_deref(), &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// ===================== Payments =====================

async fn list_packages(State(state): State<Arc<AppState>>) -> Json<Vec<CreditPackage>> {
    Json(state.packages.clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseRequest {
    user_id: String,
    package: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseResponse {
    #[serde(flatten)]
    intent: PaymentIntent,
    package: CreditPackage,
}

async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PurchaseRequest>,
) -> ApiResult<Json<PurchaseResponse>> {
    let payments = payment_service(&state)?;
    let user_id = required("userId", &payload.user_id)?;
    let package = payments.package(&payload.package)?.clone();
    let intent = payments.purchase(user_id, &package.key).await?;
    Ok(Json(PurchaseResponse { intent, package }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutePaymentRequest {
    payment_id: String,
    payer_id: String,
}

async fn execute_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecutePaymentRequest>,
) -> ApiResult<Json<PaymentReceipt>> {
    let payments = payment_service(&state)?;
    let payment_id = required("paymentId", &payload.payment_id)?;
    let payer_id = required("payerId", &payload.payer_id)?;
    Ok(Json(payments.complete(payment_id, payer_id).await?))
}

fn payment_service(state: &AppState) -> ApiResult<&PaymentService> {
    state
        .payment_service
        .as_deref()
        .ok_or_else(|| ApiError::NotImplemented("Payments are not configured".to_string()))
}

fn required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(value)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/users", post(register_user))
        .route("/users/{user_id}", get(get_user))
        .route("/search", post(search))
        .route("/sessions/{conversation_id}", delete(end_session))
        .route("/sessions/{conversation_id}/results", get(session_results))
        .route("/sessions/{conversation_id}/per-site", get(session_per_site))
        .route("/feedback", post(submit_feedback))
        .route("/packages", get(list_packages))
        .route("/payments", post(create_payment))
        .route("/payments/execute", post(execute_payment));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
