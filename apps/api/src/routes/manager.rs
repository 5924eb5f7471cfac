//! Manager routes. Every handler runs behind `require_manager`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use tableside_core::{
    ManagerClaims, Money, OrderSession, Seat, Status, StoreDraft, StoreUpdate, StoreView,
};

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::seat_service::SeatQr;
use crate::services::{OrderService, SeatService, StoreService};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/stores", get(list_stores).post(register_store))
        .route(
            "/stores/{store_id}",
            get(get_store).put(update_store).delete(delete_store),
        )
        .route("/stores/{store_id}/seats", get(list_seats).post(create_seat))
        .route("/stores/{store_id}/seats/{seat_id}/qr", get(issue_qr))
        .route("/stores/{store_id}/orders", get(list_orders))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/status", put(update_status))
        .route("/orders/{order_id}/refund", post(refund))
}

#[derive(Debug, Deserialize)]
pub struct NewSeat {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub amount: Money,
}

async fn health(Extension(claims): Extension<ManagerClaims>) -> ApiResponse<ManagerClaims> {
    ApiResponse::ok("manager token is valid", claims)
}

// -----------------------------------------------------------------------------
// Stores
// -----------------------------------------------------------------------------

async fn list_stores(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<StoreView>>> {
    let stores = StoreService::new(state).list().await?;
    Ok(ApiResponse::ok("stores", stores))
}

async fn register_store(
    State(state): State<AppState>,
    body: Result<Json<StoreDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<StoreView>> {
    let Json(draft) = body?;
    let store = StoreService::new(state).register(draft).await?;
    Ok(ApiResponse::created("store registered", store))
}

async fn get_store(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<StoreView>> {
    let Path(store_id) = path?;
    let store = StoreService::new(state).get(&store_id).await?;
    Ok(ApiResponse::ok("store", store))
}

async fn update_store(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<StoreUpdate>, JsonRejection>,
) -> ApiResult<ApiResponse<StoreView>> {
    let Path(store_id) = path?;
    let Json(update) = body?;
    let store = StoreService::new(state).update(&store_id, update).await?;
    Ok(ApiResponse::ok("store updated", store))
}

async fn delete_store(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<()>> {
    let Path(store_id) = path?;
    StoreService::new(state).delete(&store_id).await?;
    Ok(ApiResponse::ok("store deleted", ()))
}

// -----------------------------------------------------------------------------
// Seats
// -----------------------------------------------------------------------------

async fn list_seats(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<Vec<Seat>>> {
    let Path(store_id) = path?;
    let seats = SeatService::new(state).list(&store_id).await?;
    Ok(ApiResponse::ok("seats", seats))
}

async fn create_seat(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<NewSeat>, JsonRejection>,
) -> ApiResult<ApiResponse<Seat>> {
    let Path(store_id) = path?;
    let Json(body) = body?;
    let seat = SeatService::new(state).create(&store_id, &body.name).await?;
    Ok(ApiResponse::created("seat created", seat))
}

async fn issue_qr(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<ApiResponse<SeatQr>> {
    let Path((store_id, seat_id)) = path?;
    let qr = SeatService::new(state).issue_qr(&store_id, &seat_id).await?;
    Ok(ApiResponse::ok("seat QR issued", qr))
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

async fn list_orders(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<Vec<OrderSession>>> {
    let Path(store_id) = path?;
    let orders = OrderService::new(state).list_by_store(&store_id).await?;
    Ok(ApiResponse::ok("orders", orders))
}

async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let order = OrderService::new(state).get(&order_id).await?;
    Ok(ApiResponse::ok("order", order))
}

async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let Json(body) = body?;
    let order = OrderService::new(state)
        .update_status(&order_id, body.status)
        .await?;
    Ok(ApiResponse::ok("order status updated", order))
}

async fn refund(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<RefundRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let Json(body) = body?;
    let order = OrderService::new(state).refund(&order_id, body.amount).await?;
    Ok(ApiResponse::ok("partial refund recorded", order))
}
