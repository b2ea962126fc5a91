//! Order placement, listing and status-transition endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{MenuItemId, OrderId, OrderStatus, RestaurantId};
use domain::{CartLine, OrderDetail, OrderListQuery, OrderService};
use serde::{Deserialize, Serialize};
use store::Storage;
use uuid::Uuid;

use crate::auth::AuthCustomer;
use crate::envelope::Envelope;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Storage> {
    pub order_service: OrderService<S>,
    pub storage: S,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartLineRequest>,
}

#[derive(Deserialize)]
pub struct CartLineRequest {
    pub id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub status: OrderStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub restaurant: String,
    pub restaurant_name: String,
    pub customer: String,
    pub order_datetime: String,
    pub total_amount_cents: i64,
    pub address: String,
    pub contact: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub item: String,
    pub price_cents: i64,
    pub quantity: u32,
}

fn order_detail_response(detail: &OrderDetail) -> OrderResponse {
    OrderResponse {
        id: detail.order.id.to_string(),
        status: detail.order.status.to_string(),
        restaurant: detail.order.restaurant_id.to_string(),
        restaurant_name: detail.restaurant_name.clone(),
        customer: detail.order.customer_id.to_string(),
        order_datetime: detail.order.order_datetime.to_rfc3339(),
        total_amount_cents: detail.order.total_amount.cents(),
        address: detail.order.address.clone(),
        contact: detail.order.contact.clone(),
        items: detail
            .items
            .iter()
            .map(|item| OrderItemResponse {
                id: item.id.to_string(),
                item: item.item_name.clone(),
                price_cents: item.price.cents(),
                quantity: item.quantity,
            })
            .collect(),
    }
}

// -- Handlers --

/// POST /orders — place an order for the authenticated customer's cart.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(customer_id): AuthCustomer,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Envelope<OrderResponse>>), ApiError> {
    let lines: Vec<CartLine> = req
        .items
        .iter()
        .map(|item| CartLine {
            menu_item_id: MenuItemId::from_uuid(item.id),
            quantity: item.quantity,
        })
        .collect();

    let detail = state.order_service.place_order(customer_id, &lines).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(order_detail_response(&detail))),
    ))
}

/// GET /orders — list the authenticated customer's orders.
#[tracing::instrument(skip(state))]
pub async fn list<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(customer_id): AuthCustomer,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Envelope<Vec<OrderResponse>>>, ApiError> {
    let listing = state
        .order_service
        .list_for_customer(customer_id, &query)
        .await?;

    let responses = listing.iter().map(order_detail_response).collect();
    Ok(Json(Envelope::success(responses)))
}

/// GET /orders/{id} — load one order for its customer or restaurant owner.
#[tracing::instrument(skip(state))]
pub async fn get<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<OrderResponse>>, ApiError> {
    let detail = state
        .order_service
        .get_order(actor_id, OrderId::from_uuid(id))
        .await?;

    Ok(Json(Envelope::success(order_detail_response(&detail))))
}

/// PATCH /orders/{id} — transition an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Envelope<OrderResponse>>, ApiError> {
    let order_id = OrderId::from_uuid(id);
    state
        .order_service
        .update_status(actor_id, order_id, req.status)
        .await?;

    let detail = state.order_service.get_order(actor_id, order_id).await?;
    Ok(Json(Envelope::success(order_detail_response(&detail))))
}

/// GET /restaurants/{id}/orders — the owner's view of a restaurant's orders.
#[tracing::instrument(skip(state))]
pub async fn restaurant_orders<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<OrderResponse>>>, ApiError> {
    let listing = state
        .order_service
        .list_for_restaurant(actor_id, RestaurantId::from_uuid(id))
        .await?;

    let responses = listing.iter().map(order_detail_response).collect();
    Ok(Json(Envelope::success(responses)))
}
