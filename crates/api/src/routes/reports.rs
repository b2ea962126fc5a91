//! Sales report endpoints for restaurant owners.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use common::{CustomerId, RestaurantId};
use domain::OrderError;
use reports::{CustomerFavorite, CustomerSpend, DateRange, ItemPopularity};
use serde::Deserialize;
use store::Storage;
use uuid::Uuid;

use crate::auth::AuthCustomer;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Reports are owner-only; other actors get a permission error and unknown
/// or inactive restaurants a not-found.
async fn authorize_owner<S: Storage>(
    state: &AppState<S>,
    actor_id: CustomerId,
    restaurant_id: RestaurantId,
) -> Result<(), ApiError> {
    let restaurant = state
        .storage
        .restaurant(restaurant_id)
        .await
        .map_err(OrderError::from)?
        .filter(|r| r.is_active)
        .ok_or(ApiError::Order(OrderError::RestaurantNotFound {
            restaurant_id,
        }))?;

    if restaurant.owner_id != actor_id {
        return Err(ApiError::Order(OrderError::Forbidden));
    }

    Ok(())
}

/// GET /restaurants/{id}/reports/customer-spends — total spend per customer,
/// optionally restricted to `?from_date=…&to_date=…`.
#[tracing::instrument(skip(state))]
pub async fn customer_spends<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Envelope<Vec<CustomerSpend>>>, ApiError> {
    let restaurant_id = RestaurantId::from_uuid(id);
    authorize_owner(&state, actor_id, restaurant_id).await?;

    let range = DateRange::from_params(params.from_date, params.to_date)?;
    let rows = reports::customer_spends(&state.storage, restaurant_id, range).await?;
    Ok(Json(Envelope::success(rows)))
}

/// GET /restaurants/{id}/reports/item-popularity — distinct customers per item.
#[tracing::instrument(skip(state))]
pub async fn item_popularity<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<ItemPopularity>>>, ApiError> {
    let restaurant_id = RestaurantId::from_uuid(id);
    authorize_owner(&state, actor_id, restaurant_id).await?;

    let rows = reports::item_popularity(&state.storage, restaurant_id).await?;
    Ok(Json(Envelope::success(rows)))
}

/// GET /restaurants/{id}/reports/customer-favorites — each customer's
/// most-ordered item.
#[tracing::instrument(skip(state))]
pub async fn customer_favorites<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthCustomer(actor_id): AuthCustomer,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<CustomerFavorite>>>, ApiError> {
    let restaurant_id = RestaurantId::from_uuid(id);
    authorize_owner(&state, actor_id, restaurant_id).await?;

    let rows = reports::customer_favorites(&state.storage, restaurant_id).await?;
    Ok(Json(Envelope::success(rows)))
}
