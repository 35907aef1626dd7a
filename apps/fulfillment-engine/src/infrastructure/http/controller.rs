//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases. Every
//! failure leaves as `{code, message}` with the status from
//! [`ErrorCode::http_status`](crate::error::ErrorCode::http_status).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
};

use crate::application::dto::{CreateOrderDto, OrderDto, QueryResultDto, TransitionRequestDto};
use crate::application::ports::{NotificationPort, PaymentPort};
use crate::application::use_cases::{
    CreateOrderUseCase, QueryOrdersUseCase, TransitionCommand, TransitionOrderUseCase,
    UpdateOrderUseCase,
};
use crate::domain::order_management::{OrderRepository, ShippingAddress};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{OrderId, Timestamp};
use crate::error::FulfillmentError;

use super::request::{OrderQueryParams, ReplaceItemsRequest, UpdateNotesRequest};
use super::response::HealthResponse;

/// Application state shared across handlers.
pub struct AppState<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    /// Use case for checkout.
    pub create_order: Arc<CreateOrderUseCase<R, N>>,
    /// Use case for status changes.
    pub transition_order: Arc<TransitionOrderUseCase<P, N, R>>,
    /// Use case for seller edits.
    pub update_order: Arc<UpdateOrderUseCase<R>>,
    /// Use case for reads.
    pub query_orders: Arc<QueryOrdersUseCase<R>>,
    /// Policy in force.
    pub policy: Arc<BusinessPolicy>,
    /// Refund timeout handed to every transition.
    pub refund_timeout: Duration,
    /// Application version.
    pub version: String,
}

impl<P, N, R> Clone for AppState<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    fn clone(&self) -> Self {
        Self {
            create_order: Arc::clone(&self.create_order),
            transition_order: Arc::clone(&self.transition_order),
            update_order: Arc::clone(&self.update_order),
            query_orders: Arc::clone(&self.query_orders),
            policy: Arc::clone(&self.policy),
            refund_timeout: self.refund_timeout,
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<P, N, R>(state: AppState<P, N, R>) -> Router
where
    P: PaymentPort + 'static,
    N: NotificationPort + 'static,
    R: OrderRepository + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders", post(create_order).get(list_orders))
        .route("/api/v1/orders/{id}", get(get_order))
        .route("/api/v1/orders/{id}/transitions", post(transition_order))
        .route("/api/v1/orders/{id}/notes", patch(update_notes))
        .route(
            "/api/v1/orders/{id}/shipping_address",
            put(update_shipping_address),
        )
        .route("/api/v1/orders/{id}/items", put(replace_items))
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, FulfillmentError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| FulfillmentError::invalid_request(e.body_text()))
}

/// Health check endpoint.
async fn health_check<P, N, R>(State(state): State<AppState<P, N, R>>) -> impl IntoResponse
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        policy_version: state.policy.version,
    })
}

/// Checkout endpoint.
async fn create_order<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    payload: Result<Json<CreateOrderDto>, JsonRejection>,
) -> Result<impl IntoResponse, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let command = body(payload)?.to_command()?;
    let order = state
        .create_order
        .execute(command, &state.policy, Timestamp::now())
        .await?;
    Ok((StatusCode::CREATED, Json(OrderDto::from_order(&order))))
}

/// Filtered listing with aggregates.
async fn list_orders<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    params: Result<Query<OrderQueryParams>, QueryRejection>,
) -> Result<Json<QueryResultDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let Query(params) = params.map_err(|e| FulfillmentError::invalid_request(e.body_text()))?;
    let filter = params.to_filter(Timestamp::now())?;
    let result = state.query_orders.execute(&filter).await?;
    Ok(Json(QueryResultDto::from(&result)))
}

/// Single order endpoint.
async fn get_order<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let order = state.query_orders.get(&OrderId::new(id)).await?;
    Ok(Json(OrderDto::from_order(&order)))
}

/// Apply a fulfillment event.
async fn transition_order<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    Path(id): Path<String>,
    payload: Result<Json<TransitionRequestDto>, JsonRejection>,
) -> Result<Json<OrderDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let request = body(payload)?;
    let event = request.to_event()?;
    let command = TransitionCommand {
        order_id: OrderId::new(id),
        event,
        policy: state.policy.as_ref().clone(),
        now: Timestamp::now(),
        refund_timeout: state.refund_timeout,
        expected_version: request.expected_version,
        expected_status: request.expected_status,
    };
    let order = state.transition_order.execute(command).await?;
    Ok(Json(OrderDto::from_order(&order)))
}

/// Replace seller notes.
async fn update_notes<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNotesRequest>, JsonRejection>,
) -> Result<Json<OrderDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let request = body(payload)?;
    let order = state
        .update_order
        .update_notes(&OrderId::new(id), request.notes, Timestamp::now())
        .await?;
    Ok(Json(OrderDto::from_order(&order)))
}

/// Set the shipping address of a pending order.
async fn update_shipping_address<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    Path(id): Path<String>,
    payload: Result<Json<ShippingAddress>, JsonRejection>,
) -> Result<Json<OrderDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let address = body(payload)?;
    let order = state
        .update_order
        .update_shipping_address(&OrderId::new(id), address, Timestamp::now())
        .await?;
    Ok(Json(OrderDto::from_order(&order)))
}

/// Replace the items of a pending order.
async fn replace_items<P, N, R>(
    State(state): State<AppState<P, N, R>>,
    Path(id): Path<String>,
    payload: Result<Json<ReplaceItemsRequest>, JsonRejection>,
) -> Result<Json<OrderDto>, FulfillmentError>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    let items = body(payload)?.to_domain()?;
    let order = state
        .update_order
        .replace_items(&OrderId::new(id), items, &state.policy, Timestamp::now())
        .await?;
    Ok(Json(OrderDto::from_order(&order)))
}
