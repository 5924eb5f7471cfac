//! Order use cases for both customers and managers.
//!
//! Customers only reach orders opened at their own store and seat. Every
//! other order looks missing to them.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use tableside_core::validation::{validate_price, validate_quantity, validate_refund_amount};
use tableside_core::{LineItem, Money, OrderSession, SessionClaims, Status, ValidationError};
use tableside_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::services::StoreService;
use crate::AppState;

/// A line item as submitted by a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLineItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in minor units.
    pub price: Money,
}

impl NewLineItem {
    fn into_line_item(self) -> ApiResult<LineItem> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::required("product_id").into());
        }
        validate_quantity(self.quantity)?;
        validate_price(self.price)?;
        Ok(LineItem::new(self.product_id.trim(), self.quantity, self.price))
    }
}

/// Read-modify-write attempts before a conflicting order write gives up
/// with 409.
const MAX_WRITE_ATTEMPTS: u32 = 3;

pub struct OrderService {
    state: AppState,
}

impl OrderService {
    pub fn new(state: AppState) -> Self {
        OrderService { state }
    }

    // -------------------------------------------------------------------------
    // Session side
    // -------------------------------------------------------------------------

    /// Opens an order at the session's store and seat.
    pub async fn create(
        &self,
        claims: &SessionClaims,
        items: Vec<NewLineItem>,
    ) -> ApiResult<OrderSession> {
        let items = items
            .into_iter()
            .map(NewLineItem::into_line_item)
            .collect::<ApiResult<Vec<_>>>()?;

        let order = OrderSession::new(claims.store_id.as_str(), claims.seat_id.as_str(), items)?;
        self.state.orders.create(&order).await?;

        info!(
            order_id = %order.id(),
            store_id = %order.store_id(),
            seat_id = %order.seat_id(),
            total = %order.total_amount(),
            "order created"
        );
        Ok(order)
    }

    pub async fn get_for_session(
        &self,
        claims: &SessionClaims,
        order_id: &str,
    ) -> ApiResult<OrderSession> {
        let order = self.get(order_id).await?;
        if order.store_id() != claims.store_id || order.seat_id() != claims.seat_id {
            return Err(ApiError::not_found(format!("order {order_id}")));
        }
        Ok(order)
    }

    pub async fn add_item(
        &self,
        claims: &SessionClaims,
        order_id: &str,
        item: NewLineItem,
    ) -> ApiResult<OrderSession> {
        let item = item.into_line_item()?;
        let order = self
            .mutate(Some(claims), order_id, |order| {
                order.add_item(item.clone())?;
                Ok(())
            })
            .await?;

        info!(order_id = %order_id, total = %order.total_amount(), "item added");
        Ok(order)
    }

    pub async fn cancel(&self, claims: &SessionClaims, order_id: &str) -> ApiResult<OrderSession> {
        let order = self
            .mutate(Some(claims), order_id, |order| Ok(order.mark_cancelled()?))
            .await?;

        info!(order_id = %order_id, "order cancelled");
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Manager side
    // -------------------------------------------------------------------------

    pub async fn get(&self, order_id: &str) -> ApiResult<OrderSession> {
        self.state
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("order {order_id}")))
    }

    pub async fn list_by_store(&self, store_id: &str) -> ApiResult<Vec<OrderSession>> {
        StoreService::new(self.state.clone()).load(store_id).await?;
        Ok(self
            .state
            .orders
            .find_by_field("store_id", &json!(store_id))
            .await?)
    }

    pub async fn update_status(&self, order_id: &str, status: Status) -> ApiResult<OrderSession> {
        let mut from = Status::default();
        let order = self
            .mutate(None, order_id, |order| {
                from = order.status();
                Ok(order.update_status(status)?)
            })
            .await?;

        info!(order_id = %order_id, %from, to = %status, "order status updated");
        Ok(order)
    }

    pub async fn refund(&self, order_id: &str, amount: Money) -> ApiResult<OrderSession> {
        validate_refund_amount(amount)?;
        let order = self
            .mutate(None, order_id, |order| {
                Ok(order.mark_partially_refunded(amount)?)
            })
            .await?;

        info!(order_id = %order_id, %amount, "partial refund recorded");
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Loads an order, applies `change` and writes it back only if nobody
    /// else wrote in between. A lost race reloads and re-applies `change`
    /// against the newer state, up to [`MAX_WRITE_ATTEMPTS`] times.
    ///
    /// With `claims` set the order must belong to that store and seat.
    async fn mutate<F>(
        &self,
        claims: Option<&SessionClaims>,
        order_id: &str,
        mut change: F,
    ) -> ApiResult<OrderSession>
    where
        F: FnMut(&mut OrderSession) -> ApiResult<()>,
    {
        let mut attempt = 1;
        loop {
            let current = match claims {
                Some(claims) => self.get_for_session(claims, order_id).await?,
                None => self.get(order_id).await?,
            };
            let mut order = current.clone();
            change(&mut order)?;

            match self
                .state
                .orders
                .replace_if_unchanged(order_id, &current, &order)
                .await
            {
                Ok(()) => return Ok(order),
                Err(DbError::StaleWrite { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(order_id = %order_id, attempt, "order changed underneath, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::http::StatusCode;
    use chrono::Duration;
    use tableside_core::{OrderError, StoreDraft};

    async fn setup() -> (OrderService, SessionClaims) {
        let state = AppState::in_memory(ApiConfig::default());
        let store = StoreService::new(state.clone())
            .register(StoreDraft {
                name: "Blue Door Cafe".into(),
                email: "owner@bluedoor.test".into(),
                password: "s3cret-pass".into(),
                address: "1 Harbour St".into(),
                phone: "555-0100".into(),
            })
            .await
            .unwrap();
        let claims = SessionClaims::new(store.id, "seat_1", "Table 1", Duration::hours(1));
        (OrderService::new(state), claims)
    }

    fn item(product: &str, quantity: i64, price: i64) -> NewLineItem {
        NewLineItem {
            product_id: product.to_string(),
            quantity,
            price: Money::from_minor(price),
        }
    }

    #[tokio::test]
    async fn test_create_and_add_item() {
        let (svc, claims) = setup().await;
        let order = svc
            .create(&claims, vec![item("latte", 2, 450), item("scone", 1, 300)])
            .await
            .unwrap();
        assert_eq!(order.total_amount(), Money::from_minor(1200));
        assert_eq!(order.store_id(), claims.store_id);

        let order = svc.add_item(&claims, order.id(), item("cookie", 3, 150)).await.unwrap();
        assert_eq!(order.items().len(), 3);

        let stored = svc.get(order.id()).await.unwrap();
        assert_eq!(stored.total_amount(), Money::from_minor(1650));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_items() {
        let (svc, claims) = setup().await;

        let empty = svc.create(&claims, vec![]).await.unwrap_err();
        assert!(matches!(empty, ApiError::Order(OrderError::NoItems)));

        let negative = svc.create(&claims, vec![item("latte", -1, 450)]).await.unwrap_err();
        assert_eq!(negative.status_and_code().0, StatusCode::BAD_REQUEST);

        let blank = svc.create(&claims, vec![item(" ", 1, 450)]).await.unwrap_err();
        assert_eq!(blank.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_seat_sees_not_found() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 1, 450)]).await.unwrap();

        let other = SessionClaims::new(claims.store_id.as_str(), "seat_2", "Table 2", Duration::hours(1));
        let err = svc.get_for_session(&other, order.id()).await.unwrap_err();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);

        let err = svc.cancel(&other, order.id()).await.unwrap_err();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(svc.get(order.id()).await.unwrap().status(), Status::Created);
    }

    #[tokio::test]
    async fn test_cancel_then_add_fails() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 1, 450)]).await.unwrap();

        let cancelled = svc.cancel(&claims, order.id()).await.unwrap();
        assert_eq!(cancelled.status(), Status::Cancelled);

        let err = svc.add_item(&claims, order.id(), item("scone", 1, 300)).await.unwrap_err();
        assert_eq!(err.status_and_code(), (StatusCode::CONFLICT, "CANNOT_ADD_ITEM"));
    }

    #[tokio::test]
    async fn test_create_rejects_overflowing_amounts() {
        let (svc, claims) = setup().await;

        let err = svc
            .create(&claims, vec![item("latte", i64::MAX / 2 + 1, 2)])
            .await
            .unwrap_err();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW"));
        assert_eq!(svc.list_by_store(&claims.store_id).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_add_item_rejects_overflowing_amounts() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 1, 450)]).await.unwrap();

        let err = svc
            .add_item(&claims, order.id(), item("scone", 1, i64::MAX))
            .await
            .unwrap_err();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW"));

        let stored = svc.get(order.id()).await.unwrap();
        assert_eq!(stored.items().len(), 1);
        assert_eq!(stored.total_amount(), Money::from_minor(450));
    }

    #[tokio::test]
    async fn test_concurrent_cancel_and_add_item_do_not_lose_writes() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 1, 450)]).await.unwrap();

        let (cancelled, added) = tokio::join!(
            svc.cancel(&claims, order.id()),
            svc.add_item(&claims, order.id(), item("scone", 1, 300)),
        );
        assert!(cancelled.is_ok());

        let stored = svc.get(order.id()).await.unwrap();
        assert_eq!(stored.status(), Status::Cancelled);
        match added {
            // the item landed before the cancellation
            Ok(_) => assert_eq!(stored.items().len(), 2),
            Err(err) => {
                assert_eq!(err.status_and_code().1, "CANNOT_ADD_ITEM");
                assert_eq!(stored.items().len(), 1);
            }
        }
    }

    #[tokio::test]
    async fn test_stale_copy_cannot_overwrite_newer_order() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 1, 450)]).await.unwrap();

        let stale = svc.get(order.id()).await.unwrap();
        svc.cancel(&claims, order.id()).await.unwrap();

        let mut grown = stale.clone();
        grown
            .add_item(LineItem::new("scone", 1, Money::from_minor(300)))
            .unwrap();
        let err: ApiError = svc
            .state
            .orders
            .replace_if_unchanged(order.id(), &stale, &grown)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);

        let stored = svc.get(order.id()).await.unwrap();
        assert_eq!(stored.status(), Status::Cancelled);
        assert_eq!(stored.items().len(), 1);
    }

    #[tokio::test]
    async fn test_manager_status_and_refund() {
        let (svc, claims) = setup().await;
        let order = svc.create(&claims, vec![item("latte", 2, 500)]).await.unwrap();

        svc.update_status(order.id(), Status::Confirmed).await.unwrap();
        let err = svc.update_status(order.id(), Status::Created).await.unwrap_err();
        assert_eq!(err.status_and_code().1, "INVALID_STATUS_TRANSITION");

        let too_much = svc.refund(order.id(), Money::from_minor(1001)).await.unwrap_err();
        assert_eq!(too_much.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let zero = svc.refund(order.id(), Money::ZERO).await.unwrap_err();
        assert_eq!(zero.status_and_code().0, StatusCode::BAD_REQUEST);

        let refunded = svc.refund(order.id(), Money::from_minor(1000)).await.unwrap();
        assert_eq!(refunded.status(), Status::PartiallyRefunded);

        let listed = svc.list_by_store(&claims.store_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status(), Status::PartiallyRefunded);

        let missing = svc.list_by_store("store_missing").await.unwrap_err();
        assert_eq!(missing.status_and_code().0, StatusCode::NOT_FOUND);
    }
}
