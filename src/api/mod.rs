use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::credentials::CredentialsStore;
use crate::core::models::{
    Cart, MenuCategory, MenuItem, NewOrder, NewReservation, Order, Reservation, Review,
};
use crate::core::settings::Settings;

/// Errors from the storefront API, split so callers can tell "sign in
/// again" apart from transport or server trouble.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    Unauthorized,

    /// The backend answered but declined the request (`success: false`).
    #[error("{0}")]
    Rejected(String),

    #[error("API request failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected API response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Every storefront response is a `{ success, message?, ... }` envelope.
/// Some public endpoints omit the flag entirely; absence means success.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CategoriesPayload {
    #[serde(default)]
    categories: Vec<MenuCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuItemsPayload {
    #[serde(default)]
    menu_items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuItemPayload {
    menu_item: Option<MenuItem>,
}

#[derive(Debug, Deserialize)]
struct CartPayload {
    cart: Option<Cart>,
}

#[derive(Debug, Deserialize)]
struct CountPayload {
    #[serde(default)]
    count: u32,
}

#[derive(Debug, Deserialize)]
struct OrdersPayload {
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
struct OrderPayload {
    order: Option<Order>,
}

#[derive(Debug, Deserialize)]
struct ReservationsPayload {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
struct ReviewsPayload {
    #[serde(default)]
    reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
struct EmptyPayload {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCartItem<'a> {
    item_id: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct SetQuantity {
    quantity: u32,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialsStore,
}

impl ApiClient {
    pub fn new(settings: &Settings, credentials: CredentialsStore) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn invoice_url(&self, order_id: &str) -> String {
        format!("{}/api/orders/{order_id}/invoice", self.base_url)
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        auth: bool,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self.http.request(method, format!("{}{path}", self.base_url));

        if auth {
            let token = self
                .credentials
                .bearer_token()
                .map_err(|_| ApiError::Unauthorized)?;
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected by backend".to_string()),
            ));
        }

        Ok(envelope.payload)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, auth: bool) -> ApiResult<T> {
        self.request::<T, ()>(Method::GET, path, auth, None).await
    }

    // --- menu ---

    pub async fn categories(&self) -> ApiResult<Vec<MenuCategory>> {
        let payload: CategoriesPayload = self.get("/api/menu/categories", false).await?;
        Ok(payload.categories)
    }

    pub async fn items_by_category(
        &self,
        category_id: &str,
        limit: u32,
    ) -> ApiResult<Vec<MenuItem>> {
        let path = format!("/api/menu/category/{category_id}?limit={limit}");
        let payload: MenuItemsPayload = self.get(&path, false).await?;
        Ok(payload.menu_items)
    }

    pub async fn item(&self, item_id: &str) -> ApiResult<MenuItem> {
        let path = format!("/api/menu/item/{item_id}");
        let payload: MenuItemPayload = self.get(&path, false).await?;
        payload
            .menu_item
            .ok_or_else(|| ApiError::InvalidResponse("missing menuItem field".to_string()))
    }

    // --- cart ---

    pub async fn my_cart(&self) -> ApiResult<Cart> {
        let payload: CartPayload = self.get("/api/cart/my", true).await?;
        Ok(payload.cart.unwrap_or(Cart { items: Vec::new() }))
    }

    pub async fn add_to_cart(&self, item_id: &str, quantity: u32) -> ApiResult<()> {
        let body = AddCartItem { item_id, quantity };
        self.request::<EmptyPayload, _>(Method::POST, "/api/cart/add", true, Some(&body))
            .await?;
        Ok(())
    }

    pub async fn set_cart_quantity(&self, item_id: &str, quantity: u32) -> ApiResult<()> {
        let path = format!("/api/cart/{item_id}");
        let body = SetQuantity { quantity };
        self.request::<EmptyPayload, _>(Method::PUT, &path, true, Some(&body))
            .await?;
        Ok(())
    }

    pub async fn remove_from_cart(&self, item_id: &str) -> ApiResult<()> {
        let path = format!("/api/cart/{item_id}");
        self.request::<EmptyPayload, ()>(Method::DELETE, &path, true, None)
            .await?;
        Ok(())
    }

    pub async fn cart_count(&self) -> ApiResult<u32> {
        let payload: CountPayload = self.get("/api/cart/count", true).await?;
        Ok(payload.count)
    }

    // --- orders ---

    pub async fn place_order(&self, order: &NewOrder) -> ApiResult<Option<Order>> {
        let payload: OrderPayload = self
            .request(Method::POST, "/api/orders", true, Some(order))
            .await?;
        Ok(payload.order)
    }

    pub async fn my_orders(&self) -> ApiResult<Vec<Order>> {
        let payload: OrdersPayload = self.get("/api/orders/my", true).await?;
        Ok(payload.orders)
    }

    pub async fn order(&self, order_id: &str) -> ApiResult<Order> {
        let path = format!("/api/orders/{order_id}");
        let payload: OrderPayload = self.get(&path, true).await?;
        payload
            .order
            .ok_or_else(|| ApiError::InvalidResponse("missing order field".to_string()))
    }

    pub async fn cancel_order(&self, order_id: &str) -> ApiResult<()> {
        let path = format!("/api/orders/{order_id}");
        self.request::<EmptyPayload, ()>(Method::PUT, &path, true, None)
            .await?;
        Ok(())
    }

    // --- reservations ---

    pub async fn book_reservation(&self, reservation: &NewReservation) -> ApiResult<()> {
        self.request::<EmptyPayload, _>(Method::POST, "/api/reservations", true, Some(reservation))
            .await?;
        Ok(())
    }

    pub async fn my_reservations(&self) -> ApiResult<Vec<Reservation>> {
        let payload: ReservationsPayload = self.get("/api/reservations/my", true).await?;
        Ok(payload.reservations)
    }

    pub async fn cancel_reservation(&self, reservation_id: &str) -> ApiResult<()> {
        let path = format!("/api/reservations/{reservation_id}");
        self.request::<EmptyPayload, ()>(Method::PUT, &path, true, None)
            .await?;
        Ok(())
    }

    // --- reviews ---

    pub async fn reviews(&self) -> ApiResult<Vec<Review>> {
        let payload: ReviewsPayload = self.get("/api/reviews", false).await?;
        Ok(payload.reviews)
    }

    pub async fn post_review(&self, review: &Review) -> ApiResult<()> {
        self.request::<EmptyPayload, _>(Method::POST, "/api/reviews", true, Some(review))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_payload() {
        let json = r#"{
            "success": true,
            "orders": [{
                "_id": "o1",
                "status": "Pending",
                "items": [],
                "totalAmount": 99.0,
                "createdAt": "2026-01-18T14:30:00Z"
            }]
        }"#;

        let envelope: Envelope<OrdersPayload> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.payload.orders.len(), 1);
        assert_eq!(envelope.payload.orders[0].id, "o1");
    }

    #[test]
    fn test_envelope_missing_success_defaults_to_ok() {
        let json = r#"{ "categories": [] }"#;
        let envelope: Envelope<CategoriesPayload> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert!(envelope.payload.categories.is_empty());
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let json = r#"{ "success": false, "message": "Cart is empty" }"#;
        let envelope: Envelope<EmptyPayload> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Cart is empty"));
    }

    #[test]
    fn test_invoice_url_strips_trailing_slash() {
        let mut settings = Settings::default();
        settings.api.base_url = "https://restaurant.example.com/".to_string();
        let client = ApiClient::new(&settings, CredentialsStore::new()).unwrap();
        assert_eq!(
            client.invoice_url("o1"),
            "https://restaurant.example.com/api/orders/o1/invoice"
        );
    }
}
