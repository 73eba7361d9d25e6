use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// GST applied to the cart subtotal when placing an order.
pub const GST_RATE: f64 = 0.05;
/// Flat per-order service fee, in the same currency unit as item prices.
pub const SERVICE_FEE: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    pub item: MenuItem,
    pub quantity: u32,
}

impl Cart {
    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|entry| entry.item.price * f64::from(entry.quantity))
            .sum()
    }

    /// Checkout math as charged by the storefront: subtotal + GST + a flat
    /// service fee.
    pub fn grand_total(&self) -> f64 {
        let subtotal = self.subtotal();
        subtotal + subtotal * GST_RATE + SERVICE_FEE
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// One line of an order as stored by the backend: an item id plus quantity.
/// Name and price come from a separate menu lookup when displaying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    #[serde(default)]
    pub table_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for placing an order, mirroring the storefront checkout form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub table_number: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub payment_method: String,
    pub order_notes: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn is_cancellable(&self) -> bool {
        matches!(self, ReservationStatus::Pending)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Completed => "Completed",
            ReservationStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: ReservationStatus,
    pub name: String,
    pub people_count: u32,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub special_request: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub name: String,
    pub people_count: u32,
    pub date: String,
    pub time: String,
    pub special_request: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub name: String,
    pub rating: u8,
    pub comment: String,
}
