use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::api::ApiClient;
use crate::sources::StatusSource;

pub struct OrderSource {
    client: ApiClient,
}

impl OrderSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for OrderSource {
    fn label(&self) -> &'static str {
        "Order"
    }

    async fn fetch_statuses(&self) -> Result<Vec<(String, String)>> {
        let orders = self
            .client
            .my_orders()
            .await
            .context("Failed to fetch orders")?;

        Ok(orders
            .into_iter()
            .map(|order| (order.id, order.status.to_string()))
            .collect())
    }
}
