use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::api::ApiClient;
use crate::sources::StatusSource;

pub struct ReservationSource {
    client: ApiClient,
}

impl ReservationSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for ReservationSource {
    fn label(&self) -> &'static str {
        "Reservation"
    }

    async fn fetch_statuses(&self) -> Result<Vec<(String, String)>> {
        let reservations = self
            .client
            .my_reservations()
            .await
            .context("Failed to fetch reservations")?;

        Ok(reservations
            .into_iter()
            .map(|reservation| (reservation.id, reservation.status.to_string()))
            .collect())
    }
}
