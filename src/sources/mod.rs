mod orders;
mod reservations;

use anyhow::Result;
use async_trait::async_trait;

pub use orders::OrderSource;
pub use reservations::ReservationSource;

/// A backend resource whose entries carry a status worth watching.
///
/// Implementations fetch the full current list and reduce it to
/// (id, status) pairs; the diffing against the previous poll happens in the
/// watcher, not here.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Human label used in notifications and logs ("Order", "Reservation").
    fn label(&self) -> &'static str;

    async fn fetch_statuses(&self) -> Result<Vec<(String, String)>>;
}
