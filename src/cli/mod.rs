pub mod cart;
pub mod menu;
pub mod order;
pub mod refresh;
pub mod reserve;
pub mod review;
pub mod status;

use anyhow::Result;

use crate::api::{ApiClient, ApiError};
use crate::core::credentials::{CredentialsStore, SIGN_IN_HINT};
use crate::core::settings::Settings;

pub(crate) fn build_client() -> Result<ApiClient> {
    let settings = Settings::load()?;
    settings.validate()?;
    Ok(ApiClient::new(&settings, CredentialsStore::new())?)
}

/// Turn a 401 into something actionable instead of a bare error chain.
pub(crate) fn describe(error: ApiError) -> anyhow::Error {
    match error {
        ApiError::Unauthorized => anyhow::anyhow!("Not signed in. {SIGN_IN_HINT}."),
        other => other.into(),
    }
}

pub(crate) fn format_money(amount: f64) -> String {
    format!("\u{20b9}{amount:.2}")
}
