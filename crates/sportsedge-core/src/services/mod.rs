//! External collaborators: subscription lookup, daily view counter and
//! reward-structure provider, with HTTP and local implementations.

pub mod http;
pub mod local;
pub mod resolve;
pub mod traits;

pub use http::ApiClient;
pub use local::ExperimentRewardSource;
pub use resolve::{resolve_premium, resolve_schedule, resolve_view_count, Resolution, Resolved};
pub use traits::{RewardStructureProvider, SubscriptionLookup, ViewCounter};

/// Thin wrapper around the OS keyring for the backend API token.
pub mod credentials {
    use crate::error::ServiceError;

    const SERVICE: &str = "sportsedge";
    const API_TOKEN_KEY: &str = "api_token";

    pub fn api_token() -> Result<Option<String>, ServiceError> {
        let entry = keyring::Entry::new(SERVICE, API_TOKEN_KEY)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_api_token(token: &str) -> Result<(), ServiceError> {
        let entry = keyring::Entry::new(SERVICE, API_TOKEN_KEY)?;
        entry.set_password(token)?;
        Ok(())
    }

    pub fn clear_api_token() -> Result<(), ServiceError> {
        let entry = keyring::Entry::new(SERVICE, API_TOKEN_KEY)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
