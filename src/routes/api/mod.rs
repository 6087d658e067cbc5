pub mod addresses;
pub mod admin_dashboard;
pub mod auth;
pub mod carts;
pub mod categories;
pub mod food_items;
pub mod orders;
pub mod reports;
pub mod reviews;
mod router;
pub mod users;
pub mod wishlist;

use serde::Deserialize;

use crate::config::StoreConfig;

pub use router::router;

/// `?pageNumber=&pageSize=`; missing values fall back to page 1 and the configured size.
/// Out-of-range values are rejected by the DAO layer with a 400.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn resolve(&self, store: &StoreConfig) -> (u64, u64) {
        (
            self.page_number.unwrap_or(1),
            self.page_size.unwrap_or(store.default_page_size),
        )
    }
}
