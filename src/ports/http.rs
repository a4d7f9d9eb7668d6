//! HTTP-backed cart store against a storefront cart API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;

use crate::cart::LineItem;
use crate::error::{CartAddError, PersistenceError};
use crate::ports::CartStore;

const GENERIC_ADD_ERROR: &str = "The items could not be added to the cart";

/// Cart store speaking JSON to the storefront's cart endpoints.
pub struct HttpCartStore {
    client: reqwest::Client,
    update_url: String,
    add_url: String,
}

impl HttpCartStore {
    /// `base_url` is the storefront root, e.g. `https://shop.example.com`.
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            update_url: format!("{base}/cart/update.js"),
            add_url: format!("{base}/cart/add.js"),
        }
    }

    /// Override the endpoints directly (for hosts with rerouted carts).
    pub fn with_endpoints(update_url: impl Into<String>, add_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            update_url: update_url.into(),
            add_url: add_url.into(),
        }
    }

    async fn post_update(&self, body: serde_json::Value) -> Result<(), PersistenceError> {
        let resp = self
            .client
            .post(&self.update_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PersistenceError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for HttpCartStore {
    async fn update_attributes(
        &self,
        attributes: &BTreeMap<String, String>,
    ) -> Result<(), PersistenceError> {
        self.post_update(json!({ "attributes": attributes })).await
    }

    async fn save_note(&self, note: &str) -> Result<(), PersistenceError> {
        self.post_update(json!({ "note": note })).await
    }

    async fn add_items(&self, items: &[LineItem]) -> Result<(), CartAddError> {
        let resp = self
            .client
            .post(&self.add_url)
            .json(&json!({ "items": items }))
            .send()
            .await
            .map_err(|e| CartAddError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CartAddError::Rejected {
                message: extract_message(&body),
            });
        }
        Ok(())
    }
}

/// Pull a human-readable message out of a cart-add error body.
/// Preferred fields in order: `description`, `message`.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["description", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(String::from))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ADD_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_description_first() {
        let body = r#"{"status": 422, "message": "Cart Error", "description": "Out of stock"}"#;
        assert_eq!(extract_message(body), "Out of stock");
    }

    #[test]
    fn falls_back_to_message() {
        let body = r#"{"status": 422, "message": "Cart Error"}"#;
        assert_eq!(extract_message(body), "Cart Error");
    }

    #[test]
    fn generic_on_unusable_bodies() {
        assert_eq!(extract_message("not json"), GENERIC_ADD_ERROR);
        assert_eq!(extract_message(r#"{"status": 500}"#), GENERIC_ADD_ERROR);
        assert_eq!(extract_message(r#"{"description": "  "}"#), GENERIC_ADD_ERROR);
    }

    #[test]
    fn endpoints_from_base_url() {
        let store = HttpCartStore::new("https://shop.example.com/");
        assert_eq!(store.update_url, "https://shop.example.com/cart/update.js");
        assert_eq!(store.add_url, "https://shop.example.com/cart/add.js");
    }
}
