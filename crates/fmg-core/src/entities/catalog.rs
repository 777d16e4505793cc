use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A priced service in the order catalog (e.g. `mixing`, `mastering`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CatalogService {
    pub key: String,
    pub name: String,
    pub default_price: u64,
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A fixed-price group of catalog services sold together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Bundle {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub service_keys: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Bundle {
    #[must_use]
    pub fn includes(&self, key: &str) -> bool {
        self.service_keys.iter().any(|k| k == key)
    }
}

const fn default_active() -> bool {
    true
}
