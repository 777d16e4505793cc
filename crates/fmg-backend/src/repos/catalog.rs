use fmg_core::entities::{Bundle, CatalogService};

use super::tables::{BUNDLES, SERVICES};
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

impl BackendClient {
    /// Services offered in the order wizard.
    pub async fn active_services(&self) -> Result<Vec<CatalogService>, BackendError> {
        let query = Query::new().eq("active", true).order("name", true);
        self.select(SERVICES, &query).await
    }

    pub async fn active_bundles(&self) -> Result<Vec<Bundle>, BackendError> {
        let query = Query::new().eq("active", true).order("price", true);
        self.select(BUNDLES, &query).await
    }
}
