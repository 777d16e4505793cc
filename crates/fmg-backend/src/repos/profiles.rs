use fmg_core::entities::Profile;
use fmg_core::enums::Role;
use serde_json::json;

use super::tables::PROFILES;
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

impl BackendClient {
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        self.select_one(PROFILES, &Query::new().eq("id", user_id)).await
    }

    pub async fn count_owners(&self) -> Result<u64, BackendError> {
        self.count(PROFILES, &Query::new().eq("role", Role::Owner)).await
    }

    /// Staff-side profiles, for person-in-charge pickers.
    pub async fn list_staff(&self) -> Result<Vec<Profile>, BackendError> {
        let query = Query::new()
            .in_list("role", [Role::Staff, Role::Admin, Role::Owner])
            .order("full_name", true);
        self.select(PROFILES, &query).await
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<Profile, BackendError> {
        let updated: Vec<Profile> = self
            .update(PROFILES, &Query::new().eq("id", user_id), &json!({ "role": role }))
            .await?;
        updated.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table: PROFILES.into(),
            id: user_id.into(),
        })
    }
}
