//! User profiles in the `users` collection.

use serde_json::json;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteBackend;
use crate::schema::{Collection, UserProfile, UserRole};

pub struct UserDirectory {
    remote: Option<Arc<dyn RemoteBackend>>,
}

impl UserDirectory {
    pub fn new(remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        Self { remote }
    }

    fn remote(&self) -> StoreResult<&Arc<dyn RemoteBackend>> {
        self.remote.as_ref().ok_or(StoreError::NotConfigured)
    }

    pub fn get_profile(&self, uid: &str) -> StoreResult<Option<UserProfile>> {
        match self.remote()?.get(Collection::Users, uid)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
            None => Ok(None),
        }
    }

    pub fn set_profile(&self, uid: &str, profile: &UserProfile) -> StoreResult<()> {
        self.remote()?
            .set(Collection::Users, uid, serde_json::to_value(profile)?)
    }

    /// The ward is only written when given; an existing ward is kept otherwise.
    pub fn update_role(&self, uid: &str, role: UserRole, ward_number: Option<u32>) -> StoreResult<()> {
        let mut patch = json!({ "role": role });
        if let Some(ward_number) = ward_number {
            patch["wardNumber"] = json!(ward_number);
        }
        self.remote()?.update(Collection::Users, uid, patch)
    }

    pub fn list(&self) -> StoreResult<Vec<(String, UserProfile)>> {
        self.remote()?
            .list(Collection::Users, Some("createdAt"))?
            .into_iter()
            .map(|doc| -> StoreResult<(String, UserProfile)> {
                Ok((doc.id, serde_json::from_value(doc.data)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn citizen() -> UserProfile {
        UserProfile {
            email: "meera@example.in".to_string(),
            display_name: "Meera".to_string(),
            role: UserRole::Citizen,
            ward_number: None,
            created_at: "2026-01-10T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn promote_to_corporator_with_ward() {
        let remote: Arc<dyn RemoteBackend> = Arc::new(db::open_in_memory().unwrap());
        let users = UserDirectory::new(Some(remote));
        users.set_profile("uid-1", &citizen()).unwrap();

        users.update_role("uid-1", UserRole::Corporator, Some(34)).unwrap();
        let profile = users.get_profile("uid-1").unwrap().unwrap();
        assert_eq!(profile.role, UserRole::Corporator);
        assert_eq!(profile.ward_number, Some(34));

        users.update_role("uid-1", UserRole::Admin, None).unwrap();
        let profile = users.get_profile("uid-1").unwrap().unwrap();
        assert_eq!(profile.role, UserRole::Admin);
        assert_eq!(profile.ward_number, Some(34));

        assert!(users.get_profile("uid-2").unwrap().is_none());
        assert_eq!(users.list().unwrap().len(), 1);
    }
}
