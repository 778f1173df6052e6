use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::offers::ensure_role;
use crate::models::{Identity, Role, UserRecord};
use serde_json::json;

impl ApiClient {
    /// All registered users, for the admin management screen
    pub async fn users(&self, admin: &Identity) -> Result<Vec<UserRecord>, ApiError> {
        ensure_role(admin, Role::Admin, "list users")?;
        self.get_json("/users").await
    }

    pub async fn make_admin(&self, user_id: &str, admin: &Identity) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "promote users to admin")?;
        self.patch_ok(&format!("/users/make-admin/{user_id}"), &json!({}))
            .await
    }

    pub async fn make_agent(&self, user_id: &str, admin: &Identity) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "promote users to agent")?;
        self.patch_ok(&format!("/users/make-agent/{user_id}"), &json!({}))
            .await
    }

    /// Flag a user as fraudulent; their listings stop being offerable
    pub async fn mark_fraud(&self, user_id: &str, admin: &Identity) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "mark users as fraudulent")?;
        self.patch_ok(&format!("/users/mark-fraud/{user_id}"), &json!({}))
            .await
    }

    pub async fn delete_user(&self, user_id: &str, admin: &Identity) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "delete users")?;
        self.delete_ok(&format!("/users/{user_id}")).await
    }

    /// Self-service request to sell on the platform
    pub async fn become_agent(&self) -> Result<(), ApiError> {
        self.post_ok("/users/become-agent", &json!({})).await
    }
}
