use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::offers::ensure_role;
use crate::models::{Identity, NewProperty, Property, Role, VerificationStatus};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

/// Partial update for an existing listing; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
}

impl ApiClient {
    /// All verified public listings
    pub async fn public_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.get_json("/properties/public").await
    }

    /// Listings matching a location search
    pub async fn search_properties(&self, location: &str) -> Result<Vec<Property>, ApiError> {
        self.send(
            self.request(Method::GET, "/properties/search")
                .query(&[("location", location)]),
        )
        .await
    }

    pub async fn property(&self, id: &str) -> Result<Property, ApiError> {
        self.get_json(&format!("/properties/{id}")).await
    }

    /// Listings the admin chose to advertise on the landing page
    pub async fn advertised_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.get_json("/properties/advertisements").await
    }

    /// The signed-in agent's own listings
    pub async fn my_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.get_json("/properties/agent/my-properties").await
    }

    /// Every listing regardless of verification state, for admin moderation
    pub async fn all_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.get_json("/properties/admin/all").await
    }

    /// Create a listing; it starts pending admin verification
    pub async fn add_property(
        &self,
        property: &NewProperty,
        agent: &Identity,
    ) -> Result<(), ApiError> {
        ensure_role(agent, Role::Agent, "add property listings")?;
        self.post_ok("/properties", property).await
    }

    pub async fn update_property(
        &self,
        id: &str,
        changes: &PropertyUpdate,
    ) -> Result<(), ApiError> {
        self.patch_ok(&format!("/properties/{id}"), changes).await
    }

    pub async fn delete_property(&self, id: &str) -> Result<(), ApiError> {
        self.delete_ok(&format!("/properties/{id}")).await
    }

    /// Admin moderation verdict on a listing
    pub async fn verify_property(
        &self,
        id: &str,
        status: VerificationStatus,
        admin: &Identity,
    ) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "verify property listings")?;
        self.patch_ok(&format!("/properties/verify/{id}"), &json!({ "status": status }))
            .await
    }

    /// Toggle a verified listing's advertisement slot
    pub async fn advertise_property(
        &self,
        id: &str,
        advertised: bool,
        admin: &Identity,
    ) -> Result<(), ApiError> {
        ensure_role(admin, Role::Admin, "advertise property listings")?;
        self.patch_ok(
            &format!("/properties/advertise/{id}"),
            &json!({ "isAdvertised": advertised }),
        )
        .await
    }
}
