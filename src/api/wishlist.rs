use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::models::{Identity, NewWishlistItem, Property, WishlistItem};

impl ApiClient {
    /// Save a property to the signed-in user's wishlist
    pub async fn add_to_wishlist(
        &self,
        property: &Property,
        user: &Identity,
    ) -> Result<(), ApiError> {
        let item = NewWishlistItem {
            property_id: property.id.clone(),
            property_title: Some(property.title.clone()),
            property_location: Some(property.location.clone()),
            property_image: property.image.clone(),
            agent_name: property.agent_name.clone(),
            agent_email: property.agent_email.clone(),
            user_email: user.email.clone(),
        };
        self.post_ok("/wishlist", &item).await
    }

    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        self.get_json("/wishlist").await
    }

    /// Remove a saved item by its wishlist id (not the property id)
    pub async fn remove_from_wishlist(&self, item_id: &str) -> Result<(), ApiError> {
        self.delete_ok(&format!("/wishlist/{item_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::SessionStore;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn add_carries_property_and_user_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wishlist"))
            .and(body_partial_json(serde_json::json!({
                "propertyId": "p1",
                "propertyTitle": "Loft",
                "userEmail": "ada@example.com"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SessionStore::new(dir.path().join("session.json")));
        let api = ApiClient::new(server.uri(), store).unwrap();

        let property: Property = serde_json::from_value(serde_json::json!({
            "_id": "p1", "title": "Loft", "location": "New York"
        }))
        .unwrap();
        let user = Identity {
            provider_id: "u1".into(),
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            photo_url: None,
            role: Role::Buyer,
            verified: false,
            flagged: false,
        };
        api.add_to_wishlist(&property, &user).await.unwrap();
    }
}
