use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::models::{NewReview, Review};

impl ApiClient {
    pub async fn add_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.post_json("/reviews", review).await
    }

    /// Reviews for one property's detail page
    pub async fn property_reviews(&self, property_id: &str) -> Result<Vec<Review>, ApiError> {
        self.get_json(&format!("/reviews/property/{property_id}"))
            .await
    }

    /// Most recent reviews sitewide, for the landing page
    pub async fn latest_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get_json("/reviews/latest").await
    }

    pub async fn my_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get_json("/reviews/my-reviews").await
    }

    /// Every review, for admin moderation
    pub async fn all_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get_json("/reviews").await
    }

    pub async fn delete_review(&self, review_id: &str) -> Result<(), ApiError> {
        self.delete_ok(&format!("/reviews/{review_id}")).await
    }
}
