mod client;
mod error;
mod offers;
mod payments;
mod properties;
mod reviews;
mod users;
mod wishlist;

pub use client::ApiClient;
pub use error::ApiError;
pub use offers::validate_offer_amount;
pub use payments::{PaymentConfirmation, PaymentProcessor, ProcessorError};
pub use properties::PropertyUpdate;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, OfferStatus, Role, SaleStatus};
    use crate::session::SessionStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct AlwaysApproves;

    #[async_trait]
    impl PaymentProcessor for AlwaysApproves {
        async fn confirm(
            &self,
            _client_secret: &str,
        ) -> Result<PaymentConfirmation, ProcessorError> {
            Ok(PaymentConfirmation {
                payment_intent_id: "pi_e2e".into(),
            })
        }
    }

    fn identity(role: Role, email: &str) -> Identity {
        Identity {
            provider_id: format!("uid-{email}"),
            email: email.into(),
            display_name: email.split('@').next().unwrap().into(),
            photo_url: None,
            role,
            verified: true,
            flagged: false,
        }
    }

    /// The full purchase walk: browse, offer, accept, pay, observe sold.
    #[tokio::test]
    async fn buyer_offer_to_sold_walkthrough() {
        let server = MockServer::start().await;
        let buyer = identity(Role::Buyer, "buyer@example.com");
        let agent = identity(Role::Agent, "agent@example.com");

        let listed = serde_json::json!({
            "_id": "prop-1", "title": "Lakeview House", "location": "Madison",
            "minPrice": 200000.0, "maxPrice": 250000.0,
            "agentName": "agent", "agentEmail": "agent@example.com",
            "verificationStatus": "verified", "saleStatus": "listed"
        });
        let sold = serde_json::json!({
            "_id": "prop-1", "title": "Lakeview House", "location": "Madison",
            "minPrice": 200000.0, "maxPrice": 250000.0,
            "verificationStatus": "verified", "saleStatus": "sold"
        });
        let offer = |status: &str, txn: Option<&str>| {
            serde_json::json!({
                "_id": "offer-1", "propertyId": "prop-1",
                "buyerEmail": "buyer@example.com", "offeredAmount": 230000.0,
                "buyingDate": "2026-09-01T00:00:00Z", "status": status,
                "transactionId": txn
            })
        };

        // Property detail: listed before the sale, sold after
        Mock::given(method("GET"))
            .and(path("/properties/prop-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&listed))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/properties/prop-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&sold))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/offers"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        // my-offers advances: pending, accepted, bought
        Mock::given(method("GET"))
            .and(path("/offers/my-offers"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([offer("pending", None)])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/offers/my-offers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([offer("accepted", None)])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/offers/my-offers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([offer("bought", Some("pi_e2e"))])),
            )
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/offers/agent/accept/offer-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        // Sibling offer on the same property rejected by the backend cascade
        Mock::given(method("GET"))
            .and(path("/offers/agent/requested-properties"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                offer("accepted", None),
                {"_id": "offer-2", "propertyId": "prop-1", "buyerEmail": "other@example.com",
                 "offeredAmount": 210000.0, "buyingDate": "2026-09-02T00:00:00Z", "status": "rejected"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/payment/create-payment-intent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"clientSecret": "cs_e2e"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payment/confirm-payment"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SessionStore::new(dir.path().join("session.json")));
        let api = ApiClient::new(server.uri(), store).unwrap();

        // Buyer browses and offers within the range
        let property = api.property("prop-1").await.unwrap();
        assert!(property.accepts_offers());
        let buying_date = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        api.create_offer(&property, 230000.0, buying_date, &buyer)
            .await
            .unwrap();
        let mine = api.my_offers().await.unwrap();
        assert_eq!(mine[0].status, OfferStatus::Pending);

        // Agent accepts; the sibling's rejection shows up on refetch
        api.accept_offer(&mine[0], &agent).await.unwrap();
        let requested = api.requested_properties().await.unwrap();
        assert_eq!(requested[0].status, OfferStatus::Accepted);
        assert_eq!(requested[1].status, OfferStatus::Rejected);

        // Buyer pays the accepted offer
        let mine = api.my_offers().await.unwrap();
        assert_eq!(mine[0].status, OfferStatus::Accepted);
        let confirmation = api
            .pay_offer(&mine[0], &buyer, &AlwaysApproves)
            .await
            .unwrap();
        assert_eq!(confirmation.payment_intent_id, "pi_e2e");

        // Terminal state: offer bought with its transaction id, property sold
        let mine = api.my_offers().await.unwrap();
        assert_eq!(mine[0].status, OfferStatus::Bought);
        assert_eq!(mine[0].transaction_id.as_deref(), Some("pi_e2e"));
        let property = api.property("prop-1").await.unwrap();
        assert_eq!(property.sale_status, SaleStatus::Sold);
    }
}
