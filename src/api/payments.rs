use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::offers::ensure_role;
use crate::models::{Identity, Offer, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Failure reported by the external payment processor during client-side
/// confirmation; the message is processor-defined and shown verbatim
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ProcessorError(pub String);

/// Outcome of a successful client-side confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
}

/// Seam for the external payment processor's client-side confirmation step:
/// exchanges a client secret for a completed charge.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn confirm(&self, client_secret: &str) -> Result<PaymentConfirmation, ProcessorError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentIntent<'a> {
    amount: f64,
    offer_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmPayment<'a> {
    payment_intent_id: &'a str,
    offer_id: &'a str,
}

impl ApiClient {
    /// Pay for an accepted offer. Two phases: a payment intent scoped to the
    /// offered amount is requested from the backend, then the processor
    /// confirms the charge client-side. Only after confirmed success is the
    /// backend told to move the offer to bought (setting the transaction id
    /// and flipping the property to sold, observed by refetch). A processor
    /// failure leaves the offer accepted and payable again.
    pub async fn pay_offer(
        &self,
        offer: &Offer,
        buyer: &Identity,
        processor: &dyn PaymentProcessor,
    ) -> Result<PaymentConfirmation, ApiError> {
        ensure_role(buyer, Role::Buyer, "pay for offers")?;
        if !offer.status.can_pay() {
            return Err(ApiError::Validation(format!(
                "only accepted offers can be paid, this one is {:?}",
                offer.status
            )));
        }

        let intent: PaymentIntentResponse = self
            .post_json(
                "/payment/create-payment-intent",
                &CreatePaymentIntent {
                    amount: offer.offered_amount,
                    offer_id: &offer.id,
                },
            )
            .await?;

        let confirmation = processor
            .confirm(&intent.client_secret)
            .await
            .map_err(|e| ApiError::Payment(e.0))?;

        self.post_ok(
            "/payment/confirm-payment",
            &ConfirmPayment {
                payment_intent_id: &confirmation.payment_intent_id,
                offer_id: &offer.id,
            },
        )
        .await?;
        info!(
            "Payment {} confirmed for offer {}",
            confirmation.payment_intent_id, offer.id
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OfferStatus;
    use crate::session::SessionStore;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeProcessor {
        outcome: Result<PaymentConfirmation, ProcessorError>,
    }

    impl FakeProcessor {
        fn approving(intent_id: &str) -> Self {
            Self {
                outcome: Ok(PaymentConfirmation {
                    payment_intent_id: intent_id.into(),
                }),
            }
        }

        fn declining(reason: &str) -> Self {
            Self {
                outcome: Err(ProcessorError(reason.into())),
            }
        }
    }

    #[async_trait]
    impl PaymentProcessor for FakeProcessor {
        async fn confirm(
            &self,
            _client_secret: &str,
        ) -> Result<PaymentConfirmation, ProcessorError> {
            self.outcome.clone()
        }
    }

    fn client(server: &MockServer, dir: &tempfile::TempDir) -> ApiClient {
        let store = Arc::new(SessionStore::new(dir.path().join("session.json")));
        ApiClient::new(server.uri(), store).unwrap()
    }

    fn buyer() -> Identity {
        Identity {
            provider_id: "uid-b".into(),
            email: "buyer@example.com".into(),
            display_name: "Buyer".into(),
            photo_url: None,
            role: Role::Buyer,
            verified: true,
            flagged: false,
        }
    }

    fn accepted_offer() -> Offer {
        serde_json::from_value(serde_json::json!({
            "_id": "offer-1",
            "propertyId": "prop-1",
            "buyerEmail": "buyer@example.com",
            "offeredAmount": 230000.0,
            "buyingDate": "2026-09-01T00:00:00Z",
            "status": "accepted"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn successful_payment_runs_both_phases() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create-payment-intent"))
            .and(body_partial_json(
                serde_json::json!({"amount": 230000.0, "offerId": "offer-1"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"clientSecret": "cs_123"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payment/confirm-payment"))
            .and(body_partial_json(
                serde_json::json!({"paymentIntentId": "pi_123", "offerId": "offer-1"}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server, &dir);
        let confirmation = api
            .pay_offer(&accepted_offer(), &buyer(), &FakeProcessor::approving("pi_123"))
            .await
            .unwrap();
        assert_eq!(confirmation.payment_intent_id, "pi_123");
    }

    #[tokio::test]
    async fn processor_decline_skips_backend_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create-payment-intent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"clientSecret": "cs_123"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payment/confirm-payment"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server, &dir);
        let err = api
            .pay_offer(
                &accepted_offer(),
                &buyer(),
                &FakeProcessor::declining("card declined"),
            )
            .await
            .unwrap_err();
        // The offer is untouched client-side; the caller may retry
        assert!(err.is_retryable());
        match err {
            ApiError::Payment(reason) => assert_eq!(reason, "card declined"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_accepted_offers_are_payable() {
        let server = MockServer::start().await;
        // No payment endpoint is ever hit
        Mock::given(method("POST"))
            .and(path("/payment/create-payment-intent"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server, &dir);
        let mut offer = accepted_offer();

        for status in [OfferStatus::Pending, OfferStatus::Rejected, OfferStatus::Bought] {
            offer.status = status;
            let err = api
                .pay_offer(&offer, &buyer(), &FakeProcessor::approving("pi"))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{status:?}");
        }
    }
}
