use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::models::{Identity, NewOffer, Offer, OfferStatus, Property, Role};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Pre-submission guards for the offer lifecycle. The backend re-validates
/// everything; these exist to fail fast with a precise error before any
/// network call is made.
pub(crate) fn ensure_role(
    identity: &Identity,
    required: Role,
    action: &'static str,
) -> Result<(), ApiError> {
    if identity.role == required {
        Ok(())
    } else {
        Err(ApiError::role(action, identity.role))
    }
}

/// Offered amount must sit inside the property's price bounds; an unset bound
/// is unbounded on that side
pub fn validate_offer_amount(property: &Property, amount: f64) -> Result<(), ApiError> {
    let (min, max) = property.price_bounds();
    if amount < min || amount > max {
        return Err(ApiError::Validation(format!(
            "offer amount {amount} is outside the property's range {min} to {max}"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SoldTotal {
    total_sold_amount: f64,
}

impl ApiClient {
    /// Submit a pending offer on a property. Buyers only; the amount must be
    /// within the property's bounds and the property must be verified and
    /// still listed. The backend enforces the one-active-offer-per-buyer
    /// invariant and answers 409 `DUPLICATE_OFFER` when it is violated.
    pub async fn create_offer(
        &self,
        property: &Property,
        amount: f64,
        buying_date: DateTime<Utc>,
        buyer: &Identity,
    ) -> Result<(), ApiError> {
        ensure_role(buyer, Role::Buyer, "make offers on properties")?;
        if !property.accepts_offers() {
            return Err(ApiError::Validation(
                "only verified, still-listed properties can receive offers".into(),
            ));
        }
        validate_offer_amount(property, amount)?;

        let offer = NewOffer {
            property_id: property.id.clone(),
            property_title: Some(property.title.clone()),
            property_location: Some(property.location.clone()),
            property_image: property.image.clone(),
            agent_name: property.agent_name.clone(),
            agent_email: property.agent_email.clone(),
            buyer_email: buyer.email.clone(),
            buyer_name: buyer.display_name.clone(),
            offered_amount: amount,
            buying_date,
            status: OfferStatus::Pending,
        };
        self.post_ok("/offers", &offer).await?;
        info!("Offer of {} submitted for {}", amount, property.title);
        Ok(())
    }

    /// Accept a pending offer. Agent action; the backend rejects all sibling
    /// pending offers on the same property as a side effect, which callers
    /// observe by refetching, never by computing locally.
    pub async fn accept_offer(&self, offer: &Offer, agent: &Identity) -> Result<(), ApiError> {
        ensure_role(agent, Role::Agent, "accept offers")?;
        if !offer.status.can_transition_to(OfferStatus::Accepted) {
            return Err(ApiError::Validation(format!(
                "only pending offers can be accepted, this one is {:?}",
                offer.status
            )));
        }
        self.patch_ok(
            &format!("/offers/agent/accept/{}", offer.id),
            &json!({ "action": "accept" }),
        )
        .await
    }

    /// Reject a pending offer. Agent action; terminal.
    pub async fn reject_offer(&self, offer: &Offer, agent: &Identity) -> Result<(), ApiError> {
        ensure_role(agent, Role::Agent, "reject offers")?;
        if !offer.status.can_transition_to(OfferStatus::Rejected) {
            return Err(ApiError::Validation(format!(
                "only pending offers can be rejected, this one is {:?}",
                offer.status
            )));
        }
        self.patch_ok(
            &format!("/offers/agent/reject/{}", offer.id),
            &json!({ "action": "reject" }),
        )
        .await
    }

    /// Withdraw an offer. Buyer action, permitted only while still pending.
    pub async fn cancel_offer(&self, offer: &Offer, buyer: &Identity) -> Result<(), ApiError> {
        ensure_role(buyer, Role::Buyer, "cancel offers")?;
        if !offer.status.can_cancel() {
            return Err(ApiError::Validation(format!(
                "only pending offers can be cancelled, this one is {:?}",
                offer.status
            )));
        }
        self.delete_ok(&format!("/offers/{}", offer.id)).await
    }

    /// The signed-in buyer's offers across all properties
    pub async fn my_offers(&self) -> Result<Vec<Offer>, ApiError> {
        self.get_json("/offers/my-offers").await
    }

    /// Offers awaiting the signed-in agent's decision, plus their outcomes
    pub async fn requested_properties(&self) -> Result<Vec<Offer>, ApiError> {
        self.get_json("/offers/agent/requested-properties").await
    }

    /// Completed purchases on the signed-in agent's listings
    pub async fn sold_properties(&self) -> Result<Vec<Offer>, ApiError> {
        self.get_json("/offers/agent/sold-properties").await
    }

    /// Lifetime sold total for the signed-in agent
    pub async fn total_sold_amount(&self) -> Result<f64, ApiError> {
        let total: SoldTotal = self.get_json("/offers/agent/total-sold-amount").await?;
        Ok(total.total_sold_amount)
    }
}
