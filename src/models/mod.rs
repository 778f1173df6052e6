use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to an authenticated user by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular buyer; the older backend generation serializes this as "user"
    #[default]
    #[serde(alias = "user")]
    Buyer,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }
}

/// Identity fields supplied by the external identity provider at sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// The authenticated user's profile and role, as understood by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "uid")]
    pub provider_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, rename = "isFraud")]
    pub flagged: bool,
}

impl Identity {
    /// Provisional identity built purely from provider fields, before the
    /// backend has had a chance to assign a role
    pub fn provisional(provider: &ProviderIdentity) -> Self {
        Self {
            provider_id: provider.provider_id.clone(),
            email: provider.email.clone(),
            display_name: provider
                .display_name
                .clone()
                .unwrap_or_else(|| local_part(&provider.email)),
            photo_url: provider.photo_url.clone(),
            role: Role::Buyer,
            verified: false,
            flagged: false,
        }
    }

    /// Merge an authoritative backend user into this identity. Backend values
    /// win; fields the backend omitted fall back to the existing ones.
    pub fn merged(&self, backend: LoginUser) -> Self {
        Self {
            provider_id: backend.uid.unwrap_or_else(|| self.provider_id.clone()),
            email: backend.email.unwrap_or_else(|| self.email.clone()),
            display_name: backend
                .display_name
                .unwrap_or_else(|| self.display_name.clone()),
            photo_url: backend.photo_url.or_else(|| self.photo_url.clone()),
            role: backend.role.unwrap_or(self.role),
            verified: backend.verified.unwrap_or(false),
            flagged: backend.is_fraud.unwrap_or(false),
        }
    }
}

/// Everything before the '@', used when the provider has no display name
fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// User object in the `POST /auth/login` response; all fields optional so a
/// sparse backend answer still merges cleanly
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
    pub is_fraud: Option<bool>,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    /// Backend-issued session token; takes precedence over the provider token
    pub token: Option<String>,
}

/// The session's credential pair. The backend token, when present, always
/// wins for authorizing backend requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTokens {
    #[serde(rename = "token")]
    pub provider_token: Option<String>,
    #[serde(rename = "backendToken")]
    pub backend_token: Option<String>,
}

impl SessionTokens {
    /// Bearer credential under the total precedence rule:
    /// backend token, else provider token, else none
    pub fn bearer(&self) -> Option<&str> {
        self.backend_token
            .as_deref()
            .or(self.provider_token.as_deref())
    }
}

/// Admin moderation state of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// Whether a property is still on the market
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Listed,
    Sold,
}

/// A property listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub location: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price_range: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub agent_uid: Option<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub is_advertised: bool,
    #[serde(default)]
    pub sale_status: SaleStatus,
    pub property_type: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Only verified, still-listed properties may receive purchase offers
    pub fn accepts_offers(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
            && self.sale_status == SaleStatus::Listed
    }

    /// Offer bounds, treating an unset bound as unbounded on that side
    pub fn price_bounds(&self) -> (f64, f64) {
        (
            self.min_price.unwrap_or(0.0),
            self.max_price.unwrap_or(f64::INFINITY),
        )
    }
}

/// Payload for `POST /properties`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    pub location: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub price_range: String,
    pub agent_name: String,
    pub agent_email: String,
    pub agent_uid: String,
    pub verification_status: VerificationStatus,
    pub is_advertised: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<u32>,
}

/// Lifecycle state of a purchase offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Bought,
}

impl OfferStatus {
    /// Pending and accepted offers count against the one-active-offer rule
    pub fn is_active(&self) -> bool {
        matches!(self, OfferStatus::Pending | OfferStatus::Accepted)
    }

    /// No transition leaves rejected or bought
    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Rejected | OfferStatus::Bought)
    }

    /// Buyer cancellation is only permitted while pending
    pub fn can_cancel(&self) -> bool {
        *self == OfferStatus::Pending
    }

    /// Payment is only permitted while accepted
    pub fn can_pay(&self) -> bool {
        *self == OfferStatus::Accepted
    }

    /// The canonical state machine:
    /// pending -> accepted | rejected, accepted -> bought
    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        matches!(
            (self, next),
            (OfferStatus::Pending, OfferStatus::Accepted)
                | (OfferStatus::Pending, OfferStatus::Rejected)
                | (OfferStatus::Accepted, OfferStatus::Bought)
        )
    }
}

/// A buyer's proposal to purchase a specific property at a specific price
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub property_id: String,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
    pub property_image: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub buyer_email: String,
    pub buyer_name: Option<String>,
    pub offered_amount: f64,
    pub buying_date: DateTime<Utc>,
    pub status: OfferStatus,
    /// Set once, when payment completes
    pub transaction_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /offers`; always submitted as pending
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub property_id: String,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
    pub property_image: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub buyer_email: String,
    pub buyer_name: String,
    pub offered_amount: f64,
    pub buying_date: DateTime<Utc>,
    pub status: OfferStatus,
}

/// A saved property on a buyer's wishlist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub property_id: String,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
    pub property_image: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub user_email: String,
}

/// Payload for `POST /wishlist`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItem {
    pub property_id: String,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
    pub property_image: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub user_email: String,
}

/// A buyer-written review of a property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub property_id: String,
    pub property_title: Option<String>,
    pub agent_name: Option<String>,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub reviewer_image: Option<String>,
    pub review_text: String,
    pub rating: Option<u8>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /reviews`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub property_id: String,
    pub property_title: Option<String>,
    pub agent_name: Option<String>,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub reviewer_image: Option<String>,
    pub review_text: String,
    pub rating: u8,
}

/// A user row in the admin management listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub uid: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub is_fraud: bool,
}
