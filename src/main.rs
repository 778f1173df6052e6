mod api;
mod models;
mod session;

use api::ApiClient;
use session::{identity_events, EnvTokenProvider, SessionManager, SessionState};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Openhouse - Marketplace Client");
    info!("==================================");
    info!("");

    let base_url = std::env::var("OPENHOUSE_BACKEND_URL")
        .unwrap_or_else(|_| "http://localhost:5000/api".to_string());
    let session_file = std::env::var("OPENHOUSE_SESSION_FILE")
        .unwrap_or_else(|_| ".openhouse-session.json".to_string());

    let store = Arc::new(session::SessionStore::new(&session_file));
    let api = ApiClient::new(&base_url, store.clone())?;
    info!("Backend: {}", api.base_url());

    // Sign in when provider credentials are present in the environment;
    // otherwise browse the public surface anonymously
    let mut signed_in = None;
    if let Some((provider, identity)) = EnvTokenProvider::from_env() {
        let mut manager = SessionManager::new(Arc::new(provider), api.clone(), store.clone());
        let (publisher, events) = identity_events(8);
        publisher.publish(Some(identity)).await;
        drop(publisher);
        manager.run(events).await;

        match manager.state() {
            SessionState::SignedIn { identity, phase } => {
                info!(
                    "Signed in as {} ({}, {:?})",
                    identity.email,
                    identity.role.as_str(),
                    phase
                );
                signed_in = Some(identity.clone());
            }
            SessionState::SignedOut => warn!("Sign-in did not complete"),
        }
    } else {
        info!("No OPENHOUSE_ID_TOKEN/OPENHOUSE_EMAIL set - browsing anonymously");
    }

    // Public listings
    let properties = api.public_properties().await?;
    info!("✅ Fetched {} public listings\n", properties.len());

    for (i, property) in properties.iter().enumerate() {
        println!("{}. {} ({})", i + 1, property.title, property.location);
        if let Some(range) = &property.price_range {
            println!("   Price: {}", range);
        }
        if let Some(agent) = &property.agent_name {
            println!("   Agent: {}", agent);
        }
        println!(
            "   Status: {:?} / {:?}",
            property.verification_status, property.sale_status
        );
        println!();
    }

    // Advertised picks, if the backend exposes them
    match api.advertised_properties().await {
        Ok(advertised) => info!("{} advertised picks on the landing page", advertised.len()),
        Err(e) => warn!("Could not fetch advertisements: {}", e),
    }

    // A signed-in buyer also sees their own offers and wishlist
    if signed_in.is_some() {
        match api.my_offers().await {
            Ok(offers) => {
                info!("You have {} offers", offers.len());
                for offer in &offers {
                    println!(
                        "   {} -> {:?} ({})",
                        offer.property_title.as_deref().unwrap_or(&offer.property_id),
                        offer.status,
                        offer.offered_amount
                    );
                }
            }
            Err(e) => warn!("Could not fetch offers: {}", e),
        }
        match api.wishlist().await {
            Ok(items) => info!("{} properties on your wishlist", items.len()),
            Err(e) => warn!("Could not fetch wishlist: {}", e),
        }
    }

    Ok(())
}
