use crate::api::{self, ApiError, Client};
use crate::types::push::Subscription;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Deserialize)]
struct PublicKeyWire {
    #[serde(rename = "publicKey")]
    public_key: String,
}

#[derive(Debug, Serialize)]
struct UnsubscribeWire<'a> {
    endpoint: &'a str,
}

impl Client {
    /// Fetches the server's VAPID public key, URL-safe base64 encoded.
    pub async fn push_public_key(&self) -> Result<String, ApiError> {
        let wire: PublicKeyWire = self.get_json("/push/public-key").await?;
        Ok(wire.public_key)
    }

    /// Registers (or re-confirms) a subscription with the server. The server
    /// side is idempotent on endpoint identity.
    pub async fn register_push_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<(), ApiError> {
        api::require("endpoint", &subscription.endpoint)?;
        api::require("p256dh", &subscription.p256dh)?;
        api::require("auth", &subscription.auth)?;
        self.post_unit("/push/subscribe", subscription).await
    }

    pub async fn remove_push_subscription(&self, endpoint: &str) -> Result<(), ApiError> {
        api::require("endpoint", endpoint)?;
        self.post_unit("/push/unsubscribe", &UnsubscribeWire { endpoint })
            .await
    }
}
