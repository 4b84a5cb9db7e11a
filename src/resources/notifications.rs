//! Web push subscription management.

use serde::{Deserialize, Serialize};

use crate::http::{ApiClient, ApiResult, Transport};
use crate::resources::crud::decode;
use crate::resources::types::PushSubscription;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VapidKey {
    public_key: String,
}

#[derive(Serialize)]
struct Unsubscribe<'a> {
    endpoint: &'a str,
}

impl<T: Transport> ApiClient<T> {
    /// Server's VAPID public key, used by browsers to create a subscription.
    pub async fn vapid_public_key(&self) -> ApiResult<String> {
        let key: VapidKey = decode(&self.get("notifications/vapid-public-key").await?)?;
        Ok(key.public_key)
    }

    pub async fn subscribe(&self, subscription: &PushSubscription) -> ApiResult<()> {
        self.post("notifications/subscribe", subscription).await?;
        Ok(())
    }

    pub async fn unsubscribe(&self, endpoint: &str) -> ApiResult<()> {
        self.post("notifications/unsubscribe", &Unsubscribe { endpoint })
            .await?;
        Ok(())
    }
}
