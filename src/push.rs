use crate::api;
use crate::ports::push::PushPlatform;
use crate::types::push::Permission;

mod keys;
pub(crate) mod vapid;

pub use keys::{InvalidServerKey, decode_server_key};

/// Where the manager is in the subscription lifecycle. `Unsubscribed` is
/// re-enterable: a later `initialize()` moves back through `Registering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unregistered,
    Registering,
    Subscribed,
    Unsubscribed,
}

/// Local view of push state: the platform permission plus whether a platform
/// subscription exists. Server-side bookkeeping can diverge from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushStatus {
    pub permission: Permission,
    pub subscribed: bool,
}

/// Drives the platform push capability and keeps the server informed. All
/// outcomes are booleans with diagnostics on stderr; nothing here retries.
pub struct SubscriptionManager<P> {
    platform: P,
    api: api::Client,
    phase: Phase,
}

impl<P: PushPlatform> SubscriptionManager<P> {
    pub fn new(api: api::Client, platform: P) -> Self {
        Self {
            platform,
            api,
            phase: Phase::Unregistered,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Registers the background worker and ensures a server-known
    /// subscription exists. Returns false on capability, permission, platform
    /// or server failure; a capability failure is terminal for the session.
    pub async fn initialize(&mut self) -> bool {
        if !self.platform.messaging_supported() {
            eprintln!("push setup skipped: platform lacks worker or push messaging support");
            return false;
        }
        self.phase = Phase::Registering;

        if let Err(err) = self.platform.register_worker().await {
            eprintln!("push setup error: worker registration failed ({err})");
            return false;
        }

        match self.platform.subscription().await {
            Ok(Some(existing)) => {
                // Already subscribed at the platform; just re-confirm with
                // the server, which is idempotent on endpoint identity.
                if let Err(err) = self.api.register_push_subscription(&existing).await {
                    eprintln!("push setup error: failed to re-confirm subscription ({err})");
                    return false;
                }
                self.phase = Phase::Subscribed;
                true
            }
            Ok(None) => self.run_subscribe().await,
            Err(err) => {
                eprintln!("push setup error: failed to query platform subscription ({err})");
                false
            }
        }
    }

    async fn run_subscribe(&mut self) -> bool {
        match self.platform.request_permission().await {
            Permission::Granted => {}
            Permission::Default | Permission::Denied => {
                eprintln!("push setup skipped: notification permission not granted");
                return false;
            }
        }

        let encoded = match self.api.push_public_key().await {
            Ok(encoded) => encoded,
            Err(err) => {
                eprintln!("push setup error: failed to fetch server public key ({err})");
                return false;
            }
        };
        let server_key = match keys::decode_server_key(&encoded) {
            Ok(server_key) => server_key,
            Err(err) => {
                eprintln!("push setup error: {err}");
                return false;
            }
        };

        let subscription = match self.platform.subscribe(&server_key).await {
            Ok(subscription) => subscription,
            Err(err) => {
                eprintln!("push setup error: platform subscription failed ({err})");
                return false;
            }
        };

        if let Err(err) = self.api.register_push_subscription(&subscription).await {
            // The platform subscription stays in place while the server does
            // not know about it; the next initialize() re-confirms it.
            eprintln!("push setup error: failed to register subscription with server ({err})");
            return false;
        }

        self.phase = Phase::Subscribed;
        true
    }

    /// Cancels the platform subscription, then tells the server. Without a
    /// subscription this is a no-op success that never contacts the server.
    pub async fn unsubscribe(&mut self) -> bool {
        let existing = match self.platform.subscription().await {
            Ok(existing) => existing,
            Err(err) => {
                eprintln!("push teardown error: failed to query platform subscription ({err})");
                return false;
            }
        };
        let Some(subscription) = existing else {
            self.phase = Phase::Unsubscribed;
            return true;
        };

        if let Err(err) = self.platform.unsubscribe().await {
            eprintln!("push teardown error: failed to cancel platform subscription ({err})");
            return false;
        }
        if let Err(err) = self
            .api
            .remove_push_subscription(&subscription.endpoint)
            .await
        {
            // The platform subscription is already gone; the server keeps a
            // stale endpoint until its next delivery failure.
            eprintln!("push teardown error: server was not informed ({err})");
            return false;
        }

        self.phase = Phase::Unsubscribed;
        true
    }

    /// Local state only; does not consult the server.
    pub async fn status(&self) -> PushStatus {
        let subscribed = matches!(self.platform.subscription().await, Ok(Some(_)));
        PushStatus {
            permission: self.platform.permission(),
            subscribed,
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::api::testing::{client_for, serve};
    use crate::types::push::Subscription;
    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use base64::{STANDARD, encode_config};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct ScriptError;

    impl std::fmt::Display for ScriptError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("scripted platform error")
        }
    }

    #[derive(Default)]
    struct PlatformState {
        supported: bool,
        permission: Permission,
        grant_on_request: bool,
        subscription: Option<Subscription>,
        fail_subscribe: bool,
        register_calls: usize,
        permission_requests: usize,
        subscribe_keys: Vec<Vec<u8>>,
        unsubscribe_calls: usize,
    }

    #[derive(Clone, Default)]
    struct ScriptedPlatform {
        state: Arc<Mutex<PlatformState>>,
    }

    fn subscription_from_parts(endpoint: &str, p256dh: &str, auth: &str) -> Subscription {
        Subscription {
            endpoint: endpoint.to_string(),
            p256dh: p256dh.to_string(),
            auth: auth.to_string(),
        }
    }

    impl ScriptedPlatform {
        fn supported() -> Self {
            let platform = Self::default();
            platform.state.lock().expect("platform lock").supported = true;
            platform
        }

        fn with<T>(&self, f: impl FnOnce(&mut PlatformState) -> T) -> T {
            f(&mut self.state.lock().expect("platform lock"))
        }
    }

    type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

    impl PushPlatform for ScriptedPlatform {
        type Error = ScriptError;
        type RegisterFut<'a>
            = BoxFut<'a, Result<(), ScriptError>>
        where
            Self: 'a;
        type PermissionFut<'a>
            = BoxFut<'a, Permission>
        where
            Self: 'a;
        type QueryFut<'a>
            = BoxFut<'a, Result<Option<Subscription>, ScriptError>>
        where
            Self: 'a;
        type SubscribeFut<'a>
            = BoxFut<'a, Result<Subscription, ScriptError>>
        where
            Self: 'a;
        type UnsubscribeFut<'a>
            = BoxFut<'a, Result<(), ScriptError>>
        where
            Self: 'a;

        fn messaging_supported(&self) -> bool {
            self.with(|state| state.supported)
        }

        fn permission(&self) -> Permission {
            self.with(|state| state.permission)
        }

        fn register_worker<'a>(&'a self) -> Self::RegisterFut<'a> {
            Box::pin(async move {
                self.with(|state| state.register_calls += 1);
                Ok(())
            })
        }

        fn request_permission<'a>(&'a self) -> Self::PermissionFut<'a> {
            Box::pin(async move {
                self.with(|state| {
                    state.permission_requests += 1;
                    if state.grant_on_request {
                        state.permission = Permission::Granted;
                    }
                    state.permission
                })
            })
        }

        fn subscription<'a>(&'a self) -> Self::QueryFut<'a> {
            Box::pin(async move { Ok(self.with(|state| state.subscription.clone())) })
        }

        fn subscribe<'a>(&'a self, server_key: &'a [u8]) -> Self::SubscribeFut<'a> {
            Box::pin(async move {
                self.with(|state| {
                    if state.fail_subscribe {
                        return Err(ScriptError);
                    }
                    state.subscribe_keys.push(server_key.to_vec());
                    let subscription =
                        subscription_from_parts("https://push.example/abc", "p256", "auth");
                    state.subscription = Some(subscription.clone());
                    Ok(subscription)
                })
            })
        }

        fn unsubscribe<'a>(&'a self) -> Self::UnsubscribeFut<'a> {
            Box::pin(async move {
                self.with(|state| {
                    state.unsubscribe_calls += 1;
                    state.subscription = None;
                });
                Ok(())
            })
        }
    }

    #[derive(Default)]
    struct ServerCalls {
        public_key_hits: usize,
        subscribed: Vec<Subscription>,
        unsubscribed: Vec<String>,
    }

    async fn push_server(key_bytes: Vec<u8>) -> (String, Arc<Mutex<ServerCalls>>) {
        let calls = Arc::new(Mutex::new(ServerCalls::default()));
        let encoded = encode_config(&key_bytes, STANDARD)
            .replace('+', "-")
            .replace('/', "_")
            .replace('=', "");
        let router = Router::new()
            .route(
                "/push/public-key",
                get({
                    let calls = Arc::clone(&calls);
                    move || {
                        let calls = Arc::clone(&calls);
                        let encoded = encoded.clone();
                        async move {
                            calls.lock().expect("calls lock").public_key_hits += 1;
                            Json(serde_json::json!({"publicKey": encoded}))
                        }
                    }
                }),
            )
            .route(
                "/push/subscribe",
                post(
                    |State(calls): State<Arc<Mutex<ServerCalls>>>,
                     Json(subscription): Json<Subscription>| async move {
                        calls.lock().expect("calls lock").subscribed.push(subscription);
                        StatusCode::NO_CONTENT
                    },
                ),
            )
            .route(
                "/push/unsubscribe",
                post(
                    |State(calls): State<Arc<Mutex<ServerCalls>>>,
                     Json(body): Json<serde_json::Value>| async move {
                        let endpoint = body["endpoint"].as_str().unwrap_or_default().to_string();
                        calls.lock().expect("calls lock").unsubscribed.push(endpoint);
                        StatusCode::NO_CONTENT
                    },
                ),
            )
            .with_state(Arc::clone(&calls));
        (serve(router).await, calls)
    }

    #[tokio::test]
    async fn initialize__should_report_false_on_unsupported_platform() {
        // Given
        let client = client_for("http://127.0.0.1:9");
        let mut manager = SubscriptionManager::new(client, ScriptedPlatform::default());

        // When
        let outcome = manager.initialize().await;

        // Then
        assert!(!outcome);
        assert_eq!(manager.phase(), Phase::Unregistered);
    }

    #[tokio::test]
    async fn initialize__should_reconfirm_existing_subscription_without_resubscribing() {
        // Given
        let (base_url, calls) = push_server(vec![9u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| {
            state.permission = Permission::Granted;
            state.subscription = Some(subscription_from_parts(
                "https://push.example/existing",
                "p256",
                "auth",
            ));
        });
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        let outcome = manager.initialize().await;

        // Then
        assert!(outcome);
        assert_eq!(manager.phase(), Phase::Subscribed);
        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.public_key_hits, 0);
        assert_eq!(calls.subscribed.len(), 1);
        assert_eq!(calls.subscribed[0].endpoint, "https://push.example/existing");
        platform.with(|state| {
            assert_eq!(state.register_calls, 1);
            assert!(state.subscribe_keys.is_empty(), "no second platform subscription");
            assert_eq!(state.permission_requests, 0);
        });
    }

    #[tokio::test]
    async fn initialize__should_run_the_full_subscribe_procedure() {
        // Given
        let key_bytes: Vec<u8> = (0u8..65).collect();
        let (base_url, calls) = push_server(key_bytes.clone()).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| state.grant_on_request = true);
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        let outcome = manager.initialize().await;

        // Then
        assert!(outcome);
        assert_eq!(manager.phase(), Phase::Subscribed);
        platform.with(|state| {
            assert_eq!(state.subscribe_keys.len(), 1);
            assert_eq!(state.subscribe_keys[0], key_bytes, "decoded key reaches the platform");
        });
        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.public_key_hits, 1);
        assert_eq!(calls.subscribed.len(), 1);
        assert_eq!(calls.subscribed[0].endpoint, "https://push.example/abc");
    }

    #[tokio::test]
    async fn initialize__should_stop_when_permission_is_denied() {
        // Given
        let (base_url, calls) = push_server(vec![1u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| state.permission = Permission::Denied);
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        let outcome = manager.initialize().await;

        // Then
        assert!(!outcome);
        assert_ne!(manager.phase(), Phase::Subscribed);
        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.public_key_hits, 0, "denied permission must not fetch the key");
        assert!(calls.subscribed.is_empty());
    }

    #[tokio::test]
    async fn initialize__should_report_false_when_platform_subscribe_fails() {
        // Given
        let (base_url, calls) = push_server(vec![2u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| {
            state.grant_on_request = true;
            state.fail_subscribe = true;
        });
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform);

        // When
        let outcome = manager.initialize().await;

        // Then
        assert!(!outcome);
        assert_ne!(manager.phase(), Phase::Subscribed);
        assert!(calls.lock().expect("calls lock").subscribed.is_empty());
    }

    #[tokio::test]
    async fn unsubscribe__should_be_a_no_op_success_without_subscription() {
        // Given
        let (base_url, calls) = push_server(vec![3u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        let outcome = manager.unsubscribe().await;

        // Then
        assert!(outcome);
        assert_eq!(manager.phase(), Phase::Unsubscribed);
        let calls = calls.lock().expect("calls lock");
        assert!(calls.unsubscribed.is_empty(), "no server contact without a subscription");
        platform.with(|state| assert_eq!(state.unsubscribe_calls, 0));
    }

    #[tokio::test]
    async fn unsubscribe__should_cancel_platform_then_inform_server() {
        // Given
        let (base_url, calls) = push_server(vec![4u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| {
            state.subscription = Some(subscription_from_parts(
                "https://push.example/live",
                "p256",
                "auth",
            ));
        });
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        let outcome = manager.unsubscribe().await;

        // Then
        assert!(outcome);
        assert_eq!(manager.phase(), Phase::Unsubscribed);
        platform.with(|state| {
            assert_eq!(state.unsubscribe_calls, 1);
            assert!(state.subscription.is_none());
        });
        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.unsubscribed, vec!["https://push.example/live".to_string()]);
    }

    #[tokio::test]
    async fn status__should_report_platform_state_without_server_contact() {
        // Given
        let client = client_for("http://127.0.0.1:9");
        let platform = ScriptedPlatform::supported();
        platform.with(|state| {
            state.permission = Permission::Granted;
            state.subscription = Some(subscription_from_parts(
                "https://push.example/live",
                "p256",
                "auth",
            ));
        });
        let manager = SubscriptionManager::new(client, platform.clone());

        // When
        let status = manager.status().await;

        // Then
        assert_eq!(status.permission, Permission::Granted);
        assert!(status.subscribed);

        // When the platform drops the subscription behind our back
        platform.with(|state| state.subscription = None);
        let status = manager.status().await;

        // Then
        assert!(!status.subscribed);
    }

    #[tokio::test]
    async fn initialize__should_be_re_enterable_after_unsubscribe() {
        // Given
        let (base_url, calls) = push_server(vec![5u8; 65]).await;
        let platform = ScriptedPlatform::supported();
        platform.with(|state| state.grant_on_request = true);
        let mut manager = SubscriptionManager::new(client_for(&base_url), platform.clone());

        // When
        assert!(manager.initialize().await);
        assert!(manager.unsubscribe().await);
        let again = manager.initialize().await;

        // Then
        assert!(again);
        assert_eq!(manager.phase(), Phase::Subscribed);
        let calls = calls.lock().expect("calls lock");
        assert_eq!(calls.subscribed.len(), 2);
        assert_eq!(calls.unsubscribed.len(), 1);
    }
}
