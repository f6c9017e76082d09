use crate::types::push::{Permission, Subscription};

/// The host's push capability: a background worker that can be registered,
/// a notification permission, and at most one platform subscription. In a
/// browser host this maps onto the service-worker and push APIs; elsewhere an
/// adapter decides what, if anything, backs it.
pub trait PushPlatform: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type RegisterFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;
    type PermissionFut<'a>: Future<Output = Permission> + Send + 'a
    where
        Self: 'a;
    type QueryFut<'a>: Future<Output = Result<Option<Subscription>, Self::Error>> + Send + 'a
    where
        Self: 'a;
    type SubscribeFut<'a>: Future<Output = Result<Subscription, Self::Error>> + Send + 'a
    where
        Self: 'a;
    type UnsubscribeFut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;

    /// Whether the host supports background workers and push messaging at
    /// all. When this is false every other call is allowed to fail.
    fn messaging_supported(&self) -> bool;

    /// Current permission state, without prompting.
    fn permission(&self) -> Permission;

    fn register_worker<'a>(&'a self) -> Self::RegisterFut<'a>;

    /// Prompts for permission if it is still undecided and returns the
    /// resulting state.
    fn request_permission<'a>(&'a self) -> Self::PermissionFut<'a>;

    /// The subscription currently held by the platform, if any.
    fn subscription<'a>(&'a self) -> Self::QueryFut<'a>;

    /// Creates a platform subscription scoped to the server's public key.
    fn subscribe<'a>(&'a self, server_key: &'a [u8]) -> Self::SubscribeFut<'a>;

    /// Cancels the platform subscription.
    fn unsubscribe<'a>(&'a self) -> Self::UnsubscribeFut<'a>;
}
