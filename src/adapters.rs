use crate::ports::push::PushPlatform;
use crate::types::push::{Permission, Subscription};

use std::future::Ready;
use std::future::ready;

/// The adapter for hosts with no push service at all. `messaging_supported`
/// is always false, so a manager built over it reports the capability
/// failure instead of attempting the flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPushPlatform;

#[derive(Debug, Clone, Copy)]
pub struct UnsupportedPlatformError;

impl std::fmt::Display for UnsupportedPlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("push messaging is not supported on this platform")
    }
}

impl PushPlatform for UnsupportedPushPlatform {
    type Error = UnsupportedPlatformError;
    type RegisterFut<'a>
        = Ready<Result<(), Self::Error>>
    where
        Self: 'a;
    type PermissionFut<'a>
        = Ready<Permission>
    where
        Self: 'a;
    type QueryFut<'a>
        = Ready<Result<Option<Subscription>, Self::Error>>
    where
        Self: 'a;
    type SubscribeFut<'a>
        = Ready<Result<Subscription, Self::Error>>
    where
        Self: 'a;
    type UnsubscribeFut<'a>
        = Ready<Result<(), Self::Error>>
    where
        Self: 'a;

    fn messaging_supported(&self) -> bool {
        false
    }

    fn permission(&self) -> Permission {
        Permission::Default
    }

    fn register_worker<'a>(&'a self) -> Self::RegisterFut<'a> {
        ready(Err(UnsupportedPlatformError))
    }

    fn request_permission<'a>(&'a self) -> Self::PermissionFut<'a> {
        ready(Permission::Default)
    }

    fn subscription<'a>(&'a self) -> Self::QueryFut<'a> {
        ready(Err(UnsupportedPlatformError))
    }

    fn subscribe<'a>(&'a self, _server_key: &'a [u8]) -> Self::SubscribeFut<'a> {
        ready(Err(UnsupportedPlatformError))
    }

    fn unsubscribe<'a>(&'a self) -> Self::UnsubscribeFut<'a> {
        ready(Err(UnsupportedPlatformError))
    }
}
