// ── Providers ──
//
// A provider turns one upstream controller family into a fresh collection
// of device snapshots. The responder depends only on this trait.

pub mod convert;
pub mod location;
pub mod unifi;

use std::future::Future;

use crate::error::ProviderError;
use crate::model::DeviceSnapshot;

pub use location::Locator;
pub use unifi::UnifiProvider;

/// Source of device snapshots.
///
/// `poll` is called once per cycle. It either yields the complete current
/// collection or fails as a whole; partial upstream failures are handled
/// inside the provider.
pub trait Provider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    fn poll(&self) -> impl Future<Output = Result<Vec<DeviceSnapshot>, ProviderError>> + Send;
}
