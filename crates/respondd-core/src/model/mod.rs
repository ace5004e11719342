// ── Domain model ──

pub mod mac;
pub mod snapshot;

pub use mac::MacAddress;
pub use snapshot::{Coordinates, DeviceSnapshot};
