// respondd-api: Async HTTP clients for the data sources behind unifi-respondd
// (UniFi controller legacy API, meshviewer node list, Nominatim geocoder).

pub mod auth;
pub mod error;
pub mod geocode;
pub mod legacy;
pub mod nodelist;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use geocode::NominatimClient;
pub use legacy::LegacyClient;
pub use nodelist::{Nodelist, NodelistClient, NodelistNode};
pub use transport::{TlsMode, TransportConfig};
