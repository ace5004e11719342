// respondd-core: protocol responder between the data providers (respondd-api)
// and the binary. Record builders, merge engine, wire codec, request parsing
// and the UDP transport loop live here.

pub mod codec;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod provider;
pub mod record;
pub mod reply;
pub mod request;
pub mod responder;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codec::CodecError;
pub use config::{Mode, ResponderConfig, UnifiProviderConfig};
pub use error::{ProviderError, ResponderError};
pub use merge::MergedReply;
pub use model::{Coordinates, DeviceSnapshot, MacAddress};
pub use provider::{Locator, Provider, UnifiProvider};
pub use record::{Category, Record};
pub use request::{Request, RequestError};
pub use responder::{CycleOutcome, CycleState, Destination, Responder};
