// Client for the read-only subset of the UniFi controller's legacy API the
// responder needs: session login, site listing, and per-site device and
// station statistics, all wrapped in `{ meta: { rc, msg }, data: [...] }`.

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod models;

pub use client::LegacyClient;
