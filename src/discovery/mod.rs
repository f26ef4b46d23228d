//! mDNS device discovery
//!
//! Browses the service types smart TVs and streaming boxes commonly
//! advertise and maps what resolves into [`Device`] entries with a brand
//! guess. Discovery is additive: results are upserted into the registry and
//! merge with statically seeded devices by address.
//!
//! Scans are bounded by a window and run off the async runtime's blocking
//! pool, so they never block startup or the control API.

mod mdns;

pub use mdns::{MdnsScanner, SERVICE_TYPES};
