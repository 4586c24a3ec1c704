//! memsave - deliver a memory to the first reachable memory server endpoint
//!
//! A memory server may be listening on one of several ports and may mount its
//! save route under one of several prefixes. memsave posts the memory to each
//! candidate in turn and stops at the first one that accepts it.
//!
//! ## Flow
//!
//! ```text
//!  MemoryPayload ──► EndpointProber ──► DeliveryTransport ──► endpoint 1
//!                         │                                   endpoint 2
//!                         │  first 200 OK stops the loop        ...
//!                         ▼                                   endpoint N
//!                   DeliveryReport
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: The memory + tags value object and its JSON body
//! - [`transport`]: Delivery capability trait and the reqwest implementation
//! - [`prober`]: Sequential fallback across candidate endpoints
//! - [`config`]: Configuration management

pub mod config;
pub mod error;
pub mod payload;
pub mod prober;
pub mod transport;

pub use config::MemsaveConfig;
pub use error::{Error, Result};
pub use payload::MemoryPayload;
pub use prober::{AttemptOutcome, AttemptRecord, DeliveryReport, EndpointProber};
pub use transport::{DeliveryResponse, DeliveryTransport, HttpTransport, TransportError};
