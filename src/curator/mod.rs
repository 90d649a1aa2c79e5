//! Curator gateway around a generative-content backend.
//!
//! Provides:
//! - Location resolution (geocoding, GPS pass-through)
//! - Grounded discovery of candidate locations
//! - Expert answers with citations and location deep dives
//!
//! All knowledge of the external API lives here. Every call goes through
//! one retry wrapper, and every reply goes through the parse-and-validate
//! boundary before anything typed leaves the module.

pub mod backend;
pub mod client;
pub mod error;
pub mod gemini;
pub mod parse;
pub mod prompts;
pub mod relay;
pub mod retry;
pub mod types;

pub use backend::{ApiKey, Backend, GenerativeBackend};
pub use client::CuratorClient;
pub use error::CuratorError;
pub use gemini::GeminiBackend;
pub use parse::ValidationDropped;
pub use relay::RelayBackend;
pub use retry::RetryPolicy;
pub use types::{
    BackendReply, Citation, CuratorRequest, DiscoveryBatch, ExpertAnswer, LocationQuery,
    ResolvedLocation, Task, CURRENT_LOCATION_NAME,
};
