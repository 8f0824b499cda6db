#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod generator;
pub mod service;
pub mod vault;

pub use errors::{Result, VaultError};
pub use generator::{generate, GenerationPolicy};
pub use service::{VaultService, VaultState};
