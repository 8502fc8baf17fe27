//! Common library for the Jobby client
//!
//! This crate provides shared functionality used across the client crates:
//! configuration loading, key/value persistence with expiry, and the error
//! and validation types they report through.
//!
//! ```rust,no_run
//! use common::config::ClientConfig;
//! use common::store::{FileStore, KeyValueStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let store = FileStore::open(config.session_file.clone())?;
//!     store.set("greeting", "hello", Some(config.session_ttl()))?;
//!     println!("Stored value: {:?}", store.get("greeting")?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod validation;
