//! Storage layer for Okul Koçu
//!
//! This crate provides the sled-backed key-value store and the token store
//! that persists credentials and device preferences between launches.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod token_store;

pub use kv::{KvConfig, KvError, KvStore};
pub use token_store::TokenStore;
