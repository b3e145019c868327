//! Testing helpers for [Torrust Announce Proxy](https://docs.rs/torrust-announce-proxy).
//!
//! A collection of functions and types used by the tests.
pub mod configuration;
pub mod network;
