//! Types shared between the gateway server and anything that talks to it.
//!
//! `types` holds the JSON wire shapes and token claims, `config` holds the
//! TOML-backed application configuration.

pub mod config;
pub mod types;
