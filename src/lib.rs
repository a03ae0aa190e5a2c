//! Collects picked and dropped files into an ordered manifest and submits it
//! to a remote encrypt/decrypt processor.
//!
//! Data flows one way: input ([`selection`]) → tree walk ([`traversal`]) →
//! [`manifest::ManifestStore`] → [`submit`] → a navigation target.

pub mod config;
pub mod manifest;
pub mod models;
pub mod render;
pub mod selection;
pub mod submit;
pub mod traversal;
