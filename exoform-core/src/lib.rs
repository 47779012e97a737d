//! Exoform Core
//!
//! Provider-agnostic building blocks for declarative infrastructure resources:
//! attribute values, desired and observed state, attribute schemas and the
//! `Provider` trait that maps them onto a remote API.

pub mod provider;
pub mod resource;
pub mod schema;
