//! NeoCDT request approval core
//!
//! Create, list, edit and administer term deposit (CDT) requests. Two
//! roles exist: clients own their requests and may edit or delete them
//! while still editable; admins see everything and may set any status.
//! Documents live in an embedded sled store, encoded with minicbor.

pub mod actor;
pub mod cache;
pub mod error;
pub mod interest;
pub mod request;
pub mod service;
pub mod utils;
