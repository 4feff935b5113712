//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored short URL with its usage counters
//! - [`NewLink`] - Validated input for creating a record
//! - [`Limit`] - An optional usage cap (`-1` on the wire means unlimited)

pub mod url_record;

pub use url_record::{Limit, NewLink, UrlRecord};
