//! Backend address handling.
//!
//! An address is a manifest value of the form `storage/path` or
//! `storage/path:field`. The field, when present, names one entry inside
//! the structured value stored at the path.

use crate::error::{Error, Result};

/// A parsed backend address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub path: String,
    pub field: Option<String>,
}

impl Address {
    /// Split an address on `:`. More than one colon is invalid input, not
    /// something to silently truncate.
    ///
    /// A trailing colon (`"path:"`) yields an empty field name, which later
    /// fails field lookup rather than falling back to the whole secret; an
    /// address meant to return the whole value omits the colon entirely.
    pub fn parse(address: &str) -> Result<Self> {
        let mut parts = address.split(':');
        let path = parts.next().unwrap_or_default().to_string();
        let field = parts.next().map(|s| s.to_string());
        if parts.next().is_some() {
            return Err(Error::MalformedAddress {
                address: address.to_string(),
            });
        }
        Ok(Self { path, field })
    }
}
