//! Credential identifiers and the authorized set.
//!
//! A card UID is kept as raw bytes.  Its external form is the canonical
//! text `0F B8 E2 29`: uppercase two-digit hex pairs separated by a single
//! space.  Two identifiers are equal exactly when their canonical forms are
//! equal, which is the same as byte-wise equality.

use core::fmt;
use core::str::FromStr;

use heapless::{String, Vec};

use crate::error::CredentialError;

/// Longest ISO 14443A UID (triple size).
pub const MAX_UID_LEN: usize = 10;

/// Canonical text length for the longest UID: 10 pairs + 9 separators.
pub const MAX_CANONICAL_LEN: usize = MAX_UID_LEN * 3 - 1;

/// Capacity of the authorized set.
pub const MAX_AUTHORIZED: usize = 8;

/// A proximity-card unique identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialId {
    bytes: Vec<u8, MAX_UID_LEN>,
}

impl CredentialId {
    /// Build from raw UID bytes as delivered by the reader.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CredentialError> {
        if !matches!(bytes.len(), 4 | 7 | 10) {
            return Err(CredentialError::BadLength);
        }
        let bytes = Vec::from_slice(bytes).map_err(|()| CredentialError::BadLength)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Canonical text form, e.g. `0F B8 E2 29`.
    pub fn canonical(&self) -> String<MAX_CANONICAL_LEN> {
        let mut out = String::new();
        // Capacity is sized for the longest UID, so pushes cannot fail.
        let _ = fmt::write(&mut out, format_args!("{self}"));
        out
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for CredentialId {
    type Err = CredentialError;

    /// Parse `0f b8 E2 29` style text.  Case-insensitive; any run of
    /// whitespace separates pairs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes: Vec<u8, MAX_UID_LEN> = Vec::new();
        for token in s.split_whitespace() {
            // from_str_radix alone would accept a sign prefix like "+F".
            if token.len() != 2 || !token.bytes().all(|c| c.is_ascii_hexdigit()) {
                return Err(CredentialError::BadHexPair);
            }
            let b = u8::from_str_radix(token, 16).map_err(|_| CredentialError::BadHexPair)?;
            bytes.push(b).map_err(|_| CredentialError::BadLength)?;
        }
        Self::from_bytes(&bytes)
    }
}

/// The set of identifiers allowed to open the box.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedSet {
    ids: Vec<CredentialId, MAX_AUTHORIZED>,
}

impl AuthorizedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier.  Duplicates are ignored.  Returns the identifier
    /// back if the set is full.
    pub fn insert(&mut self, id: CredentialId) -> Result<(), CredentialId> {
        if self.contains(&id) {
            return Ok(());
        }
        self.ids.push(id)
    }

    pub fn contains(&self, id: &CredentialId) -> bool {
        self.ids.iter().any(|a| a == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
