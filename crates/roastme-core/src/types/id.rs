//! Newtype wrappers around string identifiers.
//!
//! Link IDs are short opaque tokens handed out in shareable URLs; owner IDs
//! come from the identity provider. Distinct types prevent passing an
//! `OwnerId` where a `LinkId` is expected.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Shortest link ID the generator will produce.
pub const MIN_LINK_ID_LENGTH: usize = 8;

/// Longest link ID accepted when parsing untrusted input.
pub const MAX_LINK_ID_LENGTH: usize = 64;

/// Macro to define a newtype ID wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier without validation.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Short identifier of a shareable chat link.
    LinkId
);

define_id!(
    /// Identifier of an authenticated user, as issued by the identity provider.
    OwnerId
);

impl LinkId {
    /// Generate a fresh random link ID of `length` alphanumeric characters.
    ///
    /// Uses the thread-local CSPRNG; each character carries ~5.95 bits, so
    /// the default length of 10 gives ~59 bits of entropy.
    pub fn generate(length: usize) -> Self {
        let length = length.max(MIN_LINK_ID_LENGTH);
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        Self(id)
    }
}

impl FromStr for LinkId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > MAX_LINK_ID_LENGTH {
            return Err(AppError::validation(format!(
                "Link ID must be 1-{MAX_LINK_ID_LENGTH} characters"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::validation(
                "Link ID may only contain letters, digits, '-' and '_'",
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl FromStr for OwnerId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::validation("Owner ID must not be empty"));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_alphabet() {
        let id = LinkId::generate(10);
        assert_eq!(id.as_str().len(), 10);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_enforces_minimum() {
        let id = LinkId::generate(3);
        assert_eq!(id.as_str().len(), MIN_LINK_ID_LENGTH);
    }

    #[test]
    fn test_generate_unique() {
        let a = LinkId::generate(10);
        let b = LinkId::generate(10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<LinkId>().is_err());
        assert!("abc/../def".parse::<LinkId>().is_err());
        assert!("x".repeat(65).parse::<LinkId>().is_err());
        let id: LinkId = " Ab3_x-9 ".parse().expect("should parse");
        assert_eq!(id.as_str(), "Ab3_x-9");
    }

    #[test]
    fn test_serde_transparent() {
        let id = LinkId::new("q7Zk2LmP0a");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"q7Zk2LmP0a\"");
        let parsed: LinkId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, id);
    }
}
