//! Identifier newtypes for frontend-assigned entities.
//!
//! The monkey frontend assigns every window, login prompt and certificate
//! prompt a numeric identifier and echoes it in each notification
//! (`WIN <n>`, `LWIN <n>`, `CWIN <n>`). These newtypes keep the three id
//! spaces from mixing.
//!
//! # Identifier Types
//!
//! | Type | Wire tag | Announced by |
//! |------|----------|--------------|
//! | [`WindowId`] | `WIN` | `WINDOW NEW` |
//! | [`LoginId`] | `LWIN` | `LOGIN OPEN` |
//! | [`CertId`] | `CWIN` | `SSLCERT VERIFY` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Macro
// ============================================================================

macro_rules! wire_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Creates an identifier from a raw value.
            #[inline]
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Parses an identifier from a wire token.
            ///
            /// Returns `None` when the token is not a decimal number.
            #[inline]
            #[must_use]
            pub fn from_token(token: &str) -> Option<Self> {
                token.parse().ok().map(Self)
            }

            /// Returns the raw value.
            #[inline]
            #[must_use]
            pub const fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ============================================================================
// Identifier Types
// ============================================================================

wire_id! {
    /// Identifier of a browser window, assigned by the frontend.
    WindowId
}

wire_id! {
    /// Identifier of a login (authentication) prompt.
    LoginId
}

wire_id! {
    /// Identifier of a certificate verification prompt.
    CertId
}

// ============================================================================
// Tests
// ============================================================================
