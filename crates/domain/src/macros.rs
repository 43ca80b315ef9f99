//! Display/FromStr derivation for wire-level status enums.
//!
//! The catalog service spells statuses in lowercase (`"pending"`,
//! `"active"`, ...). The macro keeps `Display` and `FromStr` in sync with
//! that spelling and accepts any casing when parsing.
//!
//! # Example
//!
//! ```rust
//! use paperlens_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ReviewState {
//!     Draft,
//!     Published,
//! }
//!
//! impl_domain_status_conversions!(ReviewState {
//!     Draft => "draft",
//!     Published => "published",
//! });
//!
//! assert_eq!(ReviewState::Draft.to_string(), "draft");
//! assert_eq!("PUBLISHED".parse::<ReviewState>(), Ok(ReviewState::Published));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a status enum.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
