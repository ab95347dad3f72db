//! Backend choice lists
//!
//! The backend stores categories, services and roles as short codes and the
//! front-end shows a French label for each. Unknown codes never fail decoding:
//! they collapse into the enum's fallback variant.

use serde::Serialize;

/// A code/label pair, as rendered in selects and filter chips
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub code: &'static str,
    pub label: &'static str,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => ($code:literal, $label:literal) ),+ $(,)?
        }
        fallback = $fallback:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Every variant, in display order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Code used on the wire
            pub fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Human readable label
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Strict lookup (case-insensitive)
            pub fn from_code(code: &str) -> Option<Self> {
                let code = code.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.code().eq_ignore_ascii_case(code))
            }

            /// Lookup falling back to the catch-all variant
            pub fn from_code_lossy(code: &str) -> Self {
                Self::from_code(code).unwrap_or($name::$fallback)
            }

            /// Code/label pairs for selects and chips
            pub fn options() -> Vec<$crate::models::ChoiceOption> {
                Self::ALL
                    .iter()
                    .map(|choice| $crate::models::ChoiceOption {
                        code: choice.code(),
                        label: choice.label(),
                    })
                    .collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = Option::<String>::deserialize(deserializer)?;
                Ok(code.map(|c| Self::from_code_lossy(&c)).unwrap_or_default())
            }
        }
    };
}

pub(crate) use choice_enum;
