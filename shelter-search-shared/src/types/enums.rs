//! Domain enums shared by documents, filters and query strings.
//!
//! Every enum has a single wire form (SCREAMING_SNAKE_CASE) used in indexed
//! documents, filter expressions and URL query parameters alike.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name any variant of a wire enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire form of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Species of an animal taken in by the shelter.
    Species {
        Bird => "BIRD",
        Cat => "CAT",
        Dog => "DOG",
        Reptile => "REPTILE",
        Rodent => "RODENT",
    }
}

wire_enum! {
    /// Adoption lifecycle status of an animal.
    AnimalStatus {
        Adopted => "ADOPTED",
        Deceased => "DECEASED",
        Free => "FREE",
        OpenToAdoption => "OPEN_TO_ADOPTION",
        OpenToReservation => "OPEN_TO_RESERVATION",
        Reserved => "RESERVED",
        Retired => "RETIRED",
        Returned => "RETURNED",
        Transferred => "TRANSFERRED",
        Unavailable => "UNAVAILABLE",
    }
}

wire_enum! {
    /// Permission group of a back-office user.
    UserGroup {
        Admin => "ADMIN",
        AnimalEditor => "ANIMAL_EDITOR",
        BlogEditor => "BLOG_EDITOR",
        HeadOfPartnerships => "HEAD_OF_PARTNERSHIPS",
        Veterinarian => "VETERINARIAN",
        VolunteerManager => "VOLUNTEER_MANAGER",
    }
}
