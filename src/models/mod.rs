pub mod court;
pub mod macros;
pub mod post;
pub mod profile;
pub mod reservation;
pub mod time;
pub mod user;

pub use court::*;
pub use post::*;
pub use profile::*;
pub use reservation::*;
pub use time::*;
pub use user::*;

use crate::define_id_type;

define_id_type!(i64, UserId);
define_id_type!(i64, CourtId);
define_id_type!(i64, ScheduleId);
define_id_type!(i64, ImageId);
define_id_type!(i64, HolidayId);
define_id_type!(i64, ReservationId);
define_id_type!(i64, PostId);
define_id_type!(i64, CommentId);

/// Error returned when a stored or submitted enum label is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum using
/// its lowercase wire labels.
#[macro_export]
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    other => Err($crate::models::UnknownVariant::new($kind, other)),
                }
            }
        }
    };
}
