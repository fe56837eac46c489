//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table, and its name matches
//! the table's `name` column.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID. Returns `None` for unknown IDs.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lookup table's `name` value.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a lookup `name` value.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                $name::from_name(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} '{raw}'",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_status_enum! {
    /// Per-trip seat inventory status.
    SeatStatus {
        Available = 1 => "available",
        Blocked = 2 => "blocked",
        Booked = 3 => "booked",
    }
}

define_status_enum! {
    /// Booking aggregate status (master, bus and manual bookings).
    BookingStatus {
        Pending = 1 => "pending",
        Confirmed = 2 => "confirmed",
        Cancelled = 3 => "cancelled",
        Completed = 4 => "completed",
    }
}

define_status_enum! {
    /// Payment status recorded against a booking. Never processed here.
    PaymentStatus {
        Pending = 1 => "pending",
        Partial = 2 => "partial",
        Paid = 3 => "paid",
        Refunded = 4 => "refunded",
        Failed = 5 => "failed",
    }
}

define_status_enum! {
    /// Per-seat passenger boarding lifecycle.
    PassengerStatus {
        Pending = 1 => "pending",
        Confirmed = 2 => "confirmed",
        CheckedIn = 3 => "checked_in",
        Boarded = 4 => "boarded",
        Completed = 5 => "completed",
        Cancelled = 6 => "cancelled",
        NoShow = 7 => "no_show",
    }
}

impl BookingStatus {
    /// Cancelled and completed bookings accept no further mutation.
    pub fn is_closed(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}
