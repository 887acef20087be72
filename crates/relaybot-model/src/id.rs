//! Identifier newtypes.
//!
//! Chat services hand out opaque string identifiers. Wrapping each kind in
//! its own type keeps a role id from being passed where a user id belongs.

use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a user account.
    UserId
);
string_id!(
    /// Identifier of a server role.
    RoleId
);
string_id!(
    /// Identifier of a channel.
    ChannelId
);
string_id!(
    /// Identifier of a server (guild).
    ServerId
);
string_id!(
    /// Identifier of a chat message.
    MessageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_value() {
        let id = UserId::from("4WPbEZwd");
        assert_eq!(id.to_string(), "4WPbEZwd");
        assert_eq!(id.as_str(), "4WPbEZwd");
    }

    #[test]
    fn test_distinct_kinds_compare_by_value() {
        assert_eq!(RoleId::new("1"), RoleId::from(String::from("1")));
        assert_ne!(RoleId::new("1"), RoleId::new("2"));
    }
}
