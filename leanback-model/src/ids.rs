use crate::error::{ModelError, Result};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Build an id, rejecting empty or whitespace-only input.
            pub fn try_new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ModelError::EmptyId($kind));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Catalog identifier of a single video.
    VideoId,
    "video"
);
string_id!(
    /// Catalog identifier of an uploader channel.
    ChannelId,
    "channel"
);
string_id!(
    /// Catalog identifier of a playlist.
    PlaylistId,
    "playlist"
);
string_id!(
    /// Identity of a suggestion/related-items group. Groups grow in place, so
    /// this id (not the contents) is what in-flight bookkeeping keys on.
    GroupId,
    "group"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert!(VideoId::try_new("   ").is_err());
        assert_eq!(VideoId::try_new("abc").unwrap().as_str(), "abc");
    }
}
