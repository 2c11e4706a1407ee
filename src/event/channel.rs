use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a category of notification. Channels are not declared in
/// advance, any name is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Channel(Cow<'static, str>);

impl Channel {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Channel {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Channel {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Well-known channels
pub const CHANGED: Channel = Channel::new("CHANGED");
pub const MODE: Channel = Channel::new("MODE");
pub const SELECTION: Channel = Channel::new("SELECTION");
pub const EDITED: Channel = Channel::new("EDITED");
pub const REDRAW: Channel = Channel::new("REDRAW");
pub const UNDO: Channel = Channel::new("UNDO");
pub const VIEW: Channel = Channel::new("VIEW");
pub const APP_INITIALIZED: Channel = Channel::new("APP_INITIALIZED");

/// Identity of an object that issues notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublisherId(Uuid);

impl PublisherId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PublisherId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publisher {}", self.0)
    }
}

/// Key a subscription is filed under: a specific publisher, or the wildcard
/// used for topics that are not tied to any publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublisherKey {
    Global,
    Object(PublisherId),
}

impl From<PublisherId> for PublisherKey {
    fn from(id: PublisherId) -> Self {
        Self::Object(id)
    }
}

impl fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("<global>"),
            Self::Object(id) => id.fmt(f),
        }
    }
}
