//! Comment stored as a single blob in the comments container

use serde::Deserialize;

/// One comment; `name` is the blob name and must be unique in the container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Comment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
}

impl Comment {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Why the name cannot serve as a blob name and a URL path segment, if it
    /// cannot. `None` means the comment is acceptable.
    pub fn name_error(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            return Some("Name is required.");
        }
        if self.name.contains('/') {
            return Some("Name must not contain '/'.");
        }
        None
    }
}
