//! Signed-in identity profile shown on the Graph page

/// Display name plus an optional base64-encoded profile photo.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub display_name: String,
    pub photo_base64: Option<String>,
}
