use serde::{Deserialize, Serialize};

/// One uploaded image as the chalet form step holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_main: bool,
}

impl ImageRecord {
    /// Build a record from an upload acknowledgement. `position` is the
    /// 1-based slot the record lands in and seeds the default label.
    pub fn from_upload(key: &str, public_url: &str, alt: &str, position: usize) -> Self {
        Self {
            url: public_url.to_string(),
            key: Some(key.to_string()),
            alt: alt.to_string(),
            label: format!("Image {}", position),
            is_main: false,
        }
    }

    /// Label shown when the caption was left empty.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            "Untitled"
        } else {
            &self.label
        }
    }

    pub fn is_synced(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// The on-disk shape the command-line front end keeps the collection in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageManifest {
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}
