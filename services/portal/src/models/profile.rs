//! Profile model

use serde::{Deserialize, Serialize};

/// Shown when a profile has no picture
pub const DEFAULT_AVATAR_URL: &str =
    "https://ui-avatars.com/api/?name=User&background=3b82f6&color=fff&size=200";

/// Profile of the signed-in user, also the body of the update request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_bio: String,
    #[serde(default)]
    pub profile_image_url: String,
}

impl Profile {
    pub fn image_or_default(&self) -> &str {
        if self.profile_image_url.trim().is_empty() {
            DEFAULT_AVATAR_URL
        } else {
            &self.profile_image_url
        }
    }
}
