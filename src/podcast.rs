use serde::{Deserialize, Serialize};

/// Episode details attached to a record that came from a podcast feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PodcastEpisode {
    pub url: String,
    /// Where the episode was downloaded to, if it was.
    pub local_url: Option<String>,
    /// The feed the episode belongs to.
    pub channel_url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub description: String,
    /// Publication date as given by the feed.
    pub date: String,
    pub duration_sec: i32,
    pub mime_type: String,
    pub guid: String,
    #[serde(default)]
    pub is_new: bool,
}

impl PodcastEpisode {
    pub fn is_downloaded(&self) -> bool {
        self.local_url.is_some()
    }
}
