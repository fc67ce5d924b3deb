// Data models
use serde::{Deserialize, Deserializer, Serialize};

pub type PlayerId = i64;

/// Song references hand-written lineup files use to mean "no song".
const EMPTY_SONG_MARKERS: &[&str] = &["undefined", "null"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: PlayerId,
    #[serde(deserialize_with = "display_code")]
    pub number: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<String>,
    #[serde(default)]
    pub times_batted: u32,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            name: name.into(),
            announcement_name: None,
            song: None,
            times_batted: 0,
        }
    }

    pub fn with_song(mut self, song: impl Into<String>) -> Self {
        self.song = Some(song.into());
        self
    }

    pub fn with_announcement(mut self, announcement: impl Into<String>) -> Self {
        self.announcement_name = Some(announcement.into());
        self
    }

    /// Name spoken by the announcer; falls back to the display name.
    pub fn spoken_name(&self) -> &str {
        self.announcement_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// The song reference, if it points at anything playable.
    pub fn playable_song(&self) -> Option<&str> {
        self.song.as_deref().and_then(playable_reference)
    }
}

/// Filters out blank and placeholder song references.
pub fn playable_reference(song: &str) -> Option<&str> {
    let trimmed = song.trim();
    if trimmed.is_empty() || EMPTY_SONG_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtBatAdjustment {
    Increase,
    Decrease,
}

// Jersey numbers show up as both "07" and 7 in hand-written rosters.
fn display_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Int(n) => n.to_string(),
        Code::Float(n) => n.to_string(),
    })
}
