/// The tags module describes the boundary to the tag-reading library. The core never opens files
/// itself: a `TagSource` hands over the raw fields it found, and a `TagSink` writes them back.
///
/// Container formats differ in which fields they can store beyond the basic set. That is captured
/// in one capability table (`supports_extended_field` / `ContainerKind::extended_field_key`)
/// instead of format checks scattered over the read and write paths.
use serde::{Deserialize, Serialize};

pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".ogg", ".flac", ".m4a", ".m4b", ".mp4", ".aac"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContainerKind {
    #[default]
    Other,
    Mp3,
    OggVorbis,
    Flac,
    Mp4,
}

/// Fields outside the basic title/artist/album/comment/genre/year/track set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedField {
    Composer,
    DiscNumber,
}

pub fn supports_extended_field(kind: ContainerKind, field: ExtendedField) -> bool {
    kind.extended_field_key(field).is_some()
}

impl ContainerKind {
    /// Stable numeric code, used as the exact text of the `Type` column.
    pub fn code(&self) -> i32 {
        match self {
            ContainerKind::Other => 0,
            ContainerKind::Mp3 => 1,
            ContainerKind::OggVorbis => 2,
            ContainerKind::Flac => 3,
            ContainerKind::Mp4 => 4,
        }
    }

    pub fn from_code(code: i32) -> ContainerKind {
        match code {
            1 => ContainerKind::Mp3,
            2 => ContainerKind::OggVorbis,
            3 => ContainerKind::Flac,
            4 => ContainerKind::Mp4,
            _ => ContainerKind::Other,
        }
    }

    pub fn from_extension(ext: &str) -> ContainerKind {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "mp3" => ContainerKind::Mp3,
            "ogg" => ContainerKind::OggVorbis,
            "flac" => ContainerKind::Flac,
            "m4a" | "m4b" | "mp4" | "aac" => ContainerKind::Mp4,
            _ => ContainerKind::Other,
        }
    }

    /// The frame id, comment field name or atom that stores `field` in this container.
    pub fn extended_field_key(&self, field: ExtendedField) -> Option<&'static str> {
        match (self, field) {
            (ContainerKind::Mp3, ExtendedField::Composer) => Some("TCOM"),
            (ContainerKind::Mp3, ExtendedField::DiscNumber) => Some("TPOS"),
            (ContainerKind::OggVorbis | ContainerKind::Flac, ExtendedField::Composer) => Some("COMPOSER"),
            (ContainerKind::OggVorbis | ContainerKind::Flac, ExtendedField::DiscNumber) => Some("DISCNUMBER"),
            (ContainerKind::Mp4, ExtendedField::Composer) => Some("\u{a9}wrt"),
            (ContainerKind::Mp4, ExtendedField::DiscNumber) => Some("disk"),
            (ContainerKind::Other, _) => None,
        }
    }

    pub fn has_extended_fields(&self) -> bool {
        *self != ContainerKind::Other
    }
}

/// Properties of the audio stream itself, as opposed to its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioProperties {
    pub bitrate: i32,
    pub length_sec: i32,
    pub sample_rate: i32,
}

/// The basic tag fields every supported container has.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasicTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub comment: String,
    pub genre: String,
    /// 0 when absent.
    pub year: i32,
    /// 0 when absent.
    pub track: i32,
}

/// Everything a tag source could read from one file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTags {
    pub container: ContainerKind,
    /// None when the file has no usable tag object at all.
    pub tags: Option<BasicTags>,
    pub composer: Option<String>,
    /// Raw disc field, either `n` or `n/total`.
    pub disc: Option<String>,
    pub audio: Option<AudioProperties>,
    pub filesize: Option<i64>,
}

/// Parses a disc or track field of the form `n` or `n/total`, keeping `n`. Garbage reads as zero.
pub fn parse_position(raw: &str) -> i32 {
    let raw = raw.trim();
    let number = match raw.split_once('/') {
        Some((number, _total)) => number,
        None => raw,
    };
    number.trim().parse().unwrap_or(0)
}

pub trait TagSource {
    /// Whether the locator points at something readable.
    fn exists(&self, url: &str) -> bool;

    /// Reads the tags at `url`. None means the file could not be opened as audio at all.
    fn read(&self, url: &str) -> Option<RawTags>;
}

/// The values written back by `MetadataRecord::save`. Extended fields are only present when the
/// container supports them; an empty value removes the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWrite<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub comment: &'a str,
    pub genre: &'a str,
    pub year: i32,
    pub track: i32,
    pub extended: Vec<(ExtendedField, &'static str, String)>,
}

pub trait TagSink {
    /// Persists `tags` to `url`. Returns false if the file could not be written.
    fn write(&self, url: &str, container: ContainerKind, tags: &TagWrite<'_>) -> bool;
}
