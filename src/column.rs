/// The column module enumerates the metadata fields a record exposes. Each column has an exact
/// name, which is stable and used as the key in persisted playlists, and a pretty name for display.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Filename,
    Title,
    Artist,
    Composer,
    Year,
    Album,
    DiscNumber,
    Track,
    Genre,
    Comment,
    Directory,
    Type,
    Length,
    Bitrate,
    SampleRate,
    Score,
    Rating,
    PlayCount,
    LastPlayed,
    Filesize,
    Mood,
}

/// How a column's value compares in a field-scoped search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    Duration,
}

impl Column {
    pub const ALL: [Column; 21] = [
        Column::Filename,
        Column::Title,
        Column::Artist,
        Column::Composer,
        Column::Year,
        Column::Album,
        Column::DiscNumber,
        Column::Track,
        Column::Genre,
        Column::Comment,
        Column::Directory,
        Column::Type,
        Column::Length,
        Column::Bitrate,
        Column::SampleRate,
        Column::Score,
        Column::Rating,
        Column::PlayCount,
        Column::LastPlayed,
        Column::Filesize,
        Column::Mood,
    ];

    /// Untranslated name used as the element name in saved playlists. Never change these.
    pub fn exact_name(&self) -> &'static str {
        match self {
            Column::Filename => "Filename",
            Column::Title => "Title",
            Column::Artist => "Artist",
            Column::Composer => "Composer",
            Column::Year => "Year",
            Column::Album => "Album",
            Column::DiscNumber => "DiscNumber",
            Column::Track => "Track",
            Column::Genre => "Genre",
            Column::Comment => "Comment",
            Column::Directory => "Directory",
            Column::Type => "Type",
            Column::Length => "Length",
            Column::Bitrate => "Bitrate",
            Column::SampleRate => "SampleRate",
            Column::Score => "Score",
            Column::Rating => "Rating",
            Column::PlayCount => "PlayCount",
            Column::LastPlayed => "LastPlayed",
            Column::Filesize => "Filesize",
            Column::Mood => "Mood",
        }
    }

    pub fn pretty_name(&self) -> &'static str {
        match self {
            Column::Filename => "Filename",
            Column::Title => "Title",
            Column::Artist => "Artist",
            Column::Composer => "Composer",
            Column::Year => "Year",
            Column::Album => "Album",
            Column::DiscNumber => "Disc Number",
            Column::Track => "Track",
            Column::Genre => "Genre",
            Column::Comment => "Comment",
            Column::Directory => "Directory",
            Column::Type => "Type",
            Column::Length => "Length",
            Column::Bitrate => "Bitrate",
            Column::SampleRate => "Sample Rate",
            Column::Score => "Score",
            Column::Rating => "Rating",
            Column::PlayCount => "Play Count",
            Column::LastPlayed => "Last Played",
            Column::Filesize => "File Size",
            Column::Mood => "Mood",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Year
            | Column::DiscNumber
            | Column::Track
            | Column::Bitrate
            | Column::SampleRate
            | Column::Score
            | Column::Rating
            | Column::PlayCount
            | Column::LastPlayed
            | Column::Filesize => ColumnKind::Numeric,
            Column::Length => ColumnKind::Duration,
            _ => ColumnKind::Text,
        }
    }

    /// Whether `MetadataRecord::set_exact_text` accepts this column. Derived columns are read-only.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Column::Filename | Column::Directory | Column::Type | Column::Mood)
    }

    /// Case-insensitive lookup by exact name.
    pub fn from_exact_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.exact_name().eq_ignore_ascii_case(name))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.exact_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown column: {0}")]
pub struct UnknownColumnError(pub String);

impl FromStr for Column {
    type Err = UnknownColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::from_exact_name(s).ok_or_else(|| UnknownColumnError(s.to_string()))
    }
}
