/// The record module holds `MetadataRecord`, the in-memory metadata for one track.
///
/// A record normalizes whatever the tag source found (ID3v2 frames, Xiph comments, MP4 atoms) into
/// one flat set of fields, carries the play statistics from the collection database, and renders
/// every column both as exact text (for saved playlists) and as pretty text (for display and
/// searching).
///
/// Statistics are fetched lazily. Each of score, rating, play count and last-played starts out
/// `Undetermined`; the first read asks the `StatisticsStore` and caches the answer in a `Cell`, so a
/// shared `&MetadataRecord` can still populate its cache. Because of that the record is `Send` but
/// not `Sync`: one owner at a time.
use crate::column::Column;
use crate::field::{parse_exact, FieldValue};
use crate::format::{
    pretty_bitrate, pretty_filesize, pretty_length, pretty_rating, pretty_sample_rate, pretty_title_from_filename,
    verbose_time_since,
};
use crate::podcast::PodcastEpisode;
use crate::stats::StatisticsStore;
use crate::tags::{parse_position, supports_extended_field, ContainerKind, ExtendedField, TagSink, TagSource, TagWrite};
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const STREAM_SCHEMES: &[&str] = &["http://", "https://", "mms://", "rtsp://"];

#[derive(Clone)]
pub struct MetadataRecord {
    url: String,

    title: String,
    artist: String,
    composer: String,
    album: String,
    comment: String,
    genre: String,

    stream_name: String,
    stream_url: String,

    year: FieldValue<i32>,
    disc_number: FieldValue<i32>,
    track: FieldValue<i32>,
    bitrate: FieldValue<i32>,
    length: FieldValue<i32>,
    sample_rate: FieldValue<i32>,
    filesize: FieldValue<i64>,

    score: Cell<FieldValue<i32>>,
    rating: Cell<FieldValue<i32>>,
    play_count: Cell<FieldValue<i32>>,
    last_played: Cell<FieldValue<i64>>,

    file_type: ContainerKind,
    exists: bool,
    valid_media: bool,

    podcast: Option<Box<PodcastEpisode>>,
    store: Option<Arc<dyn StatisticsStore>>,
}

impl Default for MetadataRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataRecord {
    /// An empty record: every optional field undetermined, no locator, no statistics store.
    pub fn new() -> Self {
        MetadataRecord {
            url: String::new(),
            title: String::new(),
            artist: String::new(),
            composer: String::new(),
            album: String::new(),
            comment: String::new(),
            genre: String::new(),
            stream_name: String::new(),
            stream_url: String::new(),
            year: FieldValue::Undetermined,
            disc_number: FieldValue::Undetermined,
            track: FieldValue::Undetermined,
            bitrate: FieldValue::Undetermined,
            length: FieldValue::Undetermined,
            sample_rate: FieldValue::Undetermined,
            filesize: FieldValue::Undetermined,
            score: Cell::new(FieldValue::Undetermined),
            rating: Cell::new(FieldValue::Undetermined),
            play_count: Cell::new(FieldValue::Undetermined),
            last_played: Cell::new(FieldValue::Undetermined),
            file_type: ContainerKind::Other,
            exists: true,
            valid_media: true,
            podcast: None,
            store: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_statistics_store(mut self, store: Arc<dyn StatisticsStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds a record for `url` from the tag source. Statistics stay undetermined and are looked up
    /// in `store` when first read.
    pub fn load(url: impl Into<String>, source: &dyn TagSource, store: Option<Arc<dyn StatisticsStore>>) -> Self {
        let mut record = MetadataRecord::new();
        record.url = url.into();
        record.store = store;
        record.valid_media = false;
        record.exists = source.exists(&record.url);

        if record.exists {
            record.read_tags(source);
        } else {
            debug!("Source {} does not exist, marking audio properties and statistics unavailable", record.url);
            record.bitrate = FieldValue::Unavailable;
            record.length = FieldValue::Unavailable;
            record.sample_rate = FieldValue::Unavailable;
            record.mark_statistics_unavailable();
        }
        record
    }

    /// A record for an internet radio stream. Stations usually advertise `Artist - Title` as the
    /// current title; otherwise the station name stands in for the artist.
    pub fn from_stream(
        title: &str,
        stream_url: impl Into<String>,
        bitrate: i32,
        genre: impl Into<String>,
        stream_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let mut record = MetadataRecord::new();
        record.url = url.into();
        record.genre = genre.into();
        record.stream_name = stream_name.into();
        record.stream_url = stream_url.into();
        record.year = FieldValue::Value(0);
        record.disc_number = FieldValue::Value(0);
        record.track = FieldValue::Value(0);
        record.bitrate = FieldValue::Value(bitrate);
        record.length = FieldValue::Irrelevant;
        record.sample_rate = FieldValue::Unavailable;

        if title.contains('-') {
            let mut sections = title.split('-');
            record.artist = sections.next().unwrap_or_default().trim().to_string();
            record.title = sections.next().unwrap_or_default().trim().to_string();
        } else {
            record.title = title.to_string();
            record.artist = record.stream_name.clone();
        }
        record
    }

    fn read_tags(&mut self, source: &dyn TagSource) {
        let Some(raw) = source.read(&self.url) else {
            warn!("Could not read tags from {}", self.url);
            return;
        };
        self.file_type = raw.container;

        if let Some(tags) = raw.tags {
            self.title = tags.title.trim().to_string();
            self.artist = tags.artist.trim().to_string();
            self.album = tags.album.trim().to_string();
            self.comment = tags.comment.trim().to_string();
            self.genre = tags.genre.trim().to_string();
            self.year = FieldValue::Value(tags.year);
            self.track = FieldValue::Value(tags.track);
            self.valid_media = true;
            self.filesize = FieldValue::resolved(raw.filesize);
        }

        if supports_extended_field(raw.container, ExtendedField::Composer) {
            if let Some(composer) = raw.composer {
                self.composer = composer.trim().to_string();
            }
        }
        if supports_extended_field(raw.container, ExtendedField::DiscNumber) {
            if let Some(disc) = raw.disc.filter(|d| !d.trim().is_empty()) {
                self.disc_number = FieldValue::Value(parse_position(&disc));
            }
        }

        if let Some(audio) = raw.audio {
            self.bitrate = FieldValue::Value(audio.bitrate);
            self.length = FieldValue::Value(audio.length_sec);
            self.sample_rate = FieldValue::Value(audio.sample_rate);
        }
        debug!("Read tags from {} (container={:?}, valid_media={})", self.url, self.file_type, self.valid_media);
    }

    fn mark_statistics_unavailable(&mut self) {
        self.score.set(FieldValue::Unavailable);
        self.rating.set(FieldValue::Unavailable);
        self.play_count.set(FieldValue::Unavailable);
        self.last_played.set(FieldValue::Unavailable);
    }

    /// Resets every field, cached statistics included, to a fresh record. The statistics store stays
    /// attached, so the next read of each statistic queries it again.
    pub fn clear(&mut self) {
        let store = self.store.take();
        *self = MetadataRecord::new();
        self.store = store;
    }

    /// Re-checks whether the source is reachable. Streams always are.
    pub fn check_exists(&mut self, source: &dyn TagSource) -> bool {
        self.exists = self.is_stream() || source.exists(&self.url);
        if !self.exists {
            self.mark_statistics_unavailable();
        }
        self.exists
    }

    /// Copies tag content, statistics, file type, size and podcast details from `other`. The locator
    /// and the existence flags are left alone.
    pub fn copy_from(&mut self, other: &MetadataRecord) {
        self.set_title(other.title());
        self.set_artist(other.artist());
        self.set_composer(other.composer());
        self.set_album(other.album());
        self.year = other.year;
        self.disc_number = other.disc_number;
        self.set_comment(other.comment());
        self.set_genre(other.genre());
        self.track = other.track;
        self.length = other.length;
        self.bitrate = other.bitrate;
        self.sample_rate = other.sample_rate;
        self.score.set(other.score());
        self.rating.set(other.rating());
        self.play_count.set(other.play_count());
        self.last_played.set(other.last_played());
        self.file_type = other.file_type;
        self.filesize = other.filesize;
        self.podcast = other.podcast.clone();
    }

    fn resolve_statistic<T: Copy>(
        &self,
        cell: &Cell<FieldValue<T>>,
        column: Column,
        lookup: impl FnOnce(&dyn StatisticsStore, &str) -> Option<T>,
    ) -> FieldValue<T> {
        let current = cell.get();
        if !current.is_undetermined() {
            return current;
        }
        let resolved = match &self.store {
            Some(store) => {
                debug!("Looking up {} for {}", column, self.url);
                FieldValue::resolved(lookup(store.as_ref(), &self.url))
            }
            None => FieldValue::Unavailable,
        };
        cell.set(resolved);
        resolved
    }

    pub fn score(&self) -> FieldValue<i32> {
        self.resolve_statistic(&self.score, Column::Score, |s, url| s.score(url))
    }

    pub fn rating(&self) -> FieldValue<i32> {
        self.resolve_statistic(&self.rating, Column::Rating, |s, url| s.rating(url))
    }

    pub fn play_count(&self) -> FieldValue<i32> {
        self.resolve_statistic(&self.play_count, Column::PlayCount, |s, url| s.play_count(url))
    }

    /// Seconds since the epoch.
    pub fn last_played(&self) -> FieldValue<i64> {
        self.resolve_statistic(&self.last_played, Column::LastPlayed, |s, url| s.last_played(url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn year(&self) -> FieldValue<i32> {
        self.year
    }

    pub fn disc_number(&self) -> FieldValue<i32> {
        self.disc_number
    }

    pub fn track(&self) -> FieldValue<i32> {
        self.track
    }

    pub fn bitrate(&self) -> FieldValue<i32> {
        self.bitrate
    }

    /// Length in seconds.
    pub fn length(&self) -> FieldValue<i32> {
        self.length
    }

    pub fn sample_rate(&self) -> FieldValue<i32> {
        self.sample_rate
    }

    /// Size in bytes.
    pub fn filesize(&self) -> FieldValue<i64> {
        self.filesize
    }

    pub fn file_type(&self) -> ContainerKind {
        self.file_type
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_valid_media(&self) -> bool {
        self.valid_media
    }

    pub fn is_stream(&self) -> bool {
        !self.stream_url.is_empty() || STREAM_SCHEMES.iter().any(|s| self.url.starts_with(s))
    }

    pub fn has_extended_meta_information(&self) -> bool {
        self.file_type.has_extended_fields()
    }

    pub fn podcast_episode(&self) -> Option<&PodcastEpisode> {
        self.podcast.as_deref()
    }

    pub fn set_podcast_episode(&mut self, episode: Option<PodcastEpisode>) {
        self.podcast = episode.map(Box::new);
    }

    /// The decoded path component of the locator.
    pub fn path(&self) -> String {
        let path = match self.url.split_once("://") {
            Some(("file", rest)) => rest,
            Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
            None => self.url.as_str(),
        };
        match urlencoding::decode(path) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => path.to_string(),
        }
    }

    pub fn filename(&self) -> String {
        let path = self.path();
        path.rsplit('/').next().unwrap_or_default().to_string()
    }

    pub fn directory(&self) -> String {
        let path = self.path();
        match path.rfind('/') {
            Some(0) => "/".to_string(),
            Some(i) => path[..i].to_string(),
            None => String::new(),
        }
    }

    /// Short description of the file type: the lowercased extension, or "Stream".
    pub fn type_text(&self) -> String {
        if self.is_stream() {
            return "Stream".to_string();
        }
        let filename = self.filename();
        match filename.rfind('.') {
            Some(i) => filename[i + 1..].to_lowercase(),
            None => String::new(),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.artist = artist.into();
    }

    pub fn set_composer(&mut self, composer: impl Into<String>) {
        self.composer = composer.into();
    }

    pub fn set_album(&mut self, album: impl Into<String>) {
        self.album = album.into();
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
    }

    pub fn set_year(&mut self, year: impl Into<FieldValue<i32>>) {
        assign(&mut self.year, year.into(), Column::Year);
    }

    pub fn set_disc_number(&mut self, disc: impl Into<FieldValue<i32>>) {
        assign(&mut self.disc_number, disc.into(), Column::DiscNumber);
    }

    pub fn set_track(&mut self, track: impl Into<FieldValue<i32>>) {
        assign(&mut self.track, track.into(), Column::Track);
    }

    pub fn set_bitrate(&mut self, bitrate: impl Into<FieldValue<i32>>) {
        assign(&mut self.bitrate, bitrate.into(), Column::Bitrate);
    }

    pub fn set_length(&mut self, length: impl Into<FieldValue<i32>>) {
        assign(&mut self.length, length.into(), Column::Length);
    }

    pub fn set_sample_rate(&mut self, sample_rate: impl Into<FieldValue<i32>>) {
        assign(&mut self.sample_rate, sample_rate.into(), Column::SampleRate);
    }

    pub fn set_filesize(&mut self, filesize: impl Into<FieldValue<i64>>) {
        assign(&mut self.filesize, filesize.into(), Column::Filesize);
    }

    pub fn set_score(&mut self, score: impl Into<FieldValue<i32>>) {
        assign(self.score.get_mut(), score.into(), Column::Score);
    }

    pub fn set_rating(&mut self, rating: impl Into<FieldValue<i32>>) {
        assign(self.rating.get_mut(), rating.into(), Column::Rating);
    }

    pub fn set_play_count(&mut self, play_count: impl Into<FieldValue<i32>>) {
        assign(self.play_count.get_mut(), play_count.into(), Column::PlayCount);
    }

    pub fn set_last_played(&mut self, last_played: impl Into<FieldValue<i64>>) {
        assign(self.last_played.get_mut(), last_played.into(), Column::LastPlayed);
    }

    pub fn set_file_type(&mut self, file_type: ContainerKind) {
        self.file_type = file_type;
    }

    /// Machine-readable value of `column`, as stored in playlists. Numbers are bare integers and
    /// absent numbers are empty. Mood has no raw form and is always empty.
    pub fn exact_text(&self, column: Column) -> String {
        match column {
            Column::Filename => self.filename(),
            Column::Title => self.title.clone(),
            Column::Artist => self.artist.clone(),
            Column::Composer => self.composer.clone(),
            Column::Year => self.year.exact_text(),
            Column::Album => self.album.clone(),
            Column::DiscNumber => self.disc_number.exact_text(),
            Column::Track => self.track.exact_text(),
            Column::Genre => self.genre.clone(),
            Column::Comment => self.comment.clone(),
            Column::Directory => self.directory(),
            Column::Type => self.file_type.code().to_string(),
            Column::Length => self.length.exact_text(),
            Column::Bitrate => self.bitrate.exact_text(),
            Column::SampleRate => self.sample_rate.exact_text(),
            Column::Score => self.score().exact_text(),
            Column::Rating => self.rating().exact_text(),
            Column::PlayCount => self.play_count().exact_text(),
            Column::LastPlayed => self.last_played().exact_text(),
            Column::Filesize => self.filesize.exact_text(),
            Column::Mood => String::new(),
        }
    }

    /// Parses `text` into the column's native type and stores it. Numbers that fail to parse are
    /// stored as zero. Derived columns cannot be assigned and are left untouched.
    pub fn set_exact_text(&mut self, column: Column, text: &str) {
        match column {
            Column::Title => self.set_title(text),
            Column::Artist => self.set_artist(text),
            Column::Composer => self.set_composer(text),
            Column::Year => self.set_year(parse_exact::<i32>(text)),
            Column::Album => self.set_album(text),
            Column::DiscNumber => self.set_disc_number(parse_exact::<i32>(text)),
            Column::Track => self.set_track(parse_exact::<i32>(text)),
            Column::Genre => self.set_genre(text),
            Column::Comment => self.set_comment(text),
            Column::Length => self.set_length(parse_exact::<i32>(text)),
            Column::Bitrate => self.set_bitrate(parse_exact::<i32>(text)),
            Column::SampleRate => self.set_sample_rate(parse_exact::<i32>(text)),
            Column::Score => self.set_score(parse_exact::<i32>(text)),
            Column::Rating => self.set_rating(parse_exact::<i32>(text)),
            Column::PlayCount => self.set_play_count(parse_exact::<i32>(text)),
            Column::LastPlayed => self.set_last_played(parse_exact::<i64>(text)),
            Column::Filesize => self.set_filesize(parse_exact::<i64>(text)),
            Column::Filename | Column::Directory | Column::Type | Column::Mood => {
                warn!("Tried to set the text of read-only column {}", column);
            }
        }
    }

    /// Human-readable value of `column`, never with surrounding whitespace.
    pub fn pretty_text(&self, column: Column) -> String {
        self.pretty_text_at(column, Utc::now())
    }

    /// `pretty_text`, with relative times computed against `now`.
    pub fn pretty_text_at(&self, column: Column, now: DateTime<Utc>) -> String {
        let text = match column {
            Column::Filename => {
                if self.is_stream() {
                    self.url.clone()
                } else {
                    self.filename()
                }
            }
            Column::Title => {
                if self.title.is_empty() {
                    pretty_title_from_filename(&self.filename())
                } else {
                    self.title.clone()
                }
            }
            Column::Artist => self.artist.clone(),
            Column::Composer => self.composer.clone(),
            Column::Year => nonzero_text(self.year),
            Column::Album => self.album.clone(),
            Column::DiscNumber => nonzero_text(self.disc_number),
            Column::Track => nonzero_text(self.track),
            Column::Genre => self.genre.clone(),
            Column::Comment => self.comment.clone(),
            Column::Directory => {
                if self.url.is_empty() {
                    String::new()
                } else {
                    self.directory()
                }
            }
            Column::Type => {
                if self.url.is_empty() {
                    String::new()
                } else {
                    self.type_text()
                }
            }
            Column::Length => pretty_length(self.length, true),
            Column::Bitrate => pretty_bitrate(self.bitrate),
            Column::SampleRate => pretty_sample_rate(self.sample_rate),
            Column::Score => self.score().exact_text(),
            Column::Rating => pretty_rating(self.rating().value_or_default()).to_string(),
            Column::PlayCount => self.play_count().exact_text(),
            Column::LastPlayed => verbose_time_since(self.last_played().value_or_default(), now),
            Column::Filesize => self.filesize.value().map(pretty_filesize).unwrap_or_default(),
            Column::Mood => String::new(),
        };
        text.trim().to_string()
    }

    /// `Artist - Title` when there is an artist, else the title, else a title made from the file
    /// name. Streams have no artist but a good title, so the title alone must survive here.
    pub fn pretty_title(&self) -> String {
        let s = if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.artist, self.title)
        };
        if s.is_empty() {
            pretty_title_from_filename(&self.filename())
        } else {
            s
        }
    }

    /// `Title by Artist`, falling back to the title and then the file name.
    pub fn very_nice_title(&self) -> String {
        if self.title.is_empty() {
            return pretty_title_from_filename(&self.filename());
        }
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} by {}", self.title, self.artist)
        }
    }

    /// Writes the tag fields back through `sink`. Composer and disc number are only written when the
    /// container can hold them; an empty value removes them.
    pub fn save(&self, sink: &dyn TagSink) -> bool {
        let disc = match self.disc_number.value() {
            Some(n) if n != 0 => n.to_string(),
            _ => String::new(),
        };
        let extended = [(ExtendedField::Composer, self.composer.clone()), (ExtendedField::DiscNumber, disc)]
            .into_iter()
            .filter_map(|(field, value)| self.file_type.extended_field_key(field).map(|key| (field, key, value)))
            .collect();

        let tags = TagWrite {
            title: &self.title,
            artist: &self.artist,
            album: &self.album,
            comment: &self.comment,
            genre: &self.genre,
            year: self.year.value_or_default(),
            track: self.track.value_or_default(),
            extended,
        };

        let saved = sink.write(&self.url, self.file_type, &tags);
        if !saved {
            warn!("Failed to save tags to {}", self.url);
        }
        saved
    }
}

fn assign<T: Copy>(field: &mut FieldValue<T>, next: FieldValue<T>, column: Column) {
    if !field.transition(next) {
        warn!("Refusing to reset resolved {} back to undetermined", column);
    }
}

fn nonzero_text(value: FieldValue<i32>) -> String {
    match value {
        FieldValue::Value(n) if n != 0 => n.to_string(),
        _ => String::new(),
    }
}

/// Records are equal when their tag content and audio properties are. Statistics, the locator and
/// the existence flags are not compared.
impl PartialEq for MetadataRecord {
    fn eq(&self, other: &Self) -> bool {
        self.artist == other.artist
            && self.title == other.title
            && self.composer == other.composer
            && self.album == other.album
            && self.year == other.year
            && self.comment == other.comment
            && self.genre == other.genre
            && self.track == other.track
            && self.disc_number == other.disc_number
            && self.length == other.length
            && self.bitrate == other.bitrate
            && self.sample_rate == other.sample_rate
    }
}

impl fmt::Debug for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRecord")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("artist", &self.artist)
            .field("composer", &self.composer)
            .field("album", &self.album)
            .field("comment", &self.comment)
            .field("genre", &self.genre)
            .field("year", &self.year)
            .field("disc_number", &self.disc_number)
            .field("track", &self.track)
            .field("bitrate", &self.bitrate)
            .field("length", &self.length)
            .field("sample_rate", &self.sample_rate)
            .field("filesize", &self.filesize)
            .field("score", &self.score.get())
            .field("rating", &self.rating.get())
            .field("play_count", &self.play_count.get())
            .field("last_played", &self.last_played.get())
            .field("file_type", &self.file_type)
            .field("exists", &self.exists)
            .field("valid_media", &self.valid_media)
            .field("podcast", &self.podcast)
            .finish_non_exhaustive()
    }
}
