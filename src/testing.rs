use crate::record::MetadataRecord;
use crate::stats::{Statistics, StatisticsStore};
use crate::tags::{AudioProperties, BasicTags, ContainerKind, ExtendedField, RawTags, TagSink, TagSource, TagWrite};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init() -> TempDir {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
    TempDir::new().expect("failed to create temp dir")
}

/// A statistics store that counts how often each statistic was asked for.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub stats: Option<Statistics>,
    pub score_calls: AtomicUsize,
    pub rating_calls: AtomicUsize,
    pub play_count_calls: AtomicUsize,
    pub last_played_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(stats: Statistics) -> Arc<Self> {
        Arc::new(CountingStore {
            stats: Some(stats),
            ..Default::default()
        })
    }

    /// A store that knows nothing about any track.
    pub fn empty() -> Arc<Self> {
        Arc::new(CountingStore::default())
    }

    pub fn calls(&self) -> [usize; 4] {
        [
            self.score_calls.load(Ordering::SeqCst),
            self.rating_calls.load(Ordering::SeqCst),
            self.play_count_calls.load(Ordering::SeqCst),
            self.last_played_calls.load(Ordering::SeqCst),
        ]
    }
}

impl StatisticsStore for CountingStore {
    fn score(&self, _url: &str) -> Option<i32> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.map(|s| s.score)
    }

    fn rating(&self, _url: &str) -> Option<i32> {
        self.rating_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.map(|s| s.rating)
    }

    fn play_count(&self, _url: &str) -> Option<i32> {
        self.play_count_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.map(|s| s.play_count)
    }

    fn last_played(&self, _url: &str) -> Option<i64> {
        self.last_played_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.map(|s| s.last_played)
    }
}

/// Tag source backed by a map. Locators in `unreadable` exist but cannot be read as audio.
#[derive(Debug, Default)]
pub struct MemoryTagSource {
    pub files: HashMap<String, RawTags>,
    pub unreadable: HashSet<String>,
}

impl MemoryTagSource {
    pub fn with(url: &str, raw: RawTags) -> Self {
        let mut source = MemoryTagSource::default();
        source.files.insert(url.to_string(), raw);
        source
    }
}

impl TagSource for MemoryTagSource {
    fn exists(&self, url: &str) -> bool {
        self.files.contains_key(url) || self.unreadable.contains(url)
    }

    fn read(&self, url: &str) -> Option<RawTags> {
        self.files.get(url).cloned()
    }
}

/// What a `RecordingTagSink` was asked to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub url: String,
    pub container: ContainerKind,
    pub title: String,
    pub artist: String,
    pub year: i32,
    pub track: i32,
    pub extended: Vec<(ExtendedField, &'static str, String)>,
}

#[derive(Debug)]
pub struct RecordingTagSink {
    pub succeed: bool,
    pub writes: Mutex<Vec<Written>>,
}

impl RecordingTagSink {
    pub fn new(succeed: bool) -> Self {
        RecordingTagSink {
            succeed,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<Written> {
        self.writes.lock().expect("poisoned").clone()
    }
}

impl TagSink for RecordingTagSink {
    fn write(&self, url: &str, container: ContainerKind, tags: &TagWrite<'_>) -> bool {
        self.writes.lock().expect("poisoned").push(Written {
            url: url.to_string(),
            container,
            title: tags.title.to_string(),
            artist: tags.artist.to_string(),
            year: tags.year,
            track: tags.track,
            extended: tags.extended.clone(),
        });
        self.succeed
    }
}

pub fn raw_tags(container: ContainerKind) -> RawTags {
    RawTags {
        container,
        tags: Some(BasicTags {
            title: " One More Time ".to_string(),
            artist: "Daft Punk".to_string(),
            album: "Discovery".to_string(),
            comment: String::new(),
            genre: "House".to_string(),
            year: 2001,
            track: 1,
        }),
        composer: Some("Thomas Bangalter".to_string()),
        disc: Some("1/2".to_string()),
        audio: Some(AudioProperties {
            bitrate: 320,
            length_sec: 320,
            sample_rate: 44100,
        }),
        filesize: Some(12_582_912),
    }
}

/// A fully populated record with no statistics store attached.
pub fn record() -> MetadataRecord {
    let mut record = MetadataRecord::new().with_url("file:///music/Daft%20Punk/01_one_more_time.mp3");
    record.set_title("One More Time");
    record.set_artist("Daft Punk");
    record.set_composer("Thomas Bangalter");
    record.set_album("Discovery");
    record.set_genre("House");
    record.set_comment("");
    record.set_year(2001);
    record.set_disc_number(1);
    record.set_track(1);
    record.set_length(320);
    record.set_bitrate(320);
    record.set_sample_rate(44100);
    record.set_filesize(12_582_912i64);
    record.set_file_type(ContainerKind::Mp3);
    record.set_score(80);
    record.set_rating(4);
    record.set_play_count(12);
    record.set_last_played(0i64);
    record
}
