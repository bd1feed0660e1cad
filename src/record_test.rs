use crate::column::Column;
use crate::field::FieldValue;
use crate::podcast::PodcastEpisode;
use crate::record::*;
use crate::stats::{Statistics, StatisticsStore};
use crate::tags::{ContainerKind, ExtendedField, RawTags};
use crate::testing::{self, CountingStore, MemoryTagSource, RecordingTagSink};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

const URL: &str = "file:///music/Daft%20Punk/01_one_more_time.mp3";

fn stats() -> Statistics {
    Statistics {
        score: 75,
        rating: 3,
        play_count: 9,
        last_played: 1_600_000_000,
    }
}

#[test]
fn test_pretty_title() {
    let _ = testing::init();
    let mut r = MetadataRecord::new();
    r.set_artist("Daft Punk");
    r.set_title("One More Time");
    assert_eq!(r.pretty_title(), "Daft Punk - One More Time");
    assert_eq!(r.very_nice_title(), "One More Time by Daft Punk");

    let r = MetadataRecord::new().with_url("file:///music/my_song.mp3");
    assert_eq!(r.pretty_title(), "my song");
    assert_eq!(r.very_nice_title(), "my song");

    let mut r = MetadataRecord::new().with_url("file:///music/my_song.mp3");
    r.set_title("Only A Title");
    assert_eq!(r.pretty_title(), "Only A Title");
    assert_eq!(r.very_nice_title(), "Only A Title");
}

#[test]
fn test_statistics_fetched_once() {
    let _ = testing::init();
    let store = CountingStore::new(stats());
    let r = MetadataRecord::new().with_url(URL).with_statistics_store(store.clone());

    assert_eq!(store.calls(), [0, 0, 0, 0]);
    assert_eq!(r.rating(), FieldValue::Value(3));
    assert_eq!(r.rating(), FieldValue::Value(3));
    assert_eq!(store.calls(), [0, 1, 0, 0]);

    assert_eq!(r.score(), FieldValue::Value(75));
    assert_eq!(r.play_count(), FieldValue::Value(9));
    assert_eq!(r.last_played(), FieldValue::Value(1_600_000_000));
    assert_eq!(r.exact_text(Column::Score), "75");
    assert_eq!(r.pretty_text(Column::PlayCount), "9");
    assert_eq!(store.calls(), [1, 1, 1, 1]);
}

#[test]
fn test_clear_refetches_statistics() {
    let _ = testing::init();
    let store = CountingStore::new(stats());
    let mut r = MetadataRecord::new().with_url(URL).with_statistics_store(store.clone());
    r.set_title("Something");
    let _ = (r.score(), r.rating(), r.play_count(), r.last_played());
    assert_eq!(store.calls(), [1, 1, 1, 1]);

    r.clear();
    assert_eq!(r.title(), "");
    assert_eq!(r.url(), "");
    assert_eq!(r.year(), FieldValue::Undetermined);

    let _ = (r.score(), r.rating(), r.play_count(), r.last_played());
    let _ = (r.score(), r.rating(), r.play_count(), r.last_played());
    assert_eq!(store.calls(), [2, 2, 2, 2]);
}

#[test]
fn test_statistics_without_store() {
    let _ = testing::init();
    let r = MetadataRecord::new().with_url(URL);
    assert_eq!(r.score(), FieldValue::Unavailable);
    assert_eq!(r.exact_text(Column::Rating), "");
    assert_eq!(r.pretty_text(Column::Rating), "Not rated");
    assert_eq!(r.pretty_text(Column::LastPlayed), "Never");
    assert_eq!(r.pretty_text(Column::Score), "");
}

#[test]
fn test_statistics_unknown_to_store() {
    let _ = testing::init();
    let store = CountingStore::empty();
    let r = MetadataRecord::new().with_url(URL).with_statistics_store(store.clone());
    assert_eq!(r.play_count(), FieldValue::Unavailable);
    assert_eq!(r.play_count(), FieldValue::Unavailable);
    assert_eq!(store.calls(), [0, 0, 1, 0]);
}

#[test]
fn test_load() {
    let _ = testing::init();
    let source = MemoryTagSource::with(URL, testing::raw_tags(ContainerKind::Mp3));
    let store = CountingStore::new(stats());
    let r = MetadataRecord::load(URL, &source, Some(store.clone() as Arc<dyn StatisticsStore>));

    assert!(r.exists());
    assert!(r.is_valid_media());
    assert_eq!(r.title(), "One More Time");
    assert_eq!(r.artist(), "Daft Punk");
    assert_eq!(r.composer(), "Thomas Bangalter");
    assert_eq!(r.disc_number(), FieldValue::Value(1));
    assert_eq!(r.year(), FieldValue::Value(2001));
    assert_eq!(r.length(), FieldValue::Value(320));
    assert_eq!(r.sample_rate(), FieldValue::Value(44100));
    assert_eq!(r.filesize(), FieldValue::Value(12_582_912));
    assert_eq!(r.file_type(), ContainerKind::Mp3);
    assert!(r.has_extended_meta_information());
    assert_eq!(store.calls(), [0, 0, 0, 0]);
    assert_eq!(r.score(), FieldValue::Value(75));
}

#[test]
fn test_load_without_extended_fields() {
    let _ = testing::init();
    let source = MemoryTagSource::with(URL, testing::raw_tags(ContainerKind::Other));
    let r = MetadataRecord::load(URL, &source, None);
    assert!(r.is_valid_media());
    assert_eq!(r.composer(), "");
    assert_eq!(r.disc_number(), FieldValue::Undetermined);
    assert!(!r.has_extended_meta_information());
}

#[test]
fn test_load_missing_source() {
    let _ = testing::init();
    let source = MemoryTagSource::default();
    let store = CountingStore::new(stats());
    let r = MetadataRecord::load(URL, &source, Some(store.clone() as Arc<dyn StatisticsStore>));

    assert!(!r.exists());
    assert!(!r.is_valid_media());
    assert_eq!(r.bitrate(), FieldValue::Unavailable);
    assert_eq!(r.length(), FieldValue::Unavailable);
    assert_eq!(r.sample_rate(), FieldValue::Unavailable);
    assert_eq!(r.score(), FieldValue::Unavailable);
    assert_eq!(r.rating(), FieldValue::Unavailable);
    assert_eq!(r.play_count(), FieldValue::Unavailable);
    assert_eq!(r.last_played(), FieldValue::Unavailable);
    assert_eq!(store.calls(), [0, 0, 0, 0]);
}

#[test]
fn test_load_unreadable_source() {
    let _ = testing::init();
    let mut source = MemoryTagSource::default();
    source.unreadable.insert(URL.to_string());
    let r = MetadataRecord::load(URL, &source, None);
    assert!(r.exists());
    assert!(!r.is_valid_media());
    assert_eq!(r.title(), "");
    assert_eq!(r.bitrate(), FieldValue::Undetermined);

    let raw = RawTags {
        container: ContainerKind::Flac,
        ..Default::default()
    };
    let source = MemoryTagSource::with(URL, raw);
    let r = MetadataRecord::load(URL, &source, None);
    assert!(!r.is_valid_media());
    assert_eq!(r.file_type(), ContainerKind::Flac);
}

#[test]
fn test_from_stream() {
    let _ = testing::init();
    let r = MetadataRecord::from_stream(
        "Daft Punk - Aerodynamic",
        "http://radio.example.com/live",
        128,
        "Electronic",
        "Radio Example",
        "http://radio.example.com/live.pls",
    );
    assert!(r.is_stream());
    assert_eq!(r.artist(), "Daft Punk");
    assert_eq!(r.title(), "Aerodynamic");
    assert_eq!(r.stream_name(), "Radio Example");
    assert_eq!(r.length(), FieldValue::Irrelevant);
    assert_eq!(r.sample_rate(), FieldValue::Unavailable);
    assert_eq!(r.year(), FieldValue::Value(0));
    assert_eq!(r.pretty_text(Column::Length), "-");
    assert_eq!(r.pretty_text(Column::Bitrate), "128");
    assert_eq!(r.pretty_text(Column::Year), "");
    assert_eq!(r.pretty_text(Column::Type), "Stream");

    let r = MetadataRecord::from_stream("Top of the hour news", "mms://radio.example.com/live", 64, "", "Radio Example", "");
    assert_eq!(r.title(), "Top of the hour news");
    assert_eq!(r.artist(), "Radio Example");
    assert_eq!(r.pretty_title(), "Radio Example - Top of the hour news");
}

#[test]
fn test_check_exists() {
    let _ = testing::init();
    let source = MemoryTagSource::default();
    let mut r = MetadataRecord::new().with_url(URL);
    assert!(!r.check_exists(&source));
    assert!(!r.exists());

    let mut r = MetadataRecord::new().with_url("http://radio.example.com/live");
    assert!(r.check_exists(&source));
}

#[test]
fn test_check_exists_missing_source_makes_statistics_unavailable() {
    let _ = testing::init();
    let store = CountingStore::new(stats());
    let mut r = MetadataRecord::new()
        .with_url(URL)
        .with_statistics_store(store.clone());
    assert!(!r.check_exists(&MemoryTagSource::default()));
    assert_eq!(r.score(), FieldValue::Unavailable);
    assert_eq!(r.rating(), FieldValue::Unavailable);
    assert_eq!(r.play_count(), FieldValue::Unavailable);
    assert_eq!(r.last_played(), FieldValue::Unavailable);
    assert_eq!(store.calls(), [0, 0, 0, 0]);
}

#[test]
fn test_exact_text_round_trip() {
    let _ = testing::init();
    let mut r = MetadataRecord::new();
    for column in Column::ALL.into_iter().filter(|c| c.is_writable()) {
        let text = match column.kind() {
            crate::column::ColumnKind::Text => "Some Text: with spaces ",
            _ => "-42",
        };
        r.set_exact_text(column, text);
        assert_eq!(r.exact_text(column), text, "column {column}");
    }
}

#[test]
fn test_set_exact_text_parse_failure_is_zero() {
    let _ = testing::init();
    let mut r = MetadataRecord::new();
    r.set_exact_text(Column::Year, "nineteen");
    assert_eq!(r.year(), FieldValue::Value(0));
    r.set_exact_text(Column::Filesize, " 2048 ");
    assert_eq!(r.filesize(), FieldValue::Value(2048));
}

#[test]
fn test_set_exact_text_read_only() {
    let _ = testing::init();
    let mut r = testing::record();
    let before = r.clone();
    for column in [Column::Filename, Column::Directory, Column::Type, Column::Mood] {
        r.set_exact_text(column, "7");
    }
    assert_eq!(r, before);
    assert_eq!(r.url(), before.url());
    assert_eq!(r.file_type(), ContainerKind::Mp3);
}

#[test]
fn test_exact_text() {
    let _ = testing::init();
    let r = testing::record();
    assert_eq!(r.exact_text(Column::Filename), "01_one_more_time.mp3");
    assert_eq!(r.exact_text(Column::Directory), "/music/Daft Punk");
    assert_eq!(r.exact_text(Column::Type), "1");
    assert_eq!(r.exact_text(Column::Length), "320");
    assert_eq!(r.exact_text(Column::Filesize), "12582912");
    assert_eq!(r.exact_text(Column::LastPlayed), "0");
    assert_eq!(r.exact_text(Column::Mood), "");
    assert_eq!(MetadataRecord::new().exact_text(Column::Year), "");
}

#[test]
fn test_pretty_text() {
    let _ = testing::init();
    let r = testing::record();
    assert_eq!(r.pretty_text(Column::Title), "One More Time");
    assert_eq!(r.pretty_text(Column::Year), "2001");
    assert_eq!(r.pretty_text(Column::Length), "5:20");
    assert_eq!(r.pretty_text(Column::SampleRate), "44100 Hz");
    assert_eq!(r.pretty_text(Column::Filesize), "12.0 MB");
    assert_eq!(r.pretty_text(Column::Rating), "4 - Excellent");
    assert_eq!(r.pretty_text(Column::Score), "80");
    assert_eq!(r.pretty_text(Column::LastPlayed), "Never");
    assert_eq!(r.pretty_text(Column::Type), "mp3");
    assert_eq!(r.pretty_text(Column::Directory), "/music/Daft Punk");
    assert_eq!(r.pretty_text(Column::Mood), "");

    let empty = MetadataRecord::new();
    assert_eq!(empty.pretty_text(Column::Length), "?");
    assert_eq!(empty.pretty_text(Column::Year), "");
    assert_eq!(empty.pretty_text(Column::Directory), "");
    assert_eq!(empty.pretty_text(Column::Type), "");
}

#[test]
fn test_pretty_text_is_trimmed() {
    let _ = testing::init();
    let mut r = testing::record();
    r.set_title("  padded  ");
    r.set_comment("\tcomment\n");
    assert_eq!(r.pretty_text(Column::Title), "padded");
    assert_eq!(r.pretty_text(Column::Comment), "comment");
    assert_eq!(r.exact_text(Column::Title), "  padded  ");
}

#[test]
fn test_pretty_last_played() {
    let _ = testing::init();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let mut r = testing::record();
    r.set_last_played(now.timestamp() - 3 * 60 * 60);
    assert_eq!(r.pretty_text_at(Column::LastPlayed, now), "3 hours ago");
}

#[test]
fn test_resolved_field_never_reverts() {
    let _ = testing::init();
    let mut r = testing::record();
    r.set_year(FieldValue::<i32>::Undetermined);
    assert_eq!(r.year(), FieldValue::Value(2001));
    r.set_rating(FieldValue::<i32>::Undetermined);
    assert_eq!(r.rating(), FieldValue::Value(4));
    r.set_year(FieldValue::<i32>::Unavailable);
    assert_eq!(r.year(), FieldValue::Unavailable);
}

#[test]
fn test_copy_from() {
    let _ = testing::init();
    let mut source = testing::record();
    source.set_podcast_episode(Some(PodcastEpisode {
        url: "http://feeds.example.com/ep1.mp3".to_string(),
        title: "Episode 1".to_string(),
        ..Default::default()
    }));

    let mut r = MetadataRecord::new().with_url("file:///other.ogg");
    r.copy_from(&source);
    assert_eq!(r, source);
    assert_eq!(r.url(), "file:///other.ogg");
    assert_eq!(r.rating(), FieldValue::Value(4));
    assert_eq!(r.file_type(), ContainerKind::Mp3);
    assert_eq!(r.filesize(), FieldValue::Value(12_582_912));
    assert_eq!(r.podcast_episode().map(|p| p.title.as_str()), Some("Episode 1"));

    // The copy is deep.
    source.set_podcast_episode(None);
    assert!(r.podcast_episode().is_some());
}

#[test]
fn test_copy_from_fresh_record_replaces_every_field() {
    let _ = testing::init();
    let mut r = testing::record();
    r.set_year(1999);
    r.set_length(200);
    let fresh = MetadataRecord::new();
    r.copy_from(&fresh);

    assert_eq!(r, fresh);
    assert_eq!(r.year(), FieldValue::Undetermined);
    assert_eq!(r.length(), FieldValue::Undetermined);
    assert_eq!(r.track(), FieldValue::Undetermined);
    assert_eq!(r.filesize(), FieldValue::<i64>::Undetermined);
    assert_eq!(r.title(), "");
    assert_eq!(r.file_type(), ContainerKind::Other);
    assert!(r.podcast_episode().is_none());
    // The fresh record has no store, so its statistics resolved to unavailable.
    assert_eq!(r.rating(), FieldValue::Unavailable);
    assert_eq!(r.url(), URL);
}

#[test]
fn test_equality_ignores_locator_and_statistics() {
    let _ = testing::init();
    let a = testing::record();
    let mut b = a.clone();
    b.set_url("file:///elsewhere.mp3");
    b.set_play_count(99);
    assert_eq!(a, b);
    b.set_album("Homework");
    assert_ne!(a, b);
}

#[test]
fn test_save() {
    let _ = testing::init();
    let sink = RecordingTagSink::new(true);
    let r = testing::record();
    assert!(r.save(&sink));

    let written = sink.written();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].url, URL);
    assert_eq!(written[0].title, "One More Time");
    assert_eq!(written[0].year, 2001);
    assert_eq!(
        written[0].extended,
        vec![
            (ExtendedField::Composer, "TCOM", "Thomas Bangalter".to_string()),
            (ExtendedField::DiscNumber, "TPOS", "1".to_string()),
        ]
    );
}

#[test]
fn test_save_skips_unsupported_fields() {
    let _ = testing::init();
    let sink = RecordingTagSink::new(true);
    let mut r = testing::record();
    r.set_file_type(ContainerKind::Other);
    assert!(r.save(&sink));
    assert!(sink.written()[0].extended.is_empty());

    r.set_file_type(ContainerKind::Mp4);
    r.set_disc_number(0);
    assert!(r.save(&sink));
    assert_eq!(
        sink.written()[1].extended,
        vec![
            (ExtendedField::Composer, "\u{a9}wrt", "Thomas Bangalter".to_string()),
            (ExtendedField::DiscNumber, "disk", String::new()),
        ]
    );
}

#[test]
fn test_save_failure() {
    let _ = testing::init();
    let sink = RecordingTagSink::new(false);
    assert!(!testing::record().save(&sink));
}
