/// Human-readable renderings of metadata values. These are what the browsing UI shows and what
/// unscoped search terms are matched against.
use crate::field::FieldValue;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use once_cell::sync::Lazy;

/// Formats seconds as `m:ss`, or `h:mm:ss` when `show_hours` is set and the time reaches an hour.
/// The leading component is never zero-padded.
pub fn pretty_time(seconds: u64, show_hours: bool) -> String {
    let mut s = format!(":{:02}", seconds % 60);
    let mut rest = seconds / 60;

    if show_hours && rest >= 60 {
        s = format!(":{:02}{s}", rest % 60);
        rest /= 60;
    }

    format!("{rest}{s}")
}

/// Renders the sentinel states with the glyphs the track list uses: `?` for not yet known, `-` for
/// meaningless, nothing for unavailable.
fn sentinel_glyph<T>(value: &FieldValue<T>) -> &'static str {
    match value {
        FieldValue::Undetermined => "?",
        FieldValue::Irrelevant => "-",
        _ => "",
    }
}

pub fn pretty_length(length: FieldValue<i32>, show_hours: bool) -> String {
    match length {
        FieldValue::Value(s) if s > 0 => pretty_time(s as u64, show_hours),
        FieldValue::Value(_) => String::new(),
        other => sentinel_glyph(&other).to_string(),
    }
}

pub fn pretty_bitrate(bitrate: FieldValue<i32>) -> String {
    match bitrate {
        FieldValue::Value(0) => "?".to_string(),
        FieldValue::Value(b) => b.to_string(),
        other => sentinel_glyph(&other).to_string(),
    }
}

pub fn pretty_sample_rate(sample_rate: FieldValue<i32>) -> String {
    match sample_rate {
        FieldValue::Value(r) if r > 0 => format!("{r} Hz"),
        FieldValue::Value(_) => "?".to_string(),
        other => sentinel_glyph(&other).to_string(),
    }
}

const FILESIZE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Binary units with one decimal place, e.g. `3.4 MB`.
pub fn pretty_filesize(bytes: i64) -> String {
    if bytes < 0 {
        return String::new();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < FILESIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", FILESIZE_UNITS[unit])
}

pub fn pretty_rating(rating: i32) -> &'static str {
    match rating {
        1 => "1 - Crap",
        2 => "2 - Tolerable",
        3 => "3 - Good",
        4 => "4 - Excellent",
        5 => "5 - Inconceivable!",
        // Out-of-range ratings count as unrated.
        _ => "Not rated",
    }
}

pub fn rating_list() -> Vec<&'static str> {
    (0..=5).map(pretty_rating).collect()
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        one.to_string()
    } else {
        format!("{n} {many}")
    }
}

/// Describes how long ago `then` (seconds since the epoch) was, relative to `now`. Zero means the
/// track was never played.
pub fn verbose_time_since(then: i64, now: DateTime<Utc>) -> String {
    if then == 0 {
        return "Never".to_string();
    }
    let Some(then) = Utc.timestamp_opt(then, 0).single() else {
        return "Never".to_string();
    };

    let datediff = (now.date_naive() - then.date_naive()).num_days();
    if datediff >= 6 * 7 {
        return format!("{} {}", then.format("%B"), then.year());
    }
    if datediff >= 7 {
        return plural((datediff + 3) / 7, "One week ago", "weeks ago");
    }
    if datediff == -1 {
        return "Tomorrow".to_string();
    }

    let timediff = (now - then).num_seconds();
    if timediff >= 24 * 60 * 60 {
        if datediff == 1 {
            return "Yesterday".to_string();
        }
        return plural((timediff + 12 * 60 * 60) / (24 * 60 * 60), "One day ago", "days ago");
    }
    if timediff >= 90 * 60 {
        return plural((timediff + 30 * 60) / (60 * 60), "One hour ago", "hours ago");
    }
    if timediff >= 0 {
        if timediff / 60 == 0 {
            return "Within the last minute".to_string();
        }
        return plural((timediff + 30) / 60, "One minute ago", "minutes ago");
    }
    "The future".to_string()
}

/// Derives a display title from a file name: drops the extension, turns underscores into spaces and
/// decodes percent escapes.
pub fn pretty_title_from_filename(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(pos) => &filename[..pos],
        None => filename,
    };
    let spaced = stem.replace('_', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

const ID3V1_GENRES: [&str; 148] = [
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "Alternative Rock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychedelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
    "Folk",
    "Folk/Rock",
    "National Folk",
    "Swing",
    "Fusion",
    "Bebob",
    "Latin",
    "Revival",
    "Celtic",
    "Bluegrass",
    "Avantgarde",
    "Gothic Rock",
    "Progressive Rock",
    "Psychedelic Rock",
    "Symphonic Rock",
    "Slow Rock",
    "Big Band",
    "Chorus",
    "Easy Listening",
    "Acoustic",
    "Humour",
    "Speech",
    "Chanson",
    "Opera",
    "Chamber Music",
    "Sonata",
    "Symphony",
    "Booty Bass",
    "Primus",
    "Porn Groove",
    "Satire",
    "Slow Jam",
    "Club",
    "Tango",
    "Samba",
    "Folklore",
    "Ballad",
    "Power Ballad",
    "Rhythmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "A Cappella",
    "Euro-House",
    "Dance Hall",
    "Goa",
    "Drum & Bass",
    "Club-House",
    "Hardcore",
    "Terror",
    "Indie",
    "BritPop",
    "Afro-Punk",
    "Polsk Punk",
    "Beat",
    "Christian Gangsta Rap",
    "Heavy Metal",
    "Black Metal",
    "Crossover",
    "Contemporary Christian",
    "Christian Rock",
    "Merengue",
    "Salsa",
    "Thrash Metal",
    "Anime",
    "JPop",
    "Synthpop",
];

static GENRE_LIST: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut genres = ID3V1_GENRES.to_vec();
    genres.sort_unstable();
    genres.dedup();
    genres
});

/// The standard ID3v1 genre names, sorted and without duplicates, for genre pickers.
pub fn genre_list() -> &'static [&'static str] {
    &GENRE_LIST
}
