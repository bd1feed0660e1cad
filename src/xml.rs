/// The xml module reads and writes the playlist item format: one `<item>` element per record with
/// one child element per column holding that column's exact text. The locator and any extra
/// attributes the caller wants to keep live on the `<item>` element itself.
///
/// ```text
/// <item url="file:///music/a.mp3" queue_index="2">
///   <Filename>a.mp3</Filename><Title>One More Time</Title> ... <Mood/>
/// </item>
/// ```
use crate::column::Column;
use crate::error::{MetaError, MetaExpectedError, Result};
use crate::record::MetadataRecord;
use crate::tags::ContainerKind;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Write};
use tracing::debug;

const ITEM: &str = "item";
const URL_ATTRIBUTE: &str = "url";

fn xml_error(e: impl std::fmt::Display) -> MetaError {
    MetaError::Xml(e.to_string())
}

/// A record read back from a playlist, with the item attributes other than `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    pub record: MetadataRecord,
    pub attributes: Vec<(String, String)>,
}

pub fn write_item<W: Write>(writer: &mut Writer<W>, record: &MetadataRecord, attributes: &[(&str, &str)]) -> Result<()> {
    let mut start = BytesStart::new(ITEM);
    start.push_attribute((URL_ATTRIBUTE, record.url()));
    for (key, value) in attributes {
        start.push_attribute((*key, *value));
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    for column in Column::ALL {
        let text = record.exact_text(column);
        let name = column.exact_name();
        if text.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(name))).map_err(xml_error)?;
        } else {
            writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
            writer.write_event(Event::Text(BytesText::new(&text))).map_err(xml_error)?;
            writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(ITEM))).map_err(xml_error)?;
    Ok(())
}

pub fn to_xml_string(record: &MetadataRecord, attributes: &[(&str, &str)]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_item(&mut writer, record, attributes)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

/// Writes a whole `<playlist>` document.
pub fn playlist_to_xml_string(records: &[MetadataRecord]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Start(BytesStart::new("playlist")))
        .map_err(xml_error)?;
    for record in records {
        write_item(&mut writer, record, &[])?;
    }
    writer.write_event(Event::End(BytesEnd::new("playlist"))).map_err(xml_error)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

fn restore(record: &mut MetadataRecord, column: Column, text: &str) {
    if text.is_empty() {
        return;
    }
    match column {
        Column::Type => record.set_file_type(ContainerKind::from_code(crate::field::parse_exact(text))),
        // Derived from the locator.
        Column::Filename | Column::Directory | Column::Mood => {}
        _ => record.set_exact_text(column, text),
    }
}

fn open_item(start: &BytesStart<'_>) -> Result<PlaylistItem> {
    let mut record = MetadataRecord::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        if key == URL_ATTRIBUTE {
            record.set_url(value);
        } else {
            attributes.push((key, value));
        }
    }
    if record.url().is_empty() {
        return Err(MetaExpectedError::InvalidPlaylist {
            message: "item element without a url attribute".to_string(),
        }
        .into());
    }
    Ok(PlaylistItem { record, attributes })
}

/// Reads every `<item>` element in `xml`, wherever it is nested. Column elements are applied with
/// `set_exact_text`; empty ones are left undetermined. Unknown elements are skipped.
pub fn read_items(xml: &str) -> Result<Vec<PlaylistItem>> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut current: Option<PlaylistItem> = None;
    let mut column: Option<Column> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == ITEM.as_bytes() => {
                if current.is_some() {
                    return Err(MetaExpectedError::InvalidPlaylist {
                        message: "nested item element".to_string(),
                    }
                    .into());
                }
                current = Some(open_item(&e)?);
            }
            Event::Empty(e) if e.name().as_ref() == ITEM.as_bytes() => {
                if current.is_none() {
                    items.push(open_item(&e)?);
                }
            }
            Event::Start(e) => {
                if current.is_some() {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    column = Column::from_exact_name(&name);
                    if column.is_none() {
                        debug!("Skipping unknown playlist element {}", name);
                    }
                    text.clear();
                }
            }
            Event::Text(e) => {
                if column.is_some() {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(e) => {
                if column.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == ITEM.as_bytes() {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                } else if let (Some(item), Some(c)) = (current.as_mut(), column.take()) {
                    restore(&mut item.record, c, &text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(MetaExpectedError::InvalidPlaylist {
            message: "unterminated item element".to_string(),
        }
        .into());
    }
    debug!("Read {} playlist items", items.len());
    Ok(items)
}
