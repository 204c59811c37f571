//! Wire representation of notes and listings.
//!
//! The service uses its own lower-case field vocabulary, epoch-second
//! timestamps, and an integer trash flag. Everything here is private to the
//! crate; callers only ever see [`Note`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WireEncoding;
use crate::error::{Error, Result};
use crate::models::{Note, NoteKey, NoteListing, SearchResults};
use crate::timestamp;
use crate::transport::ApiResponse;
use crate::util::non_blank;

const HEADER_MODIFY_DATE: &str = "note-modifydate";
const HEADER_CREATE_DATE: &str = "note-createdate";

/// Numbers arrive either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Text(String),
    Number(serde_json::Number),
}

impl WireNumber {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Trash flag: `1`/`0` on write, integers or booleans on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum WireFlag {
    Int(i64),
    Bool(bool),
}

impl WireFlag {
    fn from_bool(value: bool) -> Self {
        Self::Int(i64::from(value))
    }

    fn into_bool(self) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(value),
            Self::Int(0) => Ok(false),
            Self::Int(1) => Ok(true),
            Self::Int(other) => Err(Error::format("deleted", &other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WireNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted: Option<WireFlag>,
    #[serde(rename = "modifydate", default, skip_serializing_if = "Option::is_none")]
    modify_date: Option<WireNumber>,
    #[serde(rename = "createdate", default, skip_serializing_if = "Option::is_none")]
    create_date: Option<WireNumber>,
    #[serde(rename = "syncnum", default, skip_serializing_if = "Option::is_none")]
    sync_num: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u64>,
    #[serde(rename = "minversion", default, skip_serializing_if = "Option::is_none")]
    min_version: Option<u64>,
    #[serde(rename = "sharekey", default, skip_serializing_if = "Option::is_none")]
    share_key: Option<String>,
    #[serde(rename = "publishkey", default, skip_serializing_if = "Option::is_none")]
    publish_key: Option<String>,
    #[serde(rename = "systemtags", default, skip_serializing_if = "Option::is_none")]
    system_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl From<&Note> for WireNote {
    fn from(note: &Note) -> Self {
        Self {
            key: note.key.as_ref().map(ToString::to_string),
            deleted: note.deleted.map(WireFlag::from_bool),
            modify_date: note.modified.map(encode_time),
            create_date: note.created.map(encode_time),
            sync_num: note.sync_num,
            version: note.version,
            min_version: note.min_version,
            share_key: note.share_key.clone(),
            publish_key: note.publish_key.clone(),
            system_tags: Some(note.system_tags.clone()),
            tags: Some(note.tags.clone()),
            content: Some(note.content.clone()),
        }
    }
}

impl TryFrom<WireNote> for Note {
    type Error = Error;

    fn try_from(wire: WireNote) -> Result<Self> {
        Ok(Self {
            key: non_blank(wire.key)
                .map(NoteKey::parse)
                .transpose()?,
            content: wire.content.unwrap_or_default(),
            created: decode_time("createdate", wire.create_date)?,
            modified: decode_time("modifydate", wire.modify_date)?,
            deleted: wire.deleted.map(WireFlag::into_bool).transpose()?,
            tags: wire.tags.unwrap_or_default(),
            system_tags: dedup(wire.system_tags.unwrap_or_default()),
            sync_num: wire.sync_num,
            version: wire.version,
            min_version: wire.min_version,
            share_key: non_blank(wire.share_key),
            publish_key: non_blank(wire.publish_key),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireIndex {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    data: Vec<WireNote>,
    #[serde(default)]
    mark: Option<String>,
    #[serde(default)]
    since: Option<WireNumber>,
    /// api2 name for the lower bound; `since` wins when both are sent.
    #[serde(default)]
    time: Option<WireNumber>,
}

#[derive(Debug, Deserialize)]
struct WireSearchEnvelope {
    #[serde(rename = "Response")]
    response: WireSearchResponse,
}

#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(rename = "totalRecords", default)]
    total_records: u64,
    #[serde(rename = "Results", default)]
    results: Vec<WireNote>,
}

/// Serialize a note as a request body.
pub(crate) fn encode_note(note: &Note, encoding: WireEncoding) -> Result<String> {
    let json = serde_json::to_string(&WireNote::from(note))?;
    Ok(match encoding {
        WireEncoding::Json => json,
        WireEncoding::Base64 => encode_base64(&json),
    })
}

/// Decode a note from a plain JSON body.
pub(crate) fn decode_note(body: &str) -> Result<Note> {
    parse_json::<WireNote>("note", body)?.try_into()
}

/// Decode a fetched note, honoring the legacy base64 contract.
///
/// In base64 mode the service either sends a JSON note whose `content` is
/// base64, or the bare base64 content with timestamps in response headers.
pub(crate) fn decode_fetched_note(response: &ApiResponse, encoding: WireEncoding) -> Result<Note> {
    if encoding == WireEncoding::Json {
        return decode_note(&response.body);
    }

    let body = response.body.trim();
    let mut wire = if body.starts_with('{') {
        parse_json::<WireNote>("note", body)?
    } else {
        WireNote {
            content: Some(body.to_string()),
            ..WireNote::default()
        }
    };
    wire.content = wire
        .content
        .map(|content| decode_base64("content", &content))
        .transpose()?;

    let mut note = Note::try_from(wire)?;
    if note.modified.is_none() {
        note.modified = header_time(response, HEADER_MODIFY_DATE, "modifydate")?;
    }
    if note.created.is_none() {
        note.created = header_time(response, HEADER_CREATE_DATE, "createdate")?;
    }
    Ok(note)
}

/// Decode an index page. `requested_since` fills in when the server omits it.
pub(crate) fn decode_index(body: &str, requested_since: Option<DateTime<Utc>>) -> Result<NoteListing> {
    let index = parse_json::<WireIndex>("index", body)?;
    let items = index
        .data
        .into_iter()
        .map(Note::try_from)
        .collect::<Result<Vec<_>>>()?;
    let since = match decode_time("since", index.since)? {
        Some(since) => Some(since),
        None => decode_time("time", index.time)?,
    }
    .or(requested_since);

    Ok(NoteListing {
        items,
        mark: non_blank(index.mark),
        since,
        count: index.count,
    })
}

pub(crate) fn decode_search(body: &str) -> Result<SearchResults> {
    let envelope = parse_json::<WireSearchEnvelope>("search response", body)?;
    let items = envelope
        .response
        .results
        .into_iter()
        .map(Note::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(SearchResults {
        items,
        total: envelope.response.total_records,
    })
}

/// Whether a response body carries an `error` member.
pub(crate) fn has_error_payload(body: &str) -> bool {
    let body = body.trim();
    if body.is_empty() {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.as_object().map(|object| object.contains_key("error")))
        .unwrap_or(false)
}

pub(crate) fn encode_base64(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

fn decode_base64(field: &'static str, value: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(value.trim())
        .map_err(|_| Error::format(field, value))?;
    String::from_utf8(bytes).map_err(|_| Error::format(field, value))
}

fn parse_json<T: serde::de::DeserializeOwned>(field: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|_| Error::format(field, body))
}

fn encode_time(time: DateTime<Utc>) -> WireNumber {
    WireNumber::Text(timestamp::encode(time))
}

fn decode_time(field: &'static str, value: Option<WireNumber>) -> Result<Option<DateTime<Utc>>> {
    match value.map(WireNumber::into_text) {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => timestamp::decode_field(field, &text).map(Some),
    }
}

fn header_time(
    response: &ApiResponse,
    header: &str,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>> {
    match response.header(header).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => timestamp::decode_field(field, value).map(Some),
    }
}

fn dedup(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_note_maps_wire_names() {
        let body = r#"{
            "key": "k1",
            "deleted": 0,
            "modifydate": "1700000000.5",
            "createdate": 1600000000,
            "syncnum": 7,
            "version": 3,
            "minversion": 1,
            "sharekey": "s",
            "publishkey": "",
            "systemtags": ["pinned", "pinned", "markdown"],
            "tags": ["work"],
            "content": "hello"
        }"#;
        let note = decode_note(body).unwrap();

        assert_eq!(note.key().map(NoteKey::as_str), Some("k1"));
        assert_eq!(note.deleted, Some(false));
        assert_eq!(
            note.modified,
            Some(Utc.timestamp_millis_opt(1_700_000_000_500).unwrap())
        );
        assert_eq!(note.created, Some(Utc.timestamp_opt(1_600_000_000, 0).unwrap()));
        assert_eq!(note.sync_num(), Some(7));
        assert_eq!(note.version(), Some(3));
        assert_eq!(note.min_version(), Some(1));
        assert_eq!(note.share_key(), Some("s"));
        assert_eq!(note.publish_key(), None);
        assert!(note.pinned());
        assert_eq!(note.system_tags().len(), 2);
        assert_eq!(note.tags, vec!["work".to_string()]);
        assert_eq!(note.content, "hello");
    }

    #[test]
    fn deleted_accepts_booleans_and_rejects_other_integers() {
        assert_eq!(decode_note(r#"{"deleted": true}"#).unwrap().deleted, Some(true));
        assert_eq!(decode_note(r#"{"deleted": 1}"#).unwrap().deleted, Some(true));
        assert_eq!(decode_note("{}").unwrap().deleted, None);
        assert!(matches!(
            decode_note(r#"{"deleted": 5}"#),
            Err(Error::Format { field: "deleted", .. })
        ));
    }

    #[test]
    fn bad_timestamp_reports_field_and_value() {
        match decode_note(r#"{"modifydate": "yesterday"}"#) {
            Err(Error::Format { field, value }) => {
                assert_eq!(field, "modifydate");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn null_and_empty_timestamps_are_absent() {
        let note = decode_note(r#"{"modifydate": null, "createdate": ""}"#).unwrap();
        assert_eq!(note.modified, None);
        assert_eq!(note.created, None);
    }

    #[test]
    fn malformed_body_is_a_format_error() {
        assert!(matches!(
            decode_note("<html>oops</html>"),
            Err(Error::Format { field: "note", .. })
        ));
    }

    #[test]
    fn encode_note_omits_absent_flag_and_key() {
        let note = Note::new("draft");
        let raw = encode_note(&note, WireEncoding::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("deleted"));
        assert!(!object.contains_key("key"));
        assert!(!object.contains_key("modifydate"));
        assert_eq!(object["content"], "draft");
    }

    #[test]
    fn encode_note_writes_integer_flag_and_string_timestamps() {
        let mut note = Note::with_key(NoteKey::parse("k").unwrap(), "body");
        note.deleted = Some(true);
        note.modified = Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        note.set_pinned(true);

        let raw = encode_note(&note, WireEncoding::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["key"], "k");
        assert_eq!(value["deleted"], 1);
        assert_eq!(value["modifydate"], "1700000000");
        assert_eq!(value["systemtags"], serde_json::json!(["pinned"]));
    }

    #[test]
    fn encode_note_false_flag_is_zero_not_absent() {
        let mut note = Note::new("x");
        note.deleted = Some(false);
        let raw = encode_note(&note, WireEncoding::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["deleted"], 0);
    }

    #[test]
    fn base64_encoding_wraps_whole_body() {
        let note = Note::new("hi");
        let raw = encode_note(&note, WireEncoding::Base64).unwrap();
        let decoded = decode_base64("body", &raw).unwrap();
        assert!(decoded.contains("\"content\":\"hi\""));
    }

    #[test]
    fn fetched_base64_json_content_is_decoded() {
        let body = format!(r#"{{"key":"k","content":"{}"}}"#, encode_base64("héllo wörld"));
        let response = ApiResponse::new(200, body);
        let note = decode_fetched_note(&response, WireEncoding::Base64).unwrap();
        assert_eq!(note.content, "héllo wörld");
    }

    #[test]
    fn fetched_bare_base64_uses_header_timestamps() {
        let response = ApiResponse::new(200, encode_base64("legacy body"))
            .with_header("note-modifydate", "1700000100")
            .with_header("note-createdate", "1700000000");
        let note = decode_fetched_note(&response, WireEncoding::Base64).unwrap();
        assert_eq!(note.content, "legacy body");
        assert_eq!(note.modified.unwrap().timestamp(), 1_700_000_100);
        assert_eq!(note.created.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn fetched_invalid_base64_is_a_format_error() {
        let response = ApiResponse::new(200, "***not base64***");
        assert!(matches!(
            decode_fetched_note(&response, WireEncoding::Base64),
            Err(Error::Format {
                field: "content",
                ..
            })
        ));
    }

    #[test]
    fn decode_index_reads_page_envelope() {
        let body = r#"{
            "count": 2,
            "data": [
                {"key": "a", "modifydate": "10"},
                {"key": "b", "modifydate": "20", "deleted": 1}
            ],
            "mark": "cursor-1",
            "since": "5"
        }"#;
        let listing = decode_index(body, None).unwrap();
        assert_eq!(listing.count, Some(2));
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.mark.as_deref(), Some("cursor-1"));
        assert_eq!(listing.since.unwrap().timestamp(), 5);
        assert!(listing.items[1].is_trashed());
    }

    #[test]
    fn decode_index_reads_time_as_lower_bound() {
        let listing = decode_index(r#"{"count":0,"data":[],"time":"1700000000.5"}"#, None).unwrap();
        assert_eq!(
            listing.since,
            Some(Utc.timestamp_millis_opt(1_700_000_000_500).unwrap())
        );

        let both = r#"{"data": [], "since": "5", "time": "7"}"#;
        let requested = Utc.timestamp_opt(99, 0).unwrap();
        let listing = decode_index(both, Some(requested)).unwrap();
        assert_eq!(listing.since.unwrap().timestamp(), 5);
    }

    #[test]
    fn decode_index_falls_back_to_requested_since() {
        let since = Utc.timestamp_opt(99, 0).unwrap();
        let listing = decode_index(r#"{"data": [], "mark": ""}"#, Some(since)).unwrap();
        assert_eq!(listing.since, Some(since));
        assert!(!listing.has_more());
    }

    #[test]
    fn decode_search_reads_legacy_envelope() {
        let body = r#"{"Response": {"totalRecords": 12, "Results": [{"key": "a", "content": "milk"}]}}"#;
        let results = decode_search(body).unwrap();
        assert_eq!(results.total, 12);
        assert_eq!(results.items[0].content, "milk");
    }

    #[test]
    fn error_payload_detection() {
        assert!(!has_error_payload(""));
        assert!(!has_error_payload("  "));
        assert!(!has_error_payload(r#"{"key": "a"}"#));
        assert!(!has_error_payload("ok"));
        assert!(has_error_payload(r#"{"error": "locked"}"#));
    }
}
