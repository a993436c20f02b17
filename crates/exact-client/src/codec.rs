//! JSONL encoding and decoding for EXACT frames.
//!
//! Outbound requests become a single line whose leading keys are the
//! `request` discriminator and the `msgid` stamped by the sequencer. Unset
//! optional fields are pruned here rather than on each request type, because
//! the server treats an explicit `null` differently from an omitted key.
//! Inbound frames decode into an open [`Record`]; schema checks belong to the
//! typed views layered on top.

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ClientError;

const REQUEST_KEY: &str = "request";
const MSGID_KEY: &str = "msgid";

/// Decoded JSON object, keys kept in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the record holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a field, `None` when absent or not a string.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Message identifier echoed by the server.
    #[must_use]
    pub fn msgid(&self) -> Option<u64> {
        self.0.get(MSGID_KEY).and_then(Value::as_u64)
    }

    /// Borrowed view of every field.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Deserialises the record into a typed view.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the record does not match `T`.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Serialises `request` as one newline-terminated frame stamped with `msgid`.
///
/// # Errors
///
/// Returns [`ClientError::Encode`] when the request does not serialise to a
/// JSON object.
pub fn encode<T: Serialize + ?Sized>(request: &T, msgid: u64) -> Result<Vec<u8>, ClientError> {
    let Value::Object(mut fields) = serde_json::to_value(request).map_err(ClientError::Encode)?
    else {
        return Err(ClientError::Encode(serde_json::Error::custom(
            "requests must serialise to a JSON object",
        )));
    };

    let mut envelope = Map::with_capacity(fields.len() + 1);
    if let Some(kind) = fields.remove(REQUEST_KEY) {
        envelope.insert(REQUEST_KEY.to_owned(), kind);
    }
    fields.remove(MSGID_KEY);
    envelope.insert(MSGID_KEY.to_owned(), Value::from(msgid));
    for (key, value) in fields {
        if let Some(value) = prune_absent(value) {
            envelope.insert(key, value);
        }
    }

    let mut line = serde_json::to_vec(&Value::Object(envelope)).map_err(ClientError::Encode)?;
    line.push(b'\n');
    Ok(line)
}

/// Decodes one frame into a [`Record`].
///
/// Trailing whitespace, including the newline delimiter, is ignored.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when the frame is empty, is not valid JSON,
/// or holds a JSON value other than an object.
pub fn decode(frame: &[u8]) -> Result<Record, ClientError> {
    let trimmed = trim_trailing_whitespace(frame);
    if trimmed.is_empty() {
        return Err(ClientError::malformed("empty frame"));
    }
    serde_json::from_slice(trimmed).map_err(ClientError::from_json_error)
}

/// Drops `null` object members recursively; `None` means "omit this value".
fn prune_absent(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(fields) => Some(Value::Object(
            fields
                .into_iter()
                .filter_map(|(key, value)| prune_absent(value).map(|value| (key, value)))
                .collect(),
        )),
        Value::Array(items) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(_) => prune_absent(item).unwrap_or(Value::Null),
                    other => other,
                })
                .collect(),
        )),
        other => Some(other),
    }
}

fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |position| position + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct AddCell {
        request: &'static str,
        cell: CellFields,
    }

    #[derive(Serialize)]
    struct CellFields {
        id: &'static str,
        desc: Option<&'static str>,
        ip_address: &'static str,
        port: Option<u16>,
    }

    fn add_cell() -> AddCell {
        AddCell {
            request: "addCell",
            cell: CellFields {
                id: "A1",
                desc: None,
                ip_address: "10.0.0.2",
                port: Some(8765),
            },
        }
    }

    #[test]
    fn encodes_single_line_with_envelope_first() {
        let line = encode(&add_cell(), 7).expect("encode");
        let text = String::from_utf8(line).expect("utf8");
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.starts_with(r#"{"request":"addCell","msgid":7,"#), "{text}");
    }

    #[test]
    fn unset_optionals_are_omitted_not_null() {
        let line = encode(&add_cell(), 1).expect("encode");
        let record = decode(&line).expect("decode");
        let cell = record.get("cell").expect("cell payload");
        assert_eq!(
            cell,
            &json!({"id": "A1", "ip_address": "10.0.0.2", "port": 8765})
        );
        assert!(!String::from_utf8_lossy(&line).contains("null"));
    }

    #[test]
    fn echoed_request_round_trips_supplied_fields() {
        let line = encode(&add_cell(), 3).expect("encode");
        let record = decode(&line).expect("decode");
        assert_eq!(record.str_field("request"), Some("addCell"));
        assert_eq!(record.msgid(), Some(3));
        assert_eq!(record.fields().len(), 3);
    }

    #[test]
    fn non_object_requests_are_rejected() {
        let error = encode(&[1, 2, 3], 1).expect_err("arrays are not requests");
        assert!(matches!(error, ClientError::Encode(_)));
    }

    #[test]
    fn decodes_and_trims_newline() {
        let record = decode(b"{\"response\":\"ack\",\"msgid\":1}\r\n").expect("decode");
        assert_eq!(record.str_field("response"), Some("ack"));
        assert_eq!(record.msgid(), Some(1));
    }

    #[test]
    fn decode_keeps_server_key_order() {
        let record = decode(br#"{"response":"element","z":1,"a":2}"#).expect("decode");
        let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["response", "z", "a"]);
    }

    #[test]
    fn rejects_empty_frame() {
        let error = decode(b"\n").expect_err("empty frame");
        assert!(matches!(error, ClientError::Decode { source: None, .. }));
    }

    #[test]
    fn rejects_non_json() {
        let error = decode(b"not json\n").expect_err("garbage");
        assert!(matches!(error, ClientError::Decode { source: Some(_), .. }));
    }

    #[test]
    fn rejects_non_object_json() {
        let error = decode(b"[1,2]\n").expect_err("array frame");
        assert!(matches!(error, ClientError::Decode { .. }));
    }
}
