//! Request bodies - JSON documents and multipart forms

use serde_json::Value;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_JSON: &str = "application/json";

/// Encoded request body handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Multipart(_) => None,
        }
    }

    pub fn parts(&self) -> Option<&[FormPart]> {
        match self {
            Self::Json(_) => None,
            Self::Multipart(parts) => Some(parts),
        }
    }

    /// Look up a multipart part by field name
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts()?.iter().find(|part| part.name == name)
    }
}

/// Single field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FormPart {
    /// Binary file part
    pub fn file(name: impl Into<String>, filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: OCTET_STREAM.to_string(),
            data,
        }
    }

    /// JSON document part
    pub fn json(name: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: APPLICATION_JSON.to_string(),
            data: value.to_string().into_bytes(),
        }
    }

    /// Part data as UTF-8, if it is text
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_part_lookup() {
        let body = RequestBody::Multipart(vec![
            FormPart::file("file0", "a.png", vec![1, 2, 3]),
            FormPart::json("payload_json", &json!({"tts": false})),
        ]);

        let file = body.part("file0").unwrap();
        assert_eq!(file.filename.as_deref(), Some("a.png"));
        assert_eq!(file.content_type, OCTET_STREAM);

        let payload = body.part("payload_json").unwrap();
        assert_eq!(payload.as_text(), Some(r#"{"tts":false}"#));
        assert!(body.json().is_none());
        assert!(body.part("file1").is_none());
    }
}
