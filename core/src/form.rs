//! Multipart form bodies for POST and PUT requests.
//!
//! # Design
//! The backend reads every write as `multipart/form-data`, the same body a
//! browser `FormData` produces. `FormData` keeps fields in insertion order
//! as plain data so it can be inspected in tests, handed to reqwest, or
//! encoded to raw bytes by hosts that do their own I/O.
//!
//! Absent fields are never appended, and numbers travel as the text a
//! browser would send (`12`, `12.5`, `1e+21`), which is what the backend's
//! form parser expects.

use uuid::Uuid;

/// A file attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::File(_) => None,
        }
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<&String> for FormValue {
    fn from(s: &String) -> Self {
        FormValue::Text(s.clone())
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        FormValue::Text(js_number(n))
    }
}

/// Render `n` the way JavaScript's `Number#toString` does: shortest
/// round-trip digits, exponent form outside `[1e-6, 1e21)`.
fn js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    // `{:e}` gives `1.5e21` / `1e-7`; JavaScript signs positive exponents.
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        FormValue::Text(n.to_string())
    }
}

impl From<u64> for FormValue {
    fn from(n: u64) -> Self {
        FormValue::Text(n.to_string())
    }
}

impl From<FilePart> for FormValue {
    fn from(f: FilePart) -> Self {
        FormValue::File(f)
    }
}

impl From<&FilePart> for FormValue {
    fn from(f: &FilePart) -> Self {
        FormValue::File(f.clone())
    }
}

/// Ordered list of form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) -> &mut Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append `value` if present; `None` leaves the form untouched.
    pub fn append_opt<V: Into<FormValue>>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.append(name, value);
        }
        self
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Content-Type` header value matching `encode_multipart(boundary)`.
    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={boundary}")
    }

    /// Encode as a `multipart/form-data` body delimited by `boundary`.
    pub fn encode_multipart(&self, boundary: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, value) in &self.fields {
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match value {
                FormValue::Text(text) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(text.as_bytes());
                }
                FormValue::File(file) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            escape_quoted(name),
                            escape_quoted(&file.file_name),
                            strip_line_breaks(&file.content_type)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(&file.bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        out
    }
}

/// A fresh boundary unlikely to collide with field content.
pub fn random_boundary() -> String {
    format!("auction-form-{}", Uuid::new_v4().simple())
}

// Browsers percent-encode quotes and line breaks inside quoted header params.
fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

// A header value may not span lines.
fn strip_line_breaks(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Records that are submitted as a form body.
pub trait FormFields {
    fn to_form_data(&self) -> FormData;
}

impl FormFields for FormData {
    fn to_form_data(&self) -> FormData {
        self.clone()
    }
}
