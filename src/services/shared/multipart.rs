// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Hand-built multipart/form-data bodies.
//!
//! The transcription endpoint takes file uploads as multipart forms. The
//! body is assembled by hand so the HTTP client does not need its multipart
//! feature for a single fixed-shape request.

use std::time::{SystemTime, UNIX_EPOCH};

/// Incremental multipart/form-data body builder.
///
/// Fields are appended in call order; [`finish`](Self::finish) closes the
/// body and yields the matching `Content-Type` header value.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Create a form with a fresh boundary.
    ///
    /// `tag` is embedded in the boundary so captured requests can be traced
    /// back to the adapter that built them.
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self {
            boundary: format!("----Voicebridge{tag}Boundary{nanos}"),
            body: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub fn add_text(&mut self, name: &str, value: &str) {
        self.open_part();
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    /// Append a file field with an explicit filename and content type.
    pub fn add_file(&mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) {
        self.open_part();
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
    }

    /// Close the body and return `(content_type_header, body_bytes)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        (content_type, self.body)
    }

    fn open_part(&mut self) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_shape() {
        let mut form = MultipartForm::new("Test");
        form.add_text("model", "some-model");
        let (content_type, body) = form.finish();

        let body = String::from_utf8(body).unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(boundary.starts_with("----VoicebridgeTestBoundary"));
        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.contains("Content-Disposition: form-data; name=\"model\"\r\n\r\nsome-model\r\n"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_file_field_carries_content_type() {
        let mut form = MultipartForm::new("Test");
        form.add_file("file", "input.wav", "audio/wav", &[0x52, 0x49]);
        let (_, body) = form.finish();

        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("name=\"file\"; filename=\"input.wav\"\r\n"));
        assert!(body.contains("Content-Type: audio/wav\r\n\r\n"));
    }

    #[test]
    fn test_fields_preserve_order() {
        let mut form = MultipartForm::new("Test");
        form.add_text("first", "1");
        form.add_text("second", "2");
        let (_, body) = form.finish();

        let body = String::from_utf8_lossy(&body);
        let first = body.find("name=\"first\"").unwrap();
        let second = body.find("name=\"second\"").unwrap();
        assert!(first < second);
    }
}
