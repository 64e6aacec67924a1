//! Minimal `multipart/form-data` encoder for file uploads.

use std::time::{SystemTime, UNIX_EPOCH};

pub struct MultipartBody {
    boundary: String,
    buffer: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::with_boundary(format!("----exostacker{nanos:x}"))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buffer: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn add_file(&mut self, field: &str, file_name: &str, media_type: &str, data: &[u8]) {
        self.buffer
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buffer.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quoted(field),
                escape_quoted(file_name)
            )
            .as_bytes(),
        );
        self.buffer
            .extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\r\n");
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buffer
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buffer
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "%22")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_parts_and_terminator() {
        let mut body = MultipartBody::with_boundary("XYZ");
        body.add_file("koi_file", "koi.csv", "text/csv", b"a,b\n");
        body.add_file("k2_file", "k2.csv", "text/csv", b"c\n");
        let text = String::from_utf8(body.finish()).unwrap();
        assert_eq!(
            text,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"koi_file\"; filename=\"koi.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             a,b\n\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"k2_file\"; filename=\"k2.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             c\n\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn quotes_in_file_names_are_escaped() {
        let mut body = MultipartBody::with_boundary("B");
        body.add_file("koi_file", "we\"ird.csv", "text/csv", b"");
        let text = String::from_utf8(body.finish()).unwrap();
        assert!(text.contains("filename=\"we%22ird.csv\""));
    }

    #[test]
    fn content_type_carries_boundary() {
        let body = MultipartBody::with_boundary("abc");
        assert_eq!(body.content_type(), "multipart/form-data; boundary=abc");
    }
}
