use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{MediaError, MediaResult};

/// Build a `data:<mime>;base64,<payload>` URI
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// A stored photo value: either an embedded data URI or a plain URL
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoRef {
    Embedded { mime: String, bytes: Vec<u8> },
    Url(String),
}

impl PhotoRef {
    pub fn parse(value: &str) -> MediaResult<Self> {
        let value = value.trim();
        let Some(rest) = value.strip_prefix("data:") else {
            return Ok(PhotoRef::Url(value.to_string()));
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| MediaError::InvalidDataUri("missing payload separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| MediaError::InvalidDataUri("only base64 payloads are supported".to_string()))?;

        Ok(PhotoRef::Embedded {
            mime: mime.to_string(),
            bytes: STANDARD.decode(payload)?,
        })
    }

    /// The stored image bytes, exactly as uploaded
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            PhotoRef::Embedded { bytes, .. } => Some(bytes.as_slice()),
            PhotoRef::Url(_) => None,
        }
    }

    /// File extension for saving the embedded bytes
    pub fn extension(&self) -> &str {
        match self {
            PhotoRef::Embedded { mime, .. } => match mime.as_str() {
                "image/png" => "png",
                "image/webp" => "webp",
                "image/gif" => "gif",
                _ => "jpg",
            },
            PhotoRef::Url(_) => "url",
        }
    }

    /// Pixel dimensions of an embedded photo
    pub fn dimensions(&self) -> MediaResult<Option<(u32, u32)>> {
        match self.bytes() {
            Some(bytes) => {
                let img = image::load_from_memory(bytes)?;
                Ok(Some((img.width(), img.height())))
            }
            None => Ok(None),
        }
    }

    /// Short description for terminal output
    pub fn describe(&self) -> String {
        match self {
            PhotoRef::Embedded { mime, bytes } => {
                format!("{} ({:.1} KB)", mime, bytes.len() as f64 / 1024.0)
            }
            PhotoRef::Url(url) => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_round_trip_keeps_bytes() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let uri = encode("image/jpeg", &bytes);
        let photo = PhotoRef::parse(&uri).unwrap();

        assert_eq!(photo.bytes(), Some(bytes.as_slice()));
        assert_eq!(photo.extension(), "jpg");
        assert_eq!(encode("image/jpeg", photo.bytes().unwrap()), uri);
    }

    #[test]
    fn test_plain_url() {
        let photo = PhotoRef::parse("https://cdn.example.com/a.jpg").unwrap();
        assert_eq!(photo, PhotoRef::Url("https://cdn.example.com/a.jpg".to_string()));
        assert!(photo.bytes().is_none());
    }

    #[test]
    fn test_malformed_data_uri() {
        assert!(PhotoRef::parse("data:image/png;base64").is_err());
        assert!(PhotoRef::parse("data:text/plain,hello").is_err());
        assert!(PhotoRef::parse("data:image/png;base64,@@@").is_err());
    }
}
