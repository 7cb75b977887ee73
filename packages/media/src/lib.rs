//! Photo handling for defect reports.
//!
//! Photos are decoded, scaled and re-encoded on the client, then embedded in
//! the JSON body as a JPEG data URI. The server never sees multipart uploads.

pub mod data_uri;
pub mod error;
pub mod photo;

pub use data_uri::PhotoRef;
pub use error::{MediaError, MediaResult};
pub use photo::{EncodedPhoto, ImageUpload};

/// Largest accepted upload, in megabytes
pub const MAX_UPLOAD_MB: u64 = 10;

/// Largest accepted upload, in bytes
pub const MAX_UPLOAD_BYTES: u64 = MAX_UPLOAD_MB * 1024 * 1024;

/// JPEG quality used for every re-encoded photo
pub const JPEG_QUALITY: u8 = 80;

/// Canvas for photos replaced from the detail screen
pub const DETAIL_PHOTO_WIDTH: u32 = 600;
pub const DETAIL_PHOTO_HEIGHT: u32 = 420;

/// Longest edge for photos attached to a new defect
pub const FORM_PHOTO_MAX_EDGE: u32 = 1280;

/// Prepare a photo picked on the detail screen (technician or replacement photo)
pub fn detail_photo(upload: &ImageUpload) -> MediaResult<String> {
    Ok(upload
        .cover_fit(DETAIL_PHOTO_WIDTH, DETAIL_PHOTO_HEIGHT)?
        .to_data_uri())
}

/// Prepare a photo attached to the new-defect form
pub fn form_photo(upload: &ImageUpload) -> MediaResult<String> {
    Ok(upload.bounded_fit(FORM_PHOTO_MAX_EDGE)?.to_data_uri())
}
