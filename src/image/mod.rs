//! Source images and edit results.

mod types;

pub use types::{clean_base64, EditedImage, ImageFormat, ImageInput, PNG_DATA_URL_PREFIX};
