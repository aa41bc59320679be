mod acquirer;
mod types;
mod upload;

pub use acquirer::ImageAcquirer;
pub use types::{ImageBytes, ImageSource, OCTET_STREAM};
pub use upload::{TempUpload, UploadStore};
