pub mod file_properties;
pub mod file_record;
pub mod upload_response;

pub use file_properties::FileProperties;
pub use file_record::{ContentHandle, FileRecord};
pub use upload_response::UploadResponse;
