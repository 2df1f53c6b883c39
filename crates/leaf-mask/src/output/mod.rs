mod error;
mod image;
mod json;
mod manager;
mod types;

pub use error::OutputError;
pub use self::image::{load_frame, mask_file_name, mask_relative_path};
pub use manager::OutputManager;
pub use types::ImageRecord;
