mod duration_parser;
mod file_copier;
mod path_validator;
mod photo_scanner;
mod timestamp_reader;

pub use duration_parser::parse_duration_seconds;
pub use file_copier::{CopyError, CopyStatus, copy_if_absent};
pub use path_validator::{
    ensure_directory_exists, validate_directory_accessible, validate_directory_exists,
};
pub use photo_scanner::{PhotoItem, PhotoScanner, ScanResult};
pub use timestamp_reader::{read_exif_timestamp, read_timestamp, system_time_to_local};
