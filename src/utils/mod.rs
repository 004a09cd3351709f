pub mod audio_files;
pub use audio_files::{
    OFFLINE_FALLBACK_FILE, display_path, ensure_output_dir, offline_audio_path, unique_audio_path,
    write_audio,
};
pub mod url_validation;
pub use url_validation::{UrlValidationError, validate_base_url};
