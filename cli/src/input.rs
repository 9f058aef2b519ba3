use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;

/// Largest capture accepted for translation
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Image is too large ({size_bytes} bytes, limit {})", MAX_IMAGE_BYTES)]
    FileTooLarge { size_bytes: u64 },
    #[error("Image is not a PNG file")]
    NotPng,
    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Read a PNG capture from disk and return it base64-encoded
pub fn load_png_base64(path: &Path) -> Result<String, InputError> {
    let io_error = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        return Err(InputError::FileNotFound(path.to_path_buf()));
    }

    let size_bytes = fs::metadata(path).map_err(io_error)?.len();
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(InputError::FileTooLarge { size_bytes });
    }

    let bytes = fs::read(path).map_err(io_error)?;
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(InputError::NotPng);
    }

    debug!("Loaded capture {:?} ({} bytes)", path, bytes.len());
    Ok(STANDARD.encode(&bytes))
}

/// Context for a follow-up question, given inline or as a file
pub fn read_context(inline: Option<String>, file: Option<&Path>) -> Result<String, InputError> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                InputError::FileNotFound(path.to_path_buf())
            } else {
                InputError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        }),
        (None, None) => Ok(String::new()),
    }
}
