//! Image loading service
//!
//! Reads camera images referenced by measurement rows and encodes them for
//! JSON transport. Failures never reach the client: a missing or unreadable
//! image is simply absent.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::ErrorKind;
use tokio::fs;
use tracing::{debug, warn};

/// Image loading service
pub struct ImageService;

impl ImageService {
    /// Read the file at `path` and return it base64-encoded.
    ///
    /// # Returns
    /// * `Some(String)` - Encoded file contents
    /// * `None` - Path is unset or empty, the file does not exist, or it could not be read
    pub async fn encode_from_path(path: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;

        match fs::read(path).await {
            Ok(bytes) => Some(STANDARD.encode(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path, "Image file does not exist");
                None
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to read image file");
                None
            }
        }
    }

    /// Encode both camera images of a measurement concurrently
    pub async fn encode_pair(
        cam1_path: Option<&str>,
        cam2_path: Option<&str>,
    ) -> (Option<String>, Option<String>) {
        tokio::join!(
            Self::encode_from_path(cam1_path),
            Self::encode_from_path(cam2_path)
        )
    }
}
