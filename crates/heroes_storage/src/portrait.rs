//! Loading reader-supplied portraits from image files.

use heroes_core::{ImageData, Persona};
use heroes_error::{HeroesResult, StorageError, StorageErrorKind};
use std::path::Path;
use tracing::debug;

/// MIME type for an image path, by extension.
///
/// # Examples
///
/// ```
/// use heroes_storage::mime_type_for_path;
/// use std::path::Path;
///
/// assert_eq!(mime_type_for_path(Path::new("hero.JPG")), Some("image/jpeg"));
/// assert_eq!(mime_type_for_path(Path::new("notes.txt")), None);
/// ```
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Read an image file and wrap it as a persona.
///
/// # Errors
///
/// Returns a storage error if the extension is not a supported image type,
/// the file cannot be read, or the file is empty.
#[tracing::instrument(skip(name, description), fields(path = %path.as_ref().display()))]
pub async fn load_portrait(
    path: impl AsRef<Path>,
    name: impl Into<String>,
    description: impl Into<String>,
) -> HeroesResult<Persona> {
    let path = path.as_ref();
    let mime_type = mime_type_for_path(path).ok_or_else(|| {
        StorageError::new(StorageErrorKind::UnsupportedImage(
            path.display().to_string(),
        ))
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    if bytes.is_empty() {
        return Err(StorageError::new(StorageErrorKind::UnsupportedImage(format!(
            "{} is empty",
            path.display()
        )))
        .into());
    }

    debug!(bytes = bytes.len(), mime_type, "Loaded portrait");
    Ok(Persona::new(
        name,
        description,
        ImageData::from_bytes(mime_type, &bytes),
    ))
}
