pub mod local_disk;
pub mod s3;
pub mod s3_media;

use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum MediaStorageConfig {
    Local(local_disk::LocalDiskConfig),
    S3(s3_media::S3MediaStorageConfig),
}

/// Fresh object name for an upload: `<uuid>.<ext>`, the extension taken from the
/// original file name when present, otherwise guessed from the MIME type.
pub fn object_name(file_name: &str, mime_type: &str) -> String {
    let id = Uuid::new_v4();

    match object_extension(file_name, mime_type) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn object_extension(file_name: &str, mime_type: &str) -> Option<String> {
    let from_name = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.or_else(|| {
        mime_guess::get_mime_extensions_str(mime_type.trim())
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_original_extension() {
        let name = object_name("Holiday Photo.PNG", "image/png");
        assert!(name.ends_with(".png"), "{name}");
        assert!(Uuid::parse_str(name.trim_end_matches(".png")).is_ok());
    }

    #[test]
    fn falls_back_to_mime_extension() {
        let name = object_name("blob", "video/mp4");
        assert!(name.contains('.'), "{name}");
    }

    #[test]
    fn names_are_unique() {
        assert_ne!(
            object_name("a.jpg", "image/jpeg"),
            object_name("a.jpg", "image/jpeg")
        );
    }

    #[test]
    fn rejects_path_like_extensions() {
        let name = object_name("evil.j/pg", "application/x-unknown-type");
        assert!(!name.contains('/'), "{name}");
    }
}
