//! Candidate photo storage.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use unicode_normalization::UnicodeNormalization;

const FALLBACK_NAME: &str = "upload";
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`.
///
/// Accents are decomposed and dropped, whitespace becomes `_`, and dots or
/// underscores at either end are stripped, so the result never names a
/// hidden file or a parent directory.
pub fn sanitize_filename(original: &str) -> String {
    // Browsers on Windows may send the full client path.
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);

    let mut out = String::with_capacity(base.len());
    for ch in base.nfkd() {
        if !ch.is_ascii() {
            continue;
        }
        if ch.is_whitespace() {
            out.push('_');
        } else if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        }
    }

    let trimmed = out.trim_matches(['.', '_']);
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name under which an upload received at `now` is stored.
pub(crate) fn stored_name(original: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}",
        now.format("%Y%m%d%H%M%S"),
        sanitize_filename(original)
    )
}

/// `name` with `_<attempt>` before its extension; attempt 0 is `name` itself.
fn numbered(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{attempt}.{ext}"),
        _ => format!("{name}_{attempt}"),
    }
}

/// Write an uploaded photo, returning its stored name.
///
/// Every upload gets a file of its own: an existing file is never
/// overwritten, a numbered name is picked instead.
pub(crate) async fn store(dir: &Path, original: &str, bytes: &[u8]) -> std::io::Result<String> {
    tokio::fs::create_dir_all(dir).await?;
    let base = stored_name(original, Utc::now());

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = numbered(&base, attempt);
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
            .await;
        match opened {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                return Ok(name);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free upload name for {base}"),
    ))
}

/// Delete a stored photo. Failures are logged, never returned.
pub(crate) async fn remove(dir: &Path, name: &str) {
    let Some(path) = resolve(dir, name) else {
        tracing::warn!("refusing to remove photo with unexpected name {name:?}");
        return;
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!("removed photo {}", path.display()),
        Err(err) => tracing::warn!("could not remove photo {}: {err}", path.display()),
    }
}

/// Public URL of a stored photo.
pub(crate) fn photo_url(name: &str) -> String {
    format!("/static/uploads/{name}")
}

/// Stored names can be edited by hand in the database; only plain file names
/// inside the uploads directory are honored.
fn resolve(dir: &Path, name: &str) -> Option<PathBuf> {
    let file_name = Path::new(name).file_name()?;
    if file_name != name || name.starts_with('.') {
        return None;
    }
    Some(dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename("My Photo (1).JPG"), "My_Photo_1.JPG");
        assert_eq!(sanitize_filename("Ré sumé.png"), "Re_sume.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\face.jpg"), "face.jpg");
        assert_eq!(sanitize_filename("._hidden_."), "hidden");
        assert_eq!(sanitize_filename("照片"), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn stored_name_has_timestamp_prefix() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(stored_name("a b.png", now), "20260304050607_a_b.png");
    }

    #[test]
    fn numbered_names_keep_the_extension() {
        assert_eq!(numbered("20260304050607_a.png", 0), "20260304050607_a.png");
        assert_eq!(numbered("20260304050607_a.png", 2), "20260304050607_a_2.png");
        assert_eq!(numbered("20260304050607_upload", 1), "20260304050607_upload_1");
    }

    #[tokio::test]
    async fn same_name_uploads_never_share_a_file() {
        let dir = std::env::temp_dir().join(format!(
            "ballotbox-uploads-collide-{}",
            std::process::id()
        ));
        let first = store(&dir, "photo.jpg", b"candidate-a").await.unwrap();
        let second = store(&dir, "photo.jpg", b"candidate-b").await.unwrap();
        let third = store(&dir, "photo.jpg", b"candidate-c").await.unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
        assert_eq!(std::fs::read(dir.join(&first)).unwrap(), b"candidate-a");
        assert_eq!(std::fs::read(dir.join(&second)).unwrap(), b"candidate-b");
        assert_eq!(std::fs::read(dir.join(&third)).unwrap(), b"candidate-c");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn only_plain_names_resolve() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            resolve(dir, "x.png"),
            Some(PathBuf::from("/srv/uploads/x.png"))
        );
        assert_eq!(resolve(dir, "../x.png"), None);
        assert_eq!(resolve(dir, "a/x.png"), None);
        assert_eq!(resolve(dir, ".."), None);
    }

    #[tokio::test]
    async fn store_and_remove() {
        let dir = std::env::temp_dir().join(format!("ballotbox-uploads-{}", std::process::id()));
        let name = store(&dir, "face.png", b"png").await.unwrap();
        assert!(name.ends_with("_face.png"));
        assert!(dir.join(&name).exists());

        remove(&dir, &name).await;
        assert!(!dir.join(&name).exists());
        // second removal only logs
        remove(&dir, &name).await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
