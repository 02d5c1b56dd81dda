use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::{GenericImageView, ImageFormat};
use tracing::warn;

use crate::config::load_config;

// Chosen once on first call
use std::sync::{Once, OnceLock};
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_PRUNE_ONCE: Once = Once::new();

const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let cfg = load_config();
            let mut path = PathBuf::from(
                cfg.cache_dir.clone().unwrap_or_else(|| ".cinefind_cache".into()),
            );

            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create cache dir {}: {e}", path.display());
                // Fall back to local folder if creation failed
                path = PathBuf::from(".cinefind_cache");
                let _ = fs::create_dir_all(&path);
            }
            path
        })
        .clone()
}

pub fn poster_cache_dir() -> PathBuf {
    let dir = POSTER_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("posters");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create poster cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    POSTER_PRUNE_ONCE.call_once({
        let path = dir.clone();
        move || {
            if let Err(err) = prune_poster_cache_in_dir(&path) {
                warn!("poster cache prune failed: {err}");
            }
        }
    });

    dir.clone()
}

fn prune_poster_cache_if_needed() -> std::io::Result<usize> {
    let dir = poster_cache_dir();
    prune_poster_cache_in_dir(&dir)
}

fn prune_poster_cache_in_dir(dir: &Path) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(POSTER_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if !matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp") {
                continue;
            }
        } else {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// Decode an image file into (width, height, RGBA8 bytes).
pub fn load_rgba_image(path: &str) -> Result<(u32, u32, Vec<u8>), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err("not found".into());
    }
    let img = image::ImageReader::open(p)
        .map_err(|e| format!("open image {}: {e}", p.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", p.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", p.display()))?;
    let (w, h) = img.dimensions();
    let rgba = img.to_rgba8().to_vec();
    Ok((w, h, rgba))
}

pub fn find_any_by_key(key: &str) -> Option<PathBuf> {
    find_any_by_key_in(&poster_cache_dir(), key)
}

fn find_any_by_key_in(dir: &Path, key: &str) -> Option<PathBuf> {
    let candidates = [
        format!("{}.jpg", key),
        format!("{}.png", key),
        format!("{}.jpeg", key),
        format!("{}.webp", key),
    ];
    for c in candidates {
        let p = dir.join(c);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

/// Download, normalize to PNG and store in cache. Returns the stored path.
pub fn download_and_store(
    client: &reqwest::blocking::Client,
    url: &str,
    key: &str,
) -> Result<PathBuf, String> {
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {url}: {e}"))?;

    let out = poster_cache_dir().join(format!("{key}.png"));
    let mut png_bytes: Vec<u8> = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| format!("encode png: {e}"))?;
    write_atomic(&out, &png_bytes)?;
    let _ = prune_poster_cache_if_needed();
    Ok(out)
}

/// Download an image, resize to `max_width` (keeping aspect), and store as JPEG
/// with `quality`. Falls back to `download_and_store` when decode fails upstream.
/// Writes `<poster_cache_dir>/<key>.jpg`.
pub fn download_and_store_resized(
    client: &reqwest::blocking::Client,
    url: &str,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    use image::{imageops::FilterType, DynamicImage};

    let dest = poster_cache_dir().join(format!("{key}.jpg"));

    // If already present, return immediately.
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;

    let img = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(_) => {
            return download_and_store(client, url, key);
        }
    };

    // Resize if needed, keep aspect
    let (w, h) = img.dimensions();
    let out: DynamicImage = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
        encoder
            .encode_image(&out)
            .map_err(|e| format!("jpeg encode: {e}"))?;
    }

    write_atomic(&dest, &jpeg_bytes)?;
    let _ = prune_poster_cache_if_needed();
    Ok(dest)
}

fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = dest.with_extension("part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, dest).map_err(|e| format!("rename: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cache_key_is_stable_md5_hex() {
        let k = url_to_cache_key("https://cdn.example.com/poster.jpg");
        assert_eq!(k.len(), 32);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(k, url_to_cache_key("https://cdn.example.com/poster.jpg"));
        assert_ne!(k, url_to_cache_key("https://cdn.example.com/other.jpg"));
    }

    #[test]
    fn finds_cached_file_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let key = "abc123";
        fs::write(dir.path().join("abc123.jpg"), b"x").unwrap();
        let found = find_any_by_key_in(dir.path(), key).unwrap();
        assert!(found.ends_with("abc123.jpg"));
        assert!(find_any_by_key_in(dir.path(), "missing").is_none());
    }

    #[test]
    fn prune_keeps_fresh_files_and_skips_foreign_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let removed = prune_poster_cache_in_dir(dir.path()).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn atomic_write_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("p.jpg");
        write_atomic(&dest, b"bytes").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"bytes");
        assert!(!dir.path().join("p.part").exists());
    }
}
