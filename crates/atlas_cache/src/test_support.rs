//! Shared helpers for unit tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub(crate) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, path)
}

pub(crate) fn write_file(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub(crate) fn write_png(path: &Utf8Path, width: u32, height: u32, color: [u8; 4]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

pub(crate) fn set_mtime(path: &Utf8Path, time: SystemTime) {
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

pub(crate) fn hours_ago(hours: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(hours * 3600)
}
