//! Lazy, non-caching source tree enumeration.
//!
//! [`scan`] walks a directory depth-first and yields every regular file as a
//! [`SourceFile`]. Symbolic links are followed, so a linked image or directory
//! is scanned like a real one. A link that points back at one of its ancestors,
//! a dangling link and special files yield nothing. Every call re-reads the disk;
//! nothing is memoized between scans.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Extensions that count as atlas sources when no override is configured.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A file found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    /// Text after the last `.` of the file name, or empty if there is none.
    /// A dotfile such as `.png` has extension `png`.
    pub extension: String,
    pub modified: SystemTime,
}

impl SourceFile {
    fn from_entry(entry: walkdir::DirEntry) -> Option<Self> {
        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => modified,
            Ok(Err(e)) => {
                tracing::debug!("No modified time for {}: {}", entry.path().display(), e);
                return None;
            }
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                return None;
            }
        };

        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(path) => {
                tracing::debug!("Skipping non UTF-8 path {}", path.display());
                return None;
            }
        };

        let extension = path
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map_or("", |(_, ext)| ext)
            .to_string();
        Some(Self {
            path,
            extension,
            modified,
        })
    }
}

/// Iterator returned by [`scan`].
///
/// Unreadable entries (permission errors, files deleted mid-walk, link loops)
/// are skipped.
pub struct SourceFiles {
    inner: walkdir::IntoIter,
}

impl Iterator for SourceFiles {
    type Item = SourceFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(file) = SourceFile::from_entry(entry) {
                return Some(file);
            }
        }
    }
}

/// Enumerate every regular file under `root`, depth-first.
///
/// If `root` is itself a regular file, it is the only item. Siblings are
/// visited in file-name order so repeated scans of an unchanged tree agree.
pub fn scan(root: &Utf8Path) -> SourceFiles {
    SourceFiles {
        inner: WalkDir::new(root.as_std_path())
            .follow_links(true)
            .sort_by_file_name()
            .into_iter(),
    }
}

/// [`scan`], keeping only files whose extension passes `filter`.
pub fn scan_images<'a>(
    root: &Utf8Path,
    filter: &'a ExtensionFilter,
) -> impl Iterator<Item = SourceFile> + 'a {
    scan(root).filter(move |file| filter.qualifies(file))
}

/// Set of file extensions that qualify as atlas sources.
///
/// Matching is case-sensitive: with the default set, `icon.PNG` does not qualify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extensions, with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    pub fn qualifies(&self, file: &SourceFile) -> bool {
        self.matches(&file.extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl From<Vec<String>> for ExtensionFilter {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<ExtensionFilter> for Vec<String> {
    fn from(filter: ExtensionFilter) -> Self {
        filter.extensions.into_iter().collect()
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hours_ago, set_mtime, utf8_tempdir, write_file};

    #[test]
    fn test_scan_nested_tree() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("a.png"), b"a");
        write_file(&root.join("units/b.png"), b"b");
        write_file(&root.join("units/deep/c.jpg"), b"c");
        std::fs::create_dir_all(root.join("empty")).unwrap();

        let mut names: Vec<String> = scan(&root)
            .map(|f| f.path.strip_prefix(&root).unwrap().as_str().replace('\\', "/"))
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.png", "units/b.png", "units/deep/c.jpg"]);
    }

    #[test]
    fn test_scan_file_root_yields_itself() {
        let (_temp, root) = utf8_tempdir();
        let file = root.join("single.png");
        write_file(&file, b"x");

        let files: Vec<SourceFile> = scan(&file).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, file);
        assert_eq!(files[0].extension, "png");
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let (_temp, root) = utf8_tempdir();
        assert_eq!(scan(&root.join("nope")).count(), 0);
    }

    #[test]
    fn test_scan_rereads_disk() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("a.png"), b"a");
        assert_eq!(scan(&root).count(), 1);

        write_file(&root.join("b.png"), b"b");
        assert_eq!(scan(&root).count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinks() {
        let (_temp, root) = utf8_tempdir();
        let (_elsewhere_temp, elsewhere) = utf8_tempdir();
        write_file(&elsewhere.join("real.png"), b"a");
        write_file(&elsewhere.join("units/tank.png"), b"b");
        set_mtime(&elsewhere.join("real.png"), hours_ago(5));
        let real_modified = std::fs::metadata(elsewhere.join("real.png"))
            .unwrap()
            .modified()
            .unwrap();

        std::os::unix::fs::symlink(elsewhere.join("real.png"), root.join("link.png")).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("units"), root.join("units")).unwrap();
        std::os::unix::fs::symlink(root.join("gone.png"), root.join("dangling.png")).unwrap();

        let files: Vec<SourceFile> = scan(&root).collect();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.strip_prefix(&root).unwrap().as_str().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["link.png", "units/tank.png"]);
        assert_eq!(files[0].modified, real_modified);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_link_cycle_terminates() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("sub/a.png"), b"a");
        std::os::unix::fs::symlink(&root, root.join("sub/cycle")).unwrap();

        let files: Vec<SourceFile> = scan(&root).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.file_name(), Some("a.png"));
    }

    #[test]
    fn test_extension_parsing() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("archive.tar.gz"), b"");
        write_file(&root.join("README"), b"");
        write_file(&root.join("trailing."), b"");
        write_file(&root.join(".png"), b"");

        let mut exts: Vec<String> = scan(&root).map(|f| f.extension).collect();
        exts.sort();
        assert_eq!(exts, vec!["", "", "gz", "png"]);
    }

    #[test]
    fn test_default_filter_is_case_sensitive() {
        let filter = ExtensionFilter::default();
        assert!(filter.matches("png"));
        assert!(filter.matches("jpg"));
        assert!(filter.matches("jpeg"));
        assert!(!filter.matches("PNG"));
        assert!(!filter.matches("txt"));
        assert!(!filter.matches(""));
    }

    #[test]
    fn test_filter_strips_leading_dot() {
        let filter = ExtensionFilter::new([".webp", "png", ""]);
        assert!(filter.matches("webp"));
        assert!(filter.matches("png"));
        assert_eq!(filter.iter().count(), 2);
    }

    #[test]
    fn test_scan_images_filters() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("a.png"), b"a");
        write_file(&root.join("notes.txt"), b"t");
        write_file(&root.join("b.PNG"), b"b");

        let filter = ExtensionFilter::default();
        let files: Vec<SourceFile> = scan_images(&root, &filter).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.file_name(), Some("a.png"));
    }
}
