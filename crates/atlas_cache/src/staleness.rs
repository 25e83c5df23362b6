//! Decides whether a target's atlas must be rebuilt.
//!
//! The description file's modification time is the watermark. A target is
//! stale when its artifacts are missing, or when any qualifying source image was
//! modified strictly after the watermark. The check short-circuits on the first
//! newer file, so an outdated atlas usually costs a partial scan only.

use crate::error::{Error, Result};
use crate::scanner::{scan_images, ExtensionFilter};
use crate::target::BuildTarget;
use camino::Utf8PathBuf;

/// Verdict of [`check_staleness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// The description or the image file does not exist.
    MissingOutput,
    /// `newest` is a qualifying source modified after the atlas.
    Outdated { newest: Utf8PathBuf },
    /// Every qualifying source is at or before the watermark.
    Fresh,
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

/// Check a target and report why it is or is not stale.
///
/// Fails with [`Error::MissingSourceDir`] when the artifacts exist but the
/// source directory does not: a vanished source is never treated as fresh.
pub fn check_staleness(target: &BuildTarget, extensions: &ExtensionFilter) -> Result<Staleness> {
    let Some(output) = target.existing_output()? else {
        return Ok(Staleness::MissingOutput);
    };

    if !target.source_dir().exists() {
        return Err(Error::MissingSourceDir(target.source_dir().to_path_buf()));
    }

    let watermark = output.modified;
    let newer = scan_images(target.source_dir(), extensions).find(|file| file.modified > watermark);

    Ok(match newer {
        Some(file) => Staleness::Outdated { newest: file.path },
        None => Staleness::Fresh,
    })
}

/// `true` if the target's atlas is missing or older than one of its sources.
pub fn is_stale(target: &BuildTarget, extensions: &ExtensionFilter) -> Result<bool> {
    Ok(check_staleness(target, extensions)?.is_stale())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hours_ago, set_mtime, utf8_tempdir, write_file};
    use camino::Utf8Path;
    use std::time::SystemTime;

    /// Target at `<root>` with sources in `<root>/Images` and an atlas stamped `at`.
    fn built_target(root: &Utf8Path, at: SystemTime) -> BuildTarget {
        let target = BuildTarget::new("base", root.join("Images"), root.to_path_buf(), "game");
        std::fs::create_dir_all(target.source_dir()).unwrap();
        write_file(&target.description_path(), b"game.png\n");
        write_file(&target.image_path(), b"");
        set_mtime(&target.description_path(), at);
        set_mtime(&target.image_path(), at);
        target
    }

    fn add_source(target: &BuildTarget, name: &str, at: SystemTime) {
        let path = target.source_dir().join(name);
        write_file(&path, b"img");
        set_mtime(&path, at);
    }

    #[test]
    fn test_missing_output_is_stale_even_when_empty() {
        let (_temp, root) = utf8_tempdir();
        let target = BuildTarget::new("base", root.join("Images"), root.clone(), "game");
        std::fs::create_dir_all(target.source_dir()).unwrap();

        assert_eq!(
            check_staleness(&target, &ExtensionFilter::default()).unwrap(),
            Staleness::MissingOutput
        );
        assert!(is_stale(&target, &ExtensionFilter::default()).unwrap());
    }

    #[test]
    fn test_missing_output_ignores_missing_source() {
        let (_temp, root) = utf8_tempdir();
        let target = BuildTarget::new("base", root.join("Images"), root.clone(), "game");
        assert!(is_stale(&target, &ExtensionFilter::default()).unwrap());
    }

    #[test]
    fn test_empty_source_with_atlas_is_fresh() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(1));
        assert!(!is_stale(&target, &ExtensionFilter::default()).unwrap());
    }

    #[test]
    fn test_older_sources_are_fresh() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(1));
        add_source(&target, "a.png", hours_ago(5));
        add_source(&target, "units/b.jpg", hours_ago(3));

        assert_eq!(
            check_staleness(&target, &ExtensionFilter::default()).unwrap(),
            Staleness::Fresh
        );
    }

    #[test]
    fn test_touched_image_invalidates() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(2));
        add_source(&target, "a.png", hours_ago(5));
        add_source(&target, "units/deep/b.jpeg", hours_ago(1));

        let verdict = check_staleness(&target, &ExtensionFilter::default()).unwrap();
        assert_eq!(
            verdict,
            Staleness::Outdated {
                newest: target.source_dir().join("units/deep/b.jpeg")
            }
        );
    }

    #[test]
    fn test_touched_text_file_does_not_invalidate() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(2));
        add_source(&target, "a.png", hours_ago(5));
        add_source(&target, "notes.txt", hours_ago(1));

        assert!(!is_stale(&target, &ExtensionFilter::default()).unwrap());
    }

    #[test]
    fn test_uppercase_extension_does_not_invalidate() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(2));
        add_source(&target, "Icon.PNG", hours_ago(1));

        assert!(!is_stale(&target, &ExtensionFilter::default()).unwrap());
        assert!(is_stale(&target, &ExtensionFilter::new(["PNG"])).unwrap());
    }

    #[test]
    fn test_equal_timestamp_is_not_newer() {
        let (_temp, root) = utf8_tempdir();
        let at = hours_ago(2);
        let target = built_target(&root, at);
        add_source(&target, "a.png", at);

        assert!(!is_stale(&target, &ExtensionFilter::default()).unwrap());
    }

    #[test]
    fn test_vanished_source_is_an_error() {
        let (_temp, root) = utf8_tempdir();
        let target = built_target(&root, hours_ago(1));
        std::fs::remove_dir_all(target.source_dir()).unwrap();

        let result = check_staleness(&target, &ExtensionFilter::default());
        assert!(matches!(result, Err(Error::MissingSourceDir(_))));
    }
}
