//! All-or-nothing replacement of an atlas artifact set.
//!
//! Artifacts are rendered into a hidden staging directory next to their final
//! location, so every move below is a same-filesystem rename. Pages are moved
//! first and the description last: the description's timestamp is the
//! staleness watermark, so an interruption between moves leaves an older
//! description and the target is rebuilt on the next pass.

use crate::error::Result;
use crate::target::{description_path, page_file_name, page_path, DESCRIPTION_EXTENSION};
use camino::{Utf8Path, Utf8PathBuf};

pub(crate) struct Staging {
    dir: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    atlas_name: String,
    committed: bool,
}

impl Staging {
    /// Create a fresh staging directory, discarding leftovers from a crashed run.
    pub fn create(output_dir: &Utf8Path, atlas_name: &str) -> Result<Self> {
        let dir = output_dir.join(format!(".{atlas_name}.staging"));
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            output_dir: output_dir.to_path_buf(),
            atlas_name: atlas_name.to_string(),
            committed: false,
        })
    }

    /// Where page `index` is written before commit.
    pub fn page_path(&self, index: usize) -> Utf8PathBuf {
        self.dir.join(page_file_name(&self.atlas_name, index))
    }

    pub fn description_path(&self) -> Utf8PathBuf {
        self.dir
            .join(format!("{}.{DESCRIPTION_EXTENSION}", self.atlas_name))
    }

    /// Move `page_count` staged pages and the staged description into place.
    ///
    /// Pages beyond `page_count` left over from an earlier, larger build are
    /// removed once the new description is in place.
    pub fn commit(mut self, page_count: usize) -> Result<(Utf8PathBuf, Vec<Utf8PathBuf>)> {
        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let dst = page_path(&self.output_dir, &self.atlas_name, index);
            std::fs::rename(self.page_path(index), &dst)?;
            pages.push(dst);
        }

        let description = description_path(&self.output_dir, &self.atlas_name);
        std::fs::rename(self.description_path(), &description)?;
        self.committed = true;

        let mut index = page_count;
        loop {
            let obsolete = page_path(&self.output_dir, &self.atlas_name, index);
            if !obsolete.is_file() {
                break;
            }
            tracing::debug!("Removing obsolete atlas page {}", obsolete);
            std::fs::remove_file(&obsolete)?;
            index += 1;
        }

        Ok((description, pages))
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staging dir {}: {}", self.dir, e);
            }
        }
        if !self.committed {
            tracing::debug!("Discarded uncommitted atlas staging for '{}'", self.atlas_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{utf8_tempdir, write_file};

    #[test]
    fn test_commit_moves_artifacts() {
        let (_temp, root) = utf8_tempdir();
        let staging = Staging::create(&root, "game").unwrap();
        write_file(&staging.page_path(0), b"page0");
        write_file(&staging.page_path(1), b"page1");
        write_file(&staging.description_path(), b"desc");
        let staging_dir = staging.dir.clone();

        let (description, pages) = staging.commit(2).unwrap();

        assert_eq!(description, root.join("game.atlas"));
        assert_eq!(pages, vec![root.join("game.png"), root.join("game2.png")]);
        assert_eq!(std::fs::read(root.join("game2.png")).unwrap(), b"page1");
        assert!(!staging_dir.exists());
    }

    #[test]
    fn test_commit_removes_obsolete_pages() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("game2.png"), b"old");
        write_file(&root.join("game3.png"), b"old");

        let staging = Staging::create(&root, "game").unwrap();
        write_file(&staging.page_path(0), b"page0");
        write_file(&staging.description_path(), b"desc");
        staging.commit(1).unwrap();

        assert!(root.join("game.png").is_file());
        assert!(!root.join("game2.png").exists());
        assert!(!root.join("game3.png").exists());
    }

    #[test]
    fn test_drop_without_commit_leaves_output_untouched() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join("game.atlas"), b"old desc");
        write_file(&root.join("game.png"), b"old page");

        let staging = Staging::create(&root, "game").unwrap();
        write_file(&staging.page_path(0), b"new page");
        let staging_dir = staging.dir.clone();
        drop(staging);

        assert!(!staging_dir.exists());
        assert_eq!(std::fs::read(root.join("game.atlas")).unwrap(), b"old desc");
        assert_eq!(std::fs::read(root.join("game.png")).unwrap(), b"old page");
    }

    #[test]
    fn test_create_clears_leftovers() {
        let (_temp, root) = utf8_tempdir();
        write_file(&root.join(".game.staging/game.png"), b"crashed");

        let staging = Staging::create(&root, "game").unwrap();
        assert!(!staging.page_path(0).exists());
    }
}
