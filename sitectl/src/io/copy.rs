//! Filesystem copy steps of the build.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Copy a single file, creating the destination's parent directory.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::copy(src, dest)
        .with_context(|| format!("copy {} to {}", src.display(), dest.display()))
}

/// Copy every entry of `src_dir` into `dest_dir`, recursively.
///
/// Existing contents of `dest_dir` are kept; files with the same relative
/// path are overwritten. Symlinks are followed, so a linked directory is
/// copied as a real one; a link cycle is an error. Returns the number of
/// files copied.
#[instrument(skip_all, fields(src = %src_dir.display(), dest = %dest_dir.display()))]
pub fn merge_dir_into(src_dir: &Path, dest_dir: &Path) -> Result<usize> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("create directory {}", dest_dir.display()))?;

    let mut copied = 0;
    for entry in WalkDir::new(src_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("read directory {}", src_dir.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .with_context(|| format!("entry outside {}", src_dir.display()))?;
        let dest = dest_dir.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("create directory {}", dest.display()))?;
        } else {
            copy_file(entry.path(), &dest)?;
            copied += 1;
        }
    }

    debug!(copied, "merged directory");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_file_creates_parent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("a.wasm");
        fs::write(&src, b"\0asm").expect("write");
        let dest = temp.path().join("out/nested/b.wasm");

        copy_file(&src, &dest).expect("copy");
        assert_eq!(fs::read(&dest).expect("read"), b"\0asm");
    }

    #[test]
    fn copy_file_names_missing_source() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = copy_file(&temp.path().join("nope.wasm"), &temp.path().join("x")).unwrap_err();
        assert!(err.to_string().contains("nope.wasm"));
    }

    #[test]
    fn merge_copies_nested_entries_and_keeps_existing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("static");
        let dest = temp.path().join("public");
        fs::create_dir_all(src.join("img/icons")).expect("mkdir");
        fs::write(src.join("index.html"), "new index").expect("write");
        fs::write(src.join("img/icons/logo.svg"), "<svg/>").expect("write");
        fs::create_dir_all(&dest).expect("mkdir");
        fs::write(dest.join("index.html"), "old index").expect("write");
        fs::write(dest.join("caniuse_rs.js"), "bundle").expect("write");

        let copied = merge_dir_into(&src, &dest).expect("merge");

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(dest.join("index.html")).expect("read"),
            "new index"
        );
        assert!(dest.join("img/icons/logo.svg").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("caniuse_rs.js")).expect("read"),
            "bundle"
        );
    }

    #[test]
    fn merge_copies_empty_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("static");
        fs::create_dir_all(src.join("fonts")).expect("mkdir");
        let dest = temp.path().join("public");

        let copied = merge_dir_into(&src, &dest).expect("merge");
        assert_eq!(copied, 0);
        assert!(dest.join("fonts").is_dir());
    }

    #[test]
    fn merge_missing_source_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = merge_dir_into(&temp.path().join("static"), &temp.path().join("public"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("static"));
    }

    #[cfg(unix)]
    #[test]
    fn merge_follows_directory_symlinks() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().expect("tempdir");
        let shared = temp.path().join("shared-assets");
        fs::create_dir_all(shared.join("fonts")).expect("mkdir");
        fs::write(shared.join("fonts/mono.woff2"), "font").expect("write");
        let src = temp.path().join("static");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(src.join("index.html"), "index").expect("write");
        symlink(&shared, src.join("assets")).expect("symlink");
        let dest = temp.path().join("public");

        let copied = merge_dir_into(&src, &dest).expect("merge");

        assert_eq!(copied, 2);
        assert!(dest.join("assets").is_dir());
        assert!(!dest.join("assets").is_symlink());
        assert_eq!(
            fs::read_to_string(dest.join("assets/fonts/mono.woff2")).expect("read"),
            "font"
        );
    }

    #[cfg(unix)]
    #[test]
    fn merge_rejects_symlink_cycles() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("static");
        fs::create_dir_all(src.join("docs")).expect("mkdir");
        symlink(&src, src.join("docs/up")).expect("symlink");

        let err = merge_dir_into(&src, &temp.path().join("public")).unwrap_err();
        assert!(format!("{err:#}").contains("static"));
    }
}
