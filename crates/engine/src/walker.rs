//! Supplies the batch driver with the files named on the command line,
//! expanding directories on demand.
//!
//! Hidden entries are left out unless asked for, and a hidden directory is
//! pruned as a whole. Symlinks met during a walk do not take part; a symlink
//! named explicitly resolves to whatever it points at. Walks visit entries in
//! file-name order, so batch output is stable across runs.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use log::warn;

use crate::error::Result;

/// How the walk treats directories and hidden entries.
#[derive(Debug, Clone, Copy)]
pub struct WalkPolicy {
    pub recurse: bool,
    pub process_hidden: bool,
}

/// What the walk found, one event per path.
#[derive(Debug)]
pub enum WalkEvent<'a> {
    /// A regular file, with its metadata already fetched.
    File {
        path: &'a Path,
        metadata: &'a Metadata,
    },
    /// A hidden entry was left out. For a directory this one event covers
    /// the whole subtree.
    SkippedHidden { path: &'a Path },
    /// A directory was named while recursion is off.
    SkippedDirectory { path: &'a Path },
    /// The path could not be read.
    ReadFailed { path: &'a Path },
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().starts_with(b"."))
}

/// Feeds every named path through `visit`. An error from the visitor aborts
/// the walk and surfaces unchanged.
pub fn walk_paths<F>(paths: &[PathBuf], policy: WalkPolicy, visit: &mut F) -> Result<()>
where
    F: FnMut(WalkEvent<'_>) -> Result<()>,
{
    for path in paths {
        if is_hidden(path) && !policy.process_hidden {
            visit(WalkEvent::SkippedHidden { path })?;
            continue;
        }
        let Ok(metadata) = fs::metadata(path) else {
            visit(WalkEvent::ReadFailed { path })?;
            continue;
        };
        if metadata.is_dir() {
            if policy.recurse {
                walk_directory(path, policy, visit)?;
            } else {
                visit(WalkEvent::SkippedDirectory { path })?;
            }
        } else if metadata.is_file() {
            visit(WalkEvent::File {
                path,
                metadata: &metadata,
            })?;
        }
        // Sockets, pipes and the like pass silently.
    }
    Ok(())
}

fn walk_directory<F>(root: &Path, policy: WalkPolicy, visit: &mut F) -> Result<()>
where
    F: FnMut(WalkEvent<'_>) -> Result<()>,
{
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    // One prefix is enough to prune a subtree: the walk is depth-first, so a
    // pruned directory's descendants arrive in one contiguous run.
    let mut pruned: Option<PathBuf> = None;

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("while walking {}: {err}", root.display());
                continue;
            }
        };
        if let Some(prefix) = &pruned {
            if entry.path().starts_with(prefix) {
                continue;
            }
            pruned = None;
        }
        if entry.depth() == 0 {
            continue;
        }
        let path = entry.path();
        if is_hidden(path) && !policy.process_hidden {
            visit(WalkEvent::SkippedHidden { path })?;
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                pruned = Some(path.to_path_buf());
            }
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            match entry.metadata() {
                Ok(metadata) => visit(WalkEvent::File {
                    path,
                    metadata: &metadata,
                })?,
                Err(_) => visit(WalkEvent::ReadFailed { path })?,
            }
        }
        // Directories descend on their own; symlinks and special files do
        // not take part.
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Eq)]
    enum Seen {
        File(PathBuf),
        Hidden(PathBuf),
        Directory(PathBuf),
        ReadFailed(PathBuf),
    }

    fn collect(paths: &[PathBuf], policy: WalkPolicy) -> Vec<Seen> {
        let mut seen = Vec::new();
        walk_paths(paths, policy, &mut |event| {
            seen.push(match event {
                WalkEvent::File { path, .. } => Seen::File(path.to_path_buf()),
                WalkEvent::SkippedHidden { path } => Seen::Hidden(path.to_path_buf()),
                WalkEvent::SkippedDirectory { path } => Seen::Directory(path.to_path_buf()),
                WalkEvent::ReadFailed { path } => Seen::ReadFailed(path.to_path_buf()),
            });
            Ok(())
        })
        .unwrap();
        seen
    }

    fn touch(path: &Path) {
        fs::write(path, b"x\n").unwrap();
    }

    // The scratch dir itself has a dot-prefixed name, which the hidden
    // check would catch, so the tree lives in a plainly named subdirectory.
    fn sample_tree() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir(&root).unwrap();
        touch(&root.join("b.txt"));
        touch(&root.join("a.txt"));
        touch(&root.join(".hidden.txt"));
        fs::create_dir(root.join("sub")).unwrap();
        touch(&root.join("sub").join("c.txt"));
        fs::create_dir(root.join(".hiddendir")).unwrap();
        touch(&root.join(".hiddendir").join("d.txt"));
        (dir, root)
    }

    #[test]
    fn recursive_walk_is_sorted_and_prunes_hidden_subtrees() {
        let (_dir, root) = sample_tree();
        let seen = collect(
            &[root.clone()],
            WalkPolicy {
                recurse: true,
                process_hidden: false,
            },
        );
        assert_eq!(
            seen,
            vec![
                Seen::Hidden(root.join(".hidden.txt")),
                Seen::Hidden(root.join(".hiddendir")),
                Seen::File(root.join("a.txt")),
                Seen::File(root.join("b.txt")),
                Seen::File(root.join("sub").join("c.txt")),
            ]
        );
    }

    #[test]
    fn hidden_entries_take_part_when_asked() {
        let (_dir, root) = sample_tree();
        let seen = collect(
            &[root.clone()],
            WalkPolicy {
                recurse: true,
                process_hidden: true,
            },
        );
        assert_eq!(
            seen,
            vec![
                Seen::File(root.join(".hidden.txt")),
                Seen::File(root.join(".hiddendir").join("d.txt")),
                Seen::File(root.join("a.txt")),
                Seen::File(root.join("b.txt")),
                Seen::File(root.join("sub").join("c.txt")),
            ]
        );
    }

    #[test]
    fn directories_are_skipped_without_recursion() {
        let (_dir, root) = sample_tree();
        let seen = collect(
            &[root.clone()],
            WalkPolicy {
                recurse: false,
                process_hidden: false,
            },
        );
        assert_eq!(seen, vec![Seen::Directory(root)]);
    }

    #[test]
    fn explicit_paths_are_classified_one_by_one() {
        let (_dir, root) = sample_tree();
        let seen = collect(
            &[
                root.join("a.txt"),
                root.join(".hidden.txt"),
                root.join("missing.txt"),
            ],
            WalkPolicy {
                recurse: false,
                process_hidden: false,
            },
        );
        assert_eq!(
            seen,
            vec![
                Seen::File(root.join("a.txt")),
                Seen::Hidden(root.join(".hidden.txt")),
                Seen::ReadFailed(root.join("missing.txt")),
            ]
        );
    }

    #[test]
    fn dot_and_dot_dot_are_not_hidden() {
        assert!(!is_hidden(Path::new(".")));
        assert!(!is_hidden(Path::new("..")));
        assert!(!is_hidden(Path::new("./")));
        assert!(is_hidden(Path::new(".git")));
        assert!(is_hidden(Path::new("dir/.env")));
        assert!(!is_hidden(Path::new("dir.d/plain")));
    }

    #[test]
    fn a_visitor_error_aborts_the_walk() {
        let (_dir, root) = sample_tree();
        let mut calls = 0;
        let result = walk_paths(
            &[root.join("a.txt"), root.join("b.txt")],
            WalkPolicy {
                recurse: false,
                process_hidden: false,
            },
            &mut |_| {
                calls += 1;
                Err(EngineError::StrandedTempFile {
                    original: root.join("a.txt"),
                    temp: root.join(".tmp_endings1"),
                })
            },
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
