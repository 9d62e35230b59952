use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, trace};

use crate::entry::{DirEntry, EntryKind, Node};
use crate::error::Error;
use crate::reader::DirReader;
use crate::results::WalkStats;

// ---------------------------------------------------------------------------
// WalkControl
// ---------------------------------------------------------------------------

/// What the callback wants the walker to do next.
#[derive(Debug, PartialEq, Eq)]
pub enum WalkControl<E> {
    /// Keep going. For a directory, descend into it if it was listed.
    Continue,

    /// On a directory: do not descend into it. On anything else: skip the
    /// remaining entries of its parent directory.
    SkipSubtree,

    /// Stop the whole walk; `E` becomes the walk's result.
    Abort(E),
}

impl<E> From<Result<(), E>> for WalkControl<E> {
    fn from(r: Result<(), E>) -> Self {
        match r {
            Ok(())   => Self::Continue,
            Err(err) => Self::Abort(err),
        }
    }
}

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters passed from the builder to the engine.
pub(crate) struct WalkConfig {
    pub max_depth:       Option<usize>,
    pub resolve_unknown: bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// A directory whose children are still being visited.
struct Frame {
    path:     PathBuf,
    depth:    usize,
    children: std::vec::IntoIter<DirEntry>,
}

/// How a directory visit ended, from its parent's point of view.
enum DirOutcome {
    /// Listed and the callback said continue: its children come next.
    Descend(Frame),
    /// Not descended into; carry on with its siblings.
    Done,
}

/// Walk the tree under `root` depth-first, calling `f` once per node.
///
/// Traversal state lives on an explicit heap stack, so deep trees cannot
/// overflow the thread stack. Ordering is parent before children, siblings
/// in the reader's enumeration order.
pub(crate) fn run<R, F, E>(
    root: &Path,
    reader: &mut R,
    config: &WalkConfig,
    mut f: F,
) -> Result<WalkStats, E>
where
    R: DirReader + ?Sized,
    F: FnMut(&Path, Option<&Node>, Option<Error>) -> WalkControl<E>,
{
    let start = Instant::now();
    let mut stats = WalkStats::default();

    let result = walk_root(root, reader, config, &mut f, &mut stats);

    stats.duration = start.elapsed();
    debug!(
        root = %root.display(),
        files = stats.files,
        dirs = stats.dirs,
        read_errors = stats.read_errors,
        elapsed_ms = stats.duration.as_millis() as u64,
        aborted = result.is_err(),
        "walk finished"
    );
    result.map(|()| stats)
}

fn walk_root<R, F, E>(
    root: &Path,
    reader: &mut R,
    config: &WalkConfig,
    f: &mut F,
    stats: &mut WalkStats,
) -> Result<(), E>
where
    R: DirReader + ?Sized,
    F: FnMut(&Path, Option<&Node>, Option<Error>) -> WalkControl<E>,
{
    let kind = match reader.symlink_kind(root) {
        Ok(kind) => kind,
        Err(err) => {
            stats.read_errors += 1;
            return match f(root, None, Some(err)) {
                WalkControl::Abort(e) => Err(e),
                // SkipSubtree at the top level means success too.
                WalkControl::Continue | WalkControl::SkipSubtree => Ok(()),
            };
        }
    };

    let node = Node::root(root, kind);
    let mut stack = Vec::new();

    if node.is_dir() {
        match visit_dir(node, reader, config, f, stats)? {
            DirOutcome::Descend(frame) => stack.push(frame),
            DirOutcome::Done => return Ok(()),
        }
    } else {
        stats.files += 1;
        return match f(root, Some(&node), None) {
            WalkControl::Abort(e) => Err(e),
            WalkControl::Continue | WalkControl::SkipSubtree => Ok(()),
        };
    }

    while let Some(top) = stack.last_mut() {
        let Some(entry) = top.children.next() else {
            stack.pop();
            continue;
        };

        let mut node = Node::child(&top.path, entry, top.depth + 1);
        let resolve_err = resolve(&mut node, reader, config);
        if resolve_err.is_some() {
            stats.read_errors += 1;
        }

        if !node.is_dir() {
            stats.files += 1;
            match f(node.path(), Some(&node), resolve_err) {
                WalkControl::Continue => {}
                WalkControl::SkipSubtree => {
                    // Skip the rest of this directory. Its parent treats the
                    // signal as "skip this subdirectory" and moves on.
                    trace!(path = %node.path().display(), "skipping remaining siblings");
                    stack.pop();
                }
                WalkControl::Abort(e) => return Err(e),
            }
            continue;
        }

        match visit_dir(node, reader, config, f, stats)? {
            DirOutcome::Descend(frame) => stack.push(frame),
            DirOutcome::Done => {}
        }
    }

    Ok(())
}

/// List a directory, report it to the callback, and decide whether to descend.
///
/// A listing failure is handed to the callback and never descended into,
/// whatever the callback answers.
fn visit_dir<R, F, E>(
    node: Node,
    reader: &mut R,
    config: &WalkConfig,
    f: &mut F,
    stats: &mut WalkStats,
) -> Result<DirOutcome, E>
where
    R: DirReader + ?Sized,
    F: FnMut(&Path, Option<&Node>, Option<Error>) -> WalkControl<E>,
{
    stats.dirs += 1;
    let path = node.path();

    let at_limit = config.max_depth.is_some_and(|max| node.depth() >= max);
    let listing = if at_limit {
        Ok(Vec::new())
    } else {
        reader.read_children(path)
    };

    let (children, read_err) = match listing {
        Ok(children) => {
            debug!(path = %path.display(), entries = children.len(), "listed directory");
            (Some(children), None)
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "directory listing failed");
            stats.read_errors += 1;
            (None, Some(err))
        }
    };

    match f(path, Some(&node), read_err) {
        WalkControl::Abort(e) => Err(e),
        WalkControl::SkipSubtree => {
            trace!(path = %path.display(), "skipping subtree");
            Ok(DirOutcome::Done)
        }
        WalkControl::Continue => match children {
            Some(children) if !at_limit => Ok(DirOutcome::Descend(Frame {
                depth: node.depth(),
                path: node.into_path(),
                children: children.into_iter(),
            })),
            _ => Ok(DirOutcome::Done),
        },
    }
}

/// Replace an `Unknown` kind with an lstat result when configured to.
///
/// If the lstat fails the node stays `Unknown`, is visited as a
/// non-directory, and the error is returned for the callback.
fn resolve<R: DirReader + ?Sized>(
    node: &mut Node,
    reader: &mut R,
    config: &WalkConfig,
) -> Option<Error> {
    if !config.resolve_unknown || node.kind() != EntryKind::Unknown {
        return None;
    }
    match reader.symlink_kind(node.path()) {
        Ok(kind) => {
            node.set_kind(kind);
            None
        }
        Err(err) => {
            debug!(path = %node.path().display(), error = %err, "cannot resolve entry type");
            Some(err)
        }
    }
}
