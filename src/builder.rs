use std::path::{Path, PathBuf};

use crate::engine::{run, WalkConfig, WalkControl};
use crate::entry::Node;
use crate::error::Error;
use crate::reader::{default_reader, DirReader, DEFAULT_BUFFER_SIZE};
use crate::results::WalkStats;

// ---------------------------------------------------------------------------
// WalkBuilder
// ---------------------------------------------------------------------------

/// Configures and runs a walk.
///
/// Created via [`WalkBuilder::new`]. Configure with chained builder methods,
/// then call [`run()`](WalkBuilder::run) with the callback.
///
/// # Example
///
/// ```rust,no_run
/// use fastwalk::{WalkBuilder, WalkControl};
///
/// let stats = WalkBuilder::new("/usr/share")
///     .buffer_size(32 * 1024)
///     .max_depth(3)
///     .run(|path, node, err| {
///         match (node, err) {
///             (_, Some(err)) => eprintln!("skipped: {err}"),
///             (Some(node), None) if !node.is_dir() => println!("{}", path.display()),
///             _ => {}
///         }
///         WalkControl::<fastwalk::Error>::Continue
///     })
///     .unwrap();
///
/// println!("{} files in {:.3}s", stats.files, stats.duration.as_secs_f64());
/// ```
pub struct WalkBuilder {
    root:            PathBuf,
    reader:          Option<Box<dyn DirReader>>,
    buffer_size:     usize,
    max_depth:       Option<usize>,
    resolve_unknown: bool,
}

impl WalkBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root:            root.as_ref().to_path_buf(),
            reader:          None,
            buffer_size:     DEFAULT_BUFFER_SIZE,
            max_depth:       None,
            resolve_unknown: false,
        }
    }

    // ── Reader ────────────────────────────────────────────────────────────

    /// Size in bytes of the buffer each batched directory read fills.
    ///
    /// Defaults to 4096. Larger buffers mean fewer system calls on big
    /// directories. Ignored when a custom [`reader`](Self::reader) is set.
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    /// Replace the platform directory reader.
    pub fn reader(mut self, r: impl DirReader + 'static) -> Self {
        self.reader = Some(Box::new(r));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Maximum traversal depth. `0` means the root only, `1` means one
    /// level of children, and so on. Directories at the limit are still
    /// visited but not listed. Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// lstat entries whose listing reported no type.
    ///
    /// Off by default: such entries are visited as [`EntryKind::Unknown`]
    /// and never descended into. Turn this on for filesystems that leave
    /// `d_type` empty.
    ///
    /// When the lstat fails the entry is still visited as `Unknown`, and the
    /// callback receives the failure as its `err` argument.
    ///
    /// [`EntryKind::Unknown`]: crate::EntryKind::Unknown
    pub fn resolve_unknown(mut self, yes: bool) -> Self {
        self.resolve_unknown = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Walk the tree, calling `f` for every node including the root.
    ///
    /// Blocks until the walk completes or `f` aborts it.
    ///
    /// # Errors
    ///
    /// Returns the value of the first [`WalkControl::Abort`]. An invalid
    /// [`buffer_size`](Self::buffer_size) is reported like any other
    /// failure: `f` receives it with the root path and no node, and its
    /// answer is the result.
    pub fn run<F, E>(self, mut f: F) -> Result<WalkStats, E>
    where
        F: FnMut(&Path, Option<&Node>, Option<Error>) -> WalkControl<E>,
    {
        let mut reader = match self.reader {
            Some(r) => r,
            None => match default_reader(self.buffer_size) {
                Ok(r) => r,
                Err(err) => {
                    return match f(&self.root, None, Some(err)) {
                        WalkControl::Abort(e) => Err(e),
                        _ => Ok(WalkStats::default()),
                    };
                }
            },
        };

        let config = WalkConfig {
            max_depth:       self.max_depth,
            resolve_unknown: self.resolve_unknown,
        };

        run(&self.root, &mut reader, &config, f)
    }
}

// ---------------------------------------------------------------------------
// walk()
// ---------------------------------------------------------------------------

/// Walk `root` with default options.
///
/// `f` is called for every node, root included, as `f(path, node, err)`:
///
/// - `node` is `None` only when the root itself could not be stat'ed.
/// - `err` is set when the root could not be stat'ed, a directory could
///   not be listed, or (with [`WalkBuilder::resolve_unknown`]) an entry of
///   unknown type could not be stat'ed. A directory that failed to list is
///   never descended into.
///
/// The walk's result is the first [`WalkControl::Abort`] value, or `Ok(())`.
/// [`WalkControl::SkipSubtree`] never escapes as an error.
///
/// Siblings are visited in the order the filesystem lists them, not sorted.
/// Symbolic links are reported but never followed.
pub fn walk<P, F, E>(root: P, f: F) -> Result<(), E>
where
    P: AsRef<Path>,
    F: FnMut(&Path, Option<&Node>, Option<Error>) -> WalkControl<E>,
{
    WalkBuilder::new(root).run(f).map(|_| ())
}
