use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// One child discovered while listing a directory.
///
/// Built only by a [`DirReader`](crate::reader::DirReader). Never `.` or `..`,
/// and the name never contains a NUL byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub(crate) name: OsString,
    pub(crate) kind: EntryKind,
    pub(crate) ino:  u64,
}

impl DirEntry {
    /// Build an entry for a custom [`DirReader`](crate::reader::DirReader).
    ///
    /// # Panics
    ///
    /// If `name` is not exactly one normal path component: empty, `.`, `..`,
    /// absolute, or containing a separator. Joining such a name onto its
    /// parent would leave the subtree being walked.
    pub fn new(name: impl Into<OsString>, kind: EntryKind, ino: u64) -> Self {
        let name = name.into();
        let mut parts = Path::new(&name).components();
        assert!(
            matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None)),
            "directory entry name {name:?} is not a single path component"
        );
        Self { name, kind, ino }
    }

    /// Build an entry from a decoded record, which is already known to hold
    /// a non-empty name without NUL or `/` other than `.` and `..`.
    pub(crate) fn from_raw(name: OsString, kind: EntryKind, ino: u64) -> Self {
        Self { name, kind, ino }
    }

    /// The entry's base name.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// The type reported by the directory listing. May be [`EntryKind::Unknown`].
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Inode number reported by the listing, or `0` when the reader has none.
    pub fn ino(&self) -> u64 {
        self.ino
    }
}

/// Coarse type of a directory entry, as reported without a `stat()` call.
///
/// `Unknown` means the filesystem did not fill in the type. Callers that need
/// a definite answer for such entries must query metadata themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Directory,
    SymbolicLink,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    RegularFile,
    Unknown,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }

    /// Classify a `std::fs::FileType` without following links.
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            return Self::Directory;
        }
        if ft.is_file() {
            return Self::RegularFile;
        }
        if ft.is_symlink() {
            return Self::SymbolicLink;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_char_device() {
                return Self::CharDevice;
            }
            if ft.is_block_device() {
                return Self::BlockDevice;
            }
            if ft.is_fifo() {
                return Self::Fifo;
            }
            if ft.is_socket() {
                return Self::Socket;
            }
        }
        Self::Unknown
    }
}

/// A location handed to the walk callback.
///
/// The root has depth 0 and its path is the root path as given. Every other
/// node comes from a [`DirEntry`] of its parent, joined onto the parent's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    path:  PathBuf,
    kind:  EntryKind,
    depth: usize,
}

impl Node {
    pub(crate) fn root(root: &Path, kind: EntryKind) -> Self {
        Self {
            path: root.to_path_buf(),
            kind,
            depth: 0,
        }
    }

    pub(crate) fn child(parent: &Path, entry: DirEntry, depth: usize) -> Self {
        Self {
            path: parent.join(&entry.name),
            kind: entry.kind,
            depth,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn into_path(self) -> PathBuf {
        self.path
    }

    /// The last component of the path, or the whole root path for a root
    /// such as `/` that has none.
    pub fn name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: EntryKind) {
        self.kind = kind;
    }

    /// How far below the root this node is. Root = 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Fetch full metadata for this node, without following symlinks.
    ///
    /// The walker never calls this; it exists for callbacks that need sizes,
    /// timestamps or permissions.
    pub fn metadata(&self) -> std::io::Result<std::fs::Metadata> {
        std::fs::symlink_metadata(&self.path)
    }
}
