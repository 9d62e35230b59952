use std::path::Path;

use crate::entry::{DirEntry, EntryKind};
use crate::error::Error;

/// Default batch buffer size: one filesystem block.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Smallest buffer that can hold one maximal `dirent64` record
/// (19-byte header, 255-byte name plus NUL, rounded up to 8).
pub const MIN_BUFFER_SIZE: usize = 280;

/// Largest buffer a single batched read can be asked to fill; the kernel
/// takes the count as a 32-bit unsigned int.
pub const MAX_BUFFER_SIZE: usize = u32::MAX as usize;

fn check_buffer_size(size: usize) -> Result<(), Error> {
    if (MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(Error::InvalidBufferSize(size))
    }
}

/// The operating-system primitives the walker is built on.
///
/// The walker owns one reader for the whole traversal and calls it from a
/// single thread, so implementations may keep scratch state in `&mut self`.
///
/// # Error Handling
///
/// Implementations never recover locally. Every failure is returned and the
/// walker hands it to the callback.
pub trait DirReader {
    /// List the children of directory `path` in enumeration order.
    ///
    /// `.` and `..` are never returned. A failure part-way through discards
    /// everything read so far.
    fn read_children(&mut self, path: &Path) -> Result<Vec<DirEntry>, Error>;

    /// Classify `path` without following a trailing symlink.
    fn symlink_kind(&mut self, path: &Path) -> Result<EntryKind, Error> {
        std::fs::symlink_metadata(path)
            .map(|md| EntryKind::from_file_type(md.file_type()))
            .map_err(|source| Error::Metadata {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl<R: DirReader + ?Sized> DirReader for Box<R> {
    fn read_children(&mut self, path: &Path) -> Result<Vec<DirEntry>, Error> {
        (**self).read_children(path)
    }

    fn symlink_kind(&mut self, path: &Path) -> Result<EntryKind, Error> {
        (**self).symlink_kind(path)
    }
}

/// The reader used when none is configured.
pub fn default_reader(buffer_size: usize) -> Result<Box<dyn DirReader>, Error> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(GetdentsReader::with_buffer_size(buffer_size)?))
    }
    #[cfg(not(target_os = "linux"))]
    {
        check_buffer_size(buffer_size)?;
        Ok(Box::new(StdReader))
    }
}

// ---------------------------------------------------------------------------
// GetdentsReader
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
pub use self::linux::GetdentsReader;

#[cfg(target_os = "linux")]
mod linux {
    use std::fs::{File, OpenOptions};
    use std::io;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    use tracing::trace;

    use super::{check_buffer_size, DirReader, DEFAULT_BUFFER_SIZE};
    use crate::dirent::decode_buffer;
    use crate::entry::DirEntry;
    use crate::error::Error;

    /// Lists directories with batched `getdents64(2)` calls.
    ///
    /// One buffer is allocated up front and reused for every batch of every
    /// directory read through this reader.
    #[derive(Debug)]
    pub struct GetdentsReader {
        buf: Vec<u8>,
    }

    impl Default for GetdentsReader {
        fn default() -> Self {
            Self {
                buf: vec![0; DEFAULT_BUFFER_SIZE],
            }
        }
    }

    impl GetdentsReader {
        /// Create a reader whose batch buffer is `size` bytes.
        ///
        /// # Errors
        ///
        /// [`Error::InvalidBufferSize`] if `size` is below
        /// [`MIN_BUFFER_SIZE`](super::MIN_BUFFER_SIZE), where the kernel would
        /// reject every read with `EINVAL`, or above
        /// [`MAX_BUFFER_SIZE`](super::MAX_BUFFER_SIZE).
        pub fn with_buffer_size(size: usize) -> Result<Self, Error> {
            check_buffer_size(size)?;
            Ok(Self { buf: vec![0; size] })
        }

        pub fn buffer_size(&self) -> usize {
            self.buf.len()
        }

        /// Fill the buffer with the next batch. `Ok(0)` means end of directory.
        #[allow(unsafe_code)]
        fn fill(&mut self, dir: &File) -> io::Result<usize> {
            loop {
                // SAFETY: `dir` is an open descriptor for the duration of the
                // call and `buf` is a live, writable allocation of the length
                // passed, which `with_buffer_size` keeps within `c_uint`.
                // The kernel writes at most that many bytes.
                let n = unsafe {
                    libc::syscall(
                        libc::SYS_getdents64,
                        dir.as_raw_fd(),
                        self.buf.as_mut_ptr().cast::<libc::c_void>(),
                        self.buf.len() as libc::c_uint,
                    )
                };
                if n >= 0 {
                    return Ok(n as usize);
                }
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }

    impl DirReader for GetdentsReader {
        fn read_children(&mut self, path: &Path) -> Result<Vec<DirEntry>, Error> {
            // Dropping `dir` closes the descriptor on every return below.
            let dir = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_DIRECTORY | libc::O_CLOEXEC)
                .open(path)
                .map_err(|source| Error::Open {
                    path: path.to_path_buf(),
                    source,
                })?;

            let mut entries = Vec::new();
            loop {
                let n = self.fill(&dir).map_err(|source| Error::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                if n == 0 {
                    break;
                }
                let added = decode_buffer(&self.buf[..n], &mut entries).map_err(|source| {
                    Error::Decode {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                trace!(path = %path.display(), bytes = n, entries = added, "getdents64 batch");
            }
            Ok(entries)
        }
    }
}

// ---------------------------------------------------------------------------
// StdReader
// ---------------------------------------------------------------------------

/// Portable reader over `std::fs::read_dir`.
///
/// Entry types come from `std::fs::DirEntry::file_type`. On most platforms
/// the listing answers it directly; when it does not (on unix, a `DT_UNKNOWN`
/// record) std falls back to an lstat of the entry. A failure of that lstat
/// fails the whole listing with [`Error::Read`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdReader;

impl DirReader for StdReader {
    fn read_children(&mut self, path: &Path) -> Result<Vec<DirEntry>, Error> {
        let read_err = |source| Error::Read {
            path: path.to_path_buf(),
            source,
        };

        let rd = std::fs::read_dir(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for ent in rd {
            let ent = ent.map_err(read_err)?;
            let kind = EntryKind::from_file_type(ent.file_type().map_err(read_err)?);
            entries.push(DirEntry::new(ent.file_name(), kind, ino_of(&ent)));
        }
        Ok(entries)
    }
}

#[cfg(unix)]
fn ino_of(ent: &std::fs::DirEntry) -> u64 {
    use std::os::unix::fs::DirEntryExt;
    ent.ino()
}

#[cfg(not(unix))]
fn ino_of(_ent: &std::fs::DirEntry) -> u64 {
    0
}
