//! # fastwalk
//!
//! Fast depth-first directory walker — batched dirent reads, no per-entry stat.
//!
//! fastwalk visits every entry under a root path and calls your callback once
//! per entry. On Linux each directory is listed with a handful of
//! `getdents64(2)` calls into a reusable buffer, and the type of every child
//! comes straight from that listing. Nothing is stat'ed except the root.
//!
//! It does **not** sort siblings, follow symlinks, walk in parallel, or
//! collect full metadata — call [`Node::metadata`] when you need it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fastwalk::WalkControl;
//!
//! let mut files = 0;
//! fastwalk::walk("/etc", |_path, node, err| {
//!     if let Some(err) = err {
//!         return WalkControl::Abort(err);
//!     }
//!     if node.is_some_and(|n| !n.is_dir()) {
//!         files += 1;
//!     }
//!     WalkControl::Continue
//! })
//! .unwrap();
//!
//! println!("{files} files");
//! ```
//!
//! # Controlling the walk
//!
//! The callback answers with a [`WalkControl`]:
//!
//! - [`Continue`](WalkControl::Continue) — keep going.
//! - [`SkipSubtree`](WalkControl::SkipSubtree) — on a directory, do not
//!   descend into it; on anything else, skip the rest of its directory.
//! - [`Abort`](WalkControl::Abort) — stop, and make the walk return that value.
//!
//! ```rust,no_run
//! use fastwalk::{WalkBuilder, WalkControl};
//!
//! WalkBuilder::new(".")
//!     .buffer_size(64 * 1024)
//!     .run(|path, node, _err| {
//!         match node {
//!             Some(n) if n.is_dir() && n.name() == ".git" => WalkControl::SkipSubtree,
//!             _ => {
//!                 println!("{}", path.display());
//!                 WalkControl::<std::io::Error>::Continue
//!             }
//!         }
//!     })
//!     .unwrap();
//! ```
//!
//! # Custom readers
//!
//! Implement [`DirReader`] to walk through anything that can list a
//! directory — the default is [`GetdentsReader`] on Linux and
//! [`StdReader`] elsewhere.

#![deny(unsafe_code)]

#[cfg(target_os = "linux")]
pub mod dirent;
pub mod reader;

mod builder;
mod engine;
mod entry;
mod error;
mod results;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{walk, WalkBuilder};
pub use engine::WalkControl;
pub use entry::{DirEntry, EntryKind, Node};
pub use error::{DecodeError, Error};
#[cfg(target_os = "linux")]
pub use reader::GetdentsReader;
pub use reader::{DirReader, StdReader, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use results::WalkStats;
