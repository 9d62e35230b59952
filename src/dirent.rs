//! Decoder for the packed `linux_dirent64` records written by `getdents64(2)`.
//!
//! Each record is laid out as:
//!
//! ```text
//! offset  size  field
//!      0     8  d_ino     inode number
//!      8     8  d_off     opaque cookie, unused here
//!     16     2  d_reclen  total record length, padding included
//!     18     1  d_type    DT_* type tag
//!     19     -  d_name    NUL-terminated name, padded to d_reclen
//! ```
//!
//! Decoding works on a plain byte slice and a cursor, with every access
//! bounds-checked, so it can be exercised on synthetic buffers.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use crate::entry::{DirEntry, EntryKind};
use crate::error::DecodeError;

const INO_OFFSET:    usize = 0;
const RECLEN_OFFSET: usize = 16;
const TYPE_OFFSET:   usize = 18;

/// Size of the fixed part of a record; the name slot starts here.
pub const HEADER_LEN: usize = 19;

/// Decode the record starting at `offset`.
///
/// Returns the entry (or `None` for `.` and `..`) together with the number of
/// bytes to advance, which is always the record's declared length.
///
/// A record with no NUL inside its name slot is a hard error. Callers abort
/// the whole listing on it, discarding records already decoded.
pub fn decode_record(buf: &[u8], offset: usize) -> Result<(Option<DirEntry>, usize), DecodeError> {
    let rec = buf.get(offset..).unwrap_or_default();
    if rec.len() < HEADER_LEN {
        return Err(DecodeError::Truncated { offset });
    }

    let reclen = u16::from_ne_bytes([rec[RECLEN_OFFSET], rec[RECLEN_OFFSET + 1]]) as usize;
    if reclen <= HEADER_LEN || reclen > rec.len() {
        return Err(DecodeError::BadRecordLength { offset, reclen });
    }

    let slot = &rec[HEADER_LEN..reclen];
    let nul = slot
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::MissingNul { offset })?;
    let name = &slot[..nul];

    if name.is_empty() {
        return Err(DecodeError::EmptyName { offset });
    }
    if name == b"." || name == b".." {
        return Ok((None, reclen));
    }

    let mut ino = [0u8; 8];
    ino.copy_from_slice(&rec[INO_OFFSET..INO_OFFSET + 8]);

    let entry = DirEntry::from_raw(
        OsStr::from_bytes(name).to_os_string(),
        kind_from_dtype(rec[TYPE_OFFSET]),
        u64::from_ne_bytes(ino),
    );
    Ok((Some(entry), reclen))
}

/// Decode every record in `buf`, appending entries to `out` in buffer order.
///
/// Returns how many entries were appended. On error `out` may already hold
/// entries from earlier records in this buffer.
pub fn decode_buffer(buf: &[u8], out: &mut Vec<DirEntry>) -> Result<usize, DecodeError> {
    let before = out.len();
    let mut offset = 0;
    while offset < buf.len() {
        let (entry, consumed) = decode_record(buf, offset)?;
        if let Some(entry) = entry {
            out.push(entry);
        }
        offset += consumed;
    }
    Ok(out.len() - before)
}

/// Map a `d_type` tag to an [`EntryKind`]. Unrecognised tags become `Unknown`.
pub fn kind_from_dtype(d_type: u8) -> EntryKind {
    match d_type {
        libc::DT_DIR  => EntryKind::Directory,
        libc::DT_REG  => EntryKind::RegularFile,
        libc::DT_LNK  => EntryKind::SymbolicLink,
        libc::DT_CHR  => EntryKind::CharDevice,
        libc::DT_BLK  => EntryKind::BlockDevice,
        libc::DT_FIFO => EntryKind::Fifo,
        libc::DT_SOCK => EntryKind::Socket,
        _             => EntryKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Append one record with `pad` extra bytes after the name's NUL.
    fn push_record(buf: &mut Vec<u8>, ino: u64, d_type: u8, name: &[u8], pad: usize) {
        let reclen = HEADER_LEN + name.len() + 1 + pad;
        buf.extend_from_slice(&ino.to_ne_bytes());
        buf.extend_from_slice(&0i64.to_ne_bytes());
        buf.extend_from_slice(&(reclen as u16).to_ne_bytes());
        buf.push(d_type);
        buf.extend_from_slice(name);
        buf.push(0);
        // Non-zero padding makes a cursor that stops early land on garbage.
        buf.extend(std::iter::repeat(0xAA).take(pad));
    }

    fn names(entries: &[DirEntry]) -> Vec<&[u8]> {
        entries.iter().map(|e| e.name().as_bytes()).collect()
    }

    #[test]
    fn decodes_single_record() {
        let mut buf = Vec::new();
        push_record(&mut buf, 42, libc::DT_REG, b"hello.txt", 0);

        let (entry, consumed) = decode_record(&buf, 0).unwrap();
        let entry = entry.unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(entry.name(), "hello.txt");
        assert_eq!(entry.kind(), EntryKind::RegularFile);
        assert_eq!(entry.ino(), 42);
    }

    #[test]
    fn padding_does_not_misalign_cursor() {
        for pad in [0, 1, 3, 5, 7, 13, 64] {
            let mut buf = Vec::new();
            push_record(&mut buf, 1, libc::DT_DIR, b"a", pad);
            push_record(&mut buf, 2, libc::DT_REG, b"bcdef", pad + 2);
            push_record(&mut buf, 3, libc::DT_LNK, b"g", 0);

            let mut out = Vec::new();
            let n = decode_buffer(&buf, &mut out).unwrap();
            assert_eq!(n, 3, "pad = {pad}");
            assert_eq!(names(&out), vec![&b"a"[..], b"bcdef", b"g"]);
            assert_eq!(out[0].kind(), EntryKind::Directory);
            assert_eq!(out[2].kind(), EntryKind::SymbolicLink);
        }
    }

    #[test]
    fn skips_dot_and_dotdot() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_DIR, b".", 4);
        push_record(&mut buf, 2, libc::DT_DIR, b"..", 3);
        push_record(&mut buf, 3, libc::DT_REG, b".hidden", 0);
        push_record(&mut buf, 4, libc::DT_DIR, b"...", 1);

        let mut out = Vec::new();
        decode_buffer(&buf, &mut out).unwrap();
        assert_eq!(names(&out), vec![&b".hidden"[..], b"..."]);
    }

    #[test]
    fn dot_record_still_reports_its_length() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_DIR, b"..", 9);
        let (entry, consumed) = decode_record(&buf, 0).unwrap();
        assert!(entry.is_none());
        assert_eq!(consumed, HEADER_LEN + 3 + 9);
    }

    #[test]
    fn maps_type_tags() {
        assert_eq!(kind_from_dtype(libc::DT_CHR), EntryKind::CharDevice);
        assert_eq!(kind_from_dtype(libc::DT_BLK), EntryKind::BlockDevice);
        assert_eq!(kind_from_dtype(libc::DT_FIFO), EntryKind::Fifo);
        assert_eq!(kind_from_dtype(libc::DT_SOCK), EntryKind::Socket);
        assert_eq!(kind_from_dtype(libc::DT_UNKNOWN), EntryKind::Unknown);
        assert_eq!(kind_from_dtype(200), EntryKind::Unknown);
    }

    #[test]
    fn missing_nul_fails_whole_buffer() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_REG, b"ok", 0);
        let bad_at = buf.len();
        // Name fills the slot exactly, no terminator.
        let reclen = HEADER_LEN + 4;
        buf.extend_from_slice(&2u64.to_ne_bytes());
        buf.extend_from_slice(&0i64.to_ne_bytes());
        buf.extend_from_slice(&(reclen as u16).to_ne_bytes());
        buf.push(libc::DT_REG);
        buf.extend_from_slice(b"abcd");
        push_record(&mut buf, 3, libc::DT_REG, b"after", 0);

        let mut out = Vec::new();
        let err = decode_buffer(&buf, &mut out).unwrap_err();
        assert_eq!(err, DecodeError::MissingNul { offset: bad_at });
    }

    #[test]
    fn rejects_truncated_header() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_REG, b"x", 0);
        let len = buf.len();
        buf.extend_from_slice(&[0u8; 10]);
        assert_eq!(
            decode_record(&buf, len).unwrap_err(),
            DecodeError::Truncated { offset: len }
        );
    }

    #[test]
    fn rejects_bad_record_length() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_REG, b"x", 0);
        // Claim more bytes than the buffer holds.
        buf[RECLEN_OFFSET..RECLEN_OFFSET + 2].copy_from_slice(&500u16.to_ne_bytes());
        assert!(matches!(
            decode_record(&buf, 0),
            Err(DecodeError::BadRecordLength { offset: 0, reclen: 500 })
        ));

        // A zero length would never advance the cursor.
        buf[RECLEN_OFFSET..RECLEN_OFFSET + 2].copy_from_slice(&0u16.to_ne_bytes());
        assert!(matches!(
            decode_record(&buf, 0),
            Err(DecodeError::BadRecordLength { reclen: 0, .. })
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let mut buf = Vec::new();
        push_record(&mut buf, 1, libc::DT_REG, b"", 4);
        assert_eq!(
            decode_record(&buf, 0).unwrap_err(),
            DecodeError::EmptyName { offset: 0 }
        );
    }

    #[test]
    fn empty_buffer_decodes_nothing() {
        let mut out = Vec::new();
        assert_eq!(decode_buffer(&[], &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
