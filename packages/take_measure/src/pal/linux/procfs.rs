//! Readers for the procfs files of the current process.
//!
//! Files are read into fixed-size stack buffers so that sampling does not touch the heap
//! allocator, which would otherwise show up in the very counters being sampled.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::str;

const STATM_PATH: &str = "/proc/self/statm";
const STAT_PATH: &str = "/proc/self/stat";

// statm is seven decimal numbers; stat is ~52 fields after a command name of at most 15 bytes.
const STATM_BUFFER_SIZE: usize = 256;
const STAT_BUFFER_SIZE: usize = 1024;

// Position of `num_threads` among the fields that follow the parenthesized command name.
const STAT_THREADS_INDEX: usize = 17;

const FALLBACK_PAGE_SIZE: u64 = 4096;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MemoryUsage {
    pub(crate) resident_bytes: u64,
    pub(crate) virtual_bytes: u64,
}

pub(crate) fn memory_usage() -> Option<MemoryUsage> {
    let mut buffer = [0_u8; STATM_BUFFER_SIZE];
    let contents = read_to_buffer(STATM_PATH, &mut buffer)?;

    parse_statm(str::from_utf8(contents).ok()?, page_size())
}

pub(crate) fn thread_count() -> Option<u64> {
    let mut buffer = [0_u8; STAT_BUFFER_SIZE];
    let contents = read_to_buffer(STAT_PATH, &mut buffer)?;

    parse_stat_thread_count(contents)
}

/// Reads as much of the file as fits into the buffer.
fn read_to_buffer<'b>(path: &str, buffer: &'b mut [u8]) -> Option<&'b [u8]> {
    let mut file = File::open(path).ok()?;
    let mut filled = 0_usize;

    loop {
        let remaining = buffer.get_mut(filled..)?;

        if remaining.is_empty() {
            break;
        }

        match file.read(remaining) {
            Ok(0) => break,
            Ok(read) => filled = filled.saturating_add(read),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(_) => return None,
        }
    }

    buffer.get(..filled)
}

/// Parses `size resident shared text lib data dt`, all in pages.
fn parse_statm(contents: &str, page_size: u64) -> Option<MemoryUsage> {
    let mut fields = contents.split_ascii_whitespace();

    let virtual_pages: u64 = fields.next()?.parse().ok()?;
    let resident_pages: u64 = fields.next()?.parse().ok()?;

    Some(MemoryUsage {
        resident_bytes: resident_pages.saturating_mul(page_size),
        virtual_bytes: virtual_pages.saturating_mul(page_size),
    })
}

fn parse_stat_thread_count(contents: &[u8]) -> Option<u64> {
    // The command name may contain spaces, parentheses and bytes that are not UTF-8, so we anchor
    // on the last ')' and only decode what follows it.
    let name_end = contents.iter().rposition(|b| *b == b')')?;
    let after_name = str::from_utf8(contents.get(name_end.checked_add(1)?..)?).ok()?;

    after_name
        .split_ascii_whitespace()
        .nth(STAT_THREADS_INDEX)?
        .parse()
        .ok()
}

fn page_size() -> u64 {
    // SAFETY: No safety requirements.
    let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    u64::try_from(raw)
        .ok()
        .filter(|size| *size > 0)
        .unwrap_or(FALLBACK_PAGE_SIZE)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const SAMPLE_STAT: &str = "12345 (my (odd) app) S 1 12345 12345 0 -1 4194304 2500 0 3 0 \
        40 12 0 0 20 0 7 0 8888 123456789 2048 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 \
        17 3 0 0 0 0 0";

    #[test]
    fn parses_statm() {
        let usage = parse_statm("2000 500 100 10 0 300 0\n", 4096).unwrap();

        assert_eq!(usage.virtual_bytes, 2000 * 4096);
        assert_eq!(usage.resident_bytes, 500 * 4096);
    }

    #[test]
    fn rejects_truncated_statm() {
        assert_eq!(parse_statm("2000", 4096), None);
        assert_eq!(parse_statm("", 4096), None);
        assert_eq!(parse_statm("abc def", 4096), None);
    }

    #[test]
    fn parses_thread_count_despite_parentheses_in_name() {
        assert_eq!(parse_stat_thread_count(SAMPLE_STAT.as_bytes()), Some(7));
    }

    #[test]
    fn parses_thread_count_despite_non_utf8_name() {
        let (_, after_name) = SAMPLE_STAT.rsplit_once(')').unwrap();

        let mut contents = b"12345 (bad\xff\xfe)".to_vec();
        contents.extend_from_slice(after_name.as_bytes());

        assert!(str::from_utf8(&contents).is_err());
        assert_eq!(parse_stat_thread_count(&contents), Some(7));
    }

    #[test]
    fn rejects_truncated_stat() {
        assert_eq!(parse_stat_thread_count(b"12345 (app) S 1 2 3"), None);
        assert_eq!(parse_stat_thread_count(b"no parenthesis here"), None);
    }

    #[test]
    fn reads_real_files() {
        let memory = memory_usage().unwrap();
        assert!(memory.resident_bytes > 0);

        // The test harness itself runs multiple threads.
        assert!(thread_count().unwrap() >= 1);
    }

    #[test]
    fn small_buffer_is_filled_to_capacity() {
        let mut buffer = [0_u8; 4];
        let contents = read_to_buffer(STAT_PATH, &mut buffer).unwrap();

        assert_eq!(contents.len(), 4);
    }

    #[test]
    fn page_size_is_positive() {
        assert!(page_size() > 0);
    }
}
