// File Operations for Key Persistence
// Reading and writing packed key files, plus progress reporting values

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::rsa::bigint::RsaBigInt;
use crate::rsa::serialize::{pack, unpack};

/// A progress indicator for row-by-row image scans
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub percent: f64,
}

impl Progress {
    pub fn new(current: u64, total: u64) -> Self {
        let percent = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            current,
            total,
            percent,
        }
    }
}

/// Read entire file into memory
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Write data to file
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    Ok(())
}

/// Write a key file: first component || modulus, `width` bytes each
pub fn save_key<P: AsRef<Path>>(path: P, first: &RsaBigInt, n: &RsaBigInt, width: usize) -> Result<()> {
    let buffer = pack(first, n, width)?;
    write_file(&path, &buffer)?;
    debug!("wrote {} key bytes to {}", buffer.len(), path.as_ref().display());
    Ok(())
}

/// Read a key file written by `save_key`
pub fn load_key<P: AsRef<Path>>(path: P, width: usize) -> Result<(RsaBigInt, RsaBigInt)> {
    let buffer = read_file(&path)?;
    debug!("read {} key bytes from {}", buffer.len(), path.as_ref().display());
    unpack(&buffer, width)
}

/// Format file size for display
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StegoError;
    use crate::rsa::bigint::from_u64;

    #[test]
    fn test_progress_percent() {
        assert_eq!(Progress::new(1, 4).percent, 25.0);
        assert_eq!(Progress::new(0, 0).percent, 0.0);
    }

    #[test]
    fn test_key_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private_key.pem");

        save_key(&path, &from_u64(0x9ae5), &from_u64(0xd031), 256).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 512);

        let (d, n) = load_key(&path, 256).unwrap();
        assert_eq!(d, from_u64(0x9ae5));
        assert_eq!(n, from_u64(0xd031));
    }

    #[test]
    fn test_load_truncated_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.key");
        write_file(&path, &[0u8; 100]).unwrap();

        assert!(matches!(load_key(&path, 256), Err(StegoError::Format(_))));
    }

    #[test]
    fn test_load_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_key(dir.path().join("absent.key"), 256),
            Err(StegoError::Io(_))
        ));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.00 KB");
    }
}
