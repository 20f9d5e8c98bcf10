//! Atomic file replacement

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Write `data` to `path` through a sibling temp file and an atomic rename,
/// so readers never observe a partially written blob.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = Path::new(&temp_path);

    let result = (|| {
        let mut file = File::create(temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(temp_path, path)
    })();

    if result.is_err() {
        // Leave no orphaned temp file behind on failure
        let _ = fs::remove_file(temp_path);
    }
    result
}
