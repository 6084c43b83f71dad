use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{Error, Result};

/// Opens the input text file read-only.
pub(crate) fn open_input<P: AsRef<Path>>(path: P) -> Result<File> {
	let path = path.as_ref();
	File::open(path).map_err(|e| Error::file(path, e))
}

/// Opens the output file write-only.
///
/// - Created if absent, truncated if present
/// - Read/write for owner, group and other (`0o666`, before the umask)
pub(crate) fn create_output<P: AsRef<Path>>(path: P) -> Result<File> {
	let path = path.as_ref();
	let mut options = OpenOptions::new();
	options.write(true).create(true).truncate(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		options.mode(0o666);
	}
	options.open(path).map_err(|e| Error::file(path, e))
}

/// Flushes the output file to disk so that late write errors are reported.
pub(crate) fn close_output<P: AsRef<Path>>(file: File, path: P) -> Result<()> {
	file.sync_all().map_err(|e| Error::file(path.as_ref(), e))
}
