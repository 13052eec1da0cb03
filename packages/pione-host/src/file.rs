//! Loading boot payloads.

use std::{fs, io, path::Path};

use snafu::{ResultExt, Snafu};

/// A payload file could not be read.
#[derive(Debug, Snafu)]
#[snafu(display("could not read {path}: {source}"))]
pub struct ReadError {
    path: String,
    source: io::Error,
}

/// Whole contents of `path`, zero-padded to a multiple of four bytes.
///
/// The boot protocol ships payloads a word at a time, so a padded image can
/// be sent without a special case for the tail.
///
/// # Errors
///
/// [`ReadError`] if the file cannot be opened or read.
pub fn read_padded(path: impl AsRef<Path>) -> Result<Vec<u8>, ReadError> {
    let path = path.as_ref();
    let mut bytes = fs::read(path).context(ReadSnafu {
        path: path.display().to_string(),
    })?;

    let tail = bytes.len() % 4;
    if tail != 0 {
        bytes.resize(bytes.len() + (4 - tail), 0);
    }

    Ok(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn with_temp_file(contents: &[u8], check: impl FnOnce(&Path)) {
        let path = std::env::temp_dir().join(format!(
            "pione-host-read-{}-{}",
            std::process::id(),
            contents.len()
        ));
        fs::write(&path, contents).unwrap();
        check(&path);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn pads_to_a_word_multiple() {
        with_temp_file(b"hello", |path| {
            let bytes = read_padded(path).unwrap();
            assert_eq!(bytes, b"hello\0\0\0");
        });
    }

    #[test]
    fn aligned_contents_are_untouched() {
        with_temp_file(b"12345678", |path| {
            let bytes = read_padded(path).unwrap();
            assert_eq!(bytes, b"12345678");
        });
    }

    #[test]
    fn empty_files_stay_empty() {
        with_temp_file(b"", |path| {
            let bytes = read_padded(path).unwrap();
            assert!(bytes.is_empty());
        });
    }

    #[test]
    fn missing_files_error() {
        let missing = std::env::temp_dir().join("pione-host-definitely-missing");
        assert!(read_padded(&missing).is_err());
    }
}
