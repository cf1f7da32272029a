//! Gzip-aware readers and buffered writers

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` for buffered reading, transparently decompressing gzip input
/// (detected from the leading bytes, not the extension).
pub fn reader(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let mut raw = BufReader::new(File::open(path)?);
    let is_gz = raw.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(raw))))
    } else {
        Ok(Box::new(raw))
    }
}

/// Buffered writer to a file, or to stdout when `path` is `None`.
pub fn writer(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(writer)
}
