//! Image byte sources, content fingerprints and media type sniffing.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::SyncError;

/// Media types the store accepts for uploads.
pub const ACCEPTED_MEDIA_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Reported for sources whose leading bytes match no known image format.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

const SNIFF_LEN: usize = 512;

/// Anything an image can be read from more than once.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// One desired image: a named, seekable byte source.
///
/// Reconciliation reads every source twice, once to fingerprint it and once
/// to upload it, so all helpers here leave the read position at the start.
pub struct ImageSource {
    name: String,
    reader: Box<dyn ReadSeek>,
}

impl ImageSource {
    pub fn new(name: impl Into<String>, reader: impl ReadSeek + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Wraps an in-memory image.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(name, Cursor::new(bytes.into()))
    }

    /// Opens an image file.
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        let file = File::open(path)
            .map_err(|e| SyncError::content(format!("open {}", path.display()), e))?;
        Ok(Self::new(path.display().to_string(), file))
    }

    /// Display name, usually the file path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SHA-1 of the whole source. See [`fingerprint`].
    pub fn fingerprint(&mut self) -> Result<String, SyncError> {
        fingerprint(self)
    }

    /// Media type detected from the leading bytes. See [`sniff_media_type`].
    pub fn media_type(&mut self) -> Result<&'static str, SyncError> {
        sniff_media_type(self)
    }

    /// Reads the whole source and rewinds it.
    pub fn read_all(&mut self) -> Result<Vec<u8>, SyncError> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)
            .map_err(|e| SyncError::content(format!("read {}", self.name), e))?;
        rewind(self)?;
        Ok(bytes)
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Read for ImageSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for ImageSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

/// Computes the lowercase hex SHA-1 of the entire source and rewinds it to
/// the start.
///
/// Identical bytes always give identical fingerprints; this is the only
/// test used to decide whether an image is already present on the store.
pub fn fingerprint<R: Read + Seek + ?Sized>(source: &mut R) -> Result<String, SyncError> {
    let mut hasher = Sha1::new();
    io::copy(source, &mut hasher).map_err(|e| SyncError::content("hash image", e))?;
    rewind(source)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Detects the media type from the first bytes of the source and rewinds it.
pub fn sniff_media_type<R: Read + Seek + ?Sized>(source: &mut R) -> Result<&'static str, SyncError> {
    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(SyncError::content("sniff media type", e)),
        }
    }
    rewind(source)?;

    Ok(image::guess_format(&buf[..filled])
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE))
}

/// Sniffs the media type and fails with `InvalidContentType` unless it is
/// one of [`ACCEPTED_MEDIA_TYPES`].
pub fn ensure_accepted_media_type<R: Read + Seek + ?Sized>(
    source: &mut R,
) -> Result<&'static str, SyncError> {
    let media_type = sniff_media_type(source)?;
    if ACCEPTED_MEDIA_TYPES.contains(&media_type) {
        Ok(media_type)
    } else {
        Err(SyncError::invalid_content_type(media_type))
    }
}

fn rewind<R: Seek + ?Sized>(source: &mut R) -> Result<(), SyncError> {
    source
        .seek(SeekFrom::Start(0))
        .map(|_| ())
        .map_err(|e| SyncError::content("rewind image", e))
}
