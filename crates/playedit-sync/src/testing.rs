//! Fixtures shared by the engine tests.

use playedit_store::{ImageSource, RemoteImage, fingerprint};

use crate::ImageSequence;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// PNG-looking bytes whose content is identified by `name`.
pub fn png(name: &str) -> Vec<u8> {
    [PNG_MAGIC, name.as_bytes()].concat()
}

pub fn sha(name: &str) -> String {
    fingerprint(&mut std::io::Cursor::new(png(name))).unwrap()
}

/// Remote images whose id is `id_<name>`.
pub fn remote(names: &[&str]) -> Vec<RemoteImage> {
    names
        .iter()
        .map(|name| RemoteImage::new(format!("id_{name}"), sha(name)))
        .collect()
}

pub fn desired(names: &[&str]) -> ImageSequence {
    ImageSequence::from_sources(
        names
            .iter()
            .map(|name| ImageSource::from_bytes(*name, png(name))),
    )
}
