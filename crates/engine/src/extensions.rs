//! Filename-based binary detection.
//!
//! Content sniffing catches most binary files, but only after opening them.
//! The extension table lets batch runs skip the obvious ones up front. It
//! only lists the kinds likely to sit inside projects that otherwise hold
//! text: images, sound, databases, office documents, archives, build output.

use std::path::Path;

const KNOWN_BINARY_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "tif", "tiff", "gif", "png", "tga", "bmp", "xcf", "raw", "pdf", "jfif",
    // sound
    "mp3", "flac", "3ga", "m4a", "wav", "aiff", "wma", "au", "ogg", "mid",
    // database
    "db", "fdb", "accdb", "gdb", "mdb", "wdb", "sqlite", "sqlite3", "db3", "dbf", "myd", "sdf",
    "s3db", "sdb", "odb", "t2d",
    // office
    "doc", "docx", "xls", "xlsx", "ppt", "pptx", "pub", "pubx", "dotx", "odt", "sxw", "odp",
    "sxi", "stw", "sdd",
    // archive
    "jar", "7z", "tgz", "gz", "tar", "zip", "dmg", "zlib", "pkg", "bz2", "iso",
    // executable / object
    "class", "o", "exe",
];

/// True when the path's final extension is one of the known binary
/// extensions, compared without regard to case.
pub fn has_known_binary_extension(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    KNOWN_BINARY_EXTENSIONS
        .iter()
        .any(|known| extension.eq_ignore_ascii_case(known))
}
