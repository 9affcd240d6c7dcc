//! Zip archiving of buildpack directories.

use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Zip the contents of `dir` into `archive`.
///
/// Entries are stored relative to `dir` with `/` separators, in sorted order,
/// keeping unix permission bits so detect/compile scripts stay executable.
pub fn zip_directory(dir: &Path, archive: &Path) -> io::Result<()> {
    let file = File::create(archive)?;
    let mut writer = ZipWriter::new(file);
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = 0usize;

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(io::Error::other)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let options = base.unix_permissions(permissions(&entry.metadata().map_err(io::Error::other)?));

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", name), options).map_err(io::Error::other)?;
        } else {
            writer.start_file(name, options).map_err(io::Error::other)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut writer)?;
        }
        entries += 1;
    }

    writer.finish().map_err(io::Error::other)?;
    debug!(dir = %dir.display(), archive = %archive.display(), entries, "Archived directory");
    Ok(())
}

/// Whether `path` is a readable zip archive.
///
/// Failing to open the file is an error; any file that opens but does not
/// parse as a zip is `Ok(false)`.
pub fn is_zip_archive(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    match ZipArchive::new(file) {
        Ok(_) => Ok(true),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Not a zip archive");
            Ok(false)
        }
    }
}

/// Whether `dir` has no entries at all.
pub fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

#[cfg(unix)]
fn permissions(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions(metadata: &std::fs::Metadata) -> u32 {
    if metadata.is_dir() { 0o755 } else { 0o644 }
}
