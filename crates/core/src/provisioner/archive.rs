//! ZIP extraction and archive layout checks.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use super::error::ProvisionError;

/// Extracts every entry of the ZIP at `archive_path` into `dest`.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let file = fs::File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ProvisionError::extract(archive_path, e))?;

    debug!("Extracting {} entries into {:?}", archive.len(), dest);
    fs::create_dir_all(dest)?;
    archive
        .extract(dest)
        .map_err(|e| ProvisionError::extract(archive_path, e))?;

    Ok(())
}

/// Returns the only directory directly inside `dir`.
///
/// Regular files at the top level are ignored. Zero or several directories
/// is an [`ProvisionError::ArchiveLayout`] error.
pub fn single_top_level_dir(dir: &Path) -> Result<PathBuf, ProvisionError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }

    if dirs.len() != 1 {
        return Err(ProvisionError::ArchiveLayout { found: dirs.len() });
    }
    Ok(dirs.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("build.zip");
        write_zip(
            &archive,
            &[
                ("ffmpeg-7.1-essentials/bin/ffmpeg.exe", b"binary"),
                ("ffmpeg-7.1-essentials/README.txt", b"readme"),
            ],
        );

        let dest = dir.path().join("staging");
        extract_zip(&archive, &dest).unwrap();

        let extracted = dest.join("ffmpeg-7.1-essentials/bin/ffmpeg.exe");
        assert_eq!(fs::read(extracted).unwrap(), b"binary");
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let result = extract_zip(&archive, &dir.path().join("staging"));
        assert!(matches!(result, Err(ProvisionError::Extract { .. })));
    }

    #[test]
    fn test_single_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("ffmpeg-7.1")).unwrap();
        fs::write(dir.path().join("LICENSE"), b"text").unwrap();

        let found = single_top_level_dir(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("ffmpeg-7.1"));
    }

    #[test]
    fn test_no_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ffmpeg"), b"bare binary").unwrap();

        let result = single_top_level_dir(dir.path());
        assert!(matches!(result, Err(ProvisionError::ArchiveLayout { found: 0 })));
    }

    #[test]
    fn test_multiple_top_level_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();

        let result = single_top_level_dir(dir.path());
        assert!(matches!(result, Err(ProvisionError::ArchiveLayout { found: 2 })));
    }
}
