//! Testing utilities and mock implementations.
//!
//! Provides a mock archive fetcher so the provisioner can be exercised
//! without network access, plus fixtures for building archives and a
//! stand-in conversion binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use vconv_core::provisioner::{Provisioner, ProvisionerConfig};
//! use vconv_core::testing::{fixtures, MockFetcher};
//!
//! let archive = fixtures::zip_archive(&[("build/bin/ffmpeg", b"#!/bin/sh\n".as_slice())]);
//! let fetcher = MockFetcher::serving(archive);
//! let provisioner = Provisioner::new(ProvisionerConfig::with_install_root(dir), fetcher.clone());
//!
//! provisioner.ensure_binary().await?;
//! assert_eq!(fetcher.call_count(), 1);
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};
    use zip::write::SimpleFileOptions;

    /// Build an in-memory zip archive from `(entry name, contents)` pairs.
    ///
    /// Directories are implied by the entry names.
    pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("start zip entry");
            zip.write_all(contents).expect("write zip entry");
        }
        zip.finish().expect("finish zip archive").into_inner()
    }

    /// Shell script standing in for ffmpeg.
    ///
    /// Behaviour, keyed off the joined argument list:
    /// - writes its arguments, one per line, into the last argument (the output path)
    /// - prints `PATH=<value>` on stdout
    /// - unless an argument contains `quiet`, prints two `time=` status lines on
    ///   stderr, the first terminated by `\r` the way ffmpeg does
    /// - sleeps for a second when an argument contains `slow`
    /// - when an argument contains `interleave`, alternates `out1`..`out10` on
    ///   stdout with `err1`..`err10` on stderr
    pub const FAKE_FFMPEG_SCRIPT: &str = r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$@" > "$last"
echo "PATH=$PATH"
case "$*" in
  *slow*) sleep 1 ;;
esac
case "$*" in
  *interleave*)
    i=1
    while [ "$i" -le 10 ]; do
      echo "out$i"
      echo "err$i" >&2
      i=$((i + 1))
    done
    ;;
esac
case "$*" in
  *quiet*) echo "no status output" >&2 ;;
  *)
    printf 'frame=  10 fps=0.0 q=28.0 size=0kB time=00:00:00.40 bitrate=0.0kbits/s\r' >&2
    printf 'frame=  50 fps=0.0 q=28.0 size=256kB time=00:00:02.00 bitrate=1048.6kbits/s\n' >&2
    ;;
esac
echo "done"
"#;

    /// Write [`FAKE_FFMPEG_SCRIPT`] into `dir` as an executable named `ffmpeg`.
    #[cfg(unix)]
    pub fn install_fake_ffmpeg(dir: &Path) -> std::io::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("ffmpeg");
        {
            let mut file = std::fs::File::create(&path)?;
            file.write_all(FAKE_FFMPEG_SCRIPT.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}
