//! Archive extraction and packing for install-geth.
//!
//! Upstream builds ship as tar.gz (Linux, macOS) or ZIP (Windows). Both are
//! extracted with their directory structure intact; flattening happens later
//! in the install pipeline. The filesystem cache stores snapshots as tar.gz,
//! produced by [`pack_tar_gz`].

use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::Archive;

use super::locator::ArchiveFormat;

/// Extracts an archive of the given format into `dest_dir`.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or an entry cannot be written.
pub fn extract(format: ArchiveFormat, archive_path: &Path, dest_dir: &Path) -> Result<()> {
    match format {
        ArchiveFormat::TarGz => extract_tar_gz(archive_path, dest_dir),
        ArchiveFormat::Zip => extract_zip(archive_path, dest_dir),
    }
}

/// Rejects absolute paths and parent directory references in archive entries.
fn ensure_relative(entry_path: &Path) -> Result<()> {
    if entry_path.is_absolute()
        || entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        bail!(
            "Refusing to extract path with parent directory or absolute reference: {}",
            entry_path.display()
        );
    }
    Ok(())
}

/// Extracts a tar.gz archive into `dest_dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or is not a valid tar.gz
/// file, an entry escapes the destination, or a file cannot be written.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive
        .entries()
        .with_context(|| format!("Failed to read tar entries: {}", archive_path.display()))?
    {
        let mut entry = entry
            .with_context(|| format!("Failed to read tar entry: {}", archive_path.display()))?;

        let entry_path = entry
            .path()
            .context("Failed to get entry path")?
            .into_owned();
        ensure_relative(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.header().entry_type().is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
        } else {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }

            entry
                .unpack(&output_path)
                .with_context(|| format!("Failed to extract: {}", output_path.display()))?;
        }
    }

    Ok(())
}

/// Extracts a ZIP archive into `dest_dir`, creating it if needed.
///
/// On Unix, permission bits recorded in the archive are restored.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or is not a valid ZIP
/// file, an entry escapes the destination, or a file cannot be written.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let entry_path = entry
            .enclosed_name()
            .with_context(|| format!("Invalid entry path in archive: entry {i}"))?;
        ensure_relative(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut outfile = std::fs::File::create(&output_path)
            .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract: {}", output_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&output_path, std::fs::Permissions::from_mode(mode))
                    .with_context(|| {
                        format!("Failed to set permissions: {}", output_path.display())
                    })?;
            }
        }
    }

    Ok(())
}

/// Packs the contents of `src_dir` into a tar.gz archive at `archive_path`.
///
/// Entries are stored relative to `src_dir`, so extracting the archive into
/// another directory reproduces the same layout there.
///
/// # Errors
///
/// Returns an error if the archive cannot be created or a file cannot be read.
pub fn pack_tar_gz(src_dir: &Path, archive_path: &Path) -> Result<()> {
    let file = std::fs::File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;

    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", src_dir)
        .with_context(|| format!("Failed to archive directory: {}", src_dir.display()))?;

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .with_context(|| format!("Failed to finish archive: {}", archive_path.display()))?;

    Ok(())
}
