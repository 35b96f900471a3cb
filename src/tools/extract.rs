//! Native archive extraction (no external tools needed)
//!
//! Entries are filtered by a glob pattern before unpacking, and the archive's
//! single top-level directory can be stripped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::error::{RecipeError, Result};

/// Supported archive formats, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    Tar,
    Zip,
}

impl ArchiveFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Ok(Self::TarXz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Ok(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Ok(Self::Tar)
        } else if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(RecipeError::UnsupportedFormat(name))
        }
    }
}

/// What to take from an archive and where to put it.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only entries whose archive path matches are unpacked.
    pub pattern: Option<glob::Pattern>,
    /// Drop the first path component of every entry.
    pub strip_root: bool,
}

impl ExtractOptions {
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(pattern)
            .map_err(|e| RecipeError::InvalidOption(format!("bad pattern {}: {}", pattern, e)))?;
        self.pattern = Some(pattern);
        Ok(self)
    }

    pub fn strip_root(mut self, strip: bool) -> Self {
        self.strip_root = strip;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        match &self.pattern {
            Some(p) => p.matches(&path.to_string_lossy()),
            None => true,
        }
    }

    /// Destination-relative path for an entry, `None` to skip it.
    fn target(&self, path: &Path) -> Option<PathBuf> {
        if !self.accepts(path) {
            return None;
        }
        self.strip(path)
    }

    /// Archive path with the root component removed when `strip_root` is set.
    fn strip(&self, path: &Path) -> Option<PathBuf> {
        let rel: PathBuf = if self.strip_root {
            path.components().skip(1).collect()
        } else {
            path.to_path_buf()
        };
        if rel.as_os_str().is_empty() || rel == Path::new(".") {
            None
        } else {
            Some(rel)
        }
    }
}

/// Extract `archive` into `dest`, returning the number of entries unpacked.
pub fn extract(archive: &Path, dest: &Path, opts: &ExtractOptions) -> Result<usize> {
    std::fs::create_dir_all(dest)?;
    let open = || -> Result<BufReader<File>> { Ok(BufReader::new(File::open(archive)?)) };

    match ArchiveFormat::detect(archive)? {
        ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(open()?), dest, opts),
        ArchiveFormat::TarXz => extract_tar(xz2::read::XzDecoder::new(open()?), dest, opts),
        ArchiveFormat::TarBz2 => extract_tar(bzip2::read::BzDecoder::new(open()?), dest, opts),
        ArchiveFormat::Tar => extract_tar(open()?, dest, opts),
        ArchiveFormat::Zip => extract_zip(archive, dest, opts),
    }
}

fn unsafe_path(path: &Path) -> bool {
    path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn ensure_link_within_dest(dest: &Path, link_parent: &Path, link_name: &Path) -> Result<()> {
    if link_name.is_absolute() {
        return Err(archive_error(format!(
            "archive contains absolute link target: {}",
            link_name.display()
        )));
    }
    let candidate = normalize_lexical(&link_parent.join(link_name));
    if !candidate.starts_with(normalize_lexical(dest)) {
        return Err(archive_error(format!(
            "archive link escapes destination: {} -> {}",
            link_parent.display(),
            link_name.display()
        )));
    }
    Ok(())
}

/// Reject writes through a symlink already unpacked into `dest`, including
/// the leaf itself.
fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        archive_error(format!(
            "archive path outside destination: {}",
            full_path.display()
        ))
    })?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(archive_error(format!(
                "extraction blocked: symlink in path component: {}",
                cur.display()
            )));
        }
    }
    Ok(())
}

fn archive_error(message: String) -> RecipeError {
    RecipeError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

fn extract_tar<R: Read>(reader: R, dest: &Path, opts: &ExtractOptions) -> Result<usize> {
    let mut archive = tar::Archive::new(reader);
    let mut count = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        if unsafe_path(&path) {
            return Err(archive_error(format!(
                "archive contains unsafe path: {}",
                path.display()
            )));
        }
        let Some(rel) = opts.target(&path) else {
            continue;
        };
        let full_path = dest.join(&rel);

        ensure_no_symlink_components(dest, &full_path)?;

        match entry.header().entry_type() {
            tar::EntryType::Symlink => {
                let link_name = entry.link_name()?.ok_or_else(|| {
                    archive_error(format!("symlink without target: {}", path.display()))
                })?;
                let link_parent = full_path.parent().unwrap_or(dest);
                ensure_link_within_dest(dest, link_parent, &link_name)?;
            }
            tar::EntryType::Link => {
                let link_name = entry.link_name()?.ok_or_else(|| {
                    archive_error(format!("hard link without target: {}", path.display()))
                })?;
                hard_link(dest, &link_name, &full_path, opts)?;
                count += 1;
                continue;
            }
            _ => {}
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&full_path)?;
        count += 1;
    }

    Ok(count)
}

/// Hard link targets name another archive entry, so they are stripped and
/// resolved against `dest` like entry paths.
fn hard_link(dest: &Path, link_name: &Path, full_path: &Path, opts: &ExtractOptions) -> Result<()> {
    if unsafe_path(link_name) {
        return Err(archive_error(format!(
            "archive contains unsafe hard link target: {}",
            link_name.display()
        )));
    }
    let target = opts.strip(link_name).map(|rel| dest.join(rel)).ok_or_else(|| {
        archive_error(format!("hard link target is the archive root: {}", link_name.display()))
    })?;
    ensure_no_symlink_components(dest, &target)?;

    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::symlink_metadata(full_path).is_ok() {
        std::fs::remove_file(full_path)?;
    }
    std::fs::hard_link(&target, full_path)?;
    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path, opts: &ExtractOptions) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| archive_error(format!("zip read error: {}", e)))?;
    let mut count = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| archive_error(format!("zip entry error: {}", e)))?;

        // Entries with unsafe paths have no enclosed name.
        let Some(path) = file.enclosed_name() else {
            continue;
        };
        let Some(rel) = opts.target(&path) else {
            continue;
        };
        let outpath = dest.join(rel);
        ensure_no_symlink_components(dest, &outpath)?;

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
                }
            }
        }
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build a gzipped tarball of `(path, contents)` entries.
    pub(crate) fn make_tar_gz(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ArchiveFormat::detect(Path::new("a.tar.gz")).unwrap(), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::detect(Path::new("a.TGZ")).unwrap(), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::detect(Path::new("a.tar.xz")).unwrap(), ArchiveFormat::TarXz);
        assert_eq!(ArchiveFormat::detect(Path::new("a.zip")).unwrap(), ArchiveFormat::Zip);
        assert!(ArchiveFormat::detect(Path::new("a.rar")).is_err());
    }

    #[test]
    fn test_strip_root_and_pattern() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("apache-log4cxx-0.13.0.tar.gz");
        make_tar_gz(
            &archive,
            &[
                ("apache-log4cxx-0.13.0/LICENSE", "license"),
                ("apache-log4cxx-0.13.0/src/main/cpp/logger.cpp", "code"),
                ("apache-log4cxx-0.13.0/src/test/resources/output/xyz/:", "bad"),
            ],
        );

        let dest = dir.path().join("src");
        let opts = ExtractOptions::default()
            .with_pattern("*[!:]")
            .unwrap()
            .strip_root(true);
        let count = extract(&archive, &dest, &opts).unwrap();

        assert_eq!(count, 2);
        assert!(dest.join("LICENSE").is_file());
        assert!(dest.join("src/main/cpp/logger.cpp").is_file());
        assert!(!dest.join("src/test/resources/output/xyz").exists());
    }

    #[test]
    fn test_no_filter_keeps_root() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        make_tar_gz(&archive, &[("pkg/NOTICE", "notice")]);

        let dest = dir.path().join("out");
        extract(&archive, &dest, &ExtractOptions::default()).unwrap();
        assert!(dest.join("pkg/NOTICE").is_file());
    }

    enum Entry<'a> {
        File(&'a str, &'a str),
        Symlink(&'a str, &'a str),
        HardLink(&'a str, &'a str),
    }

    fn make_tar_with_links(path: &Path, entries: &[Entry]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for entry in entries {
            let mut header = tar::Header::new_gnu();
            match entry {
                Entry::File(name, contents) => {
                    header.set_size(contents.len() as u64);
                    header.set_mode(0o644);
                    builder
                        .append_data(&mut header, name, contents.as_bytes())
                        .unwrap();
                }
                Entry::Symlink(name, target) | Entry::HardLink(name, target) => {
                    let kind = if matches!(entry, Entry::Symlink(..)) {
                        tar::EntryType::Symlink
                    } else {
                        tar::EntryType::Link
                    };
                    header.set_entry_type(kind);
                    header.set_size(0);
                    header.set_mode(0o777);
                    header.set_link_name(target).unwrap();
                    builder
                        .append_data(&mut header, name, std::io::empty())
                        .unwrap();
                }
            }
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_symlink_chain_cannot_escape() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("chain.tar.gz");
        make_tar_with_links(
            &archive,
            &[
                Entry::Symlink("a", "."),
                Entry::Symlink("a/b", ".."),
                Entry::File("b/escaped.txt", "outside"),
            ],
        );

        let dest = dir.path().join("out");
        let err = extract(&archive, &dest, &ExtractOptions::default()).unwrap_err();

        assert!(err.to_string().contains("symlink in path component"), "{}", err);
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(!dest.join("escaped.txt").exists());
    }

    #[test]
    fn test_hard_link_resolved_inside_dest() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        make_tar_with_links(
            &archive,
            &[
                Entry::File("pkg/LICENSE", "license"),
                Entry::HardLink("pkg/COPYING", "pkg/LICENSE"),
            ],
        );

        let dest = dir.path().join("out");
        let opts = ExtractOptions::default().strip_root(true);
        let count = extract(&archive, &dest, &opts).unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read_to_string(dest.join("COPYING")).unwrap(), "license");
    }

    #[test]
    fn test_hard_link_outside_dest_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("secret"), "secret").unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        make_tar_with_links(&archive, &[Entry::HardLink("pkg/secret", "../secret")]);

        let dest = dir.path().join("out");
        let err = extract(&archive, &dest, &ExtractOptions::default()).unwrap_err();

        assert!(err.to_string().contains("unsafe hard link target"), "{}", err);
        assert!(!dest.join("pkg/secret").exists());
    }

    #[test]
    fn test_link_escape_rejected() {
        let dest = Path::new("/ws/src");
        let parent = Path::new("/ws/src/lib");
        assert!(ensure_link_within_dest(dest, parent, Path::new("../include")).is_ok());
        assert!(ensure_link_within_dest(dest, parent, Path::new("../../../etc")).is_err());
        assert!(ensure_link_within_dest(dest, parent, Path::new("/etc/passwd")).is_err());
    }
}
