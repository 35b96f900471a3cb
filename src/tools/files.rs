//! File helpers used by the source and package stages.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::context::Context;
use crate::error::{RecipeError, Result};
use crate::manifest::{PatchEntry, SourceEntry};
use crate::output;

use super::command;
use super::extract::{self, ExtractOptions};

/// Extract filename from a URL.
pub fn url_filename(url: &str) -> String {
    url.rsplit('/')
        .next()
        .unwrap_or("download")
        .split('?')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// Download, verify and unpack a source archive into `dest`.
///
/// Mirrors are tried in order; the first one that downloads wins.
pub fn get(
    ctx: &Context,
    source: &SourceEntry,
    dest: &Path,
    opts: &ExtractOptions,
) -> Result<()> {
    let urls = source.url.as_slice();
    let first = urls
        .first()
        .ok_or_else(|| RecipeError::Download {
            url: String::new(),
            reason: "no url given".to_string(),
        })?;
    let archive = ctx.workspace.join("downloads").join(url_filename(first));

    ctx.record(format!("get {} -> {}", first, dest.display()));
    if ctx.dry_run {
        output::command(true, &format!("get {}", first));
        return Ok(());
    }

    let mut last_err = None;
    for url in urls {
        match download(url, &archive) {
            Ok(_) => {
                last_err = None;
                break;
            }
            Err(e) => {
                output::warning(&format!("{}", e));
                last_err = Some(e);
            }
        }
    }
    if let Some(e) = last_err {
        return Err(e);
    }

    verify_sha256(&archive, &source.sha256)?;
    let count = extract::extract(&archive, dest, opts)?;
    output::detail(&format!("unpacked {} entries into {}", count, dest.display()));
    Ok(())
}

/// Download `url` to `dest`, returning the number of bytes written.
pub fn download(url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    output::detail(&format!("downloading {}", url));

    let response = ureq::get(url).call().map_err(|e| RecipeError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let pb = response
        .header("content-length")
        .and_then(|s| s.parse::<u64>().ok())
        .map(output::download_progress);

    let mut file = File::create(dest)?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
        total += n as u64;
        if let Some(pb) = &pb {
            pb.set_position(total);
        }
    }
    if let Some(pb) = pb {
        output::progress_done(pb);
    }
    Ok(total)
}

/// Compute the SHA256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];
    loop {
        let n = f.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    output::detail("verifying sha256");
    let actual = sha256_file(path)?;
    if actual != expected.to_lowercase() {
        return Err(RecipeError::Sha256Mismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Copy files under `src` matching `pattern` into `dst`, keeping relative paths.
pub fn copy(ctx: &Context, pattern: &str, src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    ctx.record(format!("copy {} {} -> {}", pattern, src.display(), dst.display()));
    if ctx.dry_run {
        output::command(true, &format!("copy {} -> {}", pattern, dst.display()));
        return Ok(Vec::new());
    }

    let pattern = glob::Pattern::new(pattern)
        .map_err(|e| RecipeError::InvalidOption(format!("bad pattern {}: {}", pattern, e)))?;
    let mut copied = Vec::new();
    if !src.is_dir() {
        return Ok(copied);
    }

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| RecipeError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        if !pattern.matches_path(rel) {
            continue;
        }
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target)?;
        copied.push(target);
    }
    Ok(copied)
}

/// Remove a directory tree. A missing directory is not an error.
pub fn rmdir(ctx: &Context, path: &Path) -> Result<()> {
    ctx.record(format!("rmdir {}", path.display()));
    if ctx.dry_run {
        output::command(true, &format!("rmdir {}", path.display()));
        return Ok(());
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Apply patches to the source tree, in order, with `patch -p1`.
pub fn apply_patches(
    ctx: &Context,
    patches: &[PatchEntry],
    recipe_dir: &Path,
    source_folder: &Path,
) -> Result<()> {
    for (idx, patch) in patches.iter().enumerate() {
        let patch_path = recipe_dir.join(&patch.patch_file);
        if !ctx.dry_run && !patch_path.is_file() {
            return Err(RecipeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("patch not found: {}", patch_path.display()),
            )));
        }

        let description = patch
            .patch_description
            .as_deref()
            .unwrap_or("no description");
        output::detail(&format!(
            "applying patch {}: {} ({})",
            idx + 1,
            patch.patch_file.display(),
            description
        ));

        let base = match &patch.base_path {
            Some(base) => source_folder.join(base),
            None => source_folder.to_path_buf(),
        };
        let mut cmd = Command::new("patch");
        cmd.args(["-p1", "--forward", "--batch", "-i"])
            .arg(&patch_path)
            .current_dir(&base);
        command::run(ctx, &mut cmd)?;
    }
    Ok(())
}
