use ckit_discovery::{KitError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

fn io_err(action: &str, path: &Path) -> impl FnOnce(std::io::Error) -> KitError {
    let context = format!("{action} {}", path.display());
    move |e| KitError::io(context, e)
}

#[cfg(unix)]
fn default_permissions() -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    fs::Permissions::from_mode(0o644)
}

/// Writes `data` to a temp file beside `path`, then renames it into place.
///
/// Parent directories are created. An existing file keeps its permissions;
/// a new one gets the usual `0644` on unix instead of the temp file's `0600`.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(io_err("creating", dir))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err("creating temp file in", dir))?;
    tmp.write_all(data).map_err(io_err("writing", path))?;

    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        #[cfg(unix)]
        Err(_) => Some(default_permissions()),
        #[cfg(not(unix))]
        Err(_) => None,
    };
    if let Some(perms) = permissions {
        tmp.as_file()
            .set_permissions(perms)
            .map_err(io_err("setting permissions on", path))?;
    }

    tmp.persist(path).map_err(|e| KitError::io(format!("replacing {}", path.display()), e.error))?;
    Ok(())
}

/// Copies one file atomically, carrying over the source's permissions.
pub fn copy_file_atomic(src: &Path, dst: &Path) -> Result<()> {
    let data = fs::read(src).map_err(io_err("reading", src))?;
    atomic_write(dst, &data)?;
    let perms = fs::metadata(src)
        .map_err(io_err("reading metadata of", src))?
        .permissions();
    fs::set_permissions(dst, perms).map_err(io_err("setting permissions on", dst))?;
    Ok(())
}

/// Recursively copies every file under `src` into `dst`, each one atomically.
///
/// Files already in `dst` that `src` lacks are left alone. Returns the number
/// of files copied.
pub fn copy_dir_atomic(src: &Path, dst: &Path) -> Result<usize> {
    copy_dir_filtered(src, dst, |_| false)
}

/// Like [`copy_dir_atomic`], but prunes every entry whose path relative to
/// `src` satisfies `skip`, along with everything beneath it.
pub fn copy_dir_filtered(src: &Path, dst: &Path, skip: impl Fn(&Path) -> bool) -> Result<usize> {
    fs::create_dir_all(dst).map_err(io_err("creating", dst))?;
    let mut copied = 0;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            pathdiff::diff_paths(e.path(), src).map_or(true, |rel| !skip(rel.as_path()))
        });
    for entry in walker {
        let entry = entry.map_err(|e| {
            let context = format!("walking {}", src.display());
            KitError::io(context, e.into())
        })?;
        let Some(rel) = pathdiff::diff_paths(entry.path(), src) else {
            continue;
        };
        let out = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(io_err("creating", &out))?;
        } else if entry.file_type().is_file() {
            copy_file_atomic(entry.path(), &out)?;
            copied += 1;
        }
    }
    tracing::debug!(src = %src.display(), dst = %dst.display(), files = copied, "Copied directory");
    Ok(copied)
}
