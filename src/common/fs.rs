use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

pub fn assert_not_stdout(path: &Path) -> Result<()> {
    if path == Path::new("-") {
        bail!("stdout is not supported; provide a real file path.");
    }
    Ok(())
}

/// Write-then-rename wrapper: outputs are regenerated wholesale, so a partial
/// write must never clobber the previous run's file.
pub struct PendingWrite {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
}

pub fn open_for_write(target: &Path, force: bool) -> Result<PendingWrite> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    if !force && target.exists() {
        bail!("Refusing to overwrite existing file: {} (use --force)", target.display());
    }
    let tmp = NamedTempFile::new_in(target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new(".")))
        .context("create temp file")?;
    Ok(PendingWrite { target: target.to_path_buf(), tmp: Some(tmp) })
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.tmp.as_mut().unwrap().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.tmp.as_mut().unwrap().flush()
    }
}

pub fn finalize_write(mut pending: PendingWrite) -> Result<()> {
    let tmp = pending.tmp.take().expect("already finalized");
    tmp.as_file().sync_all().ok(); // best-effort fsync
    tmp.persist(&pending.target)
        .with_context(|| format!("rename to {}", pending.target.display()))?;
    if let Some(dir) = pending.target.parent()
        && !dir.as_os_str().is_empty()
    {
        let _ = File::open(dir).and_then(|f| f.sync_all());
    }
    Ok(())
}
