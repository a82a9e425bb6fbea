//! Handing a finished transfer to the caller's save mechanism.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Receives the assembled artifact once the stream has ended.
pub trait ArtifactSink {
    /// Stores `bytes` under `filename` and returns where it went.
    fn save(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves into a directory via a temp file and an atomic rename. An existing
/// file is never replaced unless `overwrite` is set; instead a numbered name
/// (`file (1).bin`) is used.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
    overwrite: bool,
}

const MAX_NUMBERED: u32 = 1000;

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        let target = self.dir.join(filename);
        if self.overwrite {
            tmp.persist(&target).map_err(|e| e.error)?;
            return Ok(target);
        }

        for n in 0..=MAX_NUMBERED {
            let candidate = if n == 0 {
                target.clone()
            } else {
                self.dir.join(numbered_name(filename, n))
            };
            match tmp.persist_noclobber(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(e.error),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", filename, self.dir.display()),
        ))
    }
}

/// `report.pdf` → `report (2).pdf`; `archive` → `archive (2)`.
pub fn numbered_name(filename: &str, n: u32) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &filename[..dot], n, &filename[dot..]),
        _ => format!("{} ({})", filename, n),
    }
}
