use chrono::Utc;
use folio_core::ContentDocument;
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WalRecord {
    Insert { doc: ContentDocument },
}

/// Append-only JSON-lines log. Each open starts a new segment file.
pub struct Wal {
    path: PathBuf,
    file: File,
}

impl Wal {
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("wal-{}.log", Utc::now().timestamp_micros()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// A log whose appends always fail, for exercising write failures.
    #[cfg(test)]
    pub(crate) fn read_only(path: &Path) -> io::Result<Self> {
        File::create(path)?;
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, rec: &WalRecord) -> io::Result<()> {
        let line = serde_json::to_string(rec).map_err(io::Error::other)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.file.sync_data()
    }

    /// Reads every segment in `dir`, oldest first. A torn trailing line is skipped.
    pub fn replay(dir: &Path) -> io::Result<Vec<WalRecord>> {
        let mut out = Vec::new();
        let rd = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e),
        };
        let mut files: Vec<_> = rd.filter_map(|e| e.ok()).collect();
        files.sort_by_key(|e| e.file_name());
        for f in files {
            let p = f.path();
            if p.extension().and_then(|s| s.to_str()) != Some("log") {
                continue;
            }
            let br = BufReader::new(File::open(&p)?);
            for (n, line) in br.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<WalRecord>(&line) {
                    Ok(rec) => out.push(rec),
                    Err(e) => warn!(file = %p.display(), line = n + 1, error = %e, "skipping unreadable wal record"),
                }
            }
        }
        Ok(out)
    }
}
