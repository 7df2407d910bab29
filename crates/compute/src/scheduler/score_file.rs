use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Single writer for a batch's score file. One `"{artifact} {score}"` line
/// per scored decoy.
pub struct ScoreFile {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl ScoreFile {
    /// Create (truncating) the score file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, artifact: &Path, score: f64) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("score file writer lock poisoned"))?;
        writeln!(writer, "{} {}", artifact.display(), score)
    }

    /// Flush buffered lines and sync them to disk.
    pub fn finish(self) -> io::Result<()> {
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| io::Error::other("score file writer lock poisoned"))?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

/// Parse a score file back into `(artifact, score)` pairs. Lines that do not
/// end in a number are skipped.
pub fn read_scores(path: &Path) -> io::Result<Vec<(PathBuf, f64)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut scores = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let Some((artifact, score)) = line.rsplit_once(' ') else {
            continue;
        };
        if let Ok(score) = score.parse::<f64>() {
            scores.push((PathBuf::from(artifact), score));
        }
    }
    Ok(scores)
}
