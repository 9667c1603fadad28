use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use super::paths::OutputTarget;
use crate::error::{Result, SplitError};

/// Lines destined for one output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowGroup {
    lines: Vec<Vec<u8>>,
    data_rows: usize,
}

impl RowGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a group with a copy of the header line. The header does not
    /// count as a data row.
    pub fn with_header(header: &[u8]) -> Self {
        Self {
            lines: vec![header.to_vec()],
            data_rows: 0,
        }
    }

    pub fn push(&mut self, line: Vec<u8>) {
        self.lines.push(line);
        self.data_rows += 1;
    }

    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    pub fn data_rows(&self) -> usize {
        self.data_rows
    }

    pub fn has_data(&self) -> bool {
        self.data_rows > 0
    }
}

/// A finished output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub index: usize,
    pub path: PathBuf,
    /// Lines in the file, injected header included.
    pub lines: usize,
    pub data_rows: usize,
    /// Lines that failed to write and were skipped.
    pub failed_lines: usize,
}

/// Write `lines` to `out`, each followed by `\n`, and return how many failed.
///
/// A line that fails to write is logged and skipped; later lines are still written.
pub fn write_lines<W: Write>(out: &mut W, lines: &[Vec<u8>], path: &Path) -> usize {
    let mut failed_lines = 0;
    for (n, line) in lines.iter().enumerate() {
        if let Err(e) = out.write_all(line).and_then(|_| out.write_all(b"\n")) {
            failed_lines += 1;
            tracing::warn!(path = %path.display(), line = n + 1, error = %e, "Failed to write line");
        }
    }
    failed_lines
}

/// Write one group to its own file.
///
/// Creating the file and the final flush are fatal on failure. A line that
/// fails to write is logged and skipped.
pub fn write_group(target: &OutputTarget, index: usize, group: RowGroup) -> Result<WrittenFile> {
    let path = target.path_for(index);
    let file = File::create(&path).map_err(|source| SplitError::CreateOutput {
        path: path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    let failed_lines = write_lines(&mut out, group.lines(), &path);

    let file = out.into_inner().map_err(|e| SplitError::CloseOutput {
        path: path.clone(),
        source: e.into_error(),
    })?;
    file.sync_all().map_err(|source| SplitError::CloseOutput {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(index, path = %path.display(), lines = group.lines().len(), "Wrote group");

    Ok(WrittenFile {
        index,
        path,
        lines: group.lines().len(),
        data_rows: group.data_rows(),
        failed_lines,
    })
}

struct WriteHandle {
    index: usize,
    rx: Receiver<Result<WrittenFile>>,
}

/// The writer tasks of one split.
///
/// Each spawned row group is written on this split's own thread pool while the caller
/// keeps scanning; [`WriterGroup::join`] waits for every one of them.
pub struct WriterGroup {
    pool: rayon::ThreadPool,
    target: Arc<OutputTarget>,
    /// Writers that have not reported back yet.
    pending: Vec<WriteHandle>,
    /// Files already collected by `poll_failures`, in completion order.
    finished: Vec<WrittenFile>,
}

impl WriterGroup {
    pub fn new(target: OutputTarget, threads: Option<usize>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("splitter-writer-{}", i))
            // A panicking writer drops its sender; join reports it as an error.
            .panic_handler(|_| {})
            .build()?;
        Ok(Self {
            pool,
            target: Arc::new(target),
            pending: Vec::new(),
            finished: Vec::new(),
        })
    }

    /// Hand `group` to a writer task and return immediately.
    pub fn spawn(&mut self, index: usize, group: RowGroup) {
        let (tx, rx) = mpsc::sync_channel(1);
        let target = Arc::clone(&self.target);
        tracing::debug!(index, rows = group.data_rows(), "Dispatching group");
        self.pool.spawn(move || {
            // The receiver is gone only if the split already failed.
            let _ = tx.send(write_group(&target, index, group));
        });
        self.pending.push(WriteHandle { index, rx });
    }

    /// Collect writers that have already finished, failing on the first
    /// fatal error among them. Only writers still in flight are visited.
    pub fn poll_failures(&mut self) -> Result<()> {
        let mut failure = None;
        let finished = &mut self.finished;
        self.pending.retain_mut(|handle| {
            if failure.is_some() {
                return true;
            }
            match handle.rx.try_recv() {
                Ok(Ok(file)) => {
                    finished.push(file);
                    false
                }
                Ok(Err(e)) => {
                    failure = Some(e);
                    false
                }
                Err(TryRecvError::Empty) => true,
                Err(TryRecvError::Disconnected) => {
                    failure = Some(SplitError::WriterPanicked {
                        index: handle.index,
                    });
                    false
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of writers spawned so far.
    pub fn len(&self) -> usize {
        self.pending.len() + self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of writers that have not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Wait for every spawned writer. Results come back in index order.
    pub fn join(self) -> Result<Vec<WrittenFile>> {
        let mut written = self.finished;
        written.reserve(self.pending.len());
        for handle in self.pending {
            let file = handle
                .rx
                .recv()
                .map_err(|_| SplitError::WriterPanicked {
                    index: handle.index,
                })??;
            written.push(file);
        }
        written.sort_by_key(|file| file.index);
        Ok(written)
    }
}
