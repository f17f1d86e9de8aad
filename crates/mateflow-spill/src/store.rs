//! On-disk partition files with a bounded pool of open writers.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use log::debug;
use lru::LruCache;
use tempfile::TempDir;

use crate::codec::Codec;
use crate::error::{Result, SpillError, SpillOperation};

/// Buffer size for partition writers and readers.
const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Prefix for the scratch directory name.
const SCRATCH_PREFIX: &str = "mateflow-spill.";

/// Manages one append-only file per partition index inside an exclusively owned scratch
/// directory.
///
/// At most `max_open_files` writers are open at a time; opening one more closes the least
/// recently used writer after flushing it. Appending after a reopen continues the same file.
pub(crate) struct PartitionStore<C> {
    /// Open writers keyed by partition index. Declared before `dir` so they close first.
    writers: LruCache<usize, BufWriter<File>>,
    /// Entry count of every partition that has a backing file.
    counts: AHashMap<usize, usize>,
    /// Sum of `counts`.
    entries_on_disk: usize,
    /// Entry codec.
    codec: C,
    /// Scratch directory, removed on drop.
    dir: TempDir,
}

impl<C> PartitionStore<C> {
    /// Create a store with a fresh scratch directory under `parent` (or the system temp dir).
    pub(crate) fn new(codec: C, max_open_files: NonZeroUsize, parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|source| SpillError::ScratchDir {
            parent: parent.map_or_else(std::env::temp_dir, Path::to_path_buf),
            source,
        })?;
        debug!("Created spill scratch directory {}", dir.path().display());

        Ok(Self {
            writers: LruCache::new(max_open_files),
            counts: AHashMap::new(),
            entries_on_disk: 0,
            codec,
            dir,
        })
    }

    /// The scratch directory holding the partition files.
    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Total entries across all partition files.
    pub(crate) fn entries_on_disk(&self) -> usize {
        self.entries_on_disk
    }

    /// Number of partitions with a backing file.
    pub(crate) fn partition_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of writers currently open.
    pub(crate) fn open_writers(&self) -> usize {
        self.writers.len()
    }

    /// Entry count of one partition (zero when it has no file).
    pub(crate) fn entries_in(&self, partition: usize) -> usize {
        self.counts.get(&partition).copied().unwrap_or(0)
    }

    fn path_for(&self, partition: usize) -> PathBuf {
        self.dir.path().join(format!("partition_{partition}.bin"))
    }

    fn io_error(&self, operation: SpillOperation, partition: usize, source: io::Error) -> SpillError {
        SpillError::CodecIo { operation, partition, path: self.path_for(partition), source }
    }

    /// Make sure a writer for `partition` is open, evicting the least recently used if needed.
    fn ensure_writer(&mut self, partition: usize) -> Result<()> {
        if self.writers.contains(&partition) {
            return Ok(());
        }

        if self.writers.len() == self.writers.cap().get() {
            if let Some((evicted, mut writer)) = self.writers.pop_lru() {
                debug!("Closing writer for spill partition {evicted} to open partition {partition}");
                writer.flush().map_err(|e| self.io_error(SpillOperation::Flush, evicted, e))?;
            }
        }

        let path = self.path_for(partition);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| self.io_error(SpillOperation::Open, partition, e))?;
        self.writers.put(partition, BufWriter::with_capacity(IO_BUFFER_SIZE, file));
        Ok(())
    }

    /// Close the writer for `partition` if one is open, flushing buffered entries.
    fn close_writer(&mut self, partition: usize) -> Result<()> {
        if let Some(mut writer) = self.writers.pop(&partition) {
            writer.flush().map_err(|e| self.io_error(SpillOperation::Flush, partition, e))?;
        }
        Ok(())
    }

    /// Append one entry to the file of `partition`.
    pub(crate) fn append<K, V>(&mut self, partition: usize, key: &K, value: &V) -> Result<()>
    where
        C: Codec<K, V>,
    {
        self.ensure_writer(partition)?;
        let path = self.path_for(partition);
        let writer = self.writers.get_mut(&partition).ok_or_else(|| SpillError::CodecIo {
            operation: SpillOperation::Open,
            partition,
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "partition writer missing from pool"),
        })?;
        self.codec.encode(key, value, writer).map_err(|source| SpillError::CodecIo {
            operation: SpillOperation::Encode,
            partition,
            path,
            source,
        })?;

        *self.counts.entry(partition).or_insert(0) += 1;
        self.entries_on_disk += 1;
        Ok(())
    }

    /// Read every entry of `partition` and delete its file.
    ///
    /// Returns an empty vector when the partition has no file.
    pub(crate) fn take<K, V>(&mut self, partition: usize) -> Result<Vec<(K, V)>>
    where
        C: Codec<K, V>,
    {
        let Some(count) = self.counts.get(&partition).copied() else {
            return Ok(Vec::new());
        };
        self.close_writer(partition)?;

        let path = self.path_for(partition);
        let file = File::open(&path).map_err(|e| self.io_error(SpillOperation::Open, partition, e))?;
        let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let entry = self
                .codec
                .decode(&mut reader)
                .map_err(|e| self.io_error(SpillOperation::Decode, partition, e))?;
            entries.push(entry);
        }
        drop(reader);

        fs::remove_file(&path).map_err(|e| self.io_error(SpillOperation::Delete, partition, e))?;
        self.counts.remove(&partition);
        self.entries_on_disk -= count;
        debug!("Loaded {count} entries from spill partition {partition}");

        Ok(entries)
    }

    /// Flush every open writer without closing it.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let mut failure = None;
        for (partition, writer) in &mut self.writers {
            if let Err(e) = writer.flush() {
                failure = Some((*partition, e));
                break;
            }
        }
        match failure {
            Some((partition, e)) => Err(self.io_error(SpillOperation::Flush, partition, e)),
            None => Ok(()),
        }
    }
}
