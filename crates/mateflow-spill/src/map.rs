//! The spillover map.

use std::borrow::Borrow;
use std::hash::Hash;
use std::path::Path;

use ahash::AHashMap;
use log::debug;

use crate::codec::{Codec, Spillable, SpillableCodec};
use crate::config::SpillConfig;
use crate::error::Result;
use crate::store::PartitionStore;

/// A key/value map partitioned by an integer index, with one partition held in RAM.
///
/// Entries `put` under the resident partition go straight into an in-memory hash map. Entries
/// for any other partition are appended to that partition's file. Calling `remove` with a
/// different partition index moves the resident partition: the current in-memory entries are
/// written out to their partition file, and the requested partition's file is read into memory
/// and deleted.
///
/// # Access order
///
/// Memory stays bounded to roughly one partition only if `remove` is called with
/// non-decreasing partition indices, as happens when the map is driven by a coordinate-sorted
/// stream. Other orders still return every entry correctly but may load and spill the same
/// partition repeatedly.
///
/// The first partition touched by `put` or `remove` becomes the resident partition.
///
/// # Cleanup
///
/// Partition files live in a scratch directory owned by the map and removed when it is
/// dropped, including while unwinding from a panic.
pub struct SpilloverMap<K, V, C = SpillableCodec> {
    /// Partition currently held in memory.
    ram_index: Option<usize>,
    /// Entries of the resident partition.
    ram_map: AHashMap<K, V>,
    /// Partition files for all other partitions.
    store: PartitionStore<C>,
}

impl<K, V> SpilloverMap<K, V, SpillableCodec>
where
    K: Spillable + Eq + Hash,
    V: Spillable,
{
    /// Create a map that spills entries with their [`Spillable`] encodings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the scratch directory cannot be
    /// created.
    pub fn new(config: SpillConfig) -> Result<Self> {
        Self::with_codec(SpillableCodec, config)
    }
}

impl<K, V, C> SpilloverMap<K, V, C>
where
    K: Eq + Hash,
    C: Codec<K, V>,
{
    /// Create a map that spills entries with a custom codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the scratch directory cannot be
    /// created.
    pub fn with_codec(codec: C, config: SpillConfig) -> Result<Self> {
        let max_open_files = config.validated_max_open_files()?;
        let store = PartitionStore::new(codec, max_open_files, config.get_temp_dir())?;
        Ok(Self { ram_index: None, ram_map: AHashMap::new(), store })
    }

    /// Store `value` under `key` in partition `partition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry has to be spilled and the partition file cannot be opened
    /// or written.
    pub fn put(&mut self, partition: usize, key: K, value: V) -> Result<()> {
        let resident = *self.ram_index.get_or_insert(partition);
        if partition == resident {
            self.ram_map.insert(key, value);
            Ok(())
        } else {
            self.store.append(partition, &key, &value)
        }
    }

    /// Remove and return the value stored under `key` in partition `partition`.
    ///
    /// If `partition` is not the resident partition it becomes resident first (see the type
    /// documentation).
    ///
    /// # Errors
    ///
    /// Returns an error if spilling the current resident partition or loading `partition`
    /// fails.
    pub fn remove<Q>(&mut self, partition: usize, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.ram_index != Some(partition) {
            self.make_resident(partition)?;
        }
        Ok(self.ram_map.remove(key))
    }

    /// Total number of entries, in RAM and on disk.
    #[must_use]
    pub fn size(&self) -> usize {
        self.ram_map.len() + self.store.entries_on_disk()
    }

    /// Number of entries held in RAM.
    #[must_use]
    pub fn size_in_ram(&self) -> usize {
        self.ram_map.len()
    }

    /// Returns `true` if the map holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The partition currently held in RAM, if any partition has been touched.
    #[must_use]
    pub fn ram_index(&self) -> Option<usize> {
        self.ram_index
    }

    /// Number of partitions that currently have a backing file.
    #[must_use]
    pub fn partitions_on_disk(&self) -> usize {
        self.store.partition_count()
    }

    /// Number of partition writers currently held open.
    #[must_use]
    pub fn open_writers(&self) -> usize {
        self.store.open_writers()
    }

    /// The scratch directory holding partition files.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Flush buffered entries of all open partition writers.
    ///
    /// # Errors
    ///
    /// Returns an error if any writer fails to flush.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    /// Spill the resident partition and load `partition` into RAM.
    fn make_resident(&mut self, partition: usize) -> Result<()> {
        if let Some(previous) = self.ram_index {
            if !self.ram_map.is_empty() {
                debug!(
                    "Spilling {} in-memory entries of partition {previous} before loading {partition}",
                    self.ram_map.len()
                );
                for (key, value) in self.ram_map.drain() {
                    self.store.append(previous, &key, &value)?;
                }
            }
        }

        debug!(
            "Loading spill partition {partition} ({} entries)",
            self.store.entries_in(partition)
        );
        let entries = self.store.take(partition)?;
        self.ram_map = entries.into_iter().collect();
        self.ram_index = Some(partition);
        Ok(())
    }
}
