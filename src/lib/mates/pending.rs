//! Storage for reads whose mates have not been seen yet.

use ahash::AHashMap;
use mateflow_spill::{SpillConfig, SpilloverMap};

use super::ReadEnds;
use crate::errors::Result;

/// A map from query name to [`ReadEnds`], partitioned by the reference index at which the
/// entry will be looked up again.
///
/// Lookups must visit partitions in non-decreasing order for disk-backed implementations to
/// stay within their memory bound.
pub trait PendingMates {
    /// Stores `ends` for `name`, to be removed while processing reference `partition`.
    fn put(&mut self, partition: usize, name: String, ends: ReadEnds) -> Result<()>;

    /// Removes the entry for `name` from `partition`.
    fn remove(&mut self, partition: usize, name: &str) -> Result<Option<ReadEnds>>;

    /// Number of entries held.
    fn size(&self) -> usize;

    /// Number of entries held in memory.
    fn size_in_ram(&self) -> usize;
}

/// Keeps every pending entry in one hash map. Partitions only label entries.
#[derive(Debug, Default)]
pub struct InMemoryPendingMates {
    entries: AHashMap<(usize, String), ReadEnds>,
}

impl InMemoryPendingMates {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingMates for InMemoryPendingMates {
    fn put(&mut self, partition: usize, name: String, ends: ReadEnds) -> Result<()> {
        self.entries.insert((partition, name), ends);
        Ok(())
    }

    fn remove(&mut self, partition: usize, name: &str) -> Result<Option<ReadEnds>> {
        Ok(self.entries.remove(&(partition, name.to_string())))
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn size_in_ram(&self) -> usize {
        self.entries.len()
    }
}

/// Keeps the partition being processed in memory and spills the others to disk.
pub struct DiskPendingMates {
    map: SpilloverMap<String, ReadEnds>,
}

impl DiskPendingMates {
    /// Creates the map and its scratch directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the scratch directory cannot be created.
    pub fn new(config: SpillConfig) -> Result<Self> {
        Ok(Self { map: SpilloverMap::new(config)? })
    }

    /// Number of partitions currently spilled to disk.
    #[must_use]
    pub fn partitions_on_disk(&self) -> usize {
        self.map.partitions_on_disk()
    }
}

impl PendingMates for DiskPendingMates {
    fn put(&mut self, partition: usize, name: String, ends: ReadEnds) -> Result<()> {
        Ok(self.map.put(partition, name, ends)?)
    }

    fn remove(&mut self, partition: usize, name: &str) -> Result<Option<ReadEnds>> {
        Ok(self.map.remove(partition, name)?)
    }

    fn size(&self) -> usize {
        self.map.size()
    }

    fn size_in_ram(&self) -> usize {
        self.map.size_in_ram()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ends(position: u32) -> ReadEnds {
        ReadEnds {
            library_id: 0,
            reference_index: 0,
            unclipped_five_prime: position,
            reverse: false,
            score: 30,
            read_group: None,
        }
    }

    fn disk() -> Box<dyn PendingMates> {
        Box::new(DiskPendingMates::new(SpillConfig::new().max_open_files(2)).unwrap())
    }

    fn memory() -> Box<dyn PendingMates> {
        Box::new(InMemoryPendingMates::new())
    }

    #[rstest]
    #[case::memory(memory())]
    #[case::disk(disk())]
    fn test_put_then_remove_in_partition_order(#[case] mut pending: Box<dyn PendingMates>) {
        pending.put(0, "a".to_string(), ends(1)).unwrap();
        pending.put(3, "b".to_string(), ends(2)).unwrap();
        pending.put(1, "c".to_string(), ends(3)).unwrap();
        assert_eq!(pending.size(), 3);
        assert!(pending.size_in_ram() <= pending.size());

        assert_eq!(pending.remove(0, "a").unwrap(), Some(ends(1)));
        assert_eq!(pending.remove(1, "b").unwrap(), None);
        assert_eq!(pending.remove(1, "c").unwrap(), Some(ends(3)));
        assert_eq!(pending.remove(3, "b").unwrap(), Some(ends(2)));
        assert_eq!(pending.size(), 0);
    }

    #[test]
    fn test_disk_spills_other_partitions() {
        let mut pending = DiskPendingMates::new(SpillConfig::new()).unwrap();
        pending.put(0, "a".to_string(), ends(1)).unwrap();
        pending.put(5, "b".to_string(), ends(2)).unwrap();
        assert_eq!(pending.size_in_ram(), 1);
        assert_eq!(pending.partitions_on_disk(), 1);
    }
}
