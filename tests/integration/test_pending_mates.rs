//! Disk-backed and in-memory pending mate stores agree on the same workload.

use mateflow_lib::mateflow_spill::SpillConfig;
use mateflow_lib::mates::{DiskPendingMates, InMemoryPendingMates, PendingMates, ReadEnds};
use tempfile::TempDir;

fn ends(reference: u32, position: u32) -> ReadEnds {
    ReadEnds {
        library_id: 1,
        reference_index: reference,
        unclipped_five_prime: position,
        reverse: position % 2 == 0,
        score: position * 3,
        read_group: (position % 3 == 0).then(|| "rg1".to_string()),
    }
}

/// Stores reads across many partitions, then drains partitions in order, returning what each
/// removal found.
fn drain<P: PendingMates>(pending: &mut P, partitions: usize) -> Vec<Option<ReadEnds>> {
    for i in 0..200u32 {
        let partition = (i as usize * 7) % partitions;
        pending.put(partition, format!("read{i}"), ends(partition as u32, i)).unwrap();
    }
    let mut found = Vec::new();
    for partition in 0..partitions {
        for i in 0..200u32 {
            if (i as usize * 7) % partitions == partition || i % 50 == 0 {
                found.push(pending.remove(partition, &format!("read{i}")).unwrap());
            }
        }
    }
    found
}

#[test]
fn test_disk_and_memory_agree() {
    let scratch = TempDir::new().unwrap();
    let config = SpillConfig::new().max_open_files(3).temp_dir(scratch.path().to_path_buf());
    let mut disk = DiskPendingMates::new(config).unwrap();
    let mut memory = InMemoryPendingMates::new();

    let from_disk = drain(&mut disk, 25);
    let from_memory = drain(&mut memory, 25);

    assert_eq!(from_disk, from_memory);
    assert_eq!(from_disk.iter().filter(|e| e.is_some()).count(), 200);
    assert_eq!(disk.size(), 0);
    assert_eq!(memory.size(), 0);
}

#[test]
fn test_spill_files_live_under_configured_directory() {
    let scratch = TempDir::new().unwrap();
    let config = SpillConfig::new().temp_dir(scratch.path().to_path_buf());
    {
        let mut disk = DiskPendingMates::new(config).unwrap();
        disk.put(0, "a".to_string(), ends(0, 1)).unwrap();
        disk.put(4, "b".to_string(), ends(4, 2)).unwrap();
        assert_eq!(disk.partitions_on_disk(), 1);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 1);
    }
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
