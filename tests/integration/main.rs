//! End-to-end tests for the mateflow library and CLI.

mod helpers;
mod test_group_hits_command;
mod test_multi_hit_grouping;
mod test_pair_mates_command;
mod test_pending_mates;
