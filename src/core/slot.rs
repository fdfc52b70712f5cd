//! Concurrency slots and their fixed ordering inside a schedule.

use std::fmt;

use crate::config::PreallocationConfiguration;

/// One concurrency slot of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Slot for the `i`-th in-flight luminosity block.
    Lumi(u32),
    /// Slot for the `i`-th in-flight run.
    Run(u32),
    /// Slot for the `i`-th in-flight process block.
    ProcessBlock(u32),
    /// The single job-level slot.
    Job,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lumi(i) => write!(f, "lumi[{i}]"),
            Self::Run(i) => write!(f, "run[{i}]"),
            Self::ProcessBlock(i) => write!(f, "process_block[{i}]"),
            Self::Job => f.write_str("job"),
        }
    }
}

/// Slot counts of a schedule and the mapping between slots and positions.
///
/// Positions are ordered lumi slots, then run slots, then process-block
/// slots, then the job slot, which is always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    lumis: u32,
    runs: u32,
    process_blocks: u32,
}

impl SlotLayout {
    /// Layout with the given per-kind slot counts.
    pub const fn new(lumis: u32, runs: u32, process_blocks: u32) -> Self {
        Self {
            lumis,
            runs,
            process_blocks,
        }
    }

    /// Layout matching a preallocation configuration.
    pub const fn from_prealloc(prealloc: &PreallocationConfiguration) -> Self {
        Self::new(
            prealloc.number_of_luminosity_blocks,
            prealloc.number_of_runs,
            prealloc.number_of_process_blocks,
        )
    }

    /// Total number of slots, job slot included.
    pub const fn len(&self) -> usize {
        self.lumis as usize + self.runs as usize + self.process_blocks as usize + 1
    }

    /// A layout always holds at least the job slot.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Position of the job slot.
    pub const fn job_index(&self) -> usize {
        self.len() - 1
    }

    /// Position of `slot`, or `None` if the layout has no such slot.
    pub const fn index_of(&self, slot: Slot) -> Option<usize> {
        let lumis = self.lumis as usize;
        let runs = self.runs as usize;
        let blocks = self.process_blocks as usize;
        match slot {
            Slot::Lumi(i) if i < self.lumis => Some(i as usize),
            Slot::Run(i) if i < self.runs => Some(lumis + i as usize),
            Slot::ProcessBlock(i) if i < self.process_blocks => Some(lumis + runs + i as usize),
            Slot::Job => Some(lumis + runs + blocks),
            _ => None,
        }
    }

    /// Slot at `index`, or `None` past the end.
    pub fn slot_at(&self, index: usize) -> Option<Slot> {
        let lumis = self.lumis as usize;
        let runs = self.runs as usize;
        let blocks = self.process_blocks as usize;
        if index < lumis {
            u32::try_from(index).ok().map(Slot::Lumi)
        } else if index < lumis + runs {
            u32::try_from(index - lumis).ok().map(Slot::Run)
        } else if index < lumis + runs + blocks {
            u32::try_from(index - lumis - runs).ok().map(Slot::ProcessBlock)
        } else if index == self.job_index() {
            Some(Slot::Job)
        } else {
            None
        }
    }

    /// All slots in position order.
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.len()).filter_map(|i| self.slot_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_slot_is_last() {
        let layout = SlotLayout::new(2, 2, 1);
        assert_eq!(layout.len(), 6);
        assert_eq!(layout.job_index(), 5);
        assert_eq!(layout.index_of(Slot::Job), Some(5));
        assert_eq!(layout.slot_at(5), Some(Slot::Job));
        assert_eq!(layout.slot_at(6), None);
    }

    #[test]
    fn test_order_is_lumi_run_block_job() {
        let layout = SlotLayout::new(2, 1, 1);
        let slots: Vec<Slot> = layout.iter().collect();
        assert_eq!(
            slots,
            vec![
                Slot::Lumi(0),
                Slot::Lumi(1),
                Slot::Run(0),
                Slot::ProcessBlock(0),
                Slot::Job
            ]
        );
    }

    #[test]
    fn test_index_round_trips_every_slot() {
        let layout = SlotLayout::new(3, 2, 0);
        for (i, slot) in layout.iter().enumerate() {
            assert_eq!(layout.index_of(slot), Some(i));
        }
    }

    #[test]
    fn test_out_of_range_slots() {
        let layout = SlotLayout::new(1, 1, 0);
        assert_eq!(layout.index_of(Slot::Lumi(1)), None);
        assert_eq!(layout.index_of(Slot::ProcessBlock(0)), None);
        assert_eq!(layout.len(), 3);
    }
}
