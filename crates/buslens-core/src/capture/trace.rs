use std::collections::BTreeMap;

use super::CaptureContext;

/// Digital level history of one capture channel.
///
/// Stored as the level at sample 0 plus the sorted sample indices where the
/// level toggles. The trace covers samples `0..end_sample`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalTrace {
    initial_high: bool,
    transitions: Vec<u64>,
    end_sample: u64,
}

impl DigitalTrace {
    /// Caller guarantees `transitions` is strictly increasing and below
    /// `end_sample`; the JSON source validates this before construction.
    pub fn new(initial_high: bool, transitions: Vec<u64>, end_sample: u64) -> Self {
        Self {
            initial_high,
            transitions,
            end_sample,
        }
    }

    /// Constant-level trace.
    pub fn constant(high: bool, end_sample: u64) -> Self {
        Self::new(high, Vec::new(), end_sample)
    }

    pub fn end_sample(&self) -> u64 {
        self.end_sample
    }

    /// Level at `sample`; a toggle at index `t` takes effect at `t`.
    pub fn level_at(&self, sample: u64) -> bool {
        let toggles = self.transitions.partition_point(|&t| t <= sample);
        self.initial_high ^ (toggles % 2 == 1)
    }

    /// Whether the line is low at any sample from `start` to the end of the
    /// capture.
    pub fn driven_low_from(&self, start: u64) -> bool {
        if start >= self.end_sample {
            return false;
        }
        if !self.level_at(start) {
            return true;
        }
        // Levels alternate, so any later toggle from high goes low.
        self.transitions
            .iter()
            .any(|&t| t > start && t < self.end_sample)
    }
}

/// Named channel traces of one capture.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChannelMap {
    traces: BTreeMap<String, DigitalTrace>,
}

impl ChannelMap {
    pub(crate) fn insert(&mut self, name: String, trace: DigitalTrace) {
        self.traces.insert(name, trace);
    }
}

impl CaptureContext for ChannelMap {
    fn has_channel(&self, name: &str) -> bool {
        self.traces.contains_key(name)
    }

    fn trace(&self, name: &str) -> Option<&DigitalTrace> {
        self.traces.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::DigitalTrace;

    #[test]
    fn level_follows_toggles() {
        let trace = DigitalTrace::new(true, vec![10, 20], 100);
        assert!(trace.level_at(0));
        assert!(trace.level_at(9));
        assert!(!trace.level_at(10));
        assert!(!trace.level_at(19));
        assert!(trace.level_at(20));
        assert!(trace.level_at(99));
    }

    #[test]
    fn driven_low_only_counts_samples_after_start() {
        let trace = DigitalTrace::new(true, vec![10, 20], 100);
        assert!(trace.driven_low_from(0));
        assert!(trace.driven_low_from(15));
        assert!(!trace.driven_low_from(20));
        assert!(!trace.driven_low_from(150));
    }

    #[test]
    fn constant_low_is_always_driven_low() {
        let trace = DigitalTrace::constant(false, 50);
        assert!(trace.driven_low_from(0));
        assert!(trace.driven_low_from(49));
        assert!(!DigitalTrace::constant(true, 50).driven_low_from(0));
    }
}
