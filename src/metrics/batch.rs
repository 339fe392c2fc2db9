use super::measurement::Measurement;

/// Number of measurements that triggers a flush.
pub const FLUSH_THRESHOLD: usize = 50;

/// Worker-local buffer of measurements awaiting a flush.
#[derive(Debug)]
pub struct MeasurementBatch {
    pending: Vec<Measurement>,
    threshold: usize,
}

impl Default for MeasurementBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(FLUSH_THRESHOLD)
    }

    /// A threshold of zero is treated as one.
    #[must_use]
    pub fn with_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            pending: Vec::with_capacity(threshold),
            threshold,
        }
    }

    /// Appends `measurement`, returning the full batch once the threshold is
    /// reached.
    pub fn push(&mut self, measurement: Measurement) -> Option<Vec<Measurement>> {
        self.pending.push(measurement);
        if self.pending.len() >= self.threshold {
            return Some(self.replace());
        }
        None
    }

    /// Takes whatever is pending, if anything.
    pub fn take(&mut self) -> Option<Vec<Measurement>> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.replace())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn replace(&mut self) -> Vec<Measurement> {
        std::mem::replace(&mut self.pending, Vec::with_capacity(self.threshold))
    }
}
