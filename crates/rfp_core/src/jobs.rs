use crate::{JobRecord, JobStatus};

/// Keyed job list. Entries keep the order in which their name first appeared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobList {
    entries: Vec<JobRecord>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a polled batch: update by name in place, append unseen names,
    /// never remove. Returns true if the list changed.
    pub fn merge<I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = JobRecord>,
    {
        let mut changed = false;
        for incoming in batch {
            match self.entries.iter_mut().find(|e| e.name == incoming.name) {
                Some(existing) => {
                    if existing.status != incoming.status {
                        existing.status = incoming.status;
                        changed = true;
                    }
                }
                None => {
                    self.entries.push(incoming);
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn get(&self, name: &str) -> Option<&JobRecord> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[JobRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Polling continues only while the most recent batch has a job in `Processing`.
pub fn keeps_polling(batch: &[JobRecord]) -> bool {
    batch.iter().any(|job| job.status == JobStatus::Processing)
}
