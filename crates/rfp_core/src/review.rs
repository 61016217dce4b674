use crate::{RequirementFlag, RequirementJudgements, Section, SectionSubmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveOutcome {
    /// The section was marked reviewed and the cursor moved to the next one.
    Advanced,
    /// The section was marked reviewed; it was the last one so the cursor stayed.
    AtEnd,
}

/// Copilot-mode review cursor over the sections of one RFP.
///
/// `reviewed` only ever goes from false to true. A failed submit leaves both
/// the cursor and the flags untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionReview {
    rfp: Option<String>,
    sections: Vec<Section>,
    index: usize,
    pending: Option<usize>,
    analysis: String,
}

impl SectionReview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all sections with those of `rfp` and rewind to the first.
    pub fn load(&mut self, rfp: impl Into<String>, sections: Vec<Section>) {
        self.rfp = Some(rfp.into());
        self.sections = sections;
        self.index = 0;
        self.pending = None;
        self.analysis.clear();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn rfp(&self) -> Option<&str> {
        self.rfp.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn current(&self) -> Option<&Section> {
        self.sections.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.sections.len()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn reviewed_count(&self) -> usize {
        self.sections.iter().filter(|s| s.reviewed).count()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_analysis(&mut self, analysis: impl Into<String>) {
        self.analysis = analysis.into();
    }

    /// Returns true if the cursor moved. The cursor is pinned while a submit is in flight.
    pub fn previous(&mut self) -> bool {
        if self.pending.is_none() && self.has_previous() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.pending.is_none() && self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Change the judgement of one requirement of the current section.
    pub fn mark_requirement(&mut self, requirement: usize, flag: RequirementFlag) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let Some(section) = self.sections.get_mut(self.index) else {
            return false;
        };
        match section.requirements.get_mut(requirement) {
            Some(req) if req.is_requirement != flag => {
                req.is_requirement = flag;
                true
            }
            _ => false,
        }
    }

    /// Build the submission for the current section and mark it pending.
    ///
    /// Returns `None` when nothing is loaded or a submission is already in flight.
    pub fn begin_approve(&mut self) -> Option<SectionSubmission> {
        if self.pending.is_some() {
            return None;
        }
        let rfp = self.rfp.clone()?;
        let section = self.sections.get(self.index)?;
        let submission = SectionSubmission {
            rfp_name: rfp,
            section_id: section.section_id.clone(),
            requirements: RequirementJudgements {
                analysis: self.analysis.clone(),
                output: section.requirements.clone(),
            },
        };
        self.pending = Some(self.index);
        Some(submission)
    }

    /// Commit a successful submission: mark that section reviewed and advance.
    ///
    /// Returns `None` if no submission was pending.
    pub fn approve_succeeded(&mut self) -> Option<ApproveOutcome> {
        let submitted = self.pending.take()?;
        if let Some(section) = self.sections.get_mut(submitted) {
            section.reviewed = true;
        }
        if self.next() {
            Some(ApproveOutcome::Advanced)
        } else {
            Some(ApproveOutcome::AtEnd)
        }
    }

    /// Drop a failed submission without touching index or flags.
    pub fn approve_failed(&mut self) {
        self.pending = None;
    }
}
