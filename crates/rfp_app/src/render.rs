//! Terminal rendering. Each call compares the new view with the last one it
//! drew and prints only what changed, so streamed text appears as it arrives.

use std::io::{self, Write};

use rfp_core::{AppViewModel, JobRecord, Requirement, RequirementFlag, Role, Section};

pub struct TerminalRenderer<W: Write> {
    out: W,
    last: AppViewModel,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: AppViewModel::default(),
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.page != self.last.page {
            self.last = AppViewModel {
                page: view.page,
                ..AppViewModel::default()
            };
        }

        let jobs_before = self.last.upload.jobs.clone();
        self.render_jobs(&view.upload.jobs, &jobs_before)?;
        self.render_transcript(view)?;
        self.render_extraction(view)?;
        self.render_builder(view)?;

        if view.notice != self.last.notice {
            if let Some(notice) = &view.notice {
                let tag = if notice.is_error() { "error" } else { "info" };
                writeln!(self.out, "[{tag}] {}", notice.text())?;
            }
        }

        self.out.flush()?;
        self.last = view.clone();
        Ok(())
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    fn render_jobs(&mut self, jobs: &[JobRecord], before: &[JobRecord]) -> io::Result<()> {
        for job in jobs {
            if !before.contains(job) {
                writeln!(self.out, "  {:<40} {}", job.name, job.status)?;
            }
        }
        Ok(())
    }

    fn render_transcript(&mut self, view: &AppViewModel) -> io::Result<()> {
        let before = &self.last.analyzer.messages;
        for (i, message) in view.analyzer.messages.iter().enumerate() {
            match before.get(i) {
                Some(old) if old == message => {}
                Some(old) if old.role == message.role => {
                    let fresh = message.content.strip_prefix(old.content.as_str());
                    write!(self.out, "{}", fresh.unwrap_or(&message.content))?;
                }
                _ => match message.role {
                    // The user typed it; echoing it again is noise.
                    Role::User => {}
                    Role::Assistant => write!(self.out, "assistant> {}", message.content)?,
                    Role::System => writeln!(self.out, "-- {}", message.content)?,
                },
            }
        }
        if self.last.analyzer.streaming && !view.analyzer.streaming {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn render_extraction(&mut self, view: &AppViewModel) -> io::Result<()> {
        let now = &view.extraction;
        let before = self.last.extraction.clone();

        if now.current_section != before.current_section
            || now.section_index != before.section_index
        {
            if let Some(section) = &now.current_section {
                self.render_section(section, now.section_index, now.section_count)?;
                writeln!(
                    self.out,
                    "({} of {} reviewed)",
                    now.reviewed_count, now.section_count
                )?;
            }
        }
        if now.progress != before.progress {
            writeln!(
                self.out,
                "progress: extraction {:.0}%, review {:.0}%",
                now.progress.extraction, now.progress.review
            )?;
        }
        self.render_jobs(&now.artifacts, &before.artifacts)
    }

    fn render_section(&mut self, section: &Section, index: usize, count: usize) -> io::Result<()> {
        let reviewed = if section.reviewed { " (reviewed)" } else { "" };
        writeln!(
            self.out,
            "\n== Section {}/{} [{}]{} ==",
            index + 1,
            count,
            section.section_id,
            reviewed
        )?;
        writeln!(self.out, "{}", section.content.trim())?;
        for (i, requirement) in section.requirements.iter().enumerate() {
            writeln!(
                self.out,
                "  [{i}] {:<5} {}",
                flag_label(requirement.is_requirement),
                requirement_line(requirement)
            )?;
        }
        Ok(())
    }

    fn render_builder(&mut self, view: &AppViewModel) -> io::Result<()> {
        let now = &view.builder;
        let before = self.last.builder.clone();

        if now.current != before.current || now.index != before.index {
            if let Some(requirement) = &now.current {
                writeln!(
                    self.out,
                    "\n== Requirement {}/{} ==\n{}",
                    now.index + 1,
                    now.count,
                    requirement_line(requirement)
                )?;
            }
        }
        if now.generated.len() > before.generated.len() {
            match now.generated.strip_prefix(before.generated.as_str()) {
                Some(fresh) => write!(self.out, "{fresh}")?,
                None => write!(self.out, "{}", now.generated)?,
            }
        }
        if before.generating && !now.generating {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

fn flag_label(flag: RequirementFlag) -> &'static str {
    match flag {
        RequirementFlag::Yes => "yes",
        RequirementFlag::No => "no",
        RequirementFlag::Unset => "-",
    }
}

fn requirement_line(requirement: &Requirement) -> String {
    let mut location = Vec::new();
    if !requirement.section_number.is_empty() {
        location.push(format!("§{}", requirement.section_number));
    }
    if !requirement.page_number.is_empty() {
        location.push(format!("p.{}", requirement.page_number));
    }
    if location.is_empty() {
        requirement.content.trim().to_string()
    } else {
        format!("({}) {}", location.join(", "), requirement.content.trim())
    }
}
