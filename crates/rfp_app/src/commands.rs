use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use rfp_core::{AppViewModel, Msg, Page, RequirementFlag};
use rfp_engine::{ResponseDocument, ResponseExporter};
use rfp_logging::rfp_info;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::session::Session;

pub fn run(command: Command, mut session: Session, config: &AppConfig) -> Result<()> {
    let outcome = match command {
        Command::Upload { file } => upload(&mut session, &file),
        Command::List => list(&mut session),
        Command::Watch { rfp, kind } => match (rfp, kind) {
            (Some(rfp), Some(kind)) => watch_artifacts(&mut session, rfp, kind),
            _ => watch_in_progress(&mut session),
        },
        Command::Chat { rfp } => chat(&mut session, rfp),
        Command::Review { rfp } => review(&mut session, rfp),
        Command::Extract { rfp } => extract(&mut session, rfp),
        Command::Respond {
            rfp,
            index,
            instruction,
            export,
        } => respond(&mut session, config, rfp, index, instruction, export),
    };
    session.close()?;
    outcome
}

/// Turn an error notice left on the page into a non-zero exit.
fn check_notice(view: &AppViewModel) -> Result<()> {
    match &view.notice {
        Some(notice) if notice.is_error() => bail!("{}", notice.text()),
        _ => Ok(()),
    }
}

fn upload(session: &mut Session, file: &Path) -> Result<()> {
    session.dispatch_all([
        Msg::Navigate(Page::Upload),
        Msg::FileChosen(Some(file.display().to_string())),
        Msg::UploadClicked,
    ]);
    let view = session.run_until(|v| !v.upload.uploading && !v.upload.polling)?;
    check_notice(&view)
}

fn list(session: &mut Session) -> Result<()> {
    // Any page with an RFP sidebar loads the list on entry.
    session.dispatch(Msg::Navigate(Page::Analyzer));
    let view = session.run_until(|v| !v.loading_rfps)?;
    check_notice(&view)?;

    if view.rfps.is_empty() {
        println!("No RFPs found.");
    }
    for rfp in &view.rfps {
        println!("{:<40} {}", rfp.name, rfp.status);
    }
    Ok(())
}

fn watch_in_progress(session: &mut Session) -> Result<()> {
    session.dispatch(Msg::Navigate(Page::Upload));
    let view = session.run_until(|v| !v.upload.polling)?;
    if view.upload.jobs.is_empty() {
        println!("Nothing in progress.");
    }
    Ok(())
}

fn watch_artifacts(session: &mut Session, rfp: String, kind: String) -> Result<()> {
    session.dispatch_all([
        Msg::Navigate(Page::Extraction),
        Msg::RfpSelected(rfp),
        Msg::WatchArtifacts { kind },
    ]);
    let view = session.run_until(|v| !v.extraction.watching_artifacts)?;
    if view.extraction.artifacts.is_empty() {
        println!("No artifacts.");
    }
    Ok(())
}

fn chat(session: &mut Session, rfp: String) -> Result<()> {
    session.dispatch_all([Msg::Navigate(Page::Analyzer), Msg::RfpSelected(rfp)]);
    println!("Ask a question, or /quit to leave.");

    for line in prompt_lines("you> ") {
        let line = line?;
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        session.dispatch_all([Msg::ChatInputChanged(line.to_string()), Msg::ChatSubmitted]);
        session.run_until(|v| !v.analyzer.streaming)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Mark { index: usize, flag: RequirementFlag },
    Notes(String),
    Approve,
    Next,
    Previous,
    Help,
    Quit,
}

pub const REVIEW_HELP: &str = "\
  y <n>        mark requirement n as a requirement
  n <n>        mark requirement n as not a requirement
  u <n>        clear the judgement of requirement n
  notes <text> analysis sent along with the approval
  a            approve this section and move on
  > / <        next / previous section
  q            quit";

pub fn parse_review_command(line: &str) -> Result<ReviewCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mark = |flag| {
        rest.parse::<usize>()
            .map(|index| ReviewCommand::Mark { index, flag })
            .map_err(|_| format!("`{word}` needs a requirement number"))
    };
    match word {
        "y" => mark(RequirementFlag::Yes),
        "n" => mark(RequirementFlag::No),
        "u" => mark(RequirementFlag::Unset),
        "notes" => Ok(ReviewCommand::Notes(rest.to_string())),
        "a" | "approve" => Ok(ReviewCommand::Approve),
        ">" | "next" => Ok(ReviewCommand::Next),
        "<" | "prev" => Ok(ReviewCommand::Previous),
        "?" | "help" | "" => Ok(ReviewCommand::Help),
        "q" | "quit" => Ok(ReviewCommand::Quit),
        other => Err(format!("unknown command `{other}`, try `help`")),
    }
}

fn review(session: &mut Session, rfp: String) -> Result<()> {
    session.dispatch_all([
        Msg::Navigate(Page::Extraction),
        Msg::CopilotModeToggled(true),
        Msg::RfpSelected(rfp),
    ]);
    let view = session.run_until(|v| !v.extraction.loading_sections)?;
    check_notice(&view)?;
    if view.extraction.section_count == 0 {
        println!("No sections to review.");
        return Ok(());
    }
    println!("{REVIEW_HELP}");

    for line in prompt_lines("review> ") {
        let command = match parse_review_command(&line?) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            ReviewCommand::Mark { index, flag } => {
                session.dispatch(Msg::RequirementMarked { index, flag });
            }
            ReviewCommand::Notes(notes) => session.dispatch(Msg::ReviewNotesChanged(notes)),
            ReviewCommand::Approve => {
                session.dispatch(Msg::ApproveClicked);
                session.run_until(|v| !v.extraction.submitting)?;
            }
            ReviewCommand::Next => session.dispatch(Msg::NextSection),
            ReviewCommand::Previous => session.dispatch(Msg::PreviousSection),
            ReviewCommand::Help => println!("{REVIEW_HELP}"),
            ReviewCommand::Quit => break,
        }
    }
    Ok(())
}

fn extract(session: &mut Session, rfp: String) -> Result<()> {
    session.dispatch_all([
        Msg::Navigate(Page::Extraction),
        Msg::CopilotModeToggled(false),
        Msg::RfpSelected(rfp),
        Msg::StartExtractionClicked,
    ]);
    let view = session.run_until(|v| !v.extraction.extracting)?;
    check_notice(&view)
}

fn respond(
    session: &mut Session,
    config: &AppConfig,
    rfp: String,
    number: usize,
    instruction: Option<String>,
    export: bool,
) -> Result<()> {
    if number == 0 {
        bail!("requirement numbers start at 1");
    }
    session.dispatch_all([
        Msg::Navigate(Page::ResponseBuilder),
        Msg::RfpSelected(rfp.clone()),
        Msg::InstructionChanged(instruction.unwrap_or_default()),
    ]);
    let view = session.run_until(|v| !v.builder.loading)?;
    check_notice(&view)?;
    if number > view.builder.count {
        bail!(
            "{rfp} has {} confirmed requirements, not {number}",
            view.builder.count
        );
    }
    session.dispatch_all((1..number).map(|_| Msg::NextRequirement));

    session.dispatch(Msg::GenerateClicked);
    let view = session.run_until(|v| !v.builder.generating)?;
    check_notice(&view)?;

    if export {
        let Some(requirement) = &view.builder.current else {
            bail!("no requirement selected");
        };
        let generated_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let document = ResponseDocument {
            rfp: &rfp,
            requirement,
            instruction: &view.builder.instruction,
            response: &view.builder.generated,
            generated_utc: &generated_utc,
        };
        let path = ResponseExporter::new(&config.export_dir)
            .export(&document)
            .context("exporting response")?;
        rfp_info!("Exported response to {}", path.display());
        println!("Saved {}", path.display());
    }
    Ok(())
}

/// Lines from stdin, each preceded by `prompt`.
fn prompt_lines(prompt: &'static str) -> impl Iterator<Item = io::Result<String>> {
    let mut lines = io::stdin().lock().lines();
    std::iter::from_fn(move || {
        print!("{prompt}");
        if let Err(err) = io::stdout().flush() {
            return Some(Err(err));
        }
        lines.next()
    })
}
