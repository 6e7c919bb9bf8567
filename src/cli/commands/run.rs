//! Interactive onboarding wizard

use super::pms::print_registry;
use crate::cli::ui::prompts::{
    fuzzy_select, multiline_input, prompt_confirmation, required_input, select, text_input,
};
use crate::cli::ui::with_spinner;
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use pms_wizard::api::constants::{mapping_filename, translator_filename};
use pms_wizard::api::{BridgeClient, MappingKind, MessageFormat};
use pms_wizard::config::Config;
use pms_wizard::wizard::{
    ActionError, ActionKind, AdvanceOutcome, AnalyzeOutcome, CommitPhase, PhaseStatus, SpecsDocument, Step, Suggestion,
    WizardSession, canonical, export_artifacts,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PREVIEW_LINES: usize = 15;

#[derive(Args)]
pub struct RunCommands {
    /// Vendor specification passed to analysis and suggestions
    #[arg(long)]
    pub specs: Option<PathBuf>,
    /// Directory generated artifacts are exported to
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// What the operator picked from a step menu
enum Choice {
    Action(usize),
    Next,
    Back,
    Reset,
    Quit,
}

pub async fn run_command(args: RunCommands, config: &Config) -> Result<()> {
    let client = BridgeClient::from_settings(&config.api).context("Failed to create bridge client")?;
    log::info!("Starting wizard against {}", client.base_url());

    let mut session = WizardSession::new(Arc::new(client), config.wizard.replay_policy);
    if let Some(path) = &args.specs {
        session.config_mut().specs_document = Some(SpecsDocument::from_path(path)?);
    }
    let export_dir = args.export.or_else(|| config.wizard.export_dir.clone());

    println!();
    println!("  {}", "RGBridge PMS Onboarding".bright_blue().bold());
    println!("  {}", format!("Bridge: {}", config.api.base_url).dimmed());

    loop {
        print_step_header(&session);

        let step = session.current_step();
        let actions = step_actions(&session);
        let choice = choose(&session, &actions)?;

        match choice {
            Choice::Action(index) => match step {
                Step::PmsInformation => pms_information_action(&mut session, index)?,
                Step::MessageAnalysis => analysis_action(&mut session, index).await?,
                Step::MappingConfiguration => mapping_action(&mut session, index).await?,
                Step::CodeGeneration => generation_action(&mut session, index, export_dir.as_deref()).await?,
            },
            Choice::Next => next(&mut session).await,
            Choice::Back => {
                session.retreat();
            }
            Choice::Reset => {
                if prompt_confirmation("Discard everything and start over?", false)? {
                    session.reset();
                    println!("  {}", "Wizard reset".bright_yellow());
                }
            }
            Choice::Quit => {
                if prompt_confirmation("Quit the wizard? Unsaved progress is lost.", false)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_step_header(session: &WizardSession) {
    let current = session.current_step();
    println!();
    let trail: Vec<String> = Step::ALL
        .iter()
        .map(|step| {
            let label = format!("{}. {}", step.index() + 1, step.title());
            if *step == current {
                label.bright_white().bold().to_string()
            } else if *step < current {
                label.green().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect();
    let separator = " > ".dimmed().to_string();
    println!("  {}", trail.join(separator.as_str()));
    println!("  {}", "─".repeat(60).bright_blue());
}

fn step_actions(session: &WizardSession) -> Vec<String> {
    let config = session.config();
    match session.current_step() {
        Step::PmsInformation => vec!["Edit PMS information".to_string()],
        Step::MessageAnalysis => {
            let mut actions = vec![
                "Edit sample messages".to_string(),
                "Attach specs document".to_string(),
                "Analyze messages".to_string(),
            ];
            if session.pending_analysis().is_some() {
                actions.push("Apply pending analysis over manual edits".to_string());
                actions.push("Discard pending analysis".to_string());
            }
            actions
        }
        Step::MappingConfiguration => {
            let mut actions = vec![
                format!("Assign unmapped field ({})", config.unmapped_fields().len()),
                "Edit mapping".to_string(),
                "Remove mapping".to_string(),
                "Set custom conversion".to_string(),
                "Remove custom conversion".to_string(),
            ];
            if !config.combined_mode {
                let other = match config.mapping_focus {
                    MappingKind::Availability => MappingKind::Rate,
                    MappingKind::Rate => MappingKind::Availability,
                };
                actions.push(format!("Switch to {} mappings", other));
            }
            actions
        }
        Step::CodeGeneration => vec![
            "Generate translator and mapping document".to_string(),
            "Preview generated artifacts".to_string(),
            "Export artifacts".to_string(),
        ],
    }
}

fn choose(session: &WizardSession, actions: &[String]) -> Result<Choice> {
    print_step_summary(session);

    let step = session.current_step();
    let next_label = if step.is_last() {
        "Finish: register PMS and upload artifacts"
    } else {
        "Next"
    };

    let mut items: Vec<String> = actions.to_vec();
    items.push(next_label.to_string());
    if step.previous().is_some() {
        items.push("Back".to_string());
    }
    items.push("Reset wizard".to_string());
    items.push("Quit".to_string());

    let selection = select("Choose an action", &items, 0)?;
    let extra = selection.checked_sub(actions.len());
    let has_back = step.previous().is_some();

    Ok(match extra {
        None => Choice::Action(selection),
        Some(0) => Choice::Next,
        Some(1) if has_back => Choice::Back,
        Some(n) if n == 1 + usize::from(has_back) => Choice::Reset,
        Some(_) => Choice::Quit,
    })
}

fn print_step_summary(session: &WizardSession) {
    let config = session.config();
    match session.current_step() {
        Step::PmsInformation => {
            field("PMS code", &config.pms_code);
            field("PMS name", &config.pms_name);
            field("Description", &config.description);
            field("Message format", config.message_format.label());
            field(
                "Message streams",
                if config.combined_mode { "combined availability/rate" } else { "separate" },
            );
        }
        Step::MessageAnalysis => {
            if config.combined_mode {
                field("Combined sample", &summarize(&config.sample_availability_message));
            } else {
                field("Availability sample", &summarize(&config.sample_availability_message));
                field("Rate sample", &summarize(&config.sample_rate_message));
            }
            match &config.specs_document {
                Some(doc) => field("Specs document", &format!("{} ({} bytes)", doc.filename, doc.content.len())),
                None => field("Specs document", ""),
            }
        }
        Step::MappingConfiguration => {
            print_mappings("Availability mappings", config.availability_mappings().iter());
            if config.combined_mode {
                println!("  {}", "Rate mappings unused in combined mode".dimmed());
            } else {
                print_mappings("Rate mappings", config.rate_mappings().iter());
                println!("  {} {}", "Adding to:".dimmed(), config.mapping_focus.to_string().cyan());
            }
            print_mappings("Custom conversions", config.custom_conversions().iter());
            if !config.unmapped_fields().is_empty() {
                let unmapped: Vec<&str> = config.unmapped_fields().iter().map(String::as_str).collect();
                println!("  {} {}", "Unmapped:".bright_yellow().bold(), unmapped.join(", ").yellow());
            }
        }
        Step::CodeGeneration => {
            let generated = config.has_generated_artifacts();
            field("Artifacts", if generated { "generated" } else { "" });
            for phase in CommitPhase::ALL {
                let status = match config.commit_saga().status(phase) {
                    PhaseStatus::Pending => "pending".dimmed(),
                    PhaseStatus::Done => "done".bright_green(),
                    PhaseStatus::Failed(reason) => format!("failed: {}", reason).red(),
                };
                println!("  {} {}: {}", phase.step_number(), phase.name().dimmed(), status);
            }
        }
    }
}

fn field(label: &str, value: &str) {
    if value.trim().is_empty() {
        println!("  {}: {}", label.dimmed(), "not set".dimmed().italic());
    } else {
        println!("  {}: {}", label.dimmed(), value.cyan());
    }
}

fn summarize(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    let line_count = text.lines().count();
    match line_count {
        0 => String::new(),
        1 => first.to_string(),
        n => format!("{} ... ({} lines)", first, n),
    }
}

fn print_mappings<'a>(title: &str, entries: impl Iterator<Item = (&'a String, &'a String)>) {
    let entries: Vec<_> = entries.collect();
    println!("  {} {}", title.bright_white().bold(), format!("({})", entries.len()).dimmed());
    for (source, target) in entries {
        println!("    {} {} {}", source.white(), "→".dimmed(), target.cyan());
    }
}

fn print_action_error(error: &ActionError) {
    match error {
        ActionError::Busy(_) | ActionError::NotReady { .. } | ActionError::Step(_) => {
            println!("  {} {}", "!".bright_yellow().bold(), error.to_string().yellow());
        }
        _ => println!("  {} {}", "✗".bright_red().bold(), error.to_string().red()),
    }
}

fn pms_information_action(session: &mut WizardSession, _index: usize) -> Result<()> {
    let config = session.config_mut();
    config.pms_code = required_input("PMS code", Some(config.pms_code.as_str()))?;
    config.pms_name = required_input("PMS name", Some(config.pms_name.as_str()))?;
    config.description = text_input("Description", Some(config.description.as_str()))?;

    let formats: Vec<String> = MessageFormat::ALL.iter().map(|f| f.label().to_string()).collect();
    let current = MessageFormat::ALL
        .iter()
        .position(|f| *f == config.message_format)
        .unwrap_or_default();
    config.message_format = MessageFormat::ALL[select("Message format", &formats, current)?];

    config.combined_mode = prompt_confirmation(
        "Does this PMS send availability and rate data in one combined message?",
        config.combined_mode,
    )?;
    Ok(())
}

async fn analysis_action(session: &mut WizardSession, index: usize) -> Result<()> {
    match index {
        0 => {
            let config = session.config_mut();
            if config.combined_mode {
                if let Some(text) = multiline_input("Combined sample message", &config.sample_availability_message)? {
                    config.sample_availability_message = text;
                }
            } else {
                if let Some(text) =
                    multiline_input("Availability sample message", &config.sample_availability_message)?
                {
                    config.sample_availability_message = text;
                }
                if let Some(text) = multiline_input("Rate sample message", &config.sample_rate_message)? {
                    config.sample_rate_message = text;
                }
            }
        }
        1 => {
            let path = text_input("Path to specs document (empty to detach)", None)?;
            let path = path.trim();
            if path.is_empty() {
                session.config_mut().specs_document = None;
            } else {
                match SpecsDocument::from_path(Path::new(path)) {
                    Ok(doc) => {
                        println!("  {} {}", "✓ Attached".bright_green(), doc.filename.cyan());
                        session.config_mut().specs_document = Some(doc);
                    }
                    Err(e) => println!("  {} {}", "✗".bright_red().bold(), format!("{:#}", e).red()),
                }
            }
        }
        2 => {
            match with_spinner("Analyzing sample messages...", session.analyze()).await {
                Ok(AnalyzeOutcome::Applied) => report_success(session, ActionKind::Analyze),
                Ok(AnalyzeOutcome::NeedsConfirmation) => {
                    println!("  {}", "Analysis would overwrite your manual mapping edits.".bright_yellow());
                    if prompt_confirmation("Replace the current mappings with the analysis result?", false)? {
                        session.confirm_analysis();
                        report_success(session, ActionKind::Analyze);
                    } else {
                        println!("  {}", "Kept current mappings; the result stays available.".dimmed());
                    }
                }
                Ok(AnalyzeOutcome::Discarded) => println!("  {}", "Analysis result was outdated and ignored".dimmed()),
                Err(e) => print_action_error(&e),
            }
        }
        3 => {
            if session.confirm_analysis() {
                report_success(session, ActionKind::Analyze);
            }
        }
        _ => {
            session.discard_pending_analysis();
            println!("  {}", "Pending analysis discarded".dimmed());
        }
    }
    Ok(())
}

fn report_success(session: &WizardSession, kind: ActionKind) {
    if let Some(message) = &session.status(kind).success {
        println!("  {} {}", "✓".bright_green().bold(), message.bright_green());
    }
}

async fn mapping_action(session: &mut WizardSession, index: usize) -> Result<()> {
    match index {
        0 => assign_unmapped(session).await?,
        1 => {
            let kind = choose_kind(session)?;
            let source = choose_source_field(session, kind, true)?;
            let Some(source) = source else { return Ok(()) };
            let current = session.config().mappings(kind).get(&source).cloned();
            if let Some(target) = choose_canonical(session, kind, current.as_deref())? {
                session.editor().set_mapping(kind, &source, &target);
            }
        }
        2 => {
            let kind = choose_kind(session)?;
            if let Some(source) = choose_source_field(session, kind, false)? {
                session.editor().remove_mapping(kind, &source);
            }
        }
        3 => {
            let source = required_input("Source field", None)?;
            let current = session.config().custom_conversions().get(&source).cloned();
            let expression = required_input("Conversion expression", current.as_deref())?;
            session.editor().set_conversion(&source, &expression);
        }
        4 => {
            let fields: Vec<String> = session.config().custom_conversions().keys().cloned().collect();
            if fields.is_empty() {
                println!("  {}", "No custom conversions".dimmed());
            } else {
                let selection = select("Remove conversion for", &fields, 0)?;
                session.editor().remove_conversion(&fields[selection]);
            }
        }
        _ => {
            let config = session.config_mut();
            config.mapping_focus = match config.mapping_focus {
                MappingKind::Availability => MappingKind::Rate,
                MappingKind::Rate => MappingKind::Availability,
            };
        }
    }
    Ok(())
}

async fn assign_unmapped(session: &mut WizardSession) -> Result<()> {
    let fields: Vec<String> = session.config().unmapped_fields().iter().cloned().collect();
    if fields.is_empty() {
        println!("  {}", "Every detected field is mapped".dimmed());
        return Ok(());
    }

    let field = fields[select("Field to map", &fields, 0)?].clone();

    let suggestion = match with_spinner(format!("Asking for a suggestion for {}...", field), session.suggest(&field)).await
    {
        Ok(Some(suggestion)) => suggestion,
        Ok(None) => Suggestion::none(),
        Err(e) => {
            print_action_error(&e);
            Suggestion::none()
        }
    };

    match (&suggestion.suggestion, suggestion.method) {
        (Some(value), Some(method)) => println!("  {} {} ({})", "Suggested:".dimmed(), value.cyan(), method),
        (Some(value), None) => println!("  {} {}", "Suggested:".dimmed(), value.cyan()),
        (None, _) => println!("  {}", "No suggestion available".dimmed()),
    }

    let kind = session.config().relevant_kind();
    if let Some(target) = choose_canonical(session, kind, suggestion.suggestion.as_deref())? {
        match session.editor().add_mapping(&field, &target) {
            Ok(kind) => println!("  {} {} → {} ({})", "✓".bright_green(), field, target.cyan(), kind),
            Err(e) => println!("  {} {}", "!".bright_yellow().bold(), e.to_string().yellow()),
        }
    }
    Ok(())
}

fn choose_kind(session: &WizardSession) -> Result<MappingKind> {
    if session.config().combined_mode {
        return Ok(MappingKind::Availability);
    }
    let kinds = [MappingKind::Availability, MappingKind::Rate];
    let labels: Vec<String> = kinds.iter().map(|k| format!("{} mappings", k)).collect();
    let default = kinds
        .iter()
        .position(|k| *k == session.config().mapping_focus)
        .unwrap_or_default();
    Ok(kinds[select("Which mappings", &labels, default)?])
}

/// Existing source fields of `kind`, optionally with a "new field" entry
fn choose_source_field(session: &WizardSession, kind: MappingKind, allow_new: bool) -> Result<Option<String>> {
    let mut fields: Vec<String> = session.config().mappings(kind).keys().cloned().collect();
    if allow_new {
        fields.push("+ New source field".to_string());
    } else if fields.is_empty() {
        println!("  {}", "No mappings".dimmed());
        return Ok(None);
    }

    let selection = select("Source field", &fields, 0)?;
    if allow_new && selection == fields.len() - 1 {
        return Ok(Some(required_input("New source field", None)?));
    }
    Ok(Some(fields[selection].clone()))
}

/// Pick a canonical field from the catalogue or type a custom one; `None` on
/// a blank custom entry
fn choose_canonical(session: &WizardSession, kind: MappingKind, preferred: Option<&str>) -> Result<Option<String>> {
    let mut candidates = canonical::candidates(kind, session.config().combined_mode);
    if let Some(preferred) = preferred {
        if !candidates.iter().any(|c| c == preferred) {
            candidates.insert(0, preferred.to_string());
        }
    }
    let default = preferred
        .and_then(|p| candidates.iter().position(|c| c == p))
        .unwrap_or_default();
    candidates.push("Custom...".to_string());

    let selection = fuzzy_select("Canonical field", &candidates, default)?;
    if selection == candidates.len() - 1 {
        let custom = text_input("Canonical field", None)?;
        let custom = custom.trim();
        return Ok((!custom.is_empty()).then(|| custom.to_string()));
    }
    Ok(Some(candidates[selection].clone()))
}

async fn generation_action(session: &mut WizardSession, index: usize, export_dir: Option<&Path>) -> Result<()> {
    match index {
        0 => match with_spinner("Generating translator and mapping document...", session.generate()).await {
            Ok(()) => report_success(session, ActionKind::Generate),
            Err(e) => print_action_error(&e),
        },
        1 => {
            let config = session.config();
            if !config.has_generated_artifacts() {
                println!("  {}", "Nothing generated yet".dimmed());
                return Ok(());
            }
            preview(&translator_filename(config.pms_code()), config.generated_translator_code());
            preview(&mapping_filename(config.pms_code()), config.generated_mapping_document());
        }
        _ => {
            let dir = match export_dir {
                Some(dir) => dir.to_path_buf(),
                None => PathBuf::from(text_input("Export directory", Some("."))?),
            };
            match export_artifacts(session.config(), &dir) {
                Ok(paths) => {
                    for path in paths {
                        println!("  {} {}", "✓ Wrote".bright_green(), path.display().to_string().cyan());
                    }
                }
                Err(e) => println!("  {} {}", "✗".bright_red().bold(), format!("{:#}", e).red()),
            }
        }
    }
    Ok(())
}

fn preview(title: &str, content: &str) {
    println!();
    println!("  {}", title.bright_white().bold());
    let total = content.lines().count();
    for line in content.lines().take(PREVIEW_LINES) {
        println!("    {}", line.dimmed());
    }
    if total > PREVIEW_LINES {
        println!("    {}", format!("... {} more lines", total - PREVIEW_LINES).dimmed());
    }
}

async fn next(session: &mut WizardSession) {
    let result = if session.current_step().is_last() {
        with_spinner("Registering PMS and uploading artifacts...", session.advance()).await
    } else {
        session.advance().await
    };

    match result {
        Ok(AdvanceOutcome::Moved(_)) => {}
        Ok(AdvanceOutcome::Committed { report, registry }) => {
            report_success(session, ActionKind::Commit);
            if !report.skipped.is_empty() {
                let skipped: Vec<&str> = report.skipped.iter().map(|p| p.name()).collect();
                println!("  {} {}", "Already done:".dimmed(), skipped.join(", ").dimmed());
            }
            match registry {
                Some(records) => print_registry(&records),
                None => println!("  {}", "Could not refresh the PMS list".yellow()),
            }
        }
        Err(e) => print_action_error(&e),
    }
}
