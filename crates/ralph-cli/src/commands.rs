//! Command handlers for CLI subcommands.

use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use ralph_agent::{manual_conversion_prompt, prd_from_response, AnthropicClient, PrdConverter};
use ralph_core::{format_timestamp, loop_prompt, parse_prd, parse_progress, parse_session, ProjectFiles};
use ralph_models::{IterationRecord, Prd, Settings, SettingsUpdate, StoryStatus};
use ralph_persistence::{atomic_write_json, read_json};
use ralph_runtime::BoardState;

use crate::cli::{Commands, SettingsAction};
use crate::error::{CliError, Result};
use crate::{validate_project_path, Context};

/// Execute a CLI command other than the dashboard.
pub fn execute(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Board => crate::tui::run(ctx),
        Commands::Status => cmd_status(ctx),
        Commands::Log { json } => cmd_log(ctx, json),
        Commands::Prompt => cmd_prompt(ctx),
        Commands::Convert { file, output } => cmd_convert(ctx, &file, output),
        Commands::ConvertPrompt { file } => cmd_convert_prompt(&file),
        Commands::Import { file, output } => cmd_import(ctx, &file, output),
        Commands::SetStatus { story_id, status } => cmd_set_status(ctx, &story_id, status.into()),
        Commands::Settings { action } => cmd_settings(ctx, action),
    }
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let project = ctx.project(&settings)?;
    let board = load_board(&project);
    print!("{}", render_status(&board, settings.max_iterations));

    let learnings = project.learnings();
    if learnings.is_file() {
        println!("\nLearnings: {}", learnings.display());
    }
    Ok(())
}

fn cmd_log(ctx: &Context, json: bool) -> Result<()> {
    let settings = ctx.settings()?;
    let project = ctx.project(&settings)?;
    let content = read_optional(&project.progress())?.unwrap_or_default();
    let records = parse_progress(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render_log(&records));
    }
    Ok(())
}

fn cmd_prompt(ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    println!("{}", loop_prompt(settings.max_iterations));
    Ok(())
}

fn cmd_convert(ctx: &Context, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = read_input(file)?;
    let settings = ctx.settings()?;
    let output = output_path(ctx, &settings, output)?;
    let converter = PrdConverter::new(AnthropicClient::from_settings(&settings)?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let prd = runtime.block_on(converter.convert(&text))?;

    write_prd(&prd, &output)
}

fn cmd_convert_prompt(file: &Path) -> Result<()> {
    let text = read_input(file)?;
    println!("{}", manual_conversion_prompt(&text)?);
    Ok(())
}

fn cmd_import(ctx: &Context, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = read_input(file)?;
    let settings = ctx.settings()?;
    let output = output_path(ctx, &settings, output)?;
    let prd = prd_from_response(&text, Utc::now())?;
    write_prd(&prd, &output)
}

fn cmd_set_status(ctx: &Context, story_id: &str, status: StoryStatus) -> Result<()> {
    let settings = ctx.settings()?;
    let project = ctx.project(&settings)?;
    let path = project.prd();

    let prd: Prd = read_json(&path)?;
    if prd.story(story_id).is_none() {
        return Err(CliError::StoryNotFound(story_id.to_string()));
    }

    let updated = prd.with_story_status(story_id, status);
    atomic_write_json(&path, &updated)?;

    info!(story_id = %story_id, status = %status, "story moved");
    println!("Moved {} to {}", story_id, status.label());
    Ok(())
}

fn cmd_settings(ctx: &Context, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            print!("{}", render_settings(&ctx.settings()?, ctx.store.path()));
        }
        SettingsAction::Set {
            api_key,
            project_path,
            max_iterations,
        } => {
            if let Some(path) = project_path.as_deref().filter(|p| !p.trim().is_empty()) {
                validate_project_path(path).map_err(CliError::InvalidProject)?;
            }
            let update = SettingsUpdate {
                api_key,
                project_path,
                max_iterations,
            };
            if update.is_empty() {
                warn!("settings set called without any changes");
            }
            let settings = ctx.store.update(&update)?;
            println!("Settings saved.");
            print!("{}", render_settings(&settings, ctx.store.path()));
        }
        SettingsAction::Reset => {
            ctx.store.reset()?;
            println!("Settings reset to defaults.");
        }
    }
    Ok(())
}

/// Build a board snapshot from whatever files decode right now.
pub fn load_board(project: &ProjectFiles) -> BoardState {
    let read = |path: PathBuf| match read_optional(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "skipping unreadable file");
            None
        }
    };

    let progress = read(project.progress()).unwrap_or_default();
    BoardState {
        prd: read(project.prd()).as_deref().and_then(parse_prd),
        session: read(project.session())
            .as_deref()
            .and_then(parse_session)
            .unwrap_or_default(),
        records: parse_progress(&progress),
        progress,
    }
}

/// Session line, iteration counter and the kanban columns.
pub fn render_status(board: &BoardState, max_iterations: u32) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Session: {}", board.session.status);
    let _ = writeln!(
        out,
        "Iteration: {} / {}",
        board.session.current_iteration, max_iterations
    );
    if board.session.is_exhausted() {
        let _ = writeln!(out, "Iteration cap reached.");
    }
    if !board.records.is_empty() {
        let finished = board.records.iter().filter(|r| r.is_finished()).count();
        let _ = writeln!(
            out,
            "Logged iterations: {} ({} finished)",
            board.records.len(),
            finished
        );
    }

    let Some(prd) = &board.prd else {
        let _ = writeln!(out, "\nNo PRD loaded.");
        return out;
    };

    let _ = writeln!(
        out,
        "PRD: {} ({}/{} stories passing)",
        prd.title,
        prd.completed_count(),
        prd.stories.len()
    );

    for column in board.columns() {
        let _ = writeln!(out, "\n{} ({})", column.status.label(), column.stories.len());
        for story in column.stories {
            let _ = writeln!(
                out,
                "  [{}] {} ({} criteria)",
                story.id,
                story.title,
                story.acceptance_criteria.len()
            );
        }
    }

    let failed = prd.stories_in(StoryStatus::Failed);
    if !failed.is_empty() {
        let _ = writeln!(out, "\nFailed ({})", failed.len());
        for story in failed {
            let _ = writeln!(out, "  [{}] {}", story.id, story.title);
        }
    }

    out
}

/// Iteration records as indented text.
pub fn render_log(records: &[IterationRecord]) -> String {
    if records.is_empty() {
        return "No iterations yet. Start the loop to see progress here.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let title = if record.story_title.is_empty() {
            "Unknown story"
        } else {
            record.story_title.as_str()
        };
        let _ = writeln!(out, "#{} {} [{}]", record.iteration, title, record.status);

        if !record.timestamp.is_empty() {
            let _ = writeln!(out, "  Started: {}", format_timestamp(&record.timestamp));
        }
        for line in &record.log_lines {
            let _ = writeln!(out, "  {}", line);
        }
        if !record.files_changed.is_empty() {
            let _ = writeln!(out, "  Files changed:");
            for file in &record.files_changed {
                let _ = writeln!(out, "    - {}", file);
            }
        }
        if !record.learnings.is_empty() {
            let _ = writeln!(out, "  Learnings:");
            for learning in &record.learnings {
                let _ = writeln!(out, "    - {}", learning);
            }
        }
    }
    out
}

/// Settings with the API key masked.
pub fn render_settings(settings: &Settings, path: &Path) -> String {
    let key = if settings.has_api_key() {
        settings.masked_api_key()
    } else {
        "(not set)".to_string()
    };
    let project = if settings.project_path.is_empty() {
        "(not set)"
    } else {
        settings.project_path.as_str()
    };

    format!(
        "API key:        {}\nProject path:   {}\nMax iterations: {}\nStored in:      {}\n",
        key,
        project,
        settings.max_iterations,
        path.display()
    )
}

fn write_prd(prd: &Prd, output: &Path) -> Result<()> {
    atomic_write_json(output, prd)?;
    info!(path = %output.display(), stories = prd.stories.len(), "wrote prd");
    println!(
        "Wrote {} stories for \"{}\" to {}",
        prd.stories.len(),
        prd.title,
        output.display()
    );
    Ok(())
}

fn output_path(ctx: &Context, settings: &Settings, output: Option<PathBuf>) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(path),
        None => Ok(ctx.project(settings)?.prd()),
    }
}

/// Read a whole input file, or stdin for `-`.
fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })
}

/// Read a file that may not exist yet.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CliError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ralph_models::{Session, SessionStatus, Story};
    use tempfile::tempdir;

    const PROGRESS: &str = "=== ITERATION 1 ===
Timestamp: not-a-date
Story: story-1 - Add login form
Status: COMPLETED
[10:30:15] Creating component
Files Changed:
- src/Login.tsx (+42/-0)
Learnings:
- Use existing Button component
---
";

    fn project_with_files() -> (tempfile::TempDir, ProjectFiles) {
        let dir = tempdir().unwrap();
        let project = ProjectFiles::new(dir.path().join("app"));
        std::fs::create_dir_all(project.ralph_dir()).unwrap();

        let mut stories = vec![
            Story::new("story-1", "Add login form", "", vec!["Form renders".into()]),
            Story::new("story-2", "Add logout", "", vec![]),
        ];
        stories[0].status = StoryStatus::Done;
        stories[1].status = StoryStatus::Failed;
        atomic_write_json(&project.prd(), &Prd::new("Auth", stories)).unwrap();
        atomic_write_json(
            &project.session(),
            &Session::default().with_status(SessionStatus::Running),
        )
        .unwrap();
        std::fs::write(project.progress(), PROGRESS).unwrap();

        (dir, project)
    }

    #[test]
    fn test_load_board() {
        let (_dir, project) = project_with_files();
        let board = load_board(&project);

        assert_eq!(board.prd.as_ref().unwrap().title, "Auth");
        assert_eq!(board.session.status, SessionStatus::Running);
        assert_eq!(board.records.len(), 1);
    }

    #[test]
    fn test_load_board_tolerates_missing_and_bad_files() {
        let dir = tempdir().unwrap();
        let project = ProjectFiles::new(dir.path());
        std::fs::create_dir_all(project.ralph_dir()).unwrap();
        std::fs::write(project.prd(), "{ not json").unwrap();

        let board = load_board(&project);
        assert_eq!(board, BoardState::default());
    }

    #[test]
    fn test_render_status() {
        let (_dir, project) = project_with_files();
        let out = render_status(&load_board(&project), 10);

        assert!(out.contains("Session: Running"));
        assert!(out.contains("Iteration: 0 / 10"));
        assert!(out.contains("Logged iterations: 1 (1 finished)"));
        assert!(!out.contains("cap reached"));
        assert!(out.contains("PRD: Auth (0/2 stories passing)"));
        assert!(out.contains("Done (1)\n  [story-1] Add login form (1 criteria)"));
        assert!(out.contains("Failed (1)\n  [story-2] Add logout"));
    }

    #[test]
    fn test_render_status_without_prd() {
        let out = render_status(&BoardState::default(), 5);
        assert!(out.contains("Session: Idle"));
        assert!(out.contains("No PRD loaded."));
    }

    #[test]
    fn test_render_log() {
        let out = render_log(&parse_progress(PROGRESS));
        assert!(out.starts_with("#1 Add login form [COMPLETED]\n"));
        // Unparseable timestamps are shown as written.
        assert!(out.contains("  Started: not-a-date\n"));
        assert!(out.contains("    - src/Login.tsx\n"));
        assert!(out.contains("    - Use existing Button component\n"));

        assert!(render_log(&[]).starts_with("No iterations yet"));
    }

    #[test]
    fn test_render_settings_masks_key() {
        let settings = Settings {
            api_key: "sk-ant-123456".to_string(),
            ..Settings::default()
        };
        let out = render_settings(&settings, Path::new("/tmp/s.json"));
        assert!(out.contains("*********3456"));
        assert!(!out.contains("sk-ant"));
        assert!(out.contains("Project path:   (not set)"));
    }

    #[test]
    fn test_import_writes_prd() {
        let (dir, project) = project_with_files();
        let response = dir.path().join("reply.txt");
        std::fs::write(
            &response,
            "```json\n{\"title\":\"Todo\",\"stories\":[{\"title\":\"Add item\"}]}\n```",
        )
        .unwrap();

        let ctx = Context::new(dir.path().join("state"), Some(project.root().to_path_buf()));
        cmd_import(&ctx, &response, None).unwrap();

        let prd: Prd = read_json(&project.prd()).unwrap();
        assert_eq!(prd.title, "Todo");
        assert_eq!(prd.stories[0].status, StoryStatus::Backlog);
    }

    #[test]
    fn test_import_invalid_response_keeps_file() {
        let (dir, project) = project_with_files();
        let response = dir.path().join("reply.txt");
        std::fs::write(&response, "Sorry, I can't help with that.").unwrap();

        let ctx = Context::new(dir.path().join("state"), Some(project.root().to_path_buf()));
        let result = cmd_import(&ctx, &response, None);
        assert!(matches!(result, Err(CliError::Agent(_))));

        let prd: Prd = read_json(&project.prd()).unwrap();
        assert_eq!(prd.title, "Auth");
    }

    #[test]
    fn test_set_status() {
        let (dir, project) = project_with_files();
        let ctx = Context::new(dir.path().join("state"), Some(project.root().to_path_buf()));

        cmd_set_status(&ctx, "story-2", StoryStatus::Testing).unwrap();
        let prd: Prd = read_json(&project.prd()).unwrap();
        assert_eq!(prd.story("story-2").unwrap().status, StoryStatus::Testing);

        let result = cmd_set_status(&ctx, "story-9", StoryStatus::Done);
        assert!(matches!(result, Err(CliError::StoryNotFound(_))));
    }

    #[test]
    fn test_settings_set_rejects_missing_project() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(dir.path(), None);
        let result = cmd_settings(
            &ctx,
            SettingsAction::Set {
                api_key: None,
                project_path: Some("/nonexistent/ralph/project".to_string()),
                max_iterations: None,
            },
        );
        assert!(matches!(result, Err(CliError::InvalidProject(_))));
        assert!(!ctx.store.path().exists());
    }

    #[test]
    fn test_settings_set_and_reset() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(dir.path(), None);

        cmd_settings(
            &ctx,
            SettingsAction::Set {
                api_key: Some("sk-test-0000".to_string()),
                project_path: Some(dir.path().to_string_lossy().to_string()),
                max_iterations: Some(3),
            },
        )
        .unwrap();
        let settings = ctx.settings().unwrap();
        assert_eq!(settings.max_iterations, 3);
        assert!(ctx.project(&settings).is_ok());

        cmd_settings(&ctx, SettingsAction::Reset).unwrap();
        assert_eq!(ctx.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_read_input_missing_file() {
        let result = read_input(Path::new("/nonexistent/brief.md"));
        assert!(matches!(result, Err(CliError::Read { .. })));
    }
}
