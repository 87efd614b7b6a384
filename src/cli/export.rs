//! `inkmind export` command implementation.

use crate::cli::{open_store, resolve_session};
use crate::config::Config;
use crate::core::App;
use crate::error::{Error, Result};
use crate::export::ExportDraft;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one export.
#[derive(Debug, Default)]
pub struct ExportOptions {
    pub genre: Option<String>,
    pub introduction: Option<String>,
    /// Message IDs to force into the selection.
    pub include: Vec<String>,
    /// Message IDs to force out of the selection.
    pub exclude: Vec<String>,
    /// Target file or directory; defaults to the current directory.
    pub output: Option<PathBuf>,
    /// Print the candidate list instead of writing.
    pub preview: bool,
}

/// Run the export command.
///
/// Writes the selected passages of a session as a Markdown manuscript.
///
/// # Errors
///
/// Returns an error if the session has nothing to export, an ID is unknown,
/// or the file cannot be written.
pub fn run(config: &Config, session: Option<&str>, options: ExportOptions) -> Result<()> {
    let store = open_store(config)?;
    let app = App::load(&store);

    let id = resolve_session(&app, session)?;
    let session = app
        .sessions()
        .get(&id)
        .ok_or_else(|| Error::SessionNotFound(id.clone()))?;

    let mut draft = ExportDraft::from_session(session)?;
    apply_options(&mut draft, &options)?;

    if options.preview {
        print!("{}", preview(&draft));
        return Ok(());
    }

    let document = draft.render()?;
    let path = target_path(options.output.as_deref(), &draft.file_name());
    fs::write(&path, document)?;

    println!(
        "Exported {} passage(s), {} words, to {}",
        draft.included().count(),
        draft.included_words(),
        path.display()
    );
    Ok(())
}

/// Apply metadata and selection overrides to a draft.
///
/// # Errors
///
/// Returns `Error::Validation` for an ID that is not a candidate.
pub fn apply_options(draft: &mut ExportDraft, options: &ExportOptions) -> Result<()> {
    if let Some(genre) = &options.genre {
        draft.genre.clone_from(genre);
    }
    if let Some(intro) = &options.introduction {
        draft.introduction.clone_from(intro);
    }

    for (ids, included) in [(&options.include, true), (&options.exclude, false)] {
        for id in ids {
            if !draft.set_included(id, included) {
                return Err(Error::Validation(format!(
                    "Không tìm thấy đoạn có mã {id}."
                )));
            }
        }
    }
    Ok(())
}

/// Resolve where to write: a directory gets the derived file name.
fn target_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

/// List candidates with their selection state.
fn preview(draft: &ExportDraft) -> String {
    let mut out = format!("{} · {}\n", draft.title, draft.genre);
    for item in &draft.items {
        let mark = if item.included { "[x]" } else { "[ ]" };
        let first_line = item.text.lines().next().unwrap_or_default();
        let snippet: String = first_line.chars().take(60).collect();
        out.push_str(&format!(
            "{mark} {} {:>5} từ  {snippet}\n",
            item.id, item.word_count
        ));
    }
    out
}
