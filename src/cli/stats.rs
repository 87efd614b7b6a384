//! `inkmind stats` command implementation.

use crate::analytics::SessionStats;
use crate::cli::{open_store, resolve_session};
use crate::config::Config;
use crate::core::App;
use crate::error::{Error, Result};

/// Widest bar in the chart, in cells.
const BAR_WIDTH: usize = 40;

/// Run the stats command.
///
/// Prints word counts per generated passage with a bar chart.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the session is unknown.
pub fn run(config: &Config, session: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let app = App::load(&store);

    let id = resolve_session(&app, session)?;
    let session = app
        .sessions()
        .get(&id)
        .ok_or_else(|| Error::SessionNotFound(id.clone()))?;

    println!("Thống kê: {}", session.title);
    print!("{}", render(&SessionStats::from_messages(&session.messages)));
    Ok(())
}

/// Render the statistics as text.
#[must_use]
pub fn render(stats: &SessionStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tổng số từ:       {}\n", stats.total_words));
    out.push_str(&format!("Trung bình/Mục:   {}\n", stats.average_words));

    if stats.entries.is_empty() {
        out.push_str("\nChưa có dữ liệu thống kê.\n");
        return out;
    }

    out.push('\n');
    let max = stats.longest().map_or(1, |e| e.words.max(1));
    for entry in &stats.entries {
        let len = (entry.words * BAR_WIDTH).div_ceil(max);
        out.push_str(&format!(
            "{:<8} {:>6}  {}\n",
            entry.label,
            entry.words,
            "█".repeat(len)
        ));
    }
    out
}
