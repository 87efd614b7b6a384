//! `inkmind chat` command implementation.
//!
//! Interactive loop: plain lines are sent to the active session, lines
//! starting with `/` manage sessions and modes.

use crate::analytics::SessionStats;
use crate::cli::send::send_and_report;
use crate::cli::{open_store, print_message, resolve_session};
use crate::client::GeminiClient;
use crate::config::Config;
use crate::core::{App, Mode};
use crate::error::{Error, Result};
use clap::ValueEnum;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

const HELP: &str = "\
/new               Tạo tác phẩm mới
/list              Danh sách tác phẩm
/switch <id>       Chuyển sang tác phẩm khác (mã hoặc tiền tố)
/rename <tên>      Đổi tên tác phẩm hiện tại
/delete            Xóa tác phẩm hiện tại
/mode [chế độ]     Xem hoặc đổi chế độ (creative, editor, structure, reader, utility)
/stats             Thống kê số từ
/help              Trợ giúp
/quit              Thoát";

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Send(String),
    New,
    List,
    Switch(String),
    Rename(String),
    Delete,
    Mode(Option<Mode>),
    Stats,
    Help,
    Quit,
    Empty,
}

/// Parse one input line.
///
/// # Errors
///
/// Returns `Error::Validation` for unknown commands, missing arguments and
/// unknown modes.
pub fn parse_line(line: &str) -> Result<ChatCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ChatCommand::Empty);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ChatCommand::Send(line.to_string()));
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    let required = |what: &str| -> Result<String> {
        if arg.is_empty() {
            Err(Error::Validation(format!("Thiếu {what}. Gõ /help để xem cách dùng.")))
        } else {
            Ok(arg.to_string())
        }
    };

    match name {
        "new" => Ok(ChatCommand::New),
        "list" | "ls" => Ok(ChatCommand::List),
        "switch" => required("mã tác phẩm").map(ChatCommand::Switch),
        "rename" => required("tên mới").map(ChatCommand::Rename),
        "delete" => Ok(ChatCommand::Delete),
        "mode" if arg.is_empty() => Ok(ChatCommand::Mode(None)),
        "mode" => Mode::from_str(arg, true)
            .map(|m| ChatCommand::Mode(Some(m)))
            .map_err(|_| Error::Validation(format!("Chế độ không hợp lệ: {arg}"))),
        "stats" => Ok(ChatCommand::Stats),
        "help" | "?" => Ok(ChatCommand::Help),
        "quit" | "exit" | "q" => Ok(ChatCommand::Quit),
        other => Err(Error::Validation(format!(
            "Lệnh không xác định: /{other}. Gõ /help để xem danh sách."
        ))),
    }
}

/// Run the chat command.
///
/// # Errors
///
/// Returns an error if the store or the line editor cannot be opened.
pub fn run(config: &Config, session: Option<&str>, mode: Mode) -> Result<()> {
    let client = match GeminiClient::from_config(&config.api) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Chỉ có thể quản lý tác phẩm; gửi tin nhắn sẽ không hoạt động.");
            None
        }
    };

    let store = open_store(config)?;
    let mut app = App::load(&store);
    let id = resolve_session(&app, session)?;
    app.select_session(&id);
    app.set_mode(mode);

    let mut rl = DefaultEditor::new()?;

    println!("=== Ink & Mind ===");
    println!("Gõ /help để xem các lệnh, /quit để thoát.\n");
    print_session(&app);

    loop {
        let prompt = format!("[{}] {} > ", app.mode().tag(), app.mode().profile().icon);
        match rl.readline(&prompt) {
            Ok(line) => {
                let command = match parse_line(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if command != ChatCommand::Empty {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if command == ChatCommand::Quit {
                    break;
                }
                if let Err(e) = execute(&mut app, command, client.as_ref()) {
                    if e.is_validation() {
                        println!("{e}");
                    } else {
                        eprintln!("inkmind: error: {e}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Ctrl-C. Gõ /quit để thoát.");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn execute(app: &mut App<'_>, command: ChatCommand, client: Option<&GeminiClient>) -> Result<()> {
    match command {
        ChatCommand::Send(text) => {
            let client = client.ok_or_else(|| {
                Error::Config("no API key configured; messages cannot be sent".to_string())
            })?;
            println!("Đang viết...");
            let outcome = send_and_report(app, &text, client)?;
            if let Some(message) = outcome.message() {
                println!();
                print_message(message);
            }
        }
        ChatCommand::New => {
            app.create_session();
            print_session(app);
        }
        ChatCommand::List => {
            let active = app.active().id.clone();
            for session in app.sessions().sessions() {
                let marker = if session.id == active { '*' } else { ' ' };
                println!("{marker} {}  {}", session.id, session.title);
            }
        }
        ChatCommand::Switch(reference) => {
            let id = resolve_session(app, Some(&reference))?;
            app.select_session(&id);
            print_session(app);
        }
        ChatCommand::Rename(title) => {
            let id = app.active().id.clone();
            app.rename_session(&id, &title)?;
            println!("Đã đổi tên thành \"{}\".", app.active().title);
        }
        ChatCommand::Delete => {
            let id = app.active().id.clone();
            app.delete_session(&id)?;
            println!("Đã xóa.");
            print_session(app);
        }
        ChatCommand::Mode(Some(mode)) => {
            app.set_mode(mode);
            let profile = mode.profile();
            println!("{} {}: {}", profile.icon, profile.label, profile.description);
        }
        ChatCommand::Mode(None) => {
            for mode in Mode::ALL {
                let profile = mode.profile();
                let marker = if mode == app.mode() { '*' } else { ' ' };
                println!(
                    "{marker} {} {:<10} {}",
                    profile.icon,
                    profile.tag.to_lowercase(),
                    profile.description
                );
            }
        }
        ChatCommand::Stats => {
            let stats = SessionStats::from_messages(&app.active().messages);
            print!("{}", crate::cli::stats::render(&stats));
        }
        ChatCommand::Help => println!("{HELP}"),
        ChatCommand::Quit | ChatCommand::Empty => {}
    }
    Ok(())
}

/// Print the active session's title and log.
fn print_session(app: &App<'_>) {
    let session = app.active();
    println!("# {}  ({})\n", session.title, session.id);
    for message in &session.messages {
        print_message(message);
    }
}
