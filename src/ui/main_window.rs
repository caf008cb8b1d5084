use std::io::Write;

use tokio::io::{BufReader, Lines, Stdin};

use crate::api::Backend;
use crate::app::App;
use crate::session::{Completion, Loadable, Notice, Session};

pub type InputLines = Lines<BufReader<Stdin>>;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Providers,
    Provider(Option<String>),
    Open(String),
    Close,
    Refresh,
    Quit,
    Send(String),
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Send(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("providers", _) => Input::Providers,
        ("provider", "none") => Input::Provider(None),
        ("provider", id) if !id.is_empty() => Input::Provider(Some(id.to_string())),
        ("open", target) if !target.is_empty() => Input::Open(target.to_string()),
        ("close", _) => Input::Close,
        ("refresh", _) => Input::Refresh,
        ("quit" | "q", _) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Resolves `#n` (1-based position in the list) or a conversation id.
pub fn resolve_conversation(session: &Session, target: &str) -> String {
    if let Some(n) = target.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
        if let Some(conv) = session.conversations().ready().and_then(|l| l.get(n.wrapping_sub(1))) {
            return conv.id.clone();
        }
    }
    target.to_string()
}

fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Sent { .. } => "sent".to_string(),
        Notice::SendFailed { body, error, .. } => format!("not sent ({error}): {body}"),
    }
}

fn draw(session: &Session, status: Option<&str>) {
    let mut out = String::from("\x1b[2J\x1b[H");
    out.push_str(&crate::ui::sidebar::render(session));
    if session.layout().shows_detail() {
        out.push_str("\n\n");
        out.push_str(&crate::ui::chat_view::render(session));
    }
    if let Some(status) = status {
        out.push_str("\n-- ");
        out.push_str(status);
    }
    out.push_str("\n> ");
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(out.as_bytes());
    let _ = stdout.flush();
}

/// Applies one line of input. Returns false when the user asked to quit.
fn handle_input<B: Backend>(app: &mut App<B>, input: Input, status: &mut Option<String>) -> bool {
    let result = match input {
        Input::Quit => return false,
        Input::Empty => Ok(()),
        Input::Providers => {
            *status = Some(crate::ui::sidebar::render_providers(app.session()));
            Ok(())
        }
        Input::Provider(id) => app.select_provider(id.as_deref()),
        Input::Open(target) => {
            let id = resolve_conversation(app.session(), &target);
            app.select_conversation(Some(id.as_str()))
        }
        Input::Close => app.select_conversation(None),
        Input::Refresh => {
            app.refresh();
            Ok(())
        }
        Input::Send(body) => {
            if !app.send_message(&body) {
                *status = Some("open a conversation first".to_string());
            }
            Ok(())
        }
        Input::Unknown(line) => {
            *status = Some(format!("unknown command: {line}"));
            Ok(())
        }
    };
    if let Err(e) = result {
        *status = Some(e.to_string());
    }
    true
}

enum Wake {
    Line(Option<String>),
    Completion(Completion),
}

/// Input/redraw loop. Expects `app` to be started already.
pub async fn run<B: Backend>(mut app: App<B>, lines: &mut InputLines) -> std::io::Result<()> {
    let mut status: Option<String> = None;
    draw(app.session(), None);

    loop {
        let pending = app.in_flight() > 0;
        let wake = tokio::select! {
            line = lines.next_line() => Wake::Line(line?),
            Some(completion) = app.recv(), if pending => Wake::Completion(completion),
        };
        match wake {
            Wake::Line(None) => break,
            Wake::Line(Some(line)) => {
                status = None;
                if !handle_input(&mut app, parse(&line), &mut status) {
                    break;
                }
            }
            Wake::Completion(completion) => {
                for notice in app.apply(completion) {
                    status = Some(notice_text(&notice));
                }
            }
        }
        if let Loadable::Failed(reason) = app.session().providers() {
            status.get_or_insert_with(|| format!("providers unavailable: {reason}"));
        }
        draw(app.session(), status.as_deref());
    }
    println!();
    Ok(())
}
