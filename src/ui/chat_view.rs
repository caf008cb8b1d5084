use crate::session::{Direction, Loadable, Session};

pub const WIDTH: usize = 60;

pub fn render(session: &Session) -> String {
    let Some(conv) = session.active_conversation() else {
        return String::new();
    };
    let mut out = vec![format!("== {} ==", conv.name)];
    match session.messages() {
        Loadable::Absent => {}
        Loadable::Loading => out.push("loading…".to_string()),
        Loadable::Failed(_) => out.push("could not load messages, /open again to retry".to_string()),
        Loadable::Ready(list) if list.is_empty() => out.push("no messages yet".to_string()),
        Loadable::Ready(list) => {
            for msg in list {
                let time = msg.timestamp.format("%H:%M");
                let body = msg.body.as_deref().unwrap_or("");
                let line = match session.direction(msg) {
                    Direction::Outgoing => format!("{:>width$}", format!("{body} [{time}]"), width = WIDTH),
                    Direction::Incoming { sender } => {
                        let name = sender.map(|c| c.name.as_str()).unwrap_or("?");
                        format!("[{time}] {name}: {body}")
                    }
                };
                out.push(line);
            }
        }
    }
    out.join("\n")
}
