use crate::session::{ActiveProvider, Loadable, Session};
use crate::utils::truncate;

pub const WIDE: usize = 48;
pub const NARROW: usize = 18;

pub fn width(session: &Session) -> usize {
    if session.layout().sidebar_expanded() { WIDE } else { NARROW }
}

pub fn header(session: &Session) -> String {
    match session.active_provider() {
        ActiveProvider::Unselected => "[no provider] /providers to list, /provider <id> to pick".to_string(),
        ActiveProvider::Pending(id) => format!("[{id} …]"),
        ActiveProvider::Known(p) => format!("[{}]", p.name),
        ActiveProvider::Missing(id) => format!("[{id}?]"),
    }
}

pub fn render(session: &Session) -> String {
    let width = width(session);
    let expanded = session.layout().sidebar_expanded();
    let mut out = vec![truncate(&header(session), width)];

    match session.conversations() {
        Loadable::Absent => {}
        Loadable::Loading => out.push("  loading…".to_string()),
        Loadable::Failed(_) => out.push("  unavailable".to_string()),
        Loadable::Ready(list) if list.is_empty() => out.push("  no conversations".to_string()),
        Loadable::Ready(list) => {
            let active = session.active_conversation().map(|c| c.id.as_str());
            for (idx, conv) in list.iter().enumerate() {
                let marker = if Some(conv.id.as_str()) == active { '>' } else { ' ' };
                let mut line = format!("{marker}{:>2}. {}", idx + 1, conv.name);
                if expanded {
                    if let Some(ts) = conv.last_active {
                        line.push_str(&format!("  ({})", ts.format("%Y-%m-%d %H:%M")));
                    }
                }
                out.push(truncate(&line, width));
            }
        }
    }
    out.join("\n")
}

/// Provider catalog listing for `/providers`.
pub fn render_providers(session: &Session) -> String {
    match session.providers() {
        Loadable::Absent | Loadable::Loading => "providers: loading…".to_string(),
        Loadable::Failed(reason) => format!("providers unavailable: {reason}"),
        Loadable::Ready(list) if list.is_empty() => "no providers".to_string(),
        Loadable::Ready(list) => {
            let active = session.active_provider_id();
            list.iter()
                .map(|p| {
                    let marker = if Some(p.id.as_str()) == active { '*' } else { ' ' };
                    format!("{marker} {} ({})", p.id, p.name)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
