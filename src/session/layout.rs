use crate::api::models::Conversation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Sidebar expanded, no detail pane.
    List,
    /// Sidebar collapsed to a narrow column, conversation shown.
    Detail,
}

impl LayoutMode {
    pub fn for_selection(active: Option<&Conversation>) -> Self {
        if active.is_some() { LayoutMode::Detail } else { LayoutMode::List }
    }

    pub fn sidebar_expanded(self) -> bool {
        self == LayoutMode::List
    }

    pub fn shows_detail(self) -> bool {
        self == LayoutMode::Detail
    }
}
