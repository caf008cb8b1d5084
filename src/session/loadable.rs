/// Client-side view of a remotely loaded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    /// Nothing is in scope (no provider or no conversation selected).
    Absent,
    Loading,
    Ready(T),
    /// Terminal until the user retries. Renders like `Absent`.
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Absent
    }
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Loadable::Absent)
    }
}
