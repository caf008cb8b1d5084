use crate::api::ApiError;
use crate::api::models::Provider;
use crate::session::Loadable;
use crate::storage::{self, KeyValueStore};

const ACTIVE_KEY: &str = "active_provider";
const CATALOG_KEY: &str = "providers";

/// What the UI should show for "which provider is active".
#[derive(Debug, PartialEq, Eq)]
pub enum ActiveProvider<'a> {
    Unselected,
    /// Selected, but the catalog has not loaded yet.
    Pending(&'a str),
    Known(&'a Provider),
    /// The loaded catalog no longer lists the selected id.
    Missing(&'a str),
}

/// Holds the active provider id and the provider catalog, both persisted.
pub struct ProviderSelector {
    prefs: Box<dyn KeyValueStore>,
    active: Option<String>,
    catalog: Loadable<Vec<Provider>>,
    catalog_requested: bool,
}

impl ProviderSelector {
    pub fn restore(prefs: Box<dyn KeyValueStore>) -> Self {
        let active = prefs.get(ACTIVE_KEY).unwrap_or_else(|e| {
            log::warn!("could not read active provider: {e}");
            None
        });
        let catalog = match storage::get_json::<Vec<Provider>>(&*prefs, CATALOG_KEY) {
            Ok(Some(cached)) => Loadable::Ready(cached),
            Ok(None) => Loadable::Loading,
            Err(e) => {
                log::warn!("could not read cached providers: {e}");
                Loadable::Loading
            }
        };
        Self { prefs, active, catalog, catalog_requested: false }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn catalog(&self) -> &Loadable<Vec<Provider>> {
        &self.catalog
    }

    pub fn active(&self) -> ActiveProvider<'_> {
        let Some(id) = self.active.as_deref() else {
            return ActiveProvider::Unselected;
        };
        match self.catalog.ready() {
            Some(list) => match list.iter().find(|p| p.id == id) {
                Some(p) => ActiveProvider::Known(p),
                None => ActiveProvider::Missing(id),
            },
            None => ActiveProvider::Pending(id),
        }
    }

    /// Returns true once per selector; the catalog is fetched only at startup.
    pub(crate) fn take_catalog_request(&mut self) -> bool {
        !std::mem::replace(&mut self.catalog_requested, true)
    }

    /// Whether `id` may be selected. Unknown ids are only rejected once the catalog is loaded.
    pub fn accepts(&self, id: &str) -> bool {
        match self.catalog.ready() {
            Some(list) => list.iter().any(|p| p.id == id),
            None => true,
        }
    }

    /// Sets and persists the active id. Returns false when nothing changed.
    /// Records and persists the selection. Same-id no-ops are handled by the caller.
    pub(crate) fn set_active(&mut self, id: Option<&str>) {
        self.active = id.map(str::to_string);
        let saved = match id {
            Some(id) => self.prefs.put(ACTIVE_KEY, id),
            None => self.prefs.remove(ACTIVE_KEY),
        };
        if let Err(e) = saved {
            log::warn!("could not persist active provider: {e}");
        }
    }

    pub(crate) fn apply_catalog(&mut self, result: Result<Vec<Provider>, ApiError>) {
        match result {
            Ok(list) => {
                if let Err(e) = storage::put_json(&*self.prefs, CATALOG_KEY, &list) {
                    log::warn!("could not cache providers: {e}");
                }
                self.catalog = Loadable::Ready(list);
            }
            Err(e) => {
                log::warn!("failed to load providers: {e}");
                if self.catalog.ready().is_none() {
                    self.catalog = Loadable::Failed(e.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn provider(id: &str) -> Provider {
        Provider { id: id.into(), name: id.to_uppercase(), icon: String::new() }
    }

    #[test]
    fn placeholders_before_catalog_loads() {
        let mut sel = ProviderSelector::restore(Box::new(SqliteStore::in_memory().unwrap()));
        assert_eq!(sel.active(), ActiveProvider::Unselected);
        assert!(sel.catalog().is_loading());

        sel.set_active(Some("mock"));
        assert_eq!(sel.active(), ActiveProvider::Pending("mock"));

        sel.apply_catalog(Ok(vec![provider("keybase")]));
        assert_eq!(sel.active(), ActiveProvider::Missing("mock"));
    }

    #[test]
    fn selection_is_persisted_and_cleared() {
        let mut sel = ProviderSelector::restore(Box::new(SqliteStore::in_memory().unwrap()));
        sel.set_active(Some("mock"));
        assert_eq!(sel.prefs.get(ACTIVE_KEY).unwrap().as_deref(), Some("mock"));
        sel.set_active(None);
        assert_eq!(sel.prefs.get(ACTIVE_KEY).unwrap(), None);
        assert_eq!(sel.active_id(), None);
    }

    #[test]
    fn restores_persisted_selection_and_catalog() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(ACTIVE_KEY, "mock").unwrap();
        storage::put_json(&store, CATALOG_KEY, &vec![provider("mock")]).unwrap();

        let sel = ProviderSelector::restore(Box::new(store));
        assert_eq!(sel.active(), ActiveProvider::Known(&provider("mock")));
    }

    #[test]
    fn failed_refresh_keeps_cached_catalog() {
        let store = SqliteStore::in_memory().unwrap();
        storage::put_json(&store, CATALOG_KEY, &vec![provider("mock")]).unwrap();
        let mut sel = ProviderSelector::restore(Box::new(store));

        sel.apply_catalog(Err(ApiError::Status { status: 500, path: "/providers".into() }));
        assert_eq!(sel.catalog().ready().map(Vec::len), Some(1));
    }

    #[test]
    fn failed_first_load_is_terminal() {
        let mut sel = ProviderSelector::restore(Box::new(SqliteStore::in_memory().unwrap()));
        sel.apply_catalog(Err(ApiError::Status { status: 500, path: "/providers".into() }));
        assert!(matches!(sel.catalog(), Loadable::Failed(_)));
    }

    #[test]
    fn catalog_is_requested_once() {
        let mut sel = ProviderSelector::restore(Box::new(SqliteStore::in_memory().unwrap()));
        assert!(sel.take_catalog_request());
        assert!(!sel.take_catalog_request());
    }
}
