use std::sync::OnceLock;

use shared::domain::Route;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const BRAND: &str = "FinWise";

/// Active-route state read by the navigation bar. One instance per process
/// via [`RouteStore::global`]; screens never keep their own copy.
#[derive(Debug)]
pub struct RouteStore {
    tx: watch::Sender<Route>,
}

impl RouteStore {
    pub fn new(initial: Route) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn global() -> &'static RouteStore {
        static STORE: OnceLock<RouteStore> = OnceLock::new();
        STORE.get_or_init(|| RouteStore::new(Route::default()))
    }

    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.tx.send_replace(route);
        if previous != route {
            debug!(from = previous.path(), to = route.path(), "route changed");
        }
    }

    /// Navigates to the route owning `path`; unknown paths leave the store as is.
    pub fn navigate_path(&self, path: &str) -> Option<Route> {
        match Route::from_path(path) {
            Some(route) => {
                self.navigate(route);
                Some(route)
            }
            None => {
                warn!(path, "no route for path");
                None
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

pub fn nav_items(store: &RouteStore) -> Vec<NavItem> {
    let current = store.current();
    Route::ALL
        .into_iter()
        .map(|route| NavItem {
            route,
            label: route.nav_label(),
            path: route.path(),
            active: route == current,
        })
        .collect()
}

/// One-line bar with the active item in brackets.
pub fn render_nav_bar(store: &RouteStore) -> String {
    let items = nav_items(store)
        .into_iter()
        .map(|item| {
            if item.active {
                format!("[{}]", item.label)
            } else {
                item.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{BRAND} :: {items}")
}
