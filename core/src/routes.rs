//! Client-side route table.
//!
//! Seven pages, each reachable through one hash-based URL pattern. Matching
//! is delegated to `matchit` (the router axum is built on), so static
//! segments win over parameters: `/items/new` never reaches the item view.
//! Numeric parameters are checked after matching; a non-numeric id makes the
//! whole route miss.

use std::fmt;

use matchit::{Params, Router};

/// Page component a route activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    ListItems,
    ShowItem,
    CreateItem,
    ShowProfile,
    ChangeProfile,
    ChangeItem,
    ChangeQuery,
}

/// One declared route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub name: &'static str,
    pub page: Page,
}

/// Declared routes in declaration order.
pub const ROUTES: [RouteDef; 7] = [
    RouteDef { path: "/", name: "Home", page: Page::ListItems },
    RouteDef { path: "/profile/{id}", name: "change_Profile", page: Page::ChangeProfile },
    RouteDef { path: "/profile", name: "Profile", page: Page::ShowProfile },
    RouteDef { path: "/items/new", name: "Create Item", page: Page::CreateItem },
    RouteDef { path: "/items/{id}", name: "Items", page: Page::ShowItem },
    RouteDef { path: "/change_items/{id}", name: "change_Items", page: Page::ChangeItem },
    // matchit requires one parameter name per segment position, hence `{id}`
    // for the item segment shared with `/items/{id}`.
    RouteDef { path: "/items/{id}/queries/{query_id}", name: "change question", page: Page::ChangeQuery },
];

/// A resolved route with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Profile,
    EditProfile { id: u64 },
    CreateItem,
    ShowItem { id: u64 },
    EditItem { id: u64 },
    EditQuery { item_id: u64, query_id: u64 },
}

impl Route {
    pub fn page(&self) -> Page {
        match self {
            Route::Home => Page::ListItems,
            Route::Profile => Page::ShowProfile,
            Route::EditProfile { .. } => Page::ChangeProfile,
            Route::CreateItem => Page::CreateItem,
            Route::ShowItem { .. } => Page::ShowItem,
            Route::EditItem { .. } => Page::ChangeItem,
            Route::EditQuery { .. } => Page::ChangeQuery,
        }
    }

    pub fn name(&self) -> &'static str {
        let page = self.page();
        ROUTES
            .iter()
            .find(|def| def.page == page)
            .map(|def| def.name)
            .unwrap_or_default()
    }

    /// Path that resolves back to this route.
    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::EditProfile { id } => format!("/profile/{id}"),
            Route::CreateItem => "/items/new".to_string(),
            Route::ShowItem { id } => format!("/items/{id}"),
            Route::EditItem { id } => format!("/change_items/{id}"),
            Route::EditQuery { item_id, query_id } => format!("/items/{item_id}/queries/{query_id}"),
        }
    }

    /// Link target for hash-based navigation, e.g. `#/items/42`.
    pub fn to_hash(&self) -> String {
        format!("#{}", self.to_path())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern: {0}")]
    Insert(#[from] matchit::InsertError),
}

/// Compiled matcher over [`ROUTES`].
pub struct RouteTable {
    router: Router<Page>,
}

impl RouteTable {
    /// # Errors
    /// Returns [`RouteError::Insert`] if two patterns conflict.
    pub fn new() -> Result<Self, RouteError> {
        let mut router = Router::new();
        for def in &ROUTES {
            router.insert(def.path, def.page)?;
        }
        Ok(Self { router })
    }

    pub fn entries(&self) -> &'static [RouteDef] {
        &ROUTES
    }

    /// Resolve a path or hash fragment (`/items/42`, `#/items/42`).
    /// Matching is case-insensitive. A query string and a trailing slash are
    /// ignored.
    pub fn resolve(&self, path: &str) -> Option<Route> {
        let path = normalize(path);
        let matched = self.router.at(&path).ok()?;
        build_route(*matched.value, &matched.params)
    }
}

fn normalize(raw: &str) -> String {
    let path = raw.strip_prefix('#').unwrap_or(raw);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/').to_ascii_lowercase();
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn build_route(page: Page, params: &Params<'_, '_>) -> Option<Route> {
    let route = match page {
        Page::ListItems => Route::Home,
        Page::ShowProfile => Route::Profile,
        Page::CreateItem => Route::CreateItem,
        Page::ChangeProfile => Route::EditProfile { id: numeric(params, "id")? },
        Page::ShowItem => Route::ShowItem { id: numeric(params, "id")? },
        Page::ChangeItem => Route::EditItem { id: numeric(params, "id")? },
        Page::ChangeQuery => Route::EditQuery {
            item_id: numeric(params, "id")?,
            query_id: numeric(params, "query_id")?,
        },
    };
    Some(route)
}

fn numeric(params: &Params<'_, '_>, key: &str) -> Option<u64> {
    let raw = params.get(key)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
