use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Auth,
    Dashboard,
    Projects,
    Team,
    Settings,
    TaskBoard(String),
    Activity,
}

impl Route {
    /// Parses a path. Unknown paths (and `/`) fall back to the landing page.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["auth"] => Route::Auth,
            ["dashboard"] => Route::Dashboard,
            ["projects"] => Route::Projects,
            ["team"] => Route::Team,
            ["settings"] => Route::Settings,
            ["activity"] => Route::Activity,
            ["projects", id, "task"] => Route::TaskBoard(id.to_string()),
            _ => Route::Landing,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/landing".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::Team => "/team".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::TaskBoard(id) => format!("/projects/{}/task", id),
            Route::Activity => "/activity".to_string(),
        }
    }

    /// Routes inside the authenticated shell.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Landing | Route::Auth)
    }

    /// Applies the token-presence gate: shell routes send unauthenticated
    /// callers to the auth page, the auth page sends signed-in callers on to
    /// the dashboard.
    pub fn guard(self, authenticated: bool) -> Route {
        match (self, authenticated) {
            (route, false) if route.requires_auth() => Route::Auth,
            (Route::Auth, true) => Route::Dashboard,
            (route, _) => route,
        }
    }

    pub fn resolve(path: &str, authenticated: bool) -> Route {
        Route::parse(path).guard(authenticated)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
