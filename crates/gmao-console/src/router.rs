//! Screen routing.

/// Screens reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// Machines grouped by production chain.
    #[default]
    Dashboard,
    /// Flat table of maintenance records.
    Maintenance,
    /// Stock listing.
    Stock,
    /// Placeholder for unknown navigation tokens.
    NotFound,
}

impl Route {
    /// Sidebar entries in display order.
    pub const TABS: [Route; 3] = [Route::Dashboard, Route::Maintenance, Route::Stock];

    /// Resolves a navigation token. Empty resolves to the dashboard.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "" | "dashboard" => Self::Dashboard,
            "maintenance" => Self::Maintenance,
            "stock" => Self::Stock,
            _ => Self::NotFound,
        }
    }

    /// Screen title shown in the header.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Maintenance => "Maintenance",
            Self::Stock => "Stock",
            Self::NotFound => "404 – Page not found",
        }
    }

    /// Navigation token for this screen.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Maintenance => "maintenance",
            Self::Stock => "stock",
            Self::NotFound => "404",
        }
    }

    fn tab_index(self) -> usize {
        Self::TABS.iter().position(|tab| *tab == self).unwrap_or(0)
    }
}

/// Tracks the active screen.
#[derive(Debug, Default)]
pub struct Router {
    active: Route,
}

impl Router {
    /// Currently active screen.
    #[must_use]
    pub fn active(&self) -> Route {
        self.active
    }

    /// Resolves `token` and makes the result active.
    pub fn navigate(&mut self, token: &str) -> Route {
        self.active = Route::parse(token);
        self.active
    }

    /// Makes `route` active.
    pub fn set(&mut self, route: Route) {
        self.active = route;
    }

    /// Cycles to the next sidebar entry.
    pub fn next_tab(&mut self) -> Route {
        let index = (self.active.tab_index() + 1) % Route::TABS.len();
        self.active = Route::TABS[index];
        self.active
    }

    /// Cycles to the previous sidebar entry.
    pub fn prev_tab(&mut self) -> Route {
        let index = (self.active.tab_index() + Route::TABS.len() - 1) % Route::TABS.len();
        self.active = Route::TABS[index];
        self.active
    }
}
