//! Navigable screens of the helpdesk application.

use shared::models::ResourceId;
use std::{fmt, str::FromStr};
use strum::EnumIter;

/// A navigation target, addressable by name or by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Route {
    /// `/`
    #[default]
    Home,
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/contact-us`
    ContactUs,
    /// `/dashboard`
    Dashboard,
    /// `/dashboard/technician`
    DashboardTechnician,
    /// `/dashboard/supervisor`
    DashboardSupervisor,
    /// `/admin`
    Admin,
    /// `/tickets/new`
    NewTicket,
    /// `/tickets/update`
    UpdateTicket,
    /// `/ticket/:id`
    TicketDetail {
        /// Ticket shown.
        id: ResourceId,
    },
    /// Anything else.
    NotFound,
}

impl Route {
    /// Route name as used by `navigate` targets.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::ContactUs => "contact-us",
            Self::Dashboard => "dashboard",
            Self::DashboardTechnician => "dashboard-technician",
            Self::DashboardSupervisor => "dashboard-supervisor",
            Self::Admin => "admin",
            Self::NewTicket => "new-ticket",
            Self::UpdateTicket => "update-ticket",
            Self::TicketDetail { .. } => "ticket_detail",
            Self::NotFound => "not-found",
        }
    }

    /// Path of the screen, with the ticket id filled in.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::ContactUs => "/contact-us".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::DashboardTechnician => "/dashboard/technician".to_string(),
            Self::DashboardSupervisor => "/dashboard/supervisor".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::NewTicket => "/tickets/new".to_string(),
            Self::UpdateTicket => "/tickets/update".to_string(),
            Self::TicketDetail { id } => format!("/ticket/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Match a path; unknown paths resolve to [`Route::NotFound`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/contact-us" => Self::ContactUs,
            "/dashboard" => Self::Dashboard,
            "/dashboard/technician" => Self::DashboardTechnician,
            "/dashboard/supervisor" => Self::DashboardSupervisor,
            "/admin" => Self::Admin,
            "/tickets/new" => Self::NewTicket,
            "/tickets/update" => Self::UpdateTicket,
            other => other
                .strip_prefix("/ticket/")
                .and_then(|id| id.parse().ok())
                .map_or(Self::NotFound, |id| Self::TicketDetail { id }),
        }
    }

    /// Match a route name. `ticket_detail` needs a path with an id instead.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let route = match name {
            "home" => Self::Home,
            "login" => Self::Login,
            "register" => Self::Register,
            "contact-us" => Self::ContactUs,
            "dashboard" => Self::Dashboard,
            "dashboard-technician" => Self::DashboardTechnician,
            "dashboard-supervisor" => Self::DashboardSupervisor,
            "admin" => Self::Admin,
            "new-ticket" => Self::NewTicket,
            "update-ticket" => Self::UpdateTicket,
            "not-found" => Self::NotFound,
            _ => return None,
        };
        Some(route)
    }

    /// Reachable without a session.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Login | Self::Register | Self::ContactUs
        )
    }

    /// Needs a signed-in user.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !self.is_public()
    }

    /// Needs an administrator.
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    /// Accepts a path (`/ticket/4`) or a route name (`dashboard`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.starts_with('/') {
            return Ok(Self::from_path(value));
        }
        Self::from_name(value).ok_or_else(|| format!("unknown route '{value}'"))
    }
}
