//! Access decisions for the application's views.
//!
//! [`evaluate`] is a pure function of the session snapshot and the requested
//! route. Protected content is never rendered while the session is pending.

use crate::{Session, SessionController, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, shows the dashboard content.
    Root,
    Dashboard,
    Strategy,
    SkillAnalyzer,
    Learning,
    Jobs,
    Tasks,
    Settings,
    Upgrade,
    SignIn,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Root,
        Route::Dashboard,
        Route::Strategy,
        Route::SkillAnalyzer,
        Route::Learning,
        Route::Jobs,
        Route::Tasks,
        Route::Settings,
        Route::Upgrade,
        Route::SignIn,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Dashboard => "/dashboard",
            Route::Strategy => "/strategy",
            Route::SkillAnalyzer => "/skill-analyzer",
            Route::Learning => "/learning",
            Route::Jobs => "/jobs",
            Route::Tasks => "/tasks",
            Route::Settings => "/settings",
            Route::Upgrade => "/upgrade",
            Route::SignIn => "/auth/signin",
        }
    }

    /// Parse a request path. Query strings and a trailing slash are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    /// Everything except the sign-in page requires a principal.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::SignIn)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What a view should do with the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Show a loading indicator in place of the view.
    Loading,
    Redirect(Route),
}

pub fn evaluate(session: &Session, route: Route) -> GuardDecision {
    if route.is_protected() {
        if session.is_pending() {
            GuardDecision::Loading
        } else if session.principal.is_none() {
            GuardDecision::Redirect(Route::SignIn)
        } else {
            GuardDecision::Render
        }
    } else if session.is_signed_in() {
        GuardDecision::Redirect(Route::Dashboard)
    } else {
        GuardDecision::Render
    }
}

/// Route decisions bound to a live [`SessionController`].
#[derive(Clone)]
pub struct RouteGuard {
    controller: SessionController,
}

impl RouteGuard {
    pub fn new(controller: SessionController) -> Self {
        Self { controller }
    }

    /// Decision for `route` against the current snapshot.
    pub fn decide(&self, route: Route) -> GuardDecision {
        evaluate(&self.controller.current_session(), route)
    }

    /// Call `on_decision` now and again whenever the decision for `route`
    /// changes.
    pub fn watch<F>(&self, route: Route, on_decision: F) -> Subscription
    where
        F: Fn(GuardDecision) + Send + Sync + 'static,
    {
        let last: Arc<Mutex<Option<GuardDecision>>> = Arc::new(Mutex::new(None));
        self.controller.subscribe(move |session| {
            let decision = evaluate(session, route);
            {
                let mut last = last.lock();
                if *last == Some(decision) {
                    return;
                }
                *last = Some(decision);
            }
            debug!(route = %route, ?decision, "Route decision changed");
            on_decision(decision);
        })
    }
}
