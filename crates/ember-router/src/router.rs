use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ember_core::Component;
use serde::{Deserialize, Serialize};

use crate::path::{parse_query, split_location, Params, PathPattern, Query};

/// A path pattern bound to the component that renders it.
#[derive(Clone, Debug)]
pub struct Route {
    pattern: PathPattern,
    component: Component,
    exact: bool,
}

impl Route {
    pub fn new(path: impl Into<String>, component: Component) -> Self {
        Self {
            pattern: PathPattern::parse(path),
            component,
            exact: false,
        }
    }

    /// Only match a pathname equal to the pattern text, so `:param` and `*`
    /// no longer capture anything.
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn path(&self) -> &str {
        self.pattern.source()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }
}

/// The first route that matched a pathname.
#[derive(Clone, Debug)]
pub struct Match {
    pub route: Route,
    pub params: Params,
    /// The pathname equals the route's pattern text.
    pub exact: bool,
}

/// Serializable snapshot of the router, shipped to the client inside the
/// initial-state blob.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterState {
    pub pathname: String,
    pub params: Params,
    pub query: Query,
    pub history: Vec<String>,
    pub current_index: usize,
}

impl RouterState {
    /// The full history entry (pathname plus query) the router is showing.
    pub fn location(&self) -> &str {
        self.history
            .get(self.current_index)
            .map_or(self.pathname.as_str(), String::as_str)
    }
}

type Listener = Rc<dyn Fn(&RouterState)>;

struct RouterInner {
    routes: Vec<Route>,
    state: RefCell<RouterState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
}

/// In-memory history with route matching. Cloning shares the same history.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    pub fn new(routes: Vec<Route>, initial_location: &str) -> Self {
        let state = RouterState {
            history: vec![initial_location.to_owned()],
            current_index: 0,
            ..RouterState::default()
        };
        Self::with_state(routes, state)
    }

    /// Restores a router from a snapshot taken with [`Router::state`].
    pub fn from_state(routes: Vec<Route>, state: RouterState) -> Self {
        Self::with_state(routes, state)
    }

    fn with_state(routes: Vec<Route>, mut state: RouterState) -> Self {
        if state.history.is_empty() {
            state.history.push(state.pathname.clone());
        }
        state.current_index = state.current_index.min(state.history.len() - 1);
        let router = Self {
            inner: Rc::new(RouterInner {
                routes,
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        };
        router.sync_location();
        router
    }

    /// Stable for the lifetime of the router and shared by its clones.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn routes(&self) -> &[Route] {
        &self.inner.routes
    }

    pub fn state(&self) -> RouterState {
        self.inner.state.borrow().clone()
    }

    pub fn pathname(&self) -> String {
        self.inner.state.borrow().pathname.clone()
    }

    /// The current location with the params of the route it matched.
    pub fn context(&self) -> RouterContext {
        let state = self.inner.state.borrow();
        RouterContext {
            pathname: state.pathname.clone(),
            params: state.params.clone(),
            query: state.query.clone(),
            router: self.clone(),
        }
    }

    /// First route whose pattern matches `pathname`, in declaration order.
    pub fn match_path(&self, pathname: &str) -> Option<Match> {
        self.inner.routes.iter().find_map(|route| {
            let exact = pathname == route.path();
            if route.exact && !exact {
                return None;
            }
            let params = route.pattern.captures(pathname)?;
            Some(Match {
                route: route.clone(),
                params,
                exact,
            })
        })
    }

    pub fn current_match(&self) -> Option<Match> {
        self.match_path(&self.pathname())
    }

    /// Adds a history entry after the current one, discarding forward entries.
    pub fn push(&self, location: &str) {
        {
            let mut state = self.inner.state.borrow_mut();
            let keep = state.current_index + 1;
            state.history.truncate(keep);
            state.history.push(location.to_owned());
            state.current_index = state.history.len() - 1;
        }
        self.navigated();
    }

    /// Overwrites the current history entry.
    pub fn replace(&self, location: &str) {
        {
            let mut state = self.inner.state.borrow_mut();
            let index = state.current_index;
            state.history[index] = location.to_owned();
        }
        self.navigated();
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Moves `delta` entries through the history. Out-of-range moves (and a
    /// zero delta) are ignored and return `false`.
    pub fn go(&self, delta: isize) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            let target = state.current_index.checked_add_signed(delta);
            match target {
                Some(target) if delta != 0 && target < state.history.len() => {
                    state.current_index = target;
                }
                _ => {
                    log::trace!("ignoring history move by {delta}");
                    return false;
                }
            }
        }
        self.navigated();
        true
    }

    /// Calls `listener` after every navigation until the subscription is dropped.
    pub fn subscribe(&self, listener: impl Fn(&RouterState) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            router: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn navigated(&self) {
        self.sync_location();
        let state = self.state();
        log::debug!("navigated to {}", state.location());
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&state);
        }
    }

    /// Recomputes pathname, query and params from the current history entry.
    fn sync_location(&self) {
        let location = self.inner.state.borrow().location().to_owned();
        let (pathname, search) = split_location(&location);
        let params = self
            .match_path(pathname)
            .map(|matched| matched.params)
            .unwrap_or_default();
        let mut state = self.inner.state.borrow_mut();
        state.pathname = pathname.to_owned();
        state.query = parse_query(search);
        state.params = params;
    }
}

impl PartialEq for Router {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Router")
            .field("location", &state.location())
            .field("routes", &self.inner.routes.len())
            .finish()
    }
}

/// Keeps a router listener registered. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    router: Weak<RouterInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.router.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// What route-bound components receive: the current location plus navigation.
#[derive(Clone, Debug)]
pub struct RouterContext {
    pathname: String,
    params: Params,
    query: Query,
    router: Router,
}

impl RouterContext {
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn push(&self, location: &str) {
        self.router.push(location);
    }

    pub fn replace(&self, location: &str) {
        self.router.replace(location);
    }

    pub fn back(&self) -> bool {
        self.router.back()
    }

    pub fn forward(&self) -> bool {
        self.router.forward()
    }

    pub fn go(&self, delta: isize) -> bool {
        self.router.go(delta)
    }

    pub(crate) fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
