//! Client-side routing for Ember.
//!
//! The [`Router`] owns an in-memory history and matches it against
//! [`Route`]s. Components never reach a global router: it travels through
//! props as opaque data, and [`use_router`] subscribes the calling component
//! to navigation.

mod components;
mod error;
pub mod path;
mod router;

pub use components::{link, outlet, outlet_with, route_match, use_router};
pub use error::RouterError;
pub use path::{parse_query, Params, PathPattern, Query};
pub use router::{Match, Route, Router, RouterContext, RouterState, Subscription};
