use super::*;
use ember_core::{element, Node, Props, RenderResult};
use std::cell::RefCell;

fn page(_: &Props) -> RenderResult<Node> {
    Ok(element("main", None, Vec::new()))
}

fn routes() -> Vec<Route> {
    vec![
        Route::new("/", Component::function(page)).exact(),
        Route::new("/users/:id", Component::function(page)),
        Route::new("/docs/*", Component::function(page)),
    ]
}

#[test]
fn initial_location_is_parsed() {
    let router = Router::new(routes(), "/users/7?tab=posts");
    let state = router.state();
    assert_eq!(state.pathname, "/users/7");
    assert_eq!(state.params.get("id").map(String::as_str), Some("7"));
    assert_eq!(state.query.get("tab").map(String::as_str), Some("posts"));
    assert_eq!(state.history, vec!["/users/7?tab=posts".to_owned()]);
    assert_eq!(state.current_index, 0);
}

#[test]
fn first_matching_route_wins() {
    let router = Router::new(routes(), "/");
    let matched = router.match_path("/users/3").unwrap();
    assert_eq!(matched.route.path(), "/users/:id");
    assert!(!matched.exact);
    assert!(router.match_path("/").unwrap().exact);
    assert!(router.match_path("/nowhere").is_none());
}

#[test]
fn exact_routes_reject_pattern_matches() {
    let router = Router::new(
        vec![Route::new("/items/:id", Component::function(page)).exact()],
        "/",
    );
    assert!(router.match_path("/items/1").is_none());
    assert!(router.match_path("/items/:id").is_some());
}

#[test]
fn push_replace_and_history_moves() {
    let router = Router::new(routes(), "/");
    router.push("/users/1");
    router.push("/users/2");
    assert_eq!(router.state().current_index, 2);

    assert!(router.back());
    assert_eq!(router.pathname(), "/users/1");
    assert_eq!(router.context().param("id"), Some("1"));

    assert!(router.forward());
    assert_eq!(router.pathname(), "/users/2");
    assert!(!router.forward());

    assert!(router.go(-2));
    assert_eq!(router.pathname(), "/");
    assert!(!router.go(-1));
    assert!(!router.go(5));
    assert!(!router.go(0));

    router.replace("/docs/intro");
    let state = router.state();
    assert_eq!(state.history, vec!["/docs/intro", "/users/1", "/users/2"]);
    assert_eq!(state.pathname, "/docs/intro");
    assert!(state.params.is_empty());
}

#[test]
fn push_after_back_discards_forward_entries() {
    let router = Router::new(routes(), "/");
    router.push("/users/1");
    router.push("/users/2");
    router.back();
    router.push("/docs/a");
    assert_eq!(router.state().history, vec!["/", "/users/1", "/docs/a"]);
    assert!(!router.forward());
}

#[test]
fn subscribers_hear_every_navigation_until_dropped() {
    let router = Router::new(routes(), "/");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let subscription = router.subscribe(move |state| log.borrow_mut().push(state.location().to_owned()));
    assert_eq!(router.listener_count(), 1);

    router.push("/users/1?x=1");
    router.back();
    router.go(3);
    subscription.unsubscribe();
    router.push("/docs/z");

    assert_eq!(*seen.borrow(), vec!["/users/1?x=1", "/"]);
    assert_eq!(router.listener_count(), 0);
}

#[test]
fn listener_may_read_router_during_notification() {
    let router = Router::new(routes(), "/");
    let reader = router.clone();
    let seen = Rc::new(RefCell::new(String::new()));
    let log = Rc::clone(&seen);
    let _subscription = router.subscribe(move |_| *log.borrow_mut() = reader.pathname());
    router.push("/users/9");
    assert_eq!(*seen.borrow(), "/users/9");
}

#[test]
fn subscription_outliving_router_is_harmless() {
    let router = Router::new(routes(), "/");
    let subscription = router.subscribe(|_| {});
    drop(router);
    drop(subscription);
}

#[test]
fn state_round_trips_through_json() {
    let router = Router::new(routes(), "/");
    router.push("/users/5?sort=asc");
    let json = serde_json::to_string(&router.state()).unwrap();
    assert!(json.contains("\"currentIndex\":1"));

    let restored: RouterState = serde_json::from_str(&json).unwrap();
    let client = Router::from_state(routes(), restored);
    assert_eq!(client.state(), router.state());
    assert!(client.back());
    assert_eq!(client.pathname(), "/");
}

#[test]
fn from_state_repairs_out_of_range_index() {
    let state = RouterState {
        pathname: "/users/1".into(),
        current_index: 9,
        ..RouterState::default()
    };
    let router = Router::from_state(routes(), state);
    let state = router.state();
    assert_eq!(state.history, vec!["/users/1"]);
    assert_eq!(state.current_index, 0);
    assert_eq!(state.params.get("id").map(String::as_str), Some("1"));
}

#[test]
fn clones_share_history() {
    let router = Router::new(routes(), "/");
    let other = router.clone();
    other.push("/users/4");
    assert_eq!(router.pathname(), "/users/4");
    assert_eq!(router, other);
    assert_eq!(router.id(), other.id());
    assert_ne!(router, Router::new(routes(), "/"));
}
