use std::error::Error;

use ember_core::{
    attrs, children, element, use_effect_with, use_state, AttrValue, Component, EventHandler,
    Node, Props, RenderResult,
};
use ember_dom::{MemorySurface, MountOptions, Root, Surface};
use ember_router::{link, outlet_with, Route, Router, RouterContext, RouterState};
use ember_runtime_std::{init_logging, load_config_from_env, StdRuntime};
use ember_ssr::{
    extract_initial_state, extract_root_markup, ServerProps, SsrContext, SsrRequest, SsrServer,
};
use ember_testing::load_markup;
use serde_json::{json, Value};

fn counter_page(_: &Props) -> RenderResult<Node> {
    let (count, set_count) = use_state(0)?;
    use_effect_with(count, move || log::info!("count is now {count}"))?;
    let increment = EventHandler::new(move |_| set_count.set(count + 1));
    Ok(element(
        "div",
        attrs! { "className" => "counter" },
        children![
            element("span", attrs! { "id" => "count" }, children![count]),
            element("button", attrs! { "id" => "increment", "onClick" => increment }, children!["+"]),
        ],
    ))
}

fn user_page(props: &Props) -> RenderResult<Node> {
    let id = props
        .data::<RouterContext>("route")
        .and_then(|route| route.param("id").map(str::to_owned))
        .unwrap_or_default();
    let user = props.data::<Value>("serverProps");
    let details = match user.as_deref() {
        Some(user) => element(
            "ul",
            attrs! { "className" => "user-info" },
            children![
                element("li", None, children![format!("Name: {}", user["name"].as_str().unwrap_or("?"))]),
                element("li", None, children![format!("Role: {}", user["role"].as_str().unwrap_or("?"))]),
            ],
        ),
        None => element("p", None, children!["Loaded on the client"]),
    };
    Ok(element(
        "div",
        attrs! { "className" => "page" },
        children![element("h2", None, children![format!("User {id}")]), details],
    ))
}

fn routes() -> Vec<Route> {
    vec![
        Route::new("/", Component::named("Counter", counter_page)).exact(),
        Route::new("/users/:id", Component::named("User", user_page)),
    ]
}

fn app(router: &Router, server_props: Option<&Value>) -> Node {
    let page_props = match server_props {
        Some(props) if !props.is_null() => attrs! { "serverProps" => AttrValue::data(props.clone()) },
        _ => attrs! {},
    };
    element(
        "div",
        attrs! { "className" => "app" },
        children![
            element(
                "nav",
                None,
                children![
                    link(router, "/", attrs! { "id" => "nav-home" }, children!["Home"]),
                    link(router, "/users/1", attrs! { "id" => "nav-user" }, children!["User 1"]),
                ],
            ),
            element("main", None, children![outlet_with(router, page_props)]),
        ],
    )
}

fn server(config: ember_core::RenderConfig) -> SsrServer {
    SsrServer::with_config(routes(), config).page("/users/:id", |context| {
        let id = context.params.get("id").map(String::as_str);
        Ok(match id {
            Some("1") => ServerProps::Props(json!({ "name": "John Doe", "role": "Admin" })),
            Some("2") => ServerProps::Props(json!({ "name": "Jane Smith", "role": "User" })),
            Some("me") => ServerProps::Redirect {
                destination: "/users/1".to_owned(),
                permanent: false,
            },
            _ => ServerProps::NotFound,
        })
    })
}

fn render_app(context: &SsrContext<'_>) -> Node {
    app(context.router, context.props)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    println!("Ember counter demo");
    let config = load_config_from_env()?;
    let server = server(config.clone());

    println!("=== Server ===");
    for url in ["/users/2", "/users/me", "/users/404"] {
        let response = server.handle(&SsrRequest::get(url), render_app);
        let location = response.header("Location").unwrap_or("-");
        println!("GET {url} -> {} (location: {location})", response.status);
    }

    let response = server.handle(&SsrRequest::get("/"), render_app);
    let document = response.body;
    let state_global = &config.document.state_global;
    let markup = extract_root_markup(&document, &config.document.root_id)
        .ok_or("document has no root element")?
        .to_owned();
    println!("GET / -> {}\n{markup}\n", response.status);

    println!("=== Client ===");
    let state = extract_initial_state(&document, state_global)?.ok_or("document has no initial state")?;
    let router_state: RouterState = serde_json::from_value(state["router"].clone())?;
    let router = Router::from_state(routes(), router_state);

    let runtime = StdRuntime::new();
    let mut surface = MemorySurface::with_config(config.clone());
    let container = surface.create_element("div");
    load_markup(&mut surface, container, &markup, &config)?;
    let mut root = Root::with_runtime(surface, container, config, runtime.runtime());
    root.mount(app(&router, Some(&state["props"])), MountOptions::hydrate())?;
    root.flush()?;
    println!("hydrated: {}", root.surface().inner_markup(container));

    for _ in 0..3 {
        let button = root
            .surface()
            .find_by_attribute(container, "id", "increment")
            .ok_or("increment button missing")?;
        root.surface().click(button);
        if runtime.take_frame_request() {
            let passes = root.flush()?;
            log::debug!("frame rendered in {passes} passes");
        }
    }
    let count = root
        .surface()
        .find_by_attribute(container, "id", "count")
        .map(|span| root.surface().text_content(span))
        .unwrap_or_default();
    println!("count after three clicks: {count}");

    let user_link = root
        .surface()
        .find_by_attribute(container, "id", "nav-user")
        .ok_or("user link missing")?;
    root.surface().click(user_link);
    root.flush()?;
    println!("navigated to {}: {}", router.pathname(), root.surface().inner_markup(container));

    root.unmount()?;
    Ok(())
}
