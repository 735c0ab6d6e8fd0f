//! Route-bound components. Each one takes the router as opaque `router` data.

use std::rc::Rc;

use ember_core::{
    attrs, children, component, element, fragment, use_effect_with, use_state, AttrValue,
    Attributes, Child, Cleanup, Component, EventHandler, Node, Props, RenderError, RenderResult,
};

use crate::error::RouterError;
use crate::router::{Router, RouterContext};

/// Re-renders the calling component after every navigation of `router`.
pub fn use_router(router: &Router) -> RenderResult<RouterContext> {
    let (_, set_version) = use_state(0u64)?;
    let subscribed = router.clone();
    use_effect_with(router.id(), move || {
        let subscription = subscribed.subscribe(move |_| set_version.update(|version| version + 1));
        Cleanup::from_fn(move || subscription.unsubscribe())
    })?;
    Ok(router.context())
}

fn router_prop(props: &Props) -> RenderResult<Rc<Router>> {
    props
        .data::<Router>("router")
        .ok_or_else(|| RenderError::custom(RouterError::MissingProp("router")))
}

/// Props passed to a page rendered by [`outlet`] or [`route_match`].
fn page_attributes(router: &Router, context: RouterContext) -> Attributes {
    attrs! {
        "router" => AttrValue::data(router.clone()),
        "route" => AttrValue::data(context),
    }
}

/// Renders the component of the first route matching the current pathname,
/// or a "Page not found" placeholder.
pub fn outlet(router: &Router) -> Node {
    outlet_with(router, Attributes::new())
}

/// [`outlet`] that also hands `attributes` to the matched page.
pub fn outlet_with(router: &Router, attributes: Attributes) -> Node {
    component(
        Component::named("Outlet", render_outlet),
        attributes.with("router", AttrValue::data(router.clone())),
        children![],
    )
}

fn render_outlet(props: &Props) -> RenderResult<Node> {
    let router = router_prop(props)?;
    let context = use_router(&router)?;
    match router.match_path(context.pathname()) {
        Some(matched) => {
            log::trace!("{} matched route {}", context.pathname(), matched.route.path());
            let context = context.with_params(matched.params);
            let mut attributes = page_attributes(&router, context);
            for (name, value) in props.attributes().iter() {
                if !attributes.contains(name) {
                    attributes.insert(name, value.clone());
                }
            }
            Ok(component(
                matched.route.component().clone(),
                attributes,
                children![],
            ))
        }
        None => {
            log::debug!("no route for {}", context.pathname());
            Ok(element("div", None, children!["Page not found"]))
        }
    }
}

/// Renders `page` only while the pathname equals `path`.
pub fn route_match(router: &Router, path: &str, page: Component) -> Node {
    component(
        Component::named("RouteMatch", render_route_match),
        attrs! {
            "router" => AttrValue::data(router.clone()),
            "path" => path,
            "component" => AttrValue::data(page),
        },
        children![],
    )
}

fn render_route_match(props: &Props) -> RenderResult<Node> {
    let router = router_prop(props)?;
    let context = use_router(&router)?;
    let path = props
        .str("path")
        .ok_or_else(|| RenderError::custom(RouterError::MissingProp("path")))?;
    let page = props
        .data::<Component>("component")
        .ok_or_else(|| RenderError::custom(RouterError::MissingProp("component")))?;
    if context.pathname() != path {
        return Ok(fragment(children![]));
    }
    let params = router
        .match_path(path)
        .map(|matched| matched.params)
        .unwrap_or_default();
    Ok(component(
        (*page).clone(),
        page_attributes(&router, context.with_params(params)),
        children![],
    ))
}

/// An `<a href>` that navigates through `router` instead of the host.
///
/// Other attributes (`className`, `style`, ...) land on the anchor. A user
/// `onClick` runs after the navigation.
pub fn link(
    router: &Router,
    to: &str,
    attributes: impl Into<Option<Attributes>>,
    children: impl IntoIterator<Item = Child>,
) -> Node {
    let attributes = attributes
        .into()
        .unwrap_or_default()
        .with("router", AttrValue::data(router.clone()))
        .with("to", to);
    component(Component::named("Link", render_link), attributes, children)
}

fn render_link(props: &Props) -> RenderResult<Node> {
    let router = router_prop(props)?;
    let to = props
        .str("to")
        .ok_or_else(|| RenderError::custom(RouterError::MissingProp("to")))?
        .to_owned();

    let user_click = props.handler("onClick").cloned();
    let target = to.clone();
    let on_click = EventHandler::new(move |event| {
        event.prevent_default();
        router.push(&target);
        if let Some(handler) = &user_click {
            handler.call(event);
        }
    });

    let mut attributes = attrs! { "href" => to };
    for (name, value) in props.attributes().iter() {
        if !matches!(name, "router" | "to" | "onClick" | "href") {
            attributes.insert(name, value.clone());
        }
    }
    attributes.insert("onClick", on_click);
    Ok(element(
        "a",
        attributes,
        props.children().iter().cloned().map(Child::from),
    ))
}

#[cfg(test)]
#[path = "tests/components_tests.rs"]
mod tests;
