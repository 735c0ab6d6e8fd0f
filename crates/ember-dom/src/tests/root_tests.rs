use super::*;
use crate::memory::MemorySurface;
use ember_core::{
    attrs, children, component, element, fragment, text, use_effect, use_effect_with, use_state,
    Cleanup, Component, EventHandler, NodeRef, Props, RenderError, RenderResult, Style,
};
use std::cell::{Cell, RefCell};

thread_local! {
    static COUNTER_RENDERS: Cell<usize> = const { Cell::new(0) };
}

fn counter(props: &Props) -> RenderResult<Node> {
    COUNTER_RENDERS.with(|renders| renders.set(renders.get() + 1));
    let start = props.int("start").unwrap_or(0);
    let (count, set_count) = use_state(start)?;
    let increment = EventHandler::new(move |_| set_count.set(count + 1));
    Ok(element(
        "div",
        None,
        children![
            element("span", attrs! { "id" => "count" }, children![count]),
            element("button", attrs! { "onClick" => increment }, children!["+"]),
        ],
    ))
}

fn counter_node() -> Node {
    component(Component::function(counter), None, children![])
}

fn memory_root() -> (Root<MemorySurface>, SurfaceId) {
    let (surface, container) = MemorySurface::with_container("div");
    (Root::new(surface, container), container)
}

fn keyed_list(items: &[&str]) -> Node {
    let rows: Vec<Node> = items
        .iter()
        .map(|item| element("li", attrs! { "key" => *item }, children![*item]))
        .collect();
    element("ul", None, children![rows])
}

fn plain_list(len: usize) -> Node {
    let rows: Vec<Node> = (0..len)
        .map(|index| element("li", None, children![index]))
        .collect();
    element("ul", None, children![rows])
}

#[test]
fn mount_builds_surface_tree() {
    let (mut root, container) = memory_root();
    root.mount(
        element("div", attrs! { "className" => "x" }, children![element("span", None, children!["hi"])]),
        MountOptions::default(),
    )
    .unwrap();

    assert!(root.is_mounted());
    assert_eq!(
        root.surface().inner_markup(container),
        r#"<div class="x"><span>hi</span></div>"#
    );
}

#[test]
fn mount_clears_existing_content() {
    let (mut surface, container) = MemorySurface::with_container("div");
    let stale = surface.create_text("stale");
    surface.append_child(container, stale).unwrap();

    let mut root = Root::new(surface, container);
    root.mount(text("fresh"), MountOptions::default()).unwrap();
    assert_eq!(root.surface().inner_markup(container), "fresh");
    assert!(!root.surface().contains(stale));
}

#[test]
fn fragments_place_children_into_nearest_element() {
    let (mut root, container) = memory_root();
    root.mount(
        element(
            "div",
            None,
            children![fragment(children!["a", element("b", None, children!["c"])]), "d"],
        ),
        MountOptions::default(),
    )
    .unwrap();

    assert_eq!(root.surface().inner_markup(container), "<div>a<b>c</b>d</div>");
}

#[test]
fn click_rerenders_counter_exactly_once() {
    let (mut root, container) = memory_root();
    root.mount(counter_node(), MountOptions::default()).unwrap();
    let renders_after_mount = COUNTER_RENDERS.with(Cell::get);

    let button = root.surface().find_by_tag(container, "button").unwrap();
    let span = root.surface().find_by_attribute(container, "id", "count").unwrap();
    root.surface().click(button);

    assert_eq!(root.flush().unwrap(), 1);
    assert_eq!(COUNTER_RENDERS.with(Cell::get), renders_after_mount + 1);
    assert_eq!(root.surface().text_content(span), "1");
    assert_eq!(
        root.surface().find_by_attribute(container, "id", "count"),
        Some(span)
    );
}

#[test]
fn listeners_are_rebound_with_fresh_closures() {
    let (mut root, container) = memory_root();
    root.mount(counter_node(), MountOptions::default()).unwrap();
    let button = root.surface().find_by_tag(container, "button").unwrap();

    for _ in 0..3 {
        root.surface().click(button);
        root.flush().unwrap();
    }

    let span = root.surface().find_by_attribute(container, "id", "count").unwrap();
    assert_eq!(root.surface().text_content(span), "3");
}

#[test]
fn flush_without_changes_does_nothing() {
    let (mut root, _) = memory_root();
    root.mount(counter_node(), MountOptions::default()).unwrap();
    assert_eq!(root.flush().unwrap(), 0);
}

#[test]
fn attributes_are_patched_in_place() {
    let (mut root, container) = memory_root();
    root.mount(
        element(
            "input",
            attrs! {
                "className" => "a",
                "disabled" => true,
                "style" => Style::new().with("color", "red"),
                "title" => "t",
            },
            children![],
        ),
        MountOptions::default(),
    )
    .unwrap();
    let input = root.surface().find_by_tag(container, "input").unwrap();

    root.update(element(
        "input",
        attrs! {
            "className" => "b",
            "disabled" => false,
            "style" => Style::new().with("marginTop", "1px"),
        },
        children![],
    ))
    .unwrap();

    assert_eq!(root.surface().find_by_tag(container, "input"), Some(input));
    assert_eq!(
        root.surface().inner_markup(container),
        r#"<input class="b" style="margin-top: 1px" />"#
    );
}

#[test]
fn text_is_updated_in_place() {
    let (mut root, container) = memory_root();
    root.mount(element("p", None, children!["a"]), MountOptions::default())
        .unwrap();
    let paragraph = root.surface().find_by_tag(container, "p").unwrap();
    let label = root.surface().child_ids(paragraph)[0];

    root.update(element("p", None, children!["b"])).unwrap();
    assert_eq!(root.surface().child_ids(paragraph), &[label]);
    assert_eq!(root.surface().text(label), Some("b"));
}

#[test]
fn keyed_children_keep_their_surface_nodes_when_reordered() {
    let (mut root, container) = memory_root();
    root.mount(keyed_list(&["a", "b", "c"]), MountOptions::default())
        .unwrap();
    let list = root.surface().find_by_tag(container, "ul").unwrap();
    let before = root.surface().child_ids(list).to_vec();

    root.update(keyed_list(&["c", "a", "b"])).unwrap();
    assert_eq!(
        root.surface().child_ids(list),
        &[before[2], before[0], before[1]]
    );
    assert_eq!(
        root.surface().inner_markup(list),
        "<li>c</li><li>a</li><li>b</li>"
    );

    root.update(keyed_list(&["a", "d"])).unwrap();
    let after = root.surface().child_ids(list).to_vec();
    assert_eq!(after[0], before[0]);
    assert!(!root.surface().contains(before[1]));
    assert!(!root.surface().contains(before[2]));
    assert_eq!(root.surface().inner_markup(list), "<li>a</li><li>d</li>");
}

#[test]
fn unkeyed_children_match_by_position() {
    let (mut root, container) = memory_root();
    root.mount(plain_list(2), MountOptions::default()).unwrap();
    let list = root.surface().find_by_tag(container, "ul").unwrap();
    let before = root.surface().child_ids(list).to_vec();

    root.update(plain_list(3)).unwrap();
    let grown = root.surface().child_ids(list).to_vec();
    assert_eq!(&grown[..2], &before[..]);
    assert_eq!(grown.len(), 3);

    root.update(plain_list(1)).unwrap();
    assert_eq!(root.surface().child_ids(list), &[before[0]]);
    assert_eq!(root.surface().inner_markup(list), "<li>0</li>");
}

#[test]
fn kind_change_replaces_and_unmounts() {
    let cleanups = Rc::new(Cell::new(0));
    let counter = Rc::clone(&cleanups);
    let tracked = Component::named("tracked", move |_: &Props| {
        let counter = Rc::clone(&counter);
        use_effect_with((), move || {
            Cleanup::from_fn(move || counter.set(counter.get() + 1))
        })?;
        Ok(element("p", None, children!["tracked"]))
    });

    let (mut root, container) = memory_root();
    root.mount(
        element("div", None, children![component(tracked, None, children![])]),
        MountOptions::default(),
    )
    .unwrap();
    root.flush().unwrap();

    root.update(element("div", None, children![element("span", None, children![])]))
        .unwrap();
    assert_eq!(cleanups.get(), 1);
    assert_eq!(root.surface().inner_markup(container), "<div><span></span></div>");
}

#[test]
fn effects_run_after_commit_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let node_ref = NodeRef::new();

    let child = |name: &'static str, log: Rc<RefCell<Vec<String>>>| {
        Component::named(name, move |_: &Props| {
            let log = Rc::clone(&log);
            use_effect(move || log.borrow_mut().push(name.to_owned()))?;
            Ok(text(name))
        })
    };
    let first = child("first", Rc::clone(&log));
    let second = child("second", Rc::clone(&log));
    let parent_log = Rc::clone(&log);
    let parent_ref = node_ref.clone();
    let parent = Component::named("parent", move |_: &Props| {
        let log = Rc::clone(&parent_log);
        let probe = parent_ref.clone();
        use_effect(move || {
            log.borrow_mut()
                .push(format!("parent attached: {}", probe.get().is_some()));
        })?;
        Ok(element(
            "section",
            attrs! { "ref" => parent_ref.clone() },
            children![
                component(first.clone(), None, children![]),
                component(second.clone(), None, children![]),
            ],
        ))
    });

    let (mut root, _) = memory_root();
    root.mount(component(parent, None, children![]), MountOptions::default())
        .unwrap();
    assert!(log.borrow().is_empty());

    root.flush().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["parent attached: true", "first", "second"]
    );
}

#[test]
fn runaway_updates_hit_the_pass_limit() {
    let looping = Component::named("looping", |_: &Props| {
        let (count, set_count) = use_state(0)?;
        use_effect(move || set_count.update(|n| n + 1))?;
        Ok(text(count.to_string()))
    });
    let config = RenderConfig {
        max_flush_passes: 3,
        ..RenderConfig::default()
    };
    let (surface, container) = MemorySurface::with_container("div");
    let mut root = Root::with_config(surface, container, config);
    root.mount(component(looping, None, children![]), MountOptions::default())
        .unwrap();

    let err = root.flush().unwrap_err();
    assert!(matches!(err, DomError::UpdateDepthExceeded { passes: 3 }));
}

#[test]
fn unmount_runs_cleanups_and_clears_container() {
    let cleanups = Rc::new(Cell::new(0));
    let counter = Rc::clone(&cleanups);
    let tracked = Component::named("tracked", move |_: &Props| {
        let counter = Rc::clone(&counter);
        use_effect_with((), move || Cleanup::from_fn(move || counter.set(counter.get() + 1)))?;
        Ok(text("x"))
    });

    let (mut root, container) = memory_root();
    root.mount(component(tracked, None, children![]), MountOptions::default())
        .unwrap();
    root.flush().unwrap();
    root.unmount().unwrap();

    assert_eq!(cleanups.get(), 1);
    assert!(!root.is_mounted());
    assert!(root.surface().child_ids(container).is_empty());
    assert!(matches!(root.force_update(), Err(DomError::NotMounted)));
}

#[test]
fn update_before_mount_fails() {
    let (mut root, _) = memory_root();
    assert!(matches!(root.update(text("x")), Err(DomError::NotMounted)));
}

#[test]
fn repaint_rebuilds_surface_but_keeps_state() {
    let config = RenderConfig::default().with_update_strategy(UpdateStrategy::Repaint);
    let (surface, container) = MemorySurface::with_container("div");
    let mut root = Root::with_config(surface, container, config);
    root.mount(counter_node(), MountOptions::default()).unwrap();

    let span = root.surface().find_by_attribute(container, "id", "count").unwrap();
    let button = root.surface().find_by_tag(container, "button").unwrap();
    root.surface().click(button);
    root.flush().unwrap();

    let repainted = root.surface().find_by_attribute(container, "id", "count").unwrap();
    assert_ne!(repainted, span);
    assert!(!root.surface().contains(span));
    assert_eq!(root.surface().text_content(repainted), "1");

    let button = root.surface().find_by_tag(container, "button").unwrap();
    root.surface().click(button);
    root.flush().unwrap();
    let repainted = root.surface().find_by_attribute(container, "id", "count").unwrap();
    assert_eq!(root.surface().text_content(repainted), "2");
}

#[test]
fn hydrate_adopts_existing_nodes() {
    let (mut server, container) = memory_root();
    server.mount(counter_node(), MountOptions::default()).unwrap();
    let button = server.surface().find_by_tag(container, "button").unwrap();
    let nodes = server.surface().len();

    let mut client = Root::new(server.into_surface(), container);
    client.mount(counter_node(), MountOptions::hydrate()).unwrap();

    assert_eq!(client.surface().len(), nodes);
    assert_eq!(client.surface().find_by_tag(container, "button"), Some(button));
    client.surface().click(button);
    assert_eq!(client.flush().unwrap(), 1);
    let span = client.surface().find_by_attribute(container, "id", "count").unwrap();
    assert_eq!(client.surface().text_content(span), "1");
}

#[test]
fn hydrate_removes_surplus_nodes() {
    let (mut surface, container) = MemorySurface::with_container("div");
    let paragraph = surface.create_element("p");
    let label = surface.create_text("a");
    let extra = surface.create_text("extra");
    surface.append_child(paragraph, label).unwrap();
    surface.append_child(container, paragraph).unwrap();
    surface.append_child(container, extra).unwrap();

    let mut root = Root::new(surface, container);
    root.mount(element("p", None, children!["a"]), MountOptions::hydrate())
        .unwrap();
    assert_eq!(root.surface().find_by_tag(container, "p"), Some(paragraph));
    assert_eq!(root.surface().inner_markup(container), "<p>a</p>");
}

#[test]
fn hydrate_mismatch_falls_back_to_fresh_mount() {
    let (mut surface, container) = MemorySurface::with_container("div");
    let paragraph = surface.create_element("p");
    surface.append_child(container, paragraph).unwrap();

    let mut root = Root::new(surface, container);
    root.mount(counter_node(), MountOptions::hydrate()).unwrap();

    assert!(!root.surface().contains(paragraph));
    assert_eq!(
        root.surface().inner_markup(container),
        r#"<div><span id="count">0</span><button>+</button></div>"#
    );
    let button = root.surface().find_by_tag(container, "button").unwrap();
    root.surface().click(button);
    assert_eq!(root.flush().unwrap(), 1);
}

#[test]
fn unsupported_tag_aborts_mount() {
    let (mut root, _) = memory_root();
    let err = root
        .mount(element("not a tag", None, children![]), MountOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        DomError::Render(RenderError::UnsupportedNodeKind(_))
    ));
    assert!(!root.is_mounted());
}

#[test]
fn component_errors_propagate_unchanged() {
    let broken = Component::named("broken", |_: &Props| Err(RenderError::custom("kaboom")));
    let (mut root, _) = memory_root();
    let err = root
        .mount(component(broken, None, children![]), MountOptions::default())
        .unwrap_err();
    assert!(matches!(err, DomError::Render(RenderError::Custom(_))));
    assert_eq!(err.to_string(), "kaboom");
}

#[test]
fn scheduler_is_told_about_pending_renders() {
    #[derive(Default)]
    struct Frames(Cell<usize>);
    impl RuntimeScheduler for Frames {
        fn schedule_frame(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let frames = Rc::new(Frames::default());
    let (surface, container) = MemorySurface::with_container("div");
    let mut root = Root::with_scheduler(surface, container, RenderConfig::default(), frames.clone());
    root.mount(counter_node(), MountOptions::default()).unwrap();
    let before = frames.0.get();

    let button = root.surface().find_by_tag(container, "button").unwrap();
    root.surface().click(button);
    assert_eq!(frames.0.get(), before + 1);
}

#[test]
fn deps_effects_run_once_across_passes_before_flush() {
    let once = Rc::new(Cell::new(0));
    let constant = Rc::new(Cell::new(0));
    let (once_sink, constant_sink) = (Rc::clone(&once), Rc::clone(&constant));
    let settled = Component::named("settled", move |_: &Props| {
        let once_sink = Rc::clone(&once_sink);
        use_effect_with((), move || once_sink.set(once_sink.get() + 1))?;
        let constant_sink = Rc::clone(&constant_sink);
        use_effect_with(7i32, move || constant_sink.set(constant_sink.get() + 1))?;
        Ok(text("settled"))
    });
    let node = || component(settled.clone(), None, children![]);

    let (mut root, _) = memory_root();
    root.mount(node(), MountOptions::default()).unwrap();
    root.force_update().unwrap();
    root.update(node()).unwrap();
    root.flush().unwrap();

    assert_eq!(once.get(), 1);
    assert_eq!(constant.get(), 1);

    root.force_update().unwrap();
    root.flush().unwrap();
    assert_eq!(once.get(), 1);
    assert_eq!(constant.get(), 1);
}

#[test]
fn hydrate_splits_merged_text_run() {
    let (mut surface, container) = MemorySurface::with_container("div");
    let paragraph = surface.create_element("p");
    let run = surface.create_text("count: 3");
    surface.append_child(paragraph, run).unwrap();
    surface.append_child(container, paragraph).unwrap();

    let mut root = Root::new(surface, container);
    root.mount(
        element("p", None, children!["count: ", 3, ""]),
        MountOptions::hydrate(),
    )
    .unwrap();

    assert_eq!(root.surface().find_by_tag(container, "p"), Some(paragraph));
    let parts = root.surface().children(paragraph).unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], run);
    assert_eq!(root.surface().text_value(parts[0]).unwrap().as_deref(), Some("count: "));
    assert_eq!(root.surface().text_value(parts[1]).unwrap().as_deref(), Some("3"));
    assert_eq!(root.surface().inner_markup(container), "<p>count: 3</p>");

    root.update(element("p", None, children!["count: ", 4, ""]))
        .unwrap();
    assert_eq!(root.surface().children(paragraph).unwrap()[0], run);
    assert_eq!(root.surface().inner_markup(container), "<p>count: 4</p>");
}

#[test]
fn ref_moves_to_replacement_child() {
    let node_ref = NodeRef::new();
    let row = |key: &str| {
        element(
            "li",
            attrs! { "key" => key, "ref" => node_ref.clone() },
            children![key],
        )
    };

    let (mut root, container) = memory_root();
    root.mount(element("ul", None, children![row("a")]), MountOptions::default())
        .unwrap();
    let first = node_ref.get().unwrap();

    root.update(element("ul", None, children![row("b")])).unwrap();
    let second = root.surface().find_by_tag(container, "li").unwrap();
    assert_ne!(first, second);
    assert_eq!(node_ref.get(), Some(second));
    assert!(!root.surface().contains(first));

    root.update(element("ul", None, children![])).unwrap();
    assert_eq!(node_ref.get(), None);
}
