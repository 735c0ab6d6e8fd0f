use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn insert_before_moves_existing_child() {
    let (mut surface, root) = MemorySurface::with_container("div");
    let a = surface.create_text("a");
    let b = surface.create_text("b");
    let c = surface.create_text("c");
    for id in [a, b, c] {
        surface.append_child(root, id).unwrap();
    }

    surface.insert_before(root, c, Some(a)).unwrap();
    assert_eq!(surface.child_ids(root), &[c, a, b]);
    assert_eq!(surface.parent(c), Some(root));

    surface.append_child(root, c).unwrap();
    assert_eq!(surface.child_ids(root), &[a, b, c]);
}

#[test]
fn insert_before_unknown_sibling_fails() {
    let (mut surface, root) = MemorySurface::with_container("div");
    let stray = surface.create_text("x");
    let child = surface.create_text("y");

    let err = surface.insert_before(root, child, Some(stray)).unwrap_err();
    assert_eq!(err, SurfaceError::NotAChild { parent: root, child: stray });
}

#[test]
fn remove_child_releases_subtree() {
    let (mut surface, root) = MemorySurface::with_container("div");
    let list = surface.create_element("ul");
    let item = surface.create_element("li");
    let label = surface.create_text("one");
    surface.append_child(item, label).unwrap();
    surface.append_child(list, item).unwrap();
    surface.append_child(root, list).unwrap();
    assert_eq!(surface.len(), 4);

    surface.remove_child(root, list).unwrap();
    assert_eq!(surface.len(), 1);
    assert!(!surface.contains(label));
    assert_eq!(
        surface.remove_child(root, list),
        Err(SurfaceError::Missing { id: list })
    );
}

#[test]
fn text_operations_reject_elements() {
    let (mut surface, root) = MemorySurface::with_container("div");
    assert_eq!(
        surface.set_text(root, "x"),
        Err(SurfaceError::NotAText { id: root })
    );
    let text = surface.create_text("t");
    assert_eq!(
        surface.append_child(text, root),
        Err(SurfaceError::NotAnElement { id: text })
    );
}

#[test]
fn markup_matches_serializer_format() {
    let (mut surface, root) = MemorySurface::with_container("div");
    surface.set_class_name(root, "x").unwrap();
    let image = surface.create_element("img");
    surface.set_attribute(image, "src", "a.png").unwrap();
    let span = surface.create_element("span");
    let text = surface.create_text("hi");
    surface.append_child(span, text).unwrap();
    surface.append_child(root, span).unwrap();
    surface.append_child(root, image).unwrap();

    assert_eq!(
        surface.markup(root),
        r#"<div class="x"><span>hi</span><img src="a.png" /></div>"#
    );
    assert_eq!(surface.inner_markup(root), r#"<span>hi</span><img src="a.png" />"#);
}

#[test]
fn style_properties_render_as_one_attribute() {
    let (mut surface, root) = MemorySurface::with_container("p");
    surface.set_style(root, "color", "red").unwrap();
    surface.set_style(root, "margin-top", "4px").unwrap();
    assert_eq!(
        surface.attribute(root, "style"),
        Some("color: red; margin-top: 4px")
    );

    surface.remove_style(root, "color").unwrap();
    assert_eq!(surface.style(root, "color"), None);
    surface.remove_style(root, "margin-top").unwrap();
    assert_eq!(surface.markup(root), "<p></p>");
}

#[test]
fn events_bubble_until_stopped() {
    let (mut surface, root) = MemorySurface::with_container("div");
    let section = surface.create_element("section");
    let button = surface.create_element("button");
    surface.append_child(section, button).unwrap();
    surface.append_child(root, section).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    for (id, name, stop) in [(button, "button", false), (section, "section", true), (root, "root", false)] {
        let log = Rc::clone(&log);
        surface
            .add_event_listener(
                id,
                "click",
                EventHandler::new(move |event: &Event| {
                    log.borrow_mut().push((name, event.current_target()));
                    if stop {
                        event.stop_propagation();
                    }
                }),
            )
            .unwrap();
    }

    assert!(surface.click(button));
    assert_eq!(
        *log.borrow(),
        vec![("button", Some(button)), ("section", Some(section))]
    );
}

#[test]
fn prevent_default_is_reported() {
    let (mut surface, root) = MemorySurface::with_container("a");
    surface
        .add_event_listener(root, "click", EventHandler::new(|event: &Event| event.prevent_default()))
        .unwrap();
    assert!(!surface.click(root));

    surface.remove_event_listener(root, "click").unwrap();
    assert!(!surface.has_listener(root, "click"));
    assert!(surface.click(root));
}

#[test]
fn lookups_walk_the_tree() {
    let (mut surface, root) = MemorySurface::with_container("div");
    let list = surface.create_element("ul");
    let item = surface.create_element("li");
    surface.set_attribute(item, "id", "first").unwrap();
    let label = surface.create_text("one");
    surface.append_child(item, label).unwrap();
    surface.append_child(list, item).unwrap();
    surface.append_child(root, list).unwrap();

    assert_eq!(surface.find_by_tag(root, "li"), Some(item));
    assert_eq!(surface.find_by_attribute(root, "id", "first"), Some(item));
    assert_eq!(surface.find_by_tag(root, "table"), None);
    assert_eq!(surface.text_content(root), "one");
    assert!(surface.dump_tree(root).contains("<li>"));
}
