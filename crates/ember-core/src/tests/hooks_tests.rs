use super::*;
use crate::component::{Component, Props};
use crate::error::RenderError;
use crate::instance::mount_component;
use crate::node::{text, Node};
use crate::runtime::Runtime;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Harness {
    runtime: Runtime,
    component: Component,
    instance: Option<Instance>,
}

impl Harness {
    fn new(component: Component) -> Self {
        Self {
            runtime: Runtime::default(),
            component,
            instance: None,
        }
    }

    fn render(&mut self) -> Node {
        let (output, instance) = mount_component(
            &self.component,
            &Props::default(),
            self.instance.take(),
            &self.runtime.handle(),
        )
        .expect("render");
        self.instance = Some(instance);
        self.runtime.commit_effects();
        self.runtime.drain_tasks();
        output
    }

    fn instance(&self) -> &Instance {
        self.instance.as_ref().expect("rendered")
    }
}

#[test]
fn hooks_outside_render_fail() {
    assert!(matches!(
        use_state(1),
        Err(RenderError::InvalidHookCall { hook: "use_state" })
    ));
    assert!(matches!(
        use_effect(|| ()),
        Err(RenderError::InvalidHookCall { hook: "use_effect" })
    ));
    assert!(matches!(
        use_effect_with((), || ()),
        Err(RenderError::InvalidHookCall { .. })
    ));
}

#[test]
fn state_persists_and_setter_is_stable() {
    let setters: Rc<RefCell<Vec<StateSetter<i32>>>> = Rc::default();
    let sink = Rc::clone(&setters);
    let mut harness = Harness::new(Component::named("counter", move |_: &Props| {
        let (count, set_count) = use_state(0)?;
        sink.borrow_mut().push(set_count);
        Ok(text(count.to_string()))
    }));

    assert_eq!(harness.render().text_value(), Some("0"));
    setters.borrow()[0].set(4);
    assert!(harness.runtime.take_render_request());
    assert_eq!(harness.render().text_value(), Some("4"));

    let setters = setters.borrow();
    assert_eq!(setters[0], setters[1]);
}

#[test]
fn setting_equal_value_skips_render() {
    let setter: Rc<RefCell<Option<StateSetter<String>>>> = Rc::default();
    let sink = Rc::clone(&setter);
    let mut harness = Harness::new(Component::named("label", move |_: &Props| {
        let (label, set_label) = use_state("a".to_owned())?;
        *sink.borrow_mut() = Some(set_label);
        Ok(text(label))
    }));
    harness.render();

    let set_label = setter.borrow().clone().expect("setter");
    set_label.set("a".to_owned());
    assert!(!harness.runtime.needs_render());
    set_label.set("b".to_owned());
    assert!(harness.runtime.needs_render());
}

#[test]
fn update_sees_unrendered_writes() {
    let setter: Rc<RefCell<Option<StateSetter<i32>>>> = Rc::default();
    let sink = Rc::clone(&setter);
    let mut harness = Harness::new(Component::named("counter", move |_: &Props| {
        let (count, set_count) = use_state(0)?;
        *sink.borrow_mut() = Some(set_count);
        Ok(text(count.to_string()))
    }));
    harness.render();

    let set_count = setter.borrow().clone().expect("setter");
    set_count.update(|n| n + 1);
    set_count.update(|n| n + 1);
    assert_eq!(set_count.get(), 2);
    assert_eq!(harness.runtime.render_requests(), 2);
    assert_eq!(harness.render().text_value(), Some("2"));
}

#[test]
fn lazy_initializer_runs_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut harness = Harness::new(Component::named("lazy", move |_: &Props| {
        let counter = Rc::clone(&counter);
        let (value, _) = use_state_with(move || {
            counter.set(counter.get() + 1);
            10
        })?;
        Ok(text(value.to_string()))
    }));

    harness.render();
    harness.render();
    assert_eq!(calls.get(), 1);
}

#[test]
fn effect_without_deps_runs_every_render_with_cleanup_first() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let renders = Rc::new(Cell::new(0));
    let mut harness = Harness::new(Component::named("ticker", move |_: &Props| {
        renders.set(renders.get() + 1);
        let pass = renders.get();
        let sink = Rc::clone(&sink);
        use_effect(move || {
            sink.borrow_mut().push(format!("run {pass}"));
            let sink = Rc::clone(&sink);
            Cleanup::from_fn(move || sink.borrow_mut().push(format!("cleanup {pass}")))
        })?;
        Ok(text(""))
    }));

    harness.render();
    harness.render();
    harness.instance().unmount();

    assert_eq!(
        *log.borrow(),
        vec!["run 1", "cleanup 1", "run 2", "cleanup 2"]
    );
}

#[test]
fn effect_with_empty_deps_runs_once() {
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let mut harness = Harness::new(Component::named("once", move |_: &Props| {
        let counter = Rc::clone(&counter);
        use_effect_with((), move || counter.set(counter.get() + 1))?;
        Ok(text(""))
    }));

    harness.render();
    harness.render();
    harness.render();
    assert_eq!(runs.get(), 1);
}

#[test]
fn effect_reruns_when_deps_change() {
    let dep = Rc::new(Cell::new(1));
    let log = Rc::new(RefCell::new(Vec::new()));
    let (source, sink) = (Rc::clone(&dep), Rc::clone(&log));
    let mut harness = Harness::new(Component::named("watcher", move |_: &Props| {
        let value = source.get();
        let sink = Rc::clone(&sink);
        use_effect_with((value, "fixed"), move || {
            sink.borrow_mut().push(value);
        })?;
        Ok(text(""))
    }));

    harness.render();
    harness.render();
    dep.set(2);
    harness.render();
    harness.render();

    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn effect_is_dropped_if_unmounted_before_commit() {
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let runtime = Runtime::default();
    let component = Component::named("late", move |_: &Props| {
        let flag = Rc::clone(&flag);
        use_effect(move || flag.set(true))?;
        Ok(text(""))
    });

    let (_, instance) =
        mount_component(&component, &Props::default(), None, &runtime.handle()).expect("render");
    instance.unmount();
    runtime.commit_effects();
    runtime.drain_tasks();

    assert!(!ran.get());
}

#[test]
fn setter_is_inert_after_unmount() {
    let setter: Rc<RefCell<Option<StateSetter<i32>>>> = Rc::default();
    let sink = Rc::clone(&setter);
    let mut harness = Harness::new(Component::named("gone", move |_: &Props| {
        let (_, set) = use_state(0)?;
        *sink.borrow_mut() = Some(set);
        Ok(text(""))
    }));
    harness.render();
    harness.instance().unmount();

    let set = setter.borrow().clone().expect("setter");
    set.set(9);
    assert!(!harness.runtime.needs_render());
}

#[test]
fn hook_count_change_is_tolerated() {
    let extra = Rc::new(Cell::new(false));
    let flag = Rc::clone(&extra);
    let mut harness = Harness::new(Component::named("growing", move |_: &Props| {
        let (a, _) = use_state(1)?;
        if flag.get() {
            let (b, _) = use_state(2)?;
            return Ok(text((a + b).to_string()));
        }
        Ok(text(a.to_string()))
    }));

    assert_eq!(harness.render().text_value(), Some("1"));
    extra.set(true);
    assert_eq!(harness.render().text_value(), Some("3"));
    assert_eq!(harness.instance().hook_count(), 2);
}

#[test]
fn discarded_pass_keeps_previous_deps() {
    let dep = Rc::new(Cell::new(1));
    let log = Rc::new(RefCell::new(Vec::new()));
    let (source, sink) = (Rc::clone(&dep), Rc::clone(&log));
    let component = Component::named("watcher", move |_: &Props| {
        let value = source.get();
        let sink = Rc::clone(&sink);
        use_effect_with(value, move || sink.borrow_mut().push(value))?;
        Ok(text(""))
    });
    let runtime = Runtime::default();

    let (_, instance) =
        mount_component(&component, &Props::default(), None, &runtime.handle()).expect("render");
    runtime.commit_effects();
    runtime.drain_tasks();

    dep.set(2);
    let (_, instance) =
        mount_component(&component, &Props::default(), Some(instance), &runtime.handle())
            .expect("render");
    assert_eq!(runtime.discard_effects(), 1);

    let (_, _instance) =
        mount_component(&component, &Props::default(), Some(instance), &runtime.handle())
            .expect("render");
    runtime.commit_effects();
    runtime.drain_tasks();

    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn each_state_call_keeps_its_own_slot() {
    let setters: Rc<RefCell<Vec<StateSetter<i32>>>> = Rc::default();
    let sink = Rc::clone(&setters);
    let mut harness = Harness::new(Component::named("triple", move |_: &Props| {
        let (a, set_a) = use_state(1)?;
        let (b, set_b) = use_state(2)?;
        let (c, set_c) = use_state(3)?;
        *sink.borrow_mut() = vec![set_a, set_b, set_c];
        Ok(text(format!("{a} {b} {c}")))
    }));
    assert_eq!(harness.render().text_value(), Some("1 2 3"));

    setters.borrow()[2].set(30);
    setters.borrow()[0].set(10);
    assert_eq!(harness.render().text_value(), Some("10 2 30"));

    setters.borrow()[1].set(20);
    assert_eq!(harness.render().text_value(), Some("10 20 30"));

    setters.borrow()[2].update(|c| c + 1);
    setters.borrow()[1].update(|b| b + 1);
    setters.borrow()[0].update(|a| a + 1);
    assert_eq!(harness.render().text_value(), Some("11 21 31"));
    assert_eq!(harness.instance().hook_count(), 3);
}
