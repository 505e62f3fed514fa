use std::cell::RefCell;
use std::rc::Rc;

use terrarium::*;

fn scope() -> ScopeTable {
    ScopeTable::builder()
        .bind("Box", Element::new("div").attr("id", "b"))
        .build()
}

/// A surface that records every mount and error update.
#[derive(Default)]
struct Recorder {
    mounts: Rc<RefCell<Vec<String>>>,
    errors: Rc<RefCell<Vec<Option<String>>>>,
}

impl Surface for Recorder {
    fn mount(&mut self, html: &str) {
        self.mounts.borrow_mut().push(html.to_string());
    }

    fn error(&mut self, message: Option<&str>) {
        self.errors.borrow_mut().push(message.map(String::from));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// The documented end-to-end scenario
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_edit_from_good_to_broken_keeps_output() {
    let mut playground = Playground::new(PlaygroundConfig::new("render(<Box/>)", scope()));

    // Initial source renders the scope-bound element.
    assert_eq!(playground.render_state().html(), Some(r#"<div id="b"/>"#));
    assert_eq!(playground.render_state().error(), None);

    // Editing to reference an unbound component surfaces the error and
    // leaves the previous output in place.
    let state = playground.submit("render(<Unknown/>)");
    assert_eq!(state.error(), Some("UnboundIdentifier: Unknown"));
    assert_eq!(state.html(), Some(r#"<div id="b"/>"#));

    // A good edit clears the error again.
    let state = playground.submit("render(<Box/>)");
    assert_eq!(state.error(), None);
    assert_eq!(state.html(), Some(r#"<div id="b"/>"#));
}

// ═══════════════════════════════════════════════════════════════════════
// Generation / race behavior
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_overlapping_cycles_present_only_the_newest() {
    let mut playground = Playground::new(PlaygroundConfig::new("render(text(0))", scope()));

    let cycle_a = playground.begin("render(text(1))");
    let cycle_b = playground.begin("render(text(2))");

    // A resolves after B: it must never be presented.
    let outcome_b = cycle_b.run();
    let outcome_a = cycle_a.run();
    assert_eq!(playground.present(outcome_b), Presentation::Presented);
    assert_eq!(playground.present(outcome_a), Presentation::Discarded);
    assert_eq!(playground.render_state().html(), Some("2"));
}

#[test]
fn test_stale_failure_cannot_overwrite_newer_success() {
    let mut playground = Playground::new(PlaygroundConfig::new("render(text(0))", scope()));

    let stale = playground.begin("render(<Unknown/>)");
    let stale_outcome = stale.run();

    let fresh = playground.begin("render(text(1))");
    assert_eq!(playground.present(fresh.run()), Presentation::Presented);
    assert_eq!(playground.present(stale_outcome), Presentation::Discarded);

    assert_eq!(playground.render_state().error(), None);
    assert_eq!(playground.render_state().html(), Some("1"));
}

#[test]
fn test_generation_is_monotonic_across_submits() {
    let mut playground = Playground::new(PlaygroundConfig::new("render(text(0))", scope()));
    assert_eq!(playground.generation(), 1);
    playground.submit("render(text(1))");
    playground.submit("render(text(2))");
    assert_eq!(playground.generation(), 3);
}

// ═══════════════════════════════════════════════════════════════════════
// Idempotence and surface traffic
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_identical_success_does_not_remount() {
    let recorder = Recorder::default();
    let mounts = recorder.mounts.clone();

    let mut playground = Playground::with_surface(
        PlaygroundConfig::new("render(<Box/>)", scope()),
        Box::new(recorder),
    );

    let before = playground.render_state().clone();
    playground.submit("render(<Box/>)");

    assert_eq!(playground.render_state(), &before);
    assert_eq!(mounts.borrow().len(), 1);
}

#[test]
fn test_surface_sees_mounts_and_error_transitions() {
    let recorder = Recorder::default();
    let mounts = recorder.mounts.clone();
    let errors = recorder.errors.clone();

    let mut playground = Playground::with_surface(
        PlaygroundConfig::new("render(<Box/>)", scope()),
        Box::new(recorder),
    );
    playground.submit("render(<Unknown/>)");
    playground.submit("render(<span>ok</span>)");

    assert_eq!(
        mounts.borrow().as_slice(),
        &[r#"<div id="b"/>"#.to_string(), "<span>ok</span>".to_string()]
    );
    assert_eq!(
        errors.borrow().as_slice(),
        &[Some("UnboundIdentifier: Unknown".to_string()), None]
    );
}

#[test]
fn test_mount_output_false_still_tracks_state() {
    let recorder = Recorder::default();
    let mounts = recorder.mounts.clone();

    let mut playground = Playground::with_surface(
        PlaygroundConfig::new("render(<Box/>)", scope()).mount_output(false),
        Box::new(recorder),
    );
    playground.submit("render(<span>hidden</span>)");

    assert!(mounts.borrow().is_empty());
    assert_eq!(playground.render_state().html(), Some("<span>hidden</span>"));
}

// ═══════════════════════════════════════════════════════════════════════
// Instance independence
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_instances_do_not_share_state() {
    let mut one = Playground::new(PlaygroundConfig::new("render(text(1))", scope()));
    let mut two = Playground::new(PlaygroundConfig::new("render(text(2))", scope()));

    one.submit("render(<Unknown/>)");
    two.submit("render(text(22))");

    assert!(one.render_state().error().is_some());
    assert_eq!(two.render_state().error(), None);
    assert_eq!(two.render_state().html(), Some("22"));
}

#[test]
fn test_configured_limits_apply() {
    let config = PlaygroundConfig::new(
        "
        let f1 = |x| x;
        let f2 = |x| f1(x);
        let f3 = |x| f2(x);
        render(text(f3(1)))
        ",
        scope(),
    )
    .limits(Limits { max_call_depth: 2 });

    let playground = Playground::new(config);
    let error = playground.render_state().error().expect("expected an error");
    assert!(error.contains("call depth limit"));
}
