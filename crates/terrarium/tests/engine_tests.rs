use terrarium::*;

// Helper: a scope with a node component, a value, and a native function
fn scope() -> ScopeTable {
    ScopeTable::builder()
        .bind("Box", Element::new("div").attr("id", "b"))
        .bind("Badge", Element::new("span").attr("class", "badge"))
        .bind("title", "Terrarium")
        .bind("count", 3i64)
        .bind_fn("repeat", 2, |args| match (&args[0], &args[1]) {
            (Value::String(s), Value::Int(n)) => Ok(Value::string(s.repeat(*n as usize))),
            _ => Err("repeat(text, times) expects a string and an int".to_string()),
        })
        .build()
}

fn run(src: &str) -> Evaluation {
    Sandbox::new(scope()).evaluate(&transform(src).expect("transform failed"))
}

fn html(evaluation: Evaluation) -> String {
    match evaluation {
        Evaluation::Success(node) => node.to_html(),
        Evaluation::Failure(fault) => panic!("expected success, got {fault}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Transform → evaluate round trips
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_valid_source_yields_success() {
    assert_eq!(html(run("render(<Box/>)")), r#"<div id="b"/>"#);
}

#[test]
fn test_scope_value_interpolates() {
    assert_eq!(
        html(run("render(<h1>{title}</h1>)")),
        "<h1>Terrarium</h1>"
    );
}

#[test]
fn test_native_function_composes_with_markup() {
    assert_eq!(
        html(run(r#"render(<p>{repeat("ha", count)}</p>)"#)),
        "<p>hahaha</p>"
    );
}

#[test]
fn test_computed_children() {
    let src = "
        let mut items = [];
        for i in 0..3 {
            items = [items, [<li>{text(i)}</li>]];
        }
        render(<ul>{items}</ul>)
    ";
    assert_eq!(
        html(run(src)),
        "<ul><li>0</li><li>1</li><li>2</li></ul>"
    );
}

#[test]
fn test_closure_component() {
    let src = r#"
        let Card = |attrs, children| element("section", attrs, children);
        render(<Card id="c">inner</Card>)
    "#;
    assert_eq!(html(run(src)), r#"<section id="c">inner</section>"#);
}

#[test]
fn test_conditional_markup() {
    let src = r#"
        let busy = false;
        render(if busy { <p>wait</p> } else { <p>ready</p> })
    "#;
    assert_eq!(html(run(src)), "<p>ready</p>");
}

#[test]
fn test_fragment_root() {
    assert_eq!(
        html(run("render(<><Box/><Badge/></>)")),
        r#"<div id="b"/><span class="badge"/>"#
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Transform failures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_render_fails_before_evaluation() {
    // The scope's native would fault if called; it never is.
    let err = transform("let x = repeat(1, 2);").unwrap_err();
    assert_eq!(err, TransformError::NoOutputExpression);
}

#[test]
fn test_malformed_markup_is_transform_fault() {
    match run("render(<Box") {
        Evaluation::Failure(Fault::Transform(TransformError::Markup { .. })) => {}
        other => panic!("expected markup fault, got {other:?}"),
    }
}

#[test]
fn test_malformed_code_is_transform_fault() {
    match run("render(1 +") {
        Evaluation::Failure(Fault::Transform(TransformError::Parse { .. })) => {}
        other => panic!("expected parse fault, got {other:?}"),
    }
}

#[test]
fn test_transform_fault_display_carries_class() {
    match run("let x = 1;") {
        Evaluation::Failure(fault) => {
            assert!(fault.to_string().starts_with("TransformError: "));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Evaluation failures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_unbound_identifier_names_the_culprit() {
    match run("render(<Unknown/>)") {
        Evaluation::Failure(fault) => {
            assert_eq!(fault.to_string(), "UnboundIdentifier: Unknown");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_unbound_plain_identifier_too() {
    match run("render(text(missing + 1))") {
        Evaluation::Failure(Fault::UnboundIdentifier { name }) => {
            assert_eq!(name, "missing");
        }
        other => panic!("expected unbound identifier, got {other:?}"),
    }
}

#[test]
fn test_native_error_is_runtime_fault() {
    match run("render(text(repeat(1, 2)))") {
        Evaluation::Failure(Fault::Runtime { message }) => {
            assert!(message.contains("repeat"));
        }
        other => panic!("expected runtime fault, got {other:?}"),
    }
}

#[test]
fn test_unrenderable_result() {
    match run("render((1, 2))") {
        Evaluation::Failure(Fault::NotRenderable { message }) => {
            assert!(message.contains("tuple"));
        }
        other => panic!("expected not-renderable, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Containment
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_every_fault_class_is_contained() {
    // None of these may panic or escape the evaluator.
    let sources = [
        "render(<Box",          // markup
        "render(1 +",           // parse
        "let x = 1;",           // no output
        "render(<Unknown/>)",   // unbound
        "render(1 / 0)",        // runtime
        "render(|x| x)",        // not renderable
        "render([9][10])",      // bounds
        "render(text(9999999999999999999 + 1))", // literal overflow
    ];
    for src in sources {
        match transform(src) {
            Err(_) => {}
            Ok(program) => {
                let evaluation = Sandbox::new(scope()).evaluate(&program);
                assert!(
                    matches!(evaluation, Evaluation::Failure(_)),
                    "expected failure for {src:?}"
                );
            }
        }
    }
}

#[test]
fn test_host_panic_cannot_cross_the_boundary() {
    let scope = ScopeTable::builder()
        .bind_fn("boom", 0, |_| panic!("kaboom"))
        .build();
    let program = transform("render(boom())").expect("transform");
    match Sandbox::new(scope).evaluate(&program) {
        Evaluation::Failure(Fault::Runtime { message }) => {
            assert!(message.contains("kaboom"));
        }
        other => panic!("expected contained panic, got {other:?}"),
    }
}
