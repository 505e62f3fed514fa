//! Engine intrinsics: the call targets the markup rewrite emits
//!
//! `element`, `fragment`, and `text` build the renderable tree;
//! `render` records the cycle's output. They are installed beneath the
//! user scope, so they resolve like any binding but cannot be confused
//! with scope entries: rebinding one in the scope table shadows it.

use indexmap::IndexMap;

use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{type_name, EvalError};
use crate::eval::call::call_value;
use crate::node::{Element, Node};
use crate::value::{Intrinsic, Value};

/// Apply an intrinsic to already-evaluated arguments.
pub(crate) fn apply(
    intrinsic: Intrinsic,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
    span: Option<proc_macro2::Span>,
) -> Result<Value, EvalError> {
    match intrinsic {
        Intrinsic::Render => {
            let [value] = take_args(intrinsic, args, span)?;
            ctx.record_render(value.clone());
            Ok(value)
        }

        Intrinsic::Text => {
            let [value] = take_args(intrinsic, args, span)?;
            match &value {
                Value::String(s) => Ok(Value::node(Node::text(s.as_str()))),
                Value::Int(_) | Value::Float(_) | Value::Char(_) => {
                    Ok(Value::node(Node::text(value.to_string())))
                }
                other => Err(EvalError::TypeError {
                    message: format!("text(..) expects a scalar, found `{}`", type_name(other)),
                    span,
                }),
            }
        }

        Intrinsic::Fragment => {
            let [children] = take_args(intrinsic, args, span)?;
            let children = child_nodes(&children, span)?;
            Ok(Value::node(Node::Fragment(children)))
        }

        Intrinsic::Element => {
            let [component, attrs, children] = take_args(intrinsic, args, span)?;
            let attr_map = attr_map(&attrs, span)?;
            let child_nodes = child_nodes(&children, span)?;

            match component {
                // Lowercase markup tags arrive as strings
                Value::String(tag) => {
                    let mut element = Element::new(tag.as_str());
                    element.attrs = attr_map;
                    element.children = child_nodes;
                    Ok(Value::node(element))
                }

                // A node bound in scope is a template: attrs merge in,
                // children append
                Value::Node(node) => {
                    merge_into_node(&node, attr_map, child_nodes, span).map(Value::node)
                }

                // A callable component is invoked with the raw lists
                callee @ (Value::Closure(_) | Value::Native(_)) => {
                    let result = call_value(callee, vec![attrs, children], env, ctx, span)?;
                    crate::sandbox::coerce_node(&result)
                        .map(Value::node)
                        .map_err(|message| EvalError::TypeError {
                            message: format!("component returned an unrenderable value: {message}"),
                            span,
                        })
                }

                other => Err(EvalError::TypeError {
                    message: format!(
                        "element component must be a tag, node, or function, found `{}`",
                        type_name(&other)
                    ),
                    span,
                }),
            }
        }
    }
}

/// Install the intrinsics into the global frame of an environment.
pub(crate) fn install(env: &mut Environment) {
    for intrinsic in Intrinsic::all() {
        env.define(intrinsic.name(), Value::Intrinsic(intrinsic));
    }
}

fn take_args<const N: usize>(
    intrinsic: Intrinsic,
    args: Vec<Value>,
    span: Option<proc_macro2::Span>,
) -> Result<[Value; N], EvalError> {
    let got = args.len();
    args.try_into().map_err(|_| EvalError::ArityMismatch {
        name: intrinsic.name().to_string(),
        expected: N,
        got,
        span,
    })
}

/// Convert an evaluated attribute list (`[("k", v), ..]`) to a map.
/// Duplicate keys: last one wins, position unchanged.
fn attr_map(
    attrs: &Value,
    span: Option<proc_macro2::Span>,
) -> Result<IndexMap<String, String>, EvalError> {
    let Value::List(pairs) = attrs else {
        return Err(EvalError::TypeError {
            message: format!(
                "element attributes must be a list of pairs, found `{}`",
                type_name(attrs)
            ),
            span,
        });
    };

    let mut map = IndexMap::new();
    for pair in pairs.iter() {
        let Value::Tuple(kv) = pair else {
            return Err(EvalError::TypeError {
                message: format!("attribute entry must be a pair, found `{}`", type_name(pair)),
                span,
            });
        };
        let [key, value] = kv.as_slice() else {
            return Err(EvalError::TypeError {
                message: "attribute entry must be a (name, value) pair".to_string(),
                span,
            });
        };
        let Value::String(name) = key else {
            return Err(EvalError::TypeError {
                message: format!("attribute name must be a string, found `{}`", type_name(key)),
                span,
            });
        };
        map.insert(name.as_str().to_string(), attr_text(value, span)?);
    }
    Ok(map)
}

/// Stringify an attribute value.
fn attr_text(value: &Value, span: Option<proc_macro2::Span>) -> Result<String, EvalError> {
    match value {
        Value::String(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Bool(_)
        | Value::Char(_) => Ok(value.to_string()),
        other => Err(EvalError::TypeError {
            message: format!(
                "attribute value must be a scalar, found `{}`",
                type_name(other)
            ),
            span,
        }),
    }
}

/// Coerce an evaluated child list to nodes.
fn child_nodes(
    children: &Value,
    span: Option<proc_macro2::Span>,
) -> Result<Vec<Node>, EvalError> {
    let Value::List(items) = children else {
        return Err(EvalError::TypeError {
            message: format!("children must be a list, found `{}`", type_name(children)),
            span,
        });
    };

    items
        .iter()
        .map(|item| {
            crate::sandbox::coerce_node(item).map_err(|message| EvalError::TypeError {
                message: format!("child is not renderable: {message}"),
                span,
            })
        })
        .collect()
}

/// Merge attributes and children into a node bound as a component.
fn merge_into_node(
    node: &Node,
    attrs: IndexMap<String, String>,
    children: Vec<Node>,
    span: Option<proc_macro2::Span>,
) -> Result<Node, EvalError> {
    match node {
        Node::Element(element) => {
            let mut merged = element.clone();
            merged.attrs.extend(attrs);
            merged.children.extend(children);
            Ok(Node::Element(merged))
        }
        other if attrs.is_empty() && children.is_empty() => Ok(other.clone()),
        other => Err(EvalError::TypeError {
            message: format!(
                "cannot apply attributes or children to a {} component",
                match other {
                    Node::Text(_) => "text",
                    _ => "fragment",
                }
            ),
            span,
        }),
    }
}
