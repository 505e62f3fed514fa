//! Source-to-program transformation
//!
//! Three stages, none of which execute user code: the markup rewrite
//! (see [`crate::markup`]), a parse of the rewritten text, and a check
//! that the program actually produces output by calling `render(..)`.

use syn::visit::Visit;

use crate::error::{Position, TransformError};
use crate::markup;

/// An executable program: the parsed statements of one snippet.
#[derive(Debug, Clone)]
pub struct Program {
    /// The program body, in statement order
    pub(crate) stmts: Vec<syn::Stmt>,

    /// The rewritten source the statements were parsed from
    rewritten: String,
}

impl Program {
    /// The markup-free source this program was parsed from.
    pub fn rewritten_source(&self) -> &str {
        &self.rewritten
    }
}

/// Transform snippet source into an executable program.
///
/// # Errors
///
/// - [`TransformError::Markup`] when embedded markup is malformed
/// - [`TransformError::Parse`] when the rewritten source does not parse
/// - [`TransformError::NoOutputExpression`] when the program never calls
///   `render(..)`
pub fn transform(source: &str) -> Result<Program, TransformError> {
    let rewritten = markup::rewrite(source)?;

    // Wrapped on its own lines so a trailing line comment in the source
    // cannot swallow the closing brace.
    let block: syn::Block =
        syn::parse_str(&format!("{{\n{rewritten}\n}}")).map_err(|err| TransformError::Parse {
            message: err.to_string(),
            position: parse_error_position(&err),
        })?;

    let mut stmts = block.stmts;
    if !calls_render(&stmts) {
        return Err(TransformError::NoOutputExpression);
    }

    // A trailing `render(..);` becomes the tail expression, so the
    // program's value is the value it renders.
    if let Some(syn::Stmt::Expr(expr, semi @ Some(_))) = stmts.last_mut() {
        if is_render_call(expr) {
            *semi = None;
        }
    }

    Ok(Program { stmts, rewritten })
}

/// Best-effort position for a parse error, in the rewritten text.
///
/// The wrapping brace adds one leading line; compensate so positions
/// line up with [`Program::rewritten_source`].
fn parse_error_position(err: &syn::Error) -> Option<Position> {
    let start = err.span().start();
    if start.line <= 1 {
        return None;
    }
    Some(Position::new(start.line - 1, start.column + 1))
}

fn calls_render(stmts: &[syn::Stmt]) -> bool {
    let mut finder = RenderCallFinder { found: false };
    for stmt in stmts {
        finder.visit_stmt(stmt);
        if finder.found {
            return true;
        }
    }
    false
}

fn is_render_call(expr: &syn::Expr) -> bool {
    if let syn::Expr::Call(call) = expr {
        if let syn::Expr::Path(path) = call.func.as_ref() {
            return path.path.is_ident("render");
        }
    }
    false
}

struct RenderCallFinder {
    found: bool,
}

impl<'ast> Visit<'ast> for RenderCallFinder {
    fn visit_expr_call(&mut self, call: &'ast syn::ExprCall) {
        if let syn::Expr::Path(path) = call.func.as_ref() {
            if path.path.is_ident("render") {
                self.found = true;
                return;
            }
        }
        syn::visit::visit_expr_call(self, call);
    }
}
