mod expression;
mod ty;

pub use expression::expression;
pub use ty::type_expression;

use crate::ast::Syntax;
use crate::types::Type;

use super::{ParseError, ParseState, Parser};

/// Parse a complete expression, consuming the whole token stream.
pub fn parse(state: &mut ParseState) -> Result<Syntax, ParseError> {
    match expression().parse(state) {
        Ok(syntax) => {
            if state.has_next() {
                let err = state
                    .error_here("unexpected trailing input")
                    .expected("end of input");
                Err(err)
            } else {
                Ok(syntax)
            }
        }
        Err(err) => Err(state.furthest_error().cloned().unwrap_or(err)),
    }
}

/// Parse a complete type, consuming the whole token stream.
pub fn parse_type(state: &mut ParseState) -> Result<Type, ParseError> {
    match type_expression().parse(state) {
        Ok(ty) => {
            if state.has_next() {
                let err = state
                    .error_here("unexpected trailing input")
                    .expected("end of input");
                Err(err)
            } else {
                Ok(ty)
            }
        }
        Err(err) => Err(state.furthest_error().cloned().unwrap_or(err)),
    }
}
