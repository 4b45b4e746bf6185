//! Parser disambiguation predicates
//!
//! Pure functions over lookahead and the rule-context chain. They never
//! consume input; the parser calls them at decision points where the grammar
//! alone cannot tell two alternatives apart.

use super::context::{RuleContext, RuleKind};
use super::error::{SyntaxError, SyntaxResult};
use crate::config::constants::compile_time::syntax::MAX_STATEMENT_SCAN_TOKENS;
use crate::tokens::{Token, TokenLookahead, TokenType};

/// Whether the statement starting at `LA(1)` is a bare function call
/// (`MsgBox "hi"`, `Foo()`, `this.Bar`) rather than an expression.
///
/// A name directly followed by a comma (`Foo, 1`) is always an error: a
/// comma never separates a function name from its first argument.
pub fn is_function_statement<L: TokenLookahead + ?Sized>(input: &L) -> SyntaxResult<bool> {
    let mut depth: usize = 0;
    let mut i: isize = 1;

    while (i as usize) <= MAX_STATEMENT_SCAN_TOKENS {
        let Some(token) = input.lt(i) else {
            return Ok(true);
        };
        let token_type = token.token_type;

        if depth > 0 {
            match token_type {
                t if t.is_open_group() => depth += 1,
                t if t.is_close_group() => depth -= 1,
                TokenType::Eof => return Ok(false),
                _ => {}
            }
            i += 1;
            continue;
        }

        match token_type {
            TokenType::OpenBrace => return Ok(false),
            t if t.is_open_group() => {
                if i == 1 {
                    return Ok(false);
                }
                depth += 1;
            }
            TokenType::Identifier | TokenType::This | TokenType::Dot => {}
            t if t.is_contextual_keyword() => {}
            TokenType::Eol | TokenType::Eof => return Ok(true),
            TokenType::Ws => return Ok(statement_continues_as_call(input, i)),
            TokenType::Comma if i == 2 => return Err(SyntaxError::function_call_comma(token)),
            _ => return Ok(false),
        }
        i += 1;
    }

    Ok(false)
}

/// Decide at the whitespace token `LA(ws_at)` whether what follows is the
/// first argument of a call or the rest of an expression
fn statement_continues_as_call<L: TokenLookahead + ?Sized>(input: &L, ws_at: isize) -> bool {
    if input.lt(ws_at).is_some_and(Token::contains_line_break) {
        return true;
    }

    let mut next_at = ws_at + 1;
    while input.la(next_at) == TokenType::Ws {
        next_at += 1;
    }
    let Some(next) = input.lt(next_at) else {
        return true;
    };

    if next.token_type.is_assignment_operator() {
        return false;
    }

    if next.token_type.is_binary_operator() {
        // `Foo -1` passes -1; `Foo - 1` subtracts
        return match input.lt(next_at + 1) {
            Some(after)
                if !matches!(
                    after.token_type,
                    TokenType::Ws | TokenType::Eol | TokenType::Eof
                ) =>
            {
                after.start_index == next.stop_index + 1
            }
            _ => false,
        };
    }

    true
}

/// `Default:` is a label everywhere except directly inside a case clause,
/// where it opens the default branch
pub fn is_valid_label<L: TokenLookahead + ?Sized>(input: &L, ctx: &RuleContext<'_>) -> bool {
    if input.la(1) != TokenType::Default {
        return true;
    }

    match ctx.nearest(&[RuleKind::CaseClause, RuleKind::Block]) {
        Some(RuleKind::CaseClause) => false,
        _ => true,
    }
}

/// True when `Loop` is a counted loop rather than one of the
/// `Loop Parse|Reg|Read|Files` forms
pub fn is_valid_loop_expression<L: TokenLookahead + ?Sized>(input: &L) -> bool {
    !matches!(
        input.la(2),
        TokenType::Parse | TokenType::Reg | TokenType::Read | TokenType::Files
    )
}

pub fn second<L: TokenLookahead + ?Sized>(input: &L, token_type: TokenType) -> bool {
    input.la(2) == token_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::{SkipWhitespace, TokenStream};
    use assert_matches::assert_matches;

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(tokenize(source).unwrap())
    }

    fn function_statement(source: &str) -> SyntaxResult<bool> {
        is_function_statement(&stream(source))
    }

    #[test]
    fn test_call_forms_are_function_statements() {
        assert_eq!(function_statement("Foo()"), Ok(true));
        assert_eq!(function_statement("Foo "), Ok(true));
        assert_eq!(function_statement("Foo"), Ok(true));
        assert_eq!(function_statement("this.Foo()"), Ok(true));
        assert_eq!(function_statement("MsgBox \"hi\""), Ok(true));
        assert_eq!(function_statement("obj.Method(1, 2).Other"), Ok(true));
    }

    #[test]
    fn test_expressions_are_not_function_statements() {
        assert_eq!(function_statement("Foo := 1"), Ok(false));
        assert_eq!(function_statement("x += 2"), Ok(false));
        assert_eq!(function_statement("arr[1] := 5"), Ok(false));
        assert_eq!(function_statement("x++"), Ok(false));
        assert_eq!(function_statement("(a)"), Ok(false));
        assert_eq!(function_statement("[a, b] := pair"), Ok(false));
    }

    #[test]
    fn test_binary_operator_spacing_decides() {
        assert_eq!(function_statement("Foo - 1"), Ok(false));
        assert_eq!(function_statement("Foo -1"), Ok(true));
        assert_eq!(function_statement("Foo . bar"), Ok(false));
        assert_eq!(function_statement("Foo * 2"), Ok(false));
    }

    #[test]
    fn test_comma_after_name_is_an_error() {
        assert_matches!(
            function_statement("Foo, 1, 2"),
            Err(SyntaxError::FunctionCallComma { line: 1, column: 4 })
        );
        // A comma inside the argument list is fine
        assert_eq!(function_statement("Foo(1, 2)"), Ok(true));
        assert_eq!(function_statement("Foo 1, 2"), Ok(true));
    }

    #[test]
    fn test_unbalanced_group_is_not_a_statement() {
        assert_eq!(function_statement("Foo(1"), Ok(false));
    }

    #[test]
    fn test_default_label_validity() {
        let input = stream("Default:");
        let root = RuleContext::root();
        let case = root.child(RuleKind::CaseClause);
        let block_in_case = case.child(RuleKind::Block);

        assert!(is_valid_label(&input, &root));
        assert!(!is_valid_label(&input, &case));
        assert!(is_valid_label(&input, &block_in_case));

        let plain = stream("Retry:");
        assert!(is_valid_label(&plain, &case));
    }

    #[test]
    fn test_loop_forms() {
        let parse_loop = stream("Loop Parse, text, \",\"");
        assert!(!is_valid_loop_expression(&SkipWhitespace::new(&parse_loop)));
        // Without skipping, LA(2) is the gap itself
        assert!(is_valid_loop_expression(&parse_loop));

        let counted = stream("Loop 5");
        assert!(is_valid_loop_expression(&SkipWhitespace::new(&counted)));

        let files = stream("Loop Files \"*.txt\"");
        assert!(!is_valid_loop_expression(&SkipWhitespace::new(&files)));
    }

    #[test]
    fn test_second() {
        let input = stream("a:=1");
        assert!(second(&input, TokenType::Assign));
        assert!(!second(&input, TokenType::Identifier));
    }
}
