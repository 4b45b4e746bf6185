//! Checks that run on the raw token list and source text
//!
//! These work even when the parser rejected the script, so an unclosed
//! brace is reported at the brace that opened it and not only at end of input.

use super::types::{DiagnosticRange, DiagnosticSink};
use crate::config::constants::compile_time::lint::{
    CONVENTIONAL_SHORT_NAMES, MAX_LINE_LENGTH, SHORT_NAME_THRESHOLD,
};
use crate::tokens::{Token, TokenType};
use std::collections::HashSet;

fn bracket_name(open: TokenType) -> &'static str {
    match open {
        TokenType::OpenBrace => "brace",
        TokenType::OpenParen => "parenthesis",
        _ => "bracket",
    }
}

fn opener_for(close: TokenType) -> Option<TokenType> {
    match close {
        TokenType::CloseBrace => Some(TokenType::OpenBrace),
        TokenType::CloseParen => Some(TokenType::OpenParen),
        TokenType::CloseBracket => Some(TokenType::OpenBracket),
        _ => None,
    }
}

/// Unmatched closers, unclosed openers and an unclosed `%` deref
pub fn check_bracket_balance(tokens: &[Token], sink: &mut DiagnosticSink) {
    let mut stack: Vec<&Token> = Vec::new();
    let mut open_deref: Option<&Token> = None;

    for token in tokens {
        match token.token_type {
            TokenType::OpenBrace | TokenType::OpenParen | TokenType::OpenBracket => stack.push(token),
            TokenType::CloseBrace | TokenType::CloseParen | TokenType::CloseBracket => {
                let Some(open) = opener_for(token.token_type) else {
                    continue;
                };
                if stack.last().map(|t| t.token_type) == Some(open) {
                    stack.pop();
                    continue;
                }
                let (code, what) = match token.token_type {
                    TokenType::CloseBrace => ("UnmatchedBrace", "brace"),
                    TokenType::CloseParen => ("UnmatchedParen", "parenthesis"),
                    _ => ("UnmatchedBracket", "bracket"),
                };
                sink.error(
                    code,
                    format!("Unmatched closing {}", what),
                    DiagnosticRange::of_token(token),
                );
            }
            TokenType::DerefStart => open_deref = Some(token),
            TokenType::DerefEnd => open_deref = None,
            _ => {}
        }
    }

    for open in stack {
        sink.error(
            "UnclosedBracket",
            format!("Unclosed {}", bracket_name(open.token_type)),
            DiagnosticRange::of_token(open),
        );
    }

    if let Some(open) = open_deref {
        sink.error(
            "UnclosedDeref",
            "Unclosed dynamic reference, expected a closing '%'",
            DiagnosticRange::of_token(open),
        );
    }
}

/// Significant tokens with each one's position at the start of a logical line
fn statement_starts(tokens: &[Token]) -> Vec<(usize, bool)> {
    let mut starts = Vec::new();
    let mut at_start = true;

    for (index, token) in tokens.iter().enumerate() {
        if token.is_hidden() {
            continue;
        }
        match token.token_type {
            TokenType::Eol => at_start = true,
            TokenType::Ws if token.contains_line_break() => at_start = true,
            TokenType::Ws => {}
            _ => {
                starts.push((index, at_start));
                at_start = false;
            }
        }
    }
    starts
}

/// Next default-channel token after `index`, skipping same-line whitespace
fn next_significant(tokens: &[Token], index: usize) -> Option<&Token> {
    tokens[index + 1..].iter().find(|t| {
        !t.is_hidden() && !(t.token_type == TokenType::Ws && !t.contains_line_break())
    })
}

/// `x = 1` on its own line compares and discards; assignment is `:=`
pub fn check_assignment_operator(tokens: &[Token], sink: &mut DiagnosticSink) {
    for (index, at_start) in statement_starts(tokens) {
        if !at_start || tokens[index].token_type != TokenType::Identifier {
            continue;
        }
        if let Some(next) = next_significant(tokens, index) {
            if next.token_type == TokenType::Equals {
                sink.warning(
                    "UseAssignmentOperator",
                    "Use \":=\" for assignment in AutoHotkey v2, \"=\" is for comparison",
                    DiagnosticRange::of_token(next),
                );
            }
        }
    }
}

/// Single-letter variables outside the conventional loop/coordinate names,
/// reported once per name at its first assignment
pub fn check_short_names(tokens: &[Token], sink: &mut DiagnosticSink) {
    let mut reported = HashSet::new();
    let mut previous: Option<TokenType> = None;

    for (index, token) in tokens.iter().enumerate() {
        if token.is_hidden() || token.token_type == TokenType::Ws {
            continue;
        }
        let after_member_access = matches!(
            previous,
            Some(TokenType::Dot) | Some(TokenType::QuestionMarkDot)
        );
        previous = Some(token.token_type);

        if token.token_type != TokenType::Identifier || after_member_access {
            continue;
        }
        let name = token.text.to_lowercase();
        if name.chars().count() >= SHORT_NAME_THRESHOLD
            || CONVENTIONAL_SHORT_NAMES.contains(&name.as_str())
        {
            continue;
        }
        let assigned = next_significant(tokens, index)
            .map_or(false, |next| next.token_type.is_assignment_operator());
        if assigned && reported.insert(name) {
            sink.info(
                "ShortVariableName",
                format!("Consider a more descriptive name than '{}'", token.text),
                DiagnosticRange::of_token(token),
            );
        }
    }
}

fn source_lines(source: &str) -> impl Iterator<Item = (u32, &str)> {
    source
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i as u32 + 1, line.strip_suffix('\r').unwrap_or(line)))
}

pub fn check_trailing_whitespace(source: &str, sink: &mut DiagnosticSink) {
    for (line_number, line) in source_lines(source) {
        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.len() == line.len() {
            continue;
        }
        let start = trimmed.chars().count() as u32 + 1;
        let end = line.chars().count() as u32 + 1;
        sink.info(
            "TrailingWhitespace",
            "Trailing whitespace",
            DiagnosticRange::new((line_number, start), (line_number, end)),
        );
    }
}

pub fn check_line_length(source: &str, sink: &mut DiagnosticSink) {
    for (line_number, line) in source_lines(source) {
        let length = line.chars().count();
        if length > MAX_LINE_LENGTH {
            sink.info(
                "LineTooLong",
                format!("Line is {} characters long (max {})", length, MAX_LINE_LENGTH),
                DiagnosticRange::new(
                    (line_number, MAX_LINE_LENGTH as u32 + 1),
                    (line_number, length as u32 + 1),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    fn run(source: &str, check: fn(&[Token], &mut DiagnosticSink)) -> Vec<(String, (u32, u32))> {
        let tokens = tokenize(source).unwrap();
        let mut sink = DiagnosticSink::default();
        check(&tokens, &mut sink);
        sink.into_sorted()
            .into_iter()
            .map(|d| (d.code, d.range.start))
            .collect()
    }

    #[test]
    fn test_unclosed_and_unmatched() {
        assert_eq!(
            run("if x {\n  y := (1\n", check_bracket_balance),
            vec![
                ("UnclosedBracket".to_string(), (1, 6)),
                ("UnclosedBracket".to_string(), (2, 8)),
            ]
        );
        assert_eq!(
            run("x := 1)\n}", check_bracket_balance),
            vec![
                ("UnmatchedParen".to_string(), (1, 7)),
                ("UnmatchedBrace".to_string(), (2, 1)),
            ]
        );
        assert!(run("f(a[1], {b: 2})", check_bracket_balance).is_empty());
    }

    #[test]
    fn test_unclosed_deref() {
        assert_eq!(
            run("x := %name", check_bracket_balance),
            vec![("UnclosedDeref".to_string(), (1, 6))]
        );
    }

    #[test]
    fn test_assignment_operator_only_at_statement_start() {
        assert_eq!(
            run("count = 1\nif count = 1\n  x := 2", check_assignment_operator),
            vec![("UseAssignmentOperator".to_string(), (1, 7))]
        );
    }

    #[test]
    fn test_short_names_reported_once() {
        let found = run("q := 1\nq := 2\ni := 0\nobj.z := 3", check_short_names);
        assert_eq!(found, vec![("ShortVariableName".to_string(), (1, 1))]);
    }

    #[test]
    fn test_text_checks() {
        let mut sink = DiagnosticSink::default();
        check_trailing_whitespace("a := 1  \r\nb := 2\n\t\n", &mut sink);
        let found = sink.into_sorted();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].range.start, (1, 7));
        assert_eq!(found[0].range.end, (1, 9));
        assert_eq!(found[1].line(), 3);

        let mut sink = DiagnosticSink::default();
        check_line_length(&"x".repeat(MAX_LINE_LENGTH + 3), &mut sink);
        assert_eq!(sink.len(), 1);
    }
}
