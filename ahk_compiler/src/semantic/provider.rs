//! Token-level semantic classification
//!
//! Works from the lexer output alone so it keeps producing highlights while
//! the script is half-typed and does not parse. Identifiers are refined with
//! a little neighbourhood context: what precedes them, whether a `(` touches
//! them, and whether the parenthesised list is followed by a function body.

use super::builtins::{is_builtin_class, is_builtin_function, is_builtin_variable};
use super::types::{SemanticToken, SemanticTokenModifier, SemanticTokenType};
use crate::lexical::LexerError;
use crate::tokens::{Token, TokenClass, TokenType};
use crate::{log_debug, log_success};

type Classified = (SemanticTokenType, Vec<SemanticTokenModifier>);

#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticTokenProvider;

impl SemanticTokenProvider {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize `source` and classify every token
    pub fn tokens(&self, source: &str) -> Result<Vec<SemanticToken>, LexerError> {
        let tokens = crate::lexical::tokenize(source)?;
        let semantic = self.classify(&tokens);
        log_success!(crate::logging::codes::success::SEMANTIC_TOKENS_COMPLETE,
            "Semantic tokens computed",
            "lexical_tokens" => tokens.len(),
            "semantic_tokens" => semantic.len()
        );
        Ok(semantic)
    }

    /// Classify an existing token list; whitespace and EOF produce nothing
    pub fn classify(&self, tokens: &[Token]) -> Vec<SemanticToken> {
        let mut classifier = Classifier {
            tokens,
            param_close: None,
        };
        let mut output = Vec::new();
        let mut at_start = true;
        let mut previous: Option<TokenType> = None;

        for (index, token) in tokens.iter().enumerate() {
            match token.token_type {
                TokenType::Eol => {
                    at_start = true;
                    continue;
                }
                TokenType::Ws => {
                    at_start |= token.contains_line_break();
                    continue;
                }
                TokenType::Eof => continue,
                t if t.is_comment() => {
                    let mut modifiers = Vec::new();
                    if is_documentation_comment(&token.text) {
                        modifiers.push(SemanticTokenModifier::Documentation);
                    }
                    push_token(&mut output, token, SemanticTokenType::Comment, modifiers);
                    continue;
                }
                _ => {}
            }

            if let Some((token_type, modifiers)) = classifier.classify(index, at_start, previous) {
                push_token(&mut output, token, token_type, modifiers);
            }
            previous = Some(token.token_type);
            at_start = token.token_type == TokenType::HotkeyTrigger;
        }

        log_debug!("Classified semantic tokens", "count" => output.len());
        output
    }
}

struct Classifier<'t> {
    tokens: &'t [Token],
    /// Index of the `)` closing the parameter list being classified
    param_close: Option<usize>,
}

impl Classifier<'_> {
    fn classify(&mut self, index: usize, at_start: bool, previous: Option<TokenType>) -> Option<Classified> {
        use SemanticTokenModifier::*;
        use SemanticTokenType as S;

        let token = &self.tokens[index];
        let plain = |token_type: SemanticTokenType| -> Option<Classified> { Some((token_type, Vec::new())) };

        if token.is_name() {
            return Some(self.classify_name(index, at_start, previous));
        }

        match token.token_type.token_class() {
            TokenClass::Keyword => match token.token_type {
                TokenType::True | TokenType::False | TokenType::Unset => {
                    Some((S::Keyword, vec![Readonly]))
                }
                TokenType::This | TokenType::Super => Some((S::Variable, vec![Readonly])),
                _ => plain(S::Keyword),
            },
            TokenClass::Literal => match token.token_type {
                t if t.is_string() => plain(S::String),
                _ => plain(S::Number),
            },
            TokenClass::Operator => match token.token_type {
                // `a.b` is member access, `a . b` concatenates
                TokenType::Dot | TokenType::QuestionMarkDot if !self.follows_gap(index) => {
                    plain(S::Delimiter)
                }
                _ => plain(S::Operator),
            },
            TokenClass::Punctuation => match token.token_type {
                TokenType::DerefStart | TokenType::DerefEnd | TokenType::Modulus => plain(S::Operator),
                _ => plain(S::Delimiter),
            },
            TokenClass::Hotkey => match token.token_type {
                TokenType::HotstringExpansion => plain(S::String),
                TokenType::RemapKey => plain(S::Label),
                _ => Some((S::Label, vec![Declaration])),
            },
            TokenClass::Directive => match token.token_type {
                TokenType::Directive => plain(S::Macro),
                TokenType::EndChars => plain(S::Keyword),
                _ => plain(S::String),
            },
            TokenClass::Identifier | TokenClass::Trivia | TokenClass::Comment | TokenClass::Special => None,
        }
    }

    fn classify_name(&mut self, index: usize, at_start: bool, previous: Option<TokenType>) -> Classified {
        use SemanticTokenModifier::*;
        use SemanticTokenType as S;

        let token = &self.tokens[index];
        let name = token.text.as_str();
        let call_follows = self.tokens.get(index + 1).map(|t| t.token_type) == Some(TokenType::OpenParen);

        if matches!(previous, Some(TokenType::Dot) | Some(TokenType::QuestionMarkDot)) {
            return (if call_follows { S::Method } else { S::Property }, Vec::new());
        }
        if token.token_type != TokenType::Identifier {
            // contextual keyword in keyword position
            return (S::Keyword, Vec::new());
        }
        if is_builtin_variable(name) {
            return (S::Variable, vec![Readonly, DefaultLibrary]);
        }

        match previous {
            Some(TokenType::Class) => return (S::Class, vec![Declaration]),
            Some(TokenType::Extends) => return (S::Class, Vec::new()),
            Some(TokenType::Goto) | Some(TokenType::Break) | Some(TokenType::Continue) => {
                return (S::Label, Vec::new())
            }
            _ => {}
        }

        if self.param_close.map_or(false, |close| index < close)
            && matches!(
                previous,
                Some(TokenType::OpenParen) | Some(TokenType::Comma) | Some(TokenType::BitAnd)
            )
        {
            return (S::Parameter, vec![Declaration]);
        }

        if call_follows {
            if at_start || previous == Some(TokenType::Static) {
                if let Some(close) = self.definition_params(index) {
                    self.param_close = Some(close);
                    return (S::Function, vec![Declaration]);
                }
            }
            let modifiers = if is_builtin_function(name) { vec![DefaultLibrary] } else { Vec::new() };
            return (S::Function, modifiers);
        }

        if at_start && self.is_label_definition(index) {
            return (S::Label, vec![Declaration]);
        }
        if matches!(
            previous,
            Some(TokenType::Global) | Some(TokenType::Local) | Some(TokenType::Static)
        ) {
            return (S::Variable, vec![Declaration]);
        }
        if is_builtin_class(name) {
            return (S::Class, vec![DefaultLibrary]);
        }
        if is_builtin_function(name) {
            return (S::Function, vec![DefaultLibrary]);
        }
        (S::Variable, Vec::new())
    }

    fn follows_gap(&self, index: usize) -> bool {
        index > 0 && self.tokens[index - 1].token_type == TokenType::Ws
    }

    /// For `Name(` at `index`: the `)` index when the list is followed by a
    /// `{` body (same or next line) or by `=>`
    fn definition_params(&self, index: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut close = None;
        for (offset, token) in self.tokens[index + 1..].iter().enumerate() {
            match token.token_type {
                TokenType::OpenParen => depth += 1,
                TokenType::CloseParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        close = Some(index + 1 + offset);
                        break;
                    }
                }
                TokenType::Eof => return None,
                _ => {}
            }
        }

        let close = close?;
        let body = self.tokens[close + 1..]
            .iter()
            .find(|t| !matches!(t.token_type, TokenType::Ws | TokenType::Eol) && !t.token_type.is_comment())?;
        matches!(body.token_type, TokenType::OpenBrace | TokenType::Arrow).then_some(close)
    }

    /// `Name:` alone on its line
    fn is_label_definition(&self, index: usize) -> bool {
        let mut rest = self.tokens[index + 1..].iter();
        if rest.next().map(|t| t.token_type) != Some(TokenType::Colon) {
            return false;
        }
        match rest.find(|t| !(t.token_type == TokenType::Ws && !t.contains_line_break())) {
            None => true,
            Some(next) => {
                next.token_type == TokenType::Eol
                    || next.token_type == TokenType::Eof
                    || next.contains_line_break()
                    || next.token_type.is_comment()
            }
        }
    }
}

fn is_documentation_comment(text: &str) -> bool {
    text.starts_with("/**")
        || text.starts_with(";;")
        || text.contains("@param")
        || text.contains("@returns")
        || text.contains("@description")
}

/// One semantic token per physical line the lexical token covers
fn push_token(
    output: &mut Vec<SemanticToken>,
    token: &Token,
    token_type: SemanticTokenType,
    modifiers: Vec<SemanticTokenModifier>,
) {
    let line = token.line.saturating_sub(1);
    for (offset, segment) in token.text.split('\n').enumerate() {
        let segment = segment.strip_suffix('\r').unwrap_or(segment);
        let length = segment.chars().count() as u32;
        if length == 0 {
            continue;
        }
        let character = if offset == 0 { token.column.saturating_sub(1) } else { 0 };
        output.push(SemanticToken {
            line: line + offset as u32,
            character,
            length,
            token_type,
            token_modifiers: modifiers.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::types::SemanticTokenType as S;

    fn classify(source: &str) -> Vec<(String, SemanticTokenType, Vec<SemanticTokenModifier>)> {
        let tokens = crate::lexical::tokenize(source).unwrap();
        let semantic = SemanticTokenProvider::new().classify(&tokens);
        semantic
            .into_iter()
            .map(|t| {
                let line: Vec<&str> = source.lines().collect();
                let text: String = line[t.line as usize]
                    .chars()
                    .skip(t.character as usize)
                    .take(t.length as usize)
                    .collect();
                (text, t.token_type, t.token_modifiers)
            })
            .collect()
    }

    fn type_of(classified: &[(String, SemanticTokenType, Vec<SemanticTokenModifier>)], text: &str) -> SemanticTokenType {
        classified
            .iter()
            .find(|(t, _, _)| t == text)
            .map(|(_, ty, _)| *ty)
            .unwrap_or_else(|| panic!("no token {:?}", text))
    }

    #[test]
    fn test_function_definition_and_parameters() {
        let found = classify("Add(first, &second := 1) {\n    return first + second\n}\nAdd(1, 2)");
        assert_eq!(found[0], ("Add".to_string(), S::Function, vec![SemanticTokenModifier::Declaration]));
        assert_eq!(found[2].1, S::Parameter);
        assert!(found
            .iter()
            .any(|(t, ty, m)| t == "second" && *ty == S::Parameter && m.contains(&SemanticTokenModifier::Declaration)));
        let last_call = found.iter().rev().find(|(t, _, _)| t == "Add").unwrap();
        assert_eq!(last_call.1, S::Function);
        assert!(last_call.2.is_empty());
    }

    #[test]
    fn test_members_classes_and_builtins() {
        let found = classify("class Box extends Object {\n}\nb := Box()\nb.Open(b.size)\nMsgBox A_ScriptDir");
        assert_eq!(found[1], ("Box".to_string(), S::Class, vec![SemanticTokenModifier::Declaration]));
        assert_eq!(type_of(&found, "Object"), S::Class);
        assert_eq!(type_of(&found, "Open"), S::Method);
        assert_eq!(type_of(&found, "size"), S::Property);
        assert!(found.contains(&(
            "MsgBox".to_string(),
            S::Function,
            vec![SemanticTokenModifier::DefaultLibrary]
        )));
        assert!(found.contains(&(
            "A_ScriptDir".to_string(),
            S::Variable,
            vec![SemanticTokenModifier::Readonly, SemanticTokenModifier::DefaultLibrary]
        )));
    }

    #[test]
    fn test_hotkeys_directives_and_comments() {
        let found = classify("#SingleInstance Force\n; @param nothing\n^j::Send \"hi\"\nretry:\ngoto retry");
        assert_eq!(type_of(&found, "#SingleInstance"), S::Macro);
        assert_eq!(type_of(&found, "Force"), S::String);
        assert_eq!(
            found[2],
            ("; @param nothing".to_string(), S::Comment, vec![SemanticTokenModifier::Documentation])
        );
        assert_eq!(type_of(&found, "^j::"), S::Label);
        assert_eq!(type_of(&found, "\"hi\""), S::String);
        assert_eq!(found.iter().filter(|(t, ty, _)| t == "retry" && *ty == S::Label).count(), 2);
    }

    #[test]
    fn test_concat_dot_is_operator() {
        let found = classify("s := a . b.c");
        let dots: Vec<SemanticTokenType> = found.iter().filter(|(t, _, _)| t == ".").map(|(_, ty, _)| *ty).collect();
        assert_eq!(dots, vec![S::Operator, S::Delimiter]);
    }

    #[test]
    fn test_block_comment_split_per_line() {
        let tokens = crate::lexical::tokenize("/*\nfirst\n*/\nx := 1").unwrap();
        let semantic = SemanticTokenProvider::new().classify(&tokens);
        let comments: Vec<u32> = semantic
            .iter()
            .filter(|t| t.token_type == S::Comment)
            .map(|t| t.line)
            .collect();
        assert_eq!(comments, vec![0, 1, 2]);
    }
}
