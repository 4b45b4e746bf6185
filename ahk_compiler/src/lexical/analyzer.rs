//! Scanner for AutoHotkey v2 source
//!
//! Walks the input once, recognising raw lexemes and handing each one to the
//! [`TokenRules`] hooks on a fresh [`LexerState`] before it is pushed. Every
//! character ends up in exactly one token, so concatenating the token texts
//! reproduces the source.

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexerPreferences;
use crate::file_processor::FileProcessingResult;
use crate::lexical::rules::{CharLookahead, LexerState, TokenRules};
use crate::logging::codes;
use crate::tokens::{keyword_from_word, Channel, Token, TokenClass, TokenStream, TokenType};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Source too large: {size} bytes (max {MAX_SOURCE_LENGTH})")]
    SourceTooLarge { size: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TokenLimitExceeded { count: usize },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH}) at line {line}, column {column}")]
    IdentifierTooLong { length: usize, line: u32, column: u32 },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE}) at line {line}, column {column}")]
    StringTooLarge { size: usize, line: u32, column: u32 },

    #[error("Unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedBlockComment { line: u32, column: u32 },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
            LexerError::TokenLimitExceeded { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedBlockComment { .. } => {
                codes::lexical::UNTERMINATED_BLOCK_COMMENT
            }
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Line and column of the offending lexeme, when the error has one
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            LexerError::IdentifierTooLong { line, column, .. }
            | LexerError::StringTooLarge { line, column, .. }
            | LexerError::UnterminatedString { line, column }
            | LexerError::UnterminatedBlockComment { line, column } => Some((*line, *column)),
            LexerError::SourceTooLarge { .. } | LexerError::TokenLimitExceeded { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub hidden_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub comment_tokens: usize,
    pub trivia_tokens: usize,
    pub hotkey_tokens: usize,
    pub directive_tokens: usize,
    pub unexpected_characters: usize,

    pub max_bracket_depth: i32,
    /// Nonzero when a bracket or deref region was left open (or over-closed)
    pub final_bracket_depth: i32,
    pub final_deref_depth: u8,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexerPreferences) {
        self.total_tokens += 1;

        if token.is_hidden() {
            self.hidden_tokens += 1;
        }

        if !preferences.collect_detailed_metrics {
            return;
        }

        let class = token.token_type.token_class();
        if token.is_hidden()
            && class != TokenClass::Comment
            && !preferences.include_hidden_tokens_in_counts
        {
            return;
        }

        match class {
            TokenClass::Keyword => self.keyword_tokens += 1,
            TokenClass::Identifier => self.identifier_tokens += 1,
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Operator => self.operator_tokens += 1,
            TokenClass::Punctuation => self.punctuation_tokens += 1,
            TokenClass::Comment => self.comment_tokens += 1,
            TokenClass::Trivia => self.trivia_tokens += 1,
            TokenClass::Hotkey => self.hotkey_tokens += 1,
            TokenClass::Directive => self.directive_tokens += 1,
            TokenClass::Special => {
                if token.token_type == TokenType::UnexpectedCharacter {
                    self.unexpected_characters += 1;
                }
            }
        }
    }

    pub(crate) fn record_final_state(&mut self, state: &LexerState) {
        self.max_bracket_depth = state.max_bracket_depth;
        self.final_bracket_depth = state.bracket_depth;
        self.final_deref_depth = state.deref_depth;
    }

    /// Every bracket and deref region closed by EOF
    pub fn is_balanced(&self) -> bool {
        self.final_bracket_depth == 0 && self.final_deref_depth == 0
    }
}

/// Operators, longest first so the first match is the longest match
const OPERATORS: &[(&str, TokenType)] = &[
    (">>>=", TokenType::RightShiftLogicalAssign),
    ("<<=", TokenType::LeftShiftArithmeticAssign),
    (">>=", TokenType::RightShiftArithmeticAssign),
    (">>>", TokenType::RightShiftLogical),
    ("!==", TokenType::IdentityNotEquals),
    ("//=", TokenType::IntegerDivideAssign),
    ("**=", TokenType::PowerAssign),
    ("??=", TokenType::NullishCoalescingAssign),
    (":=", TokenType::Assign),
    ("=>", TokenType::Arrow),
    ("++", TokenType::PlusPlus),
    ("--", TokenType::MinusMinus),
    ("+=", TokenType::PlusAssign),
    ("-=", TokenType::MinusAssign),
    ("*=", TokenType::MultiplyAssign),
    ("/=", TokenType::DivideAssign),
    (".=", TokenType::ConcatenateAssign),
    ("|=", TokenType::BitOrAssign),
    ("&=", TokenType::BitAndAssign),
    ("^=", TokenType::BitXorAssign),
    ("**", TokenType::Power),
    ("//", TokenType::IntegerDivide),
    ("&&", TokenType::And),
    ("||", TokenType::Or),
    ("??", TokenType::NullCoalesce),
    ("<<", TokenType::LeftShiftArithmetic),
    (">>", TokenType::RightShiftArithmetic),
    ("<=", TokenType::LessThanEquals),
    (">=", TokenType::GreaterThanEquals),
    ("==", TokenType::IdentityEquals),
    ("!=", TokenType::NotEquals),
    ("~=", TokenType::RegExMatch),
    ("?.", TokenType::QuestionMarkDot),
    ("[", TokenType::OpenBracket),
    ("]", TokenType::CloseBracket),
    ("(", TokenType::OpenParen),
    (")", TokenType::CloseParen),
    ("{", TokenType::OpenBrace),
    ("}", TokenType::CloseBrace),
    ("%", TokenType::Modulus),
    (",", TokenType::Comma),
    (":", TokenType::Colon),
    (".", TokenType::Dot),
    ("?", TokenType::QuestionMark),
    ("+", TokenType::Plus),
    ("-", TokenType::Minus),
    ("*", TokenType::Multiply),
    ("/", TokenType::Divide),
    ("!", TokenType::Not),
    ("~", TokenType::BitNot),
    ("&", TokenType::BitAnd),
    ("^", TokenType::BitXOr),
    ("|", TokenType::BitOr),
    ("<", TokenType::LessThan),
    (">", TokenType::MoreThan),
    ("=", TokenType::Equals),
];

/// Hotkey modifier symbols
const HOTKEY_MODIFIERS: &[char] = &['#', '!', '^', '+', '<', '>', '*', '~', '$'];

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_horizontal_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_break(c)
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Read-only view of the input at a char index
struct CharCursor<'a> {
    chars: &'a [char],
    pos: usize,
    token_start: usize,
}

impl CharLookahead for CharCursor<'_> {
    fn la(&self, i: isize) -> Option<char> {
        let index = if i > 0 {
            self.pos.checked_add(i as usize - 1)?
        } else {
            self.pos.checked_sub(i.unsigned_abs())?
        };
        self.chars.get(index).copied()
    }

    fn token_start(&self) -> usize {
        self.token_start
    }

    fn char_before_token(&self) -> Option<char> {
        self.token_start
            .checked_sub(1)
            .and_then(|i| self.chars.get(i).copied())
    }
}

/// One tokenization pass. Owns its state and is discarded afterwards.
struct Scanner {
    chars: Vec<char>,
    pos: usize,
    position: Position,
    token_start: usize,
    start_position: Position,
    state: LexerState,
    /// One entry per open `{`; true when the brace was counted as a bracket
    brace_stack: Vec<bool>,
    tokens: Vec<Token>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            position: Position::start(),
            token_start: 0,
            start_position: Position::start(),
            state: LexerState::new(),
            brace_stack: Vec::new(),
            tokens: Vec::new(),
        }
    }

    // === CURSOR ===

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.position.advance(ch, self.peek_at(1));
        self.pos += 1;
        Some(ch)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }

    fn begin(&mut self) {
        self.token_start = self.pos;
        self.start_position = self.position;
    }

    fn text(&self) -> String {
        self.chars[self.token_start..self.pos].iter().collect()
    }

    fn cursor_at(&self, pos: usize) -> CharCursor<'_> {
        CharCursor {
            chars: &self.chars,
            pos,
            token_start: self.token_start,
        }
    }

    fn starts_with_at(&self, index: usize, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, p)| self.char_at(index + i) == Some(p))
    }

    /// Only horizontal whitespace between the last line break and the token
    fn at_line_start(&self) -> bool {
        self.chars[..self.token_start]
            .iter()
            .rev()
            .take_while(|c| !is_line_break(**c))
            .all(|c| is_horizontal_whitespace(*c))
    }

    // === EMISSION ===

    fn emit(&mut self, token_type: TokenType) -> Result<(), LexerError> {
        self.emit_on(token_type, Channel::Default)
    }

    fn emit_on(&mut self, token_type: TokenType, channel: Channel) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TokenLimitExceeded {
                count: self.tokens.len(),
            });
        }

        let mut token_type = token_type;
        let mut channel = channel;

        match token_type {
            TokenType::Eol => self.state.on_end_of_line(&mut token_type, &mut channel),
            TokenType::Ws => self.state.on_whitespace(&mut channel),
            TokenType::OpenParen | TokenType::OpenBracket => self.state.on_open_bracket(),
            TokenType::CloseParen | TokenType::CloseBracket => self.state.on_close_bracket(),
            TokenType::Modulus => self.state.on_deref(&mut token_type),
            TokenType::HotstringOpenBrace => {
                self.state.on_hotstring_open_brace(&mut token_type);
                self.brace_stack.push(true);
            }
            TokenType::OpenBrace => self.brace_stack.push(false),
            TokenType::CloseBrace => {
                if self.brace_stack.pop() == Some(true) {
                    self.state.on_close_bracket();
                }
            }
            TokenType::LineComment | TokenType::BlockComment => channel = Channel::Hidden,
            _ => {}
        }

        let token = Token::new(token_type, self.text(), channel, self.start_position);
        self.state.on_token_emitted(&token);
        self.tokens.push(token);
        Ok(())
    }

    // === DRIVER ===

    fn run(mut self) -> Result<(Vec<Token>, LexerState), LexerError> {
        while let Some(c) = self.peek() {
            self.begin();
            self.scan_token(c)?;
        }

        self.begin();
        self.emit(TokenType::Eof)?;
        Ok((self.tokens, self.state))
    }

    fn scan_token(&mut self, c: char) -> Result<(), LexerError> {
        if is_line_break(c) {
            self.bump();
            if c == '\r' && self.peek() == Some('\n') {
                self.bump();
            }
            return self.emit(TokenType::Eol);
        }

        if is_horizontal_whitespace(c) {
            self.bump_while(is_horizontal_whitespace);
            return self.emit(TokenType::Ws);
        }

        if self.state.is_beginning_of_statement() && self.scan_statement_start(c)? {
            return Ok(());
        }

        match c {
            ';' => {
                if self.state.is_comment_possible(&self.cursor_at(self.pos)) {
                    self.bump_while(|c| !is_line_break(c));
                    self.emit(TokenType::LineComment)
                } else {
                    self.bump();
                    self.emit(TokenType::UnexpectedCharacter)
                }
            }
            '/' if self.peek_at(1) == Some('*') && self.at_line_start() => self.scan_block_comment(),
            '"' | '\'' => self.scan_string(c),
            '0'..='9' => self.scan_number(),
            '.' if self.peek_at(1).map_or(false, |n| n.is_ascii_digit())
                && self.state.is_valid_dot_decimal() =>
            {
                self.scan_number()
            }
            c if is_identifier_start(c) => self.scan_word(),
            _ => self.scan_operator(),
        }
    }

    /// Hotstrings, hotkeys and directives. Returns false when none applies.
    fn scan_statement_start(&mut self, c: char) -> Result<bool, LexerError> {
        if c == ':' {
            if let Some(len) = self.match_hotstring() {
                self.bump_n(len);
                let trigger = self.text();
                self.emit(TokenType::HotstringTrigger)?;
                self.scan_hotstring_body(&trigger)?;
                return Ok(true);
            }
        }

        if let Some(len) = self.match_hotkey() {
            self.bump_n(len);
            self.emit(TokenType::HotkeyTrigger)?;
            self.scan_remap_key()?;
            return Ok(true);
        }

        if c == '#' && self.peek_at(1).map_or(false, is_identifier_start) {
            self.scan_directive()?;
            return Ok(true);
        }

        Ok(false)
    }

    // === HOTKEYS & HOTSTRINGS ===

    /// Length of a `KEY` at `index`: a word, an escaped char, or one symbol
    fn key_length_at(&self, index: usize) -> usize {
        match self.char_at(index) {
            Some(c) if is_identifier_char(c) => self.chars[index..]
                .iter()
                .take_while(|c| is_identifier_char(**c))
                .count(),
            Some('`') if self.char_at(index + 1).map_or(false, |c| !c.is_whitespace()) => 2,
            Some(c) if !c.is_whitespace() && c != ':' && c != ';' => 1,
            _ => 0,
        }
    }

    fn skip_horizontal_at(&self, mut index: usize) -> usize {
        while self.char_at(index).map_or(false, is_horizontal_whitespace) {
            index += 1;
        }
        index
    }

    /// `[modifiers]KEY[ & KEY][ up]::`, returning its length in chars
    fn match_hotkey(&self) -> Option<usize> {
        let start = self.pos;
        let mut i = start;

        while self.char_at(i).map_or(false, |c| HOTKEY_MODIFIERS.contains(&c)) {
            i += 1;
        }

        let key = self.key_length_at(i);
        if key == 0 {
            // A lone modifier symbol is itself the key (`+::`)
            if i == start || !self.starts_with_at(i, "::") {
                return None;
            }
        } else {
            i += key;
        }

        let j = self.skip_horizontal_at(i);
        if self.char_at(j) == Some('&') {
            let k = self.skip_horizontal_at(j + 1);
            let k = k + self.chars[k..]
                .iter()
                .take_while(|c| HOTKEY_MODIFIERS.contains(c))
                .count();
            let second = self.key_length_at(k);
            if second == 0 {
                return None;
            }
            i = k + second;
        }

        let j = self.skip_horizontal_at(i);
        if j > i
            && self.char_at(j).map_or(false, |c| c.eq_ignore_ascii_case(&'u'))
            && self.char_at(j + 1).map_or(false, |c| c.eq_ignore_ascii_case(&'p'))
            && !self.char_at(j + 2).map_or(false, is_identifier_char)
        {
            i = j + 2;
        }

        if self.starts_with_at(i, "::") {
            Some(i + 2 - start)
        } else {
            None
        }
    }

    /// `:options:abbreviation::`, returning its length in chars
    fn match_hotstring(&self) -> Option<usize> {
        let start = self.pos;
        let options_end = (start + 1..)
            .take(MAX_HOTSTRING_OPTIONS_LENGTH + 1)
            .take_while(|&i| self.char_at(i).map_or(false, |c| !is_line_break(c)))
            .find(|&i| self.char_at(i) == Some(':'))?;

        let abbreviation_start = options_end + 1;
        let mut i = abbreviation_start;
        while let Some(c) = self.char_at(i) {
            if is_line_break(c) {
                return None;
            }
            if i > abbreviation_start && self.starts_with_at(i, "::") {
                return Some(i + 2 - start);
            }
            i += 1;
        }
        None
    }

    fn scan_hotstring_body(&mut self, trigger: &str) -> Result<(), LexerError> {
        let literal = self.state.is_hotstring_literal(trigger);

        if self.peek().map_or(false, is_horizontal_whitespace) {
            self.begin();
            self.bump_while(is_horizontal_whitespace);
            self.emit(TokenType::Ws)?;
        }

        if self.peek() == Some('{') {
            self.begin();
            self.bump();
            return self.emit(TokenType::HotstringOpenBrace);
        }

        if literal {
            self.begin();
            self.bump_until_line_end_or_comment();
            if self.pos > self.token_start {
                self.emit(TokenType::HotstringExpansion)?;
            }
        }

        Ok(())
    }

    /// Single key right after `::`, emitted as a remap target when nothing
    /// but whitespace or a comment follows it
    fn scan_remap_key(&mut self) -> Result<(), LexerError> {
        let modifiers = self.chars[self.pos..]
            .iter()
            .take_while(|c| HOTKEY_MODIFIERS.contains(c))
            .count();
        let key = self.key_length_at(self.pos + modifiers);
        let len = match (modifiers, key) {
            (0, 0) => return Ok(()),
            (m, 0) => m,
            (m, k) => m + k,
        };

        self.begin();
        let after_key = self.cursor_at(self.pos + len);
        if self.state.is_valid_remap(&after_key) {
            self.bump_n(len);
            self.emit(TokenType::RemapKey)?;
        }
        Ok(())
    }

    /// Advance to the end of the line, stopping before whitespace that
    /// introduces a `;` comment
    fn bump_until_line_end_or_comment(&mut self) {
        while let Some(c) = self.peek() {
            if is_line_break(c) {
                break;
            }
            if is_horizontal_whitespace(c) {
                let next = self.skip_horizontal_at(self.pos);
                if self.char_at(next) == Some(';') {
                    break;
                }
            }
            self.bump();
        }
    }

    // === DIRECTIVES ===

    fn scan_directive(&mut self) -> Result<(), LexerError> {
        self.bump();
        self.bump_while(is_identifier_char);
        let name = self.text();
        self.emit(TokenType::Directive)?;

        if name.chars().count() > MAX_DIRECTIVE_NAME_LENGTH + 1 {
            log_warning!("Directive name exceeds length limit", "directive" => &name);
        }

        let name = name[1..].to_ascii_lowercase();
        if name == "hotif" {
            return Ok(());
        }

        if !self.peek().map_or(false, is_horizontal_whitespace) {
            return Ok(());
        }
        self.begin();
        self.bump_while(is_horizontal_whitespace);
        self.emit(TokenType::Ws)?;

        if name == "hotstring" {
            return self.scan_hotstring_directive();
        }

        self.begin();
        self.bump_until_line_end_or_comment();
        if self.pos > self.token_start {
            self.emit(TokenType::DirectiveText)?;
        }
        Ok(())
    }

    /// `#Hotstring EndChars chars` or `#Hotstring options`
    fn scan_hotstring_directive(&mut self) -> Result<(), LexerError> {
        let word_len = self.key_length_at(self.pos);
        let is_end_chars = word_len == 8
            && self.chars[self.pos..self.pos + 8]
                .iter()
                .collect::<String>()
                .eq_ignore_ascii_case("endchars");

        if is_end_chars {
            self.begin();
            self.bump_n(word_len);
            self.emit(TokenType::EndChars)?;

            // The separator is not a token of the directive, so the options
            // hook runs while EndChars is still the last token
            let options_start = self.skip_horizontal_at(self.pos);
            let options_end = (options_start..)
                .take_while(|&i| self.char_at(i).map_or(false, |c| !is_line_break(c)))
                .last()
                .map_or(options_start, |i| i + 1);
            let options: String = self.chars[options_start..options_end].iter().collect();
            self.state.process_hotstring_options(&options);

            if self.pos < options_start {
                self.begin();
                self.bump_while(is_horizontal_whitespace);
                self.emit(TokenType::Ws)?;
            }
            if options_end > options_start {
                self.begin();
                self.bump_n(options_end - options_start);
                self.emit(TokenType::HotstringOptions)?;
            }
            return Ok(());
        }

        self.begin();
        self.bump_until_line_end_or_comment();
        if self.pos > self.token_start {
            let options = self.text();
            self.emit(TokenType::HotstringOptions)?;
            self.state.process_hotstring_options(&options);
        }
        Ok(())
    }

    // === COMMENTS, STRINGS, NUMBERS, WORDS ===

    fn scan_block_comment(&mut self) -> Result<(), LexerError> {
        self.bump_n(2);
        loop {
            match self.peek() {
                None => {
                    return Err(LexerError::UnterminatedBlockComment {
                        line: self.start_position.line,
                        column: self.start_position.column,
                    })
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump_n(2);
                    return self.emit(TokenType::BlockComment);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Index of the next line start after the line break at `index`
    fn skip_line_break_at(&self, index: usize) -> Option<usize> {
        match (self.char_at(index), self.char_at(index + 1)) {
            (Some('\r'), Some('\n')) => Some(index + 2),
            (Some(c), _) if is_line_break(c) => Some(index + 1),
            _ => None,
        }
    }

    /// End (exclusive) of a quoted continuation section whose opening quote
    /// was just consumed. `Ok(None)` when the quote is not followed by a line
    /// break and a line starting with `(`.
    fn continuation_section_end(&self, quote: char) -> Result<Option<usize>, LexerError> {
        let Some(mut line) = self.skip_line_break_at(self.skip_horizontal_at(self.pos)) else {
            return Ok(None);
        };
        if self.char_at(self.skip_horizontal_at(line)) != Some('(') {
            return Ok(None);
        }

        loop {
            let mut index = line;
            while self.char_at(index).map_or(false, |c| !is_line_break(c)) {
                index += 1;
            }
            line = match self.skip_line_break_at(index) {
                Some(next) => next,
                None => break,
            };

            let first = self.skip_horizontal_at(line);
            if self.char_at(first) == Some(')') {
                let after = self.skip_horizontal_at(first + 1);
                if self.char_at(after) == Some(quote) {
                    return Ok(Some(after + 1));
                }
                break;
            }
        }

        Err(LexerError::UnterminatedString {
            line: self.start_position.line,
            column: self.start_position.column,
        })
    }

    fn check_string_size(&self) -> Result<(), LexerError> {
        let size = self.position.offset - self.start_position.offset;
        if size > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size,
                line: self.start_position.line,
                column: self.start_position.column,
            });
        }
        Ok(())
    }

    fn scan_string(&mut self, quote: char) -> Result<(), LexerError> {
        self.bump();
        if let Some(end) = self.continuation_section_end(quote)? {
            self.bump_n(end - self.pos);
            self.check_string_size()?;
            return self.emit(TokenType::MultilineStringLiteral);
        }

        loop {
            match self.peek() {
                None => break,
                Some(c) if is_line_break(c) => break,
                Some('`') => {
                    self.bump();
                    if self.peek().map_or(false, |c| !is_line_break(c)) {
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    self.check_string_size()?;
                    return self.emit(TokenType::StringLiteral);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        Err(LexerError::UnterminatedString {
            line: self.start_position.line,
            column: self.start_position.column,
        })
    }

    fn scan_number(&mut self) -> Result<(), LexerError> {
        if self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x') | Some('X'))
            && self.peek_at(2).map_or(false, |c| c.is_ascii_hexdigit())
        {
            self.bump_n(2);
            self.bump_while(|c| c.is_ascii_hexdigit());
            return self.emit(TokenType::HexIntegerLiteral);
        }

        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_at = match self.peek_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.peek_at(digits_at).map_or(false, |c| c.is_ascii_digit()) {
                self.bump_n(digits_at);
                self.bump_while(|c| c.is_ascii_digit());
            }
        }

        self.emit(TokenType::DecimalLiteral)
    }

    fn scan_word(&mut self) -> Result<(), LexerError> {
        self.bump_while(is_identifier_char);
        let length = self.pos - self.token_start;
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length,
                line: self.start_position.line,
                column: self.start_position.column,
            });
        }

        let word = self.text();
        let token_type = keyword_from_word(&word).unwrap_or(TokenType::Identifier);
        self.emit(token_type)
    }

    fn scan_operator(&mut self) -> Result<(), LexerError> {
        let matched = OPERATORS
            .iter()
            .find(|(text, _)| self.starts_with_at(self.pos, text));

        match matched {
            Some((text, token_type)) => {
                self.bump_n(text.chars().count());
                self.emit(*token_type)
            }
            None => {
                self.bump();
                self.emit(TokenType::UnexpectedCharacter)
            }
        }
    }
}

/// Tokenizer front end: size checks, metrics and logging around a scan
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexerPreferences,
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexerPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexerPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize a source string into every token, hidden ones included,
    /// ending with `EOF`
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        self.metrics = LexicalMetrics::default();

        if source.len() > MAX_SOURCE_LENGTH {
            let error = LexerError::SourceTooLarge { size: source.len() };
            log_error!(error.error_code(), "Source exceeds tokenizer limit",
                "size" => source.len(),
                "limit" => MAX_SOURCE_LENGTH
            );
            return Err(error);
        }

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let (tokens, state) = match Scanner::new(source).run() {
            Ok(result) => result,
            Err(error) => {
                self.log_lexer_error(&error);
                return Err(error);
            }
        };

        for token in &tokens {
            self.metrics.record_token(token, &self.preferences);
        }
        self.metrics.record_final_state(&state);

        if !state.is_clean() {
            log_warning!("Unterminated bracket or deref region at end of input",
                "code" => codes::lexical::UNTERMINATED_REGION,
                "bracket_depth" => state.bracket_depth,
                "deref_depth" => state.deref_depth
            );
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis completed",
            "total_tokens" => self.metrics.total_tokens,
            "hidden_tokens" => self.metrics.hidden_tokens,
            "max_bracket_depth" => self.metrics.max_bracket_depth
        );

        Ok(tokens)
    }

    /// Tokenize a loaded file into a parser-ready stream
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let tokens = self.tokenize(&file_result.source)?;
        Ok(TokenStream::new(tokens))
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    fn log_lexer_error(&self, error: &LexerError) {
        let message = if self.preferences.include_position_in_errors {
            error.to_string()
        } else {
            "Lexical analysis failed".to_string()
        };

        match error.location() {
            Some((line, column)) => {
                let position = Position::new(0, line, column);
                log_error!(error.error_code(), &message, span = Span::point(position));
            }
            None => log_error!(error.error_code(), &message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> Vec<Token> {
        LexicalAnalyzer::new().tokenize(source).unwrap()
    }

    fn visible_types(source: &str) -> Vec<TokenType> {
        lex(source)
            .into_iter()
            .filter(|t| !t.is_hidden())
            .map(|t| t.token_type)
            .collect()
    }

    fn types(source: &str) -> Vec<TokenType> {
        lex(source).into_iter().map(|t| t.token_type).collect()
    }

    fn round_trip(source: &str) -> String {
        lex(source).iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_round_trip_reproduces_source() {
        let sources = [
            "x := 1 +\n    2\n",
            "; header\r\nF1::Send(\"hi\")\r\n",
            "::btw::by the way ; note\n",
            "#Requires AutoHotkey v2.0\n/* block\n comment */\nMsgBox %name%\n",
            "arr := [1, 2,\n  3]\né := 'q`'s'\n",
        ];
        for source in sources {
            assert_eq!(round_trip(source), source);
        }
    }

    #[test]
    fn test_tokenizing_twice_is_identical() {
        let source = "Loop Parse, text {\n  x.=A_LoopField\n}\n";
        assert_eq!(lex(source), lex(source));
    }

    #[test]
    fn test_continuation_hides_newline_and_indent() {
        let tokens = lex("x := 1 +\n    2");
        let eol = tokens.iter().find(|t| t.token_type == TokenType::Eol).unwrap();
        assert!(eol.is_hidden());
        let indent = tokens.iter().find(|t| t.text == "    ").unwrap();
        assert!(indent.is_hidden());
    }

    #[test]
    fn test_newline_inside_brackets_becomes_whitespace() {
        let tokens = lex("f(a,\nb)\n");
        let break_token = tokens.iter().find(|t| t.text == "\n").unwrap();
        assert_eq!(break_token.token_type, TokenType::Ws);
        assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::Eof));
        assert_eq!(
            tokens.iter().filter(|t| t.token_type == TokenType::Eol).count(),
            1
        );
    }

    #[test]
    fn test_newline_after_open_brace_stays_visible() {
        let tokens = lex("if x {\n  y()\n}");
        let eol = tokens.iter().find(|t| t.token_type == TokenType::Eol).unwrap();
        assert!(!eol.is_hidden());
    }

    #[test]
    fn test_dot_decimal_disambiguation() {
        assert_eq!(
            visible_types("(.5)"),
            vec![
                TokenType::OpenParen,
                TokenType::DecimalLiteral,
                TokenType::CloseParen,
                TokenType::Eof
            ]
        );
        assert_eq!(
            visible_types("x.5"),
            vec![
                TokenType::Identifier,
                TokenType::Dot,
                TokenType::DecimalLiteral,
                TokenType::Eof
            ]
        );
        assert_eq!(lex(".5")[0].text, ".5");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(types("0x1F")[0], TokenType::HexIntegerLiteral);
        let tokens = lex("1.5e-3");
        assert_eq!(tokens[0].token_type, TokenType::DecimalLiteral);
        assert_eq!(tokens[0].text, "1.5e-3");
    }

    #[test]
    fn test_deref_boundaries() {
        let tokens = lex("x := %name%");
        let derefs: Vec<_> = tokens
            .iter()
            .filter(|t| t.text == "%")
            .map(|t| t.token_type)
            .collect();
        assert_eq!(derefs, vec![TokenType::DerefStart, TokenType::DerefEnd]);
    }

    #[test]
    fn test_hotkey_and_remap() {
        assert_eq!(
            visible_types("F1::F2"),
            vec![TokenType::HotkeyTrigger, TokenType::RemapKey, TokenType::Eof]
        );

        let hotkey = types("F1::Send(\"hi\")");
        assert_eq!(hotkey[0], TokenType::HotkeyTrigger);
        assert_eq!(hotkey[1], TokenType::Identifier);

        let tokens = lex("~LButton & RButton up::MsgBox()");
        assert_eq!(tokens[0].token_type, TokenType::HotkeyTrigger);
        assert_eq!(tokens[0].text, "~LButton & RButton up::");

        let tokens = lex("a:: ; comment\n");
        assert_eq!(tokens[0].text, "a::");
        assert_eq!(tokens[0].token_type, TokenType::HotkeyTrigger);
        assert!(tokens.iter().all(|t| t.token_type != TokenType::RemapKey));
    }

    #[test]
    fn test_hotkey_only_at_statement_start() {
        let types = visible_types("x := a ? b : c");
        assert!(!types.contains(&TokenType::HotkeyTrigger));
        let tokens = lex("x := 1\n  ^j::Run(\"notepad\")");
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::HotkeyTrigger && t.text == "^j::"));
    }

    #[test]
    fn test_literal_hotstring() {
        let tokens = lex("::btw::by the way ; note");
        assert_eq!(tokens[0].token_type, TokenType::HotstringTrigger);
        assert_eq!(tokens[0].text, "::btw::");
        assert_eq!(tokens[1].token_type, TokenType::HotstringExpansion);
        assert_eq!(tokens[1].text, "by the way");
        assert_eq!(tokens[3].token_type, TokenType::LineComment);
    }

    #[test]
    fn test_execute_hotstring_lexes_code() {
        let types = visible_types(":X:btw::MsgBox(\"x\")");
        assert_eq!(types[0], TokenType::HotstringTrigger);
        assert_eq!(types[1], TokenType::Identifier);
        assert!(!types.contains(&TokenType::HotstringExpansion));
    }

    #[test]
    fn test_hotstring_brace_counts_as_bracket() {
        let mut analyzer = LexicalAnalyzer::new();
        let tokens = analyzer.tokenize("::btw::{\n  Send(\"x\")\n}\n").unwrap();
        assert_eq!(tokens[1].token_type, TokenType::OpenBrace);
        let inner_break = tokens.iter().find(|t| t.text == "\n").unwrap();
        assert_eq!(inner_break.token_type, TokenType::Ws);
        assert!(analyzer.metrics().is_balanced());
    }

    #[test]
    fn test_hotstring_directive_sets_execute_mode() {
        let types = visible_types("#Hotstring X\n::btw::MsgBox()");
        assert_eq!(types[0], TokenType::Directive);
        assert!(types.contains(&TokenType::HotstringOptions));
        assert!(!types.contains(&TokenType::HotstringExpansion));
    }

    #[test]
    fn test_hotstring_end_chars_do_not_change_mode() {
        let types = types("#Hotstring EndChars x\n::btw::by the way");
        assert!(types.contains(&TokenType::EndChars));
        assert!(types.contains(&TokenType::HotstringExpansion));
    }

    #[test]
    fn test_directives() {
        let tokens = lex("#Include <Lib> ; comment\n#HotIf WinActive(\"x\")");
        assert_eq!(tokens[0].token_type, TokenType::Directive);
        assert_eq!(tokens[2].token_type, TokenType::DirectiveText);
        assert_eq!(tokens[2].text, "<Lib>");
        let hotif = tokens.iter().position(|t| t.text == "#HotIf").unwrap();
        assert_eq!(tokens[hotif + 2].token_type, TokenType::Identifier);
    }

    #[test]
    fn test_comments() {
        let tokens = lex("x := 1 ; trailing\n; full line");
        let comments: Vec<_> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::LineComment)
            .collect();
        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|t| t.is_hidden()));

        assert!(types("x;y").contains(&TokenType::UnexpectedCharacter));
        assert_eq!(types("/* a\n b */\nx")[0], TokenType::BlockComment);
    }

    #[test]
    fn test_keywords_and_operators() {
        assert_eq!(
            visible_types("if a and !b"),
            vec![
                TokenType::If,
                TokenType::Ws,
                TokenType::Identifier,
                TokenType::Ws,
                TokenType::VerbalAnd,
                TokenType::Ws,
                TokenType::Not,
                TokenType::Identifier,
                TokenType::Eof
            ]
        );
        assert_eq!(types("x>>>=1")[1], TokenType::RightShiftLogicalAssign);
        assert_eq!(types("a ?? b")[2], TokenType::NullCoalesce);
    }

    #[test]
    fn test_positions() {
        let tokens = lex("a\r\n  bc");
        let bc = tokens.iter().find(|t| t.text == "bc").unwrap();
        assert_eq!((bc.line, bc.column), (2, 3));
        assert_eq!(bc.start_index, 5);
        assert_eq!(bc.stop_index, 6);

        let eof = tokens.last().unwrap();
        assert_eq!(eof.start_index, 7);
        assert_eq!(eof.stop_index, 7);
    }

    #[test]
    fn test_residual_depth_is_reported() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("f(a, b").unwrap();
        assert_eq!(analyzer.metrics().final_bracket_depth, 1);

        analyzer.tokenize("x)").unwrap();
        assert_eq!(analyzer.metrics().final_bracket_depth, -1);

        analyzer.tokenize("x := %y").unwrap();
        assert_eq!(analyzer.metrics().final_deref_depth, 1);
        assert!(!analyzer.metrics().is_balanced());
    }

    #[test]
    fn test_balanced_input_returns_to_zero() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer
            .tokenize("x := [1, (2 + 3), {a: %b%}]\nif (x) {\n  y()\n}\n")
            .unwrap();
        assert!(analyzer.metrics().is_balanced());
        assert!(analyzer.metrics().max_bracket_depth >= 2);
    }

    #[test]
    fn test_continuation_section_string() {
        let source = "x := \"\n(\nline1\r\n  line2\n)\"\ny := 1\n";
        assert_eq!(round_trip(source), source);

        let tokens = lex(source);
        let string = tokens
            .iter()
            .find(|t| t.token_type == TokenType::MultilineStringLiteral)
            .unwrap();
        assert_eq!(string.text, "\"\n(\nline1\r\n  line2\n)\"");
        assert_eq!((string.line, string.column), (1, 6));

        let y = tokens.iter().find(|t| t.text == "y").unwrap();
        assert_eq!((y.line, y.column), (6, 1));
        assert_eq!(visible_types("s := '\n  (Join\n  a\n  )'")[3..], [
            TokenType::MultilineStringLiteral,
            TokenType::Eof
        ]);
    }

    #[test]
    fn test_continuation_section_needs_closing_line() {
        assert_matches!(
            LexicalAnalyzer::new().tokenize("x := \"\n(\nline1\n"),
            Err(LexerError::UnterminatedString { line: 1, column: 6 })
        );
        assert_matches!(
            LexicalAnalyzer::new().tokenize("x := \"\n(\nline1\n) y"),
            Err(LexerError::UnterminatedString { line: 1, column: 6 })
        );
    }

    #[test]
    fn test_lexer_errors() {
        assert_matches!(
            LexicalAnalyzer::new().tokenize("x := \"open\ny"),
            Err(LexerError::UnterminatedString { line: 1, column: 6 })
        );
        assert_matches!(
            LexicalAnalyzer::new().tokenize("/* never closed"),
            Err(LexerError::UnterminatedBlockComment { line: 1, column: 1 })
        );

        let long_name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_matches!(
            LexicalAnalyzer::new().tokenize(&long_name),
            Err(LexerError::IdentifierTooLong { .. })
        );
    }

    #[test]
    fn test_oversized_source_is_rejected() {
        let source = " ".repeat(MAX_SOURCE_LENGTH + 1);
        let error = LexicalAnalyzer::new().tokenize(&source).unwrap_err();
        assert_matches!(error, LexerError::SourceTooLarge { .. });
        assert_eq!(error.error_code(), codes::lexical::SOURCE_TOO_LARGE);
        assert!(error.location().is_none());
    }
}
