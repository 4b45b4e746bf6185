//! Token classification rules and per-pass lexer state
//!
//! The scanner recognises raw lexemes; the hooks here decide the final type
//! and channel of each one and keep the mode state (bracket depth, deref
//! region, hotstring mode, beginning of statement) current. Hooks only see a
//! [`CharLookahead`] cursor and the state itself, so each can be exercised
//! without running the scanner.

use crate::tokens::{Channel, Token, TokenType};
use serde::{Deserialize, Serialize};

/// Character lookahead over the scanner input.
///
/// `la(1)` is the next unconsumed character and `la(-1)` the last consumed
/// one. Positions outside the input read as `None` (EOF).
pub trait CharLookahead {
    fn la(&self, i: isize) -> Option<char>;

    /// Char index where the current token starts
    fn token_start(&self) -> usize;

    /// Character immediately before the current token, if any
    fn char_before_token(&self) -> Option<char>;
}

/// Type and channel of an already emitted token. Held by value so the state
/// never aliases the token vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub token_type: TokenType,
    pub channel: Channel,
}

impl From<&Token> for TokenSnapshot {
    fn from(token: &Token) -> Self {
        Self {
            token_type: token.token_type,
            channel: token.channel,
        }
    }
}

/// Hooks invoked by the scanner at each token boundary
pub trait TokenRules {
    fn on_open_bracket(&mut self);
    fn on_close_bracket(&mut self);
    fn on_deref(&mut self, token_type: &mut TokenType);
    fn on_hotstring_open_brace(&mut self, token_type: &mut TokenType);
    fn on_end_of_line(&mut self, token_type: &mut TokenType, channel: &mut Channel);
    fn on_whitespace(&mut self, channel: &mut Channel);
    fn on_token_emitted(&mut self, token: &Token);

    fn is_beginning_of_statement(&self) -> bool;
    fn is_comment_possible(&self, cursor: &dyn CharLookahead) -> bool;
    fn is_valid_dot_decimal(&self) -> bool;
    fn is_valid_remap(&self, cursor: &dyn CharLookahead) -> bool;

    fn process_hotstring_options(&mut self, text: &str);
    fn is_hotstring_literal(&self, trigger_text: &str) -> bool;
}

/// Mutable mode state for one tokenization pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerState {
    /// Signed and never clamped; unmatched closes drive it negative
    pub bracket_depth: i32,
    /// 0 or 1, deref markers do not nest
    pub deref_depth: u8,
    pub hotstring_is_literal: bool,
    pub is_beginning_of_statement: bool,
    pub last_token: Option<TokenSnapshot>,
    pub last_visible_token: Option<TokenSnapshot>,
    /// Deepest bracket nesting seen during the pass
    pub max_bracket_depth: i32,
}

impl Default for LexerState {
    fn default() -> Self {
        Self {
            bracket_depth: 0,
            deref_depth: 0,
            hotstring_is_literal: true,
            is_beginning_of_statement: true,
            last_token: None,
            last_visible_token: None,
            max_bracket_depth: 0,
        }
    }
}

impl LexerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// EOF with no open bracket or deref region
    pub fn is_clean(&self) -> bool {
        self.bracket_depth == 0 && self.deref_depth == 0
    }

    fn last_visible_continues_line(&self) -> bool {
        self.last_visible_token
            .map(|t| t.token_type.is_continuation_operator())
            .unwrap_or(false)
    }
}

impl TokenRules for LexerState {
    fn on_open_bracket(&mut self) {
        self.bracket_depth += 1;
        self.max_bracket_depth = self.max_bracket_depth.max(self.bracket_depth);
    }

    fn on_close_bracket(&mut self) {
        self.bracket_depth -= 1;
    }

    fn on_deref(&mut self, token_type: &mut TokenType) {
        if self.deref_depth == 0 {
            self.deref_depth = 1;
            *token_type = TokenType::DerefStart;
            self.on_open_bracket();
        } else {
            self.deref_depth = 0;
            *token_type = TokenType::DerefEnd;
            self.on_close_bracket();
        }
    }

    fn on_hotstring_open_brace(&mut self, token_type: &mut TokenType) {
        *token_type = TokenType::OpenBrace;
        self.on_open_bracket();
    }

    fn on_end_of_line(&mut self, token_type: &mut TokenType, channel: &mut Channel) {
        if self.bracket_depth != 0 {
            *token_type = TokenType::Ws;
        }

        let Some(last_visible) = self.last_visible_token else {
            return;
        };

        // A brace at line end opens a block rather than continuing the line
        if last_visible.token_type != TokenType::OpenBrace
            && last_visible.token_type.is_continuation_operator()
        {
            *channel = Channel::Hidden;
        }
    }

    fn on_whitespace(&mut self, channel: &mut Channel) {
        if self.last_visible_continues_line() {
            *channel = Channel::Hidden;
        }
    }

    fn on_token_emitted(&mut self, token: &Token) {
        let snapshot = TokenSnapshot::from(token);

        if token.channel == Channel::Default {
            self.last_visible_token = Some(snapshot);
        }

        match token.token_type {
            TokenType::Eol => self.is_beginning_of_statement = true,
            TokenType::Ws => {}
            _ => self.is_beginning_of_statement = false,
        }

        self.last_token = Some(snapshot);
    }

    fn is_beginning_of_statement(&self) -> bool {
        self.is_beginning_of_statement
    }

    fn is_comment_possible(&self, cursor: &dyn CharLookahead) -> bool {
        if cursor.token_start() == 0 {
            return true;
        }
        match cursor.char_before_token() {
            Some(prev) => prev.is_whitespace(),
            None => false,
        }
    }

    fn is_valid_dot_decimal(&self) -> bool {
        match self.last_token {
            None => true,
            Some(last) if last.channel != Channel::Default => true,
            Some(_) => self.last_visible_continues_line(),
        }
    }

    fn is_valid_remap(&self, cursor: &dyn CharLookahead) -> bool {
        if cursor.la(-1) == Some('{') && cursor.la(-2) != Some('`') {
            return false;
        }

        let mut i: isize = 0;
        loop {
            i += 1;
            match cursor.la(i) {
                None | Some('\n') | Some('\r') => return true,
                Some(' ') | Some('\t') | Some('\u{2028}') | Some('\u{2029}') => continue,
                Some(';') => return i != 1,
                Some('/') => return cursor.la(i + 1) == Some('*'),
                Some(_) => return false,
            }
        }
    }

    fn process_hotstring_options(&mut self, text: &str) {
        if self.last_token.map(|t| t.token_type) == Some(TokenType::EndChars) {
            return;
        }
        match hotstring_option_scan(text) {
            HotstringMode::NotSeen => {}
            mode => self.hotstring_is_literal = mode == HotstringMode::Literal,
        }
    }

    fn is_hotstring_literal(&self, trigger_text: &str) -> bool {
        let options = trigger_text.get(1..).unwrap_or("");
        match hotstring_option_scan(options) {
            HotstringMode::NotSeen => self.hotstring_is_literal,
            mode => mode == HotstringMode::Literal,
        }
    }
}

/// Result of scanning hotstring options for the `X` execute flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotstringMode {
    NotSeen,
    /// `X0`
    Literal,
    Execute,
}

impl HotstringMode {
    /// Numeric form: -1 not seen, 0 literal, 1 execute
    pub fn as_i8(self) -> i8 {
        match self {
            HotstringMode::NotSeen => -1,
            HotstringMode::Literal => 0,
            HotstringMode::Execute => 1,
        }
    }
}

/// Scan option text up to the first `:`, `;` or `/`. The last `x`/`X` wins;
/// it means execute unless directly followed by `0`.
pub fn hotstring_option_scan(text: &str) -> HotstringMode {
    let mut mode = HotstringMode::NotSeen;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' | ';' | '/' => break,
            'x' | 'X' => {
                mode = match chars.peek() {
                    Some('0') => HotstringMode::Literal,
                    _ => HotstringMode::Execute,
                };
            }
            _ => {}
        }
    }

    mode
}
