//! Token types for AutoHotkey v2 source
//!
//! Every character of the input lands in exactly one [`Token`]. Tokens are
//! immutable once emitted; the only reclassification (channel demotion, EOL to
//! WS, deref retyping) happens inside the lexer before a token is pushed.
use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical categories. Serialized names are a stable contract for tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    // === BRACKETS ===
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// `%` opening a dynamic reference
    DerefStart,
    /// `%` closing a dynamic reference
    DerefEnd,
    /// Raw `%` before the lexer decides which deref boundary it is
    Modulus,
    /// Raw `{` right after a hotstring trigger, retyped to `OpenBrace`
    HotstringOpenBrace,

    // === PUNCTUATION ===
    Comma,
    Colon,
    Dot,
    QuestionMark,
    QuestionMarkDot,
    /// `=>`
    Arrow,

    // === OPERATORS ===
    /// `:=`
    Assign,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Multiply,
    Divide,
    /// `//`
    IntegerDivide,
    /// `**`
    Power,
    /// `!`
    Not,
    /// `~`
    BitNot,
    BitAnd,
    BitXOr,
    BitOr,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    NullCoalesce,
    LeftShiftArithmetic,
    RightShiftArithmetic,
    /// `>>>`
    RightShiftLogical,
    LessThan,
    MoreThan,
    LessThanEquals,
    GreaterThanEquals,
    /// `=` (case-insensitive comparison)
    Equals,
    NotEquals,
    /// `==`
    IdentityEquals,
    /// `!==`
    IdentityNotEquals,
    /// `~=`
    RegExMatch,

    // === COMPOUND ASSIGNMENT ===
    MultiplyAssign,
    DivideAssign,
    PlusAssign,
    MinusAssign,
    IntegerDivideAssign,
    /// `.=`
    ConcatenateAssign,
    BitOrAssign,
    BitAndAssign,
    BitXorAssign,
    LeftShiftArithmeticAssign,
    RightShiftArithmeticAssign,
    RightShiftLogicalAssign,
    PowerAssign,
    /// `??=`
    NullishCoalescingAssign,

    // === KEYWORDS ===
    As,
    Break,
    Case,
    Catch,
    Class,
    Contains,
    Continue,
    Default,
    Else,
    Extends,
    False,
    Files,
    Finally,
    For,
    Get,
    Global,
    Goto,
    If,
    In,
    Is,
    Local,
    Loop,
    Parse,
    Read,
    Reg,
    Return,
    Set,
    Static,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Unset,
    Until,
    /// `and`
    VerbalAnd,
    /// `not`
    VerbalNot,
    /// `or`
    VerbalOr,
    While,

    // === LITERALS ===
    Identifier,
    StringLiteral,
    /// Quoted continuation section: `"` line break `(` ... `)` `"`
    MultilineStringLiteral,
    DecimalLiteral,
    HexIntegerLiteral,

    // === TRIVIA ===
    LineComment,
    BlockComment,
    #[serde(rename = "EOL")]
    Eol,
    #[serde(rename = "WS")]
    Ws,

    // === HOTKEYS, HOTSTRINGS, DIRECTIVES ===
    /// Key combination including the trailing `::`
    HotkeyTrigger,
    /// Single key after `::` that turns a hotkey into a remap
    RemapKey,
    /// Whole `:options:abbreviation::` prefix
    HotstringTrigger,
    /// Literal replacement text of a hotstring
    HotstringExpansion,
    /// Option text after `#Hotstring`
    HotstringOptions,
    /// `EndChars` keyword after `#Hotstring`
    EndChars,
    /// `#Name`
    Directive,
    /// Raw argument text of a directive
    DirectiveText,

    // === SPECIAL ===
    UnexpectedCharacter,
    #[serde(rename = "EOF")]
    Eof,
}

/// Operator types that keep a logical line open when they end a physical line
pub const LINE_CONTINUATION_OPERATORS: &[TokenType] = &[
    TokenType::OpenBracket,
    TokenType::OpenBrace,
    TokenType::OpenParen,
    TokenType::DerefStart,
    TokenType::Comma,
    TokenType::Assign,
    TokenType::QuestionMark,
    TokenType::QuestionMarkDot,
    TokenType::Plus,
    TokenType::Minus,
    TokenType::Divide,
    TokenType::IntegerDivide,
    TokenType::NullCoalesce,
    TokenType::RightShiftArithmetic,
    TokenType::LeftShiftArithmetic,
    TokenType::RightShiftLogical,
    TokenType::LessThan,
    TokenType::MoreThan,
    TokenType::LessThanEquals,
    TokenType::GreaterThanEquals,
    TokenType::Equals,
    TokenType::NotEquals,
    TokenType::IdentityEquals,
    TokenType::IdentityNotEquals,
    TokenType::RegExMatch,
    TokenType::BitAnd,
    TokenType::BitXOr,
    TokenType::BitOr,
    TokenType::And,
    TokenType::Or,
    TokenType::MultiplyAssign,
    TokenType::DivideAssign,
    TokenType::PlusAssign,
    TokenType::MinusAssign,
    TokenType::LeftShiftArithmeticAssign,
    TokenType::RightShiftArithmeticAssign,
    TokenType::RightShiftLogicalAssign,
    TokenType::IntegerDivideAssign,
    TokenType::ConcatenateAssign,
    TokenType::BitAndAssign,
    TokenType::BitXorAssign,
    TokenType::BitOrAssign,
    TokenType::PowerAssign,
    TokenType::NullishCoalescingAssign,
    TokenType::Arrow,
];

/// Coarse classification used by metrics and semantic highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Identifier,
    Literal,
    Operator,
    Punctuation,
    Trivia,
    Comment,
    Hotkey,
    Directive,
    Special,
}

impl TokenType {
    pub fn is_continuation_operator(self) -> bool {
        LINE_CONTINUATION_OPERATORS.contains(&self)
    }

    pub fn is_keyword(self) -> bool {
        use TokenType::*;
        matches!(
            self,
            As | Break
                | Case
                | Catch
                | Class
                | Contains
                | Continue
                | Default
                | Else
                | Extends
                | False
                | Files
                | Finally
                | For
                | Get
                | Global
                | Goto
                | If
                | In
                | Is
                | Local
                | Loop
                | Parse
                | Read
                | Reg
                | Return
                | Set
                | Static
                | Super
                | Switch
                | This
                | Throw
                | True
                | Try
                | Unset
                | Until
                | VerbalAnd
                | VerbalNot
                | VerbalOr
                | While
        )
    }

    /// Keywords that only mean something in one position and are otherwise
    /// ordinary names (`Loop Parse`, `get`/`set` in properties, `catch ... as`)
    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            TokenType::Parse
                | TokenType::Read
                | TokenType::Reg
                | TokenType::Files
                | TokenType::Get
                | TokenType::Set
                | TokenType::As
        )
    }

    /// `:=` and every compound assignment
    pub fn is_assignment_operator(self) -> bool {
        use TokenType::*;
        matches!(
            self,
            Assign
                | MultiplyAssign
                | DivideAssign
                | PlusAssign
                | MinusAssign
                | IntegerDivideAssign
                | ConcatenateAssign
                | BitOrAssign
                | BitAndAssign
                | BitXorAssign
                | LeftShiftArithmeticAssign
                | RightShiftArithmeticAssign
                | RightShiftLogicalAssign
                | PowerAssign
                | NullishCoalescingAssign
        )
    }

    /// Operators that can sit between two operands
    pub fn is_binary_operator(self) -> bool {
        use TokenType::*;
        matches!(
            self,
            Plus | Minus
                | Multiply
                | Divide
                | IntegerDivide
                | Power
                | BitAnd
                | BitXOr
                | BitOr
                | And
                | Or
                | NullCoalesce
                | LeftShiftArithmetic
                | RightShiftArithmetic
                | RightShiftLogical
                | LessThan
                | MoreThan
                | LessThanEquals
                | GreaterThanEquals
                | Equals
                | NotEquals
                | IdentityEquals
                | IdentityNotEquals
                | RegExMatch
                | Dot
                | QuestionMark
                | VerbalAnd
                | VerbalOr
                | Is
                | In
                | Contains
        )
    }

    pub fn is_open_group(self) -> bool {
        matches!(
            self,
            TokenType::OpenParen | TokenType::OpenBracket | TokenType::OpenBrace | TokenType::DerefStart
        )
    }

    pub fn is_close_group(self) -> bool {
        matches!(
            self,
            TokenType::CloseParen
                | TokenType::CloseBracket
                | TokenType::CloseBrace
                | TokenType::DerefEnd
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenType::LineComment | TokenType::BlockComment)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenType::StringLiteral
                | TokenType::MultilineStringLiteral
                | TokenType::DecimalLiteral
                | TokenType::HexIntegerLiteral
                | TokenType::True
                | TokenType::False
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, TokenType::StringLiteral | TokenType::MultilineStringLiteral)
    }

    pub fn token_class(self) -> TokenClass {
        use TokenType::*;
        match self {
            Identifier => TokenClass::Identifier,
            StringLiteral | MultilineStringLiteral | DecimalLiteral | HexIntegerLiteral => TokenClass::Literal,
            LineComment | BlockComment => TokenClass::Comment,
            Eol | Ws => TokenClass::Trivia,
            HotkeyTrigger | RemapKey | HotstringTrigger | HotstringExpansion => TokenClass::Hotkey,
            Directive | DirectiveText | HotstringOptions | EndChars => TokenClass::Directive,
            UnexpectedCharacter | Eof => TokenClass::Special,
            OpenBracket | CloseBracket | OpenParen | CloseParen | OpenBrace | CloseBrace
            | DerefStart | DerefEnd | Modulus | HotstringOpenBrace | Comma | Colon => {
                TokenClass::Punctuation
            }
            t if t.is_keyword() => TokenClass::Keyword,
            _ => TokenClass::Operator,
        }
    }

    /// Stable display name, identical to the serialized name
    pub fn as_str(self) -> &'static str {
        use TokenType::*;
        match self {
            OpenBracket => "OpenBracket",
            CloseBracket => "CloseBracket",
            OpenParen => "OpenParen",
            CloseParen => "CloseParen",
            OpenBrace => "OpenBrace",
            CloseBrace => "CloseBrace",
            DerefStart => "DerefStart",
            DerefEnd => "DerefEnd",
            Modulus => "Modulus",
            HotstringOpenBrace => "HotstringOpenBrace",
            Comma => "Comma",
            Colon => "Colon",
            Dot => "Dot",
            QuestionMark => "QuestionMark",
            QuestionMarkDot => "QuestionMarkDot",
            Arrow => "Arrow",
            Assign => "Assign",
            PlusPlus => "PlusPlus",
            MinusMinus => "MinusMinus",
            Plus => "Plus",
            Minus => "Minus",
            Multiply => "Multiply",
            Divide => "Divide",
            IntegerDivide => "IntegerDivide",
            Power => "Power",
            Not => "Not",
            BitNot => "BitNot",
            BitAnd => "BitAnd",
            BitXOr => "BitXOr",
            BitOr => "BitOr",
            And => "And",
            Or => "Or",
            NullCoalesce => "NullCoalesce",
            LeftShiftArithmetic => "LeftShiftArithmetic",
            RightShiftArithmetic => "RightShiftArithmetic",
            RightShiftLogical => "RightShiftLogical",
            LessThan => "LessThan",
            MoreThan => "MoreThan",
            LessThanEquals => "LessThanEquals",
            GreaterThanEquals => "GreaterThanEquals",
            Equals => "Equals",
            NotEquals => "NotEquals",
            IdentityEquals => "IdentityEquals",
            IdentityNotEquals => "IdentityNotEquals",
            RegExMatch => "RegExMatch",
            MultiplyAssign => "MultiplyAssign",
            DivideAssign => "DivideAssign",
            PlusAssign => "PlusAssign",
            MinusAssign => "MinusAssign",
            IntegerDivideAssign => "IntegerDivideAssign",
            ConcatenateAssign => "ConcatenateAssign",
            BitOrAssign => "BitOrAssign",
            BitAndAssign => "BitAndAssign",
            BitXorAssign => "BitXorAssign",
            LeftShiftArithmeticAssign => "LeftShiftArithmeticAssign",
            RightShiftArithmeticAssign => "RightShiftArithmeticAssign",
            RightShiftLogicalAssign => "RightShiftLogicalAssign",
            PowerAssign => "PowerAssign",
            NullishCoalescingAssign => "NullishCoalescingAssign",
            As => "As",
            Break => "Break",
            Case => "Case",
            Catch => "Catch",
            Class => "Class",
            Contains => "Contains",
            Continue => "Continue",
            Default => "Default",
            Else => "Else",
            Extends => "Extends",
            False => "False",
            Files => "Files",
            Finally => "Finally",
            For => "For",
            Get => "Get",
            Global => "Global",
            Goto => "Goto",
            If => "If",
            In => "In",
            Is => "Is",
            Local => "Local",
            Loop => "Loop",
            Parse => "Parse",
            Read => "Read",
            Reg => "Reg",
            Return => "Return",
            Set => "Set",
            Static => "Static",
            Super => "Super",
            Switch => "Switch",
            This => "This",
            Throw => "Throw",
            True => "True",
            Try => "Try",
            Unset => "Unset",
            Until => "Until",
            VerbalAnd => "VerbalAnd",
            VerbalNot => "VerbalNot",
            VerbalOr => "VerbalOr",
            While => "While",
            Identifier => "Identifier",
            StringLiteral => "StringLiteral",
            MultilineStringLiteral => "MultilineStringLiteral",
            DecimalLiteral => "DecimalLiteral",
            HexIntegerLiteral => "HexIntegerLiteral",
            LineComment => "LineComment",
            BlockComment => "BlockComment",
            Eol => "EOL",
            Ws => "WS",
            HotkeyTrigger => "HotkeyTrigger",
            RemapKey => "RemapKey",
            HotstringTrigger => "HotstringTrigger",
            HotstringExpansion => "HotstringExpansion",
            HotstringOptions => "HotstringOptions",
            EndChars => "EndChars",
            Directive => "Directive",
            DirectiveText => "DirectiveText",
            UnexpectedCharacter => "UnexpectedCharacter",
            Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive keyword lookup for a scanned word
pub fn keyword_from_word(word: &str) -> Option<TokenType> {
    use TokenType::*;
    let keyword = match word.to_ascii_lowercase().as_str() {
        "and" => VerbalAnd,
        "as" => As,
        "break" => Break,
        "case" => Case,
        "catch" => Catch,
        "class" => Class,
        "contains" => Contains,
        "continue" => Continue,
        "default" => Default,
        "else" => Else,
        "extends" => Extends,
        "false" => False,
        "files" => Files,
        "finally" => Finally,
        "for" => For,
        "get" => Get,
        "global" => Global,
        "goto" => Goto,
        "if" => If,
        "in" => In,
        "is" => Is,
        "local" => Local,
        "loop" => Loop,
        "not" => VerbalNot,
        "or" => VerbalOr,
        "parse" => Parse,
        "read" => Read,
        "reg" => Reg,
        "return" => Return,
        "set" => Set,
        "static" => Static,
        "super" => Super,
        "switch" => Switch,
        "this" => This,
        "throw" => Throw,
        "true" => True,
        "try" => Try,
        "unset" => Unset,
        "until" => Until,
        "while" => While,
        _ => return None,
    };
    Some(keyword)
}

/// Token output channel. The parser only sees `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    #[default]
    Default,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    pub channel: Channel,
    /// Byte offset of the first character
    pub start_index: usize,
    /// Byte offset of the last byte (inclusive); equals `start_index` for the empty EOF token
    pub stop_index: usize,
    /// 1-based line
    pub line: u32,
    /// 1-based character column
    pub column: u32,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        text: impl Into<String>,
        channel: Channel,
        start: Position,
    ) -> Self {
        let text = text.into();
        let stop_index = (start.offset + text.len())
            .saturating_sub(1)
            .max(start.offset);
        Self {
            token_type,
            text,
            channel,
            start_index: start.offset,
            stop_index,
            line: start.line,
            column: start.column,
        }
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.start_index, self.line, self.column)
    }

    pub fn span(&self) -> Span {
        let start = self.start_position();
        Span::new(start, start.advance_str(&self.text))
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// True for whitespace or end-of-line tokens whose text holds a line break
    pub fn contains_line_break(&self) -> bool {
        matches!(self.token_type, TokenType::Ws | TokenType::Eol)
            && self.text.contains(&['\n', '\r'][..])
    }

    /// `Identifier` or a contextual keyword standing in as a name
    pub fn is_name(&self) -> bool {
        self.token_type == TokenType::Identifier || self.token_type.is_contextual_keyword()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) at {}:{}",
            self.token_type, self.text, self.line, self.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(keyword_from_word("RETURN"), Some(TokenType::Return));
        assert_eq!(keyword_from_word("Loop"), Some(TokenType::Loop));
        assert_eq!(keyword_from_word("and"), Some(TokenType::VerbalAnd));
        assert_eq!(keyword_from_word("MsgBox"), None);
    }

    #[test]
    fn test_continuation_set_membership() {
        assert!(TokenType::Assign.is_continuation_operator());
        assert!(TokenType::Arrow.is_continuation_operator());
        assert!(TokenType::Comma.is_continuation_operator());
        assert!(!TokenType::CloseParen.is_continuation_operator());
        assert!(!TokenType::Multiply.is_continuation_operator());
        assert!(!TokenType::Identifier.is_continuation_operator());
    }

    #[test]
    fn test_serialized_names_match_display() {
        for token_type in [
            TokenType::Eol,
            TokenType::Ws,
            TokenType::Eof,
            TokenType::DerefStart,
            TokenType::MultilineStringLiteral,
        ] {
            let json = serde_json::to_string(&token_type).unwrap();
            assert_eq!(json, format!("\"{}\"", token_type.as_str()));
        }
    }

    #[test]
    fn test_token_indices() {
        let token = Token::new(TokenType::Identifier, "MsgBox", Channel::Default, Position::new(4, 2, 3));
        assert_eq!(token.start_index, 4);
        assert_eq!(token.stop_index, 9);
        assert_eq!(token.span().end.column, 9);

        let eof = Token::new(TokenType::Eof, "", Channel::Default, Position::new(10, 3, 1));
        assert_eq!(eof.stop_index, eof.start_index);
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(TokenType::While.token_class(), TokenClass::Keyword);
        assert_eq!(TokenType::Assign.token_class(), TokenClass::Operator);
        assert_eq!(TokenType::HotkeyTrigger.token_class(), TokenClass::Hotkey);
        assert_eq!(TokenType::DerefEnd.token_class(), TokenClass::Punctuation);
        assert_eq!(TokenType::MultilineStringLiteral.token_class(), TokenClass::Literal);
        assert!(TokenType::MultilineStringLiteral.is_string());
        assert!(!TokenType::DecimalLiteral.is_string());
    }
}
