//! Expression grammar
//!
//! Precedence climbing from assignment (lowest, right-associative) down to
//! postfix member access and calls. Whitespace decides three things here:
//! `a.b` is member access while `a . b` concatenates, `f(x)` is a call only
//! with no gap before the paren, and two operands separated by a gap are an
//! implicit concatenation.

use super::error::{SyntaxError, SyntaxResult};
use super::parser::{continuation_section_text, unquote, AhkParser};
use crate::ast::*;
use crate::tokens::{Position, Token, TokenLookahead, TokenType};

type OperandParser = fn(&mut AhkParser) -> SyntaxResult<Expression>;

impl AhkParser {
    /// Single expression, no top-level commas
    pub fn parse_expression(&mut self) -> SyntaxResult<Expression> {
        self.parse_assignment()
    }

    /// `a, b, c` as a [`Expression::Sequence`]; a lone expression is returned as is
    pub(super) fn parse_expression_list(&mut self) -> SyntaxResult<Expression> {
        let first = self.parse_expression()?;
        if self.peek_infix().0 != TokenType::Comma {
            return Ok(first);
        }

        let mut expressions = vec![first];
        loop {
            let (next, at, _) = self.peek_infix();
            if next != TokenType::Comma {
                break;
            }
            self.consume_infix(at);
            self.skip_ws();
            expressions.push(self.parse_expression()?);
        }

        let span = match (expressions.first(), expressions.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => self.span_from(self.current().start_position()),
        };
        Ok(Expression::Sequence { expressions, span })
    }

    // === INFIX LOOKAHEAD ===

    /// Next token in operator position: skips whitespace on the same logical
    /// line (any whitespace inside a group). Returns its type, its `LA`
    /// index and whether a gap preceded it.
    pub(super) fn peek_infix(&self) -> (TokenType, isize, bool) {
        let mut i: isize = 1;
        while let Some(token) = self.tokens.lt(i) {
            if token.token_type != TokenType::Ws
                || (self.group_depth == 0 && token.contains_line_break())
            {
                break;
            }
            i += 1;
        }
        (self.la(i), i, i > 1)
    }

    /// Consume the gap and the operator found by [`Self::peek_infix`]
    pub(super) fn consume_infix(&mut self, at: isize) -> Token {
        for _ in 1..at {
            self.tokens.advance();
        }
        self.bump()
    }

    fn token_at(&self, at: isize) -> Token {
        self.tokens.lt(at).cloned().unwrap_or_else(|| self.current().clone())
    }

    /// Type of the first non-whitespace token after `LA(at)`
    fn type_after(&self, at: isize) -> TokenType {
        let mut i = at + 1;
        while self.la(i) == TokenType::Ws {
            i += 1;
        }
        self.la(i)
    }

    fn in_group<T>(&mut self, f: impl FnOnce(&mut Self) -> SyntaxResult<T>) -> SyntaxResult<T> {
        self.group_depth += 1;
        let result = f(self);
        self.group_depth -= 1;
        result
    }

    // === PRECEDENCE LEVELS ===

    fn parse_assignment(&mut self) -> SyntaxResult<Expression> {
        let target = self.parse_ternary()?;
        let (next, at, _) = self.peek_infix();
        let Some(operator) = assignment_operator(next) else {
            return Ok(target);
        };

        if !target.is_assignable() {
            return Err(SyntaxError::parse_error(
                "Invalid assignment target",
                &self.token_at(at),
            ));
        }

        self.consume_infix(at);
        self.skip_ws();
        let value = self.parse_assignment()?;
        Ok(Expression::Assignment {
            span: target.span().merge(value.span()),
            operator,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn parse_ternary(&mut self) -> SyntaxResult<Expression> {
        let condition = self.parse_binary(Self::parse_or, |t| {
            (t == TokenType::NullCoalesce).then_some(BinaryOperator::NullCoalesce)
        })?;

        let (next, at, _) = self.peek_infix();
        if next != TokenType::QuestionMark {
            return Ok(condition);
        }

        // `name?` marks an unset-able argument, not a ternary
        if matches!(
            self.type_after(at),
            TokenType::CloseParen | TokenType::CloseBracket | TokenType::Comma | TokenType::Eof
        ) {
            self.consume_infix(at);
            return Ok(condition);
        }

        self.consume_infix(at);
        self.skip_ws();
        let consequent = self.parse_assignment()?;

        let (next, at, _) = self.peek_infix();
        if next != TokenType::Colon {
            return Err(SyntaxError::unexpected("':' in ternary", &self.token_at(at)));
        }
        self.consume_infix(at);
        self.skip_ws();
        let alternate = self.parse_assignment()?;

        Ok(Expression::Ternary {
            span: condition.span().merge(alternate.span()),
            condition: Box::new(condition),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_or(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_and, |t| {
            matches!(t, TokenType::Or | TokenType::VerbalOr).then_some(BinaryOperator::Or)
        })
    }

    fn parse_and(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_not, |t| {
            matches!(t, TokenType::And | TokenType::VerbalAnd).then_some(BinaryOperator::And)
        })
    }

    /// Verbal `not`, which binds looser than comparisons
    fn parse_not(&mut self) -> SyntaxResult<Expression> {
        self.skip_ws();
        if !self.at(TokenType::VerbalNot) {
            return self.parse_type_test();
        }

        let keyword = self.bump();
        self.skip_ws();
        let operand = self.nested(|p| p.parse_not())?;
        Ok(Expression::Unary {
            span: self.span_from(keyword.start_position()),
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
        })
    }

    fn parse_type_test(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_comparison, |t| match t {
            TokenType::Is => Some(BinaryOperator::Is),
            TokenType::In => Some(BinaryOperator::In),
            TokenType::Contains => Some(BinaryOperator::Contains),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_regex_match, |t| match t {
            TokenType::Equals => Some(BinaryOperator::Equal),
            TokenType::NotEquals => Some(BinaryOperator::NotEqual),
            TokenType::IdentityEquals => Some(BinaryOperator::IdentityEqual),
            TokenType::IdentityNotEquals => Some(BinaryOperator::IdentityNotEqual),
            TokenType::LessThan => Some(BinaryOperator::Less),
            TokenType::MoreThan => Some(BinaryOperator::Greater),
            TokenType::LessThanEquals => Some(BinaryOperator::LessEqual),
            TokenType::GreaterThanEquals => Some(BinaryOperator::GreaterEqual),
            _ => None,
        })
    }

    fn parse_regex_match(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_bit_or, |t| {
            (t == TokenType::RegExMatch).then_some(BinaryOperator::RegexMatch)
        })
    }

    fn parse_bit_or(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_bit_xor, |t| {
            (t == TokenType::BitOr).then_some(BinaryOperator::BitOr)
        })
    }

    fn parse_bit_xor(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_bit_and, |t| {
            (t == TokenType::BitXOr).then_some(BinaryOperator::BitXor)
        })
    }

    fn parse_bit_and(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_shift, |t| {
            (t == TokenType::BitAnd).then_some(BinaryOperator::BitAnd)
        })
    }

    fn parse_shift(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_concat, |t| match t {
            TokenType::LeftShiftArithmetic => Some(BinaryOperator::ShiftLeft),
            TokenType::RightShiftArithmetic => Some(BinaryOperator::ShiftRight),
            TokenType::RightShiftLogical => Some(BinaryOperator::ShiftRightLogical),
            _ => None,
        })
    }

    /// Explicit ` . ` and implicit (juxtaposed operands) concatenation
    fn parse_concat(&mut self) -> SyntaxResult<Expression> {
        let mut left = self.parse_additive()?;
        loop {
            let (next, at, had_gap) = self.peek_infix();
            if !had_gap {
                break;
            }
            if next == TokenType::Dot {
                self.consume_infix(at);
                self.skip_ws();
            } else if self.starts_operand(at) {
                for _ in 1..at {
                    self.tokens.advance();
                }
            } else {
                break;
            }

            let right = self.parse_additive()?;
            left = binary(BinaryOperator::Concat, left, right);
        }
        Ok(left)
    }

    fn starts_operand(&self, at: isize) -> bool {
        let Some(token) = self.tokens.lt(at) else {
            return false;
        };
        token.is_name()
            || matches!(
                token.token_type,
                TokenType::Identifier
                    | TokenType::This
                    | TokenType::Super
                    | TokenType::StringLiteral
                    | TokenType::MultilineStringLiteral
                    | TokenType::DecimalLiteral
                    | TokenType::HexIntegerLiteral
                    | TokenType::True
                    | TokenType::False
                    | TokenType::OpenParen
                    | TokenType::DerefStart
            )
    }

    fn parse_additive(&mut self) -> SyntaxResult<Expression> {
        self.parse_binary(Self::parse_multiplicative, |t| match t {
            TokenType::Plus => Some(BinaryOperator::Add),
            TokenType::Minus => Some(BinaryOperator::Subtract),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> SyntaxResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let (next, at, _) = self.peek_infix();
            let operator = match next {
                // `args*` spreads a call argument
                TokenType::Multiply
                    if matches!(
                        self.type_after(at),
                        TokenType::CloseParen | TokenType::CloseBracket | TokenType::Comma
                    ) =>
                {
                    break
                }
                TokenType::Multiply => BinaryOperator::Multiply,
                TokenType::Divide => BinaryOperator::Divide,
                TokenType::IntegerDivide => BinaryOperator::IntegerDivide,
                _ => break,
            };
            self.consume_infix(at);
            self.skip_ws();
            let right = self.parse_unary()?;
            left = binary(operator, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> SyntaxResult<Expression> {
        self.nested(|p| {
            p.skip_ws();
            let operator = match p.current_type() {
                TokenType::Minus => UnaryOperator::Negate,
                TokenType::Plus => UnaryOperator::Plus,
                TokenType::Not => UnaryOperator::Not,
                TokenType::BitNot => UnaryOperator::BitNot,
                TokenType::PlusPlus => UnaryOperator::PreIncrement,
                TokenType::MinusMinus => UnaryOperator::PreDecrement,
                TokenType::BitAnd => UnaryOperator::Reference,
                _ => return p.parse_power(),
            };

            let start = p.bump().start_position();
            let operand = p.parse_unary()?;
            Ok(Expression::Unary {
                span: p.span_from(start),
                operator,
                operand: Box::new(operand),
            })
        })
    }

    /// `**` binds tighter than unary minus and is right-associative
    fn parse_power(&mut self) -> SyntaxResult<Expression> {
        let base = self.parse_postfix()?;
        let (next, at, _) = self.peek_infix();
        if next != TokenType::Power {
            return Ok(base);
        }
        self.consume_infix(at);
        self.skip_ws();
        let exponent = self.parse_unary()?;
        Ok(binary(BinaryOperator::Power, base, exponent))
    }

    fn parse_binary(
        &mut self,
        operand: OperandParser,
        operator_for: fn(TokenType) -> Option<BinaryOperator>,
    ) -> SyntaxResult<Expression> {
        let mut left = operand(self)?;
        loop {
            let (next, at, _) = self.peek_infix();
            let Some(operator) = operator_for(next) else {
                break;
            };
            self.consume_infix(at);
            self.skip_ws();
            let right = operand(self)?;
            left = binary(operator, left, right);
        }
        Ok(left)
    }

    // === POSTFIX AND PRIMARY ===

    /// Primary followed by calls, indexing, member access and `++`/`--`.
    /// None of these may be separated from the operand by whitespace.
    pub(super) fn parse_postfix(&mut self) -> SyntaxResult<Expression> {
        let start = self.current().start_position();
        let mut expression = self.parse_primary()?;

        loop {
            expression = match self.current_type() {
                TokenType::OpenParen => {
                    self.bump();
                    let arguments = self.in_group(|p| p.parse_arguments(TokenType::CloseParen))?;
                    self.expect(TokenType::CloseParen, "')'")?;
                    Expression::Call {
                        callee: Box::new(expression),
                        arguments,
                        span: self.span_from(start),
                    }
                }
                TokenType::OpenBracket => {
                    self.bump();
                    let indices = self.in_group(|p| p.parse_arguments(TokenType::CloseBracket))?;
                    self.expect(TokenType::CloseBracket, "']'")?;
                    Expression::Index {
                        object: Box::new(expression),
                        indices,
                        span: self.span_from(start),
                    }
                }
                TokenType::Dot | TokenType::QuestionMarkDot => {
                    let optional = self.bump().token_type == TokenType::QuestionMarkDot;
                    if self.at(TokenType::DerefStart) {
                        let property = self.parse_deref()?;
                        Expression::DynamicMember {
                            object: Box::new(expression),
                            property: Box::new(property),
                            span: self.span_from(start),
                        }
                    } else {
                        let name = self.current();
                        if !(name.is_name() || name.token_type.is_keyword()) {
                            return Err(SyntaxError::unexpected("member name", name));
                        }
                        let property = self.bump().text;
                        Expression::Member {
                            object: Box::new(expression),
                            property,
                            optional,
                            span: self.span_from(start),
                        }
                    }
                }
                TokenType::PlusPlus | TokenType::MinusMinus => {
                    let operator = match self.bump().token_type {
                        TokenType::PlusPlus => PostfixOperator::Increment,
                        _ => PostfixOperator::Decrement,
                    };
                    Expression::Postfix {
                        operator,
                        operand: Box::new(expression),
                        span: self.span_from(start),
                    }
                }
                _ => break,
            };
        }

        Ok(expression)
    }

    /// Comma-separated items up to `close`; empty slots are skipped and a
    /// trailing `*` marks a spread argument
    fn parse_arguments(&mut self, close: TokenType) -> SyntaxResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        self.skip_ws();

        while !self.at(close) {
            if self.at(TokenType::Comma) {
                self.bump();
                self.skip_ws();
                continue;
            }

            arguments.push(self.parse_expression()?);
            self.skip_ws();
            if self.at(TokenType::Multiply) {
                self.bump();
                self.skip_ws();
            }
            if !self.at(TokenType::Comma) {
                break;
            }
            self.bump();
            self.skip_ws();
        }

        Ok(arguments)
    }

    fn parse_primary(&mut self) -> SyntaxResult<Expression> {
        let token = self.current().clone();
        let span = token.span();

        match token.token_type {
            TokenType::Identifier if self.arrow_follows_name() => self.parse_single_param_arrow(),
            TokenType::This | TokenType::Super | TokenType::Unset => {
                self.bump();
                Ok(Expression::Identifier {
                    name: token.text,
                    span,
                })
            }
            _ if token.is_name() => {
                self.bump();
                let start = token.start_position();
                let name = Expression::Identifier {
                    name: token.text,
                    span,
                };
                self.continue_dynamic_name(name, start)
            }
            TokenType::DecimalLiteral => {
                self.bump();
                let value = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| SyntaxError::parse_error("Invalid number literal", &token))?;
                Ok(Expression::Number {
                    value,
                    raw: token.text,
                    span,
                })
            }
            TokenType::HexIntegerLiteral => {
                self.bump();
                let digits = token.text.get(2..).unwrap_or_default();
                let value = i64::from_str_radix(digits, 16)
                    .map_err(|_| SyntaxError::parse_error("Invalid hexadecimal literal", &token))?;
                Ok(Expression::Number {
                    value: value as f64,
                    raw: token.text,
                    span,
                })
            }
            TokenType::StringLiteral => {
                self.bump();
                Ok(Expression::String {
                    value: unquote(&token.text),
                    span,
                })
            }
            TokenType::MultilineStringLiteral => {
                self.bump();
                Ok(Expression::String {
                    value: continuation_section_text(&token.text),
                    span,
                })
            }
            TokenType::True | TokenType::False => {
                self.bump();
                Ok(Expression::Boolean {
                    value: token.token_type == TokenType::True,
                    span,
                })
            }
            TokenType::OpenParen if self.fat_arrow_ahead() => self.parse_fat_arrow(),
            TokenType::OpenParen => {
                self.bump();
                let inner = self.in_group(|p| {
                    p.skip_ws();
                    let inner = p.parse_expression_list()?;
                    p.skip_ws();
                    Ok(inner)
                })?;
                self.expect(TokenType::CloseParen, "')'")?;
                Ok(inner)
            }
            TokenType::OpenBracket => {
                self.bump();
                let elements = self.in_group(|p| p.parse_arguments(TokenType::CloseBracket))?;
                self.expect(TokenType::CloseBracket, "']'")?;
                Ok(Expression::Array {
                    elements,
                    span: self.span_from(token.start_position()),
                })
            }
            TokenType::OpenBrace => self.parse_object_literal(),
            TokenType::DerefStart => {
                let deref = self.parse_deref()?;
                self.continue_dynamic_name(deref, token.start_position())
            }
            _ => Err(SyntaxError::unexpected("expression", &token)),
        }
    }

    /// Whitespace is a token on the default channel, so a `%` or name seen
    /// here touches the previous piece.
    fn continue_dynamic_name(&mut self, first: Expression, start: Position) -> SyntaxResult<Expression> {
        let mut parts = vec![first];
        loop {
            if self.at(TokenType::DerefStart) {
                parts.push(self.parse_deref()?);
            } else if matches!(parts.last(), Some(Expression::Deref { .. })) && self.current().is_name() {
                let piece = self.bump();
                parts.push(Expression::Identifier {
                    span: piece.span(),
                    name: piece.text,
                });
            } else {
                break;
            }
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(Expression::DynamicIdentifier {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_deref(&mut self) -> SyntaxResult<Expression> {
        let open = self.bump();
        let expression = self.in_group(|p| {
            p.skip_ws();
            let inner = p.parse_expression()?;
            p.skip_ws();
            Ok(inner)
        })?;
        self.expect(TokenType::DerefEnd, "closing '%'")?;
        Ok(Expression::Deref {
            expression: Box::new(expression),
            span: self.span_from(open.start_position()),
        })
    }

    /// `{key: value, ...}`; keys are names, strings or numbers
    fn parse_object_literal(&mut self) -> SyntaxResult<Expression> {
        let open = self.bump();
        let properties = self.in_group(|p| {
            let mut properties = Vec::new();
            p.skip_newlines();
            while !p.at(TokenType::CloseBrace) {
                let key_token = p.current().clone();
                let key = match key_token.token_type {
                    TokenType::StringLiteral => unquote(&key_token.text),
                    TokenType::DecimalLiteral | TokenType::HexIntegerLiteral => key_token.text.clone(),
                    t if key_token.is_name() || t.is_keyword() => key_token.text.clone(),
                    TokenType::Eof => return Err(SyntaxError::unmatched_delimiter("{", &open)),
                    _ => return Err(SyntaxError::unexpected("property name", &key_token)),
                };
                p.bump();
                p.skip_ws();
                p.expect(TokenType::Colon, "':'")?;
                p.skip_newlines();
                let value = p.parse_expression()?;
                properties.push(ObjectProperty {
                    key,
                    value,
                    span: p.span_from(key_token.start_position()),
                });

                p.skip_newlines();
                if !p.at(TokenType::Comma) {
                    break;
                }
                p.bump();
                p.skip_newlines();
            }
            Ok(properties)
        })?;

        if !self.at(TokenType::CloseBrace) {
            return Err(SyntaxError::unexpected("'}'", self.current()));
        }
        self.bump();
        Ok(Expression::Object {
            properties,
            span: self.span_from(open.start_position()),
        })
    }

    // === FAT ARROW FUNCTIONS ===

    fn arrow_follows_name(&self) -> bool {
        self.type_after(1) == TokenType::Arrow
    }

    /// `(params) =>` starting at the current `(`
    fn fat_arrow_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut i: isize = 1;
        loop {
            match self.la(i) {
                TokenType::OpenParen => depth += 1,
                TokenType::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.type_after(i) == TokenType::Arrow;
                    }
                }
                TokenType::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_single_param_arrow(&mut self) -> SyntaxResult<Expression> {
        let name = self.bump();
        let param = Parameter {
            name: name.text.clone(),
            by_ref: false,
            variadic: false,
            optional: false,
            default: None,
            span: name.span(),
        };
        self.finish_fat_arrow(vec![param], name.start_position())
    }

    fn parse_fat_arrow(&mut self) -> SyntaxResult<Expression> {
        let open = self.bump();
        let params = self.parse_parameters(TokenType::CloseParen)?;
        self.expect(TokenType::CloseParen, "')'")?;
        self.finish_fat_arrow(params, open.start_position())
    }

    fn finish_fat_arrow(
        &mut self,
        params: Vec<Parameter>,
        start: crate::tokens::Position,
    ) -> SyntaxResult<Expression> {
        self.skip_ws();
        self.expect(TokenType::Arrow, "'=>'")?;
        self.skip_ws();
        let body = self.parse_assignment()?;
        Ok(Expression::FatArrow {
            params,
            body: Box::new(body),
            span: self.span_from(start),
        })
    }
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        span: left.span().merge(right.span()),
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn assignment_operator(token_type: TokenType) -> Option<AssignmentOperator> {
    let operator = match token_type {
        TokenType::Assign => AssignmentOperator::Assign,
        TokenType::PlusAssign => AssignmentOperator::Add,
        TokenType::MinusAssign => AssignmentOperator::Subtract,
        TokenType::MultiplyAssign => AssignmentOperator::Multiply,
        TokenType::DivideAssign => AssignmentOperator::Divide,
        TokenType::IntegerDivideAssign => AssignmentOperator::IntegerDivide,
        TokenType::ConcatenateAssign => AssignmentOperator::Concat,
        TokenType::BitOrAssign => AssignmentOperator::BitOr,
        TokenType::BitAndAssign => AssignmentOperator::BitAnd,
        TokenType::BitXorAssign => AssignmentOperator::BitXor,
        TokenType::LeftShiftArithmeticAssign => AssignmentOperator::ShiftLeft,
        TokenType::RightShiftArithmeticAssign => AssignmentOperator::ShiftRight,
        TokenType::RightShiftLogicalAssign => AssignmentOperator::ShiftRightLogical,
        TokenType::PowerAssign => AssignmentOperator::Power,
        TokenType::NullishCoalescingAssign => AssignmentOperator::NullCoalesce,
        _ => return None,
    };
    Some(operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::TokenStream;
    use assert_matches::assert_matches;

    fn expr(source: &str) -> Expression {
        let tokens = tokenize(source).unwrap();
        let mut parser = AhkParser::new(TokenStream::new(tokens));
        parser.parse_expression_list().unwrap()
    }

    fn operator_of(expression: &Expression) -> Option<BinaryOperator> {
        match expression {
            Expression::Binary { operator, .. } => Some(*operator),
            _ => None,
        }
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary { operator, right, .. } = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(operator, BinaryOperator::Add);
        assert_eq!(operator_of(&right), Some(BinaryOperator::Multiply));

        let Expression::Binary { operator, left, .. } = expr("a = 1 || b") else {
            panic!("expected binary");
        };
        assert_eq!(operator, BinaryOperator::Or);
        assert_eq!(operator_of(&left), Some(BinaryOperator::Equal));
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        assert_matches!(
            expr("-2 ** 2"),
            Expression::Unary { operator: UnaryOperator::Negate, ref operand, .. }
                if operator_of(operand) == Some(BinaryOperator::Power)
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let Expression::Assignment { value, .. } = expr("a := b := 1") else {
            panic!("expected assignment");
        };
        assert_matches!(*value, Expression::Assignment { .. });
    }

    #[test]
    fn test_concatenation_forms() {
        assert_eq!(operator_of(&expr("a . b")), Some(BinaryOperator::Concat));
        assert_eq!(operator_of(&expr("\"x\" name")), Some(BinaryOperator::Concat));
        assert_matches!(expr("a.b"), Expression::Member { ref property, .. } if property == "b");
    }

    #[test]
    fn test_ternary_and_coalesce() {
        assert_matches!(expr("x ? 1 : 2"), Expression::Ternary { .. });
        assert_eq!(operator_of(&expr("a ?? b")), Some(BinaryOperator::NullCoalesce));
    }

    #[test]
    fn test_verbal_operators() {
        assert_matches!(
            expr("not a and b"),
            Expression::Binary { operator: BinaryOperator::And, ref left, .. }
                if matches!(**left, Expression::Unary { operator: UnaryOperator::Not, .. })
        );
        assert_eq!(operator_of(&expr("x is Integer")), Some(BinaryOperator::Is));
    }

    #[test]
    fn test_calls_members_and_indexing() {
        assert_matches!(
            expr("obj.items[1].Name(x, y)"),
            Expression::Call { ref callee, ref arguments, .. }
                if arguments.len() == 2 && matches!(**callee, Expression::Member { .. })
        );
        assert_matches!(expr("obj?.name"), Expression::Member { optional: true, .. });
        assert_matches!(expr("obj.%key%"), Expression::DynamicMember { .. });
        assert_matches!(expr("Join(parts*)"), Expression::Call { ref arguments, .. } if arguments.len() == 1);
    }

    #[test]
    fn test_literals() {
        assert_matches!(expr("0x1F"), Expression::Number { value, .. } if value == 31.0);
        assert_matches!(expr("1.5"), Expression::Number { value, .. } if value == 1.5);
        assert_matches!(expr("'it'"), Expression::String { ref value, .. } if value == "it");
        assert_matches!(expr("true"), Expression::Boolean { value: true, .. });
        assert_matches!(expr("[1, 2, 3]"), Expression::Array { ref elements, .. } if elements.len() == 3);
        assert_matches!(
            expr("{name: \"x\", \"key\": 2}"),
            Expression::Object { ref properties, .. } if properties.len() == 2 && properties[1].key == "key"
        );
    }

    #[test]
    fn test_deref_and_reference() {
        assert_matches!(expr("%name%"), Expression::Deref { .. });
        assert_matches!(
            expr("var%n%"),
            Expression::DynamicIdentifier { ref parts, .. }
                if parts.len() == 2 && parts[0].identifier_name() == Some("var")
        );
        assert_matches!(
            expr("%a%%b%"),
            Expression::DynamicIdentifier { ref parts, .. }
                if parts.len() == 2 && parts.iter().all(|p| matches!(p, Expression::Deref { .. }))
        );
        assert_matches!(
            expr("%prefix%_name"),
            Expression::DynamicIdentifier { ref parts, .. } if parts[1].identifier_name() == Some("_name")
        );
        assert_matches!(expr("a %b%"), Expression::Binary { operator: BinaryOperator::Concat, .. });
        assert_matches!(expr("&out"), Expression::Unary { operator: UnaryOperator::Reference, .. });
    }

    #[test]
    fn test_fat_arrows() {
        assert_matches!(
            expr("(a, b) => a + b"),
            Expression::FatArrow { ref params, .. } if params.len() == 2
        );
        assert_matches!(expr("x => x * 2"), Expression::FatArrow { ref params, .. } if params.len() == 1);
        assert_matches!(expr("(*) => 0"), Expression::FatArrow { ref params, .. } if params[0].variadic);
    }

    #[test]
    fn test_postfix_and_sequence() {
        assert_matches!(expr("i++"), Expression::Postfix { operator: PostfixOperator::Increment, .. });
        assert_matches!(expr("a := 1, b := 2"), Expression::Sequence { ref expressions, .. } if expressions.len() == 2);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let tokens = tokenize("1 := 2").unwrap();
        let mut parser = AhkParser::new(TokenStream::new(tokens));
        assert_matches!(parser.parse_expression(), Err(SyntaxError::ParseError { .. }));
    }

    #[test]
    fn test_group_spans_lines() {
        assert_matches!(expr("(1 +\n 2)"), Expression::Binary { operator: BinaryOperator::Add, .. });
    }
}
