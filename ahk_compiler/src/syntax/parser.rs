//! Recursive-descent parser for AutoHotkey v2
//!
//! Works on the default channel of a [`TokenStream`], so whitespace and
//! end-of-line tokens are visible: a line break ends a statement, and the gap
//! after a bare function name separates it from its first argument. Parsing
//! stops at the first error.

use super::context::{RuleContext, RuleKind};
use super::error::{SyntaxError, SyntaxResult};
use super::predicates::{is_function_statement, is_valid_label, is_valid_loop_expression, second};
use crate::ast::*;
use crate::config::constants::compile_time::syntax::*;
use crate::config::runtime::ParserPreferences;
use crate::logging::codes;
use crate::tokens::{Channel, Position, SkipWhitespace, Token, TokenLookahead, TokenStream, TokenType};
use crate::utils::Span;
use crate::{log_debug, log_error, log_info, log_success};

pub struct AhkParser {
    pub(super) tokens: TokenStream,
    /// Returned by `current()` once the stream is exhausted
    eof: Token,
    preferences: ParserPreferences,
    parse_depth: usize,
    /// Nesting of `(`, `[`, `{` and `%` inside the expression being parsed.
    /// Line breaks are plain whitespace while this is non-zero.
    pub(super) group_depth: usize,
    context_attached: bool,
    statements_parsed: usize,
}

impl AhkParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, ParserPreferences::default())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: ParserPreferences) -> Self {
        log_debug!("Creating AHK parser", "tokens" => tokens.len());

        let eof = tokens
            .all_tokens()
            .last()
            .filter(|t| t.token_type == TokenType::Eof)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenType::Eof, "", Channel::Default, Position::start()));

        Self {
            tokens,
            eof,
            preferences,
            parse_depth: 0,
            group_depth: 0,
            context_attached: false,
            statements_parsed: 0,
        }
    }

    /// Parse the whole stream into a [`Program`]
    pub fn parse_program(&mut self) -> SyntaxResult<Program> {
        log_info!("Starting AHK parsing", "tokens" => self.tokens.len());

        let root = RuleContext::root();
        let result = self.parse_statement_list(&root, |_| false);

        match result {
            Ok(body) => {
                if self.at(TokenType::CloseBrace) {
                    let error = SyntaxError::unmatched_delimiter("}", self.current());
                    log_error!(error.error_code(), "Closing brace without an opening brace",
                        span = self.current().span(),
                        "position" => self.tokens.position()
                    );
                    return Err(error);
                }

                let span = Span::new(Position::start(), self.eof.start_position());
                log_success!(codes::success::AST_CONSTRUCTION_COMPLETE,
                    "AHK parsing completed",
                    "statements" => body.len(),
                    "total_statements" => self.statements_parsed
                );
                Ok(Program { body, span })
            }
            Err(error) => {
                let (line, column) = error.location().unwrap_or((1, 1));
                log_error!(error.error_code(), "AHK parsing failed",
                    "error" => &error,
                    "line" => line,
                    "column" => column
                );
                Err(error)
            }
        }
    }

    // === TOKEN NAVIGATION ===

    pub(super) fn current(&self) -> &Token {
        self.tokens.current().unwrap_or(&self.eof)
    }

    pub(super) fn current_type(&self) -> TokenType {
        self.tokens.current_type()
    }

    pub(super) fn at(&self, token_type: TokenType) -> bool {
        self.current_type() == token_type
    }

    pub(super) fn la(&self, i: isize) -> TokenType {
        self.tokens.la(i)
    }

    /// Consume the current token and return it
    pub(super) fn bump(&mut self) -> Token {
        let token = self.current().clone();
        self.tokens.advance();
        token
    }

    pub(super) fn expect(&mut self, token_type: TokenType, what: &str) -> SyntaxResult<Token> {
        if self.at(token_type) {
            Ok(self.bump())
        } else {
            Err(SyntaxError::unexpected(what, self.current()))
        }
    }

    /// Identifier, or a keyword that only means something in one position
    pub(super) fn expect_name(&mut self, what: &str) -> SyntaxResult<Token> {
        if self.current().is_name() {
            Ok(self.bump())
        } else {
            Err(SyntaxError::unexpected(what, self.current()))
        }
    }

    /// Skip every whitespace token, line breaks included
    pub(super) fn skip_ws(&mut self) {
        while self.at(TokenType::Ws) {
            self.tokens.advance();
        }
    }

    /// Skip whitespace that stays on the current logical line
    pub(super) fn skip_inline_ws(&mut self) {
        while self.at(TokenType::Ws) && !self.current().contains_line_break() {
            self.tokens.advance();
        }
    }

    /// Skip blank lines between statements
    pub(super) fn skip_newlines(&mut self) {
        while matches!(self.current_type(), TokenType::Ws | TokenType::Eol) {
            self.tokens.advance();
        }
    }

    pub(super) fn at_line_end(&self) -> bool {
        match self.current_type() {
            TokenType::Eol | TokenType::Eof => true,
            TokenType::Ws => self.current().contains_line_break(),
            _ => false,
        }
    }

    pub(super) fn at_statement_end(&self) -> bool {
        self.at_line_end() || self.at(TokenType::CloseBrace)
    }

    /// Span from `start` to the end of the last consumed token
    pub(super) fn span_from(&self, start: Position) -> Span {
        match self.tokens.previous() {
            Some(previous) if previous.stop_index >= start.offset => {
                Span::new(start, previous.span().end)
            }
            _ => Span::point(start),
        }
    }

    /// Run `f` one level deeper, failing once `MAX_PARSE_DEPTH` is reached
    pub(super) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<T> {
        if self.parse_depth >= MAX_PARSE_DEPTH {
            let error = SyntaxError::max_recursion_depth(self.current());
            log_error!(error.error_code(), "Maximum parser recursion depth exceeded",
                "depth" => self.parse_depth,
                "max_depth" => MAX_PARSE_DEPTH
            );
            return Err(error);
        }
        self.parse_depth += 1;
        let result = f(self);
        self.parse_depth -= 1;
        result
    }

    /// Whether `LA(1)` starts `Name(params)` followed by `{` or `=>`
    fn looks_like_function_definition(&self) -> bool {
        let name_at: isize = 1;
        let name_is_valid = self
            .tokens
            .lt(name_at)
            .is_some_and(|t| t.is_name() || t.token_type.is_keyword());
        if !name_is_valid || self.la(name_at + 1) != TokenType::OpenParen {
            return false;
        }

        let mut depth = 0usize;
        let mut i = name_at + 1;
        while (i as usize) <= MAX_STATEMENT_SCAN_TOKENS {
            match self.la(i) {
                TokenType::OpenParen => depth += 1,
                TokenType::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenType::Eof => return false,
                _ => {}
            }
            i += 1;
        }

        i += 1;
        while matches!(self.la(i), TokenType::Ws | TokenType::Eol) {
            i += 1;
        }
        matches!(self.la(i), TokenType::OpenBrace | TokenType::Arrow)
    }

    fn attach_context(&mut self, error: SyntaxError, ctx: &RuleContext<'_>) -> SyntaxError {
        if !self.preferences.include_rule_context_in_errors || self.context_attached {
            return error;
        }
        self.context_attached = true;

        let context = ctx.describe();
        log_debug!("Syntax error rule context", "context" => &context);

        match error {
            SyntaxError::UnexpectedToken {
                expected,
                found,
                line,
                column,
            } => SyntaxError::UnexpectedToken {
                expected: format!("{} (in {})", expected, context),
                found,
                line,
                column,
            },
            SyntaxError::ParseError {
                message,
                line,
                column,
            } => SyntaxError::ParseError {
                message: format!("{} (in {})", message, context),
                line,
                column,
            },
            other => other,
        }
    }

    // === STATEMENT LISTS ===

    /// Statements up to EOF or until `stop` holds at a statement start
    fn parse_statement_list(
        &mut self,
        ctx: &RuleContext<'_>,
        stop: impl Fn(&Self) -> bool,
    ) -> SyntaxResult<Vec<Statement>> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenType::Eof) || self.at(TokenType::CloseBrace) || stop(self) {
                return Ok(body);
            }

            let statement = self.parse_statement(ctx)?;
            if self.preferences.trace_statements && ctx.kind == RuleKind::Program {
                log_debug!("Parsed statement",
                    "kind" => statement.kind_name(),
                    "line" => statement.span().start.line
                );
            }
            body.push(statement);
            self.expect_statement_end(ctx)?;
        }
    }

    fn expect_statement_end(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<()> {
        self.skip_inline_ws();
        match self.current_type() {
            TokenType::Eol | TokenType::Ws => {
                self.bump();
                Ok(())
            }
            TokenType::Eof | TokenType::CloseBrace => Ok(()),
            _ => {
                let error = SyntaxError::unexpected("end of statement", self.current());
                Err(self.attach_context(error, ctx))
            }
        }
    }

    fn parse_block(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<(Vec<Statement>, Span)> {
        let open = self.expect(TokenType::OpenBrace, "'{'")?;
        let block_ctx = ctx.child(RuleKind::Block);
        let body = self.parse_statement_list(&block_ctx, |_| false)?;

        if !self.at(TokenType::CloseBrace) {
            return Err(SyntaxError::unmatched_delimiter("{", &open));
        }
        self.bump();
        Ok((body, self.span_from(open.start_position())))
    }

    fn parse_block_statement(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let (body, span) = self.parse_block(ctx)?;
        Ok(Statement::Block { body, span })
    }

    /// Body of a control-flow statement: on the same line or the next one
    fn parse_body(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        self.skip_inline_ws();
        if self.at_line_end() {
            self.skip_newlines();
        }
        if self.at(TokenType::Eof) || self.at(TokenType::CloseBrace) {
            return Err(SyntaxError::unexpected("statement", self.current()));
        }
        self.parse_statement(ctx)
    }

    /// Look past blank lines for `keyword`; consume it or leave the position alone
    fn take_continuation_keyword(&mut self, keyword: TokenType) -> Option<Token> {
        let saved = self.tokens.save_position();
        self.skip_newlines();
        if self.at(keyword) {
            Some(self.bump())
        } else {
            self.tokens.restore_position(saved);
            None
        }
    }

    // === STATEMENTS ===

    pub fn parse_statement(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        if ctx.depth() >= MAX_CONTEXT_STACK_DEPTH {
            return Err(SyntaxError::max_recursion_depth(self.current()));
        }

        self.statements_parsed += 1;
        let result = self.nested(|p| p.parse_statement_inner(ctx));
        result.map_err(|error| self.attach_context(error, ctx))
    }

    fn parse_statement_inner(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let current = self.current().clone();
        match current.token_type {
            TokenType::HotkeyTrigger => self.parse_hotkey(ctx),
            TokenType::HotstringTrigger => self.parse_hotstring(ctx),
            TokenType::Directive => self.parse_directive(),
            TokenType::OpenBrace => self.parse_block_statement(ctx),
            TokenType::If => self.parse_if(ctx),
            TokenType::While => self.parse_while(ctx),
            TokenType::Loop => self.parse_loop(ctx),
            TokenType::For => self.parse_for(ctx),
            TokenType::Switch => self.parse_switch(ctx),
            TokenType::Try => self.parse_try(ctx),
            TokenType::Return | TokenType::Throw => self.parse_return_or_throw(),
            TokenType::Break | TokenType::Continue => self.parse_break_or_continue(),
            TokenType::Goto => self.parse_goto(),
            TokenType::Class => {
                let class = self.parse_class(ctx)?;
                Ok(Statement::Class(class))
            }
            TokenType::Global | TokenType::Local => self.parse_declaration(),
            TokenType::Static => {
                let saved = self.tokens.save_position();
                let start = self.bump().start_position();
                self.skip_inline_ws();
                if self.looks_like_function_definition() {
                    let function = self.parse_function_definition(ctx, true, start)?;
                    return Ok(Statement::Function(function));
                }
                self.tokens.restore_position(saved);
                self.parse_declaration()
            }
            TokenType::Default if second(&self.tokens, TokenType::Colon) => {
                if is_valid_label(&self.tokens, ctx) {
                    self.parse_label()
                } else {
                    Err(SyntaxError::invalid_label(&current.text, &current))
                }
            }
            _ if current.is_name() && self.is_label_start() => self.parse_label(),
            _ if self.looks_like_function_definition() => {
                let start = current.start_position();
                let function = self.parse_function_definition(ctx, false, start)?;
                Ok(Statement::Function(function))
            }
            TokenType::Identifier | TokenType::This => {
                if is_function_statement(&self.tokens)? {
                    self.parse_call_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            t if t.is_contextual_keyword() => {
                if is_function_statement(&self.tokens)? {
                    self.parse_call_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            TokenType::CloseBrace => Err(SyntaxError::unmatched_delimiter("}", &current)),
            TokenType::Else | TokenType::Case | TokenType::Until | TokenType::Catch | TokenType::Finally => {
                Err(SyntaxError::unexpected("statement", &current))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn is_label_start(&self) -> bool {
        second(&self.tokens, TokenType::Colon)
            && matches!(self.la(3), TokenType::Eol | TokenType::Eof | TokenType::Ws)
    }

    fn parse_label(&mut self) -> SyntaxResult<Statement> {
        let name = self.bump();
        self.expect(TokenType::Colon, "':'")?;
        Ok(Statement::Label {
            span: self.span_from(name.start_position()),
            name: name.text,
        })
    }

    fn parse_expression_statement(&mut self) -> SyntaxResult<Statement> {
        let expression = self.parse_expression_list()?;
        Ok(Statement::Expression {
            span: expression.span(),
            expression,
        })
    }

    /// `Foo`, `Foo()`, `Foo arg1, arg2`, `obj.Method(x)`
    fn parse_call_statement(&mut self) -> SyntaxResult<Statement> {
        let start = self.current().start_position();
        let callee = self.parse_postfix()?;
        let mut arguments = Vec::new();

        if self.at(TokenType::Ws) && !self.current().contains_line_break() {
            self.skip_inline_ws();
            if !self.at_statement_end() {
                arguments = self.parse_command_arguments()?;
            }
        }

        let statement = match callee {
            Expression::Call {
                callee,
                arguments: call_arguments,
                ..
            } if arguments.is_empty() => Statement::FunctionCall {
                callee: *callee,
                arguments: call_arguments,
                span: self.span_from(start),
            },
            callee => Statement::FunctionCall {
                callee,
                arguments,
                span: self.span_from(start),
            },
        };
        Ok(statement)
    }

    /// Comma-separated arguments after a bare function name; empty slots are skipped
    fn parse_command_arguments(&mut self) -> SyntaxResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        loop {
            if self.at(TokenType::Comma) {
                self.bump();
                self.skip_ws();
                continue;
            }
            if self.at_statement_end() {
                break;
            }
            arguments.push(self.parse_expression()?);

            let (next, at, _) = self.peek_infix();
            if next != TokenType::Comma {
                break;
            }
            self.consume_infix(at);
            self.skip_inline_ws();
        }
        Ok(arguments)
    }

    // === HOTKEYS, HOTSTRINGS, DIRECTIVES ===

    fn parse_hotkey(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let trigger_token = self.bump();
        let trigger = strip_trigger_suffix(&trigger_token.text);
        let start = trigger_token.start_position();
        let hotkey_ctx = ctx.child(RuleKind::Hotkey);

        self.skip_inline_ws();
        if self.at(TokenType::RemapKey) {
            let target = self.bump().text;
            return Ok(Statement::Remap {
                trigger,
                target,
                span: self.span_from(start),
            });
        }

        let body = self.parse_trigger_action(&hotkey_ctx)?;
        Ok(Statement::Hotkey {
            trigger,
            body,
            span: self.span_from(start),
        })
    }

    /// Action of a hotkey or execute hotstring: same-line statement, or a
    /// block on the next line. Stacked triggers have no action.
    fn parse_trigger_action(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Option<Box<Statement>>> {
        if !self.at_line_end() {
            return Ok(Some(Box::new(self.parse_statement(ctx)?)));
        }

        let saved = self.tokens.save_position();
        self.skip_newlines();
        if self.at(TokenType::OpenBrace) {
            return Ok(Some(Box::new(self.parse_block_statement(ctx)?)));
        }
        self.tokens.restore_position(saved);
        Ok(None)
    }

    fn parse_hotstring(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let trigger_token = self.bump();
        let start = trigger_token.start_position();
        let (options, trigger) = split_hotstring_trigger(&trigger_token.text);
        let hotstring_ctx = ctx.child(RuleKind::Hotstring);

        self.skip_inline_ws();
        let (expansion, body) = if self.at(TokenType::HotstringExpansion) {
            (Some(self.bump().text), None)
        } else {
            (None, self.parse_trigger_action(&hotstring_ctx)?)
        };

        Ok(Statement::Hotstring {
            options,
            trigger,
            expansion,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_directive(&mut self) -> SyntaxResult<Statement> {
        let directive = self.bump();
        let start = directive.start_position();
        let name = directive.text.trim_start_matches('#').to_string();

        self.skip_inline_ws();
        let mut value = None;
        let mut condition = None;

        match self.current_type() {
            TokenType::DirectiveText | TokenType::HotstringOptions => {
                value = Some(self.bump().text.trim_end().to_string());
            }
            TokenType::EndChars => {
                let keyword = self.bump().text;
                self.skip_inline_ws();
                let chars = if self.at(TokenType::HotstringOptions) {
                    self.bump().text
                } else {
                    String::new()
                };
                value = Some(format!("{} {}", keyword, chars).trim_end().to_string());
            }
            _ if name.eq_ignore_ascii_case("HotIf") && !self.at_line_end() => {
                condition = Some(self.parse_expression()?);
            }
            _ => {}
        }

        Ok(Statement::Directive {
            name,
            value,
            condition,
            span: self.span_from(start),
        })
    }

    // === CONTROL FLOW ===

    fn parse_if(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        self.skip_ws();
        let condition = self.parse_expression()?;
        let then_branch = Box::new(self.parse_body(ctx)?);

        let else_branch = match self.take_continuation_keyword(TokenType::Else) {
            Some(_) => Some(Box::new(self.parse_body(ctx)?)),
            None => None,
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    fn parse_while(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        self.skip_ws();
        let condition = self.parse_expression()?;
        let loop_ctx = ctx.child(RuleKind::Loop);
        let body = Box::new(self.parse_body(&loop_ctx)?);

        Ok(Statement::While {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_loop(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let kind = {
            let view = SkipWhitespace::new(&self.tokens);
            if is_valid_loop_expression(&view) {
                LoopKind::Count
            } else {
                match view.la(2) {
                    TokenType::Parse => LoopKind::Parse,
                    TokenType::Read => LoopKind::Read,
                    TokenType::Files => LoopKind::Files,
                    _ => LoopKind::Reg,
                }
            }
        };

        let start = self.bump().start_position();
        self.skip_inline_ws();
        if kind != LoopKind::Count {
            self.bump();
            self.skip_inline_ws();
            if self.at(TokenType::Comma) {
                self.bump();
                self.skip_ws();
            }
        }

        let mut arguments = Vec::new();
        while !self.at_line_end() && !self.at(TokenType::OpenBrace) {
            arguments.push(self.parse_expression()?);
            let (next, at, _) = self.peek_infix();
            if next != TokenType::Comma {
                break;
            }
            self.consume_infix(at);
            self.skip_inline_ws();
        }

        let loop_ctx = ctx.child(RuleKind::Loop);
        let body = Box::new(self.parse_body(&loop_ctx)?);

        let until = match self.take_continuation_keyword(TokenType::Until) {
            Some(_) => {
                self.skip_ws();
                Some(self.parse_expression()?)
            }
            None => None,
        };

        Ok(Statement::Loop {
            kind,
            arguments,
            body,
            until,
            span: self.span_from(start),
        })
    }

    fn parse_for(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        self.skip_ws();
        let parenthesized = self.at(TokenType::OpenParen);
        if parenthesized {
            self.bump();
            self.group_depth += 1;
            self.skip_ws();
        }

        let key = self.expect_name("loop variable")?.text;
        self.skip_ws();
        let value = if self.at(TokenType::Comma) {
            self.bump();
            self.skip_ws();
            let value = self.expect_name("loop variable")?.text;
            self.skip_ws();
            Some(value)
        } else {
            None
        };

        self.expect(TokenType::In, "'in'")?;
        self.skip_ws();
        let iterable = self.parse_expression()?;

        if parenthesized {
            self.skip_ws();
            self.group_depth -= 1;
            self.expect(TokenType::CloseParen, "')'")?;
        }

        let loop_ctx = ctx.child(RuleKind::Loop);
        let body = Box::new(self.parse_body(&loop_ctx)?);

        Ok(Statement::For {
            key,
            value,
            iterable,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_switch(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        self.skip_inline_ws();

        let mut subject = None;
        if !self.at_line_end() && !self.at(TokenType::OpenBrace) {
            subject = Some(self.parse_expression()?);
            let (next, at, _) = self.peek_infix();
            if next == TokenType::Comma {
                // Case-sensitivity argument
                self.consume_infix(at);
                self.skip_ws();
                self.parse_expression()?;
            }
        }

        self.skip_newlines();
        let open = self.expect(TokenType::OpenBrace, "'{'")?;
        let switch_ctx = ctx.child(RuleKind::Switch);
        let mut cases = Vec::new();

        loop {
            self.skip_newlines();
            match self.current_type() {
                TokenType::CloseBrace => break,
                TokenType::Eof => return Err(SyntaxError::unmatched_delimiter("{", &open)),
                TokenType::Case | TokenType::Default => {
                    cases.push(self.parse_case(&switch_ctx)?);
                }
                _ => return Err(SyntaxError::unexpected("'case' or 'default'", self.current())),
            }
        }
        self.bump();

        Ok(Statement::Switch {
            subject,
            cases,
            span: self.span_from(start),
        })
    }

    fn parse_case(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<SwitchCase> {
        let keyword = self.bump();
        let start = keyword.start_position();
        let is_default = keyword.token_type == TokenType::Default;
        let mut values = Vec::new();

        self.skip_inline_ws();
        if !is_default {
            loop {
                values.push(self.parse_expression()?);
                self.skip_ws();
                if !self.at(TokenType::Comma) {
                    break;
                }
                self.bump();
                self.skip_ws();
            }
        }
        self.expect(TokenType::Colon, "':'")?;

        let case_ctx = ctx.child(RuleKind::CaseClause);
        let body = self.parse_statement_list(&case_ctx, |p| {
            p.at(TokenType::Case)
                || (p.at(TokenType::Default) && !is_valid_label(&p.tokens, &case_ctx))
        })?;

        Ok(SwitchCase {
            values,
            is_default,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_try(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        let body = Box::new(self.parse_body(ctx)?);

        let catch = match self.take_continuation_keyword(TokenType::Catch) {
            Some(keyword) => Some(self.parse_catch(ctx, keyword.start_position())?),
            None => None,
        };

        let finally = match self.take_continuation_keyword(TokenType::Finally) {
            Some(_) => Some(Box::new(self.parse_body(ctx)?)),
            None => None,
        };

        Ok(Statement::Try {
            body,
            catch,
            finally,
            span: self.span_from(start),
        })
    }

    /// `catch [ErrorClass] [as var]`, optionally parenthesized
    fn parse_catch(&mut self, ctx: &RuleContext<'_>, start: Position) -> SyntaxResult<CatchClause> {
        self.skip_inline_ws();
        let parenthesized = self.at(TokenType::OpenParen);
        if parenthesized {
            self.bump();
            self.skip_ws();
        }

        let mut error_class = None;
        if self.at(TokenType::Identifier) {
            let mut name = self.bump().text;
            while self.at(TokenType::Dot) {
                self.bump();
                name.push('.');
                name.push_str(&self.expect_name("class name")?.text);
            }
            error_class = Some(name);
            self.skip_inline_ws();
        }

        let mut variable = None;
        if self.at(TokenType::As) {
            self.bump();
            self.skip_inline_ws();
            variable = Some(self.expect_name("variable name")?.text);
        }

        if parenthesized {
            self.skip_ws();
            self.expect(TokenType::CloseParen, "')'")?;
        }

        let body = Box::new(self.parse_body(ctx)?);
        Ok(CatchClause {
            error_class,
            variable,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_return_or_throw(&mut self) -> SyntaxResult<Statement> {
        let keyword = self.bump();
        let start = keyword.start_position();
        self.skip_inline_ws();

        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression_list()?)
        };

        let span = self.span_from(start);
        Ok(match keyword.token_type {
            TokenType::Throw => Statement::Throw { value, span },
            _ => Statement::Return { value, span },
        })
    }

    fn parse_break_or_continue(&mut self) -> SyntaxResult<Statement> {
        let keyword = self.bump();
        let start = keyword.start_position();
        self.skip_inline_ws();

        let label = if self.current().is_name() {
            Some(self.bump().text)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(match keyword.token_type {
            TokenType::Continue => Statement::Continue { label, span },
            _ => Statement::Break { label, span },
        })
    }

    fn parse_goto(&mut self) -> SyntaxResult<Statement> {
        let start = self.bump().start_position();
        self.skip_inline_ws();

        let parenthesized = self.at(TokenType::OpenParen);
        if parenthesized {
            self.bump();
            self.skip_ws();
        }

        let label = match self.current_type() {
            TokenType::StringLiteral => unquote(&self.bump().text),
            _ => self.expect_name("label name")?.text,
        };

        if parenthesized {
            self.skip_ws();
            self.expect(TokenType::CloseParen, "')'")?;
        }

        Ok(Statement::Goto {
            label,
            span: self.span_from(start),
        })
    }

    fn parse_declaration(&mut self) -> SyntaxResult<Statement> {
        let keyword = self.bump();
        let start = keyword.start_position();
        let scope = match keyword.token_type {
            TokenType::Global => DeclarationScope::Global,
            TokenType::Local => DeclarationScope::Local,
            _ => DeclarationScope::Static,
        };

        self.skip_inline_ws();
        let mut declarations = Vec::new();
        while !self.at_statement_end() {
            let name = self.expect_name("variable name")?;
            let value = {
                let (next, at, _) = self.peek_infix();
                if next == TokenType::Assign {
                    self.consume_infix(at);
                    self.skip_ws();
                    Some(self.parse_expression()?)
                } else {
                    None
                }
            };
            declarations.push(Declarator {
                span: self.span_from(name.start_position()),
                name: name.text,
                value,
            });

            let (next, at, _) = self.peek_infix();
            if next != TokenType::Comma {
                break;
            }
            self.consume_infix(at);
            self.skip_ws();
        }

        Ok(Statement::VariableDeclaration {
            scope,
            declarations,
            span: self.span_from(start),
        })
    }

    // === FUNCTIONS AND CLASSES ===

    fn parse_function_definition(
        &mut self,
        ctx: &RuleContext<'_>,
        is_static: bool,
        start: Position,
    ) -> SyntaxResult<FunctionDefinition> {
        let name = self.bump().text;
        self.expect(TokenType::OpenParen, "'('")?;
        let params = self.parse_parameters(TokenType::CloseParen)?;
        self.expect(TokenType::CloseParen, "')'")?;

        let function_ctx = ctx.child(RuleKind::Function);
        let body = self.parse_function_body(&function_ctx)?;

        Ok(FunctionDefinition {
            name,
            params,
            body,
            is_static,
            span: self.span_from(start),
        })
    }

    /// `{ ... }` or `=> expression`
    fn parse_function_body(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Vec<Statement>> {
        self.skip_inline_ws();
        if self.at(TokenType::Arrow) {
            let arrow = self.bump();
            self.skip_ws();
            let value = self.parse_expression()?;
            let span = self.span_from(arrow.start_position());
            return Ok(vec![Statement::Return {
                value: Some(value),
                span,
            }]);
        }

        self.skip_newlines();
        let (body, _) = self.parse_block(ctx)?;
        Ok(body)
    }

    /// Parameter list up to (not including) `close`
    pub(super) fn parse_parameters(&mut self, close: TokenType) -> SyntaxResult<Vec<Parameter>> {
        let mut params = Vec::new();
        self.group_depth += 1;
        self.skip_ws();

        while !self.at(close) {
            let start = self.current().start_position();
            let by_ref = self.at(TokenType::BitAnd);
            if by_ref {
                self.bump();
                self.skip_ws();
            }

            let (name, variadic) = if self.at(TokenType::Multiply) {
                self.bump();
                (String::new(), true)
            } else {
                let name = self.expect_name("parameter name")?.text;
                let variadic = self.at(TokenType::Multiply);
                if variadic {
                    self.bump();
                }
                (name, variadic)
            };

            let optional = self.at(TokenType::QuestionMark);
            if optional {
                self.bump();
            }

            self.skip_ws();
            let default = if self.at(TokenType::Assign) {
                self.bump();
                self.skip_ws();
                Some(self.parse_expression()?)
            } else {
                None
            };

            params.push(Parameter {
                name,
                by_ref,
                variadic,
                optional,
                default,
                span: self.span_from(start),
            });

            self.skip_ws();
            if !self.at(TokenType::Comma) {
                break;
            }
            self.bump();
            self.skip_ws();
        }

        self.group_depth -= 1;
        Ok(params)
    }

    fn parse_class(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<ClassDefinition> {
        let start = self.bump().start_position();
        self.skip_inline_ws();
        let name = self.expect_name("class name")?.text;
        self.skip_inline_ws();

        let extends = if self.at(TokenType::Extends) {
            self.bump();
            self.skip_inline_ws();
            let mut base = self.expect_name("base class name")?.text;
            while self.at(TokenType::Dot) {
                self.bump();
                base.push('.');
                base.push_str(&self.expect_name("base class name")?.text);
            }
            Some(base)
        } else {
            None
        };

        self.skip_newlines();
        let open = self.expect(TokenType::OpenBrace, "'{'")?;
        let class_ctx = ctx.child(RuleKind::Class);
        let mut members = Vec::new();

        loop {
            self.skip_newlines();
            match self.current_type() {
                TokenType::CloseBrace => break,
                TokenType::Eof => return Err(SyntaxError::unmatched_delimiter("{", &open)),
                _ => {
                    members.push(self.nested(|p| p.parse_class_member(&class_ctx))?);
                    self.expect_statement_end(&class_ctx)?;
                }
            }
        }
        self.bump();

        Ok(ClassDefinition {
            name,
            extends,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<ClassMember> {
        if self.at(TokenType::Class) {
            return Ok(ClassMember::Class(self.parse_class(ctx)?));
        }

        let start = self.current().start_position();
        let mut is_static = false;
        if self.at(TokenType::Static) {
            let after = SkipWhitespace::new(&self.tokens).lt(2).cloned();
            if after.is_some_and(|t| t.is_name() || t.token_type.is_keyword()) {
                self.bump();
                self.skip_inline_ws();
                is_static = true;
            }
        }

        let name_is_valid = self.current().is_name() || self.current_type().is_keyword();
        if !name_is_valid {
            return Err(SyntaxError::unexpected("member name", self.current()));
        }

        if self.la(2) == TokenType::OpenParen {
            let method = self.parse_function_definition(ctx, is_static, start)?;
            return Ok(ClassMember::Method(method));
        }

        let name = self.bump().text;
        let params = if self.at(TokenType::OpenBracket) {
            self.bump();
            let params = self.parse_parameters(TokenType::CloseBracket)?;
            self.expect(TokenType::CloseBracket, "']'")?;
            params
        } else {
            Vec::new()
        };

        self.skip_inline_ws();
        match self.current_type() {
            TokenType::Assign => {
                self.bump();
                self.skip_ws();
                let value = self.parse_expression()?;
                Ok(ClassMember::Field {
                    name,
                    is_static,
                    value: Some(value),
                    span: self.span_from(start),
                })
            }
            TokenType::Arrow => {
                let getter = self.parse_function_body(ctx)?;
                Ok(ClassMember::Property {
                    name,
                    is_static,
                    params,
                    getter: Some(getter),
                    setter: None,
                    span: self.span_from(start),
                })
            }
            _ if self.at_statement_end() && !self.next_line_opens_block() => Ok(ClassMember::Field {
                name,
                is_static,
                value: None,
                span: self.span_from(start),
            }),
            _ => {
                self.skip_newlines();
                let (getter, setter) = self.parse_property_accessors(ctx)?;
                Ok(ClassMember::Property {
                    name,
                    is_static,
                    params,
                    getter,
                    setter,
                    span: self.span_from(start),
                })
            }
        }
    }

    fn next_line_opens_block(&self) -> bool {
        let mut i = 1;
        while matches!(self.la(i), TokenType::Ws | TokenType::Eol) {
            i += 1;
        }
        self.la(i) == TokenType::OpenBrace
    }

    /// `{ get {...} set => ... }`
    fn parse_property_accessors(&mut self, ctx: &RuleContext<'_>) -> SyntaxResult<Accessors> {
        let open = self.expect(TokenType::OpenBrace, "'{'")?;
        let property_ctx = ctx.child(RuleKind::Function);
        let mut getter = None;
        let mut setter = None;

        loop {
            self.skip_newlines();
            match self.current_type() {
                TokenType::CloseBrace => break,
                TokenType::Eof => return Err(SyntaxError::unmatched_delimiter("{", &open)),
                TokenType::Get => {
                    self.bump();
                    getter = Some(self.parse_function_body(&property_ctx)?);
                }
                TokenType::Set => {
                    self.bump();
                    setter = Some(self.parse_function_body(&property_ctx)?);
                }
                _ => return Err(SyntaxError::unexpected("'get' or 'set'", self.current())),
            }
            self.expect_statement_end(&property_ctx)?;
        }
        self.bump();
        Ok((getter, setter))
    }
}

/// Getter and setter bodies of a property
type Accessors = (Option<Vec<Statement>>, Option<Vec<Statement>>);

/// `F1::` -> `F1`
fn strip_trigger_suffix(text: &str) -> String {
    text.strip_suffix("::").unwrap_or(text).to_string()
}

/// `:*?:btw::` -> (`*?`, `btw`)
fn split_hotstring_trigger(text: &str) -> (String, String) {
    let inner = text.strip_prefix(':').unwrap_or(text);
    let inner = inner.strip_suffix("::").unwrap_or(inner);
    match inner.split_once(':') {
        Some((options, abbreviation)) => (options.to_string(), abbreviation.to_string()),
        None => (String::new(), inner.to_string()),
    }
}

/// Text between the quotes of a string literal token
pub(super) fn unquote(text: &str) -> String {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

/// Body of a quoted continuation section: the lines between the `(` line and
/// the `)` line, with the first body line's indentation removed from each
pub(super) fn continuation_section_text(text: &str) -> String {
    let unquoted = unquote(text);
    let lines: Vec<&str> = unquoted
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let Some(open) = lines.iter().position(|l| l.trim_start().starts_with('(')) else {
        return String::new();
    };
    let close = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with(')'))
        .filter(|&close| close > open)
        .unwrap_or(lines.len());
    let body = &lines[open + 1..close];

    let indent: String = body
        .first()
        .map(|l| l.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
        .unwrap_or_default();
    body.iter()
        .map(|l| l.strip_prefix(indent.as_str()).unwrap_or(l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> SyntaxResult<Program> {
        let tokens = tokenize(source).unwrap();
        AhkParser::new(TokenStream::new(tokens)).parse_program()
    }

    fn body(source: &str) -> Vec<Statement> {
        parse(source).unwrap().body
    }

    fn single(source: &str) -> Statement {
        let mut statements = body(source);
        assert_eq!(statements.len(), 1, "expected one statement in {:?}", source);
        statements.remove(0)
    }

    fn name(expression: &Expression) -> &str {
        expression.identifier_name().unwrap_or("<not an identifier>")
    }

    #[test]
    fn test_continued_assignment() {
        let statement = single("x := 1 +\n    2");
        let Statement::Expression { expression, .. } = statement else {
            panic!("expected expression statement");
        };
        let Expression::Assignment {
            operator,
            target,
            value,
            ..
        } = expression
        else {
            panic!("expected assignment");
        };
        assert_eq!(operator, AssignmentOperator::Assign);
        assert_eq!(name(&target), "x");
        assert_matches!(
            *value,
            Expression::Binary {
                operator: BinaryOperator::Add,
                ..
            }
        );
    }

    fn assigned_value(source: &str) -> Expression {
        let Statement::Expression { expression, .. } = single(source) else {
            panic!("expected expression statement in {:?}", source);
        };
        let Expression::Assignment { value, .. } = expression else {
            panic!("expected assignment in {:?}", source);
        };
        *value
    }

    #[test]
    fn test_continuation_section_assignment() {
        let value = assigned_value("x := \"\n(\n    line1\n    line2\n)\"");
        assert_matches!(value, Expression::String { ref value, .. } if value == "line1\nline2");

        let program = parse("msg := \"\n(\nhello\n)\"\nMsgBox(msg)\n").unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_dynamic_names_in_assignments() {
        assert_matches!(
            assigned_value("x := var%n%"),
            Expression::DynamicIdentifier { ref parts, .. } if parts.len() == 2
        );
        assert_matches!(
            assigned_value("x := %a%%b%"),
            Expression::DynamicIdentifier { ref parts, .. } if parts.len() == 2
        );
        assert_matches!(assigned_value("x := %a%"), Expression::Deref { .. });

        let Statement::Expression { expression, .. } = single("item%i% := 0") else {
            panic!("expected expression statement");
        };
        assert_matches!(
            expression,
            Expression::Assignment { ref target, .. }
                if matches!(**target, Expression::DynamicIdentifier { .. })
        );
    }

    #[test]
    fn test_hotkey_with_call_body() {
        let statement = single("F1::Send(\"hi\")");
        let Statement::Hotkey { trigger, body, .. } = statement else {
            panic!("expected hotkey");
        };
        assert_eq!(trigger, "F1");
        let body = body.unwrap();
        let Statement::FunctionCall { callee, arguments, .. } = *body else {
            panic!("expected call body");
        };
        assert_eq!(name(&callee), "Send");
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn test_remap() {
        assert_matches!(
            single("F1::F2"),
            Statement::Remap { ref trigger, ref target, .. } if trigger == "F1" && target == "F2"
        );
    }

    #[test]
    fn test_hotkey_with_block_on_next_line() {
        let statement = single("^j::\n{\n    MsgBox \"hi\"\n}");
        let Statement::Hotkey { body: Some(body), .. } = statement else {
            panic!("expected hotkey with body");
        };
        assert_matches!(*body, Statement::Block { ref body, .. } if body.len() == 1);
    }

    #[test]
    fn test_stacked_hotkeys() {
        let statements = body("a::\nb::MsgBox()");
        assert_eq!(statements.len(), 2);
        assert_matches!(statements[0], Statement::Hotkey { body: None, .. });
    }

    #[test]
    fn test_hotstrings() {
        let statement = single("::btw::by the way");
        assert_matches!(
            statement,
            Statement::Hotstring { ref options, ref trigger, expansion: Some(ref text), .. }
                if options.is_empty() && trigger == "btw" && text == "by the way"
        );

        let statement = single(":X:greet::MsgBox(\"hello\")");
        assert_matches!(
            statement,
            Statement::Hotstring { ref options, expansion: None, body: Some(_), .. } if options == "X"
        );
    }

    #[test]
    fn test_command_style_call() {
        let statement = single("MsgBox \"a\", \"b\"");
        assert_matches!(
            statement,
            Statement::FunctionCall { ref arguments, .. } if arguments.len() == 2
        );

        let statement = single("Sleep -1");
        let Statement::FunctionCall { arguments, .. } = statement else {
            panic!("expected call");
        };
        assert_matches!(
            arguments[0],
            Expression::Unary {
                operator: UnaryOperator::Negate,
                ..
            }
        );
    }

    #[test]
    fn test_method_call_statement() {
        let statement = single("this.Foo(1)");
        let Statement::FunctionCall { callee, arguments, .. } = statement else {
            panic!("expected call");
        };
        assert_matches!(callee, Expression::Member { ref property, .. } if property == "Foo");
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn test_comma_after_function_name_fails() {
        assert_matches!(
            parse("Foo, 1, 2"),
            Err(SyntaxError::FunctionCallComma { line: 1, column: 4 })
        );
    }

    #[test]
    fn test_subtraction_is_expression() {
        assert_matches!(
            single("Foo - 1"),
            Statement::Expression {
                expression: Expression::Binary {
                    operator: BinaryOperator::Subtract,
                    ..
                },
                ..
            }
        );
    }

    #[test]
    fn test_if_else_chain() {
        let source = "if (x > 1) {\n    y := 1\n} else if x = 0\n    y := 2\nelse\n{\n    y := 3\n}";
        let Statement::If { else_branch, .. } = single(source) else {
            panic!("expected if");
        };
        let Some(else_branch) = else_branch else {
            panic!("expected else");
        };
        assert_matches!(*else_branch, Statement::If { else_branch: Some(_), .. });
    }

    #[test]
    fn test_loop_kinds() {
        assert_matches!(
            single("Loop 5 {\n    x++\n}"),
            Statement::Loop { kind: LoopKind::Count, ref arguments, .. } if arguments.len() == 1
        );
        assert_matches!(
            single("Loop Parse, text, \",\"\n    MsgBox A_LoopField"),
            Statement::Loop { kind: LoopKind::Parse, ref arguments, .. } if arguments.len() == 2
        );
        assert_matches!(
            single("Loop Files \"*.txt\"\n    n++"),
            Statement::Loop { kind: LoopKind::Files, .. }
        );
        assert_matches!(
            single("Loop {\n    x++\n} until x > 3"),
            Statement::Loop { kind: LoopKind::Count, until: Some(_), .. }
        );
    }

    #[test]
    fn test_for_loop() {
        assert_matches!(
            single("for key, value in map {\n    MsgBox key\n}"),
            Statement::For { ref key, value: Some(ref value), .. } if key == "key" && value == "value"
        );
    }

    #[test]
    fn test_switch_with_default() {
        let source = "switch x {\n    case 1, 2:\n        y := 1\n    default:\n        y := 0\n}";
        let Statement::Switch { cases, .. } = single(source) else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].values.len(), 2);
        assert!(cases[1].is_default);
        assert_eq!(cases[1].body.len(), 1);
    }

    #[test]
    fn test_default_label_inside_block() {
        let statement = single("{\n    Default:\n}");
        let Statement::Block { body, .. } = statement else {
            panic!("expected block");
        };
        assert_matches!(body[0], Statement::Label { ref name, .. } if name == "Default");
    }

    #[test]
    fn test_labels_and_goto() {
        let statements = body("Retry:\nGoto Retry");
        assert_matches!(statements[0], Statement::Label { ref name, .. } if name == "Retry");
        assert_matches!(statements[1], Statement::Goto { ref label, .. } if label == "Retry");
    }

    #[test]
    fn test_function_definitions() {
        let statement = single("Add(a, b := 1, &out?, rest*) {\n    return a + b\n}");
        let Statement::Function(function) = statement else {
            panic!("expected function");
        };
        assert_eq!(function.name, "Add");
        assert_eq!(function.params.len(), 4);
        assert!(function.params[1].default.is_some());
        assert!(function.params[2].by_ref && function.params[2].optional);
        assert!(function.params[3].variadic);
        assert_eq!(function.body.len(), 1);

        let Statement::Function(arrow) = single("Double(x) => x * 2") else {
            panic!("expected function");
        };
        assert_matches!(arrow.body[0], Statement::Return { value: Some(_), .. });
    }

    #[test]
    fn test_class_definition() {
        let source = "class Counter extends Base.Thing {\n    static count := 0\n    value := 1\n    __New(start) {\n        this.value := start\n    }\n    Total => this.value\n    Name {\n        get {\n            return \"c\"\n        }\n        set => this.name := value\n    }\n}";
        let Statement::Class(class) = single(source) else {
            panic!("expected class");
        };
        assert_eq!(class.name, "Counter");
        assert_eq!(class.extends.as_deref(), Some("Base.Thing"));
        assert_eq!(class.members.len(), 5);
        assert_matches!(class.members[0], ClassMember::Field { is_static: true, .. });
        assert_matches!(class.members[2], ClassMember::Method(_));
        assert_matches!(class.members[3], ClassMember::Property { getter: Some(_), setter: None, .. });
        assert_matches!(class.members[4], ClassMember::Property { getter: Some(_), setter: Some(_), .. });
    }

    #[test]
    fn test_try_catch_finally() {
        let source = "try {\n    Risky()\n} catch Error as e {\n    MsgBox e.Message\n} finally {\n    Cleanup()\n}";
        let Statement::Try { catch, finally, .. } = single(source) else {
            panic!("expected try");
        };
        let catch = catch.unwrap();
        assert_eq!(catch.error_class.as_deref(), Some("Error"));
        assert_eq!(catch.variable.as_deref(), Some("e"));
        assert!(finally.is_some());
    }

    #[test]
    fn test_declarations() {
        assert_matches!(
            single("global a := 1, b"),
            Statement::VariableDeclaration { scope: DeclarationScope::Global, ref declarations, .. }
                if declarations.len() == 2 && declarations[1].value.is_none()
        );
    }

    #[test]
    fn test_directives() {
        let statements = body("#Requires AutoHotkey v2.0\n#HotIf WinActive(\"ahk_exe notepad.exe\")");
        assert_matches!(
            statements[0],
            Statement::Directive { ref name, value: Some(ref value), .. }
                if name == "Requires" && value == "AutoHotkey v2.0"
        );
        assert_matches!(statements[1], Statement::Directive { condition: Some(_), .. });
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        assert_matches!(parse("if x {\n    y()"), Err(SyntaxError::UnmatchedBlockDelimiter { .. }));
        assert_matches!(parse("}"), Err(SyntaxError::UnmatchedBlockDelimiter { .. }));
    }

    #[test]
    fn test_statement_must_end_at_line_break() {
        assert_matches!(parse("x := 1 )"), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let source = "{\n".repeat(MAX_CONTEXT_STACK_DEPTH + 5);
        assert_matches!(parse(&source), Err(SyntaxError::MaxRecursionDepth { .. }));
    }

    #[test]
    fn test_empty_source() {
        assert!(body("").is_empty());
        assert!(body("; only a comment\n\n").is_empty());
    }

    #[test]
    fn test_trigger_helpers() {
        assert_eq!(strip_trigger_suffix("^!a::"), "^!a");
        assert_eq!(
            split_hotstring_trigger(":*?:btw::"),
            ("*?".to_string(), "btw".to_string())
        );
        assert_eq!(unquote("\"hi\""), "hi");
        assert_eq!(unquote("'x'"), "x");
    }
}
