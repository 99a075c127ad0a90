//! The parser.

use compact_str::CompactString;
use text_size::{TextRange, TextSize};

use crate::utils::{Float, Location};

use super::{
    ast::*,
    error::{LexError, ParseError},
    lexer::tokenize,
    token::{Token, TokenKind},
};

/// Parse the source text into AST.
///
/// Parsing never stops at the first error: the offending statement is
/// skipped up to the next end of line and the errors are collected.
pub fn parse(input: &str) -> (Chunk, Vec<ParseError>) {
    Parser::new(input, tokenize(input)).parse()
}

struct Parser<'input, I: Iterator<Item = Result<Token, LexError>>> {
    input: &'input str,
    token_iter: I,
    current: Token,
    prev_token_end: TextSize,
    expected_kinds: Vec<TokenKind>,
    /// Comments seen since the last statement boundary.
    trivia: Vec<Token>,
    loop_depth: usize,
    /// Set while the first primary of a statement is pending.
    stmt_head: bool,
    errors: Vec<ParseError>,
}

impl<'input, I: Iterator<Item = Result<Token, LexError>>> Parser<'input, I> {
    /// Constructs a new `Parser` with a token iter.
    fn new(input: &'input str, token_iter: I) -> Self {
        let mut parser = Parser {
            input,
            token_iter,
            current: Token::new(
                TokenKind::Eof,
                TextRange::empty(TextSize::default()),
                Location::default(),
            ),
            prev_token_end: TextSize::default(),
            expected_kinds: Vec::new(),
            trivia: Vec::new(),
            loop_depth: 0,
            stmt_head: false,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Pulls the next significant token into `current`.
    fn advance(&mut self) {
        loop {
            match self.token_iter.next() {
                Some(Ok(token)) if token.kind.is_trivia() => self.trivia.push(token),
                Some(Ok(token)) => {
                    self.current = token;
                    return;
                }
                Some(Err(e)) => self.errors.push(e.into()),
                // The Eof token has been handed out already, keep it.
                None => return,
            }
        }
    }

    /// Returns the kind of the current token.
    fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Moves to the next token.
    fn bump(&mut self) {
        self.expected_kinds.clear();
        if self.current.kind != TokenKind::Eof {
            self.prev_token_end = self.current.range.end();
            self.advance();
        }
    }

    /// Checks if the current token is `t`, and returns `true` if so.
    /// This method will automatically add `t` to `expected_kinds` if `t` is not encountered.
    fn check(&mut self, t: TokenKind) -> bool {
        let is_present = self.current_kind() == t;
        if !is_present {
            self.expected_kinds.push(t);
        }
        is_present
    }

    /// Consumes a token 't' if it exists. Returns whether the given token was present.
    fn eat(&mut self, t: TokenKind) -> bool {
        let is_present = self.check(t);
        if is_present {
            self.bump();
        }
        is_present
    }

    /// Expects and consumes the token `t`. Signals an error if the next token is not `t`.
    fn expect(&mut self, t: TokenKind) -> Result<(), ParseError> {
        if !self.eat(t) {
            return Err(self.unexpected());
        }
        Ok(())
    }

    /// Eats all Eol tokens.
    fn eat_eol(&mut self) {
        while self.current_kind() == TokenKind::Eol {
            self.bump();
        }
    }

    /// Returns an error for an unexpected token.
    fn unexpected(&mut self) -> ParseError {
        ParseError::UnexpectedToken {
            expected: std::mem::take(&mut self.expected_kinds),
            found: self.current.kind,
            location: self.current.location,
        }
    }

    /// Start a new range.
    fn start_range(&self) -> TextSize {
        self.current.range.start()
    }

    /// End a new range.
    fn end_range(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.prev_token_end.max(start))
    }

    /// Checks whether the current token closes a statement.
    fn at_stmt_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Eol | TokenKind::Eof | TokenKind::Else
        )
    }

    /// Parse token iter into AST.
    fn parse(mut self) -> (Chunk, Vec<ParseError>) {
        let body = self.parse_block(&[]);
        (Chunk { body }, self.errors)
    }

    /// Turns pending comments into statements.
    fn flush_trivia(&mut self, stmts: &mut Vec<Stmt>) {
        for token in self.trivia.drain(..) {
            let kind = match token.kind {
                TokenKind::Debugger => StmtKind::Debugger,
                _ => StmtKind::Comment(CompactString::from(
                    token.text(self.input).trim_start_matches("//"),
                )),
            };
            stmts.push(Stmt {
                kind,
                range: token.range,
                line: token.location.lineno,
            });
        }
    }

    /// Parses one or more items separated by `,`.
    fn parse_items<T, F: Fn(&mut Self) -> Result<T, ParseError>>(
        &mut self,
        parse_func: F,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        loop {
            items.push(parse_func(self)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.eat_eol();
        }
        Ok(items)
    }

    /// Parses zero or more items separated by `,` between `start` and `end`.
    /// Allowing trailing `,` and eol before `,`. The `end` will be consumed.
    fn parse_items_between<T, F: Fn(&mut Self) -> Result<T, ParseError>>(
        &mut self,
        start: TokenKind,
        parse_func: F,
        end: TokenKind,
    ) -> Result<Vec<T>, ParseError> {
        self.expect(start)?;
        let mut items = Vec::new();
        self.eat_eol();
        while !self.eat(end) {
            items.push(parse_func(self)?);
            self.eat_eol();
            if self.eat(end) {
                break;
            }
            self.expect(TokenKind::Comma)?;
            self.eat_eol();
        }
        Ok(items)
    }

    /// Parses statements until one of `terminators` (or the end of input)
    /// is found at the start of a statement. The terminator is left in place.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Block {
        let start = self.start_range();
        let mut body = Vec::new();
        loop {
            self.eat_eol();
            self.flush_trivia(&mut body);
            if self.current_kind() == TokenKind::Eof || terminators.contains(&self.current_kind())
            {
                break;
            }
            match self.parse_stmt() {
                Ok(stmt) => {
                    body.push(stmt);
                    if !(self.check(TokenKind::Eol) || self.check(TokenKind::Eof)) {
                        let e = self.unexpected();
                        self.errors.push(e);
                        self.recover(terminators);
                    }
                }
                Err(e) => {
                    self.errors.push(e);
                    self.recover(terminators);
                }
            }
        }
        let range = self.end_range(start);
        Block { body, range }
    }

    /// Skips the rest of a broken statement.
    fn recover(&mut self, terminators: &[TokenKind]) {
        while !matches!(self.current_kind(), TokenKind::Eol | TokenKind::Eof)
            && !terminators.contains(&self.current_kind())
        {
            self.bump();
        }
    }

    /// Parses a loop body, `end <keyword>` included.
    fn parse_loop_body(&mut self, keyword: TokenKind) -> Result<Block, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_block(&[TokenKind::End]);
        self.loop_depth -= 1;
        self.expect(TokenKind::End)?;
        self.expect(keyword)?;
        Ok(body)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start_range();
        let line = self.current.location.lineno;
        let location = self.current.location;
        let kind = match self.current_kind() {
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.bump();
                let test = self.parse_expr()?;
                let body = self.parse_loop_body(TokenKind::While)?;
                StmtKind::While {
                    test: Box::new(test),
                    body,
                }
            }
            TokenKind::For => {
                self.bump();
                let variable = self.parse_ident()?;
                self.expect(TokenKind::In)?;
                let iterable = self.parse_expr()?;
                let body = self.parse_loop_body(TokenKind::For)?;
                StmtKind::For {
                    variable,
                    iterable: Box::new(iterable),
                    body,
                }
            }
            TokenKind::Return => {
                self.bump();
                let argument = if self.at_stmt_end() {
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                StmtKind::Return { argument }
            }
            TokenKind::Break => {
                if self.loop_depth == 0 {
                    return Err(ParseError::BreakOutsideLoop { location });
                }
                self.bump();
                StmtKind::Break
            }
            TokenKind::Continue => {
                if self.loop_depth == 0 {
                    return Err(ParseError::ContinueOutsideLoop { location });
                }
                self.bump();
                StmtKind::Continue
            }
            _ => self.parse_expr_stmt(location)?,
        };
        let range = self.end_range(start);
        Ok(Stmt { kind, range, line })
    }

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start_range();
        self.expect(TokenKind::If)?;
        let test = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        if matches!(self.current_kind(), TokenKind::Eol | TokenKind::Eof) {
            self.parse_if_block(start, test)
        } else {
            self.parse_if_shortcut(start, test)
        }
    }

    fn parse_if_block(&mut self, start: TextSize, test: Expr) -> Result<StmtKind, ParseError> {
        let terminators = [TokenKind::End, TokenKind::Else];
        let body = self.parse_block(&terminators);
        let mut clauses = vec![IfClause {
            test,
            body,
            range: self.end_range(start),
        }];
        let mut alternate = None;
        loop {
            let start = self.start_range();
            if !self.eat(TokenKind::Else) {
                break;
            }
            if self.eat(TokenKind::If) {
                let test = self.parse_expr()?;
                self.expect(TokenKind::Then)?;
                let body = self.parse_block(&terminators);
                clauses.push(IfClause {
                    test,
                    body,
                    range: self.end_range(start),
                });
            } else {
                alternate = Some(self.parse_block(&[TokenKind::End]));
                break;
            }
        }
        self.expect(TokenKind::End)?;
        self.expect(TokenKind::If)?;
        Ok(StmtKind::If {
            clauses,
            alternate,
            shortcut: false,
        })
    }

    fn parse_if_shortcut(&mut self, start: TextSize, test: Expr) -> Result<StmtKind, ParseError> {
        let body = self.parse_single_stmt()?;
        let mut clauses = vec![IfClause {
            test,
            body,
            range: self.end_range(start),
        }];
        let mut alternate = None;
        loop {
            let start = self.start_range();
            if !self.eat(TokenKind::Else) {
                break;
            }
            if self.eat(TokenKind::If) {
                let test = self.parse_expr()?;
                self.expect(TokenKind::Then)?;
                let body = self.parse_single_stmt()?;
                clauses.push(IfClause {
                    test,
                    body,
                    range: self.end_range(start),
                });
            } else {
                alternate = Some(self.parse_single_stmt()?);
                break;
            }
        }
        Ok(StmtKind::If {
            clauses,
            alternate,
            shortcut: true,
        })
    }

    /// The body of a one-line `if`.
    fn parse_single_stmt(&mut self) -> Result<Block, ParseError> {
        let start = self.start_range();
        let stmt = self.parse_stmt()?;
        let range = self.end_range(start);
        Ok(Block {
            body: vec![stmt],
            range,
        })
    }

    /// Assignment, call statement or bare expression.
    fn parse_expr_stmt(&mut self, location: Location) -> Result<StmtKind, ParseError> {
        let start = self.start_range();
        self.stmt_head = true;
        let expr = self.parse_expr();
        self.stmt_head = false;
        let expr = expr?;
        let operator = match self.current_kind() {
            TokenKind::Assign => Some(None),
            TokenKind::AddAssign => Some(Some(BinOp::Add)),
            TokenKind::SubAssign => Some(Some(BinOp::Sub)),
            TokenKind::MulAssign => Some(Some(BinOp::Mul)),
            TokenKind::DivAssign => Some(Some(BinOp::Div)),
            TokenKind::RemAssign => Some(Some(BinOp::Rem)),
            TokenKind::PowAssign => Some(Some(BinOp::Pow)),
            _ => None,
        };
        if let Some(operator) = operator {
            if !expr.is_assignable() {
                return Err(ParseError::InvalidAssignTarget { location });
            }
            self.bump();
            self.eat_eol();
            let right = self.parse_expr()?;
            return Ok(StmtKind::Assign {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }
        // `print "hi", 2` calls without parentheses.
        if expr.is_assignable() && self.can_start_argument() {
            let arguments = self.parse_items(Parser::parse_expr)?;
            let range = self.end_range(start);
            return Ok(StmtKind::Expr(Box::new(Expr {
                kind: ExprKind::Call {
                    callee: Box::new(expr),
                    arguments,
                },
                range,
            })));
        }
        Ok(StmtKind::Expr(Box::new(expr)))
    }

    fn can_start_argument(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Str
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Not
                | TokenKind::New
                | TokenKind::At
                | TokenKind::Function
                | TokenKind::OpenBrace
                | TokenKind::OpenBracket
                | TokenKind::OpenParen
        )
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_precedence(1)
    }

    fn parse_expr_precedence(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let start = self.start_range();
        let mut left = self.parse_expr_unary()?;
        loop {
            let operator = match self.current_kind() {
                TokenKind::Add => BinOp::Add,
                TokenKind::Sub => BinOp::Sub,
                TokenKind::Mul => BinOp::Mul,
                TokenKind::Div => BinOp::Div,
                TokenKind::Rem => BinOp::Rem,
                TokenKind::Pow => BinOp::Pow,
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                TokenKind::Eq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::Ge,
                TokenKind::Isa => BinOp::Isa,
                _ => break,
            };
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            self.bump();
            self.eat_eol();
            let right = self.parse_expr_precedence(if operator.is_right_associative() {
                precedence
            } else {
                precedence + 1
            })?;
            let operands = [&left, &right]
                .into_iter()
                .filter(|expr| expr.is_ident_like())
                .map(|expr| CompactString::from(expr.to_string()))
                .collect();
            let left_box = Box::new(left);
            let right_box = Box::new(right);
            let kind = if operator.is_logical() {
                ExprKind::Logical {
                    operator,
                    left: left_box,
                    right: right_box,
                    operands,
                }
            } else {
                ExprKind::Binary {
                    operator,
                    left: left_box,
                    right: right_box,
                    operands,
                }
            };
            left = Expr {
                kind,
                range: self.end_range(start),
            };
        }
        Ok(left)
    }

    fn parse_expr_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.start_range();
        let operator = match self.current_kind() {
            TokenKind::Not => UnOp::Not,
            TokenKind::Sub => UnOp::Neg,
            TokenKind::New => UnOp::New,
            TokenKind::At => UnOp::Reference,
            _ => return self.parse_expr_primary(),
        };
        self.bump();
        let argument = self.parse_expr_unary()?;
        Ok(Expr {
            kind: ExprKind::Unary {
                operator,
                argument: Box::new(argument),
            },
            range: self.end_range(start),
        })
    }

    fn parse_expr_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.start_range();
        let head = std::mem::take(&mut self.stmt_head);
        let mut expr = self.parse_expr_atom()?;
        loop {
            // `print [1]` and `print (1)` at the start of a statement are
            // calls without parentheses, not suffixes.
            if head
                && matches!(
                    self.current_kind(),
                    TokenKind::OpenParen | TokenKind::OpenBracket
                )
                && self.current.range.start() != self.prev_token_end
            {
                break;
            }
            let kind = if self.check(TokenKind::OpenParen) {
                let arguments = self.parse_items_between(
                    TokenKind::OpenParen,
                    Parser::parse_expr,
                    TokenKind::CloseParen,
                )?;
                ExprKind::Call {
                    callee: Box::new(expr),
                    arguments,
                }
            } else if self.eat(TokenKind::OpenBracket) {
                self.eat_eol();
                let start_index = if self.check(TokenKind::Colon) {
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                self.eat_eol();
                match start_index {
                    Some(index) if !self.check(TokenKind::Colon) => {
                        self.expect(TokenKind::CloseBracket)?;
                        ExprKind::Index {
                            base: Box::new(expr),
                            index,
                        }
                    }
                    start_index => {
                        self.expect(TokenKind::Colon)?;
                        self.eat_eol();
                        let end_index = if self.check(TokenKind::CloseBracket) {
                            None
                        } else {
                            Some(Box::new(self.parse_expr()?))
                        };
                        self.eat_eol();
                        self.expect(TokenKind::CloseBracket)?;
                        ExprKind::Slice {
                            base: Box::new(expr),
                            start: start_index,
                            end: end_index,
                        }
                    }
                }
            } else if self.eat(TokenKind::Dot) {
                let property = self.parse_ident()?;
                ExprKind::Member {
                    base: Box::new(expr),
                    property,
                }
            } else {
                break;
            };
            expr = Expr {
                kind,
                range: self.end_range(start),
            };
        }
        Ok(expr)
    }

    fn parse_expr_atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.start_range();
        let kind = match self.current_kind() {
            TokenKind::OpenParen => {
                self.bump();
                self.eat_eol();
                let expr = self.parse_expr()?;
                self.eat_eol();
                self.expect(TokenKind::CloseParen)?;
                ExprKind::Paren(Box::new(expr))
            }
            TokenKind::Ident => ExprKind::Ident(self.parse_ident()?),
            TokenKind::Function => ExprKind::Function(Box::new(self.parse_function()?)),
            TokenKind::OpenBrace => ExprKind::Map {
                properties: self.parse_items_between(
                    TokenKind::OpenBrace,
                    Parser::parse_map_property,
                    TokenKind::CloseBrace,
                )?,
            },
            TokenKind::OpenBracket => ExprKind::List {
                items: self.parse_items_between(
                    TokenKind::OpenBracket,
                    Parser::parse_expr,
                    TokenKind::CloseBracket,
                )?,
            },
            _ => ExprKind::Lit(self.parse_lit()?),
        };
        Ok(Expr {
            kind,
            range: self.end_range(start),
        })
    }

    fn parse_map_property(&mut self) -> Result<MapProperty, ParseError> {
        let start = self.start_range();
        let key = self.parse_expr()?;
        self.eat_eol();
        self.expect(TokenKind::Colon)?;
        self.eat_eol();
        let value = self.parse_expr()?;
        Ok(MapProperty {
            key,
            value,
            range: self.end_range(start),
        })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.start_range();
        self.expect(TokenKind::Function)?;
        let params = if self.check(TokenKind::OpenParen) {
            self.parse_items_between(
                TokenKind::OpenParen,
                Parser::parse_param,
                TokenKind::CloseParen,
            )?
        } else {
            Vec::new()
        };
        // Loops do not reach into function bodies.
        let loop_depth = std::mem::take(&mut self.loop_depth);
        let body = self.parse_block(&[TokenKind::End]);
        self.loop_depth = loop_depth;
        self.expect(TokenKind::End)?;
        self.expect(TokenKind::Function)?;
        Ok(Function {
            params,
            body,
            range: self.end_range(start),
        })
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.start_range();
        let ident = self.parse_ident()?;
        let default = if self.eat(TokenKind::Assign) {
            Some(self.parse_param_default()?)
        } else {
            None
        };
        Ok(Param {
            ident,
            default,
            range: self.end_range(start),
        })
    }

    /// A literal, optionally a negated number.
    fn parse_param_default(&mut self) -> Result<Lit, ParseError> {
        let start = self.start_range();
        if self.eat(TokenKind::Sub) {
            let lit = self.parse_lit()?;
            return match lit.kind {
                LitKind::Number(Float(v)) => Ok(Lit {
                    kind: LitKind::Number(Float(-v)),
                    range: self.end_range(start),
                }),
                _ => Err(ParseError::UnexpectedToken {
                    expected: vec![TokenKind::Number],
                    found: TokenKind::Sub,
                    location: self.current.location,
                }),
            };
        }
        self.parse_lit()
    }

    fn parse_lit(&mut self) -> Result<Lit, ParseError> {
        let token = self.current;
        let text = token.text(self.input);
        let kind = match token.kind {
            TokenKind::Null => LitKind::Null,
            TokenKind::True => LitKind::Bool(true),
            TokenKind::False => LitKind::Bool(false),
            TokenKind::Number => text
                .parse::<f64>()
                .map(|v| LitKind::Number(Float(v)))
                .map_err(|_| ParseError::InvalidNumber {
                    text: text.to_owned(),
                    location: token.location,
                })?,
            TokenKind::Str => {
                debug_assert!(text.len() >= 2 && text.starts_with('"') && text.ends_with('"'));
                let text = &text[1..text.len() - 1];
                LitKind::Str(CompactString::from(text.replace("\"\"", "\"")))
            }
            _ => {
                self.expected_kinds.extend([
                    TokenKind::Null,
                    TokenKind::True,
                    TokenKind::False,
                    TokenKind::Number,
                    TokenKind::Str,
                ]);
                return Err(self.unexpected());
            }
        };
        self.bump();
        Ok(Lit {
            kind,
            range: token.range,
        })
    }

    fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.current;
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected());
        }
        let ident = Ident {
            name: CompactString::from(token.text(self.input)),
            range: token.range,
        };
        self.bump();
        Ok(ident)
    }
}
