//! Parser
//!
//! Recursive descent for statements, precedence climbing for expressions.
//! On a syntax error the parser records a single diagnostic, enters panic
//! mode, and synchronizes at the next statement boundary. Parse methods
//! return `None` once the pending error is set.

use crate::frontend::ast::{Expr, Stmt};
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::Error;

/// Expression precedence levels, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment, // =
    Or,         // ||
    And,        // &&
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // ()
    Primary,
}

impl Precedence {
    /// The next higher precedence level
    fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Infix precedence of a token, or `None` if it is not an infix operator
fn infix_precedence(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Equal => Precedence::Assignment,
        TokenKind::PipePipe => Precedence::Or,
        TokenKind::AmpAmp => Precedence::And,
        TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
        TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
            Precedence::Comparison
        }
        TokenKind::Plus | TokenKind::Minus => Precedence::Term,
        TokenKind::Slash | TokenKind::Star => Precedence::Factor,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::None,
    }
}

/// The parser state
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous: Token,
    /// Single pending diagnostic; the first error wins
    error: Option<Error>,
    panic_mode: bool,
    had_error: bool,
}

impl Parser {
    /// Create a parser over the given source and prime the first token
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let mut parser = Self {
            lexer,
            previous: current.clone(),
            current,
            error: None,
            panic_mode: false,
            had_error: false,
        };
        if parser.current.kind == TokenKind::Error {
            parser.error_at_current("Invalid token");
        }
        parser
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// The pending diagnostic, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn into_error(self) -> Option<Error> {
        self.error
    }

    // ==================== Error handling ====================

    fn error_at_current(&mut self, message: &str) {
        let token = self.current.clone();
        self.error_at(&token, message);
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        if self.error.is_none() {
            self.error = Some(Error::Syntax {
                message: message.to_string(),
                span: token.span,
            });
        }
    }

    /// Skip tokens until a likely statement boundary
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // ==================== Token handling ====================

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
        if self.current.kind == TokenKind::Error {
            self.error_at_current("Invalid token");
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.current.kind == kind {
            let token = self.current.clone();
            self.advance();
            return Some(token);
        }
        self.error_at_current(message);
        None
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Option<Expr> {
        self.parse_precedence(Precedence::Assignment)
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Option<Expr> {
        self.advance();
        let mut expr = self.prefix()?;

        while precedence <= infix_precedence(&self.current.kind) {
            self.advance();
            expr = self.infix(expr)?;
        }

        Some(expr)
    }

    /// Dispatch on the previous token as a prefix position
    fn prefix(&mut self) -> Option<Expr> {
        match self.previous.kind {
            TokenKind::IntLiteral(_) | TokenKind::FloatLiteral(_) | TokenKind::StringLiteral(_) => {
                Some(Expr::literal(self.previous.clone()))
            }
            TokenKind::Identifier => Some(Expr::identifier(self.previous.clone())),
            TokenKind::LParen => self.grouping(),
            TokenKind::Minus | TokenKind::Bang => self.unary(),
            _ => {
                self.error_at_current("Expect expression.");
                None
            }
        }
    }

    /// Dispatch on the previous token as an infix position
    fn infix(&mut self, left: Expr) -> Option<Expr> {
        match self.previous.kind {
            TokenKind::LParen => self.call(left),
            _ => self.binary(left),
        }
    }

    fn binary(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.previous.clone();
        // Parse the right operand one level tighter (left-associative)
        let right = self.parse_precedence(infix_precedence(&operator.kind).next())?;
        Some(Expr::binary(left, right, operator))
    }

    fn unary(&mut self) -> Option<Expr> {
        let operator = self.previous.clone();
        let operand = self.parse_precedence(Precedence::Unary)?;
        Some(Expr::unary(operand, true, operator))
    }

    fn grouping(&mut self) -> Option<Expr> {
        let expr = self.expression()?;
        self.consume(TokenKind::RParen, "Expect ')' after expression.")?;
        Some(expr)
    }

    fn call(&mut self, callee: Expr) -> Option<Expr> {
        let paren = self.previous.clone();
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expect ')' after arguments")?;

        Some(Expr::call(callee, args, paren))
    }

    // ==================== Statements ====================

    /// Parse one declaration or statement, synchronizing on error
    pub fn parse_declaration(&mut self) -> Option<Stmt> {
        let stmt = if self.current.kind.starts_declaration() {
            self.advance();
            self.var_declaration()
        } else {
            self.statement()
        };

        if self.panic_mode {
            self.synchronize();
        }
        stmt
    }

    fn statement(&mut self) -> Option<Stmt> {
        if self.matches(TokenKind::If) {
            return self.if_statement();
        }
        if self.matches(TokenKind::While) {
            return self.while_statement();
        }
        if self.matches(TokenKind::For) {
            return self.for_statement();
        }
        if self.matches(TokenKind::Return) {
            return self.return_statement();
        }
        if self.matches(TokenKind::LBrace) {
            return self.block_statement();
        }
        self.expression_statement()
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous.clone();

        self.consume(TokenKind::LParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RParen, "Expect ')' after if condition")?;

        let then_branch = self.statement()?;
        let else_branch = if self.matches(TokenKind::Else) {
            Some(self.statement()?)
        } else {
            None
        };

        Some(Stmt::if_stmt(condition, then_branch, else_branch, keyword))
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous.clone();

        self.consume(TokenKind::LParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RParen, "Expect ')' after while condition")?;

        let body = self.statement()?;
        Some(Stmt::while_stmt(condition, body, keyword))
    }

    fn for_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous.clone();

        self.consume(TokenKind::LParen, "Expect '(' after 'for'")?;

        let initializer = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.current.kind.starts_declaration() {
            self.advance();
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition")?;

        let increment = if !self.check(TokenKind::RParen) {
            let expr = self.expression()?;
            let token = self.previous.clone();
            Some(Stmt::expression(expr, token))
        } else {
            None
        };
        self.consume(TokenKind::RParen, "Expect ')' after for clauses")?;

        let body = self.statement()?;
        Some(Stmt::for_stmt(initializer, condition, increment, body, keyword))
    }

    fn return_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous.clone();

        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after return value")?;
        Some(Stmt::return_stmt(value, keyword))
    }

    fn block_statement(&mut self) -> Option<Stmt> {
        let brace = self.previous.clone();
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
            if self.had_error {
                break;
            }
        }

        self.consume(TokenKind::RBrace, "Expect '}' after block")?;
        Some(Stmt::compound(statements, brace))
    }

    fn expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        let token = expr.token.clone();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression")?;
        Some(Stmt::expression(expr, token))
    }

    fn var_declaration(&mut self) -> Option<Stmt> {
        let keyword = self.previous.clone();
        let name = self.consume(TokenKind::Identifier, "Expect variable name")?;

        let initializer = if self.matches(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration")?;
        Some(Stmt::declaration(name, initializer, keyword))
    }

    /// Parse a whole program into one compound statement. Stops after the
    /// first recorded error.
    pub fn parse_program(&mut self) -> Stmt {
        let mut statements = Vec::new();

        while !self.matches(TokenKind::Eof) {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
            if self.had_error {
                break;
            }
        }

        Stmt::compound(statements, self.previous.clone())
    }
}
