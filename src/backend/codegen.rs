//! Code generation
//!
//! Placeholder backend. Walks the checked AST and emits ARM-flavored
//! assembly for the handful of constructs it understands: integer
//! literals, integer binary arithmetic, and return values. Everything
//! else is silently skipped. The `optimize` flag is accepted for the
//! pipeline but has no effect yet.

use std::io::{self, Write};

use crate::frontend::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::frontend::token::TokenKind;

/// The code generator state
pub struct CodeGenerator<W: Write> {
    out: W,
    optimize: bool,
}

impl<W: Write> CodeGenerator<W> {
    pub fn new(out: W, optimize: bool) -> Self {
        Self { out, optimize }
    }

    /// Take back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Emit a whole program with prologue and epilogue
    pub fn generate_program(&mut self, program: &Stmt) -> io::Result<()> {
        log::debug!("generating code (optimize: {})", self.optimize);

        writeln!(self.out, ".text")?;
        writeln!(self.out, ".globl _main")?;
        writeln!(self.out, "_main:")?;
        writeln!(self.out, "    push {{fp, lr}}")?;
        writeln!(self.out, "    mov fp, sp")?;

        match &program.kind {
            StmtKind::Compound { statements } => {
                for statement in statements {
                    self.generate_statement(statement)?;
                }
            }
            _ => self.generate_statement(program)?,
        }

        writeln!(self.out, "    mov sp, fp")?;
        writeln!(self.out, "    pop {{fp, pc}}")?;
        Ok(())
    }

    fn generate_statement(&mut self, stmt: &Stmt) -> io::Result<()> {
        match &stmt.kind {
            StmtKind::Expression { expr } => self.generate_expression(expr),
            StmtKind::Return { value } => {
                if let Some(value) = value {
                    self.generate_expression(value)?;
                    // Return value goes to r0
                    writeln!(self.out, "    mov r0, r1")?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Expression results land in r1
    fn generate_expression(&mut self, expr: &Expr) -> io::Result<()> {
        match &expr.kind {
            ExprKind::Literal => {
                if matches!(expr.token.kind, TokenKind::IntLiteral(_)) {
                    writeln!(self.out, "    mov r1, #{}", expr.token.lexeme)?;
                }
                Ok(())
            }
            ExprKind::Binary { left, right } => {
                self.generate_expression(left)?;
                writeln!(self.out, "    push {{r1}}")?;
                self.generate_expression(right)?;
                writeln!(self.out, "    pop {{r2}}")?;

                match expr.token.kind {
                    TokenKind::Plus => writeln!(self.out, "    add r1, r2, r1")?,
                    TokenKind::Minus => writeln!(self.out, "    sub r1, r2, r1")?,
                    TokenKind::Star => writeln!(self.out, "    mul r1, r2, r1")?,
                    _ => {}
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
