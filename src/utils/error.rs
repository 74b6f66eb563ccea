//! Error handling for the compiler

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Parser Errors ====================
    /// Any syntax diagnostic recorded by the parser. The parser keeps at
    /// most one of these pending at a time (panic mode).
    #[error("{message}")]
    Syntax { message: String, span: Span },

    // ==================== Semantic Errors ====================
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("Variable '{name}' already declared in this scope")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("Type mismatch in binary expression")]
    BinaryTypeMismatch { span: Span },

    #[error("Invalid unary operator")]
    InvalidUnaryOperator { span: Span },

    #[error("Invalid literal type")]
    InvalidLiteral { span: Span },

    #[error("Cannot call non-function type")]
    NotCallable { span: Span },

    #[error("Condition must be a boolean expression")]
    NonBooleanCondition { span: Span },

    #[error("Return statement outside of function")]
    ReturnOutsideFunction { span: Span },

    #[error("Return value type does not match function return type")]
    ReturnTypeMismatch { span: Span },

    #[error("Function must return a value")]
    MissingReturnValue { span: Span },
}

impl Error {
    /// Get the source position associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::Syntax { span, .. } => *span,
            Self::UndefinedVariable { span, .. } => *span,
            Self::DuplicateDeclaration { span, .. } => *span,
            Self::BinaryTypeMismatch { span } => *span,
            Self::InvalidUnaryOperator { span } => *span,
            Self::InvalidLiteral { span } => *span,
            Self::NotCallable { span } => *span,
            Self::NonBooleanCondition { span } => *span,
            Self::ReturnOutsideFunction { span } => *span,
            Self::ReturnTypeMismatch { span } => *span,
            Self::MissingReturnValue { span } => *span,
        }
    }

    /// Render as a `<file>:<line>:<column>: <message>` diagnostic line
    pub fn report(&self, filename: &str) -> String {
        let span = self.span();
        format!("{}:{}:{}: {}", filename, span.line, span.column, self)
    }
}
