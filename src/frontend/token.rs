//! Token definitions
//!
//! Tokens carry their kind, raw lexeme, and 1-based source position.
//! Literal payloads live on the kind variant.

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span,
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    Auto,
    Break,
    Case,
    Char,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Fun,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Var,
    Void,
    Volatile,
    While,

    // ============ Single-character tokens ============
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Minus,
    Plus,
    Slash,
    Star,
    Bang,
    Equal,
    Less,
    Greater,
    Ampersand,
    Pipe,
    Caret,
    Question,
    Colon,

    // ============ Two-character tokens ============
    Arrow,
    MinusMinus,
    MinusEqual,
    PlusPlus,
    PlusEqual,
    SlashEqual,
    StarEqual,
    BangEqual,
    EqualEqual,
    LessEqual,
    LessLess,
    GreaterEqual,
    GreaterGreater,
    AmpAmp,
    AmpEqual,
    PipePipe,
    PipeEqual,
    CaretEqual,

    // ============ Literals ============
    Identifier,
    IntLiteral(i64),
    FloatLiteral(f64),
    /// Content between the quotes; escape sequences are preserved, not decoded
    StringLiteral(String),

    // ============ Special ============
    /// Unrecognized character or unterminated string
    Error,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier lexeme to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "auto" => Some(TokenKind::Auto),
            "break" => Some(TokenKind::Break),
            "case" => Some(TokenKind::Case),
            "char" => Some(TokenKind::Char),
            "class" => Some(TokenKind::Class),
            "const" => Some(TokenKind::Const),
            "continue" => Some(TokenKind::Continue),
            "default" => Some(TokenKind::Default),
            "do" => Some(TokenKind::Do),
            "double" => Some(TokenKind::Double),
            "else" => Some(TokenKind::Else),
            "enum" => Some(TokenKind::Enum),
            "extern" => Some(TokenKind::Extern),
            "float" => Some(TokenKind::Float),
            "for" => Some(TokenKind::For),
            "fun" => Some(TokenKind::Fun),
            "goto" => Some(TokenKind::Goto),
            "if" => Some(TokenKind::If),
            "inline" => Some(TokenKind::Inline),
            "int" => Some(TokenKind::Int),
            "long" => Some(TokenKind::Long),
            "register" => Some(TokenKind::Register),
            "restrict" => Some(TokenKind::Restrict),
            "return" => Some(TokenKind::Return),
            "short" => Some(TokenKind::Short),
            "signed" => Some(TokenKind::Signed),
            "sizeof" => Some(TokenKind::Sizeof),
            "static" => Some(TokenKind::Static),
            "struct" => Some(TokenKind::Struct),
            "switch" => Some(TokenKind::Switch),
            "typedef" => Some(TokenKind::Typedef),
            "union" => Some(TokenKind::Union),
            "unsigned" => Some(TokenKind::Unsigned),
            "var" => Some(TokenKind::Var),
            "void" => Some(TokenKind::Void),
            "volatile" => Some(TokenKind::Volatile),
            "while" => Some(TokenKind::While),
            _ => None,
        }
    }

    /// Check if this keyword can start a variable declaration
    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Char
                | TokenKind::Void
                | TokenKind::Long
                | TokenKind::Short
        )
    }
}
