//! Frontend module - Lexer, Parser, Semantic Analysis

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod token;
