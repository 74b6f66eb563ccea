//! Backend module - code generation

pub mod codegen;

pub use codegen::CodeGenerator;
