//! Semantic analysis
//!
//! Walks the AST with a scoped symbol table, resolves expression types in
//! place, and accumulates every diagnostic it finds. Unlike the parser,
//! the analyzer does not stop at the first error.

use std::collections::HashMap;

use crate::frontend::ast::{Expr, ExprKind, Stmt, StmtKind, Type, TypeKind};
use crate::frontend::token::TokenKind;
use crate::utils::Error;

/// What a symbol names
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable { is_global: bool, offset: i32 },
    Function { params: Vec<Type>, is_variadic: bool },
    Type,
    Constant,
}

/// A single symbol table entry
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
    pub is_defined: bool,
}

/// One lexical scope
#[derive(Debug, Default)]
struct Scope {
    entries: HashMap<String, SymbolEntry>,
    level: usize,
}

/// A strict stack of scopes. Leaving a scope drops its entries.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        let level = self.scopes.len();
        self.scopes.push(Scope {
            entries: HashMap::new(),
            level,
        });
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Current nesting depth (0 when no scope is open)
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare a symbol in the innermost scope. Returns false if the name
    /// is already taken in that scope.
    pub fn define(&mut self, entry: SymbolEntry) -> bool {
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            None => return false,
        };
        if scope.entries.contains_key(&entry.name) {
            return false;
        }
        scope.entries.insert(entry.name.clone(), entry);
        true
    }

    /// Resolve a name, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.entries.get(name))
    }

    /// Resolve a name in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.last().and_then(|scope| scope.entries.get(name))
    }

    fn is_global_scope(&self) -> bool {
        self.scopes.last().is_some_and(|scope| scope.level == 0)
    }
}

/// Two types can appear together in a binary expression or assignment if
/// they have the same kind, are pointers to compatible types, or are both
/// numeric (Int, Float, Double).
pub fn is_type_compatible(left: &Type, right: &Type) -> bool {
    if left.kind == right.kind {
        return true;
    }

    if let (TypeKind::Pointer(left_base), TypeKind::Pointer(right_base)) =
        (&left.kind, &right.kind)
    {
        return is_type_compatible(left_base, right_base);
    }

    is_numeric(left) && is_numeric(right)
}

fn is_numeric(ty: &Type) -> bool {
    matches!(ty.kind, TypeKind::Int | TypeKind::Float | TypeKind::Double)
}

/// Promoted result type of a binary expression over compatible operands.
/// Double wins over Float, Float over Int.
pub fn common_type(left: &Type, right: &Type) -> Option<Type> {
    if !is_type_compatible(left, right) {
        return None;
    }

    if left.kind == right.kind {
        return Some(left.clone());
    }
    if left.kind == TypeKind::Double || right.kind == TypeKind::Double {
        return Some(Type::basic(TypeKind::Double));
    }
    if left.kind == TypeKind::Float || right.kind == TypeKind::Float {
        return Some(Type::basic(TypeKind::Float));
    }
    Some(Type::basic(TypeKind::Int))
}

/// The semantic analyzer state
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    /// Return type of the enclosing function, if any
    current_return_type: Option<Type>,
    in_loop: bool,
    errors: Vec<Error>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            current_return_type: None,
            in_loop: false,
            errors: Vec::new(),
        }
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Analyze a whole program
    pub fn analyze_program(&mut self, program: &mut Stmt) {
        self.check_statement(program);
    }

    fn error(&mut self, error: Error) {
        self.errors.push(error);
    }

    // ==================== Statements ====================

    pub fn check_statement(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::If { .. } => self.check_if_statement(stmt),
            StmtKind::While { .. } | StmtKind::For { .. } => self.check_loop_statement(stmt),
            StmtKind::Return { .. } => self.check_return_statement(stmt),
            StmtKind::Declaration { .. } => self.check_declaration(stmt),
            StmtKind::Compound { statements } => {
                self.symbols.enter_scope();
                for statement in statements {
                    self.check_statement(statement);
                }
                self.symbols.exit_scope();
            }
            StmtKind::Expression { expr } => {
                self.check_expression(expr);
            }
        }
    }

    fn check_if_statement(&mut self, stmt: &mut Stmt) {
        let span = stmt.token.span;
        if let StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } = &mut stmt.kind
        {
            let condition_type = self.check_expression(condition);
            if condition_type.is_some_and(|ty| ty.kind != TypeKind::Bool) {
                self.error(Error::NonBooleanCondition { span });
            }

            self.check_statement(then_branch);
            if let Some(else_branch) = else_branch {
                self.check_statement(else_branch);
            }
        }
    }

    fn check_loop_statement(&mut self, stmt: &mut Stmt) {
        let was_in_loop = self.in_loop;
        self.in_loop = true;

        let span = stmt.token.span;
        match &mut stmt.kind {
            StmtKind::While { condition, body } => {
                let condition_type = self.check_expression(condition);
                if condition_type.is_some_and(|ty| ty.kind != TypeKind::Bool) {
                    self.error(Error::NonBooleanCondition { span });
                }
                self.check_statement(body);
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                if let Some(initializer) = initializer {
                    self.check_statement(initializer);
                }
                if let Some(condition) = condition {
                    let condition_type = self.check_expression(condition);
                    if condition_type.is_some_and(|ty| ty.kind != TypeKind::Bool) {
                        self.error(Error::NonBooleanCondition { span });
                    }
                }
                if let Some(increment) = increment {
                    self.check_statement(increment);
                }
                self.check_statement(body);
            }
            _ => {}
        }

        self.in_loop = was_in_loop;
    }

    fn check_return_statement(&mut self, stmt: &mut Stmt) {
        let span = stmt.token.span;

        let return_type = match self.current_return_type.clone() {
            Some(ty) => ty,
            None => {
                self.error(Error::ReturnOutsideFunction { span });
                return;
            }
        };

        if let StmtKind::Return { value } = &mut stmt.kind {
            match value {
                Some(value) => {
                    if let Some(value_type) = self.check_expression(value) {
                        if !is_type_compatible(&return_type, &value_type) {
                            self.error(Error::ReturnTypeMismatch { span });
                        }
                    }
                }
                None => {
                    if return_type.kind != TypeKind::Void {
                        self.error(Error::MissingReturnValue { span });
                    }
                }
            }
        }
    }

    fn check_declaration(&mut self, stmt: &mut Stmt) {
        if let StmtKind::Declaration { name, initializer } = &mut stmt.kind {
            let name = name.clone();

            if self.symbols.lookup_local(&name.lexeme).is_some() {
                self.error(Error::DuplicateDeclaration {
                    name: name.lexeme.clone(),
                    span: name.span,
                });
                return;
            }

            if let Some(initializer) = initializer {
                if self.check_expression(initializer).is_none() {
                    return;
                }
            }

            // Declarations resolve to int until type specifiers are wired up
            self.symbols.define(SymbolEntry {
                name: name.lexeme.clone(),
                ty: Type::basic(TypeKind::Int),
                kind: SymbolKind::Variable {
                    is_global: self.symbols.is_global_scope(),
                    offset: 0,
                },
                is_defined: true,
            });
        }
    }

    // ==================== Expressions ====================

    /// Resolve the type of an expression, recording it on the node.
    /// Returns `None` when the expression is ill-typed; diagnostics for
    /// the failure have already been recorded.
    pub fn check_expression(&mut self, expr: &mut Expr) -> Option<Type> {
        let resolved = match &mut expr.kind {
            ExprKind::Binary { left, right } => {
                let span = expr.token.span;
                let left_type = self.check_expression(left);
                let right_type = self.check_expression(right);

                match (left_type, right_type) {
                    (Some(left_type), Some(right_type))
                        if is_type_compatible(&left_type, &right_type) =>
                    {
                        common_type(&left_type, &right_type)
                    }
                    _ => {
                        self.error(Error::BinaryTypeMismatch { span });
                        None
                    }
                }
            }
            ExprKind::Unary { operand, .. } => {
                let operand_type = self.check_expression(operand)?;
                match expr.token.kind {
                    TokenKind::Minus | TokenKind::Bang => Some(operand_type),
                    _ => {
                        self.error(Error::InvalidUnaryOperator {
                            span: expr.token.span,
                        });
                        None
                    }
                }
            }
            ExprKind::Literal => match expr.token.kind {
                TokenKind::IntLiteral(_) => Some(Type::basic(TypeKind::Int)),
                TokenKind::FloatLiteral(_) => Some(Type::basic(TypeKind::Float)),
                TokenKind::StringLiteral(_) => Some(Type::basic_const(TypeKind::Char)),
                _ => {
                    self.error(Error::InvalidLiteral {
                        span: expr.token.span,
                    });
                    None
                }
            },
            ExprKind::Identifier => match self.symbols.lookup(&expr.token.lexeme) {
                Some(entry) => Some(entry.ty.clone()),
                None => {
                    self.error(Error::UndefinedVariable {
                        name: expr.token.lexeme.clone(),
                        span: expr.token.span,
                    });
                    None
                }
            },
            ExprKind::Call { callee, .. } => {
                let callee_type = self.check_expression(callee)?;
                match callee_type.kind {
                    TypeKind::Function { return_type, .. } => Some(*return_type),
                    _ => {
                        self.error(Error::NotCallable {
                            span: expr.token.span,
                        });
                        None
                    }
                }
            }
        };

        expr.ty = resolved.clone();
        resolved
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::token::Token;
    use crate::utils::Span;
    use pretty_assertions::assert_eq;

    fn analyze(source: &str) -> (Stmt, SemanticAnalyzer) {
        let mut parser = Parser::new(source);
        let mut program = parser.parse_program();
        assert!(!parser.had_error(), "parse failed: {:?}", parser.error());

        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze_program(&mut program);
        (program, analyzer)
    }

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Span::dummy())
    }

    #[test]
    fn test_symbol_table_scoping() {
        let mut table = SymbolTable::new();
        table.enter_scope();

        let entry = SymbolEntry {
            name: "x".to_string(),
            ty: Type::basic(TypeKind::Int),
            kind: SymbolKind::Variable {
                is_global: true,
                offset: 0,
            },
            is_defined: true,
        };
        assert!(table.define(entry.clone()));
        // Same scope, same name
        assert!(!table.define(entry.clone()));

        table.enter_scope();
        // Shadowing is legal in an inner scope
        assert!(table.define(entry.clone()));
        assert!(table.lookup_local("x").is_some());
        table.exit_scope();

        // Inner entry dropped with its scope
        assert!(table.lookup("x").is_some());
        table.exit_scope();
        assert!(table.lookup("x").is_none());
    }

    #[test]
    fn test_shadowing_is_legal() {
        let (_, analyzer) = analyze("var x = 10; { var x = 20; } x = 30;");
        assert!(!analyzer.had_error(), "errors: {:?}", analyzer.errors());
    }

    #[test]
    fn test_duplicate_declaration() {
        let (_, analyzer) = analyze("{ var x = 1; var x = 2; }");

        assert!(analyzer.had_error());
        assert!(matches!(
            analyzer.errors()[0],
            Error::DuplicateDeclaration { ref name, .. } if name == "x"
        ));
    }

    #[test]
    fn test_undefined_variable() {
        let (_, analyzer) = analyze("x = 42;");

        assert!(analyzer.had_error());
        // The unresolved identifier also poisons the enclosing assignment
        assert!(matches!(
            analyzer.errors()[0],
            Error::UndefinedVariable { ref name, .. } if name == "x"
        ));
        assert!(analyzer
            .errors()
            .iter()
            .any(|e| matches!(e, Error::BinaryTypeMismatch { .. })));
    }

    #[test]
    fn test_condition_must_be_bool() {
        let (_, analyzer) = analyze("var x = 1; if (x) { x; }");

        assert!(analyzer.had_error());
        assert!(matches!(
            analyzer.errors()[0],
            Error::NonBooleanCondition { .. }
        ));
    }

    #[test]
    fn test_comparison_result_is_not_bool() {
        // Comparisons resolve to the promoted operand type, so a
        // comparison condition is rejected too
        let (_, analyzer) = analyze("while (1 < 2) { 1; }");

        assert!(analyzer.had_error());
        assert!(matches!(
            analyzer.errors()[0],
            Error::NonBooleanCondition { .. }
        ));
    }

    #[test]
    fn test_return_outside_function() {
        let (_, analyzer) = analyze("return 1;");

        assert!(analyzer.had_error());
        assert!(matches!(
            analyzer.errors()[0],
            Error::ReturnOutsideFunction { .. }
        ));
    }

    #[test]
    fn test_return_type_checks() {
        let mut parser = Parser::new("return; return \"text\"; return 2;");
        let mut program = parser.parse_program();
        assert!(!parser.had_error());

        let mut analyzer = SemanticAnalyzer::new();
        analyzer.current_return_type = Some(Type::basic(TypeKind::Int));
        analyzer.analyze_program(&mut program);

        assert_eq!(analyzer.errors().len(), 2);
        assert!(matches!(
            analyzer.errors()[0],
            Error::MissingReturnValue { .. }
        ));
        assert!(matches!(
            analyzer.errors()[1],
            Error::ReturnTypeMismatch { .. }
        ));
    }

    #[test]
    fn test_call_of_non_function() {
        let (_, analyzer) = analyze("var x = 1; x();");

        assert!(analyzer.had_error());
        assert!(matches!(analyzer.errors()[0], Error::NotCallable { .. }));
    }

    #[test]
    fn test_call_of_function_symbol() {
        let mut parser = Parser::new("getint();");
        let mut program = parser.parse_program();
        assert!(!parser.had_error());

        let mut analyzer = SemanticAnalyzer::new();
        analyzer.symbols.enter_scope();
        analyzer.symbols.define(SymbolEntry {
            name: "getint".to_string(),
            ty: Type::function(Type::basic(TypeKind::Int), vec![]),
            kind: SymbolKind::Function {
                params: vec![],
                is_variadic: false,
            },
            is_defined: true,
        });
        analyzer.analyze_program(&mut program);

        assert!(!analyzer.had_error(), "errors: {:?}", analyzer.errors());
    }

    #[test]
    fn test_invalid_unary_operator() {
        let mut expr = Expr::unary(
            Expr::literal(tok(TokenKind::IntLiteral(1), "1")),
            true,
            tok(TokenKind::Star, "*"),
        );

        let mut analyzer = SemanticAnalyzer::new();
        assert!(analyzer.check_expression(&mut expr).is_none());
        assert!(matches!(
            analyzer.errors()[0],
            Error::InvalidUnaryOperator { .. }
        ));
    }

    #[test]
    fn test_float_initializer_is_not_an_error() {
        // Numeric kinds are mutually compatible, so a float initializer
        // on an int-typed declaration passes
        let (_, analyzer) = analyze("var x = 3.14; x = 1;");
        assert!(!analyzer.had_error(), "errors: {:?}", analyzer.errors());
    }

    #[test]
    fn test_numeric_promotion() {
        let int_ty = Type::basic(TypeKind::Int);
        let float_ty = Type::basic(TypeKind::Float);
        let double_ty = Type::basic(TypeKind::Double);

        assert_eq!(common_type(&int_ty, &int_ty), Some(int_ty.clone()));
        assert_eq!(common_type(&int_ty, &float_ty), Some(float_ty.clone()));
        assert_eq!(common_type(&float_ty, &double_ty), Some(double_ty.clone()));
        assert_eq!(common_type(&int_ty, &double_ty), Some(double_ty));

        let char_ty = Type::basic(TypeKind::Char);
        assert_eq!(common_type(&int_ty, &char_ty), None);
    }

    #[test]
    fn test_pointer_compatibility() {
        let int_ptr = Type::pointer(Type::basic(TypeKind::Int));
        let float_ptr = Type::pointer(Type::basic(TypeKind::Float));
        let char_ptr = Type::pointer(Type::basic(TypeKind::Char));

        assert!(is_type_compatible(&int_ptr, &int_ptr));
        // Pointer bases follow the numeric rule recursively
        assert!(is_type_compatible(&int_ptr, &float_ptr));
        assert!(!is_type_compatible(&int_ptr, &char_ptr));
    }

    #[test]
    fn test_resolved_types_written_to_nodes() {
        let (program, analyzer) = analyze("1 + 2.5;");
        assert!(!analyzer.had_error());

        let statements = match &program.kind {
            StmtKind::Compound { statements } => statements,
            _ => panic!("program root must be a compound statement"),
        };
        let expr = match &statements[0].kind {
            StmtKind::Expression { expr } => expr,
            other => panic!("expected expression statement, got {other:?}"),
        };
        assert_eq!(expr.ty, Some(Type::basic(TypeKind::Float)));
    }

    #[test]
    fn test_string_literal_is_const_char() {
        let mut expr = Expr::literal(tok(TokenKind::StringLiteral("hi".to_string()), "\"hi\""));

        let mut analyzer = SemanticAnalyzer::new();
        let ty = analyzer.check_expression(&mut expr).expect("a type");
        assert_eq!(ty.kind, TypeKind::Char);
        assert!(ty.is_const);
    }
}
