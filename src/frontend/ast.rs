//! Abstract syntax tree
//!
//! Expressions and statements carry the token that introduced them, so
//! diagnostics can point back into the source. Children are box-owned,
//! which makes every tree strict (no sharing, no cycles) and releases
//! each subtree exactly once when the root drops.

use crate::frontend::token::Token;

/// Resolved type of an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub is_const: bool,
    pub is_volatile: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Int,
    Float,
    Double,
    Pointer(Box<Type>),
    Array {
        elem: Box<Type>,
        size: usize,
    },
    Struct,
    Union,
    Function {
        return_type: Box<Type>,
        params: Vec<Type>,
    },
}

impl Type {
    pub fn basic(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: false,
            is_volatile: false,
        }
    }

    pub fn basic_const(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: true,
            is_volatile: false,
        }
    }

    pub fn pointer(base: Type) -> Self {
        Self {
            kind: TypeKind::Pointer(Box::new(base)),
            is_const: false,
            is_volatile: false,
        }
    }

    pub fn function(return_type: Type, params: Vec<Type>) -> Self {
        Self {
            kind: TypeKind::Function {
                return_type: Box::new(return_type),
                params,
            },
            is_const: false,
            is_volatile: false,
        }
    }
}

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Token that introduced this node (operator, literal, name, ...)
    pub token: Token,
    /// Resolved type, filled in by the semantic analyzer
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        operand: Box<Expr>,
        prefix: bool,
    },
    Literal,
    Identifier,
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(left: Expr, right: Expr, token: Token) -> Self {
        Self {
            kind: ExprKind::Binary {
                left: Box::new(left),
                right: Box::new(right),
            },
            token,
            ty: None,
        }
    }

    pub fn unary(operand: Expr, prefix: bool, token: Token) -> Self {
        Self {
            kind: ExprKind::Unary {
                operand: Box::new(operand),
                prefix,
            },
            token,
            ty: None,
        }
    }

    pub fn literal(token: Token) -> Self {
        Self {
            kind: ExprKind::Literal,
            token,
            ty: None,
        }
    }

    pub fn identifier(token: Token) -> Self {
        Self {
            kind: ExprKind::Identifier,
            token,
            ty: None,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>, token: Token) -> Self {
        Self {
            kind: ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            token,
            ty: None,
        }
    }

    /// Number of expression nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ExprKind::Binary { left, right } => 1 + left.node_count() + right.node_count(),
            ExprKind::Unary { operand, .. } => 1 + operand.node_count(),
            ExprKind::Literal | ExprKind::Identifier => 1,
            ExprKind::Call { callee, args } => {
                1 + callee.node_count() + args.iter().map(Expr::node_count).sum::<usize>()
            }
        }
    }
}

/// A statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    Return {
        value: Option<Expr>,
    },
    Declaration {
        name: Token,
        initializer: Option<Expr>,
    },
    Compound {
        statements: Vec<Stmt>,
    },
    Expression {
        expr: Expr,
    },
}

impl Stmt {
    pub fn if_stmt(
        condition: Expr,
        then_branch: Stmt,
        else_branch: Option<Stmt>,
        token: Token,
    ) -> Self {
        Self {
            kind: StmtKind::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            token,
        }
    }

    pub fn while_stmt(condition: Expr, body: Stmt, token: Token) -> Self {
        Self {
            kind: StmtKind::While {
                condition,
                body: Box::new(body),
            },
            token,
        }
    }

    pub fn for_stmt(
        initializer: Option<Stmt>,
        condition: Option<Expr>,
        increment: Option<Stmt>,
        body: Stmt,
        token: Token,
    ) -> Self {
        Self {
            kind: StmtKind::For {
                initializer: initializer.map(Box::new),
                condition,
                increment: increment.map(Box::new),
                body: Box::new(body),
            },
            token,
        }
    }

    pub fn return_stmt(value: Option<Expr>, token: Token) -> Self {
        Self {
            kind: StmtKind::Return { value },
            token,
        }
    }

    pub fn declaration(name: Token, initializer: Option<Expr>, token: Token) -> Self {
        Self {
            kind: StmtKind::Declaration { name, initializer },
            token,
        }
    }

    pub fn compound(statements: Vec<Stmt>, token: Token) -> Self {
        Self {
            kind: StmtKind::Compound { statements },
            token,
        }
    }

    pub fn expression(expr: Expr, token: Token) -> Self {
        Self {
            kind: StmtKind::Expression { expr },
            token,
        }
    }

    /// Number of statement and expression nodes in this subtree
    pub fn node_count(&self) -> usize {
        match &self.kind {
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                1 + condition.node_count()
                    + then_branch.node_count()
                    + else_branch.as_ref().map_or(0, |s| s.node_count())
            }
            StmtKind::While { condition, body } => {
                1 + condition.node_count() + body.node_count()
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                1 + initializer.as_ref().map_or(0, |s| s.node_count())
                    + condition.as_ref().map_or(0, Expr::node_count)
                    + increment.as_ref().map_or(0, |s| s.node_count())
                    + body.node_count()
            }
            StmtKind::Return { value } => 1 + value.as_ref().map_or(0, Expr::node_count),
            StmtKind::Declaration { initializer, .. } => {
                1 + initializer.as_ref().map_or(0, Expr::node_count)
            }
            StmtKind::Compound { statements } => {
                1 + statements.iter().map(Stmt::node_count).sum::<usize>()
            }
            StmtKind::Expression { expr } => 1 + expr.node_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::TokenKind;
    use crate::utils::Span;
    use pretty_assertions::assert_eq;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Span::dummy())
    }

    #[test]
    fn test_binary_tree_shape() {
        // 1 + 2 * 3 parsed as 1 + (2 * 3)
        let mul = Expr::binary(
            Expr::literal(tok(TokenKind::IntLiteral(2), "2")),
            Expr::literal(tok(TokenKind::IntLiteral(3), "3")),
            tok(TokenKind::Star, "*"),
        );
        let add = Expr::binary(
            Expr::literal(tok(TokenKind::IntLiteral(1), "1")),
            mul,
            tok(TokenKind::Plus, "+"),
        );

        assert_eq!(add.node_count(), 5);
        match &add.kind {
            ExprKind::Binary { right, .. } => {
                assert_eq!(right.token.kind, TokenKind::Star);
            }
            _ => panic!("expected binary node"),
        }
    }

    #[test]
    fn test_statement_node_count() {
        // { var x = 1; x; }
        let decl = Stmt::declaration(
            tok(TokenKind::Identifier, "x"),
            Some(Expr::literal(tok(TokenKind::IntLiteral(1), "1"))),
            tok(TokenKind::Var, "var"),
        );
        let use_x = Stmt::expression(
            Expr::identifier(tok(TokenKind::Identifier, "x")),
            tok(TokenKind::Identifier, "x"),
        );
        let block = Stmt::compound(vec![decl, use_x], tok(TokenKind::LBrace, "{"));

        // compound + declaration + literal + expression + identifier
        assert_eq!(block.node_count(), 5);
    }

    #[test]
    fn test_for_with_absent_clauses() {
        let body = Stmt::compound(vec![], tok(TokenKind::LBrace, "{"));
        let stmt = Stmt::for_stmt(None, None, None, body, tok(TokenKind::For, "for"));

        match &stmt.kind {
            StmtKind::For {
                initializer,
                condition,
                increment,
                ..
            } => {
                assert!(initializer.is_none());
                assert!(condition.is_none());
                assert!(increment.is_none());
            }
            _ => panic!("expected for node"),
        }
        assert_eq!(stmt.node_count(), 2);
    }

    #[test]
    fn test_types() {
        let int_ptr = Type::pointer(Type::basic(TypeKind::Int));
        match &int_ptr.kind {
            TypeKind::Pointer(base) => assert_eq!(base.kind, TypeKind::Int),
            _ => panic!("expected pointer type"),
        }

        let f = Type::function(Type::basic(TypeKind::Int), vec![]);
        assert!(!f.is_const);
        assert!(matches!(f.kind, TypeKind::Function { .. }));
    }
}
