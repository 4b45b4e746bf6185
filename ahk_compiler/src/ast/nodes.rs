//! AST node definitions for AutoHotkey v2 scripts
//!
//! Every node carries the [`Span`] of the source it was parsed from. Enums are
//! internally tagged (`"type"`) so the JSON form reads like the node kinds.

use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Identifier = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    pub span: Span,
}

// === STATEMENTS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    Expression {
        expression: Expression,
        span: Span,
    },
    /// Bare call statement: `MsgBox "hi"`, `Foo()`, `this.Reset`
    FunctionCall {
        callee: Expression,
        arguments: Vec<Expression>,
        span: Span,
    },
    Hotkey {
        trigger: String,
        body: Option<Box<Statement>>,
        span: Span,
    },
    /// `a::b`
    Remap {
        trigger: String,
        target: String,
        span: Span,
    },
    Hotstring {
        options: String,
        trigger: String,
        /// Replacement text for auto-replace hotstrings
        expansion: Option<String>,
        /// Action for execute hotstrings (`X` option or a block)
        body: Option<Box<Statement>>,
        span: Span,
    },
    Directive {
        name: String,
        value: Option<String>,
        /// Condition of `#HotIf`
        condition: Option<Expression>,
        span: Span,
    },
    Label {
        name: Identifier,
        span: Span,
    },
    Block {
        body: Vec<Statement>,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Loop {
        kind: LoopKind,
        arguments: Vec<Expression>,
        body: Box<Statement>,
        until: Option<Expression>,
        span: Span,
    },
    For {
        key: Identifier,
        value: Option<Identifier>,
        iterable: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Switch {
        subject: Option<Expression>,
        cases: Vec<SwitchCase>,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Break {
        label: Option<Identifier>,
        span: Span,
    },
    Continue {
        label: Option<Identifier>,
        span: Span,
    },
    Goto {
        label: Identifier,
        span: Span,
    },
    Throw {
        value: Option<Expression>,
        span: Span,
    },
    Try {
        body: Box<Statement>,
        catch: Option<CatchClause>,
        finally: Option<Box<Statement>>,
        span: Span,
    },
    Function(FunctionDefinition),
    Class(ClassDefinition),
    VariableDeclaration {
        scope: DeclarationScope,
        declarations: Vec<Declarator>,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Expression { span, .. }
            | Statement::FunctionCall { span, .. }
            | Statement::Hotkey { span, .. }
            | Statement::Remap { span, .. }
            | Statement::Hotstring { span, .. }
            | Statement::Directive { span, .. }
            | Statement::Label { span, .. }
            | Statement::Block { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::Loop { span, .. }
            | Statement::For { span, .. }
            | Statement::Switch { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span, .. }
            | Statement::Continue { span, .. }
            | Statement::Goto { span, .. }
            | Statement::Throw { span, .. }
            | Statement::Try { span, .. }
            | Statement::VariableDeclaration { span, .. } => *span,
            Statement::Function(function) => function.span,
            Statement::Class(class) => class.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Expression { .. } => "Expression",
            Statement::FunctionCall { .. } => "FunctionCall",
            Statement::Hotkey { .. } => "Hotkey",
            Statement::Remap { .. } => "Remap",
            Statement::Hotstring { .. } => "Hotstring",
            Statement::Directive { .. } => "Directive",
            Statement::Label { .. } => "Label",
            Statement::Block { .. } => "Block",
            Statement::If { .. } => "If",
            Statement::While { .. } => "While",
            Statement::Loop { .. } => "Loop",
            Statement::For { .. } => "For",
            Statement::Switch { .. } => "Switch",
            Statement::Return { .. } => "Return",
            Statement::Break { .. } => "Break",
            Statement::Continue { .. } => "Continue",
            Statement::Goto { .. } => "Goto",
            Statement::Throw { .. } => "Throw",
            Statement::Try { .. } => "Try",
            Statement::Function(_) => "Function",
            Statement::Class(_) => "Class",
            Statement::VariableDeclaration { .. } => "VariableDeclaration",
        }
    }

    /// Statements after which the rest of a block cannot run
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Statement::Return { .. }
                | Statement::Break { .. }
                | Statement::Continue { .. }
                | Statement::Goto { .. }
                | Statement::Throw { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    Count,
    Parse,
    Read,
    Files,
    Reg,
}

impl LoopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopKind::Count => "Count",
            LoopKind::Parse => "Parse",
            LoopKind::Read => "Read",
            LoopKind::Files => "Files",
            LoopKind::Reg => "Reg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Empty for the `default:` branch
    pub values: Vec<Expression>,
    pub is_default: bool,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub error_class: Option<Identifier>,
    pub variable: Option<Identifier>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationScope {
    Global,
    Local,
    Static,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: Identifier,
    pub value: Option<Expression>,
    pub span: Span,
}

// === FUNCTIONS AND CLASSES ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Identifier,
    /// `&name`
    pub by_ref: bool,
    /// `name*`, or a lone `*`
    pub variadic: bool,
    /// `name?`
    pub optional: bool,
    pub default: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    /// A fat-arrow body is stored as a single `Return`
    pub body: Vec<Statement>,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: Identifier,
    /// Dotted base class name (`Gui.Control`)
    pub extends: Option<String>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClassMember {
    Method(FunctionDefinition),
    Property {
        name: Identifier,
        is_static: bool,
        params: Vec<Parameter>,
        getter: Option<Vec<Statement>>,
        setter: Option<Vec<Statement>>,
        span: Span,
    },
    Field {
        name: Identifier,
        is_static: bool,
        value: Option<Expression>,
        span: Span,
    },
    Class(ClassDefinition),
}

impl ClassMember {
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Method(function) => &function.name,
            ClassMember::Property { name, .. } | ClassMember::Field { name, .. } => name,
            ClassMember::Class(class) => &class.name,
        }
    }
}

// === EXPRESSIONS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier {
        name: Identifier,
        span: Span,
    },
    Number {
        value: f64,
        raw: String,
        span: Span,
    },
    /// Text between the quotes, escapes left as written
    String {
        value: String,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        span: Span,
    },
    Postfix {
        operator: PostfixOperator,
        operand: Box<Expression>,
        span: Span,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    Member {
        object: Box<Expression>,
        property: Identifier,
        /// `?.`
        optional: bool,
        span: Span,
    },
    /// `obj.%name%`
    DynamicMember {
        object: Box<Expression>,
        property: Box<Expression>,
        span: Span,
    },
    Index {
        object: Box<Expression>,
        indices: Vec<Expression>,
        span: Span,
    },
    Ternary {
        condition: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        span: Span,
    },
    Array {
        elements: Vec<Expression>,
        span: Span,
    },
    Object {
        properties: Vec<ObjectProperty>,
        span: Span,
    },
    /// `%expr%`
    Deref {
        expression: Box<Expression>,
        span: Span,
    },
    /// Name built from adjacent pieces: `var%n%`, `%a%%b%`
    DynamicIdentifier {
        parts: Vec<Expression>,
        span: Span,
    },
    FatArrow {
        params: Vec<Parameter>,
        body: Box<Expression>,
        span: Span,
    },
    /// `a := 1, b := 2`
    Sequence {
        expressions: Vec<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier { span, .. }
            | Expression::Number { span, .. }
            | Expression::String { span, .. }
            | Expression::Boolean { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Postfix { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Call { span, .. }
            | Expression::Member { span, .. }
            | Expression::DynamicMember { span, .. }
            | Expression::Index { span, .. }
            | Expression::Ternary { span, .. }
            | Expression::Array { span, .. }
            | Expression::Object { span, .. }
            | Expression::Deref { span, .. }
            | Expression::DynamicIdentifier { span, .. }
            | Expression::FatArrow { span, .. }
            | Expression::Sequence { span, .. } => *span,
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Expression::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Valid left-hand side of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Identifier { .. }
                | Expression::Member { .. }
                | Expression::DynamicMember { .. }
                | Expression::Index { .. }
                | Expression::Deref { .. }
                | Expression::DynamicIdentifier { .. }
                | Expression::Array { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
    pub span: Span,
}

// === OPERATORS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Power,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    ShiftRightLogical,
    And,
    Or,
    NullCoalesce,
    Equal,
    NotEqual,
    IdentityEqual,
    IdentityNotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    RegexMatch,
    Is,
    In,
    Contains,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::IntegerDivide => "//",
            Self::Power => "**",
            Self::Concat => ".",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::ShiftRightLogical => ">>>",
            Self::And => "&&",
            Self::Or => "||",
            Self::NullCoalesce => "??",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::IdentityEqual => "==",
            Self::IdentityNotEqual => "!==",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::RegexMatch => "~=",
            Self::Is => "is",
            Self::In => "in",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    /// `&var`
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Concat,
    BitOr,
    BitAnd,
    BitXor,
    ShiftLeft,
    ShiftRight,
    ShiftRightLogical,
    Power,
    NullCoalesce,
}

impl AssignmentOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => ":=",
            Self::Add => "+=",
            Self::Subtract => "-=",
            Self::Multiply => "*=",
            Self::Divide => "/=",
            Self::IntegerDivide => "//=",
            Self::Concat => ".=",
            Self::BitOr => "|=",
            Self::BitAnd => "&=",
            Self::BitXor => "^=",
            Self::ShiftLeft => "<<=",
            Self::ShiftRight => ">>=",
            Self::ShiftRightLogical => ">>>=",
            Self::Power => "**=",
            Self::NullCoalesce => "??=",
        }
    }
}

impl fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expression {
        Expression::Identifier {
            name: name.to_string(),
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_statement_serializes_with_type_tag() {
        let statement = Statement::Return {
            value: Some(ident("x")),
            span: Span::dummy(),
        };
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["type"], "Return");
        assert_eq!(json["value"]["type"], "Identifier");
        assert_eq!(json["value"]["name"], "x");
    }

    #[test]
    fn test_function_statement_serializes_flat() {
        let statement = Statement::Function(FunctionDefinition {
            name: "Add".to_string(),
            params: Vec::new(),
            body: Vec::new(),
            is_static: false,
            span: Span::dummy(),
        });
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["type"], "Function");
        assert_eq!(json["name"], "Add");
    }

    #[test]
    fn test_terminators() {
        let ret = Statement::Return {
            value: None,
            span: Span::dummy(),
        };
        let label = Statement::Label {
            name: "Top".to_string(),
            span: Span::dummy(),
        };
        assert!(ret.is_terminator());
        assert!(!label.is_terminator());
    }

    #[test]
    fn test_assignable_targets() {
        assert!(ident("x").is_assignable());
        let number = Expression::Number {
            value: 1.0,
            raw: "1".to_string(),
            span: Span::dummy(),
        };
        assert!(!number.is_assignable());
    }
}
