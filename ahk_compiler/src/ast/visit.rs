//! Read-only traversal over the statement tree
//!
//! Walks statements depth-first in source order. Function and method bodies,
//! class members, case bodies and hotkey actions are all entered.

use super::nodes::*;

pub trait Visitor {
    /// Called for every statement, before its children
    fn visit_statement(&mut self, _statement: &Statement, _depth: usize) {}

    /// Called for top-level functions and class methods
    fn visit_function(&mut self, _function: &FunctionDefinition, _depth: usize) {}

    fn visit_class(&mut self, _class: &ClassDefinition, _depth: usize) {}

    /// Called for every statement list (program body, blocks, function bodies)
    fn visit_body(&mut self, _body: &[Statement], _depth: usize) {}
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    walk_body(visitor, &program.body, 0);
}

pub fn walk_body<V: Visitor + ?Sized>(visitor: &mut V, body: &[Statement], depth: usize) {
    visitor.visit_body(body, depth);
    for statement in body {
        walk_statement(visitor, statement, depth);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement, depth: usize) {
    visitor.visit_statement(statement, depth);
    let inner = depth + 1;

    match statement {
        Statement::Block { body, .. } => walk_body(visitor, body, inner),
        Statement::Hotkey { body, .. } | Statement::Hotstring { body, .. } => {
            if let Some(body) = body {
                walk_statement(visitor, body, inner);
            }
        }
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_statement(visitor, then_branch, inner);
            if let Some(else_branch) = else_branch {
                walk_statement(visitor, else_branch, inner);
            }
        }
        Statement::While { body, .. }
        | Statement::Loop { body, .. }
        | Statement::For { body, .. } => walk_statement(visitor, body, inner),
        Statement::Switch { cases, .. } => {
            for case in cases {
                walk_body(visitor, &case.body, inner);
            }
        }
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            walk_statement(visitor, body, inner);
            if let Some(catch) = catch {
                walk_statement(visitor, &catch.body, inner);
            }
            if let Some(finally) = finally {
                walk_statement(visitor, finally, inner);
            }
        }
        Statement::Function(function) => walk_function(visitor, function, depth),
        Statement::Class(class) => walk_class(visitor, class, depth),
        _ => {}
    }
}

fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, function: &FunctionDefinition, depth: usize) {
    visitor.visit_function(function, depth);
    walk_body(visitor, &function.body, depth + 1);
}

fn walk_class<V: Visitor + ?Sized>(visitor: &mut V, class: &ClassDefinition, depth: usize) {
    visitor.visit_class(class, depth);
    let inner = depth + 1;
    for member in &class.members {
        match member {
            ClassMember::Method(method) => walk_function(visitor, method, inner),
            ClassMember::Property { getter, setter, .. } => {
                for accessor in [getter, setter].into_iter().flatten() {
                    walk_body(visitor, accessor, inner + 1);
                }
            }
            ClassMember::Class(nested) => walk_class(visitor, nested, inner),
            ClassMember::Field { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    #[derive(Default)]
    struct Counter {
        statements: usize,
        functions: usize,
        classes: usize,
        max_depth: usize,
    }

    impl Visitor for Counter {
        fn visit_statement(&mut self, _statement: &Statement, depth: usize) {
            self.statements += 1;
            self.max_depth = self.max_depth.max(depth);
        }

        fn visit_function(&mut self, _function: &FunctionDefinition, _depth: usize) {
            self.functions += 1;
        }

        fn visit_class(&mut self, _class: &ClassDefinition, _depth: usize) {
            self.classes += 1;
        }
    }

    fn ret() -> Statement {
        Statement::Return {
            value: None,
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_walk_enters_methods_and_branches() {
        let method = FunctionDefinition {
            name: "Run".to_string(),
            params: Vec::new(),
            body: vec![ret()],
            is_static: false,
            span: Span::dummy(),
        };
        let program = Program {
            body: vec![
                Statement::Class(ClassDefinition {
                    name: "Job".to_string(),
                    extends: None,
                    members: vec![ClassMember::Method(method)],
                    span: Span::dummy(),
                }),
                Statement::If {
                    condition: Expression::Boolean {
                        value: true,
                        span: Span::dummy(),
                    },
                    then_branch: Box::new(Statement::Block {
                        body: vec![ret()],
                        span: Span::dummy(),
                    }),
                    else_branch: None,
                    span: Span::dummy(),
                },
            ],
            span: Span::dummy(),
        };

        let mut counter = Counter::default();
        walk_program(&mut counter, &program);
        assert_eq!(counter.classes, 1);
        assert_eq!(counter.functions, 1);
        // class, method return, if, block, block return
        assert_eq!(counter.statements, 5);
        assert_eq!(counter.max_depth, 2);
    }
}
