//! Checks over a successfully parsed [`Program`]

use super::types::{DiagnosticRange, DiagnosticSink};
use crate::ast::*;
use std::collections::HashSet;

/// Statements that are not executed in sequence, so they stay reachable
/// after a `return` (function and class definitions, hotkeys, labels)
fn is_hoisted(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Label { .. }
            | Statement::Function(_)
            | Statement::Class(_)
            | Statement::Hotkey { .. }
            | Statement::Remap { .. }
            | Statement::Hotstring { .. }
            | Statement::Directive { .. }
    )
}

struct UnreachableCode<'s> {
    sink: &'s mut DiagnosticSink,
}

impl Visitor for UnreachableCode<'_> {
    fn visit_body(&mut self, body: &[Statement], _depth: usize) {
        let Some(index) = body.iter().position(Statement::is_terminator) else {
            return;
        };
        if let Some(next) = body.get(index + 1).filter(|s| !is_hoisted(s)) {
            self.sink.warning(
                "UnreachableCode",
                format!(
                    "Unreachable code after {} statement",
                    body[index].kind_name().to_lowercase()
                ),
                DiagnosticRange::of_span(next.span()),
            );
        }
    }
}

pub fn check_unreachable_code(program: &Program, sink: &mut DiagnosticSink) {
    walk_program(&mut UnreachableCode { sink }, program);
}

/// Function names are case-insensitive; the second and later definitions
/// in one scope are reported
fn report_duplicates<'f>(
    functions: impl Iterator<Item = &'f FunctionDefinition>,
    scope: &str,
    sink: &mut DiagnosticSink,
) {
    let mut seen = HashSet::new();
    for function in functions {
        if seen.insert(function.name.to_lowercase()) {
            continue;
        }
        let start = function.span.start;
        let width = function.name.chars().count() as u32;
        sink.error(
            "DuplicateFunction",
            format!("Duplicate function declaration: {}{}", function.name, scope),
            DiagnosticRange::new(
                (start.line, start.column),
                (start.line, start.column + width),
            ),
        );
    }
}

struct DuplicateMethods<'s> {
    sink: &'s mut DiagnosticSink,
}

impl Visitor for DuplicateMethods<'_> {
    fn visit_class(&mut self, class: &ClassDefinition, _depth: usize) {
        // static and instance methods live on different objects
        for is_static in [false, true] {
            let methods = class.members.iter().filter_map(|member| match member {
                ClassMember::Method(method) if method.is_static == is_static => Some(method),
                _ => None,
            });
            report_duplicates(methods, &format!(" in class {}", class.name), self.sink);
        }
    }
}

pub fn check_duplicate_functions(program: &Program, sink: &mut DiagnosticSink) {
    let functions = program.body.iter().filter_map(|statement| match statement {
        Statement::Function(function) => Some(function),
        _ => None,
    });
    report_duplicates(functions, "", sink);
    walk_program(&mut DuplicateMethods { sink }, program);
}
