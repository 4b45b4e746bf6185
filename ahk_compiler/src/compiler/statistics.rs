//! Size and complexity figures for a script

use crate::ast::*;
use crate::tokens::{Token, TokenType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatistics {
    pub lines: usize,
    /// Every lexical token except end of input
    pub tokens: usize,
    /// Functions and methods, nested ones included
    pub functions: usize,
    pub classes: usize,
    pub comments: usize,
    /// Hotkeys, remaps and hotstrings
    pub hotkeys: usize,
    /// 1 + functions + classes + ifs + 2 per loop
    pub complexity: usize,
}

impl SourceStatistics {
    pub fn from_tokens(source: &str, tokens: &[Token]) -> Self {
        Self {
            lines: source.split('\n').count(),
            tokens: tokens.iter().filter(|t| t.token_type != TokenType::Eof).count(),
            comments: tokens.iter().filter(|t| t.token_type.is_comment()).count(),
            complexity: 1,
            ..Self::default()
        }
    }

    /// Add the counts that need a parsed program
    pub fn add_program(&mut self, program: &Program) {
        let mut counter = StructureCounter::default();
        walk_program(&mut counter, program);

        self.functions = counter.functions;
        self.classes = counter.classes;
        self.hotkeys = counter.hotkeys;
        self.complexity = 1 + counter.functions + counter.classes + counter.branches;
    }
}

#[derive(Default)]
struct StructureCounter {
    functions: usize,
    classes: usize,
    hotkeys: usize,
    branches: usize,
}

impl Visitor for StructureCounter {
    fn visit_statement(&mut self, statement: &Statement, _depth: usize) {
        match statement {
            Statement::If { .. } => self.branches += 1,
            Statement::While { .. } | Statement::For { .. } | Statement::Loop { .. } => self.branches += 2,
            Statement::Hotkey { .. } | Statement::Remap { .. } | Statement::Hotstring { .. } => {
                self.hotkeys += 1
            }
            _ => {}
        }
    }

    fn visit_function(&mut self, _function: &FunctionDefinition, _depth: usize) {
        self.functions += 1;
    }

    fn visit_class(&mut self, _class: &ClassDefinition, _depth: usize) {
        self.classes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::syntax::parse;

    fn stats(source: &str) -> SourceStatistics {
        let tokens = tokenize(source).unwrap();
        let mut statistics = SourceStatistics::from_tokens(source, &tokens);
        statistics.add_program(&parse(source).unwrap());
        statistics
    }

    #[test]
    fn test_nested_control_flow_complexity() {
        let source = "Scan(items) {\n    for item in items {\n        if item {\n            while false {\n            }\n        }\n    }\n}\n";
        let statistics = stats(source);
        assert_eq!(statistics.functions, 1);
        // base + function + for + if + while
        assert_eq!(statistics.complexity, 1 + 1 + 2 + 1 + 2);
        assert_eq!(statistics.lines, 9);
    }

    #[test]
    fn test_counts_classes_hotkeys_and_comments() {
        let source = "; setup\nclass Tool {\n    Use() {\n    }\n}\nF1::Send(\"x\")\na::b\n::btw::by the way\n/* block */";
        let statistics = stats(source);
        assert_eq!(statistics.classes, 1);
        assert_eq!(statistics.functions, 1);
        assert_eq!(statistics.hotkeys, 3);
        assert_eq!(statistics.comments, 2);
        assert_eq!(statistics.complexity, 3);
    }

    #[test]
    fn test_empty_source() {
        let statistics = stats("");
        assert_eq!(statistics.lines, 1);
        assert_eq!(statistics.tokens, 0);
        assert_eq!(statistics.complexity, 1);
    }
}
