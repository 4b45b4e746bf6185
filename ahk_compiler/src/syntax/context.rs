//! Grammar rule context chain
//!
//! The parser builds one [`RuleContext`] per rule invocation on its own call
//! stack, each pointing at its caller. Predicates only read the chain.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Program,
    Statement,
    Block,
    Switch,
    CaseClause,
    Function,
    Class,
    Loop,
    Hotkey,
    Hotstring,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Program => "program",
            RuleKind::Statement => "statement",
            RuleKind::Block => "block",
            RuleKind::Switch => "switch",
            RuleKind::CaseClause => "case clause",
            RuleKind::Function => "function",
            RuleKind::Class => "class",
            RuleKind::Loop => "loop",
            RuleKind::Hotkey => "hotkey",
            RuleKind::Hotstring => "hotstring",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub kind: RuleKind,
    pub parent: Option<&'a RuleContext<'a>>,
    depth: usize,
}

impl<'a> RuleContext<'a> {
    pub fn root() -> RuleContext<'static> {
        RuleContext {
            kind: RuleKind::Program,
            parent: None,
            depth: 0,
        }
    }

    pub fn child<'b>(&'b self, kind: RuleKind) -> RuleContext<'b>
    where
        'a: 'b,
    {
        RuleContext {
            kind,
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    /// Number of ancestors above this context
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// This context followed by its ancestors, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = &RuleContext<'a>> {
        std::iter::successors(Some(self), |ctx| ctx.parent)
    }

    /// Innermost context (self included) whose kind is one of `kinds`
    pub fn nearest(&self, kinds: &[RuleKind]) -> Option<RuleKind> {
        self.ancestors()
            .map(|ctx| ctx.kind)
            .find(|kind| kinds.contains(kind))
    }

    /// `program -> block -> case clause`, outermost first
    pub fn describe(&self) -> String {
        let mut kinds = self.ancestors().map(|ctx| ctx.kind.as_str()).collect::<Vec<_>>();
        kinds.reverse();
        kinds.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_chain() {
        let root = RuleContext::root();
        let block = root.child(RuleKind::Block);
        let case = block.child(RuleKind::CaseClause);
        assert_eq!(case.depth(), 2);
        assert_eq!(case.ancestors().count(), 3);
        assert_eq!(case.describe(), "program -> block -> case clause");
    }

    #[test]
    fn test_nearest_stops_at_first_match() {
        let root = RuleContext::root();
        let case = root.child(RuleKind::CaseClause);
        let block = case.child(RuleKind::Block);
        assert_eq!(
            block.nearest(&[RuleKind::CaseClause, RuleKind::Block]),
            Some(RuleKind::Block)
        );
        assert_eq!(case.nearest(&[RuleKind::Function]), None);
    }
}
