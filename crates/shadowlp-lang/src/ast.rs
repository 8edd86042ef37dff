use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub objective: Objective,
    pub constraints: Vec<ConstraintStmt>,
    pub non_negativity: Option<NonNegativity>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub span: Span,
    pub terms: Vec<Term>,
}

/// `coefficient * variable`, or a bare constant when `variable` is `None`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: Option<VarRef>,
}

/// A variable as written, e.g. `X3` has `number == 3`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub span: Span,
    pub number: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintStmt {
    pub span: Span,
    pub terms: Vec<Term>,
    pub relation: Relation,
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le, // <=
    Ge, // >=
}

/// Trailing `X1, X2, ... >= 0` line.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NonNegativity {
    pub span: Span,
    pub variables: Vec<VarRef>,
    /// The list used `...` or a symbolic `Xn`
    pub elided: bool,
}
