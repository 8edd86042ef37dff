use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Statement after the non-negativity line at position {0:?}")]
    StatementAfterNonNegativity(Span),
}

/// Line-oriented parser for the textual problem format:
///
/// ```text
/// Max Z = 3 X1 + 5 X2
/// X1 <= 4
/// 2 X2 <= 12
/// 3 X1 + 2 X2 <= 18
/// X1, X2 >= 0
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn prev_end(&self, fallback: Span) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback.end)
    }

    fn skip_comments(&mut self) {
        while self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.skip_comments();
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    /// A statement must end at a newline or the end of input.
    fn end_of_line(&mut self) -> Result<(), ParseError> {
        self.skip_comments();
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.skip_blank_lines();
        let objective = self.parse_objective()?;
        self.end_of_line()?;

        let mut constraints = Vec::new();
        let mut non_negativity = None;

        loop {
            self.skip_blank_lines();
            if self.peek_kind() == TokenKind::Eof {
                break;
            }
            if non_negativity.is_some() {
                let span = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
                return Err(ParseError::StatementAfterNonNegativity(span));
            }

            if self.line_is_variable_list() {
                non_negativity = Some(self.parse_non_negativity()?);
            } else {
                constraints.push(self.parse_constraint()?);
            }
            self.end_of_line()?;
        }

        // A final `Xk >= 0` line is the non-negativity declaration of a
        // one-variable listing, not a constraint
        if non_negativity.is_none() {
            if let Some(nn) = constraints.last().and_then(single_bound) {
                constraints.pop();
                non_negativity = Some(nn);
            }
        }

        Ok(Program {
            objective,
            constraints,
            non_negativity,
        })
    }

    fn line_is_variable_list(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
            .any(|t| matches!(t.kind, TokenKind::Comma | TokenKind::Ellipsis))
    }

    fn parse_objective(&mut self) -> Result<Objective, ParseError> {
        let start = self.expect(TokenKind::Max)?.span;

        // Optional `Z =`
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Equals {
            self.advance();
            self.advance();
        }

        let terms = self.parse_expr()?;
        Ok(Objective {
            span: Span::new(start.start, self.prev_end(start)),
            terms,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintStmt, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let terms = self.parse_expr()?;

        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            _ => return Err(self.unexpected("<= or >=")),
        };
        self.advance();

        let sign = self.parse_sign();
        let rhs = sign * self.parse_number()?;

        Ok(ConstraintStmt {
            span: Span::new(start.start, self.prev_end(start)),
            terms,
            relation,
            rhs,
        })
    }

    fn parse_non_negativity(&mut self) -> Result<NonNegativity, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let mut variables = Vec::new();
        let mut elided = false;

        loop {
            match self.peek_kind() {
                TokenKind::Variable => variables.push(self.parse_variable()?),
                TokenKind::Ellipsis | TokenKind::Ident => {
                    self.advance();
                    elided = true;
                }
                _ => return Err(self.unexpected("variable")),
            }
            if self.peek_kind() != TokenKind::Comma {
                break;
            }
            self.advance();
        }

        self.expect(TokenKind::Ge)?;
        let zero = self.expect(TokenKind::Number)?;
        if parse_f64(&zero.text)? != 0.0 {
            return Err(ParseError::UnexpectedToken {
                expected: "0".to_string(),
                found: zero.text,
                span: zero.span,
            });
        }

        Ok(NonNegativity {
            span: Span::new(start.start, self.prev_end(start)),
            variables,
            elided,
        })
    }

    /// Sum of terms with `+`/`-` between them; a leading sign is allowed.
    fn parse_expr(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();
        let mut sign = self.parse_sign();

        loop {
            terms.push(self.parse_term(sign)?);
            if !matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
                break;
            }
            sign = self.parse_sign();
        }

        Ok(terms)
    }

    fn parse_sign(&mut self) -> f64 {
        let mut sign = 1.0;
        loop {
            match self.peek_kind() {
                TokenKind::Plus => {}
                TokenKind::Minus => sign = -sign,
                _ => return sign,
            }
            self.advance();
        }
    }

    fn parse_term(&mut self, sign: f64) -> Result<Term, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        let (coefficient, variable) = match self.peek_kind() {
            TokenKind::Variable => (1.0, Some(self.parse_variable()?)),
            TokenKind::Number => {
                let value = self.parse_number()?;
                let starred = self.peek_kind() == TokenKind::Star;
                if starred {
                    self.advance();
                }
                let variable = if starred || self.peek_kind() == TokenKind::Variable {
                    Some(self.parse_variable()?)
                } else {
                    None
                };
                (value, variable)
            }
            _ => return Err(self.unexpected("number or variable")),
        };

        Ok(Term {
            span: Span::new(start.start, self.prev_end(start)),
            coefficient: sign * coefficient,
            variable,
        })
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let token = self.expect(TokenKind::Number)?;
        parse_f64(&token.text)
    }

    fn parse_variable(&mut self) -> Result<VarRef, ParseError> {
        let token = self.expect(TokenKind::Variable)?;
        let number = token.text[1..]
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;
        Ok(VarRef {
            span: token.span,
            number,
        })
    }
}

fn parse_f64(text: &str) -> Result<f64, ParseError> {
    text.parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

fn single_bound(stmt: &ConstraintStmt) -> Option<NonNegativity> {
    match stmt.terms.as_slice() {
        [Term {
            coefficient,
            variable: Some(var),
            ..
        }] if *coefficient == 1.0 && stmt.relation == Relation::Ge && stmt.rhs == 0.0 => {
            Some(NonNegativity {
                span: stmt.span,
                variables: vec![var.clone()],
                elided: false,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_textbook() {
        let source = r#"
            # Max Z = 3 X1 + 5 X2
            Max Z = 3 X1 + 5 X2
            X1 <= 4
            2 X2 <= 12
            3 X1 + 2 X2 <= 18
            X1, X2 >= 0
        "#;
        let program = Parser::parse(source).unwrap();

        assert_eq!(program.objective.terms.len(), 2);
        assert_eq!(program.objective.terms[1].coefficient, 5.0);
        assert_eq!(program.constraints.len(), 3);
        assert_eq!(program.constraints[1].rhs, 12.0);
        assert_eq!(program.constraints[2].terms.len(), 2);

        let nn = program.non_negativity.unwrap();
        assert_eq!(nn.variables.len(), 2);
        assert!(!nn.elided);
    }

    #[test]
    fn test_signs_and_stars() {
        let program = Parser::parse("max 2*X1 - X2 + -3·X3\n-X1 + X2 >= -2").unwrap();

        let coefs: Vec<f64> = program.objective.terms.iter().map(|t| t.coefficient).collect();
        assert_eq!(coefs, vec![2.0, -1.0, -3.0]);

        let c = &program.constraints[0];
        assert_eq!(c.relation, Relation::Ge);
        assert_eq!(c.rhs, -2.0);
        assert_eq!(c.terms[0].coefficient, -1.0);
    }

    #[test]
    fn test_constant_term_is_kept() {
        let program = Parser::parse("Max Z = X1\n0 <= 5").unwrap();
        let term = &program.constraints[0].terms[0];
        assert_eq!(term.coefficient, 0.0);
        assert!(term.variable.is_none());
    }

    #[test]
    fn test_single_variable_bound_becomes_non_negativity() {
        let program = Parser::parse("Max Z = X1\nX1 <= 3\nX1 >= 0").unwrap();
        assert_eq!(program.constraints.len(), 1);
        assert_eq!(program.non_negativity.unwrap().variables[0].number, 1);

        // Only the last line is treated that way
        let program = Parser::parse("Max Z = X1\nX1 >= 0\nX1 <= 3").unwrap();
        assert_eq!(program.constraints.len(), 2);
        assert!(program.non_negativity.is_none());
    }

    #[test]
    fn test_elided_non_negativity() {
        let program = Parser::parse("Max Z = X1 + X2\nX1, X2, ..., Xn ≥ 0").unwrap();
        let nn = program.non_negativity.unwrap();
        assert!(nn.elided);
        assert_eq!(nn.variables.len(), 2);
    }

    #[test]
    fn test_statement_after_non_negativity() {
        let err = Parser::parse("Max Z = X1\nX1, X2 >= 0\nX1 <= 3").unwrap_err();
        assert!(matches!(err, ParseError::StatementAfterNonNegativity(_)));
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("Max Z = X1\nX1 4").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_rhs() {
        assert_eq!(Parser::parse("Max Z = X1\nX1 <=").unwrap_err(), ParseError::UnexpectedEof);
    }

    #[test]
    fn test_objective_must_come_first() {
        let err = Parser::parse("X1 <= 4").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, .. } => assert_eq!(expected, "Max"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
