use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Max,

    // Literals
    Ident,
    Variable,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Equals,
    Le,
    Ge,
    Comma,
    Ellipsis,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        Token::new(
            TokenKind::Comment,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn skip_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Unsigned decimal literal with optional fraction and exponent. Signs are
    /// separate tokens so `3 X1 -2 X2` reads as a subtraction.
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        self.skip_digits();

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut ahead = self.chars.clone();
            let next = ahead.next();
            let exponent_follows = match next {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => ahead.next().is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                self.advance(); // e
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        Token::new(
            TokenKind::Number,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = if text.eq_ignore_ascii_case("max") {
            TokenKind::Max
        } else if is_variable(text) {
            TokenKind::Variable
        } else {
            TokenKind::Ident
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        self.advance();
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => self.single(TokenKind::Newline),
            '#' => self.skip_line_comment(),
            '/' if self.peek_next() == Some('/') => self.skip_line_comment(),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' | '·' => self.single(TokenKind::Star),
            ',' => self.single(TokenKind::Comma),
            '≤' => self.single(TokenKind::Le),
            '≥' => self.single(TokenKind::Ge),
            '<' if self.peek_next() == Some('=') => self.double(TokenKind::Le),
            '>' if self.peek_next() == Some('=') => self.double(TokenKind::Ge),
            '=' => self.single(TokenKind::Equals),
            '.' if self.source[start..].starts_with("...") => {
                for _ in 0..3 {
                    self.advance();
                }
                Token::new(TokenKind::Ellipsis, Span::new(start, self.pos), "...")
            }
            '…' => self.single(TokenKind::Ellipsis),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => self.single(TokenKind::Error),
        }
    }
}

/// `X` or `x` followed by decimal digits.
fn is_variable(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('x') | Some('X'))
        && text.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_objective_line() {
        assert_eq!(
            kinds("Max Z = 3 X1 + 5·X2"),
            vec![
                TokenKind::Max,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Variable,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Variable,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 0.005 1e3 2.5E-2");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", "0.005", "1e3", "2.5E-2", ""]);
    }

    #[test]
    fn test_minus_is_always_an_operator() {
        assert_eq!(
            kinds("-2 X1"),
            vec![TokenKind::Minus, TokenKind::Number, TokenKind::Variable, TokenKind::Eof]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            kinds("<= >= ≤ ≥"),
            vec![TokenKind::Le, TokenKind::Ge, TokenKind::Le, TokenKind::Ge, TokenKind::Eof]
        );
    }

    #[test]
    fn test_non_negativity_line() {
        assert_eq!(
            kinds("X1, X2, ..., Xn >= 0"),
            vec![
                TokenKind::Variable,
                TokenKind::Comma,
                TokenKind::Variable,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::Ge,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("X1 <= 4 # capacity\n// note\nX2"),
            vec![
                TokenKind::Variable,
                TokenKind::Le,
                TokenKind::Number,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Variable,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        let tokens = Lexer::tokenize("X1 ? 3");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].text, "?");
    }
}
