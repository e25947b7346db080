//! SnapScript lexer - tokenizes source code into tokens
//!
//! [`Lexer`] is a lazy iterator; [`tokenize`] drains it into a vector that
//! always ends with a single [`TokenKind::Eof`].

use core_types::{LexError, SourcePosition, ValueType};

/// SnapScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// int type
    Int,
    /// float type
    Float,
    /// double type (alias of float)
    Double,
    /// bool type
    Bool,
    /// boolean type (alias of bool)
    Boolean,
    /// string type
    String,
    /// vec2 type
    Vec2,
    /// void type
    Void,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// while keyword
    While,
    /// for keyword
    For,
    /// break keyword
    Break,
    /// continue keyword
    Continue,
    /// return keyword
    Return,
    /// const keyword
    Const,
    /// true literal
    True,
    /// false literal
    False,
}

impl Keyword {
    /// Resolve a reserved word
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "int" => Keyword::Int,
            "float" => Keyword::Float,
            "double" => Keyword::Double,
            "bool" => Keyword::Bool,
            "boolean" => Keyword::Boolean,
            "string" => Keyword::String,
            "vec2" => Keyword::Vec2,
            "void" => Keyword::Void,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "for" => Keyword::For,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "return" => Keyword::Return,
            "const" => Keyword::Const,
            "true" => Keyword::True,
            "false" => Keyword::False,
            _ => return None,
        };
        Some(kw)
    }

    /// The type this keyword names, if it is a type keyword
    pub fn value_type(self) -> Option<ValueType> {
        match self {
            Keyword::Int => Some(ValueType::Int),
            Keyword::Float | Keyword::Double => Some(ValueType::Float),
            Keyword::Bool | Keyword::Boolean => Some(ValueType::Bool),
            Keyword::String => Some(ValueType::String),
            Keyword::Vec2 => Some(ValueType::Vec2),
            Keyword::Void => Some(ValueType::Void),
            _ => None,
        }
    }
}

/// SnapScript punctuators (operators and delimiters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Opening brace
    LBrace,
    /// Closing brace
    RBrace,
    /// Opening bracket
    LBracket,
    /// Closing bracket
    RBracket,
    /// Semicolon
    Semicolon,
    /// Comma
    Comma,
    /// Assignment
    Assign,
    /// Plus
    Plus,
    /// Minus
    Minus,
    /// Multiply
    Star,
    /// Divide
    Slash,
    /// Modulo
    Percent,
    /// Equality
    EqEq,
    /// Inequality
    NotEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Logical AND
    AndAnd,
    /// Logical OR
    OrOr,
    /// Logical NOT
    Not,
    /// Bitwise AND
    And,
    /// Bitwise OR
    Or,
    /// Bitwise XOR
    Xor,
    /// Left shift
    LtLt,
    /// Right shift
    GtGt,
    /// Plus equals
    PlusEq,
    /// Minus equals
    MinusEq,
    /// Multiply equals
    StarEq,
    /// Divide equals
    SlashEq,
    /// Modulo equals
    PercentEq,
    /// Increment
    PlusPlus,
    /// Decrement
    MinusMinus,
}

/// Classification of a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier
    Identifier,
    /// Keyword
    Keyword(Keyword),
    /// Integer literal
    Int(i32),
    /// Floating point literal
    Float(f64),
    /// String literal, escapes resolved
    Str(String),
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// End of input
    Eof,
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What the token is
    pub kind: TokenKind,
    /// Source text of the token
    pub lexeme: String,
    /// Byte offset of the first character
    pub offset: usize,
}

impl Token {
    /// Returns true if this token is the given punctuator
    pub fn is_punct(&self, p: Punctuator) -> bool {
        self.kind == TokenKind::Punctuator(p)
    }

    /// Returns true if this token is the given keyword
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    /// Type named by this token, if it is a type keyword
    pub fn type_keyword(&self) -> Option<ValueType> {
        match self.kind {
            TokenKind::Keyword(kw) => kw.value_type(),
            _ => None,
        }
    }

    /// Identifier text, if this token is an identifier
    pub fn identifier(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => Some(&self.lexeme),
            _ => None,
        }
    }
}

/// Lexer for SnapScript source code
///
/// # Examples
///
/// ```
/// use parser::lexer::{Lexer, TokenKind};
///
/// let kinds: Vec<TokenKind> = Lexer::new("x = 1;")
///     .map(|t| t.unwrap().kind)
///     .collect();
/// assert_eq!(kinds.len(), 5); // x = 1 ; <eof>
/// assert_eq!(kinds[2], TokenKind::Int(1));
/// ```
pub struct Lexer<'a> {
    source: &'a str,
    position: usize,
    start: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            start: 0,
            finished: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn position_at(&self, offset: usize) -> SourcePosition {
        SourcePosition::from_offset(self.source, offset)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let open = self.position;
                    self.position += 2;
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(LexError::UnterminatedComment {
                                    position: self.position_at(open),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: self.source[self.start..self.position].to_string(),
            offset: self.start,
        }
    }

    fn punct(&self, p: Punctuator) -> Result<Token, LexError> {
        Ok(self.make(TokenKind::Punctuator(p)))
    }

    /// Pick `double` if the next char is `second`, else `single`
    fn either(&mut self, second: char, double: Punctuator, single: Punctuator) -> Result<Token, LexError> {
        if self.match_char(second) {
            self.punct(double)
        } else {
            self.punct(single)
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;
        self.start = self.position;

        let Some(ch) = self.advance() else {
            return Ok(self.make(TokenKind::Eof));
        };

        use Punctuator as P;
        match ch {
            '(' => self.punct(P::LParen),
            ')' => self.punct(P::RParen),
            '{' => self.punct(P::LBrace),
            '}' => self.punct(P::RBrace),
            '[' => self.punct(P::LBracket),
            ']' => self.punct(P::RBracket),
            ';' => self.punct(P::Semicolon),
            ',' => self.punct(P::Comma),
            '^' => self.punct(P::Xor),
            '=' => self.either('=', P::EqEq, P::Assign),
            '!' => self.either('=', P::NotEq, P::Not),
            '*' => self.either('=', P::StarEq, P::Star),
            '/' => self.either('=', P::SlashEq, P::Slash),
            '%' => self.either('=', P::PercentEq, P::Percent),
            '&' => self.either('&', P::AndAnd, P::And),
            '|' => self.either('|', P::OrOr, P::Or),
            '+' => {
                if self.match_char('+') {
                    self.punct(P::PlusPlus)
                } else {
                    self.either('=', P::PlusEq, P::Plus)
                }
            }
            '-' => {
                if self.match_char('-') {
                    self.punct(P::MinusMinus)
                } else {
                    self.either('=', P::MinusEq, P::Minus)
                }
            }
            '<' => {
                if self.match_char('<') {
                    self.punct(P::LtLt)
                } else {
                    self.either('=', P::LtEq, P::Lt)
                }
            }
            '>' => {
                if self.match_char('>') {
                    self.punct(P::GtGt)
                } else {
                    self.either('=', P::GtEq, P::Gt)
                }
            }
            '"' => self.scan_string(),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            _ if ch.is_ascii_digit() => self.scan_number(),
            _ if ch.is_ascii_alphabetic() || ch == '_' => self.scan_identifier(),
            _ => Err(LexError::UnexpectedCharacter {
                ch,
                position: self.position_at(self.start),
            }),
        }
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        let mut value = String::new();
        loop {
            let escape_at = self.position;
            match self.advance() {
                Some('"') => break,
                Some('\\') => {
                    let escaped = self.advance().ok_or(LexError::UnterminatedString {
                        position: self.position_at(self.start),
                    })?;
                    let resolved = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        '\\' => '\\',
                        '"' => '"',
                        other => {
                            return Err(LexError::InvalidEscape {
                                escape: other,
                                position: self.position_at(escape_at),
                            })
                        }
                    };
                    value.push(resolved);
                }
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString {
                        position: self.position_at(self.start),
                    })
                }
                Some(c) => value.push(c),
            }
        }
        Ok(self.make(TokenKind::Str(value)))
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        let mut is_float = false;

        // The first digit (or leading '.') is already consumed
        self.consume_digits();
        if self.source[self.start..].starts_with('.') {
            is_float = true;
        } else if self.peek() == Some('.') {
            self.advance();
            is_float = true;
            self.consume_digits();
        }
        if self.source[self.start..].starts_with('.') {
            self.consume_digits();
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.position;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.consume_digits();
                is_float = true;
            } else {
                self.position = mark;
            }
        }

        let digits_end = self.position;
        if matches!(self.peek(), Some('f') | Some('F') | Some('d') | Some('D')) {
            self.advance();
            is_float = true;
        }

        let text = &self.source[self.start..digits_end];
        let malformed = || LexError::MalformedNumber {
            literal: self.source[self.start..self.position].to_string(),
            position: self.position_at(self.start),
        };
        if self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed());
        }
        let kind = if is_float {
            TokenKind::Float(text.parse::<f64>().map_err(|_| malformed())?)
        } else {
            TokenKind::Int(text.parse::<i32>().map_err(|_| malformed())?)
        };
        Ok(self.make(kind))
    }

    fn scan_identifier(&mut self) -> Result<Token, LexError> {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let word = &self.source[self.start..self.position];
        let kind = match Keyword::from_word(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier,
        };
        Ok(self.make(kind))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.scan_token();
        match &result {
            Ok(token) if token.kind == TokenKind::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

/// Tokenize a whole source; the result always ends with [`TokenKind::Eof`]
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}
