//! The lexer.

use std::str::Chars;

use text_size::{TextRange, TextSize};

use crate::utils::Location;

use super::{
    error::LexError,
    token::{Token, TokenKind},
};

/// Peekable iterator over a char sequence.
///
/// Next characters can be peeked via `first` method,
/// and position can be shifted forward via `bump` method.
#[derive(Clone)]
struct Cursor<'a> {
    /// The input string.
    input: &'a str,
    /// Iterator over chars. Slightly faster than a &str.
    chars: Chars<'a>,
    lineno: u32,
    column: u32,
    finished: bool,
}

const EOF_CHAR: char = '\0';

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Cursor<'a> {
        Cursor {
            input,
            chars: input.chars(),
            lineno: 1,
            column: 1,
            finished: false,
        }
    }

    /// Peeks the next symbol from the input stream without consuming it.
    /// If requested position doesn't exist, `EOF_CHAR` is returned.
    /// However, getting `EOF_CHAR` doesn't always mean actual end of file,
    /// it should be checked with `is_eof` method.
    fn first(&self) -> char {
        // `.next()` optimizes better than `.nth(0)`
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    /// Peeks the second symbol from the input stream without consuming it.
    fn second(&self) -> char {
        // `.next()` optimizes better than `.nth(1)`
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    /// Checks if there is nothing more to consume.
    fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Returns position of cursor.
    fn pos(&self) -> TextSize {
        TextSize::try_from(self.input.len() - self.chars.as_str().len()).unwrap_or_default()
    }

    /// Returns location of cursor.
    fn location(&self) -> Location {
        Location {
            lineno: self.lineno,
            column: self.column,
            offset: self.pos().into(),
        }
    }

    /// Moves to the next character.
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.lineno += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Eats `c` if it matches.
    fn eat(&mut self, c: char) -> bool {
        if self.first() == c {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Eats symbols while predicate returns true or until the end of file is reached.
    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while predicate(self.first()) && !self.is_eof() {
            self.bump();
        }
    }
}

/// Creates an iterator that produces tokens from the input string.
///
/// The last item is always a token of kind [`TokenKind::Eof`]. Calling this
/// again with the same input restarts from the beginning.
pub fn tokenize(input: &str) -> impl Iterator<Item = Result<Token, LexError>> + '_ {
    let mut cursor = Cursor::new(input);
    std::iter::from_fn(move || {
        if cursor.finished {
            return None;
        }
        let token = cursor.advance_token();
        if matches!(token, Ok(Token { kind: TokenKind::Eof, .. })) {
            cursor.finished = true;
        }
        Some(token)
    })
}

/// True if `c` is considered a whitespace. Line feeds are statement separators
/// and therefore not whitespace.
pub fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        // Usual ASCII suspects
        '\u{0009}'   // \t
        | '\u{000B}' // vertical tab
        | '\u{000C}' // form feed
        | '\u{000D}' // \r
        | '\u{0020}' // space

        // NO-BREAK SPACE
        | '\u{00A0}'

        // Bidi markers
        | '\u{200E}' // LEFT-TO-RIGHT MARK
        | '\u{200F}' // RIGHT-TO-LEFT MARK

        // BYTE ORDER MARK
        | '\u{FEFF}'
    )
}

/// True if `c` is an end of line.
pub fn is_eol(c: char) -> bool {
    matches!(c, '\n' | ';' | '\u{2028}' | '\u{2029}')
}

/// True if `c` is valid as a first character of an identifier.
pub fn is_id_start(c: char) -> bool {
    // This is XID_Start OR '_' (which formally is not a XID_Start).
    c == '_' || unicode_ident::is_xid_start(c)
}

/// True if `c` is valid as a non-first character of an identifier.
pub fn is_id_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// The passed string is lexically an identifier and not a keyword.
pub fn is_ident(string: &str) -> bool {
    let mut chars = string.chars();
    if let Some(start) = chars.next() {
        is_id_start(start) && chars.all(is_id_continue) && TokenKind::keyword(string).is_none()
    } else {
        false
    }
}

impl Cursor<'_> {
    /// Parses a token from the input string.
    fn advance_token(&mut self) -> Result<Token, LexError> {
        self.eat_while(is_whitespace);
        let start = self.pos();
        let location = self.location();
        let Some(first_char) = self.bump() else {
            return Ok(Token::new(
                TokenKind::Eof,
                TextRange::empty(start),
                location,
            ));
        };
        let token_kind = match first_char {
            // Div, DivAssign or comment.
            '/' => match self.first() {
                '/' => self.line_comment(start),
                '=' => {
                    self.bump();
                    TokenKind::DivAssign
                }
                _ => TokenKind::Div,
            },

            // Dot or a number starting with a dot.
            '.' if self.first().is_ascii_digit() => self.number(),
            '.' => TokenKind::Dot,

            // Identifier or keyword.
            c if is_id_start(c) => self.ident_or_keyword(start),

            // Numeric literal.
            '0'..='9' => self.number(),

            // String literal.
            '"' => self.string(location)?,

            // End of line.
            c if is_eol(c) => TokenKind::Eol,

            // Two-char tokens.
            '=' if self.eat('=') => TokenKind::Eq,
            '!' if self.eat('=') => TokenKind::NotEq,
            '<' if self.eat('=') => TokenKind::LtEq,
            '>' if self.eat('=') => TokenKind::GtEq,
            '+' if self.eat('=') => TokenKind::AddAssign,
            '-' if self.eat('=') => TokenKind::SubAssign,
            '*' if self.eat('=') => TokenKind::MulAssign,
            '%' if self.eat('=') => TokenKind::RemAssign,
            '^' if self.eat('=') => TokenKind::PowAssign,

            // One-symbol tokens.
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Add,
            '-' => TokenKind::Sub,
            '*' => TokenKind::Mul,
            '%' => TokenKind::Rem,
            '^' => TokenKind::Pow,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '@' => TokenKind::At,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,

            // Unknown character.
            ch => return Err(LexError::InvalidCharacter { ch, location }),
        };
        Ok(Token::new(
            token_kind,
            TextRange::new(start, self.pos()),
            location,
        ))
    }

    fn line_comment(&mut self, start: TextSize) -> TokenKind {
        self.bump();
        self.eat_while(|c| c != '\n');
        let range = TextRange::new(start, self.pos());
        if self.input[range][2..].trim() == "debugger" {
            TokenKind::Debugger
        } else {
            TokenKind::Comment
        }
    }

    fn ident_or_keyword(&mut self, start: TextSize) -> TokenKind {
        self.eat_while(is_id_continue);
        let range = TextRange::new(start, self.pos());
        TokenKind::keyword(&self.input[range]).unwrap_or(TokenKind::Ident)
    }

    fn number(&mut self) -> TokenKind {
        self.eat_while(|c| c.is_ascii_digit());
        // Don't be greedy if this is actually a number followed by a member
        // access (`1.foo`).
        if self.first() == '.' && !is_id_start(self.second()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.first(), 'e' | 'E')
            && (self.second().is_ascii_digit() || matches!(self.second(), '+' | '-'))
        {
            self.bump();
            if matches!(self.first(), '+' | '-') {
                self.bump();
            }
            self.eat_while(|c| c.is_ascii_digit());
        }
        TokenKind::Number
    }

    fn string(&mut self, location: Location) -> Result<TokenKind, LexError> {
        while let Some(c) = self.bump() {
            if c == '"' {
                // `""` is an escaped quote.
                if !self.eat('"') {
                    return Ok(TokenKind::Str);
                }
            }
        }
        Err(LexError::UnterminatedString { location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .map(|token| token.map(|token| token.kind))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("if x then end if"),
            vec![
                TokenKind::If,
                TokenKind::Ident,
                TokenKind::Then,
                TokenKind::End,
                TokenKind::If,
                TokenKind::Eof
            ]
        );
        assert_eq!(TokenKind::keyword("function"), Some(TokenKind::Function));
        assert_eq!(TokenKind::keyword("continue"), Some(TokenKind::Continue));
        assert_eq!(TokenKind::keyword("functions"), None);
        assert_eq!(TokenKind::keyword("self"), None);
        assert!(!is_ident("while"));
        assert!(is_ident("_while"));
    }

    #[test]
    fn test_number() {
        assert_eq!(kinds("12"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(kinds(".5"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(kinds("1e10"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(
            kinds("1.len"),
            vec![
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string() {
        let input = r#"x = "say ""hi""""#;
        let tokens = tokenize(input).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str);
        assert_eq!(tokens[2].text(input), r#""say ""hi""""#);
    }

    #[test]
    fn test_eol_and_comments() {
        assert_eq!(
            kinds("a = 1; b = 2 // note\n// debugger\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eol,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Comment,
                TokenKind::Eol,
                TokenKind::Debugger,
                TokenKind::Eol,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_location() {
        let tokens = tokenize("a\n  bb")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens[2].location.lineno, 2);
        assert_eq!(tokens[2].location.column, 3);
        assert_eq!(tokens[2].location.offset, 4);
    }

    #[test]
    fn test_errors() {
        let errors = tokenize("x = \"abc")
            .filter_map(Result::err)
            .collect::<Vec<_>>();
        assert!(matches!(
            errors.as_slice(),
            [LexError::UnterminatedString { .. }]
        ));
        let errors = tokenize("x = 1 # 2")
            .filter_map(Result::err)
            .collect::<Vec<_>>();
        assert!(matches!(
            errors.as_slice(),
            [LexError::InvalidCharacter { ch: '#', .. }]
        ));
    }

    #[test]
    fn test_restartable() {
        let input = "print(1)";
        let first = tokenize(input).collect::<Vec<_>>();
        let second = tokenize(input).collect::<Vec<_>>();
        assert_eq!(first, second);
    }
}
