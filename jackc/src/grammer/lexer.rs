use std::iter::Peekable;
use std::str::Chars;

use arch::inst::ADDR_MAX;

use super::token::{Keyword, Token, TokenKind, SYMBOLS};
use crate::error::Error;

/// Split the whole source into tokens. Lexical errors are fatal.
pub fn tokenize(code: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(code).parse()
}

struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    line: usize,
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    fn new(code: &'a str) -> Self {
        Self {
            iter: code.chars().peekable(),
            line: 1,
        }
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.iter.clone().nth(n)
    }

    fn consume(&mut self) -> Option<char> {
        let ch = self.iter.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }
}

// ----------------------------------------------------------------------------
// Lexer
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    fn parse(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(ch0) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            let line = self.line;

            // 1. Comments
            if ch0 == '/' {
                match self.peek_nth(1) {
                    Some('/') => {
                        while self.iter.next_if(|&c| c != '\n').is_some() {}
                        continue;
                    }
                    Some('*') => {
                        self.skip_block_comment(line)?;
                        continue;
                    }
                    _ => {}
                }
            }

            // 2. Symbol
            if SYMBOLS.contains(ch0) {
                self.consume();
                tokens.push(Token::new(TokenKind::Symbol(ch0), line));
                continue;
            }

            // 3. Integer constant
            if ch0.is_ascii_digit() {
                tokens.push(Token::new(self.parse_int(line)?, line));
                continue;
            }

            // 4. String constant
            if ch0 == '"' {
                tokens.push(Token::new(self.parse_str(line)?, line));
                continue;
            }

            // 5. Identifier or keyword
            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                tokens.push(Token::new(self.parse_word(), line));
                continue;
            }

            return Err(Error::InvalidChar(ch0, line));
        }
        Ok(tokens)
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), Error> {
        self.consume(); // '/'
        self.consume(); // '*'
        loop {
            match self.consume() {
                Some('*') if self.peek_nth(0) == Some('/') => {
                    self.consume();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(Error::UnterminatedComment(start)),
            }
        }
    }

    fn parse_int(&mut self, line: usize) -> Result<TokenKind, Error> {
        let mut lexeme = String::new();
        while let Some(ch) = self.iter.next_if(|c| c.is_ascii_digit()) {
            lexeme.push(ch);
        }
        match lexeme.parse::<u16>() {
            Ok(n) if n <= ADDR_MAX => Ok(TokenKind::Int(n)),
            _ => Err(Error::IntOverflow(lexeme, line)),
        }
    }

    // "no escapes, no newlines"
    fn parse_str(&mut self, line: usize) -> Result<TokenKind, Error> {
        self.consume();
        let mut lexeme = String::new();
        loop {
            match self.iter.next() {
                Some('"') => return Ok(TokenKind::Str(lexeme)),
                Some('\n') | None => return Err(Error::UnterminatedString(line)),
                Some(ch) => lexeme.push(ch),
            }
        }
    }

    fn parse_word(&mut self) -> TokenKind {
        let mut lexeme = String::new();
        while let Some(ch) = self
            .iter
            .next_if(|ch| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        match lexeme.parse::<Keyword>() {
            Ok(kw) => TokenKind::Keyword(kw),
            Err(_) => TokenKind::Ident(lexeme),
        }
    }
}
