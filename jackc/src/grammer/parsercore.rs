use super::token::Token;
use crate::error::Error;

/// Saved cursor position, see [`TokenStream::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// Forward-only cursor over the tokens of one file.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Consume the next token. Fails when the stream is exhausted.
    pub fn advance(&mut self) -> Result<Token, Error> {
        let token = self.tokens.get(self.pos).cloned().ok_or(Error::OutOfRange)?;
        self.pos += 1;
        Ok(token)
    }

    /// Consume the next token if there is one.
    pub fn bump(&mut self) {
        if self.has_more() {
            self.pos += 1;
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Look `n` tokens past the next one without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Move the cursor back to a previously saved position.
    pub fn restore(&mut self, mark: Mark) {
        self.pos = mark.0.min(self.pos);
    }

    /// Replay from the first token.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Line of the next token, or of the last one at end of input.
    pub fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |token| token.line)
    }
}

impl TokenStream {
    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&self, cond: F) -> bool {
        self.peek().is_some_and(cond)
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token> {
        if self.check_if(cond) {
            self.advance().ok()
        } else {
            None
        }
    }

    /// Consume until next token is match with condition
    pub fn consume_until<F: Fn(&Token) -> bool>(&mut self, cond: F) {
        while let Some(token) = self.peek() {
            if cond(token) {
                return;
            }
            self.pos += 1;
        }
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(
        &mut self,
        cond: F,
        expected: &'static str,
    ) -> Result<Token, Error> {
        let Some(token) = self.peek() else {
            return Err(Error::UnexpectedEof(expected));
        };
        if cond(token) {
            return self.advance();
        }
        Err(Error::Expected {
            expected,
            found: token.kind.to_string(),
            line: token.line,
        })
    }
}

#[macro_export]
macro_rules! check {
    ($ts:expr, $kind:pat) => {
        $ts.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($ts:expr, $kind:pat, $expected:expr) => {
        $ts.expect_tobe(|token| matches!(&token.kind, $kind), $expected)
    };
}

#[macro_export]
macro_rules! optional {
    ($ts:expr, $kind:pat) => {
        $ts.consume_if(|token| matches!(&token.kind, $kind))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammer::{lexer::tokenize, token::TokenKind};

    fn stream(code: &str) -> TokenStream {
        TokenStream::new(tokenize(code).unwrap())
    }

    #[test]
    fn advance_past_end() {
        let mut ts = stream("x");
        assert!(ts.has_more());
        assert!(ts.advance().is_ok());
        assert!(!ts.has_more());
        assert!(matches!(ts.advance(), Err(Error::OutOfRange)));
    }

    #[test]
    fn rewind_two() {
        let mut ts = stream("foo . bar");
        let mark = ts.mark();
        ts.advance().unwrap();
        ts.advance().unwrap();
        assert_eq!(ts.peek().and_then(Token::ident), Some("bar"));
        assert!(ts.peek_nth(1).is_none());
        ts.restore(mark);
        assert_eq!(ts.peek().and_then(Token::ident), Some("foo"));
    }

    #[test]
    fn macros() {
        let mut ts = stream("( x ;");
        assert!(check!(ts, TokenKind::Symbol('(')));
        assert!(optional!(ts, TokenKind::Symbol(')')).is_none());
        assert!(expect!(ts, TokenKind::Symbol('('), "`(`").is_ok());
        assert!(matches!(
            expect!(ts, TokenKind::Symbol(')'), "`)`"),
            Err(Error::Expected { expected: "`)`", line: 1, .. })
        ));
        ts.consume_until(|t| t.kind == TokenKind::Symbol(';'));
        assert!(optional!(ts, TokenKind::Symbol(';')).is_some());
        assert!(matches!(expect!(ts, TokenKind::Symbol(';'), "`;`"), Err(Error::UnexpectedEof(_))));
        ts.reset();
        assert_eq!(ts.peek_nth(2).map(|t| &t.kind), Some(&TokenKind::Symbol(';')));
    }
}
