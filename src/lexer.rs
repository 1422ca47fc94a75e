//! Converts source text into a [`Token`] stream. Bracket balance is checked
//! up front by [`crate::token::check_brackets`]; this pass assumes brackets
//! already nest correctly and focuses on classifying each lexeme.

use crate::error::{LexError, Position};
use crate::token::{Token, TokenKind};
use nom::character::complete::{char as nom_char, digit1};
use nom::combinator::{opt, recognize};
use nom::sequence::preceded;
use nom::IResult;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::str::FromStr;

pub struct Lexer<'a> {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    _marker: std::marker::PhantomData<&'a str>,
}

const BOOLEAN_SPELLINGS: &[(&str, bool)] = &[
    ("#t", true),
    ("#T", true),
    ("#true", true),
    ("#f", false),
    ("#F", false),
    ("#false", false),
];

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            _marker: std::marker::PhantomData,
        }
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'')
    }

    /// Skips whitespace, line comments, block comments, and datum comments.
    /// Returns an error if a block comment is unterminated.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('#') if self.peek_at(1) == Some('|') => {
                    let start = self.pos();
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while self.peek().is_some() {
                        if self.peek() == Some('|') && self.peek_at(1) == Some('#') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        return Err(LexError::UnterminatedBlockComment(start));
                    }
                }
                Some('#') if self.peek_at(1) == Some(';') => {
                    self.advance();
                    self.advance();
                    self.skip_trivia()?;
                    self.skip_one_datum()?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Consumes exactly one datum's worth of tokens and discards them, used
    /// to implement `#;`. A datum is either a single atomic token, or a
    /// bracketed form together with everything up to its matching closer.
    fn skip_one_datum(&mut self) -> Result<(), LexError> {
        let first = self.next_token_inner(false)?;
        if matches!(first.kind, TokenKind::LParen(_)) {
            let mut depth = 1usize;
            while depth > 0 {
                let tok = self.next_token_inner(false)?;
                match tok.kind {
                    TokenKind::LParen(_) => depth += 1,
                    TokenKind::RParen(_) => depth -= 1,
                    TokenKind::Eof => break,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Reads a maximal run of non-delimiter characters starting at the
    /// current position.
    fn read_atom(&mut self) -> (String, Position) {
        let start_pos = self.pos();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if Self::is_delimiter(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        (text, start_pos)
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let start_pos = self.pos();
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString(start_pos)),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::String(text.clone()), start_pos, text))
    }

    fn read_boolean(&mut self) -> Result<Token, LexError> {
        let (text, pos) = self.read_atom();
        for (spelling, value) in BOOLEAN_SPELLINGS {
            if text == *spelling {
                return Ok(Token::new(TokenKind::Boolean(*value), pos, text));
            }
        }
        Err(LexError::BadSyntax(pos))
    }

    /// Classifies an already-read atom as rational, integer, decimal, or a
    /// plain NAME if it parses as none of the above.
    fn classify_atom(text: &str, pos: Position) -> Result<TokenKind, LexError> {
        if let Some(slash) = text.find('/') {
            if slash > 0 {
                let (num_str, rest) = text.split_at(slash);
                let den_str = &rest[1..];
                if let (Ok(num), Ok(den)) = (BigInt::from_str(num_str), BigInt::from_str(den_str))
                {
                    if den == BigInt::from(0) {
                        return Err(LexError::DivisionByZero(pos));
                    }
                    if den < BigInt::from(0) {
                        return Err(LexError::InvalidRationalDenominator(pos));
                    }
                    let ratio = BigRational::new(num, den);
                    return Ok(if ratio.is_integer() {
                        TokenKind::Integer(ratio.to_integer())
                    } else {
                        TokenKind::Rational(ratio)
                    });
                }
            }
        }

        if let Ok(i) = BigInt::from_str(text) {
            return Ok(TokenKind::Integer(i));
        }

        if looks_like_decimal(text) {
            if let Ok(f) = text.parse::<f64>() {
                return Ok(TokenKind::Decimal(f));
            }
        }

        Ok(TokenKind::Name(text.to_string()))
    }

    fn starts_number_like(c: char, next: Option<char>) -> bool {
        c.is_ascii_digit()
            || ((c == '-' || c == '.') && next.map(|n| n.is_ascii_digit() || n == '.').unwrap_or(false))
    }

    fn next_token_inner(&mut self, allow_quote: bool) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let pos = self.pos();
        match self.peek() {
            None => Ok(Token::eof(pos)),
            Some(c) if matches!(c, '(' | '[' | '{') => {
                self.advance();
                Ok(Token::new(TokenKind::LParen(c), pos, c.to_string()))
            }
            Some(c) if matches!(c, ')' | ']' | '}') => {
                self.advance();
                Ok(Token::new(TokenKind::RParen(c), pos, c.to_string()))
            }
            Some('"') => self.read_string(),
            Some('#') => self.read_boolean(),
            Some('\'') if allow_quote => self.read_quote(),
            Some('\'') => Err(LexError::NestedQuoteNotImplemented(pos)),
            Some('|') => Err(LexError::PipeIdentifierNotImplemented(pos)),
            Some(c) if Self::starts_number_like(c, self.peek_at(1)) => {
                let (text, pos) = self.read_atom();
                Ok(Token::new(Self::classify_atom(&text, pos)?, pos, text))
            }
            Some(_) => {
                let (text, pos) = self.read_atom();
                if text.is_empty() {
                    // a lone delimiter we don't otherwise handle (e.g. backtick)
                    self.advance();
                    return Err(LexError::BadSyntax(pos));
                }
                Ok(Token::new(TokenKind::Name(text.clone()), pos, text))
            }
        }
    }

    fn read_quote(&mut self) -> Result<Token, LexError> {
        let start_pos = self.pos();
        self.advance(); // the quote glyph
        self.skip_trivia()?;
        match self.peek() {
            Some(c) if matches!(c, '(' | '[' | '{') => self.read_quoted_list(start_pos),
            Some('\'') => Err(LexError::NestedQuoteNotImplemented(start_pos)),
            Some(c) if c.is_ascii_digit() || c == '#' || c == '"' => {
                // self-quoting literal: the literal token itself is returned.
                self.next_token_inner(false)
            }
            Some(_) => {
                let (text, _) = self.read_atom();
                if text.is_empty() {
                    return Err(LexError::SymbolFollowedByEof(start_pos));
                }
                Ok(Token::new(
                    TokenKind::Symbol(format!("'{text}")),
                    start_pos,
                    format!("'{text}"),
                ))
            }
            None => Err(LexError::SymbolFollowedByEof(start_pos)),
        }
    }

    /// Reads the body of a quoted list, recursing into nested parenthesized
    /// forms so each sublist becomes its own `ListAbbrev` token rather than a
    /// flat run of bracket tokens: `'(1 (2 3))` must carry `(2 3)` as a
    /// single nested child, not four loose tokens that would reopen the
    /// outer closer's own bracket family.
    fn read_quoted_list(&mut self, start_pos: Position) -> Result<Token, LexError> {
        let opener = self.peek().expect("caller checked an opener is next");
        self.advance();
        let closer = matching_close(opener);
        let mut children = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => {
                    return Err(LexError::ExpectedClosingBracket {
                        pos: start_pos,
                        opener,
                    });
                }
                Some(p) if p == closer => {
                    self.advance();
                    break;
                }
                Some(p) if matches!(p, '(' | '[' | '{') => {
                    let inner_pos = self.pos();
                    children.push(self.read_quoted_list(inner_pos)?);
                }
                Some(_) => children.push(self.next_token_inner(false)?),
            }
        }
        Ok(Token::new(TokenKind::ListAbbrev(children), start_pos, format!("'{opener}")))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_token_inner(true)
    }

    /// Tokenizes the entire source, returning the stream terminated by EOF.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexError> {
        crate::token::check_brackets(source)?;
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.is_eof();
            log::trace!("token: {:?}", tok);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        other => other,
    }
}

fn looks_like_decimal(text: &str) -> bool {
    fn decimal(input: &str) -> IResult<&str, &str> {
        recognize(preceded(
            opt(nom_char('-')),
            nom::branch::alt((
                recognize(nom::sequence::tuple((digit1, nom_char('.'), opt(digit1)))),
                recognize(preceded(nom_char('.'), digit1)),
            )),
        ))(input)
    }
    matches!(decimal(text), Ok((rest, _)) if rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_integers() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer(42.into()), TokenKind::Eof]);
        assert_eq!(kinds("-7"), vec![TokenKind::Integer((-7).into()), TokenKind::Eof]);
    }

    #[test]
    fn lexes_rationals_in_lowest_terms() {
        match &kinds("2/4")[0] {
            TokenKind::Rational(r) => assert_eq!(r, &BigRational::new(1.into(), 2.into())),
            other => panic!("expected rational, got {other:?}"),
        }
    }

    #[test]
    fn rational_with_unit_denominator_normalizes_to_integer() {
        assert_eq!(kinds("4/2")[0], TokenKind::Integer(2.into()));
    }

    #[test]
    fn negative_denominator_is_an_error() {
        assert!(matches!(
            Lexer::tokenize("1/-2"),
            Err(LexError::InvalidRationalDenominator(_))
        ));
    }

    #[test]
    fn lexes_decimals() {
        assert_eq!(kinds("3.14")[0], TokenKind::Decimal(3.14));
    }

    #[test]
    fn lexes_all_boolean_spellings() {
        for spelling in ["#t", "#T", "#true"] {
            assert_eq!(kinds(spelling)[0], TokenKind::Boolean(true));
        }
        for spelling in ["#f", "#F", "#false"] {
            assert_eq!(kinds(spelling)[0], TokenKind::Boolean(false));
        }
    }

    #[test]
    fn lexes_strings_without_escapes() {
        assert_eq!(
            kinds("\"hello world\""),
            vec![TokenKind::String("hello world".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            Lexer::tokenize("\"abc"),
            Err(LexError::UnterminatedString(_))
        ));
    }

    #[test]
    fn lexes_identifier_starting_with_minus() {
        assert_eq!(kinds("-foo")[0], TokenKind::Name("-foo".to_string()));
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(kinds("1 ; comment\n2"), vec![
            TokenKind::Integer(1.into()),
            TokenKind::Integer(2.into()),
            TokenKind::Eof
        ]);
        assert_eq!(kinds("1 #| block |# 2"), vec![
            TokenKind::Integer(1.into()),
            TokenKind::Integer(2.into()),
            TokenKind::Eof
        ]);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(matches!(
            Lexer::tokenize("#| never closes"),
            Err(LexError::UnterminatedBlockComment(_))
        ));
    }

    #[test]
    fn datum_comment_skips_one_form() {
        assert_eq!(kinds("1 #;(2 3) 4"), vec![
            TokenKind::Integer(1.into()),
            TokenKind::Integer(4.into()),
            TokenKind::Eof
        ]);
    }

    #[test]
    fn quoted_symbol() {
        assert_eq!(kinds("'foo")[0], TokenKind::Symbol("'foo".to_string()));
    }

    #[test]
    fn quoted_list_carries_children() {
        match &kinds("'(1 2)")[0] {
            TokenKind::ListAbbrev(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].kind, TokenKind::Integer(1.into()));
            }
            other => panic!("expected ListAbbrev, got {other:?}"),
        }
    }

    #[test]
    fn quoted_list_nests_same_glyph_sublists() {
        let ks = kinds("'(1 (2 3)) 9");
        match &ks[0] {
            TokenKind::ListAbbrev(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].kind, TokenKind::Integer(1.into()));
                match &children[1].kind {
                    TokenKind::ListAbbrev(inner) => {
                        assert_eq!(inner.len(), 2);
                        assert_eq!(inner[0].kind, TokenKind::Integer(2.into()));
                        assert_eq!(inner[1].kind, TokenKind::Integer(3.into()));
                    }
                    other => panic!("expected nested ListAbbrev, got {other:?}"),
                }
            }
            other => panic!("expected ListAbbrev, got {other:?}"),
        }
        // the outer closer must be consumed, leaving the trailing `9` as its own token.
        assert_eq!(ks[1], TokenKind::Integer(9.into()));
        assert_eq!(ks[2], TokenKind::Eof);
    }

    #[test]
    fn nested_quote_is_not_implemented() {
        assert!(matches!(
            Lexer::tokenize("''x"),
            Err(LexError::NestedQuoteNotImplemented(_))
        ));
        assert!(matches!(
            Lexer::tokenize("'(a 'b)"),
            Err(LexError::NestedQuoteNotImplemented(_))
        ));
    }

    #[test]
    fn bracket_mismatch_reported_before_tokenizing() {
        assert!(matches!(
            Lexer::tokenize("(+ 1 2]"),
            Err(LexError::IncorrectClosingBracket { .. })
        ));
    }

    #[test]
    fn unclosed_bracket_reported_at_eof() {
        assert!(matches!(
            Lexer::tokenize("(+ 1 2"),
            Err(LexError::ExpectedClosingBracket { .. })
        ));
    }

    #[test]
    fn pipe_identifier_reports_not_implemented() {
        assert!(matches!(
            Lexer::tokenize("|foo|"),
            Err(LexError::PipeIdentifierNotImplemented(_))
        ));
    }
}
