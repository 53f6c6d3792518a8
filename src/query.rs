//! SQL subset understood by the local store.
//!
//! ```text
//! SELECT * FROM Family WHERE Family.lastName = 'Andersen'
//! ```
//!
//! Supported: `SELECT * FROM <alias>` with an optional `WHERE` clause made of
//! comparisons (`= != <> < <= > >=`), `IN (...)`, `NOT`, `AND`, `OR` and
//! parentheses. Field paths start with the `FROM` alias. Keywords are
//! case-insensitive. Projections, joins, functions and `ORDER BY` are not
//! supported and fail with [`Error::Query`].

use crate::error::{Error, Result};
use crate::filter::{CompareOp, Filter};
use serde_json::{Number, Value};

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Name bound by `FROM`.
    pub alias: String,
    /// Compiled `WHERE` clause; `None` selects every document.
    pub filter: Option<Filter>,
}

impl Query {
    /// Parse query text.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: text.len(),
        };
        parser.query()
    }

    /// Whether a document satisfies the `WHERE` clause.
    pub fn matches(&self, doc: &Value) -> bool {
        self.filter.as_ref().map_or(true, |f| f.evaluate(doc))
    }
}

/// Quote a string as a query literal, escaping quotes and backslashes.
///
/// ```
/// assert_eq!(getstarted::query::quote_literal("O'Brien"), r"'O\'Brien'");
/// ```
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(Number),
    Star,
    Comma,
    Dot,
    LParen,
    RParen,
    Op(CompareOp),
}

fn syntax(position: usize, message: impl Into<String>) -> Error {
    Error::Query {
        position,
        message: message.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' | ',' | '.' | '(' | ')' => {
                chars.next();
                let token = match c {
                    '*' => Token::Star,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                };
                tokens.push((start, token));
            }
            '=' => {
                chars.next();
                tokens.push((start, Token::Op(CompareOp::Eq)));
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push((start, Token::Op(CompareOp::Ne))),
                    _ => return Err(syntax(start, "expected '=' after '!'")),
                }
            }
            '<' | '>' => {
                chars.next();
                let op = match (c, chars.peek().map(|&(_, n)| n)) {
                    ('<', Some('=')) => Some(CompareOp::Lte),
                    ('<', Some('>')) => Some(CompareOp::Ne),
                    ('>', Some('=')) => Some(CompareOp::Gte),
                    _ => None,
                };
                let op = match op {
                    Some(op) => {
                        chars.next();
                        op
                    }
                    None if c == '<' => CompareOp::Lt,
                    None => CompareOp::Gt,
                };
                tokens.push((start, Token::Op(op)));
            }
            '\'' | '"' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => literal.push('\n'),
                            Some((_, 't')) => literal.push('\t'),
                            Some((_, escaped)) => literal.push(escaped),
                            None => return Err(syntax(start, "unterminated string literal")),
                        },
                        Some((_, q)) if q == c => break,
                        Some((_, other)) => literal.push(other),
                        None => return Err(syntax(start, "unterminated string literal")),
                    }
                }
                tokens.push((start, Token::Str(literal)));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut end = start;
                chars.next();
                end += c.len_utf8();
                while let Some(&(i, n)) = chars.peek() {
                    let continues_number = n.is_ascii_digit()
                        || n == '.'
                        || n == 'e'
                        || n == 'E'
                        || ((n == '+' || n == '-') && matches!(text[..i].chars().last(), Some('e' | 'E')));
                    if !continues_number {
                        break;
                    }
                    chars.next();
                    end = i + n.len_utf8();
                }
                tokens.push((start, Token::Number(parse_number(&text[start..end], start)?)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, n)) = chars.peek() {
                    if !(n.is_alphanumeric() || n == '_') {
                        break;
                    }
                    chars.next();
                    end = i + n.len_utf8();
                }
                tokens.push((start, Token::Ident(text[start..end].to_string())));
            }
            other => return Err(syntax(start, format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

fn parse_number(raw: &str, position: usize) -> Result<Number> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Number::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| syntax(position, format!("invalid number '{}'", raw)))
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(p, _)| *p)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(syntax(self.position(), format!("expected {}", keyword)))
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(syntax(self.position(), format!("expected {}", what)))
        }
    }

    fn ident(&mut self) -> Result<String> {
        let position = self.position();
        match self.advance() {
            Some(Token::Ident(word)) if !is_reserved(&word) => Ok(word),
            _ => Err(syntax(position, "expected identifier")),
        }
    }

    fn query(&mut self) -> Result<Query> {
        self.expect_keyword("SELECT")?;
        self.expect(Token::Star, "'*' (projections are not supported)")?;
        self.expect_keyword("FROM")?;
        let alias = self.ident()?;

        let filter = if self.eat_keyword("WHERE") {
            Some(self.or_expr(&alias)?)
        } else {
            None
        };

        if self.peek().is_some() {
            return Err(syntax(self.position(), "unexpected trailing input"));
        }

        Ok(Query { alias, filter })
    }

    fn or_expr(&mut self, alias: &str) -> Result<Filter> {
        let mut terms = vec![self.and_expr(alias)?];
        while self.eat_keyword("OR") {
            terms.push(self.and_expr(alias)?);
        }
        Ok(collapse(terms, Filter::Or))
    }

    fn and_expr(&mut self, alias: &str) -> Result<Filter> {
        let mut factors = vec![self.factor(alias)?];
        while self.eat_keyword("AND") {
            factors.push(self.factor(alias)?);
        }
        Ok(collapse(factors, Filter::And))
    }

    fn factor(&mut self, alias: &str) -> Result<Filter> {
        if self.eat_keyword("NOT") {
            return Ok(Filter::not(self.factor(alias)?));
        }
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or_expr(alias)?;
            self.expect(Token::RParen, "')'")?;
            return Ok(inner);
        }
        self.predicate(alias)
    }

    fn predicate(&mut self, alias: &str) -> Result<Filter> {
        let field = self.path(alias)?;

        let negated = self.eat_keyword("NOT");
        if self.eat_keyword("IN") {
            self.expect(Token::LParen, "'(' after IN")?;
            let mut values = vec![self.literal()?];
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                values.push(self.literal()?);
            }
            self.expect(Token::RParen, "')'")?;
            let filter = Filter::In { field, values };
            return Ok(if negated { Filter::not(filter) } else { filter });
        }
        if negated {
            return Err(syntax(self.position(), "expected IN after NOT"));
        }

        let position = self.position();
        let op = match self.advance() {
            Some(Token::Op(op)) => op,
            _ => return Err(syntax(position, "expected comparison operator")),
        };
        let value = self.literal()?;
        Ok(Filter::compare(field, op, value))
    }

    fn path(&mut self, alias: &str) -> Result<String> {
        let position = self.position();
        let root = self.ident()?;
        if root != alias {
            return Err(syntax(
                position,
                format!("unknown identifier '{}', expected alias '{}'", root, alias),
            ));
        }

        let mut segments = Vec::new();
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            segments.push(self.ident()?);
        }
        if segments.is_empty() {
            return Err(syntax(position, "expected a property path after the alias"));
        }
        Ok(segments.join("."))
    }

    fn literal(&mut self) -> Result<Value> {
        let position = self.position();
        match self.advance() {
            Some(Token::Str(s)) => Ok(Value::String(s)),
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("null") => Ok(Value::Null),
            _ => Err(syntax(position, "expected literal")),
        }
    }
}

const RESERVED: [&str; 11] = [
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "TRUE", "FALSE", "NULL", "JOIN",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn collapse(mut filters: Vec<Filter>, wrap: fn(Vec<Filter>) -> Filter) -> Filter {
    if filters.len() == 1 {
        filters.remove(0)
    } else {
        wrap(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_query() {
        let query = Query::parse("SELECT * FROM Family WHERE Family.lastName = 'Andersen'").unwrap();
        assert_eq!(query.alias, "Family");
        assert_eq!(query.filter, Some(Filter::eq("lastName", "Andersen")));
    }

    #[test]
    fn test_no_where_matches_everything() {
        let query = Query::parse("select * from f").unwrap();
        assert!(query.filter.is_none());
        assert!(query.matches(&json!({"id": "x"})));
    }

    #[test]
    fn test_precedence_and_binds_tighter() {
        let query =
            Query::parse("SELECT * FROM f WHERE f.a = 1 OR f.b = 2 AND f.c = 3").unwrap();
        assert_eq!(
            query.filter,
            Some(Filter::or([
                Filter::eq("a", 1),
                Filter::and([Filter::eq("b", 2), Filter::eq("c", 3)]),
            ]))
        );
    }

    #[test]
    fn test_parentheses_and_not() {
        let query =
            Query::parse("SELECT * FROM f WHERE NOT (f.a = 1 OR f.a = 2) AND f.ok = true").unwrap();
        assert_eq!(
            query.filter,
            Some(Filter::and([
                Filter::not(Filter::or([Filter::eq("a", 1), Filter::eq("a", 2)])),
                Filter::eq("ok", true),
            ]))
        );
    }

    #[test]
    fn test_operators() {
        let cases = [
            ("=", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<>", CompareOp::Ne),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Lte),
            (">", CompareOp::Gt),
            (">=", CompareOp::Gte),
        ];
        for (text, op) in cases {
            let query = Query::parse(&format!("SELECT * FROM f WHERE f.grade {} 5", text)).unwrap();
            assert_eq!(query.filter, Some(Filter::compare("grade", op, 5)), "{}", text);
        }
    }

    #[test]
    fn test_in_and_not_in() {
        let query = Query::parse("SELECT * FROM f WHERE f.state IN ('WA', 'NY')").unwrap();
        assert_eq!(query.filter, Some(Filter::in_("state", ["WA", "NY"])));

        let query = Query::parse("SELECT * FROM f WHERE f.state NOT IN ('WA')").unwrap();
        assert_eq!(query.filter, Some(Filter::not(Filter::in_("state", ["WA"]))));
    }

    #[test]
    fn test_literals() {
        let query = Query::parse(
            r#"SELECT * FROM f WHERE f.a = -1.5 AND f.b = "x" AND f.c = null AND f.d = 2e3"#,
        )
        .unwrap();
        assert_eq!(
            query.filter,
            Some(Filter::and([
                Filter::eq("a", -1.5),
                Filter::eq("b", "x"),
                Filter::eq("c", Value::Null),
                Filter::eq("d", 2000.0),
            ]))
        );
    }

    #[test]
    fn test_nested_path() {
        let query = Query::parse("SELECT * FROM Family WHERE Family.address.city = 'Seattle'").unwrap();
        assert_eq!(query.filter, Some(Filter::eq("address.city", "Seattle")));
    }

    #[test]
    fn test_quote_literal_roundtrip() {
        let text = format!("SELECT * FROM f WHERE f.name = {}", quote_literal(r"O'Brien \ Co"));
        let query = Query::parse(&text).unwrap();
        assert_eq!(query.filter, Some(Filter::eq("name", r"O'Brien \ Co")));
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("", 0),
            ("SELECT f.id FROM f", 7),
            ("SELECT * FROM", 13),
            ("SELECT * FROM f WHERE g.a = 1", 22),
            ("SELECT * FROM f WHERE f = 1", 22),
            ("SELECT * FROM f WHERE f.a = ", 28),
            ("SELECT * FROM f WHERE f.a = 'open", 28),
            ("SELECT * FROM f WHERE f.a = 1 ORDER BY f.a", 30),
            ("SELECT * FROM f WHERE f.a ! 1", 26),
        ];
        for (text, position) in cases {
            match Query::parse(text) {
                Err(Error::Query { position: p, .. }) => assert_eq!(p, position, "{}", text),
                other => panic!("expected syntax error for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_syntax_error_is_bad_request() {
        let err = Query::parse("DELETE FROM f").unwrap_err();
        assert_eq!(err.status_code(), Some(400));
    }

    use proptest::prelude::*;

    proptest! {
        // Any string survives quoting and parsing unchanged.
        #[test]
        fn prop_quoted_literal_roundtrip(value in "\\PC*") {
            let text = format!("SELECT * FROM f WHERE f.v = {}", quote_literal(&value));
            let query = Query::parse(&text).unwrap();
            prop_assert_eq!(query.filter, Some(Filter::eq("v", value)));
        }
    }
}
