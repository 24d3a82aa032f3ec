//! Minimal expression language for template interpolations
//!
//! The grammar covers every observed use of `${ ... }` interpolations:
//!
//! ```text
//! expr    := term ('+' term)*
//! term    := literal | call
//! call    := ident '(' (literal (',' literal)*)? ')'
//! literal := string | number | 'true' | 'false' | 'null'
//! ```
//!
//! Strings accept single or double quotes with backslash escapes. Call
//! arguments are restricted to literals; the renderer's discovery pass
//! relies on argument values being known before any fetcher runs.

use serde_json::Value;

/// A parsed interpolation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal scalar value.
    Literal(Value),
    /// A fetcher call with literal arguments.
    Call { name: String, args: Vec<Value> },
    /// String concatenation of two or more terms.
    Concat(Vec<Expr>),
}

impl Expr {
    /// Parse an expression from the text between `${` and `}`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut parser = Parser::new(input);
        let expr = parser.expression()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(format!("unexpected character '{c}' after expression"));
        }
        Ok(expr)
    }

    /// Visit every fetcher call in this expression.
    pub fn for_each_call<'a>(&'a self, visit: &mut impl FnMut(&'a str, &'a [Value])) {
        match self {
            Self::Literal(_) => {}
            Self::Call { name, args } => visit(name, args),
            Self::Concat(terms) => {
                for term in terms {
                    term.for_each_call(visit);
                }
            }
        }
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{expected}', found '{c}'")),
            None => Err(format!("expected '{expected}', found end of input")),
        }
    }

    fn expression(&mut self) -> Result<Expr, String> {
        let first = self.term()?;
        let mut terms = vec![first];

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    terms.push(self.term()?);
                }
                _ => break,
            }
        }

        if terms.len() == 1 {
            Ok(terms.pop().expect("one term"))
        } else {
            Ok(Expr::Concat(terms))
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') | Some('"') => Ok(Expr::Literal(Value::String(self.string_literal()?))),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(Expr::Literal(self.number_literal()?)),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.ident_term(),
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("unexpected end of input".to_string()),
        }
    }

    /// An identifier: keyword literal or fetcher call.
    fn ident_term(&mut self) -> Result<Expr, String> {
        let name = self.identifier();
        match name.as_str() {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" => return Ok(Expr::Literal(Value::Null)),
            _ => {}
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Err(format!("expected '(' after fetcher name '{name}'"));
        }
        self.bump();

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Expr::Call { name, args });
        }

        loop {
            args.push(self.argument()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                Some(c) => return Err(format!("expected ',' or ')', found '{c}'")),
                None => return Err("unterminated argument list".to_string()),
            }
        }

        Ok(Expr::Call { name, args })
    }

    /// A call argument: literals only.
    fn argument(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') | Some('"') => Ok(Value::String(self.string_literal()?)),
            Some(c) if c.is_ascii_digit() || c == '-' => self.number_literal(),
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.identifier();
                match word.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => Err(format!(
                        "fetcher arguments must be literals, found '{other}'"
                    )),
                }
            }
            Some(c) => Err(format!("unexpected character '{c}' in argument")),
            None => Err("unexpected end of input in argument".to_string()),
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn string_literal(&mut self) -> Result<String, String> {
        let quote = self.bump().expect("caller checked quote");
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err("unterminated escape sequence".to_string()),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn number_literal(&mut self) -> Result<Value, String> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if text.contains('.') {
            let parsed: f64 = text
                .parse()
                .map_err(|_| format!("invalid number '{text}'"))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| format!("invalid number '{text}'"))
        } else {
            let parsed: i64 = text
                .parse()
                .map_err(|_| format!("invalid number '{text}'"))?;
            Ok(Value::Number(parsed.into()))
        }
    }
}
