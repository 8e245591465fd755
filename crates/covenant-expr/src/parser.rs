// Path: crates/covenant-expr/src/parser.rs
//! Tokenizer and recursive-descent parser for the boolean identity-expression
//! grammar: `&` (AND) binds tighter than `|` (OR), and parentheses group.
//!
//! Terms are identity strings (e.g. `ed25519:abcd...` or `darc:abcd...`) and
//! are treated as opaque atoms by the parser; the caller's `satisfied`
//! predicate decides whether a given term is true.

use covenant_types::ExprError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    And,
    Or,
    LParen,
    RParen,
    Term(String),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token::Term(std::mem::take(current)));
        }
    };

    for ch in expr.chars() {
        match ch {
            '&' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::And);
            }
            '|' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Or);
            }
            '(' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::RParen);
            }
            c if c.is_whitespace() => {
                flush(&mut current, &mut tokens);
            }
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    Ok(tokens)
}

/// An abstract syntax tree node for a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ast {
    Term(String),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }
}

/// Parses `expr` into an [`Ast`], enforcing balanced parentheses and that the
/// whole input is consumed.
pub(crate) fn parse(expr: &str) -> Result<Ast, ExprError> {
    let tokens = tokenize(expr)?;
    let mut stream = TokenStream { tokens: &tokens, pos: 0 };
    let ast = parse_or(&mut stream, expr)?;
    if stream.pos != stream.tokens.len() {
        return Err(ExprError::Parse(expr.to_string()));
    }
    Ok(ast)
}

fn parse_or(stream: &mut TokenStream<'_>, src: &str) -> Result<Ast, ExprError> {
    let mut lhs = parse_and(stream, src)?;
    while matches!(stream.peek(), Some(Token::Or)) {
        stream.next();
        let rhs = parse_and(stream, src)?;
        lhs = Ast::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_and(stream: &mut TokenStream<'_>, src: &str) -> Result<Ast, ExprError> {
    let mut lhs = parse_atom(stream, src)?;
    while matches!(stream.peek(), Some(Token::And)) {
        stream.next();
        let rhs = parse_atom(stream, src)?;
        lhs = Ast::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_atom(stream: &mut TokenStream<'_>, src: &str) -> Result<Ast, ExprError> {
    match stream.next() {
        Some(Token::Term(t)) => Ok(Ast::Term(t.clone())),
        Some(Token::LParen) => {
            let inner = parse_or(stream, src)?;
            match stream.next() {
                Some(Token::RParen) => Ok(inner),
                _ => Err(ExprError::UnbalancedParens(src.to_string())),
            }
        }
        _ => Err(ExprError::Parse(src.to_string())),
    }
}

impl Ast {
    pub(crate) fn eval(&self, satisfied: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Ast::Term(t) => satisfied(t),
            Ast::And(lhs, rhs) => lhs.eval(satisfied) && rhs.eval(satisfied),
            Ast::Or(lhs, rhs) => lhs.eval(satisfied) || rhs.eval(satisfied),
        }
    }
}
