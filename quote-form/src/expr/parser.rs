use super::ExprError;
use super::lexer::{Spanned, Token};

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Str(String),
    Ident { name: String, pos: usize },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Member { object: Box<Expr>, property: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
}

/// Parse a whole body: an optional expression followed by optional `;`.
///
/// An empty body yields `None` (the expression evaluates to `undefined`).
pub(crate) fn parse(tokens: &[Spanned], end: usize) -> Result<Option<Expr>, ExprError> {
    let mut parser = Parser {
        tokens,
        idx: 0,
        end,
        depth: 0,
    };
    let expr = if parser.at_end_of_body() {
        None
    } else {
        Some(parser.expression()?)
    };
    while parser.eat(&Token::Semicolon) {}
    if let Some(extra) = parser.peek() {
        return Err(ExprError::syntax(
            extra.pos,
            format!("unexpected {}", describe(&extra.token)),
        ));
    }
    Ok(expr)
}

/// Deepest expression tree accepted.
const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    tokens: &'a [Spanned],
    idx: usize,
    /// Byte length of the source, reported for errors at end of input.
    end: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.idx)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn at_end_of_body(&self) -> bool {
        matches!(self.peek_token(), None | Some(Token::Semicolon))
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_token() == Some(token) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn pos(&self) -> usize {
        self.peek().map(|s| s.pos).unwrap_or(self.end)
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExprError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {}", describe(token))))
        }
    }

    fn unexpected(&self, context: &str) -> ExprError {
        let found = self
            .peek_token()
            .map(describe)
            .unwrap_or_else(|| "end of input".to_string());
        ExprError::syntax(self.pos(), format!("{context}, found {found}"))
    }

    /// Count one more level of nesting in the tree being built.
    ///
    /// Every node sits at most `depth` levels deep, which bounds both this
    /// parser's recursion and the evaluator's.
    fn nest(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::syntax(self.pos(), "expression nested too deeply"));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, ExprError> {
        self.conditional()
    }

    fn conditional(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        self.nest()?;
        let test = self.logical_or()?;
        if !self.eat(&Token::Question) {
            self.depth = depth;
            return Ok(test);
        }
        let consequent = self.conditional()?;
        self.expect(&Token::Colon)?;
        let alternate = self.conditional()?;
        self.depth = depth;
        Ok(Expr::Conditional(
            Box::new(test),
            Box::new(consequent),
            Box::new(alternate),
        ))
    }

    fn logical_or(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.logical_and()?;
        while self.eat(&Token::OrOr) {
            self.nest()?;
            let right = self.logical_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            self.nest()?;
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.relational()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::EqEq) => BinaryOp::LooseEq,
                Some(Token::NotEq) => BinaryOp::LooseNe,
                Some(Token::EqEqEq) => BinaryOp::StrictEq,
                Some(Token::NotEqEq) => BinaryOp::StrictNe,
                _ => break,
            };
            self.idx += 1;
            self.nest()?;
            let right = self.relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn relational(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.additive()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.idx += 1;
            self.nest()?;
            let right = self.additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.idx += 1;
            self.nest()?;
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.idx += 1;
            self.nest()?;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek_token() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Bang) => UnaryOp::Not,
            _ => return self.exponent(),
        };
        self.idx += 1;
        let depth = self.depth;
        self.nest()?;
        let operand = self.unary()?;
        self.depth = depth;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    // Right-associative: 2 ** 3 ** 2 == 2 ** 9
    fn exponent(&mut self) -> Result<Expr, ExprError> {
        let base = self.postfix()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        let depth = self.depth;
        self.nest()?;
        let power = self.unary()?;
        self.depth = depth;
        Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(power)))
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let property = match self.peek_token() {
                    Some(Token::Ident(name)) => name.clone(),
                    _ => return Err(self.unexpected("expected property name after '.'")),
                };
                self.idx += 1;
                self.nest()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Str(property)),
                };
            } else if self.eat(&Token::LBracket) {
                self.nest()?;
                let property = self.expression()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(property),
                };
            } else if self.eat(&Token::LParen) {
                self.nest()?;
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                self.depth = depth;
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let Some(spanned) = self.peek().cloned() else {
            return Err(self.unexpected("expected an expression"));
        };
        let expr = match spanned.token {
            Token::Number(n) => Expr::Number(n),
            Token::Str(s) => Expr::Str(s),
            Token::Ident(name) => Expr::Ident {
                name,
                pos: spanned.pos,
            },
            Token::LParen => {
                self.idx += 1;
                let inner = self.expression()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected("expected an expression")),
        };
        self.idx += 1;
        Ok(expr)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number {n}"),
        Token::Str(s) => format!("string {s:?}"),
        Token::Ident(name) => format!("'{name}'"),
        Token::Plus => "'+'".into(),
        Token::Minus => "'-'".into(),
        Token::Star => "'*'".into(),
        Token::StarStar => "'**'".into(),
        Token::Slash => "'/'".into(),
        Token::Percent => "'%'".into(),
        Token::Bang => "'!'".into(),
        Token::Lt => "'<'".into(),
        Token::Le => "'<='".into(),
        Token::Gt => "'>'".into(),
        Token::Ge => "'>='".into(),
        Token::EqEq => "'=='".into(),
        Token::EqEqEq => "'==='".into(),
        Token::NotEq => "'!='".into(),
        Token::NotEqEq => "'!=='".into(),
        Token::AndAnd => "'&&'".into(),
        Token::OrOr => "'||'".into(),
        Token::Question => "'?'".into(),
        Token::Colon => "':'".into(),
        Token::Dot => "'.'".into(),
        Token::Comma => "','".into(),
        Token::Semicolon => "';'".into(),
        Token::LParen => "'('".into(),
        Token::RParen => "')'".into(),
        Token::LBracket => "'['".into(),
        Token::RBracket => "']'".into(),
    }
}
