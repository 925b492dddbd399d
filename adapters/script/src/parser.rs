//! Indentation-aware parser producing statement trees.

use robo_trail_core::EngineError;

use crate::lexer::{tokenize, Token};

const TAB_WIDTH: usize = 4;
/// Deepest block or expression nesting a program may use.
pub(crate) const MAX_NESTING: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BinaryOp {
    Add,
    Subtract,
    Multiply,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Text(String),
    Name(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Function {
    pub(crate) param: Option<String>,
    pub(crate) body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StmtKind {
    Assign {
        name: String,
        value: Expr,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    For {
        var: String,
        count: Expr,
        body: Vec<Stmt>,
    },
    Def {
        name: String,
        function: Function,
    },
    Pass,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Stmt {
    pub(crate) line: usize,
    pub(crate) kind: StmtKind,
}

struct Line {
    number: usize,
    indent: usize,
    tokens: Vec<Token>,
}

enum Header {
    Simple(StmtKind),
    For { var: String, count: Expr },
    Def { name: String, param: Option<String> },
}

/// Parses a whole program into top-level statements.
pub(crate) fn parse(source: &str) -> Result<Vec<Stmt>, EngineError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let tokens = tokenize(raw, number)?;
        if tokens.is_empty() {
            continue;
        }
        lines.push(Line {
            number,
            indent: indent_width(raw),
            tokens,
        });
    }

    let mut cursor = 0;
    let body = parse_block(&lines, &mut cursor, 0, 0)?;
    match lines.get(cursor) {
        Some(line) => Err(EngineError::at_line(
            line.number,
            "IndentationError: unindent does not match any outer indentation level",
        )),
        None => Ok(body),
    }
}

fn indent_width(raw: &str) -> usize {
    raw.chars()
        .take_while(|ch| *ch == ' ' || *ch == '\t')
        .map(|ch| if ch == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn parse_block(
    lines: &[Line],
    cursor: &mut usize,
    indent: usize,
    depth: usize,
) -> Result<Vec<Stmt>, EngineError> {
    let mut body = Vec::new();
    while let Some(line) = lines.get(*cursor) {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(EngineError::at_line(
                line.number,
                "IndentationError: unexpected indent",
            ));
        }
        *cursor += 1;

        let kind = match parse_header(line)? {
            Header::Simple(kind) => kind,
            Header::For { var, count } => {
                let body = parse_nested(lines, cursor, line, depth + 1)?;
                StmtKind::For { var, count, body }
            }
            Header::Def { name, param } => {
                let body = parse_nested(lines, cursor, line, depth + 1)?;
                StmtKind::Def {
                    name,
                    function: Function { param, body },
                }
            }
        };
        body.push(Stmt {
            line: line.number,
            kind,
        });
    }
    Ok(body)
}

fn parse_nested(
    lines: &[Line],
    cursor: &mut usize,
    header: &Line,
    depth: usize,
) -> Result<Vec<Stmt>, EngineError> {
    if depth > MAX_NESTING {
        return Err(EngineError::at_line(
            header.number,
            "SyntaxError: too many statically nested blocks",
        ));
    }
    match lines.get(*cursor) {
        Some(next) if next.indent > header.indent => {
            parse_block(lines, cursor, next.indent, depth)
        }
        _ => Err(EngineError::at_line(
            header.number,
            "IndentationError: expected an indented block",
        )),
    }
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    position: usize,
    line: usize,
    depth: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Moves one level deeper into the expression being built.
    fn descend(&mut self) -> Result<(), EngineError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(EngineError::at_line(
                self.line,
                "SyntaxError: too many nested expressions",
            ));
        }
        Ok(())
    }

    fn invalid(&self) -> EngineError {
        EngineError::at_line(self.line, "SyntaxError: invalid syntax")
    }

    fn expect(&mut self, expected: &Token) -> Result<(), EngineError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(self.invalid()),
        }
    }

    fn ident(&mut self) -> Result<String, EngineError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(self.invalid()),
        }
    }

    fn finish(&self) -> Result<(), EngineError> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }
}

fn parse_header(line: &Line) -> Result<Header, EngineError> {
    let mut stream = TokenStream {
        tokens: &line.tokens,
        position: 0,
        line: line.number,
        depth: 0,
    };

    let first = stream.ident()?;
    let header = match first.as_str() {
        "for" => {
            let var = stream.ident()?;
            if stream.ident()? != "in" || stream.ident()? != "range" {
                return Err(stream.invalid());
            }
            stream.expect(&Token::LParen)?;
            let count = parse_expr(&mut stream)?;
            stream.expect(&Token::RParen)?;
            stream.expect(&Token::Colon)?;
            Header::For { var, count }
        }
        "def" => {
            let name = stream.ident()?;
            stream.expect(&Token::LParen)?;
            let param = match stream.peek() {
                Some(Token::Ident(_)) => Some(stream.ident()?),
                _ => None,
            };
            stream.expect(&Token::RParen)?;
            stream.expect(&Token::Colon)?;
            Header::Def { name, param }
        }
        "pass" => Header::Simple(StmtKind::Pass),
        "while" | "if" | "elif" | "else" | "return" | "import" | "class" => {
            return Err(EngineError::at_line(
                line.number,
                format!("SyntaxError: '{first}' is not available in robot programs"),
            ));
        }
        _ => match stream.next() {
            Some(Token::Assign) => Header::Simple(StmtKind::Assign {
                name: first,
                value: parse_expr(&mut stream)?,
            }),
            Some(Token::LParen) => {
                let args = parse_args(&mut stream)?;
                Header::Simple(StmtKind::Call { name: first, args })
            }
            _ => return Err(stream.invalid()),
        },
    };
    stream.finish()?;
    Ok(header)
}

fn parse_args(stream: &mut TokenStream<'_>) -> Result<Vec<Expr>, EngineError> {
    let mut args = Vec::new();
    if stream.peek() == Some(&Token::RParen) {
        let _ = stream.next();
        return Ok(args);
    }
    loop {
        args.push(parse_expr(stream)?);
        match stream.next() {
            Some(Token::Comma) => {}
            Some(Token::RParen) => return Ok(args),
            _ => return Err(stream.invalid()),
        }
    }
}

// Every operator in a chain deepens the left-leaning tree, so it counts
// towards the nesting limit just like parentheses do.
fn parse_expr(stream: &mut TokenStream<'_>) -> Result<Expr, EngineError> {
    let base = stream.depth;
    let mut lhs = parse_term(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Subtract,
            _ => {
                stream.depth = base;
                return Ok(lhs);
            }
        };
        let _ = stream.next();
        stream.descend()?;
        let rhs = parse_term(stream)?;
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
}

fn parse_term(stream: &mut TokenStream<'_>) -> Result<Expr, EngineError> {
    let base = stream.depth;
    let mut lhs = parse_unary(stream)?;
    while stream.peek() == Some(&Token::Star) {
        let _ = stream.next();
        stream.descend()?;
        let rhs = parse_unary(stream)?;
        lhs = Expr::Binary {
            op: BinaryOp::Multiply,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
    stream.depth = base;
    Ok(lhs)
}

fn parse_unary(stream: &mut TokenStream<'_>) -> Result<Expr, EngineError> {
    let base = stream.depth;
    let expr = match stream.next() {
        Some(Token::Minus) => {
            stream.descend()?;
            Expr::Negate(Box::new(parse_unary(stream)?))
        }
        Some(Token::Plus) => {
            stream.descend()?;
            parse_unary(stream)?
        }
        Some(Token::Number(value)) => Expr::Number(*value),
        Some(Token::Text(text)) => Expr::Text(text.clone()),
        Some(Token::Ident(name)) => Expr::Name(name.clone()),
        Some(Token::LParen) => {
            stream.descend()?;
            let inner = parse_expr(stream)?;
            stream.expect(&Token::RParen)?;
            inner
        }
        _ => return Err(stream.invalid()),
    };
    stream.depth = base;
    Ok(expr)
}
