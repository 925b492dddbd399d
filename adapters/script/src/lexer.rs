//! Line tokenizer for the learner dialect.

use robo_trail_core::EngineError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Number(f64),
    Text(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Assign,
    Plus,
    Minus,
    Star,
}

/// Tokenizes a single physical line, stopping at a `#` outside quotes.
pub(crate) fn tokenize(text: &str, line: usize) -> Result<Vec<Token>, EngineError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            ' ' | '\t' | '\r' => {}
            '#' => break,
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            ':' => tokens.push(Token::Colon),
            '=' => tokens.push(Token::Assign),
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '"' | '\'' => {
                let mut literal = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == ch {
                        closed = true;
                        break;
                    }
                    literal.push(inner);
                }
                if !closed {
                    return Err(EngineError::at_line(
                        line,
                        "SyntaxError: unterminated string literal",
                    ));
                }
                tokens.push(Token::Text(literal));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(index, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = index + next.len_utf8();
                        let _ = chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[start..end];
                let value = literal.parse::<f64>().map_err(|_| {
                    EngineError::at_line(line, format!("SyntaxError: invalid number '{literal}'"))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(index, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = index + next.len_utf8();
                        let _ = chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(text[start..end].to_owned()));
            }
            other => {
                return Err(EngineError::at_line(
                    line,
                    format!("SyntaxError: invalid character '{other}'"),
                ));
            }
        }
    }

    Ok(tokens)
}
