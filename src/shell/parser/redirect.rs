use super::ast::{RedirectSpec, Redirection};
use super::lexer::{RedirectOp, Token};
use crate::shell::error::SyntaxError;

// 同一个流重定向多次时以最后一次为准
pub fn resolve(tokens: Vec<Token>) -> Result<(Vec<String>, RedirectSpec), SyntaxError> {
    let mut words = Vec::with_capacity(tokens.len());
    let mut spec = RedirectSpec::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let op = match token {
            Token::Word(word) => {
                words.push(word);
                continue;
            }
            Token::Redirect(op) => op,
        };

        let path = match tokens.next() {
            Some(Token::Word(path)) => path,
            _ => return Err(SyntaxError::MissingTarget),
        };
        let redirection = Redirection {
            path,
            append: op.is_append(),
        };
        match op {
            RedirectOp::Output | RedirectOp::Append => spec.stdout = Some(redirection),
            RedirectOp::Error | RedirectOp::ErrorAppend => spec.stderr = Some(redirection),
        }
    }

    if words.is_empty() {
        return Err(SyntaxError::MissingCommand);
    }
    Ok((words, spec))
}
