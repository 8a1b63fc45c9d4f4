use log::debug;

use super::ast::ParsedCommand;
use super::lexer::{Lexer, Token};
use super::redirect;
use crate::shell::error::ShellError;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
        }
    }

    /// 空行返回 `Ok(None)`
    pub fn parse_command(self) -> Result<Option<ParsedCommand>, ShellError> {
        let tokens = self.lexer.tokenize();
        if tokens.is_empty() {
            return Ok(None);
        }
        debug!(
            "词法分析结果: [{}]",
            tokens
                .iter()
                .map(Token::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let (mut words, redirect) = redirect::resolve(tokens)?;
        let name = words.remove(0);
        Ok(Some(ParsedCommand {
            name,
            args: words,
            redirect,
        }))
    }
}
