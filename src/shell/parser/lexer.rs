use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Word(String),
    Redirect(RedirectOp),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectOp {
    Output,      // > 1>
    Append,      // >> 1>>
    Error,       // 2>
    ErrorAppend, // 2>>
}

impl RedirectOp {
    fn for_fd(fd: char) -> Self {
        if fd == '2' {
            RedirectOp::Error
        } else {
            RedirectOp::Output
        }
    }

    fn appending(self) -> Self {
        match self {
            RedirectOp::Output | RedirectOp::Append => RedirectOp::Append,
            RedirectOp::Error | RedirectOp::ErrorAppend => RedirectOp::ErrorAppend,
        }
    }

    pub fn is_append(self) -> bool {
        matches!(self, RedirectOp::Append | RedirectOp::ErrorAppend)
    }
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RedirectOp::Output => ">",
            RedirectOp::Append => ">>",
            RedirectOp::Error => "2>",
            RedirectOp::ErrorAppend => "2>>",
        };
        f.write_str(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => f.write_str(word),
            Token::Redirect(op) => op.fmt(f),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Quote {
    None,
    Single,
    Double,
}

/// 逐字符扫描：引号状态 + 单步前瞻（转义、`1`/`2` 文件描述符前缀、`>>` 追加）
///
/// 未闭合的引号和结尾的反斜杠直接当作已闭合
pub struct Lexer<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    word: String,
    quote: Quote,
    pending_escape: bool,
    pending_digit: Option<char>,
    pending_append: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: Vec::new(),
            word: String::new(),
            quote: Quote::None,
            pending_escape: false,
            pending_digit: None,
            pending_append: false,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        for c in self.input.chars() {
            self.feed(c);
        }
        self.flush_digit();
        self.flush_word();
        self.tokens
    }

    fn feed(&mut self, c: char) {
        if self.pending_escape {
            self.pending_escape = false;
            if self.quote == Quote::Double && c != '"' && c != '\\' {
                self.word.push('\\');
            }
            self.word.push(c);
            return;
        }

        if c == '\\' && self.quote != Quote::Single {
            self.flush_lookahead();
            self.pending_escape = true;
            return;
        }

        if c == '\'' && self.quote != Quote::Double {
            self.flush_lookahead();
            self.quote = match self.quote {
                Quote::Single => Quote::None,
                _ => Quote::Single,
            };
            return;
        }

        if c == '"' && self.quote != Quote::Single {
            self.flush_lookahead();
            self.quote = match self.quote {
                Quote::Double => Quote::None,
                _ => Quote::Double,
            };
            return;
        }

        let unquoted = self.quote == Quote::None;

        if self.pending_append && unquoted {
            self.pending_append = false;
            if c == '>' {
                if let Some(Token::Redirect(op)) = self.tokens.last_mut() {
                    *op = op.appending();
                }
                return;
            }
        }

        if let Some(fd) = self.pending_digit.take() {
            if c == '>' && unquoted {
                self.push_operator(RedirectOp::for_fd(fd));
                return;
            }
            self.word.push(fd);
        }

        if !unquoted {
            self.word.push(c);
            return;
        }

        match c {
            '>' => self.push_operator(RedirectOp::Output),
            '1' | '2' => self.pending_digit = Some(c),
            c if c.is_whitespace() => self.flush_word(),
            c => self.word.push(c),
        }
    }

    fn push_operator(&mut self, op: RedirectOp) {
        self.flush_word();
        self.tokens.push(Token::Redirect(op));
        self.pending_append = true;
    }

    // 引号或转义之后不再是操作符的一部分
    fn flush_lookahead(&mut self) {
        self.pending_append = false;
        self.flush_digit();
    }

    fn flush_digit(&mut self) {
        if let Some(fd) = self.pending_digit.take() {
            self.word.push(fd);
        }
    }

    fn flush_word(&mut self) {
        if !self.word.is_empty() {
            self.tokens.push(Token::Word(std::mem::take(&mut self.word)));
        }
    }
}
