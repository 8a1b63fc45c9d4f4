use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("missing redirection target")]
    MissingTarget,
    #[error("missing command")]
    MissingCommand,
}

/// 命令执行过程中的错误，`Display` 即为展示给用户的文本
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("error opening file {} for writing: {source}", .path.display())]
    RedirectOpen { path: PathBuf, source: io::Error },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("cd: {}: {target}", describe(.source))]
    DirectoryChange { target: String, source: io::Error },

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("{name}: {source}")]
    Spawn { name: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// 属于命令本身、应写入命令 stderr 的错误
    pub fn is_command_scoped(&self) -> bool {
        matches!(
            self,
            ShellError::CommandNotFound(_)
                | ShellError::DirectoryChange { .. }
                | ShellError::HomeNotSet
                | ShellError::Spawn { .. }
        )
    }
}

// io::Error 的 Display 带有 " (os error N)" 后缀，这里只保留小写的原因
fn describe(err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::NotFound {
        return "no such file or directory".to_string();
    }
    let text = err.to_string();
    let reason = match text.find(" (os error") {
        Some(end) => &text[..end],
        None => &text,
    };
    let mut chars = reason.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
