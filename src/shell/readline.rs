use crate::shell::executor::Builtin;
use crate::utils::config::Config;
use crate::utils::path::SearchPath;
use log::{debug, error, warn};
use rustyline::completion::{Completer, Pair};
pub use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as RLConfig, Context, Editor, Helper};
use std::fs;

/// 用内建命令和 PATH 中的可执行文件补全光标前的单词
pub struct CommandCompleter {
    search: SearchPath,
}

impl CommandCompleter {
    pub fn new(search: SearchPath) -> Self {
        Self { search }
    }

    fn candidates(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = Builtin::ALL
            .iter()
            .map(|builtin| builtin.name().to_string())
            .chain(self.search.executables())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let mut candidates = self.candidates(&line[start..pos]);

        // 唯一匹配时补全后追加空格
        if let [only] = candidates.as_mut_slice() {
            only.push(' ');
        }

        let pairs = candidates
            .into_iter()
            .map(|name| Pair {
                display: name.trim_end().to_string(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

pub struct ReadlineManager<'a> {
    config: &'a Config,
    editor: Editor<CommandCompleter, FileHistory>,
}

impl<'a> ReadlineManager<'a> {
    pub fn new(config: &'a Config, search: SearchPath) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(CommandCompleter::new(search)));
        Ok(Self { config, editor })
    }

    pub fn load_history(&mut self) -> Result<(), ReadlineError> {
        if let Some(parent) = self.config.history_file.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("无法创建历史记录目录: {} {}", parent.display(), err);
            }
        }

        if let Err(err) = self.editor.load_history(&self.config.history_file) {
            warn!(
                "无法加载历史记录: {} {}",
                self.config.history_file.display(),
                err
            );
        } else {
            debug!("历史记录加载成功");
        }
        Ok(())
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: String) -> Result<bool, ReadlineError> {
        self.editor.add_history_entry(line)
    }

    pub fn save_history(&mut self) -> Result<(), ReadlineError> {
        if let Err(err) = self.editor.save_history(&self.config.history_file) {
            error!("保存历史记录失败: {}", err);
        } else {
            debug!("历史记录保存成功");
        }
        Ok(())
    }
}
