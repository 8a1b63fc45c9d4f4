use log::{debug, error, warn};
use std::error::Error;
use std::io::{self, Write};

use crate::shell::error::ShellError;
use crate::shell::executor::{Executor, Flow, ProcessWorkingDirectory, WorkingDirectory};
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::path::{home_dir, SearchPath};
use crate::utils::theme::Theme;

pub fn run_line<W: WorkingDirectory>(
    executor: &mut Executor<W>,
    line: &str,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<Flow, ShellError> {
    match Parser::new(line).parse_command()? {
        Some(command) => executor.dispatch(&command, stdout, stderr),
        None => Ok(Flow::Continue),
    }
}

pub struct Shell<'a> {
    theme: Theme,
    readline: ReadlineManager<'a>,
    executor: Executor,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        let search = SearchPath::from_env();
        Ok(Self {
            theme: Theme::load_theme(&config.theme),
            readline: ReadlineManager::new(config, search.clone())?,
            executor: Executor::new(ProcessWorkingDirectory, search, home_dir()),
        })
    }

    /// 返回进程退出码
    pub fn run(&mut self) -> Result<i32, Box<dyn Error>> {
        debug!("初始化 lish...");
        self.readline.load_history()?;

        let code = self.run_loop()?;
        self.readline.save_history()?;

        debug!("退出 lish, 退出码 {}", code);
        Ok(code)
    }

    fn run_loop(&mut self) -> Result<i32, Box<dyn Error>> {
        loop {
            io::stdout().flush()?;

            match self.readline.readline(&self.theme.prompt) {
                Ok(line) => {
                    if let Flow::Exit(code) = self.handle_input(&line)? {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Eof) => {
                    debug!("接收到 EOF，退出 lish...");
                    return Ok(0);
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断信号...");
                }
                Err(err) => {
                    error!("读取输入失败: {}", err);
                    eprintln!("{}", (self.theme.error_style)(format!("lish: {}", err)));
                    return Ok(1);
                }
            }
        }
    }

    fn handle_input(&mut self, line: &str) -> Result<Flow, Box<dyn Error>> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        self.readline.add_history(line.to_string())?;

        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        match run_line(&mut self.executor, line, &mut stdout, &mut stderr) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                warn!("命令未执行: {}", e);
                eprintln!("{}", (self.theme.error_style)(e.to_string()));
                Ok(Flow::Continue)
            }
        }
    }
}
