use log::debug;
use shell::Shell;

use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        eprintln!("lish: 日志初始化失败: {}", e);
    }
    debug!("配置加载成功, 历史记录 {}", config.history_file.display());

    let mut shell = Shell::new(&config)?;
    let code = shell.run()?;
    std::process::exit(code)
}
