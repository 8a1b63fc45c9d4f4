use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/lish")
        } else {
            env::temp_dir().join("lish")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            theme: String::from("default"),
            history_file: config_dir.join(".lish_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
        }
    }

    pub fn new() -> Self {
        // 优先加载 .env 文件中的配置
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(theme) = var("LISH_THEME") {
            self.theme = theme;
        }

        if let Some(editor) = var("LISH_EDITOR") {
            self.editor_mode = editor;
        }

        if let Some(history) = var("LISH_HISTORY") {
            self.history_file = PathBuf::from(history);
        }

        if let Some(level) = var("LISH_LOG_LEVEL") {
            self.logger_level = level;
        }

        if let Some(dir) = var("LISH_LOG_DIR") {
            self.logger_dir = PathBuf::from(dir);
        }
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
