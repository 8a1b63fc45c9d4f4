use colored::Colorize;

pub struct Theme {
    pub prompt: String,
    pub error_style: Box<dyn Fn(String) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt: String::from("$ "),
            error_style: Box::new(|s| s),
        }
    }
}

impl Theme {
    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "dark" => Theme {
                prompt: format!("{} ", "lish➤".bright_purple()),
                error_style: Box::new(|s| s.bright_red().to_string()),
            },
            _ => Theme::default(),
        }
    }
}
