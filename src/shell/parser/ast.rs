#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub path: String,
    pub append: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectSpec {
    pub stdout: Option<Redirection>,
    pub stderr: Option<Redirection>,
}

/// 去掉重定向之后的一条命令，空行不会走到这里，`name` 不为空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: RedirectSpec,
}
