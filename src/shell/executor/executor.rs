use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{self, Stdio};

use super::builtin::Builtin;
use super::workdir::{ProcessWorkingDirectory, WorkingDirectory};
use crate::shell::error::ShellError;
use crate::shell::parser::{ParsedCommand, Redirection};
use crate::utils::path::SearchPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

// 有重定向时写文件，否则写调用方给的流
struct Sink<'a> {
    file: Option<File>,
    fallback: &'a mut dyn Write,
}

impl Sink<'_> {
    fn writer(&mut self) -> &mut dyn Write {
        match &mut self.file {
            Some(file) => file,
            None => &mut *self.fallback,
        }
    }

    // 子进程直接继承终端，先把已缓冲的内容刷出去
    fn stdio(&mut self) -> io::Result<Stdio> {
        self.writer().flush()?;
        match &self.file {
            Some(file) => Ok(Stdio::from(file.try_clone()?)),
            None => Ok(Stdio::inherit()),
        }
    }
}

pub struct Executor<W = ProcessWorkingDirectory> {
    workdir: W,
    search: SearchPath,
    home: Option<PathBuf>,
}

impl<W: WorkingDirectory> Executor<W> {
    pub fn new(workdir: W, search: SearchPath, home: Option<PathBuf>) -> Self {
        Self {
            workdir,
            search,
            home,
        }
    }

    /// 重定向文件打不开时命令不执行，直接返回错误；
    /// 命令自身的错误写入该命令的 stderr
    pub fn dispatch(
        &mut self,
        command: &ParsedCommand,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow, ShellError> {
        let mut out = Sink {
            file: self.open_redirect(command.redirect.stdout.as_ref())?,
            fallback: stdout,
        };
        let mut err = Sink {
            file: self.open_redirect(command.redirect.stderr.as_ref())?,
            fallback: stderr,
        };

        let flow = match self.execute_command(command, &mut out, &mut err) {
            Err(e) if e.is_command_scoped() => {
                warn!("命令执行失败: {}", e);
                writeln!(err.writer(), "{}", e)?;
                Flow::Continue
            }
            result => result?,
        };

        out.writer().flush()?;
        err.writer().flush()?;
        Ok(flow)
    }

    fn execute_command(
        &mut self,
        command: &ParsedCommand,
        out: &mut Sink,
        err: &mut Sink,
    ) -> Result<Flow, ShellError> {
        let builtin = match Builtin::from_name(&command.name) {
            Some(builtin) => builtin,
            None => {
                self.execute_external(command, out, err)?;
                return Ok(Flow::Continue);
            }
        };

        debug!("执行内建命令: {:?}", command);
        match builtin {
            Builtin::Exit => return Ok(Flow::Exit(0)),
            Builtin::Echo => writeln!(out.writer(), "{}", command.args.join(" "))?,
            Builtin::Type => self.builtin_type(command.args.first(), out.writer())?,
            Builtin::Pwd => writeln!(out.writer(), "{}", self.workdir.current()?.display())?,
            Builtin::Cd => self.builtin_cd(command.args.first())?,
        }
        Ok(Flow::Continue)
    }

    fn execute_external(
        &self,
        command: &ParsedCommand,
        out: &mut Sink,
        err: &mut Sink,
    ) -> Result<(), ShellError> {
        let cwd = self.workdir.current()?;
        let program = self
            .search
            .find_executable(&command.name, &cwd)
            .ok_or_else(|| ShellError::CommandNotFound(command.name.clone()))?;

        debug!("执行外部命令: {} {:?}", program.display(), command.args);
        let status = process::Command::new(&program)
            .arg0(&command.name)
            .args(&command.args)
            .current_dir(&cwd)
            .stdin(Stdio::inherit())
            .stdout(out.stdio()?)
            .stderr(err.stdio()?)
            .status()
            .map_err(|source| ShellError::Spawn {
                name: command.name.clone(),
                source,
            })?;

        if !status.success() {
            debug!("外部命令退出状态: {}", status);
        }
        Ok(())
    }

    fn builtin_type(&self, name: Option<&String>, out: &mut dyn Write) -> Result<(), ShellError> {
        let Some(name) = name else {
            return Ok(());
        };

        if Builtin::from_name(name).is_some() {
            writeln!(out, "{} is a shell builtin", name)?;
            return Ok(());
        }
        match self.search.find_executable(name, &self.workdir.current()?) {
            Some(path) => writeln!(out, "{} is {}", name, path.display())?,
            None => writeln!(out, "{}: not found", name)?,
        }
        Ok(())
    }

    fn builtin_cd(&mut self, target: Option<&String>) -> Result<(), ShellError> {
        let target = match target.map(String::as_str) {
            None | Some("~") => self.home.clone().ok_or(ShellError::HomeNotSet)?,
            Some(path) => PathBuf::from(path),
        };

        debug!("切换工作目录: {}", target.display());
        self.workdir
            .change(&target)
            .map_err(|source| ShellError::DirectoryChange {
                target: target.display().to_string(),
                source,
            })
    }

    fn open_redirect(&self, redirection: Option<&Redirection>) -> Result<Option<File>, ShellError> {
        let Some(redirection) = redirection else {
            return Ok(None);
        };

        let path = Path::new(&redirection.path);
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.current()?.join(path)
        };

        let mut options = OpenOptions::new();
        options.create(true);
        if redirection.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        debug!("打开重定向文件: {} (append: {})", resolved.display(), redirection.append);
        options
            .open(&resolved)
            .map(Some)
            .map_err(|source| ShellError::RedirectOpen {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shell::parser::Parser;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct FakeWorkingDirectory {
        cwd: PathBuf,
    }

    impl WorkingDirectory for FakeWorkingDirectory {
        fn current(&self) -> io::Result<PathBuf> {
            Ok(self.cwd.clone())
        }

        fn change(&mut self, target: &Path) -> io::Result<()> {
            let next = self.cwd.join(target);
            if !next.exists() {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            if !next.is_dir() {
                return Err(io::Error::from_raw_os_error(20));
            }
            self.cwd = next;
            Ok(())
        }
    }

    struct Fixture {
        root: TempDir,
        bin: TempDir,
        executor: Executor<FakeWorkingDirectory>,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            fs::create_dir(root.path().join("home")).unwrap();
            let executor = Executor::new(
                FakeWorkingDirectory {
                    cwd: root.path().to_path_buf(),
                },
                SearchPath::new(vec![bin.path().to_path_buf()]),
                Some(root.path().join("home")),
            );
            Self {
                root,
                bin,
                executor,
            }
        }

        fn script(&self, name: &str, body: &str) -> PathBuf {
            let path = self.bin.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn run(&mut self, line: &str) -> (Result<Flow, ShellError>, String, String) {
            let command = Parser::new(line).parse_command().unwrap().unwrap();
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let flow = self.executor.dispatch(&command, &mut stdout, &mut stderr);
            (
                flow,
                String::from_utf8(stdout).unwrap(),
                String::from_utf8(stderr).unwrap(),
            )
        }

        fn read(&self, name: &str) -> String {
            fs::read_to_string(self.root.path().join(name)).unwrap()
        }

        fn cwd(&self) -> PathBuf {
            self.executor.workdir.cwd.clone()
        }
    }

    #[test]
    fn test_echo() {
        let mut fx = Fixture::new();
        let (flow, out, err) = fx.run("echo hello   'big  world'");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "hello big  world\n");
        assert_eq!(err, "");

        let (_, out, _) = fx.run("echo");
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_exit() {
        let mut fx = Fixture::new();
        let (flow, out, _) = fx.run("exit");
        assert_eq!(flow.unwrap(), Flow::Exit(0));
        assert_eq!(out, "");
    }

    #[test]
    fn test_echo_redirect_truncates_then_appends() {
        let mut fx = Fixture::new();
        let (_, out, _) = fx.run("echo hello > out.txt");
        assert_eq!(out, "");
        assert_eq!(fx.read("out.txt"), "hello\n");

        fx.run("echo again > out.txt");
        assert_eq!(fx.read("out.txt"), "again\n");

        fs::remove_file(fx.root.path().join("out.txt")).unwrap();
        fx.run("echo hello >> out.txt");
        fx.run("echo hello 1>> out.txt");
        assert_eq!(fx.read("out.txt"), "hello\nhello\n");
    }

    #[test]
    fn test_stderr_redirect_leaves_stdout_alone() {
        let mut fx = Fixture::new();
        let (_, out, err) = fx.run("echo visible 2> err.txt");
        assert_eq!(out, "visible\n");
        assert_eq!(err, "");
        assert_eq!(fx.read("err.txt"), "");
    }

    #[test]
    fn test_type() {
        let mut fx = Fixture::new();
        let tool = fx.script("tool", "exit 0");

        let (_, out, _) = fx.run("type echo");
        assert_eq!(out, "echo is a shell builtin\n");

        let (_, out, _) = fx.run("type type");
        assert_eq!(out, "type is a shell builtin\n");

        let (_, out, _) = fx.run("type tool");
        assert_eq!(out, format!("tool is {}\n", tool.display()));

        let (_, out, err) = fx.run("type nonexistent_cmd");
        assert_eq!(out, "nonexistent_cmd: not found\n");
        assert_eq!(err, "");

        let (flow, out, _) = fx.run("type");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "");
    }

    #[test]
    fn test_pwd() {
        let mut fx = Fixture::new();
        let (_, out, _) = fx.run("pwd");
        assert_eq!(out, format!("{}\n", fx.root.path().display()));
    }

    #[test]
    fn test_cd() {
        let mut fx = Fixture::new();
        fs::create_dir(fx.root.path().join("sub")).unwrap();

        let (_, _, err) = fx.run("cd sub");
        assert_eq!(err, "");
        assert_eq!(fx.cwd(), fx.root.path().join("sub"));

        let (_, _, err) = fx.run("cd");
        assert_eq!(err, "");
        assert_eq!(fx.cwd(), fx.root.path().join("home"));

        fx.run(&format!("cd {}", fx.root.path().display()));
        assert_eq!(fx.cwd(), fx.root.path());

        fx.run("cd ~");
        assert_eq!(fx.cwd(), fx.root.path().join("home"));
    }

    #[test]
    fn test_cd_missing_directory() {
        let mut fx = Fixture::new();
        let before = fx.cwd();
        let (flow, out, err) = fx.run("cd /does_not_exist");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "");
        assert_eq!(err, "cd: no such file or directory: /does_not_exist\n");
        assert_eq!(fx.cwd(), before);
    }

    #[test]
    fn test_cd_error_follows_stderr_redirect() {
        let mut fx = Fixture::new();
        let (_, _, err) = fx.run("cd nowhere 2> err.txt");
        assert_eq!(err, "");
        assert_eq!(fx.read("err.txt"), "cd: no such file or directory: nowhere\n");
    }

    #[test]
    fn test_cd_into_file() {
        let mut fx = Fixture::new();
        fs::write(fx.root.path().join("plain.txt"), "").unwrap();
        let before = fx.cwd();
        let (flow, _, err) = fx.run("cd plain.txt");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(err, "cd: not a directory: plain.txt\n");
        assert_eq!(fx.cwd(), before);
    }

    #[test]
    fn test_cd_without_home() {
        let mut fx = Fixture::new();
        fx.executor.home = None;
        let before = fx.cwd();
        let (_, _, err) = fx.run("cd");
        assert_eq!(err, "cd: HOME not set\n");
        assert_eq!(fx.cwd(), before);
    }

    #[test]
    fn test_command_not_found() {
        let mut fx = Fixture::new();
        let (flow, out, err) = fx.run("nonexistent_cmd --flag");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "");
        assert_eq!(err, "nonexistent_cmd: command not found\n");

        let (_, _, err) = fx.run("nonexistent_cmd 2>> err.txt");
        assert_eq!(err, "");
        assert_eq!(fx.read("err.txt"), "nonexistent_cmd: command not found\n");
    }

    #[test]
    fn test_redirect_open_failure_skips_command() {
        let mut fx = Fixture::new();
        fs::create_dir(fx.root.path().join("sub")).unwrap();
        let before = fx.cwd();

        let (flow, out, err) = fx.run("cd sub > missing/dir/out.txt");
        assert!(matches!(flow, Err(ShellError::RedirectOpen { .. })));
        assert_eq!(out, "");
        assert_eq!(err, "");
        assert_eq!(fx.cwd(), before);
    }

    #[test]
    fn test_external_command_with_redirects() {
        let mut fx = Fixture::new();
        fx.script("tool", "printf '%s|' \"$@\"\necho\necho oops >&2");

        let (flow, out, err) = fx.run("tool a 'b c' > out.txt 2> err.txt");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "");
        assert_eq!(err, "");
        assert_eq!(fx.read("out.txt"), "a|b c|\n");
        assert_eq!(fx.read("err.txt"), "oops\n");

        fx.run("tool again >> out.txt 2>> err.txt");
        assert_eq!(fx.read("out.txt"), "a|b c|\nagain|\n");
        assert_eq!(fx.read("err.txt"), "oops\noops\n");
    }

    #[test]
    fn test_external_command_runs_in_working_directory() {
        let mut fx = Fixture::new();
        fx.script("where", "pwd");
        fs::create_dir(fx.root.path().join("sub")).unwrap();

        fx.run("cd sub");
        fx.run("where > ../where.txt");
        let expected = fs::canonicalize(fx.root.path().join("sub")).unwrap();
        assert_eq!(fx.read("where.txt").trim_end(), expected.to_str().unwrap());
    }

    #[test]
    fn test_external_failure_is_not_an_error() {
        let mut fx = Fixture::new();
        fx.script("fail", "exit 3");
        let (flow, out, err) = fx.run("fail");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "");
        assert_eq!(err, "");
    }
}
