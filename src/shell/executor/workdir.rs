use std::io;
use std::path::{Path, PathBuf};

use nix::unistd;

/// 工作目录归进程所有，执行器只通过这个 trait 读写
pub trait WorkingDirectory {
    fn current(&self) -> io::Result<PathBuf>;
    fn change(&mut self, target: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessWorkingDirectory;

impl WorkingDirectory for ProcessWorkingDirectory {
    fn current(&self) -> io::Result<PathBuf> {
        Ok(unistd::getcwd()?)
    }

    fn change(&mut self, target: &Path) -> io::Result<()> {
        Ok(unistd::chdir(target)?)
    }
}
