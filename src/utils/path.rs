use std::collections::BTreeSet;
use std::env;
use std::ffi::OsStr;
use std::fs::read_dir;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::error;

#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn from_env() -> Self {
        match env::var_os("PATH") {
            Some(path) => Self::parse(&path),
            None => {
                error!("lish: env PATH not set");
                Self::default()
            }
        }
    }

    pub fn parse(path: &OsStr) -> Self {
        Self::new(
            env::split_paths(path)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect(),
        )
    }

    // 带 `/` 的名字直接按路径检查，相对路径基于 cwd
    pub fn find_executable(&self, name: &str, cwd: &Path) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if name.contains('/') {
            let path = cwd.join(name);
            return is_executable(&path).then_some(path);
        }
        self.dirs
            .iter()
            .map(|dir| cwd.join(dir).join(name))
            .find(|candidate| is_executable(candidate))
    }

    pub fn executables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for dir in &self.dirs {
            let list = match read_dir(dir) {
                Ok(list) => list,
                Err(e) => {
                    if e.kind() != ErrorKind::NotFound {
                        error!("lish: fs read_dir error: {}: {}", dir.display(), e);
                    }
                    continue;
                }
            };
            for entry in list.flatten() {
                if !is_executable(&entry.path()) {
                    continue;
                }
                if let Ok(name) = entry.file_name().into_string() {
                    names.insert(name);
                }
            }
        }
        names
    }
}

fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// 通过 `~` 展开获取用户主目录
pub fn home_dir() -> Option<PathBuf> {
    let home = shellexpand::tilde("~");
    if home == "~" {
        None
    } else {
        Some(PathBuf::from(home.as_ref()))
    }
}
