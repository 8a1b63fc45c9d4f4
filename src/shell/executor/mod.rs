mod builtin;
#[allow(clippy::module_inception)]
mod executor;
mod workdir;

pub use builtin::Builtin;
pub use executor::{Executor, Flow};
pub use workdir::{ProcessWorkingDirectory, WorkingDirectory};
