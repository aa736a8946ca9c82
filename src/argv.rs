use crate::models::Invocation;
use std::ffi::OsString;
use std::path::Path;

/// Builds the full argument vector, program first and message last.
///
/// Order is fixed: `--private`, `--public`, `--bot`, `--config <path>`,
/// `--to <recipient>`, message. Each token appears at most once.
pub fn build_argv(program: &Path, invocation: &Invocation) -> Vec<OsString> {
    let mut args = Vec::with_capacity(9);
    args.push(program.as_os_str().to_os_string());

    if invocation.private {
        args.push("--private".into());
    }
    if invocation.public {
        args.push("--public".into());
    }
    if invocation.bot {
        args.push("--bot".into());
    }
    if let Some(config) = invocation.config_path() {
        args.push("--config".into());
        args.push(config.into());
    }
    if let Some(to) = invocation.recipient() {
        args.push("--to".into());
        args.push(to.into());
    }

    args.push(invocation.message.as_str().into());
    args
}
