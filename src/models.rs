use serde::Serialize;
use std::fmt;

/// One request to post a message through the external tool.
///
/// `config` and `to` treat an empty string the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<String>,
    pub private: bool,
    pub public: bool,
    pub bot: bool,
    pub to: Option<String>,
    pub message: String,
}

impl Invocation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    #[must_use]
    pub fn bot(mut self) -> Self {
        self.bot = true;
        self
    }

    #[must_use]
    pub fn config(mut self, path: impl Into<String>) -> Self {
        self.config = Some(path.into());
        self
    }

    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to = Some(recipient.into());
        self
    }

    pub fn config_path(&self) -> Option<&str> {
        non_empty(self.config.as_deref())
    }

    pub fn recipient(&self) -> Option<&str> {
        non_empty(self.to.as_deref())
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Outcome of a dispatch. The integer values are stable and double as
/// the binary's exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Success,
    NoMessage,
    ChildExecFailed,
    ExecFailed,
    TimedOut,
}

impl ResultCode {
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NoMessage => 1,
            Self::ChildExecFailed => 2,
            Self::ExecFailed => 3,
            Self::TimedOut => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoMessage => "no_message",
            Self::ChildExecFailed => "child_exec_failed",
            Self::ExecFailed => "exec_failed",
            Self::TimedOut => "timed_out",
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<ResultCode> for i32 {
    fn from(result: ResultCode) -> Self {
        result.code()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON line the binary prints with `--json`.
#[derive(Debug, Serialize)]
pub struct DispatchReport {
    pub code: i32,
    pub result: ResultCode,
}

impl From<ResultCode> for DispatchReport {
    fn from(result: ResultCode) -> Self {
        Self {
            code: result.code(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes_match_fixed_table() {
        assert_eq!(ResultCode::Success.code(), 0);
        assert_eq!(ResultCode::NoMessage.code(), 1);
        assert_eq!(ResultCode::ChildExecFailed.code(), 2);
        assert_eq!(ResultCode::ExecFailed.code(), 3);
        assert_eq!(ResultCode::TimedOut.code(), 4);
    }

    #[test]
    fn only_success_is_success() {
        assert!(ResultCode::Success.is_success());
        for code in [
            ResultCode::NoMessage,
            ResultCode::ChildExecFailed,
            ResultCode::ExecFailed,
            ResultCode::TimedOut,
        ] {
            assert!(!code.is_success());
        }
    }

    #[test]
    fn result_code_serializes_snake_case() {
        let json = serde_json::to_string(&ResultCode::ChildExecFailed).unwrap();
        assert_eq!(json, r#""child_exec_failed""#);
        assert_eq!(ResultCode::TimedOut.to_string(), "timed_out");
    }

    #[test]
    fn report_produces_correct_json() {
        let report = DispatchReport::from(ResultCode::ExecFailed);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], 3);
        assert_eq!(json["result"], "exec_failed");
    }

    #[test]
    fn builder_sets_flags_and_options() {
        let inv = Invocation::new("hello")
            .public()
            .bot()
            .config("/etc/x.conf")
            .to("#room");
        assert!(!inv.private);
        assert!(inv.public);
        assert!(inv.bot);
        assert_eq!(inv.config_path(), Some("/etc/x.conf"));
        assert_eq!(inv.recipient(), Some("#room"));
        assert_eq!(inv.message, "hello");
    }

    #[test]
    fn empty_options_read_as_absent() {
        let inv = Invocation::new("hi").config("").to("");
        assert!(inv.config_path().is_none());
        assert!(inv.recipient().is_none());
    }

    #[test]
    fn empty_message_is_not_a_message() {
        assert!(!Invocation::new("").has_message());
        assert!(!Invocation::default().has_message());
        assert!(Invocation::new(" ").has_message());
    }
}
