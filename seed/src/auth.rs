//! Session authentication through the control tool's `auth` mode.

use tracing::{debug, error, info, warn};

use crate::core::invocation::Invocation;
use crate::core::types::{SessionToken, TargetAddress};
use crate::error::SeedError;
use crate::io::config::EmptyTokenPolicy;
use crate::io::control::ControlTool;

/// Run `auth` against `address` and return the session token from stdout.
///
/// Launch failures and timeouts are fatal. A non-zero exit status is only
/// logged: the tool's output is trusted, and an empty result is then handled
/// by `empty_token`.
pub fn authenticate<T: ControlTool + ?Sized>(
    tool: &T,
    address: &TargetAddress,
    empty_token: EmptyTokenPolicy,
) -> Result<SessionToken, SeedError> {
    info!(address = %address, "authenticating");

    let response = tool
        .invoke(&Invocation::auth(address))
        .map_err(|err| SeedError::AuthenticationFailed {
            reason: format!("{err:#}"),
        })?;

    if response.timed_out {
        return Err(SeedError::AuthenticationFailed {
            reason: response.failure_reason(),
        });
    }
    if !response.success {
        warn!(
            exit_code = ?response.exit_code,
            stderr = %response.stderr.trim(),
            "auth exited unsuccessfully, using its output anyway"
        );
    }

    let token = SessionToken::from_output(&response.stdout);
    if token.is_empty() {
        match empty_token {
            EmptyTokenPolicy::Reject => {
                error!("auth produced an empty session token");
                return Err(SeedError::EmptyToken);
            }
            EmptyTokenPolicy::Accept => {
                warn!("auth produced an empty session token, continuing as configured");
            }
        }
    }

    debug!(token_len = token.as_str().len(), "session token acquired");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ToolMode;
    use crate::test_support::{ScriptedControlTool, exit, launch_error, ok, timed_out};

    fn address() -> TargetAddress {
        TargetAddress::new("https://example.test")
    }

    #[test]
    fn strips_trailing_newline() {
        let tool = ScriptedControlTool::new(vec![ok("abc123\n")]);
        let token = authenticate(&tool, &address(), EmptyTokenPolicy::Reject).expect("auth");
        assert_eq!(token.as_str(), "abc123");
        assert_eq!(tool.modes(), vec![ToolMode::Auth]);
        assert_eq!(
            tool.calls()[0].args,
            vec!["-cmd", "auth", "-address", "https://example.test"]
        );
    }

    #[test]
    fn output_without_newline_is_kept_verbatim() {
        let tool = ScriptedControlTool::new(vec![ok("abc123")]);
        let token = authenticate(&tool, &address(), EmptyTokenPolicy::Reject).expect("auth");
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn launch_failure_is_authentication_failed() {
        let tool = ScriptedControlTool::new(vec![launch_error("permission denied")]);
        let err = authenticate(&tool, &address(), EmptyTokenPolicy::Reject).unwrap_err();
        assert!(
            matches!(err, SeedError::AuthenticationFailed { ref reason } if reason.contains("permission denied"))
        );
    }

    #[test]
    fn timeout_is_authentication_failed() {
        let tool = ScriptedControlTool::new(vec![timed_out()]);
        let err = authenticate(&tool, &address(), EmptyTokenPolicy::Accept).unwrap_err();
        assert!(matches!(err, SeedError::AuthenticationFailed { .. }));
    }

    #[test]
    fn empty_token_rejected_by_default_policy() {
        let tool = ScriptedControlTool::new(vec![exit(1, "Invalid credentials")]);
        let err = authenticate(&tool, &address(), EmptyTokenPolicy::Reject).unwrap_err();
        assert!(matches!(err, SeedError::EmptyToken));
    }

    #[test]
    fn empty_token_accepted_when_configured() {
        let tool = ScriptedControlTool::new(vec![ok("\n")]);
        let token = authenticate(&tool, &address(), EmptyTokenPolicy::Accept).expect("auth");
        assert!(token.is_empty());
    }

    #[test]
    fn non_zero_exit_with_output_still_yields_token() {
        let tool = ScriptedControlTool::new(vec![crate::test_support::Scripted::Respond(
            crate::io::control::ToolResponse {
                success: false,
                exit_code: Some(1),
                stdout: "tok\n".to_string(),
                stderr: String::new(),
                timed_out: false,
            },
        )]);
        let token = authenticate(&tool, &address(), EmptyTokenPolicy::Reject).expect("auth");
        assert_eq!(token.as_str(), "tok");
    }
}
