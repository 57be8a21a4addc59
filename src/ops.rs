//! Privileged install/remove/update operations.
//!
//! The engine only builds the command and captures its exit status; the
//! interactive console streaming the output is a collaborator concern. Every
//! completed operation — successful or not — is followed by reconciliation,
//! because a failed transaction may still have changed state.

use crate::state::{PackageRecord, SourceKind};

/// The operation kinds a front-end can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    /// Install one package.
    Install,
    /// Remove one package.
    Remove,
    /// Full system update (`pacman -Syu`).
    Update,
}

impl OperationKind {
    /// Lowercase label for logs and summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationKind::Install => "install",
            OperationKind::Remove => "remove",
            OperationKind::Update => "update",
        }
    }
}

/// Why an operation could not be started.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// AUR operations need a helper on PATH.
    #[error("no AUR helper (paru or yay) found on PATH")]
    NoHelper,
    /// The requested package is not in the catalog.
    #[error("package '{0}' is not in the catalog")]
    UnknownPackage(String),
    /// Another privileged operation is still running.
    #[error("another operation is already in progress")]
    Busy,
}

/// Result of a finished operation, handed back to the control task.
#[derive(Clone, Debug)]
pub struct OperationOutcome {
    /// What ran.
    pub kind: OperationKind,
    /// Target name, absent for system updates.
    pub target: Option<String>,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Raw exit code when the process ran to completion.
    pub exit_code: Option<i32>,
}

/// What: Build the argv for an operation on `record`.
///
/// Inputs:
/// - `kind`: Install or Remove (`Update` uses [`update_argv`])
/// - `record`: Target record; its source kind picks the tool
/// - `aur_helper`: Helper binary name, required for AUR targets
///
/// Output:
/// - Full argv including the sudo prefix where the tool needs it
///
/// # Errors
/// - [`OperationError::NoHelper`] for AUR targets without a helper
///
/// Details:
/// - pacman runs under sudo; flatpak manages privileges itself; AUR helpers
///   must not run as root and escalate on their own.
pub fn build_argv(
    kind: OperationKind,
    record: &PackageRecord,
    aur_helper: Option<&str>,
) -> Result<Vec<String>, OperationError> {
    let target = record.install_target().to_string();
    let argv: Vec<&str> = match (record.source_kind, kind) {
        (SourceKind::Pacman, OperationKind::Install) => {
            vec!["sudo", "pacman", "-S", "--needed", "--noconfirm", &target]
        }
        (SourceKind::Pacman, _) => vec!["sudo", "pacman", "-R", "--noconfirm", &target],
        (SourceKind::Flatpak, OperationKind::Install) => {
            vec!["flatpak", "install", "-y", "flathub", &target]
        }
        (SourceKind::Flatpak, _) => vec!["flatpak", "uninstall", "-y", &target],
        (SourceKind::Aur, _) => {
            let helper = aur_helper.ok_or(OperationError::NoHelper)?;
            let flag = if kind == OperationKind::Install {
                "-S"
            } else {
                "-R"
            };
            vec![helper, flag, "--noconfirm", &target]
        }
    };
    Ok(argv.into_iter().map(ToString::to_string).collect())
}

/// Argv for a full system update.
#[must_use]
pub fn update_argv() -> Vec<String> {
    ["sudo", "pacman", "-Syu", "--noconfirm"]
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// What: Run an operation to completion, inheriting stdio.
///
/// Inputs:
/// - `argv`: Non-empty argv from [`build_argv`] or [`update_argv`]
/// - `kind`, `target`: Echoed into the outcome
/// - `dry_run`: Print the command instead of running it
///
/// Output:
/// - Outcome with success flag and exit code; spawn failures count as
///   unsuccessful with no exit code
///
/// Details:
/// - Blocking; the runtime wraps this in `tokio::task::spawn_blocking`.
#[must_use]
pub fn run_operation(
    argv: &[String],
    kind: OperationKind,
    target: Option<String>,
    dry_run: bool,
) -> OperationOutcome {
    if dry_run {
        println!("DRY RUN: {}", argv.join(" "));
        return OperationOutcome {
            kind,
            target,
            success: true,
            exit_code: Some(0),
        };
    }
    let Some((program, args)) = argv.split_first() else {
        return OperationOutcome {
            kind,
            target,
            success: false,
            exit_code: None,
        };
    };
    match std::process::Command::new(program).args(args).status() {
        Ok(status) => {
            let outcome = OperationOutcome {
                kind,
                target,
                success: status.success(),
                exit_code: status.code(),
            };
            tracing::info!(
                kind = kind.as_str(),
                success = outcome.success,
                code = ?outcome.exit_code,
                "operation finished"
            );
            outcome
        }
        Err(e) => {
            tracing::error!(kind = kind.as_str(), error = %e, "operation failed to spawn");
            OperationOutcome {
                kind,
                target,
                success: false,
                exit_code: None,
            }
        }
    }
}
