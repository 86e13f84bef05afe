//! Helper-script generation for the handoff.
//!
//! Rendering is a pure function from a [`RetryPolicy`] and the extra
//! relaunch arguments to script text, so the emitted protocol can be
//! asserted on without touching a filesystem or spawning anything. The
//! script takes three positional arguments (staged path, destination
//! path, executable to launch), which keeps the text itself free of
//! absolute paths.

use super::protocol::RetryPolicy;
use super::ReplaceRequest;
use crate::core::LauncherError;
use crate::utils::platform;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Platform flavor of the generated helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffScript {
    /// POSIX `sh` script.
    Posix,
    /// Windows batch file.
    Windows,
}

impl HandoffScript {
    /// The variant for the platform this binary runs on.
    #[must_use]
    pub fn for_current_platform() -> Self {
        if platform::is_windows() {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Filename extension for the script file, without the dot.
    #[must_use]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Posix => "sh",
            Self::Windows => "bat",
        }
    }

    /// Render the helper-script text.
    ///
    /// The script mirrors [`super::protocol::run`] step for step: bounded
    /// fixed-delay delete loop, move into place, detached relaunch,
    /// self-delete. `extra_args` (everything in the relaunch command
    /// after the executable) are baked into the text, quoted.
    #[must_use]
    pub fn render(self, policy: &RetryPolicy, extra_args: &[String]) -> String {
        let secs = policy.interval.as_secs().max(1);
        match self {
            Self::Posix => {
                let extra = extra_args
                    .iter()
                    .map(|a| format!(" '{}'", a.replace('\'', r"'\''")))
                    .collect::<String>();
                format!(
                    r#"#!/bin/sh
# Finishes a launcher update once the old process has exited.
SRC="$1"
DEST="$2"
EXE="$3"
i=0
ok=0
while [ $i -lt {max} ]; do
  if rm -f "$DEST" 2>/dev/null && [ ! -e "$DEST" ]; then ok=1; break; fi
  i=$((i+1))
  sleep {secs}
done
if [ $ok -eq 0 ]; then
  rm -- "$0"
  exit 1
fi
mv -f "$SRC" "$DEST"
chmod +x "$DEST"
nohup "$EXE"{extra} >/dev/null 2>&1 &
rm -- "$0"
"#,
                    max = policy.max_attempts,
                )
            }
            Self::Windows => {
                let extra = extra_args
                    .iter()
                    .map(|a| format!(" \"{a}\""))
                    .collect::<String>();
                format!(
                    "@echo off\r\n\
                     rem Finishes a launcher update once the old process has exited.\r\n\
                     set \"SRC=%~1\"\r\n\
                     set \"DEST=%~2\"\r\n\
                     set \"EXE=%~3\"\r\n\
                     set /a tries=0\r\n\
                     :loop\r\n\
                     del /f /q \"%DEST%\" >nul 2>&1\r\n\
                     if not exist \"%DEST%\" goto moved\r\n\
                     set /a tries+=1\r\n\
                     if %tries% geq {max} goto giveup\r\n\
                     timeout /t {secs} /nobreak >nul\r\n\
                     goto loop\r\n\
                     :moved\r\n\
                     move /y \"%SRC%\" \"%DEST%\" >nul\r\n\
                     start \"\" \"%EXE%\"{extra}\r\n\
                     del \"%~f0\"\r\n\
                     exit /b 0\r\n\
                     :giveup\r\n\
                     del \"%~f0\"\r\n\
                     exit /b 1\r\n",
                    max = policy.max_attempts,
                )
            }
        }
    }
}

/// Write the helper script to a temp file and start it detached.
///
/// Returns the script path. The helper receives the staged path, the
/// destination, and the relaunch executable as positional arguments and
/// keeps running after this process exits; it deletes itself when done.
///
/// # Errors
///
/// Fails with [`LauncherError::FileSystem`] when the script cannot be
/// written or [`LauncherError::LaunchFailed`] when it cannot be started.
pub fn write_and_spawn(
    request: &ReplaceRequest,
    policy: &RetryPolicy,
) -> Result<PathBuf, LauncherError> {
    let flavor = HandoffScript::for_current_platform();
    let (exe, extra_args) = request
        .relaunch_command
        .split_first()
        .map_or((String::new(), &[] as &[String]), |(first, rest)| {
            (first.clone(), rest)
        });

    let text = flavor.render(policy, extra_args);

    let mut file = tempfile::Builder::new()
        .prefix("updraft-replace-")
        .suffix(&format!(".{}", flavor.file_extension()))
        .tempfile()
        .map_err(|e| LauncherError::file_system("creating helper script", std::env::temp_dir(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| LauncherError::file_system("writing helper script", file.path(), e))?;

    // The helper deletes itself; it must survive this handle going away.
    let script_path = file
        .into_temp_path()
        .keep()
        .map_err(|e| LauncherError::file_system("persisting helper script", std::env::temp_dir(), e.error))?;
    platform::set_executable(&script_path)
        .map_err(|e| LauncherError::file_system("marking helper script executable", &script_path, e))?;

    debug!("helper script written to {}", script_path.display());

    let mut command = if platform::is_windows() {
        let mut c = Command::new("cmd");
        c.arg("/c").arg("start").arg("").arg(&script_path);
        c
    } else {
        let mut c = Command::new("/bin/sh");
        c.arg(&script_path);
        c
    };

    command
        .arg(&request.staged_path)
        .arg(&request.destination_path)
        .arg(&exe)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| LauncherError::LaunchFailed {
            program: script_path.display().to_string(),
            source: e,
        })?;

    info!("handoff helper started: {}", script_path.display());
    Ok(script_path)
}
