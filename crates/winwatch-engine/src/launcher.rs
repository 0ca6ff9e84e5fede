//! Script execution: guard check, user notification, detached spawn.

use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

use config::{ScriptKind, Trigger};
use tracing::{debug, warn};
use winwatch_world::EntityRef;

use crate::{
    Error, Result,
    bus::TriggerHandler,
    guard::{LaunchGuard, Verdict},
    notification::NotificationDispatcher,
};

/// Title used for all launcher notifications.
const NOTICE_TITLE: &str = "winwatch";

/// The AutoIt3 interpreter, resolved next to the winwatch executable.
const AUTOIT_EXE: &str = "AutoIt3.exe";

/// Runs scripts for matched triggers, refusing launches the guard flags.
pub struct ScriptLauncher {
    guard: LaunchGuard,
    notifier: NotificationDispatcher,
}

impl ScriptLauncher {
    /// Create a launcher with the reference guard limits.
    pub fn new(notifier: NotificationDispatcher) -> Self {
        Self {
            guard: LaunchGuard::new(),
            notifier,
        }
    }

    /// Create a launcher with a custom guard (used by tests).
    pub fn with_guard(notifier: NotificationDispatcher, guard: LaunchGuard) -> Self {
        Self { guard, notifier }
    }

    /// Handle one matched trigger: guard, notify, spawn.
    pub fn run(&self, trigger: &Trigger, entity: &EntityRef) {
        let file_name = display_file_name(&trigger.script);
        match self.guard.check(trigger) {
            Verdict::Pass => {
                debug!(script = %trigger.script.display(), name = %entity.name(), "launching script");
                if let Err(e) = self.spawn(trigger) {
                    warn!(script = %trigger.script.display(), error = %e, "script launch failed");
                    let _ = self.notifier.send_error(
                        NOTICE_TITLE,
                        format!("There was a problem starting '{}': {}", file_name, e),
                    );
                    return;
                }
                let _ = self.notifier.send_info(
                    NOTICE_TITLE,
                    format!(
                        "Started '{}' because a {} with the name '{}' {}",
                        file_name,
                        trigger.event.entity_noun(),
                        trigger.match_name,
                        trigger.event.past_phrase()
                    ),
                );
            }
            verdict => {
                warn!(script = %trigger.script.display(), ?verdict, "launch suppressed");
                let _ = self.notifier.send_warning(
                    NOTICE_TITLE,
                    format!(
                        "'{}' was not started because it looks like processes would be \
                         created forever.",
                        file_name
                    ),
                );
            }
        }
    }

    /// Spawn the script detached; the child handle is dropped immediately
    /// and never waited on.
    fn spawn(&self, trigger: &Trigger) -> Result<()> {
        match trigger.kind {
            ScriptKind::AutoIt3 => {
                let interpreter = interpreter_path()?;
                if !interpreter.exists() {
                    return Err(Error::MissingInterpreter(interpreter));
                }
                Command::new(interpreter).arg(&trigger.script).spawn()?;
            }
            _ => {
                Command::new(&trigger.script).spawn()?;
            }
        }
        Ok(())
    }
}

impl TriggerHandler for ScriptLauncher {
    fn on_match(&self, trigger: &Trigger, entity: &EntityRef) {
        self.run(trigger, entity);
    }
}

/// The interpreter lives in the same directory as the winwatch executable.
fn interpreter_path() -> Result<PathBuf> {
    let exe = env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::Msg("executable has no parent directory".to_string()))?;
    Ok(dir.join(AUTOIT_EXE))
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
