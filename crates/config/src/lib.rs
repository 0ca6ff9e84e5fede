//! Trigger types and persistence used by winwatch.
//!
//! A [`Trigger`] binds an entity name and an [`EventKind`] to a script to
//! launch. Triggers are persisted as RON; loading is lenient per entry so
//! one malformed trigger never takes down the rest of the file.

use std::{
    env,
    path::{Path, PathBuf},
};

use winwatch_protocol::EventKind;

mod error;
mod loader;

pub use error::Error;
pub use loader::{load_from_path, load_from_str, save_to_path, to_ron_string};

/// How a script file is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    /// Executed directly (binaries and anything the OS can launch itself).
    Native,
    /// Requires the AutoIt3 interpreter next to the winwatch executable.
    AutoIt3,
    /// Windows Script Host JavaScript.
    JavaScript,
    /// Windows Script Host VBScript.
    VbScript,
    /// Shell batch file.
    Batch,
    /// thinBasic script.
    Tbasic,
}

impl ScriptKind {
    /// Infer the kind from a script's file extension. Unknown extensions are
    /// treated as native.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_uppercase());
        match ext.as_deref() {
            Some("AU3") => Self::AutoIt3,
            Some("JS") => Self::JavaScript,
            Some("VBS") => Self::VbScript,
            Some("BAT" | "NT" | "CMD") => Self::Batch,
            Some("TBASIC" | "TBS") => Self::Tbasic,
            _ => Self::Native,
        }
    }

    /// Stable name used in persisted trigger data.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "Native",
            Self::AutoIt3 => "AutoIt3",
            Self::JavaScript => "JavaScript",
            Self::VbScript => "VbScript",
            Self::Batch => "Batch",
            Self::Tbasic => "Tbasic",
        }
    }

    /// Resolve a persisted name. Unknown names fall back to extension
    /// inference at the call site.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Native" => Some(Self::Native),
            "AutoIt3" => Some(Self::AutoIt3),
            "JavaScript" => Some(Self::JavaScript),
            "VbScript" => Some(Self::VbScript),
            "Batch" => Some(Self::Batch),
            "Tbasic" => Some(Self::Tbasic),
            _ => None,
        }
    }
}

/// A persisted rule: when `event` fires for an entity named `match_name`,
/// launch `script`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    /// Path of the script to launch.
    pub script: PathBuf,
    /// Execution kind of the script.
    pub kind: ScriptKind,
    /// Exact, case-sensitive name the firing entity must carry.
    pub match_name: String,
    /// The event this trigger subscribes to.
    pub event: EventKind,
}

impl Trigger {
    /// Build a trigger, inferring the script kind from the file extension.
    pub fn new(script: impl Into<PathBuf>, match_name: impl Into<String>, event: EventKind) -> Self {
        let script = script.into();
        let kind = ScriptKind::from_path(&script);
        Self {
            script,
            kind,
            match_name: match_name.into(),
            event,
        }
    }
}

/// The preferred trigger file location (`~/.winwatch/triggers.ron`).
pub fn default_config_path() -> PathBuf {
    let mut path = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    path.push(".winwatch");
    path.push("triggers.ron");
    path
}
