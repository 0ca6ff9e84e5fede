//! Load and save trigger lists as RON.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;
use winwatch_protocol::EventKind;

use crate::{Error, ScriptKind, Trigger};

/// On-disk shape of one trigger. The event and script kind are stored by
/// symbolic name so the file stays hand-editable.
#[derive(Debug, Serialize, Deserialize)]
struct RawTrigger {
    path: String,
    #[serde(default)]
    lang: Option<String>,
    name: String,
    event: String,
}

/// On-disk shape of the trigger file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawTriggers {
    triggers: Vec<RawTrigger>,
}

/// Load triggers from a RON file.
///
/// A file that fails to read or parse is an error; a malformed entry inside
/// a well-formed file (unknown event name, empty path) is skipped with a
/// warning so the remaining triggers still load.
pub fn load_from_path(path: &Path) -> Result<Vec<Trigger>, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&text, Some(path))
}

/// Load triggers from RON text. `path` is used only for error context.
pub fn load_from_str(text: &str, path: Option<&Path>) -> Result<Vec<Trigger>, Error> {
    let raw: RawTriggers = ron::from_str(text).map_err(|e| Error::Parse {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })?;

    let mut triggers = Vec::with_capacity(raw.triggers.len());
    for entry in raw.triggers {
        if entry.path.is_empty() {
            warn!(name = %entry.name, "skipping trigger with empty script path");
            continue;
        }
        let Some(event) = EventKind::from_short_name(&entry.event) else {
            warn!(event = %entry.event, path = %entry.path, "skipping trigger with unknown event");
            continue;
        };
        let script = std::path::PathBuf::from(entry.path);
        let kind = entry
            .lang
            .as_deref()
            .and_then(ScriptKind::from_name)
            .unwrap_or_else(|| ScriptKind::from_path(&script));
        triggers.push(Trigger {
            script,
            kind,
            match_name: entry.name,
            event,
        });
    }
    Ok(triggers)
}

/// Serialize triggers to pretty RON.
pub fn to_ron_string(triggers: &[Trigger]) -> Result<String, Error> {
    let raw = RawTriggers {
        triggers: triggers
            .iter()
            .map(|t| RawTrigger {
                path: t.script.to_string_lossy().into_owned(),
                lang: Some(t.kind.as_str().to_string()),
                name: t.match_name.clone(),
                event: t.event.short_name().to_string(),
            })
            .collect(),
    };
    ron::ser::to_string_pretty(&raw, ron::ser::PrettyConfig::default()).map_err(|e| Error::Parse {
        path: None,
        message: e.to_string(),
    })
}

/// Write triggers to a RON file, creating parent directories as needed.
pub fn save_to_path(path: &Path, triggers: &[Trigger]) -> Result<(), Error> {
    let text = to_ron_string(triggers)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Read {
            path: Some(parent.to_path_buf()),
            message: e.to_string(),
        })?;
    }
    fs::write(path, text).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })
}
