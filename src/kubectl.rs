//! Talks to the external `kubectl` binary.
//!
//! Two invocations, both synchronous: `config view -ojson` to read the
//! context inventory and `config use-context <name>` to switch. Output
//! of both streams is captured so failures can show exactly what the
//! tool said.

use std::io;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KubectlError {
    #[error("failed to run {tool}: {source}")]
    Spawn { tool: String, source: io::Error },

    #[error("listing contexts failed:\n{output}")]
    List { output: String },

    #[error("decoding `config view` output: {source}\nraw output: {raw:?}")]
    Decode {
        raw: String,
        source: serde_json::Error,
    },

    #[error("activating context {name:?} failed:\n{output}")]
    Activate { name: String, output: String },
}

/// The parts of a kubeconfig we care about, as emitted by
/// `kubectl config view -ojson`.
#[derive(Debug, Default, Deserialize)]
pub struct KubeConfig {
    #[serde(default)]
    pub contexts: Vec<ContextEntry>,
    #[serde(rename = "current-context", default)]
    pub current_context: String,
}

#[derive(Debug, Deserialize)]
pub struct ContextEntry {
    pub name: String,
    #[serde(default)]
    pub context: ContextDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextDetails {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

impl KubeConfig {
    /// Index of the current context in `contexts`, or 0 when the
    /// current name matches nothing. First match wins if a name ever
    /// appears twice.
    pub fn current_index(&self) -> usize {
        self.contexts
            .iter()
            .position(|c| c.name == self.current_context)
            .unwrap_or(0)
    }
}

/// Run `<tool> config view -ojson` and decode the context inventory.
pub fn view(tool: &str) -> Result<KubeConfig, KubectlError> {
    let output = Command::new(tool)
        .args(["config", "view", "-ojson"])
        .output()
        .map_err(|source| KubectlError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(KubectlError::List {
            output: combined(&output.stdout, &output.stderr),
        });
    }

    serde_json::from_slice(&output.stdout).map_err(|source| KubectlError::Decode {
        raw: String::from_utf8_lossy(&output.stdout).into_owned(),
        source,
    })
}

/// Run `<tool> config use-context <name>`. Returns the combined
/// stdout/stderr so the caller can print it verbatim.
pub fn use_context(tool: &str, name: &str) -> Result<String, KubectlError> {
    let output = Command::new(tool)
        .args(["config", "use-context", name])
        .output()
        .map_err(|source| KubectlError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    let combined = combined(&output.stdout, &output.stderr);
    if !output.status.success() {
        return Err(KubectlError::Activate {
            name: name.to_string(),
            output: combined,
        });
    }
    Ok(combined)
}

fn combined(stdout: &[u8], stderr: &[u8]) -> String {
    let mut s = String::from_utf8_lossy(stdout).into_owned();
    s.push_str(&String::from_utf8_lossy(stderr));
    s
}
