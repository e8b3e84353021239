//! Row and detail text for context entries.
//!
//! GKE context names follow `gke_<project>_<location>_<cluster>`; for
//! those we can show where the cluster actually lives. Anything else
//! just gets its name.

use crossterm::style::Stylize;

use crate::kubectl::ContextEntry;
use crate::tui::Formatter;

const GKE_TAG: &str = "gke";
const SEGMENT_ERROR: &str = "ERROR";
const ACTIVE_MARKER: &str = " (Active)";

/// True iff `name` splits on `_` into exactly four non-empty segments
/// with the leading tag `gke`.
pub fn is_gke(name: &str) -> bool {
    gke_segments(name).is_some()
}

pub fn gke_project(name: &str) -> &str {
    gke_segments(name).map_or(SEGMENT_ERROR, |s| s[0])
}

pub fn gke_location(name: &str) -> &str {
    gke_segments(name).map_or(SEGMENT_ERROR, |s| s[1])
}

pub fn gke_cluster(name: &str) -> &str {
    gke_segments(name).map_or(SEGMENT_ERROR, |s| s[2])
}

fn gke_segments(name: &str) -> Option<[&str; 3]> {
    let parts: Vec<&str> = name.split('_').collect();
    match parts.as_slice() {
        &[GKE_TAG, project, location, cluster]
            if !project.is_empty() && !location.is_empty() && !cluster.is_empty() =>
        {
            Some([project, location, cluster])
        }
        _ => None,
    }
}

/// Renders context rows for the selector, marking whichever entry is
/// the active context.
pub struct ContextFormatter {
    current: String,
}

impl ContextFormatter {
    pub fn new(current: &str) -> Self {
        ContextFormatter {
            current: current.to_string(),
        }
    }

    fn is_current(&self, entry: &ContextEntry) -> bool {
        !self.current.is_empty() && entry.name == self.current
    }
}

impl Formatter<ContextEntry> for ContextFormatter {
    fn active(&self, entry: &ContextEntry) -> String {
        let mut row = entry.name.as_str().cyan().underlined().to_string();
        if self.is_current(entry) {
            row.push_str(&ACTIVE_MARKER.cyan().underlined().to_string());
        }
        row
    }

    fn inactive(&self, entry: &ContextEntry) -> String {
        let mut row = entry.name.clone();
        if self.is_current(entry) {
            row.push_str(ACTIVE_MARKER);
        }
        row
    }

    fn detail(&self, entry: &ContextEntry) -> String {
        if !is_gke(&entry.name) {
            return String::new();
        }
        format!(
            "Project: {}\tLocation: {}\tCluster: {}",
            gke_project(&entry.name),
            gke_location(&entry.name),
            gke_cluster(&entry.name)
        )
    }

    fn search_text(&self, entry: &ContextEntry) -> String {
        entry.name.clone()
    }
}
