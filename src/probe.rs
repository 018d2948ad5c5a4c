//! Environment probe
//!
//! Detects which runtime/framework markers are present on the host page.
//! A marker is either a named global symbol or a DOM selector; absence is a
//! valid `false`, never an error. Detection is a pure read of the page
//! surface, so repeated calls with unchanged page state return identical
//! results.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::host::Page;

/// How a marker's presence is probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerProbe {
    /// A named global symbol is defined
    Global(String),
    /// Some element matches this selector
    Selector(String),
}

/// A named signal whose presence indicates a host framework is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub probe: MarkerProbe,
}

impl Marker {
    /// Marker probed via a global symbol
    pub fn global(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            probe: MarkerProbe::Global(symbol.to_string()),
        }
    }

    /// Marker probed via a DOM selector
    pub fn selector(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            probe: MarkerProbe::Selector(selector.to_string()),
        }
    }
}

/// The marker set for Flutter-web hosts
pub fn flutter_markers() -> Vec<Marker> {
    vec![
        Marker::global("flutter-web-renderer", "flutterWebRenderer"),
        Marker::global("flutter-runtime", "_flutter"),
        Marker::global("flutter-canvaskit", "flutterCanvasKit"),
        Marker::global("dart-loader", "$dartLoader"),
        Marker::selector("flutter-glass-pane", "flt-glass-pane"),
        Marker::selector("flutter-scene-host", "flt-scene-host"),
    ]
}

/// Detects marker presence against a page surface.
pub struct EnvironmentProbe {
    page: Option<Arc<dyn Page>>,
    markers: Vec<Marker>,
}

impl EnvironmentProbe {
    /// Probe `markers` against `page`; a `None` page reports every marker
    /// as absent
    pub fn new(page: Option<Arc<dyn Page>>, markers: Vec<Marker>) -> Self {
        Self { page, markers }
    }

    /// Presence of each configured marker by name
    pub fn detect(&self) -> BTreeMap<String, bool> {
        self.markers
            .iter()
            .map(|marker| {
                let present = match (&self.page, &marker.probe) {
                    (Some(page), MarkerProbe::Global(symbol)) => page.has_global(symbol),
                    (Some(page), MarkerProbe::Selector(selector)) => {
                        page.query_selector(selector)
                    }
                    (None, _) => false,
                };
                (marker.name.clone(), present)
            })
            .collect()
    }
}
