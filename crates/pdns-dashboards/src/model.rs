// Numan Thabit 2025
//! Serializable pieces of a Grafana (schema 12) dashboard document.
//!
//! Field names follow the dashboard JSON model; the Rust names are the
//! snake_case equivalents. Key order in the emitted file comes from
//! [`crate::Dashboard::to_json_string`], not from the declaration order here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: u32 = 12;
pub const DOCUMENT_VERSION: u32 = 9;
pub const DEFAULT_DATASOURCE: &str = "metronome";
pub const DEFAULT_TAG: &str = "pdns-default";
pub const GENERATED_NOTE: &str = "AUTOMATICALLY GENERATED by pdns-dashboards";

const REFRESH_INTERVALS: [&str; 10] = [
    "5s", "10s", "30s", "1m", "5m", "15m", "30m", "1h", "2h", "1d",
];
const TIME_OPTIONS: [&str; 9] = ["5m", "15m", "1h", "6h", "12h", "24h", "2d", "7d", "30d"];

/// Wrapper used by the `templating` and `annotations` sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    pub list: Vec<T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self { list: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            from: "now-6h".into(),
            to: "now".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePicker {
    pub refresh_intervals: Vec<String>,
    pub time_options: Vec<String>,
}

impl Default for TimePicker {
    fn default() -> Self {
        Self {
            refresh_intervals: REFRESH_INTERVALS.iter().map(|s| s.to_string()).collect(),
            time_options: TIME_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A titled horizontal section holding panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub title: String,
    pub collapse: bool,
    pub editable: bool,
    pub height: String,
    pub panels: Vec<Panel>,
    pub show_title: bool,
}

impl Row {
    pub(crate) fn new(title: String, collapse: bool, show_title: bool) -> Self {
        Self {
            title,
            collapse,
            editable: true,
            height: "250px".into(),
            panels: Vec::new(),
            show_title,
        }
    }
}

/// How a graph draws missing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullPointMode {
    /// Missing samples count as zero; required for stacked series so the
    /// stacked total stays truthful.
    #[serde(rename = "zero")]
    AsZero,
    /// Lines are broken where samples are missing.
    #[serde(rename = "null")]
    Gap,
}

impl NullPointMode {
    pub fn for_stack(stack: bool) -> Self {
        if stack {
            Self::AsZero
        } else {
            Self::Gap
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub hide: bool,
    pub ref_id: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub threshold1: Option<f64>,
    #[serde(rename = "threshold1Color")]
    pub threshold1_color: String,
    pub threshold2: Option<f64>,
    #[serde(rename = "threshold2Color")]
    pub threshold2_color: String,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            threshold1: None,
            threshold1_color: "rgba(216, 200, 27, 0.27)".into(),
            threshold2: None,
            threshold2_color: "rgba(234, 112, 112, 0.22)".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub avg: bool,
    pub current: bool,
    pub max: bool,
    pub min: bool,
    pub show: bool,
    pub total: bool,
    pub values: bool,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            avg: false,
            current: false,
            max: false,
            min: false,
            show: true,
            total: false,
            values: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    #[serde(rename = "msResolution")]
    pub ms_resolution: bool,
    pub shared: bool,
    pub sort: u32,
    pub value_type: String,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            ms_resolution: false,
            shared: true,
            sort: 0,
            value_type: "cumulative".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub format: String,
    pub label: Option<String>,
    pub log_base: u32,
    pub max: Option<i64>,
    pub min: Option<i64>,
    pub show: bool,
}

impl YAxis {
    pub(crate) fn new(format: String, min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            format,
            label: None,
            log_base: 1,
            max,
            min,
            show: true,
        }
    }
}

/// A graph panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub title: String,
    pub datasource: String,
    pub alias_colors: BTreeMap<String, String>,
    pub bars: bool,
    pub editable: bool,
    pub error: bool,
    pub fill: u32,
    pub grid: Grid,
    pub id: u32,
    pub is_new: bool,
    pub legend: Legend,
    pub lines: bool,
    pub linewidth: u32,
    pub links: Vec<Value>,
    pub null_point_mode: NullPointMode,
    pub percentage: bool,
    pub pointradius: u32,
    pub points: bool,
    pub renderer: String,
    pub series_overrides: Vec<Value>,
    pub span: u32,
    pub stack: bool,
    pub stepped_line: bool,
    pub targets: Vec<Target>,
    pub time_from: Option<String>,
    pub time_shift: Option<String>,
    pub tooltip: Tooltip,
    #[serde(rename = "type")]
    pub kind: String,
    pub xaxis: XAxis,
    pub yaxes: Vec<YAxis>,
}

/// One entry of the option list of a fixed-choice variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub value: String,
}

/// Template variable whose options come from a backend query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariable {
    pub current: BTreeMap<String, String>,
    pub datasource: String,
    pub hide: u32,
    pub include_all: bool,
    pub label: String,
    pub multi: bool,
    pub name: String,
    pub options: Vec<ChoiceOption>,
    pub query: String,
    pub refresh: u32,
    pub regex: String,
}

/// Template variable with a fixed list of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomVariable {
    pub current: Selection,
    pub datasource: Option<String>,
    pub hide: u32,
    pub include_all: bool,
    pub label: String,
    pub multi: bool,
    pub name: String,
    pub options: Vec<ChoiceOption>,
    pub query: String,
    pub refresh: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateVar {
    Query(QueryVariable),
    Custom(CustomVariable),
}

impl TemplateVar {
    pub fn name(&self) -> &str {
        match self {
            Self::Query(var) => &var.name,
            Self::Custom(var) => &var.name,
        }
    }
}

/// Event overlay drawn on every graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: String,
    pub datasource: String,
    pub icon_color: String,
    pub enable: bool,
    pub target: String,
}
