// Numan Thabit 2025
use std::{
    collections::BTreeMap,
    io::Write,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    error::DashboardError,
    format::{ref_id, MAX_TARGETS},
    model::{
        Annotation, Grid, Legend, List, NullPointMode, Panel, Row, Target, TemplateVar,
        TimePicker, TimeRange, Tooltip, XAxis, YAxis, DEFAULT_DATASOURCE, DEFAULT_TAG,
        DOCUMENT_VERSION, GENERATED_NOTE, SCHEMA_VERSION,
    },
    templating::{ChoiceVar, QueryVar},
};

/// Handle to a row of a [`Dashboard`], returned by [`Dashboard::add_row`].
///
/// Only valid for the dashboard that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle {
    dashboard: u64,
    index: usize,
}

/// Settings for a new row.
#[derive(Debug, Clone)]
pub struct RowOptions {
    title: String,
    collapse: bool,
    show_title: bool,
}

impl RowOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            collapse: false,
            show_title: false,
        }
    }

    /// Start the row folded.
    pub fn collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn show_title(mut self, show_title: bool) -> Self {
        self.show_title = show_title;
        self
    }
}

/// A graph panel waiting to be placed in a row.
#[derive(Debug, Clone)]
pub struct Graph {
    title: String,
    targets: Vec<String>,
    stack: bool,
    span: u32,
    y_min: Option<i64>,
    y_max: Option<i64>,
    y_format: String,
}

impl Graph {
    pub fn new<I>(title: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            title: title.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            stack: false,
            span: 12,
            y_min: Some(0),
            y_max: None,
            y_format: "short".into(),
        }
    }

    pub fn stack(mut self, stack: bool) -> Self {
        self.stack = stack;
        self
    }

    /// Grid width out of the 12 units of a row.
    pub fn span(mut self, span: u32) -> Self {
        self.span = span;
        self
    }

    pub fn y_min(mut self, y_min: impl Into<Option<i64>>) -> Self {
        self.y_min = y_min.into();
        self
    }

    pub fn y_max(mut self, y_max: impl Into<Option<i64>>) -> Self {
        self.y_max = y_max.into();
        self
    }

    /// Unit of the left y-axis, e.g. `short`, `bytes`, `percentunit`, `µs`.
    pub fn y_format(mut self, y_format: impl Into<String>) -> Self {
        self.y_format = y_format.into();
        self
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if self.targets.is_empty() {
            return Err(DashboardError::EmptyTargets {
                title: self.title.clone(),
            });
        }
        if self.targets.len() > MAX_TARGETS {
            return Err(DashboardError::TooManyTargets {
                title: self.title.clone(),
                count: self.targets.len(),
            });
        }
        Ok(())
    }

    fn into_panel(self, id: u32, datasource: &str) -> Result<Panel, DashboardError> {
        let targets = self
            .targets
            .into_iter()
            .enumerate()
            .map(|(idx, target)| -> Result<Target, DashboardError> {
                Ok(Target {
                    hide: false,
                    ref_id: ref_id(idx)?,
                    target,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Panel {
            title: self.title,
            datasource: datasource.to_string(),
            alias_colors: BTreeMap::new(),
            bars: false,
            editable: true,
            error: false,
            fill: 1,
            grid: Grid::default(),
            id,
            is_new: true,
            legend: Legend::default(),
            lines: true,
            linewidth: 2,
            links: Vec::new(),
            null_point_mode: NullPointMode::for_stack(self.stack),
            percentage: false,
            pointradius: 5,
            points: false,
            renderer: "flot".into(),
            series_overrides: Vec::new(),
            span: self.span,
            stack: self.stack,
            stepped_line: false,
            targets,
            time_from: None,
            time_shift: None,
            tooltip: Tooltip::default(),
            kind: "graph".into(),
            xaxis: XAxis { show: true },
            yaxes: vec![
                YAxis::new(self.y_format, self.y_min, self.y_max),
                YAxis::new("short".into(), None, None),
            ],
        })
    }
}

/// The serialized dashboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "___NOTE___")]
    pub note: String,
    pub id: Option<u64>,
    pub title: String,
    pub tags: Vec<String>,
    pub style: String,
    pub timezone: String,
    pub editable: bool,
    pub hide_controls: bool,
    pub shared_crosshair: bool,
    pub rows: Vec<Row>,
    pub time: TimeRange,
    pub timepicker: TimePicker,
    pub templating: List<TemplateVar>,
    pub annotations: List<Annotation>,
    pub refresh: bool,
    pub schema_version: u32,
    pub version: u32,
    pub links: Vec<Value>,
    pub gnet_id: Option<u64>,
}

impl Document {
    fn new(title: String) -> Self {
        Self {
            note: GENERATED_NOTE.into(),
            id: None,
            title,
            tags: vec![DEFAULT_TAG.into()],
            style: "light".into(),
            timezone: "browser".into(),
            editable: true,
            hide_controls: false,
            shared_crosshair: true,
            rows: Vec::new(),
            time: TimeRange::default(),
            timepicker: TimePicker::default(),
            templating: List::default(),
            annotations: List::default(),
            refresh: false,
            schema_version: SCHEMA_VERSION,
            version: DOCUMENT_VERSION,
            links: Vec::new(),
            gnet_id: None,
        }
    }

    fn max_panel_id(&self) -> u32 {
        self.rows
            .iter()
            .flat_map(|row| &row.panels)
            .map(|panel| panel.id)
            .max()
            .unwrap_or(0)
    }

    /// Datasource already referenced by the document, if any.
    fn datasource(&self) -> Option<&str> {
        let panels = self
            .rows
            .iter()
            .flat_map(|row| &row.panels)
            .map(|panel| panel.datasource.as_str());
        let annotations = self.annotations.list.iter().map(|a| a.datasource.as_str());
        let variables = self.templating.list.iter().filter_map(|var| match var {
            TemplateVar::Query(var) => Some(var.datasource.as_str()),
            TemplateVar::Custom(_) => None,
        });
        panels
            .chain(annotations)
            .chain(variables)
            .find(|ds| !ds.is_empty())
    }
}

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

fn next_builder_id() -> u64 {
    NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A dashboard document under construction.
///
/// Serializes as the bare [`Document`]. Parsing a document back restores the
/// panel-id counter from the highest id present and the datasource from the
/// existing fragments, so extending it never reuses an id.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Dashboard {
    document: Document,
    #[serde(skip)]
    datasource: String,
    #[serde(skip)]
    last_panel_id: u32,
    #[serde(skip)]
    builder_id: u64,
}

impl Deref for Dashboard {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

impl DerefMut for Dashboard {
    fn deref_mut(&mut self) -> &mut Document {
        &mut self.document
    }
}

/// Copies get their own identity; row handles of the original do not apply.
impl Clone for Dashboard {
    fn clone(&self) -> Self {
        Self {
            document: self.document.clone(),
            datasource: self.datasource.clone(),
            last_panel_id: self.last_panel_id,
            builder_id: next_builder_id(),
        }
    }
}

impl<'de> Deserialize<'de> for Dashboard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Document::deserialize(deserializer).map(Dashboard::from_document)
    }
}

impl From<Document> for Dashboard {
    fn from(document: Document) -> Self {
        Self::from_document(document)
    }
}

impl Dashboard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            document: Document::new(title.into()),
            datasource: DEFAULT_DATASOURCE.into(),
            last_panel_id: 0,
            builder_id: next_builder_id(),
        }
    }

    /// Resume building on top of an existing document.
    pub fn from_document(document: Document) -> Self {
        let datasource = document
            .datasource()
            .unwrap_or(DEFAULT_DATASOURCE)
            .to_string();
        Self {
            last_panel_id: document.max_panel_id(),
            datasource,
            document,
            builder_id: next_builder_id(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Datasource used by fragments added after this call.
    pub fn with_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.datasource = datasource.into();
        self
    }

    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    pub fn add_template_var(&mut self, var: QueryVar) {
        let var = var.into_variable(&self.datasource);
        debug!(name = %var.name, "adding query template variable");
        self.templating.list.push(TemplateVar::Query(var));
    }

    pub fn add_template_var_choice(&mut self, var: ChoiceVar) -> Result<(), DashboardError> {
        let var = var.into_variable()?;
        debug!(name = %var.name, default = %var.current.value, "adding choice template variable");
        self.templating.list.push(TemplateVar::Custom(var));
        Ok(())
    }

    pub fn add_row(&mut self, title: impl Into<String>) -> RowHandle {
        self.add_row_with(RowOptions::new(title))
    }

    pub fn add_row_with(&mut self, options: RowOptions) -> RowHandle {
        debug!(title = %options.title, collapse = options.collapse, "adding row");
        self.rows
            .push(Row::new(options.title, options.collapse, options.show_title));
        self.row_handle(self.rows.len() - 1)
    }

    /// Handle of the most recently added row.
    pub fn current_row(&self) -> Result<RowHandle, DashboardError> {
        match self.rows.len() {
            0 => Err(DashboardError::NoCurrentRow),
            len => Ok(self.row_handle(len - 1)),
        }
    }

    fn row_handle(&self, index: usize) -> RowHandle {
        RowHandle {
            dashboard: self.builder_id,
            index,
        }
    }

    /// Append a graph to `row`, returning the new panel id.
    pub fn add_graph(&mut self, row: RowHandle, graph: Graph) -> Result<u32, DashboardError> {
        if row.dashboard != self.builder_id || row.index >= self.rows.len() {
            return Err(DashboardError::UnknownRow { index: row.index });
        }
        graph.validate()?;

        let id = self.next_panel_id();
        let panel = graph.into_panel(id, &self.datasource)?;
        debug!(id, title = %panel.title, targets = panel.targets.len(), "adding graph");
        self.rows[row.index].panels.push(panel);
        Ok(id)
    }

    /// Add a row holding a single graph with the same title.
    pub fn add_graph_row(&mut self, graph: Graph, collapse: bool) -> Result<u32, DashboardError> {
        let row = self.add_row_with(RowOptions::new(graph.title.clone()).collapse(collapse));
        self.add_graph(row, graph)
    }

    pub fn add_annotation(&mut self, name: impl Into<String>, target: impl Into<String>) {
        let annotation = Annotation {
            name: name.into(),
            datasource: self.datasource.clone(),
            icon_color: "rgba(255, 96, 96, 1)".into(),
            enable: true,
            target: target.into(),
        };
        self.annotations.list.push(annotation);
    }

    pub fn panel_count(&self) -> usize {
        self.rows.iter().map(|row| row.panels.len()).sum()
    }

    /// Render with sorted keys, two-space indentation, non-ASCII kept as-is
    /// and a trailing newline.
    pub fn to_json_string(&self) -> Result<String, DashboardError> {
        // Objects in a `Value` are BTreeMaps, which sorts every level.
        let value = serde_json::to_value(self)?;
        let mut rendered = serde_json::to_string_pretty(&value)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Write the document to `path`, replacing any existing file.
    ///
    /// The bytes go to a temporary file next to `path` first and are renamed
    /// into place, so a failed write never leaves a truncated dashboard.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DashboardError> {
        let path = path.as_ref();
        let rendered = self.to_json_string()?;
        let io_err = |source: std::io::Error| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        file.write_all(rendered.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(io_err)?;
        }
        file.persist(path).map_err(|err| io_err(err.error))?;

        info!(
            path = %path.display(),
            rows = self.rows.len(),
            panels = self.panel_count(),
            bytes = rendered.len(),
            "wrote dashboard"
        );
        Ok(())
    }

    fn next_panel_id(&mut self) -> u32 {
        self.last_panel_id += 1;
        self.last_panel_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn letters(panel: &Panel) -> Vec<&str> {
        panel.targets.iter().map(|t| t.ref_id.as_str()).collect()
    }

    #[test]
    fn graph_before_any_row_has_no_current_row() {
        let dash = Dashboard::new("t");
        assert!(matches!(dash.current_row(), Err(DashboardError::NoCurrentRow)));
    }

    #[test]
    fn foreign_row_handle_is_rejected() {
        let mut other = Dashboard::new("other");
        let foreign_first = other.add_row("a");
        let foreign_second = other.add_row("b");

        let mut dash = Dashboard::new("t");
        dash.add_row("only");
        let err = dash
            .add_graph(foreign_first, Graph::new("g", ["q"]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownRow { index: 0 }));
        let err = dash
            .add_graph(foreign_second, Graph::new("g", ["q"]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownRow { index: 1 }));
        assert!(dash.rows[0].panels.is_empty());
        assert!(other.rows.iter().all(|row| row.panels.is_empty()));
    }

    #[test]
    fn clone_does_not_accept_original_handles() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        let mut copy = dash.clone();
        assert!(matches!(
            copy.add_graph(row, Graph::new("g", ["q"])),
            Err(DashboardError::UnknownRow { index: 0 })
        ));
        let own = copy.current_row().unwrap();
        assert_eq!(copy.add_graph(own, Graph::new("g", ["q"])).unwrap(), 1);
    }

    #[test]
    fn parsed_dashboard_continues_ids_and_datasource() {
        let mut dash = Dashboard::new("t").with_datasource("graphite");
        let row = dash.add_row("r");
        dash.add_graph(row, Graph::new("a", ["q"])).unwrap();
        dash.add_graph(row, Graph::new("b", ["q"])).unwrap();

        let mut parsed: Dashboard = serde_json::from_str(&dash.to_json_string().unwrap()).unwrap();
        assert_eq!(parsed.datasource(), "graphite");
        assert_eq!(parsed.document(), dash.document());

        let row = parsed.current_row().unwrap();
        assert_eq!(parsed.add_graph(row, Graph::new("c", ["q"])).unwrap(), 3);
        let added = &parsed.rows[0].panels[2];
        assert_eq!(added.datasource, "graphite");
    }

    #[test]
    fn parsed_empty_dashboard_uses_default_datasource() {
        let dash = Dashboard::new("t");
        let mut parsed: Dashboard = serde_json::from_str(&dash.to_json_string().unwrap()).unwrap();
        assert_eq!(parsed.datasource(), DEFAULT_DATASOURCE);
        let row = parsed.add_row("r");
        assert_eq!(parsed.add_graph(row, Graph::new("g", ["q"])).unwrap(), 1);
    }

    #[test]
    fn panel_ids_increase_across_rows() {
        let mut dash = Dashboard::new("t");
        let first = dash.add_row("one");
        let second = dash.add_row("two");
        assert_eq!(dash.add_graph(second, Graph::new("a", ["q"])).unwrap(), 1);
        assert_eq!(dash.add_graph(first, Graph::new("b", ["q"])).unwrap(), 2);
        assert_eq!(dash.add_graph_row(Graph::new("c", ["q"]), true).unwrap(), 3);
        assert_eq!(dash.rows[0].panels[0].id, 2);
        assert_eq!(dash.rows[1].panels[0].id, 1);
        assert_eq!(dash.rows[2].panels[0].id, 3);
        assert!(dash.rows[2].collapse);
        assert_eq!(dash.rows[2].title, "c");
    }

    #[test]
    fn failed_graph_does_not_consume_an_id() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        let err = dash
            .add_graph(row, Graph::new("empty", Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(err, DashboardError::EmptyTargets { .. }));
        assert_eq!(dash.add_graph(row, Graph::new("ok", ["q"])).unwrap(), 1);
    }

    #[test]
    fn ref_ids_are_positional() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        let targets: Vec<String> = (0..26).map(|i| format!("q{i}")).collect();
        dash.add_graph(row, Graph::new("all", targets)).unwrap();
        dash.add_graph(row, Graph::new("three", ["x", "y", "z"])).unwrap();

        let panels = &dash.rows[0].panels;
        assert_eq!(letters(&panels[0]).concat(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(letters(&panels[1]), vec!["A", "B", "C"]);
        assert_eq!(panels[1].targets[2].target, "z");
    }

    #[test]
    fn twenty_seven_targets_are_rejected() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        let targets: Vec<String> = (0..27).map(|i| format!("q{i}")).collect();
        let err = dash.add_graph(row, Graph::new("big", targets)).unwrap_err();
        assert!(matches!(err, DashboardError::TooManyTargets { count: 27, .. }));
        assert!(dash.rows[0].panels.is_empty());
    }

    #[test]
    fn stacking_selects_null_point_mode() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        dash.add_graph(row, Graph::new("stacked", ["q"]).stack(true)).unwrap();
        dash.add_graph(row, Graph::new("lines", ["q"])).unwrap();
        let value = serde_json::to_value(&dash).unwrap();
        let panels = &value["rows"][0]["panels"];
        assert_eq!(panels[0]["nullPointMode"], json!("zero"));
        assert_eq!(panels[0]["stack"], json!(true));
        assert_eq!(panels[1]["nullPointMode"], json!("null"));
    }

    #[test]
    fn graph_defaults_and_axis_options() {
        let mut dash = Dashboard::new("t").with_datasource("graphite");
        let row = dash.add_row("r");
        dash.add_graph(row, Graph::new("d", ["q"])).unwrap();
        dash.add_graph(
            row,
            Graph::new("custom", ["q"])
                .span(4)
                .y_format("µs")
                .y_min(None::<i64>)
                .y_max(100_i64),
        )
        .unwrap();

        let value = serde_json::to_value(&dash).unwrap();
        let default = &value["rows"][0]["panels"][0];
        assert_eq!(default["span"], json!(12));
        assert_eq!(default["datasource"], json!("graphite"));
        assert_eq!(default["yaxes"][0], json!({
            "format": "short", "label": null, "logBase": 1,
            "max": null, "min": 0, "show": true
        }));
        assert_eq!(default["yaxes"][1]["min"], Value::Null);

        let custom = &value["rows"][0]["panels"][1];
        assert_eq!(custom["span"], json!(4));
        assert_eq!(custom["yaxes"][0]["format"], json!("µs"));
        assert_eq!(custom["yaxes"][0]["min"], Value::Null);
        assert_eq!(custom["yaxes"][0]["max"], json!(100));
    }

    #[test]
    fn document_metadata_defaults() {
        let mut dash = Dashboard::new("PowerDNS dnsdist [default]");
        dash.add_annotation("restart", "derivative(uptime)");
        let value = serde_json::to_value(&dash).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["gnetId"], Value::Null);
        assert_eq!(value["schemaVersion"], json!(SCHEMA_VERSION));
        assert_eq!(value["version"], json!(DOCUMENT_VERSION));
        assert_eq!(value["tags"], json!(["pdns-default"]));
        assert_eq!(value["refresh"], json!(false));
        assert_eq!(value["time"], json!({"from": "now-6h", "to": "now"}));
        assert_eq!(value["timepicker"]["time_options"][3], json!("6h"));
        assert_eq!(value["annotations"]["list"][0]["datasource"], json!("metronome"));
        assert_eq!(value["annotations"]["list"][0]["iconColor"], json!("rgba(255, 96, 96, 1)"));
        assert!(value.get("datasource").is_none());
        assert!(value.get("lastPanelId").is_none());
    }

    #[test]
    fn rendering_sorts_keys_and_keeps_unicode() {
        let mut dash = Dashboard::new("t");
        let row = dash.add_row("r");
        dash.add_graph(row, Graph::new("latency", ["q"]).y_format("µs"))
            .unwrap();
        let rendered = dash.to_json_string().unwrap();

        assert!(rendered.starts_with("{\n  \"___NOTE___\": "));
        assert!(rendered.ends_with("}\n"));
        assert!(rendered.contains("\"format\": \"µs\""));
        let annotations = rendered.find("\"annotations\"").unwrap();
        let editable = rendered.find("\"editable\"").unwrap();
        let version = rendered.rfind("\"version\"").unwrap();
        assert!(annotations < editable && editable < version);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale").unwrap();

        let dash = Dashboard::new("t");
        dash.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, dash.to_json_string().unwrap());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = Dashboard::new("t").save(&path).unwrap_err();
        assert!(matches!(err, DashboardError::Io { path: p, .. } if p == path));
    }
}
