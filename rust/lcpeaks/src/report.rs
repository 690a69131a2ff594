//! Parser for exported LC instrument text reports.
//!
//! A report is tab-delimited text made of four sections, in this order:
//!
//! ```text
//! Injection Information:
//! Injection<TAB>Sample 01
//! ...
//! Chromatogram Data Information:
//! Data Points<TAB>3
//! ...
//! Signal Parameter Information:
//! Signal Info<TAB>...
//! Chromatogram Data:
//! Time (min)<TAB>Step (s)<TAB>Value (EU)
//! 0.000<TAB>n.a.<TAB>0.125
//! ...
//! ```
//!
//! Metadata blocks are `key<TAB>value` rows; only the keys known for each
//! section are kept. The data block starts two lines below its header (the
//! column names are skipped) and `n.a.` marks a missing field.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use crate::errors::{
    LcError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

/// Token used by the instrument software for an unrecorded field.
pub const MISSING_TOKEN: &str = "n.a.";

pub const INJECTION_KEYS: &[&str] = &[
    "Data Vault",
    "Injection",
    "Injection Number",
    "Position",
    "Comment",
    "Processing Method",
    "Instrument Method",
    "Type",
    "Status",
    "Injection Date",
    "Injection Time",
    "Injection Volume (µL)",
    "Dilution Factor",
    "Weight",
];

pub const CHROMATOGRAM_DATA_KEYS: &[&str] = &[
    "Time Min. (min)",
    "Time Max. (min)",
    "Data Points",
    "Detector",
    "Generating Data System",
    "Exporting Data System",
    "Operator",
    "Signal Quantity",
    "Signal Unit",
    "Signal Min.",
    "Signal Max.",
    "Channel",
    "Driver Name",
    "Channel Type",
    "Min. Step (s)",
    "Max. Step (s)",
    "Average Step (s)",
];

pub const SIGNAL_PARAMETER_KEYS: &[&str] = &["Signal Info"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Injection,
    ChromatogramInfo,
    SignalParameter,
    Data,
}

impl Section {
    const ORDER: [Section; 4] = [
        Section::Injection,
        Section::ChromatogramInfo,
        Section::SignalParameter,
        Section::Data,
    ];

    fn name(&self) -> &'static str {
        match self {
            Section::Injection => "Injection Information",
            Section::ChromatogramInfo => "Chromatogram Data Information",
            Section::SignalParameter => "Signal Parameter Information",
            Section::Data => "Chromatogram Data",
        }
    }

    /// Order matters: the data header is a prefix of the chromatogram info one.
    fn from_header(line: &str) -> Option<Self> {
        if line.starts_with("Injection Information:") {
            Some(Section::Injection)
        } else if line.starts_with("Chromatogram Data Information:") {
            Some(Section::ChromatogramInfo)
        } else if line.starts_with("Signal Parameter Information:") {
            Some(Section::SignalParameter)
        } else if line.starts_with("Chromatogram Data") {
            Some(Section::Data)
        } else {
            None
        }
    }

    fn keys(&self) -> &'static [&'static str] {
        match self {
            Section::Injection => INJECTION_KEYS,
            Section::ChromatogramInfo => CHROMATOGRAM_DATA_KEYS,
            Section::SignalParameter => SIGNAL_PARAMETER_KEYS,
            Section::Data => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub injection: BTreeMap<String, String>,
    pub chromatogram_data: BTreeMap<String, String>,
    pub signal_parameter: BTreeMap<String, String>,
}

impl ReportMetadata {
    pub fn injection_info(&self) -> InjectionInfo {
        let text = |k: &str| self.injection.get(k).cloned();
        let number = |k: &str| self.injection.get(k).and_then(|v| v.parse().ok());
        InjectionInfo {
            data_vault: text("Data Vault"),
            injection: text("Injection"),
            injection_number: self
                .injection
                .get("Injection Number")
                .and_then(|v| v.parse().ok()),
            position: text("Position"),
            comment: text("Comment"),
            processing_method: text("Processing Method"),
            instrument_method: text("Instrument Method"),
            injection_type: text("Type"),
            status: text("Status"),
            injection_date: text("Injection Date"),
            injection_time: text("Injection Time"),
            injection_volume_ul: number("Injection Volume (µL)"),
            dilution_factor: number("Dilution Factor"),
            weight: number("Weight"),
        }
    }

    pub fn chromatogram_data_info(&self) -> ChromatogramDataInfo {
        let text = |k: &str| self.chromatogram_data.get(k).cloned();
        let number = |k: &str| {
            self.chromatogram_data
                .get(k)
                .and_then(|v| v.parse().ok())
        };
        ChromatogramDataInfo {
            time_min_minutes: number("Time Min. (min)"),
            time_max_minutes: number("Time Max. (min)"),
            data_points: self
                .chromatogram_data
                .get("Data Points")
                .and_then(|v| v.parse().ok()),
            detector: text("Detector"),
            generating_data_system: text("Generating Data System"),
            exporting_data_system: text("Exporting Data System"),
            operator: text("Operator"),
            signal_quantity: text("Signal Quantity"),
            signal_unit: text("Signal Unit"),
            signal_min: number("Signal Min."),
            signal_max: number("Signal Max."),
            channel: text("Channel"),
            driver_name: text("Driver Name"),
            channel_type: text("Channel Type"),
            min_step_seconds: number("Min. Step (s)"),
            max_step_seconds: number("Max. Step (s)"),
            average_step_seconds: number("Average Step (s)"),
        }
    }
}

/// Typed view of the injection section. Absent or unparsable fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjectionInfo {
    pub data_vault: Option<String>,
    pub injection: Option<String>,
    pub injection_number: Option<u32>,
    pub position: Option<String>,
    pub comment: Option<String>,
    pub processing_method: Option<String>,
    pub instrument_method: Option<String>,
    pub injection_type: Option<String>,
    pub status: Option<String>,
    pub injection_date: Option<String>,
    pub injection_time: Option<String>,
    pub injection_volume_ul: Option<f64>,
    pub dilution_factor: Option<f64>,
    pub weight: Option<f64>,
}

/// Typed view of the chromatogram data information section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramDataInfo {
    pub time_min_minutes: Option<f64>,
    pub time_max_minutes: Option<f64>,
    pub data_points: Option<usize>,
    pub detector: Option<String>,
    pub generating_data_system: Option<String>,
    pub exporting_data_system: Option<String>,
    pub operator: Option<String>,
    pub signal_quantity: Option<String>,
    pub signal_unit: Option<String>,
    pub signal_min: Option<f64>,
    pub signal_max: Option<f64>,
    pub channel: Option<String>,
    pub driver_name: Option<String>,
    pub channel_type: Option<String>,
    pub min_step_seconds: Option<f64>,
    pub max_step_seconds: Option<f64>,
    pub average_step_seconds: Option<f64>,
}

/// One `time / step / value` row of the data block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDataRow {
    pub time: Option<f64>,
    pub step: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcReport {
    pub source: Option<PathBuf>,
    pub metadata: ReportMetadata,
    pub rows: Vec<RawDataRow>,
}

impl LcReport {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let contents = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "{} is not valid UTF-8 ({}), reading it as Latin-1",
                    path.display(),
                    e.utf8_error()
                );
                e.into_bytes().into_iter().map(char::from).collect()
            }
        };
        let mut report = Self::parse_str(&contents)?;
        report.source = Some(path.to_path_buf());
        Ok(report)
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let lines: Vec<&str> = contents.lines().collect();
        Self::from_lines(&lines)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let headers = locate_headers(lines)?;
        let [injection, chromatogram_info, signal_parameter, data] = headers;

        let metadata = ReportMetadata {
            injection: parse_metadata_block(
                Section::Injection,
                lines,
                injection + 1,
                chromatogram_info,
            )?,
            chromatogram_data: parse_metadata_block(
                Section::ChromatogramInfo,
                lines,
                chromatogram_info + 1,
                signal_parameter,
            )?,
            signal_parameter: parse_metadata_block(
                Section::SignalParameter,
                lines,
                signal_parameter + 1,
                data,
            )?,
        };

        let rows = lines
            .iter()
            .enumerate()
            .skip(data + 2)
            .filter(|(_, line)| !line.as_ref().trim().is_empty())
            .map(|(i, line)| parse_data_row(line.as_ref(), i + 1))
            .collect::<Result<Vec<_>>>()?;
        debug!("Parsed {} data rows", rows.len());

        let report = Self {
            source: None,
            metadata,
            rows,
        };
        report.check_declared_points();
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_declared_points(&self) {
        let Some(declared) = self.metadata.chromatogram_data_info().data_points else {
            return;
        };
        if declared != self.rows.len() {
            warn!(
                "Report declares {} data points but {} rows were parsed",
                declared,
                self.rows.len()
            );
        }
    }
}

/// Line index of every section header, in section order.
fn locate_headers<S: AsRef<str>>(lines: &[S]) -> Result<[usize; 4]> {
    let mut found = [0usize; 4];
    let mut next = 0;
    for (i, line) in lines.iter().enumerate() {
        let Some(section) = Section::from_header(line.as_ref()) else {
            continue;
        };
        let expected = Section::ORDER[next];
        if section != expected {
            return Err(LcError::MalformedSection {
                section: section.name(),
                line: i + 1,
                reason: format!("expected the '{}' header first", expected.name()),
            });
        }
        found[next] = i;
        next += 1;
        if section == Section::Data {
            return Ok(found);
        }
    }
    let missing = Section::ORDER[next];
    Err(LcError::MalformedSection {
        section: missing.name(),
        line: lines.len(),
        reason: "section header not found".to_string(),
    })
}

fn parse_metadata_block<S: AsRef<str>>(
    section: Section,
    lines: &[S],
    start: usize,
    end: usize,
) -> Result<BTreeMap<String, String>> {
    let keys = section.keys();
    let mut out = BTreeMap::new();
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('\t') else {
            return Err(LcError::MalformedSection {
                section: section.name(),
                line: i + 1,
                reason: format!("expected a tab-delimited key/value row, got {:?}", line),
            });
        };
        let key = key.trim();
        if keys.contains(&key) {
            out.insert(key.to_string(), value.trim().to_string());
        }
    }
    Ok(out)
}

fn parse_data_row(line: &str, line_number: usize) -> Result<RawDataRow> {
    let mut fields = line.split('\t');
    let mut next_field = |name: &str| -> Result<Option<f64>> {
        let field = fields.next().ok_or_else(|| LcError::MalformedDataRow {
            line: line_number,
            reason: format!("missing the {} column", name),
        })?;
        parse_field(field).map_err(|reason| LcError::MalformedDataRow {
            line: line_number,
            reason: format!("{} column: {}", name, reason),
        })
    };
    Ok(RawDataRow {
        time: next_field("time")?,
        step: next_field("step")?,
        value: next_field("value")?,
    })
}

fn parse_field(field: &str) -> std::result::Result<Option<f64>, String> {
    let field = field.trim();
    if field == MISSING_TOKEN {
        return Ok(None);
    }
    match field.parse::<f64>() {
        Ok(x) if x.is_nan() => Ok(None),
        Ok(x) => Ok(Some(x)),
        Err(e) => Err(format!("could not parse {:?} ({})", field, e)),
    }
}
