//! Decode the delimited `logData` block of a log into a frame

use crate::error::{Error, Result};
use crate::melt::types::{Column, Frame};
use crate::model::{Element, Scalar};
use chrono::DateTime;
use std::collections::HashMap;

const DEFAULT_DELIMITER: &str = ",";

/// Primitive type of a log curve, as declared by `typeLogData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogDataType {
    Byte,
    DateTime,
    Double,
    Float,
    Int,
    Long,
    Short,
    String,
    String40,
    String16,
    Unknown,
}

impl LogDataType {
    /// Look up a schema type name. Unrecognised names decode as text.
    pub fn from_schema_name(name: &str) -> Self {
        match name.trim() {
            "byte" => LogDataType::Byte,
            "date time" => LogDataType::DateTime,
            "double" => LogDataType::Double,
            "float" => LogDataType::Float,
            "int" => LogDataType::Int,
            "long" => LogDataType::Long,
            "short" => LogDataType::Short,
            "string" => LogDataType::String,
            "string40" => LogDataType::String40,
            "string16" => LogDataType::String16,
            "unknown" => LogDataType::Unknown,
            other => {
                log::debug!("unrecognised typeLogData '{}', decoding as text", other);
                LogDataType::Unknown
            }
        }
    }

    pub fn schema_name(self) -> &'static str {
        match self {
            LogDataType::Byte => "byte",
            LogDataType::DateTime => "date time",
            LogDataType::Double => "double",
            LogDataType::Float => "float",
            LogDataType::Int => "int",
            LogDataType::Long => "long",
            LogDataType::Short => "short",
            LogDataType::String => "string",
            LogDataType::String40 => "string40",
            LogDataType::String16 => "string16",
            LogDataType::Unknown => "unknown",
        }
    }

    /// Text curves keep their fields verbatim, whitespace included
    pub fn is_text(self) -> bool {
        matches!(
            self,
            LogDataType::String | LogDataType::String40 | LogDataType::String16 | LogDataType::Unknown
        )
    }

    /// Cast one non-empty field. Numbers and date-times ignore surrounding
    /// whitespace, everything else is taken as is.
    pub fn cast(self, mnemonic: &str, raw: &str) -> Result<Scalar> {
        let decode_err = || Error::Decode {
            mnemonic: mnemonic.to_string(),
            value: raw.to_string(),
            kind: self.schema_name(),
        };

        match self {
            LogDataType::Byte => Ok(Scalar::Bytes(raw.as_bytes().to_vec())),
            LogDataType::DateTime => DateTime::parse_from_rfc3339(raw.trim())
                .map(Scalar::Timestamp)
                .map_err(|_| decode_err()),
            LogDataType::Double | LogDataType::Float => {
                raw.trim().parse::<f64>().map(Scalar::Double).map_err(|_| decode_err())
            }
            LogDataType::Int | LogDataType::Long | LogDataType::Short => {
                raw.trim().parse::<i64>().map(Scalar::Int).map_err(|_| decode_err())
            }
            LogDataType::String
            | LogDataType::String40
            | LogDataType::String16
            | LogDataType::Unknown => Ok(Scalar::Text(raw.to_string())),
        }
    }
}

/// Whether `element` is a log that carries a `logData` block
pub fn is_log_with_data(element: &Element) -> bool {
    element.name() == "log" && element.child("logData").is_some()
}

/// Decode the data rows of a log into a frame keyed by mnemonic.
///
/// Columns follow the order of `mnemonicList` in the first `logData` block
/// and are typed by each curve's `typeLogData`. An empty field, or a
/// blank one in a numeric or date-time curve, becomes a null marker when `fill_missing` is set; otherwise it is skipped and the
/// column ends up shorter than its siblings.
///
/// A row must have exactly one field per mnemonic, anything else fails
/// with [`Error::RowWidth`].
pub fn decode_log(log: &Element, fill_missing: bool) -> Result<Frame> {
    let mut curve_types: HashMap<String, LogDataType> = HashMap::new();
    for curve in log.elements("logCurveInfo") {
        let Some(mnemonic) = curve.text("mnemonic") else {
            log::warn!("logCurveInfo without mnemonic in log {:?}", log.attribute("uid"));
            continue;
        };
        let data_type = curve
            .text("typeLogData")
            .map(|t| LogDataType::from_schema_name(&t))
            .unwrap_or(LogDataType::Unknown);
        curve_types.insert(mnemonic, data_type);
    }

    let delimiter = log
        .text("dataDelimiter")
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

    let blocks = log.elements("logData");
    let block = blocks.first().ok_or_else(|| Error::MissingElement {
        path: "log.logData".to_string(),
    })?;
    if blocks.len() > 1 {
        log::warn!("log has {} logData blocks, decoding the first", blocks.len());
    }

    let mnemonic_list = block.text("mnemonicList").ok_or_else(|| Error::MissingElement {
        path: "log.logData.mnemonicList".to_string(),
    })?;

    let mut columns: Vec<(String, LogDataType, Column)> = mnemonic_list
        .split(delimiter.as_str())
        .map(|m| {
            let mnemonic = m.trim().to_string();
            let data_type = curve_types.get(&mnemonic).copied().unwrap_or_else(|| {
                log::warn!("no logCurveInfo for mnemonic '{}', decoding as text", mnemonic);
                LogDataType::Unknown
            });
            (mnemonic, data_type, Vec::new())
        })
        .collect();

    for (row_idx, row) in block.elements("data").iter().enumerate() {
        let row = row.value().map(|v| v.to_string()).unwrap_or_default();
        let fields: Vec<&str> = row.split(delimiter.as_str()).collect();
        if fields.len() != columns.len() {
            return Err(Error::RowWidth {
                row: row_idx,
                expected: columns.len(),
                found: fields.len(),
            });
        }

        for ((mnemonic, data_type, values), field) in columns.iter_mut().zip(fields) {
            let missing = if data_type.is_text() {
                field.is_empty()
            } else {
                field.trim().is_empty()
            };
            if !missing {
                values.push(Some(data_type.cast(mnemonic, field)?));
            } else if fill_missing {
                values.push(None);
            }
        }
    }

    let mut frame = Frame::new();
    for (mnemonic, _, values) in columns {
        frame.insert_column(mnemonic, values);
    }
    Ok(frame)
}
