use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How much of each matching object a store query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnElements {
    All,
    IdOnly,
    HeaderOnly,
    DataOnly,
    StationLocationOnly,
    LatestChangeOnly,
    Requested,
}

impl ReturnElements {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnElements::All => "all",
            ReturnElements::IdOnly => "id-only",
            ReturnElements::HeaderOnly => "header-only",
            ReturnElements::DataOnly => "data-only",
            ReturnElements::StationLocationOnly => "station-location-only",
            ReturnElements::LatestChangeOnly => "latest-change-only",
            ReturnElements::Requested => "requested",
        }
    }

    /// The `OptionsIn` string of a query
    pub fn options_in(self) -> String {
        format!("returnElements={}", self.as_str())
    }
}

impl fmt::Display for ReturnElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnElements {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(ReturnElements::All),
            "id-only" => Ok(ReturnElements::IdOnly),
            "header-only" => Ok(ReturnElements::HeaderOnly),
            "data-only" => Ok(ReturnElements::DataOnly),
            "station-location-only" => Ok(ReturnElements::StationLocationOnly),
            "latest-change-only" => Ok(ReturnElements::LatestChangeOnly),
            "requested" => Ok(ReturnElements::Requested),
            other => Err(Error::InvalidEnumValue {
                kind: "returnElements",
                value: other.to_string(),
            }),
        }
    }
}
