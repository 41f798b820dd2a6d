//! Connectivity input and its on-disk forms.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{BctError, Result},
    execution::NumericArray,
};

/// Weighted, possibly directed, region-to-region connection matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connectivity {
    pub gid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub weights: NumericArray,
    /// Declared symmetry; derived from the weights when absent in the file.
    #[serde(default)]
    pub undirected: Option<bool>,
}

impl Connectivity {
    pub fn new(gid: impl Into<String>, weights: NumericArray) -> Result<Self> {
        let conn = Self {
            gid: gid.into(),
            title: None,
            weights,
            undirected: None,
        };
        conn.validate()?;
        Ok(conn)
    }

    pub fn with_undirected(mut self, undirected: bool) -> Self {
        self.undirected = Some(undirected);
        self
    }

    pub fn is_undirected(&self) -> bool {
        self.undirected.unwrap_or_else(|| self.weights.is_symmetric())
    }

    pub fn region_count(&self) -> usize {
        self.weights.shape().first().copied().unwrap_or(0)
    }

    fn validate(&self) -> Result<()> {
        if !self.weights.is_square() {
            return Err(BctError::InvalidConnectivity(format!(
                "weights must be a square matrix, got shape {:?}",
                self.weights.shape()
            )));
        }
        if self.weights.data().iter().any(|w| !w.is_finite()) {
            return Err(BctError::InvalidConnectivity(
                "weights must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Loads a `.json` connectivity or a whitespace-separated weights matrix.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| BctError::io(path, e))?;
        let gid = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "connectivity".into());
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            let conn: Self = serde_json::from_str(&text)?;
            conn.validate()?;
            Ok(conn)
        } else {
            Self::new(gid, parse_weights(&text)?)
        }
    }
}

/// Parses rows of whitespace- or comma-separated numbers; `#` starts a comment.
pub fn parse_weights(text: &str) -> Result<NumericArray> {
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>().map_err(|_| {
                    BctError::InvalidConnectivity(format!(
                        "line {}: '{}' is not a number",
                        lineno + 1,
                        t
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    NumericArray::from_rows(rows)
        .map_err(|e| BctError::InvalidConnectivity(e.to_string()))
}
