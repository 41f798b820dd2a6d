//! Wrapper script and exchange-file format shared with the interpreter.
//!
//! Every value travels as a `{shape, data, posinf, neginf, nan}` object with
//! row-major `data`, because `jsonencode` flattens 1x1 matrices and cannot
//! express Inf or NaN. Non-finite entries are zeroed in `data` and listed by
//! zero-based index in `posinf`/`neginf`/`nan`.

use std::{collections::BTreeMap, path::Path};

use serde_json::{json, Map, Value};

use crate::{
    error::{BctError, Result},
    execution::{value::element_count, EngineValue, NumericArray, Parameters},
};

/// Escapes a string for a single-quoted MATLAB literal.
pub(crate) fn quote(s: &str) -> String {
    s.replace('\'', "''")
}

pub(crate) fn encode_parameters(parameters: &Parameters) -> Value {
    let mut obj = Map::new();
    for (name, value) in parameters {
        let encoded = match value {
            EngineValue::Scalar(v) => encode_entry(&[1, 1], &[*v]),
            EngineValue::Array(a) => match a.shape() {
                // MATLAB has no 1-D arrays.
                [n] => encode_entry(&[1, *n], a.data()),
                shape => encode_entry(shape, a.data()),
            },
        };
        obj.insert(name.clone(), encoded);
    }
    Value::Object(obj)
}

fn encode_entry(shape: &[usize], data: &[f64]) -> Value {
    let indices = |pred: fn(f64) -> bool| -> Vec<usize> {
        data.iter()
            .enumerate()
            .filter(|(_, v)| pred(**v))
            .map(|(i, _)| i)
            .collect()
    };
    let finite: Vec<f64> = data
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect();
    json!({
        "shape": shape,
        "data": finite,
        "posinf": indices(|v| v == f64::INFINITY),
        "neginf": indices(|v| v == f64::NEG_INFINITY),
        "nan": indices(f64::is_nan),
    })
}

pub(crate) fn decode_results(text: &str) -> Result<BTreeMap<String, EngineValue>> {
    let root: Value = serde_json::from_str(text)?;
    let obj = match root {
        Value::Object(obj) => obj,
        // jsonencode(struct()) with no fields is "{}", but an empty [] shows up too
        Value::Array(items) if items.is_empty() => Map::new(),
        other => {
            return Err(BctError::MalformedData(format!(
                "results must be an object, got {other}"
            )))
        }
    };
    obj.into_iter()
        .map(|(name, entry)| decode_entry(&entry).map(|v| (name, v)))
        .collect()
}

fn decode_entry(entry: &Value) -> Result<EngineValue> {
    let shape = number_list(entry.get("shape"))?
        .into_iter()
        .map(|d| as_index(d, "shape"))
        .collect::<Result<Vec<usize>>>()?;
    let mut data = number_list(entry.get("data"))?;
    for (field, fill) in [
        ("posinf", f64::INFINITY),
        ("neginf", f64::NEG_INFINITY),
        ("nan", f64::NAN),
    ] {
        for idx in number_list(entry.get(field))? {
            let slot = data.get_mut(as_index(idx, field)?).ok_or_else(|| {
                BctError::MalformedData(format!("{field} index {idx} out of range"))
            })?;
            *slot = fill;
        }
    }
    if element_count(&shape)? == 1 && data.len() == 1 {
        return Ok(EngineValue::Scalar(data[0]));
    }
    NumericArray::new(shape, data).map(EngineValue::Array)
}

fn as_index(v: f64, field: &str) -> Result<usize> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < usize::MAX as f64 {
        Ok(v as usize)
    } else {
        Err(BctError::MalformedData(format!(
            "{field} entry {v} is not a valid index"
        )))
    }
}

// jsonencode writes a one-element vector as a bare number.
fn number_list(value: Option<&Value>) -> Result<Vec<f64>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Number(n)) => Ok(vec![n.as_f64().unwrap_or(f64::NAN)]),
        Some(Value::Bool(b)) => Ok(vec![if *b { 1.0 } else { 0.0 }]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
                Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
                Value::Null => Ok(f64::NAN),
                other => Err(BctError::MalformedData(format!("expected a number, got {other}"))),
            })
            .collect(),
        Some(other) => Err(BctError::MalformedData(format!(
            "expected a number list, got {other}"
        ))),
    }
}

/// Builds the script run by the interpreter: load parameters, run the
/// snippet, dump every numeric workspace variable. Inputs are dumped too, so
/// a snippet may overwrite its input and return it under the same name.
pub(crate) fn wrapper(
    search_paths: &[impl AsRef<Path>],
    parameters_file: &Path,
    results_file: &Path,
    code: &str,
) -> String {
    let mut s = String::new();
    for p in search_paths {
        s.push_str(&format!("addpath('{}');\n", quote(&p.as_ref().to_string_lossy())));
    }
    s.push_str(&format!(
        "bct_in__ = jsondecode(fileread('{}'));\n",
        quote(&parameters_file.to_string_lossy())
    ));
    s.push_str(
        "bct_names__ = fieldnames(bct_in__);\n\
         for bct_i__ = 1:numel(bct_names__)\n\
         \x20 bct_e__ = bct_in__.(bct_names__{bct_i__});\n\
         \x20 bct_s__ = bct_e__.shape(:)';\n\
         \x20 bct_f__ = bct_e__.data(:)';\n\
         \x20 bct_f__(bct_e__.posinf + 1) = Inf;\n\
         \x20 bct_f__(bct_e__.neginf + 1) = -Inf;\n\
         \x20 bct_f__(bct_e__.nan + 1) = NaN;\n\
         \x20 bct_v__ = permute(reshape(bct_f__, fliplr(bct_s__)), numel(bct_s__):-1:1);\n\
         \x20 eval([bct_names__{bct_i__} ' = bct_v__;']);\n\
         end\n\
         clear bct_in__ bct_names__ bct_i__ bct_e__ bct_s__ bct_f__ bct_v__;\n",
    );
    s.push_str("try\n");
    for line in code.lines() {
        s.push_str("  ");
        s.push_str(line);
        s.push('\n');
    }
    s.push_str(
        "catch bct_err__\n\
         \x20 fprintf(2, '%s\\n', bct_err__.message);\n\
         \x20 exit(1);\n\
         end\n",
    );
    s.push_str(
        "bct_out__ = struct();\n\
         bct_vars__ = who;\n\
         for bct_i__ = 1:numel(bct_vars__)\n\
         \x20 bct_name__ = bct_vars__{bct_i__};\n\
         \x20 if strcmp(bct_name__, 'ans') || ~isempty(regexp(bct_name__, '__$', 'once'))\n\
         \x20   continue;\n\
         \x20 end\n\
         \x20 bct_v__ = eval(bct_name__);\n\
         \x20 if ~(isnumeric(bct_v__) || islogical(bct_v__))\n\
         \x20   continue;\n\
         \x20 end\n\
         \x20 bct_d__ = double(bct_v__);\n\
         \x20 bct_f__ = reshape(permute(bct_d__, ndims(bct_d__):-1:1), 1, []);\n\
         \x20 bct_e__ = struct();\n\
         \x20 bct_e__.shape = size(bct_d__);\n\
         \x20 bct_e__.posinf = find(bct_f__ == Inf) - 1;\n\
         \x20 bct_e__.neginf = find(bct_f__ == -Inf) - 1;\n\
         \x20 bct_e__.nan = find(isnan(bct_f__)) - 1;\n\
         \x20 bct_f__(~isfinite(bct_f__)) = 0;\n\
         \x20 bct_e__.data = bct_f__;\n\
         \x20 bct_out__.(bct_name__) = bct_e__;\n\
         end\n",
    );
    s.push_str(&format!(
        "bct_fid__ = fopen('{}', 'w');\n\
         fprintf(bct_fid__, '%s', jsonencode(bct_out__));\n\
         fclose(bct_fid__);\n\
         exit(0);\n",
        quote(&results_file.to_string_lossy())
    ));
    s
}
