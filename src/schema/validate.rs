//! Bounds checking for imported chart JSON
//!
//! Validation walks the raw `serde_json::Value` so every failure can name
//! the exact field path (`rows[0][2].fingers[1].string`). While walking it
//! fills in the defaults older exports lack, then hands the patched value
//! to serde. Nothing is applied anywhere until the whole document passes.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use super::ImportError;
use crate::models::chord::STRING_COUNT;
use crate::models::ids::{new_id, now};
use crate::models::limits::{
    MAX_BARS, MAX_BEATS, MAX_DESCRIPTION_LEN, MAX_ID_LEN, MAX_NAME_LEN, MAX_ROWS,
    MAX_SUBTITLE_LEN, MAX_TITLE_LEN,
};
use crate::models::{slots_per_bar, ChordChart, Finger, Stroke, Subdivision, TimeSignature};

/// Imported rows may be wider than the editor's own control allows
pub const MAX_IMPORT_CHORDS_PER_ROW: i64 = 12;

const MAX_FRET: i64 = crate::models::limits::MAX_FRET as i64;

type Object = Map<String, Value>;

/// Validate a parsed chart document and build the model from it
pub fn validate_chart(mut value: Value) -> Result<ChordChart, ImportError> {
    let obj = expect_object(&mut value, "")?;

    string_field(obj, "id", "", MAX_ID_LEN, new_id)?;
    string_field(obj, "name", "", MAX_NAME_LEN, String::new)?;
    string_field(obj, "title", "", MAX_TITLE_LEN, String::new)?;
    string_field(obj, "description", "", MAX_DESCRIPTION_LEN, String::new)?;
    let chords_per_row = int_field(obj, "chordsPerRow", "", 1, MAX_IMPORT_CHORDS_PER_ROW, None)?;

    let rows = required_array(obj, "rows", "", MAX_ROWS)?;
    if rows.is_empty() {
        return Err(schema("rows", "must contain at least one row"));
    }
    for (r, row) in rows.iter_mut().enumerate() {
        let row_path = format!("rows[{}]", r);
        let diagrams = row
            .as_array_mut()
            .ok_or_else(|| schema(&row_path, "expected an array of chord diagrams"))?;
        if diagrams.len() as i64 > MAX_IMPORT_CHORDS_PER_ROW {
            return Err(schema(
                &row_path,
                format!(
                    "has {} diagrams, maximum is {}",
                    diagrams.len(),
                    MAX_IMPORT_CHORDS_PER_ROW
                ),
            ));
        }
        if diagrams.len() as i64 > chords_per_row {
            log::warn!(
                "{} has {} diagrams but chordsPerRow is {}; extra diagrams dropped",
                row_path,
                diagrams.len(),
                chords_per_row
            );
        }
        for (s, diagram) in diagrams.iter_mut().enumerate() {
            validate_diagram(diagram, &format!("{}[{}]", row_path, s))?;
        }
    }

    for (i, subtitle) in optional_array(obj, "rowSubtitles", "", MAX_ROWS)?
        .iter()
        .enumerate()
    {
        let path = format!("rowSubtitles[{}]", i);
        let text = subtitle
            .as_str()
            .ok_or_else(|| schema(&path, "expected a string"))?;
        check_len(text, MAX_SUBTITLE_LEN, &path)?;
    }

    match obj.get_mut("strummingPattern") {
        None | Some(Value::Null) => {
            obj.insert("strummingPattern".to_string(), Value::Null);
        }
        Some(pattern) => validate_pattern(pattern, "strummingPattern")?,
    }

    timestamp_field(obj, "createdAt")?;
    timestamp_field(obj, "updatedAt")?;

    let mut chart: ChordChart =
        serde_json::from_value(value).map_err(|e| schema("(root)", e.to_string()))?;

    chart.ensure_shape();
    if let Some(pattern) = chart.strumming_pattern.as_mut() {
        if pattern.beats.len() != pattern.required_len() {
            log::warn!(
                "Imported strumming pattern has {} beats, expected {}; re-slicing",
                pattern.beats.len(),
                pattern.required_len()
            );
        }
        pattern.normalize();
    }
    Ok(chart)
}

// ============================================================================
// Diagrams
// ============================================================================

fn validate_diagram(value: &mut Value, path: &str) -> Result<(), ImportError> {
    let obj = expect_object(value, path)?;

    string_field(obj, "id", path, MAX_ID_LEN, new_id)?;
    string_field(obj, "name", path, MAX_NAME_LEN, String::new)?;
    int_field(obj, "frets", path, 1, MAX_FRET, Some(4))?;
    int_field(obj, "startFret", path, 1, MAX_FRET, Some(1))?;

    for (i, finger) in optional_array(obj, "fingers", path, usize::MAX)?
        .iter_mut()
        .enumerate()
    {
        let fpath = format!("{}[{}]", child(path, "fingers"), i);
        let f = expect_object(finger, &fpath)?;
        int_field(f, "string", &fpath, 1, STRING_COUNT as i64, None)?;
        int_field(f, "fret", &fpath, 0, MAX_FRET, None)?;
    }

    for (i, barre) in optional_array(obj, "barres", path, usize::MAX)?
        .iter_mut()
        .enumerate()
    {
        let bpath = format!("{}[{}]", child(path, "barres"), i);
        let b = expect_object(barre, &bpath)?;
        int_field(b, "fret", &bpath, 0, MAX_FRET, None)?;
        let from = int_field(b, "fromString", &bpath, 1, STRING_COUNT as i64, None)?;
        let to = int_field(b, "toString", &bpath, 1, STRING_COUNT as i64, None)?;
        if from == to {
            return Err(schema(&bpath, "barre must span at least two strings"));
        }
        b.insert("fromString".to_string(), Value::from(from.max(to)));
        b.insert("toString".to_string(), Value::from(from.min(to)));
    }

    for key in ["mutedStrings", "openStrings"] {
        for (i, string) in optional_array(obj, key, path, usize::MAX)?.iter().enumerate() {
            let spath = format!("{}[{}]", child(path, key), i);
            check_int(string, &spath, 1, STRING_COUNT as i64)?;
        }
    }

    for (i, label) in optional_array(obj, "fingerLabels", path, usize::MAX)?
        .iter_mut()
        .enumerate()
    {
        let lpath = format!("{}[{}]", child(path, "fingerLabels"), i);
        let l = expect_object(label, &lpath)?;
        int_field(l, "string", &lpath, 1, STRING_COUNT as i64, None)?;
        int_field(l, "finger", &lpath, Finger::Thumb as i64, Finger::Pinky as i64, None)?;
    }

    Ok(())
}

// ============================================================================
// Strumming pattern
// ============================================================================

fn validate_pattern(value: &mut Value, path: &str) -> Result<(), ImportError> {
    let obj = expect_object(value, path)?;

    let bars = int_field(obj, "bars", path, 1, MAX_BARS as i64, Some(1))?;

    // Files written before meters were selectable have no timeSignature
    let time_signature = match obj.get("timeSignature") {
        None | Some(Value::Null) => TimeSignature::FourFour,
        Some(Value::String(s)) => TimeSignature::parse(s).ok_or_else(|| {
            schema(
                &child(path, "timeSignature"),
                format!("unsupported time signature '{}' (expected 4/4, 3/4 or 6/8)", s),
            )
        })?,
        Some(_) => return Err(schema(&child(path, "timeSignature"), "expected a string")),
    };
    obj.insert(
        "timeSignature".to_string(),
        Value::from(time_signature.as_str()),
    );

    // Likewise for files written before subdivision existed (eighth notes)
    let strokes = int_field(
        obj,
        "subdivision",
        path,
        Subdivision::Eighth as i64,
        Subdivision::Sixteenth as i64,
        Some(Subdivision::Eighth as i64),
    )?;
    let subdivision = Subdivision::from_strokes(strokes as u64)
        .ok_or_else(|| schema(&child(path, "subdivision"), "expected 2, 3 or 4"))?;

    // Beats are re-sliced to this length after import, so bound it here
    let len = bars as usize * slots_per_bar(time_signature, subdivision);
    if len > MAX_BEATS {
        return Err(schema(
            &child(path, "bars"),
            format!(
                "{} bars of {} at {} strokes per beat is {} beats, maximum is {}",
                bars, time_signature, strokes, len, MAX_BEATS
            ),
        ));
    }

    obj.insert(
        "beatsPerBar".to_string(),
        Value::from(time_signature.beats() as u64),
    );

    for (i, beat) in optional_array(obj, "beats", path, MAX_BEATS)?
        .iter_mut()
        .enumerate()
    {
        let bpath = format!("{}[{}]", child(path, "beats"), i);
        let b = expect_object(beat, &bpath)?;

        match b.get("stroke") {
            None | Some(Value::Null) => {
                b.insert("stroke".to_string(), Value::Null);
            }
            Some(Value::String(s)) if Stroke::parse(s).is_some() => {}
            Some(other) => {
                return Err(schema(
                    &child(&bpath, "stroke"),
                    format!("unrecognized stroke {} (expected up, down, rest or null)", other),
                ))
            }
        }

        match b.get("noteValue") {
            None | Some(Value::Null) => {
                b.insert("noteValue".to_string(), Value::from("full"));
            }
            Some(Value::String(s)) if s == "full" || s == "half" => {}
            Some(other) => {
                return Err(schema(
                    &child(&bpath, "noteValue"),
                    format!("unrecognized note value {} (expected full or half)", other),
                ))
            }
        }

        // Display label only; recomputed from position after import
        b.remove("beatType");
    }

    Ok(())
}

// ============================================================================
// Field helpers
// ============================================================================

fn schema(path: &str, message: impl Into<String>) -> ImportError {
    ImportError::Schema {
        path: if path.is_empty() { "(root)".to_string() } else { path.to_string() },
        message: message.into(),
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn expect_object<'a>(value: &'a mut Value, path: &str) -> Result<&'a mut Object, ImportError> {
    value
        .as_object_mut()
        .ok_or_else(|| schema(path, "expected an object"))
}

fn check_len(text: &str, max: usize, path: &str) -> Result<(), ImportError> {
    let len = text.chars().count();
    if len > max {
        return Err(schema(path, format!("length {} exceeds maximum of {}", len, max)));
    }
    Ok(())
}

fn check_int(value: &Value, path: &str, min: i64, max: i64) -> Result<i64, ImportError> {
    let n = value
        .as_i64()
        .ok_or_else(|| schema(path, format!("expected an integer, got {}", value)))?;
    if n < min || n > max {
        return Err(schema(path, format!("{} is outside {}..={}", n, min, max)));
    }
    Ok(n)
}

/// Optional string with a length cap; absent or null takes `default`
fn string_field(
    obj: &mut Object,
    key: &str,
    path: &str,
    max_len: usize,
    default: impl FnOnce() -> String,
) -> Result<(), ImportError> {
    let field_path = child(path, key);
    match obj.get(key) {
        None | Some(Value::Null) => {
            obj.insert(key.to_string(), Value::from(default()));
        }
        Some(Value::String(s)) => check_len(s, max_len, &field_path)?,
        Some(_) => return Err(schema(&field_path, "expected a string")),
    }
    Ok(())
}

/// Bounded integer; absent or null takes `default`, or fails when there is none
fn int_field(
    obj: &mut Object,
    key: &str,
    path: &str,
    min: i64,
    max: i64,
    default: Option<i64>,
) -> Result<i64, ImportError> {
    let field_path = child(path, key);
    match (obj.get(key), default) {
        (None | Some(Value::Null), Some(d)) => {
            obj.insert(key.to_string(), Value::from(d));
            Ok(d)
        }
        (None | Some(Value::Null), None) => Err(schema(&field_path, "is required")),
        (Some(v), _) => check_int(v, &field_path, min, max),
    }
}

fn required_array<'a>(
    obj: &'a mut Object,
    key: &str,
    path: &str,
    max_len: usize,
) -> Result<&'a mut Vec<Value>, ImportError> {
    let field_path = child(path, key);
    match obj.get_mut(key) {
        Some(Value::Array(items)) => {
            if items.len() > max_len {
                return Err(schema(
                    &field_path,
                    format!("has {} entries, maximum is {}", items.len(), max_len),
                ));
            }
            Ok(items)
        }
        None | Some(Value::Null) => Err(schema(&field_path, "is required")),
        Some(_) => Err(schema(&field_path, "expected an array")),
    }
}

/// Array that older files may omit; absent or null becomes `[]`
fn optional_array<'a>(
    obj: &'a mut Object,
    key: &str,
    path: &str,
    max_len: usize,
) -> Result<&'a mut Vec<Value>, ImportError> {
    if matches!(obj.get(key), None | Some(Value::Null)) {
        obj.insert(key.to_string(), Value::Array(Vec::new()));
    }
    required_array(obj, key, path, max_len)
}

/// RFC 3339 string or epoch milliseconds; absent means now
fn timestamp_field(obj: &mut Object, key: &str) -> Result<(), ImportError> {
    let parsed: DateTime<Utc> = match obj.get(key) {
        None | Some(Value::Null) => now(),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| schema(key, format!("invalid timestamp '{}': {}", s, e)))?
            .with_timezone(&Utc),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| schema(key, format!("invalid timestamp {}", n)))?,
        Some(_) => return Err(schema(key, "expected an RFC 3339 string or epoch milliseconds")),
    };
    obj.insert(key.to_string(), Value::from(parsed.to_rfc3339()));
    Ok(())
}
