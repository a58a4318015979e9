use std::sync::LazyLock;

use plsfix::fix_text;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    consts::{
        EMPTY_RECONCILE_DETAILS, EMPTY_RECONCILE_OBJECT, PLACEHOLDER, QUANTITY_WORDS, UNKNOWN,
    },
    scene::record::SceneRecord,
};

/// Counts already written into a legacy `details` string:
/// `"3 chairs"`, `"2x lamps"`, `"chairs (4)"`, `"count: 6"` or just `"5"`.
static DETAILS_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+\s|^\d+x\s|\(\d+\)|:\s*\d+|^\d+$").expect("valid count pattern")
});

static LEADING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s").expect("valid leading count pattern"));

static QUANTITY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let words = QUANTITY_WORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{words})\b")).expect("valid quantity word pattern")
});

/// A raw model record, classified by the keys it carries.
///
/// Two prompt generations are in the wild: the current one emits
/// `category`/`object`, the older one `identifier`/`details`. Nothing past
/// [`reconcile`] sees this type.
#[derive(Debug)]
enum RawRecord<'a> {
    Current(&'a Map<String, Value>),
    Legacy(&'a Map<String, Value>),
    /// A bare string in place of an object, read as a legacy identifier.
    Identifier(&'a str),
    Malformed,
}

impl<'a> RawRecord<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("category") && map.contains_key("object") => {
                RawRecord::Current(map)
            }
            Value::Object(map) => RawRecord::Legacy(map),
            Value::String(identifier) => RawRecord::Identifier(identifier),
            _ => RawRecord::Malformed,
        }
    }

    fn normalize(self) -> SceneRecord {
        match self {
            RawRecord::Current(map) => SceneRecord::new(
                field(map, "category").unwrap_or_else(|| UNKNOWN.to_string()),
                field(map, "object").unwrap_or_else(|| UNKNOWN.to_string()),
                field(map, "details").unwrap_or_default(),
                field(map, "position").unwrap_or_else(|| PLACEHOLDER.to_string()),
                field(map, "estimated_cost").unwrap_or_else(|| PLACEHOLDER.to_string()),
            ),
            RawRecord::Legacy(map) => {
                let identifier = field(map, "identifier").unwrap_or_else(|| UNKNOWN.to_string());
                let details = field(map, "details").unwrap_or_default();
                let details = infer_quantity(&identifier, details);

                SceneRecord::new(
                    UNKNOWN,
                    identifier,
                    details,
                    PLACEHOLDER,
                    field(map, "estimated_cost").unwrap_or_else(|| PLACEHOLDER.to_string()),
                )
            }
            RawRecord::Identifier(identifier) => {
                let identifier = clean_text(identifier).unwrap_or_else(|| UNKNOWN.to_string());
                let details = infer_quantity(&identifier, String::new());
                SceneRecord::new(UNKNOWN, identifier, details, PLACEHOLDER, PLACEHOLDER)
            }
            RawRecord::Malformed => {
                SceneRecord::new(UNKNOWN, UNKNOWN, "", PLACEHOLDER, PLACEHOLDER)
            }
        }
    }
}

fn clean_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(fix_text(text, None).trim().to_string())
}

/// Reads a text field, coercing numbers and booleans to strings.
///
/// Missing, null, blank or structured values read as `None` so the caller
/// can substitute its default.
fn field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => clean_text(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Whether a legacy `details` string already states how many items there are.
pub fn details_has_count(details: &str) -> bool {
    DETAILS_COUNT.is_match(details.trim())
}

/// The count an identifier starts with, as in `"3 Chairs"`.
pub fn leading_count(identifier: &str) -> Option<u32> {
    LEADING_COUNT
        .captures(identifier.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Rough plural check on the last word of a name: `-s`, `-es` and `-ies`
/// endings count, `-ss` does not.
pub fn is_plural_noun(name: &str) -> bool {
    let Some(last) = name.split_whitespace().last() else {
        return false;
    };
    let word = last
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    word.chars().count() > 1 && word.ends_with('s') && !word.ends_with("ss")
}

pub fn has_quantity_word(details: &str) -> bool {
    QUANTITY_WORD.is_match(details)
}

/// Best-effort quantity hint for legacy records.
///
/// Legacy prompts did not require a count. When neither `details` nor the
/// identifier carries one and the identifier reads as a plural, `details`
/// is prefixed with `"Multiple "` so the report does not imply a single
/// item. This is a text heuristic and will misfire on words such as
/// `"Series"`, `"Bus"` or `"Glasses"` (a single pair); it never removes information.
pub fn infer_quantity(identifier: &str, details: String) -> String {
    if details_has_count(&details) || leading_count(identifier).is_some() {
        return details;
    }

    if is_plural_noun(identifier) && !has_quantity_word(&details) {
        if details.is_empty() {
            return "Multiple".to_string();
        }
        return format!("Multiple {details}");
    }

    details
}

/// Normalizes raw model records into [`SceneRecord`]s.
///
/// Never fails: every record is handled on its own and every missing or
/// mistyped field takes its default. An empty input yields a single
/// placeholder record so callers always have something to render.
pub fn reconcile(raw_records: &[Value]) -> Vec<SceneRecord> {
    if raw_records.is_empty() {
        debug!("model returned no scene records, using placeholder");
        return vec![SceneRecord::placeholder(
            EMPTY_RECONCILE_OBJECT,
            EMPTY_RECONCILE_DETAILS,
        )];
    }

    raw_records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let record = RawRecord::classify(raw);
            if matches!(record, RawRecord::Malformed) {
                debug!(index, "scene record is not an object, defaulting every field");
            }
            record.normalize()
        })
        .collect()
}

/// Like [`reconcile`], for a payload value that may be absent or not an array.
pub fn reconcile_value(raw: Option<&Value>) -> Vec<SceneRecord> {
    match raw.and_then(Value::as_array) {
        Some(records) => reconcile(records),
        None => reconcile(&[]),
    }
}
