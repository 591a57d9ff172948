//! Path-addressable JSON document.
//!
//! A [`Document`] wraps one `serde_json::Value` tree and addresses fields by
//! path. The canonical path form is the JSON Pointer (`/a/b/0`); the
//! user-facing dotted and bracketed forms (`a.b`, `a[0].b`, `a["x.y"]`) are
//! normalized into it by [`format_path`]. All document operations accept
//! either form, with a zero-normalization fast path for canonical input.

use std::borrow::Cow;

use serde_json::{Map, Value};

// =============================================================================
// Path normalization
// =============================================================================

/// Converts a user-facing field path into the canonical JSON Pointer form.
///
/// An input that is empty or already starts with `/` passes through
/// unchanged, which makes the function idempotent:
/// `format_path(format_path(p)) == format_path(p)` for every input.
///
/// Raw input is split into segments on dots and bracket groups:
///
/// - `a.b` and `a[b]` both become `/a/b`
/// - `a[0].b` becomes `/a/0/b`
/// - bracket content in single or double quotes is unquoted, so `a["x.y"]`
///   yields the single segment `x.y`; no escape processing happens inside
///   the quotes
/// - empty segments (consecutive dots, empty brackets) are dropped
///
/// Segment text containing `~` or `/` is escaped per JSON Pointer (`~0`,
/// `~1`) when the canonical form is emitted.
pub fn format_path(raw: &str) -> String {
    if is_canonical(raw) {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len() + 1);
    let mut rest = raw;
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('[') {
            let (content, tail) = match body.find(']') {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            };
            append_segment(&mut out, unquote(content));
            rest = tail.strip_prefix('.').unwrap_or(tail);
        } else {
            let cut = rest.find(['.', '[']).unwrap_or(rest.len());
            append_segment(&mut out, &rest[..cut]);
            rest = match rest[cut..].strip_prefix('.') {
                Some(tail) => tail,
                None => &rest[cut..],
            };
        }
    }
    out
}

fn is_canonical(path: &str) -> bool {
    path.is_empty() || path.starts_with('/')
}

fn unquote(content: &str) -> &str {
    let bytes = content.as_bytes();
    let quoted = bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0];
    if quoted {
        &content[1..content.len() - 1]
    } else {
        content
    }
}

fn append_segment(out: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    out.push('/');
    if segment.contains(['~', '/']) {
        for ch in segment.chars() {
            match ch {
                '~' => out.push_str("~0"),
                '/' => out.push_str("~1"),
                other => out.push(other),
            }
        }
    } else {
        out.push_str(segment);
    }
}

fn unescape_token(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

/// An array can only be indexed by a run of ASCII digits or the append
/// marker `-`; anything else addresses an object key.
fn is_index_token(token: &str) -> bool {
    token == "-" || (!token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit()))
}

/// Index parsing is as strict as [`is_index_token`]: a plain digit run
/// within `usize` range. Signed forms like `+1` address object keys, not
/// elements, on reads and writes alike.
fn parse_index(token: &str) -> Option<usize> {
    if !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

// =============================================================================
// Document
// =============================================================================

/// One JSON tree with path-based field access.
///
/// Lookups return `Option`/`bool` and writes are total; a `Document` never
/// produces an error. Missing paths read as absent, and [`Document::set`]
/// creates every intermediate container it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// An empty document (`{}`).
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// True iff `path` resolves to a value.
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Borrows the value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if is_canonical(path) {
            self.resolve(path)
        } else {
            self.resolve(&format_path(path))
        }
    }

    /// Writes `value` at `path`, creating intermediate containers as needed.
    ///
    /// A missing step becomes an array when the segment indexing into it is
    /// all digits or `-`, otherwise an object. Writing an array index equal
    /// to the length appends, a larger index fills the gap with nulls, and
    /// `-` always appends. A step that cannot hold the segment (a scalar, or
    /// an array addressed by a non-numeric key) is replaced by a fresh
    /// container. `set` never fails.
    pub fn set(&mut self, path: &str, value: Value) {
        if is_canonical(path) {
            self.insert(path, value);
        } else {
            self.insert(&format_path(path), value);
        }
    }

    /// Deep equality between the value at `path` and `expected`.
    ///
    /// An absent path is `false`, never an error.
    pub fn equals_value(&self, path: &str, expected: &Value) -> bool {
        self.get(path).is_some_and(|found| found == expected)
    }

    /// True iff both paths exist and their values are deeply equal.
    pub fn equals_field(&self, left: &str, right: &str) -> bool {
        match (self.get(left), self.get(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Pointer walk over a canonical path. Allocates only when a token
    /// carries a JSON Pointer escape.
    fn resolve(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return Some(&self.root);
        }
        let mut current = &self.root;
        for raw_token in pointer[1..].split('/') {
            let token = unescape_token(raw_token);
            current = match current {
                Value::Object(map) => map.get(token.as_ref())?,
                Value::Array(items) => items.get(parse_index(token.as_ref())?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn insert(&mut self, pointer: &str, value: Value) {
        if pointer.is_empty() {
            self.root = value;
            return;
        }
        let mut current = &mut self.root;
        let mut tokens = pointer[1..].split('/').peekable();
        while let Some(raw_token) = tokens.next() {
            let token = unescape_token(raw_token);
            let last = tokens.peek().is_none();
            let index_like = is_index_token(&token);

            // Objects hold any key (including numeric ones); arrays hold
            // only index tokens; everything else is re-shaped in place.
            let array_ok = matches!(current, Value::Array(_)) && index_like;
            if !matches!(current, Value::Object(_)) && !array_ok {
                *current = if index_like {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Map::new())
                };
            }

            current = match current {
                Value::Object(map) => {
                    if last {
                        map.insert(token.into_owned(), value);
                        return;
                    }
                    map.entry(token.into_owned()).or_insert(Value::Null)
                }
                Value::Array(items) => {
                    let index = if token == "-" {
                        items.len()
                    } else {
                        match parse_index(&token) {
                            Some(index) => index,
                            // Index too large to represent; drop the write.
                            None => return,
                        }
                    };
                    if index >= items.len() {
                        match index.checked_add(1) {
                            Some(len) => items.resize(len, Value::Null),
                            // Length would overflow; drop the write.
                            None => return,
                        }
                    }
                    if last {
                        items[index] = value;
                        return;
                    }
                    &mut items[index]
                }
                _ => return,
            };
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_path_splits_dotted_segments() {
        assert_eq!(format_path("a.b.c"), "/a/b/c");
        assert_eq!(format_path("srcip"), "/srcip");
    }

    #[test]
    fn format_path_handles_brackets() {
        assert_eq!(format_path("a[b]"), "/a/b");
        assert_eq!(format_path("a[0].b"), "/a/0/b");
        assert_eq!(format_path("a[b][c]"), "/a/b/c");
        assert_eq!(format_path("[0]"), "/0");
    }

    #[test]
    fn format_path_unquotes_bracket_content() {
        assert_eq!(format_path(r#"a["x.y"]"#), "/a/x.y");
        assert_eq!(format_path("a['x.y']"), "/a/x.y");
        // Mismatched quotes stay verbatim.
        assert_eq!(format_path(r#"a["x']"#), "/a/\"x'");
    }

    #[test]
    fn format_path_drops_empty_segments() {
        assert_eq!(format_path("a..b"), "/a/b");
        assert_eq!(format_path("a[].b"), "/a/b");
        assert_eq!(format_path(".a."), "/a");
    }

    #[test]
    fn format_path_escapes_pointer_characters() {
        assert_eq!(format_path(r#"a["x/y"]"#), "/a/x~1y");
        assert_eq!(format_path(r#"a["x~y"]"#), "/a/x~0y");
    }

    #[test]
    fn format_path_passes_canonical_input_through() {
        assert_eq!(format_path("/a/b"), "/a/b");
        assert_eq!(format_path("/a/x~1y"), "/a/x~1y");
        assert_eq!(format_path(""), "");
    }

    #[test]
    fn get_reads_nested_values_by_raw_or_canonical_path() {
        let doc = Document::from_value(json!({"a": {"b": [10, 20]}}));
        assert_eq!(doc.get("a.b[1]"), Some(&json!(20)));
        assert_eq!(doc.get("/a/b/1"), Some(&json!(20)));
        assert_eq!(doc.get("a.missing"), None);
        assert_eq!(doc.get(""), Some(&json!({"a": {"b": [10, 20]}})));
    }

    #[test]
    fn get_resolves_escaped_tokens() {
        let doc = Document::from_value(json!({"x/y": 1, "x~y": 2}));
        assert_eq!(doc.get("/x~1y"), Some(&json!(1)));
        assert_eq!(doc.get("/x~0y"), Some(&json!(2)));
    }

    #[test]
    fn array_indices_are_plain_digit_runs_only() {
        let doc = Document::from_value(json!({"a": [10, 20]}));
        assert_eq!(doc.get("/a/1"), Some(&json!(20)));
        assert_eq!(doc.get("/a/01"), Some(&json!(20)));
        assert_eq!(doc.get("/a/+1"), None);

        // Reads and writes agree: `+1` is an object key on both sides.
        let mut doc = Document::from_value(json!({"a": [10, 20]}));
        doc.set("/a/+1", json!("x"));
        assert_eq!(doc.as_value(), &json!({"a": {"+1": "x"}}));
        assert_eq!(doc.get("/a/+1"), Some(&json!("x")));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut doc = Document::new();
        doc.set("a.b.c", json!(1));
        assert_eq!(doc.as_value(), &json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn set_creates_arrays_for_numeric_segments() {
        let mut doc = Document::new();
        doc.set("list.0", json!("first"));
        doc.set("list.1", json!("second"));
        assert_eq!(doc.as_value(), &json!({"list": ["first", "second"]}));
    }

    #[test]
    fn set_fills_array_gaps_with_nulls() {
        let mut doc = Document::new();
        doc.set("list.2", json!("third"));
        assert_eq!(doc.as_value(), &json!({"list": [null, null, "third"]}));
    }

    #[test]
    fn set_appends_with_dash() {
        let mut doc = Document::from_value(json!({"list": [1]}));
        doc.set("/list/-", json!(2));
        doc.set("/list/-", json!(3));
        assert_eq!(doc.as_value(), &json!({"list": [1, 2, 3]}));
    }

    #[test]
    fn set_drops_writes_at_the_maximum_array_index() {
        let mut doc = Document::from_value(json!({"list": [1]}));
        doc.set(&format!("/list/{}", usize::MAX), json!(2));
        doc.set(&format!("/list/{}/name", usize::MAX), json!("x"));
        assert_eq!(doc.as_value(), &json!({"list": [1]}));
    }

    #[test]
    fn set_replaces_scalars_on_the_way_down() {
        let mut doc = Document::from_value(json!({"a": 5}));
        doc.set("a.b", json!(1));
        assert_eq!(doc.as_value(), &json!({"a": {"b": 1}}));
    }

    #[test]
    fn set_reshapes_array_addressed_by_key() {
        let mut doc = Document::from_value(json!({"a": [1, 2]}));
        doc.set("a.name", json!("x"));
        assert_eq!(doc.as_value(), &json!({"a": {"name": "x"}}));
    }

    #[test]
    fn set_keeps_numeric_object_keys_as_keys() {
        let mut doc = Document::from_value(json!({"a": {"0": "zero"}}));
        doc.set("a.1", json!("one"));
        assert_eq!(doc.as_value(), &json!({"a": {"0": "zero", "1": "one"}}));
    }

    #[test]
    fn set_on_root_replaces_the_document() {
        let mut doc = Document::from_value(json!({"a": 1}));
        doc.set("", json!([1, 2]));
        assert_eq!(doc.as_value(), &json!([1, 2]));
    }

    #[test]
    fn into_value_hands_back_the_finished_tree() {
        let mut doc = Document::new();
        doc.set("a.b", json!(1));
        assert_eq!(doc.into_value(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn write_and_read_agree_across_path_forms() {
        let mut doc = Document::new();
        doc.set("user.name", json!("root"));
        assert_eq!(doc.get("/user/name"), Some(&json!("root")));
        doc.set("/agent/id", json!("007"));
        assert_eq!(doc.get("agent.id"), Some(&json!("007")));
    }

    #[test]
    fn equals_value_is_false_never_an_error_on_absence() {
        let doc = Document::from_value(json!({"a": 1}));
        assert!(doc.equals_value("a", &json!(1)));
        assert!(!doc.equals_value("a", &json!(2)));
        assert!(!doc.equals_value("missing", &json!(1)));
        assert!(!doc.equals_value("missing", &Value::Null));
    }

    #[test]
    fn equals_value_compares_deeply() {
        let doc = Document::from_value(json!({"a": {"b": [1, {"c": true}]}}));
        assert!(doc.equals_value("a", &json!({"b": [1, {"c": true}]})));
        assert!(!doc.equals_value("a", &json!({"b": [1, {"c": false}]})));
    }

    #[test]
    fn equals_field_requires_both_sides() {
        let doc = Document::from_value(json!({"a": 1, "b": 1, "c": 2}));
        assert!(doc.equals_field("a", "b"));
        assert!(!doc.equals_field("a", "c"));
        assert!(!doc.equals_field("a", "missing"));
        assert!(!doc.equals_field("missing", "also.missing"));
    }
}
