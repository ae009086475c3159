//! Tagged decoding of upstream event frames.

use serde_json::{Map, Value};

/// Sentinel some upstreams send as the last `data:` record.
pub const DONE_SENTINEL: &str = "[DONE]";

/// How deep [`collect_file_refs`] walks into a frame.
const MAX_WALK_DEPTH: usize = 8;

/// Reference to a document seen in stream metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_id: Option<String>,
    pub name_hint: Option<String>,
}

impl FileRef {
    /// Dedup key: the file id, or the filename for entries without one.
    pub fn key(&self) -> Option<&str> {
        self.file_id.as_deref().or(self.name_hint.as_deref())
    }
}

/// One classified `data:` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamFrame {
    /// Incremental answer text.
    TextDelta(String),
    /// Full answer text in one field.
    FullText(String),
    /// Tool output or citation carrying file references.
    ToolResult(Vec<FileRef>),
    /// The upstream finished the response.
    Completed(Vec<FileRef>),
    /// The upstream reported an error or an incomplete response.
    Failed(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Valid JSON of a shape the relay does not use.
    Unknown,
}

impl UpstreamFrame {
    /// Classifies a `data:` payload. Returns `None` for malformed JSON.
    pub fn classify(payload: &str) -> Option<Self> {
        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            return Some(Self::Done);
        }

        let value: Value = serde_json::from_str(payload).ok()?;
        let Some(obj) = value.as_object() else {
            return Some(Self::Unknown);
        };
        let kind = obj.get("type").and_then(Value::as_str);

        match kind {
            Some("response.completed" | "response.done") => {
                return Some(Self::Completed(collect_file_refs(&value)));
            }
            Some("error" | "response.failed" | "response.incomplete") => {
                return Some(Self::Failed(failure_message(obj, kind.unwrap_or("error"))));
            }
            _ => {}
        }

        if let Some(delta) = obj.get("delta").and_then(Value::as_str) {
            if kind.is_none_or(|k| k.ends_with("output_text.delta")) {
                return Some(Self::TextDelta(delta.to_string()));
            }
        }

        if let Some(text) = obj.get("output_text").and_then(Value::as_str) {
            return Some(Self::FullText(text.to_string()));
        }

        let refs = collect_file_refs(&value);
        if !refs.is_empty() {
            return Some(Self::ToolResult(refs));
        }

        Some(Self::Unknown)
    }
}

fn failure_message(obj: &Map<String, Value>, kind: &str) -> String {
    let pick = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);

    pick(obj.get("message"))
        .or_else(|| pick(obj.get("error").and_then(|e| e.get("message"))))
        .or_else(|| {
            let response = obj.get("response")?;
            pick(response.get("error").and_then(|e| e.get("message"))).or_else(|| {
                pick(
                    response
                        .get("incomplete_details")
                        .and_then(|d| d.get("reason")),
                )
                .map(|reason| format!("response incomplete: {reason}"))
            })
        })
        .unwrap_or_else(|| format!("upstream reported {kind}"))
}

/// Collects every file reference in a frame: entries of any `results`
/// array and `file_citation` annotations, at any nesting depth.
///
/// An entry may carry a flat `file_id`/`filename` pair or a nested
/// `file: {id, filename | name}` descriptor.
pub fn collect_file_refs(value: &Value) -> Vec<FileRef> {
    let mut out = Vec::new();
    walk(value, 0, &mut out);
    out
}

fn walk(value: &Value, depth: usize, out: &mut Vec<FileRef>) {
    if depth > MAX_WALK_DEPTH {
        return;
    }
    match value {
        Value::Object(obj) => {
            if let Some(results) = obj.get("results").and_then(Value::as_array) {
                out.extend(results.iter().filter_map(file_ref_from_entry));
            }
            if obj.get("type").and_then(Value::as_str) == Some("file_citation") {
                out.extend(file_ref_from_entry(value));
            }
            for (key, child) in obj {
                if key != "results" {
                    walk(child, depth + 1, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn file_ref_from_entry(entry: &Value) -> Option<FileRef> {
    let obj = entry.as_object()?;
    let text = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let nested = obj.get("file");

    let file_id = text(obj.get("file_id"))
        .or_else(|| text(nested.and_then(|f| f.get("id"))))
        .or_else(|| text(nested.and_then(|f| f.get("file_id"))));
    let name_hint = text(obj.get("filename"))
        .or_else(|| text(obj.get("file_name")))
        .or_else(|| text(nested.and_then(|f| f.get("filename"))))
        .or_else(|| text(nested.and_then(|f| f.get("name"))));

    if file_id.is_none() && name_hint.is_none() {
        None
    } else {
        Some(FileRef { file_id, name_hint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fref(id: Option<&str>, name: Option<&str>) -> FileRef {
        FileRef {
            file_id: id.map(str::to_string),
            name_hint: name.map(str::to_string),
        }
    }

    #[test]
    fn text_frames() {
        assert_eq!(
            UpstreamFrame::classify(r#"{"type":"response.output_text.delta","delta":"Hel"}"#),
            Some(UpstreamFrame::TextDelta("Hel".into()))
        );
        assert_eq!(
            UpstreamFrame::classify(r#"{"delta":"lo"}"#),
            Some(UpstreamFrame::TextDelta("lo".into()))
        );
        assert_eq!(
            UpstreamFrame::classify(r#"{"output_text":"Hello"}"#),
            Some(UpstreamFrame::FullText("Hello".into()))
        );
    }

    #[test]
    fn non_text_deltas_are_not_answer_text() {
        assert_eq!(
            UpstreamFrame::classify(
                r#"{"type":"response.function_call_arguments.delta","delta":"{\"q\""}"#
            ),
            Some(UpstreamFrame::Unknown)
        );
    }

    #[test]
    fn done_and_malformed() {
        assert_eq!(UpstreamFrame::classify("[DONE]"), Some(UpstreamFrame::Done));
        assert_eq!(UpstreamFrame::classify("{not json"), None);
        assert_eq!(UpstreamFrame::classify("42"), Some(UpstreamFrame::Unknown));
        assert_eq!(
            UpstreamFrame::classify(r#"{"type":"response.in_progress"}"#),
            Some(UpstreamFrame::Unknown)
        );
    }

    #[test]
    fn tool_results_flat_and_nested() {
        let frame = UpstreamFrame::classify(
            r#"{"type":"response.output_item.done","item":{"type":"file_search_call","results":[
                {"file_id":"file-1","filename":"a.pdf","score":0.9},
                {"file":{"id":"file-2","name":"b.pdf"}},
                {"file_id":"file-3"},
                {"score":0.1}
            ]}}"#,
        );
        assert_eq!(
            frame,
            Some(UpstreamFrame::ToolResult(vec![
                fref(Some("file-1"), Some("a.pdf")),
                fref(Some("file-2"), Some("b.pdf")),
                fref(Some("file-3"), None),
            ]))
        );
    }

    #[test]
    fn top_level_results_and_citations() {
        let frame = UpstreamFrame::classify(
            r#"{"type":"file_search","results":[{"filename":"only-name.md"}]}"#,
        );
        assert_eq!(
            frame,
            Some(UpstreamFrame::ToolResult(vec![fref(None, Some("only-name.md"))]))
        );

        let frame = UpstreamFrame::classify(
            r#"{"type":"response.output_text.annotation.added","annotation":{"type":"file_citation","file_id":"file-9","filename":"c.pdf","index":3}}"#,
        );
        assert_eq!(
            frame,
            Some(UpstreamFrame::ToolResult(vec![fref(Some("file-9"), Some("c.pdf"))]))
        );
    }

    #[test]
    fn completed_carries_refs() {
        let frame = UpstreamFrame::classify(
            r#"{"type":"response.completed","response":{"output":[{"type":"file_search_call","results":[{"file_id":"file-1"}]}]}}"#,
        );
        assert_eq!(
            frame,
            Some(UpstreamFrame::Completed(vec![fref(Some("file-1"), None)]))
        );
    }

    #[test]
    fn failure_messages() {
        assert_eq!(
            UpstreamFrame::classify(r#"{"type":"error","message":"rate limited"}"#),
            Some(UpstreamFrame::Failed("rate limited".into()))
        );
        assert_eq!(
            UpstreamFrame::classify(
                r#"{"type":"response.failed","response":{"error":{"message":"server error"}}}"#
            ),
            Some(UpstreamFrame::Failed("server error".into()))
        );
        assert_eq!(
            UpstreamFrame::classify(
                r#"{"type":"response.incomplete","response":{"incomplete_details":{"reason":"max_output_tokens"}}}"#
            ),
            Some(UpstreamFrame::Failed("response incomplete: max_output_tokens".into()))
        );
        assert_eq!(
            UpstreamFrame::classify(r#"{"type":"response.failed"}"#),
            Some(UpstreamFrame::Failed("upstream reported response.failed".into()))
        );
    }
}
