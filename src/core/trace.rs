//! Agent workflow trace interpretation
//!
//! The backend reports each step of its internal graph (routing, knowledge
//! base lookup, web search, answer synthesis) as a [`TraceEvent`]. This
//! module turns those events into [`TraceRecord`]s that a printer can show
//! without knowing anything about individual node kinds.
//!
//! Formatting is dispatched through a small registry of [`DetailRule`]s keyed
//! by node name. Unknown nodes fall through to a verbatim rule, so new backend
//! nodes display sensibly without changes here.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const VERDICT_SUFFICIENT: &str = "Sufficient";

// ============================================================================
// Events
// ============================================================================

/// One step of the backend agent's decision process, as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub step: u64,
    pub node_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "details_from_value")]
    pub details: Map<String, Value>,
}

fn details_from_value<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    })
}

impl TraceEvent {
    pub fn new(step: u64, node_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step,
            node_name: node_name.into(),
            description: description.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_name(&self.node_name)
    }

    /// Typed view of `details` for the node kinds that carry known fields.
    pub fn node_details(&self) -> NodeDetails {
        match self.kind() {
            NodeKind::RagLookup => NodeDetails::RagLookup {
                verdict: self
                    .details
                    .get("sufficiency_verdict")
                    .map(SufficiencyVerdict::from_value),
                summary: self.summary(),
            },
            NodeKind::WebSearch => NodeDetails::WebSearch {
                summary: self.summary(),
            },
            _ => NodeDetails::Other(self.details.clone()),
        }
    }

    fn summary(&self) -> Option<String> {
        self.details
            .get("retrieved_content_summary")
            .and_then(|value| match value {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            })
    }
}

/// Category tag derived from `node_name`. The set is open: anything the
/// backend sends that we do not know is kept as [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Router,
    RagLookup,
    WebSearch,
    Answer,
    End,
    Other(String),
}

impl NodeKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "router" => NodeKind::Router,
            "rag_lookup" => NodeKind::RagLookup,
            "web_search" => NodeKind::WebSearch,
            "answer" => NodeKind::Answer,
            "__end__" | "end" => NodeKind::End,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Router => "➡️",
            NodeKind::RagLookup => "📚",
            NodeKind::WebSearch => "🌐",
            NodeKind::Answer => "💡",
            NodeKind::End => "✅",
            NodeKind::Other(_) => "⚙️",
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Router => "router",
            NodeKind::RagLookup => "rag_lookup",
            NodeKind::WebSearch => "web_search",
            NodeKind::Answer => "answer",
            NodeKind::End => "end",
            NodeKind::Other(_) => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SufficiencyVerdict {
    Sufficient,
    /// Any other verdict; the raw text is kept for display.
    Insufficient(String),
}

impl SufficiencyVerdict {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) if text == VERDICT_SUFFICIENT => SufficiencyVerdict::Sufficient,
            Value::String(text) => SufficiencyVerdict::Insufficient(text.clone()),
            other => SufficiencyVerdict::Insufficient(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SufficiencyVerdict::Sufficient => VERDICT_SUFFICIENT,
            SufficiencyVerdict::Insufficient(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetails {
    RagLookup {
        verdict: Option<SufficiencyVerdict>,
        summary: Option<String>,
    },
    WebSearch {
        summary: Option<String>,
    },
    Other(Map<String, Value>),
}

// ============================================================================
// Display model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Cautionary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceLine {
    Outcome { tone: Tone, text: String },
    Excerpt { label: &'static str, text: String },
    /// Pretty-printed JSON of the whole details object.
    Details(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub step: u64,
    pub kind: NodeKind,
    pub node_name: String,
    pub description: String,
    pub lines: Vec<TraceLine>,
}

impl TraceRecord {
    pub fn heading(&self) -> String {
        format!("{} Step {}: {}", self.kind.icon(), self.step, self.node_name)
    }

    pub fn outcome(&self) -> Option<Tone> {
        self.lines.iter().find_map(|line| match line {
            TraceLine::Outcome { tone, .. } => Some(*tone),
            _ => None,
        })
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Formats the detail lines for one node kind.
pub trait DetailRule: Send + Sync {
    fn lines(&self, event: &TraceEvent) -> Vec<TraceLine>;
}

/// Shows the whole details object, or nothing when it is empty.
pub struct VerbatimRule;

impl DetailRule for VerbatimRule {
    fn lines(&self, event: &TraceEvent) -> Vec<TraceLine> {
        if event.details.is_empty() {
            return Vec::new();
        }
        let pretty = serde_json::to_string_pretty(&event.details)
            .unwrap_or_else(|_| Value::Object(event.details.clone()).to_string());
        vec![TraceLine::Details(pretty)]
    }
}

pub struct RagLookupRule;

impl DetailRule for RagLookupRule {
    fn lines(&self, event: &TraceEvent) -> Vec<TraceLine> {
        let NodeDetails::RagLookup { verdict, summary } = event.node_details() else {
            return VerbatimRule.lines(event);
        };
        if verdict.is_none() && summary.is_none() {
            return VerbatimRule.lines(event);
        }

        let mut lines = Vec::new();
        if let Some(verdict) = verdict {
            lines.push(match verdict {
                SufficiencyVerdict::Sufficient => TraceLine::Outcome {
                    tone: Tone::Positive,
                    text: format!(
                        "RAG Verdict: {VERDICT_SUFFICIENT} - Relevant info found in Knowledge Base."
                    ),
                },
                SufficiencyVerdict::Insufficient(raw) => TraceLine::Outcome {
                    tone: Tone::Cautionary,
                    text: format!(
                        "RAG Verdict: {raw} - No sufficient info in Knowledge Base. Diverting to Web Search."
                    ),
                },
            });
        }
        if let Some(text) = summary {
            lines.push(TraceLine::Excerpt {
                label: "Retrieved Content Summary",
                text,
            });
        }
        lines
    }
}

pub struct WebSearchRule;

impl DetailRule for WebSearchRule {
    fn lines(&self, event: &TraceEvent) -> Vec<TraceLine> {
        match event.node_details() {
            NodeDetails::WebSearch {
                summary: Some(text),
            } => vec![TraceLine::Excerpt {
                label: "Web Search Content Summary",
                text,
            }],
            _ => VerbatimRule.lines(event),
        }
    }
}

// ============================================================================
// Interpreter
// ============================================================================

pub struct TraceInterpreter {
    rules: HashMap<String, Box<dyn DetailRule>>,
    fallback: Box<dyn DetailRule>,
}

impl Default for TraceInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceInterpreter {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Box::new(VerbatimRule),
        }
        .with_rule("rag_lookup", RagLookupRule)
        .with_rule("web_search", WebSearchRule)
    }

    /// Register (or replace) the rule used for `node_name`.
    pub fn with_rule(mut self, node_name: impl Into<String>, rule: impl DetailRule + 'static) -> Self {
        self.rules.insert(node_name.into(), Box::new(rule));
        self
    }

    pub fn present(&self, events: &[TraceEvent]) -> Vec<TraceRecord> {
        if let Some(index) = first_order_violation(events) {
            warn!(
                index,
                step = events[index].step,
                previous = events[index - 1].step,
                "Trace events are not in ascending step order"
            );
        }

        events.iter().map(|event| self.record_for(event)).collect()
    }

    fn record_for(&self, event: &TraceEvent) -> TraceRecord {
        let rule = self
            .rules
            .get(&event.node_name)
            .unwrap_or(&self.fallback);
        TraceRecord {
            step: event.step,
            kind: event.kind(),
            node_name: event.node_name.clone(),
            description: event.description.clone(),
            lines: rule.lines(event),
        }
    }
}

/// Index of the first event whose step does not increase on its predecessor.
pub fn first_order_violation(events: &[TraceEvent]) -> Option<usize> {
    events
        .windows(2)
        .position(|pair| pair[1].step <= pair[0].step)
        .map(|position| position + 1)
}
