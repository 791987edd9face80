use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed view of one invocation's argument vector. Parsing is tolerant:
/// flags this layer does not own are ignored, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationArgs {
    pub no_window: bool,
    pub query: Option<String>,
}

pub fn parse_activation_args(argv: &[String]) -> ActivationArgs {
    let mut args = ActivationArgs::default();
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        if arg == "--no-window" {
            args.no_window = true;
        } else if arg == "--query" {
            args.query = iter.next().cloned();
        } else if let Some(rest) = arg.strip_prefix("--query=") {
            args.query = Some(rest.to_string());
        }
    }
    args
}

/// The envelope a secondary invocation forwards to the running instance,
/// one JSON line per activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub argv: Vec<String>,
    pub query: Option<String>,
}

impl ActivationRequest {
    pub fn from_argv(argv: &[String]) -> Self {
        let parsed = parse_activation_args(argv);
        Self {
            argv: argv.to_vec(),
            query: parsed.query,
        }
    }

    pub fn payload(&self) -> Value {
        match &self.query {
            Some(query) => serde_json::json!({ "query": query }),
            None => Value::Null,
        }
    }
}

pub fn query_from_payload(payload: &Value) -> Option<&str> {
    payload.get("query").and_then(Value::as_str)
}
