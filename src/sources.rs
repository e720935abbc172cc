//! Environment and command-line override sources.
//!
//! Both sources carry arbitrary string keys. Wherever the two are consulted
//! together, command-line arguments win over environment variables.

use serde_json::{Map, Value};

/// Override values captured from the process environment and argument list.
///
/// Captured once at init and reused by every scheduled reload: the argument
/// list never changes for a running process, and reusing the same snapshot
/// keeps reloads deterministic.
#[derive(Debug, Clone, Default)]
pub struct OverrideSources {
    env: Map<String, Value>,
    args: Map<String, Value>,
}

impl OverrideSources {
    /// Capture the current process environment and command-line arguments.
    pub fn capture() -> Self {
        Self::from_parts(std::env::args().skip(1), std::env::vars())
    }

    /// Build sources from explicit argument and environment iterators.
    pub fn from_parts(
        args: impl IntoIterator<Item = String>,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            env: env
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
            args: parse_args(args),
        }
    }

    /// Look up a single key, preferring command-line arguments over the
    /// environment.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.args.get(key).or_else(|| self.env.get(key))
    }

    /// As [`lookup`](Self::lookup), keeping only string values.
    pub fn lookup_str(&self, key: &str) -> Option<String> {
        self.lookup(key).and_then(Value::as_str).map(str::to_string)
    }

    /// Environment variables as a JSON object overlay.
    pub fn env_overlay(&self) -> Value {
        Value::Object(self.env.clone())
    }

    /// Command-line arguments as a JSON object overlay.
    pub fn args_overlay(&self) -> Value {
        Value::Object(self.args.clone())
    }
}

/// Parse `--key=value`, `--key value`, and bare `--flag` argument forms.
///
/// Values are coerced: `true`/`false` become booleans, numeric literals
/// become numbers, everything else stays a string. Non-option tokens that
/// do not follow a `--key` are ignored.
fn parse_args(args: impl IntoIterator<Item = String>) -> Map<String, Value> {
    let mut out = Map::new();
    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        let Some(key) = arg.strip_prefix("--") else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        if let Some((key, value)) = key.split_once('=') {
            out.insert(key.to_string(), coerce(value));
        } else if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
            out.insert(key.to_string(), coerce(&value));
        } else {
            out.insert(key.to_string(), Value::Bool(true));
        }
    }
    out
}

/// Coerce a raw argument value into a boolean, number, or string.
fn coerce(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::Number(n.into())
            } else if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
            {
                Value::Number(n)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_equals_form() {
        let sources = OverrideSources::from_parts(args(&["--port=8080"]), []);
        assert_eq!(sources.lookup("port"), Some(&json!(8080)));
    }

    #[test]
    fn parses_space_separated_form() {
        let sources = OverrideSources::from_parts(args(&["--region", "eu-west"]), []);
        assert_eq!(sources.lookup("region"), Some(&json!("eu-west")));
    }

    #[test]
    fn bare_flag_is_true() {
        let sources = OverrideSources::from_parts(args(&["--verbose", "--name", "svc"]), []);
        assert_eq!(sources.lookup("verbose"), Some(&json!(true)));
        assert_eq!(sources.lookup("name"), Some(&json!("svc")));
    }

    #[test]
    fn trailing_flag_is_true() {
        let sources = OverrideSources::from_parts(args(&["--dry-run"]), []);
        assert_eq!(sources.lookup("dry-run"), Some(&json!(true)));
    }

    #[test]
    fn coerces_booleans_and_floats() {
        let sources =
            OverrideSources::from_parts(args(&["--enabled=false", "--ratio=0.5"]), []);
        assert_eq!(sources.lookup("enabled"), Some(&json!(false)));
        assert_eq!(sources.lookup("ratio"), Some(&json!(0.5)));
    }

    #[test]
    fn arguments_win_over_environment() {
        let sources = OverrideSources::from_parts(
            args(&["--APP_ENV=staging"]),
            [("APP_ENV".to_string(), "production".to_string())],
        );
        assert_eq!(sources.lookup_str("APP_ENV"), Some("staging".to_string()));
    }

    #[test]
    fn falls_back_to_environment() {
        let sources = OverrideSources::from_parts(
            args(&[]),
            [("APP_CONF_PATH".to_string(), "/etc/conf".to_string())],
        );
        assert_eq!(
            sources.lookup_str("APP_CONF_PATH"),
            Some("/etc/conf".to_string())
        );
    }

    #[test]
    fn missing_key_is_none() {
        let sources = OverrideSources::from_parts(args(&[]), []);
        assert_eq!(sources.lookup("absent"), None);
    }

    #[test]
    fn non_option_tokens_are_ignored() {
        let sources = OverrideSources::from_parts(args(&["serve", "--port", "80"]), []);
        assert_eq!(sources.lookup("serve"), None);
        assert_eq!(sources.lookup("port"), Some(&json!(80)));
    }
}
