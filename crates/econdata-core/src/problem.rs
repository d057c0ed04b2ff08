//! RFC 7807 problem details returned by the web API on failure.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A machine-readable error body as described by
/// [RFC 7807](https://tools.ietf.org/html/rfc7807), together with the request that
/// produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// HTTP method of the failed request.
    pub method: String,
    /// Path of the failed request, relative to the API root.
    pub path: String,
    /// Status code of the HTTP response.
    pub status_code: u16,
    /// URI reference identifying the problem type. `about:blank` when absent.
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
    /// Short human-readable summary of the problem type.
    pub title: Option<String>,
    /// Status code as reported in the body.
    pub status: Option<u16>,
    /// Human-readable explanation specific to this occurrence.
    pub detail: Option<String>,
    /// URI reference identifying this occurrence.
    pub instance: Option<String>,
    /// Extension members.
    pub extensions: Option<serde_json::Map<String, Value>>,
    /// Validation errors keyed by field name.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// The subset of a problem document read from the response body.
#[derive(Debug, Default, Deserialize)]
struct ProblemBody {
    #[serde(rename = "type")]
    problem_type: Option<String>,
    title: Option<String>,
    status: Option<u16>,
    detail: Option<String>,
    instance: Option<String>,
    extensions: Option<serde_json::Map<String, Value>>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ProblemDetails {
    /// Builds problem details from a failed response.
    ///
    /// Bodies that are not a JSON problem document keep the raw text as `detail`.
    #[must_use]
    pub fn from_response(
        method: impl Into<String>,
        path: impl Into<String>,
        status_code: u16,
        body: &str,
    ) -> Self {
        let parsed = serde_json::from_str::<ProblemBody>(body).unwrap_or_else(|_| ProblemBody {
            detail: (!body.trim().is_empty()).then(|| body.to_string()),
            ..Default::default()
        });

        Self {
            method: method.into(),
            path: path.into(),
            status_code,
            problem_type: parsed.problem_type,
            title: parsed.title,
            status: parsed.status,
            detail: parsed.detail,
            instance: parsed.instance,
            extensions: parsed.extensions,
            errors: parsed.errors,
        }
    }
}

fn or_none<T: fmt::Debug>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "None".to_string(), |v| format!("{v:?}"))
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "http {} request to {}", self.method, self.path)?;
        writeln!(f, "response.status_code: {}", self.status_code)?;
        writeln!(f, "type: {}", or_none(&self.problem_type))?;
        writeln!(f, "title: {}", or_none(&self.title))?;
        writeln!(f, "status: {}", or_none(&self.status))?;
        writeln!(f, "detail: {}", or_none(&self.detail))?;
        writeln!(f, "instance: {}", or_none(&self.instance))?;
        writeln!(f, "extensions: {}", or_none(&self.extensions))?;
        write!(f, "errors: {}", or_none(&self.errors))
    }
}

impl std::error::Error for ProblemDetails {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_problem_document() {
        let body = r#"{
            "type": "https://tools.ietf.org/html/rfc7231#section-6.5.1",
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": {"n": ["The series name is invalid."]}
        }"#;

        let problem = ProblemDetails::from_response("GET", "v1/series/fetchseries", 400, body);

        assert_eq!(problem.status, Some(400));
        assert_eq!(
            problem.title.as_deref(),
            Some("One or more validation errors occurred.")
        );
        assert_eq!(
            problem.errors.as_ref().unwrap()["n"],
            vec!["The series name is invalid.".to_string()]
        );
        assert!(problem.detail.is_none());
    }

    #[test]
    fn test_non_json_body_becomes_detail() {
        let problem = ProblemDetails::from_response("POST", "v1/search/entities", 502, "Bad Gateway");
        assert_eq!(problem.detail.as_deref(), Some("Bad Gateway"));
        assert!(problem.title.is_none());

        let empty = ProblemDetails::from_response("POST", "v1/search/entities", 502, "  ");
        assert!(empty.detail.is_none());
    }

    #[test]
    fn test_display_names_request() {
        let problem = ProblemDetails::from_response(
            "GET",
            "v1/metadata/getattributeinformation",
            404,
            r#"{"title": "Not Found", "status": 404}"#,
        );
        let message = problem.to_string();

        assert!(message.starts_with("http GET request to v1/metadata/getattributeinformation\n"));
        assert!(message.contains("response.status_code: 404"));
        assert!(message.contains("title: \"Not Found\""));
        assert!(message.contains("detail: None"));
    }
}
