//! Normalization of provider answers into the common result schema.

use crate::error::{AnalysisError, Result};
use crate::log_warn;
use crate::providers::Provider;
use crate::types::{DiagnosisPayload, rounded_mean};
use serde_json::Value;

/// Reported and recomputed overall scores may drift this far before we warn
const OVERALL_DRIFT_WARNING: u8 = 10;

/// Remove a surrounding Markdown code fence (```json ... ``` or ``` ... ```)
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) on the opening line
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(char::is_alphanumeric) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Narrow an answer to its outermost JSON object when prose surrounds it
///
/// Applied after fence stripping, so "Here is the analysis:\n```json {...} ```"
/// still yields the object.
pub fn extract_json_object(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse and validate the textual answer of a provider
///
/// Fails closed: anything that is not a complete five-dimension payload with
/// scores in 0..=100 is a [`AnalysisError::MalformedResponse`].
pub fn parse_diagnosis(provider: Provider, text: &str) -> Result<DiagnosisPayload> {
    let cleaned = extract_json_object(strip_code_fences(text));

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        AnalysisError::malformed(provider, format!("answer is not valid JSON: {e}"))
    })?;

    let payload: DiagnosisPayload = serde_json::from_value(value).map_err(|e| {
        AnalysisError::malformed(provider, format!("answer does not match the schema: {e}"))
    })?;

    if payload.overall_score > 100 {
        return Err(AnalysisError::malformed(
            provider,
            format!("overallScore {} is out of range", payload.overall_score),
        ));
    }

    if let Some((dimension, score)) = payload.dimensions.out_of_range() {
        return Err(AnalysisError::malformed(
            provider,
            format!("{dimension} score {score} is out of range"),
        ));
    }

    let recomputed = rounded_mean(&payload.dimensions.scores());
    if payload.overall_score.abs_diff(recomputed) > OVERALL_DRIFT_WARNING {
        log_warn!(
            "{} reported overall score {} but dimensions average {}",
            provider,
            payload.overall_score,
            recomputed
        );
    }

    Ok(payload)
}

/// Fetch a string at a JSON pointer, or explain which part of the envelope is missing
pub(crate) fn text_at<'a>(provider: Provider, envelope: &'a Value, pointer: &str) -> Result<&'a str> {
    envelope
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AnalysisError::malformed(provider, format!("response has no text at {pointer}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    fn sample(overall: u32, color: u32) -> String {
        format!(
            r#"{{
  "overallScore": {overall},
  "dimensions": {{
    "color": {{"score": {color}, "issues": ["Low contrast"], "suggestions": ["Raise contrast"]}},
    "layout": {{"score": 80, "issues": [], "suggestions": ["Use a grid"]}},
    "typography": {{"score": 75, "issues": [], "suggestions": ["Fewer fonts"]}},
    "hierarchy": {{"score": 70, "issues": [], "suggestions": ["Bigger headline"]}},
    "branding": {{"score": 85, "issues": [], "suggestions": ["Logo placement"]}}
  }}
}}"#
        )
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json {\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(
            extract_json_object("Sure! {\"a\":{\"b\":2}} Hope this helps."),
            "{\"a\":{\"b\":2}}"
        );
        assert_eq!(extract_json_object("no object here"), "no object here");
        assert_eq!(extract_json_object("} backwards {"), "} backwards {");
    }

    #[test]
    fn test_chatty_fenced_answer_parses() {
        let plain = sample(78, 80);
        let chatty = format!("Here is the analysis:\n```json\n{plain}\n```\nLet me know if you need more.");

        let from_plain = parse_diagnosis(Provider::Claude, &plain).expect("plain parses");
        let from_chatty = parse_diagnosis(Provider::Claude, &chatty).expect("chatty parses");
        assert_eq!(from_plain, from_chatty);
    }

    #[test]
    fn test_fenced_and_plain_parse_identically() {
        let plain = sample(78, 80);
        let fenced = format!("```json\n{plain}\n```");

        let from_plain = parse_diagnosis(Provider::Gemini, &plain).expect("plain parses");
        let from_fenced = parse_diagnosis(Provider::Gemini, &fenced).expect("fenced parses");
        assert_eq!(from_plain, from_fenced);
    }

    #[test]
    fn test_dimensions_pass_through_verbatim() {
        let text = sample(78, 80);
        let payload = parse_diagnosis(Provider::OpenAI, &text).expect("parses");

        let raw: Value = serde_json::from_str(&text).expect("valid json");
        let reserialized = serde_json::to_value(&payload.dimensions).expect("serializes");
        assert_eq!(reserialized, raw["dimensions"]);
        assert_eq!(payload.overall_score, 78);
        assert_eq!(
            payload.dimensions.get(Dimension::Color).issues,
            vec!["Low contrast".to_string()]
        );
    }

    #[test]
    fn test_rejects_out_of_range_scores() {
        let err = parse_diagnosis(Provider::Claude, &sample(78, 120)).expect_err("color > 100");
        assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
        assert!(err.to_string().contains("color score 120"));

        let err = parse_diagnosis(Provider::Claude, &sample(101, 80)).expect_err("overall > 100");
        assert!(err.to_string().contains("overallScore 101"));

        let err = parse_diagnosis(Provider::Claude, &sample(78, 300)).expect_err("not a u8");
        assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
    }

    #[test]
    fn test_rejects_missing_fields_and_garbage() {
        let missing = r#"{"overallScore": 80, "dimensions": {"color": {"score": 80, "issues": [], "suggestions": []}}}"#;
        let err = parse_diagnosis(Provider::Gemini, missing).expect_err("missing dimensions");
        assert!(err.to_string().contains("does not match the schema"));

        let err = parse_diagnosis(Provider::Gemini, "I cannot see the image").expect_err("prose");
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_text_at() {
        let envelope: Value =
            serde_json::json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(
            text_at(Provider::OpenAI, &envelope, "/choices/0/message/content").expect("present"),
            "hello"
        );
        assert!(text_at(Provider::OpenAI, &envelope, "/choices/1/message/content").is_err());
    }
}
