use std::sync::LazyLock;

use regex::Regex;

/// Strip markdown code fences and XML-ish tag blocks around a payload.
/// Models keep wrapping the scenario JSON in ```json fences despite being
/// told not to, this is the repair step before parsing.
pub fn extract_code_block(s: &str) -> String {
    let s = REGEX_XML_TAG.replace_all(s, "");
    let s = REGEX_CODE_BLOCK_START.replace(&s, "");
    let s = REGEX_CODE_BLOCK_END.replace(&s, "");

    s.trim().to_string()
}

static REGEX_CODE_BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:([\s\S]*?))(\s*```.*\n)([\s\S]*?)").expect("CODE_BLOCK_START regex is invalid")
});
static REGEX_CODE_BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```[\s\S]*").expect("CODE_BLOCK_END regex is invalid"));
static REGEX_XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>[\s\S]*?<\/[^>]+>").expect("XML_TAG regex is invalid"));

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_extract_code_block() {
        assert_eq!(extract_code_block("{ \"a\": 1 }"), "{ \"a\": 1 }");

        let fenced = r#"
```json
{ "expected_rev_cagr_5y": { "mid": 0.2, "good": 0.3 } }
```
"#;
        let json: Value = serde_json::from_str(&extract_code_block(fenced)).unwrap();
        assert_eq!(json["expected_rev_cagr_5y"]["mid"].as_f64(), Some(0.2));

        let with_think = r#"
<think>
Estimating growth...
</think>

{ "tax_rate": { "mid": 0.21, "good": 0.21 } }
"#;
        let json: Value = serde_json::from_str(&extract_code_block(with_think)).unwrap();
        assert_eq!(json["tax_rate"]["good"].as_f64(), Some(0.21));
    }
}
