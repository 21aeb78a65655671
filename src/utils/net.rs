use url::Url;

use crate::error::StkvalResult;

/// Join a provider base URL and an endpoint path, tolerating slashes on
/// either side
pub fn join_url(base_url: &str, path: &str) -> StkvalResult<Url> {
    let base = if base_url.ends_with('/') {
        Url::parse(base_url)?
    } else {
        Url::parse(&format!("{base_url}/"))?
    };

    Ok(base.join(path.trim_start_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/v1", "/chat/completions")
                .unwrap()
                .as_str(),
            "https://api.openai.com/v1/chat/completions"
        );

        assert_eq!(
            join_url(
                "https://generativelanguage.googleapis.com/v1beta/",
                "models/gemini-2.5-flash:streamGenerateContent"
            )
            .unwrap()
            .as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent"
        );
    }
}
