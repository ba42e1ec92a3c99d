use crate::api::SuggestionGateway;
use crate::commands::Out;
use crate::model::Suggestion;
use crate::SuggestionDisplay;

/// Asks `gateway` once for a suggestion for `query`. Getting no suggestion is not an error.
pub async fn suggest(gateway: &SuggestionGateway, query: &str) -> Out<Suggestion> {
    match gateway.suggest(query).await {
        Some(suggestion) => Out::new(
            format!(
                "{}Suggested target: {}",
                SuggestionDisplay(&suggestion),
                suggestion.price.canonical()
            ),
            suggestion,
        ),
        None => Out::text("No postage suggestion is available for that query."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{gateway, Mode};
    use crate::Config;

    #[tokio::test]
    async fn test_suggest_in_test_mode() {
        let gateway = gateway(&Config::default(), None, Mode::Test).unwrap();
        let out = suggest(&gateway, "registered letter").await;
        assert_eq!(out.data().unwrap().category, "Registered Mail");
        assert!(out.message().contains("Suggested target: 16.2"));
    }

    #[tokio::test]
    async fn test_suggest_blank_query() {
        let gateway = gateway(&Config::default(), None, Mode::Test).unwrap();
        let out = suggest(&gateway, "  ").await;
        assert!(out.data().is_none());
        assert!(out.message().starts_with("No postage suggestion"));
    }
}
