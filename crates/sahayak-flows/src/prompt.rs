//! Prompt template rendering.
//!
//! Each flow carries one fixed natural-language template; rendering is
//! deterministic string substitution of `{{{field}}}` placeholders. A
//! placeholder left unresolved after rendering is a bug in the flow, not
//! user error, so it surfaces as a generation failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FlowError, Result};

/// Matches a `{{{field}}}` placeholder in a template.
static PLACEHOLDER_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\{\{\{([A-Za-z][A-Za-z0-9_]*)\}\}\}").ok());

/// Renders a template by substituting each `(name, value)` pair into its
/// `{{{name}}}` placeholder.
///
/// Placeholders are found in the template before substitution, so values
/// containing `{{{...}}}` text pass through as literals and are never
/// re-expanded.
///
/// # Errors
///
/// Returns [`FlowError::Generation`] if the template names a placeholder
/// with no matching value; `flow` names the flow for the error message.
pub fn render(flow: &str, template: &str, values: &[(&str, &str)]) -> Result<String> {
    let Some(re) = PLACEHOLDER_RE.as_ref() else {
        // Static pattern failed to compile; substitute without checks.
        let mut rendered = template.to_string();
        for (name, value) in values {
            rendered = rendered.replace(&format!("{{{{{{{name}}}}}}}"), value);
        }
        return Ok(rendered);
    };

    for captures in re.captures_iter(template) {
        let name = captures.get(1).map_or("?", |m| m.as_str());
        if !values.iter().any(|(n, _)| *n == name) {
            return Err(FlowError::generation(
                flow,
                format!("prompt template placeholder '{name}' was not substituted"),
            ));
        }
    }

    let rendered = re.replace_all(template, |captures: &regex::Captures<'_>| {
        let name = captures.get(1).map_or("", |m| m.as_str());
        values
            .iter()
            .find(|(n, _)| *n == name)
            .map_or_else(String::new, |(_, value)| (*value).to_string())
    });

    Ok(rendered.into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let rendered = render(
            "test",
            "Generate a {{{contentType}}} about {{{topic}}}.",
            &[("contentType", "story"), ("topic", "the monsoon")],
        )
        .unwrap();
        assert_eq!(rendered, "Generate a story about the monsoon.");
    }

    #[test]
    fn test_render_is_deterministic() {
        let values = [("topic", "rivers")];
        let a = render("test", "About {{{topic}}}.", &values).unwrap();
        let b = render("test", "About {{{topic}}}.", &values).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let rendered = render(
            "test",
            "{{{word}}} and {{{word}}} again",
            &[("word", "echo")],
        )
        .unwrap();
        assert_eq!(rendered, "echo and echo again");
    }

    #[test]
    fn test_render_rejects_unresolved_placeholder() {
        let err = render("lessonPlan", "Topic: {{{topic}}}", &[]).unwrap_err();
        assert!(err.is_generation());
        assert!(err.to_string().contains("topic"));
        assert!(err.to_string().contains("lessonPlan"));
    }

    #[test]
    fn test_render_leaves_plain_braces_alone() {
        // Output-format examples in templates use single braces.
        let rendered = render(
            "test",
            "Return JSON like { \"grade1\": \"...\" } for {{{grades}}}",
            &[("grades", "1, 2")],
        )
        .unwrap();
        assert!(rendered.contains("{ \"grade1\": \"...\" }"));
    }

    #[test]
    fn test_value_containing_braces_is_not_reinterpreted() {
        // A user typing literal braces must not trip the leftover check.
        let rendered = render("test", "Q: {{{question}}}", &[("question", "what is {x}?")]);
        assert!(rendered.is_ok());
    }

    #[test]
    fn test_value_containing_placeholder_syntax_stays_literal() {
        let rendered = render(
            "test",
            "Q: {{{question}}}",
            &[("question", "what does {{{name}}} mean in templates?")],
        )
        .unwrap();
        assert_eq!(rendered, "Q: what does {{{name}}} mean in templates?");
    }

    #[test]
    fn test_value_is_not_expanded_by_later_pair() {
        let rendered = render(
            "test",
            "{{{a}}} / {{{b}}}",
            &[("a", "{{{b}}}"), ("b", "beta")],
        )
        .unwrap();
        assert_eq!(rendered, "{{{b}}} / beta");
    }
}
