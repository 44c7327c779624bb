//! Prompt composition: turns a request plus accumulated context into the
//! payload sent to the model.

use serde_json::Value;

use crate::llm_client::{EncodedImage, PromptPayload};

/// Builds the user-input block: the raw prompt, or a composite embedding the
/// serialized CV data followed by the optional prompt.
pub fn user_input(prompt: Option<&str>, cv_data: Option<&Value>) -> String {
    match cv_data {
        Some(data) => {
            let serialized =
                serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            match prompt {
                Some(p) if !p.trim().is_empty() => format!("CV Data:\n{serialized}\n\n{p}"),
                _ => format!("CV Data:\n{serialized}"),
            }
        }
        None => prompt.unwrap_or_default().to_string(),
    }
}

/// Composes the final payload from system instructions, rendered context and
/// user input.
///
/// With a custom template, `{context}`, `{system_prompt}` and `{prompt}` are
/// substituted in a single pass. Without one, the default block layout is
/// used. Image-bearing requests always take the three-part form
/// `[system prompt, image, user input]`; the custom template is not applied
/// in that mode.
pub fn compose(
    input: &str,
    context: &str,
    system_prompt: &str,
    template: Option<&str>,
    image: Option<EncodedImage>,
) -> PromptPayload {
    if let Some(image) = image {
        return PromptPayload::Multipart {
            lead_text: system_prompt.to_string(),
            image,
            user_text: input.to_string(),
        };
    }

    let text = match template {
        Some(template) => substitute(
            template,
            &[
                ("{context}", context),
                ("{system_prompt}", system_prompt),
                ("{prompt}", input),
            ],
        ),
        None => format!("{system_prompt}\n{context}\nUser: {input}\nResponse:"),
    };

    PromptPayload::Text(text)
}

/// Single-pass placeholder substitution. Replacement values are emitted
/// verbatim and never re-scanned; unmatched placeholders are left as-is.
fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        for (placeholder, value) in replacements {
            if candidate.starts_with(placeholder) {
                out.push_str(value);
                rest = &candidate[placeholder.len()..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &candidate[1..];
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitution_exact_output() {
        let payload = compose(
            "C",
            "A",
            "B",
            Some("SYS:{system_prompt}|CTX:{context}|Q:{prompt}"),
            None,
        );
        match payload {
            PromptPayload::Text(text) => assert_eq!(text, "SYS:B|CTX:A|Q:C"),
            _ => panic!("expected text payload"),
        }
    }

    #[test]
    fn test_substitution_is_single_pass_without_recursive_expansion() {
        // A placeholder arriving via a substituted value must stay literal.
        let out = substitute(
            "CTX:{context}|Q:{prompt}",
            &[("{context}", "{prompt}"), ("{prompt}", "C")],
        );
        assert_eq!(out, "CTX:{prompt}|Q:C");
    }

    #[test]
    fn test_unmatched_placeholders_left_as_is() {
        let out = substitute("A {unknown} B {prompt}", &[("{prompt}", "C")]);
        assert_eq!(out, "A {unknown} B C");
    }

    #[test]
    fn test_stray_brace_is_preserved() {
        let out = substitute("open { brace {prompt}", &[("{prompt}", "C")]);
        assert_eq!(out, "open { brace C");
    }

    #[test]
    fn test_default_mode_layout() {
        let payload = compose("write a summary", "User: hi\nAssistant: hello", "SYS", None, None);
        match payload {
            PromptPayload::Text(text) => assert_eq!(
                text,
                "SYS\nUser: hi\nAssistant: hello\nUser: write a summary\nResponse:"
            ),
            _ => panic!("expected text payload"),
        }
    }

    #[test]
    fn test_user_input_prefers_raw_prompt() {
        assert_eq!(user_input(Some("hello"), None), "hello");
    }

    #[test]
    fn test_user_input_embeds_cv_data_before_prompt() {
        let data = serde_json::json!({ "name": "Ada" });
        let input = user_input(Some("polish this"), Some(&data));
        assert!(input.starts_with("CV Data:\n"));
        assert!(input.contains("\"name\": \"Ada\""));
        assert!(input.ends_with("polish this"));
    }

    #[test]
    fn test_user_input_cv_data_alone() {
        let data = serde_json::json!({ "name": "Ada" });
        let input = user_input(None, Some(&data));
        assert!(input.starts_with("CV Data:\n"));
        assert!(!input.contains("\n\n"), "no trailing prompt section");
    }

    #[test]
    fn test_image_payload_ignores_template_and_keeps_three_part_order() {
        let image = EncodedImage {
            data: "AAAA".to_string(),
            media_type: "image/jpeg",
        };
        let payload = compose(
            "describe",
            "ctx",
            "SYS",
            Some("T:{prompt}"),
            Some(image),
        );
        match payload {
            PromptPayload::Multipart {
                lead_text,
                image,
                user_text,
            } => {
                assert_eq!(lead_text, "SYS");
                assert_eq!(image.data, "AAAA");
                assert_eq!(user_text, "describe");
            }
            _ => panic!("expected multipart payload"),
        }
    }
}
