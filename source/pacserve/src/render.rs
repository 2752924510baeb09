//! A minimal mustache-style substitution engine.
//!
//! PAC templates recognise exactly two placeholders, `{{.Filename}}` and
//! `{{.Contact}}`. A full templating language would be overkill for two
//! fields; this engine walks the template once, copying literal text and
//! substituting recognised placeholders, and treats anything else inside
//! `{{ ... }}` as a hard error for that template.

use crate::error::RenderError;

const FILENAME_PLACEHOLDER: &str = ".Filename";
const CONTACT_PLACEHOLDER: &str = ".Contact";

pub struct RenderParams<'a> {
    pub filename: &'a str,
    pub contact: &'a str,
}

pub fn render(template_filename: &str, raw: &str, params: &RenderParams<'_>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    loop {
        match rest.find("{{") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after_open = &rest[start + 2..];
                let Some(end) = after_open.find("}}") else {
                    return Err(RenderError::Unterminated {
                        filename: template_filename.to_string(),
                    });
                };
                let placeholder = after_open[..end].trim();
                match placeholder {
                    FILENAME_PLACEHOLDER => out.push_str(params.filename),
                    CONTACT_PLACEHOLDER => out.push_str(params.contact),
                    other => {
                        return Err(RenderError::UnknownPlaceholder {
                            filename: template_filename.to_string(),
                            placeholder: other.to_string(),
                        })
                    }
                }
                rest = &after_open[end + 2..];
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_both_placeholders() {
        let params = RenderParams {
            filename: "branch-a.pac",
            contact: "Your Help Desk",
        };
        let out = render(
            "branch-a.pac",
            "// This is {{.Filename}} by {{.Contact}}",
            &params,
        )
        .unwrap();
        assert_eq!(out, "// This is branch-a.pac by Your Help Desk");
    }

    #[test]
    fn passes_through_literal_text() {
        let params = RenderParams {
            filename: "f",
            contact: "c",
        };
        let out = render("f", "// default for {{.Contact}}", &params).unwrap();
        assert_eq!(out, "// default for c");
    }

    #[test]
    fn rejects_unknown_placeholder() {
        let params = RenderParams {
            filename: "f",
            contact: "c",
        };
        let err = render("f.pac", "{{.InvalidVariable}}", &params).unwrap_err();
        assert!(matches!(err, RenderError::UnknownPlaceholder { .. }));
    }

    #[test]
    fn rejects_unterminated_placeholder() {
        let params = RenderParams {
            filename: "f",
            contact: "c",
        };
        let err = render("f.pac", "prefix {{.Contact", &params).unwrap_err();
        assert!(matches!(err, RenderError::Unterminated { .. }));
    }

    #[test]
    fn no_placeholders_is_a_no_op() {
        let params = RenderParams {
            filename: "f",
            contact: "c",
        };
        assert_eq!(render("f", "plain text", &params).unwrap(), "plain text");
    }
}
