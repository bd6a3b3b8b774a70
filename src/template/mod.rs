//! Template rendering glue
//!
//! Materializes configuration files from templates by substituting named
//! `{placeholder}` values. Doubled braces (`{{`, `}}`) escape a literal
//! brace. Rendering fails on a missing template file or a placeholder with
//! no supplied value.

use crate::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Renders a template file with the given values
pub fn render(template_path: &Path, values: &HashMap<String, String>) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(template_path)
        .map_err(|_| ConfigError::TemplateNotFound(template_path.display().to_string()))?;
    render_str(&content, values)
}

/// Renders template text with the given values
pub fn render_str(template: &str, values: &HashMap<String, String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(ConfigError::MalformedTemplate(offset));
                }
                let value = values
                    .get(&name)
                    .ok_or(ConfigError::MissingPlaceholder(name))?;
                out.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(ConfigError::MalformedTemplate(offset));
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Renders a template file and writes the result to `output_path`
pub fn generate_file_from_template(
    template_path: &Path,
    output_path: &Path,
    values: &HashMap<String, String>,
) -> Result<(), ConfigError> {
    let content = render(template_path, values)?;
    std::fs::write(output_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_named_placeholders() {
        let rendered = render_str(
            "org = {org_id}\nemail = {email}\n",
            &values(&[("org_id", "42"), ("email", "a@b.com")]),
        )
        .unwrap();
        assert_eq!(rendered, "org = 42\nemail = a@b.com\n");
    }

    #[test]
    fn test_missing_placeholder_value_fails() {
        let result = render_str("org = {org_id}", &values(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingPlaceholder(name)) if name == "org_id"
        ));
    }

    #[test]
    fn test_escaped_braces() {
        let rendered = render_str("literal {{braces}} and {value}", &values(&[("value", "x")]))
            .unwrap();
        assert_eq!(rendered, "literal {braces} and x");
    }

    #[test]
    fn test_unclosed_placeholder_fails() {
        let result = render_str("broken {tail", &values(&[]));
        assert!(matches!(result, Err(ConfigError::MalformedTemplate(7))));
    }

    #[test]
    fn test_stray_closing_brace_fails() {
        let result = render_str("oops }", &values(&[]));
        assert!(matches!(result, Err(ConfigError::MalformedTemplate(_))));
    }

    #[test]
    fn test_render_missing_file() {
        let result = render(Path::new("/nonexistent.tmpl"), &values(&[]));
        assert!(matches!(result, Err(ConfigError::TemplateNotFound(_))));
    }

    #[test]
    fn test_generate_file_from_template() {
        let mut template = NamedTempFile::new().unwrap();
        template.write_all(b"hello {name}\n").unwrap();
        let output = NamedTempFile::new().unwrap();

        generate_file_from_template(
            template.path(),
            output.path(),
            &values(&[("name", "world")]),
        )
        .unwrap();

        let written = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(written, "hello world\n");
    }
}
