use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("Environment variable {0} is not set")]
    Missing(String),
    /// Position of the `$` that opened the placeholder, both 1-based.
    #[error("Malformed placeholder at line {line}, column {column}")]
    Invalid { line: usize, column: usize },
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Replace every `${NAME}` in `input` with `lookup(NAME)`.
///
/// `\${` stands for a literal `${`. A placeholder must close on the line it
/// opens and name something matching `[A-Za-z_][A-Za-z0-9_]*`.
pub fn expand_placeholders<'a>(
    input: &'a str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Cow<'a, str>, PlaceholderError> {
    if !input.contains("${") {
        return Ok(Cow::Borrowed(input));
    }

    let mut out = String::with_capacity(input.len());
    for (index, line) in input.split_inclusive('\n').enumerate() {
        let mut rest = line;
        let mut column = 1;
        while let Some(start) = rest.find("${") {
            let escaped = rest[..start].ends_with('\\');
            if escaped {
                out.push_str(&rest[..start - 1]);
                out.push_str("${");
                column += rest[..start + 2].chars().count();
                rest = &rest[start + 2..];
                continue;
            }

            out.push_str(&rest[..start]);
            column += rest[..start].chars().count();
            let invalid = PlaceholderError::Invalid {
                line: index + 1,
                column,
            };
            let body = &rest[start + 2..];
            let end = body.find('}').ok_or(invalid.clone())?;
            let name = &body[..end];
            if !is_valid_name(name) {
                return Err(invalid);
            }
            let value = lookup(name).ok_or_else(|| PlaceholderError::Missing(name.to_string()))?;
            out.push_str(&value);
            column += rest[start..start + 3 + end].chars().count();
            rest = &body[end + 1..];
        }
        out.push_str(rest);
    }
    Ok(Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "LIMBO_PORT" => Some("30000".into()),
            "SECRET" => Some("hunter2".into()),
            _ => None,
        }
    }

    #[test]
    fn test_untouched_input_is_borrowed() {
        let expanded = expand_placeholders("port = 25565\n", env).unwrap();
        assert!(matches!(expanded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_values_are_substituted() {
        let expanded =
            expand_placeholders("port = ${LIMBO_PORT}\nsecret = \"${SECRET}\"\n", env).unwrap();
        assert_eq!(expanded, "port = 30000\nsecret = \"hunter2\"\n");
    }

    #[test]
    fn test_escape_keeps_literal() {
        let expanded = expand_placeholders(r"motd = '\${SECRET} ${SECRET}'", env).unwrap();
        assert_eq!(expanded, "motd = '${SECRET} hunter2'");
    }

    #[test]
    fn test_missing_variable() {
        assert_eq!(
            expand_placeholders("a = ${NOPE}", env),
            Err(PlaceholderError::Missing("NOPE".into()))
        );
    }

    #[test]
    fn test_malformed_placeholders_report_position() {
        assert_eq!(
            expand_placeholders("a = 1\nb = ${OPEN\n}", env),
            Err(PlaceholderError::Invalid { line: 2, column: 5 })
        );
        assert_eq!(
            expand_placeholders("x = ${9LIVES}", env),
            Err(PlaceholderError::Invalid { line: 1, column: 5 })
        );
        assert_eq!(
            expand_placeholders("${}", env),
            Err(PlaceholderError::Invalid { line: 1, column: 1 })
        );
    }
}
