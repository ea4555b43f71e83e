//! Placeholder rewriting for raw SQL templates.
//!
//! Templates are walked with one compiled pattern recognizing, in order:
//! the dialect's string-escape spans (emitted verbatim, placeholders
//! inside ignored), `??` (an escaped `?`), `?` with an optional `::type`
//! hint (consumes the next positional argument), and bare `::type` casts
//! (emitted verbatim).

use regex::Regex;

use crate::ast::expression::RawArg;
use crate::dialect::Escaper;
use crate::error::Result;
use crate::value::SqlValue;
use crate::writer::context::WriterContext;

/// Resolves one consumed placeholder argument into its SQL fragment.
pub type ResolveArg<'a> =
    dyn FnMut(RawArg, Option<&str>, &mut WriterContext<'_>) -> Result<String> + 'a;

/// Compiled token pattern for one dialect's raw templates. Built once at
/// writer construction from the escaper's escape sequences.
pub struct PlaceholderParser {
    pattern: Regex,
    unescaped: String,
}

impl PlaceholderParser {
    /// Compiles the token pattern for an escaper.
    #[must_use]
    pub fn new(escaper: &dyn Escaper) -> Self {
        let spans: Vec<String> = escaper
            .escape_sequences()
            .iter()
            .map(|(open, close)| {
                format!("{}[\\s\\S]*?{}", regex::escape(open), regex::escape(close))
            })
            .collect();

        let mut pattern = String::new();
        if !spans.is_empty() {
            pattern.push_str("(?P<esc>");
            pattern.push_str(&spans.join("|"));
            pattern.push_str(")|");
        }
        pattern.push_str(
            r"(?P<qq>\?\?)|(?P<ph>\?(?:::(?P<ty>[A-Za-z_][A-Za-z0-9_]*))?)|(?P<cast>::[A-Za-z_][A-Za-z0-9_]*)",
        );

        Self {
            // The pattern is assembled from literal alternatives and
            // escaped delimiters, so compilation cannot fail.
            pattern: Regex::new(&pattern).expect("placeholder pattern compiles"),
            unescaped: String::from(escaper.unescape_placeholder_char()),
        }
    }

    /// Rewrites a template, consuming `args` left to right for each real
    /// placeholder. Exhausted arguments are treated as null.
    pub fn rewrite(
        &self,
        template: &str,
        args: &[RawArg],
        ctx: &mut WriterContext,
        resolve: &mut ResolveArg<'_>,
    ) -> Result<String> {
        if args.is_empty() && !template.contains('?') {
            return Ok(String::from(template));
        }

        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        let mut cursor = 0usize;

        for caps in self.pattern.captures_iter(template) {
            let m = caps.get(0).expect("whole match");
            out.push_str(&template[last..m.start()]);
            last = m.end();

            if caps.name("esc").is_some() || caps.name("cast").is_some() {
                out.push_str(m.as_str());
            } else if caps.name("qq").is_some() {
                out.push_str(&self.unescaped);
            } else {
                let hint = caps.name("ty").map(|t| t.as_str());
                let arg = args
                    .get(cursor)
                    .cloned()
                    .unwrap_or(RawArg::Value(SqlValue::Null));
                cursor += 1;
                out.push_str(&resolve(arg, hint, ctx)?);
            }
        }
        out.push_str(&template[last..]);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::dialect::StandardEscaper;

    fn rewrite(template: &str, args: Vec<RawArg>) -> String {
        let parser = PlaceholderParser::new(&StandardEscaper);
        let converter = Converter::new();
        let mut ctx = WriterContext::new(&converter);
        parser
            .rewrite(template, &args, &mut ctx, &mut |arg, hint, ctx| {
                // Stand-in for the writer: bind the value, emit `?`.
                let expr = ctx.converter().to_expression(arg, hint)?;
                match expr {
                    crate::ast::expression::Expression::Value(v) => {
                        ctx.bind(v.value, v.ty);
                        Ok(String::from("?"))
                    }
                    crate::ast::expression::Expression::Null => Ok(String::from("null")),
                    other => panic!("unexpected expression {other:?}"),
                }
            })
            .unwrap()
    }

    #[test]
    fn test_fast_path_is_byte_identical() {
        let input = "select 'a''?b' from t";
        assert_eq!(rewrite(input, vec![]), input);
    }

    #[test]
    fn test_escaped_question_mark() {
        assert_eq!(rewrite("a ?? b", vec![]), "a ? b");
    }

    #[test]
    fn test_placeholder_inside_literal_is_ignored() {
        assert_eq!(
            rewrite("select '?' || ?", vec![RawArg::from(1)]),
            "select '?' || ?"
        );
    }

    #[test]
    fn test_bare_cast_passes_through() {
        assert_eq!(
            rewrite("select x::int + ?", vec![RawArg::from(1)]),
            "select x::int + ?"
        );
    }

    #[test]
    fn test_missing_arguments_become_null() {
        assert_eq!(rewrite("? and ?", vec![RawArg::from(1)]), "? and null");
    }
}
