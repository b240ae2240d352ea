use mform_domain::{ParsedTemplate, TemplateToken, Transformation};
use thiserror::Error;

/// What went wrong while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    #[error("unterminated variable, expected `}}}}`")]
    UnterminatedVariable,
    #[error("unterminated command, expected `#}}`")]
    UnterminatedCommand,
    #[error("expected a name")]
    ExpectedIdentifier,
    #[error("expected `{0}`")]
    Expected(&'static str),
    #[error("unknown transformation \"{0}\"")]
    UnknownTransformation(String),
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),
    #[error("unknown frontmatter option \"{0}\"")]
    UnknownClause(String),
    #[error("`{0}` is given more than once")]
    DuplicateClause(&'static str),
}

/// A template could not be parsed. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (line {line}, column {column})")]
pub struct TemplateParseError {
    pub kind: TemplateErrorKind,
    /// Byte offset into the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl TemplateParseError {
    fn at(source: &str, offset: usize, kind: TemplateErrorKind) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count())
            .unwrap_or(0)
            + 1;
        Self {
            kind,
            offset,
            line,
            column,
        }
    }
}

/// Parses template source into tokens.
///
/// `{{ name }}` and `{{ name | upper }}` are variables, `{# frontmatter
/// pick: a, b omit: c #}` is the frontmatter command. A single `{` is
/// plain text, and so is a `{#` followed by neither whitespace nor
/// `frontmatter` (`Heading {#anchor}`).
pub fn parse_template(source: &str) -> Result<ParsedTemplate, TemplateParseError> {
    Parser { source, pos: 0 }.parse().map(ParsedTemplate::new)
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

type ParseResult<T> = Result<T, TemplateParseError>;

fn opens_command(rest: &str) -> bool {
    match rest.strip_prefix("{#") {
        Some(after) => after.starts_with(char::is_whitespace) || after.starts_with("frontmatter"),
        None => false,
    }
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> ParseResult<Vec<TemplateToken>> {
        let mut tokens = Vec::new();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            let rest = self.rest();
            if rest.starts_with("{{") {
                flush_text(&mut tokens, &mut text);
                tokens.push(self.variable()?);
            } else if opens_command(rest) {
                flush_text(&mut tokens, &mut text);
                tokens.push(self.command()?);
            } else {
                text.push(ch);
                self.pos += ch.len_utf8();
            }
        }

        flush_text(&mut tokens, &mut text);
        Ok(tokens)
    }

    fn variable(&mut self) -> ParseResult<TemplateToken> {
        let open = self.pos;
        self.pos += 2;
        self.skip_whitespace();

        let name = self.identifier();
        if name.is_empty() {
            return Err(match self.peek() {
                None => self.error_at(open, TemplateErrorKind::UnterminatedVariable),
                Some(_) => self.error(TemplateErrorKind::ExpectedIdentifier),
            });
        }
        self.skip_whitespace();

        let mut transformation = None;
        if self.eat("|") {
            self.skip_whitespace();
            let start = self.pos;
            let filter = self.identifier();
            if filter.is_empty() {
                return Err(self.error(TemplateErrorKind::ExpectedIdentifier));
            }
            transformation = Some(Transformation::from_name(filter).ok_or_else(|| {
                self.error_at(
                    start,
                    TemplateErrorKind::UnknownTransformation(filter.to_string()),
                )
            })?);
            self.skip_whitespace();
        }

        if self.eat("}}") {
            Ok(TemplateToken::Variable {
                value: name.to_string(),
                transformation,
            })
        } else if self.peek().is_none() {
            Err(self.error_at(open, TemplateErrorKind::UnterminatedVariable))
        } else {
            Err(self.error(TemplateErrorKind::Expected("}}")))
        }
    }

    fn command(&mut self) -> ParseResult<TemplateToken> {
        let open = self.pos;
        self.pos += 2;
        self.skip_whitespace();

        let start = self.pos;
        let name = self.identifier();
        if name.is_empty() && self.peek().is_none() {
            return Err(self.error_at(open, TemplateErrorKind::UnterminatedCommand));
        }
        if name != "frontmatter" {
            return Err(self.error_at(start, TemplateErrorKind::UnknownCommand(name.to_string())));
        }

        let mut pick: Option<Vec<String>> = None;
        let mut omit: Option<Vec<String>> = None;
        loop {
            self.skip_whitespace();
            if self.eat("#}") {
                break;
            }
            if self.peek().is_none() {
                return Err(self.error_at(open, TemplateErrorKind::UnterminatedCommand));
            }

            let clause_start = self.pos;
            let clause = self.identifier();
            let (slot, label) = match clause {
                "pick" => (&mut pick, "pick"),
                "omit" => (&mut omit, "omit"),
                "" => return Err(self.error(TemplateErrorKind::Expected("#}"))),
                other => {
                    return Err(self.error_at(
                        clause_start,
                        TemplateErrorKind::UnknownClause(other.to_string()),
                    ))
                }
            };
            if slot.is_some() {
                return Err(self.error_at(clause_start, TemplateErrorKind::DuplicateClause(label)));
            }

            self.skip_whitespace();
            if !self.eat(":") {
                return Err(self.error(TemplateErrorKind::Expected(":")));
            }
            let keys = self.key_list()?;
            match label {
                "pick" => pick = Some(keys),
                _ => omit = Some(keys),
            }
        }

        Ok(TemplateToken::FrontmatterCommand {
            pick: pick.unwrap_or_default(),
            omit: omit.unwrap_or_default(),
        })
    }

    /// `a, b , c`; at least one name.
    fn key_list(&mut self) -> ParseResult<Vec<String>> {
        let mut keys = Vec::new();
        loop {
            self.skip_whitespace();
            let key = self.identifier();
            if key.is_empty() {
                return Err(self.error(TemplateErrorKind::ExpectedIdentifier));
            }
            keys.push(key.to_string());
            self.skip_whitespace();
            if !self.eat(",") {
                return Ok(keys);
            }
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek().filter(|ch| ch.is_whitespace()) {
            self.pos += ch.len_utf8();
        }
    }

    fn eat(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn error(&self, kind: TemplateErrorKind) -> TemplateParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: TemplateErrorKind) -> TemplateParseError {
        TemplateParseError::at(self.source, offset, kind)
    }
}

fn flush_text(tokens: &mut Vec<TemplateToken>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(TemplateToken::text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<TemplateToken> {
        parse_template(source).unwrap().into_tokens()
    }

    fn error(source: &str) -> TemplateParseError {
        parse_template(source).unwrap_err()
    }

    #[test]
    fn text_and_variables() {
        assert_eq!(
            tokens("Hello, {{name}}!"),
            vec![
                TemplateToken::text("Hello, "),
                TemplateToken::variable("name"),
                TemplateToken::text("!"),
            ]
        );
        assert_eq!(
            tokens("{{  spaced_out  }}"),
            vec![TemplateToken::variable("spaced_out")]
        );
    }

    #[test]
    fn single_braces_are_text() {
        assert_eq!(
            tokens("This is code {bla}"),
            vec![TemplateToken::text("This is code {bla}")]
        );
        assert_eq!(tokens("{ {x} }"), vec![TemplateToken::text("{ {x} }")]);
        assert_eq!(tokens("ends with {"), vec![TemplateToken::text("ends with {")]);
    }

    #[test]
    fn empty_source_has_no_tokens() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn transformations() {
        assert_eq!(
            tokens("{{ name | upper }}"),
            vec![TemplateToken::Variable {
                value: "name".into(),
                transformation: Some(Transformation::Upper),
            }]
        );
        let err = error("{{ name | shout }}");
        assert_eq!(
            err.kind,
            TemplateErrorKind::UnknownTransformation("shout".into())
        );
        assert_eq!(err.column, 11);
    }

    #[test]
    fn frontmatter_commands() {
        assert_eq!(
            tokens("{# frontmatter #}"),
            vec![TemplateToken::frontmatter(Vec::new(), Vec::new())]
        );
        assert_eq!(
            tokens("{# frontmatter pick: name, age omit: age #}\nBody"),
            vec![
                TemplateToken::frontmatter(
                    vec!["name".into(), "age".into()],
                    vec!["age".into()]
                ),
                TemplateToken::text("\nBody"),
            ]
        );
        assert_eq!(
            tokens("{#frontmatter omit:a,b#}"),
            vec![TemplateToken::frontmatter(
                Vec::new(),
                vec!["a".into(), "b".into()]
            )]
        );
    }

    #[test]
    fn unterminated_variable_points_at_the_opening() {
        let err = error("line one\nsay {{ name");
        assert_eq!(err.kind, TemplateErrorKind::UnterminatedVariable);
        assert_eq!((err.line, err.column, err.offset), (2, 5, 13));

        assert_eq!(error("{{").kind, TemplateErrorKind::UnterminatedVariable);
    }

    #[test]
    fn hash_brace_without_a_command_is_text() {
        assert_eq!(
            tokens("Heading {#anchor}"),
            vec![TemplateToken::Text {
                value: "Heading {#anchor}".into()
            }]
        );
        assert_eq!(
            tokens("{#}{#"),
            vec![TemplateToken::Text {
                value: "{#}{#".into()
            }]
        );
    }

    #[test]
    fn malformed_variables() {
        assert_eq!(error("{{ }}").kind, TemplateErrorKind::ExpectedIdentifier);
        assert_eq!(
            error("{{ first name }}").kind,
            TemplateErrorKind::Expected("}}")
        );
    }

    #[test]
    fn malformed_commands() {
        assert_eq!(
            error("{# include x #}").kind,
            TemplateErrorKind::UnknownCommand("include".into())
        );
        assert_eq!(
            error("{# frontmatter pick: a").kind,
            TemplateErrorKind::UnterminatedCommand
        );
        assert_eq!(
            error("{# frontmatter pick: a pick: b #}").kind,
            TemplateErrorKind::DuplicateClause("pick")
        );
        assert_eq!(
            error("{# frontmatter sort: a #}").kind,
            TemplateErrorKind::UnknownClause("sort".into())
        );
        assert_eq!(
            error("{# frontmatter pick #}").kind,
            TemplateErrorKind::Expected(":")
        );
        assert_eq!(
            error("{# frontmatter pick: #}").kind,
            TemplateErrorKind::ExpectedIdentifier
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(
            error("{{ a").to_string(),
            "unterminated variable, expected `}}` (line 1, column 1)"
        );
    }
}
