use std::fmt;

use crate::token::Token;

use super::LocationInfo;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    location: LocationInfo,
    kind: ErrorKind,
}

impl Error {
    pub fn new(location: LocationInfo, kind: ErrorKind) -> Self {
        Self { location, kind }
    }

    /// Creates an internal consistency error without location.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(LocationInfo::empty(), ErrorKind::Internal(message.into()))
    }

    /// Creates a parse error pointing at `found`. If there is no token left,
    /// the error points just past the `last` consumed one.
    pub fn unexpected(found: Option<&Token>, last: Option<&Token>) -> Self {
        match found {
            Some(token) => Self::new(
                LocationInfo::at_token(token),
                ErrorKind::UnexpectedToken {
                    found: token.to_string(),
                    hint: None,
                },
            ),
            None => Self::new(
                last.map(LocationInfo::at_token).unwrap_or_default(),
                ErrorKind::TokenExpected,
            ),
        }
    }

    pub fn location(&self) -> &LocationInfo {
        &self.location
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.location.source = Some(source.to_string());
        self
    }

    pub fn with_command(mut self, index: usize) -> Self {
        self.location.command = Some(index);
        self
    }

    pub fn with_hint(mut self, suggestion: String) -> Self {
        if let ErrorKind::UnexpectedToken { ref mut hint, .. } = self.kind {
            *hint = Some(suggestion);
        }
        self
    }

    /// Errors caused by malformed script input.
    pub fn is_parse_error(&self) -> bool {
        match self.kind {
            ErrorKind::UnexpectedToken { .. }
            | ErrorKind::TokenExpected
            | ErrorKind::MissingEndQuotes => true,
            _ => false,
        }
    }

    /// Errors signalling a defect in grammar actions or the command
    /// vocabulary, as opposed to bad user input.
    pub fn is_internal(&self) -> bool {
        match self.kind {
            ErrorKind::Internal(_) | ErrorKind::UnknownControlResult(_) => true,
            _ => false,
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    // parsing
    UnexpectedToken {
        found: String,
        hint: Option<String>,
    },
    TokenExpected,
    MissingEndQuotes,

    // processing
    Internal(String),
    UnknownControlResult(u8),
    InvalidCommandBody(String),

    Other(String),
}

impl fmt::Display for Error {
    /// Formats the script error using the given formatter.
    fn fmt(&self, formatter: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        fmt_err_msg(formatter, &self.location, &self.message())
    }
}

impl Error {
    /// Message describing the error kind, without location information.
    pub fn message(&self) -> String {
        match self.kind {
            ErrorKind::UnexpectedToken {
                ref found,
                ref hint,
            } => match hint {
                Some(h) => format!("unexpected token: {}, did you mean `{}`?", found, h),
                None => format!("unexpected token: {}", found),
            },
            ErrorKind::TokenExpected => "token expected".to_string(),
            ErrorKind::MissingEndQuotes => "missing end quotes".to_string(),
            ErrorKind::Internal(ref msg) => format!("internal error: {}", msg),
            ErrorKind::UnknownControlResult(code) => {
                format!("internal error: unrecognized control result: {}", code)
            }
            ErrorKind::InvalidCommandBody(ref msg) => format!("invalid command body: {}", msg),
            ErrorKind::Other(ref msg) => format!("other error: {}", msg),
        }
    }

    /// Renders the error as an annotated excerpt of the script source.
    #[cfg(feature = "pretty_errors")]
    pub fn render(&self, source: &str) -> String {
        use annotate_snippets::display_list::{DisplayList, FormatOptions};
        use annotate_snippets::snippet::{
            Annotation, AnnotationType, Slice, Snippet, SourceAnnotation,
        };

        let line = match self.location.line {
            Some(l) if l > 0 => l,
            _ => return self.to_string(),
        };
        let source_line = match source.lines().nth(line - 1) {
            Some(s) => s,
            None => return self.to_string(),
        };
        let line_len = source_line.chars().count();
        let range_start = self
            .location
            .column
            .map(|c| c.saturating_sub(1))
            .unwrap_or(0)
            .min(line_len);
        let word_len = source_line
            .chars()
            .skip(range_start)
            .take_while(|c| !c.is_whitespace())
            .count();
        let range_end = range_start + word_len.max(1);
        // annotations past the end of the line point at the line break
        let source_string = format!("{} ", source_line);

        let message = self.message();
        let origin = self.location.source.clone().unwrap_or_default();
        let title = if self.is_internal() {
            "internal script error"
        } else {
            "failed compiling script"
        };
        let snippet = Snippet {
            title: Some(Annotation {
                label: Some(title),
                id: None,
                annotation_type: AnnotationType::Error,
            }),
            footer: vec![],
            slices: vec![Slice {
                source: source_string.as_str(),
                line_start: line,
                origin: Some(origin.as_str()),
                fold: false,
                annotations: vec![SourceAnnotation {
                    label: message.as_str(),
                    annotation_type: AnnotationType::Error,
                    range: (range_start, range_end),
                }],
            }],
            opt: FormatOptions {
                color: true,
                ..Default::default()
            },
        };

        DisplayList::from(snippet).to_string()
    }
}

fn fmt_err_msg(
    formatter: &mut fmt::Formatter,
    location_info: &LocationInfo,
    message: &str,
) -> std::result::Result<(), fmt::Error> {
    let source = match location_info.source {
        Some(ref value) => value.to_string(),
        None => "unknown".to_string(),
    };
    match (location_info.line, location_info.column) {
        (Some(line), Some(column)) => write!(
            formatter,
            "source: {}, line: {}, column: {} - {}",
            source, line, column, message
        ),
        _ => match location_info.command {
            Some(command) => write!(
                formatter,
                "source: {}, command: {} - {}",
                source, command, message
            ),
            None => write!(formatter, "source: {} - {}", source, message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn unexpected_token_points_at_token() {
        let token = Token::new(TokenKind::Word, "XYZ", 3, 5);
        let err = Error::unexpected(Some(&token), None).with_source("guard");
        assert!(err.is_parse_error());
        assert!(!err.is_internal());
        assert_eq!(err.location().line, Some(3));
        assert_eq!(err.location().column, Some(5));
        assert_eq!(
            err.to_string(),
            "source: guard, line: 3, column: 5 - unexpected token: XYZ"
        );
    }

    #[test]
    fn premature_end_reports_token_expected() {
        let last = Token::new(TokenKind::Word, "Set", 1, 1);
        let err = Error::unexpected(None, Some(&last));
        assert_eq!(err.kind(), &ErrorKind::TokenExpected);
        assert_eq!(err.location().line, Some(1));
    }

    #[test]
    fn unknown_control_result_is_internal() {
        let err = Error::new(LocationInfo::empty(), ErrorKind::UnknownControlResult(9));
        assert!(err.is_internal());
        assert!(!err.is_parse_error());
    }
}
