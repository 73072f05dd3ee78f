//! Error types for placement parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Invalid placement at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl PlacementError {
    pub fn syntax(span: Span, message: impl Into<String>, expected: &[&str]) -> Self {
        Self::Syntax {
            span,
            message: message.into(),
            expected: expected.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            PlacementError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let span = char_span(source, span);
                Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf)
                    .unwrap();
            }
        }
        String::from_utf8(buf).unwrap()
    }
}

/// Character range ariadne labels with, for a byte range of `source`
fn char_span(source: &str, span: &Span) -> Span {
    let chars_before = |offset: usize| {
        source
            .get(..offset)
            .map_or(offset, |prefix| prefix.chars().count())
    };
    chars_before(span.start)..chars_before(span.end)
}
