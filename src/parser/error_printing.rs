use crate::parser::types::Span;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use chumsky::error::{Simple, SimpleReason};
use std::fmt::Display;
use std::hash::Hash;

/// Prints one report per error to stderr. `token_span_resolver` maps an error span onto the
/// source (identity for lexer errors, token indices to byte offsets for parser errors).
pub fn print_errors<'a, 'b, T, F>(
    src: &'a str,
    file_path: &'b str,
    errs: Vec<Simple<T>>,
    mut token_span_resolver: F,
) -> bool
where
    T: Display + Hash + Eq,
    F: FnMut(&Span) -> Span,
{
    let errored = !errs.is_empty();

    errs.into_iter()
        .map(|err| err.map(|tok| tok.to_string()))
        .for_each(|err| {
            let src_span = token_span_resolver(&err.span());

            let report = Report::build(ReportKind::Error, &file_path, src_span.start);

            let main_err_label = (&file_path, src_span);

            let report = match err.reason() {
                SimpleReason::Unclosed { span, delimiter } => report
                    .with_message(format!(
                        "Unclosed delimiter {}",
                        delimiter.fg(Color::Yellow)
                    ))
                    .with_label(
                        Label::new((&file_path, token_span_resolver(span)))
                            .with_message(format!(
                                "Unclosed delimiter {}",
                                delimiter.fg(Color::Yellow)
                            ))
                            .with_color(Color::Yellow),
                    ),
                SimpleReason::Unexpected => report
                    .with_message(format!(
                        "{} (expecting: [{}])",
                        match err.found() {
                            Some(_) => "Invalid operation",
                            None => "Unexpected end of block",
                        },
                        err.expected()
                            .map(|expected| match expected {
                                Some(s) => s.as_str(),
                                None => "<EOF>",
                            })
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                    .with_label(
                        Label::new(main_err_label)
                            .with_message(format!(
                                "Unexpected {}",
                                err.found()
                                    .unwrap_or(&"end of file".to_string())
                                    .fg(Color::Red)
                            ))
                            .with_color(Color::Red),
                    ),

                SimpleReason::Custom(msg) => report.with_message(msg).with_label(
                    Label::new(main_err_label)
                        .with_message(format!("{}", msg.fg(Color::Red)))
                        .with_color(Color::Red),
                ),
            };

            if let Err(err) = report
                .finish()
                .eprint((&file_path, Source::from(&src)))
            {
                log::warn!("failed to print error report: {}", err);
            }
        });

    errored
}
