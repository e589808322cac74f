//! Terminal rendering of load and compile errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::{DslError, LoadError};

/// Render a load error for the terminal.
///
/// Syntax errors with a known position get an ariadne report pointing at
/// the offending text; everything else renders as its message.
pub fn render_load_error(err: &LoadError) -> String {
    let LoadError::Syntax {
        path,
        message,
        text,
        offset: Some(offset),
    } = err
    else {
        return err.to_string();
    };

    let filename = path.display().to_string();
    let start = (*offset).min(text.len());
    let end = (start + 1).min(text.len()).max(start);
    let span = (filename.as_str(), start..end);

    let mut output = Vec::new();
    Report::build(ReportKind::Error, span.clone())
        .with_message("invalid YAML")
        .with_label(Label::new(span).with_message(message).with_color(Color::Red))
        .finish()
        .write((filename.as_str(), Source::from(text.as_str())), &mut output)
        .ok();

    match String::from_utf8(output) {
        Ok(rendered) if !rendered.is_empty() => rendered,
        _ => err.to_string(),
    }
}

/// Render any script error for the terminal.
pub fn render_error(err: &DslError) -> String {
    match err {
        DslError::Load(load) => render_load_error(load),
        DslError::Compile(compile) => format!("{compile}\n"),
    }
}
