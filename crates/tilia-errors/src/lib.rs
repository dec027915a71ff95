use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

/// One recorded parse problem: the message and the byte range of the ERROR
/// region in the tree. Diagnostics never abort parsing; they accompany the
/// ERROR nodes the recovery machinery leaves behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Renders against the document text, which the caller owns.
    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn renders_with_span() {
        let diagnostic = Diagnostic::error(
            "unexpected token",
            TextRange::new(TextSize::new(8), TextSize::new(17)),
        );
        let rendered = diagnostic
            .render(&Renderer::plain(), "sample.json", "  [123, faaaaalse, true]")
            .to_string();
        assert!(rendered.contains("unexpected token"));
        assert!(rendered.contains("sample.json"));
    }
}
