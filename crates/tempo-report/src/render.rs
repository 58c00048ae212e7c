//! Presentation backends for [`Figure`]s.
//!
//! Rendering is synchronous: [`Renderer::render`] returns only after the
//! figure has been fully presented (for the terminal backend, after the user
//! dismisses it).

use std::io::{self, IsTerminal, Write};

use tempo_core::{RenderMode, TempoError};

use crate::figure::{Figure, FigureKind};
pub use crate::terminal::TerminalRenderer;

/// Something that can present a figure.
pub trait Renderer {
    /// Present `figure`, blocking until it is done.
    fn render(&mut self, figure: &Figure) -> Result<(), TempoError>;
}

/// Build the renderer for `mode`, resolving `Auto` against stdout.
///
/// # Errors
///
/// Returns [`TempoError::Render`] if the terminal cannot be initialized.
pub fn renderer_for(mode: RenderMode) -> Result<Box<dyn Renderer>, TempoError> {
    match mode.resolve(io::stdout().is_terminal()) {
        RenderMode::Terminal => Ok(Box::new(TerminalRenderer::new()?)),
        RenderMode::Text => Ok(Box::new(TextRenderer::new(io::stderr()))),
        RenderMode::None | RenderMode::Auto => Ok(Box::new(NullRenderer)),
    }
}

/// Discards every figure.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _figure: &Figure) -> Result<(), TempoError> {
        Ok(())
    }
}

/// Writes each figure as a plain-text table.
///
/// # Examples
///
/// ```
/// use tempo_report::figure::Figure;
/// use tempo_report::render::{Renderer, TextRenderer};
/// use tempo_series::select::TimeBlock;
///
/// let block = TimeBlock { index: 0, hour: "0h".into(), values: vec![1.0, 2.0] };
/// let mut renderer = TextRenderer::new(Vec::new());
/// renderer.render(&Figure::linearity(&block)).unwrap();
/// let text = String::from_utf8(renderer.into_inner()).unwrap();
/// assert!(text.starts_with("== Scatter Plot of Time Periods vs. Frequencies =="));
/// ```
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_figure(&mut self, figure: &Figure) -> io::Result<()> {
        writeln!(self.out, "== {} ==", figure.title)?;
        match &figure.kind {
            FigureKind::Scatter(points) => {
                writeln!(self.out, "{:>16}  {:>16}", figure.x_label, figure.y_label)?;
                for (x, y) in points {
                    writeln!(self.out, "{x:>16.4}  {y:>16.4}")?;
                }
            }
            FigureKind::Bars(hist) => {
                writeln!(self.out, "{:>27}  {:>9}", figure.x_label, figure.y_label)?;
                let top = hist.counts.iter().copied().max().unwrap_or(0).max(1);
                for (edge, count) in hist.edges.windows(2).zip(&hist.counts) {
                    let bar = "#".repeat((count * 40 / top) as usize);
                    writeln!(
                        self.out,
                        "[{:>12.4}, {:>12.4}]  {count:>9}  {bar}",
                        edge[0], edge[1]
                    )?;
                }
            }
            FigureKind::QuantileQuantile(qq) => {
                writeln!(self.out, "{:>16}  {:>16}", figure.x_label, figure.y_label)?;
                for (x, y) in qq.points() {
                    writeln!(self.out, "{x:>16.4}  {y:>16.4}")?;
                }
                if let Some(line) = qq.reference {
                    writeln!(
                        self.out,
                        "reference line: y = {:.4} + {:.4}x (r = {:.4})",
                        line.intercept, line.slope, line.r
                    )?;
                }
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, figure: &Figure) -> Result<(), TempoError> {
        self.write_figure(figure)?;
        Ok(())
    }
}
