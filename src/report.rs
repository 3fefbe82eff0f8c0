//! Report Document: an ordered sequence of blocks built incrementally and
//! serialized exactly once. Images are embedded as base64 data URIs so the
//! output is a single self-contained file; the PNGs referenced stay on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::info;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Spacer,
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Image { path: PathBuf, width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The assembled report: a title and an append-only block list.
#[derive(Debug, Default)]
pub struct Document {
    title: String,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Document {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Heading {
            level,
            text: text.into(),
        });
        self
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    pub fn spacer(&mut self) -> &mut Self {
        self.blocks.push(Block::Spacer);
        self
    }

    pub fn table(&mut self, header: Vec<String>, rows: Vec<Vec<String>>) -> &mut Self {
        self.blocks.push(Block::Table { header, rows });
        self
    }

    /// Embed an image at a fixed display size.
    pub fn image(&mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> &mut Self {
        self.blocks.push(Block::Image {
            path: path.into(),
            width,
            height,
        });
        self
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Serialize the document and write it to `path` in one shot.
    pub fn write_html(&self, path: &Path) -> Result<()> {
        let html = self.render_html()?;
        fs::write(path, html)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!("report saved as {}", path.display());
        Ok(())
    }

    fn render_html(&self) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(out, "<html><head><meta charset=\"utf-8\">");
        let _ = writeln!(out, "<title>{}</title>", escape(&self.title));
        let _ = writeln!(
            out,
            "<style>body{{font-family:sans-serif;max-width:860px;margin:2em auto}}\
             table{{border-collapse:collapse}}td,th{{border:1px solid #999;\
             padding:4px 8px;text-align:right}}th{{background:#eee}}</style>"
        );
        let _ = writeln!(out, "</head><body>");
        let _ = writeln!(out, "<h1>{}</h1>", escape(&self.title));

        for block in &self.blocks {
            match block {
                Block::Heading { level, text } => {
                    let level = (*level).clamp(1, 6);
                    let _ = writeln!(out, "<h{level}>{}</h{level}>", escape(text));
                }
                Block::Paragraph(text) => {
                    let _ = writeln!(out, "<p>{}</p>", escape(text));
                }
                Block::Spacer => {
                    let _ = writeln!(out, "<div style=\"height:12px\"></div>");
                }
                Block::Table { header, rows } => {
                    let _ = write!(out, "<table><tr>");
                    for cell in header {
                        let _ = write!(out, "<th>{}</th>", escape(cell));
                    }
                    let _ = writeln!(out, "</tr>");
                    for row in rows {
                        let _ = write!(out, "<tr>");
                        for cell in row {
                            let _ = write!(out, "<td>{}</td>", escape(cell));
                        }
                        let _ = writeln!(out, "</tr>");
                    }
                    let _ = writeln!(out, "</table>");
                }
                Block::Image {
                    path,
                    width,
                    height,
                } => {
                    let bytes = fs::read(path)
                        .with_context(|| format!("embedding image {}", path.display()))?;
                    let _ = writeln!(
                        out,
                        "<img src=\"data:image/png;base64,{}\" width=\"{width}\" height=\"{height}\">",
                        STANDARD.encode(&bytes)
                    );
                }
            }
        }

        let _ = writeln!(out, "</body></html>");
        Ok(out)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn blocks_keep_insertion_order() {
        let mut doc = Document::new("T");
        doc.heading(2, "A").paragraph("b").spacer().table(
            vec!["h".into()],
            vec![vec!["1".into()]],
        );
        assert_eq!(doc.blocks().len(), 4);
        assert!(matches!(doc.blocks()[0], Block::Heading { level: 2, .. }));
        assert!(matches!(doc.blocks()[3], Block::Table { .. }));
    }

    #[test]
    fn writes_single_html_file_with_embedded_image() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("chart.png");
        // Any bytes will do; embedding does not decode the image.
        let mut f = std::fs::File::create(&img).unwrap();
        f.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let mut doc = Document::new("Report <1>");
        doc.heading(3, "Chart").image(&img, 400, 250);

        let out = dir.path().join("report.html");
        doc.write_html(&out).unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("Report &lt;1&gt;"));
        assert!(html.contains("data:image/png;base64,iVBORw=="));
        assert!(html.contains("width=\"400\" height=\"250\""));
    }

    #[test]
    fn missing_image_fails_serialization() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new("R");
        doc.image(dir.path().join("absent.png"), 400, 250);
        assert!(doc.write_html(&dir.path().join("r.html")).is_err());
    }
}
