//! Tile renderer.
//!
//! Turns a [`Manifest`] into [`Tile`] view models and writes them as a
//! standalone HTML document. The grid is mounted into a single element
//! whose id is configurable (`root` by default). Tile values stay unescaped
//! in the view model; escaping happens only when writing markup.

use crate::domain::model::{IconRecord, Manifest, PageState, RenderedPage, Tile};
use crate::utils::error::ViewerError;
use html_escaper::HtmlEscaper;
use std::fmt::{self, Display, Formatter, Write as _};

/// Display adapter routing a value through `html_escaper`'s escaping writer.
struct Escape<'a>(&'a str);

impl Display for Escape<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(HtmlEscaper(f), "{}", self.0)
    }
}

pub const DEFAULT_MOUNT_ID: &str = "root";
pub const DEFAULT_PAGE_TITLE: &str = "Icon Grid";

const STYLESHEET: &str = "\
body { margin: 0; padding: 16px; background: #f9f9fa; font-family: sans-serif; }
.tiles { display: flex; flex-wrap: wrap; gap: 12px; }
.tile { width: 96px; height: 96px; display: flex; align-items: center; justify-content: center; background: #fff; border-radius: 8px; box-shadow: 0 1px 4px rgba(12, 12, 13, 0.1); }
.tile img { max-width: 80px; max-height: 80px; }
.load-error { color: #d70022; }
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub title: String,
    pub mount_id: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_PAGE_TITLE.to_string(),
            mount_id: DEFAULT_MOUNT_ID.to_string(),
        }
    }
}

impl Tile {
    /// hover 文字是 domains 的緊湊 JSON，與瀏覽器 JSON.stringify 相同
    pub fn from_record(record: &IconRecord) -> Self {
        let hover_text = serde_json::to_string(&record.domains)
            .unwrap_or_else(|_| "[]".to_string());
        Self {
            image_src: record.image_url.clone(),
            hover_text,
        }
    }
}

/// One tile per record, in manifest order.
pub fn render_tiles(manifest: &Manifest) -> Vec<Tile> {
    manifest.iter().map(Tile::from_record).collect()
}

pub fn render_tile_html(tile: &Tile) -> String {
    format!(
        r#"<div class="tile"><img src="{}" title="{}"></div>"#,
        Escape(&tile.image_src),
        Escape(&tile.hover_text)
    )
}

pub fn render_grid(tiles: &[Tile]) -> String {
    let mut grid = String::from("<div class=\"tiles\">");
    for tile in tiles {
        grid.push('\n');
        grid.push_str(&render_tile_html(tile));
    }
    if !tiles.is_empty() {
        grid.push('\n');
    }
    grid.push_str("</div>");
    grid
}

pub fn render_document(options: &PageOptions, mounted: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n<div id=\"{}\">{}</div>\n</body>\n</html>\n",
        Escape(&options.title),
        STYLESHEET,
        Escape(&options.mount_id),
        mounted
    )
}

#[derive(Debug, Clone, Default)]
pub struct TileRenderer {
    options: PageOptions,
}

impl TileRenderer {
    pub fn new(options: PageOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, manifest: &Manifest) -> RenderedPage {
        let tiles = render_tiles(manifest);
        let html = render_document(&self.options, &render_grid(&tiles));
        RenderedPage {
            state: PageState::Loaded,
            tiles,
            html,
        }
    }

    pub fn render_failure(&self, error: &ViewerError) -> RenderedPage {
        let message = format!(
            "<div class=\"load-error\"><p>Failed to load icons</p><p>{}</p></div>",
            Escape(&error.to_string())
        );
        RenderedPage {
            state: PageState::Failed,
            tiles: Vec::new(),
            html: render_document(&self.options, &message),
        }
    }

    pub fn render_blank(&self) -> RenderedPage {
        RenderedPage {
            state: PageState::Blank,
            tiles: Vec::new(),
            html: render_document(&self.options, ""),
        }
    }
}
