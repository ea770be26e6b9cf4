//! Preview rendering: page blocks the way the live site lays them out, and
//! Markdown documents as HTML.

use crate::blocks::{BlockKind, BlockType, MediaSource};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde_json::Value;

fn text<'a>(block: &'a Value, key: &str) -> &'a str {
    block.get(key).and_then(Value::as_str).unwrap_or("")
}

/// A display string for scalars; numbers are common in stats values.
fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn items<'a>(block: &'a Value, key: &str) -> &'a [Value] {
    block
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn non_empty<'a>(block: &'a Value, key: &str) -> Option<&'a str> {
    Some(text(block, key)).filter(|s| !s.is_empty())
}

/// Render a page's `blocks` list. Documents without blocks preview empty.
pub fn render_blocks(doc: &Value) -> Markup {
    let blocks = items(doc, "blocks");
    html! {
        div.preview-page {
            @if blocks.is_empty() {
                p.preview-empty { "This document has no blocks to preview." }
            }
            @for block in blocks {
                (render_block(block))
            }
        }
    }
}

pub fn render_block(block: &Value) -> Markup {
    match BlockType::of(block) {
        BlockType::Known(kind) => match kind {
            BlockKind::Hero => hero(block),
            BlockKind::PainPoints => pain_points(block),
            BlockKind::Features => features(block),
            BlockKind::Media => media(block),
            BlockKind::Stats => stats(block),
            BlockKind::ProductList => product_list(block),
            BlockKind::LogoWall => logo_wall(block),
            BlockKind::Cta => cta(block),
            BlockKind::RichText => rich_text(block),
        },
        BlockType::Unknown(tag) => html! {
            div.block.block-unknown { "Unknown Block Type: " (tag) }
        },
    }
}

fn hero(block: &Value) -> Markup {
    html! {
        section.block.block-hero {
            @if let Some(bg) = non_empty(block, "backgroundImage") {
                img.hero-bg src=(bg) alt="";
            }
            h1 { (text(block, "title")) }
            p.subtitle { (text(block, "subtitle")) }
            a.button href=(non_empty(block, "ctaLink").unwrap_or("/contact")) {
                (non_empty(block, "ctaText").unwrap_or("Get Started"))
            }
        }
    }
}

fn pain_points(block: &Value) -> Markup {
    html! {
        section.block.block-pain-points {
            h2 { (text(block, "title")) }
            dl.grid {
                @for item in items(block, "items") {
                    div.pain-point {
                        dt { (text(item, "title")) }
                        dd { (text(item, "desc")) }
                    }
                }
            }
        }
    }
}

fn features(block: &Value) -> Markup {
    let alternating = text(block, "layout") == "alternating";
    html! {
        section.block.block-features.alternating[alternating] {
            h2 { (text(block, "title")) }
            div.grid[!alternating] {
                @for (idx, item) in items(block, "items").iter().enumerate() {
                    div.feature.reversed[alternating && idx % 2 == 1] {
                        @if alternating {
                            @match non_empty(item, "image") {
                                Some(src) => {
                                    img src=(src) alt=(text(item, "title"));
                                },
                                None => {
                                    div.no-image { "No Image" }
                                },
                            }
                        }
                        h3 { (text(item, "title")) }
                        p { (text(item, "desc")) }
                    }
                }
            }
        }
    }
}

fn media(block: &Value) -> Markup {
    let caption = non_empty(block, "caption");
    let contained = text(block, "width") == "container";
    html! {
        section.block.block-media {
            @if let Some(source) = MediaSource::resolve(block) {
                div.media-frame.contained[contained] {
                    @match source {
                        MediaSource::YouTube { id } => {
                            a.video-cover href=(format!("https://www.youtube.com/embed/{id}?autoplay=1"))
                                target="_blank" rel="noopener" aria-label="Play Video" {
                                img src=(format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
                                    alt=(caption.unwrap_or("Video Thumbnail"));
                            }
                        }
                        MediaSource::VideoFile { url } => {
                            video controls src=(url) {
                                "Your browser does not support the video tag."
                            }
                        }
                        MediaSource::Image { url } => {
                            img src=(url) alt=(caption.unwrap_or(""));
                        }
                    }
                }
            }
            @if let Some(caption) = caption {
                p.caption { (caption) }
            }
        }
    }
}

fn stats(block: &Value) -> Markup {
    let blue = text(block, "background") == "blue";
    html! {
        section.block.block-stats.blue[blue] {
            div.grid {
                @for item in items(block, "items") {
                    div.stat {
                        div.stat-value { (scalar(item.get("value"))) }
                        div.stat-label { (scalar(item.get("label"))) }
                    }
                }
            }
        }
    }
}

fn product_list(block: &Value) -> Markup {
    html! {
        section.block.block-product-list {
            h3 { (text(block, "title")) }
            div.grid {
                @for pid in items(block, "productIds") {
                    @let pid = scalar(Some(pid));
                    div.product-card {
                        h4 { "Hardware Model " (pid) }
                        a href=(format!("/en/products/{pid}")) { "View Specs →" }
                    }
                }
            }
        }
    }
}

fn logo_wall(block: &Value) -> Markup {
    html! {
        section.block.block-logo-wall {
            p.eyebrow { (text(block, "title")) }
            div.logos {
                @for logo in items(block, "logos") {
                    @if let Some(src) = logo.as_str() {
                        img src=(src) alt="Client Logo";
                    }
                }
            }
        }
    }
}

fn cta(block: &Value) -> Markup {
    html! {
        section.block.block-cta {
            h2 { (text(block, "title")) }
            a.button href=(non_empty(block, "link").unwrap_or("/contact")) {
                (text(block, "buttonText"))
            }
        }
    }
}

fn rich_text(block: &Value) -> Markup {
    let centered = text(block, "align") == "center";
    html! {
        section.block.block-rich-text.centered[centered] {
            p.pre-line { (text(block, "content")) }
        }
    }
}

/// Markdown source to an HTML fragment.
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new(source);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

pub fn render_markdown(source: &str) -> Markup {
    html! {
        article.preview-markdown { (PreEscaped(markdown_to_html(source))) }
    }
}
