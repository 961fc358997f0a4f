// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Artifact encoding and decoding.
//!
//! A saved exploded view is a single SVG document of the canvas size holding
//! the pristine raster as an embedded `<image id="pristine">` data URI, a
//! `<metadata>` block listing the markers, and one `<g class="callout">`
//! group per marker drawn with the same primitives as the canvas.
//!
//! Markers are always layered on top of the embedded original, so reopening
//! an artifact for editing never starts from a flattened composite.

use super::media::PristineImage;
use super::serialization::MarkerSidecar;
use super::storage::ArtifactStore;
use crate::error::EditorError;
use crate::models::marker::{Marker, Side};
use crate::render::{self, Primitive, Surface};
use crate::util::geometry::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use scraper::{ElementRef, Html, Selector};
use std::fmt::Write;

/// Stable identifier of the embedded pristine raster.
pub const PRISTINE_ID: &str = "pristine";
/// Identifier of the embedded marker listing.
pub const METADATA_ID: &str = "callout-markers";
const CALLOUT_CLASS: &str = "callout";

/// Result of decoding an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArtifact {
    pub pristine: PristineImage,
    pub markers: Vec<Marker>,
}

/// Encode the pristine raster and markers into a self-contained SVG document.
pub fn encode(pristine: &PristineImage, markers: &[Marker]) -> Result<String, EditorError> {
    let sidecar = MarkerSidecar::new(markers)
        .to_json()
        .map_err(|e| EditorError::SaveFailed(format!("Failed to encode markers: {}", e)))?;

    let width = CANVAS_WIDTH;
    let height = CANVAS_HEIGHT;
    let mut svg = String::new();
    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(svg, r#"<metadata id="{METADATA_ID}">{}</metadata>"#, escape_text(&sidecar));
    let _ = writeln!(
        svg,
        r#"<image id="{PRISTINE_ID}" x="0" y="0" width="{width}" height="{height}" href="data:{};base64,{}"/>"#,
        pristine.mime(),
        STANDARD.encode(pristine.bytes())
    );

    let mut surface = SvgSurface { svg: &mut svg };
    for marker in markers {
        let _ = writeln!(surface.svg, r#"<g class="{CALLOUT_CLASS}">"#);
        for primitive in &render::callout(marker) {
            surface.draw(primitive);
        }
        let _ = writeln!(surface.svg, "</g>");
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Decode an artifact into its pristine raster and markers.
///
/// Markers come from the first strategy that yields them: the sidecar
/// supplied by storage, then the listing embedded in the document, then
/// inference from the drawn callout primitives.
pub fn decode(document: &[u8], sidecar: Option<MarkerSidecar>) -> Result<DecodedArtifact, EditorError> {
    let html = parse(document)?;
    let pristine = extract_pristine(&html)?;

    let external = ExternalSidecar(sidecar);
    let strategies: [&dyn MarkerStrategy; 3] = [&external, &EmbeddedSidecar, &PrimitiveScan];
    for strategy in strategies {
        if let Some(markers) = strategy.extract(&html)? {
            log::info!(
                "Decoded {} markers from artifact using {}",
                markers.len(),
                strategy.name()
            );
            return Ok(DecodedArtifact { pristine, markers });
        }
    }

    Ok(DecodedArtifact {
        pristine,
        markers: Vec::new(),
    })
}

/// Fetch the artifact behind `reference` and return its untouched base raster.
pub fn resolve_pristine(store: &dyn ArtifactStore, reference: &str) -> Result<PristineImage, EditorError> {
    let document = store
        .load_document(reference)
        .map_err(|e| EditorError::ImageLoad(format!("{:#}", e)))?;
    extract_pristine(&parse(&document)?)
}

fn parse(document: &[u8]) -> Result<Html, EditorError> {
    let text = std::str::from_utf8(document)
        .map_err(|_| EditorError::MalformedArtifact("not an SVG document".to_string()))?;
    let html = Html::parse_document(text);
    if html.select(&selector("svg")?).next().is_none() {
        return Err(EditorError::MalformedArtifact(
            "no <svg> root element".to_string(),
        ));
    }
    Ok(html)
}

fn selector(css: &str) -> Result<Selector, EditorError> {
    Selector::parse(css).map_err(|e| EditorError::MalformedArtifact(format!("bad selector {css}: {e:?}")))
}

fn extract_pristine(html: &Html) -> Result<PristineImage, EditorError> {
    let element = match html.select(&selector(&format!("image#{PRISTINE_ID}"))?).next() {
        Some(element) => element,
        None => {
            // Older documents may carry a single unnamed raster
            let any_image = selector("image")?;
            let mut images = html.select(&any_image);
            match (images.next(), images.next()) {
                (Some(only), None) => only,
                _ => {
                    return Err(EditorError::MalformedArtifact(
                        "no embedded pristine raster".to_string(),
                    ))
                }
            }
        }
    };

    let href = element.value().attr("href").ok_or_else(|| {
        EditorError::MalformedArtifact("embedded raster has no href".to_string())
    })?;
    PristineImage::decode(decode_data_uri(href)?)
}

fn decode_data_uri(href: &str) -> Result<Vec<u8>, EditorError> {
    let (header, payload) = href
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| {
            EditorError::MalformedArtifact("embedded raster is not a data URI".to_string())
        })?;
    if !header.ends_with(";base64") {
        return Err(EditorError::MalformedArtifact(
            "embedded raster is not base64 encoded".to_string(),
        ));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| EditorError::MalformedArtifact(format!("bad embedded raster: {}", e)))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

struct SvgSurface<'a> {
    svg: &'a mut String,
}

impl Surface for SvgSurface<'_> {
    fn draw(&mut self, primitive: &Primitive) {
        let ink = hex(render::INK);
        let _ = match primitive {
            Primitive::Leader { from, to } => writeln!(
                self.svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{ink}" stroke-width="{}"/>"#,
                from.x,
                from.y,
                to.x,
                to.y,
                render::LEADER_WIDTH
            ),
            Primitive::Dot { center, radius } => writeln!(
                self.svg,
                r#"<circle class="anchor" cx="{}" cy="{}" r="{radius}" fill="{ink}"/>"#,
                center.x, center.y
            ),
            Primitive::Badge { center, radius } => writeln!(
                self.svg,
                r#"<circle class="badge" cx="{}" cy="{}" r="{radius}" fill="{ink}"/>"#,
                center.x, center.y
            ),
            Primitive::Numeral { center, text } => writeln!(
                self.svg,
                r#"<text x="{}" y="{}" fill="{}" font-family="Arial, sans-serif" font-size="{}" font-weight="bold" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                center.x,
                center.y,
                hex(render::NUMERAL_INK),
                render::NUMERAL_SIZE,
                escape_text(text)
            ),
        };
    }
}

/// One way of recovering the marker list from a parsed artifact.
trait MarkerStrategy {
    fn name(&self) -> &'static str;
    /// `Ok(None)` means "not available here, try the next strategy".
    fn extract(&self, html: &Html) -> Result<Option<Vec<Marker>>, EditorError>;
}

/// Listing supplied by the storage collaborator.
struct ExternalSidecar(Option<MarkerSidecar>);

impl MarkerStrategy for ExternalSidecar {
    fn name(&self) -> &'static str {
        "storage sidecar"
    }

    fn extract(&self, _html: &Html) -> Result<Option<Vec<Marker>>, EditorError> {
        Ok(self.0.as_ref().map(|sidecar| sidecar.markers.clone()))
    }
}

/// Listing embedded in the document's `<metadata>`.
struct EmbeddedSidecar;

impl MarkerStrategy for EmbeddedSidecar {
    fn name(&self) -> &'static str {
        "embedded sidecar"
    }

    fn extract(&self, html: &Html) -> Result<Option<Vec<Marker>>, EditorError> {
        let Some(metadata) = html.select(&selector(&format!("metadata#{METADATA_ID}"))?).next() else {
            return Ok(None);
        };

        let json: String = metadata.text().collect();
        match MarkerSidecar::from_json(json.trim()) {
            Ok(sidecar) => Ok(Some(sidecar.markers)),
            Err(e) => {
                log::warn!("Ignoring unreadable embedded marker list: {:#}", e);
                Ok(None)
            }
        }
    }
}

/// Infers markers from each group's leader line and numeral.
struct PrimitiveScan;

impl MarkerStrategy for PrimitiveScan {
    fn name(&self) -> &'static str {
        "primitive scan"
    }

    fn extract(&self, html: &Html) -> Result<Option<Vec<Marker>>, EditorError> {
        let groups = selector(&format!("g.{CALLOUT_CLASS}"))?;

        let mut markers = Vec::new();
        for group in html.select(&groups) {
            let (Some(leader), Some(numeral)) = (child(group, "line"), child(group, "text")) else {
                continue;
            };
            match scan_callout(leader, numeral) {
                Some(marker) => markers.push(marker),
                None => log::warn!("Skipping unreadable callout group: {}", group.html()),
            }
        }
        Ok(Some(markers))
    }
}

/// First direct child element of `group` named `name`.
fn child<'a>(group: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    group
        .children()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == name)
}

fn scan_callout(leader: ElementRef<'_>, numeral: ElementRef<'_>) -> Option<Marker> {
    let number = |name: &str| -> Option<f64> {
        leader
            .value()
            .attr(name)?
            .trim()
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
    };

    let anchor_x = number("x1")?;
    let id = numeral.text().collect::<String>().trim().parse().ok()?;
    let side = if anchor_x < geometry::MIDLINE {
        Side::Left
    } else {
        Side::Right
    };

    Some(Marker {
        id,
        x: number("x2")?,
        y: number("y2")?,
        side,
    })
}
