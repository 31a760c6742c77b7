//! Kroki diagram rendering with parallel HTTP requests.
//!
//! Every diagram is POSTed to `{server}/{endpoint}/svg` as plain text. Requests
//! run on the global rayon pool; one failing diagram never affects the others.

use std::time::Duration;

use rayon::prelude::*;
use ureq::Agent;

use crate::language::DiagramLanguage;

/// Header Kroki reads the Mermaid theme from.
const THEME_HEADER: &str = "Kroki-Diagram-Options-Theme";

/// Diagram to render.
#[derive(Debug)]
pub struct DiagramRequest {
    pub index: usize,
    pub source: String,
    pub language: DiagramLanguage,
    /// Theme option, sent only for languages that support one.
    pub theme: Option<String>,
}

/// Result of rendering a single diagram to SVG.
#[derive(Debug)]
pub struct RenderedSvg {
    /// Index matching the original diagram request.
    pub index: usize,
    pub svg: String,
}

/// Single diagram rendering error.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {kind}")]
pub struct DiagramError {
    pub index: usize,
    pub kind: DiagramErrorKind,
}

/// Kind of diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("response is not an SVG document")]
    InvalidSvg,
}

/// Result of rendering diagrams with partial failures.
#[derive(Debug)]
pub struct PartialRenderResult {
    pub rendered: Vec<RenderedSvg>,
    pub errors: Vec<DiagramError>,
}

/// Create HTTP agent with the specified timeout.
///
/// Status codes are not turned into transport errors so the Kroki error body
/// can be reported.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Send a diagram to Kroki and return the response body.
fn send_diagram_request(
    agent: &Agent,
    diagram: &DiagramRequest,
    server_url: &str,
) -> Result<String, DiagramError> {
    let endpoint = diagram.language.kroki_endpoint();
    let url = format!("{server_url}/{endpoint}/svg");

    let mut request = agent.post(&url).header("Content-Type", "text/plain");
    if let Some(theme) = diagram.theme.as_deref()
        && diagram.language.supports_theme()
    {
        request = request.header(THEME_HEADER, theme);
    }

    let response = request
        .send(diagram.source.as_bytes())
        .map_err(|e| DiagramError {
            index: diagram.index,
            kind: DiagramErrorKind::Http(e.to_string()),
        })?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError {
            index: diagram.index,
            kind: DiagramErrorKind::Http(format!("HTTP {status}: {}", error_body.trim())),
        });
    }

    body.read_to_string().map_err(|e| DiagramError {
        index: diagram.index,
        kind: DiagramErrorKind::Io(e.to_string()),
    })
}

/// Render a single diagram to SVG via Kroki.
fn render_one_svg(
    agent: &Agent,
    diagram: &DiagramRequest,
    server_url: &str,
) -> Result<RenderedSvg, DiagramError> {
    let body = send_diagram_request(agent, diagram, server_url)?;
    let svg = body.trim();
    if !svg.contains("<svg") {
        return Err(DiagramError {
            index: diagram.index,
            kind: DiagramErrorKind::InvalidSvg,
        });
    }

    Ok(RenderedSvg {
        index: diagram.index,
        svg: svg.to_owned(),
    })
}

/// Render all diagrams to SVG in parallel.
///
/// Returns partial results: successfully rendered diagrams even when some fail.
#[must_use]
pub fn render_all_svg(
    diagrams: &[DiagramRequest],
    server_url: &str,
    agent: &Agent,
) -> PartialRenderResult {
    let server_url = server_url.trim_end_matches('/');

    let results: Vec<Result<RenderedSvg, DiagramError>> = diagrams
        .par_iter()
        .map(|d| render_one_svg(agent, d, server_url))
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(item) => rendered.push(item),
            Err(error) => errors.push(error),
        }
    }

    PartialRenderResult { rendered, errors }
}
