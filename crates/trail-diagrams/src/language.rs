//! Supported diagram languages.

/// Diagram languages rendered through Kroki.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLanguage {
    Mermaid,
    PlantUml,
    GraphViz,
    Ditaa,
    Erd,
    Nomnoml,
    Svgbob,
    WaveDrom,
}

impl DiagramLanguage {
    /// Parse language from a code fence info string.
    ///
    /// Accepts both `mermaid` and `kroki-mermaid`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.strip_prefix("kroki-").unwrap_or(s);

        match lang {
            "mermaid" => Some(Self::Mermaid),
            "plantuml" => Some(Self::PlantUml),
            "graphviz" | "dot" => Some(Self::GraphViz),
            "ditaa" => Some(Self::Ditaa),
            "erd" => Some(Self::Erd),
            "nomnoml" => Some(Self::Nomnoml),
            "svgbob" => Some(Self::Svgbob),
            "wavedrom" => Some(Self::WaveDrom),
            _ => None,
        }
    }

    /// Kroki endpoint name for this diagram type.
    #[must_use]
    pub fn kroki_endpoint(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::WaveDrom => "wavedrom",
        }
    }

    /// Whether Kroki accepts a `theme` diagram option for this language.
    #[must_use]
    pub fn supports_theme(self) -> bool {
        matches!(self, Self::Mermaid)
    }
}
