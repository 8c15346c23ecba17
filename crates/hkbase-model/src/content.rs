//! Content types accepted by the hkbase import endpoint.

/// Mimetype of a payload handed to `import_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `application/json` — entities in hkbase's native representation.
    Json,
    /// `text/turtle` — RDF Turtle.
    Turtle,
    /// `application/rdf+xml` — RDF/XML.
    RdfXml,
    /// `application/n-triples` — RDF N-Triples.
    NTriples,
    /// `application/trig` — RDF TriG.
    Trig,
    /// `text/plain`.
    Plain,
}

impl ContentType {
    /// The mimetype string sent in the `Content-Type` header.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Turtle => "text/turtle",
            ContentType::RdfXml => "application/rdf+xml",
            ContentType::NTriples => "application/n-triples",
            ContentType::Trig => "application/trig",
            ContentType::Plain => "text/plain",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = UnknownContentType;

    /// Parse a mimetype string or a short name (`json`, `turtle`/`ttl`,
    /// `rdfxml`/`rdf`, `ntriples`/`nt`, `trig`, `plain`/`txt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application/json" | "json" => Ok(ContentType::Json),
            "text/turtle" | "turtle" | "ttl" => Ok(ContentType::Turtle),
            "application/rdf+xml" | "rdfxml" | "rdf" => Ok(ContentType::RdfXml),
            "application/n-triples" | "ntriples" | "nt" => Ok(ContentType::NTriples),
            "application/trig" | "trig" => Ok(ContentType::Trig),
            "text/plain" | "plain" | "txt" => Ok(ContentType::Plain),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// Error parsing a content-type name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown content type: {0:?}")]
pub struct UnknownContentType(pub String);
