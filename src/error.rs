//! Error types shared across the document models, the parser pipeline and
//! the builder.

/// Unified error type for parsing and building CDXML schemes.
#[derive(Debug, Clone, PartialEq)]
pub enum CdxmlError {
    /// The document root has no `<page>` child.
    NoPage,
    /// A child element's tag is neither consumed nor ignored by its parent.
    UnknownTag { parent: String, child: String },
    /// A child expected at most once appeared several times, or a fixed
    /// cardinality was violated.
    Cardinality { tag: String, count: usize },
    /// An attribute was missing or failed to parse as coordinates/numbers.
    MalformedAttribute { name: String, value: String },
    /// The input was not well-formed XML.
    Syntax(String),
    /// Builder input lacked a field the rebuild needs.
    MissingField { entity: String, field: String },
}

impl std::fmt::Display for CdxmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CdxmlError::NoPage => write!(f, "CDXML have no pages"),
            CdxmlError::UnknownTag { parent, child } => {
                write!(f, "unknown tag <{}> in <{}>", child, parent)
            }
            CdxmlError::Cardinality { tag, count } => {
                write!(f, "<{}> expect only one but: {}", tag, count)
            }
            CdxmlError::MalformedAttribute { name, value } => {
                write!(f, "malformed attribute {}={:?}", name, value)
            }
            CdxmlError::Syntax(msg) => write!(f, "XML syntax error: {}", msg),
            CdxmlError::MissingField { entity, field } => {
                write!(f, "{} is missing required field {:?}", entity, field)
            }
        }
    }
}

impl std::error::Error for CdxmlError {}

impl CdxmlError {
    pub(crate) fn malformed(name: &str, value: &str) -> Self {
        CdxmlError::MalformedAttribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}
