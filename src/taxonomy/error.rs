/// Errors raised by the hierarchy-resolution engine.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("fragment is not a LearningStandardItem")]
    NotAnEntry,

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown hierarchy level: {0:?}")]
    UnknownKind(String),

    #[error("reference id registered twice: {0}")]
    DuplicateRegistration(String),

    #[error("XML parsing error in {document}: {message}")]
    XmlParse { document: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaxonomyError {
    /// Per-fragment defects are reported and skipped; everything else aborts the load.
    pub fn is_fragment_local(&self) -> bool {
        matches!(
            self,
            Self::NotAnEntry
                | Self::MissingAttribute(_)
                | Self::MissingField(_)
                | Self::UnknownKind(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;
