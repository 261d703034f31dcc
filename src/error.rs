use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfVisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("PDF read error: {0}")]
    PdfReadError(String),

    #[error("PDF write error: {0}")]
    PdfWriteError(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("{message}")]
    Visualization {
        message: String,
        #[source]
        source: Box<PdfVisError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`PdfVisError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl PdfVisError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an argument error.
    invalid_argument => InvalidArgument,
    /// Create a PDF read error.
    pdf_read => PdfReadError,
    /// Create a PDF write error.
    pdf_write => PdfWriteError,
    /// Create a drawing surface error.
    surface => SurfaceError,
    /// Create an extraction model error.
    model => ModelError,
}

impl PdfVisError {
    /// Wrap `source` into a [`PdfVisError::Visualization`] error.
    pub fn visualization(msg: impl Into<String>, source: PdfVisError) -> Self {
        Self::Visualization {
            message: msg.into(),
            source: Box::new(source),
        }
    }

    /// True for errors the caller can fix by passing different arguments.
    pub fn is_argument_error(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => true,
            Self::Visualization { source, .. } => source.is_argument_error(),
            _ => false,
        }
    }
}

impl From<lopdf::Error> for PdfVisError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfReadError(e.to_string())
    }
}

impl From<serde_json::Error> for PdfVisError {
    fn from(e: serde_json::Error) -> Self {
        Self::ModelError(e.to_string())
    }
}

impl From<serde_yml::Error> for PdfVisError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfVisError>;
