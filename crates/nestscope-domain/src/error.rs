//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nestscope
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Service not registered in the container
    #[error("Not found: {resource}")]
    NotFound {
        /// The service key that was not found
        resource: String,
    },

    /// Invalid argument or violated precondition
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A factory or activator failed while building a service
    #[error("Failed to activate {key}: {message}")]
    Activation {
        /// Key of the service being built
        key: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A built instance did not match the requested contract type
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch {
        /// Key that was resolved
        key: String,
        /// Rust type the caller asked for
        expected: &'static str,
    },

    /// Resolution through a released resolver scope
    #[error("Scope {scope} has been disposed")]
    ScopeDisposed {
        /// Identifier of the released scope
        scope: String,
    },

    /// Override scope disposed while another scope is current for its chain
    #[error("Scope {scope} disposed out of order (current scope: {current})")]
    ScopeOrder {
        /// Scope being disposed
        scope: String,
        /// Scope that is current for the chain, or `none`
        current: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Container error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an activation error
    pub fn activation<K: ToString, S: Into<String>>(key: K, message: S) -> Self {
        Self::Activation {
            key: key.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an activation error wrapping the failure that caused it
    pub fn activation_with_source<K, E>(key: K, source: E) -> Self
    where
        K: ToString,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Activation {
            key: key.to_string(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<K: ToString>(key: K, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected,
        }
    }
}

// Scope lifecycle error creation methods
impl Error {
    /// Create a scope disposed error
    pub fn scope_disposed<S: ToString>(scope: S) -> Self {
        Self::ScopeDisposed {
            scope: scope.to_string(),
        }
    }

    /// Create an out-of-order disposal error
    pub fn scope_order<S: ToString, C: ToString>(scope: S, current: Option<C>) -> Self {
        Self::ScopeOrder {
            scope: scope.to_string(),
            current: current.map_or_else(|| "none".to_string(), |c| c.to_string()),
        }
    }
}

// Configuration and infrastructure error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
