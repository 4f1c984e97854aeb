use crate::foundation::location::TemplateLocation;

/// Convenience result type used across Trellis.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Configuration errors (`Configuration`, `MissingBinding`, `ElementIdOverflow`) are fatal:
/// they describe a template that can never execute correctly. Everything else is a runtime
/// failure of one request.
#[derive(thiserror::Error, Debug)]
pub enum TrellisError {
    /// Malformed template structure or unknown collaborator (component, page).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A binding the element cannot work without was not declared.
    #[error("configuration error: missing required binding '{binding}' on {element}")]
    MissingBinding {
        /// Element kind that requires the binding.
        element: String,
        /// Name of the absent binding.
        binding: String,
    },

    /// Too many siblings at one tree level to address with a 16-bit counter.
    #[error("configuration error: element id overflow below '{path}' (max {max} siblings)")]
    ElementIdOverflow {
        /// Element-id path of the scope whose counter overflowed.
        path: String,
        /// Largest counter value a level supports.
        max: u16,
    },

    /// Attempted write through a constant binding.
    #[error("evaluation error: binding '{binding}' is not settable")]
    NotSettable {
        /// Name of the binding.
        binding: String,
    },

    /// Key-path resolution or action failure.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Failure while evaluating a named binding.
    #[error("binding '{binding}': {source}")]
    Binding {
        /// Name of the binding being evaluated.
        binding: String,
        /// Underlying failure.
        #[source]
        source: Box<TrellisError>,
    },

    /// Failure annotated with its position in the component tree.
    #[error(
        "{source} [component {component_path}, element {element_id}{}]",
        .location.as_ref().map(|l| format!(", {l}")).unwrap_or_default()
    )]
    Located {
        /// Slash-separated names of the components enclosing the failing element.
        component_path: String,
        /// Element-id path at the time of failure.
        element_id: String,
        /// Template source position of the failing element, when known.
        location: Option<TemplateLocation>,
        /// Underlying failure.
        #[source]
        source: Box<TrellisError>,
    },

    /// Errors when serializing or deserializing definitions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrellisError {
    /// Build a [`TrellisError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`TrellisError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`TrellisError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`TrellisError::MissingBinding`] value.
    pub fn missing_binding(element: impl Into<String>, binding: impl Into<String>) -> Self {
        Self::MissingBinding {
            element: element.into(),
            binding: binding.into(),
        }
    }

    /// Annotate `self` as a failure while evaluating `binding`.
    pub fn in_binding(self, binding: &str) -> Self {
        match self {
            // Positional context stays outermost.
            Self::Located { .. } | Self::Binding { .. } => self,
            other => Self::Binding {
                binding: binding.to_owned(),
                source: Box::new(other),
            },
        }
    }

    /// Attach tree-position context. Keeps an existing (inner, more precise) position.
    pub fn located(
        self,
        component_path: impl Into<String>,
        element_id: impl Into<String>,
        location: Option<TemplateLocation>,
    ) -> Self {
        if self.is_located() {
            return self;
        }
        Self::Located {
            component_path: component_path.into(),
            element_id: element_id.into(),
            location,
            source: Box::new(self),
        }
    }

    /// `true` once positional context has been attached.
    pub fn is_located(&self) -> bool {
        matches!(self, Self::Located { .. })
    }

    /// `true` for configuration errors that no retry can fix.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_)
            | Self::MissingBinding { .. }
            | Self::ElementIdOverflow { .. } => true,
            Self::Binding { source, .. } | Self::Located { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// The innermost error, stripped of binding and positional annotations.
    pub fn root_cause(&self) -> &TrellisError {
        match self {
            Self::Binding { source, .. } | Self::Located { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
