use binaural_datasets::{Direction, LoadError};

/// A direction could not be turned into a filter.
///
/// Hosts are expected to clamp their parameters, so seeing one of these means a caller broke the contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("Cannot interpolate from an empty measurement set")]
    EmptySet,

    #[error("Direction {direction} is outside azimuth -180..=180 and elevation -90..=90")]
    DirectionOutOfRange { direction: Direction },
}

/// Invalid renderer settings.  Detected before any audio is processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("The crossfade must be at least one frame long")]
    ZeroCrossfade,

    #[error("The reference distance must be positive and finite, but got {0}")]
    InvalidReferenceDistance(f64),

    #[error("The source distance must be positive and finite, but got {0}")]
    InvalidDistance(f64),

    #[error("Interpolation needs at least one neighbor")]
    ZeroNeighbors,

    #[error("The maximum block size must be at least one frame")]
    ZeroBlockSize,

    #[error("The exact-match tolerance must be non-negative and finite, but got {0}")]
    InvalidTolerance(f64),
}

#[derive(Debug, derive_more::Display, derive_more::IsVariant)]
enum ErrorPayload {
    #[display(fmt = "Unable to load measurement set: {}", _0)]
    Load(LoadError),

    #[display(fmt = "Interpolation failed: {}", _0)]
    Interpolation(InterpolationError),

    #[display(fmt = "Invalid configuration: {}", _0)]
    Configuration(ConfigurationError),
}

#[derive(Debug, thiserror::Error)]
#[error("{payload}")]
pub struct Error {
    payload: ErrorPayload,
}

macro_rules! conv {
    ($variant: ident, $from_err: path) => {
        impl From<$from_err> for Error {
            fn from(value: $from_err) -> Error {
                Error {
                    payload: ErrorPayload::$variant(value),
                }
            }
        }
    };
}

conv!(Load, LoadError);
conv!(Interpolation, InterpolationError);
conv!(Configuration, ConfigurationError);

impl Error {
    /// Did this come from loading the measurement set?
    pub fn is_load(&self) -> bool {
        self.payload.is_load()
    }

    pub fn is_interpolation(&self) -> bool {
        self.payload.is_interpolation()
    }

    pub fn is_configuration(&self) -> bool {
        self.payload.is_configuration()
    }

    pub fn as_load(&self) -> Option<&LoadError> {
        match &self.payload {
            ErrorPayload::Load(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_interpolation(&self) -> Option<&InterpolationError> {
        match &self.payload {
            ErrorPayload::Interpolation(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match &self.payload {
            ErrorPayload::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let e: Error = ConfigurationError::ZeroCrossfade.into();
        assert!(e.is_configuration());
        assert!(!e.is_load());
        assert_eq!(e.as_configuration(), Some(&ConfigurationError::ZeroCrossfade));

        let e: Error = LoadError::Empty.into();
        assert!(e.is_load());
        assert!(e.as_interpolation().is_none());

        let e: Error = InterpolationError::EmptySet.into();
        assert!(e.is_interpolation());
    }

    #[test]
    fn test_display_includes_the_cause() {
        let e: Error = ConfigurationError::InvalidDistance(-1.0).into();
        let shown = e.to_string();
        assert!(shown.starts_with("Invalid configuration"), "{shown}");
        assert!(shown.contains("-1"), "{shown}");
    }
}
