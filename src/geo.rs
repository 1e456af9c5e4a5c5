use crate::error::GeolocationError;
use crate::types::Coords;

/// A single position request. Implementations do not retry.
pub trait Geolocation {
    fn current_position(&mut self) -> Result<Coords, GeolocationError>;
}

/// Position known up front (from flags or a test), or none at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocation for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, GeolocationError> {
        self.0.ok_or(GeolocationError::Unavailable)
    }
}
