//! Labelled geographic points.

use super::RideValidationError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate a coordinate pair.
    ///
    /// `prefix` names the field family in errors, e.g. `pickup` yields
    /// `pickup_latitude`.
    ///
    /// # Errors
    /// Rejects non-finite values and values outside ±90/±180.
    pub fn new(
        prefix: &'static str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, RideValidationError> {
        let (lat_field, lng_field) = field_names(prefix);
        check_axis(lat_field, latitude, 90)?;
        check_axis(lng_field, longitude, 180)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn field_names(prefix: &str) -> (&'static str, &'static str) {
    match prefix {
        "pickup" => ("pickup_latitude", "pickup_longitude"),
        "destination" => ("destination_latitude", "destination_longitude"),
        _ => ("latitude", "longitude"),
    }
}

fn check_axis(field: &'static str, value: f64, limit: u8) -> Result<(), RideValidationError> {
    if !value.is_finite() {
        return Err(RideValidationError::NonFiniteCoordinate { field });
    }
    if value.abs() > f64::from(limit) {
        return Err(RideValidationError::CoordinateOutOfRange {
            field,
            limit,
            value,
        });
    }
    Ok(())
}

/// Human label plus coordinate, e.g. a pickup point.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    label: String,
    coordinate: Coordinate,
}

impl Location {
    /// Validate a labelled location.
    ///
    /// # Errors
    /// Rejects a blank label or an invalid coordinate.
    pub fn new(
        prefix: &'static str,
        label: impl AsRef<str>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, RideValidationError> {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            let field = if prefix == "pickup" {
                "pickup_location"
            } else {
                "destination"
            };
            return Err(RideValidationError::EmptyLabel { field });
        }
        Ok(Self {
            label: trimmed.to_owned(),
            coordinate: Coordinate::new(prefix, latitude, longitude)?,
        })
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Geographic position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}
