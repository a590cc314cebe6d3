// ============================================================
// Layer 3 — Geodetic Reference and ECEF Origin
// ============================================================
// Raw poses are stored in Earth-Centered-Earth-Fixed (ECEF)
// metres, i.e. values around 10^6 that only vary by a few
// hundred metres across the capture area. Every downstream
// coordinate is expressed relative to one fixed Origin so the
// numbers stay close to zero.
//
// The reference point is a plain configuration value; the
// conversion itself lives in infra::geodesy.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A geodetic point: degrees for the angles, metres above the
/// WGS84 ellipsoid for the altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticReference {
    pub longitude_deg: f64,
    pub latitude_deg:  f64,
    pub altitude_m:    f64,
}

impl GeodeticReference {
    /// Reference point of the Urbanscape captures (Lausanne).
    pub const URBANSCAPE: GeodeticReference = GeodeticReference {
        longitude_deg: 6.5668,
        latitude_deg:  46.5191,
        altitude_m:    390.0,
    };

    pub fn new(longitude_deg: f64, latitude_deg: f64, altitude_m: f64) -> Self {
        Self { longitude_deg, latitude_deg, altitude_m }
    }
}

impl Default for GeodeticReference {
    fn default() -> Self {
        Self::URBANSCAPE
    }
}

/// ECEF position of the run's reference point.
///
/// Computed once at start-up and only ever read afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin(Vector3<f64>);

impl Origin {
    pub fn new(ecef: Vector3<f64>) -> Self {
        Self(ecef)
    }

    pub fn ecef(&self) -> &Vector3<f64> {
        &self.0
    }

    /// Express an ECEF point relative to this origin
    pub fn relative(&self, ecef: &Vector3<f64>) -> Vector3<f64> {
        ecef - self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_subtracts_origin() {
        let origin = Origin::new(Vector3::new(4_368_000.0, 502_800.0, 4_605_400.0));
        let point  = Vector3::new(4_368_010.5, 502_790.0, 4_605_400.0);
        let rel    = origin.relative(&point);
        assert_eq!(rel, Vector3::new(10.5, -10.0, 0.0));
    }

    #[test]
    fn test_default_reference_is_urbanscape() {
        assert_eq!(GeodeticReference::default(), GeodeticReference::URBANSCAPE);
    }
}
