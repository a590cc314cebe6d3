// ============================================================
// Layer 5 — Geodetic → ECEF Conversion
// ============================================================
// Converts a geodetic point (longitude, latitude, ellipsoidal
// height) into Earth-Centered-Earth-Fixed cartesian metres on
// the WGS84 ellipsoid:
//
//   N = a / sqrt(1 - e² sin²φ)
//   X = (N + h) cosφ cosλ
//   Y = (N + h) cosφ sinλ
//   Z = (N (1 - e²) + h) sinφ
//
// The closed form is exact, so the same input always yields
// bit-identical output.

use nalgebra::Vector3;

use crate::domain::error::{Result, SetupError};
use crate::domain::origin::{GeodeticReference, Origin};

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// First eccentricity squared, e² = f (2 - f)
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Convert geodetic coordinates to ECEF.
///
/// # Arguments
/// * `lon_deg` - longitude in **degrees**
/// * `lat_deg` - geodetic latitude in **degrees**, within [-90, 90]
/// * `alt_m`   - height above the ellipsoid in **metres**
///
/// # Errors
/// `SetupError::Transform` for non-finite input or a latitude or
/// longitude outside its valid range.
pub fn geodetic_to_ecef(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Result<Vector3<f64>> {
    if !(lon_deg.is_finite() && lat_deg.is_finite() && alt_m.is_finite()) {
        return Err(SetupError::Transform(format!(
            "non-finite geodetic input (lon={lon_deg}, lat={lat_deg}, alt={alt_m})"
        )));
    }
    if !(-90.0..=90.0).contains(&lat_deg) {
        return Err(SetupError::Transform(format!(
            "latitude {lat_deg} outside [-90, 90]"
        )));
    }
    if !(-180.0..=360.0).contains(&lon_deg) {
        return Err(SetupError::Transform(format!(
            "longitude {lon_deg} outside [-180, 360]"
        )));
    }

    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    // Prime vertical radius of curvature
    let n = WGS84_A / (1.0 - WGS84_E2 * lat.sin().powi(2)).sqrt();

    Ok(Vector3::new(
        (n + alt_m) * lat.cos() * lon.cos(),
        (n + alt_m) * lat.cos() * lon.sin(),
        (n * (1.0 - WGS84_E2) + alt_m) * lat.sin(),
    ))
}

/// Compute the run origin from an explicit reference point and
/// log it for audit.
pub fn resolve_origin(reference: &GeodeticReference) -> Result<Origin> {
    let origin = Origin::new(geodetic_to_ecef(
        reference.longitude_deg,
        reference.latitude_deg,
        reference.altitude_m,
    )?);

    let xyz = origin.ecef();
    tracing::info!(
        "Origin XYZ: {:.6}, {:.6}, {:.6} (lon={}, lat={}, alt={})",
        xyz.x,
        xyz.y,
        xyz.z,
        reference.longitude_deg,
        reference.latitude_deg,
        reference.altitude_m,
    );

    Ok(origin)
}
