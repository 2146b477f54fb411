//! Horizontal single-axis tracker with optional backtracking.

/// Surface orientation produced by the tracker for one timestep (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOrientation {
    /// Signed rotation; positive tilts the surface towards `axis_azimuth + 90`.
    pub rotation: f64,
    pub surface_tilt: f64,
    pub surface_azimuth: f64,
}

/// A tracker rotating about a horizontal axis.
///
/// # Fields
/// * `axis_azimuth` - Compass direction of the rotation axis (180 = north-south axis)
/// * `max_angle` - Mechanical rotation limit, symmetric about horizontal
/// * `backtrack` - Rotate back at low sun to avoid row-to-row shading
/// * `gcr` - Ground coverage ratio (module width / row pitch), used by backtracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleAxisTracker {
    pub axis_azimuth: f64,
    pub max_angle: f64,
    pub backtrack: bool,
    pub gcr: f64,
}

impl SingleAxisTracker {
    /// Orients the surface for a sun at (`zenith`, `azimuth`).
    ///
    /// The tracker stows flat while the sun is below the horizon.
    pub fn orient(&self, zenith: f64, azimuth: f64) -> TrackerOrientation {
        if zenith >= 90.0 {
            return self.orientation_for(0.0);
        }

        let zen = zenith.to_radians();
        let across_axis = zen.sin() * (azimuth - self.axis_azimuth).to_radians().sin();
        let ideal = across_axis.atan2(zen.cos()).to_degrees();

        let mut rotation = ideal;
        if self.backtrack && self.gcr > 0.0 {
            let shade_ratio = (ideal.to_radians().cos() / self.gcr).clamp(-1.0, 1.0);
            if shade_ratio < 1.0 {
                rotation += -ideal.signum() * shade_ratio.acos().to_degrees();
            }
        }

        self.orientation_for(rotation.clamp(-self.max_angle, self.max_angle))
    }

    fn orientation_for(&self, rotation: f64) -> TrackerOrientation {
        let facing = if rotation >= 0.0 { 90.0 } else { -90.0 };
        TrackerOrientation {
            rotation,
            surface_tilt: rotation.abs(),
            surface_azimuth: (self.axis_azimuth + facing).rem_euclid(360.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pv::irradiance::aoi;

    fn tracker(backtrack: bool) -> SingleAxisTracker {
        SingleAxisTracker {
            axis_azimuth: 180.0,
            max_angle: 60.0,
            backtrack,
            gcr: 0.35,
        }
    }

    #[test]
    fn follows_sun_in_the_rotation_plane() {
        let t = tracker(false);
        let o = t.orient(50.0, 90.0);
        assert!((o.rotation + 50.0).abs() < 1e-9);
        assert!((o.surface_azimuth - 90.0).abs() < 1e-9);
        let incidence = aoi(o.surface_tilt, o.surface_azimuth, 50.0, 90.0);
        assert!(incidence.abs() < 1e-4);
    }

    #[test]
    fn afternoon_faces_west() {
        let o = tracker(false).orient(40.0, 260.0);
        assert!(o.rotation > 0.0);
        assert!((o.surface_azimuth - 270.0).abs() < 1e-9);
    }

    #[test]
    fn respects_max_angle() {
        let o = tracker(false).orient(85.0, 90.0);
        assert_eq!(o.rotation, -60.0);
        assert_eq!(o.surface_tilt, 60.0);
    }

    #[test]
    fn backtracking_reduces_rotation_at_low_sun() {
        let free = tracker(false).orient(80.0, 95.0);
        let back = tracker(true).orient(80.0, 95.0);
        assert!(back.rotation.abs() < free.rotation.abs());
    }

    #[test]
    fn backtracking_is_inactive_at_high_sun() {
        let free = tracker(false).orient(20.0, 120.0);
        let back = tracker(true).orient(20.0, 120.0);
        assert_eq!(free, back);
    }

    #[test]
    fn stows_flat_at_night() {
        let o = tracker(true).orient(100.0, 10.0);
        assert_eq!(o.surface_tilt, 0.0);
    }
}
