//! Irradiance decomposition and transposition to the plane of array.

/// Sky diffuse transposition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkyModel {
    /// Uniform sky dome.
    Isotropic,
    /// Hay-Davies: splits diffuse into circumsolar and isotropic parts using
    /// the anisotropy index `dni / dni_extra`.
    #[default]
    HayDavies,
}

/// Plane-of-array irradiance components (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    pub direct: f64,
    pub sky_diffuse: f64,
    pub ground_diffuse: f64,
}

impl PoaIrradiance {
    pub fn diffuse(&self) -> f64 {
        self.sky_diffuse + self.ground_diffuse
    }

    pub fn global(&self) -> f64 {
        self.direct + self.diffuse()
    }
}

/// Horizontal irradiance split into beam and diffuse parts (W/m²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub dni: f64,
    pub dhi: f64,
}

/// Cosine of the angle of incidence between the sun and the surface normal.
pub fn cos_aoi(surface_tilt: f64, surface_azimuth: f64, zenith: f64, azimuth: f64) -> f64 {
    let (tilt, zen) = (surface_tilt.to_radians(), zenith.to_radians());
    let projection = zen.cos() * tilt.cos()
        + zen.sin() * tilt.sin() * (azimuth - surface_azimuth).to_radians().cos();
    projection.clamp(-1.0, 1.0)
}

/// Angle of incidence in degrees (0 = sun on the normal, >90 = behind the panel).
pub fn aoi(surface_tilt: f64, surface_azimuth: f64, zenith: f64, azimuth: f64) -> f64 {
    cos_aoi(surface_tilt, surface_azimuth, zenith, azimuth)
        .acos()
        .to_degrees()
}

/// Erbs (1982) decomposition of GHI into DNI and DHI.
///
/// The clearness index uses a floor of `cos(zenith) = 0.065` and is capped at 1.
/// DNI is forced to zero for zeniths beyond 87°, where the division by
/// `cos(zenith)` blows up.
pub fn erbs(ghi: f64, zenith: f64, dni_extra: f64) -> Decomposition {
    const MIN_COS_ZENITH: f64 = 0.065;
    const MAX_ZENITH: f64 = 87.0;

    let ghi = ghi.max(0.0);
    let cos_zenith = zenith.to_radians().cos();
    let horizontal_extra = dni_extra * cos_zenith.max(MIN_COS_ZENITH);
    let kt = if horizontal_extra > 0.0 {
        (ghi / horizontal_extra).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let diffuse_fraction = if kt <= 0.22 {
        1.0 - 0.09 * kt
    } else if kt <= 0.8 {
        0.9511 - 0.1604 * kt + 4.388 * kt.powi(2) - 16.638 * kt.powi(3) + 12.336 * kt.powi(4)
    } else {
        0.165
    };

    let dhi = diffuse_fraction * ghi;
    let dni = if zenith >= MAX_ZENITH {
        0.0
    } else {
        ((ghi - dhi) / cos_zenith).max(0.0)
    };
    Decomposition { dni, dhi }
}

/// Inputs to the transposition of one timestep.
#[derive(Debug, Clone, Copy)]
pub struct TranspositionInput {
    pub surface_tilt: f64,
    pub surface_azimuth: f64,
    pub zenith: f64,
    pub azimuth: f64,
    pub dni: f64,
    pub ghi: f64,
    pub dhi: f64,
    pub dni_extra: f64,
    pub albedo: f64,
}

/// Transposes horizontal irradiance onto the tilted surface.
pub fn poa_components(input: &TranspositionInput, model: SkyModel) -> PoaIrradiance {
    let tilt = input.surface_tilt.to_radians();
    let cos_incidence = cos_aoi(
        input.surface_tilt,
        input.surface_azimuth,
        input.zenith,
        input.azimuth,
    );

    let direct = (input.dni * cos_incidence).max(0.0);
    let isotropic_view = (1.0 + tilt.cos()) / 2.0;

    let sky_diffuse = match model {
        SkyModel::Isotropic => input.dhi * isotropic_view,
        SkyModel::HayDavies => {
            let anisotropy = if input.dni_extra > 0.0 {
                (input.dni / input.dni_extra).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let cos_zenith = input.zenith.to_radians().cos().max(0.01745);
            let rb = cos_incidence.max(0.0) / cos_zenith;
            input.dhi * (anisotropy * rb + (1.0 - anisotropy) * isotropic_view)
        }
    }
    .max(0.0);

    let ground_diffuse = (input.ghi * input.albedo * (1.0 - tilt.cos()) / 2.0).max(0.0);

    PoaIrradiance {
        direct,
        sky_diffuse,
        ground_diffuse,
    }
}
