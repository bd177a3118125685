//! Surface (boundary condition) catalog shared by every scheme
//!
//! Surface indices are 1-based positions in [`SURFACE_CATALOG`]: the 13
//! Anderson fuel models first, then the non-burnable classes. Terrain faces
//! refer to surfaces by this index, and the `&GEOM` block lists the ids in
//! the same order.

/// One `&SURF` definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDef {
    /// FDS `ID`
    pub id: &'static str,
    /// Display colour
    pub rgb: [u8; 3],
    /// Level-set fuel model, `None` for non-burnable surfaces
    pub fuel_index: Option<u8>,
}

impl SurfaceDef {
    const fn fuel(id: &'static str, rgb: [u8; 3], index: u8) -> Self {
        Self {
            id,
            rgb,
            fuel_index: Some(index),
        }
    }

    const fn inert(id: &'static str, rgb: [u8; 3]) -> Self {
        Self {
            id,
            rgb,
            fuel_index: None,
        }
    }

    /// Render as an FDS `&SURF` record
    pub fn to_fds(&self) -> String {
        let [r, g, b] = self.rgb;
        match self.fuel_index {
            Some(index) => format!(
                "&SURF ID='{}' RGB={r:3},{g:3},{b:3} VEG_LSET_FUEL_INDEX={index:2} /",
                self.id
            ),
            None => format!("&SURF ID='{}' RGB={r:3},{g:3},{b:3} /", self.id),
        }
    }
}

/// Every surface a terrain face may reference, in surface-index order
pub const SURFACE_CATALOG: [SurfaceDef; 19] = [
    SurfaceDef::fuel("A01", [255, 254, 212], 1),
    SurfaceDef::fuel("A02", [255, 253, 102], 2),
    SurfaceDef::fuel("A03", [236, 212, 99], 3),
    SurfaceDef::fuel("A04", [254, 193, 119], 4),
    SurfaceDef::fuel("A05", [249, 197, 92], 5),
    SurfaceDef::fuel("A06", [217, 196, 152], 6),
    SurfaceDef::fuel("A07", [170, 155, 127], 7),
    SurfaceDef::fuel("A08", [229, 253, 214], 8),
    SurfaceDef::fuel("A09", [162, 191, 90], 9),
    SurfaceDef::fuel("A10", [114, 154, 85], 10),
    SurfaceDef::fuel("A11", [235, 212, 253], 11),
    SurfaceDef::fuel("A12", [163, 177, 243], 12),
    SurfaceDef::fuel("A13", [0, 0, 0], 13),
    SurfaceDef::inert("Urban", [186, 119, 80]),
    SurfaceDef::inert("Snow-Ice", [234, 234, 234]),
    SurfaceDef::inert("Agriculture", [253, 242, 242]),
    SurfaceDef::inert("Water", [137, 183, 221]),
    SurfaceDef::inert("Barren", [133, 153, 156]),
    SurfaceDef::inert("NA", [255, 255, 255]),
];

/// Highest valid surface index
pub const MAX_SURFACE_INDEX: u32 = SURFACE_CATALOG.len() as u32;

/// Surface definition for a 1-based surface index
pub fn surface(index: u32) -> Option<&'static SurfaceDef> {
    let position = usize::try_from(index).ok()?.checked_sub(1)?;
    SURFACE_CATALOG.get(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        assert_eq!(MAX_SURFACE_INDEX, 19);
        assert_eq!(surface(1).unwrap().id, "A01");
        assert_eq!(surface(13).unwrap().id, "A13");
        assert_eq!(surface(14).unwrap().id, "Urban");
        assert_eq!(surface(18).unwrap().id, "Barren");
        assert_eq!(surface(19).unwrap().id, "NA");
        assert!(surface(0).is_none());
        assert!(surface(20).is_none());
    }

    #[test]
    fn test_fuel_models_come_first() {
        for (i, def) in SURFACE_CATALOG.iter().enumerate() {
            if i < 13 {
                assert_eq!(def.fuel_index, Some(i as u8 + 1));
            } else {
                assert!(def.fuel_index.is_none());
            }
        }
    }

    #[test]
    fn test_surf_records() {
        assert_eq!(
            surface(1).unwrap().to_fds(),
            "&SURF ID='A01' RGB=255,254,212 VEG_LSET_FUEL_INDEX= 1 /"
        );
        assert_eq!(
            surface(13).unwrap().to_fds(),
            "&SURF ID='A13' RGB=  0,  0,  0 VEG_LSET_FUEL_INDEX=13 /"
        );
        assert_eq!(surface(14).unwrap().to_fds(), "&SURF ID='Urban' RGB=186,119, 80 /");
    }
}
