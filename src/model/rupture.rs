use serde::Serialize;

use crate::gmm::gmminput::GmmInput;
use crate::model::location::Location;
use crate::model::site::Site;

/// Site-to-rupture distance metrics in km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distance {
    pub r_jb: f64,
    pub r_rup: f64,
    pub r_x: f64
}

/// Rupture geometry.
///
/// `Point` ruptures sit at the location's depth. `Planar` ruptures extend
/// from the top trace `start → end` down dip, to the right of the strike
/// direction, using the rupture's dip, width and top depth.
#[derive(Debug, Clone, PartialEq)]
pub enum RuptureSurface {
    Point(Location),
    Planar { start: Location, end: Location }
}

/// Single earthquake rupture with its annual rate of occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rupture {
    mag: f64,
    rate: f64,
    rake: f64,
    dip: f64,
    width: f64,
    z_top: f64,
    surface: RuptureSurface
}

impl Rupture {
    pub fn point(mag: f64, rate: f64, rake: f64, location: Location) -> Rupture {
        Rupture {
            mag,
            rate,
            rake,
            dip: 90.0,
            width: 0.0,
            z_top: location.depth(),
            surface: RuptureSurface::Point(location)
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn planar(
        mag: f64, rate: f64, rake: f64, dip: f64, width: f64, z_top: f64,
        start: Location, end: Location
    ) -> Rupture {
        Rupture {
            mag,
            rate,
            rake,
            dip,
            width,
            z_top,
            surface: RuptureSurface::Planar { start, end }
        }
    }

    pub fn mag(&self) -> f64 {
        self.mag
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn rake(&self) -> f64 {
        self.rake
    }

    pub fn dip(&self) -> f64 {
        self.dip
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn z_top(&self) -> f64 {
        self.z_top
    }

    /// Hypocentral depth: the point depth, or mid-width on a plane.
    pub fn z_hyp(&self) -> f64 {
        match self.surface {
            RuptureSurface::Point(location) => location.depth(),
            RuptureSurface::Planar { .. } => self.z_top + 0.5 * self.width * self.dip.to_radians().sin()
        }
    }

    pub fn surface(&self) -> &RuptureSurface {
        &self.surface
    }

    pub fn distance(&self, site: &Location) -> Distance {
        match &self.surface {
            RuptureSurface::Point(location) => {
                let r_jb = site.horizontal_distance(location);
                let depth = location.depth();
                Distance {
                    r_jb,
                    r_rup: (r_jb * r_jb + depth * depth).sqrt(),
                    r_x: r_jb
                }
            }
            RuptureSurface::Planar { start, end } => self.planar_distance(site, start, end)
        }
    }

    // 以場址為原點的局部平面座標：沿走向座標 ry、垂直走向座標 rx（上盤為正）。
    fn planar_distance(&self, site: &Location, start: &Location, end: &Location) -> Distance {
        let (ax, ay) = start.local_km(site);
        let (bx, by) = end.local_km(site);
        let length = (bx - ax).hypot(by - ay);
        let (sx, sy) = if length > 0.0 { ((bx - ax) / length, (by - ay) / length) } else { (1.0, 0.0) };

        // site relative to trace start, in strike / dip-direction axes
        let (dx, dy) = (-ax, -ay);
        let ry = dx * sx + dy * sy;
        let r_x = dx * sy - dy * sx;

        let (sin_dip, cos_dip) = self.dip.to_radians().sin_cos();
        let projected_width = self.width * cos_dip;

        let along = (-ry).max(ry - length).max(0.0);
        let across = (-r_x).max(r_x - projected_width).max(0.0);
        let r_jb = along.hypot(across);

        // closest down-dip position minimizes (rx − v·cosδ)² + (zTop + v·sinδ)²
        let v = (r_x * cos_dip - self.z_top * sin_dip).clamp(0.0, self.width);
        let horizontal = r_x - v * cos_dip;
        let depth = self.z_top + v * sin_dip;
        let r_rup = (along * along + horizontal * horizontal + depth * depth).sqrt();

        Distance { r_jb, r_rup, r_x }
    }

    pub fn gmm_input(&self, site: &Site, distance: &Distance) -> GmmInput {
        GmmInput::builder()
            .mag(self.mag)
            .distances(distance.r_jb, distance.r_rup, distance.r_x)
            .dip(self.dip)
            .width(self.width)
            .z_top(self.z_top)
            .z_hyp(self.z_hyp())
            .rake(self.rake)
            .vs30(site.vs30(), site.vs_inferred())
            .z1p0(site.z1p0())
            .z2p5(site.z2p5())
            .build()
    }
}
