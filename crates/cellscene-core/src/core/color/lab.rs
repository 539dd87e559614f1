// CIE-Lab (D65) to sRGB conversion.

/// D65 reference white.
const WHITE_X: f64 = 0.950_470;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_830;

const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;

const GAMUT_TOLERANCE: f64 = 1e-6;

/// A color in CIE-Lab space: `l` in `[0, 100]`, `a` and `b` roughly in `[-100, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    pub fn distance(&self, other: &Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// Whether the color maps to a displayable sRGB triple without clipping.
    pub fn is_in_gamut(&self) -> bool {
        let [r, g, b] = lab_to_rgb_unclamped(self);
        [r, g, b]
            .iter()
            .all(|c| c.is_finite() && *c >= -GAMUT_TOLERANCE && *c <= 255.0 + GAMUT_TOLERANCE)
    }
}

/// An sRGB color. Channels are on the 0–255 scale unless produced by [`Rgb::to_unit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Rescales 0–255 channels to the `[0, 1]` display range.
    pub fn to_unit(self) -> Rgb {
        Rgb::new(self.r / 255.0, self.g / 255.0, self.b / 255.0)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

fn lab_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

fn xyz_rgb(c: f64) -> f64 {
    255.0
        * if c <= 0.003_04 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
}

fn lab_to_rgb_unclamped(lab: &Lab) -> [f64; 3] {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = WHITE_X * lab_xyz(fx);
    let y = WHITE_Y * lab_xyz(fy);
    let z = WHITE_Z * lab_xyz(fz);

    [
        xyz_rgb(3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z),
        xyz_rgb(-0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z),
        xyz_rgb(0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z),
    ]
}

/// Converts a Lab sample to sRGB with channels clamped to `[0, 255]`.
pub fn lab_to_rgb(lab: &Lab) -> Rgb {
    let [r, g, b] = lab_to_rgb_unclamped(lab);
    Rgb::new(r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b.clamp(0.0, 255.0))
}
