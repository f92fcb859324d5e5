/// One flux sample, keyed by its position in the backend's array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub index: usize,
    pub flux: f64,
}

impl SamplePoint {
    pub fn new(index: usize, flux: f64) -> Self {
        Self { index, flux }
    }
}

impl From<(usize, f64)> for SamplePoint {
    fn from(v: (usize, f64)) -> Self {
        SamplePoint {
            index: v.0,
            flux: v.1,
        }
    }
}

impl From<SamplePoint> for (f64, f64) {
    fn from(p: SamplePoint) -> Self {
        (p.index as f64, p.flux)
    }
}

/// Enumerate raw flux values into a dense series; values pass through untouched
pub fn series_from_flux(flux: &[f64]) -> Vec<SamplePoint> {
    flux.iter()
        .copied()
        .enumerate()
        .map(SamplePoint::from)
        .collect()
}
