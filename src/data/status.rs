//! CO2 status bands and reading classification.
//!
//! A concentration maps to one of six fixed bands ordered by ascending upper
//! bound. The bands cover `[0, ∞)` without gaps; an absent reading maps to
//! the [`StatusBand::Loading`] pseudo-band.

/// Concentration at which the live gauge is full.
pub const GAUGE_FULL_SCALE_PPM: f64 = 2000.0;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Format as `#RRGGBB`.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Severity band for a CO2 reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBand {
    /// No reading yet. Never the result of classifying a number.
    Loading,
    Good,
    Moderate,
    Poor,
    Unhealthy,
    Severe,
    /// Everything above the last finite bound.
    Hazardous,
}

/// Bands with a finite upper bound, ascending. Anything above the last bound
/// is [`StatusBand::Hazardous`].
const BOUNDED_BANDS: [(f64, StatusBand); 5] = [
    (600.0, StatusBand::Good),
    (800.0, StatusBand::Moderate),
    (1000.0, StatusBand::Poor),
    (1200.0, StatusBand::Unhealthy),
    (1500.0, StatusBand::Severe),
];

/// Classify a concentration.
///
/// Total over non-negative input: returns the first band whose upper bound is
/// at least `ppm`, or [`StatusBand::Hazardous`] when `ppm` exceeds every
/// finite bound. `None` yields [`StatusBand::Loading`].
pub fn classify(ppm: Option<f64>) -> StatusBand {
    let Some(ppm) = ppm else {
        return StatusBand::Loading;
    };

    BOUNDED_BANDS
        .iter()
        .find(|(upper, _)| ppm <= *upper)
        .map_or(StatusBand::Hazardous, |(_, band)| *band)
}

impl StatusBand {
    /// The six real bands, mildest first.
    pub fn all() -> [StatusBand; 6] {
        [
            StatusBand::Good,
            StatusBand::Moderate,
            StatusBand::Poor,
            StatusBand::Unhealthy,
            StatusBand::Severe,
            StatusBand::Hazardous,
        ]
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            StatusBand::Loading => "Loading...",
            StatusBand::Good => "Good",
            StatusBand::Moderate => "Moderate",
            StatusBand::Poor => "Poor",
            StatusBand::Unhealthy => "Unhealthy",
            StatusBand::Severe => "Severe",
            StatusBand::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            StatusBand::Loading => Rgb(0x88, 0x88, 0x88),
            StatusBand::Good => Rgb(0x4C, 0xAF, 0x50),
            StatusBand::Moderate => Rgb(0xCD, 0xDC, 0x39),
            StatusBand::Poor => Rgb(0xFF, 0x57, 0x22),
            StatusBand::Unhealthy => Rgb(0xE9, 0x1E, 0x63),
            StatusBand::Severe => Rgb(0x9C, 0x27, 0xB0),
            StatusBand::Hazardous => Rgb(0xD5, 0x00, 0x00),
        }
    }

    /// Severity rank, 0 for Good through 5 for Hazardous.
    ///
    /// `None` for the Loading pseudo-band.
    pub fn rank(&self) -> Option<u8> {
        match self {
            StatusBand::Loading => None,
            StatusBand::Good => Some(0),
            StatusBand::Moderate => Some(1),
            StatusBand::Poor => Some(2),
            StatusBand::Unhealthy => Some(3),
            StatusBand::Severe => Some(4),
            StatusBand::Hazardous => Some(5),
        }
    }

    /// Lower edge in ppm: the previous band's upper bound, or 0 for Good.
    /// `None` for Loading.
    pub fn lower_bound(&self) -> Option<f64> {
        match self {
            StatusBand::Loading => None,
            StatusBand::Good => Some(0.0),
            _ => {
                let rank = self.rank()? as usize;
                BOUNDED_BANDS.get(rank - 1).map(|(upper, _)| *upper)
            }
        }
    }

    /// Inclusive upper bound in ppm. `None` for Loading and for the
    /// unbounded top band.
    pub fn upper_bound(&self) -> Option<f64> {
        BOUNDED_BANDS.iter().find(|(_, band)| band == self).map(|(upper, _)| *upper)
    }

    pub fn is_loading(&self) -> bool {
        *self == StatusBand::Loading
    }

    /// Whether text drawn on this band's color should be dark.
    pub fn wants_dark_text(&self) -> bool {
        matches!(self, StatusBand::Good | StatusBand::Moderate)
    }
}

/// Fill ratio of the live gauge for a concentration, clamped to `0.0..=1.0`.
pub fn gauge_ratio(ppm: f64) -> f64 {
    (ppm / GAUGE_FULL_SCALE_PPM).clamp(0.0, 1.0)
}
