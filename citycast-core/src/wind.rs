use serde::{Deserialize, Serialize};

/// 16-point compass direction, each sector 22.5° wide and centred on its bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassDirection {
    #[default]
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

const SECTOR_DEGREES: f64 = 22.5;

impl CompassDirection {
    pub const ALL: [CompassDirection; 16] = [
        CompassDirection::N,
        CompassDirection::Nne,
        CompassDirection::Ne,
        CompassDirection::Ene,
        CompassDirection::E,
        CompassDirection::Ese,
        CompassDirection::Se,
        CompassDirection::Sse,
        CompassDirection::S,
        CompassDirection::Ssw,
        CompassDirection::Sw,
        CompassDirection::Wsw,
        CompassDirection::W,
        CompassDirection::Wnw,
        CompassDirection::Nw,
        CompassDirection::Nnw,
    ];

    /// Direction for a bearing in degrees. Values outside `[0, 360)` wrap;
    /// NaN and infinities map to `N`.
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return CompassDirection::N;
        }

        let index = (degrees / SECTOR_DEGREES).round().rem_euclid(16.0) as usize;
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::Nne => "NNE",
            CompassDirection::Ne => "NE",
            CompassDirection::Ene => "ENE",
            CompassDirection::E => "E",
            CompassDirection::Ese => "ESE",
            CompassDirection::Se => "SE",
            CompassDirection::Sse => "SSE",
            CompassDirection::S => "S",
            CompassDirection::Ssw => "SSW",
            CompassDirection::Sw => "SW",
            CompassDirection::Wsw => "WSW",
            CompassDirection::W => "W",
            CompassDirection::Wnw => "WNW",
            CompassDirection::Nw => "NW",
            CompassDirection::Nnw => "NNW",
        }
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
