use serde::{Deserialize, Serialize};

const FOUR_NEIGHBORS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

const EIGHT_NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Pixel neighborhood used when relaxing labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge-sharing neighbors only
    Four,
    /// Edge- and corner-sharing neighbors
    #[default]
    Eight,
}

impl Connectivity {
    /// `(dx, dy)` offsets of the neighborhood, excluding the center
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &FOUR_NEIGHBORS,
            Connectivity::Eight => &EIGHT_NEIGHBORS,
        }
    }
}
