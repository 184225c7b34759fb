pub type Id = i64;

/// Name of the variant list that is materialized automatically.
pub const DEFAULT_LIST_NAME: &str = "default";

/// Catalog measure units that change how quantities are derived.
pub const SQUARE_MEASURE_ID: Id = 5;
pub const LINEAR_MEASURE_ID: Id = 6;

/// Physical size of an ordered product, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
    pub pieces: i64,
}

impl Dimensions {
    pub fn new(width: f64, length: f64, pieces: i64) -> Self {
        Self {
            width,
            length,
            pieces,
        }
    }

    pub fn is_sized(&self) -> bool {
        self.width > 0.0
    }

    /// Perimeter of all pieces in metres.
    pub fn perimeter_m(&self) -> f64 {
        (self.width + self.length) * 2.0 * self.pieces as f64 / 1000.0
    }
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_pieces() -> i64 {
    1
}
