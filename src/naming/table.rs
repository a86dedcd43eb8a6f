//! Color name lookup table
//!
//! Maps raw RGB samples to probability distributions over a closed
//! vocabulary of 11 color names:
//! - Quantizes each channel into 32 bins for O(1), allocation-free lookup
//! - Parses the table once from a text resource; lookups never re-parse
//! - Immutable after construction and safe to share across threads
//!
//! Algorithm tag: `algo-quantized-color-name-lookup`

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use palette::{FromColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::constants::table::{BIN_WIDTH, CELL_COUNT, CHANNEL_BINS};
use crate::error::{MatchError, Result};
use crate::naming::distribution::ColorDistribution;

/// One label from the fixed color-name vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Black,
    Blue,
    Brown,
    Grey,
    Green,
    Orange,
    Pink,
    Purple,
    Red,
    White,
    Yellow,
}

impl ColorName {
    /// Number of names in the vocabulary
    pub const COUNT: usize = 11;

    /// All names, in table column order
    pub const ALL: [ColorName; ColorName::COUNT] = [
        ColorName::Black,
        ColorName::Blue,
        ColorName::Brown,
        ColorName::Grey,
        ColorName::Green,
        ColorName::Orange,
        ColorName::Pink,
        ColorName::Purple,
        ColorName::Red,
        ColorName::White,
        ColorName::Yellow,
    ];

    /// Column index of this name in table rows and weight arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase label as used in learning files and results
    pub fn as_str(self) -> &'static str {
        match self {
            ColorName::Black => "black",
            ColorName::Blue => "blue",
            ColorName::Brown => "brown",
            ColorName::Grey => "grey",
            ColorName::Green => "green",
            ColorName::Orange => "orange",
            ColorName::Pink => "pink",
            ColorName::Purple => "purple",
            ColorName::Red => "red",
            ColorName::White => "white",
            ColorName::Yellow => "yellow",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorName {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        ColorName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MatchError::UnknownColorName { name: s.to_string() })
    }
}

/// Representative RGB value per color name, used by the prototype table
const PROTOTYPES: [(ColorName, [u8; 3]); ColorName::COUNT] = [
    (ColorName::Black, [0, 0, 0]),
    (ColorName::Blue, [0, 0, 255]),
    (ColorName::Brown, [139, 69, 19]),
    (ColorName::Grey, [128, 128, 128]),
    (ColorName::Green, [0, 128, 0]),
    (ColorName::Orange, [255, 165, 0]),
    (ColorName::Pink, [255, 192, 203]),
    (ColorName::Purple, [128, 0, 128]),
    (ColorName::Red, [255, 0, 0]),
    (ColorName::White, [255, 255, 255]),
    (ColorName::Yellow, [255, 255, 0]),
];

/// Quantized lookup table from RGB samples to color-name distributions
///
/// Immutable once constructed; intended to be wrapped in an `Arc` and
/// shared by every matcher that needs it.
#[derive(Debug)]
pub struct ColorNameTable {
    cells: Vec<[f64; ColorName::COUNT]>,
}

impl ColorNameTable {
    /// Load the table from a text resource file
    ///
    /// File format: one data row per quantization cell, whitespace
    /// separated, `#`-prefixed lines ignored:
    ///
    /// ```text
    /// R G B w_black w_blue w_brown w_grey w_green w_orange w_pink w_purple w_red w_white w_yellow
    /// ```
    ///
    /// R, G, B may be any representative color of the cell (0-255). Every
    /// cell must be covered exactly once; weights must be non-negative with
    /// a positive sum and are renormalized on load.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::TableError` when the file is missing, a row is
    /// malformed, a cell is defined twice, or cells are left uncovered.
    /// A table failure is fatal to the matcher.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            MatchError::table(format!("cannot open table resource '{}'", path.display()), e)
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse the table from any buffered reader (see [`Self::from_file`])
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut cells = vec![None::<[f64; ColorName::COUNT]>; CELL_COUNT];

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| MatchError::table("read failure in table resource", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 3 + ColorName::COUNT {
                return Err(MatchError::table_msg(format!(
                    "line {}: expected {} fields, found {}",
                    line_no + 1,
                    3 + ColorName::COUNT,
                    fields.len()
                )));
            }

            let mut rgb = [0u8; 3];
            for (i, field) in fields[..3].iter().enumerate() {
                rgb[i] = field.parse::<u8>().map_err(|e| {
                    MatchError::table(format!("line {}: bad channel value '{}'", line_no + 1, field), e)
                })?;
            }

            let mut weights = [0.0f64; ColorName::COUNT];
            for (i, field) in fields[3..].iter().enumerate() {
                let w = field.parse::<f64>().map_err(|e| {
                    MatchError::table(format!("line {}: bad weight '{}'", line_no + 1, field), e)
                })?;
                if w < 0.0 || !w.is_finite() {
                    return Err(MatchError::table_msg(format!(
                        "line {}: negative or non-finite weight {}",
                        line_no + 1,
                        w
                    )));
                }
                weights[i] = w;
            }

            let sum: f64 = weights.iter().sum();
            if sum <= 0.0 {
                return Err(MatchError::table_msg(format!(
                    "line {}: weights sum to zero",
                    line_no + 1
                )));
            }
            for w in &mut weights {
                *w /= sum;
            }

            let index = Self::cell_index(rgb);
            if cells[index].is_some() {
                return Err(MatchError::table_msg(format!(
                    "line {}: cell for {:?} defined twice",
                    line_no + 1,
                    rgb
                )));
            }
            cells[index] = Some(weights);
        }

        let missing = cells.iter().filter(|c| c.is_none()).count();
        let cells: Option<Vec<_>> = cells.into_iter().collect();
        match cells {
            Some(cells) => Ok(Self { cells }),
            None => Err(MatchError::table_msg(format!(
                "table resource leaves {} of {} cells uncovered",
                missing, CELL_COUNT
            ))),
        }
    }

    /// Build a synthetic table from built-in color prototypes
    ///
    /// Each cell's distribution is the normalized inverse-square Lab
    /// distance from the cell center to the 11 prototype colors. Fully
    /// deterministic; used for tests and for bootstrapping a table
    /// resource when the learned one is unavailable.
    pub fn from_prototypes() -> Self {
        let prototype_lab: Vec<Lab> = PROTOTYPES
            .iter()
            .map(|(_, rgb)| rgb_to_lab(*rgb))
            .collect();

        let mut cells = Vec::with_capacity(CELL_COUNT);
        for r_bin in 0..CHANNEL_BINS {
            for g_bin in 0..CHANNEL_BINS {
                for b_bin in 0..CHANNEL_BINS {
                    let center = [
                        bin_center(r_bin),
                        bin_center(g_bin),
                        bin_center(b_bin),
                    ];
                    let center_lab = rgb_to_lab(center);

                    let mut weights = [0.0f64; ColorName::COUNT];
                    for ((name, _), proto) in PROTOTYPES.iter().zip(&prototype_lab) {
                        let d2 = lab_distance_squared(center_lab, *proto);
                        // 1.0 floor keeps exact prototype hits finite
                        weights[name.index()] = 1.0 / d2.max(1.0);
                    }
                    let sum: f64 = weights.iter().sum();
                    for w in &mut weights {
                        *w /= sum;
                    }
                    cells.push(weights);
                }
            }
        }

        // iteration order above must match cell_index
        let table = Self { cells };
        debug_assert_eq!(table.cells.len(), CELL_COUNT);
        table
    }

    /// Look up the color-name distribution for one RGB sample
    ///
    /// Total and deterministic for every possible sample; pure and safe
    /// for concurrent reads.
    pub fn distribution_for(&self, rgb: [u8; 3]) -> ColorDistribution {
        ColorDistribution::from_normalized(self.cells[Self::cell_index(rgb)])
    }

    fn cell_index(rgb: [u8; 3]) -> usize {
        let r = rgb[0] as usize / BIN_WIDTH;
        let g = rgb[1] as usize / BIN_WIDTH;
        let b = rgb[2] as usize / BIN_WIDTH;
        (r * CHANNEL_BINS + g) * CHANNEL_BINS + b
    }
}

/// Center color of one quantization bin
fn bin_center(bin: usize) -> u8 {
    (bin * BIN_WIDTH + BIN_WIDTH / 2) as u8
}

/// Convert an 8-bit RGB triple to Lab (D65)
fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let srgb = Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    );
    Lab::from_color(srgb)
}

/// Squared Euclidean distance in Lab space (ΔE76 without the square root)
fn lab_distance_squared(a: Lab, b: Lab) -> f64 {
    let dl = (a.l - b.l) as f64;
    let da = (a.a - b.a) as f64;
    let db = (a.b - b.b) as f64;
    dl * dl + da * da + db * db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::scoring::DISTRIBUTION_SUM_TOLERANCE;
    use std::io::Cursor;

    #[test]
    fn test_color_name_round_trip() {
        for name in ColorName::ALL {
            assert_eq!(name.as_str().parse::<ColorName>().unwrap(), name);
        }
        assert!("magenta".parse::<ColorName>().is_err());
    }

    #[test]
    fn test_cell_index_covers_all_samples() {
        assert_eq!(ColorNameTable::cell_index([0, 0, 0]), 0);
        assert_eq!(ColorNameTable::cell_index([255, 255, 255]), CELL_COUNT - 1);
        // all samples inside one bin share a cell
        assert_eq!(
            ColorNameTable::cell_index([8, 16, 24]),
            ColorNameTable::cell_index([15, 23, 31])
        );
    }

    #[test]
    fn test_prototype_table_distributions_sum_to_one() {
        let table = ColorNameTable::from_prototypes();
        for rgb in [[0, 0, 0], [255, 0, 0], [13, 200, 77], [255, 255, 255]] {
            let dist = table.distribution_for(rgb);
            assert!((dist.sum() - 1.0).abs() < DISTRIBUTION_SUM_TOLERANCE);
        }
    }

    #[test]
    fn test_prototype_table_names_primaries() {
        let table = ColorNameTable::from_prototypes();
        assert_eq!(table.distribution_for([250, 5, 5]).dominant().0, ColorName::Red);
        assert_eq!(table.distribution_for([5, 5, 250]).dominant().0, ColorName::Blue);
        assert_eq!(table.distribution_for([5, 5, 5]).dominant().0, ColorName::Black);
        assert_eq!(
            table.distribution_for([250, 250, 250]).dominant().0,
            ColorName::White
        );
    }

    #[test]
    fn test_from_reader_rejects_short_row() {
        let result = ColorNameTable::from_reader(Cursor::new("4 4 4 0.5 0.5\n"));
        assert!(matches!(result, Err(MatchError::TableError { .. })));
    }

    #[test]
    fn test_from_reader_rejects_uncovered_cells() {
        // a single valid row still leaves 32767 cells uncovered
        let row = "4 4 4 1 0 0 0 0 0 0 0 0 0 0\n";
        let result = ColorNameTable::from_reader(Cursor::new(row));
        assert!(matches!(result, Err(MatchError::TableError { .. })));
    }

    #[test]
    fn test_from_reader_rejects_duplicate_cell() {
        let rows = "4 4 4 1 0 0 0 0 0 0 0 0 0 0\n5 5 5 1 0 0 0 0 0 0 0 0 0 0\n";
        let result = ColorNameTable::from_reader(Cursor::new(rows));
        assert!(matches!(result, Err(MatchError::TableError { .. })));
    }

    #[test]
    fn test_from_file_missing_resource() {
        let result = ColorNameTable::from_file(Path::new("no_such_table.txt"));
        assert!(matches!(result, Err(MatchError::TableError { .. })));
    }
}
