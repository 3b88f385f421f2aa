//! # Hydrostatic heights and pressures on model levels
//!
//! Hybrid sigma-pressure models define the pressure on the boundary below each level
//! (half level) as `a[k] + b[k] · p_s`, with one `(a, b)` pair per model level. Heights are
//! obtained by integrating the hypsometric equation from the surface upward with the
//! virtual temperature of each layer (hydrometeors are neglected).
//!
//! Conventions
//! -----------------
//! * Level `0` is the top of the model, level `n − 1` the lowest level.
//! * `p_h[k]` / `height_h[k]` are on the half level **below** full level `k`, so
//!   `p_h[n − 1]` is the surface pressure and `height_h[n − 1]` the surface height.
//! * `p_f[k]` is the mean of the half levels bounding level `k`; the top level is bounded
//!   by `p = 0`, so `p_f[0] = p_h[0] / 2`.
//! * The layer between half levels `k − 1` and `k` is integrated with the temperature and
//!   humidity of full level `k`, the level it contains.
//! * The table must hold exactly one `(a, b)` pair per level of the fields.
//!
//! The `(a, b)` table is built once with [`LevelCoefficients::from_table_str`] (or
//! [`LevelCoefficients::from_file`]) and passed explicitly to
//! [`heights_and_pressures`].
use camino::Utf8Path;
use nalgebra::DMatrix;
use nom::{
    bytes::complete::take_till1,
    character::complete::{space0, space1},
    combinator::all_consuming,
    multi::separated_list1,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::{
    constants::{Pascal, RD, RG, RV_OVER_RD_MINUS_ONE},
    lagtraj_errors::LagtrajError,
};

/// Immutable per-level `(a, b)` hybrid coefficients, one pair per model level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCoefficients {
    a: Vec<Pascal>,
    b: Vec<f64>,
}

fn parse_token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace()).parse(input)
}

fn parse_row(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(space0, separated_list1(space1, parse_token)).parse(input)
}

fn parse_f64(input: &str) -> IResult<&str, f64> {
    all_consuming(double).parse(input)
}

impl LevelCoefficients {
    /// Build a table from `(a, b)` pairs ordered from the top level down to the surface.
    pub fn from_pairs(pairs: Vec<(Pascal, f64)>) -> Result<Self, LagtrajError> {
        if pairs.is_empty() {
            return Err(LagtrajError::InvalidLevelCoefficients(
                "the coefficient table is empty".into(),
            ));
        }
        if pairs.iter().any(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return Err(LagtrajError::InvalidLevelCoefficients(
                "coefficients must be finite".into(),
            ));
        }
        let (a, b) = pairs.into_iter().unzip();
        Ok(LevelCoefficients { a, b })
    }

    /// Parse a whitespace-separated level table.
    ///
    /// The first line is a header naming the columns; the `a[Pa]` and `b` columns are
    /// read, other columns are ignored (they may hold placeholders such as `-`). The first
    /// data row is the top of the atmosphere, which is not a model level, and is skipped.
    ///
    /// ```text
    /// n  a[Pa]     b         ph[hPa]
    /// 0  0.000000  0.000000  0.0000
    /// 1  2.000365  0.000000  0.0200
    /// ...
    /// ```
    pub fn from_table_str(table: &str) -> Result<Self, LagtrajError> {
        let mut lines = table
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        let header = lines.next().ok_or_else(|| {
            LagtrajError::InvalidLevelCoefficients("the level table is empty".into())
        })?;
        let (_, columns) =
            parse_row(header).map_err(|_| LagtrajError::NomParsingError(header.to_string()))?;

        let column_index = |name: &str| {
            columns.iter().position(|c| *c == name).ok_or_else(|| {
                LagtrajError::InvalidLevelCoefficients(format!(
                    "column `{name}` not found in header `{header}`"
                ))
            })
        };
        let a_idx = column_index("a[Pa]")?;
        let b_idx = column_index("b")?;

        let pairs = lines
            .skip(1)
            .map(|line| {
                let (_, tokens) =
                    parse_row(line).map_err(|_| LagtrajError::NomParsingError(line.to_string()))?;
                let field = |idx: usize| {
                    tokens
                        .get(idx)
                        .ok_or_else(|| LagtrajError::NomParsingError(line.to_string()))
                        .and_then(|token| {
                            parse_f64(token)
                                .map(|(_, value)| value)
                                .map_err(|_| LagtrajError::NomParsingError(line.to_string()))
                        })
                };
                Ok((field(a_idx)?, field(b_idx)?))
            })
            .collect::<Result<Vec<_>, LagtrajError>>()?;

        Self::from_pairs(pairs)
    }

    /// Read a level table from disk, see [`LevelCoefficients::from_table_str`].
    pub fn from_file(path: &Utf8Path) -> Result<Self, LagtrajError> {
        let table = std::fs::read_to_string(path)?;
        Self::from_table_str(&table)
    }

    pub fn n_levels(&self) -> usize {
        self.a.len()
    }

    pub fn a(&self) -> &[Pascal] {
        &self.a
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Pressure on the half level below model level `k` for a given surface pressure.
    #[inline]
    pub fn half_level_pressure(&self, k: usize, p_surf: Pascal) -> Pascal {
        self.a[k] + self.b[k] * p_surf
    }
}

/// Heights (m above sea level) and pressures (Pa) on half and full levels of one time slice.
/// Each vector holds one `(lat × lon)` matrix per model level.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightsAndPressures {
    pub height_h: Vec<DMatrix<f64>>,
    pub height_f: Vec<DMatrix<f64>>,
    pub p_h: Vec<DMatrix<f64>>,
    pub p_f: Vec<DMatrix<f64>>,
}

/// Integrate the hydrostatic equation for every column of a time slice.
///
/// Arguments
/// -----------------
/// * `p_surf`: surface pressure (Pa), `(lat × lon)`.
/// * `height_surf`: surface height (m), i.e. surface geopotential divided by `g`.
/// * `coefficients`: `(a, b)` table, one pair per model level.
/// * `t_field`: temperature (K) per model level, top first.
/// * `q_field`: specific humidity (kg/kg) per model level, top first.
///
/// Return
/// ----------
/// * The half/full level heights and pressures, or
///   [`LagtrajError::InvalidLevelCoefficients`] when the number of levels or the field
///   shapes disagree.
pub fn heights_and_pressures(
    p_surf: &DMatrix<f64>,
    height_surf: &DMatrix<f64>,
    coefficients: &LevelCoefficients,
    t_field: &[DMatrix<f64>],
    q_field: &[DMatrix<f64>],
) -> Result<HeightsAndPressures, LagtrajError> {
    let k_max = t_field.len();
    if k_max == 0 || q_field.len() != k_max {
        return Err(LagtrajError::InvalidLevelCoefficients(format!(
            "temperature and humidity must have the same non-zero number of levels ({} vs {})",
            k_max,
            q_field.len()
        )));
    }
    if coefficients.n_levels() != k_max {
        return Err(LagtrajError::InvalidLevelCoefficients(format!(
            "the coefficient table has {} levels but the fields have {k_max}",
            coefficients.n_levels()
        )));
    }
    let shape = p_surf.shape();
    if height_surf.shape() != shape
        || t_field.iter().chain(q_field).any(|m| m.shape() != shape)
    {
        return Err(LagtrajError::InvalidLevelCoefficients(
            "all fields must share the surface pressure shape".into(),
        ));
    }

    let (j_max, i_max) = shape;
    let empty = || vec![DMatrix::<f64>::zeros(j_max, i_max); k_max];
    let mut height_h = empty();
    let mut height_f = empty();
    let mut p_h = empty();
    let mut p_f = empty();

    let rd_over_rg = RD / RG;
    let tv_rd_over_rg = |k: usize, j: usize, i: usize| {
        rd_over_rg * t_field[k][(j, i)] * (1.0 + RV_OVER_RD_MINUS_ONE * q_field[k][(j, i)])
    };

    for i in 0..i_max {
        for j in 0..j_max {
            let p_s = p_surf[(j, i)];
            let z_s = height_surf[(j, i)];
            p_h[k_max - 1][(j, i)] = p_s;
            height_h[k_max - 1][(j, i)] = z_s;

            // Level k + 1 lies between half levels k (top) and k + 1 (bottom)
            let mut p_bottom = p_s;
            let mut z_bottom = z_s;
            for k in (0..k_max - 1).rev() {
                let p_top = coefficients.half_level_pressure(k, p_s);
                p_h[k][(j, i)] = p_top;

                let p_mid = 0.5 * (p_top + p_bottom);
                p_f[k + 1][(j, i)] = p_mid;

                let tv = tv_rd_over_rg(k + 1, j, i);
                height_f[k + 1][(j, i)] = z_bottom + tv * (p_bottom / p_mid).ln();

                z_bottom += tv * (p_bottom / p_top).ln();
                height_h[k][(j, i)] = z_bottom;
                p_bottom = p_top;
            }

            // The top level is bounded by p = 0
            let p_mid = 0.5 * p_bottom;
            p_f[0][(j, i)] = p_mid;
            height_f[0][(j, i)] = z_bottom + tv_rd_over_rg(0, j, i) * (p_bottom / p_mid).ln();
        }
    }

    Ok(HeightsAndPressures {
        height_h,
        height_f,
        p_h,
        p_f,
    })
}
