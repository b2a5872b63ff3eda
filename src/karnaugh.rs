//! Karnaugh maps for functions of 2 to 6 variables.
//!
//! The first variables select the row and the others the column, both axes follow the reflected
//! Gray code so that neighbour cells (including across the borders) differ on a single variable.
//!
//! Groups are power-of-two rectangles on the torus whose cells form a sub-cube. They are
//! selected greedily, from the largest size down to single cells: a rectangle is accepted if
//! all its cells have the target value and none of them was claimed by a previous group.
//! This greedy cover is not guaranteed to be minimal.

use crate::tools::{gray_code, powers_of_two_down_from, variable_mask};
use crate::*;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dimensions (rows, columns) of the map for 2 to 6 variables
const DIMENSIONS: [(usize, usize); 5] = [(2, 2), (2, 4), (4, 4), (4, 8), (8, 8)];

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KarnaughOptions {
    /// Derive the product of sums by grouping the 0-cells
    pub include_pos: bool,
}

/// A cell of the map
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub value: bool,
    /// Row index in the truth table
    pub minterm: usize,
    pub inputs: Assignment,
    pub group_ids: Vec<usize>,
}

/// A rectangle of cells sharing the same value
#[derive(Clone, Debug, Serialize)]
pub struct Group {
    pub id: usize,
    /// Coordinates (row, column) of the cells
    pub cells: Vec<(usize, usize)>,
    pub size: usize,
    /// The product of the constant variables over the group
    pub literal: Expr,
    #[serde(skip)]
    pub pattern: Pattern,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarnaughStats {
    pub ones: usize,
    pub zeros: usize,
    pub group_count: usize,
    pub largest_group: usize,
    pub literal_count: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarnaughMap {
    variables: Vec<Variable>,
    dimensions: (usize, usize),
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    cells: Vec<Vec<Cell>>,
    groups: Vec<Group>,
    #[serde(rename = "simplifiedSOP")]
    simplified_sop: Expr,
    #[serde(rename = "simplifiedPOS")]
    simplified_pos: Option<Expr>,
    stats: KarnaughStats,
}

impl Default for KarnaughOptions {
    fn default() -> Self {
        Self { include_pos: true }
    }
}

/// Rows and columns of the map for a number of variables
pub fn dimensions(variables: usize) -> Result<(usize, usize), BolexError> {
    match variables {
        2..=6 => Ok(DIMENSIONS[variables - 2]),
        _ => Err(BolexError::UnsupportedSize(variables)),
    }
}

impl KarnaughMap {
    /// Build the map of an expression and group its cells
    pub fn build(parsed: &ParsedExpression, options: &KarnaughOptions) -> Result<Self, BolexError> {
        Self::build_with(parsed.ast(), parsed.variables(), options)
    }

    /// Build the map of a function over a list of 2 to 6 variables
    pub fn build_with(
        function: &impl LogicFunction,
        variables: &[Variable],
        options: &KarnaughOptions,
    ) -> Result<Self, BolexError> {
        let (rows, cols) = dimensions(variables.len())?;
        let row_bits = rows.trailing_zeros() as usize;
        let row_labels = gray_code(row_bits)?;
        let column_labels = gray_code(variables.len() - row_bits)?;

        let mut cells = Vec::with_capacity(rows);
        for row_label in &row_labels {
            let mut line = Vec::with_capacity(cols);
            for col_label in &column_labels {
                let minterm = usize::from_str_radix(&format!("{}{}", row_label, col_label), 2)
                    .map_err(|_| BolexError::InvalidName(format!("{}{}", row_label, col_label)))?;
                let state = State::from_index(minterm, variables);
                line.push(Cell {
                    value: function.eval(&state),
                    minterm,
                    inputs: state.assignment(variables),
                    group_ids: vec![],
                });
            }
            cells.push(line);
        }

        let mut kmap = Self {
            variables: variables.to_vec(),
            dimensions: (rows, cols),
            row_labels,
            column_labels,
            cells,
            groups: vec![],
            simplified_sop: Expr::Constant(false),
            simplified_pos: None,
            stats: KarnaughStats::default(),
        };

        let mut groups = kmap.find_groups(true);
        groups.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| a.pattern.display_order(&b.pattern))
        });
        for (id, group) in groups.iter_mut().enumerate() {
            group.id = id;
            for (r, c) in &group.cells {
                kmap.cells[*r][*c].group_ids.push(id);
            }
        }
        kmap.simplified_sop = Expr::join(Operator::Or, groups.iter().map(|g| g.literal.clone()));

        if options.include_pos {
            let clauses = kmap.find_groups(false).into_iter().map(|g| {
                let mut clause = g.pattern;
                clause.negate_all_variables();
                clause.to_sum()
            });
            kmap.simplified_pos = Some(Expr::join(Operator::And, clauses));
        }

        let ones = kmap.cells.iter().flatten().filter(|c| c.value).count();
        kmap.stats = KarnaughStats {
            ones,
            zeros: rows * cols - ones,
            group_count: groups.len(),
            largest_group: groups.iter().map(|g| g.size).max().unwrap_or(0),
            literal_count: groups.iter().map(|g| g.pattern.literal_count()).sum(),
        };
        kmap.groups = groups;
        debug!(
            "Karnaugh map {}x{}: {} groups, SOP '{}'",
            rows,
            cols,
            kmap.groups.len(),
            kmap.simplified_sop
        );
        Ok(kmap)
    }

    /// All cells of a rectangle starting at a given corner, wrapping around the borders
    fn rectangle(&self, top: usize, left: usize, height: usize, width: usize) -> Vec<(usize, usize)> {
        let (rows, cols) = self.dimensions;
        let mut cells: Vec<(usize, usize)> = (0..height)
            .flat_map(|i| (0..width).map(move |j| ((top + i) % rows, (left + j) % cols)))
            .collect();
        cells.sort_unstable();
        cells
    }

    /// The pattern of a set of cells if they form a sub-cube
    fn subcube(&self, cells: &[(usize, usize)]) -> Option<Pattern> {
        let width = self.variables.len();
        let full = (1u32 << width) - 1;
        let (mut all_ones, mut any_one) = (full, 0u32);
        for (r, c) in cells {
            let m = self.cells[*r][*c].minterm as u32;
            all_ones &= m;
            any_one |= m;
        }
        let varying = (all_ones ^ any_one).count_ones();
        if cells.len() != 1 << varying {
            return None;
        }
        let mut pattern = Pattern::default();
        for (position, var) in self.variables.iter().enumerate() {
            let mask = variable_mask(position, width);
            if (all_ones ^ any_one) & mask == 0 {
                pattern.set(*var, all_ones & mask != 0);
            }
        }
        Some(pattern)
    }

    /// Greedy selection of the largest unclaimed rectangles of cells with the target value
    fn find_groups(&self, target: bool) -> Vec<Group> {
        let (rows, cols) = self.dimensions;
        let mut claimed = vec![vec![false; cols]; rows];
        let mut seen = BTreeSet::new();
        let mut groups = vec![];

        for size in powers_of_two_down_from(rows * cols) {
            for height in powers_of_two_down_from(rows) {
                let width = size / height;
                if height * width != size || width > cols || !width.is_power_of_two() {
                    continue;
                }
                for top in 0..rows {
                    for left in 0..cols {
                        let cells = self.rectangle(top, left, height, width);
                        if !seen.insert(cells.clone()) {
                            continue;
                        }
                        let accepted = cells
                            .iter()
                            .all(|(r, c)| self.cells[*r][*c].value == target && !claimed[*r][*c]);
                        if !accepted {
                            continue;
                        }
                        let pattern = match self.subcube(&cells) {
                            Some(p) => p,
                            None => continue,
                        };
                        for (r, c) in &cells {
                            claimed[*r][*c] = true;
                        }
                        trace!("group of {} cells: {}", cells.len(), pattern);
                        groups.push(Group {
                            id: groups.len(),
                            size: cells.len(),
                            literal: pattern.to_product(),
                            pattern,
                            cells,
                        });
                    }
                }
            }
        }
        groups
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Number of rows and columns
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.cells[row][column]
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn simplified_sop(&self) -> &Expr {
        &self.simplified_sop
    }

    pub fn simplified_pos(&self) -> Option<&Expr> {
        self.simplified_pos.as_ref()
    }

    pub fn stats(&self) -> &KarnaughStats {
        &self.stats
    }
}
