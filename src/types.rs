use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

//==============================================================================
// Products and Terminals
//==============================================================================

/// Fuel product recognized in a distribution table header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "REGULAR")]
    Regular,
    #[serde(rename = "PREMIUM")]
    Premium,
    #[serde(rename = "DIESEL")]
    Diesel,
}

impl Product {
    /// All products in canonical column order
    pub const ALL: [Product; 3] = [Product::Regular, Product::Premium, Product::Diesel];

    /// Header label used in the workbooks and snapshots
    pub fn label(&self) -> &'static str {
        match self {
            Product::Regular => "REGULAR",
            Product::Premium => "PREMIUM",
            Product::Diesel => "DIESEL",
        }
    }

    /// Match an already normalized (trimmed, uppercase) header label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal site. Each terminal has one sheet in the plan workbook, named
/// exactly like [`Terminal::sheet_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terminal {
    #[serde(rename = "Guaymas")]
    Guaymas,
    #[serde(rename = "Zapopan")]
    Zapopan,
    #[serde(rename = "El Castillo")]
    ElCastillo,
    #[serde(rename = "Rosarito")]
    Rosarito,
    #[serde(rename = "Topolobampo")]
    Topolobampo,
    #[serde(rename = "L Cardenas")]
    LCardenas,
    #[serde(rename = "Manzanillo")]
    Manzanillo,
}

impl Terminal {
    pub const ALL: [Terminal; 7] = [
        Terminal::Guaymas,
        Terminal::Zapopan,
        Terminal::ElCastillo,
        Terminal::Rosarito,
        Terminal::Topolobampo,
        Terminal::LCardenas,
        Terminal::Manzanillo,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Terminal::Guaymas => "Guaymas",
            Terminal::Zapopan => "Zapopan",
            Terminal::ElCastillo => "El Castillo",
            Terminal::Rosarito => "Rosarito",
            Terminal::Topolobampo => "Topolobampo",
            Terminal::LCardenas => "L Cardenas",
            Terminal::Manzanillo => "Manzanillo",
        }
    }

    /// Exact sheet-name match (workbook sheets must be named exactly)
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.sheet_name() == name)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Lenient parse for command-line and query input (case and surrounding
/// whitespace ignored).
impl FromStr for Terminal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.sheet_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown terminal '{}'", s))
    }
}

//==============================================================================
// Raw cell grid
//==============================================================================

/// Raw, untyped spreadsheet cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Blank,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed display text, `None` for blank cells
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Blank => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Trimmed, uppercased label used for header matching
    pub fn label(&self) -> String {
        self.text().map(|s| s.to_uppercase()).unwrap_or_default()
    }

    /// Numeric value of the cell, `None` when blank or not a number
    pub fn as_quantity(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

/// Test and fixture convenience: empty → blank, numeric → number, else text
impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Blank
        } else if let Ok(n) = value.trim().parse::<f64>() {
            Cell::Number(n)
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Row/column grid of one sheet, anchored at A1
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string literals (see `From<&str> for Cell`)
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = &'static str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::from).collect())
                .collect(),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at (row, col); cells past the end of a short row read as blank
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static BLANK: Cell = Cell::Blank;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Normalized labels of one grid row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    labels: Vec<String>,
}

impl HeaderRow {
    pub fn from_cells(cells: &[Cell]) -> Self {
        Self {
            labels: cells.iter().map(Cell::label).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    /// Column index of the first cell carrying `label`
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// First column of each recognized product, in canonical product order
    pub fn product_columns(&self) -> Vec<(Product, usize)> {
        Product::ALL
            .into_iter()
            .filter_map(|p| self.position(p.label()).map(|col| (p, col)))
            .collect()
    }
}

//==============================================================================
// Normalized tables
//==============================================================================

/// One destination line of a terminal's distribution table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub destination: String,
    pub terminal: Terminal,
    /// Only products offered by the owning table have an entry
    pub quantities: BTreeMap<Product, f64>,
}

impl DataRow {
    pub fn new(destination: impl Into<String>, terminal: Terminal) -> Self {
        Self {
            destination: destination.into(),
            terminal,
            quantities: BTreeMap::new(),
        }
    }

    pub fn with_quantity(mut self, product: Product, quantity: f64) -> Self {
        self.quantities.insert(product, quantity);
        self
    }

    /// Quantity for summation: products not offered count as zero
    pub fn quantity(&self, product: Product) -> f64 {
        self.quantities.get(&product).copied().unwrap_or(0.0)
    }

    pub fn offers(&self, product: Product) -> bool {
        self.quantities.contains_key(&product)
    }

    pub fn total(&self) -> f64 {
        self.quantities.values().sum()
    }
}

/// Normalized distribution table of one terminal sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub terminal: Terminal,
    /// Product columns present in the source header
    pub products: BTreeSet<Product>,
    pub rows: Vec<DataRow>,
}

impl DataTable {
    pub fn new(terminal: Terminal, products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            terminal,
            products: products.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn offers(&self, product: Product) -> bool {
        self.products.contains(&product)
    }

    pub fn product_total(&self, product: Product) -> f64 {
        self.rows.iter().map(|r| r.quantity(product)).sum()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(DataRow::total).sum()
    }
}

/// All terminal tables produced by one load cycle. Built once and never
/// mutated; a reload builds a new set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSet {
    tables: BTreeMap<Terminal, DataTable>,
}

impl AggregateSet {
    pub fn new(tables: impl IntoIterator<Item = DataTable>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.terminal, t)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Number of terminals in the set
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn get(&self, terminal: Terminal) -> Option<&DataTable> {
        self.tables.get(&terminal)
    }

    pub fn terminals(&self) -> impl Iterator<Item = Terminal> + '_ {
        self.tables.keys().copied()
    }

    pub fn tables(&self) -> impl Iterator<Item = &DataTable> {
        self.tables.values()
    }

    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.tables.values().flat_map(|t| t.rows.iter())
    }

    pub fn row_count(&self) -> usize {
        self.tables.values().map(DataTable::len).sum()
    }

    /// Union of product columns across all tables, in canonical order
    pub fn present_products(&self) -> Vec<Product> {
        Product::ALL
            .into_iter()
            .filter(|p| self.tables.values().any(|t| t.offers(*p)))
            .collect()
    }
}
