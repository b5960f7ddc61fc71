//! Summary metrics and chart series derived from an [`AggregateSet`]
//!
//! Everything here is a pure function of the set. Values keep full `f64`
//! precision; rounding is left to whoever displays them.

use crate::types::{AggregateSet, DataRow, Product, Terminal};
use serde::Serialize;
use std::collections::BTreeMap;

/// Roll-up totals of one load cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total: f64,
    /// Always holds all three products; missing columns total 0
    pub per_product: BTreeMap<Product, f64>,
    pub per_terminal: BTreeMap<Terminal, f64>,
    /// Destinations with the same label are summed across terminals
    pub per_destination: BTreeMap<String, f64>,
}

impl SummaryMetrics {
    pub fn compute(set: &AggregateSet) -> Self {
        let mut per_product: BTreeMap<Product, f64> =
            Product::ALL.into_iter().map(|p| (p, 0.0)).collect();
        let mut per_terminal: BTreeMap<Terminal, f64> = BTreeMap::new();
        let mut per_destination: BTreeMap<String, f64> = BTreeMap::new();

        for table in set.tables() {
            let terminal_total = per_terminal.entry(table.terminal).or_insert(0.0);
            for row in &table.rows {
                let row_total = row.total();
                *terminal_total += row_total;
                *per_destination.entry(row.destination.clone()).or_insert(0.0) += row_total;
                for (product, quantity) in &row.quantities {
                    *per_product.entry(*product).or_insert(0.0) += quantity;
                }
            }
        }

        Self {
            total: per_product.values().sum(),
            per_product,
            per_terminal,
            per_destination,
        }
    }

    pub fn product(&self, product: Product) -> f64 {
        self.per_product.get(&product).copied().unwrap_or(0.0)
    }

    /// The four headline numbers: total, REGULAR, PREMIUM, DIESEL
    pub fn kpis(&self) -> Kpis {
        Kpis {
            total: self.total,
            regular: self.product(Product::Regular),
            premium: self.product(Product::Premium),
            diesel: self.product(Product::Diesel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total: f64,
    pub regular: f64,
    pub premium: f64,
    pub diesel: f64,
}

//==============================================================================
// Chart series
//==============================================================================

/// Volumes split by product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProductBreakdown {
    #[serde(rename = "REGULAR")]
    pub regular: f64,
    #[serde(rename = "PREMIUM")]
    pub premium: f64,
    #[serde(rename = "DIESEL")]
    pub diesel: f64,
}

impl ProductBreakdown {
    pub fn get(&self, product: Product) -> f64 {
        match product {
            Product::Regular => self.regular,
            Product::Premium => self.premium,
            Product::Diesel => self.diesel,
        }
    }

    pub fn total(&self) -> f64 {
        self.regular + self.premium + self.diesel
    }

    fn add_row(&mut self, row: &DataRow) {
        self.regular += row.quantity(Product::Regular);
        self.premium += row.quantity(Product::Premium);
        self.diesel += row.quantity(Product::Diesel);
    }
}

/// One bar of the per-terminal chart, stacked by product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalVolume {
    pub terminal: Terminal,
    #[serde(flatten)]
    pub volumes: ProductBreakdown,
    pub total: f64,
}

/// One slice of the per-product chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductVolume {
    pub product: Product,
    pub volume: f64,
}

/// One bar of the per-destination chart, stacked by product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationVolume {
    pub destination: String,
    #[serde(flatten)]
    pub volumes: ProductBreakdown,
    pub total: f64,
}

/// Per-terminal volumes, in terminal order
pub fn terminal_series(set: &AggregateSet) -> Vec<TerminalVolume> {
    set.tables()
        .map(|table| {
            let mut volumes = ProductBreakdown::default();
            table.rows.iter().for_each(|row| volumes.add_row(row));
            TerminalVolume {
                terminal: table.terminal,
                total: volumes.total(),
                volumes,
            }
        })
        .collect()
}

/// Totals for each of the three products
pub fn product_series(set: &AggregateSet) -> Vec<ProductVolume> {
    let mut volumes = ProductBreakdown::default();
    set.rows().for_each(|row| volumes.add_row(row));
    Product::ALL
        .into_iter()
        .map(|product| ProductVolume {
            product,
            volume: volumes.get(product),
        })
        .collect()
}

/// Per-destination volumes sorted by destination label, optionally limited
/// to the rows of one terminal
pub fn destination_series(set: &AggregateSet, terminal: Option<Terminal>) -> Vec<DestinationVolume> {
    let mut by_destination: BTreeMap<&str, ProductBreakdown> = BTreeMap::new();
    set.rows()
        .filter(|row| terminal.map_or(true, |t| row.terminal == t))
        .for_each(|row| {
            by_destination
                .entry(row.destination.as_str())
                .or_default()
                .add_row(row)
        });

    by_destination
        .into_iter()
        .map(|(destination, volumes)| DestinationVolume {
            destination: destination.to_string(),
            total: volumes.total(),
            volumes,
        })
        .collect()
}
