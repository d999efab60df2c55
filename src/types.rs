use serde::Serialize;
use std::collections::HashMap;

/// One row of an input table: a country plus its sparse year cells.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub country_code: String,
    pub country_name: String,
    // Map<YearHeader, RawCell>
    pub cells: HashMap<String, String>,
}

impl TableRow {
    pub fn cell(&self, year: i32) -> Option<&str> {
        self.cells.get(&year.to_string()).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub rows: Vec<TableRow>,
}

/// One country observed in one year. Unresolvable numbers are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub country_name: String,
    pub country_code: String,
    pub year: i32,
    pub population: f64,
    pub gdp: f64,
    pub fertility_rate: f64,
    pub unemployment: f64,
}

pub type Dataset = Vec<Record>;
