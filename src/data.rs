use crate::config::{AppConfig, InputConfig};
use crate::types::{Table, TableRow};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// The four source tables, fully loaded.
#[derive(Debug, Clone)]
pub struct InputTables {
    pub population: Table,
    pub gdp: Table,
    pub fertility_rate: Table,
    pub unemployment: Table,
}

/// Loads all four tables. Any failure aborts; there is no partial result.
pub fn load_tables(config: &AppConfig) -> Result<InputTables> {
    info!("Loading input tables...");
    let input = &config.input;

    let tables = InputTables {
        population: load_table(&input.population, "population", input)?,
        gdp: load_table(&input.gdp, "gdp", input)?,
        fertility_rate: load_table(&input.fertility_rate, "fertility_rate", input)?,
        unemployment: load_table(&input.unemployment, "unemployment", input)?,
    };

    Ok(tables)
}

pub fn load_table(path: &Path, name: &str, input: &InputConfig) -> Result<Table> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let table = read_table(file, name, &input.code_column, &input.name_column)
        .with_context(|| format!("Failed to read {} table from {:?}", name, path))?;
    info!("Loaded {} table: {} rows from {:?}", name, table.rows.len(), path);
    Ok(table)
}

pub fn read_table<R: Read>(reader: R, name: &str, code_column: &str, name_column: &str) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let code_idx = headers.iter().position(|h| h.trim() == code_column)
        .ok_or_else(|| anyhow!("Code column '{}' not found in CSV", code_column))?;
    let name_idx = headers.iter().position(|h| h.trim() == name_column)
        .ok_or_else(|| anyhow!("Name column '{}' not found in CSV", name_column))?;

    // Only year-named columns carry values
    let year_columns: Vec<(usize, String)> = headers.iter().enumerate()
        .filter(|(i, _)| *i != code_idx && *i != name_idx)
        .filter_map(|(i, h)| h.trim().parse::<i32>().ok().map(|y| (i, y.to_string())))
        .collect();

    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let country_code = record.get(code_idx).unwrap_or("").trim().to_string();

        if country_code.is_empty() { continue; }

        let cells: HashMap<String, String> = year_columns.iter()
            .filter_map(|(idx, year)| record.get(*idx).map(|v| (year.clone(), v.to_string())))
            .collect();

        rows.push(TableRow {
            country_code,
            country_name: record.get(name_idx).unwrap_or("").to_string(),
            cells,
        });
    }

    Ok(Table { name: name.to_string(), rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POPULATION: &str = "\
Country Name,Country Code,Indicator Name,2008,2009
Aruba,ABW,Population,101353,101453
,,,,
Andorra,AND,Population,83861
";

    #[test]
    fn test_read_table_keeps_year_columns_only() {
        let table = read_table(POPULATION.as_bytes(), "population", "Country Code", "Country Name").unwrap();
        assert_eq!(table.name, "population");
        assert_eq!(table.rows.len(), 2);

        let aruba = &table.rows[0];
        assert_eq!(aruba.country_code, "ABW");
        assert_eq!(aruba.country_name, "Aruba");
        assert_eq!(aruba.cell(2008), Some("101353"));
        assert_eq!(aruba.cell(2009), Some("101453"));
        assert!(!aruba.cells.contains_key("Indicator Name"));

        // short row: the 2009 cell is absent rather than empty
        let andorra = &table.rows[1];
        assert_eq!(andorra.cell(2008), Some("83861"));
        assert_eq!(andorra.cell(2009), None);
    }

    #[test]
    fn test_read_table_missing_code_column() {
        let err = read_table("Name,2008\nX,1\n".as_bytes(), "gdp", "Country Code", "Name").unwrap_err();
        assert!(err.to_string().contains("Code column 'Country Code' not found"));
    }

    #[test]
    fn test_load_tables_fails_when_any_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let pop_path = dir.path().join("population.csv");
        File::create(&pop_path).unwrap().write_all(POPULATION.as_bytes()).unwrap();

        let config: AppConfig = toml::from_str(&format!(
            "[input]\npopulation = {:?}\ngdp = {:?}\nfertility_rate = {:?}\nunemployment = {:?}\n",
            pop_path,
            pop_path,
            dir.path().join("missing.csv"),
            pop_path,
        )).unwrap();

        let err = load_tables(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.csv"));
    }
}
