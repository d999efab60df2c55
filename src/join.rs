use crate::types::{Dataset, Record, Table, TableRow};
use std::collections::HashMap;

/// Parses a raw cell. Missing, empty, non-numeric and non-finite cells
/// (`inf`, `1e400`) become NaN.
pub fn coerce_number(raw: Option<&str>) -> f64 {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

// First row per code wins, matching a linear scan
fn index_by_code(table: &Table) -> HashMap<&str, &TableRow> {
    let mut index = HashMap::with_capacity(table.rows.len());
    for row in &table.rows {
        index.entry(row.country_code.as_str()).or_insert(row);
    }
    index
}

fn lookup(index: &HashMap<&str, &TableRow>, code: &str, year: i32) -> f64 {
    index.get(code)
        .map(|row| coerce_number(row.cell(year)))
        .unwrap_or(f64::NAN)
}

/// Merges the four per-country tables into one record per (country, year).
///
/// Records come out in population-table order, with the years of a country
/// consecutive. A (country, year) pair seen again overwrites the joined
/// fields of the existing record instead of appending a duplicate.
pub fn join(
    population: &Table,
    gdp: &Table,
    fertility_rate: &Table,
    unemployment: &Table,
    min_year: i32,
    max_year: i32,
) -> Dataset {
    let gdp_index = index_by_code(gdp);
    let fertility_index = index_by_code(fertility_rate);
    let unemployment_index = index_by_code(unemployment);

    let mut dataset: Dataset = Vec::new();
    let mut positions: HashMap<(String, i32), usize> = HashMap::new();

    for row in &population.rows {
        let code = row.country_code.as_str();

        for year in min_year..=max_year {
            let gdp_val = lookup(&gdp_index, code, year);
            let fertility_val = lookup(&fertility_index, code, year);
            let unemployment_val = lookup(&unemployment_index, code, year);

            match positions.get(&(row.country_code.clone(), year)) {
                Some(&pos) => {
                    let existing = &mut dataset[pos];
                    existing.gdp = gdp_val;
                    existing.fertility_rate = fertility_val;
                    existing.unemployment = unemployment_val;
                }
                None => {
                    positions.insert((row.country_code.clone(), year), dataset.len());
                    dataset.push(Record {
                        country_name: row.country_name.clone(),
                        country_code: row.country_code.clone(),
                        year,
                        population: coerce_number(row.cell(year)),
                        gdp: gdp_val,
                        fertility_rate: fertility_val,
                        unemployment: unemployment_val,
                    });
                }
            }
        }
    }

    dataset
}

/// Records of the dataset observed in `year`, in dataset order.
pub fn working_set(dataset: &[Record], year: i32) -> Vec<&Record> {
    dataset.iter().filter(|r| r.year == year).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(code: &str, name: &str, cells: &[(i32, &str)]) -> TableRow {
        TableRow {
            country_code: code.to_string(),
            country_name: name.to_string(),
            cells: cells.iter().map(|(y, v)| (y.to_string(), v.to_string())).collect(),
        }
    }

    fn table(name: &str, rows: Vec<TableRow>) -> Table {
        Table { name: name.to_string(), rows }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some("2.1")), 2.1);
        assert_eq!(coerce_number(Some(" 100 ")), 100.0);
        assert!(coerce_number(Some("")).is_nan());
        assert!(coerce_number(Some("..")).is_nan());
        assert!(coerce_number(None).is_nan());
        assert!(coerce_number(Some("inf")).is_nan());
        assert!(coerce_number(Some("-Infinity")).is_nan());
        assert!(coerce_number(Some("1e400")).is_nan());
    }

    #[test]
    fn test_infinite_cell_does_not_stretch_extent() {
        let dataset = join(
            &table("population", vec![
                row("A", "Aland", &[(2010, "100")]),
                row("B", "Bland", &[(2010, "200")]),
                row("C", "Cland", &[(2010, "inf")]),
            ]),
            &table("gdp", vec![]),
            &table("fertility_rate", vec![]),
            &table("unemployment", vec![]),
            2010,
            2010,
        );
        let population = crate::scale::extent(dataset.iter().map(|r| r.population));
        assert_eq!(population, Some((100.0, 200.0)));
    }

    #[test]
    fn test_join_single_country() {
        let dataset = join(
            &table("population", vec![row("X", "Xland", &[(2010, "100")])]),
            &table("gdp", vec![row("X", "Xland", &[(2010, "50")])]),
            &table("fertility_rate", vec![row("X", "Xland", &[(2010, "2.1")])]),
            &table("unemployment", vec![row("X", "Xland", &[(2010, "5.0")])]),
            2010,
            2010,
        );

        assert_eq!(dataset.len(), 1);
        let r = &dataset[0];
        assert_eq!(r.country_code, "X");
        assert_eq!(r.country_name, "Xland");
        assert_eq!(r.year, 2010);
        assert_eq!(r.population, 100.0);
        assert_eq!(r.gdp, 50.0);
        assert_eq!(r.fertility_rate, 2.1);
        assert_eq!(r.unemployment, 5.0);
    }

    #[test]
    fn test_join_missing_match_is_nan() {
        let dataset = join(
            &table("population", vec![row("Y", "Yland", &[(2010, "7")])]),
            &table("gdp", vec![row("X", "Xland", &[(2010, "50")])]),
            &table("fertility_rate", vec![row("Y", "Yland", &[(2010, "1.5")])]),
            &table("unemployment", vec![]),
            2010,
            2010,
        );

        let r = &dataset[0];
        assert!(r.gdp.is_nan());
        assert!(r.unemployment.is_nan());
        assert_eq!(r.fertility_rate, 1.5);
    }

    #[test]
    fn test_join_order_and_uniqueness() {
        let population = table("population", vec![
            row("B", "Bland", &[(2008, "1"), (2009, "2"), (2010, "3")]),
            row("A", "Aland", &[(2008, "4"), (2010, "6")]),
        ]);
        let empty = table("empty", vec![]);
        let dataset = join(&population, &empty, &empty, &empty, 2008, 2010);

        let keys: Vec<(&str, i32)> = dataset.iter().map(|r| (r.country_code.as_str(), r.year)).collect();
        assert_eq!(keys, vec![
            ("B", 2008), ("B", 2009), ("B", 2010),
            ("A", 2008), ("A", 2009), ("A", 2010),
        ]);

        // a missing population cell still yields a record, with a NaN population
        assert!(dataset[4].population.is_nan());
    }

    #[test]
    fn test_duplicate_population_rows_overwrite_in_place() {
        let population = table("population", vec![
            row("X", "Xland", &[(2010, "100")]),
            row("X", "Xland (dup)", &[(2010, "999")]),
        ]);
        let gdp = table("gdp", vec![row("X", "Xland", &[(2010, "50")])]);
        let empty = table("empty", vec![]);
        let dataset = join(&population, &gdp, &empty, &empty, 2009, 2010);

        assert_eq!(dataset.len(), 2);
        let seen: HashSet<(&str, i32)> = dataset.iter().map(|r| (r.country_code.as_str(), r.year)).collect();
        assert_eq!(seen.len(), dataset.len());

        // the first visit created the record; the second only refreshed the joined fields
        assert_eq!(dataset[1].population, 100.0);
        assert_eq!(dataset[1].country_name, "Xland");
        assert_eq!(dataset[1].gdp, 50.0);
    }

    #[test]
    fn test_first_matching_row_wins() {
        let population = table("population", vec![row("X", "Xland", &[(2010, "1")])]);
        let gdp = table("gdp", vec![
            row("X", "Xland", &[(2010, "10")]),
            row("X", "Xland", &[(2010, "20")]),
        ]);
        let empty = table("empty", vec![]);
        let dataset = join(&population, &gdp, &empty, &empty, 2010, 2010);
        assert_eq!(dataset[0].gdp, 10.0);
    }

    #[test]
    fn test_empty_year_range() {
        let population = table("population", vec![row("X", "Xland", &[(2010, "1")])]);
        let empty = table("empty", vec![]);
        assert!(join(&population, &empty, &empty, &empty, 2011, 2010).is_empty());
    }

    #[test]
    fn test_working_set_selects_year() {
        let population = table("population", vec![
            row("A", "Aland", &[(2008, "1"), (2009, "2")]),
            row("B", "Bland", &[(2008, "3"), (2009, "4")]),
        ]);
        let empty = table("empty", vec![]);
        let dataset = join(&population, &empty, &empty, &empty, 2008, 2009);

        let set = working_set(&dataset, 2009);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|r| r.year == 2009));
        assert_eq!(set[0].population, 2.0);
        assert_eq!(set[1].population, 4.0);
        assert!(working_set(&dataset, 2020).is_empty());
    }
}
