//! Code for reading optional overrides of the AQI reference tables.
use super::*;
use crate::breakpoint::{Breakpoint, BreakpointTable, BreakpointTables};
use crate::category::{AqiCategory, CategoryBand, CategoryBands};
use crate::pollutant::Pollutant;
use log::info;
use serde::Deserialize;
use strum::IntoEnumIterator;

const BREAKPOINTS_FILE_NAME: &str = "breakpoints.csv";
const CATEGORIES_FILE_NAME: &str = "categories.csv";

#[derive(Debug, Deserialize)]
struct BreakpointRaw {
    pollutant: Pollutant,
    concentration_low: f64,
    concentration_high: f64,
    index_low: u32,
    index_high: u32,
}

#[derive(Debug, Deserialize)]
struct CategoryBandRaw {
    category: AqiCategory,
    index_low: u32,
    index_high: u32,
    colour: String,
    health_impact: String,
}

/// Read breakpoint tables from the study directory, if given.
///
/// Rows are grouped by pollutant, keeping file order within each table. The file must give a
/// table for every pollutant. Without the file the CPCB tables are used.
pub fn read_breakpoint_tables(study_dir: &Path) -> Result<BreakpointTables> {
    let file_path = study_dir.join(BREAKPOINTS_FILE_NAME);
    let Some(rows) = read_csv_optional::<BreakpointRaw>(&file_path)? else {
        return Ok(BreakpointTables::cpcb());
    };

    info!("Using breakpoint tables from {}", file_path.display());
    read_breakpoint_tables_from_iter(rows).with_context(|| input_err_msg(&file_path))
}

fn read_breakpoint_tables_from_iter<I>(iter: I) -> Result<BreakpointTables>
where
    I: Iterator<Item = BreakpointRaw>,
{
    let mut brackets: IndexMap<Pollutant, Vec<Breakpoint>> = IndexMap::new();
    for row in iter {
        brackets.entry(row.pollutant).or_default().push(Breakpoint::new(
            row.concentration_low,
            row.concentration_high,
            row.index_low,
            row.index_high,
        ));
    }
    for pollutant in Pollutant::iter() {
        ensure!(
            brackets.contains_key(&pollutant),
            "No breakpoints given for {pollutant}"
        );
    }

    let tables = brackets
        .into_iter()
        .map(|(pollutant, brackets)| BreakpointTable::new(pollutant, brackets))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BreakpointTables::new(tables)?)
}

/// Read category bands from the study directory, if given.
///
/// Without the file the CPCB bands are used.
pub fn read_category_bands(study_dir: &Path) -> Result<CategoryBands> {
    let file_path = study_dir.join(CATEGORIES_FILE_NAME);
    let Some(rows) = read_csv_optional::<CategoryBandRaw>(&file_path)? else {
        return Ok(CategoryBands::cpcb());
    };

    info!("Using category bands from {}", file_path.display());
    let bands = rows
        .map(|row| CategoryBand {
            category: row.category,
            index_low: row.index_low,
            index_high: row.index_high,
            colour: row.colour,
            health_impact: row.health_impact,
        })
        .collect_vec();

    CategoryBands::new(bands).with_context(|| input_err_msg(&file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Write the CPCB tables out as CSV rows, in the same way a user would
    fn cpcb_breakpoint_rows() -> String {
        let mut rows = "pollutant,concentration_low,concentration_high,index_low,index_high\n".to_string();
        for table in BreakpointTables::cpcb().iter() {
            for bracket in table.brackets() {
                rows.push_str(&format!(
                    "{},{},{},{},{}\n",
                    table.pollutant(),
                    bracket.concentration_low,
                    bracket.concentration_high,
                    bracket.index_low,
                    bracket.index_high
                ));
            }
        }
        rows
    }

    #[test]
    fn test_read_breakpoint_tables_default() {
        let dir = tempdir().unwrap();
        assert_eq!(
            read_breakpoint_tables(dir.path()).unwrap(),
            BreakpointTables::cpcb()
        );
        assert_eq!(read_category_bands(dir.path()).unwrap(), CategoryBands::cpcb());
    }

    #[test]
    fn test_read_breakpoint_tables() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(BREAKPOINTS_FILE_NAME)).unwrap();
            write!(file, "{}", cpcb_breakpoint_rows()).unwrap();
        }
        assert_eq!(
            read_breakpoint_tables(dir.path()).unwrap(),
            BreakpointTables::cpcb()
        );
    }

    #[test]
    fn test_read_breakpoint_tables_missing_pollutant() {
        let dir = tempdir().unwrap();
        {
            let rows = cpcb_breakpoint_rows()
                .lines()
                .filter(|line| !line.starts_with("O3"))
                .join("\n");
            let mut file = File::create(dir.path().join(BREAKPOINTS_FILE_NAME)).unwrap();
            writeln!(file, "{rows}").unwrap();
        }
        let err = read_breakpoint_tables(dir.path()).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "No breakpoints given for O3");
    }

    #[test]
    fn test_read_category_bands() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(CATEGORIES_FILE_NAME)).unwrap();
            writeln!(file, "category,index_low,index_high,colour,health_impact").unwrap();
            for band in CategoryBands::cpcb().iter() {
                writeln!(
                    file,
                    "{},{},{},{},\"{}\"",
                    band.category, band.index_low, band.index_high, band.colour, band.health_impact
                )
                .unwrap();
            }
        }
        assert_eq!(read_category_bands(dir.path()).unwrap(), CategoryBands::cpcb());
    }

    #[test]
    fn test_read_category_bands_gap() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(CATEGORIES_FILE_NAME)).unwrap();
            writeln!(
                file,
                "category,index_low,index_high,colour,health_impact
Good,0,50,#00B050,ok
Satisfactory,51,100,#92D050,ok
Moderate,101,200,#FFFF00,ok
Poor,210,300,#FF9900,ok
Very Poor,301,400,#FF0000,ok
Severe,401,500,#C00000,ok"
            )
            .unwrap();
        }
        assert!(read_category_bands(dir.path()).is_err());
    }
}
