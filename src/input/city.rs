//! Code for reading the city catalogue from a CSV file.
use super::*;
use crate::city::CityMap;

const CITIES_FILE_NAME: &str = "cities.csv";

/// Read the city catalogue.
///
/// # Arguments
///
/// * `study_dir` - Folder containing study input files
///
/// # Returns
///
/// The cities, keyed by ID in file order, or an error
pub fn read_cities(study_dir: &Path) -> Result<CityMap> {
    let file_path = study_dir.join(CITIES_FILE_NAME);
    let cities: CityMap = read_csv_id_file(&file_path)?;
    for city in cities.values() {
        ensure!(
            city.population > 0,
            "{}: population of {} must be greater than zero",
            input_err_msg(&file_path),
            city.id
        );
    }

    Ok(cities)
}
