//! Common routines for handling input data.
use crate::id::{HasID, IDLike};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::borrow::Borrow;
use std::fs;
use std::path::Path;

mod city;
pub use city::read_cities;
mod policy;
pub use policy::read_policies;
mod reference;
pub use reference::{read_breakpoint_tables, read_category_bands};
mod series;
pub use series::read_series;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file, if it exists.
///
/// Returns `None` if the file is missing.
pub fn read_csv_optional<T: DeserializeOwned>(
    file_path: &Path,
) -> Result<Option<impl Iterator<Item = T>>> {
    if !file_path.exists() {
        return Ok(None);
    }

    Ok(Some(read_csv(file_path)?))
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;

    Ok(toml_data)
}

/// Format an error message to include the file path.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a CSV file of items with IDs into a map, in file order.
///
/// Duplicate and empty IDs are rejected.
fn read_csv_id_file<T, ID: IDLike>(file_path: &Path) -> Result<IndexMap<ID, T>>
where
    T: HasID<ID> + DeserializeOwned,
{
    fn fill_map<T, ID: IDLike>(iter: impl Iterator<Item = T>) -> Result<IndexMap<ID, T>>
    where
        T: HasID<ID>,
    {
        let mut map = IndexMap::new();
        for item in iter {
            let id = item.get_id().clone();
            let id_str: &str = Borrow::<str>::borrow(&id);
            ensure!(!id_str.trim().is_empty(), "IDs cannot be empty");
            ensure!(!map.contains_key(&id), "Duplicate ID found: {id}");
            map.insert(id, item);
        }

        Ok(map)
    }

    let data = read_csv::<T>(file_path)?;
    fill_map(data).with_context(|| input_err_msg(file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{City, CityID, CityMap};
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello, 1\nworld,2");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            [
                Record {
                    id: "hello".into(),
                    value: 1,
                },
                Record {
                    id: "world".into(),
                    value: 2,
                }
            ]
        );

        // Header only
        let file_path = create_csv_file(dir.path(), "id,value");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(read_csv_optional::<Record>(&file_path).is_err());

        // Missing file
        let missing = dir.path().join("missing.csv");
        assert!(read_csv::<Record>(&missing).is_err());
        assert!(read_csv_optional::<Record>(&missing).unwrap().is_none());
    }

    #[test]
    fn test_read_toml() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }
        assert!(read_toml::<Value>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_id_file() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(
            dir.path(),
            "id,description,population,tier\nDelhi,Delhi NCT,32000000,1\nPune,Pune,3100000,2",
        );
        let cities: CityMap = read_csv_id_file(&file_path).unwrap();
        assert_eq!(
            cities.keys().collect_vec(),
            [&CityID::new("Delhi"), &CityID::new("Pune")]
        );
        assert_eq!(
            cities["Pune"],
            City {
                id: "Pune".into(),
                description: "Pune".into(),
                population: 3_100_000,
                tier: 2
            }
        );

        let file_path = create_csv_file(
            dir.path(),
            "id,description,population,tier\nDelhi,Delhi,1,1\nDelhi,Delhi,1,1",
        );
        assert!(read_csv_id_file::<City, CityID>(&file_path).is_err());

        // Empty IDs are rejected
        let file_path = create_csv_file(
            dir.path(),
            "id,description,population,tier\nDelhi,Delhi,1,1\n,Nowhere,1,1",
        );
        assert!(read_csv_id_file::<City, CityID>(&file_path).is_err());
    }
}
