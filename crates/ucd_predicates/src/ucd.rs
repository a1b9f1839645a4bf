//! Parser for the Unicode Character Database files the generator reads:
//! `UnicodeData.txt` for general categories, and `PropList.txt` style files for binary
//! properties.

use crate::collections::Map;
use crate::sparse_set::{SetError, SparseSet};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub const UNICODE_DATA: &str = "UnicodeData.txt";

pub const PROPERTY_FILES: [&str; 2] = ["PropList.txt", "DerivedCoreProperties.txt"];

#[derive(Debug, Error)]
pub enum UcdError {
    #[error("unable to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown {kind} {name:?}")]
    Unknown { kind: &'static str, name: String },

    #[error(transparent)]
    Set(#[from] SetError),
}

/// Code points of the database, by general category and by property.
#[derive(Debug, Default)]
pub struct UnicodeDatabase {
    code_points: SparseSet,
    categories: Map<String, SparseSet>,
    properties: Map<String, SparseSet>,
}

fn parse_code_point(text: &str, line: usize) -> Result<u32, UcdError> {
    u32::from_str_radix(text.trim(), 16).map_err(|err| UcdError::Parse {
        line,
        message: format!("invalid code point {:?}: {}", text.trim(), err),
    })
}

impl UnicodeDatabase {
    /// Parse the contents of `UnicodeData.txt` and any number of property files.
    pub fn parse<'a, I>(unicode_data: &str, property_files: I) -> Result<UnicodeDatabase, UcdError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut db = UnicodeDatabase::default();
        db.parse_unicode_data(unicode_data)?;
        for property_file in property_files {
            db.parse_properties(property_file)?;
        }

        db.code_points.finish()?;
        for set in db.categories.values_mut() {
            set.finish()?;
        }
        for set in db.properties.values_mut() {
            set.finish()?;
        }

        info!(
            code_points = db.code_points.len(),
            categories = db.categories.len(),
            properties = db.properties.len(),
            "read unicode database"
        );

        Ok(db)
    }

    /// Read `UnicodeData.txt`, `PropList.txt` and `DerivedCoreProperties.txt` from `dir`.
    pub fn load(dir: &Path) -> Result<UnicodeDatabase, UcdError> {
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|source| UcdError::Io { path, source })
        };

        let unicode_data = read(UNICODE_DATA)?;
        let property_files = PROPERTY_FILES
            .iter()
            .map(|name| read(name))
            .collect::<Result<Vec<_>, _>>()?;

        UnicodeDatabase::parse(&unicode_data, property_files.iter().map(String::as_str))
    }

    // `0041;LATIN CAPITAL LETTER A;Lu;...`. Ranges are two lines, `<Name, First>` then
    // `<Name, Last>`.
    fn parse_unicode_data(&mut self, text: &str) -> Result<(), UcdError> {
        let mut range_first: Option<u32> = None;

        for (line_idx, line) in text.lines().enumerate() {
            let line_number = line_idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split(';');
            let (code_point, name, category) = match (fields.next(), fields.next(), fields.next())
            {
                (Some(code_point), Some(name), Some(category)) => (code_point, name, category),
                _ => {
                    return Err(UcdError::Parse {
                        line: line_number,
                        message: "expected at least three fields".to_owned(),
                    })
                }
            };
            let code_point = parse_code_point(code_point, line_number)?;

            let first = match range_first.take() {
                Some(first) => {
                    if !name.ends_with(", Last>") {
                        return Err(UcdError::Parse {
                            line: line_number,
                            message: "range start is not followed by a range end".to_owned(),
                        });
                    }
                    first
                }
                None if name.ends_with(", First>") => {
                    range_first = Some(code_point);
                    continue;
                }
                None => code_point,
            };

            self.code_points.add((first, code_point))?;
            self.categories
                .entry(category.to_owned())
                .or_default()
                .add((first, code_point))?;
        }

        match range_first {
            Some(first) => Err(UcdError::Parse {
                line: text.lines().count(),
                message: format!("range starting at {:04X} has no end", first),
            }),
            None => Ok(()),
        }
    }

    // `0009..000D    ; White_Space # Cc   [5] <control-0009>..<control-000D>`
    fn parse_properties(&mut self, text: &str) -> Result<(), UcdError> {
        for (line_idx, line) in text.lines().enumerate() {
            let line_number = line_idx + 1;
            let line = match line.find('#') {
                Some(comment) => &line[..comment],
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let (range, property) = match line.split_once(';') {
                Some((range, property)) => (range.trim(), property.trim()),
                None => {
                    return Err(UcdError::Parse {
                        line: line_number,
                        message: "expected `range ; property`".to_owned(),
                    })
                }
            };

            let (first, last) = match range.split_once("..") {
                Some((first, last)) => (
                    parse_code_point(first, line_number)?,
                    parse_code_point(last, line_number)?,
                ),
                None => {
                    let code_point = parse_code_point(range, line_number)?;
                    (code_point, code_point)
                }
            };

            self.properties
                .entry(property.to_owned())
                .or_default()
                .add((first, last))?;
        }

        Ok(())
    }

    /// All assigned code points.
    pub fn code_points(&self) -> &SparseSet {
        &self.code_points
    }

    pub fn category(&self, name: &str) -> Option<&SparseSet> {
        self.categories.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&SparseSet> {
        self.properties.get(name)
    }

    /// General category of `code_point`, if assigned.
    pub fn category_of(&self, code_point: u32) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, set)| set.contains(code_point))
            .map(|(name, _)| name.as_str())
    }

    pub fn has_property(&self, code_point: u32, name: &str) -> bool {
        self.properties
            .get(name)
            .map_or(false, |set| set.contains(code_point))
    }

    /// Code points in any of `categories`, as an unfinished set.
    pub fn with_categories(&self, categories: &[&str]) -> Result<SparseSet, UcdError> {
        let mut result = SparseSet::new();
        for name in categories {
            let set = self.category(name).ok_or_else(|| UcdError::Unknown {
                kind: "category",
                name: (*name).to_owned(),
            })?;
            for element in set.elements() {
                result.add(*element)?;
            }
        }
        Ok(result)
    }

    /// Assigned code points that have all of `properties`, as an unfinished set.
    pub fn with_properties(&self, properties: &[&str]) -> Result<SparseSet, UcdError> {
        let sets = properties
            .iter()
            .map(|name| {
                self.property(name).ok_or_else(|| UcdError::Unknown {
                    kind: "property",
                    name: (*name).to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = SparseSet::new();
        let (first, rest) = match sets.split_first() {
            Some(split) => split,
            None => return Ok(result),
        };
        for code_point in first.iter() {
            if self.code_points.contains(code_point)
                && rest.iter().all(|set| set.contains(code_point))
            {
                result.add(code_point)?;
            }
        }
        Ok(result)
    }
}
