// src/config/tables.rs

//! Tab-separated sample and read tables.
//!
//! Columns are located by header name, so column order is free. Blank lines
//! and lines starting with `#` are ignored; empty cells and `-` are "absent".

use std::collections::{BTreeMap, HashMap};

use crate::campaign::{ReadColumn, ReadFile, ReadSource, SampleSpec};
use crate::errors::{PlanError, Result};
use crate::naming::PolishChain;

pub const SAMPLE_COLUMNS: [&str; 9] = [
    "uuid",
    "assemblerConfig",
    "readSourceKey",
    "polishChainSpec",
    "repolishTarget",
    "refGroup",
    "medakaModel",
    "cpu",
    "gpu",
];

pub const READ_KEY_COLUMN: &str = "readSourceKey";

struct Row<'a> {
    line_no: usize,
    cells: Vec<&'a str>,
}

struct Table<'a> {
    source: &'a str,
    header: HashMap<&'a str, usize>,
    columns: Vec<&'a str>,
    rows: Vec<Row<'a>>,
}

impl<'a> Table<'a> {
    fn parse(source: &'a str, contents: &'a str) -> Result<Self> {
        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'));

        let (_, header_line) = lines.next().ok_or_else(|| {
            PlanError::ConfigError(format!("{source}: table is empty (no header row)"))
        })?;
        let columns: Vec<&str> = header_line.split('\t').map(str::trim).collect();

        let mut header = HashMap::new();
        for (idx, name) in columns.iter().enumerate() {
            if header.insert(*name, idx).is_some() {
                return Err(PlanError::ConfigError(format!(
                    "{source}: duplicate column '{name}' in header"
                )));
            }
        }

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
            if cells.len() != columns.len() {
                return Err(PlanError::ConfigError(format!(
                    "{source}:{line_no}: expected {} columns, found {}",
                    columns.len(),
                    cells.len()
                )));
            }
            rows.push(Row { line_no, cells });
        }

        Ok(Self {
            source,
            header,
            columns,
            rows,
        })
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.header.get(column).copied().ok_or_else(|| {
            PlanError::ConfigError(format!(
                "{}: missing required column '{column}'",
                self.source
            ))
        })
    }
}

fn cell(row: &Row<'_>, idx: usize) -> Option<String> {
    match row.cells[idx] {
        "" | "-" => None,
        value => Some(value.to_string()),
    }
}

fn required_cell(source: &str, row: &Row<'_>, idx: usize, column: &str) -> Result<String> {
    cell(row, idx).ok_or_else(|| {
        PlanError::ConfigError(format!(
            "{source}:{}: column '{column}' must not be empty",
            row.line_no
        ))
    })
}

/// Parse the sample table into `uuid -> SampleSpec`.
pub fn parse_sample_table(source: &str, contents: &str) -> Result<BTreeMap<String, SampleSpec>> {
    let table = Table::parse(source, contents)?;
    let idx = SAMPLE_COLUMNS
        .iter()
        .map(|c| table.require(c))
        .collect::<Result<Vec<_>>>()?;

    let mut samples = BTreeMap::new();
    for row in table.rows.iter() {
        let uuid = required_cell(source, row, idx[0], SAMPLE_COLUMNS[0])?;
        let chain_spec = cell(row, idx[3]).unwrap_or_default();
        let polish_chain = PolishChain::parse(&chain_spec).map_err(|e| {
            PlanError::ConfigError(format!(
                "{source}:{}: invalid polishChainSpec for sample '{uuid}': {e}",
                row.line_no
            ))
        })?;

        let spec = SampleSpec {
            uuid: uuid.clone(),
            assembler_config: required_cell(source, row, idx[1], SAMPLE_COLUMNS[1])?,
            read_source_key: required_cell(source, row, idx[2], SAMPLE_COLUMNS[2])?,
            polish_chain,
            repolish_target: cell(row, idx[4]),
            ref_group: cell(row, idx[5]),
            medaka_model: cell(row, idx[6]),
            cpu: cell(row, idx[7]),
            gpu: cell(row, idx[8]),
        };

        if samples.insert(uuid.clone(), spec).is_some() {
            return Err(PlanError::ConfigError(format!(
                "{source}:{}: duplicate uuid '{uuid}'",
                row.line_no
            )));
        }
    }
    Ok(samples)
}

/// Parse the read table into `readSourceKey -> ReadSource`.
pub fn parse_read_table(source: &str, contents: &str) -> Result<BTreeMap<String, ReadSource>> {
    let table = Table::parse(source, contents)?;
    let key_idx = table.require(READ_KEY_COLUMN)?;

    let mut read_columns = Vec::new();
    for (idx, name) in table.columns.iter().enumerate() {
        if idx == key_idx {
            continue;
        }
        let column = name
            .parse::<ReadColumn>()
            .map_err(|e| PlanError::ConfigError(format!("{source}: {e}")))?;
        read_columns.push((idx, column));
    }

    let mut reads = BTreeMap::new();
    for row in table.rows.iter() {
        let key = required_cell(source, row, key_idx, READ_KEY_COLUMN)?;
        let files = read_columns
            .iter()
            .filter_map(|(idx, column)| {
                cell(row, *idx).map(|value| (*column, ReadFile::parse_cell(&value)))
            })
            .collect();

        let source_row = ReadSource {
            key: key.clone(),
            files,
        };
        if reads.insert(key.clone(), source_row).is_some() {
            return Err(PlanError::ConfigError(format!(
                "{source}:{}: duplicate readSourceKey '{key}'",
                row.line_no
            )));
        }
    }
    Ok(reads)
}
