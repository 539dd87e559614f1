use super::radii::{element_from_atom_name, vdw_radius};
use super::traits::StructureFile;
use crate::core::models::atom::LoadedAtom;
use nalgebra::{Matrix4, Point3};
use std::io::{self, BufRead};
use thiserror::Error;

/// Atoms and biological-assembly transforms read from one PDB file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbStructure {
    /// Atoms of the first model, X already negated.
    pub atoms: Vec<LoadedAtom>,
    /// REMARK 350 BIOMT matrices in file order, editor convention.
    pub biomt: Vec<Matrix4<f64>>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("Malformed BIOMT record: {0}")]
    InvalidBiomt(String),
}

const MIN_ATOM_LINE_LEN: usize = 54;

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Accumulates BIOMT1..3 rows into complete matrices.
#[derive(Default)]
struct BiomtBuilder {
    rows: Vec<[f64; 4]>,
    matrices: Vec<Matrix4<f64>>,
}

impl BiomtBuilder {
    fn push(&mut self, line: &str, line_num: usize) -> Result<(), PdbError> {
        let invalid = |msg: String| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidBiomt(msg),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        // REMARK 350 BIOMTn serial m1 m2 m3 t
        if tokens.len() < 8 {
            return Err(invalid(format!("expected 8 fields, found {}", tokens.len())));
        }
        let row: usize = tokens[2]
            .strip_prefix("BIOMT")
            .and_then(|n| n.parse().ok())
            .filter(|n| (1..=3).contains(n))
            .ok_or_else(|| invalid(format!("unknown row label '{}'", tokens[2])))?;
        if row != self.rows.len() + 1 {
            return Err(invalid(format!(
                "row BIOMT{row} out of sequence (expected BIOMT{})",
                self.rows.len() + 1
            )));
        }

        let mut values = [0.0; 4];
        for (slot, token) in values.iter_mut().zip(&tokens[4..8]) {
            *slot = token
                .parse()
                .map_err(|_| invalid(format!("invalid number '{token}'")))?;
        }
        self.rows.push(values);

        if self.rows.len() == 3 {
            let r = &self.rows;
            self.matrices.push(Matrix4::new(
                r[0][0], r[0][1], r[0][2], r[0][3],
                r[1][0], r[1][1], r[1][2], r[1][3],
                r[2][0], r[2][1], r[2][2], r[2][3],
                0.0, 0.0, 0.0, 1.0,
            ));
            self.rows.clear();
        }
        Ok(())
    }

    fn finish(self, line_num: usize) -> Result<Vec<Matrix4<f64>>, PdbError> {
        if !self.rows.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidBiomt("incomplete transform at end of file".into()),
            });
        }
        Ok(self.matrices)
    }
}

pub struct PdbFile;

impl StructureFile for PdbFile {
    type Output = PdbStructure;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<PdbStructure, PdbError> {
        let mut atoms = Vec::new();
        let mut biomt = BiomtBuilder::default();
        let mut in_first_model = true;
        let mut last_line = 0;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            last_line = line_num;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" if in_first_model => {
                    if line.len() < MIN_ATOM_LINE_LEN {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }
                    let alt_loc = line.get(16..17).unwrap_or(" ");
                    if alt_loc != " " && alt_loc != "A" {
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    let x = parse_coordinate(&line, line_num, 30, 38)?;
                    let y = parse_coordinate(&line, line_num, 38, 46)?;
                    let z = parse_coordinate(&line, line_num, 46, 54)?;

                    let element = match slice_and_trim(&line, 76, 78) {
                        "" => element_from_atom_name(name),
                        e => e.to_string(),
                    };

                    atoms.push(LoadedAtom::new(
                        name,
                        Point3::new(-x, y, z),
                        vdw_radius(&element),
                    ));
                }
                "ENDMDL" => in_first_model = false,
                "REMARK" if line.contains("BIOMT") => biomt.push(&line, line_num)?,
                _ => {}
            }
        }

        Ok(PdbStructure {
            atoms,
            biomt: biomt.finish(last_line)?,
        })
    }
}
