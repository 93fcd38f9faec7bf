//! Fragment file output and the cross-fragment mapping file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fracture_core::relation::Relation;
use fracture_csv::dialect::DialectOptions;
use fracture_csv::writer::{RowOrder, write_relation};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;

/// Everything one fragment put on disk.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentLayout {
    pub fragment: usize,
    pub tables: Vec<TableLayout>,
}

/// Layout of a single written table file.
#[derive(Debug, Clone, Serialize)]
pub struct TableLayout {
    pub file: String,
    /// Original column indices in written order.
    pub column_order: Vec<usize>,
    /// Key columns, in original numbering.
    pub key: Vec<usize>,
    /// Foreign key columns, in original numbering.
    pub foreign_key: Vec<usize>,
}

/// Write all sub-relations of one fragment plus its key description file.
///
/// Files are named `fragment_<k>_<j>.csv` for the j-th sub-relation of
/// fragment k, and `fragment_<k>.keys.txt` for the key description.
pub fn write_fragment<R: Rng>(
    dir: &Path,
    fragment: usize,
    subs: &[Relation],
    dialect: &DialectOptions,
    has_header: bool,
    order: RowOrder,
    rng: &mut R,
) -> Result<FragmentLayout> {
    let mut tables = Vec::with_capacity(subs.len());

    for (table, sub) in subs.iter().enumerate() {
        let name = format!("fragment_{fragment}_{table}.csv");
        let mut writer = BufWriter::new(File::create(dir.join(&name))?);
        let layout = write_relation(&mut writer, sub, dialect, has_header, order, rng)?;
        writer.flush()?;
        debug!(file = %name, rows = sub.num_rows(), "wrote fragment table");

        tables.push(TableLayout {
            file: name,
            column_order: layout.column_order,
            key: sub.key.iter().copied().collect(),
            foreign_key: sub.foreign_key.iter().copied().collect(),
        });
    }

    let layout = FragmentLayout { fragment, tables };
    write_key_file(dir, &layout)?;
    Ok(layout)
}

/// Key positions are given in the written column order, so they stay valid
/// when the writer shuffled the columns.
fn write_key_file(dir: &Path, layout: &FragmentLayout) -> Result<()> {
    let path = dir.join(format!("fragment_{}.keys.txt", layout.fragment));
    let mut out = BufWriter::new(File::create(path)?);
    for table in &layout.tables {
        writeln!(out, "table: {}", table.file)?;
        writeln!(
            out,
            "primary key positions: {}",
            positions(&table.column_order, &table.key)
        )?;
        writeln!(
            out,
            "foreign key positions: {}",
            positions(&table.column_order, &table.foreign_key)
        )?;
    }
    out.flush()?;
    Ok(())
}

fn positions(column_order: &[usize], keys: &[usize]) -> String {
    let found: Vec<String> = column_order
        .iter()
        .enumerate()
        .filter(|(_, idx)| keys.contains(idx))
        .map(|(pos, _)| pos.to_string())
        .collect();
    if found.is_empty() {
        "none".to_string()
    } else {
        found.join(", ")
    }
}

/// Schema of the relation as it was ingested.
#[derive(Debug, Clone, Serialize)]
pub struct OriginalDescription {
    pub columns: Vec<OriginalColumn>,
    pub key: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginalColumn {
    pub index: usize,
    pub name: Option<String>,
}

impl OriginalDescription {
    pub fn from_relation(rel: &Relation) -> Self {
        OriginalDescription {
            columns: rel
                .columns
                .iter()
                .map(|(idx, col)| OriginalColumn {
                    index: *idx,
                    name: col.attr.name.clone(),
                })
                .collect(),
            key: rel.key.iter().copied().collect(),
        }
    }
}

/// Content of `mapping.json`: the ground truth tying fragment files back to
/// the original relation.
#[derive(Debug, Serialize)]
pub struct MappingFile {
    pub original: OriginalDescription,
    pub fragments: Vec<FragmentLayout>,
}

impl MappingFile {
    /// Fragments whose write worker failed have no layout and are left out.
    pub fn new(original: OriginalDescription, slots: &[Option<FragmentLayout>]) -> Self {
        MappingFile {
            original,
            fragments: slots.iter().flatten().cloned().collect(),
        }
    }
}
