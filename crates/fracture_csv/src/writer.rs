//! Relation output with configurable row and column arrangement.

use std::io::Write;

use csv::ByteRecord;
use fracture_core::relation::{Column, Relation};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::dialect::DialectOptions;
use crate::errors::Result;

/// Row/column arrangement of a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrder {
    /// Columns ascending by index, rows as stored.
    #[default]
    Original,
    /// Columns in random order, rows as stored.
    ShuffledColumns,
    /// Columns ascending, rows in random order.
    ShuffledRows,
}

/// Layout of the file a write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenLayout {
    /// Original column indices in the order they were written.
    pub column_order: Vec<usize>,
}

/// Write `rel` as delimited text.
///
/// Returns the column order that went to disk, which callers need to
/// translate column indices into file positions when `order` shuffles
/// columns.
pub fn write_relation<W: Write, R: Rng>(
    output: W,
    rel: &Relation,
    dialect: &DialectOptions,
    has_header: bool,
    order: RowOrder,
    rng: &mut R,
) -> Result<WrittenLayout> {
    let mut column_order = rel.column_indices();
    let mut row_order: Vec<usize> = (0..rel.num_rows()).collect();
    match order {
        RowOrder::Original => {}
        RowOrder::ShuffledColumns => column_order.shuffle(rng),
        RowOrder::ShuffledRows => row_order.shuffle(rng),
    }

    let columns: Vec<&Column> = column_order
        .iter()
        .filter_map(|idx| rel.column(*idx))
        .collect();

    let mut csv_writer = dialect.writer_builder().from_writer(output);
    let mut record = ByteRecord::with_capacity(1024, columns.len());

    if has_header {
        for col in &columns {
            record.push_field(col.attr.name.as_deref().unwrap_or("").as_bytes());
        }
        csv_writer.write_record(&record)?;
    }

    for &row in &row_order {
        record.clear();
        for col in &columns {
            record.push_field(col.values[row].as_bytes());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(WrittenLayout { column_order })
}

#[cfg(test)]
mod tests {
    use fracture_core::relation::{Attribute, DataType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::reader::read_relation;

    fn sample_relation() -> Relation {
        Relation::from_columns([
            (
                0,
                Column::new(
                    Attribute::new("id", DataType::Float64),
                    vec!["1".to_string(), "2".to_string(), "3".to_string()],
                ),
            ),
            (
                2,
                Column::new(
                    Attribute::new("city", DataType::Utf8),
                    vec![
                        "berlin".to_string(),
                        "paris, france".to_string(),
                        "oslo".to_string(),
                    ],
                ),
            ),
        ])
    }

    #[test]
    fn writes_in_original_order() {
        let mut rng = StdRng::seed_from_u64(91);
        let mut buf = Vec::new();
        let layout = write_relation(
            &mut buf,
            &sample_relation(),
            &DialectOptions::default(),
            true,
            RowOrder::Original,
            &mut rng,
        )
        .unwrap();

        assert_eq!(vec![0, 2], layout.column_order);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            "id,city\n1,berlin\n2,\"paris, france\"\n3,oslo\n",
            text
        );
    }

    #[test]
    fn round_trips_through_the_reader() {
        let mut rng = StdRng::seed_from_u64(92);
        let rel = sample_relation();
        let mut buf = Vec::new();
        write_relation(
            &mut buf,
            &rel,
            &DialectOptions::default(),
            true,
            RowOrder::Original,
            &mut rng,
        )
        .unwrap();

        let back = read_relation(buf.as_slice(), &DialectOptions::default(), true).unwrap();
        // Indices compact on re-read; values and names survive.
        assert_eq!(
            rel.column(0).unwrap().values,
            back.column(0).unwrap().values
        );
        assert_eq!(
            rel.column(2).unwrap().values,
            back.column(1).unwrap().values
        );
        assert_eq!(Some("city"), back.column(1).unwrap().attr.name.as_deref());
    }

    #[test]
    fn shuffled_columns_report_their_order() {
        let mut rng = StdRng::seed_from_u64(93);
        let rel = Relation::from_columns((0..6).map(|idx| {
            (
                idx,
                Column::new(
                    Attribute::new(format!("c{idx}"), DataType::Utf8),
                    vec![idx.to_string()],
                ),
            )
        }));

        let mut buf = Vec::new();
        let layout = write_relation(
            &mut buf,
            &rel,
            &DialectOptions::default(),
            true,
            RowOrder::ShuffledColumns,
            &mut rng,
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();

        // The header and the data row follow the reported order.
        for (pos, idx) in layout.column_order.iter().enumerate() {
            assert_eq!(format!("c{idx}"), header[pos]);
            assert_eq!(idx.to_string(), row[pos]);
        }
        let mut sorted = layout.column_order.clone();
        sorted.sort_unstable();
        assert_eq!(vec![0, 1, 2, 3, 4, 5], sorted);
    }

    #[test]
    fn shuffled_rows_keep_rows_intact() {
        let mut rng = StdRng::seed_from_u64(94);
        let rel = sample_relation();
        let mut buf = Vec::new();
        write_relation(
            &mut buf,
            &rel,
            &DialectOptions::default(),
            true,
            RowOrder::ShuffledRows,
            &mut rng,
        )
        .unwrap();

        let back = read_relation(buf.as_slice(), &DialectOptions::default(), true).unwrap();
        let ids = &back.column(0).unwrap().values;
        let cities = &back.column(1).unwrap().values;

        let mut pairs: Vec<(&str, &str)> = ids
            .iter()
            .map(String::as_str)
            .zip(cities.iter().map(String::as_str))
            .collect();
        pairs.sort_unstable();
        assert_eq!(
            vec![
                ("1", "berlin"),
                ("2", "paris, france"),
                ("3", "oslo"),
            ],
            pairs
        );
    }

    #[test]
    fn anonymous_columns_write_empty_header_cells() {
        let mut rng = StdRng::seed_from_u64(95);
        let rel = Relation::from_columns([(
            0,
            Column::new(
                Attribute::unnamed(DataType::Utf8),
                vec!["x".to_string()],
            ),
        )]);

        let mut buf = Vec::new();
        write_relation(
            &mut buf,
            &rel,
            &DialectOptions::default(),
            true,
            RowOrder::Original,
            &mut rng,
        )
        .unwrap();
        assert_eq!("\"\"\nx\n", String::from_utf8(buf).unwrap());
    }

    #[test]
    fn alternate_dialect_round_trip() {
        let mut rng = StdRng::seed_from_u64(96);
        let dialect = DialectOptions {
            delimiter: b';',
            quote: b'\'',
            escape: None,
        };
        let mut buf = Vec::new();
        write_relation(
            &mut buf,
            &sample_relation(),
            &dialect,
            true,
            RowOrder::Original,
            &mut rng,
        )
        .unwrap();

        let back = read_relation(buf.as_slice(), &dialect, true).unwrap();
        assert_eq!(
            vec!["berlin", "paris, france", "oslo"],
            back.column(1).unwrap().values
        );
    }
}
