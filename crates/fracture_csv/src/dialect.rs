//! Delimiter dialects and sample-based inference.

use std::fmt;

/// Character-level layout of a delimited text file.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Quote character for fields containing the separator.
    pub quote: u8,
    /// Escape character. `None` escapes quotes by doubling them.
    pub escape: Option<u8>,
}

impl Default for DialectOptions {
    fn default() -> Self {
        DialectOptions {
            delimiter: b',',
            quote: b'"',
            escape: None,
        }
    }
}

impl fmt::Debug for DialectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("quote", &(self.quote as char))
            .field("escape", &self.escape.map(|c| c as char))
            .finish()
    }
}

impl DialectOptions {
    /// Guess the dialect of a delimited file from its contents.
    ///
    /// A candidate survives only if it decodes the whole sample into at
    /// least two records sharing one width of at least two fields. The
    /// widest surviving parse wins; on equal width the earlier entry of
    /// the candidate table keeps its spot.
    pub fn infer_from_sample(sample: &[u8]) -> Option<Self> {
        let mut best: Option<(Self, usize)> = None;

        for dialect in Self::dialects() {
            let Some(fields) = dialect.consistent_field_count(sample) else {
                continue;
            };
            if best.is_none_or(|(_, widest)| fields > widest) {
                best = Some((*dialect, fields));
            }
        }

        best.map(|(dialect, _)| dialect)
    }

    /// Field count this dialect decodes `sample` into, if the parse is
    /// usable: no decode errors, two or more records, every record the
    /// same width, two or more fields wide.
    fn consistent_field_count(&self, sample: &[u8]) -> Option<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(sample);

        let mut fields = 0;
        let mut records = 0;
        for record in reader.byte_records() {
            let record = record.ok()?;
            if records == 0 {
                fields = record.len();
            } else if record.len() != fields {
                return None;
            }
            records += 1;
        }

        (records >= 2 && fields >= 2).then_some(fields)
    }

    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .double_quote(self.escape.is_none())
            .has_headers(false)
            .flexible(false);
        builder
    }

    pub(crate) fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(self.delimiter).quote(self.quote);
        if let Some(escape) = self.escape {
            builder.escape(escape).double_quote(false);
        }
        builder
    }

    /// Inference candidates, most common first.
    ///
    /// A file with no quoted fields parses identically under either quote
    /// character, so the double-quote entries sit ahead of their
    /// single-quote twins and win those ties.
    const fn dialects() -> &'static [Self] {
        &[
            DialectOptions {
                delimiter: b',',
                quote: b'"',
                escape: None,
            },
            DialectOptions {
                delimiter: b'|',
                quote: b'"',
                escape: None,
            },
            DialectOptions {
                delimiter: b';',
                quote: b'"',
                escape: None,
            },
            DialectOptions {
                delimiter: b'\t',
                quote: b'"',
                escape: None,
            },
            DialectOptions {
                delimiter: b',',
                quote: b'\'',
                escape: None,
            },
            DialectOptions {
                delimiter: b'|',
                quote: b'\'',
                escape: None,
            },
            DialectOptions {
                delimiter: b';',
                quote: b'\'',
                escape: None,
            },
            DialectOptions {
                delimiter: b'\t',
                quote: b'\'',
                escape: None,
            },
        ]
    }
}
