use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use fracture_core::noise::{NumericMethod, SchemaMethod, StringMethod};
use fracture_core::oracle::lexicon::Language;
use fracture_core::partition::{ColumnSplit, OverlapKind, RowSplit, SplitKind, SplitOptions};
use fracture_core::perturb::schema::SchemaNoiseOptions;
use fracture_core::perturb::value::ValueNoiseOptions;
use fracture_csv::writer::RowOrder;

use crate::errors::{PipelineError, Result};

#[derive(Parser)]
#[clap(name = "fracture")]
#[clap(version)]
#[clap(
    about = "Split a relation into overlapping fragments and corrupt them with noise",
    long_about = None
)]
pub struct Arguments {
    /// Input file with delimited records.
    pub input: PathBuf,

    /// Directory receiving the fragment files.
    #[clap(short, long, default_value = "fragments")]
    pub output_dir: PathBuf,

    /// Field delimiter. Inferred from the input when omitted.
    #[clap(long)]
    pub delimiter: Option<char>,

    /// Quote character.
    #[clap(long)]
    pub quote: Option<char>,

    /// Escape character. Quotes are escaped by doubling when omitted.
    #[clap(long)]
    pub escape: Option<char>,

    /// Whether the first record holds column names.
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub header: bool,

    /// How the relation is split into fragments.
    #[clap(long, value_enum, default_value_t = SplitKindArg::Horizontal)]
    pub split: SplitKindArg,

    /// Percentage of rows duplicated into both row fragments.
    #[clap(long, default_value_t = 10.0)]
    pub row_overlap: f64,

    /// Percentage of the non-shared rows going to the first fragment.
    #[clap(long, default_value_t = 50.0)]
    pub row_distribution: f64,

    /// Scatter the shared rows over the relation instead of taking one
    /// contiguous block.
    #[clap(long)]
    pub scattered_overlap: bool,

    /// Percentage of non-key columns duplicated into both column fragments.
    #[clap(long, default_value_t = 10.0)]
    pub column_overlap: f64,

    /// Percentage of the non-shared columns going to the first fragment.
    #[clap(long, default_value_t = 50.0)]
    pub column_distribution: f64,

    /// Degree of schema decomposition: 0 keeps fragments whole, 100
    /// applies every decomposition step found.
    #[clap(long, default_value_t = 0.0)]
    pub decompose: f64,

    /// Percentage of eligible columns whose names are corrupted.
    #[clap(long, default_value_t = 0.0)]
    pub schema_noise: f64,

    /// Rename methods to rotate through.
    #[clap(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = SchemaMethodArg::value_variants().iter().copied()
    )]
    pub schema_methods: Vec<SchemaMethodArg>,

    /// Allow renaming key columns.
    #[clap(long)]
    pub schema_noise_on_keys: bool,

    /// Drop all column names instead of renaming a share of them.
    #[clap(long)]
    pub erase_names: bool,

    /// Percentage of candidate columns (or overlap rows) whose values are
    /// corrupted.
    #[clap(long, default_value_t = 0.0)]
    pub value_noise: f64,

    /// Percentage of entries corrupted inside each chosen column or row.
    #[clap(long, default_value_t = 20.0)]
    pub value_noise_inside: f64,

    /// Allow corrupting values of key columns.
    #[clap(long)]
    pub value_noise_on_keys: bool,

    /// Corruption methods for string cells.
    #[clap(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = StringMethodArg::value_variants().iter().copied()
    )]
    pub string_methods: Vec<StringMethodArg>,

    /// Corruption methods for numeric cells.
    #[clap(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = NumericMethodArg::value_variants().iter().copied()
    )]
    pub numeric_methods: Vec<NumericMethodArg>,

    /// Source language of the input vocabulary.
    #[clap(long, value_enum, default_value_t = LanguageArg::English)]
    pub translate_from: LanguageArg,

    /// Target language for the translation methods.
    #[clap(long, value_enum, default_value_t = LanguageArg::German)]
    pub translate_to: LanguageArg,

    /// Column pairs to merge after the noise stages, as
    /// `survivor:absorbed` original indices.
    #[clap(long, value_delimiter = ',')]
    pub merge: Vec<String>,

    /// Columns whose values are replaced by integer labels, one label per
    /// distinct value.
    #[clap(long, value_delimiter = ',')]
    pub remap: Vec<usize>,

    /// Row/column arrangement of the written files.
    #[clap(long, value_enum, default_value_t = RowOrderArg::Original)]
    pub output_order: RowOrderArg,

    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output logs in json format.
    #[clap(long)]
    pub log_json: bool,
}

impl Arguments {
    /// Check everything clap cannot express. Called before the pipeline
    /// touches the input.
    pub fn validate(&self) -> Result<()> {
        for (value, name) in [
            (self.row_overlap, "--row-overlap"),
            (self.row_distribution, "--row-distribution"),
            (self.column_overlap, "--column-overlap"),
            (self.column_distribution, "--column-distribution"),
            (self.decompose, "--decompose"),
            (self.schema_noise, "--schema-noise"),
            (self.value_noise, "--value-noise"),
            (self.value_noise_inside, "--value-noise-inside"),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(PipelineError::InvalidArgument(format!(
                    "{name} must lie in [0, 100], got {value}"
                )));
            }
        }
        for (value, name) in [
            (self.delimiter, "--delimiter"),
            (self.quote, "--quote"),
            (self.escape, "--escape"),
        ] {
            if let Some(c) = value {
                if !c.is_ascii() {
                    return Err(PipelineError::InvalidArgument(format!(
                        "{name} must be an ascii character, got '{c}'"
                    )));
                }
            }
        }
        self.merge_pairs()?;
        Ok(())
    }

    pub fn merge_pairs(&self) -> Result<Vec<(usize, usize)>> {
        self.merge
            .iter()
            .map(|pair| {
                let parsed = pair.split_once(':').and_then(|(survivor, absorbed)| {
                    Some((
                        survivor.trim().parse::<usize>().ok()?,
                        absorbed.trim().parse::<usize>().ok()?,
                    ))
                });
                parsed.ok_or_else(|| {
                    PipelineError::InvalidArgument(format!(
                        "--merge expects `survivor:absorbed` index pairs, got '{pair}'"
                    ))
                })
            })
            .collect()
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            kind: self.split.into(),
            rows: RowSplit {
                overlap_pct: self.row_overlap,
                distribution_pct: self.row_distribution,
                overlap: if self.scattered_overlap {
                    OverlapKind::Scattered
                } else {
                    OverlapKind::Block
                },
            },
            columns: ColumnSplit {
                overlap_pct: self.column_overlap,
                distribution_pct: self.column_distribution,
            },
        }
    }

    pub fn schema_options(&self) -> SchemaNoiseOptions {
        SchemaNoiseOptions {
            noise_pct: self.schema_noise,
            keys_eligible: self.schema_noise_on_keys,
            erase_names: self.erase_names,
            methods: self.schema_methods.iter().map(|m| (*m).into()).collect(),
        }
    }

    pub fn value_options(&self) -> ValueNoiseOptions {
        ValueNoiseOptions {
            noise_pct: self.value_noise,
            inside_pct: self.value_noise_inside,
            keys_eligible: self.value_noise_on_keys,
            string_methods: self.string_methods.iter().map(|m| (*m).into()).collect(),
            numeric_methods: self.numeric_methods.iter().map(|m| (*m).into()).collect(),
        }
    }

    pub fn languages(&self) -> (Language, Language) {
        (self.translate_from.into(), self.translate_to.into())
    }

    pub fn row_order(&self) -> RowOrder {
        self.output_order.into()
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn log_format(&self) -> logutil::LogFormat {
        if self.log_json {
            logutil::LogFormat::Json
        } else {
            logutil::LogFormat::HumanReadable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitKindArg {
    Horizontal,
    Vertical,
    HorizontalVertical,
}

impl From<SplitKindArg> for SplitKind {
    fn from(kind: SplitKindArg) -> Self {
        match kind {
            SplitKindArg::Horizontal => SplitKind::Horizontal,
            SplitKindArg::Vertical => SplitKind::Vertical,
            SplitKindArg::HorizontalVertical => SplitKind::HorizontalVertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaMethodArg {
    RandomName,
    RemoveVowels,
    AbbreviateFirstLetters,
    AbbreviateRandom,
    AddPrefix,
    ShuffleLetters,
    ShuffleWords,
    Synonym,
    Translate,
}

impl From<SchemaMethodArg> for SchemaMethod {
    fn from(method: SchemaMethodArg) -> Self {
        match method {
            SchemaMethodArg::RandomName => SchemaMethod::RandomName,
            SchemaMethodArg::RemoveVowels => SchemaMethod::RemoveVowels,
            SchemaMethodArg::AbbreviateFirstLetters => SchemaMethod::AbbreviateFirstLetters,
            SchemaMethodArg::AbbreviateRandom => SchemaMethod::AbbreviateRandom,
            SchemaMethodArg::AddPrefix => SchemaMethod::AddPrefix,
            SchemaMethodArg::ShuffleLetters => SchemaMethod::ShuffleLetters,
            SchemaMethodArg::ShuffleWords => SchemaMethod::ShuffleWords,
            SchemaMethodArg::Synonym => SchemaMethod::Synonym,
            SchemaMethodArg::Translate => SchemaMethod::Translate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StringMethodArg {
    Typo,
    KeyboardError,
    OcrError,
    PhoneticError,
    ChangeFormat,
    ShuffleWords,
    Abbreviate,
    Synonym,
    Translate,
    MissingValue,
}

impl From<StringMethodArg> for StringMethod {
    fn from(method: StringMethodArg) -> Self {
        match method {
            StringMethodArg::Typo => StringMethod::Typo,
            StringMethodArg::KeyboardError => StringMethod::KeyboardError,
            StringMethodArg::OcrError => StringMethod::OcrError,
            StringMethodArg::PhoneticError => StringMethod::PhoneticError,
            StringMethodArg::ChangeFormat => StringMethod::ChangeFormat,
            StringMethodArg::ShuffleWords => StringMethod::ShuffleWords,
            StringMethodArg::Abbreviate => StringMethod::Abbreviate,
            StringMethodArg::Synonym => StringMethod::Synonym,
            StringMethodArg::Translate => StringMethod::Translate,
            StringMethodArg::MissingValue => StringMethod::MissingValue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NumericMethodArg {
    ChangeValue,
    ChangeToOutlier,
}

impl From<NumericMethodArg> for NumericMethod {
    fn from(method: NumericMethodArg) -> Self {
        match method {
            NumericMethodArg::ChangeValue => NumericMethod::ChangeValue,
            NumericMethodArg::ChangeToOutlier => NumericMethod::ChangeToOutlier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    English,
    German,
}

impl From<LanguageArg> for Language {
    fn from(language: LanguageArg) -> Self {
        match language {
            LanguageArg::English => Language::English,
            LanguageArg::German => Language::German,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowOrderArg {
    Original,
    ShuffledColumns,
    ShuffledRows,
}

impl From<RowOrderArg> for RowOrder {
    fn from(order: RowOrderArg) -> Self {
        match order {
            RowOrderArg::Original => RowOrder::Original,
            RowOrderArg::ShuffledColumns => RowOrder::ShuffledColumns,
            RowOrderArg::ShuffledRows => RowOrder::ShuffledRows,
        }
    }
}
