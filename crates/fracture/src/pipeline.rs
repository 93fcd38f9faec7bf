//! End-to-end pipeline: read one relation, fragment it, corrupt the
//! fragments, write everything out.

use std::fs;

use fracture_core::noise::{MethodLibrary, map_column};
use fracture_core::oracle::decompose::{Decomposer, FdDecomposer, apply_decomposition};
use fracture_core::oracle::keys::{KeyDiscoverer, UccDiscoverer};
use fracture_core::oracle::lexicon::StaticLexicon;
use fracture_core::partition;
use fracture_core::perturb::schema::SchemaPerturbator;
use fracture_core::perturb::value::ValuePerturbator;
use fracture_core::relation::Relation;
use fracture_csv::dialect::DialectOptions;
use tracing::{debug, error, info, warn};

use crate::args::Arguments;
use crate::errors::Result;
use crate::output;

/// Run the whole pipeline.
///
/// Stages degrade rather than abort where the output stays usable: oracle
/// failures fall back to doing nothing, noise failures leave a fragment
/// uncorrupted, and a failed fragment write leaves the sibling fragments
/// and the mapping file in place. Unreadable input, invalid arguments, and
/// an unwritable output directory are fatal.
pub fn run(args: &Arguments) -> Result<()> {
    args.validate()?;

    let bytes = fs::read(&args.input)?;
    let dialect = resolve_dialect(args, &bytes);
    let mut relation = fracture_csv::read_relation(bytes.as_slice(), &dialect, args.header)?;
    info!(
        columns = relation.num_columns(),
        rows = relation.num_rows(),
        "ingested relation"
    );

    let mut rng = rand::rng();

    match UccDiscoverer::default().discover(&relation) {
        Ok(key) => relation.key = key,
        Err(err) => warn!(%err, "key discovery failed, continuing without a key"),
    }
    if relation.key.is_empty() {
        warn!("no unique key found, key-dependent stages treat all columns as plain");
    }

    let original = output::OriginalDescription::from_relation(&relation);

    let fragments = partition::split(relation, &args.split_options(), &mut rng);
    info!(fragments = fragments.len(), "split relation");

    let mut decomposed: Vec<Vec<Relation>> = Vec::with_capacity(fragments.len());
    for (idx, fragment) in fragments.into_iter().enumerate() {
        decomposed.push(decompose_fragment(fragment, idx, args.decompose)?);
    }

    let lexicon = StaticLexicon;
    let (translate_from, translate_to) = args.languages();
    let library = MethodLibrary::new(&lexicon, translate_from, translate_to);

    let schema_options = args.schema_options();
    if schema_options.erase_names || schema_options.noise_pct > 0.0 {
        for (idx, subs) in decomposed.iter_mut().enumerate() {
            // One perturbator per fragment, so the method rotation spans
            // its sub-relations.
            let mut perturbator = SchemaPerturbator::new(&library, schema_options.clone());
            for sub in subs.iter_mut() {
                if let Err(err) = perturbator.perturb(sub, &mut rng) {
                    warn!(%err, fragment = idx, "schema noise failed, fragment left as is");
                    break;
                }
            }
        }
    }

    let value_options = args.value_options();
    if value_options.noise_pct > 0.0 {
        for (idx, subs) in decomposed.iter_mut().enumerate() {
            let mut perturbator = ValuePerturbator::new(&library, value_options.clone());
            for sub in subs.iter_mut() {
                if let Err(err) = perturbator.perturb(sub, &mut rng) {
                    warn!(%err, fragment = idx, "value noise failed, fragment left as is");
                    break;
                }
            }
        }
    }

    let merge_pairs = args.merge_pairs()?;
    for subs in decomposed.iter_mut() {
        for sub in subs.iter_mut() {
            for &(survivor, absorbed) in &merge_pairs {
                if sub.columns.contains_key(&survivor) && sub.columns.contains_key(&absorbed) {
                    sub.merge_columns(survivor, absorbed)?;
                } else {
                    debug!(survivor, absorbed, "merge pair not present, skipped");
                }
            }
            for &idx in &args.remap {
                if let Some(col) = sub.column_mut(idx) {
                    col.values = map_column(&col.values);
                }
            }
        }
    }

    write_fragments(args, &dialect, &decomposed, original)
}

/// Decompose one fragment, keeping it whole when the oracle fails or
/// produces unusable pieces.
fn decompose_fragment(fragment: Relation, idx: usize, degree_pct: f64) -> Result<Vec<Relation>> {
    if degree_pct == 0.0 {
        return Ok(vec![fragment]);
    }

    let pieces = match FdDecomposer.decompose(&fragment, degree_pct) {
        Ok(pieces) => pieces,
        Err(err) => {
            warn!(%err, fragment = idx, "decomposition failed, fragment kept whole");
            return Ok(vec![fragment]);
        }
    };

    let usable = !pieces.is_empty()
        && pieces
            .iter()
            .all(|piece| piece.columns.iter().all(|c| fragment.columns.contains_key(c)));
    if !usable {
        warn!(fragment = idx, "decomposition proposed unknown columns, fragment kept whole");
        return Ok(vec![fragment]);
    }

    let subs = apply_decomposition(fragment, &pieces)?;
    debug!(fragment = idx, tables = subs.len(), "decomposed fragment");
    Ok(subs)
}

/// Write all fragments in parallel, one worker per fragment.
///
/// A worker failure loses that fragment's files only; the mapping file is
/// still written for whatever succeeded.
fn write_fragments(
    args: &Arguments,
    dialect: &DialectOptions,
    decomposed: &[Vec<Relation>],
    original: output::OriginalDescription,
) -> Result<()> {
    fs::create_dir_all(&args.output_dir)?;

    let has_header = args.header;
    let row_order = args.row_order();
    let output_dir = args.output_dir.as_path();

    let mut slots: Vec<Option<output::FragmentLayout>> = Vec::new();
    slots.resize_with(decomposed.len(), || None);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(decomposed.len().max(1))
        .thread_name(|idx| format!("fracture_write_{idx}"))
        .build()?;

    pool.scope(|scope| {
        for (idx, (subs, slot)) in decomposed.iter().zip(slots.iter_mut()).enumerate() {
            let dialect = *dialect;
            scope.spawn(move |_| {
                let mut rng = rand::rng();
                match output::write_fragment(
                    output_dir, idx, subs, &dialect, has_header, row_order, &mut rng,
                ) {
                    Ok(layout) => *slot = Some(layout),
                    Err(err) => error!(%err, fragment = idx, "failed to write fragment"),
                }
            });
        }
    });

    let written = slots.iter().flatten().count();
    info!(fragments = written, "wrote fragment files");

    let mapping = output::MappingFile::new(original, &slots);
    let mapping_path = args.output_dir.join("mapping.json");
    let file = fs::File::create(&mapping_path)?;
    serde_json::to_writer_pretty(file, &mapping)?;
    info!(path = %mapping_path.display(), "wrote mapping file");

    Ok(())
}

/// Explicit dialect flags win; otherwise the dialect is inferred from the
/// input, falling back to plain comma/double-quote.
fn resolve_dialect(args: &Arguments, sample: &[u8]) -> DialectOptions {
    let mut dialect = match args.delimiter {
        Some(_) => DialectOptions::default(),
        None => {
            let inferred = DialectOptions::infer_from_sample(sample);
            if inferred.is_none() {
                warn!("could not infer csv dialect, assuming comma/double-quote");
            }
            inferred.unwrap_or_default()
        }
    };
    if let Some(delimiter) = args.delimiter {
        dialect.delimiter = delimiter as u8;
    }
    if let Some(quote) = args.quote {
        dialect.quote = quote as u8;
    }
    dialect.escape = args.escape.map(|c| c as u8);
    debug!(?dialect, "resolved csv dialect");
    dialect
}
