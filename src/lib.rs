pub mod collector;
pub mod entity;
pub mod file_format;
pub mod model;
pub mod osm;
pub mod output;
pub mod progress;
pub mod reducer;
pub mod resolver;

pub use collector::{collect_postcodes, PostcodeCollector};
pub use entity::{Entity, TagLookup, DEFAULT_POSTCODE_TAG};
pub use model::{CollectStats, Collected, Extraction, Postcodes, Samples};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use reducer::{default_workers, reduce_postcode, union_geometry, ReduceError, Reducer};
pub use resolver::{BoundaryError, GeometryResolver, Prebuilt};

use failure::{Error, ResultExt};
use osmpbfreader::objects::{OsmId, OsmObj};
use osmpbfreader::OsmPbfReader;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Settings of an extraction
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// tag holding the postcode of an entity
    pub postcode_tag: String,
    /// number of threads reducing the postcodes
    pub workers: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            postcode_tag: DEFAULT_POSTCODE_TAG.to_string(),
            workers: default_workers(),
        }
    }
}

/// Collects the postcodes of objects already read from a pbf
pub fn collect_from_objects(
    objects: &BTreeMap<OsmId, OsmObj>,
    postcode_tag: &str,
    progress: &dyn ProgressObserver,
) -> Collected {
    collect_postcodes(
        osm::entities(objects),
        osm::OsmResolver::new(objects),
        postcode_tag,
        progress,
    )
}

/// Collects then reduces the postcodes of the objects
pub fn build_from_objects(
    objects: &BTreeMap<OsmId, OsmObj>,
    options: &ExtractOptions,
    progress: &dyn ProgressObserver,
) -> Result<(Collected, Postcodes), Error> {
    let collected = collect_from_objects(objects, &options.postcode_tag, progress);
    let postcodes = Reducer::new(options.workers).reduce(&collected.samples, progress)?;
    Ok((collected, postcodes))
}

pub fn build_postcodes(
    pbf_path: impl AsRef<Path>,
    options: &ExtractOptions,
    progress: &dyn ProgressObserver,
) -> Result<Extraction, Error> {
    let path = pbf_path.as_ref();
    let file = File::open(path).context("no pbf file")?;
    let mut parsed_pbf = OsmPbfReader::new(file);

    let objects = osm::read_postcode_objects(&mut parsed_pbf, &options.postcode_tag)?;
    let (collected, postcodes) = build_from_objects(&objects, options, progress)?;

    Ok(Extraction {
        osm_filename: path
            .file_name()
            .and_then(|f| f.to_str())
            .map(|f| f.to_string())
            .unwrap_or_else(|| "invalid file name".into()),
        samples: collected.samples,
        postcodes,
        stats: collected.stats,
    })
}
