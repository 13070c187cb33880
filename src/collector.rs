use crate::entity::{Entity, TagLookup, DEFAULT_POSTCODE_TAG};
use crate::model::{CollectStats, Collected, Samples};
use crate::progress::ProgressObserver;
use crate::resolver::GeometryResolver;
use geo::InteriorPoint;
use geo_types::Point;
use log::{debug, info};

/// Gathers, for each postcode, the locations of the entities tagged with it.
///
/// Points give their own position, areas give a point inside their
/// boundary. Areas whose boundary cannot be resolved are skipped.
pub struct PostcodeCollector<'p, R> {
    resolver: R,
    progress: &'p dyn ProgressObserver,
    postcode_tag: String,
    samples: Samples,
    stats: CollectStats,
}

impl<'p, R: GeometryResolver> PostcodeCollector<'p, R> {
    pub fn new(resolver: R, progress: &'p dyn ProgressObserver) -> Self {
        PostcodeCollector {
            resolver,
            progress,
            postcode_tag: DEFAULT_POSTCODE_TAG.to_string(),
            samples: Samples::new(),
            stats: CollectStats::default(),
        }
    }

    pub fn with_postcode_tag(mut self, postcode_tag: impl Into<String>) -> Self {
        self.postcode_tag = postcode_tag.into();
        self
    }

    pub fn visit<T: TagLookup>(&mut self, entity: Entity<T, R::Boundary>) {
        self.stats.entities += 1;
        self.progress.entity_visited();

        let postcode = entity.postcode(&self.postcode_tag).map(|p| p.to_string());
        if postcode.is_some() {
            self.stats.tagged += 1;
        }

        match entity {
            Entity::Point { coord, .. } => {
                self.stats.points += 1;
                if let Some(postcode) = postcode {
                    self.accumulate(postcode, coord);
                }
            }
            Entity::Area { boundary, .. } => {
                self.stats.areas += 1;
                if let Some(postcode) = postcode {
                    let point = self
                        .resolver
                        .resolve(boundary)
                        .map(|shape| shape.interior_point());
                    match point {
                        Ok(Some(point)) => self.accumulate(postcode, point),
                        Ok(None) => {
                            self.stats.boundary_failures += 1;
                            debug!("{}: area without any interior point, skipped", postcode);
                        }
                        Err(e) => {
                            self.stats.boundary_failures += 1;
                            debug!("{}: invalid area boundary, skipped: {}", postcode, e);
                        }
                    }
                }
            }
        }
    }

    fn accumulate(&mut self, postcode: String, point: Point<f64>) {
        self.stats.samples += 1;
        self.samples.entry(postcode).or_default().push(point);
    }

    /// Ends the collection, the samples cannot be changed afterward
    pub fn finish(self) -> Collected {
        let mut stats = self.stats;
        stats.postcodes = self.samples.len();
        info!(
            "{} entities read, {} distinct postcodes found",
            stats.entities, stats.postcodes
        );
        Collected {
            samples: self.samples,
            stats,
        }
    }
}

impl<'p, R, T> Extend<Entity<T, R::Boundary>> for PostcodeCollector<'p, R>
where
    R: GeometryResolver,
    T: TagLookup,
{
    fn extend<I: IntoIterator<Item = Entity<T, R::Boundary>>>(&mut self, entities: I) {
        for e in entities {
            self.visit(e);
        }
    }
}

/// Reads the whole entity stream and returns the collected samples
pub fn collect_postcodes<R, T, I>(
    entities: I,
    resolver: R,
    postcode_tag: &str,
    progress: &dyn ProgressObserver,
) -> Collected
where
    R: GeometryResolver,
    T: TagLookup,
    I: IntoIterator<Item = Entity<T, R::Boundary>>,
{
    let mut collector = PostcodeCollector::new(resolver, progress).with_postcode_tag(postcode_tag);
    collector.extend(entities);
    collector.finish()
}
