use crate::model::{Postcodes, Samples};
use crate::progress::ProgressObserver;
use failure::Error;
use failure_derive::Fail;
use geo::Centroid;
use geo_types::{MultiPoint, Point};
use log::info;
use std::collections::HashSet;

/// Errors that should never happen if the samples come from a `PostcodeCollector`
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum ReduceError {
    #[fail(display = "postcode {} has no location", postcode)]
    NoSamples { postcode: String },
    #[fail(display = "postcode {} has a degenerate centroid {:?}", postcode, centroid)]
    DegenerateCentroid {
        postcode: String,
        centroid: Option<(f64, f64)>,
    },
}

/// Geometric union of points.
///
/// A set union: a location already in the union is not added twice,
/// so duplicates do not skew the centroid.
#[derive(Debug, Clone)]
pub struct PointUnion {
    points: Vec<Point<f64>>,
    seen: HashSet<(u64, u64)>,
}

// -0. and 0. are the same location
fn location_key(p: &Point<f64>) -> (u64, u64) {
    let norm = |v: f64| if v == 0. { 0f64 } else { v };
    (norm(p.x()).to_bits(), norm(p.y()).to_bits())
}

impl PointUnion {
    pub fn seed(point: Point<f64>) -> Self {
        let mut union = PointUnion {
            points: vec![],
            seen: HashSet::new(),
        };
        union.insert(point);
        union
    }

    fn insert(&mut self, point: Point<f64>) {
        if self.seen.insert(location_key(&point)) {
            self.points.push(point);
        }
    }

    pub fn union(mut self, point: Point<f64>) -> Self {
        self.insert(point);
        self
    }

    pub fn into_geometry(self) -> MultiPoint<f64> {
        MultiPoint(self.points)
    }
}

/// Union of all the locations of a postcode, folded in collection order
pub fn union_geometry(postcode: &str, samples: &[Point<f64>]) -> Result<MultiPoint<f64>, ReduceError> {
    let (first, rest) = samples.split_first().ok_or_else(|| ReduceError::NoSamples {
        postcode: postcode.to_string(),
    })?;
    let union = rest
        .iter()
        .fold(PointUnion::seed(*first), |union, p| union.union(*p));
    Ok(union.into_geometry())
}

/// The representative location of a postcode: the centroid of the union of its samples
pub fn reduce_postcode(postcode: &str, samples: &[Point<f64>]) -> Result<Point<f64>, ReduceError> {
    let union = union_geometry(postcode, samples)?;
    match union.centroid() {
        Some(c) if c.x().is_finite() && c.y().is_finite() => Ok(c),
        c => Err(ReduceError::DegenerateCentroid {
            postcode: postcode.to_string(),
            centroid: c.map(|c| c.x_y()),
        }),
    }
}

/// Number of reducer threads: all the cores but one, at least one
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Reduces every postcode in parallel on a dedicated thread pool
#[derive(Debug, Clone)]
pub struct Reducer {
    workers: usize,
}

impl Default for Reducer {
    fn default() -> Self {
        Reducer::new(default_workers())
    }
}

impl Reducer {
    pub fn new(workers: usize) -> Self {
        Reducer {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns only once all postcodes have been reduced.
    ///
    /// If any postcode cannot be reduced, the whole reduction fails
    /// with an error naming it.
    pub fn reduce(&self, samples: &Samples, progress: &dyn ProgressObserver) -> Result<Postcodes, Error> {
        use rayon::prelude::*;

        info!(
            "reducing {} postcodes with {} workers",
            samples.len(),
            self.workers
        );
        progress.reduction_started(samples.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("postcode-reducer-{}", i))
            .build()?;

        let postcodes = pool.install(|| {
            samples
                .par_iter()
                .map(|(postcode, points)| -> Result<_, ReduceError> {
                    let center = reduce_postcode(postcode, points)?;
                    progress.key_reduced();
                    Ok((postcode.clone(), center))
                })
                .collect::<Result<Postcodes, ReduceError>>()
        })?;

        info!("{} postcodes positioned", postcodes.len());
        Ok(postcodes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::progress::{LogProgress, NoProgress};

    fn samples(data: Vec<(&str, Vec<(f64, f64)>)>) -> Samples {
        data.into_iter()
            .map(|(k, pts)| (k.to_string(), pts.into_iter().map(Point::from).collect()))
            .collect()
    }

    #[test]
    fn single_point_is_kept_as_is() {
        let c = reduce_postcode("00-001", &[Point::new(21.0, 52.0)]).unwrap();
        assert_eq!(c, Point::new(21.0, 52.0));
    }

    #[test]
    fn duplicate_points_do_not_skew_the_centroid() {
        let c = reduce_postcode(
            "00-001",
            &[Point::new(21.0, 52.0), Point::new(21.0, 52.0)],
        )
        .unwrap();
        assert_eq!(c, Point::new(21.0, 52.0));

        // (0,0) is counted once
        let c = reduce_postcode(
            "7",
            &[Point::new(0., 0.), Point::new(-0., 0.), Point::new(3., 0.)],
        )
        .unwrap();
        assert_eq!(c, Point::new(1.5, 0.));
    }

    #[test]
    fn union_keeps_collection_order() {
        let u = union_geometry(
            "7",
            &[Point::new(2., 0.), Point::new(0., 0.), Point::new(2., 0.)],
        )
        .unwrap();
        assert_eq!(u, MultiPoint(vec![Point::new(2., 0.), Point::new(0., 0.)]));
    }

    #[test]
    fn no_samples_is_an_error() {
        assert_eq!(
            reduce_postcode("7", &[]),
            Err(ReduceError::NoSamples {
                postcode: "7".into()
            })
        );
    }

    #[test]
    fn nan_centroid_is_an_error() {
        let r = reduce_postcode("7", &[Point::new(std::f64::NAN, 1.)]);
        match r {
            Err(ReduceError::DegenerateCentroid { postcode, .. }) => assert_eq!(postcode, "7"),
            _ => panic!("a NaN centroid should be rejected, got {:?}", r),
        }
    }

    #[test]
    fn reduce_all_postcodes() {
        let s = samples(vec![
            ("7", vec![(0., 0.), (2., 0.)]),
            ("9", vec![(5., 5.)]),
        ]);
        let progress = LogProgress::default();
        let res = Reducer::new(2).reduce(&s, &progress).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res["7"], Point::new(1., 0.));
        assert_eq!(res["9"], Point::new(5., 5.));
        assert_eq!(progress.reduced(), 2);
    }

    #[test]
    fn one_bad_postcode_fails_the_reduction() {
        let mut s = samples(vec![("7", vec![(0., 0.)]), ("9", vec![(5., 5.)])]);
        s.insert("8".into(), vec![]);
        let err = Reducer::new(3).reduce(&s, &NoProgress).unwrap_err();
        assert!(err.to_string().contains("postcode 8"));
    }

    #[test]
    fn worker_count_is_at_least_one() {
        assert_eq!(Reducer::new(0).workers(), 1);
        assert!(default_workers() >= 1);
    }
}
