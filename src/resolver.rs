use failure_derive::Fail;
use geo_types::MultiPolygon;

/// The reasons an area boundary cannot be turned into a polygon.
///
/// Those are expected on real OSM data (truncated extracts, broken
/// multipolygons), the collector skips the area when it gets one.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum BoundaryError {
    #[fail(display = "node {} is missing from the dataset", _0)]
    MissingNode(i64),
    #[fail(display = "a ring of {} nodes cannot enclose an area", _0)]
    TooFewNodes(usize),
    #[fail(display = "ring is not closed")]
    UnclosedRing,
    #[fail(display = "relation {} has no valid outer ring", _0)]
    InvalidRelation(i64),
    #[fail(display = "boundary is empty")]
    Empty,
}

/// Turns the boundary handle of an area entity into a geometry
pub trait GeometryResolver {
    type Boundary;

    fn resolve(&self, boundary: Self::Boundary) -> Result<MultiPolygon<f64>, BoundaryError>;
}

/// Resolver for areas whose geometry has already been built
#[derive(Debug, Default, Clone, Copy)]
pub struct Prebuilt;

impl GeometryResolver for Prebuilt {
    type Boundary = Result<MultiPolygon<f64>, BoundaryError>;

    fn resolve(&self, boundary: Self::Boundary) -> Result<MultiPolygon<f64>, BoundaryError> {
        boundary.and_then(|b| {
            if b.0.is_empty() {
                Err(BoundaryError::Empty)
            } else {
                Ok(b)
            }
        })
    }
}
