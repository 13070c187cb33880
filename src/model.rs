use geo_types::Point;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// All the locations seen for each postcode, in the order they were read
pub type Samples = HashMap<String, Vec<Point<f64>>>;

/// The representative location of each postcode (x: lon, y: lat)
pub type Postcodes = BTreeMap<String, Point<f64>>;

/// Result of the collection phase, frozen
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub samples: Samples,
    pub stats: CollectStats,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CollectStats {
    pub entities: u64,
    pub points: u64,
    pub areas: u64,
    pub tagged: u64,
    pub samples: u64,
    pub boundary_failures: u64,
    pub postcodes: usize,
}

impl fmt::Display for CollectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entities read: {}", self.entities)?;
        writeln!(f, "    {} points, {} areas", self.points, self.areas)?;
        writeln!(f, "    {} with a postcode", self.tagged)?;
        writeln!(
            f,
            "Locations kept: {} ({} areas with an invalid boundary)",
            self.samples, self.boundary_failures
        )?;
        write!(f, "Distinct postcodes: {}", self.postcodes)
    }
}

/// Everything a run of the pipeline produces
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub osm_filename: String,
    pub samples: Samples,
    pub postcodes: Postcodes,
    pub stats: CollectStats,
}
