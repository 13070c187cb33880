// Adapts the objects read by osmpbfreader to the collector's entities

use crate::entity::{Entity, TagLookup};
use crate::resolver::{BoundaryError, GeometryResolver};
use failure::{Error, ResultExt};
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};
use log::info;
use osm_boundaries_utils::build_boundary;
use osmpbfreader::objects::{OsmId, OsmObj, Relation, Tags, Way};
use osmpbfreader::OsmPbfReader;
use std::collections::BTreeMap;
use std::io::{Read, Seek};

/// The boundary of an OSM area, resolved against the objects it was read with
#[derive(Debug, Clone, Copy)]
pub enum OsmArea<'a> {
    Way(&'a Way),
    Relation(&'a Relation),
}

pub type OsmEntity<'a> = Entity<&'a Tags, OsmArea<'a>>;

fn is_closed(way: &Way) -> bool {
    way.nodes.len() > 1 && way.nodes.first() == way.nodes.last()
}

fn is_area_way(way: &Way) -> bool {
    is_closed(way) && way.tags.tag("area") != Some("no")
}

fn is_area_relation(rel: &Relation) -> bool {
    match rel.tags.tag("type") {
        Some("multipolygon") | Some("boundary") => true,
        _ => false,
    }
}

/// Converts an osm object into an entity.
/// Only nodes and areas (closed ways, multipolygons and boundaries) are entities.
pub fn to_entity(obj: &OsmObj) -> Option<OsmEntity<'_>> {
    match *obj {
        OsmObj::Node(ref node) => Some(Entity::Point {
            tags: &node.tags,
            coord: Point::new(node.lon(), node.lat()),
        }),
        OsmObj::Way(ref way) if is_area_way(way) => Some(Entity::Area {
            tags: &way.tags,
            boundary: OsmArea::Way(way),
        }),
        OsmObj::Relation(ref rel) if is_area_relation(rel) => Some(Entity::Area {
            tags: &rel.tags,
            boundary: OsmArea::Relation(rel),
        }),
        _ => None,
    }
}

pub fn entities(objects: &BTreeMap<OsmId, OsmObj>) -> impl Iterator<Item = OsmEntity<'_>> {
    objects.values().filter_map(to_entity)
}

/// Is the object an entity carrying a postcode
pub fn has_postcode(obj: &OsmObj, postcode_tag: &str) -> bool {
    to_entity(obj)
        .and_then(|e| e.postcode(postcode_tag).map(|_| ()))
        .is_some()
}

/// Reads the objects with a postcode, and the objects needed to build their geometries
pub fn read_postcode_objects<R: Read + Seek>(
    pbf: &mut OsmPbfReader<R>,
    postcode_tag: &str,
) -> Result<BTreeMap<OsmId, OsmObj>, Error> {
    info!("reading pbf...");
    let objects = pbf
        .get_objs_and_deps(|o| has_postcode(o, postcode_tag))
        .context("invalid osm file")?;
    info!("reading pbf done, {} objects read", objects.len());
    Ok(objects)
}

/// Builds the geometry of an area from the nodes and ways read along with it
#[derive(Clone, Copy)]
pub struct OsmResolver<'a> {
    objects: &'a BTreeMap<OsmId, OsmObj>,
}

impl<'a> OsmResolver<'a> {
    pub fn new(objects: &'a BTreeMap<OsmId, OsmObj>) -> Self {
        OsmResolver { objects }
    }

    fn way_polygon(&self, way: &Way) -> Result<MultiPolygon<f64>, BoundaryError> {
        let coords = way
            .nodes
            .iter()
            .map(|id| {
                self.objects
                    .get(&OsmId::Node(*id))
                    .and_then(|o| o.node())
                    .map(|n| Coord {
                        x: n.lon(),
                        y: n.lat(),
                    })
                    .ok_or(BoundaryError::MissingNode(id.0))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if coords.first() != coords.last() {
            return Err(BoundaryError::UnclosedRing);
        }
        // a closed ring needs at least 3 distinct positions
        if coords.len() < 4 {
            return Err(BoundaryError::TooFewNodes(coords.len()));
        }
        Ok(MultiPolygon(vec![Polygon::new(LineString(coords), vec![])]))
    }

    fn relation_polygon(&self, rel: &Relation) -> Result<MultiPolygon<f64>, BoundaryError> {
        build_boundary(rel, self.objects)
            .filter(|b| !b.0.is_empty())
            .ok_or(BoundaryError::InvalidRelation(rel.id.0))
    }
}

impl<'a> GeometryResolver for OsmResolver<'a> {
    type Boundary = OsmArea<'a>;

    fn resolve(&self, boundary: OsmArea<'a>) -> Result<MultiPolygon<f64>, BoundaryError> {
        match boundary {
            OsmArea::Way(way) => self.way_polygon(way),
            OsmArea::Relation(rel) => self.relation_polygon(rel),
        }
    }
}
