use geo_types::Point;
use osmpbfreader::objects::Tags;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_POSTCODE_TAG: &str = "addr:postcode";

/// Read access to the tags of a map entity
pub trait TagLookup {
    fn tag(&self, key: &str) -> Option<&str>;
}

impl TagLookup for Tags {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|val| &val[..])
    }
}

impl TagLookup for BTreeMap<String, String> {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|val| &val[..])
    }
}

impl TagLookup for HashMap<String, String> {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|val| &val[..])
    }
}

impl<'a, T: TagLookup + ?Sized> TagLookup for &'a T {
    fn tag(&self, key: &str) -> Option<&str> {
        (**self).tag(key)
    }
}

/// A map entity, as seen by the postcode collector.
///
/// A point carries its position (x is the longitude, y the latitude).
/// An area carries an opaque boundary handle, only a `GeometryResolver`
/// knows how to turn it into a polygon.
#[derive(Debug, Clone)]
pub enum Entity<T, B> {
    Point { tags: T, coord: Point<f64> },
    Area { tags: T, boundary: B },
}

impl<T: TagLookup, B> Entity<T, B> {
    pub fn tags(&self) -> &T {
        match self {
            Entity::Point { tags, .. } | Entity::Area { tags, .. } => tags,
        }
    }

    /// the postcode of the entity, empty values are ignored
    pub fn postcode(&self, postcode_tag: &str) -> Option<&str> {
        self.tags().tag(postcode_tag).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tags(kv: &[(&str, &str)]) -> BTreeMap<String, String> {
        kv.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn postcode_of_point() {
        let e: Entity<_, ()> = Entity::Point {
            tags: tags(&[("addr:postcode", "00-001"), ("name", "bob")]),
            coord: Point::new(21., 52.),
        };
        assert_eq!(e.postcode(DEFAULT_POSTCODE_TAG), Some("00-001"));
        assert_eq!(e.postcode("postal_code"), None);
    }

    #[test]
    fn empty_postcode_is_ignored() {
        let e = Entity::Area {
            tags: tags(&[("addr:postcode", "")]),
            boundary: (),
        };
        assert_eq!(e.postcode(DEFAULT_POSTCODE_TAG), None);
    }

    #[test]
    fn osm_tags_lookup() {
        let mut t = Tags::new();
        t.insert("addr:postcode".into(), "75020".into());
        assert_eq!(t.tag("addr:postcode"), Some("75020"));
        assert_eq!((&t).tag("name"), None);
    }
}
