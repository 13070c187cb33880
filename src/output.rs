use crate::file_format::OutputFormat;
use crate::model::Postcodes;
use failure::{Error, ResultExt};
use flate2::write::GzEncoder;
use flate2::Compression;
use geo_types::MultiPoint;
use log::info;
use serde_derive::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize, Debug)]
struct PostcodeLocation<'a> {
    postcode: &'a str,
    lat: f64,
    lon: f64,
}

/// One `<postcode> <lat> <lon>` line per postcode, sorted by postcode
pub fn to_text(mut writer: impl Write, postcodes: &Postcodes) -> Result<(), Error> {
    for (postcode, pos) in postcodes {
        writeln!(writer, "{} {:09.6} {:09.6}", postcode, pos.y(), pos.x())?;
    }
    writer.flush()?;
    Ok(())
}

/// json stream, each line is a postcode as json
pub fn to_json_stream(mut writer: impl Write, postcodes: &Postcodes) -> Result<(), Error> {
    for (postcode, pos) in postcodes {
        let location = PostcodeLocation {
            postcode,
            lat: pos.y(),
            lon: pos.x(),
        };
        serde_json::to_writer(&mut writer, &location)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn write_plain(writer: impl Write, postcodes: &Postcodes, format: OutputFormat) -> Result<(), Error> {
    if format.is_json_stream() {
        to_json_stream(writer, postcodes)
    } else {
        to_text(writer, postcodes)
    }
}

pub fn write_postcodes(
    writer: impl Write,
    postcodes: &Postcodes,
    format: OutputFormat,
) -> Result<(), Error> {
    if format.is_compressed() {
        let mut e = GzEncoder::new(writer, Compression::default());
        write_plain(&mut e, postcodes, format)?;
        e.finish()?;
        Ok(())
    } else {
        write_plain(writer, postcodes, format)
    }
}

pub fn serialize_postcodes(
    postcodes: &Postcodes,
    output_file: &Path,
    format: OutputFormat,
) -> Result<(), Error> {
    info!("writing the output file {}", output_file.display());
    let file = File::create(output_file)
        .with_context(|_| format!("impossible to create {}", output_file.display()))?;
    write_postcodes(BufWriter::new(file), postcodes, format)
}

/// The geometry as a GeoJSON Geometry object
pub fn to_geojson(mut writer: impl Write, geometry: &MultiPoint<f64>) -> Result<(), Error> {
    use geojson::{GeoJson, Geometry, Value};

    let geojson = GeoJson::Geometry(Geometry::new(Value::from(geometry)));
    serde_json::to_writer(&mut writer, &geojson)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::read::GzDecoder;
    use geo_types::Point;
    use std::io::Read;

    fn postcodes() -> Postcodes {
        vec![
            ("9".to_string(), Point::new(5., 5.)),
            ("00-001".to_string(), Point::new(21., 52.1234567)),
            ("7".to_string(), Point::new(1., 0.)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn text_output_is_sorted_lat_lon() {
        let mut out = vec![];
        write_postcodes(&mut out, &postcodes(), OutputFormat::Text).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00-001 52.123457 21.000000\n\
             7 00.000000 01.000000\n\
             9 05.000000 05.000000\n"
        );
    }

    #[test]
    fn json_stream_output() {
        let mut out = vec![];
        write_postcodes(&mut out, &postcodes(), OutputFormat::JsonStream).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["postcode"], "00-001");
        assert_eq!(lines[2]["lat"], 5.0);
        assert_eq!(lines[1]["lon"], 1.0);
    }

    #[test]
    fn gz_text_output() {
        let mut out = vec![];
        write_postcodes(&mut out, &postcodes(), OutputFormat::TextGz).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(&out[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.starts_with("00-001 52.123457 21.000000\n"));
    }

    #[test]
    fn gz_json_stream_output() {
        let mut out = vec![];
        write_postcodes(&mut out, &postcodes(), OutputFormat::JsonStreamGz).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(&out[..])
            .read_to_string(&mut decoded)
            .unwrap();
        let first: serde_json::Value =
            serde_json::from_str(decoded.lines().next().unwrap()).unwrap();
        assert_eq!(first["postcode"], "00-001");
        assert_eq!(decoded.lines().count(), 3);
    }

    #[test]
    fn geojson_of_a_union() {
        let mut out = vec![];
        let mp = MultiPoint(vec![Point::new(0., 0.), Point::new(2., 0.)]);
        to_geojson(&mut out, &mp).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["type"], "MultiPoint");
        assert_eq!(v["coordinates"][1][0], 2.0);
    }
}
