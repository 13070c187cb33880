use failure::Error;
use log::{error, info, warn};
use osm_postcodes::output::{serialize_postcodes, to_geojson, write_postcodes};
use osm_postcodes::{
    build_postcodes, default_workers, file_format::OutputFormat, union_geometry, ExtractOptions,
    LogProgress,
};
use std::io::BufWriter;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Args {
    /// OSM PBF file.
    #[structopt(short = "i", long = "input", parse(from_os_str))]
    input: PathBuf,
    #[structopt(
        short = "o",
        long = "output",
        parse(from_os_str),
        help = r#"Output file name. Format will be deduced from the file extension.
Accepted extensions are '.txt', '.txt.gz', '.jsonl', '.jsonl.gz'
'txt' has one '<postcode> <lat> <lon>' line per postcode, 'jsonl' one json per postcode.
Without it, the postcodes are written as text on the standard output.
"#
    )]
    output: Option<PathBuf>,
    #[structopt(
        help = "Tag holding the postcode",
        long = "postcode-tag",
        default_value = "addr:postcode"
    )]
    postcode_tag: String,
    #[structopt(
        help = "Number of threads computing the postcodes positions (default: number of cores - 1)",
        long = "workers"
    )]
    workers: Option<usize>,
    #[structopt(help = "Do not display the stats", long = "no-stats")]
    no_stats: bool,
    #[structopt(
        help = "Write on the standard output the GeoJSON of all the locations of this postcode",
        long = "dump-union"
    )]
    dump_union: Option<String>,
}

fn postcodes(args: Args) -> Result<(), Error> {
    // fail before reading the whole pbf
    let format = OutputFormat::from_output(args.output.as_deref())?;

    let options = ExtractOptions {
        postcode_tag: args.postcode_tag,
        workers: args.workers.unwrap_or_else(default_workers),
    };
    let progress = LogProgress::default();
    let extraction = build_postcodes(&args.input, &options, &progress)?;

    match args.output {
        Some(ref output) => serialize_postcodes(&extraction.postcodes, output, format)?,
        None => {
            let stdout = std::io::stdout();
            write_postcodes(BufWriter::new(stdout.lock()), &extraction.postcodes, format)?;
        }
    }

    if let Some(ref postcode) = args.dump_union {
        match extraction.samples.get(postcode) {
            Some(samples) => {
                let union = union_geometry(postcode, samples)?;
                to_geojson(std::io::stdout().lock(), &union)?;
            }
            None => warn!("postcode {} not found in {}", postcode, extraction.osm_filename),
        }
    }

    if !args.no_stats {
        info!(
            "Statistics for {}:\n{}",
            extraction.osm_filename, extraction.stats
        );
    }
    Ok(())
}

fn init_logger() {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, log::LevelFilter::Info);
    if let Ok(s) = std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    }
    builder.init();
}

fn main() {
    init_logger();
    let args = Args::from_args();
    if let Err(e) = postcodes(args) {
        error!("osm-postcodes in error! {:?}", e);
        e.iter_chain().for_each(|c| {
            error!("{}", c);
            if let Some(b) = c.backtrace() {
                error!("  - {}", b);
            }
        });

        std::process::exit(1);
    }
}
