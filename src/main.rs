use clap::{Arg, Command};
use std::path::PathBuf;

use geojsonl_filter::{file_extent, filter_file, FilterError, Predicate};

fn main() {
    let matches = Command::new("GeoJSONL Filter")
        .version("1.0")
        .about("Filters newline-delimited GeoJSON files by text marker or bounding box")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .num_args(1)
                .required(true)
                .help("Input GeoJSONL file to filter"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .required(true)
                .help("Output GeoJSONL file (overwritten)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .num_args(1)
                .required(true)
                .value_parser(["marker", "bbox"])
                .help("Filter mode: marker (substring test) or bbox (coordinate test)"),
        )
        .arg(
            Arg::new("markers")
                .long("markers")
                .num_args(1..)
                .help("Marker substrings to match (marker mode, defaults to LineString/MultiPolygon type tags)"),
        )
        .arg(
            Arg::new("bbox")
                .long("bbox")
                .num_args(4)
                .allow_hyphen_values(true)
                .value_names(["TLLON", "TLLAT", "BRLON", "BRLAT"])
                .help("Bounding box corners: top-left lon lat, bottom-right lon lat (bbox mode)"),
        )
        .arg(
            Arg::new("skip-malformed")
                .long("skip-malformed")
                .action(clap::ArgAction::SetTrue)
                .help("Drop records the bbox predicate cannot parse instead of aborting"),
        )
        .arg(
            Arg::new("extent")
                .long("extent")
                .action(clap::ArgAction::SetTrue)
                .help("Report the lon/lat extent of the output file after filtering"),
        )
        .get_matches();

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());

    // Validate that the input file exists
    if !input.exists() {
        eprintln!("Error: File not found: {}", input.display());
        std::process::exit(1);
    }

    let predicate = match matches.get_one::<String>("mode").unwrap().as_str() {
        "marker" => match matches.get_many::<String>("markers") {
            Some(markers) => Predicate::Marker {
                markers: markers.cloned().collect(),
            },
            None => Predicate::geometry_markers(),
        },
        "bbox" => {
            let corners: Vec<f64> = match matches.get_many::<String>("bbox") {
                Some(values) => values
                    .map(|v| v.parse::<f64>().expect("Invalid bounding box coordinate"))
                    .collect(),
                None => {
                    eprintln!("Error: bbox mode requires --bbox TLLON TLLAT BRLON BRLAT");
                    std::process::exit(1);
                }
            };
            Predicate::bbox([corners[0], corners[1]], [corners[2], corners[3]])
        }
        _ => unreachable!(),
    };

    let skip_malformed = matches.get_flag("skip-malformed");

    match filter_file(&input, &output, &predicate, skip_malformed) {
        Ok(summary) => {
            println!(
                "Filtering completed successfully: kept {} of {} lines",
                summary.lines_kept, summary.lines_read
            );
        }
        Err(e) => {
            eprintln!("Error filtering file: {}", e);
            if let FilterError::Parse { .. } = e {
                eprintln!("Use --skip-malformed to drop records that fail to parse.");
            }
            std::process::exit(1);
        }
    }

    if matches.get_flag("extent") {
        match file_extent(&output) {
            Ok(Some(rect)) => {
                println!(
                    "Output extent: ({:.6}, {:.6}) to ({:.6}, {:.6})",
                    rect.min().x,
                    rect.min().y,
                    rect.max().x,
                    rect.max().y
                );
            }
            Ok(None) => println!("Output contains no supported geometries"),
            Err(e) => {
                eprintln!("Error calculating extent: {}", e);
                std::process::exit(1);
            }
        }
    }
}
