use flightsat::core_guided::DEFAULT_STRATIFICATION;
use flightsat::*;
use log::*;
use std::io::Read;
use std::time::Instant;

use structopt::*;
#[derive(StructOpt, Debug)]
#[structopt(about = "Finds the cheapest round trip visiting every city for its stay")]
struct Opt {
    /// Trip description; read from stdin when absent
    #[structopt(name = "FILE", parse(from_os_str))]
    file: Option<std::path::PathBuf>,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(long)]
    quiet: bool,

    /// Exactly-one encoding: bitwise, pairwise or sequential
    #[structopt(short, long, default_value = "bitwise")]
    encoding: CardEncoding,

    /// Soft constraints added to the assumptions per satisfiable round
    #[structopt(long, default_value = "10")]
    stratification: usize,

    /// Year the DD/MM flight dates fall in
    #[structopt(long, default_value = "2024")]
    year: i32,

    /// Stop after encoding
    #[structopt(long)]
    encode_only: bool,

    /// Also write the formula in WCNF format
    #[structopt(long, parse(from_os_str))]
    to_wcnf: Option<std::path::PathBuf>,
}

fn main() {
    let options = Opt::from_args();

    if let Err(e) = stderrlog::StdErrLog::new()
        .verbosity(options.verbose.into())
        .quiet(options.quiet)
        .module(module_path!())
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init()
    {
        eprintln!("could not set up logging: {}", e);
    }

    info!("Arguments {:#?}", options);

    if let Err(e) = run(&options) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(options: &Opt) -> Result<()> {
    let input = match options.file.as_ref() {
        Some(path) => {
            info!("Loading {:?}", path);
            std::fs::read_to_string(path)?
        }
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };
    info!("Loaded {} chars", input.len());

    print!("{}", report(&input, options)?);
    Ok(())
}

/// Everything the program prints on stdout for the given input.
fn report(input: &str, options: &Opt) -> Result<String> {
    use std::fmt::Write;

    let trip = parse_trip(input, options.year)?;
    let formula = encode(&trip, options.encoding)?;

    if let Some(path) = options.to_wcnf.as_ref() {
        let mut wcnf = String::new();
        formula.write(&mut wcnf).map_err(|_| Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other, "formula weights do not fit in a wcnf file")))?;
        std::fs::write(path, &wcnf)?;
        info!("Wrote wcnf file {:?}", path);
    }

    let mut out = String::new();
    if options.encode_only {
        writeln!(out, "vars {} hard {} soft {}", formula.num_vars(), formula.hard().len(), formula.soft().len()).unwrap();
        return Ok(out);
    }

    let mut oracle = CadicalOracle {
        stratification: if options.stratification > 0 { options.stratification } else { DEFAULT_STRATIFICATION },
    };
    let start = Instant::now();
    let outcome = oracle.solve(&formula)?;
    info!("Solved in {:.3}s", start.elapsed().as_secs_f32());

    match decode(&trip, &outcome) {
        Some(itinerary) => {
            if !verify_itinerary(&trip, &itinerary.flights) {
                warn!("Decoded itinerary breaks the trip rules");
            }
            writeln!(out, "{}", itinerary.cost).unwrap();
            out.push_str(&format_itinerary(&trip, &itinerary));
        }
        None => {
            info!("No trip satisfies every constraint.");
            writeln!(out, "infeasible").unwrap();
        }
    }
    Ok(out)
}
