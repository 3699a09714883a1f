use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use shapevision::CC;

/// Build a contours-&-continua decomposition from literal sample values.
#[derive(Debug, Parser)]
#[clap(name = "testrect", version, allow_negative_numbers = true)]
struct Opts {
    /// Image width; defaults to a two-row layout of the given samples
    #[clap(short = 'w', long)]
    width: Option<usize>,

    /// Sample values, row-major
    #[clap(required = true)]
    values: Vec<f32>,
}

fn main() {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    SimpleLogger::new().with_level(LevelFilter::Debug).init().unwrap();

    let n = opts.values.len();
    let w = opts.width.unwrap_or((n + 1) / 2).max(1);
    let h = if opts.width.is_some() {
        (n + w - 1) / w
    } else {
        2
    };
    let mut im = vec![0.0f32; w * h];
    im[..n.min(w * h)].copy_from_slice(&opts.values[..n.min(w * h)]);

    println!("Image dimension: {}x{}", w, h);
    for row in im.chunks(w) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", line.join(" "));
    }

    let cc = CC::new(&im, w, h);
    info!(
        "{} contour classes, {} continua ({} live), {} saddle points",
        cc.contour_classes(),
        cc.continua.len(),
        cc.live_continua(),
        cc.saddle_count()
    );
}
