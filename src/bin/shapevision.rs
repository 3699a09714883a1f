use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use shapevision::io::load_gray_png;
use shapevision::CC;

/// Contours & continua decomposition of a bilinearly interpolated
/// grayscale image.
#[derive(Debug, Parser)]
#[clap(name = "shapevision", version)]
struct Opts {
    /// Input grayscale PNG image
    image: std::path::PathBuf,

    /// Log the divide-and-conquer passes
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init().unwrap();

    let (im, w, h) = match load_gray_png(&opts.image) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Unable to load image {}: {}", opts.image.display(), e);
            std::process::exit(1);
        }
    };
    info!("image {}x{}", w, h);

    let cc = CC::new(&im, w, h);
    info!(
        "{} contour classes, {} continua ({} live), {} saddle points",
        cc.contour_classes(),
        cc.continua.len(),
        cc.live_continua(),
        cc.saddle_count()
    );
}
