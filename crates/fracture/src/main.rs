use clap::Parser;
use fracture::args::Arguments;

fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level(), args.log_format());

    if let Err(err) = fracture::pipeline::run(&args) {
        println!("ERROR: {err}");
        std::process::exit(1);
    }
}
