use std::process::exit;

fn main() {
    if let Err(e) = rmc_drv::run(std::env::args().skip(1)) {
        eprintln!("{e}");
        exit(e.exit_code());
    }
}
