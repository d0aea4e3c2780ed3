use std::process;

fn main() {
    match parkade::app::run() {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(err) => {
            eprintln!("fatal: {err:#}");
            process::exit(1);
        }
    }
}
