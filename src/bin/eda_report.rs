use std::path::Path;

use anyhow::Result;
use titanic_eda::pipeline::{self, INPUT_FILE, REPORT_FILE};

fn main() -> Result<()> {
    env_logger::init();

    let analysis = pipeline::run(Path::new(INPUT_FILE), Path::new("."))?;
    let document = pipeline::build_report(&analysis);
    document.write_html(Path::new(REPORT_FILE))?;

    println!("Report saved as {REPORT_FILE}");
    Ok(())
}
