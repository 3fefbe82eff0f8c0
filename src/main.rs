use std::path::Path;

use anyhow::Result;
use titanic_eda::pipeline::{self, INPUT_FILE, INSIGHTS};

fn main() -> Result<()> {
    env_logger::init();

    let analysis = pipeline::run(Path::new(INPUT_FILE), Path::new("."))?;

    println!("First 5 rows of the dataset:");
    println!("{}", analysis.head_text);

    println!("\nDataset Info:");
    println!("{}", analysis.info_text);

    println!("\nStatistical Summary:");
    println!("{}", analysis.describe_text);

    println!("\nMissing Values:");
    for (name, count) in &analysis.missing {
        println!("{name}: {count}");
    }

    println!("\n--- Summary of Insights ---");
    for line in INSIGHTS {
        println!("{line}");
    }

    Ok(())
}
