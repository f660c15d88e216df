use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{ExportFormat, OptionFilter, YearOfStudy};

/// modsurvey - module selection survey and response exporter
#[derive(Parser)]
#[command(name = "modsurvey")]
#[command(about = "Collect module-selection survey responses and export them as CSV or Excel")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use this JSON file as the response store
    #[arg(long, global = true, conflicts_with = "api_url")]
    pub store_file: Option<PathBuf>,

    /// Use the survey REST API at this base URL as the response store
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the survey interactively (default)
    Survey,
    /// Check a submission file without storing it
    Validate {
        /// Submission JSON (form or API shape)
        form: PathBuf,
    },
    /// Check and store a submission file
    Submit {
        /// Submission JSON (form or API shape)
        form: PathBuf,
    },
    /// List stored responses
    List {
        /// all, 1, 2, 3 or "Option N"
        #[arg(short, long, default_value = "all")]
        option: OptionFilter,
        /// Only this year of study (2, 3, 4 or "Year N")
        #[arg(short, long, value_parser = parse_year)]
        year: Option<YearOfStudy>,
        /// Case-insensitive match on email or index number
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one response in full
    Show {
        /// Response id
        id: u64,
    },
    /// Response counts per option
    Stats,
    /// Export responses to a file
    Export {
        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// all, 1, 2, 3 or "Option N"
        #[arg(short, long, default_value = "all")]
        option: OptionFilter,
        /// Output directory (overrides the config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// File name prefix (overrides the config)
        #[arg(long)]
        base_name: Option<String>,
    },
    /// Print the module and software catalog
    Catalog,
}

/// Accept `2`, `year2`, `Year 2`, `year-2`
fn parse_year(raw: &str) -> Result<YearOfStudy, String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let rest: String = raw
        .chars()
        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace() && *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase();

    if !rest.is_empty() && rest != "year" {
        return Err(format!("Invalid year '{}'. Valid values: 2, 3, 4", raw));
    }
    match digits.as_str() {
        "2" => Ok(YearOfStudy::Year2),
        "3" => Ok(YearOfStudy::Year3),
        "4" => Ok(YearOfStudy::Year4),
        _ => Err(format!("Invalid year '{}'. Valid values: 2, 3, 4", raw)),
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
