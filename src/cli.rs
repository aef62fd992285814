//! Command-line argument parsing for workclock

use std::collections::HashMap;

use crate::server::parse_calculation_params;
use crate::service::CalculationRequest;

/// Parse command line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub validate: bool,
    pub help: bool,
    /// Run one calculation and exit instead of serving
    pub calc: bool,
    pub days: Option<String>,
    pub hours: Option<String>,
    pub date: Option<String>,
}

impl Args {
    /// Same validation rules as the HTTP query parameters
    pub fn calculation_request(&self) -> Result<CalculationRequest, String> {
        let mut params = HashMap::new();
        for (key, value) in [("days", &self.days), ("hours", &self.hours), ("date", &self.date)] {
            if let Some(value) = value {
                params.insert(key.to_string(), value.clone());
            }
        }
        parse_calculation_params(&params)
    }
}

pub fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args)
}

/// Testable version: parse from an explicit argv (first element is the program name)
pub fn parse_args_from(args: &[String]) -> Args {
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--validate" => result.validate = true,
            "--help" | "-h" => result.help = true,
            "--calc" => result.calc = true,
            flag @ ("--days" | "--hours" | "--date") => {
                if i + 1 < args.len() {
                    i += 1;
                    let value = Some(args[i].clone());
                    match flag {
                        "--days" => result.days = value,
                        "--hours" => result.hours = value,
                        _ => result.date = value,
                    }
                }
                // Giving a value implies a one-shot calculation
                result.calc = true;
            }
            _ => {}
        }
        i += 1;
    }

    result
}

pub fn print_help() {
    println!("workclock - business days and hours calculator\n");
    println!("USAGE:");
    println!("    workclock [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --validate              Validate configuration and exit");
    println!("    --calc                  Run one calculation, print JSON and exit");
    println!("    --days N                Working days to add (implies --calc)");
    println!("    --hours N               Working hours to add (implies --calc)");
    println!("    --date ISO              UTC start, e.g. 2025-04-10T15:00:00.000Z (default: now)");
    println!("    --help, -h              Show this help message\n");
    println!("Without --calc an HTTP server is started on $PORT (default 3000).\n");
    println!("ENVIRONMENT:");
    println!("    PORT, BUSINESS_TIMEZONE, HOLIDAYS_URL, HOLIDAYS_FILE,");
    println!("    HOLIDAY_FETCH_TIMEOUT_SECS, HOLIDAY_REFRESH_SECS,");
    println!("    WORK_START_HOUR, LUNCH_START_HOUR, LUNCH_END_HOUR, WORK_END_HOUR");
}
