use crate::error::{TpResult, TransportError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub solver: SolverParams,
    #[command(flatten)]
    pub input: InputParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SolverParams {
    /// Worker threads for loop evaluation (defaults to rayon's global pool)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Stop after this many pivots even if not converged
    #[arg(long)]
    pub max_pivots: Option<usize>,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParams {
    /// Field separator of the problem and solution files
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

impl Default for InputParams {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl InputParams {
    pub fn delimiter_byte(&self) -> TpResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(TransportError::Config(format!(
                "Delimiter '{}' must be a single ASCII character",
                self.delimiter
            )))
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TpResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies onto `self` only the values the user typed on the command line,
    /// so a config file supplies everything else.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(solver, threads);
        update_if_present!(solver, max_pivots);
        update_if_present!(input, delimiter);
    }
}
