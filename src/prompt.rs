use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

use crate::models::TickerSelection;
use crate::utils::{parse_trade_date, InputError};

/// Interactive prompts for the ticker selection and the trading date
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, lines: &[&str]) -> io::Result<String> {
        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }

    /// Ask for mode 0 (all tickers) or 1 (explicit list), then the list if needed
    pub fn ticker_selection(&mut self) -> anyhow::Result<TickerSelection> {
        let option = self.ask(&[
            "Choose Option for Tickers",
            "Press 0 for Select all Tickers OR Press 1 for Select Target Tickers",
        ])?;

        match option.as_str() {
            "0" => Ok(TickerSelection::All),
            "1" => {
                let line = self.ask(&["Enter Ticker Names with Space Separated"])?;
                Ok(TickerSelection::Explicit(parse_ticker_list(&line)?))
            }
            other => Err(InputError::InvalidOption(other.to_string()).into()),
        }
    }

    /// Ask for a `YYYY-MM-DD` date
    pub fn trade_date(&mut self, current_year: i32) -> anyhow::Result<NaiveDate> {
        let answer = self.ask(&["Enter date in year-month-date(YYYY-MM-DD) format"])?;
        Ok(parse_trade_date(&answer, current_year)?)
    }
}

/// Split a space-separated list of symbols, upper-casing each
pub fn parse_ticker_list(line: &str) -> Result<Vec<String>, InputError> {
    let tickers: Vec<String> = line.split_whitespace().map(|t| t.to_uppercase()).collect();
    if tickers.is_empty() {
        return Err(InputError::NoTickers);
    }
    Ok(tickers)
}
