use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::portfolio::{Portfolio, Record, parse_duration, validate_score};
use crate::taxonomy::Taxonomy;

/// Asks for importance, satisfaction and time of every catalog metric, in
/// catalog order. Rejected scores are asked again; time never fails.
pub fn collect_portfolio<R: BufRead, W: Write>(
    taxonomy: &Taxonomy,
    input: &mut R,
    output: &mut W,
) -> Result<Portfolio> {
    let mut records = Vec::with_capacity(taxonomy.metrics().len());
    let mut current_category: Option<&str> = None;

    for metric in taxonomy.metrics() {
        if current_category != Some(metric.category.as_str()) {
            current_category = Some(metric.category.as_str());
            writeln!(output, "\nStrategic life area: {}\n", metric.category)?;
        }

        let importance = prompt_score(
            input,
            output,
            &format!("Enter the importance of {} (0-10): ", metric.name),
        )?;
        let satisfaction = prompt_score(
            input,
            output,
            &format!("Enter your satisfaction with {} (0-10): ", metric.name),
        )?;
        let time = prompt_line(
            input,
            output,
            &format!(
                "Enter the time invested in {} (e.g. '2h', '30m' or '1h30m'): ",
                metric.name
            ),
        )?;
        let minutes = parse_duration(&time);
        debug!(metric = %metric.name, importance, satisfaction, minutes, "collected entry");

        records.push(Record::new(metric.name.clone(), importance, satisfaction, minutes));
    }

    Ok(Portfolio::from_records(taxonomy, records)?)
}

fn prompt_score<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<f32> {
    loop {
        let answer = prompt_line(input, output, prompt)?;
        match validate_score(&answer) {
            Ok(value) => return Ok(value),
            Err(error) => writeln!(output, "  {error}, please enter a value from 0 to 10")?,
        }
    }
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read answer")?;
    if read == 0 {
        return Err(anyhow!("input ended before the portfolio was complete"));
    }
    Ok(line.trim().to_owned())
}
