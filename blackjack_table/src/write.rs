use crate::{SimulationError, SimulationSummary};
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn format_summary(summary: &SimulationSummary) -> String {
    const WIDTH: usize = 80;
    let title = format!("{} rounds", summary.rounds_played);
    let header = format!("{:-^WIDTH$}\n", title);
    format!("{}{}{}\n", header, summary, "-".repeat(WIDTH))
}

/// A public function to take in `summary` and write it to `writer` in the chosen format.
pub fn write_summary(
    summary: &SimulationSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> Result<(), SimulationError> {
    match format {
        OutputFormat::Text => writer.write_all(format_summary(summary).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, summary)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::TableSimulator;

    fn summary() -> SimulationSummary {
        let config = SimulatorConfig::new().rounds(10).seed(9).build();
        TableSimulator::new(config).unwrap().run().unwrap()
    }

    #[test]
    fn text_has_a_header() {
        let mut out = Vec::new();
        write_summary(&summary(), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("-"));
        assert!(text.contains("10 rounds"));
        assert!(text.trim_end().ends_with(&"-".repeat(80)));
    }

    #[test]
    fn json_reads_back() {
        let summary = summary();
        let mut out = Vec::new();
        write_summary(&summary, OutputFormat::Json, &mut out).unwrap();
        let parsed: SimulationSummary = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, summary);
    }
}
