use crate::processor::{Timeline, TimelineRecord, TimelineStats};

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON array, one object per record.
    Json,
    /// One SRT cue per record.
    Srt,
}

pub fn serialise_to_path<P: AsRef<Path>>(timeline: &Timeline, format: Format, output: P) -> Result<()> {
    let output = output.as_ref();
    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create file: '{}'", output.display()))?;
    serialise(timeline, format, file)
}

pub fn serialise<W: Write>(timeline: &Timeline, format: Format, dst: W) -> Result<()> {
    let mut writer = BufWriter::new(dst);
    let written = match format {
        Format::Json => write_json(&mut writer, timeline),
        Format::Srt => write_records(&mut writer, timeline),
    };
    written.context("Failed to write timeline.")?;
    writer.flush().context("Failed to write timeline.")?;
    Ok(())
}

fn write_json<W: Write>(buf: &mut W, timeline: &Timeline) -> Result<()> {
    serde_json::to_writer_pretty(&mut *buf, timeline)?;
    writeln!(buf)?;
    Ok(())
}

fn write_records<W: Write>(buf: &mut W, timeline: &Timeline) -> Result<()> {
    for (seqnum, record) in timeline.iter().enumerate() {
        write_record(buf, seqnum + 1, record)?;
    }
    Ok(())
}

fn write_record<W: Write>(buf: &mut W, seqnum: usize, record: &TimelineRecord) -> Result<()> {
    writeln!(buf, "{}", seqnum)?;
    writeln!(buf, "{}", record.range)?;
    for line in record.text.lines() {
        writeln!(buf, "{}", line)?;
    }
    writeln!(buf)?;
    Ok(())
}

/// Human readable listing of the first `max_items` records.
pub fn write_preview<W: Write>(buf: &mut W, timeline: &Timeline, max_items: usize) -> Result<()> {
    writeln!(buf, "Timeline preview (first {} of {} records):", max_items.min(timeline.len()), timeline.len())?;
    for (i, record) in timeline.iter().take(max_items).enumerate() {
        writeln!(buf)?;
        writeln!(
            buf,
            "#{} entry {} split {}: {} ({:.1}s)",
            i + 1,
            record.entry_index,
            record.split_index,
            record.range,
            record.range.duration().as_secs_f64()
        )?;
        writeln!(buf, "  text:     {}", record.text.replace('\n', " "))?;
        writeln!(buf, "  keywords: {}", record.keywords.as_slice().join(", "))?;
        writeln!(buf, "  queries:  {}", record.queries.candidates().join(" | "))?;
    }
    if timeline.len() > max_items {
        writeln!(buf, "\n... and {} more records", timeline.len() - max_items)?;
    }
    Ok(())
}

pub fn write_stats<W: Write>(buf: &mut W, stats: &TimelineStats) -> Result<()> {
    writeln!(buf, "Statistics:")?;
    writeln!(buf, "  Subtitle entries:     {}", stats.entries)?;
    writeln!(buf, "  Timeline records:     {}", stats.records)?;
    writeln!(buf, "  Splits per entry:     {:.1}", stats.splits_per_entry())?;
    writeln!(buf, "  Covered duration:     {:.1}s", stats.total_duration.as_secs_f64())?;
    writeln!(buf, "  Average split length: {:.1}s", stats.average_duration().as_secs_f64())?;
    writeln!(buf, "  Keywords:             {} ({:.1} per record)", stats.total_keywords, stats.keywords_per_record())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::processor::Assembler;
    use crate::subtitle::{SubtitleEntry, Timestamp};

    fn timeline() -> Timeline {
        let config = PipelineConfig::default();
        let entries = vec![SubtitleEntry::new(
            1,
            Timestamp::from_millis(0),
            Timestamp::from_millis(6_000),
            "I like to eat an apple",
        )];
        Assembler::new(&config).unwrap().assemble(&entries).unwrap()
    }

    fn render(format: Format) -> String {
        let mut buf = Vec::new();
        serialise(&timeline(), format, &mut buf).expect("Failed to write to buffer");
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_records_carry_times_and_queries() {
        let value: serde_json::Value = serde_json::from_str(&render(Format::Json)).unwrap();
        let records = value.as_array().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["start"], "00:00:03,000");
        assert_eq!(records[1]["end"], "00:00:06,000");
        assert_eq!(records[1]["entry"], 1);
        assert_eq!(records[1]["split"], 1);
        assert_eq!(records[1]["text"], "eat an apple");
        assert_eq!(records[1]["keywords"], serde_json::json!(["eat", "apple"]));
        assert_eq!(records[1]["queries"], serde_json::json!(["eat apple", "eat", "apple"]));
    }

    #[test]
    fn srt_output_numbers_each_split() {
        assert_eq!(
            render(Format::Srt),
            "1\n00:00:00,000 --> 00:00:03,000\nI like to\n\n\
             2\n00:00:03,000 --> 00:00:06,000\neat an apple\n\n"
        );
    }

    #[test]
    fn preview_and_stats_are_readable() {
        let timeline = timeline();
        let mut buf = Vec::new();
        write_preview(&mut buf, &timeline, 1).unwrap();
        write_stats(&mut buf, &timeline.stats()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("first 1 of 2 records"));
        assert!(text.contains("queries:  like"));
        assert!(text.contains("... and 1 more records"));
        assert!(text.contains("Timeline records:     2"));
    }
}
