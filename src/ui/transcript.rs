use std::io::{self, Write};

use crate::core::message::{Message, Role};
use crate::core::trace::{Tone, TraceLine, TraceRecord};

const SEPARATOR: &str = "---";

pub fn render_message(message: &Message) -> Vec<String> {
    let prefix = match message.role {
        Role::User => "You",
        Role::Assistant => "Agent",
    };
    let mut lines = Vec::new();
    for (index, line) in message.content.lines().enumerate() {
        if index == 0 {
            lines.push(format!("{prefix}: {line}"));
        } else {
            lines.push(format!("{:width$}  {line}", "", width = prefix.len()));
        }
    }
    if lines.is_empty() {
        lines.push(format!("{prefix}:"));
    }
    lines
}

pub fn render_trace(records: &[TraceRecord]) -> Vec<String> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut lines = vec!["🔬 Agent Workflow Trace".to_string()];
    for record in records {
        lines.push(format!("  {}", record.heading()));
        if !record.description.is_empty() {
            lines.push(format!("    Description: {}", record.description));
        }
        for line in &record.lines {
            match line {
                TraceLine::Outcome { tone, text } => {
                    let marker = match tone {
                        Tone::Positive => "✅",
                        Tone::Cautionary => "⚠️ ",
                    };
                    lines.push(format!("    {marker} {text}"));
                }
                TraceLine::Excerpt { label, text } => {
                    lines.push(format!("    {label}: `{text}`"));
                }
                TraceLine::Details(json) => {
                    lines.extend(json.lines().map(|line| format!("    {line}")));
                }
            }
        }
        lines.push(format!("  {SEPARATOR}"));
    }
    lines
}

pub fn write_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

pub fn print_message(message: &Message) -> io::Result<()> {
    write_lines(&mut io::stdout().lock(), &render_message(message))
}

pub fn print_trace(records: &[TraceRecord]) -> io::Result<()> {
    write_lines(&mut io::stdout().lock(), &render_trace(records))
}

pub fn print_history(messages: &[Message]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for message in messages {
        write_lines(&mut out, &render_message(message))?;
        writeln!(out)?;
    }
    Ok(())
}
