use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::IndexId;

/// Marker terminating a chart section: the page embeds JSON-LD right after
/// the chart body.
const SECTION_END_MARKER: &str = "{\"@context\"";

static MODELS_COUNT_INLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s+of\s+\d+\s+models").expect("invalid chart marker regex"));

/// Strategy for finding one index's chart lines within the page text.
/// Strategies are tried in a fixed fallback order; the first one whose
/// section yields entries wins.
pub trait SectionLocator: Send + Sync {
    fn name(&self) -> &'static str;
    fn locate<'a>(&self, lines: &[&'a str], index: IndexId) -> Option<Vec<&'a str>>;
}

pub fn default_locators() -> Vec<Box<dyn SectionLocator>> {
    vec![Box::new(HeadingLocator), Box::new(ChartMarkerLocator)]
}

/// Primary strategy: find the section by its heading text. The
/// Intelligence index lives in the highlights block between the
/// `INTELLIGENCE` and `SPEED`/`PRICE` headings; Coding and Agentic sit
/// under their full chart titles.
pub struct HeadingLocator;

impl SectionLocator for HeadingLocator {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn locate<'a>(&self, lines: &[&'a str], index: IndexId) -> Option<Vec<&'a str>> {
        match index {
            IndexId::Intelligence => locate_highlights_block(lines),
            IndexId::Coding => locate_titled_chart(lines, "Artificial Analysis Coding Index"),
            IndexId::Agentic => locate_titled_chart(lines, "Artificial Analysis Agentic Index"),
        }
    }
}

/// Fallback strategy: charts appear on the page in the same fixed order as
/// the tracked indices, so the n-th chart region stands in for the n-th
/// index when its heading cannot be found. Best effort only.
pub struct ChartMarkerLocator;

impl SectionLocator for ChartMarkerLocator {
    fn name(&self) -> &'static str {
        "chart-marker"
    }

    fn locate<'a>(&self, lines: &[&'a str], index: IndexId) -> Option<Vec<&'a str>> {
        let ordinal = IndexId::ALL.iter().position(|&i| i == index)?;
        chart_regions(lines).into_iter().nth(ordinal)
    }
}

fn locate_highlights_block<'a>(lines: &[&'a str]) -> Option<Vec<&'a str>> {
    let start = lines.iter().position(|line| *line == "INTELLIGENCE")?;
    let mut section = Vec::new();
    for line in &lines[start + 1..] {
        if *line == "SPEED" || *line == "PRICE" {
            break;
        }
        if !line.is_empty() {
            section.push(*line);
        }
    }
    Some(section)
}

fn locate_titled_chart<'a>(lines: &[&'a str], title: &str) -> Option<Vec<&'a str>> {
    let heading = lines.iter().position(|line| line.contains(title))?;
    let rest = &lines[heading + 1..];
    let start = rest.iter().position(|line| is_chart_start(line))?;
    Some(collect_body(&rest[start..]))
}

/// Every chart region on the page, in order. A region starts after its
/// marker lines and runs to the JSON-LD terminator or the next marker.
fn chart_regions<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut regions = Vec::new();
    let mut cursor = 0;
    while cursor < lines.len() {
        let Some(offset) = lines[cursor..].iter().position(|line| is_chart_start(line)) else {
            break;
        };
        let start = cursor + offset;
        let body = collect_body(&lines[start..]);
        let consumed = start + body_span(&lines[start..]);
        regions.push(body);
        cursor = consumed.max(cursor + offset + 1);
    }
    regions
}

fn collect_body<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .skip_while(|line| is_chart_start(line))
        .take_while(|line| !line.contains(SECTION_END_MARKER))
        .filter(|line| !line.is_empty())
        .copied()
        .collect()
}

/// How many lines the region starting at `lines[0]` occupies, terminator
/// included.
fn body_span(lines: &[&str]) -> usize {
    let mut i = 0;
    while i < lines.len() && is_chart_start(lines[i]) {
        i += 1;
    }
    while i < lines.len() && !lines[i].contains(SECTION_END_MARKER) {
        i += 1;
    }
    i + 1
}

fn is_chart_start(line: &str) -> bool {
    line.contains("+ Add model") || MODELS_COUNT_INLINE_RE.is_match(line)
}
