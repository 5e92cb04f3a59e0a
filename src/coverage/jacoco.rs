//! JaCoCo XML report parser

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use super::{ClassCoverage, Counter, CounterType, Counters, PackageCoverage, ProjectCoverage};
use crate::error::{Result, ReviewError};

/// Element currently open in the document, used to attribute counters
enum Node {
    Report,
    Package(usize),
    Class(usize),
    // method, sourcefile, group, sessioninfo...
    Other,
}

/// Parse a JaCoCo XML report file
pub fn parse_report(path: &Path) -> Result<ProjectCoverage> {
    let bytes = fs::read(path).map_err(|source| ReviewError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let content = String::from_utf8(bytes)
        .map_err(|e| malformed(format!("{} is not valid UTF-8: {}", path.display(), e)))?;
    parse_report_str(&content)
}

/// Parse JaCoCo XML content from a string
pub fn parse_report_str(content: &str) -> Result<ProjectCoverage> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut project = ProjectCoverage::default();
    let mut stack: Vec<Node> = Vec::new();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let node = if e.name().as_ref() == b"counter" {
                    record_counter(e, &mut project, &stack)?;
                    Node::Other
                } else {
                    open_element(e, &mut project, &stack, &mut seen_root)?
                };
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"counter" {
                    record_counter(e, &mut project, &stack)?;
                } else {
                    open_element(e, &mut project, &stack, &mut seen_root)?;
                }
            }
            Ok(Event::End(_)) => {
                if stack.pop().is_none() {
                    return Err(malformed("unexpected closing tag"));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(format!("invalid XML: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed("missing <report> element"));
    }
    if !stack.is_empty() {
        return Err(malformed("unexpected end of document"));
    }

    for class in &mut project.classes {
        class.line_counter = class.counters.line_or_first();
    }
    for package in &mut project.packages {
        package.line_counter = package.counters.line_or_first();
    }
    project.total_line_counter = match project.counters.get(CounterType::Line) {
        Some(counter) => counter,
        None => project
            .classes
            .iter()
            .try_fold(Counter::default(), |acc, c| acc.checked_add(c.line_counter))
            .filter(|total| total.covered.checked_add(total.missed).is_some())
            .ok_or_else(|| malformed("summed LINE counters are out of range"))?,
    };

    tracing::debug!(
        report = %project.name,
        packages = project.packages.len(),
        classes = project.classes.len(),
        "Parsed JaCoCo report"
    );

    Ok(project)
}

fn open_element(
    e: &BytesStart,
    project: &mut ProjectCoverage,
    stack: &[Node],
    seen_root: &mut bool,
) -> Result<Node> {
    let name = e.name();

    if stack.is_empty() {
        if *seen_root {
            return Err(malformed("more than one root element"));
        }
        if name.as_ref() != b"report" {
            return Err(malformed(format!(
                "expected <report> root element, found <{}>",
                String::from_utf8_lossy(name.as_ref())
            )));
        }
        *seen_root = true;
        project.name = attr_value(e, b"name").unwrap_or_default();
        return Ok(Node::Report);
    }

    match name.as_ref() {
        b"package" => {
            let package_name = attr_value(e, b"name")
                .ok_or_else(|| malformed("<package> without a name"))?;
            project.packages.push(PackageCoverage {
                name: package_name,
                line_counter: Counter::default(),
                counters: Counters::default(),
            });
            Ok(Node::Package(project.packages.len() - 1))
        }
        b"class" => {
            let qualified_name = attr_value(e, b"name")
                .ok_or_else(|| malformed("<class> without a name"))?;
            project.classes.push(ClassCoverage {
                qualified_name,
                line_counter: Counter::default(),
                counters: Counters::default(),
            });
            Ok(Node::Class(project.classes.len() - 1))
        }
        _ => Ok(Node::Other),
    }
}

fn record_counter(e: &BytesStart, project: &mut ProjectCoverage, stack: &[Node]) -> Result<()> {
    let kind_attr = attr_value(e, b"type").ok_or_else(|| malformed("<counter> without a type"))?;
    let kind = CounterType::from_attr(&kind_attr)
        .ok_or_else(|| malformed(format!("unknown counter type '{}'", kind_attr)))?;
    let counter = Counter::new(count_attr(e, b"covered")?, count_attr(e, b"missed")?);
    if counter.covered.checked_add(counter.missed).is_none() {
        return Err(malformed(format!("{} counter total is out of range", kind_attr)));
    }

    match stack.last() {
        Some(Node::Report) => project.counters.push(kind, counter),
        Some(Node::Package(idx)) => project.packages[*idx].counters.push(kind, counter),
        Some(Node::Class(idx)) => project.classes[*idx].counters.push(kind, counter),
        Some(Node::Other) => {}
        None => return Err(malformed("<counter> outside of <report>")),
    }

    Ok(())
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn count_attr(e: &BytesStart, key: &[u8]) -> Result<u64> {
    let key_name = String::from_utf8_lossy(key).to_string();
    let value = attr_value(e, key)
        .ok_or_else(|| malformed(format!("<counter> without '{}'", key_name)))?;
    value.trim().parse::<u64>().map_err(|_| {
        malformed(format!("<counter> has non-numeric '{}' value '{}'", key_name, value))
    })
}

fn malformed(message: impl Into<String>) -> ReviewError {
    ReviewError::MalformedReport(message.into())
}
