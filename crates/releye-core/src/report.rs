//! Network report generator
//!
//! Renders a workspace's graph into human-readable markdown: headline
//! statistics, a roster per group, connections by kind, and the people
//! with no ties. The markdown is a view of the graph document - it can
//! be regenerated at any time, and downstream tooling turns it into a
//! printable document.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::graph::GraphDoc;
use crate::types::{Person, PersonId, WorkspaceInfo};

/// Statistics about a graph document.
#[derive(Debug, Default, PartialEq)]
pub struct NetworkStats {
    pub persons: usize,
    pub connections: usize,
    pub groups: usize,
    /// Average number of connections per person (0 when empty)
    pub avg_degree: f64,
    /// Name pair with the strongest tie, if any connection exists
    pub strongest_tie: Option<(String, String, u8)>,
    /// People with no connections at all
    pub isolate_count: usize,
}

impl NetworkStats {
    /// Compute statistics from a graph document.
    pub fn from_doc(doc: &GraphDoc) -> Self {
        let persons = doc.person_count();
        let connections = doc.connection_count();

        let mut degree: BTreeMap<String, usize> = BTreeMap::new();
        for conn in doc.connections() {
            *degree.entry(conn.from.to_string_repr()).or_default() += 1;
            *degree.entry(conn.to.to_string_repr()).or_default() += 1;
        }

        let isolate_count = doc
            .persons()
            .filter(|p| !degree.contains_key(&p.id.to_string_repr()))
            .count();

        let strongest_tie = doc
            .connections()
            .max_by_key(|c| (c.strength, std::cmp::Reverse(c.id.clone())))
            .map(|c| {
                (
                    person_name(doc, &c.from),
                    person_name(doc, &c.to),
                    c.strength,
                )
            });

        let avg_degree = if persons == 0 {
            0.0
        } else {
            (2 * connections) as f64 / persons as f64
        };

        Self {
            persons,
            connections,
            groups: doc.group_count(),
            avg_degree,
            strongest_tie,
            isolate_count,
        }
    }
}

/// Options for report generation.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Include per-person and per-connection notes
    pub include_notes: bool,

    /// Include the "Unconnected people" section
    pub include_isolates: bool,

    /// Maximum connections listed per kind (0 = unlimited)
    pub max_connections_listed: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_notes: false,
            include_isolates: true,
            max_connections_listed: 0,
        }
    }
}

fn person_name(doc: &GraphDoc, id: &PersonId) -> String {
    doc.person(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn sorted_by_name<'a>(persons: impl Iterator<Item = &'a Person>) -> Vec<&'a Person> {
    let mut list: Vec<_> = persons.collect();
    list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    list
}

/// Generate a markdown report for a workspace.
pub fn generate_report(info: &WorkspaceInfo, doc: &GraphDoc, options: &ReportOptions) -> String {
    let stats = NetworkStats::from_doc(doc);
    let mut report = String::new();

    // Header
    writeln!(report, "# RelEye Network Report - {}", info.name).unwrap();
    writeln!(report).unwrap();
    writeln!(report, "**Workspace:** {}", info.id).unwrap();
    writeln!(report, "**Last edited:** {}", format_ts(info.updated_at)).unwrap();
    writeln!(report).unwrap();

    if doc.is_empty() {
        writeln!(report, "This workspace is empty.").unwrap();
        return report;
    }

    // Statistics table
    writeln!(report, "## Statistics").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| Metric | Value |").unwrap();
    writeln!(report, "|--------|-------|").unwrap();
    writeln!(report, "| People | {} |", stats.persons).unwrap();
    writeln!(report, "| Connections | {} |", stats.connections).unwrap();
    writeln!(report, "| Groups | {} |", stats.groups).unwrap();
    writeln!(report, "| Avg. connections per person | {:.1} |", stats.avg_degree).unwrap();
    if let Some((from, to, strength)) = &stats.strongest_tie {
        writeln!(report, "| Strongest tie | {} - {} ({}/5) |", from, to, strength).unwrap();
    }
    writeln!(report).unwrap();

    // Group rosters
    if doc.group_count() > 0 {
        writeln!(report, "## Groups").unwrap();
        writeln!(report).unwrap();
        let mut groups: Vec<_> = doc.groups().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        for group in groups {
            let members = sorted_by_name(doc.members_of(&group.id).into_iter());
            writeln!(report, "### {} ({} members)", group.name, members.len()).unwrap();
            writeln!(report).unwrap();
            for person in members {
                match &person.role {
                    Some(role) => writeln!(report, "- {} ({})", person.name, role).unwrap(),
                    None => writeln!(report, "- {}", person.name).unwrap(),
                }
            }
            writeln!(report).unwrap();
        }
    }

    // Connections by kind
    writeln!(report, "## Connections").unwrap();
    writeln!(report).unwrap();
    let mut by_kind: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for conn in doc.connections() {
        let mut line = format!(
            "{} - {} ({}/5)",
            person_name(doc, &conn.from),
            person_name(doc, &conn.to),
            conn.strength
        );
        if options.include_notes && !conn.notes.is_empty() {
            write!(line, " - {}", conn.notes).unwrap();
        }
        by_kind.entry(conn.kind.label().to_string()).or_default().push(line);
    }
    for (kind, mut lines) in by_kind {
        lines.sort();
        writeln!(report, "### {}", capitalize(&kind)).unwrap();
        writeln!(report).unwrap();
        let limit = if options.max_connections_listed == 0 {
            lines.len()
        } else {
            options.max_connections_listed.min(lines.len())
        };
        for line in &lines[..limit] {
            writeln!(report, "- {}", line).unwrap();
        }
        if limit < lines.len() {
            writeln!(report, "- ... and {} more", lines.len() - limit).unwrap();
        }
        writeln!(report).unwrap();
    }

    // Isolates
    if options.include_isolates && stats.isolate_count > 0 {
        writeln!(report, "## Unconnected people").unwrap();
        writeln!(report).unwrap();
        let isolates = sorted_by_name(
            doc.persons()
                .filter(|p| doc.connections_of(&p.id).is_empty()),
        );
        for person in isolates {
            writeln!(report, "- {}", person.name).unwrap();
        }
        writeln!(report).unwrap();
    }

    // Per-person notes
    if options.include_notes {
        let noted = sorted_by_name(doc.persons().filter(|p| !p.notes.is_empty()));
        if !noted.is_empty() {
            writeln!(report, "## Notes").unwrap();
            writeln!(report).unwrap();
            for person in noted {
                writeln!(report, "### {}", person.name).unwrap();
                writeln!(report).unwrap();
                writeln!(report, "{}", person.notes).unwrap();
                writeln!(report).unwrap();
            }
        }
    }

    report
}

/// Generate a report and write it to a file.
pub fn write_report(
    path: impl AsRef<Path>,
    info: &WorkspaceInfo,
    doc: &GraphDoc,
    options: &ReportOptions,
) -> std::io::Result<()> {
    let report = generate_report(info, doc, options);
    std::fs::write(path, report)
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
