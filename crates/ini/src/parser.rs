//! Line-based INI reader
//!
//! Produces section maps from text. Values spanning several lines are
//! collected as separate lines and joined with `\n` at the end of the read,
//! with trailing blank lines trimmed.

use crate::error::{IniError, IniResult};
use crate::options::IniOptions;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::sync::LazyLock;

static SECTION_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\[(?P<header>.+)\]").ok());

/// Sections read from one source.
#[derive(Debug, Default)]
pub(crate) struct ParsedSource {
    pub defaults: IndexMap<String, String>,
    pub sections: IndexMap<String, IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Target {
    Defaults,
    Section(String),
}

impl Target {
    fn name<'a>(&'a self, options: &'a IniOptions) -> &'a str {
        match self {
            Self::Defaults => &options.default_section,
            Self::Section(name) => name,
        }
    }
}

#[derive(Debug, Default)]
struct Lines {
    defaults: IndexMap<String, Vec<String>>,
    sections: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl Lines {
    fn section_mut(&mut self, target: &Target) -> &mut IndexMap<String, Vec<String>> {
        match target {
            Target::Defaults => &mut self.defaults,
            Target::Section(name) => self.sections.entry(name.clone()).or_default(),
        }
    }
}

/// Strip an inline comment that follows whitespace.
fn strip_inline_comment<'a>(line: &'a str, prefixes: &[String]) -> &'a str {
    let mut end = line.len();
    for prefix in prefixes {
        let mut search_from = 0;
        while let Some(found) = line[search_from..].find(prefix.as_str()) {
            let index = search_from + found;
            let preceded_by_space = line[..index]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
            if preceded_by_space {
                end = end.min(index);
                break;
            }
            search_from = index + prefix.len();
        }
    }
    &line[..end]
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Parse INI text.
pub(crate) fn parse(text: &str, source_name: &str, options: &IniOptions) -> IniResult<ParsedSource> {
    let option_pattern = options.option_pattern()?;
    let header_pattern = SECTION_HEADER
        .as_ref()
        .ok_or_else(|| IniError::InvalidPattern {
            message: "section header pattern".to_string(),
        })?;

    let mut lines = Lines::default();
    let mut added: IndexSet<(Target, Option<String>)> = IndexSet::new();
    let mut errors = Vec::new();
    let mut current: Option<Target> = None;
    let mut option_name: Option<String> = None;
    let mut indent_level = 0;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let is_comment = options
            .comment_prefixes
            .iter()
            .any(|prefix| raw_line.trim().starts_with(prefix.as_str()));
        let value = if is_comment {
            ""
        } else {
            strip_inline_comment(raw_line, &options.inline_comment_prefixes).trim()
        };

        if value.is_empty() {
            if options.empty_lines_in_values {
                if !is_comment
                    && let (Some(target), Some(name)) = (&current, &option_name)
                    && let Some(values) = lines.section_mut(target).get_mut(name)
                {
                    values.push(String::new());
                }
            } else {
                indent_level = usize::MAX;
            }
            continue;
        }

        let current_indent = indent_of(raw_line);
        if let (Some(target), Some(name)) = (&current, &option_name)
            && current_indent > indent_level
        {
            if let Some(values) = lines.section_mut(target).get_mut(name) {
                values.push(value.to_string());
            }
            continue;
        }
        indent_level = current_indent;

        if let Some(captures) = header_pattern.captures(value) {
            let header = captures["header"].to_string();
            let target = if header == options.default_section {
                Target::Defaults
            } else {
                Target::Section(header.clone())
            };
            if options.strict
                && matches!(target, Target::Section(_))
                && added.contains(&(target.clone(), None))
            {
                return Err(IniError::DuplicateSection {
                    section: header,
                    source_name: source_name.to_string(),
                    line: line_number,
                });
            }
            lines.section_mut(&target);
            added.insert((target.clone(), None));
            current = Some(target);
            option_name = None;
            continue;
        }

        let Some(target) = current.clone() else {
            return Err(IniError::MissingSectionHeader {
                source_name: source_name.to_string(),
                line: line_number,
                text: raw_line.to_string(),
            });
        };

        match option_pattern.captures(value) {
            Some(captures) => {
                let name = captures["option"].trim_end().to_lowercase();
                if name.is_empty() {
                    errors.push((line_number, raw_line.to_string()));
                }
                if options.strict && added.contains(&(target.clone(), Some(name.clone()))) {
                    return Err(IniError::DuplicateOption {
                        section: target.name(options).to_string(),
                        option: name,
                        source_name: source_name.to_string(),
                        line: line_number,
                    });
                }
                added.insert((target.clone(), Some(name.clone())));
                let first = captures["value"].trim().to_string();
                lines.section_mut(&target).insert(name.clone(), vec![first]);
                option_name = Some(name);
            }
            None => errors.push((line_number, raw_line.to_string())),
        }
    }

    if !errors.is_empty() {
        return Err(IniError::Parse {
            source_name: source_name.to_string(),
            errors,
        });
    }

    let join = |values: Vec<String>| values.join("\n").trim_end().to_string();
    Ok(ParsedSource {
        defaults: lines
            .defaults
            .into_iter()
            .map(|(name, values)| (name, join(values)))
            .collect(),
        sections: lines
            .sections
            .into_iter()
            .map(|(section, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(name, values)| (name, join(values)))
                    .collect();
                (section, entries)
            })
            .collect(),
    })
}
