//! `NOLINT` comment handling.
//!
//! Recognized forms, each optionally followed by a parenthesized,
//! comma-separated list of check names:
//!
//! - `// NOLINT` - suppress findings on this line
//! - `// NOLINTNEXTLINE` - suppress findings on the following line
//! - `// NOLINTBEGIN` ... `// NOLINTEND` - suppress findings in the region
//!
//! A name may be a canonical id, a legacy name, a bare name, or a glob with a
//! trailing `*` (`standard-upgrade.*`, `hl-perf-*`, `*`).

use crate::lint::{CheckDescriptor, resolve_check_alias};

/// Which checks a directive covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFilter {
    All,
    Names(Vec<String>),
}

impl CheckFilter {
    fn parse(list: Option<&str>) -> Self {
        let Some(list) = list else {
            return CheckFilter::All;
        };
        let names: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() || names.iter().any(|n| n == "*") {
            CheckFilter::All
        } else {
            CheckFilter::Names(names)
        }
    }

    pub fn covers(&self, check: &CheckDescriptor) -> bool {
        match self {
            CheckFilter::All => true,
            CheckFilter::Names(names) => names.iter().any(|n| name_covers(n, check)),
        }
    }
}

fn name_covers(name: &str, check: &CheckDescriptor) -> bool {
    if let Some(prefix) = name.strip_suffix('*') {
        return check.id.starts_with(prefix) || check.legacy_name().starts_with(prefix);
    }
    resolve_check_alias(name) == check.id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NolintDirective {
    Line(CheckFilter),
    NextLine(CheckFilter),
    Begin(CheckFilter),
    End(CheckFilter),
}

/// Parse the directive on one source line, if any.
pub fn parse_directive(line: &str) -> Option<NolintDirective> {
    let comment = line.find("//").map(|i| &line[i + 2..]).or_else(|| {
        line.find("/*").map(|i| &line[i + 2..])
    })?;
    let at = comment.find("NOLINT")?;
    let rest = &comment[at + "NOLINT".len()..];

    let (make, rest): (fn(CheckFilter) -> NolintDirective, &str) =
        if let Some(rest) = rest.strip_prefix("NEXTLINE") {
            (NolintDirective::NextLine, rest)
        } else if let Some(rest) = rest.strip_prefix("BEGIN") {
            (NolintDirective::Begin, rest)
        } else if let Some(rest) = rest.strip_prefix("END") {
            (NolintDirective::End, rest)
        } else {
            (NolintDirective::Line, rest)
        };

    // `NOLINTFOO` is not a directive.
    if rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let list = rest
        .strip_prefix('(')
        .and_then(|r| r.find(')').map(|end| &r[..end]));
    Some(make(CheckFilter::parse(list)))
}

/// Suppression directives of one source file, keyed by 1-based line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suppressions {
    lines: Vec<(usize, CheckFilter)>,
    regions: Vec<(usize, usize, CheckFilter)>,
}

impl Suppressions {
    pub fn parse(source: &str) -> Self {
        let mut out = Self::default();
        let mut open: Vec<(usize, CheckFilter)> = Vec::new();
        let mut last_line = 0;

        for (idx, line) in source.lines().enumerate() {
            let row = idx + 1;
            last_line = row;
            match parse_directive(line) {
                Some(NolintDirective::Line(filter)) => out.lines.push((row, filter)),
                Some(NolintDirective::NextLine(filter)) => out.lines.push((row + 1, filter)),
                Some(NolintDirective::Begin(filter)) => open.push((row, filter)),
                Some(NolintDirective::End(filter)) => {
                    if let Some(pos) = open.iter().rposition(|(_, f)| *f == filter) {
                        let (start, filter) = open.remove(pos);
                        out.regions.push((start, row, filter));
                    }
                }
                None => {}
            }
        }

        // An unterminated region runs to the end of the file.
        for (start, filter) in open {
            out.regions.push((start, last_line, filter));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.regions.is_empty()
    }

    pub fn is_suppressed(&self, row: usize, check: &CheckDescriptor) -> bool {
        self.lines
            .iter()
            .any(|(line, filter)| *line == row && filter.covers(check))
            || self
                .regions
                .iter()
                .any(|(start, end, filter)| (*start..=*end).contains(&row) && filter.covers(check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directive_forms() {
        assert_eq!(
            parse_directive("std::cout << x; // NOLINT"),
            Some(NolintDirective::Line(CheckFilter::All))
        );
        assert_eq!(
            parse_directive("// NOLINTNEXTLINE(avoid-std-endl, hl-perf-avoid-cout-cerr)"),
            Some(NolintDirective::NextLine(CheckFilter::Names(vec![
                "avoid-std-endl".to_string(),
                "hl-perf-avoid-cout-cerr".to_string()
            ])))
        );
        assert_eq!(
            parse_directive("/* NOLINTBEGIN(*) */"),
            Some(NolintDirective::Begin(CheckFilter::All))
        );
        assert_eq!(parse_directive("int NOLINT = 0;"), None);
        assert_eq!(parse_directive("// NOLINTED"), None);
    }

    #[test]
    fn unterminated_region_extends_to_end() {
        let s = Suppressions::parse("a\n// NOLINTBEGIN\nb\nc\n");
        assert_eq!(s.regions, vec![(2, 4, CheckFilter::All)]);
    }
}
