//! Regex substitution pipelines for cell source text.
//!
//! Two fixed chains: the question-side chain blanks out solution details
//! (`##deval`, `##deeqn`, `##deret`, `##repl` markers), the answer-side chain
//! strips the same markers while keeping the solution text. Each chain is an
//! ordered list of (pattern, replacement) pairs; later rules operate on the
//! output of earlier ones.

use once_cell::sync::Lazy;
use regex::Regex;

/// Options threaded into the filter chains.
#[derive(Copy, Clone, Debug, Default)]
pub struct FilterOptions {
    /// Print before/after text to stdout whenever a chain changes a cell.
    pub verbose: bool,
}

type FilterChain = Vec<(Regex, &'static str)>;

fn rule(pattern: &str, replacement: &'static str) -> (Regex, &'static str) {
    (Regex::new(pattern).unwrap(), replacement)
}

static QUESTION_RULES: Lazy<FilterChain> = Lazy::new(|| {
    vec![
        // assignment right-hand side, with and without a trailing comment
        rule(r"=.*(\s[#%].+)\s*##deval", "= ... \t${1}"),
        rule(r"=.*\s*##deval", "= ..."),
        // equation reference collapses to its trailing annotation
        rule(r"eqn.? [\d.]+(.*)\s*##deeqn", "${1}"),
        // return value, with and without a trailing comment
        rule(r"return .*(\s[#%].*?)\s*##deret", "return ... \t${1}"),
        rule(r"return .*##deret", "return ..."),
        // replace the marked line with the marker payload, or delete it
        rule(r"(\s*).+##repl[ \t]?([^\n]+)", "${1}${2}"),
        rule(r".+##repl[ \t]*", ""),
        // line-trailing empty comments
        rule(r"(?m)\s+#\s*$", ""),
    ]
});

static ANSWER_RULES: Lazy<FilterChain> = Lazy::new(|| {
    vec![
        rule(r"\s*##deval", ""),
        rule(r"\s*##deeqn", ""),
        rule(r"\s*##deret", ""),
        rule(r"\s*##repl.*", ""),
    ]
});

fn apply_chain(rules: &FilterChain, source: &str, opts: FilterOptions) -> String {
    let mut filtered = source.to_string();
    for (pattern, replacement) in rules.iter() {
        filtered = pattern.replace_all(&filtered, *replacement).into_owned();
    }
    let filtered = expand_tabs(&filtered);
    if opts.verbose && filtered != source {
        println!("=============");
        println!("{source}");
        println!("-------------");
        println!("{filtered}");
    }
    filtered
}

/// Question-side filtering: blank out solution details.
pub fn filter_source_q(source: &str, opts: FilterOptions) -> String {
    apply_chain(&QUESTION_RULES, source, opts)
}

/// Answer-side filtering: strip authoring markers, keep the solution.
pub fn filter_source_a(source: &str, opts: FilterOptions) -> String {
    apply_chain(&ANSWER_RULES, source, opts)
}

// Expand tabs to spaces with 8-column tab stops; the column count resets at
// every line break. The question-side replacements insert tabs deliberately
// to push preserved comments past the ellipsis.
fn expand_tabs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut col = 0;
    for ch in s.chars() {
        match ch {
            '\t' => {
                let fill = 8 - col % 8;
                for _ in 0..fill {
                    out.push(' ');
                }
                col += fill;
            }
            '\n' | '\r' => {
                out.push(ch);
                col = 0;
            }
            _ => {
                out.push(ch);
                col += 1;
            }
        }
    }
    out
}

/// Remove trailing whitespace from every line, keeping the line structure.
pub fn normalize_trailing_whitespace(source: &str) -> String {
    source
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
