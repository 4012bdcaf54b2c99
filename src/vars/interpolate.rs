//! Expansion of `$(NAME:opt:opt...)` sites.
//!
//! A string is scanned once into an arena of sites (start, end, separator
//! offsets, parent). Sites are then substituted right-to-left, so inner sites
//! are always replaced before the site that contains them. Each substitution
//! shifts the recorded offsets of the still-pending enclosing sites by the
//! change in length.
//!
//! A variable with several values forks the partial result once per value.
//! After a pass, every result is queued again: values are allowed to contain
//! templates of their own.

use super::options::{Opt, apply_pipeline};
use super::store::Lookup;
use crate::diag::Diagnostics;
use std::collections::VecDeque;

/// Upper bound on re-expansion of values that contain further templates.
const MAX_PASSES: usize = 8;

const ESCAPE: u8 = b'\\';

#[derive(Debug, Clone, PartialEq, Eq)]
struct Site {
    /// Offset of `$`.
    start: usize,
    /// Offset one past the closing `)`.
    end: usize,
    /// Offsets of the `:` separators that belong to this site.
    seps: Vec<usize>,
    parent: Option<usize>,
}

impl Site {
    fn name_range(&self) -> (usize, usize) {
        let name_end = self.seps.first().copied().unwrap_or(self.end - 1);
        (self.start + 2, name_end)
    }

    fn option_ranges(&self) -> Vec<(usize, usize)> {
        let close = self.end - 1;
        self.seps
            .iter()
            .enumerate()
            .map(|(i, &sep)| (sep + 1, self.seps.get(i + 1).copied().unwrap_or(close)))
            .collect()
    }
}

/// Scan `text` for sites, in opening order.
///
/// Returns `None` when a `$(` is never closed.
fn scan(text: &str) -> Option<Vec<Site>> {
    let bytes = text.as_bytes();
    let mut sites: Vec<Site> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'(') => {
                sites.push(Site {
                    start: i,
                    end: 0,
                    seps: Vec::new(),
                    parent: open.last().copied(),
                });
                open.push(sites.len() - 1);
                i += 2;
                continue;
            }
            ESCAPE if !open.is_empty() => {
                // Escaped byte is never structural. Multi-byte characters
                // only have non-ASCII continuation bytes, so stepping one
                // byte past the backslash cannot land on a delimiter.
                i += 2;
                continue;
            }
            b':' => {
                if let Some(&top) = open.last() {
                    sites[top].seps.push(i);
                }
            }
            b')' => {
                if let Some(top) = open.pop() {
                    sites[top].end = i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if open.is_empty() { Some(sites) } else { None }
}

/// Move the offsets of `parent` and its ancestors that sit at or after `from`.
///
/// Sites are replaced right-to-left, so only sites enclosing the replaced
/// region can still have offsets past it.
fn shift_enclosing(sites: &mut [Site], mut parent: Option<usize>, from: usize, delta: isize) {
    if delta == 0 {
        return;
    }
    while let Some(idx) = parent {
        let site = &mut sites[idx];
        if site.end >= from {
            site.end = site.end.saturating_add_signed(delta);
        }
        for sep in site.seps.iter_mut() {
            if *sep >= from {
                *sep = sep.saturating_add_signed(delta);
            }
        }
        parent = site.parent;
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE as char {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(value: &str) -> String {
    let esc = ESCAPE as char;
    value.replace(esc, &format!("{esc}{esc}"))
}

#[derive(Debug, Clone)]
struct Partial {
    text: String,
    sites: Vec<Site>,
}

pub struct Interpolator<'a> {
    vars: &'a dyn Lookup,
    diag: &'a dyn Diagnostics,
}

impl<'a> Interpolator<'a> {
    pub fn new(vars: &'a dyn Lookup, diag: &'a dyn Diagnostics) -> Self {
        Self { vars, diag }
    }

    /// Expand `input` into every string it produces.
    ///
    /// Never fails: an unterminated site returns `input` unchanged, a
    /// missing variable expands to nothing, an unknown option yields `?`.
    pub fn resolve(&self, input: &str) -> Vec<String> {
        let mut pending: VecDeque<(String, usize)> = VecDeque::new();
        pending.push_back((input.to_string(), 0));
        let mut resolved = Vec::new();

        while let Some((text, pass)) = pending.pop_front() {
            let sites = match scan(&text) {
                Some(sites) => sites,
                None if pass == 0 => return vec![input.to_string()],
                None => {
                    resolved.push(text);
                    continue;
                }
            };

            if sites.is_empty() {
                resolved.push(text);
                continue;
            }

            if pass >= MAX_PASSES {
                self.diag.warn(&format!(
                    "template still unresolved after {} passes: {}",
                    MAX_PASSES, text
                ));
                resolved.push(text);
                continue;
            }

            // Depth-first keeps results in the order they were produced
            let expanded = self.expand(text, sites);
            for text in expanded.into_iter().rev() {
                pending.push_front((text, pass + 1));
            }
        }

        resolved
    }

    /// Expand and join every result with a single space.
    pub fn resolve_one(&self, input: &str) -> String {
        self.resolve(input).join(" ")
    }

    /// Substitute every site of one scanned string.
    fn expand(&self, text: String, sites: Vec<Site>) -> Vec<String> {
        let count = sites.len();
        let mut partials = vec![Partial { text, sites }];

        for idx in (0..count).rev() {
            let mut next = Vec::with_capacity(partials.len());
            for partial in partials {
                let values = self.site_values(&partial.text, &partial.sites[idx]);
                let site = &partial.sites[idx];
                let (start, end, parent) = (site.start, site.end, site.parent);
                let delta_base = (end - start) as isize;

                for value in values {
                    // Text inside an enclosing site is unescaped once more
                    let value = match parent {
                        Some(_) => escape(&value),
                        None => value,
                    };
                    let mut text = String::with_capacity(partial.text.len() + value.len());
                    text.push_str(&partial.text[..start]);
                    text.push_str(&value);
                    text.push_str(&partial.text[end..]);

                    let mut sites = partial.sites[..idx].to_vec();
                    shift_enclosing(&mut sites, parent, end, value.len() as isize - delta_base);
                    next.push(Partial { text, sites });
                }
            }
            partials = next;
        }

        partials.into_iter().map(|p| p.text).collect()
    }

    /// Values a single site expands to. Always at least one.
    fn site_values(&self, text: &str, site: &Site) -> Vec<String> {
        let (name_start, name_end) = site.name_range();
        let name = unescape(&text[name_start..name_end]);

        let values = match self.vars.lookup(&name) {
            Some(values) if !values.is_empty() => values.to_vec(),
            _ => {
                self.diag
                    .note(&format!("variable '{}' is empty or not set, expanding to nothing", name));
                return vec![String::new()];
            }
        };

        let opts: Vec<Opt> = site
            .option_ranges()
            .into_iter()
            .filter_map(|(from, to)| Opt::parse(&unescape(&text[from..to])))
            .collect();

        apply_pipeline(values, &opts, self.diag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Collect, Silent};
    use crate::vars::VariableStore;

    fn store() -> VariableStore {
        let mut vars = VariableStore::new();
        vars.set_one("FOO", "String");
        vars.set("BAR", ["A", "B", "C"]);
        vars.set_one("CURRENT_VARIANT", "debug");
        vars.set_one("CCOPTS_DEBUG", "-g -O0");
        vars.set_one("CCOPTS_RELEASE", "-O2");
        vars
    }

    fn resolve(vars: &VariableStore, input: &str) -> Vec<String> {
        Interpolator::new(vars, &Silent).resolve(input)
    }

    #[test]
    fn test_scalar() {
        assert_eq!(resolve(&store(), "$(FOO)"), vec!["String"]);
    }

    #[test]
    fn test_list_fans_out_in_order() {
        assert_eq!(resolve(&store(), "$(BAR)"), vec!["A", "B", "C"]);
        assert_eq!(
            resolve(&store(), "-D$(BAR);"),
            vec!["-DA;", "-DB;", "-DC;"]
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        let vars = store();
        for input in ["", "plain text", "cost: $5 (approx)", "a)b", "C:\\path\\x"] {
            assert_eq!(resolve(&vars, input), vec![input]);
        }
    }

    #[test]
    fn test_unterminated_returns_input() {
        let vars = store();
        for input in ["$(FOO", "x $(FOO) $(BAR", "$(CCOPTS_$(FOO)", "$(FOO:p\\)"] {
            assert_eq!(resolve(&vars, input), vec![input]);
        }
    }

    #[test]
    fn test_options() {
        let vars = store();
        assert_eq!(resolve(&vars, "$(FOO:u)"), vec!["STRING"]);
        assert_eq!(resolve(&vars, "$(FOO:p__:s__)"), vec!["__String__"]);
        assert_eq!(resolve(&vars, "$(BAR:p__:s__:j!)"), vec!["__A__!__B__!__C__"]);
    }

    #[test]
    fn test_nested_name() {
        assert_eq!(
            resolve(&store(), "Test $(CCOPTS_$(CURRENT_VARIANT:u))"),
            vec!["Test -g -O0"]
        );
    }

    #[test]
    fn test_nested_list_forks_outer_lookup() {
        let mut vars = store();
        vars.set("VARIANTS", ["debug", "release"]);
        assert_eq!(
            resolve(&vars, "[$(CCOPTS_$(VARIANTS:u))]"),
            vec!["[-g -O0]", "[-O2]"]
        );
    }

    #[test]
    fn test_nested_option_parameter() {
        let mut vars = store();
        vars.set_one("SEP", ",");
        assert_eq!(resolve(&vars, "$(BAR:j$(SEP))"), vec!["A,B,C"]);
        assert_eq!(resolve(&vars, "$(BAR:p$(FOO:l)-:j )"), vec!["string-A string-B string-C"]);
    }

    #[test]
    fn test_cartesian_product() {
        let mut vars = VariableStore::new();
        vars.set("OS", ["linux", "macos"]);
        vars.set("ARCH", ["x64", "arm64", "riscv"]);

        let out = resolve(&vars, "$(OS)-$(ARCH)");
        assert_eq!(out.len(), 6);
        // Rightmost site is expanded first, so it is the outer loop
        assert_eq!(
            out,
            vec![
                "linux-x64",
                "macos-x64",
                "linux-arm64",
                "macos-arm64",
                "linux-riscv",
                "macos-riscv",
            ]
        );
        for os in ["linux", "macos"] {
            for arch in ["x64", "arm64", "riscv"] {
                assert!(out.contains(&format!("{os}-{arch}")));
            }
        }
    }

    #[test]
    fn test_join_per_site() {
        let mut vars = store();
        vars.set("INCLUDES", ["a", "b"]);
        assert_eq!(
            resolve(&vars, "$(INCLUDES:p-I:j ) $(BAR:p-D:j )"),
            vec!["-Ia -Ib -DA -DB -DC"]
        );
        // Join on one site does not collapse another
        assert_eq!(resolve(&vars, "$(INCLUDES:j+)/$(BAR)").len(), 3);
    }

    #[test]
    fn test_missing_variable_expands_to_nothing() {
        let diag = Collect::new();
        let vars = store();
        let ix = Interpolator::new(&vars, &diag);

        assert_eq!(ix.resolve("a$(NOPE)b"), vec!["ab"]);
        assert_eq!(ix.resolve("$(NOPE:p-I)$(FOO)"), vec!["String"]);
        assert_eq!(diag.notes().len(), 2);
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn test_empty_list_expands_to_nothing() {
        let mut vars = store();
        vars.set("NONE", Vec::<String>::new());
        assert_eq!(resolve(&vars, "x$(NONE:p-D)y"), vec!["xy"]);
    }

    #[test]
    fn test_unknown_option() {
        let diag = Collect::new();
        let vars = store();
        let out = Interpolator::new(&vars, &diag).resolve("<$(BAR:q:j,)>");
        assert_eq!(out, vec!["<?,?,?>"]);
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_escapes_in_parameters() {
        let mut vars = VariableStore::new();
        vars.set("LIBS", ["m", "pthread"]);
        assert_eq!(resolve(&vars, r"$(LIBS:j\:)"), vec!["m:pthread"]);
        assert_eq!(resolve(&vars, r"$(LIBS:p\(:s\):j )"), vec!["(m) (pthread)"]);
    }

    #[test]
    fn test_backslash_in_nested_parameter() {
        let mut vars = VariableStore::new();
        vars.set_one("SDK", r"C:\sdk\include");
        vars.set("INC", ["a", "b"]);

        assert_eq!(
            resolve(&vars, "$(INC:p$(SDK)/:j )"),
            vec![r"C:\sdk\include/a C:\sdk\include/b"]
        );
        assert_eq!(
            resolve(&vars, "$(INC:p$(SDK:f):s$(SDK:b))"),
            vec![r"C:/sdk/includeaC:\sdk\include", r"C:/sdk/includebC:\sdk\include"]
        );
    }

    #[test]
    fn test_backslash_in_nested_name() {
        let mut vars = VariableStore::new();
        vars.set_one("K", r"A\B");
        vars.set_one(r"X_A\B", "hit");
        assert_eq!(resolve(&vars, "$(X_$(K))"), vec!["hit"]);
    }

    #[test]
    fn test_values_are_expanded_again() {
        let mut vars = VariableStore::new();
        vars.set_one("ROOT", "/work");
        vars.set_one("INCLUDE_DIR", "$(ROOT)/include");
        vars.set("ALL", ["$(INCLUDE_DIR)", "$(ROOT)/vendor"]);

        assert_eq!(resolve(&vars, "$(INCLUDE_DIR)"), vec!["/work/include"]);
        assert_eq!(resolve(&vars, "$(ALL)"), vec!["/work/include", "/work/vendor"]);
    }

    #[test]
    fn test_self_reference_stops() {
        let diag = Collect::new();
        let mut vars = VariableStore::new();
        vars.set_one("LOOP", "$(LOOP)");

        let out = Interpolator::new(&vars, &diag).resolve("$(LOOP)");
        assert_eq!(out, vec!["$(LOOP)"]);
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_unicode_text_around_sites() {
        let vars = store();
        assert_eq!(resolve(&vars, "é$(FOO:l)→ü"), vec!["éstring→ü"]);
    }

    #[test]
    fn test_resolve_one_joins_fan_out() {
        let vars = store();
        let ix = Interpolator::new(&vars, &Silent);
        assert_eq!(ix.resolve_one("-D$(BAR)"), "-DA -DB -DC");
    }

    #[test]
    fn test_scan_records_parents_and_separators() {
        let sites = scan("x $(A_$(B:u):p-) y").unwrap();
        assert_eq!(sites.len(), 2);

        let outer = &sites[0];
        assert_eq!(outer.start, 2);
        assert_eq!(outer.end, 16);
        assert_eq!(outer.parent, None);
        assert_eq!(outer.seps, vec![12]);

        let inner = &sites[1];
        assert_eq!(inner.start, 6);
        assert_eq!(inner.end, 12);
        assert_eq!(inner.parent, Some(0));
        assert_eq!(inner.seps, vec![9]);
    }

    #[test]
    fn test_scan_ignores_escaped_delimiters() {
        let sites = scan(r"$(A:j\:\))").unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].seps, vec![3]);
        assert_eq!(sites[0].end, 10);
        assert!(scan("$(A").is_none());
    }

    #[test]
    fn test_shift_enclosing_moves_ancestor_offsets() {
        // Inner $(B) at 4..8 replaced by a single character
        let mut sites = scan("$(A_$(B):u)").unwrap();
        let inner = sites.pop().unwrap();
        assert_eq!((inner.start, inner.end), (4, 8));

        shift_enclosing(&mut sites, inner.parent, inner.end, -3);
        assert_eq!(sites[0].end, 8);
        assert_eq!(sites[0].seps, vec![5]);
    }

    #[test]
    fn test_shift_enclosing_leaves_siblings() {
        // "$(A:u)$(B)": replacing $(B) must not touch $(A)
        let mut sites = scan("$(A:u)$(B)").unwrap();
        let right = sites.pop().unwrap();
        assert_eq!(right.parent, None);

        shift_enclosing(&mut sites, right.parent, right.end, 10);
        assert_eq!(sites[0].end, 6);
        assert_eq!(sites[0].seps, vec![3]);
    }

    #[test]
    fn test_deeply_nested() {
        let mut vars = VariableStore::new();
        vars.set_one("LEVEL", "b");
        vars.set_one("KEY_B", "c");
        vars.set_one("VALUE_C", "done");
        assert_eq!(resolve(&vars, "$(VALUE_$(KEY_$(LEVEL:u):u))"), vec!["done"]);
    }
}
