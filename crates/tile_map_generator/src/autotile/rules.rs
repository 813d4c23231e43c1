//! One-dimensional rewrite rules and the rotation trick that reuses them vertically.
//!
//! A rule matches a horizontal run of cells equal to its pattern and overwrites the
//! run with its replacement. Vertical rules are horizontal rules applied to the grid
//! rotated 90 degrees counter-clockwise, so a vertical pattern is written top to bottom.
use tracing::trace;

/// A single literal rewrite: `pattern` and `replacement` have equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Vec<u32>,
    pub replacement: Vec<u32>,
}

impl Rule {
    pub fn new(pattern: impl Into<Vec<u32>>, replacement: impl Into<Vec<u32>>) -> Self {
        let pattern = pattern.into();
        let replacement = replacement.into();
        debug_assert_eq!(
            pattern.len(),
            replacement.len(),
            "rule pattern and replacement must have equal length"
        );
        Self {
            pattern,
            replacement,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// Ordered list of rules. Earlier rules win where matches would overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, pattern: impl Into<Vec<u32>>, replacement: impl Into<Vec<u32>>) -> Self {
        self.push(Rule::new(pattern, replacement));
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, other: &RuleTable) {
        self.rules.extend(other.rules.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Applies every rule, in order, to each row of `data`. Returns the number of changed cells.
///
/// For one rule the scan runs left to right; after a match the scan resumes past the
/// matched run, so matches of the same rule never overlap. Runs never wrap across rows.
pub fn apply_horizontal_rules(data: &mut [u32], width: usize, rules: &RuleTable) -> usize {
    if width == 0 {
        return 0;
    }
    let mut changed = 0;
    for rule in rules.iter() {
        let len = rule.len();
        if len == 0 || len > width || rule.replacement.len() != len {
            continue;
        }
        let mut i = 0;
        while i + len <= data.len() {
            if i / width == (i + len - 1) / width && data[i..i + len] == rule.pattern[..] {
                for (cell, new) in data[i..i + len].iter_mut().zip(&rule.replacement) {
                    if *cell != *new {
                        *cell = *new;
                        changed += 1;
                    }
                }
                i += len;
            } else {
                i += 1;
            }
        }
    }
    if changed > 0 {
        trace!("horizontal rules changed {} cells", changed);
    }
    changed
}

/// Rotates a `width x height` grid 90 degrees counter-clockwise.
///
/// The result is `height` wide and `width` tall; column `x` of the input becomes row
/// `width - 1 - x`, read top to bottom.
pub fn rotate90(data: &[u32], width: usize, height: usize) -> Vec<u32> {
    let mut out = vec![0; data.len()];
    for y in 0..height {
        for x in 0..width {
            out[(width - 1 - x) * height + y] = data[y * width + x];
        }
    }
    out
}

/// Inverse of [`rotate90`]; `width` and `height` describe the original grid.
pub fn unrotate90(rotated: &[u32], width: usize, height: usize) -> Vec<u32> {
    let mut out = vec![0; rotated.len()];
    for y in 0..height {
        for x in 0..width {
            out[y * width + x] = rotated[(width - 1 - x) * height + y];
        }
    }
    out
}

/// Applies rules down the columns of `data`. Patterns are read top to bottom.
pub fn apply_vertical_rules(data: &mut [u32], width: usize, height: usize, rules: &RuleTable) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let mut rotated = rotate90(data, width, height);
    let changed = apply_horizontal_rules(&mut rotated, height, rules);
    if changed > 0 {
        data.copy_from_slice(&unrotate90(&rotated, width, height));
    }
    changed
}
