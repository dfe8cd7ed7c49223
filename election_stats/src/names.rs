//! Canonical spellings for province and district names.
//!
//! Different files of the same election do not spell names the same way
//! (`KUNAR` / `Kunar` / `Kunarha`, `Jalalabad Center` / `Jalalabad`). The
//! rules are applied while the keys are built, so that two datasets can be
//! joined on their keys.

use std::collections::BTreeMap;

/// Rewrite rules for names, applied in field order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct NameRules {
    /// Uppercase every letter that follows a non-letter, lowercase the others.
    pub title_case: bool,
    /// Remove all the whitespace.
    pub strip_spaces: bool,
    /// Substrings removed from the name.
    pub remove: Vec<String>,
    /// Exact replacements, applied last.
    pub aliases: BTreeMap<String, String>,
}

impl NameRules {
    pub fn is_identity(&self) -> bool {
        !self.title_case && !self.strip_spaces && self.remove.is_empty() && self.aliases.is_empty()
    }

    pub fn apply(&self, name: &str) -> String {
        let mut res = name.to_string();
        if self.title_case {
            res = title_case(&res);
        }
        if self.strip_spaces {
            res.retain(|c| !c.is_whitespace());
        }
        if !self.remove.is_empty() {
            for r in self.remove.iter().filter(|r| !r.is_empty()) {
                res = res.replace(r.as_str(), "");
            }
            // Removing a word may leave a space at either end.
            res = res.trim().to_string();
        }
        match self.aliases.get(&res) {
            Some(alias) => alias.clone(),
            None => res,
        }
    }
}

fn title_case(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            res.push(c);
            prev_is_letter = false;
        }
    }
    res
}
