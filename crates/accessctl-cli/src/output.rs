//! Renderers and formatting helpers for rule and licence records.

use accessctl_api_models::{FindRulesResponse, Licence, Rule, RuleType};

/// Fixed message printed when a rule find matches nothing.
pub(crate) const NO_MATCHING_RULES: &str = "No matching rules";
/// Fixed message printed when a licence find matches nothing.
pub(crate) const NO_MATCHING_LICENCES: &str = "No matching licences";

/// One line describing a rule:
/// `<id> : <path> : <type>[ : <group>][ : <licence>][ [expires: <date>]]`.
///
/// The group segment appears only for Group rules, the licence segment only
/// when a licence is attached, the expiry segment only when a date is set.
pub(crate) fn rule_line(rule: &Rule) -> String {
    let mut line = format!("{} : {} : {}", rule.id, rule.path, rule.rule_type);
    if rule.rule_type == RuleType::Group
        && let Some(group) = &rule.group
    {
        line.push_str(&format!(" : {group}"));
    }
    if let Some(licence) = &rule.licence {
        line.push_str(&format!(" : {licence}"));
    }
    if let Some(expiry) = &rule.expiry_date {
        line.push_str(&format!(" [expires: {expiry}]"));
    }
    line
}

/// One line describing a licence:
/// `<code>[ [<tag>, <tag>, ...]] : <title> : <url>`.
pub(crate) fn licence_line(licence: &Licence) -> String {
    let tags = if licence.category_tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", licence.category_tags.join(", "))
    };
    format!("{}{tags} : {} : {}", licence.code, licence.title, licence.url)
}

/// Print one indented line per rule.
pub(crate) fn print_rules(rules: &[Rule]) {
    for rule in rules {
        println!("    {}", rule_line(rule));
    }
}

/// Render a `rule/find` response: per-path breakdown under labelled
/// headings, a flat count header with one line per record, or the fixed
/// no-matching message.
pub(crate) fn render_find_rules(response: &FindRulesResponse) {
    if response.is_empty() {
        println!("{NO_MATCHING_RULES}");
        return;
    }

    match response {
        FindRulesResponse::PathRules { path_rules } => {
            for (path, set) in path_rules {
                if !set.rules.is_empty() {
                    println!("Rules for {path}:");
                    print_rules(&set.rules);
                }
                if !set.sub_rules.is_empty() {
                    println!("Sub rules for {path}:");
                    print_rules(&set.sub_rules);
                }
                if !set.override_rules.is_empty() {
                    println!("Override rules for {path}:");
                    print_rules(&set.override_rules);
                }
            }
        }
        FindRulesResponse::Flat(rules) => {
            println!("{} rules found:", rules.len());
            print_rules(rules);
        }
    }
}

/// Render a `licence/find` response as a flat count header with one line per
/// record, or the fixed no-matching message.
pub(crate) fn render_licences(licences: &[Licence]) {
    if licences.is_empty() {
        println!("{NO_MATCHING_LICENCES}");
        return;
    }
    println!("{} licences found:", licences.len());
    for licence in licences {
        println!("    {}", licence_line(licence));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_rule() -> Rule {
        Rule {
            id: 12,
            path: "/archive/proj1".to_string(),
            rule_type: RuleType::Public,
            group: None,
            licence: None,
            expiry_date: None,
            comment: None,
            cascades: false,
        }
    }

    #[test]
    fn plain_rule_renders_id_path_and_type_only() {
        assert_eq!(rule_line(&base_rule()), "12 : /archive/proj1 : P");
    }

    #[test]
    fn group_segment_appears_only_for_group_rules() {
        let mut rule = base_rule();
        rule.group = Some("teamA".to_string());
        // Non-group rule with a stray group reference still renders without it.
        assert_eq!(rule_line(&rule), "12 : /archive/proj1 : P");

        rule.rule_type = RuleType::Group;
        assert_eq!(rule_line(&rule), "12 : /archive/proj1 : G : teamA");
    }

    #[test]
    fn licence_and_expiry_segments_render_when_set() {
        let mut rule = base_rule();
        rule.licence = Some("CC BY 4.0".to_string());
        rule.expiry_date = Some("2027-01-31".to_string());
        assert_eq!(
            rule_line(&rule),
            "12 : /archive/proj1 : P : CC BY 4.0 [expires: 2027-01-31]"
        );
    }

    #[test]
    fn licence_line_includes_tags_only_when_present() {
        let mut licence = Licence {
            code: "ccby".to_string(),
            title: "CC BY 4.0".to_string(),
            url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            comment: None,
            category_tags: Vec::new(),
        };
        assert_eq!(
            licence_line(&licence),
            "ccby : CC BY 4.0 : https://creativecommons.org/licenses/by/4.0/"
        );

        licence.category_tags = vec!["open".to_string(), "attribution".to_string()];
        assert_eq!(
            licence_line(&licence),
            "ccby [open, attribution] : CC BY 4.0 : https://creativecommons.org/licenses/by/4.0/"
        );
    }
}
