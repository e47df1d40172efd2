//! Handlers for the rule commands: list, add, update, remove.

use accessctl_api_models::{
    AddRulesRequest, FindRulesResponse, Rule, RuleFilter, RuleType, UpdateRuleRequest,
    parse_add_conflicts,
};
use anyhow::anyhow;

use crate::cli::{AddRuleArgs, ListRuleArgs, RemoveRuleArgs, UpdateRuleArgs};
use crate::client::{AppContext, CliError, CliResult, classify_problem, problem_from_parts};
use crate::commands::none_if_empty;
use crate::output::{render_find_rules, rule_line};
use crate::paths::expand_pattern;
use crate::prompt::confirmation_required;

/// Outcome of one `rule/add` submission. The duplicate-path conflict is an
/// ordinary value so the retry-with-the-remainder decision stays with the
/// caller instead of living in error-recovery control flow.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AddRulesOutcome {
    /// All submitted paths were accepted.
    Created(usize),
    /// The server rejected these paths as already carrying a matching rule.
    Conflict { existing: Vec<String> },
}

/// POST a filter to `rule/find` and parse the response. Shared with the
/// pipeline command.
pub(crate) async fn find_rules(
    ctx: &AppContext,
    filter: &RuleFilter,
) -> CliResult<FindRulesResponse> {
    let response = ctx.post_find("rule/find", filter).await?;
    if response.status().is_success() {
        response
            .json::<FindRulesResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse rule find response: {err}")))
    } else {
        Err(classify_problem(response).await)
    }
}

pub(crate) async fn handle_list_rule(ctx: &AppContext, args: ListRuleArgs) -> CliResult<()> {
    let filter = RuleFilter {
        paths: args.path.as_deref().map(expand_pattern),
        rule_type: args.rule_type.map(Into::into),
        group: args.group,
        expiry_date: args.expiry_date,
        comment: args.comment,
        licence_code: args.licence_code,
        category_tags: none_if_empty(args.category_tags),
        cascades: args.override_rules.then_some(true),
    };

    let response = find_rules(ctx, &filter).await?;
    render_find_rules(&response);
    Ok(())
}

pub(crate) async fn handle_add_rule(ctx: &AppContext, args: AddRuleArgs) -> CliResult<()> {
    let rule_type = RuleType::from(args.rule_type);
    if rule_type == RuleType::Group && args.group.is_none() {
        return Err(CliError::validation("Group rules must have a group (--group)"));
    }

    let paths = expand_pattern(&args.path);

    if args.check {
        println!("Existing rules for {}:", args.path);
        let preview = find_rules(
            ctx,
            &RuleFilter {
                paths: Some(paths.clone()),
                ..RuleFilter::default()
            },
        )
        .await?;
        render_find_rules(&preview);
    }

    if confirmation_required(paths.len(), args.check) {
        let message = format!("This will create {} rules. Do you want to continue?", paths.len());
        if !ctx.prompter.confirm(&message)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let request = AddRulesRequest {
        paths: paths.clone(),
        rule_type,
        group: args.group.clone(),
        expiry_date: args.expiry_date,
        comment: args.comment,
        licence_code: args.licence_code,
        cascades: args.override_rule,
    };

    match submit_add(ctx, &request).await? {
        AddRulesOutcome::Created(count) => {
            println!(
                "{}",
                created_message(count, &args.path, rule_type, args.group.as_deref())
            );
            Ok(())
        }
        AddRulesOutcome::Conflict { existing } => {
            println!("{} already exist:", existing.len());
            for path in &existing {
                println!(
                    "    {}",
                    rule_summary(path, rule_type, args.group.as_deref())
                );
            }

            let remaining: Vec<String> = paths
                .iter()
                .filter(|path| !existing.contains(*path))
                .cloned()
                .collect();
            if remaining.is_empty() {
                println!("Nothing left to create.");
                return Ok(());
            }

            let message = format!("Do you still want to create {} rules?", remaining.len());
            if !ctx.prompter.confirm(&message)? {
                println!("Aborted.");
                return Ok(());
            }

            let retry = AddRulesRequest {
                paths: remaining,
                ..request
            };
            match submit_add(ctx, &retry).await? {
                AddRulesOutcome::Created(count) => {
                    println!(
                        "{}",
                        created_message(count, &args.path, rule_type, args.group.as_deref())
                    );
                    Ok(())
                }
                AddRulesOutcome::Conflict { .. } => Err(CliError::failure(anyhow!(
                    "server still reports duplicates after removing {} known duplicate paths",
                    existing.len()
                ))),
            }
        }
    }
}

async fn submit_add(ctx: &AppContext, request: &AddRulesRequest) -> CliResult<AddRulesOutcome> {
    let response = ctx.post_mutation("rule/add", request).await?;
    let status = response.status();
    if status.is_success() {
        return Ok(AddRulesOutcome::Created(request.paths.len()));
    }

    let bytes = response.bytes().await.unwrap_or_default();
    if let Some(existing) = parse_add_conflicts(&request.paths, &bytes) {
        return Ok(AddRulesOutcome::Conflict { existing });
    }
    Err(problem_from_parts(status, &bytes))
}

fn created_message(count: usize, pattern: &str, rule_type: RuleType, group: Option<&str>) -> String {
    format!(
        "Successfully created {count} rules for {}",
        rule_summary(pattern, rule_type, group)
    )
}

fn rule_summary(path: &str, rule_type: RuleType, group: Option<&str>) -> String {
    if rule_type == RuleType::Group
        && let Some(group) = group
    {
        format!("{path} : {rule_type} : {group}")
    } else {
        format!("{path} : {rule_type}")
    }
}

pub(crate) async fn handle_update_rule(ctx: &AppContext, args: UpdateRuleArgs) -> CliResult<()> {
    let rule_type = args.rule_type.map(RuleType::from);
    if rule_type == Some(RuleType::Group) && args.group.is_none() {
        return Err(CliError::validation("Group rules must have a group (--group)"));
    }
    if let Some(kind) = rule_type
        && kind != RuleType::Group
        && args.group.is_some()
    {
        return Err(CliError::validation(
            "--group is only valid together with rule type G",
        ));
    }

    if args.check && args.path.is_none() {
        println!("No path given, nothing to preview");
    }
    if args.check
        && let Some(path) = &args.path
    {
        println!("Current rules for {path}:");
        let preview = find_rules(
            ctx,
            &RuleFilter {
                paths: Some(vec![path.clone()]),
                ..RuleFilter::default()
            },
        )
        .await?;
        render_find_rules(&preview);
    }

    let request = UpdateRuleRequest {
        rule_id: args.rule_id,
        path: args.path,
        rule_type,
        group: args.group,
        expiry_date: args.expiry_date,
        comment: args.comment,
        licence_code: args.licence_code,
    };

    let response = ctx.post_mutation("rule/update", &request).await?;
    if response.status().is_success() {
        println!("Successfully updated rule {}", args.rule_id);
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}

/// Lines shown before the removal confirmation. The rule list appears exactly
/// once; `--check` swaps the heading and moves the count after the list.
fn removal_preview(pattern: &str, rules: &[Rule], check: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if check {
        lines.push(format!("Matching rules for {pattern}:"));
    } else {
        lines.push(format!("This will delete {} rules:", rules.len()));
    }
    for rule in rules {
        lines.push(format!("    {}", rule_line(rule)));
    }
    if check {
        lines.push(format!("This will delete {} rules.", rules.len()));
    }
    lines
}

pub(crate) async fn handle_remove_rule(ctx: &AppContext, args: RemoveRuleArgs) -> CliResult<()> {
    let paths = expand_pattern(&args.path);
    let filter = RuleFilter {
        paths: Some(paths),
        rule_type: args.rule_type.map(Into::into),
        group: args.group,
        expiry_date: args.expiry_date,
        comment: args.comment,
        licence_code: args.licence_code,
        ..RuleFilter::default()
    };

    let found = find_rules(ctx, &filter).await?;
    // Only directly-matching rules are removed; inherited sub-rules belong to
    // their own paths and stay out of the preview.
    let direct = found.direct_rules();
    if direct.is_empty() {
        println!("There are no rules for {}", args.path);
        return Ok(());
    }

    for line in removal_preview(&args.path, &direct, args.check) {
        println!("{line}");
    }
    if !ctx.prompter.confirm("Do you want to continue?")? {
        println!("Aborted.");
        return Ok(());
    }

    let response = ctx.post_mutation("rule/remove", &filter).await?;
    if response.status().is_success() {
        println!("Deleted {} rules for {}", direct.len(), args.path);
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}
