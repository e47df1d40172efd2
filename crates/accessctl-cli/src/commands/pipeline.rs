//! Handler for `run-rules`: trigger the server-side pipeline per rule.

use accessctl_api_models::{RuleFilter, RunRuleRequest};
use anyhow::anyhow;

use crate::cli::RunRulesArgs;
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::commands::rules::find_rules;
use crate::output::print_rules;
use crate::paths::expand_pattern;
use crate::prompt::Prompter;

pub(crate) async fn handle_run_rules(ctx: &AppContext, args: RunRulesArgs) -> CliResult<()> {
    let filter = RuleFilter {
        paths: args.path.as_deref().map(expand_pattern),
        ..RuleFilter::default()
    };

    let found = find_rules(ctx, &filter).await?;
    let candidates = found.candidate_rules(args.sub_rules);
    if candidates.is_empty() {
        println!("No rules to run");
        return Ok(());
    }

    println!("This will run {} rules:", candidates.len());
    print_rules(&candidates);
    let prompter = if args.force {
        Prompter::Assume(true)
    } else {
        ctx.prompter
    };
    if !prompter.confirm("Do you want to continue?")? {
        println!("Aborted.");
        return Ok(());
    }

    // Strictly one call at a time; the batch aborts on the first failure and
    // already-run rules stay run.
    for rule in &candidates {
        let request = RunRuleRequest { rule_id: rule.id };
        let response = ctx.post_mutation("rule/run", &request).await?;
        if !response.status().is_success() {
            let problem = classify_problem(response).await;
            return Err(CliError::failure(anyhow!(
                "failed to run rule {} for {}: {}",
                rule.id,
                rule.path,
                problem.display_message()
            )));
        }
        tracing::debug!(rule_id = rule.id, path = %rule.path, "pipeline run complete");
    }

    println!("Successfully ran {} rules", candidates.len());
    Ok(())
}
