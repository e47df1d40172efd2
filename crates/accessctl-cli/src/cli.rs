//! Argument parsing and command dispatch for the accessctl CLI.

use accessctl_api_models::RuleType;
use accessctl_config::Settings;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::AppContext;
use crate::commands::{licences, pipeline, rules};
use crate::prompt::Prompter;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, executes the requested command against the
/// configured instructor server, and returns the process exit code.
pub async fn run(settings: Settings) -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);

    let ctx = match AppContext::new(
        settings.api_url,
        settings.token,
        cli.timeout,
        Prompter::Interactive,
    ) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    tracing::debug!(command = command_name, "dispatching");
    match dispatch(cli, &ctx).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, ctx: &AppContext) -> crate::client::CliResult<()> {
    match cli.command {
        Command::ListRule(args) => rules::handle_list_rule(ctx, args).await,
        Command::AddRule(args) => rules::handle_add_rule(ctx, args).await,
        Command::UpdateRule(args) => rules::handle_update_rule(ctx, args).await,
        Command::RemoveRule(args) => rules::handle_remove_rule(ctx, args).await,
        Command::RunRules(args) => pipeline::handle_run_rules(ctx, args).await,
        Command::ListLicence(args) => licences::handle_list_licence(ctx, args).await,
        Command::AddLicence(args) => licences::handle_add_licence(ctx, args).await,
        Command::RemoveLicence(args) => licences::handle_remove_licence(ctx, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "accessctl",
    about = "Command line client for the access instructor service"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ACCESSCTL_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List rules matching the given filters.
    ListRule(ListRuleArgs),
    /// Create rules for the given path pattern.
    AddRule(AddRuleArgs),
    /// Update one rule by its identifier.
    UpdateRule(UpdateRuleArgs),
    /// Remove rules matching the given filters.
    RemoveRule(RemoveRuleArgs),
    /// Run the server-side pipeline for matching rules.
    RunRules(RunRulesArgs),
    /// List licences matching the given filters.
    ListLicence(ListLicenceArgs),
    /// Create a licence.
    AddLicence(AddLicenceArgs),
    /// Remove licences matching the given filters.
    RemoveLicence(RemoveLicenceArgs),
}

/// Rule type as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RuleTypeArg {
    /// No access ("N").
    #[value(name = "N", alias = "n")]
    NoAccess,
    /// Public ("P").
    #[value(name = "P", alias = "p")]
    Public,
    /// Registered user ("R").
    #[value(name = "R", alias = "r")]
    RegisteredUser,
    /// Group ("G").
    #[value(name = "G", alias = "g")]
    Group,
}

impl From<RuleTypeArg> for RuleType {
    fn from(value: RuleTypeArg) -> Self {
        match value {
            RuleTypeArg::NoAccess => Self::NoAccess,
            RuleTypeArg::Public => Self::Public,
            RuleTypeArg::RegisteredUser => Self::RegisteredUser,
            RuleTypeArg::Group => Self::Group,
        }
    }
}

/// Validate an `--expiry-date` value as `YYYY-MM-DD` without pulling in a
/// calendar; the server owns the field.
pub(crate) fn parse_expiry_date(value: &str) -> Result<String, String> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, byte)| matches!(i, 4 | 7) || byte.is_ascii_digit());
    if shape_ok {
        Ok(value.to_string())
    } else {
        Err(format!("expiry date '{value}' must be YYYY-MM-DD"))
    }
}

#[derive(Args, Default)]
pub(crate) struct ListRuleArgs {
    #[arg(short = 'p', long = "path", help = "Path or glob pattern to look up")]
    pub(crate) path: Option<String>,
    #[arg(short = 't', long = "type", value_enum, help = "Rule type to filter on")]
    pub(crate) rule_type: Option<RuleTypeArg>,
    #[arg(short = 'g', long, help = "Group name to filter on")]
    pub(crate) group: Option<String>,
    #[arg(
        short = 'e',
        long,
        value_parser = parse_expiry_date,
        help = "Expiry date to filter on (YYYY-MM-DD)"
    )]
    pub(crate) expiry_date: Option<String>,
    #[arg(short = 'm', long, help = "Comment to filter on")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'l', long = "licence", help = "Licence code to filter on")]
    pub(crate) licence_code: Option<String>,
    #[arg(short = 'k', long = "licence-cat", help = "Licence category tag to filter on")]
    pub(crate) category_tags: Vec<String>,
    #[arg(
        short = 'o',
        long = "override",
        help = "Only rules cascading to subdirectories"
    )]
    pub(crate) override_rules: bool,
}

#[derive(Args)]
pub(crate) struct AddRuleArgs {
    #[arg(
        short = 'p',
        long = "path",
        help = "Path or glob pattern the rules will be applied to"
    )]
    pub(crate) path: String,
    #[arg(short = 't', long = "type", value_enum, help = "Rule type for the new rules")]
    pub(crate) rule_type: RuleTypeArg,
    #[arg(short = 'g', long, help = "Group name to be given access")]
    pub(crate) group: Option<String>,
    #[arg(
        short = 'e',
        long,
        value_parser = parse_expiry_date,
        help = "Date the rules expire on (YYYY-MM-DD)"
    )]
    pub(crate) expiry_date: Option<String>,
    #[arg(short = 'm', long, help = "Any comments to help traceability")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'l', long = "licence", help = "Code for the licence attached to the rules")]
    pub(crate) licence_code: Option<String>,
    #[arg(
        short = 'o',
        long = "override",
        help = "Cascade access down through subdirectories"
    )]
    pub(crate) override_rule: bool,
    #[arg(
        short = 'c',
        long,
        help = "Preview existing rules for the target paths before creating"
    )]
    pub(crate) check: bool,
}

#[derive(Args)]
pub(crate) struct UpdateRuleArgs {
    #[arg(help = "Identifier of the rule to update")]
    pub(crate) rule_id: u64,
    #[arg(short = 'p', long = "path", help = "New path for the rule")]
    pub(crate) path: Option<String>,
    #[arg(short = 't', long = "type", value_enum, help = "New rule type")]
    pub(crate) rule_type: Option<RuleTypeArg>,
    #[arg(short = 'g', long, help = "New group name")]
    pub(crate) group: Option<String>,
    #[arg(
        short = 'e',
        long,
        value_parser = parse_expiry_date,
        help = "New expiry date (YYYY-MM-DD)"
    )]
    pub(crate) expiry_date: Option<String>,
    #[arg(short = 'm', long, help = "New comment")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'l', long = "licence", help = "New licence code")]
    pub(crate) licence_code: Option<String>,
    #[arg(
        short = 'c',
        long,
        help = "Preview the current rules for the target path before updating"
    )]
    pub(crate) check: bool,
}

#[derive(Args)]
pub(crate) struct RemoveRuleArgs {
    #[arg(
        short = 'p',
        long = "path",
        help = "Path or glob pattern whose rules will be removed"
    )]
    pub(crate) path: String,
    #[arg(short = 't', long = "type", value_enum, help = "Rule type to filter on")]
    pub(crate) rule_type: Option<RuleTypeArg>,
    #[arg(short = 'g', long, help = "Group name to filter on")]
    pub(crate) group: Option<String>,
    #[arg(
        short = 'e',
        long,
        value_parser = parse_expiry_date,
        help = "Expiry date to filter on (YYYY-MM-DD)"
    )]
    pub(crate) expiry_date: Option<String>,
    #[arg(short = 'm', long, help = "Comment to filter on")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'l', long = "licence", help = "Licence code to filter on")]
    pub(crate) licence_code: Option<String>,
    #[arg(
        short = 'c',
        long,
        help = "Preview the matching rules before removing them"
    )]
    pub(crate) check: bool,
}

#[derive(Args, Default)]
pub(crate) struct RunRulesArgs {
    #[arg(
        short = 'p',
        long = "path",
        help = "Path or glob pattern whose rules will be run"
    )]
    pub(crate) path: Option<String>,
    #[arg(
        short = 's',
        long = "sub-rules",
        help = "Also run rules inherited from ancestor paths"
    )]
    pub(crate) sub_rules: bool,
    #[arg(short = 'f', long, help = "Skip the confirmation prompt")]
    pub(crate) force: bool,
}

#[derive(Args, Default)]
pub(crate) struct ListLicenceArgs {
    #[arg(short = 'c', long, help = "Licence code to filter on")]
    pub(crate) code: Option<String>,
    #[arg(short = 't', long, help = "Licence title to filter on")]
    pub(crate) title: Option<String>,
    #[arg(short = 'u', long, help = "Licence URL to filter on")]
    pub(crate) url: Option<String>,
    #[arg(short = 'k', long = "cat", help = "Licence category tag to filter on")]
    pub(crate) category_tags: Vec<String>,
}

#[derive(Args)]
pub(crate) struct AddLicenceArgs {
    #[arg(short = 'c', long, help = "Code abbreviation for the licence")]
    pub(crate) code: String,
    #[arg(short = 't', long, help = "Licence title")]
    pub(crate) title: Option<String>,
    #[arg(short = 'u', long, help = "Link to the licence text")]
    pub(crate) url: String,
    #[arg(short = 'm', long, help = "Any comments to help traceability")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'k', long = "cat", help = "Licence category tag")]
    pub(crate) category_tags: Vec<String>,
}

#[derive(Args, Default)]
pub(crate) struct RemoveLicenceArgs {
    #[arg(long, help = "Licence code to filter on")]
    pub(crate) code: Option<String>,
    #[arg(short = 't', long, help = "Licence title to filter on")]
    pub(crate) title: Option<String>,
    #[arg(short = 'u', long, help = "Licence URL to filter on")]
    pub(crate) url: Option<String>,
    #[arg(short = 'm', long, help = "Comment to filter on")]
    pub(crate) comment: Option<String>,
    #[arg(short = 'k', long = "cat", help = "Licence category tag to filter on")]
    pub(crate) category_tags: Vec<String>,
    #[arg(
        short = 'c',
        long,
        help = "Preview the matching licences before removing them"
    )]
    pub(crate) check: bool,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::ListRule(_) => "list_rule",
        Command::AddRule(_) => "add_rule",
        Command::UpdateRule(_) => "update_rule",
        Command::RemoveRule(_) => "remove_rule",
        Command::RunRules(_) => "run_rules",
        Command::ListLicence(_) => "list_licence",
        Command::AddLicence(_) => "add_licence",
        Command::RemoveLicence(_) => "remove_licence",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn expiry_date_accepts_iso_shape_only() {
        assert_eq!(
            parse_expiry_date("2026-02-01").as_deref(),
            Ok("2026-02-01")
        );
        assert!(parse_expiry_date("01-02-2026").is_err());
        assert!(parse_expiry_date("2026/02/01").is_err());
        assert!(parse_expiry_date("2026-2-1").is_err());
    }

    #[test]
    fn rule_type_arg_maps_to_wire_codes() {
        assert_eq!(RuleType::from(RuleTypeArg::NoAccess), RuleType::NoAccess);
        assert_eq!(RuleType::from(RuleTypeArg::Group), RuleType::Group);
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(
            command_label(&Command::ListRule(ListRuleArgs::default())),
            "list_rule"
        );
        assert_eq!(
            command_label(&Command::RunRules(RunRulesArgs::default())),
            "run_rules"
        );
    }
}
