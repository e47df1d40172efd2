//! Handlers for the licence commands: list, add, remove.

use accessctl_api_models::{AddLicenceRequest, Licence, LicenceFilter};
use anyhow::anyhow;

use crate::cli::{AddLicenceArgs, ListLicenceArgs, RemoveLicenceArgs};
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::commands::none_if_empty;
use crate::output::{licence_line, render_licences};

async fn find_licences(ctx: &AppContext, filter: &LicenceFilter) -> CliResult<Vec<Licence>> {
    let response = ctx.post_find("licence/find", filter).await?;
    if response.status().is_success() {
        response.json::<Vec<Licence>>().await.map_err(|err| {
            CliError::failure(anyhow!("failed to parse licence find response: {err}"))
        })
    } else {
        Err(classify_problem(response).await)
    }
}

pub(crate) async fn handle_list_licence(ctx: &AppContext, args: ListLicenceArgs) -> CliResult<()> {
    let filter = LicenceFilter {
        code: args.code,
        title: args.title,
        url: args.url,
        comment: None,
        category_tags: none_if_empty(args.category_tags),
    };
    let licences = find_licences(ctx, &filter).await?;
    render_licences(&licences);
    Ok(())
}

pub(crate) async fn handle_add_licence(ctx: &AppContext, args: AddLicenceArgs) -> CliResult<()> {
    if args.code.trim().is_empty() {
        return Err(CliError::validation("licence code must not be empty"));
    }
    if args.url.trim().is_empty() {
        return Err(CliError::validation("licence url must not be empty"));
    }

    let request = AddLicenceRequest {
        code: args.code.clone(),
        title: args.title.clone(),
        url: args.url,
        comment: args.comment,
        category_tags: args.category_tags,
    };

    let response = ctx.post_mutation("licence/add", &request).await?;
    if response.status().is_success() {
        match &args.title {
            Some(title) => println!("Successfully created licence {} : {title}", args.code),
            None => println!("Successfully created licence {}", args.code),
        }
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}

pub(crate) async fn handle_remove_licence(
    ctx: &AppContext,
    args: RemoveLicenceArgs,
) -> CliResult<()> {
    let filter = LicenceFilter {
        code: args.code,
        title: args.title,
        url: args.url,
        comment: args.comment,
        category_tags: none_if_empty(args.category_tags),
    };

    let licences = find_licences(ctx, &filter).await?;
    if licences.is_empty() {
        println!("There are no matching licences");
        return Ok(());
    }

    if args.check {
        println!("Matching licences:");
        for licence in &licences {
            println!("    {}", licence_line(licence));
        }
    }

    println!("This will delete {} licences:", licences.len());
    for licence in &licences {
        println!("    {}", licence_line(licence));
    }
    if !ctx.prompter.confirm("Do you want to continue?")? {
        println!("Aborted.");
        return Ok(());
    }

    let response = ctx.post_mutation("licence/remove", &filter).await?;
    if response.status().is_success() {
        println!("Deleted {} licences", licences.len());
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Prompter;
    use httpmock::prelude::*;
    use serde_json::json;

    fn context(server: &MockServer, prompter: Prompter) -> AppContext {
        AppContext::new(
            server.base_url().parse().expect("valid URL"),
            "secret".to_string(),
            10,
            prompter,
        )
        .expect("context")
    }

    #[tokio::test]
    async fn add_licence_posts_the_full_record_with_auth() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/licence/add")
                .header("Authorization", "Token secret")
                .json_body(json!({
                    "code": "ccby",
                    "title": "CC BY 4.0",
                    "url": "https://creativecommons.org/licenses/by/4.0/",
                    "comment": null,
                    "category_tags": ["open"]
                }));
            then.status(201).json_body(json!({}));
        });

        let ctx = context(&server, Prompter::Assume(true));
        let args = AddLicenceArgs {
            code: "ccby".to_string(),
            title: Some("CC BY 4.0".to_string()),
            url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            comment: None,
            category_tags: vec!["open".to_string()],
        };
        handle_add_licence(&ctx, args).await.expect("add licence");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_licence_rejects_a_blank_code_locally() {
        let server = MockServer::start_async().await;
        let ctx = context(&server, Prompter::Assume(true));
        let args = AddLicenceArgs {
            code: "  ".to_string(),
            title: None,
            url: "https://example.org/licence".to_string(),
            comment: None,
            category_tags: Vec::new(),
        };
        let err = handle_add_licence(&ctx, args)
            .await
            .expect_err("blank code should fail");
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_licence_previews_and_confirms_before_mutating() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/licence/find")
                .json_body(json!({"category_tags": ["open"]}));
            then.status(200).json_body(json!([
                {"code": "ccby", "title": "CC BY 4.0", "url": "https://example.org", "category_tags": ["open"]}
            ]));
        });
        let remove = server.mock(|when, then| {
            when.method(POST)
                .path("/licence/remove")
                .header("Authorization", "Token secret")
                .json_body(json!({"category_tags": ["open"]}));
            then.status(200).json_body(json!({}));
        });

        let ctx = context(&server, Prompter::Assume(true));
        let args = RemoveLicenceArgs {
            category_tags: vec!["open".to_string()],
            ..RemoveLicenceArgs::default()
        };
        handle_remove_licence(&ctx, args).await.expect("remove");
        remove.assert_async().await;
    }

    #[tokio::test]
    async fn remove_licence_stops_cleanly_on_empty_result() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/licence/find");
            then.status(200).json_body(json!([]));
        });
        let remove = server.mock(|when, then| {
            when.method(POST).path("/licence/remove");
            then.status(200);
        });

        let ctx = context(&server, Prompter::Assume(true));
        handle_remove_licence(&ctx, RemoveLicenceArgs::default())
            .await
            .expect("clean exit");
        assert_eq!(remove.calls_async().await, 0);
    }

    #[tokio::test]
    async fn list_licence_renders_whatever_the_server_returns() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/licence/find").json_body(json!({}));
            then.status(200).json_body(json!([
                {"code": "ccby", "title": "CC BY 4.0", "url": "https://example.org"}
            ]));
        });

        let ctx = context(&server, Prompter::Assume(true));
        handle_list_licence(&ctx, ListLicenceArgs::default())
            .await
            .expect("list");
        mock.assert_async().await;
    }
}
