mod common;

use common::{autocomplete, invoke, invoke_kind, setup, watcher, PlatformCall, Recorder};
use switchboard_framework::{
    current_module,
    events::{
        APPLICATION_INTERACTION_ERROR, AUTOCOMPLETE_INTERACTION_ERROR, EVENT_SKIPPED,
        FRAMEWORK_ERROR, FRAMEWORK_WARN, RUN_MODULE,
    },
    guards, handler_func, AutocompleteContext, AutocompleteValue, CommandContext,
    ContextMenuCommandBuilder, Error, GuardError, HandlerBuilder as _, Node, SlashCommandBuilder,
    SlashOption, SubcommandBuilder, SubcommandGroupBuilder,
};
use twilight_model::{
    application::command::{
        CommandOptionChoice, CommandOptionChoiceValue, CommandOptionType, CommandType,
    },
    guild::Permissions,
    http::interaction::InteractionResponseType,
};
use twilight_util::builder::command::{IntegerBuilder, StringBuilder};

const NOTICES: &[&str] = &[
    RUN_MODULE,
    EVENT_SKIPPED,
    APPLICATION_INTERACTION_ERROR,
    AUTOCOMPLETE_INTERACTION_ERROR,
    FRAMEWORK_ERROR,
    FRAMEWORK_WARN,
];

fn record_run(ctx: &CommandContext<Recorder>) {
    let current = current_module().map(|module| module.qualified_name().to_string());
    assert_eq!(current.as_deref(), Some(ctx.module.qualified_name()));

    ctx.services
        .push(format!("run: {}", ctx.module.qualified_name()));
}

async fn ping(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    record_run(&ctx);
    ctx.reply("pong").await
}

async fn record(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    record_run(&ctx);
    Ok(())
}

async fn refuse(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    record_run(&ctx);
    Err("refused".into())
}

async fn guarded(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    record_run(&ctx);
    Err(GuardError::new("Not allowed").into())
}

async fn needs_ban(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    guards::has_permissions(&ctx.interaction.meta, Permissions::BAN_MEMBERS)?;
    record_run(&ctx);
    Ok(())
}

async fn defer_then_fail(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    ctx.defer().await?;
    Err("failed after deferring".into())
}

async fn inspect(ctx: CommandContext<Recorder>) -> Result<(), Error> {
    record_run(&ctx);
    ctx.services.push(format!(
        "target: {:?}",
        ctx.interaction.target_id.map(|id| id.get())
    ));
    Ok(())
}

async fn complete_count(
    ctx: AutocompleteContext<Recorder>,
) -> Result<Vec<CommandOptionChoice>, Error> {
    ctx.services.push(format!("complete: {} {:?}", ctx.name, ctx.value));

    let AutocompleteValue::Integer(value) = ctx.value else {
        return Err("expected an integer".into());
    };

    Ok((1..=3)
        .map(|n| CommandOptionChoice {
            name: (value * n).to_string(),
            name_localizations: None,
            value: CommandOptionChoiceValue::Integer(value * n),
        })
        .collect())
}

async fn complete_any(
    ctx: AutocompleteContext<Recorder>,
) -> Result<Vec<CommandOptionChoice>, Error> {
    ctx.services.push(format!(
        "complete any: {} in {}",
        ctx.name,
        ctx.module.qualified_name()
    ));

    Ok(vec![CommandOptionChoice {
        name: "anything".into(),
        name_localizations: None,
        value: CommandOptionChoiceValue::String("anything".into()),
    }])
}

fn user_command() -> SlashCommandBuilder<Recorder> {
    let kick = SubcommandBuilder::new("kick", "Kick a user")
        .run(handler_func!(record))
        .build()
        .unwrap();
    let admin = SubcommandGroupBuilder::new("admin", "Admin commands")
        .option(kick)
        .run(handler_func!(record))
        .build()
        .unwrap();

    SlashCommandBuilder::new("user", "User commands").option(admin)
}

#[tokio::test]
async fn ping_replies_pong_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            SlashCommandBuilder::new("ping", "Ping!")
                .run(handler_func!(ping))
                .build()
                .unwrap()
                .into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client.handle_interaction(invoke("ping", None, None)).await;

    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ChannelMessageWithSource,
            content: Some("pong".into()),
            ephemeral: false,
            choices: Vec::new(),
        }]
    );
    assert_eq!(recorder.entries(), vec!["run_module: ping", "run: ping"]);
}

#[tokio::test]
async fn run_order_test() {
    let (client, _platform, recorder) = setup();
    client
        .add_modules([user_command().run(handler_func!(record)).build().unwrap()])
        .await
        .unwrap();

    client
        .handle_interaction(invoke("user", Some("admin"), Some("kick")))
        .await;

    assert_eq!(
        recorder.with_prefix("run:"),
        vec!["run: user", "run: user/admin", "run: user/admin/kick"]
    );
}

#[tokio::test]
async fn throwing_run_stops_descendants_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            user_command().run(handler_func!(refuse)).build().unwrap().into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client
        .handle_interaction(invoke("user", Some("admin"), Some("kick")))
        .await;

    assert_eq!(recorder.with_prefix("run:"), vec!["run: user"]);
    assert_eq!(
        recorder.with_prefix(APPLICATION_INTERACTION_ERROR),
        vec!["application_interaction_error: user"]
    );
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ChannelMessageWithSource,
            content: Some(
                ":warning: An unexpected error occurred while running this command, please try again later.\nrefused"
                    .into()
            ),
            ephemeral: true,
            choices: Vec::new(),
        }]
    );
}

#[tokio::test]
async fn unknown_routing_is_fatal_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            user_command().build().unwrap().into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client
        .handle_interaction(invoke("user", None, Some("ban")))
        .await;
    client
        .handle_interaction(invoke("user", Some("moderator"), Some("kick")))
        .await;

    assert!(recorder.with_prefix("run:").is_empty());
    assert_eq!(recorder.with_prefix(FRAMEWORK_ERROR).len(), 2);
    assert!(recorder.with_prefix(APPLICATION_INTERACTION_ERROR).is_empty());
    assert_eq!(platform.calls().len(), 2);
}

#[tokio::test]
async fn guard_error_is_shown_verbatim_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            SlashCommandBuilder::new("secret", "Secret stuff")
                .run(handler_func!(guarded))
                .build()
                .unwrap()
                .into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client.handle_interaction(invoke("secret", None, None)).await;

    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ChannelMessageWithSource,
            content: Some(":warning: Not allowed".into()),
            ephemeral: true,
            choices: Vec::new(),
        }]
    );
    assert!(recorder.with_prefix(APPLICATION_INTERACTION_ERROR).is_empty());
    assert!(recorder.with_prefix(FRAMEWORK_ERROR).is_empty());
}

#[tokio::test]
async fn permission_guard_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([SlashCommandBuilder::new("ban", "Ban a user")
            .run(handler_func!(needs_ban))
            .build()
            .unwrap()])
        .await
        .unwrap();

    client.handle_interaction(invoke("ban", None, None)).await;

    assert!(recorder.with_prefix("run:").is_empty());
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ChannelMessageWithSource,
            content: Some(
                ":warning: You need the following permissions to use this command: BAN_MEMBERS"
                    .into()
            ),
            ephemeral: true,
            choices: Vec::new(),
        }]
    );
}

#[tokio::test]
async fn deferred_error_reply_retries_once_test() {
    let (client, platform, _recorder) = setup();
    client
        .add_modules([SlashCommandBuilder::new("slow", "Takes a while")
            .run(handler_func!(defer_then_fail))
            .build()
            .unwrap()])
        .await
        .unwrap();
    platform.fail_next_updates(1);

    client.handle_interaction(invoke("slow", None, None)).await;

    let calls = platform.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(
        &calls[0],
        PlatformCall::Response { kind: InteractionResponseType::DeferredChannelMessageWithSource, .. }
    ));
    assert_eq!(calls[1], calls[2]);
    assert!(matches!(
        &calls[2],
        PlatformCall::Update(content) if content.ends_with("failed after deferring")
    ));
}

#[tokio::test]
async fn unknown_command_warns_test() {
    let (client, platform, recorder) = setup();
    client.add_modules([watcher(NOTICES)]).await.unwrap();
    recorder.clear();

    client.handle_interaction(invoke("missing", None, None)).await;

    assert_eq!(
        recorder.entries(),
        vec!["framework_warn: No handler registered for command missing"]
    );
    assert!(platform.calls().is_empty());

    // autocomplete always gets an answer so the user isn't left waiting
    client
        .handle_interaction(autocomplete(
            "missing",
            None,
            None,
            "text",
            "",
            CommandOptionType::String,
        ))
        .await;
    assert_eq!(
        platform.choice_names(),
        vec![vec!["No module registered for this interaction".to_string()]]
    );
    assert!(matches!(
        platform.calls().last(),
        Some(PlatformCall::Response { choices, .. }) if choices == &vec!["ERROR".to_string()]
    ));
}

#[tokio::test]
async fn context_menu_test() {
    let (client, _platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            ContextMenuCommandBuilder::user("Inspect")
                .run(handler_func!(inspect))
                .build()
                .unwrap()
                .into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client
        .handle_interaction(invoke_kind("Inspect", CommandType::User))
        .await;
    assert_eq!(
        recorder.entries(),
        vec!["run_module: Inspect", "run: Inspect", "target: Some(300)"]
    );

    // a message command invocation can't be handled by a user command
    recorder.clear();
    client
        .handle_interaction(invoke_kind("Inspect", CommandType::Message))
        .await;
    assert!(recorder.with_prefix("run:").is_empty());
    assert_eq!(recorder.with_prefix(FRAMEWORK_WARN).len(), 1);
}

fn search_command() -> SlashCommandBuilder<Recorder> {
    SlashCommandBuilder::new("search", "Search")
        .option(SlashOption::autocomplete(
            IntegerBuilder::new("count", "How many").build(),
            handler_func!(complete_count),
        ))
        .option(StringBuilder::new("query", "What to look for").build())
        .run(handler_func!(record))
}

#[tokio::test]
async fn autocomplete_dedicated_handler_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([search_command().build().unwrap()])
        .await
        .unwrap();

    client
        .handle_interaction(autocomplete(
            "search",
            None,
            None,
            "count",
            "2",
            CommandOptionType::Integer,
        ))
        .await;

    assert_eq!(recorder.entries(), vec!["complete: count Integer(2)"]);
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
            content: None,
            ephemeral: false,
            choices: vec!["2".into(), "4".into(), "6".into()],
        }]
    );
}

#[tokio::test]
async fn autocomplete_type_mismatch_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([
            Node::from(watcher(NOTICES)),
            search_command().build().unwrap().into(),
        ])
        .await
        .unwrap();
    recorder.clear();

    client
        .handle_interaction(autocomplete(
            "search",
            None,
            None,
            "count",
            "abc",
            CommandOptionType::String,
        ))
        .await;

    assert!(recorder.with_prefix("complete").is_empty());
    assert_eq!(
        recorder.with_prefix(AUTOCOMPLETE_INTERACTION_ERROR),
        vec!["autocomplete_interaction_error: search"]
    );
    assert_eq!(
        platform.calls(),
        vec![PlatformCall::Response {
            kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
            content: None,
            ephemeral: false,
            choices: vec!["ERROR".into()],
        }]
    );
    assert_eq!(
        platform.choice_names(),
        vec![vec![
            "An error occurred while handling autocomplete for search".to_string()
        ]]
    );
}

#[tokio::test]
async fn autocomplete_catch_all_test() {
    let (client, platform, recorder) = setup();
    let find = SubcommandBuilder::new("find", "Find something")
        .option(StringBuilder::new("name", "Name").autocomplete(true).build())
        .run(handler_func!(record))
        .autocomplete(handler_func!(complete_any))
        .build()
        .unwrap();
    client
        .add_modules([
            Node::from(search_command().build().unwrap()),
            SlashCommandBuilder::new("lookup", "Look things up")
                .option(find)
                .build()
                .unwrap()
                .into(),
        ])
        .await
        .unwrap();

    // no dedicated handler and no catch-all, nothing is sent
    client
        .handle_interaction(autocomplete(
            "search",
            None,
            None,
            "query",
            "abc",
            CommandOptionType::String,
        ))
        .await;
    assert!(platform.calls().is_empty());

    client
        .handle_interaction(autocomplete(
            "lookup",
            None,
            Some("find"),
            "name",
            "ab",
            CommandOptionType::String,
        ))
        .await;
    assert_eq!(recorder.entries(), vec!["complete any: name in lookup/find"]);
    assert_eq!(platform.calls().len(), 1);
}

fn manage_command() -> SlashCommandBuilder<Recorder> {
    let kick = SubcommandBuilder::new("kick", "Kick a user")
        .option(SlashOption::autocomplete(
            IntegerBuilder::new("count", "How many").build(),
            handler_func!(complete_count),
        ))
        .option(StringBuilder::new("reason", "Why").autocomplete(true).build())
        .run(handler_func!(record))
        .autocomplete(handler_func!(complete_any))
        .build()
        .unwrap();
    let admin = SubcommandGroupBuilder::new("admin", "Admin commands")
        .option(kick)
        .build()
        .unwrap();
    let find = SubcommandBuilder::new("find", "Find something")
        .option(StringBuilder::new("name", "Name").autocomplete(true).build())
        .run(handler_func!(record))
        .autocomplete(handler_func!(complete_any))
        .build()
        .unwrap();

    SlashCommandBuilder::new("manage", "Manage things")
        .option(admin)
        .option(find)
        .run(handler_func!(record))
        .autocomplete(handler_func!(complete_any))
}

#[tokio::test]
async fn autocomplete_group_delegation_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([manage_command().build().unwrap()])
        .await
        .unwrap();

    client
        .handle_interaction(autocomplete(
            "manage",
            Some("admin"),
            Some("kick"),
            "count",
            "3",
            CommandOptionType::Integer,
        ))
        .await;
    client
        .handle_interaction(autocomplete(
            "manage",
            Some("admin"),
            Some("kick"),
            "reason",
            "sp",
            CommandOptionType::String,
        ))
        .await;

    assert_eq!(
        recorder.entries(),
        vec![
            "complete: count Integer(3)",
            "complete any: reason in manage/admin/kick",
        ]
    );
    assert!(matches!(
        platform.calls().first(),
        Some(PlatformCall::Response { choices, .. })
            if choices == &vec!["3".to_string(), "6".into(), "9".into()]
    ));
    assert_eq!(platform.calls().len(), 2);
}

#[tokio::test]
async fn autocomplete_unknown_group_test() {
    let (client, platform, recorder) = setup();
    client
        .add_modules([manage_command().build().unwrap()])
        .await
        .unwrap();

    // falls through to the top-level subcommand
    client
        .handle_interaction(autocomplete(
            "manage",
            Some("missing"),
            Some("find"),
            "name",
            "ab",
            CommandOptionType::String,
        ))
        .await;
    // and then to the command itself
    client
        .handle_interaction(autocomplete(
            "manage",
            Some("missing"),
            Some("kick"),
            "reason",
            "ab",
            CommandOptionType::String,
        ))
        .await;

    assert_eq!(
        recorder.entries(),
        vec![
            "complete any: name in manage/find",
            "complete any: reason in manage",
        ]
    );
    assert_eq!(platform.calls().len(), 2);
}
