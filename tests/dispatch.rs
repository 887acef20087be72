//! Integration tests for end-to-end dispatch: prefix gating, tree walking,
//! overload resolution, mention pre-fetching and failure reporting.

mod common;

use common::{
    Calls, build_service, build_service_with, directory, dispatch, dispatch_message,
};
use relaybot::commands::{
    Arg, Arguments, Command, CommandFailure, CommandTree, Configuration, ConvertContext, Converted,
    Converter, DispatchOutcome, FailureKind, Group, Invocation, handler_fn,
};
use relaybot::error::{ConvertError, HandlerError};
use relaybot_model::{Channel, Member, MentionKind, Mentions, MessageCreated};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn expect_failure(outcome: Result<DispatchOutcome, HandlerError>) -> CommandFailure {
    match outcome {
        Ok(DispatchOutcome::Failed(failure)) => failure,
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_messages_without_prefix_are_ignored() {
    let dir = directory();
    let calls = Calls::new();
    let tree = CommandTree::builder()
        .command(Command::new("ping", calls.handler("ping")))
        .build()
        .unwrap();
    let service = build_service(tree, &dir);
    let mut failures = service.subscribe_failures();

    let (outcome, replies) = dispatch(&service, &dir, "ping").await;
    assert_eq!(outcome.unwrap(), DispatchOutcome::Ignored);
    assert!(replies.is_empty());
    assert!(calls.labels().is_empty());
    assert!(failures.try_recv().is_err());

    let (outcome, _) = dispatch(&service, &dir, "/ping").await;
    assert_eq!(
        outcome.unwrap(),
        DispatchOutcome::Invoked {
            path: vec!["ping".to_string()]
        }
    );
    assert_eq!(calls.labels(), vec!["ping"]);
}

#[tokio::test]
async fn test_rest_token_list() {
    let dir = directory();
    let tree = CommandTree::builder()
        .command(
            Command::new(
                "say",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let words = args.require::<Vec<String>>("words")?;
                    inv.reply(words.join("|")).await
                }),
            )
            .arg(Arg::rest::<Vec<String>>("words")),
        )
        .build()
        .unwrap();
    let service = build_service(tree, &dir);

    let (_, replies) = dispatch(&service, &dir, "/say one two three").await;
    assert_eq!(replies[0].content, "one|two|three");

    let (_, replies) = dispatch(&service, &dir, "/say").await;
    assert_eq!(replies[0].content, "");
}

#[tokio::test]
async fn test_rest_string_keeps_text_verbatim() {
    let dir = directory();
    let calls = Calls::new();
    let tree = CommandTree::builder()
        .command(
            Command::new("note", calls.handler("note"))
                .arg(Arg::new::<i64>("id"))
                .arg(Arg::rest::<String>("text")),
        )
        .build()
        .unwrap();
    let service = build_service(tree, &dir);

    dispatch(&service, &dir, "/note 7 keep   these  gaps").await.0.unwrap();
    assert_eq!(
        calls.all(),
        vec![("note".to_string(), "7 keep   these  gaps".to_string())]
    );
}

fn shadowed_tree(calls: &Calls, group_first: bool) -> CommandTree {
    let leaf = Command::new("role", calls.handler("leaf")).arg(Arg::rest::<String>("text"));
    let group = Group::new("role").command(Command::new("list", calls.handler("list")));
    let builder = CommandTree::builder();
    let builder = if group_first {
        builder.group(group).command(leaf)
    } else {
        builder.command(leaf).group(group)
    };
    builder.build().unwrap()
}

#[tokio::test]
async fn test_group_shadows_leaf_in_any_order() {
    for group_first in [false, true] {
        let dir = directory();
        let calls = Calls::new();
        let service = build_service(shadowed_tree(&calls, group_first), &dir);

        let (outcome, _) = dispatch(&service, &dir, "/role list").await;
        assert_eq!(
            outcome.unwrap(),
            DispatchOutcome::Invoked {
                path: vec!["role".to_string(), "list".to_string()]
            }
        );
        assert_eq!(calls.labels(), vec!["list"]);

        // The leaf would accept an empty rest, but the group wins.
        let failure = expect_failure(dispatch(&service, &dir, "/role").await.0);
        assert_eq!(failure.kind, FailureKind::Unspecified);
        assert_eq!(failure.command_name, "role");
        assert_eq!(calls.labels(), vec!["list"]);
    }
}

#[tokio::test]
async fn test_first_converting_overload_wins() {
    for int_first in [true, false] {
        let dir = directory();
        let calls = Calls::new();
        let int = Command::new("pick", calls.handler("int")).arg(Arg::new::<i64>("value"));
        let text = Command::new("pick", calls.handler("text")).arg(Arg::new::<String>("value"));
        let tree = if int_first {
            CommandTree::builder().command(int).command(text)
        } else {
            CommandTree::builder().command(text).command(int)
        }
        .build()
        .unwrap();
        let service = build_service(tree, &dir);

        dispatch(&service, &dir, "/pick 5").await.0.unwrap();
        let expected = if int_first { "int" } else { "text" };
        assert_eq!(calls.labels(), vec![expected]);

        // Only the string overload converts a word.
        dispatch(&service, &dir, "/pick five").await.0.unwrap();
        assert_eq!(calls.labels(), vec![expected, "text"]);
    }
}

#[tokio::test]
async fn test_bad_arguments_lists_every_candidate() {
    let dir = directory();
    let calls = Calls::new();
    let tree = CommandTree::builder()
        .command(
            Command::new("add", calls.handler("int"))
                .arg(Arg::new::<i64>("a"))
                .arg(Arg::new::<i64>("b")),
        )
        .command(
            Command::new("add", calls.handler("float"))
                .arg(Arg::new::<f64>("a"))
                .arg(Arg::new::<f64>("b")),
        )
        .build()
        .unwrap();
    let service = build_service(tree, &dir);

    let failure = expect_failure(dispatch(&service, &dir, "/add 1 x").await.0);
    assert_eq!(failure.command_name, "add");
    assert_eq!(failure.raw_arguments, "1 x");
    let FailureKind::BadArguments(candidates) = failure.kind else {
        panic!("expected bad arguments");
    };
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].usage, "add <a> <b>");
    assert_eq!(candidates[0].argument.position, 1);
    assert_eq!(candidates[1].argument.argument.as_deref(), Some("b"));
    assert!(calls.labels().is_empty());
}

struct Marker;

struct MarkerConverter(Arc<AtomicUsize>);

impl Converter for MarkerConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let (token, remaining) = cx.tokenizer.next_token(text).ok_or(ConvertError::Empty)?;
        Ok(Converted::new(Marker, token, remaining))
    }
}

#[tokio::test]
async fn test_arity_mismatch_skips_conversion() {
    let dir = directory();
    let calls = Calls::new();
    let converted = Arc::new(AtomicUsize::new(0));
    let config = Configuration::builder()
        .prefix("/")
        .converter::<Marker>(MarkerConverter(Arc::clone(&converted)))
        .build();
    let tree = CommandTree::builder()
        .command(Command::new("mark", calls.handler("mark")).arg(Arg::new::<Marker>("p")))
        .build()
        .unwrap();
    let service = build_service_with(config, tree, &dir);

    for text in ["/mark", "/mark a b"] {
        let failure = expect_failure(dispatch(&service, &dir, text).await.0);
        assert_eq!(failure.kind, FailureKind::BadArgumentCount);
    }
    assert_eq!(converted.load(Ordering::SeqCst), 0);

    dispatch(&service, &dir, "/mark a").await.0.unwrap();
    assert_eq!(converted.load(Ordering::SeqCst), 1);
    assert_eq!(calls.labels(), vec!["mark"]);
}

fn whois_tree(calls: &Calls) -> CommandTree {
    CommandTree::builder()
        .command(Command::new("whois", calls.handler("whois")).arg(Arg::new::<Member>("member")))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_mention_spanning_separators() {
    let dir = directory();
    let calls = Calls::new();
    let service = build_service(whois_tree(&calls), &dir);

    dispatch(&service, &dir, "/whois @Mary Ann").await.0.unwrap();
    assert_eq!(
        calls.all(),
        vec![("whois".to_string(), "@Mary Ann".to_string())]
    );
}

#[tokio::test]
async fn test_mention_must_end_on_boundary() {
    let dir = directory();
    let calls = Calls::new();
    let service = build_service(whois_tree(&calls), &dir);

    // Only `Jo` is referenced; `@John` must not match it.
    let message = Arc::new(
        MessageCreated::new("m1", "c1", "u9", "/whois @John")
            .with_mentions(Mentions::default().with_user("u3")),
    );
    let failure = expect_failure(dispatch_message(&service, message).await.0);
    let FailureKind::BadArguments(candidates) = failure.kind else {
        panic!("expected bad arguments");
    };
    assert!(matches!(
        candidates[0].argument.error,
        ConvertError::UnknownMention { .. }
    ));
    assert!(calls.labels().is_empty());
}

#[tokio::test]
async fn test_prefetch_bounded_by_needs() {
    let dir = directory();
    let calls = Calls::new();
    let service = build_service(whois_tree(&calls), &dir);

    let failure = expect_failure(
        dispatch(&service, &dir, "/whois @alice @John @mods #general")
            .await
            .0,
    );
    assert!(matches!(failure.kind, FailureKind::BadArguments(_)));
    assert_eq!(dir.lookups(MentionKind::Member), 1);
    assert_eq!(dir.lookups(MentionKind::Role), 0);
    assert_eq!(dir.lookups(MentionKind::Channel), 0);
}

#[tokio::test]
async fn test_prefetch_shared_by_overloads() {
    let dir = directory();
    let calls = Calls::new();
    let tree = CommandTree::builder()
        .command(
            Command::new("grant", calls.handler("count"))
                .arg(Arg::new::<Member>("member"))
                .arg(Arg::new::<i64>("count")),
        )
        .command(
            Command::new("grant", calls.handler("reason"))
                .arg(Arg::new::<Member>("member"))
                .arg(Arg::new::<String>("reason")),
        )
        .build()
        .unwrap();
    let service = build_service(tree, &dir);

    dispatch(&service, &dir, "/grant @alice thanks").await.0.unwrap();
    assert_eq!(calls.labels(), vec!["reason"]);
    assert_eq!(dir.lookups(MentionKind::Member), 1);
}

#[tokio::test]
async fn test_channel_and_rest() {
    let dir = directory();
    let tree = CommandTree::builder()
        .command(
            Command::new(
                "topic",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let channel = args.require::<Channel>("channel")?;
                    let topic = args.require::<String>("topic")?;
                    inv.reply(format!("{}={}", channel.name, topic)).await
                }),
            )
            .arg(Arg::new::<Channel>("channel"))
            .arg(Arg::rest::<String>("topic")),
        )
        .build()
        .unwrap();
    let service = build_service(tree, &dir);

    let (_, replies) = dispatch(&service, &dir, "/topic #general ship it").await;
    assert_eq!(replies[0].content, "general=ship it");
    assert_eq!(dir.lookups(MentionKind::Channel), 1);
}

fn config_group(calls: &Calls, index: bool, unknown: bool) -> CommandTree {
    let mut group = Group::new("cfg")
        .alias("c")
        .command(Command::new("get", calls.handler("get")).arg(Arg::new::<String>("key")));
    if index {
        group = group.index(calls.fallback("index"));
    }
    if unknown {
        group = group.unknown(calls.fallback("unknown"));
    }
    CommandTree::builder().group(group).build().unwrap()
}

#[tokio::test]
async fn test_group_fallbacks() {
    let dir = directory();

    let calls = Calls::new();
    let service = build_service(config_group(&calls, true, true), &dir);
    dispatch(&service, &dir, "/cfg").await.0.unwrap();
    dispatch(&service, &dir, "/c what  else").await.0.unwrap();
    dispatch(&service, &dir, "/cfg get color").await.0.unwrap();
    assert_eq!(
        calls.all(),
        vec![
            ("index".to_string(), String::new()),
            ("unknown".to_string(), "what  else".to_string()),
            ("get".to_string(), "color".to_string()),
        ]
    );

    // Without an index the unknown handler also covers the bare group.
    let calls = Calls::new();
    let service = build_service(config_group(&calls, false, true), &dir);
    dispatch(&service, &dir, "/cfg").await.0.unwrap();
    assert_eq!(calls.labels(), vec!["unknown"]);

    // A known sub-command with bad arguments is not sent to the fallback.
    let failure = expect_failure(dispatch(&service, &dir, "/cfg get").await.0);
    assert_eq!(failure.kind, FailureKind::BadArgumentCount);
    assert_eq!(failure.command_name, "cfg get");
}

#[tokio::test]
async fn test_group_without_fallbacks() {
    let dir = directory();
    let calls = Calls::new();
    let service = build_service(config_group(&calls, false, false), &dir);

    let failure = expect_failure(dispatch(&service, &dir, "/cfg").await.0);
    assert_eq!(failure.kind, FailureKind::Unspecified);

    let failure = expect_failure(dispatch(&service, &dir, "/cfg set color red").await.0);
    assert_eq!(failure.kind, FailureKind::NoCommandFound);
    assert_eq!(failure.command_name, "cfg set");
    assert_eq!(failure.raw_arguments, "color red");

    let failure = expect_failure(dispatch(&service, &dir, "/nope 1 2").await.0);
    assert_eq!(failure.kind, FailureKind::NoCommandFound);
    assert_eq!(failure.command_name, "nope");
    assert_eq!(failure.prefix, "/");
    assert!(calls.labels().is_empty());
}

#[tokio::test]
async fn test_handler_errors_propagate() {
    let dir = directory();
    let tree = CommandTree::builder()
        .command(Command::new(
            "boom",
            handler_fn(|_inv: Invocation, _args: Arguments| async move {
                Err(HandlerError::Internal("boom".into()))
            }),
        ))
        .build()
        .unwrap();
    let service = build_service(tree, &dir);
    let mut failures = service.subscribe_failures();

    let (outcome, _) = dispatch(&service, &dir, "/boom").await;
    assert!(matches!(outcome, Err(HandlerError::Internal(ref m)) if m == "boom"));
    assert!(failures.try_recv().is_err());
}

#[tokio::test]
async fn test_failures_reach_subscribers() {
    let dir = directory();
    let calls = Calls::new();
    let service = build_service(whois_tree(&calls), &dir);
    let mut live = service.subscribe_failures();
    drop(service.subscribe_failures());

    dispatch(&service, &dir, "/nope").await.0.unwrap();
    dispatch(&service, &dir, "/whois").await.0.unwrap();

    assert_eq!(live.try_recv().unwrap().kind, FailureKind::NoCommandFound);
    assert_eq!(live.try_recv().unwrap().kind, FailureKind::BadArgumentCount);
    assert!(live.try_recv().is_err());
}
