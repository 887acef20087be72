//! Commands of the demo bot.

use chrono::TimeDelta;
use relaybot::commands::{
    Arg, Arguments, Command, CommandTree, Group, Invocation, PatternMatch, handler_fn,
};
use relaybot::config::DirectoryConfig;
use relaybot::error::{HandlerError, HandlerResult, TreeError};
use relaybot::resolver::Directory;
use relaybot_model::{Channel, Member, Role};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Longest delay `remind` accepts, in seconds.
const MAX_REMINDER_SECS: i64 = 24 * 60 * 60;

/// Fill a directory from the `[directory]` table.
pub fn seed_directory(config: &DirectoryConfig) -> Directory {
    let mut directory = Directory::new();
    if config.lookup_latency_ms > 0 {
        directory = directory.with_latency(Duration::from_millis(config.lookup_latency_ms));
    }
    for seed in &config.members {
        let mut member = Member::new(seed.id.as_str(), seed.name.as_str());
        if let Some(nickname) = &seed.nickname {
            member = member.with_nickname(nickname.as_str());
        }
        for role in &seed.roles {
            member = member.with_role(role.as_str());
        }
        directory.insert_member(member);
    }
    for seed in &config.roles {
        directory.insert_role(Role::new(seed.id.as_str(), seed.name.as_str()));
    }
    for seed in &config.channels {
        let mut channel = Channel::new(seed.id.as_str(), seed.name.as_str());
        if let Some(server) = &config.server {
            channel = channel.in_server(server.as_str());
        }
        directory.insert_channel(channel);
    }
    directory
}

/// Build the demo command tree.
pub fn command_tree() -> Result<CommandTree, TreeError> {
    let help_lines: Arc<OnceLock<Vec<String>>> = Arc::new(OnceLock::new());
    let help = {
        let help_lines = Arc::clone(&help_lines);
        handler_fn(move |inv: Invocation, _args: Arguments| {
            let help_lines = Arc::clone(&help_lines);
            async move {
                let lines = help_lines.get().map(Vec::as_slice).unwrap_or_default();
                let text = lines
                    .iter()
                    .map(|line| format!("{}{}", inv.prefix, line))
                    .collect::<Vec<_>>()
                    .join("\n");
                inv.reply(text).await
            }
        })
    };

    let tree = CommandTree::builder()
        .command(Command::new("help", help).describe("List every command"))
        .command(
            Command::new(
                "ping",
                handler_fn(|inv: Invocation, _args: Arguments| async move { inv.reply("pong").await }),
            )
            .describe("Check the bot is alive"),
        )
        .command(
            Command::new(
                "say",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let words = args.require::<Vec<String>>("words")?;
                    inv.reply(words.join(" ")).await
                }),
            )
            .describe("Repeat the given words")
            .arg(Arg::rest::<Vec<String>>("words")),
        )
        .command(
            Command::new(
                "add",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let a = args.require::<i64>("a")?;
                    let b = args.require::<i64>("b")?;
                    let sum = a
                        .checked_add(*b)
                        .ok_or_else(|| HandlerError::Internal("integer overflow".into()))?;
                    inv.reply(sum.to_string()).await
                }),
            )
            .describe("Add two integers")
            .arg(Arg::new::<i64>("a"))
            .arg(Arg::new::<i64>("b")),
        )
        .command(
            Command::new(
                "add",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let a = args.require::<f64>("a")?;
                    let b = args.require::<f64>("b")?;
                    inv.reply((a + b).to_string()).await
                }),
            )
            .describe("Add two numbers")
            .arg(Arg::new::<f64>("a"))
            .arg(Arg::new::<f64>("b")),
        )
        .command(
            Command::new("roll", handler_fn(roll))
                .describe("Describe a dice roll such as 2d6")
                .arg(Arg::new::<PatternMatch>("dice").pattern(r"(?P<count>\d{1,3})d(?P<sides>\d{1,4})")),
        )
        .command(
            Command::new("remind", handler_fn(remind))
                .describe("Repeat a note after a delay such as 00:05 or 0:00:30")
                .arg(Arg::new::<TimeDelta>("after"))
                .arg(Arg::rest::<String>("note")),
        )
        .command(
            Command::new("whois", handler_fn(whois))
                .alias("who")
                .describe("Show a member")
                .arg(Arg::new::<Member>("member")),
        )
        .command(
            Command::new(
                "topic",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let channel = args.require::<Channel>("channel")?;
                    let topic = args.require::<String>("topic")?;
                    inv.reply(format!("#{} topic set to: {}", channel.name, topic))
                        .await
                }),
            )
            .describe("Set a channel topic")
            .arg(Arg::new::<Channel>("channel"))
            .arg(Arg::rest::<String>("topic")),
        )
        .command(
            Command::new(
                "inspect",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let id = args.require::<Uuid>("id")?;
                    inv.reply(format!("{} is a version {} UUID", id, id.get_version_num()))
                        .await
                }),
            )
            .describe("Inspect a UUID")
            .arg(Arg::new::<Uuid>("id")),
        )
        .command(
            Command::new(
                "inspect",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let url = args.require::<Url>("url")?;
                    inv.reply(format!(
                        "{} points at {}",
                        url,
                        url.host_str().unwrap_or("no host")
                    ))
                    .await
                }),
            )
            .describe("Inspect a URL")
            .arg(Arg::new::<Url>("url")),
        )
        .group(role_group())
        .build()?;

    let _ = help_lines.set(tree.help().iter().map(ToString::to_string).collect());
    Ok(tree)
}

fn role_group() -> Group {
    Group::new("role")
        .alias("r")
        .describe("Role management")
        .index(handler_fn(|inv: Invocation, _args: Arguments| async move {
            inv.reply(format!("usage: {}role give <member> <role>", inv.prefix))
                .await
        }))
        .unknown(handler_fn(|inv: Invocation, _args: Arguments| async move {
            inv.reply(format!("no role sub-command matches `{}`", inv.raw_arguments))
                .await
        }))
        .command(
            Command::new(
                "give",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let member = args.require::<Member>("member")?;
                    let role = args.require::<Role>("role")?;
                    inv.reply(format!(
                        "{} would receive {}",
                        relaybot_model::Mentionable::display_name(member),
                        role.name
                    ))
                    .await
                }),
            )
            .describe("Grant a role")
            .arg(Arg::new::<Member>("member"))
            .arg(Arg::new::<Role>("role")),
        )
        .command(
            Command::new(
                "of",
                handler_fn(|inv: Invocation, args: Arguments| async move {
                    let member = args.require::<Member>("member")?;
                    let roles: Vec<&str> = member.roles.iter().map(|r| r.as_str()).collect();
                    inv.reply(format!("{}: {}", member.name, roles.join(", ")))
                        .await
                }),
            )
            .describe("List a member's roles")
            .arg(Arg::new::<Member>("member")),
        )
}

async fn roll(inv: Invocation, args: Arguments) -> HandlerResult {
    let dice = args.require::<PatternMatch>("dice")?;
    let count: u32 = dice
        .name("count")
        .and_then(|c| c.parse().ok())
        .unwrap_or(1);
    let sides: u32 = dice
        .name("sides")
        .and_then(|s| s.parse().ok())
        .unwrap_or(6);
    if count == 0 || sides == 0 {
        return inv.reply("nothing to roll").await;
    }
    let max = count * sides;
    inv.reply(format!(
        "{}: {} to {}, averaging {:.1}",
        dice.as_str(),
        count,
        max,
        f64::from(count) * (f64::from(sides) + 1.0) / 2.0
    ))
    .await
}

async fn remind(inv: Invocation, mut args: Arguments) -> HandlerResult {
    let after = args
        .take::<TimeDelta>("after")
        .ok_or_else(|| HandlerError::MissingArgument("after".into()))?;
    let note = args.take::<String>("note").unwrap_or_default();
    if after < TimeDelta::zero() || after.num_seconds() > MAX_REMINDER_SECS {
        return inv.reply("reminders must be between 0 and 24 hours").await;
    }
    let delay = after.to_std().map_err(|e| HandlerError::Internal(e.to_string()))?;

    inv.reply(format!("will remind you in {}s", after.num_seconds()))
        .await?;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = inv.reply(format!("reminder: {note}")).await {
            tracing::warn!(error = %e, "Failed to deliver reminder");
        }
    });
    Ok(())
}

async fn whois(inv: Invocation, args: Arguments) -> HandlerResult {
    let member = args.require::<Member>("member")?;
    let nickname = member
        .nickname
        .as_deref()
        .map(|n| format!(" (nickname {n})"))
        .unwrap_or_default();
    inv.reply(format!(
        "{} is {}{} with {} role(s)",
        member.id,
        member.name,
        nickname,
        member.roles.len()
    ))
    .await
}
