//! Command tree and its builder.
//!
//! Commands are declared programmatically with [`Command`] (an invocable
//! leaf with typed arguments) and [`Group`] (a named grouping of
//! sub-commands). [`CommandTree::builder`] checks the declarations once and
//! produces an immutable tree of [`CommandNode`]s.
//!
//! ```rust
//! use relaybot::commands::{handler_fn, Arg, Arguments, Command, CommandTree, Group, Invocation};
//!
//! let tree = CommandTree::builder()
//!     .command(
//!         Command::new("say", handler_fn(|inv: Invocation, args: Arguments| async move {
//!             let words = args.require::<Vec<String>>("words")?;
//!             inv.reply(words.join(" ")).await
//!         }))
//!         .arg(Arg::rest::<Vec<String>>("words")),
//!     )
//!     .group(Group::new("role").alias("r"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tree.roots().len(), 2);
//! ```

use super::argument::{ArgumentSpec, TypeKey, anchor_pattern};
use super::handler::CommandHandler;
use crate::error::TreeError;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Declarations
// ============================================================================

/// An argument declaration.
#[derive(Debug, Clone)]
pub struct Arg {
    ty: TypeKey,
    name: String,
    rest: bool,
    pattern: Option<String>,
    description: Option<String>,
}

impl Arg {
    /// A positional argument converted as `T`.
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            name: name.into(),
            rest: false,
            pattern: None,
            description: None,
        }
    }

    /// The rest argument: consumes everything that remains. Must be last.
    pub fn rest<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            rest: true,
            ..Self::new::<T>(name)
        }
    }

    /// Pattern for pattern-matching converters, matched at the cursor.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A leaf declaration: a handler with an ordered argument list.
pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    args: Vec<Arg>,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            args: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }
}

/// A container declaration.
pub struct Group {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    children: Vec<Declaration>,
    index: Option<Arc<dyn CommandHandler>>,
    unknown: Option<Arc<dyn CommandHandler>>,
    duplicate: Option<&'static str>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            children: Vec::new(),
            index: None,
            unknown: None,
            duplicate: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.children.push(Declaration::Command(command));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.children.push(Declaration::Group(group));
        self
    }

    /// Handler invoked when the group is called without a sub-command.
    pub fn index(mut self, handler: impl CommandHandler + 'static) -> Self {
        if self.index.is_some() {
            self.duplicate.get_or_insert("index");
        }
        self.index = Some(Arc::new(handler));
        self
    }

    /// Handler invoked when the sub-command name matches nothing.
    pub fn unknown(mut self, handler: impl CommandHandler + 'static) -> Self {
        if self.unknown.is_some() {
            self.duplicate.get_or_insert("unknown");
        }
        self.unknown = Some(Arc::new(handler));
        self
    }
}

enum Declaration {
    Command(Command),
    Group(Group),
}

// ============================================================================
// Built tree
// ============================================================================

/// A node's primary name and aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    name: String,
    aliases: Vec<String>,
}

impl Names {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Exact, case-sensitive match against the name or any alias.
    pub fn matches(&self, candidate: &str) -> bool {
        self.name == candidate || self.aliases.iter().any(|a| a == candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// An invocable command.
pub struct Leaf {
    names: Names,
    description: Option<String>,
    arguments: Vec<ArgumentSpec>,
    handler: Arc<dyn CommandHandler>,
}

impl Leaf {
    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Usage line under `path`, e.g. `role give <member> <role>`.
    pub fn usage(&self, path: &str) -> String {
        let mut line = path.to_string();
        for arg in &self.arguments {
            line.push(' ');
            line.push_str(&arg.usage());
        }
        line
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("names", &self.names)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// A named grouping of sub-commands.
pub struct Container {
    names: Names,
    description: Option<String>,
    children: Vec<CommandNode>,
    index: Option<Arc<dyn CommandHandler>>,
    unknown: Option<Arc<dyn CommandHandler>>,
}

impl Container {
    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn index(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.index.as_ref()
    }

    pub fn unknown(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.unknown.as_ref()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("names", &self.names)
            .field("children", &self.children)
            .field("index", &self.index.is_some())
            .field("unknown", &self.unknown.is_some())
            .finish()
    }
}

/// A node of the command tree.
#[derive(Debug)]
pub enum CommandNode {
    Leaf(Leaf),
    Container(Container),
}

impl CommandNode {
    pub fn names(&self) -> &Names {
        match self {
            Self::Leaf(leaf) => &leaf.names,
            Self::Container(container) => &container.names,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => leaf.description(),
            Self::Container(container) => container.description(),
        }
    }
}

/// One line of [`CommandTree::help`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub usage: String,
    pub description: Option<String>,
}

impl fmt::Display for HelpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "{} - {}", self.usage, d),
            None => f.write_str(&self.usage),
        }
    }
}

/// The immutable command tree.
#[derive(Debug, Default)]
pub struct CommandTree {
    roots: Vec<CommandNode>,
}

impl CommandTree {
    pub fn builder() -> CommandTreeBuilder {
        CommandTreeBuilder::default()
    }

    /// Top-level nodes in declaration order.
    pub fn roots(&self) -> &[CommandNode] {
        &self.roots
    }

    /// Every invocable path with its usage, depth first in declaration order.
    ///
    /// Containers with an index handler are listed under their own path.
    pub fn help(&self) -> Vec<HelpEntry> {
        let mut entries = Vec::new();
        collect_help(&self.roots, "", &mut entries);
        entries
    }

    /// Visit every leaf with its path.
    pub fn for_each_leaf(&self, mut f: impl FnMut(&str, &Leaf)) {
        fn walk(nodes: &[CommandNode], prefix: &str, f: &mut dyn FnMut(&str, &Leaf)) {
            for node in nodes {
                let path = join_path(prefix, node.names().name());
                match node {
                    CommandNode::Leaf(leaf) => f(&path, leaf),
                    CommandNode::Container(container) => walk(&container.children, &path, f),
                }
            }
        }
        walk(&self.roots, "", &mut f);
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix} {name}")
    }
}

fn collect_help(nodes: &[CommandNode], prefix: &str, out: &mut Vec<HelpEntry>) {
    for node in nodes {
        let path = join_path(prefix, node.names().name());
        match node {
            CommandNode::Leaf(leaf) => out.push(HelpEntry {
                usage: leaf.usage(&path),
                description: leaf.description.clone(),
            }),
            CommandNode::Container(container) => {
                if container.index.is_some() {
                    out.push(HelpEntry {
                        usage: path.clone(),
                        description: container.description.clone(),
                    });
                }
                collect_help(&container.children, &path, out);
            }
        }
    }
}

/// Collects declarations and builds a [`CommandTree`].
#[derive(Default)]
pub struct CommandTreeBuilder {
    declarations: Vec<Declaration>,
}

impl CommandTreeBuilder {
    pub fn command(mut self, command: Command) -> Self {
        self.declarations.push(Declaration::Command(command));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.declarations.push(Declaration::Group(group));
        self
    }

    /// Check every declaration and build the tree.
    pub fn build(self) -> Result<CommandTree, TreeError> {
        let roots = build_level(self.declarations, "")?;
        Ok(CommandTree { roots })
    }
}

fn build_level(declarations: Vec<Declaration>, parent: &str) -> Result<Vec<CommandNode>, TreeError> {
    declarations
        .into_iter()
        .map(|declaration| match declaration {
            Declaration::Command(command) => build_leaf(command, parent).map(CommandNode::Leaf),
            Declaration::Group(group) => build_container(group, parent).map(CommandNode::Container),
        })
        .collect()
}

fn build_names(name: String, aliases: Vec<String>, parent: &str) -> Result<Names, TreeError> {
    if name.is_empty() || aliases.iter().any(String::is_empty) {
        return Err(TreeError::EmptyName {
            parent: if parent.is_empty() { "<root>".to_string() } else { parent.to_string() },
        });
    }
    Ok(Names { name, aliases })
}

fn build_leaf(command: Command, parent: &str) -> Result<Leaf, TreeError> {
    let names = build_names(command.name, command.aliases, parent)?;
    let path = join_path(parent, names.name());

    let rest_count = command.args.iter().filter(|a| a.rest).count();
    if rest_count > 1 {
        return Err(TreeError::MultipleRest {
            command: path,
            count: rest_count,
        });
    }
    let last = command.args.len().saturating_sub(1);
    if let Some((_, arg)) = command
        .args
        .iter()
        .enumerate()
        .find(|(i, a)| a.rest && *i != last)
    {
        return Err(TreeError::RestNotLast {
            command: path,
            argument: arg.name.clone(),
        });
    }

    let mut arguments = Vec::with_capacity(command.args.len());
    for arg in command.args {
        let pattern = match &arg.pattern {
            Some(p) => Some(anchor_pattern(p).map_err(|e| TreeError::InvalidPattern {
                command: path.clone(),
                argument: arg.name.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };
        arguments.push(ArgumentSpec {
            ty: arg.ty,
            name: arg.name,
            rest: arg.rest,
            pattern,
            description: arg.description,
        });
    }

    Ok(Leaf {
        names,
        description: command.description,
        arguments,
        handler: command.handler,
    })
}

fn build_container(group: Group, parent: &str) -> Result<Container, TreeError> {
    let names = build_names(group.name, group.aliases, parent)?;
    let path = join_path(parent, names.name());
    if let Some(fallback) = group.duplicate {
        return Err(TreeError::DuplicateFallback {
            group: path,
            fallback,
        });
    }
    let children = build_level(group.children, &path)?;
    Ok(Container {
        names,
        description: group.description,
        children,
        index: group.index,
        unknown: group.unknown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::arguments::Arguments;
    use crate::commands::handler::{Invocation, handler_fn};
    use relaybot_model::Member;

    fn noop() -> impl CommandHandler + 'static {
        handler_fn(|_inv: Invocation, _args: Arguments| async { Ok(()) })
    }

    #[test]
    fn test_builds_nested_tree() {
        let tree = CommandTree::builder()
            .command(Command::new("ping", noop()).describe("Check the bot is alive"))
            .group(
                Group::new("role")
                    .alias("r")
                    .index(noop())
                    .command(
                        Command::new("give", noop())
                            .arg(Arg::new::<Member>("member"))
                            .arg(Arg::rest::<String>("role")),
                    ),
            )
            .build()
            .unwrap();

        assert_eq!(tree.roots().len(), 2);
        let CommandNode::Container(role) = &tree.roots()[1] else {
            panic!("expected a container");
        };
        assert!(role.names().matches("r"));
        assert!(!role.names().matches("R"));
        assert!(role.index().is_some());
        assert!(role.unknown().is_none());
        assert_eq!(role.children().len(), 1);
    }

    #[test]
    fn test_rest_must_be_last() {
        let err = CommandTree::builder()
            .command(
                Command::new("bad", noop())
                    .arg(Arg::rest::<Vec<String>>("words"))
                    .arg(Arg::new::<i32>("n")),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::RestNotLast {
                command: "bad".into(),
                argument: "words".into()
            }
        );
    }

    #[test]
    fn test_single_rest_only() {
        let err = CommandTree::builder()
            .group(
                Group::new("g").command(
                    Command::new("bad", noop())
                        .arg(Arg::rest::<String>("a"))
                        .arg(Arg::rest::<String>("b")),
                ),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::MultipleRest {
                command: "g bad".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_invalid_pattern_fails_at_build() {
        let err = CommandTree::builder()
            .command(
                Command::new("roll", noop())
                    .arg(Arg::new::<crate::commands::PatternMatch>("dice").pattern("(\\d+")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidPattern { .. }));
    }

    #[test]
    fn test_duplicate_fallback() {
        let err = CommandTree::builder()
            .group(Group::new("g").unknown(noop()).unknown(noop()))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::DuplicateFallback {
                group: "g".into(),
                fallback: "unknown"
            }
        );
    }

    #[test]
    fn test_empty_alias_rejected() {
        let err = CommandTree::builder()
            .command(Command::new("ok", noop()).alias(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::EmptyName { .. }));
    }

    #[test]
    fn test_help_lists_paths() {
        let tree = CommandTree::builder()
            .command(
                Command::new("say", noop())
                    .describe("Repeat text")
                    .arg(Arg::rest::<Vec<String>>("words")),
            )
            .group(
                Group::new("role")
                    .describe("Manage roles")
                    .index(noop())
                    .command(Command::new("give", noop()).arg(Arg::new::<Member>("member"))),
            )
            .build()
            .unwrap();

        let lines: Vec<String> = tree.help().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "say [words...] - Repeat text".to_string(),
                "role - Manage roles".to_string(),
                "role give <member>".to_string(),
            ]
        );

        let mut leaves = Vec::new();
        tree.for_each_leaf(|path, _| leaves.push(path.to_string()));
        assert_eq!(leaves, vec!["say", "role give"]);
    }
}
