//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use docaddr::model::TypeKind;
use std::path::PathBuf;

/// Resolve documentation addresses and links
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: docaddr.toml)
    #[arg(short = 'C', long, global = true, default_value = "docaddr.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve the page of a namespace
    #[command(visible_alias = "n")]
    Namespace {
        /// Namespace name (`Foo.Bar`), or empty for the global namespace
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Resolve a type or member by documentation id
    #[command(visible_alias = "m")]
    Member {
        /// Documentation id: `T:Foo.Bar.Baz`, `M:Foo.Bar.Baz.Qux(System.Int32)`.
        /// Nested types are separated with `+` (`T:Foo.Outer+Inner`).
        id: String,

        /// Kind of the (innermost) declaring type
        #[arg(short = 'k', long = "type-kind", value_enum, default_value = "class")]
        type_kind: TypeKindArg,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Resolve a conceptual topic
    #[command(visible_alias = "t")]
    Topic {
        /// Topic path from the root (`guide/setup`)
        path: String,

        /// Title of the last topic (defaults to its id)
        #[arg(long)]
        title: Option<String>,

        /// Pinned path of the last topic
        #[arg(long)]
        pin: Option<String>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Adjust a raw link written in a document
    #[command(visible_alias = "l")]
    Link {
        /// Link as written (`../img/logo.png`, `/guide/`, `#top`)
        link: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Look up legacy paths in `[redirects]`
    Map {
        /// Old paths (`docs/old-page.html#intro`)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Output JSON instead of TOML
        #[arg(short, long)]
        json: bool,
    },
}

/// Rendering scope shared by resolving commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Directory of the linking document, relative to the site root
    #[arg(short, long, value_name = "DIR", default_value = "")]
    pub from: String,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Type kinds accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeKindArg {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl From<TypeKindArg> for TypeKind {
    fn from(kind: TypeKindArg) -> Self {
        match kind {
            TypeKindArg::Class => Self::Class,
            TypeKindArg::Struct => Self::Struct,
            TypeKindArg::Interface => Self::Interface,
            TypeKindArg::Enum => Self::Enum,
            TypeKindArg::Delegate => Self::Delegate,
        }
    }
}
